//! Testes de integração da API HTTP sobre um banco temporário

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use clinic_crm::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    let (dir, pool) = clinic_db::testing::temp_pool()
        .await
        .expect("Falha ao criar banco temporário");
    TestApp {
        router: build_router(AppState::new(pool)),
        _dir: dir,
    }
}

impl TestApp {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json_body) => builder
                .header("content-type", "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None).await
    }

    async fn create_patient(&self, name: &str) -> i64 {
        let (status, body) = self.post("/api/patients", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "clinic-crm");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_patient_crud_and_search() {
    let app = setup().await;

    let (status, body) = app
        .post(
            "/api/patients",
            json!({ "name": "  Ana Lima ", "phone": "11 98888-1234", "email": "", "notes": "Alergia" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ana Lima");
    assert_eq!(body["email"], Value::Null);
    let ana = body["id"].as_i64().unwrap();
    app.create_patient("Bruno").await;

    let (_, list) = app.get("/api/patients").await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[0]["name"], "Ana Lima");

    let (_, found) = app.get("/api/patients?q=98888").await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["id"], ana);

    let (status, body) = app
        .put(&format!("/api/patients/{}", ana), json!({ "name": "Ana Souza", "email": "ana@clinica.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana Souza");
    assert_eq!(body["email"], "ana@clinica.com");

    let (status, _) = app.delete(&format!("/api/patients/{}", ana)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/patients/{}", ana)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_patient_validation() {
    let app = setup().await;

    let (status, body) = app.post("/api/patients", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post("/api/patients", json!({ "name": "Ana", "email": "sem-arroba" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/patients", json!({ "phone": "123" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put("/api/patients/999", json!({ "name": "Ninguém" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_with_payments_cannot_be_deleted() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, _) = app
        .post("/api/payments", json!({ "client_id": ana, "amount": 150.0, "due_date": "2024-05-10" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/api/patients/{}", ana)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = app.get(&format!("/api/patients/{}", ana)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_payment_with_unknown_patient_is_rejected() {
    let app = setup().await;

    let (status, _) = app
        .post("/api/payments", json!({ "client_id": 42, "amount": 10.0, "due_date": "2024-05-10" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = app.get("/api/payments").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_lifecycle() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, payment) = app
        .post(
            "/api/payments",
            json!({
                "client_id": ana,
                "amount": 200.0,
                "due_date": "2024-05-10",
                "description": "Clareamento"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["recurrence"], "none");
    assert_eq!(payment["client_name"], "Ana");
    let id = payment["id"].as_i64().unwrap();

    let (_, toggled) = app.post(&format!("/api/payments/{}/toggle", id), json!({})).await;
    assert_eq!(toggled["status"], "paid");

    // A edição preserva o status
    let (status, edited) = app
        .put(
            &format!("/api/payments/{}", id),
            json!({ "client_id": ana, "amount": 250.0, "due_date": "2024-05-12", "status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["amount"], 250.0);
    assert_eq!(edited["status"], "paid");

    let (_, overdue) = app
        .put(&format!("/api/payments/{}/status", id), json!({ "status": "overdue" }))
        .await;
    assert_eq!(overdue["status"], "overdue");

    let (_, toggled) = app.post(&format!("/api/payments/{}/toggle", id), json!({})).await;
    assert_eq!(toggled["status"], "paid");

    let (status, body) = app
        .put(&format!("/api/payments/{}/status", id), json!({ "status": "refunded" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let (_, unchanged) = app.get(&format!("/api/payments/{}", id)).await;
    assert_eq!(unchanged["status"], "paid");

    let (status, _) = app.delete(&format!("/api/payments/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&format!("/api/payments/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_summary_and_search() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;
    let bruno = app.create_patient("Bruno").await;

    for (client_id, amount, status, description) in [
        (ana, 100.0, "paid", "Consulta"),
        (ana, 50.0, "pending", "Retorno"),
        (bruno, 25.0, "overdue", "Limpeza"),
    ] {
        let (code, _) = app
            .post(
                "/api/payments",
                json!({
                    "client_id": client_id,
                    "amount": amount,
                    "due_date": "2024-05-10",
                    "status": status,
                    "description": description
                }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (_, summary) = app.get("/api/payments/summary").await;
    assert_eq!(summary, json!({ "total": 175.0, "paid": 100.0, "pending": 75.0 }));

    let (_, summary) = app.get("/api/payments/summary?q=bruno").await;
    assert_eq!(summary["total"], 25.0);

    let (_, found) = app.get("/api/payments?q=RETORNO").await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["amount"], 50.0);
}

#[tokio::test]
async fn test_installment_plan() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, created) = app
        .post(
            "/api/payments/installments",
            json!({
                "client_id": ana,
                "total_amount": 300.0,
                "start_date": "2024-01-01",
                "end_date": "2024-03-01",
                "interval_days": 30
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.as_array().unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(created[0]["due_date"], "2024-01-01");
    assert_eq!(created[1]["due_date"], "2024-01-31");
    assert_eq!(created[2]["due_date"], "2024-03-01");
    assert!(created.iter().all(|p| p["amount"] == 100.0
        && p["status"] == "pending"
        && p["description"] == "Parcela de Tratamento"));
}

#[tokio::test]
async fn test_installment_plan_rejects_invalid_ranges() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, body) = app
        .post(
            "/api/payments/installments",
            json!({
                "client_id": ana,
                "total_amount": 300.0,
                "start_date": "2024-03-01",
                "end_date": "2024-01-01",
                "interval_days": 30
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post(
            "/api/payments/installments",
            json!({
                "client_id": ana,
                "total_amount": 300.0,
                "start_date": "2024-01-01",
                "end_date": "2024-03-01",
                "interval_days": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, payments) = app.get("/api/payments").await;
    assert!(payments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pipeline_stage_moves_and_board() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, entry) = app
        .post(
            "/api/pipeline",
            json!({ "client_id": ana, "title": "Implante", "value": 3000.0, "deadline": "2024-09-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["stage"], "lead");
    assert_eq!(entry["status"], "todo");
    let id = entry["id"].as_i64().unwrap();

    let (_, moved) = app.post(&format!("/api/pipeline/{}/retreat", id), json!({})).await;
    assert_eq!(moved["stage"], "lead");

    let (_, moved) = app.post(&format!("/api/pipeline/{}/advance", id), json!({})).await;
    assert_eq!(moved["stage"], "contact");

    let (_, moved) = app
        .put(&format!("/api/pipeline/{}/stage", id), json!({ "stage": "closed" }))
        .await;
    assert_eq!(moved["stage"], "closed");

    let (_, moved) = app.post(&format!("/api/pipeline/{}/advance", id), json!({})).await;
    assert_eq!(moved["stage"], "closed");

    // A edição não altera a etapa
    let (_, edited) = app
        .put(
            &format!("/api/pipeline/{}", id),
            json!({ "client_id": ana, "title": "Implante duplo", "stage": "lead", "value": 4500.0 }),
        )
        .await;
    assert_eq!(edited["title"], "Implante duplo");
    assert_eq!(edited["stage"], "closed");

    let (_, board) = app.get("/api/pipeline/board").await;
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 5);
    assert_eq!(board[4]["stage"], "closed");
    assert_eq!(board[4]["count"], 1);
    assert_eq!(board[4]["total_value"], 4500.0);
    assert_eq!(board[0]["count"], 0);

    let (status, _) = app.post("/api/pipeline/999/advance", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pipeline_unknown_stage_is_rejected() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (_, entry) = app
        .post("/api/pipeline", json!({ "client_id": ana, "title": "Implante" }))
        .await;
    let id = entry["id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/api/pipeline/{}/stage", id), json!({ "stage": "won" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app.put(&format!("/api/pipeline/{}/stage", id), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, entry) = app.get(&format!("/api/pipeline/{}", id)).await;
    assert_eq!(entry["stage"], "lead");
}

#[tokio::test]
async fn test_pipeline_conversion_rejects_malformed_overrides() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (_, entry) = app
        .post(
            "/api/pipeline",
            json!({ "client_id": ana, "title": "Canal", "stage": "proposal", "deadline": "2024-09-01" }),
        )
        .await;
    let id = entry["id"].as_i64().unwrap();

    let (status, body) = app
        .post(&format!("/api/pipeline/{}/convert", id), json!({ "start_date": "2024-13-45" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post(&format!("/api/pipeline/{}/convert", id), json!({ "type": "cirurgia" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, appointments) = app.get("/api/appointments").await;
    assert!(appointments.as_array().unwrap().is_empty());
    let (_, entry) = app.get(&format!("/api/pipeline/{}", id)).await;
    assert_eq!(entry["stage"], "proposal");
}

#[tokio::test]
async fn test_pipeline_conversion() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (_, entry) = app
        .post(
            "/api/pipeline",
            json!({ "client_id": ana, "title": "Canal", "stage": "negotiation", "deadline": "2024-09-01" }),
        )
        .await;
    let id = entry["id"].as_i64().unwrap();

    let (status, converted) = app.request(Method::POST, &format!("/api/pipeline/{}/convert", id), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(converted["entry"]["stage"], "closed");
    assert_eq!(converted["appointment"]["title"], "Canal");
    assert_eq!(converted["appointment"]["type"], "consulta");
    assert_eq!(converted["appointment"]["start_date"], "2024-09-01");
    assert_eq!(converted["appointment"]["recurrence"], "none");
    assert_eq!(converted["appointment"]["notes"], "Convertido de Tratamento: Canal");

    let (_, entry) = app
        .post("/api/pipeline", json!({ "client_id": ana, "title": "Prótese" }))
        .await;
    let id = entry["id"].as_i64().unwrap();

    let (status, _) = app.request(Method::POST, &format!("/api/pipeline/{}/convert", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, converted) = app
        .post(
            &format!("/api/pipeline/{}/convert", id),
            json!({ "start_date": "2024-10-02", "type": "procedimento" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(converted["appointment"]["type"], "procedimento");
    assert_eq!(converted["entry"]["stage"], "closed");

    let (_, appointments) = app.get("/api/appointments").await;
    assert_eq!(appointments.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_appointment_with_linked_payment() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, created) = app
        .post(
            "/api/appointments",
            json!({
                "client_id": ana,
                "title": "Manutenção do aparelho",
                "type": "manutencao",
                "start_date": "2024-01-15",
                "recurrence": "monthly",
                "payment": { "day": 20, "amount": 180.0, "year": 2024, "month": 2 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["appointment"]["day_of_month"], 15);
    assert_eq!(created["appointment"]["client_name"], "Ana");
    assert_eq!(created["payment"]["due_date"], "2024-02-20");
    assert_eq!(created["payment"]["recurrence"], "monthly");
    assert_eq!(created["payment"]["status"], "pending");
    assert_eq!(created["payment"]["description"], "Pagamento: Manutenção do aparelho");

    let (status, created) = app
        .post(
            "/api/appointments",
            json!({ "client_id": ana, "title": "Avaliação", "start_date": "2024-03-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["payment"], Value::Null);
    assert_eq!(created["appointment"]["type"], "consulta");
}

#[tokio::test]
async fn test_appointment_invalid_linked_payment_creates_nothing() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (status, _) = app
        .post(
            "/api/appointments",
            json!({
                "client_id": ana,
                "title": "Consulta",
                "start_date": "2024-02-10",
                "payment": { "day": 30, "amount": 100.0 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/appointments",
            json!({ "client_id": ana, "title": "Consulta", "start_date": "2024-02-10", "day_of_month": 32 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, appointments) = app.get("/api/appointments").await;
    assert!(appointments.as_array().unwrap().is_empty());
    let (_, payments) = app.get("/api/payments").await;
    assert!(payments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_appointment_update_and_delete() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    let (_, created) = app
        .post(
            "/api/appointments",
            json!({ "client_id": ana, "title": "Avaliação", "start_date": "2024-03-05" }),
        )
        .await;
    let id = created["appointment"]["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/api/appointments/{}", id),
            json!({ "client_id": ana, "title": "Retorno", "type": "retorno", "start_date": "2024-03-20" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "retorno");
    assert_eq!(updated["start_date"], "2024-03-20");

    let (status, _) = app.delete(&format!("/api/appointments/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/appointments/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_projection() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;

    app.post(
        "/api/appointments",
        json!({
            "client_id": ana,
            "title": "Manutenção",
            "type": "manutencao",
            "start_date": "2024-01-31",
            "recurrence": "monthly"
        }),
    )
    .await;
    app.post(
        "/api/appointments",
        json!({ "client_id": ana, "title": "Avaliação", "start_date": "2024-04-10" }),
    )
    .await;
    app.post(
        "/api/payments",
        json!({ "client_id": ana, "amount": 99.5, "due_date": "2024-01-05", "recurrence": "monthly" }),
    )
    .await;

    let (status, april) = app.get("/api/calendar/2024/4").await;
    assert_eq!(status, StatusCode::OK);
    let days = april["days"].as_object().unwrap();
    assert_eq!(days.len(), 30);
    assert!(!days.contains_key("31"));
    assert_eq!(days["10"][0]["title"], "Consulta: Avaliação");
    assert_eq!(days["5"][0]["kind"], "payment");
    assert_eq!(days["5"][0]["title"], "Pagamento: R$ 99.50");
    assert_eq!(days["5"][0]["category"], "open");

    let (_, may) = app.get("/api/calendar/2024/5").await;
    let days = may["days"].as_object().unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days["31"][0]["title"], "Manutenção: Manutenção");
    assert_eq!(days["31"][0]["patient_name"], "Ana");
    assert!(days["10"].as_array().unwrap().is_empty());

    let (status, body) = app.get("/api/calendar/2024/13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/api/calendar/2024/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard() {
    let app = setup().await;
    let ana = app.create_patient("Ana").await;
    app.create_patient("Bruno").await;

    app.post(
        "/api/payments",
        json!({ "client_id": ana, "amount": 100.0, "due_date": "2024-06-10", "status": "paid" }),
    )
    .await;
    app.post(
        "/api/payments",
        json!({ "client_id": ana, "amount": 40.0, "due_date": "2024-05-10" }),
    )
    .await;
    app.post(
        "/api/appointments",
        json!({ "client_id": ana, "title": "Manutenção", "start_date": "2020-01-10", "recurrence": "monthly" }),
    )
    .await;
    app.post(
        "/api/pipeline",
        json!({ "client_id": ana, "title": "Implante", "value": 1200.0 }),
    )
    .await;

    let (status, stats) = app.get("/api/dashboard?year=2024&month=6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["patient_count"], 2);
    assert_eq!(stats["paid_total"], 100.0);
    assert_eq!(stats["pending_total"], 40.0);
    assert_eq!(stats["upcoming_appointments"], 1);
    assert_eq!(stats["pipeline"][0]["count"], 1);
    assert_eq!(stats["pipeline"][0]["total_value"], 1200.0);
    assert_eq!(stats["appointment_types"].as_array().unwrap().len(), 1);

    let revenue = stats["monthly_revenue"].as_array().unwrap();
    assert_eq!(revenue.len(), 6);
    assert_eq!(revenue[5]["month"]["month"], 6);
    assert_eq!(revenue[5]["received"], 100.0);
    assert_eq!(revenue[4]["pending"], 40.0);

    let (status, _) = app.get("/api/dashboard?year=2024&month=13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
