//! Filtros de busca das listas de pacientes e pagamentos

use clinic_db::models::{Patient, Payment};

fn contains_ignoring_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map_or(false, |text| text.to_lowercase().contains(needle))
}

/// Pacientes cujo nome ou e-mail contém o termo (sem diferenciar
/// maiúsculas), ou cujo telefone contém o termo literalmente.
pub fn filter_patients(patients: Vec<Patient>, term: &str) -> Vec<Patient> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return patients;
    }
    patients
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.phone.as_deref().map_or(false, |phone| phone.contains(term.trim()))
                || contains_ignoring_case(p.email.as_deref(), &needle)
        })
        .collect()
}

/// Pagamentos cujo paciente ou descrição contém o termo
pub fn filter_payments(payments: Vec<Payment>, term: &str) -> Vec<Payment> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return payments;
    }
    payments
        .into_iter()
        .filter(|p| {
            contains_ignoring_case(p.client_name.as_deref(), &needle)
                || contains_ignoring_case(p.description.as_deref(), &needle)
        })
        .collect()
}
