//! Joins consultations against the catalogs for presentation.

use consultas_core::{EnrichedConsultation, RawRecord};

use crate::catalog::{CatalogIndex, Catalogs};
use crate::dates::display_date;
use crate::fields::{
    first_text, full_name, resolve_id, ATHLETE_FIELDS, DIAGNOSIS_FIELDS, PROFESSIONAL_FIELDS,
    TREATMENT_FIELDS,
};

pub const UNSPECIFIED: &str = "No especificado";
pub const UNKNOWN_ATHLETE: &str = "Atleta desconocido";
pub const UNKNOWN_PROFESSIONAL: &str = "Profesional desconocido";

/// One enriched row per consultation, in input order.
pub fn enrich(consultations: &[RawRecord], catalogs: &Catalogs) -> Vec<EnrichedConsultation> {
    consultations
        .iter()
        .map(|consultation| enrich_one(consultation, catalogs))
        .collect()
}

pub fn enrich_one(consultation: &RawRecord, catalogs: &Catalogs) -> EnrichedConsultation {
    let (athlete_id, athlete_name) = join(
        consultation,
        ATHLETE_FIELDS,
        &catalogs.athletes,
        UNKNOWN_ATHLETE,
    );
    let (professional_id, professional_name) = join(
        consultation,
        PROFESSIONAL_FIELDS,
        &catalogs.professionals,
        UNKNOWN_PROFESSIONAL,
    );

    EnrichedConsultation {
        id: consultation.id_text().unwrap_or_else(|| "N/A".to_string()),
        formatted_date: display_date(consultation),
        diagnosis: first_text(consultation, DIAGNOSIS_FIELDS)
            .unwrap_or_else(|| UNSPECIFIED.to_string()),
        treatment: first_text(consultation, TREATMENT_FIELDS)
            .unwrap_or_else(|| UNSPECIFIED.to_string()),
        athlete_id,
        athlete_name,
        professional_id,
        professional_name,
    }
}

/// Resolved id (even when the catalog misses it) and display name.
fn join(
    consultation: &RawRecord,
    candidates: &[&str],
    index: &CatalogIndex,
    placeholder: &str,
) -> (Option<String>, String) {
    let id = resolve_id(consultation, candidates);
    let name = id
        .as_deref()
        .and_then(|id| index.get(id))
        .map(full_name)
        .unwrap_or_else(|| placeholder.to_string());
    (id, name)
}
