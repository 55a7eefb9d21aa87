//! Candidate-field lookups over loosely shaped records.

use consultas_core::{scalar_text, RawRecord};
use serde_json::Value;

/// Date fields, in priority order.
pub const DATE_FIELDS: &[&str] = &["fecha", "creado_el", "fecha_consulta", "created_at"];

/// Athlete foreign-key fields, in priority order.
pub const ATHLETE_FIELDS: &[&str] = &["atleta_id", "atleta", "id_atleta", "paciente_id", "paciente"];

/// Professional foreign-key fields, in priority order.
pub const PROFESSIONAL_FIELDS: &[&str] = &[
    "profesional_salud_id",
    "profesional_salud",
    "profesional_id",
    "profesional",
    "id_profesional",
    "medico_id",
    "medico",
];

pub const DIAGNOSIS_FIELDS: &[&str] = &["diagnostico", "diagnóstico", "diagnostic"];

pub const TREATMENT_FIELDS: &[&str] = &["tratamiento", "treatment"];

/// Resolve a foreign key given as a bare scalar or as a nested object with
/// an `id`. First candidate that yields a value wins.
pub fn resolve_id(record: &RawRecord, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|field| {
        let value = record.field(field)?;
        match value {
            Value::Object(nested) => nested.get("id").and_then(scalar_text),
            other => scalar_text(other),
        }
    })
}

/// First candidate holding a non-blank scalar, as text.
pub fn first_text(record: &RawRecord, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|field| match record.field(field)? {
        Value::String(text) if text.trim().is_empty() => None,
        other => scalar_text(other),
    })
}

/// `"{nombre} {apPaterno} {apMaterno}"`, trimmed.
pub fn full_name(record: &RawRecord) -> String {
    format!(
        "{} {} {}",
        record.text_or("nombre", ""),
        record.text_or("apPaterno", ""),
        record.text_or("apMaterno", "")
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::new(value)
    }

    #[test]
    fn nested_object_id_is_unwrapped() {
        let consultation = record(json!({"atleta": {"id": 12, "nombre": "Ana"}}));
        assert_eq!(
            resolve_id(&consultation, ATHLETE_FIELDS).as_deref(),
            Some("12")
        );
    }

    #[test]
    fn priority_order_decides_between_fields() {
        let consultation = record(json!({"profesional": 9, "profesional_salud": "3"}));
        assert_eq!(
            resolve_id(&consultation, PROFESSIONAL_FIELDS).as_deref(),
            Some("3")
        );
    }

    #[test]
    fn null_and_idless_objects_fall_through() {
        let consultation = record(json!({
            "atleta_id": null,
            "atleta": {"nombre": "sin id"},
            "paciente": 44
        }));
        assert_eq!(
            resolve_id(&consultation, ATHLETE_FIELDS).as_deref(),
            Some("44")
        );
    }

    #[test]
    fn unresolvable_ids_are_none() {
        assert_eq!(resolve_id(&record(json!({"id": 1})), ATHLETE_FIELDS), None);
        assert_eq!(resolve_id(&record(json!("texto")), ATHLETE_FIELDS), None);
    }

    #[test]
    fn blank_text_is_skipped() {
        let consultation = record(json!({"diagnostico": "  ", "diagnostic": "Tendinitis"}));
        assert_eq!(
            first_text(&consultation, DIAGNOSIS_FIELDS).as_deref(),
            Some("Tendinitis")
        );
        assert_eq!(first_text(&consultation, TREATMENT_FIELDS), None);
    }

    #[test]
    fn full_name_keeps_empty_segments() {
        assert_eq!(
            full_name(&record(json!({"nombre": "Ana", "apPaterno": "Lopez"}))),
            "Ana Lopez"
        );
        assert_eq!(
            full_name(&record(json!({"nombre": "Ana", "apMaterno": "Diaz"}))),
            "Ana  Diaz"
        );
        assert_eq!(full_name(&record(json!({}))), "");
    }
}
