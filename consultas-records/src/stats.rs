//! Historical statistics over the full consultation set.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use consultas_core::{
    ConsultationStatistics, MonthlyBucket, MonthlyTotal, ProfessionalCount, ProfessionalSummary,
    RankedAthlete, RankedDiagnosis, RawRecord,
};
use tracing::info;

use crate::catalog::CatalogIndex;
use crate::dates::resolve_date;
use crate::fields::{
    first_text, full_name, resolve_id, ATHLETE_FIELDS, DIAGNOSIS_FIELDS, PROFESSIONAL_FIELDS,
};

pub const MONTHS_SHOWN: u32 = 12;
pub const TOP_ATHLETES: usize = 10;
pub const TOP_DIAGNOSES: usize = 5;
pub const NO_DIAGNOSIS: &str = "Sin diagnóstico";
pub const NO_SPECIALTY: &str = "Sin especialidad";

/// What the aggregations need from one consultation, resolved once.
#[derive(Debug, Clone, Default)]
struct ConsultationFacts {
    date: Option<NaiveDateTime>,
    athlete_id: Option<String>,
    professional_id: Option<String>,
    diagnosis: Option<String>,
}

impl ConsultationFacts {
    fn from_record(record: &RawRecord) -> Self {
        Self {
            date: resolve_date(record),
            athlete_id: resolve_id(record, ATHLETE_FIELDS),
            professional_id: resolve_id(record, PROFESSIONAL_FIELDS),
            diagnosis: first_text(record, DIAGNOSIS_FIELDS).map(|text| text.trim().to_string()),
        }
    }

    fn in_month(&self, month: u32, year: i32) -> bool {
        self.date
            .is_some_and(|date| date.month() == month && date.year() == year)
    }
}

/// Aggregate statistics. `today` anchors the current month and the trailing
/// 12-month window.
pub fn compute_statistics(
    consultations: &[RawRecord],
    athletes: &CatalogIndex,
    professionals: &CatalogIndex,
    today: NaiveDate,
) -> ConsultationStatistics {
    let facts: Vec<ConsultationFacts> = consultations
        .iter()
        .map(ConsultationFacts::from_record)
        .collect();

    let current: Vec<&ConsultationFacts> = facts
        .iter()
        .filter(|fact| fact.in_month(today.month(), today.year()))
        .collect();

    let monthly = monthly_by_professional(&facts, professionals, today);
    let top_atletas = top_athletes(&facts, athletes);

    info!(
        consultas = facts.len(),
        profesionales = professionals.len(),
        atletas = athletes.len(),
        atletas_con_consultas = top_atletas.len(),
        meses = monthly.len(),
        "statistics computed"
    );

    ConsultationStatistics {
        total_consultas: facts.len(),
        consultas_mes_actual: current.len(),
        profesionales_data: professional_summaries(&current, professionals),
        monthly_data: monthly
            .iter()
            .map(|bucket| MonthlyTotal {
                mes: bucket.month_label.clone(),
                total: bucket.total,
            })
            .collect(),
        monthly_data_by_profesional: monthly,
        top_atletas,
        top_diagnosticos: top_diagnoses(&facts),
    }
}

/// `(month, year)` for the trailing window, oldest first, ending at `today`'s month.
pub fn trailing_months(today: NaiveDate) -> Vec<(u32, i32)> {
    let current_month = today.month() as i32;
    (0..MONTHS_SHOWN as i32)
        .map(|i| {
            let offset = MONTHS_SHOWN as i32 - i - 1;
            let shifted = current_month - offset - 1;
            let month = shifted.rem_euclid(12) as u32 + 1;
            let year = today.year() - i32::from(shifted < 0);
            (month, year)
        })
        .collect()
}

fn monthly_by_professional(
    facts: &[ConsultationFacts],
    professionals: &CatalogIndex,
    today: NaiveDate,
) -> Vec<MonthlyBucket> {
    trailing_months(today)
        .into_iter()
        .map(|(month, year)| {
            let in_month: Vec<&ConsultationFacts> =
                facts.iter().filter(|fact| fact.in_month(month, year)).collect();

            let per_professional = professionals
                .iter()
                .map(|(id, professional)| ProfessionalCount {
                    professional_id: id.to_string(),
                    professional_name: full_name(professional),
                    count: count_for(&in_month, |fact| fact.professional_id.as_deref() == Some(id)),
                })
                .collect();

            MonthlyBucket {
                month_label: month_label(month, year),
                month_number: month,
                year,
                per_professional,
                total: in_month.len(),
            }
        })
        .collect()
}

fn professional_summaries(
    current: &[&ConsultationFacts],
    professionals: &CatalogIndex,
) -> Vec<ProfessionalSummary> {
    professionals
        .iter()
        .map(|(id, professional)| ProfessionalSummary {
            nombre: full_name(professional),
            id: id.to_string(),
            total: count_for(current, |fact| fact.professional_id.as_deref() == Some(id)),
            especialidad: professional.text_or("especialidad", NO_SPECIALTY).to_string(),
        })
        .collect()
}

/// Athletes with at least one consultation, most consulted first. Equal
/// counts keep catalog order.
fn top_athletes(facts: &[ConsultationFacts], athletes: &CatalogIndex) -> Vec<RankedAthlete> {
    let mut ranked: Vec<RankedAthlete> = athletes
        .iter()
        .map(|(id, athlete)| RankedAthlete {
            nombre: full_name(athlete),
            id: id.to_string(),
            total: facts
                .iter()
                .filter(|fact| fact.athlete_id.as_deref() == Some(id))
                .count(),
        })
        .filter(|athlete| athlete.total > 0)
        .collect();
    ranked.sort_by_key(|athlete| Reverse(athlete.total));
    ranked.truncate(TOP_ATHLETES);
    ranked
}

/// Most frequent diagnoses. Equal counts keep first-encounter order.
fn top_diagnoses(facts: &[ConsultationFacts]) -> Vec<RankedDiagnosis> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<RankedDiagnosis> = Vec::new();

    for diagnosis in facts.iter().filter_map(|fact| fact.diagnosis.as_deref()) {
        if diagnosis.is_empty() || diagnosis == NO_DIAGNOSIS {
            continue;
        }
        match position.get(diagnosis) {
            Some(&slot) => ranked[slot].total += 1,
            None => {
                position.insert(diagnosis, ranked.len());
                ranked.push(RankedDiagnosis {
                    nombre: diagnosis.to_string(),
                    total: 1,
                });
            }
        }
    }

    ranked.sort_by_key(|diagnosis| Reverse(diagnosis.total));
    ranked.truncate(TOP_DIAGNOSES);
    ranked
}

fn count_for(facts: &[&ConsultationFacts], predicate: impl Fn(&ConsultationFacts) -> bool) -> usize {
    facts.iter().filter(|fact| predicate(fact)).count()
}

fn month_label(month: u32, year: i32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.format("%b").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_index;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_rolls_back_into_previous_year() {
        let months = trailing_months(day(2024, 3, 20));
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], (4, 2023));
        assert_eq!(months[8], (12, 2023));
        assert_eq!(months[9], (1, 2024));
        assert_eq!(months[11], (3, 2024));
    }

    #[test]
    fn december_window_stays_in_one_year() {
        let months = trailing_months(day(2024, 12, 1));
        assert_eq!(months.first(), Some(&(1, 2024)));
        assert_eq!(months.last(), Some(&(12, 2024)));
    }

    #[test]
    fn zero_count_athletes_are_not_ranked() {
        let mut consultations = Vec::new();
        for _ in 0..5 {
            consultations.push(json!({"atleta": 1, "fecha": "2024-01-02"}));
            consultations.push(json!({"atleta_id": "2", "fecha": "2024-01-03"}));
        }
        let athletes = build_index(&records(json!([
            {"id": 1, "nombre": "Uno"},
            {"id": 2, "nombre": "Dos"},
            {"id": 3, "nombre": "Tres"}
        ])));
        let stats = compute_statistics(
            &records(Value::Array(consultations)),
            &athletes,
            &CatalogIndex::default(),
            day(2024, 1, 31),
        );
        let ranked: Vec<_> = stats
            .top_atletas
            .iter()
            .map(|a| (a.id.as_str(), a.total))
            .collect();
        assert_eq!(ranked, vec![("1", 5), ("2", 5)]);
    }

    #[test]
    fn rankings_are_bounded_and_descending() {
        let mut consultations = Vec::new();
        let mut athletes = Vec::new();
        for id in 0..15 {
            athletes.push(json!({"id": id, "nombre": format!("A{id}")}));
            for _ in 0..=id {
                consultations.push(json!({
                    "atleta": id,
                    "diagnostico": format!("D{}", id % 8)
                }));
            }
        }
        let stats = compute_statistics(
            &records(Value::Array(consultations)),
            &build_index(&records(Value::Array(athletes))),
            &CatalogIndex::default(),
            day(2024, 6, 1),
        );
        assert_eq!(stats.top_atletas.len(), TOP_ATHLETES);
        assert!(stats
            .top_atletas
            .windows(2)
            .all(|pair| pair[0].total >= pair[1].total));
        assert_eq!(stats.top_atletas[0].id, "14");
        assert_eq!(stats.top_diagnosticos.len(), TOP_DIAGNOSES);
        assert!(stats
            .top_diagnosticos
            .windows(2)
            .all(|pair| pair[0].total >= pair[1].total));
    }

    #[test]
    fn placeholder_and_blank_diagnoses_are_ignored() {
        let stats = compute_statistics(
            &records(json!([
                {"diagnostico": "Sin diagnóstico"},
                {"diagnostico": "   "},
                {"diagnostico": " Esguince "},
                {"diagnostic": "Esguince"},
                {"diagnostico": "Fractura"}
            ])),
            &CatalogIndex::default(),
            &CatalogIndex::default(),
            day(2024, 6, 1),
        );
        assert_eq!(
            stats.top_diagnosticos,
            vec![
                RankedDiagnosis { nombre: "Esguince".to_string(), total: 2 },
                RankedDiagnosis { nombre: "Fractura".to_string(), total: 1 },
            ]
        );
    }

    #[test]
    fn undated_consultations_count_in_history_only() {
        let professionals = build_index(&records(json!([{"id": 3, "nombre": "Dr", "apPaterno": "Ruiz"}])));
        let stats = compute_statistics(
            &records(json!([
                {"profesional_salud": 3, "fecha": "2024-06-03"},
                {"profesional_salud": 3, "fecha": "sin fecha"},
                {"profesional_salud": 9, "fecha": "2024-06-04 10:00:00"}
            ])),
            &CatalogIndex::default(),
            &professionals,
            day(2024, 6, 15),
        );
        assert_eq!(stats.total_consultas, 3);
        assert_eq!(stats.consultas_mes_actual, 2);
        assert_eq!(stats.profesionales_data[0].total, 1);
        assert_eq!(stats.profesionales_data[0].especialidad, NO_SPECIALTY);
        let june = stats.monthly_data_by_profesional.last().unwrap();
        assert_eq!(june.total, 2);
        assert_eq!(june.per_professional[0].count, 1);
        assert_eq!(june.month_label, "Jun");
    }
}
