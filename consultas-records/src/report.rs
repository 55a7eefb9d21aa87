//! Report and filter-option assembly on top of the pipeline.

use chrono::NaiveDateTime;
use consultas_core::{
    EnrichedConsultation, FilterOption, FilterOptions, NameCount, RawRecord, ReportData,
    ReportError, ReportRequest,
};
use serde_json::Value;
use tracing::info;

use crate::catalog::{build_index, CatalogIndex, Catalogs};
use crate::dates::format_day;
use crate::enrich::enrich;
use crate::fields::full_name;
use crate::filter::filter_for_request;

/// Filter, enrich and summarise consultations for a report request.
pub fn assemble_report(
    consultations: &[RawRecord],
    athletes: &[RawRecord],
    professionals: &[RawRecord],
    request: &ReportRequest,
    generated_at: NaiveDateTime,
) -> Result<ReportData, ReportError> {
    let (from, to) = request.required_dates()?;

    let catalogs = Catalogs::build(athletes, professionals);
    let filtered = filter_for_request(consultations, request);
    info!(
        recibidas = consultations.len(),
        filtradas = filtered.len(),
        "consultations filtered"
    );
    let rows = enrich(&filtered, &catalogs);

    let athlete_label = request.athlete_filter().and_then(|wanted| {
        label_for(&rows, wanted, |row| &row.athlete_id, |row| &row.athlete_name)
    });
    let professional_label = request.professional_filter().and_then(|wanted| {
        label_for(
            &rows,
            wanted,
            |row| &row.professional_id,
            |row| &row.professional_name,
        )
    });

    Ok(ReportData {
        generated_at,
        period: format!("{} - {}", format_day(from), format_day(to)),
        athlete_label,
        professional_label,
        total: rows.len(),
        per_professional: count_by_professional(&rows),
        filename: format!("reporte_consultas_{from}_{to}.pdf"),
        rows,
    })
}

/// Name shown on the first row whose id matches the active filter.
fn label_for(
    rows: &[EnrichedConsultation],
    wanted: &str,
    id: impl Fn(&EnrichedConsultation) -> &Option<String>,
    name: impl Fn(&EnrichedConsultation) -> &String,
) -> Option<String> {
    rows.iter()
        .find(|row| id(row).as_deref() == Some(wanted))
        .map(|row| name(row).clone())
}

fn count_by_professional(rows: &[EnrichedConsultation]) -> Vec<NameCount> {
    let mut counts: Vec<NameCount> = Vec::new();
    for row in rows {
        match counts
            .iter_mut()
            .find(|entry| entry.name == row.professional_name)
        {
            Some(entry) => entry.count += 1,
            None => counts.push(NameCount {
                name: row.professional_name.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// Selector options for athletes and professionals, de-duplicated by id.
pub fn filter_options(athletes: &[RawRecord], professionals: &[RawRecord]) -> FilterOptions {
    FilterOptions {
        atletas: options_from(&build_index(athletes), full_name),
        profesionales: options_from(&build_index(professionals), |professional| {
            format!(
                "{} - {}",
                full_name(professional),
                professional.text_or("especialidad", "")
            )
        }),
    }
}

fn options_from(index: &CatalogIndex, label: impl Fn(&RawRecord) -> String) -> Vec<FilterOption> {
    index
        .iter()
        .map(|(_, record)| FilterOption {
            id: record.field("id").cloned().unwrap_or(Value::Null),
            nombre: label(record),
        })
        .collect()
}
