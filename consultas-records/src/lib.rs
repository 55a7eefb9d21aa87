//! Consultation aggregation pipeline: normalise loosely shaped records,
//! filter them, join them against the catalogs and compute statistics.

pub mod catalog;
pub mod dates;
pub mod enrich;
pub mod fields;
pub mod filter;
pub mod report;
pub mod stats;

pub use catalog::{build_index, CatalogIndex, Catalogs};
pub use dates::{format_date, parse_date};
pub use enrich::enrich;
pub use fields::resolve_id;
pub use filter::{criteria_from_request, filter_consultations, filter_for_request, FilterDecision};
pub use report::{assemble_report, filter_options};
pub use stats::compute_statistics;

use chrono::NaiveDate;
use consultas_core::{ConsultationStatistics, RawRecord, ReportError};

/// Statistics from JSON listings as returned by the records service.
pub fn statistics_from_str(
    consultations_json: &str,
    athletes_json: &str,
    professionals_json: &str,
    today: NaiveDate,
) -> Result<ConsultationStatistics, ReportError> {
    let consultations = parse_listing(consultations_json)?;
    let athletes = build_index(&parse_listing(athletes_json)?);
    let professionals = build_index(&parse_listing(professionals_json)?);
    Ok(compute_statistics(
        &consultations,
        &athletes,
        &professionals,
        today,
    ))
}

/// A JSON array of records.
pub fn parse_listing(json: &str) -> Result<Vec<RawRecord>, ReportError> {
    serde_json::from_str(json).map_err(|err| ReportError::Internal(err.to_string()))
}
