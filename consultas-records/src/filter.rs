//! Date-range and entity filtering over raw consultations.
//!
//! Filtering is fail-open: a consultation whose date cannot be determined,
//! or whose evaluation fails, is kept and logged rather than dropped.

use consultas_core::{FilterCriteria, RawRecord, ReportError, ReportRequest};
use tracing::{debug, warn};

use crate::dates::{parse_day, resolve_date};
use crate::fields::{resolve_id, ATHLETE_FIELDS, PROFESSIONAL_FIELDS};

/// Outcome of evaluating one consultation against the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Keep,
    /// No date candidate parsed; kept without checking the other criteria.
    KeepUndated,
    Exclude(Exclusion),
}

impl FilterDecision {
    pub fn is_kept(self) -> bool {
        !matches!(self, FilterDecision::Exclude(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    OutOfRange,
    AthleteMismatch,
    ProfessionalMismatch,
}

/// Interpret the caller's `YYYY-MM-DD` range and optional entity filters.
pub fn criteria_from_request(request: &ReportRequest) -> Result<FilterCriteria, ReportError> {
    let (from, to) = request.required_dates()?;
    let day = |raw: &str| {
        parse_day(raw).ok_or_else(|| ReportError::InvalidRequest(format!("fecha inválida: {raw}")))
    };
    Ok(FilterCriteria::new(
        day(from)?,
        day(to)?,
        request.atleta_id.clone(),
        request.profesional_id.clone(),
    ))
}

/// Evaluate a single consultation.
pub fn evaluate(record: &RawRecord, criteria: &FilterCriteria) -> Result<FilterDecision, ReportError> {
    if !record.is_object() {
        return Err(ReportError::MalformedRecord(format!(
            "consulta no es un objeto: {}",
            record.as_value()
        )));
    }

    let Some(moment) = resolve_date(record) else {
        return Ok(FilterDecision::KeepUndated);
    };

    if !criteria.contains(moment) {
        return Ok(FilterDecision::Exclude(Exclusion::OutOfRange));
    }

    if let Some(expected) = criteria.athlete_id.as_deref() {
        if resolve_id(record, ATHLETE_FIELDS).as_deref() != Some(expected) {
            return Ok(FilterDecision::Exclude(Exclusion::AthleteMismatch));
        }
    }

    if let Some(expected) = criteria.professional_id.as_deref() {
        if resolve_id(record, PROFESSIONAL_FIELDS).as_deref() != Some(expected) {
            return Ok(FilterDecision::Exclude(Exclusion::ProfessionalMismatch));
        }
    }

    Ok(FilterDecision::Keep)
}

/// Consultations matching `criteria`, in input order.
pub fn filter_consultations(records: &[RawRecord], criteria: &FilterCriteria) -> Vec<RawRecord> {
    records
        .iter()
        .filter(|record| match evaluate(record, criteria) {
            Ok(FilterDecision::KeepUndated) => {
                warn!(consulta = %record.log_id(), "could not determine consultation date, keeping it");
                true
            }
            Ok(decision) => {
                if let FilterDecision::Exclude(reason) = decision {
                    debug!(consulta = %record.log_id(), ?reason, "consultation excluded");
                }
                decision.is_kept()
            }
            Err(err) => {
                warn!(consulta = %record.log_id(), error = %err, "error evaluating consultation, keeping it");
                true
            }
        })
        .cloned()
        .collect()
}

/// Filter with criteria taken from a report request. A range that does not
/// parse disables filtering altogether and the input is returned unchanged.
pub fn filter_for_request(records: &[RawRecord], request: &ReportRequest) -> Vec<RawRecord> {
    match criteria_from_request(request) {
        Ok(criteria) => filter_consultations(records, &criteria),
        Err(err) => {
            warn!(error = %err, "could not parse report dates, returning every consultation");
            records.to_vec()
        }
    }
}
