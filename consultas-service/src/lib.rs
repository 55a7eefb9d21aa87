//! Request-level operations: fetch from the records service, run the
//! pipeline, and hand the result to the caller or the PDF renderer.

mod client;

pub use client::{Listing, RecordsClient, RecordsSource};

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use consultas_core::{
    ConsultationStatistics, ErrorBody, FilterOptions, RawRecord, ReportError, ReportRequest,
    UpstreamConfig,
};
use consultas_records::{assemble_report, build_index, compute_statistics, filter_options};
use tracing::{error, info};

/// A rendered report ready to be returned as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The three report operations over a records source.
pub struct ReportService<S> {
    source: S,
    timeout: Duration,
    options_timeout: Duration,
}

impl ReportService<RecordsClient> {
    /// Service backed by the HTTP records client.
    pub fn connect(config: UpstreamConfig) -> Result<Self, ReportError> {
        let client = RecordsClient::new(config.clone())?;
        Ok(Self::new(client, &config))
    }
}

impl<S: RecordsSource> ReportService<S> {
    pub fn new(source: S, config: &UpstreamConfig) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(config.timeout_secs),
            options_timeout: Duration::from_secs(config.options_timeout_secs),
        }
    }

    /// Statistics over the whole consultation history.
    pub fn statistics(&self, today: NaiveDate) -> Result<ConsultationStatistics, ReportError> {
        let consultations = self.fetch(Listing::Consultations, &[])?;
        let professionals = build_index(&self.fetch(Listing::Professionals, &[])?);
        let athletes = build_index(&self.fetch(Listing::Athletes, &[])?);
        Ok(compute_statistics(
            &consultations,
            &athletes,
            &professionals,
            today,
        ))
    }

    /// Filtered, enriched consultations rendered as a PDF.
    pub fn report(
        &self,
        request: &ReportRequest,
        generated_at: NaiveDateTime,
    ) -> Result<RenderedReport, ReportError> {
        info!(?request, "generating consultation report");
        let (from, to) = request.required_dates()?;

        let mut params = vec![
            ("fecha_inicio", from.to_string()),
            ("fecha_fin", to.to_string()),
        ];
        if let Some(athlete) = request.athlete_filter() {
            params.push(("atleta_id", athlete.to_string()));
        }
        if let Some(professional) = request.professional_filter() {
            params.push(("profesional_id", professional.to_string()));
        }

        let consultations = self.fetch(Listing::Consultations, &params)?;
        let athletes = self.fetch(Listing::Athletes, &[])?;
        let professionals = self.fetch(Listing::Professionals, &[])?;

        let data = assemble_report(
            &consultations,
            &athletes,
            &professionals,
            request,
            generated_at,
        )?;
        let bytes = consultas_pdf::render_report(&data)?;
        info!(filename = %data.filename, filas = data.total, "report generated");

        Ok(RenderedReport {
            filename: data.filename,
            content_type: "application/pdf",
            bytes,
        })
    }

    /// Athlete and professional choices for the report form.
    pub fn filter_options(&self) -> Result<FilterOptions, ReportError> {
        let athletes = self.fetch_with(Listing::Athletes, &[], self.options_timeout)?;
        let professionals = self.fetch_with(Listing::Professionals, &[], self.options_timeout)?;
        Ok(filter_options(&athletes, &professionals))
    }

    fn fetch(
        &self,
        listing: Listing,
        params: &[(&str, String)],
    ) -> Result<Vec<RawRecord>, ReportError> {
        self.fetch_with(listing, params, self.timeout)
    }

    fn fetch_with(
        &self,
        listing: Listing,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, ReportError> {
        self.source.fetch(listing, params, timeout)
    }
}

/// Status code and body for a failed operation.
pub fn error_response(err: &ReportError) -> (u16, ErrorBody) {
    let status = err.status_code();
    if status >= 500 {
        error!(status, error = %err, "report operation failed");
    }
    (status, ErrorBody::from(err))
}
