//! Blocking HTTP access to the records service.

use std::time::Duration;

use consultas_core::{RawRecord, ReportError, UpstreamConfig};
use tracing::{error, info};

/// Listings exposed by the records service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Consultations,
    Athletes,
    Professionals,
}

/// Where raw records come from. Implemented over HTTP by [`RecordsClient`].
pub trait RecordsSource {
    fn fetch(
        &self,
        listing: Listing,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, ReportError>;
}

/// HTTP client for the records service.
pub struct RecordsClient {
    config: UpstreamConfig,
    client: reqwest::blocking::Client,
}

impl RecordsClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ReportError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| ReportError::Internal(format!("No se pudo crear el cliente HTTP: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, listing: Listing) -> String {
        match listing {
            Listing::Consultations => self.config.consultations_url(),
            Listing::Athletes => self.config.athletes_url(),
            Listing::Professionals => self.config.professionals_url(),
        }
    }
}

impl RecordsSource for RecordsClient {
    fn fetch(
        &self,
        listing: Listing,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, ReportError> {
        let url = self.url(listing);
        info!(%url, ?params, "fetching listing");

        let response = self
            .client
            .get(&url)
            .query(params)
            .timeout(timeout)
            .send()
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("{url}: sin respuesta tras {}s", timeout.as_secs())
                } else {
                    format!("{url}: {e}")
                };
                error!(%detail, "records service unreachable");
                ReportError::UpstreamUnavailable(detail)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = format!("{url} respondió con estado {}", status.as_u16());
            error!(%detail, "records service returned an error status");
            return Err(ReportError::UpstreamUnavailable(detail));
        }

        let records: Vec<RawRecord> = response.json().map_err(|e| {
            ReportError::UpstreamUnavailable(format!("{url}: respuesta ilegible: {e}"))
        })?;
        info!(%url, total = records.len(), "listing fetched");
        Ok(records)
    }
}
