//! HTTP client for the TCE-CE municipal accountability portal.

use std::time::Duration;

use url::Url;

use crate::{FetchError, ReportCode};

/// Base of the per-entity report pages on the public portal.
pub const DEFAULT_BASE_URL: &str =
    "https://municipios-transparencia.tce.ce.gov.br/index.php/municipios/prestacao/mun";

const USER_AGENT: &str = "Mozilla/5.0 (Extracao TCE; +contato)";
const ACCEPT: &str = "text/html,application/xhtml+xml";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches report pages, one GET per (entity, year).
///
/// Every request carries the same identifying `User-Agent` and `Accept`
/// headers. Pacing between requests is the caller's job.
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReportClient {
    /// Creates a client pointing at the production portal.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/{code:03}/versao/{year}`
    pub fn report_url(&self, code: ReportCode, year: i32) -> Result<Url, FetchError> {
        let raw = format!("{}/{}/versao/{}", self.base_url, code, year);
        Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            FetchError::InvalidUrl(format!("{}: {}", raw, e))
        })
    }

    /// Fetches the report page for one entity and year and returns the body.
    ///
    /// Non-2xx responses come back as [`FetchError::HttpStatus`]; transport
    /// failures as [`FetchError::Network`].
    pub async fn fetch_report(&self, code: ReportCode, year: i32) -> Result<String, FetchError> {
        let url = self.report_url(code, year)?;
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header("accept", ACCEPT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Report {} / {} failed with status {}", code, year, status);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}
