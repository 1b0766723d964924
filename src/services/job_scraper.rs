use async_trait::async_trait;

use crate::domain::{country::Country, job::JobListing, site::Site};

/// One board, one market.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    pub site: Site,
    pub search_term: String,
    pub location: Option<String>,
    pub country: &'static Country,
    pub results_wanted: u32,
    pub hours_old: Option<u32>,
    pub remote_only: bool,
}

impl ScrapeRequest {
    /// Free-text location sent to boards that search by place rather than by
    /// country domain.
    pub fn location_or_country(&self) -> &str {
        self.location.as_deref().unwrap_or(self.country.name)
    }

    pub fn days_old(&self) -> Option<u32> {
        self.hours_old.map(|h| h.div_ceil(24))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Could not reach {site}: {source}")]
    Network {
        site: Site,
        #[source]
        source: reqwest::Error,
    },
    #[error("{site} blocked the request: {reason}")]
    Blocked { site: Site, reason: String },
    #[error("{site} answered with HTTP {status}")]
    Status { site: Site, status: u16 },
    #[error("Could not read the {site} response: {reason}")]
    Parse { site: Site, reason: String },
    #[error("{site} does not serve {country}")]
    UnsupportedCountry { site: Site, country: &'static str },
    #[error("{site} is paused after repeated failures, retrying in {retry_in_secs}s")]
    CircuitOpen { site: Site, retry_in_secs: u64 },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScrapeError {
    pub fn site(&self) -> Option<Site> {
        match self {
            ScrapeError::Network { site, .. }
            | ScrapeError::Blocked { site, .. }
            | ScrapeError::Status { site, .. }
            | ScrapeError::Parse { site, .. }
            | ScrapeError::UnsupportedCountry { site, .. }
            | ScrapeError::CircuitOpen { site, .. } => Some(*site),
            ScrapeError::Client(_) => None,
        }
    }

    /// Whether the board itself misbehaved, as opposed to the request never
    /// being sent.
    pub fn is_board_failure(&self) -> bool {
        matches!(
            self,
            ScrapeError::Network { .. }
                | ScrapeError::Blocked { .. }
                | ScrapeError::Status { .. }
                | ScrapeError::Parse { .. }
        )
    }

    /// Text for the dashboard. Transport details stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            ScrapeError::Network { site, source } if source.is_timeout() => {
                format!("{} took too long to answer. Please try again.", site.display_name())
            }
            ScrapeError::Network { site, .. } => format!(
                "Could not connect to {}. Check your internet connection and try again.",
                site.display_name()
            ),
            ScrapeError::Blocked { site, .. } => format!(
                "{} is limiting requests right now. Wait a few minutes and try again.",
                site.display_name()
            ),
            ScrapeError::Status { site, status } => format!(
                "{} is having trouble (HTTP {}). Try again later.",
                site.display_name(),
                status
            ),
            ScrapeError::Parse { site, .. } => format!(
                "{} returned a page we could not read. Try again later.",
                site.display_name()
            ),
            ScrapeError::UnsupportedCountry { site, country } => {
                format!("{} does not list jobs in {}.", site.display_name(), country)
            }
            ScrapeError::CircuitOpen { site, retry_in_secs } => format!(
                "{} is paused after repeated failures. Try again in {} minute(s).",
                site.display_name(),
                retry_in_secs.div_ceil(60)
            ),
            ScrapeError::Client(_) => "The search could not be started. Please try again.".to_string(),
        }
    }
}

/// The scrape collaborator: turns one request into listings from one board.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<JobListing>, ScrapeError>;

    /// Whether the board can be asked about this market at all.
    fn supports(&self, site: Site, country: &Country) -> bool {
        match site {
            Site::Indeed | Site::LinkedIn => true,
            Site::Glassdoor => country.glassdoor_host.is_some(),
            Site::ZipRecruiter => country.supports_zip_recruiter(),
        }
    }
}
