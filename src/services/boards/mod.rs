//! Per-board request building and response parsing. Boards know nothing
//! about HTTP clients; `BoardScraper` drives them.

pub mod glassdoor;
pub mod indeed;
pub mod linkedin;
pub mod zip_recruiter;

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::domain::{job::JobListing, site::Site};

use super::job_scraper::{ScrapeError, ScrapeRequest};

pub use glassdoor::Glassdoor;
pub use indeed::Indeed;
pub use linkedin::LinkedIn;
pub use zip_recruiter::ZipRecruiter;

pub trait Board: Send + Sync {
    /// Url for the zero-based `page` of results.
    fn page_url(&self, request: &ScrapeRequest, page: u32) -> Result<Url, ScrapeError>;

    /// Listings on one page. An empty vec means the board ran out of results.
    fn parse_page(
        &self,
        body: &str,
        request: &ScrapeRequest,
        today: NaiveDate,
    ) -> Result<Vec<JobListing>, ScrapeError>;
}

pub fn board_for(site: Site) -> &'static dyn Board {
    match site {
        Site::Indeed => &Indeed,
        Site::LinkedIn => &LinkedIn,
        Site::Glassdoor => &Glassdoor,
        Site::ZipRecruiter => &ZipRecruiter,
    }
}

const CHALLENGE_MARKERS: [&str; 5] = [
    "cf-challenge",
    "Just a moment...",
    "captcha-delivery",
    "g-recaptcha",
    "Additional Verification Required",
];

/// Anti-bot interstitials come back as 200s with a challenge page.
pub(crate) fn check_challenge(site: Site, body: &str) -> Result<(), ScrapeError> {
    match CHALLENGE_MARKERS.iter().find(|m| body.contains(*m)) {
        Some(marker) => Err(ScrapeError::Blocked {
            site,
            reason: format!("challenge page ({})", marker),
        }),
        None => Ok(()),
    }
}

pub(crate) fn selector(site: Site, css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse {
        site,
        reason: format!("invalid selector {}: {:?}", css, e),
    })
}

/// Whitespace-collapsed text of the first match under `element`.
pub(crate) fn text_of(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| e.text().join(" ").split_whitespace().join(" "))
        .filter(|t| !t.is_empty())
}

pub(crate) fn attr_of(element: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*(mins?|minutes?|h|hr|hrs|hours?|d|days?|w|weeks?|m|mo|months?)\b")
        .unwrap()
});

/// Turns board ages ("Posted 3 days ago", "24h", "30d+", "Just posted") into a date.
pub(crate) fn parse_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    if lower.contains("just posted") || lower.contains("today") || lower.contains("just now") {
        return Some(today);
    }
    if lower.contains("yesterday") {
        return today.checked_sub_days(Days::new(1));
    }

    let caps = AGE.captures(&lower)?;
    let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();
    let days = match unit.chars().next()? {
        'm' if unit.starts_with("mi") => 0,
        'h' => amount / 24,
        'd' => amount,
        'w' => amount.checked_mul(7)?,
        'm' => amount.checked_mul(30)?,
        _ => return None,
    };
    today.checked_sub_days(Days::new(days))
}

pub(crate) fn absolute_url(site: Site, base: &str, href: &str) -> Result<String, ScrapeError> {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .map_err(|e| ScrapeError::Parse {
            site,
            reason: format!("bad link {}: {}", href, e),
        })
}
