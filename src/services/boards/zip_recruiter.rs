use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use url::Url;

use crate::{
    domain::{
        display::format_salary_range,
        job::{mentions_remote, JobListing, JobType},
        site::Site,
    },
    services::job_scraper::{ScrapeError, ScrapeRequest},
};

use super::{check_challenge, Board};

const API_URL: &str = "https://api.ziprecruiter.com/jobs-app/jobs";
const JOB_URL: &str = "https://www.ziprecruiter.com/jobs//j";

#[derive(Deserialize)]
struct JobsPage {
    #[serde(default)]
    jobs: Vec<ZipJob>,
}

#[derive(Deserialize)]
struct ZipJob {
    name: Option<String>,
    listing_key: Option<String>,
    hiring_company: Option<HiringCompany>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    posted_time: Option<String>,
    employment_type: Option<String>,
    compensation_min: Option<f64>,
    compensation_max: Option<f64>,
    compensation_currency: Option<String>,
    compensation_interval: Option<String>,
}

#[derive(Deserialize)]
struct HiringCompany {
    name: Option<String>,
}

impl ZipJob {
    fn location(&self) -> String {
        [&self.job_city, &self.job_state, &self.job_country]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn date_posted(&self) -> Option<NaiveDate> {
        let posted = self.posted_time.as_deref()?;
        DateTime::parse_from_rfc3339(posted)
            .map(|d| d.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(posted.get(..10)?, "%Y-%m-%d").ok())
    }

    fn into_listing(self, remote_only: bool) -> Option<JobListing> {
        let title = self.name.as_deref()?.trim().to_string();
        let listing_key = self.listing_key.as_deref()?;
        if title.is_empty() || listing_key.is_empty() {
            return None;
        }

        let location = self.location();
        let date_posted = self.date_posted();
        let salary = format_salary_range(
            self.compensation_min,
            self.compensation_max,
            self.compensation_currency.as_deref(),
            self.compensation_interval.as_deref(),
        );
        let description = self
            .job_description
            .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|d| !d.is_empty());
        let job_type = match self.employment_type.as_deref().map(JobType::from_board_label) {
            Some(t) if t != JobType::NotSpecified => t,
            _ => JobType::derive(&title, description.as_deref()),
        };

        Some(JobListing {
            company: self
                .hiring_company
                .and_then(|c| c.name)
                .unwrap_or_else(|| "Not specified".to_string()),
            job_url: format!("{}?lvk={}", JOB_URL, listing_key),
            is_remote: remote_only
                || mentions_remote(&location)
                || mentions_remote(&title),
            source: Site::ZipRecruiter,
            title,
            location,
            date_posted,
            description,
            salary,
            job_type,
        })
    }
}

pub struct ZipRecruiter;

impl Board for ZipRecruiter {
    fn page_url(&self, request: &ScrapeRequest, page: u32) -> Result<Url, ScrapeError> {
        if !request.country.supports_zip_recruiter() {
            return Err(ScrapeError::UnsupportedCountry {
                site: Site::ZipRecruiter,
                country: request.country.name,
            });
        }

        let mut url = Url::parse(API_URL).map_err(|e| ScrapeError::Parse {
            site: Site::ZipRecruiter,
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("search", &request.search_term);
            query.append_pair("location", request.location_or_country());
            if let Some(days) = request.days_old() {
                query.append_pair("days", &days.to_string());
            }
            if request.remote_only {
                query.append_pair("remote", "1");
            }
            query.append_pair("page", &(page + 1).to_string());
        }

        Ok(url)
    }

    fn parse_page(
        &self,
        body: &str,
        request: &ScrapeRequest,
        _today: NaiveDate,
    ) -> Result<Vec<JobListing>, ScrapeError> {
        check_challenge(Site::ZipRecruiter, body)?;

        let page: JobsPage = serde_json::from_str(body).map_err(|e| ScrapeError::Parse {
            site: Site::ZipRecruiter,
            reason: e.to_string(),
        })?;

        let listings: Vec<JobListing> = page
            .jobs
            .into_iter()
            .filter_map(|job| job.into_listing(request.remote_only))
            .collect();

        log::info!("Parsed {} ZipRecruiter listings", listings.len());
        Ok(listings)
    }
}
