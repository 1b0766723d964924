use chrono::NaiveDate;
use scraper::Html;
use url::Url;

use crate::{
    domain::{
        job::{mentions_remote, JobListing, JobType},
        site::Site,
    },
    services::job_scraper::{ScrapeError, ScrapeRequest},
};

use super::{absolute_url, attr_of, check_challenge, parse_relative_date, selector, text_of, Board};

pub struct Glassdoor;

impl Glassdoor {
    fn base_url(request: &ScrapeRequest) -> Result<String, ScrapeError> {
        request
            .country
            .glassdoor_host
            .map(|host| format!("https://{}", host))
            .ok_or(ScrapeError::UnsupportedCountry {
                site: Site::Glassdoor,
                country: request.country.name,
            })
    }
}

impl Board for Glassdoor {
    fn page_url(&self, request: &ScrapeRequest, page: u32) -> Result<Url, ScrapeError> {
        let base = Glassdoor::base_url(request)?;
        let mut url = Url::parse(&format!("{}/Job/jobs.htm", base)).map_err(|e| ScrapeError::Parse {
            site: Site::Glassdoor,
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sc.keyword", &request.search_term);
            query.append_pair("locKeyword", request.location_or_country());
            if let Some(days) = request.days_old() {
                query.append_pair("fromAge", &days.to_string());
            }
            if request.remote_only {
                query.append_pair("remoteWorkType", "1");
            }
            // Glassdoor pages are one-based.
            query.append_pair("p", &(page + 1).to_string());
        }

        Ok(url)
    }

    fn parse_page(
        &self,
        body: &str,
        request: &ScrapeRequest,
        today: NaiveDate,
    ) -> Result<Vec<JobListing>, ScrapeError> {
        check_challenge(Site::Glassdoor, body)?;

        let card_selector = selector(Site::Glassdoor, r#"li[data-test="jobListing"]"#)?;
        let title_selector = selector(Site::Glassdoor, r#"a[data-test="job-title"]"#)?;
        let company_selector = selector(Site::Glassdoor, r#"[class*="EmployerProfile_compactEmployerName"], [data-test="employer-name"]"#)?;
        let location_selector = selector(Site::Glassdoor, r#"[data-test="emp-location"]"#)?;
        let salary_selector = selector(Site::Glassdoor, r#"[data-test="detailSalary"]"#)?;
        let age_selector = selector(Site::Glassdoor, r#"[data-test="job-age"]"#)?;
        let snippet_selector = selector(Site::Glassdoor, r#"[data-test="descSnippet"]"#)?;

        let base = Glassdoor::base_url(request)?;
        let document = Html::parse_document(body);
        let mut listings = vec![];

        for card in document.select(&card_selector) {
            let Some(title) = text_of(&card, &title_selector) else {
                log::warn!("Skipping Glassdoor card without a title");
                continue;
            };
            let job_url = match attr_of(&card, &title_selector, "href") {
                Some(href) => absolute_url(Site::Glassdoor, &base, &href)?,
                None => {
                    log::warn!("Skipping Glassdoor card without a link: {}", title);
                    continue;
                }
            };

            let description = text_of(&card, &snippet_selector);
            let location = text_of(&card, &location_selector).unwrap_or_default();

            listings.push(JobListing {
                company: text_of(&card, &company_selector).unwrap_or_else(|| "Not specified".to_string()),
                is_remote: request.remote_only || mentions_remote(&location),
                date_posted: text_of(&card, &age_selector).and_then(|a| parse_relative_date(&a, today)),
                salary: text_of(&card, &salary_selector).map(|s| s.trim_end_matches("(Employer est.)").trim().to_string()),
                job_type: JobType::derive(&title, description.as_deref()),
                source: Site::Glassdoor,
                title,
                location,
                description,
                job_url,
            });
        }

        log::info!("Parsed {} Glassdoor listings", listings.len());
        Ok(listings)
    }
}
