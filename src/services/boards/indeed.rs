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

const PAGE_SIZE: u32 = 10;
/// Indeed's "remote" work-setting facet.
const REMOTE_FACET: &str = "0kf:attr(DSQF7);";

pub struct Indeed;

impl Board for Indeed {
    fn page_url(&self, request: &ScrapeRequest, page: u32) -> Result<Url, ScrapeError> {
        let base = format!("{}/jobs", request.country.indeed_base_url());
        let mut url = Url::parse(&base).map_err(|e| ScrapeError::Parse {
            site: Site::Indeed,
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &request.search_term);
            query.append_pair("l", request.location.as_deref().unwrap_or_default());
            query.append_pair("start", &(page * PAGE_SIZE).to_string());
            if let Some(days) = request.days_old() {
                query.append_pair("fromage", &days.to_string());
            }
            if request.remote_only {
                query.append_pair("sc", REMOTE_FACET);
            }
        }

        Ok(url)
    }

    fn parse_page(
        &self,
        body: &str,
        request: &ScrapeRequest,
        today: NaiveDate,
    ) -> Result<Vec<JobListing>, ScrapeError> {
        check_challenge(Site::Indeed, body)?;

        let card_selector = selector(Site::Indeed, "div.job_seen_beacon")?;
        let link_selector = selector(Site::Indeed, "h2.jobTitle a")?;
        let title_selector = selector(Site::Indeed, "h2.jobTitle span[title], h2.jobTitle span")?;
        let company_selector = selector(Site::Indeed, r#"[data-testid="company-name"]"#)?;
        let location_selector = selector(Site::Indeed, r#"[data-testid="text-location"]"#)?;
        let salary_selector = selector(
            Site::Indeed,
            r#"div.salary-snippet-container, [data-testid="attribute_snippet_testid"].salary-snippet-container"#,
        )?;
        let date_selector = selector(Site::Indeed, r#"span.date, [data-testid="myJobsStateDate"]"#)?;
        let snippet_selector = selector(Site::Indeed, "div.job-snippet, ul.jobCardShelfContainer")?;
        let job_type_selector = selector(Site::Indeed, r#"[data-testid="attribute_snippet_testid"]"#)?;

        let base = request.country.indeed_base_url();
        let document = Html::parse_document(body);
        let mut listings = vec![];

        for card in document.select(&card_selector) {
            let Some(title) = text_of(&card, &title_selector) else {
                log::warn!("Skipping Indeed card without a title");
                continue;
            };

            let job_url = match attr_of(&card, &link_selector, "data-jk") {
                Some(jk) => format!("{}/viewjob?jk={}", base, jk),
                None => match attr_of(&card, &link_selector, "href") {
                    Some(href) => absolute_url(Site::Indeed, &base, &href)?,
                    None => {
                        log::warn!("Skipping Indeed card without a link: {}", title);
                        continue;
                    }
                },
            };

            let description = text_of(&card, &snippet_selector);
            let location = text_of(&card, &location_selector).unwrap_or_default();
            let job_type = card
                .select(&job_type_selector)
                .map(|e| JobType::from_board_label(&e.text().collect::<String>()))
                .find(|t| *t != JobType::NotSpecified)
                .unwrap_or_else(|| JobType::derive(&title, description.as_deref()));

            listings.push(JobListing {
                company: text_of(&card, &company_selector).unwrap_or_else(|| "Not specified".to_string()),
                is_remote: request.remote_only || mentions_remote(&location),
                date_posted: text_of(&card, &date_selector).and_then(|d| parse_relative_date(&d, today)),
                salary: text_of(&card, &salary_selector),
                source: Site::Indeed,
                title,
                location,
                description,
                job_url,
                job_type,
            });
        }

        log::info!("Parsed {} Indeed listings", listings.len());
        Ok(listings)
    }
}
