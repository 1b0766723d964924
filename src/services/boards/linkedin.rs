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

use super::{attr_of, check_challenge, parse_relative_date, selector, text_of, Board};

const SEARCH_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const PAGE_SIZE: u32 = 25;
/// `f_WT` value for remote work.
const REMOTE_WORK_TYPE: &str = "2";

pub struct LinkedIn;

impl Board for LinkedIn {
    fn page_url(&self, request: &ScrapeRequest, page: u32) -> Result<Url, ScrapeError> {
        let mut url = Url::parse(SEARCH_URL).map_err(|e| ScrapeError::Parse {
            site: Site::LinkedIn,
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("keywords", &request.search_term);
            query.append_pair("location", request.location_or_country());
            query.append_pair("start", &(page * PAGE_SIZE).to_string());
            if let Some(hours) = request.hours_old {
                query.append_pair("f_TPR", &format!("r{}", hours * 3600));
            }
            if request.remote_only {
                query.append_pair("f_WT", REMOTE_WORK_TYPE);
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
        check_challenge(Site::LinkedIn, body)?;

        let card_selector = selector(Site::LinkedIn, "div.base-search-card")?;
        let title_selector = selector(Site::LinkedIn, "h3.base-search-card__title")?;
        let company_selector = selector(Site::LinkedIn, "h4.base-search-card__subtitle")?;
        let location_selector = selector(Site::LinkedIn, "span.job-search-card__location")?;
        let time_selector = selector(Site::LinkedIn, "time")?;
        let salary_selector = selector(Site::LinkedIn, "span.job-search-card__salary-info")?;
        let link_selector = selector(Site::LinkedIn, "a.base-card__full-link")?;

        // Fragments come without <html>; parse_fragment keeps the cards intact.
        let document = Html::parse_fragment(body);
        let mut listings = vec![];

        for card in document.select(&card_selector) {
            let Some(title) = text_of(&card, &title_selector) else {
                log::warn!("Skipping LinkedIn card without a title");
                continue;
            };
            let Some(href) = attr_of(&card, &link_selector, "href") else {
                log::warn!("Skipping LinkedIn card without a link: {}", title);
                continue;
            };
            let job_url = href.split('?').next().unwrap_or(&href).to_string();

            let date_posted = attr_of(&card, &time_selector, "datetime")
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
                .or_else(|| text_of(&card, &time_selector).and_then(|t| parse_relative_date(&t, today)));
            let location = text_of(&card, &location_selector).unwrap_or_default();

            listings.push(JobListing {
                company: text_of(&card, &company_selector).unwrap_or_else(|| "Not specified".to_string()),
                is_remote: request.remote_only || mentions_remote(&location),
                salary: text_of(&card, &salary_selector),
                job_type: JobType::derive(&title, None),
                // The guest search API only returns cards; descriptions live on the job page.
                description: None,
                source: Site::LinkedIn,
                title,
                location,
                date_posted,
                job_url,
            });
        }

        log::info!("Parsed {} LinkedIn listings", listings.len());
        Ok(listings)
    }
}
