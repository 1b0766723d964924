use std::collections::HashSet;

use async_trait::async_trait;

use crate::{configuration::ScraperSettings, domain::job::JobListing};

use super::{
    boards::board_for,
    circuit_breaker::CircuitBreaker,
    job_scraper::{JobScraper, ScrapeError, ScrapeRequest},
    page_fetcher::{HttpFetcher, PageFetcher},
    rate_limiter::RateLimiter,
};

/// Scrapes the public job boards one page at a time.
pub struct BoardScraper {
    fetcher: Box<dyn PageFetcher>,
    max_pages: u32,
    limiter: RateLimiter,
    breaker: CircuitBreaker,
}

impl BoardScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        Ok(BoardScraper::with_fetcher(Box::new(HttpFetcher::new(settings)?), settings))
    }

    pub fn with_fetcher(fetcher: Box<dyn PageFetcher>, settings: &ScraperSettings) -> Self {
        BoardScraper {
            fetcher,
            max_pages: settings.max_pages.max(1),
            limiter: RateLimiter::new(settings.min_delay()),
            breaker: CircuitBreaker::new(settings.breaker_failure_threshold, settings.breaker_cooldown()),
        }
    }

    async fn scrape_pages(&self, request: &ScrapeRequest) -> Result<Vec<JobListing>, ScrapeError> {
        let board = board_for(request.site);
        let wanted = request.results_wanted as usize;
        let today = chrono::Local::now().date_naive();

        let mut listings: Vec<JobListing> = vec![];
        let mut seen = HashSet::new();

        for page in 0..self.max_pages {
            let url = board.page_url(request, page)?;
            self.limiter.acquire(request.site).await;
            let page_listings = match self.fetcher.fetch(request.site, url).await {
                Ok(body) => board.parse_page(&body, request, today),
                Err(e) => Err(e),
            };

            let page_listings = match page_listings {
                Ok(page_listings) => page_listings,
                // Later pages failing still leaves usable results.
                Err(e) if !listings.is_empty() => {
                    log::warn!(
                        "Stopping {} at page {} with {} listings: {}",
                        request.site,
                        page,
                        listings.len(),
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            let before = listings.len();
            listings.extend(
                page_listings
                    .into_iter()
                    .filter(|l| seen.insert(l.job_url.clone())),
            );

            if listings.len() >= wanted || listings.len() == before {
                break;
            }
        }

        listings.truncate(wanted);
        Ok(listings)
    }
}

#[async_trait]
impl JobScraper for BoardScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<JobListing>, ScrapeError> {
        self.breaker.allow(request.site)?;

        match self.scrape_pages(request).await {
            Ok(listings) => {
                self.breaker.record_success(request.site);
                log::info!(
                    "Scraped {} listings from {} in {}",
                    listings.len(),
                    request.site,
                    request.country.name
                );
                Ok(listings)
            }
            Err(e) => {
                if e.is_board_failure() {
                    self.breaker.record_failure(request.site);
                }
                Err(e)
            }
        }
    }
}
