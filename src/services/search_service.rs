use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use futures_util::future::join_all;
use moka::sync::Cache;

use crate::{
    configuration::CacheSettings,
    domain::{
        job::JobListing,
        remote::is_legitimate_remote,
        search::{SearchForm, SearchParams, ValidationError},
        site::Site,
    },
};

use super::{
    job_scraper::{JobScraper, ScrapeError, ScrapeRequest},
    session_store::SessionState,
};

/// One completed search, shared between the cache and every session that
/// ran it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub params: SearchParams,
    pub listings: Arc<[JobListing]>,
    pub elapsed: Duration,
    pub countries_searched: Vec<&'static str>,
    /// Requests that failed while others succeeded.
    pub failed_requests: usize,
}

#[derive(Debug)]
pub enum SearchOutcome {
    Rejected(ValidationError),
    Results(usize),
    Empty,
    Failed(ScrapeError),
}

pub struct SearchService {
    scraper: Arc<dyn JobScraper>,
    cache: Cache<String, SearchResults>,
    default_results_wanted: u32,
}

impl SearchService {
    pub fn new(scraper: Arc<dyn JobScraper>, cache: &CacheSettings, default_results_wanted: u32) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache.capacity)
            .time_to_live(Duration::from_secs(cache.ttl_secs))
            .build();

        SearchService {
            scraper,
            cache,
            default_results_wanted,
        }
    }

    pub fn default_results_wanted(&self) -> u32 {
        self.default_results_wanted
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResults, ScrapeError> {
        let started = Instant::now();
        let key = params.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            log::info!("Serving {} cached listings for {:?}", cached.listings.len(), key);
            // Keys ignore case, so echo this request's parameters.
            return Ok(SearchResults {
                params: params.clone(),
                elapsed: started.elapsed(),
                ..cached
            });
        }

        let search_term = params.effective_search_term();
        let countries = params.country.targets(params.location.as_deref());

        let requests: Vec<ScrapeRequest> = params
            .sites
            .iter()
            .flat_map(|&site| countries.iter().map(move |&country| (site, country)))
            .filter(|&(site, country)| {
                let supported = self.scraper.supports(site, country);
                if !supported {
                    log::info!("Skipping {} for {}, not served", site, country.name);
                }
                supported
            })
            .map(|(site, country)| ScrapeRequest {
                site,
                search_term: search_term.clone(),
                location: params.location.clone(),
                country,
                results_wanted: params.results_wanted,
                hours_old: params.time_filter.hours(),
                remote_only: params.remote_only,
            })
            .collect();

        let outcomes = join_all(requests.iter().map(|r| self.scraper.scrape(r))).await;

        let mut listings: Vec<JobListing> = vec![];
        let mut seen = HashSet::new();
        let mut per_site: HashMap<Site, u32> = HashMap::new();
        let mut succeeded = 0;
        let mut failures: Vec<ScrapeError> = vec![];

        // Request order, not completion order.
        for (request, outcome) in requests.iter().zip(outcomes) {
            match outcome {
                Ok(found) => {
                    succeeded += 1;
                    let taken = per_site.entry(request.site).or_default();
                    for listing in found {
                        if *taken >= params.results_wanted {
                            break;
                        }
                        if seen.insert(listing.job_url.clone()) {
                            *taken += 1;
                            listings.push(listing);
                        }
                    }
                }
                Err(e) => {
                    log::error!("Scrape of {} in {} failed: {}", request.site, request.country.name, e);
                    failures.push(e);
                }
            }
        }

        if succeeded == 0 && !failures.is_empty() {
            return Err(failures.swap_remove(0));
        }

        if params.remote_only {
            let before = listings.len();
            listings.retain(is_legitimate_remote);
            log::info!(
                "Remote filter kept {} of {} listings",
                listings.len(),
                before
            );
        }

        let results = SearchResults {
            params: params.clone(),
            listings: listings.into(),
            elapsed: started.elapsed(),
            countries_searched: countries.iter().map(|c| c.name).collect(),
            failed_requests: failures.len(),
        };

        if results.failed_requests == 0 {
            self.cache.insert(key, results.clone());
        }

        log::info!(
            "Search for {:?} returned {} listings in {:.1}s",
            params.search_term,
            results.listings.len(),
            results.elapsed.as_secs_f64()
        );
        Ok(results)
    }
}

/// Validates the form, runs the search and folds the outcome into the
/// session. Rejected and failed searches hand the state back untouched.
pub async fn run_search(
    state: SessionState,
    form: &SearchForm,
    service: &SearchService,
) -> (SessionState, SearchOutcome) {
    let params = match form.parse(service.default_results_wanted()) {
        Ok(params) => params,
        Err(e) => {
            log::warn!("Rejected search: {}", e);
            return (state, SearchOutcome::Rejected(e));
        }
    };

    match service.search(&params).await {
        Ok(results) => {
            let outcome = match results.listings.len() {
                0 => SearchOutcome::Empty,
                n => SearchOutcome::Results(n),
            };
            let state = SessionState {
                last_params: Some(params),
                results: Some(results),
            };
            (state, outcome)
        }
        Err(e) => (state, SearchOutcome::Failed(e)),
    }
}
