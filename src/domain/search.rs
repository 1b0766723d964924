use itertools::Itertools;

use super::{
    country::Where,
    remote::enhance_search_term_with_remote_keywords,
    site::{Site, UnknownSite},
    time_filter::TimeFilter,
};

pub const MAX_RESULTS_WANTED: u32 = 1000;
pub const DEFAULT_SEARCH_TERM: &str = "Software Engineer";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a search term")]
    EmptySearchTerm,
    #[error("Please select at least one job site")]
    NoSites,
    #[error(transparent)]
    UnknownSite(#[from] UnknownSite),
    #[error("Unsupported country: {0}")]
    UnknownCountry(String),
    #[error("Result count must be a number between 1 and 1000, got {0:?}")]
    InvalidResultCount(String),
    #[error("Unknown job posting age: {0}")]
    UnknownTimeFilter(String),
}

/// Raw values of the search form, exactly as the browser sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchForm {
    pub search_term: String,
    pub location: String,
    pub country: String,
    pub sites: Vec<String>,
    pub results_wanted: String,
    pub time_filter: String,
    pub remote_only: bool,
}

impl SearchForm {
    /// Builds the form from url-encoded pairs; `site` may repeat.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = SearchForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "search_term" => form.search_term = value,
                "location" => form.location = value,
                "country" => form.country = value,
                "site" => form.sites.push(value),
                "results_wanted" => form.results_wanted = value,
                "time_filter" => form.time_filter = value,
                "remote_only" => form.remote_only = matches!(value.as_str(), "on" | "true" | "1"),
                _ => log::debug!("Ignoring unknown search form field: {}", key),
            }
        }
        form
    }

    pub fn parse(&self, default_results_wanted: u32) -> Result<SearchParams, ValidationError> {
        let search_term = self.search_term.trim();
        if search_term.is_empty() {
            return Err(ValidationError::EmptySearchTerm);
        }

        let sites: Vec<Site> = self
            .sites
            .iter()
            .map(|s| s.parse::<Site>())
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unique()
            .collect();
        if sites.is_empty() {
            return Err(ValidationError::NoSites);
        }

        let country = Where::parse(&self.country)
            .ok_or_else(|| ValidationError::UnknownCountry(self.country.clone()))?;

        let results_wanted = match self.results_wanted.trim() {
            "" => default_results_wanted,
            raw => raw
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_RESULTS_WANTED).contains(n))
                .ok_or_else(|| ValidationError::InvalidResultCount(raw.to_string()))?,
        };

        let time_filter = TimeFilter::parse(&self.time_filter)
            .ok_or_else(|| ValidationError::UnknownTimeFilter(self.time_filter.clone()))?;

        let location = Some(self.location.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(SearchParams {
            search_term: search_term.to_string(),
            location,
            country,
            sites,
            results_wanted,
            time_filter,
            remote_only: self.remote_only,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub search_term: String,
    pub location: Option<String>,
    pub country: Where,
    pub sites: Vec<Site>,
    pub results_wanted: u32,
    pub time_filter: TimeFilter,
    pub remote_only: bool,
}

impl SearchParams {
    /// The query actually sent to the boards.
    pub fn effective_search_term(&self) -> String {
        match self.remote_only {
            true => enhance_search_term_with_remote_keywords(&self.search_term),
            false => self.search_term.clone(),
        }
    }

    /// Normalized identity of the search, used to key cached results.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.search_term.to_lowercase(),
            self.location.as_deref().unwrap_or_default().to_lowercase(),
            self.country.label(),
            self.sites.iter().sorted().map(Site::tag).join(","),
            self.results_wanted,
            self.time_filter.label(),
            self.remote_only,
        )
    }

    pub fn to_form(&self) -> SearchForm {
        SearchForm {
            search_term: self.search_term.clone(),
            location: self.location.clone().unwrap_or_default(),
            country: self.country.label().to_string(),
            sites: self.sites.iter().map(|s| s.tag().to_string()).collect(),
            results_wanted: self.results_wanted.to_string(),
            time_filter: self.time_filter.label().to_string(),
            remote_only: self.remote_only,
        }
    }
}
