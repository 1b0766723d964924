use std::{cmp::Ordering, sync::LazyLock};

use chrono::NaiveDate;
use itertools::Itertools;
use regex::Regex;

use super::job::{JobListing, JobType};

pub const NOT_AVAILABLE: &str = "N/A";
pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Amounts below this are taken to be hourly rates.
const HOURLY_THRESHOLD: f64 = 1000.0;
const HOURS_PER_YEAR: f64 = 40.0 * 52.0;

/// An amount with an optional thousands suffix: "85,000", "42.50", "140K".
static SALARY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:,\d{3})*(?:\.\d+)?)\s?([kK]\b)?").unwrap());

pub fn format_posted_date(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return NOT_AVAILABLE.to_string();
    };

    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        days @ 2..=6 => format!("{} days ago", days),
        _ => date.format("%b %d, %Y").to_string(),
    }
}

pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Renders a structured salary the way boards that only send numbers are shown:
/// `USD 80,000 - 120,000 (yearly)`.
pub fn format_salary_range(
    min: Option<f64>,
    max: Option<f64>,
    currency: Option<&str>,
    interval: Option<&str>,
) -> Option<String> {
    let currency = currency.filter(|c| !c.is_empty()).unwrap_or("USD");
    let interval = interval
        .filter(|i| !i.is_empty())
        .map(|i| format!(" ({})", i.to_lowercase()))
        .unwrap_or_default();
    let fmt = |v: f64| group_thousands(v.round() as u64);

    match (min.filter(|v| *v > 0.0), max.filter(|v| *v > 0.0)) {
        (Some(min), Some(max)) => Some(format!("{} {} - {}{}", currency, fmt(min), fmt(max), interval)),
        (Some(min), None) => Some(format!("{} {}+{}", currency, fmt(min), interval)),
        (None, Some(max)) => Some(format!("Up to {} {}{}", currency, fmt(max), interval)),
        (None, None) => None,
    }
}

/// Every amount mentioned in a free-form salary, annualized.
pub fn annual_salary_amounts(salary: &str) -> Vec<f64> {
    SALARY_NUMBER
        .captures_iter(salary)
        .filter_map(|caps| {
            let amount = caps.get(1)?.as_str().replace(',', "").parse::<f64>().ok()?;
            Some(match caps.get(2) {
                Some(_) => amount * 1000.0,
                None => amount,
            })
        })
        .map(|v| match v < HOURLY_THRESHOLD {
            true => v * HOURS_PER_YEAR,
            false => v,
        })
        .collect()
}

/// Highest annualized amount; 0 when the salary is missing or has no numbers.
pub fn salary_sort_key(salary: Option<&str>) -> f64 {
    salary
        .map(annual_salary_amounts)
        .and_then(|amounts| amounts.into_iter().reduce(f64::max))
        .unwrap_or(0.0)
}

pub fn truncate_description(description: &str, max_chars: usize) -> String {
    let collapsed = description.split_whitespace().join(" ");
    match collapsed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", collapsed[..idx].trim_end()),
        None => collapsed,
    }
}

/// Salary descending, then newest first. Listings without a date sort last.
pub fn sort_for_display(listings: &mut [&JobListing]) {
    listings.sort_by(|a, b| {
        salary_sort_key(b.salary.as_deref())
            .partial_cmp(&salary_sort_key(a.salary.as_deref()))
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (a.date_posted, b.date_posted) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryRange {
    UpTo50k,
    From50kTo100k,
    From100kTo150k,
    Above150k,
}

impl SalaryRange {
    pub const ALL: [SalaryRange; 4] = [
        SalaryRange::UpTo50k,
        SalaryRange::From50kTo100k,
        SalaryRange::From100kTo150k,
        SalaryRange::Above150k,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SalaryRange::UpTo50k => "0-50k",
            SalaryRange::From50kTo100k => "50k-100k",
            SalaryRange::From100kTo150k => "100k-150k",
            SalaryRange::Above150k => "150k+",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalaryRange::UpTo50k => "$0-50k",
            SalaryRange::From50kTo100k => "$50k-100k",
            SalaryRange::From100kTo150k => "$100k-150k",
            SalaryRange::Above150k => "$150k+",
        }
    }

    pub fn parse(key: &str) -> Option<SalaryRange> {
        SalaryRange::ALL.into_iter().find(|r| r.key() == key)
    }

    fn bounds(&self) -> (f64, f64) {
        match self {
            SalaryRange::UpTo50k => (0.0, 50_000.0),
            SalaryRange::From50kTo100k => (50_000.0, 100_000.0),
            SalaryRange::From100kTo150k => (100_000.0, 150_000.0),
            SalaryRange::Above150k => (150_000.0, f64::INFINITY),
        }
    }

    /// True when any amount in the salary falls inside the range.
    pub fn contains(&self, salary: Option<&str>) -> bool {
        let (low, high) = self.bounds();
        salary
            .map(annual_salary_amounts)
            .unwrap_or_default()
            .into_iter()
            .any(|v| low <= v && v <= high)
    }
}

/// Post-filters over stored results; applying them never re-scrapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFilters {
    pub title_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub salary_range: Option<SalaryRange>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
}

impl ResultFilters {
    pub fn new(
        title: Option<&str>,
        exclude: Option<&str>,
        salary_range: Option<&str>,
        location: Option<&str>,
        job_type: Option<&str>,
    ) -> Self {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        ResultFilters {
            title_keywords: non_empty(title)
                .map(|t| t.split_whitespace().map(str::to_lowercase).collect())
                .unwrap_or_default(),
            exclude_keywords: non_empty(exclude)
                .map(|e| {
                    e.split(',')
                        .map(|k| k.trim().to_lowercase())
                        .filter(|k| !k.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            salary_range: non_empty(salary_range).and_then(SalaryRange::parse),
            location: non_empty(location).map(str::to_string),
            job_type: non_empty(job_type).and_then(JobType::from_label),
        }
    }

    pub fn is_active(&self) -> bool {
        *self != ResultFilters::default()
    }

    pub fn matches(&self, listing: &JobListing) -> bool {
        let title = listing.title.to_lowercase();
        let description = listing.description.as_deref().unwrap_or_default().to_lowercase();

        self.title_keywords.iter().all(|k| title.contains(k))
            && !self
                .exclude_keywords
                .iter()
                .any(|k| title.contains(k) || description.contains(k))
            && self
                .salary_range
                .map_or(true, |r| r.contains(listing.salary.as_deref()))
            && self
                .location
                .as_deref()
                .map_or(true, |l| listing.location == l)
            && self.job_type.map_or(true, |t| listing.job_type == t)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::{
        job::{JobListing, JobType},
        site::Site,
    };

    use super::*;

    fn listing(title: &str, salary: Option<&str>, date: Option<NaiveDate>) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Berlin, Germany".to_string(),
            date_posted: date,
            description: Some("Build things with Rust".to_string()),
            salary: salary.map(str::to_string),
            job_url: format!("https://example.com/{}", title),
            source: Site::Indeed,
            job_type: JobType::FullTime,
            is_remote: false,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn posted_dates() {
        let today = day(23);
        assert_eq!(format_posted_date(None, today), "N/A");
        assert_eq!(format_posted_date(Some(day(23)), today), "Today");
        assert_eq!(format_posted_date(Some(day(22)), today), "1 day ago");
        assert_eq!(format_posted_date(Some(day(20)), today), "3 days ago");
        assert_eq!(format_posted_date(Some(day(1)), today), "Aug 01, 2025");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(120000), "120,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn salary_ranges_are_formatted() {
        assert_eq!(
            format_salary_range(Some(80000.0), Some(120000.0), None, Some("YEARLY")).as_deref(),
            Some("USD 80,000 - 120,000 (yearly)")
        );
        assert_eq!(
            format_salary_range(None, Some(60.0), Some("EUR"), None).as_deref(),
            Some("Up to EUR 60")
        );
        assert_eq!(format_salary_range(None, None, None, None), None);
    }

    #[test]
    fn hourly_salaries_are_annualized() {
        assert_eq!(salary_sort_key(Some("$50 - $60 an hour")), 60.0 * 2080.0);
        assert_eq!(salary_sort_key(Some("$80,000 - $120,000 a year")), 120_000.0);
        assert_eq!(salary_sort_key(Some("Competitive")), 0.0);
        assert_eq!(salary_sort_key(None), 0.0);
    }

    #[test]
    fn thousands_suffix_is_expanded() {
        assert_eq!(salary_sort_key(Some("$140K - $170K")), 170_000.0);
        assert_eq!(salary_sort_key(Some("$95k+")), 95_000.0);
        assert_eq!(annual_salary_amounts("$120 K - $140 K"), vec![120_000.0, 140_000.0]);
        assert!(salary_sort_key(Some("$200,000 - $250,000")) > salary_sort_key(Some("$140K - $170K")));
    }

    #[test]
    fn salary_ranges_understand_thousands_suffix() {
        assert!(SalaryRange::From100kTo150k.contains(Some("$140K - $170K")));
        assert!(SalaryRange::Above150k.contains(Some("$140K - $170K")));
        assert!(!SalaryRange::Above150k.contains(Some("$120K - $140K")));
        assert!(!SalaryRange::UpTo50k.contains(Some("$120K - $140K")));
    }

    #[test]
    fn k_salaries_sort_among_full_amounts() {
        let a = listing("a", Some("$140K - $170K"), Some(day(20)));
        let b = listing("b", Some("$200,000 - $250,000"), Some(day(20)));
        let c = listing("c", Some("$45 an hour"), Some(day(20)));
        let mut rows = vec![&c, &a, &b];
        sort_for_display(&mut rows);
        assert_eq!(rows.iter().map(|l| l.title.as_str()).collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn sorts_by_salary_then_date() {
        let a = listing("a", Some("$90,000"), Some(day(1)));
        let b = listing("b", Some("$150,000"), Some(day(2)));
        let c = listing("c", None, Some(day(20)));
        let d = listing("d", None, None);
        let e = listing("e", None, Some(day(21)));
        let mut listings = vec![&a, &b, &c, &d, &e];
        sort_for_display(&mut listings);
        let order: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "e", "c", "d"]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_description("short  text", 200), "short text");
        assert_eq!(truncate_description("héllo wörld", 5), "héllo…");
    }

    #[test]
    fn filters_combine() {
        let senior = listing("Senior Rust Engineer", Some("$130,000"), None);
        let mut manager = listing("Engineering Manager", Some("$160,000"), None);
        manager.job_type = JobType::Contract;

        let filters = ResultFilters::new(Some("engineer"), Some("manager"), None, None, None);
        assert!(filters.matches(&senior));
        assert!(!filters.matches(&manager));

        let filters = ResultFilters::new(None, None, Some("100k-150k"), None, None);
        assert!(filters.matches(&senior));
        assert!(!filters.matches(&manager));

        let filters = ResultFilters::new(None, None, None, None, Some("Contract"));
        assert!(!filters.matches(&senior));
        assert!(filters.matches(&manager));

        let filters = ResultFilters::new(None, None, None, Some("Berlin, Germany"), None);
        assert!(filters.matches(&senior));
    }

    #[test]
    fn blank_filters_are_inactive() {
        let filters = ResultFilters::new(Some(" "), Some(""), Some("bogus"), None, Some(""));
        assert!(!filters.is_active());
    }
}
