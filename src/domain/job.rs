use std::{fmt, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::site::Site;

/// One scraped job posting. Listings are shared read-only once a scraper
/// returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: Option<NaiveDate>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub job_url: String,
    pub source: Site,
    pub job_type: JobType,
    pub is_remote: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
    NotSpecified,
}

static PART_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(part[\s-]?time|hourly)\b").unwrap());
static CONTRACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(contract|contractor|freelance|consulting|temporary|temp)\b").unwrap()
});
static INTERNSHIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(intern|internship|co-op|trainee)\b").unwrap());
static REMOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(remote|work from home|wfh)\b").unwrap());

impl JobType {
    pub const ALL: [JobType; 6] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
        JobType::Temporary,
        JobType::NotSpecified,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
            JobType::Temporary => "Temporary",
            JobType::NotSpecified => "Not specified",
        }
    }

    /// Maps the labels boards attach to postings ("fulltime", "FULL_TIME",
    /// "Contractor", ...). Unknown labels become `NotSpecified`.
    pub fn from_board_label(label: &str) -> JobType {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "fulltime" | "permanent" => JobType::FullTime,
            "parttime" => JobType::PartTime,
            "contract" | "contractor" | "freelance" => JobType::Contract,
            "internship" | "intern" => JobType::Internship,
            "temporary" | "temp" | "seasonal" => JobType::Temporary,
            _ => JobType::NotSpecified,
        }
    }

    pub fn from_label(label: &str) -> Option<JobType> {
        JobType::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Guesses the type from free text when the board does not supply one.
    /// Part-time beats contract beats internship; anything else is full-time.
    pub fn derive(title: &str, description: Option<&str>) -> JobType {
        let text = format!("{} {}", title, description.unwrap_or_default());

        if PART_TIME.is_match(&text) {
            JobType::PartTime
        } else if CONTRACT.is_match(&text) {
            JobType::Contract
        } else if INTERNSHIP.is_match(&text) {
            JobType::Internship
        } else {
            JobType::FullTime
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn mentions_remote(text: &str) -> bool {
    REMOTE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::{mentions_remote, JobType};

    #[test]
    fn derive_prefers_part_time_over_contract() {
        let job_type = JobType::derive("Barista", Some("Part-time contract role, hourly pay"));
        assert_eq!(job_type, JobType::PartTime);
    }

    #[test]
    fn derive_defaults_to_full_time() {
        assert_eq!(JobType::derive("Software Engineer", None), JobType::FullTime);
    }

    #[test]
    fn derive_does_not_match_inside_words() {
        let job_type = JobType::derive("International Sales Manager", Some("Internal tooling"));
        assert_eq!(job_type, JobType::FullTime);
    }

    #[test]
    fn derive_detects_internships() {
        assert_eq!(JobType::derive("Data Intern", None), JobType::Internship);
    }

    #[test]
    fn board_labels_are_normalized() {
        assert_eq!(JobType::from_board_label("FULL_TIME"), JobType::FullTime);
        assert_eq!(JobType::from_board_label("Part-time"), JobType::PartTime);
        assert_eq!(JobType::from_board_label("Contractor"), JobType::Contract);
        assert_eq!(JobType::from_board_label("volunteer"), JobType::NotSpecified);
    }

    #[test]
    fn labels_round_trip() {
        for job_type in JobType::ALL {
            assert_eq!(JobType::from_label(job_type.label()), Some(job_type));
        }
    }

    #[test]
    fn remote_mentions() {
        assert!(mentions_remote("Fully Remote - US"));
        assert!(mentions_remote("we support WFH"));
        assert!(!mentions_remote("Remoteness is not a word here"));
    }
}
