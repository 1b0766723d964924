//! Remote-work heuristics: query enhancement for remote searches and a
//! disqualifier filter that drops listings which call themselves remote but
//! describe hybrid, on-site or location-restricted work.

use std::sync::LazyLock;

use regex::Regex;

use super::job::JobListing;

const REMOTE_MARKERS: [&str; 3] = ["remote", "wfh", "work from home"];

pub fn enhance_search_term_with_remote_keywords(search_term: &str) -> String {
    if search_term.trim().is_empty() {
        return search_term.to_string();
    }

    let lower = search_term.to_lowercase();
    if REMOTE_MARKERS.iter().any(|m| lower.contains(m)) {
        return search_term.to_string();
    }

    format!(r#"{} (remote OR "work from home" OR WFH)"#, search_term)
}

pub struct Disqualifier {
    pub name: &'static str,
    regex: Regex,
    /// Ignore matches directly preceded by "no " ("no relocation required").
    unless_negated: bool,
}

impl Disqualifier {
    fn new(name: &'static str, pattern: &str) -> Self {
        Disqualifier {
            name,
            regex: Regex::new(&format!("(?i){}", pattern)).unwrap(),
            unless_negated: false,
        }
    }

    fn unless_negated(mut self) -> Self {
        self.unless_negated = true;
        self
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.find_iter(text).any(|m| {
            !self.unless_negated || !text[..m.start()].to_lowercase().ends_with("no ")
        })
    }
}

const COMMON_LOCATIONS: [&str; 7] = ["UK", "US", "Canada", "Europe", "France", "Germany", "Spain"];

fn location_alternation(country: &str) -> String {
    match country {
        "US" => r"(U\.?S\.?|United\s+States)".to_string(),
        "UK" => r"(UK|United\s+Kingdom)".to_string(),
        other => regex::escape(other),
    }
}

fn location_disqualifiers() -> Vec<Disqualifier> {
    let templates: [(&'static str, &str); 3] = [
        (
            "MUST_RESIDE",
            r"\bmust\s+(reside|live|be\s+located)\s+in\s+(the\s+)?{country}\b",
        ),
        (
            "BASED_REQUIRED",
            r"\b{country}\s+based\s+(required|preferred|needed|essential)\b",
        ),
        (
            "YOU_MUST_LIVE",
            r"\byou\s+must\s+(live|reside)\s+in\s+(the\s+)?{country}\b",
        ),
    ];

    templates
        .iter()
        .flat_map(|(name, template)| {
            COMMON_LOCATIONS.iter().map(move |country| {
                let pattern = template.replace("{country}", &location_alternation(country));
                Disqualifier::new(*name, &pattern)
            })
        })
        .collect()
}

static DISQUALIFIERS: LazyLock<Vec<Disqualifier>> = LazyLock::new(|| {
    let mut all = location_disqualifiers();
    all.extend([
        // hybrid
        Disqualifier::new(
            "DAYS_IN_OFFICE",
            r"\b(\d+|one|two|three|four|five)\s+days?\s+(?:(?:a|per)\s+week\s+)?(?:in|at)\s+(?:the\s+)?office\b",
        ),
        Disqualifier::new("EXPLICIT_HYBRID_ROLE", r"\bthis\s+is\s+a\s+hybrid\s+role\b"),
        Disqualifier::new("HYBRID_POSITION", r"\bhybrid\s+(position|role|job|arrangement)\b"),
        Disqualifier::new("HYBRID_WORK_MODEL", r"\bhybrid\s+work\s+(model|environment|setup)\b"),
        Disqualifier::new("SPLIT_HOME_OFFICE", r"\bsplit\s+between\s+home\s+and\s+(the\s+)?office\b"),
        Disqualifier::new("REMOTE_AND_IN_PERSON", r"\bremote\s+(&|and)\s+in[\s\-]*person\b"),
        Disqualifier::new("IN_PERSON_AND_REMOTE", r"\bin[\s\-]*person\s+(&|and)\s+remote\b"),
        Disqualifier::new("HYBRID_REMOTE_MODEL", r"\bhybrid\s+remote\s+(model|environment|setup)\b"),
        // office
        Disqualifier::new("EXPLICITLY_NOT_REMOTE", r"\b(not|non)\s+(a\s+)?remote\b"),
        Disqualifier::new(
            "IN_OFFICE_REQUIREMENT",
            r"\bin\s+office\s+(work|presence|attendance)\s+(required|mandatory)\b",
        ),
        Disqualifier::new("IN_PERSON_REQUIREMENT", r"\b(required\s+in-person|in-person\s+work)\b"),
        Disqualifier::new("MUST_BE_IN_OFFICE", r"\bmust[-\s]+be[-\s]+in[-\s]+(our|the|a)?[-\s]*office\b"),
        Disqualifier::new("NO_REMOTE_OPTION", r"\bno\s+remote\s+(option|work)\b"),
        Disqualifier::new(
            "OFFICE_REQUIRED",
            r"\b(office\s+(presence|attendance|work)\s+(required|mandatory|necessary)|office\s+presence\s+is\s+mandatory)\b",
        ),
        Disqualifier::new("WORK_FROM_OFFICE", r"\bwork[-\s]+from[-\s]+(our|the|a)?[-\s]*office\b"),
        // location
        Disqualifier::new(
            "COUNTRY_SPECIFIC",
            r"\bavailable\s+(only|exclusively)\s+(to|for)\s+\w+\s+(citizens?|residents?)\b",
        ),
        Disqualifier::new("LOCAL_CANDIDATES_ONLY", r"\blocal\s+candidates\s+(only|preferred)\b"),
        Disqualifier::new(
            "LOCATION_RESTRICTION",
            r"\b(currently\s+living|must\s+(live|reside)|only\s+(apply|available)\s+if\s+you\s+(are|live))\s+in\s+\w+\b",
        ),
        Disqualifier::new("WITHIN_COMMUTING_DISTANCE", r"\bwithin\s+commuting\s+distance\b"),
        // citizenship
        Disqualifier::new("CITIZENSHIP_REQUIRED", r"\bcitizenship\s+(required|preferred|needed)\b")
            .unless_negated(),
        Disqualifier::new(
            "CITIZEN_RESIDENT_REQUIRED",
            r"\bmust\s+be\s+\w+\s+(citizen|permanent resident|resident)\b",
        ),
        Disqualifier::new(
            "CONTRACT_CITIZENSHIP",
            r"\bdue\s+to\s+contract\s+requirements?.*\bcitizen\b",
        ),
        Disqualifier::new(
            "CANADIAN_CITIZEN_REQUIRED",
            r"\b(Canadian?|Canada)\s+(citizen|permanent resident)\s+(required|preferred|needed)\b",
        ),
        Disqualifier::new(
            "UK_CITIZENSHIP_REQUIRED",
            r"\b(UK|United\s+Kingdom|British)\s+(citizens?|citizenship)\b",
        ),
        Disqualifier::new(
            "US_CITIZENSHIP_REQUIRED",
            r"\b(U\.?S\.?|United\s+States)\s+(citizens?|citizenship)\b",
        ),
        // work authorization
        Disqualifier::new(
            "US_WORK_AUTHORIZATION",
            r"\b(authorized|eligible)\s+to\s+work\s+in\s+(the\s+)?U\.?S\.?",
        ),
        Disqualifier::new("MUST_HAVE_US_AUTH", r"\bmust\s+have\s+U\.?S\.?\s+work\s+authorization\b"),
        Disqualifier::new(
            "WORK_AUTHORIZATION_REQUIRED",
            r"\bwork\s+authorization\s+(required|needed|necessary)\b",
        ),
        // security clearance
        Disqualifier::new("CLEARANCE_REQUIRED", r"\bclearance\s+(required|needed|necessary|preferred)\b")
            .unless_negated(),
        Disqualifier::new(
            "EXPORT_CONTROL_ACCESS",
            r"\baccess\s+to\s+U\.?S\.?\s+export[\s\-]*controlled\b",
        ),
        Disqualifier::new("EXPORT_CONTROL_REQUIREMENT", r"\bexport\s+control\s+(requirements?|compliance)\b"),
        Disqualifier::new("EXPORT_CONTROLLED_INFO", r"\bexport[\s\-]*controlled\s+information\b"),
        // visa
        Disqualifier::new("ABLE_TO_RELOCATE", r"\bable\s+to\s+relocate\b"),
        Disqualifier::new("RELOCATION_REQUIRED", r"\brelocation\s+(required|needed|necessary|expected)\b")
            .unless_negated(),
        Disqualifier::new("SPONSORSHIP_NOT_AVAILABLE", r"\bsponsorship\s+is\s+not\s+available\b"),
        // travel
        Disqualifier::new(
            "MULTIPLE_WEEKS_MONTH",
            r"\b(\d+|one|two|three|four)\s+weeks?\s+(a|per)\s+month\b",
        ),
        Disqualifier::new(
            "TRAVEL_TO_OFFICE",
            r"\btravel\s+to\s+(and\s+work\s+in\s+)?(the\s+)?office\b",
        ),
    ]);
    all
});

/// Name of the first disqualifier found in `description`, if any.
pub fn find_disqualifier(description: &str) -> Option<&'static str> {
    DISQUALIFIERS
        .iter()
        .find(|d| d.matches(description))
        .map(|d| d.name)
}

/// A listing without a description has nothing to contradict its remote
/// claim and is kept.
pub fn is_legitimate_remote(listing: &JobListing) -> bool {
    match listing.description.as_deref() {
        None => true,
        Some(description) => match find_disqualifier(description) {
            None => true,
            Some(name) => {
                log::debug!(
                    "Dropping {} from remote results, matched {}",
                    listing.job_url,
                    name
                );
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{enhance_search_term_with_remote_keywords, find_disqualifier};

    #[test]
    fn enhance_adds_keywords_once() {
        assert_eq!(
            enhance_search_term_with_remote_keywords("Data Engineer"),
            r#"Data Engineer (remote OR "work from home" OR WFH)"#
        );
        assert_eq!(
            enhance_search_term_with_remote_keywords("Remote Data Engineer"),
            "Remote Data Engineer"
        );
        assert_eq!(enhance_search_term_with_remote_keywords("  "), "  ");
    }

    #[test]
    fn hybrid_descriptions_are_disqualified() {
        assert_eq!(
            find_disqualifier("This is a hybrid role based in Austin."),
            Some("EXPLICIT_HYBRID_ROLE")
        );
        assert_eq!(
            find_disqualifier("Expect 3 days per week in the office."),
            Some("DAYS_IN_OFFICE")
        );
    }

    #[test]
    fn location_templates_cover_country_variants() {
        assert_eq!(
            find_disqualifier("Candidates must reside in the United States."),
            Some("MUST_RESIDE")
        );
        assert_eq!(find_disqualifier("Germany based required"), Some("BASED_REQUIRED"));
    }

    #[test]
    fn negated_requirements_are_ignored() {
        assert_eq!(find_disqualifier("No relocation required, work from anywhere."), None);
        assert_eq!(
            find_disqualifier("Relocation required to our Berlin HQ."),
            Some("RELOCATION_REQUIRED")
        );
    }

    #[test]
    fn fully_remote_description_passes() {
        let description = "We are a distributed team. Work from anywhere in the world, async first.";
        assert_eq!(find_disqualifier(description), None);
    }
}
