use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub struct Country {
    pub name: &'static str,
    /// Subdomain of indeed.com serving this country (`www` for the US).
    pub indeed_subdomain: &'static str,
    /// Glassdoor host, when Glassdoor serves this country.
    pub glassdoor_host: Option<&'static str>,
}

impl Country {
    pub fn supports_zip_recruiter(&self) -> bool {
        matches!(self.name, "United States" | "Canada")
    }

    pub fn indeed_base_url(&self) -> String {
        format!("https://{}.indeed.com", self.indeed_subdomain)
    }
}

const fn country(
    name: &'static str,
    indeed_subdomain: &'static str,
    glassdoor_host: Option<&'static str>,
) -> Country {
    Country {
        name,
        indeed_subdomain,
        glassdoor_host,
    }
}

pub static COUNTRIES: &[Country] = &[
    country("Argentina", "ar", None),
    country("Australia", "au", Some("www.glassdoor.com.au")),
    country("Austria", "at", Some("www.glassdoor.at")),
    country("Bahrain", "bh", None),
    country("Belgium", "be", Some("nl.glassdoor.be")),
    country("Brazil", "br", Some("www.glassdoor.com.br")),
    country("Canada", "ca", Some("www.glassdoor.ca")),
    country("Chile", "cl", None),
    country("China", "cn", None),
    country("Colombia", "co", None),
    country("Costa Rica", "cr", None),
    country("Czech Republic", "cz", None),
    country("Denmark", "dk", None),
    country("Ecuador", "ec", None),
    country("Egypt", "eg", None),
    country("Finland", "fi", None),
    country("France", "fr", Some("www.glassdoor.fr")),
    country("Germany", "de", Some("www.glassdoor.de")),
    country("Greece", "gr", None),
    country("Hong Kong", "hk", Some("www.glassdoor.com.hk")),
    country("Hungary", "hu", None),
    country("India", "in", Some("www.glassdoor.co.in")),
    country("Indonesia", "id", None),
    country("Ireland", "ie", Some("www.glassdoor.ie")),
    country("Israel", "il", None),
    country("Italy", "it", Some("www.glassdoor.it")),
    country("Japan", "jp", None),
    country("Kuwait", "kw", None),
    country("Luxembourg", "lu", None),
    country("Malaysia", "malaysia", None),
    country("Mexico", "mx", Some("www.glassdoor.com.mx")),
    country("Morocco", "ma", None),
    country("Netherlands", "nl", Some("www.glassdoor.nl")),
    country("New Zealand", "nz", Some("www.glassdoor.co.nz")),
    country("Nigeria", "ng", None),
    country("Norway", "no", None),
    country("Oman", "om", None),
    country("Pakistan", "pk", None),
    country("Panama", "pa", None),
    country("Peru", "pe", None),
    country("Philippines", "ph", None),
    country("Poland", "pl", None),
    country("Portugal", "pt", None),
    country("Qatar", "qa", None),
    country("Romania", "ro", None),
    country("Saudi Arabia", "sa", None),
    country("Singapore", "sg", Some("www.glassdoor.sg")),
    country("South Africa", "za", None),
    country("South Korea", "kr", None),
    country("Spain", "es", Some("www.glassdoor.es")),
    country("Sweden", "se", None),
    country("Switzerland", "ch", Some("de.glassdoor.ch")),
    country("Taiwan", "tw", None),
    country("Thailand", "th", None),
    country("Turkey", "tr", None),
    country("Ukraine", "ua", None),
    country("United Arab Emirates", "ae", None),
    country("United Kingdom", "uk", Some("www.glassdoor.co.uk")),
    country("United States", "www", Some("www.glassdoor.com")),
    country("Uruguay", "uy", None),
    country("Venezuela", "ve", None),
    country("Vietnam", "vn", Some("www.glassdoor.com")),
];

/// Countries covered by a global search, in priority order.
pub const GLOBAL_COUNTRIES: [&str; 7] = [
    "United States",
    "Canada",
    "Brazil",
    "Germany",
    "Netherlands",
    "United Kingdom",
    "Australia",
];

pub const DEFAULT_COUNTRY: &str = "United States";

pub fn find_country(name: &str) -> Option<&'static Country> {
    let name = name.trim();
    COUNTRIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

pub fn default_country() -> &'static Country {
    // The table always carries the default.
    find_country(DEFAULT_COUNTRY).unwrap_or(&COUNTRIES[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Where {
    Global,
    Country(&'static Country),
}

impl Where {
    pub const GLOBAL_LABEL: &'static str = "Global";

    pub fn parse(value: &str) -> Option<Where> {
        if value.trim().is_empty() || value.trim().eq_ignore_ascii_case(Self::GLOBAL_LABEL) {
            return Some(Where::Global);
        }
        find_country(value).map(Where::Country)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Where::Global => Self::GLOBAL_LABEL,
            Where::Country(c) => c.name,
        }
    }

    /// Countries a search fans out to. A global search narrowed by a free-text
    /// location only makes sense in one market, so it falls back to the
    /// default country.
    pub fn targets(&self, location: Option<&str>) -> Vec<&'static Country> {
        match (self, location) {
            (Where::Country(c), _) => vec![*c],
            (Where::Global, Some(_)) => vec![default_country()],
            (Where::Global, None) => GLOBAL_COUNTRIES
                .iter()
                .filter_map(|name| find_country(name))
                .collect(),
        }
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options for the country select, "Global" first.
pub fn country_options() -> Vec<&'static str> {
    std::iter::once(Where::GLOBAL_LABEL)
        .chain(COUNTRIES.iter().map(|c| c.name))
        .collect()
}

pub fn global_countries_display() -> String {
    GLOBAL_COUNTRIES.join(", ")
}
