use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    Indeed,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Glassdoor,
    ZipRecruiter,
}

impl Site {
    pub const ALL: [Site; 4] = [
        Site::Indeed,
        Site::LinkedIn,
        Site::Glassdoor,
        Site::ZipRecruiter,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Site::Indeed => "indeed",
            Site::LinkedIn => "linkedin",
            Site::Glassdoor => "glassdoor",
            Site::ZipRecruiter => "zip_recruiter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Site::Indeed => "Indeed",
            Site::LinkedIn => "LinkedIn",
            Site::Glassdoor => "Glassdoor",
            Site::ZipRecruiter => "ZipRecruiter",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unsupported job site: {0}")]
pub struct UnknownSite(pub String);

impl FromStr for Site {
    type Err = UnknownSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indeed" => Ok(Site::Indeed),
            "linkedin" => Ok(Site::LinkedIn),
            "glassdoor" => Ok(Site::Glassdoor),
            "zip_recruiter" | "ziprecruiter" => Ok(Site::ZipRecruiter),
            _ => Err(UnknownSite(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Site;

    #[test]
    fn parse_accepts_known_tags() {
        assert_eq!("linkedin".parse::<Site>().unwrap(), Site::LinkedIn);
        assert_eq!(" Indeed ".parse::<Site>().unwrap(), Site::Indeed);
        assert_eq!("ZipRecruiter".parse::<Site>().unwrap(), Site::ZipRecruiter);
    }

    #[test]
    fn parse_rejects_unknown_tags() {
        assert!("monster".parse::<Site>().is_err());
        assert!("".parse::<Site>().is_err());
    }

    #[test]
    fn serializes_as_tag() {
        let json = serde_json::to_string(&Site::LinkedIn).unwrap();
        assert_eq!(json, r#""linkedin""#);
        for site in Site::ALL {
            assert_eq!(site.tag().parse::<Site>().unwrap(), site);
        }
    }
}
