//! Zoho data-center regions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ZohoError;

/// Zoho data center that hosts the organization.
///
/// Selects both the OAuth base URL and the Books API base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    #[default]
    Us,
    Eu,
    In,
    Au,
    Jp,
    Cn,
    Ca,
}

impl Region {
    /// All supported regions, in display order.
    pub const ALL: [Self; 7] = [
        Self::Us,
        Self::Eu,
        Self::In,
        Self::Au,
        Self::Jp,
        Self::Cn,
        Self::Ca,
    ];

    /// Region code as used in configuration (`US`, `EU`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Eu => "EU",
            Self::In => "IN",
            Self::Au => "AU",
            Self::Jp => "JP",
            Self::Cn => "CN",
            Self::Ca => "CA",
        }
    }

    /// Top-level domain suffix of the region's Zoho hosts.
    #[must_use]
    pub const fn domain(self) -> &'static str {
        match self {
            Self::Us => "com",
            Self::Eu => "eu",
            Self::In => "in",
            Self::Au => "com.au",
            Self::Jp => "jp",
            Self::Cn => "com.cn",
            Self::Ca => "ca",
        }
    }

    /// OAuth v2 base URL, e.g. `https://accounts.zoho.eu/oauth/v2`.
    #[must_use]
    pub fn auth_base_url(self) -> String {
        format!("https://accounts.zoho.{}/oauth/v2", self.domain())
    }

    /// Books API v3 base URL, e.g. `https://www.zohoapis.eu/books/v3`.
    #[must_use]
    pub fn api_base_url(self) -> String {
        format!("https://www.zohoapis.{}/books/v3", self.domain())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = ZohoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ZohoError::InvalidConfig {
                field: "ZOHO_REGION".to_string(),
                detail: format!(
                    "unknown region '{wanted}', expected one of: {}",
                    Self::ALL.map(Self::code).join(", ")
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("eu".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!(" AU ".parse::<Region>().unwrap(), Region::Au);
        assert_eq!("Cn".parse::<Region>().unwrap(), Region::Cn);
    }

    #[test]
    fn unknown_region_fails_fast() {
        let err = "MARS".parse::<Region>().unwrap_err();
        assert!(matches!(err, ZohoError::InvalidConfig { ref field, .. } if field == "ZOHO_REGION"));
        assert!(err.to_string().contains("MARS"));
    }

    #[test]
    fn empty_region_is_rejected() {
        assert!("".parse::<Region>().is_err());
    }

    #[test]
    fn base_urls_follow_domain() {
        assert_eq!(
            Region::Au.auth_base_url(),
            "https://accounts.zoho.com.au/oauth/v2"
        );
        assert_eq!(
            Region::In.api_base_url(),
            "https://www.zohoapis.in/books/v3"
        );
        assert_eq!(Region::Us.api_base_url(), "https://www.zohoapis.com/books/v3");
    }

    #[test]
    fn serde_uses_uppercase_codes() {
        assert_eq!(serde_json::to_string(&Region::Jp).unwrap(), "\"JP\"");
        let r: Region = serde_json::from_str("\"CA\"").unwrap();
        assert_eq!(r, Region::Ca);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for region in Region::ALL {
            assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
        }
    }
}
