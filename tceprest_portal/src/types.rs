//! Value types shared by the portal client and its callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable external identifier of a reporting entity on the portal.
///
/// Always rendered zero-padded to three digits (`7` becomes `007`), which is
/// the form the portal expects in its URL path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportCode(u16);

impl ReportCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid report code '{0}': expected up to 4 digits")]
pub struct ParseReportCodeError(pub String);

impl FromStr for ReportCode {
    type Err = ParseReportCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > 4
            || !trimmed.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseReportCodeError(s.to_string()));
        }
        trimmed
            .parse::<u16>()
            .map(Self)
            .map_err(|_| ParseReportCodeError(s.to_string()))
    }
}

impl TryFrom<String> for ReportCode {
    type Error = ParseReportCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportCode> for String {
    fn from(code: ReportCode) -> Self {
        code.to_string()
    }
}

/// Cell text of one report table row, in portal column order, before any
/// normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawReportRow {
    pub month: String,
    pub deadline: String,
    pub delivery: String,
    pub status: String,
    pub budget_unit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_code_pads_to_three_digits() {
        assert_eq!(ReportCode::new(7).to_string(), "007");
        assert_eq!(ReportCode::new(42).to_string(), "042");
        assert_eq!(ReportCode::new(184).to_string(), "184");
    }

    #[test]
    fn report_code_parses_padded_and_bare() {
        assert_eq!("007".parse::<ReportCode>().unwrap(), ReportCode::new(7));
        assert_eq!("7".parse::<ReportCode>().unwrap(), ReportCode::new(7));
        assert_eq!(" 12 ".parse::<ReportCode>().unwrap(), ReportCode::new(12));
    }

    #[test]
    fn report_code_rejects_garbage() {
        assert!("".parse::<ReportCode>().is_err());
        assert!("abc".parse::<ReportCode>().is_err());
        assert!("-1".parse::<ReportCode>().is_err());
        assert!("12345".parse::<ReportCode>().is_err());
    }

    #[test]
    fn report_code_orders_numerically() {
        let mut codes = vec![ReportCode::new(100), ReportCode::new(9), ReportCode::new(20)];
        codes.sort();
        assert_eq!(
            codes,
            vec![ReportCode::new(9), ReportCode::new(20), ReportCode::new(100)]
        );
    }
}
