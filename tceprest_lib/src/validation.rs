use chrono::NaiveDate;
use tceprest_portal::normalize::resolve_month_filter;
use tceprest_portal::ReportCode;

use crate::error::TceprestError;
use crate::types::RunFilter;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_MONTH_LENGTH: usize = 40;
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;
pub const DEFAULT_RECENT_LIMIT: i64 = 200;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, TceprestError> {
    if input.len() > max_len {
        return Err(TceprestError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(TceprestError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate an entity display name.
pub fn validate_entity_name(input: &str) -> Result<String, TceprestError> {
    sanitize_text(input, MAX_NAME_LENGTH)
}

/// Validate a report year (2000..=2100).
pub fn validate_year(year: i32) -> Result<i32, TceprestError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(TceprestError::InvalidInput(format!(
            "year must be between {} and {}, got {}",
            MIN_YEAR, MAX_YEAR, year
        )));
    }
    Ok(year)
}

/// Validate a month filter: a number 1-12 becomes the portal's month name,
/// any other text is kept (trimmed) for substring matching.
pub fn validate_month(input: &str) -> Result<String, TceprestError> {
    let sanitized = sanitize_text(input, MAX_MONTH_LENGTH)?;
    resolve_month_filter(&sanitized).ok_or_else(|| {
        TceprestError::InvalidInput(format!(
            "invalid month '{}'. Expected 1-12 or a month name (e.g., Março)",
            sanitized
        ))
    })
}

/// Validate a date in YYYY-MM-DD format and return it in the same canonical form.
pub fn validate_date(input: &str) -> Result<String, TceprestError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            TceprestError::InvalidInput(format!(
                "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2024-06-01)",
                trimmed
            ))
        })
}

/// Validate a report code: up to three digits, zero padding optional.
pub fn validate_report_code(input: &str) -> Result<ReportCode, TceprestError> {
    let code: ReportCode = input
        .parse()
        .map_err(|e: tceprest_portal::ParseReportCodeError| TceprestError::InvalidInput(e.to_string()))?;
    if code.value() > 999 {
        return Err(TceprestError::InvalidInput(format!(
            "report code must be between 0 and 999, got {}",
            code.value()
        )));
    }
    Ok(code)
}

/// Validate a row limit (must be 1..=1000).
pub fn validate_limit(limit: i64) -> Result<i64, TceprestError> {
    if !(1..=1000).contains(&limit) {
        return Err(TceprestError::InvalidInput(
            "limit must be between 1 and 1000".to_string(),
        ));
    }
    Ok(limit)
}

/// Build a run filter from raw caller input.
pub fn build_filter(
    year: i32,
    month: Option<&str>,
    delivery_date: Option<&str>,
) -> Result<RunFilter, TceprestError> {
    let mut filter = RunFilter::new(validate_year(year)?);
    if let Some(month) = month {
        filter = filter.with_month(validate_month(month)?);
    }
    if let Some(date) = delivery_date {
        filter = filter.with_delivery_date(validate_date(date)?);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_bounds() {
        assert_eq!(validate_year(2024).unwrap(), 2024);
        assert!(validate_year(1999).is_err());
        assert!(validate_year(2101).is_err());
    }

    #[test]
    fn month_numeric_maps_to_label() {
        assert_eq!(validate_month("1").unwrap(), "Janeiro");
        assert_eq!(validate_month("12").unwrap(), "Dezembro");
        assert_eq!(validate_month(" 03 ").unwrap(), "Março");
    }

    #[test]
    fn month_out_of_range() {
        assert!(validate_month("13").is_err());
        assert!(validate_month("0").is_err());
    }

    #[test]
    fn month_text_is_kept() {
        assert_eq!(validate_month("abril").unwrap(), "abril");
        assert_eq!(validate_month("  Maio ").unwrap(), "Maio");
        assert!(validate_month("xyz").is_err());
        assert!(validate_month("Maio 2024").is_err());
    }

    #[test]
    fn month_empty_or_too_long() {
        assert!(validate_month("").is_err());
        assert!(validate_month(&"x".repeat(41)).is_err());
    }

    #[test]
    fn date_valid() {
        assert_eq!(validate_date("2024-06-01").unwrap(), "2024-06-01");
        assert_eq!(validate_date("  2024-06-01 ").unwrap(), "2024-06-01");
    }

    #[test]
    fn date_invalid() {
        assert!(validate_date("01/06/2024").is_err());
        assert!(validate_date("2024-13-01").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn report_code_valid() {
        assert_eq!(validate_report_code("7").unwrap().to_string(), "007");
        assert_eq!(validate_report_code("184").unwrap().to_string(), "184");
    }

    #[test]
    fn report_code_invalid() {
        assert!(validate_report_code("1000").is_err());
        assert!(validate_report_code("x1").is_err());
        assert!(validate_report_code("").is_err());
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(validate_limit(DEFAULT_RECENT_LIMIT).unwrap(), 200);
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }

    #[test]
    fn entity_name_sanitized() {
        assert_eq!(
            validate_entity_name("  Prefeitura\u{7} de Sobral ").unwrap(),
            "Prefeitura de Sobral"
        );
        assert!(validate_entity_name("\n\t").is_err());
    }

    #[test]
    fn build_filter_combines_parts() {
        let filter = build_filter(2024, Some("2"), Some("2024-03-08")).unwrap();
        assert_eq!(filter.year, 2024);
        assert_eq!(filter.month.as_deref(), Some("Fevereiro"));
        assert_eq!(filter.delivery_date.as_deref(), Some("2024-03-08"));

        let bare = build_filter(2023, None, None).unwrap();
        assert_eq!(bare, RunFilter::new(2023));

        assert!(build_filter(2024, Some("99"), None).is_err());
    }
}
