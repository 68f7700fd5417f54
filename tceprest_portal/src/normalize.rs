//! Text cleanup and date/month conversion for report table cells.

/// Month names as the portal writes them, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Collapse runs of whitespace (non-breaking spaces and byte-order marks
/// included) into single spaces and trim. Returns `None` when nothing is left.
pub fn normalize(raw: &str) -> Option<String> {
    let collapsed = raw
        .split(is_blank)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

// char::is_whitespace covers U+00A0 but not U+FEFF
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Month label for a 1-based month number.
pub fn month_label(month: u32) -> Option<&'static str> {
    match month {
        1..=12 => Some(MONTH_LABELS[(month - 1) as usize]),
        _ => None,
    }
}

/// Month label for a numeric string such as `"3"` or `"03"`.
/// Non-numeric and out-of-range input yields `None`.
pub fn month_number_to_label(raw: &str) -> Option<&'static str> {
    raw.trim().parse::<u32>().ok().and_then(month_label)
}

/// Turn a month filter given either as a number or as a name into the text
/// matched against the month column. Numbers outside 1-12 resolve to `None`;
/// text is kept only when it is part of some month name (`"mar"`, `"maio"`),
/// since anything else could never match a row.
pub fn resolve_month_filter(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return month_number_to_label(trimmed).map(str::to_string);
    }
    let text = normalize(trimmed)?;
    let needle = text.to_lowercase();
    MONTH_LABELS
        .iter()
        .any(|label| label.to_lowercase().contains(&needle))
        .then_some(text)
}

/// Find the first `DD/MM/YYYY` occurrence anywhere in `raw` and re-emit it as
/// `YYYY-MM-DD`. The digits are copied as-is, not calendar checked.
pub fn parse_local_date_to_iso(raw: &str) -> Option<String> {
    raw.as_bytes().windows(10).find_map(|w| {
        let digits = |range: std::ops::Range<usize>| w[range].iter().all(u8::is_ascii_digit);
        if !(digits(0..2) && w[2] == b'/' && digits(3..5) && w[5] == b'/' && digits(6..10)) {
            return None;
        }
        let s = std::str::from_utf8(w).ok()?;
        Some(format!("{}-{}-{}", &s[6..10], &s[3..5], &s[0..2]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize("  Janeiro \n\t  2024 ").as_deref(),
            Some("Janeiro 2024")
        );
    }

    #[test]
    fn normalize_handles_non_breaking_space() {
        assert_eq!(
            normalize("\u{a0}Entregue\u{a0}\u{a0}no prazo\u{a0}").as_deref(),
            Some("Entregue no prazo")
        );
    }

    #[test]
    fn normalize_empty_is_none() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("\u{a0}\n"), None);
    }

    #[test]
    fn normalize_treats_bom_as_blank() {
        assert_eq!(normalize("\u{feff}"), None);
        assert_eq!(
            normalize("\u{feff}Março\u{feff} 2024").as_deref(),
            Some("Março 2024")
        );
    }

    #[test]
    fn month_label_bounds() {
        assert_eq!(month_label(1), Some("Janeiro"));
        assert_eq!(month_label(12), Some("Dezembro"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }

    #[test]
    fn month_number_to_label_parses_text() {
        assert_eq!(month_number_to_label("1"), Some("Janeiro"));
        assert_eq!(month_number_to_label("03"), Some("Março"));
        assert_eq!(month_number_to_label("13"), None);
        assert_eq!(month_number_to_label("abril"), None);
        assert_eq!(month_number_to_label(""), None);
    }

    #[test]
    fn resolve_month_filter_accepts_numbers_and_names() {
        assert_eq!(resolve_month_filter("2").as_deref(), Some("Fevereiro"));
        assert_eq!(resolve_month_filter(" maio ").as_deref(), Some("maio"));
        assert_eq!(resolve_month_filter("MARÇO").as_deref(), Some("MARÇO"));
        assert_eq!(resolve_month_filter("mar").as_deref(), Some("mar"));
        assert_eq!(resolve_month_filter("0"), None);
        assert_eq!(resolve_month_filter("  "), None);
    }

    #[test]
    fn resolve_month_filter_rejects_unknown_text() {
        assert_eq!(resolve_month_filter("xyz"), None);
        assert_eq!(resolve_month_filter("Março/2024"), None);
        assert_eq!(resolve_month_filter("-1"), None);
    }

    #[test]
    fn parse_date_trailing_space() {
        assert_eq!(
            parse_local_date_to_iso("31/12/2024 ").as_deref(),
            Some("2024-12-31")
        );
    }

    #[test]
    fn parse_date_embedded_in_text() {
        assert_eq!(
            parse_local_date_to_iso("Entregue em 05/02/2024 às 10:31").as_deref(),
            Some("2024-02-05")
        );
    }

    #[test]
    fn parse_date_rejects_non_dates() {
        assert_eq!(parse_local_date_to_iso("not a date"), None);
        assert_eq!(parse_local_date_to_iso("2024-12-31"), None);
        assert_eq!(parse_local_date_to_iso("1/2/2024"), None);
        assert_eq!(parse_local_date_to_iso(""), None);
    }

    #[test]
    fn parse_date_is_unanchored() {
        // leftmost window wins, like an unanchored pattern search
        assert_eq!(
            parse_local_date_to_iso("123/45/67890").as_deref(),
            Some("6789-45-23")
        );
    }
}
