//! Locating the report table in a fetched page.
//!
//! The portal serves structurally different markup across years and
//! entities. The locator tries a fixed list of selectors from most to least
//! specific and takes the first match.

use scraper::{ElementRef, Html, Selector};

use crate::{LayoutError, RawReportRow};

/// Selectors tried in order when looking for the report table.
pub const TABLE_SELECTORS: [&str; 4] = [
    "#example",
    "#montaTabela table",
    "table.tablesorter",
    "table",
];

const ROW_SELECTOR: &str = "tbody tr";
const CELL_SELECTOR: &str = "td";

/// Minimum number of cells a body row needs to be read as a report row.
pub const MIN_CELLS: usize = 5;

/// Pre-parsed selectors for finding the report table and reading its rows.
pub struct TableLocator {
    fallbacks: Vec<Selector>,
    rows: Selector,
    cells: Selector,
}

impl TableLocator {
    pub fn new() -> Result<Self, LayoutError> {
        let fallbacks = TABLE_SELECTORS
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            fallbacks,
            rows: parse_selector(ROW_SELECTOR)?,
            cells: parse_selector(CELL_SELECTOR)?,
        })
    }

    /// First element matched by the fallback chain, or `None` when the
    /// document has no table at all.
    pub fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.fallbacks
            .iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// Raw cell text of every body row with at least [`MIN_CELLS`] cells.
    /// Columns past the fifth are ignored.
    pub fn raw_rows(&self, table: ElementRef<'_>) -> Vec<RawReportRow> {
        table
            .select(&self.rows)
            .filter_map(|tr| {
                let cells: Vec<String> = tr
                    .select(&self.cells)
                    .map(|td| td.text().collect::<String>())
                    .collect();
                if cells.len() < MIN_CELLS {
                    return None;
                }
                let mut cells = cells.into_iter();
                Some(RawReportRow {
                    month: cells.next().unwrap_or_default(),
                    deadline: cells.next().unwrap_or_default(),
                    delivery: cells.next().unwrap_or_default(),
                    status: cells.next().unwrap_or_default(),
                    budget_unit: cells.next().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Parse a page body and return the raw rows of its report table.
    ///
    /// The parsed document never outlives this call, so callers in async
    /// code can hold the result across await points.
    pub fn parse_report(&self, body: &str) -> Result<Vec<RawReportRow>, LayoutError> {
        let document = Html::parse_document(body);
        let table = self.locate(&document).ok_or(LayoutError::TableNotFound)?;
        Ok(self.raw_rows(table))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, LayoutError> {
    Selector::parse(selector).map_err(|e| LayoutError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> TableLocator {
        TableLocator::new().expect("static selectors parse")
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    fn table(attrs: &str, month: &str) -> String {
        format!(
            "<table {}><thead><tr><th>Mês</th></tr></thead><tbody>{}</tbody></table>",
            attrs,
            row(&[month, "10/02/2024", "09/02/2024", "Entregue", "Prefeitura"])
        )
    }

    fn first_month(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let loc = locator();
        let table = loc.locate(&document)?;
        loc.raw_rows(table).into_iter().next().map(|r| r.month)
    }

    #[test]
    fn prefers_table_with_example_id() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            table("class=\"tablesorter\"", "Fevereiro"),
            table("id=\"example\"", "Janeiro")
        );
        assert_eq!(first_month(&html).as_deref(), Some("Janeiro"));
    }

    #[test]
    fn falls_back_to_container_table() {
        let html = format!(
            "<html><body>{}<div id=\"montaTabela\">{}</div></body></html>",
            table("", "Abril"),
            table("", "Março")
        );
        assert_eq!(first_month(&html).as_deref(), Some("Março"));
    }

    #[test]
    fn container_only_document_is_found() {
        let html = format!(
            "<html><body><div id=\"montaTabela\">{}</div></body></html>",
            table("", "Maio")
        );
        assert_eq!(first_month(&html).as_deref(), Some("Maio"));
    }

    #[test]
    fn falls_back_to_tablesorter_class() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            table("", "Junho"),
            table("class=\"tablesorter striped\"", "Julho")
        );
        assert_eq!(first_month(&html).as_deref(), Some("Julho"));
    }

    #[test]
    fn falls_back_to_first_table() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            table("", "Agosto"),
            table("", "Setembro")
        );
        assert_eq!(first_month(&html).as_deref(), Some("Agosto"));
    }

    #[test]
    fn no_table_is_none() {
        let document = Html::parse_document("<html><body><p>Sem dados</p></body></html>");
        assert!(locator().locate(&document).is_none());
    }

    #[test]
    fn parse_report_reports_missing_table() {
        let result = locator().parse_report("<html><body></body></html>");
        assert!(matches!(result, Err(LayoutError::TableNotFound)));
    }

    #[test]
    fn short_rows_are_skipped() {
        let html = format!(
            "<table id=\"example\"><tbody>{}{}{}</tbody></table>",
            row(&["Janeiro", "10/02/2024", "09/02/2024", "Entregue"]),
            row(&["Fevereiro", "10/03/2024", "", "Pendente", "Câmara", "extra"]),
            row(&["Total"])
        );
        let rows = locator().parse_report(&html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "Fevereiro");
        assert_eq!(rows[0].delivery, "");
        assert_eq!(rows[0].budget_unit, "Câmara");
    }

    #[test]
    fn cell_text_includes_nested_markup() {
        let html = "<table><tbody><tr><td><b>Janeiro</b></td><td>a</td><td><span>01/02/2024</span></td><td>b</td><td>c</td></tr></tbody></table>";
        let rows = locator().parse_report(html).unwrap();
        assert_eq!(rows[0].month, "Janeiro");
        assert_eq!(rows[0].delivery, "01/02/2024");
    }
}
