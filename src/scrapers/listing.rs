//! Shared row-to-record plumbing for table and list listings.
//!
//! Each scraper describes its page with a [`ListingLayout`] (which elements
//! are rows, how many header rows to drop, which rows count as reports) and a
//! table of named [`Column`]s. Field extraction then goes through
//! [`TableRow`] so a shifted or truncated row surfaces as
//! [`ScrapeError::MissingColumn`] naming the field, instead of silently
//! reading the wrong cell.

use crate::error::{Result, ScrapeError};
use crate::models::Inspector;
use crate::utils::clean_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Decides whether a selected row is a report row.
pub type RowFilter = fn(&ElementRef<'_>) -> bool;

/// Keeps every row.
pub fn any_row(_: &ElementRef<'_>) -> bool {
    true
}

/// Keeps rows with visible text.
pub fn has_text(row: &ElementRef<'_>) -> bool {
    !element_text(row).is_empty()
}

/// How to find report rows on a listing page.
pub struct ListingLayout {
    pub rows: &'static Lazy<Selector>,
    /// Leading rows of the selection to drop before filtering.
    pub header_rows: usize,
    pub keep_row: RowFilter,
}

impl ListingLayout {
    /// Select report rows from `document`.
    ///
    /// An empty selection is [`ScrapeError::NoReportsFound`] for `label`:
    /// these pages always list something, so nothing at all means the
    /// markup moved.
    pub fn select<'a>(&self, document: &'a Html, label: &str) -> Result<Vec<ElementRef<'a>>> {
        let selected: Vec<ElementRef<'a>> = document.select(self.rows).collect();
        if selected.is_empty() {
            return Err(ScrapeError::NoReportsFound(label.to_string()));
        }
        let total = selected.len();
        let rows: Vec<ElementRef<'a>> = selected
            .into_iter()
            .skip(self.header_rows)
            .filter(|row| (self.keep_row)(row))
            .collect();
        debug!(label, total, kept = rows.len(), "Selected listing rows");
        Ok(rows)
    }
}

/// A named position in a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub index: usize,
}

impl Column {
    pub const fn new(field: &'static str, index: usize) -> Self {
        Self { field, index }
    }
}

/// A link pulled out of a cell or list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// The `<td>` cells of one table row.
pub struct TableRow<'a> {
    cells: Vec<ElementRef<'a>>,
}

impl<'a> TableRow<'a> {
    pub fn new(row: ElementRef<'a>) -> Self {
        Self {
            cells: row.select(&TD).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether every column in `columns` exists in this row.
    pub fn covers(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| c.index < self.cells.len())
    }

    /// Fail on the first column in `columns` this row does not have.
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        match columns.iter().find(|c| c.index >= self.cells.len()) {
            Some(c) => Err(ScrapeError::MissingColumn {
                field: c.field,
                index: c.index,
            }),
            None => Ok(()),
        }
    }

    pub fn cell(&self, column: Column) -> Result<ElementRef<'a>> {
        self.cells
            .get(column.index)
            .copied()
            .ok_or(ScrapeError::MissingColumn {
                field: column.field,
                index: column.index,
            })
    }

    /// Cleaned text of a cell.
    pub fn text(&self, column: Column) -> Result<String> {
        Ok(element_text(&self.cell(column)?))
    }

    /// The first anchor inside a cell.
    pub fn link(&self, column: Column) -> Result<Link> {
        first_link(&self.cell(column)?, column.field)
    }
}

/// All text under `element`, concatenated and cleaned.
pub fn element_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// The first `<a>` under `element`; it must carry an `href`.
pub fn first_link(element: &ElementRef<'_>, field: &'static str) -> Result<Link> {
    let anchor = element
        .select(&ANCHOR)
        .next()
        .ok_or(ScrapeError::MissingElement { field, element: "a" })?;
    let href = anchor.value().attr("href").ok_or(ScrapeError::MissingElement {
        field,
        element: "a[href]",
    })?;
    Ok(Link {
        href: href.trim().to_string(),
        text: element_text(&anchor),
    })
}

/// What to do with a row hit by a [`RowOverride`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideAction {
    /// Drop the row; another row carries its data.
    SkipRow,
    /// Replace the row's report id.
    SetReportId(&'static str),
}

/// A correction for one known upstream data-entry defect, matched on the raw
/// text of a single column.
#[derive(Debug, Clone, Copy)]
pub struct RowOverride {
    pub source: Inspector,
    /// Only applies when the raw report id also equals this.
    pub report_id: Option<&'static str>,
    pub column: Column,
    pub raw: &'static str,
    pub action: OverrideAction,
}

impl RowOverride {
    fn applies(&self, source: Inspector, report_id: &str, row: &TableRow<'_>) -> bool {
        self.source == source
            && self.report_id.is_none_or(|id| id == report_id)
            && row.text(self.column).is_ok_and(|text| text == self.raw)
    }
}

/// The first override in `table` matching this row, if any.
pub fn find_override(
    table: &[RowOverride],
    source: Inspector,
    report_id: &str,
    row: &TableRow<'_>,
) -> Option<OverrideAction> {
    table
        .iter()
        .find(|o| o.applies(source, report_id, row))
        .map(|o| o.action)
}
