//! Table formatting for condensed stock listings
//!
//! Columns are built per category because each category has its own
//! attribute set. Rows are numbered from 1 so the number can be passed
//! straight back to `show`, `edit` and `remove`.

use chrono::NaiveDate;
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::condense::CondensedGroup;
use crate::core::item::DATE_FORMAT;
use crate::core::schema::CategorySchema;
use crate::core::status::{StockStatus, Thresholds};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 implant group(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Plain text, truncated to the column width in TSV
    Text(String),
    /// Unit count
    Number(u64),
    /// Expiry date; None when no batch has a readable date
    Date(Option<NaiveDate>),
    /// Stock status with color coding
    Status(StockStatus),
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Number(n) => format!("{:<width$}", n, width = width),
            CellValue::Date(Some(date)) => {
                format!("{:<width$}", date.format(DATE_FORMAT).to_string(), width = width)
            }
            CellValue::Date(None) => {
                format!("{:<width$}", style("-").dim(), width = width)
            }
            CellValue::Status(status) => {
                let label = status.label();
                let styled = match (status.low_stock, status.expiring_soon) {
                    (true, true) => style(label).red().bold(),
                    (true, false) => style(label).red(),
                    (false, true) => style(label).yellow(),
                    (false, false) => style(label),
                };
                format!("{:<width$}", styled, width = width)
            }
        }
    }

    /// Format for CSV output (properly escaped)
    pub fn format_csv(&self) -> String {
        escape_csv(&self.raw())
    }

    /// Format for Markdown table output
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Date(None) => "-".to_string(),
            CellValue::Status(status) if status.is_flagged() => format!("**{}**", status.label()),
            other => other.raw(),
        };
        // Escape pipe characters for markdown tables
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(date) => date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            CellValue::Status(status) => status.label().to_string(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Text(s) => console::measure_text_width(s),
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Date(Some(_)) => 10, // "YYYY-MM-DD"
            CellValue::Date(None) => 1,
            CellValue::Status(status) => status.label().len(),
        }
    }
}

/// Column definition with header label and width cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// Summary columns that follow the attributes in every listing
pub const SUMMARY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("total_qty", "Total Qty", 10),
    ColumnDef::new("most_recent_expiry", "Most Recent Expiry", 18),
    ColumnDef::new("most_recent_expiry_qty", "Most Recent Expiry Qty", 22),
    ColumnDef::new("status", "Status", 26),
];

/// The attribute columns of a category followed by the summary columns
pub fn group_columns(schema: &CategorySchema) -> Vec<ColumnDef> {
    schema
        .attributes
        .iter()
        .map(|a| ColumnDef::new(a.key, a.label, 24))
        .chain(SUMMARY_COLUMNS.iter().cloned())
        .collect()
}

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    /// 1-based display row
    pub row: usize,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Build the listing row for a condensed group
    pub fn for_group(
        row: usize,
        schema: &CategorySchema,
        group: &CondensedGroup,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> Self {
        let mut table_row = TableRow::new(row);
        for (attr, value) in schema.attributes.iter().zip(&group.attributes) {
            table_row = table_row.cell(attr.key, CellValue::Text(value.clone()));
        }
        table_row
            .cell("total_qty", CellValue::Number(group.total_qty))
            .cell("most_recent_expiry", CellValue::Date(group.most_recent_expiry))
            .cell(
                "most_recent_expiry_qty",
                CellValue::Number(group.most_recent_expiry_qty),
            )
            .cell("status", CellValue::Status(group.status(today, thresholds)))
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    item_name: &'a str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], item_name: &'a str) -> Self {
        Self {
            columns,
            item_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        for line in self.render(rows, format) {
            println!("{}", line);
        }
    }

    /// Render rows to output lines. JSON is handled by the caller.
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> Vec<String> {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            _ => self.render_tsv(rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.columns.len() + 1);

        // "#" column
        let row_width = rows
            .iter()
            .map(|r| r.row.to_string().len())
            .max()
            .unwrap_or(1)
            .max(1);
        widths.push(row_width + 1);

        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);

            // +2 for the truncation buffer, capped at the column's width
            let natural_width = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural_width.min(col.width.max(col.header.len())));
        }

        widths
    }

    fn render_tsv(&self, rows: &[TableRow]) -> Vec<String> {
        let widths = self.calculate_widths(rows);
        let mut lines = Vec::with_capacity(rows.len() + 4);

        let mut header_parts = vec![format!("{:<width$}", style("#").bold().dim(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        lines.push(header_parts.join(" ").trim_end().to_string());

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        lines.push("-".repeat(total_width));

        for row in rows {
            let mut row_parts = vec![format!(
                "{:<width$}",
                style(row.row).cyan(),
                width = widths[0]
            )];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => row_parts.push(value.format_tsv(*width)),
                    None => row_parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            lines.push(row_parts.join(" ").trim_end().to_string());
        }

        if self.config.show_summary {
            lines.push(String::new());
            lines.push(format!(
                "{} {} group(s) found.",
                style(rows.len()).cyan(),
                self.item_name
            ));
        }

        lines
    }

    fn render_csv(&self, rows: &[TableRow]) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 1);

        let mut headers = vec!["row".to_string()];
        headers.extend(self.columns.iter().map(|c| escape_csv(c.header)));
        lines.push(headers.join(","));

        for row in rows {
            let mut values = vec![row.row.to_string()];
            for col in self.columns {
                values.push(row.get(col.key).map(|v| v.format_csv()).unwrap_or_default());
            }
            lines.push(values.join(","));
        }

        lines
    }

    fn render_md(&self, rows: &[TableRow]) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 2);

        let mut headers = vec!["#".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        lines.push(format!("| {} |", headers.join(" | ")));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        lines.push(format!("|{}|", separators.join("|")));

        for row in rows {
            let mut values = vec![row.row.to_string()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            lines.push(format!("| {} |", values.join(" | ")));
        }

        lines
    }
}
