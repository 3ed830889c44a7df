//! Rendering of the aggregate result sets.
//!
//! Charting proper is delegated to external plotting tools; this module
//! renders each aggregate either as a terminal table or as JSON that a
//! plotting tool can consume.

use crate::analytics::{
    BudgetRevenuePoint, GenreRevenue, MovieAnalytics, RangeCount, YearCount, YearRevenue,
};
use anyhow::Result;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

/// Every aggregate the reporting contract names, gathered in one pass.
#[derive(Debug, Serialize)]
pub struct Report {
    pub releases_per_year: Vec<YearCount>,
    pub revenue_per_year: Vec<YearRevenue>,
    pub top_genres: Vec<GenreRevenue>,
    pub budget_revenue: Vec<BudgetRevenuePoint>,
    pub movie_range_distribution: Vec<RangeCount>,
}

impl Report {
    pub fn gather(analytics: &MovieAnalytics, top_genres: usize) -> Result<Self> {
        Ok(Self {
            releases_per_year: analytics.releases_per_year()?,
            revenue_per_year: analytics.revenue_per_year()?,
            top_genres: analytics.top_genres_by_revenue(top_genres)?,
            budget_revenue: analytics.budget_revenue_points()?,
            movie_range_distribution: analytics.movie_range_distribution()?,
        })
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Table => Ok(self.render_tables()),
        }
    }

    fn render_tables(&self) -> String {
        let mut out = String::new();

        let mut table = new_table(&["Year", "Releases"]);
        for row in &self.releases_per_year {
            table.add_row(vec![
                Cell::new(&row.year),
                numeric_cell(row.count.to_string()),
            ]);
        }
        push_section(&mut out, "Releases per year", table);

        let mut table = new_table(&["Year", "Revenue"]);
        for row in &self.revenue_per_year {
            table.add_row(vec![
                Cell::new(&row.year),
                numeric_cell(format_amount(row.revenue)),
            ]);
        }
        push_section(&mut out, "Revenue per year", table);

        let mut table = new_table(&["Genre", "Revenue"]);
        for row in &self.top_genres {
            table.add_row(vec![
                Cell::new(&row.genre),
                numeric_cell(format_amount(row.revenue)),
            ]);
        }
        push_section(&mut out, "Top genres by revenue", table);

        let mut table = new_table(&["Title", "Budget", "Revenue"]);
        for row in &self.budget_revenue {
            table.add_row(vec![
                Cell::new(&row.title),
                numeric_cell(format_amount(row.budget)),
                numeric_cell(format_amount(row.revenue)),
            ]);
        }
        push_section(&mut out, "Budget vs revenue", table);

        let mut table = new_table(&["Movie range", "Count"]);
        for row in &self.movie_range_distribution {
            table.add_row(vec![
                Cell::new(&row.movie_range),
                numeric_cell(row.count.to_string()),
            ]);
        }
        push_section(&mut out, "Classification distribution", table);

        out
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}

fn numeric_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn push_section(out: &mut String, title: &str, table: Table) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push_str("\n\n");
}

/// Format a monetary amount with thousands separators, dropping the fraction
/// when it rounds to whole cents of zero.
fn format_amount(amount: f64) -> String {
    let total_cents = (amount * 100.0).round() as i64;
    let whole = total_cents / 100;
    let cents = (total_cents % 100).abs();

    let mut digits = whole.abs().to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let split = digits.len() - 3;
        grouped = format!(",{}{}", &digits[split..], grouped);
        digits.truncate(split);
    }
    grouped = format!("{}{}", digits, grouped);
    let sign = if total_cents < 0 { "-" } else { "" };

    if cents > 0 {
        format!("{}{}.{:02}", sign, grouped, cents)
    } else {
        format!("{}{}", sign, grouped)
    }
}
