use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::GalleryImage;
use crate::models::{CAT_COLUMN, DOG_COLUMN, TOTAL_COLUMN};
use crate::stages::{DashboardMetrics, DashboardSummary, DistrictSelection, SpeciesShare};

/// Machine-readable output format
#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    /// CSV file the report was built from
    pub source: PathBuf,
    pub generated_at: DateTime<Utc>,
    /// Districts the view was limited to, `None` for all
    pub selected_districts: Option<Vec<String>>,
    pub metrics: DashboardMetrics,
    pub share: SpeciesShare,
    pub rows: Vec<MachineRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineRow {
    pub district: String,
    pub total: u64,
    pub dogs: u64,
    pub cats: u64,
    /// Metric columns this row holds the maximum of
    pub highlighted: Vec<&'static str>,
}

impl MachineReport {
    pub fn from_summary(
        summary: &DashboardSummary,
        source: &Path,
        selection: &DistrictSelection,
    ) -> Self {
        let rows = summary
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| MachineRow {
                district: r.district.clone(),
                total: r.total,
                dogs: r.dogs,
                cats: r.cats,
                highlighted: summary.highlights.columns_for(i),
            })
            .collect();

        let selected_districts = match selection {
            DistrictSelection::All => None,
            DistrictSelection::Only(names) => Some(names.iter().cloned().collect()),
        };

        Self {
            source: source.to_path_buf(),
            generated_at: Utc::now(),
            selected_districts,
            metrics: summary.metrics,
            share: summary.share,
            rows,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable dashboard for the terminal
pub struct HumanReport<'a> {
    summary: &'a DashboardSummary,
    images: &'a [GalleryImage],
    bar_width: usize,
}

impl<'a> HumanReport<'a> {
    pub fn new(summary: &'a DashboardSummary, images: &'a [GalleryImage], bar_width: usize) -> Self {
        Self {
            summary,
            images,
            bar_width,
        }
    }

    /// Format the dashboard as text
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("🐾 우리 동네 댕냥이들은 어디에 있을까?\n\n");

        for image in self.images {
            output.push_str(&format!("[{}] {}\n", image.caption, image.path.display()));
        }
        if !self.images.is_empty() {
            output.push('\n');
        }

        let metrics = &self.summary.metrics;
        output.push_str(&format!("🏠 전체 친구들: {} 마리\n", metrics.total));
        output.push_str(&format!("🐕 멍멍이: {} 마리\n", metrics.dogs));
        output.push_str(&format!("🐈 야옹이: {} 마리\n\n", metrics.cats));

        if self.summary.records.is_empty() {
            output.push_str("No districts selected.\n");
            return output;
        }

        let share = &self.summary.share;
        output.push_str(&format!(
            "강아지 🐶 {:.1}% / 고양이 🐈 {:.1}%\n\n",
            share.dog_percent, share.cat_percent
        ));

        output.push_str(&self.format_bar_chart());
        output.push('\n');
        output.push_str(&self.format_table());

        output
    }

    /// Bars proportional to each district's total
    fn format_bar_chart(&self) -> String {
        let totals = self.summary.district_totals();
        let name_width = totals.iter().map(|(d, _)| display_width(d)).max().unwrap_or(0);
        let max = totals.iter().map(|(_, t)| *t).max().unwrap_or(0);

        let mut output = String::new();
        for (district, total) in totals {
            let len = bar_length(total, max, self.bar_width);
            output.push_str(&format!(
                "{} | {} {}\n",
                pad_right(district, name_width),
                "█".repeat(len),
                total
            ));
        }
        output
    }

    /// Detail table, maxima marked with `*`
    fn format_table(&self) -> String {
        let highlights = &self.summary.highlights;
        let header = ["자치구", TOTAL_COLUMN, DOG_COLUMN, CAT_COLUMN];
        let rows: Vec<[String; 4]> = self
            .summary
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                [
                    r.district.clone(),
                    mark(r.total, highlights.total.contains(&i)),
                    mark(r.dogs, highlights.dogs.contains(&i)),
                    mark(r.cats, highlights.cats.contains(&i)),
                ]
            })
            .collect();

        let mut widths = header.map(display_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(cell));
            }
        }

        let mut output = String::new();
        output.push_str(&format_row(&header, &widths));
        for row in &rows {
            output.push_str(&format_row(row, &widths));
        }
        output
    }
}

/// District left-aligned, counts right-aligned, padded by terminal width
fn format_row<S: AsRef<str>>(cells: &[S; 4], widths: &[usize; 4]) -> String {
    let mut line = pad_right(cells[0].as_ref(), widths[0]);
    for (cell, width) in cells[1..].iter().zip(&widths[1..]) {
        line.push(' ');
        line.push_str(&pad_left(cell.as_ref(), *width));
    }
    line.push('\n');
    line
}

/// Terminal columns taken by `text`; Hangul, CJK, fullwidth forms and
/// emoji occupy two
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1FAFF => 2,
            _ => 1,
        })
        .sum()
}

fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn pad_left(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", " ".repeat(fill), text)
}

fn bar_length(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((value as f64 / max as f64) * width as f64).round() as usize
}

fn mark(value: u64, highlighted: bool) -> String {
    if highlighted {
        format!("{}*", value)
    } else {
        value.to_string()
    }
}
