use serde::Serialize;

use crate::error::LoadError;
use crate::models::{DistrictRecord, NormalizedTable, saturating_sum};

/// Headline metrics shown at the top of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    /// Sum of the `소계` column ("전체 친구들")
    pub total: u64,
    /// Sum of `개_소계`
    pub dogs: u64,
    /// Sum of `고양이_소계`
    pub cats: u64,
}

/// Dog/cat split, the data behind the species pie chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeciesShare {
    pub dogs: u64,
    pub cats: u64,
    pub dog_percent: f64,
    pub cat_percent: f64,
}

impl SpeciesShare {
    fn new(dogs: u64, cats: u64) -> Self {
        let both = dogs.saturating_add(cats);
        let percent = |n: u64| {
            if both == 0 {
                0.0
            } else {
                n as f64 / both as f64 * 100.0
            }
        };
        Self {
            dogs,
            cats,
            dog_percent: percent(dogs),
            cat_percent: percent(cats),
        }
    }
}

/// Row indices holding each metric column's maximum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    pub total: Vec<usize>,
    pub dogs: Vec<usize>,
    pub cats: Vec<usize>,
}

impl Highlights {
    /// Names of the metric columns row `index` holds the maximum of
    pub fn columns_for(&self, index: usize) -> Vec<&'static str> {
        let mut columns = Vec::new();
        if self.total.contains(&index) {
            columns.push("total");
        }
        if self.dogs.contains(&index) {
            columns.push("dogs");
        }
        if self.cats.contains(&index) {
            columns.push("cats");
        }
        columns
    }
}

/// Everything the dashboard shows for one view of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub records: Vec<DistrictRecord>,
    pub metrics: DashboardMetrics,
    pub share: SpeciesShare,
    pub highlights: Highlights,
}

impl DashboardSummary {
    /// (district, total) pairs in row order, the data behind the bar chart
    pub fn district_totals(&self) -> Vec<(&str, u64)> {
        self.records
            .iter()
            .map(|r| (r.district.as_str(), r.total))
            .collect()
    }
}

/// Perform Stage 2: compute metrics, shares and highlighted maxima
pub fn summarize(table: &NormalizedTable) -> Result<DashboardSummary, LoadError> {
    let records = DistrictRecord::from_table(table)?;

    let metrics = DashboardMetrics {
        total: saturating_sum(records.iter().map(|r| r.total)),
        dogs: saturating_sum(records.iter().map(|r| r.dogs)),
        cats: saturating_sum(records.iter().map(|r| r.cats)),
    };

    let highlights = Highlights {
        total: max_rows(records.iter().map(|r| r.total)),
        dogs: max_rows(records.iter().map(|r| r.dogs)),
        cats: max_rows(records.iter().map(|r| r.cats)),
    };

    Ok(DashboardSummary {
        share: SpeciesShare::new(metrics.dogs, metrics.cats),
        records,
        metrics,
        highlights,
    })
}

/// Indices of every value equal to the maximum; ties are all kept
fn max_rows(values: impl Iterator<Item = u64> + Clone) -> Vec<usize> {
    let Some(max) = values.clone().max() else {
        return Vec::new();
    };
    values
        .enumerate()
        .filter(|(_, v)| *v == max)
        .map(|(i, _)| i)
        .collect()
}
