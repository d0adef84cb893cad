use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{GalleryImage, HumanReport, MachineReport};
use crate::stages::{DashboardSummary, DistrictSelection};

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Whether to generate machine-readable output
    pub generate_machine: bool,
    /// Whether to generate human-readable output
    pub generate_human: bool,
    /// Width in characters of the longest bar in the district chart
    pub bar_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            generate_machine: true,
            generate_human: true,
            bar_width: 40,
        }
    }
}

/// Where a summary came from and how it was narrowed
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub source: &'a Path,
    pub selection: &'a DistrictSelection,
    pub images: &'a [GalleryImage],
}

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct RenderResult {
    /// Path to machine report (if generated)
    pub machine_path: Option<PathBuf>,
    /// Human dashboard text (if generated)
    pub human_text: Option<String>,
}

/// Execute Stage 3: Rendering
///
/// Produces up to two views:
/// 1. Machine report: JSON with metrics, shares and per-district rows
/// 2. Human report: metrics, a bar chart and the highlighted table as text
pub fn execute_render(
    summary: &DashboardSummary,
    context: &ReportContext<'_>,
    machine_output: Option<&Path>,
    config: &RenderConfig,
) -> Result<RenderResult> {
    let mut result = RenderResult {
        machine_path: None,
        human_text: None,
    };

    if config.generate_machine {
        if let Some(path) = machine_output {
            info!("Writing machine report to {:?}", path);
            let report = MachineReport::from_summary(summary, context.source, context.selection);
            report.write_json(path)?;
            result.machine_path = Some(path.to_path_buf());
        }
    }

    if config.generate_human {
        let human = HumanReport::new(summary, context.images, config.bar_width);
        result.human_text = Some(human.format());
    }

    Ok(result)
}
