use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use shelterboard::{
    discover_images, districts, execute_render, filter_districts, load, summarize,
    DistrictSelection, GalleryImage, LoadConfig, LoadError, NormalizedTable, RenderConfig,
    ReportContext,
};

#[derive(Parser)]
#[command(name = "shelterboard")]
#[command(author, version, about = "Animal shelter intake dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Shelter statistics CSV file with a two-line header
    #[arg(short, long)]
    input: PathBuf,

    /// Preamble lines to skip before the header
    #[arg(long, default_value = "0")]
    skip_rows: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard: metrics, district chart and highlighted table
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Limit the view to these districts (repeatable; default all)
        #[arg(short, long = "district")]
        districts: Vec<String>,

        /// Directory to search for dog*.jpg/jpeg/png gallery images
        #[arg(long)]
        images: Option<PathBuf>,

        /// Width of the longest bar in the district chart
        #[arg(long, default_value = "40")]
        bar_width: usize,
    },

    /// Write the dashboard data as JSON
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Limit the view to these districts (repeatable; default all)
        #[arg(short, long = "district")]
        districts: Vec<String>,
    },

    /// List flattened column names and districts
    Columns {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            input,
            districts,
            images,
            bar_width,
        } => {
            setup_logging(input.verbose);
            print_summary(&input, districts, images.as_deref(), bar_width)
        }
        Commands::Export {
            input,
            output,
            districts,
        } => {
            setup_logging(input.verbose);
            export_summary(&input, &output, districts)
        }
        Commands::Columns { input } => {
            setup_logging(input.verbose);
            list_columns(&input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_table(args: &InputArgs) -> Result<NormalizedTable> {
    let config = LoadConfig {
        skip_rows: args.skip_rows,
        ..Default::default()
    };
    match load(&args.input, &config) {
        Ok(table) => Ok(table),
        Err(LoadError::NotFound(path)) => anyhow::bail!(
            "❌ 데이터 파일을 찾을 수 없어요! {} 파일이 있는지 확인해주세요.",
            path.display()
        ),
        Err(e) => Err(e).with_context(|| format!("Failed to load {:?}", args.input)),
    }
}

fn print_summary(
    args: &InputArgs,
    names: Vec<String>,
    image_dir: Option<&Path>,
    bar_width: usize,
) -> Result<()> {
    let table = load_table(args)?;
    let selection = DistrictSelection::from_names(names);
    let view = filter_districts(&table, &selection);
    let summary = summarize(&view).context("Failed to summarize table")?;

    let images: Vec<GalleryImage> = match image_dir {
        Some(dir) => discover_images(dir, "dog").unwrap_or_else(|e| {
            warn!("Skipping gallery: {:#}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    let context = ReportContext {
        source: &args.input,
        selection: &selection,
        images: &images,
    };
    let config = RenderConfig {
        generate_machine: false,
        bar_width,
        ..Default::default()
    };
    let result = execute_render(&summary, &context, None, &config)?;

    if let Some(text) = result.human_text {
        print!("{}", text);
    }
    Ok(())
}

fn export_summary(args: &InputArgs, output: &Path, names: Vec<String>) -> Result<()> {
    let table = load_table(args)?;
    let selection = DistrictSelection::from_names(names);
    let view = filter_districts(&table, &selection);
    let summary = summarize(&view).context("Failed to summarize table")?;

    let context = ReportContext {
        source: &args.input,
        selection: &selection,
        images: &[],
    };
    let config = RenderConfig {
        generate_human: false,
        ..Default::default()
    };
    let result = execute_render(&summary, &context, Some(output), &config)?;

    if let Some(path) = result.machine_path {
        info!(
            "Exported {} districts ({} animals) to {:?}",
            summary.records.len(),
            summary.metrics.total,
            path
        );
    }
    Ok(())
}

fn list_columns(args: &InputArgs) -> Result<()> {
    let table = load_table(args)?;

    println!("Columns");
    println!("-------");
    for column in table.columns() {
        println!("{} ({:?})", column.name, column.kind);
    }
    println!();

    let names = districts(&table);
    println!("Districts ({})", names.len());
    println!("---------");
    for name in names {
        println!("{}", name);
    }

    Ok(())
}
