pub mod cache;
pub mod error;
pub mod io;
pub mod models;
pub mod stages;

pub use cache::TableCache;
pub use error::LoadError;
pub use io::{discover_images, load, parse_csv_str, GalleryImage, HumanReport, MachineReport};
pub use models::{DistrictRecord, HeaderKey, LoadConfig, NormalizedTable, RawTable, Value};
pub use stages::{
    districts, execute_render, filter_districts, normalize, summarize, DashboardSummary,
    DistrictSelection, RenderConfig, ReportContext,
};
