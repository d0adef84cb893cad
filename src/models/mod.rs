pub mod header;
pub mod record;
pub mod table;

pub use header::*;
pub use record::*;
pub use table::*;
