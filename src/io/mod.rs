/// CSV export of the sample series.
pub mod export;

pub use export::{export_csv, write_csv};
