//! Harvest estimation core shared by the server and the browser module
//!
//! Projects scanned fruit volumes forward under linear growth, filters by
//! average diameter, and summarizes the projected volumes as statistics and
//! histograms.

pub mod estimation;
pub mod models;
pub mod store;
pub mod types;
pub mod validation;

pub use estimation::*;
pub use models::*;
pub use store::*;
pub use types::*;
pub use validation::*;
