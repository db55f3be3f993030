//! Domain models for fruit harvest estimation

mod estimate;
mod fruit;
mod histogram;
mod statistics;

pub use estimate::*;
pub use fruit::*;
pub use histogram::*;
pub use statistics::*;
