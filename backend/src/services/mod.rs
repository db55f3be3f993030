//! Business logic services for harvest estimation

pub mod harvest;

pub use harvest::HarvestEstimationService;
