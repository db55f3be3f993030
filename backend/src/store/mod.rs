//! Record store implementations backing the estimation service

mod postgres;

pub use postgres::PgFruitStore;
