//! Data module - CSV loading, static code tables and column helpers

pub mod codes;
pub mod frame;
mod loader;
mod medal;

pub use loader::{DataStore, LoaderError, Table, TableSummary};
pub use medal::{MedalTally, MedalType};
