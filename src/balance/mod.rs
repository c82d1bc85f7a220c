pub mod aggregator;
pub mod sheet;
pub mod summary;
