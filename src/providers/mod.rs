pub mod base;
pub mod snapshot;
pub mod yahoo;

pub use base::{fetch_snapshot, PriceProvider};
pub use snapshot::SnapshotPriceProvider;
pub use yahoo::YahooPriceProvider;
