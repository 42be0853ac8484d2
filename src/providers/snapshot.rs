use crate::errors::Result;
use crate::models::signal::{price_map, PriceMap, PriceSnapshot};
use crate::providers::base::PriceProvider;
use crate::util::dataset_utils;
use async_trait::async_trait;
use std::path::Path;

/// 离线价格快照，数据来自文件或内存
pub struct SnapshotPriceProvider {
    prices: PriceMap,
}

impl SnapshotPriceProvider {
    pub fn new(snapshots: &[PriceSnapshot]) -> Self {
        Self {
            prices: price_map(snapshots),
        }
    }

    /// Loads a `symbol,price` CSV with a header row.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let snapshots = dataset_utils::load_price_snapshot(path)?;
        Ok(Self::new(&snapshots))
    }
}

#[async_trait]
impl PriceProvider for SnapshotPriceProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>> {
        Ok(self.prices.get(symbol).copied().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_symbols_are_absent() {
        let provider = SnapshotPriceProvider::new(&[
            PriceSnapshot { symbol: "XYZ".into(), price: Some(100.0) },
            PriceSnapshot { symbol: "ABC".into(), price: None },
        ]);
        assert_eq!(provider.fetch_price("XYZ").await.unwrap(), Some(100.0));
        assert_eq!(provider.fetch_price("ABC").await.unwrap(), None);
        assert_eq!(provider.fetch_price("QQQ").await.unwrap(), None);
    }
}
