use crate::errors::Result;
use crate::models::signal::PriceSnapshot;
use async_trait::async_trait;
use log::{info, warn};

/// Base trait for current-price sources
#[async_trait]
pub trait PriceProvider {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the most recent close for `symbol`.
    /// `Ok(None)` means the provider has no data for the symbol right now.
    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>>;
}

/// 获取一组股票的价格快照
///
/// Per-symbol failures are logged and recorded as an absent price; they never
/// fail the whole snapshot.
pub async fn fetch_snapshot(
    provider: &(dyn PriceProvider + Send + Sync),
    symbols: &[String],
) -> Vec<PriceSnapshot> {
    let mut snapshots = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let price = match provider.fetch_price(symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!("Failed to fetch price for {} from {}: {}", symbol, provider.name(), e);
                None
            }
        };
        snapshots.push(PriceSnapshot {
            symbol: symbol.clone(),
            price,
        });
    }

    let priced = snapshots.iter().filter(|s| s.price.is_some()).count();
    info!("{}: got prices for {} of {} symbols", provider.name(), priced, symbols.len());
    snapshots
}
