use crate::models::signal::{JoinedSentiment, PriceMap, SymbolSentiment};

/// 情绪与价格做内连接
///
/// A symbol survives only when it has an aggregate and a present price. Output
/// follows the order of `sentiment`.
pub fn join(sentiment: &[SymbolSentiment], prices: &PriceMap) -> Vec<JoinedSentiment> {
    sentiment
        .iter()
        .filter_map(|s| {
            let price = prices.get(&s.symbol).copied().flatten()?;
            Some(JoinedSentiment {
                symbol: s.symbol.clone(),
                avg_compound: s.avg_compound,
                price,
            })
        })
        .collect()
}

/// Symbols that had sentiment but were dropped for lack of a price.
pub fn dropped_symbols(sentiment: &[SymbolSentiment], prices: &PriceMap) -> Vec<String> {
    sentiment
        .iter()
        .filter(|s| !matches!(prices.get(&s.symbol), Some(Some(_))))
        .map(|s| s.symbol.clone())
        .collect()
}
