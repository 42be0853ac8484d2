use std::collections::HashMap;

use crate::models::signal::SymbolSentiment;
use crate::models::tweet::ScoredTweet;

/// 按股票代码聚合平均情绪
///
/// Groups on the exact, case-sensitive symbol and averages `compound`. Output
/// keeps the order in which each symbol first appears in `rows`.
pub fn aggregate(rows: &[ScoredTweet]) -> Vec<SymbolSentiment> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64, usize)> = Vec::new();

    for row in rows {
        let idx = *index.entry(row.symbol.as_str()).or_insert_with(|| {
            sums.push((row.symbol.as_str(), 0.0, 0));
            sums.len() - 1
        });
        sums[idx].1 += row.scores.compound;
        sums[idx].2 += 1;
    }

    sums.into_iter()
        .map(|(symbol, sum, count)| SymbolSentiment {
            symbol: symbol.to_string(),
            avg_compound: sum / count as f64,
            tweet_count: count,
        })
        .collect()
}
