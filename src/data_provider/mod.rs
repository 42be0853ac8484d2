use log::info;

use crate::errors::Result;
use crate::models::signal::{CombinedRecord, Decision};
use crate::util::arrow_utils;
use std::collections::HashMap;
use std::path::Path;

/// 按信号划分的展示视图，不落盘
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationView {
    pub buy: Vec<String>,
    pub sell: Vec<String>,
    /// Everything that is neither BUY nor SELL.
    pub hold: Vec<String>,
}

/// 推荐结果提供者，用于读取并展示合并结果文件
pub struct RecommendationProvider {
    data: Vec<CombinedRecord>,
    // 索引用于快速查找
    symbol_index: HashMap<String, usize>,
    decision_index: HashMap<Decision, Vec<usize>>,
}

impl RecommendationProvider {
    /// 使用提供的数据创建实例
    pub fn new_with_data(data: Vec<CombinedRecord>) -> Self {
        let mut provider = Self {
            data,
            symbol_index: HashMap::new(),
            decision_index: HashMap::new(),
        };

        provider.rebuild_indices();
        provider
    }

    /// 从文件加载数据
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = arrow_utils::read_combined(path)?;
        info!("Loaded {} recommendations from {}", data.len(), path.display());
        Ok(Self::new_with_data(data))
    }

    pub fn get_all(&self) -> &[CombinedRecord] {
        &self.data
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<&CombinedRecord> {
        self.symbol_index.get(symbol).map(|&idx| &self.data[idx])
    }

    pub fn get_by_decision(&self, decision: Decision) -> Vec<&CombinedRecord> {
        self.decision_index
            .get(&decision)
            .map(|indices| indices.iter().map(|&idx| &self.data[idx]).collect())
            .unwrap_or_default()
    }

    /// 生成 BUY / SELL / HOLD 列表
    pub fn view(&self) -> RecommendationView {
        let symbols = |decision| {
            self.get_by_decision(decision)
                .into_iter()
                .map(|r| r.symbol.clone())
                .collect::<Vec<_>>()
        };

        RecommendationView {
            buy: symbols(Decision::Buy),
            sell: symbols(Decision::Sell),
            hold: symbols(Decision::Hold),
        }
    }

    /// 重建索引
    fn rebuild_indices(&mut self) {
        self.symbol_index.clear();
        self.decision_index.clear();

        for (i, record) in self.data.iter().enumerate() {
            self.symbol_index.insert(record.symbol.clone(), i);

            self.decision_index
                .entry(record.decision)
                .or_insert_with(Vec::new)
                .push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, avg: f64, decision: Decision) -> CombinedRecord {
        CombinedRecord {
            symbol: symbol.to_string(),
            price: 10.0,
            avg_compound: avg,
            decision,
        }
    }

    #[test]
    fn view_partitions_by_decision() {
        let provider = RecommendationProvider::new_with_data(vec![
            record("TSLA", 0.5, Decision::Buy),
            record("BA", -0.4, Decision::Sell),
            record("PG", 0.0, Decision::Hold),
            record("AMD", 0.3, Decision::Buy),
        ]);

        let view = provider.view();
        assert_eq!(view.buy, vec!["TSLA", "AMD"]);
        assert_eq!(view.sell, vec!["BA"]);
        assert_eq!(view.hold, vec!["PG"]);
    }

    #[test]
    fn lookup_by_symbol() {
        let provider = RecommendationProvider::new_with_data(vec![record("NIO", -0.5, Decision::Sell)]);
        assert_eq!(provider.get_by_symbol("NIO").map(|r| r.decision), Some(Decision::Sell));
        assert!(provider.get_by_symbol("nio").is_none());
        assert!(provider.get_by_decision(Decision::Buy).is_empty());
    }

    #[test]
    fn empty_provider_has_empty_view() {
        let provider = RecommendationProvider::new_with_data(Vec::new());
        assert_eq!(provider.view(), RecommendationView::default());
    }

    #[test]
    fn load_from_written_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined_stock_data.csv");
        let provider = RecommendationProvider::new_with_data(vec![
            record("TSLA", 0.5, Decision::Buy),
            record("PG", 0.0, Decision::Hold),
        ]);
        arrow_utils::save_combined(provider.get_all(), &path).unwrap();

        let loaded = RecommendationProvider::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_all(), provider.get_all());
        assert_eq!(loaded.view().buy, vec!["TSLA"]);
    }
}
