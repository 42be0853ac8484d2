use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::SentimentError;

/// 交易信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    /// Literal stored in the combined artifact.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        }
    }

    /// 仅用于展示，不写入数据文件
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Buy => "BUY ✅",
            Decision::Sell => "SELL ❌",
            Decision::Hold => "HOLD ⏸️",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BUY" => Ok(Decision::Buy),
            "SELL" => Ok(Decision::Sell),
            "HOLD" => Ok(Decision::Hold),
            other => Err(SentimentError::DataError(format!("Unknown decision: {}", other))),
        }
    }
}

/// 单个股票的平均情绪
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSentiment {
    pub symbol: String,
    pub avg_compound: f64,
    pub tweet_count: usize,
}

/// 外部价格快照，`price` 为 `None` 表示数据源当时没有数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub price: Option<f64>,
}

pub type PriceMap = HashMap<String, Option<f64>>;

/// Collapses snapshots into a lookup table; a later entry for the same symbol wins.
pub fn price_map(snapshots: &[PriceSnapshot]) -> PriceMap {
    snapshots
        .iter()
        .map(|s| (s.symbol.clone(), s.price))
        .collect()
}

/// 情绪与价格的内连接结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedSentiment {
    pub symbol: String,
    pub avg_compound: f64,
    pub price: f64,
}

/// Final per-symbol row written to the combined artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRecord {
    pub symbol: String,
    pub price: f64,
    pub avg_compound: f64,
    pub decision: Decision,
}
