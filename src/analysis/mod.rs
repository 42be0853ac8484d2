//! 舆情分析核心：打分 → 聚合 → 价格连接 → 信号分类

pub mod aggregator;
pub mod classifier;
pub mod joiner;
pub mod scorer;

pub use aggregator::aggregate;
pub use classifier::{classify, classify_all, Thresholds};
pub use joiner::join;
pub use scorer::{score_batch, SentimentScorer, VaderScorer};
