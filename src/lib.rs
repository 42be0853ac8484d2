// 公开导出的模块，供外部使用
pub mod models;
pub mod analysis;
pub mod providers;
pub mod data_provider;
pub mod indicators;
pub mod errors;
pub mod config;
pub mod services;

// 文件读写工具主要供内部和命令行使用
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::tweet::{TweetRecord, ScoredTweet, SentimentScores};
pub use models::signal::{CombinedRecord, Decision, PriceSnapshot, SymbolSentiment};
pub use data_provider::{RecommendationProvider, RecommendationView};
pub use services::pipeline_service::{PipelineService, RunSummary};
pub use errors::{Result, SentimentError};
