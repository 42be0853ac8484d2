use crate::analysis::classifier::Thresholds;
use std::path::PathBuf;
use std::time::Duration;

/// 默认关注的美股代码
pub const DEFAULT_SYMBOLS: [&str; 24] = [
    "TSLA", "MSFT", "PG", "META", "AMZN", "GOOG", "AAPL", "AMD", "NFLX",
    "TSM", "KOF", "PYPL", "NOC", "BX", "BA", "INTC", "CRM", "NU", "DTS",
    "COST", "ENPH", "NIO", "ZS", "XPEV",
];

/// 推文数据集的列名映射
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub text: String,
    pub symbol: String,
    /// Accepted in place of `symbol` when that column is absent, first match wins.
    pub symbol_aliases: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            text: "Tweet".to_string(),
            symbol: "Stock Symbol".to_string(),
            symbol_aliases: vec!["Stock Name".to_string()],
        }
    }
}

/// 行级错误的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// 记录并跳过出错的行
    Skip,
    /// 遇到第一条出错的行即终止整个批次
    Abort,
}

pub struct Config {
    pub tweet_file: PathBuf,
    pub output_file: PathBuf,
    pub columns: ColumnMapping,
    /// Empty means "every symbol seen in the tweets".
    pub symbols: Vec<String>,
    pub thresholds: Thresholds,
    pub error_policy: ErrorPolicy,
    pub request_timeout: Duration,
    pub request_interval: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self {
            tweet_file: PathBuf::from("stock_tweets.csv"),
            output_file: PathBuf::from("combined_stock_data.csv"),
            columns: ColumnMapping::default(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            thresholds: Thresholds::default(),
            error_policy: ErrorPolicy::Skip,
            request_timeout: Duration::from_secs(30),
            request_interval: Duration::from_millis(500),
        }
    }

    pub fn with_tweet_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tweet_file = path.into();
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
