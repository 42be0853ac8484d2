use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Excel parsing error: {0}")]
    ExcelError(#[from] calamine::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    /// 单行数据的文本字段无法作为文本处理，可跳过该行
    #[error("Invalid input at row {row}: {reason}")]
    InvalidInput { row: usize, reason: String },

    /// 数据集缺少必需列，整个运行无法继续
    #[error("Required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// 单个股票价格获取失败，按缺失价格处理
    #[error("Price provider unavailable for {symbol}: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SentimentError {
    /// Row-scoped errors never abort a batch on their own.
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            SentimentError::InvalidInput { .. } | SentimentError::ProviderUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;

// 用于从字符串创建错误
impl From<String> for SentimentError {
    fn from(s: String) -> Self {
        SentimentError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for SentimentError {
    fn from(s: &str) -> Self {
        SentimentError::Unknown(s.to_string())
    }
}

impl From<arrow_schema::ArrowError> for SentimentError {
    fn from(e: arrow_schema::ArrowError) -> Self {
        SentimentError::ArrowError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_scoped_errors_are_recoverable() {
        let invalid = SentimentError::InvalidInput { row: 3, reason: "null text".into() };
        let provider = SentimentError::ProviderUnavailable {
            symbol: "TSLA".into(),
            reason: "timeout".into(),
        };
        assert!(invalid.is_row_scoped());
        assert!(provider.is_row_scoped());
        assert!(!SentimentError::DatasetNotFound("x.csv".into()).is_row_scoped());
        assert!(!SentimentError::MissingColumns(vec!["Tweet".into()]).is_row_scoped());
    }

    #[test]
    fn missing_columns_message_lists_names() {
        let err = SentimentError::MissingColumns(vec!["Tweet".into(), "Stock Symbol".into()]);
        assert_eq!(err.to_string(), "Required columns missing: Tweet, Stock Symbol");
    }
}
