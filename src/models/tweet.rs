use serde::Serialize;

/// 原始推文记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweetRecord {
    /// `None` when the source cell is empty or not textual.
    pub text: Option<String>,
    pub symbol: String,
}

impl TweetRecord {
    pub fn new(text: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            symbol: symbol.into(),
        }
    }

    /// 文本缺失的行（例如 CSV 中的空单元格）
    pub fn without_text(symbol: impl Into<String>) -> Self {
        Self {
            text: None,
            symbol: symbol.into(),
        }
    }
}

/// Polarity scores for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentScores {
    pub compound: f64,
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

/// 打分后的推文
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTweet {
    pub text: String,
    pub symbol: String,
    pub scores: SentimentScores,
}
