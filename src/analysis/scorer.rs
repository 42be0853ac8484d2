//! Lexicon-based text sentiment scoring.
//!
//! Text is NFKD-normalized before it reaches the lexicon so that equivalent
//! glyph representations (full-width letters, ligatures, composed accents)
//! score identically.

use log::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::config::ErrorPolicy;
use crate::errors::{Result, SentimentError};
use crate::models::tweet::{ScoredTweet, SentimentScores, TweetRecord};

/// Maps already-normalized text to polarity scores.
pub trait SentimentScorer {
    fn polarity_scores(&self, text: &str) -> SentimentScores;
}

/// VADER 词典打分器
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn polarity_scores(&self, text: &str) -> SentimentScores {
        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or_default();
        SentimentScores {
            compound: get("compound"),
            negative: get("neg"),
            neutral: get("neu"),
            positive: get("pos"),
        }
    }
}

/// NFKD 规范化
pub fn normalize_text(text: &str) -> String {
    text.nfkd().collect()
}

pub fn score_text<S: SentimentScorer + ?Sized>(scorer: &S, text: &str) -> SentimentScores {
    scorer.polarity_scores(&normalize_text(text))
}

/// Scores a single input row. `row` is the 0-based data row index, used only for reporting.
pub fn score_record<S: SentimentScorer + ?Sized>(
    scorer: &S,
    row: usize,
    record: &TweetRecord,
) -> Result<ScoredTweet> {
    let text = record.text.as_deref().ok_or_else(|| SentimentError::InvalidInput {
        row,
        reason: "text is missing or not a string".to_string(),
    })?;

    if record.symbol.trim().is_empty() {
        return Err(SentimentError::InvalidInput {
            row,
            reason: "symbol is missing".to_string(),
        });
    }

    Ok(ScoredTweet {
        text: text.to_string(),
        symbol: record.symbol.clone(),
        scores: score_text(scorer, text),
    })
}

/// 被跳过的行
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreOutcome {
    pub scored: Vec<ScoredTweet>,
    pub skipped: Vec<SkippedRow>,
}

/// 对整批推文打分
///
/// With [`ErrorPolicy::Skip`] a bad row is logged, recorded in `skipped` and the
/// batch continues. With [`ErrorPolicy::Abort`] the first bad row fails the batch.
pub fn score_batch<S: SentimentScorer + ?Sized>(
    scorer: &S,
    records: &[TweetRecord],
    policy: ErrorPolicy,
) -> Result<ScoreOutcome> {
    let mut outcome = ScoreOutcome {
        scored: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
    };

    for (row, record) in records.iter().enumerate() {
        match score_record(scorer, row, record) {
            Ok(scored) => outcome.scored.push(scored),
            Err(e) if policy == ErrorPolicy::Skip && e.is_row_scoped() => {
                let reason = match e {
                    SentimentError::InvalidInput { reason, .. } => reason,
                    other => other.to_string(),
                };
                warn!("Skipping tweet at row {}: {}", row, reason);
                outcome.skipped.push(SkippedRow { row, reason });
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "Scored {} tweets, skipped {}",
        outcome.scored.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
