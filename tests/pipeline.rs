use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use egostrategy_sentiment::analysis::{SentimentScorer, Thresholds};
use egostrategy_sentiment::config::{ColumnMapping, Config};
use egostrategy_sentiment::providers::SnapshotPriceProvider;
use egostrategy_sentiment::util::arrow_utils;
use egostrategy_sentiment::{
    CombinedRecord, Decision, PipelineService, PriceSnapshot, RecommendationProvider, SentimentError,
    SentimentScores,
};

/// Scorer with hand-picked polarities so results are exact.
struct FixedLexiconScorer {
    table: HashMap<&'static str, f64>,
}

impl FixedLexiconScorer {
    fn new() -> Self {
        let table = [
            ("great buy!", 0.6),
            ("terrible crash", -0.6),
            ("ok fine", 0.0),
            ("to the moon", 0.9),
            ("bankrupt soon", -0.7),
        ]
        .into_iter()
        .collect();
        Self { table }
    }
}

impl SentimentScorer for FixedLexiconScorer {
    fn polarity_scores(&self, text: &str) -> SentimentScores {
        let compound = self.table.get(text).copied().unwrap_or(0.0);
        SentimentScores {
            compound,
            negative: if compound < 0.0 { -compound } else { 0.0 },
            neutral: 1.0 - compound.abs(),
            positive: if compound > 0.0 { compound } else { 0.0 },
        }
    }
}

fn service(tweets: &Path, output: &Path, prices: &[PriceSnapshot]) -> PipelineService {
    let config = Config::new()
        .with_tweet_file(tweets)
        .with_output_file(output)
        .with_symbols(Vec::new());
    PipelineService::new(
        config,
        Box::new(FixedLexiconScorer::new()),
        Arc::new(SnapshotPriceProvider::new(prices)),
    )
}

fn price(symbol: &str, value: Option<f64>) -> PriceSnapshot {
    PriceSnapshot {
        symbol: symbol.to_string(),
        price: value,
    }
}

#[tokio::test]
async fn end_to_end_drops_unpriced_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(
        &tweets,
        "Tweet,Stock Symbol\ngreat buy!,XYZ\nterrible crash,XYZ\nok fine,ABC\n",
    )
    .unwrap();

    let summary = service(&tweets, &output, &[price("XYZ", Some(100.0)), price("ABC", None)])
        .run()
        .await
        .unwrap();

    assert_eq!(summary.rows_scored, 3);
    assert_eq!(summary.rows_skipped, 0);
    assert_eq!(summary.symbols_joined, 1);
    assert_eq!(summary.symbols_dropped_missing_price, 1);

    let records = arrow_utils::read_combined(&output).unwrap();
    assert_eq!(
        records,
        vec![CombinedRecord {
            symbol: "XYZ".to_string(),
            price: 100.0,
            avg_compound: 0.0,
            decision: Decision::Hold,
        }]
    );

    let header = fs::read_to_string(&output).unwrap();
    assert!(header.starts_with("Stock Symbol,Current Price,sentiment_score,Decision"));
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    fs::write(
        &tweets,
        "Date,Tweet,Stock Name\n\
         2022-09-29,to the moon,TSLA\n\
         2022-09-29,bankrupt soon,NIO\n\
         2022-09-30,great buy!,TSLA\n\
         2022-09-30,ok fine,PG\n",
    )
    .unwrap();
    let prices = [price("TSLA", Some(265.25)), price("NIO", Some(4.1)), price("PG", Some(151.0))];

    service(&tweets, &first, &prices).run().await.unwrap();
    service(&tweets, &second, &prices).run().await.unwrap();
    // 覆盖写入同一路径
    service(&tweets, &first, &prices).run().await.unwrap();

    let a = fs::read(&first).unwrap();
    let b = fs::read(&second).unwrap();
    assert_eq!(a, b);

    let view = RecommendationProvider::load_from_file(&first).unwrap().view();
    assert_eq!(view.buy, vec!["TSLA"]);
    assert_eq!(view.sell, vec!["NIO"]);
    assert_eq!(view.hold, vec!["PG"]);
}

#[tokio::test]
async fn empty_dataset_gives_empty_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(&tweets, "Tweet,Stock Symbol\n").unwrap();

    let summary = service(&tweets, &output, &[price("XYZ", Some(1.0))]).run().await.unwrap();

    assert_eq!(summary.rows_total, 0);
    assert_eq!(summary.symbols_aggregated, 0);
    assert!(arrow_utils::read_combined(&output).unwrap().is_empty());
}

#[tokio::test]
async fn malformed_row_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(
        &tweets,
        "Tweet,Stock Symbol\nto the moon,AMD\n,AMD\ngreat buy!,AMD\nto the moon,AMD\n",
    )
    .unwrap();

    let summary = service(&tweets, &output, &[price("AMD", Some(150.0))]).run().await.unwrap();

    assert_eq!(summary.rows_total, 4);
    assert_eq!(summary.rows_scored, 3);
    assert_eq!(summary.rows_skipped, 1);

    let records = arrow_utils::read_combined(&output).unwrap();
    assert_eq!(records.len(), 1);
    assert!((records[0].avg_compound - 0.8).abs() < 1e-9);
    assert_eq!(records[0].decision, Decision::Buy);
}

#[tokio::test]
async fn missing_columns_leave_previous_artifact_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(&tweets, "Text,Ticker\nto the moon,AMD\n").unwrap();
    fs::write(&output, "previous run\n").unwrap();

    let err = service(&tweets, &output, &[]).run().await.unwrap_err();
    assert!(matches!(err, SentimentError::MissingColumns(_)));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous run\n");
}

#[tokio::test]
async fn custom_column_mapping_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(&tweets, "Text,Ticker\nbankrupt soon,BA\n").unwrap();

    let config = Config::new()
        .with_tweet_file(&tweets)
        .with_output_file(&output)
        .with_symbols(vec!["BA".to_string()])
        .with_columns(ColumnMapping {
            text: "Text".to_string(),
            symbol: "Symbol".to_string(),
            symbol_aliases: vec!["Ticker".to_string()],
        });
    let service = PipelineService::new(
        config,
        Box::new(FixedLexiconScorer::new()),
        Arc::new(SnapshotPriceProvider::new(&[price("BA", Some(180.0))])),
    );

    service.run().await.unwrap();
    let records = arrow_utils::read_combined(&output).unwrap();
    assert_eq!(records[0].decision, Decision::Sell);
}

#[tokio::test]
async fn missing_dataset_fails_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("combined_stock_data.csv");

    let err = service(&dir.path().join("absent.csv"), &output, &[])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, SentimentError::DatasetNotFound(_)));
    assert!(!output.exists());
}

#[tokio::test]
async fn configured_thresholds_drive_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let tweets = dir.path().join("stock_tweets.csv");
    let output = dir.path().join("combined_stock_data.csv");
    fs::write(&tweets, "Tweet,Stock Symbol\ngreat buy!,TSLA\nterrible crash,BA\n").unwrap();

    let config = Config::new()
        .with_tweet_file(&tweets)
        .with_output_file(&output)
        .with_symbols(Vec::new())
        .with_thresholds(Thresholds { buy_above: 0.7, sell_below: -0.7 });
    let service = PipelineService::new(
        config,
        Box::new(FixedLexiconScorer::new()),
        Arc::new(SnapshotPriceProvider::new(&[price("TSLA", Some(250.0)), price("BA", Some(180.0))])),
    );

    let summary = service.run().await.unwrap();
    assert_eq!(summary.hold, 2);
    let view = RecommendationProvider::load_from_file(&output).unwrap().view();
    assert_eq!(view.hold, vec!["TSLA", "BA"]);
}
