use crate::analysis::{aggregator, classifier, joiner, scorer};
use crate::analysis::scorer::SentimentScorer;
use crate::config::Config;
use crate::errors::Result;
use crate::models::signal::{price_map, CombinedRecord, Decision, PriceSnapshot, SymbolSentiment};
use crate::models::tweet::TweetRecord;
use crate::providers::base::{fetch_snapshot, PriceProvider};
use crate::util::{arrow_utils, dataset_utils};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

/// 运行摘要，使内连接造成的数据丢失可观测
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub rows_total: usize,
    pub rows_scored: usize,
    pub rows_skipped: usize,
    pub symbols_aggregated: usize,
    pub symbols_joined: usize,
    pub symbols_dropped_missing_price: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Run summary: {} rows scored, {} rows skipped, {} symbols joined, {} symbols dropped for missing price",
            self.rows_scored, self.rows_skipped, self.symbols_joined, self.symbols_dropped_missing_price
        );
        info!("Signals: {} BUY, {} SELL, {} HOLD", self.buy, self.sell, self.hold);
    }
}

/// 单次运行的上下文，在各阶段之间按引用传递
pub struct PipelineContext<'a> {
    pub config: &'a Config,
    pub scorer: &'a dyn SentimentScorer,
    pub summary: RunSummary,
}

impl<'a> PipelineContext<'a> {
    pub fn new(config: &'a Config, scorer: &'a dyn SentimentScorer) -> Self {
        Self {
            config,
            scorer,
            summary: RunSummary::default(),
        }
    }

    /// 打分并按股票聚合
    pub fn score_and_aggregate(&mut self, tweets: &[TweetRecord]) -> Result<Vec<SymbolSentiment>> {
        let outcome = scorer::score_batch(self.scorer, tweets, self.config.error_policy)?;
        self.summary.rows_total = tweets.len();
        self.summary.rows_scored = outcome.scored.len();
        self.summary.rows_skipped = outcome.skipped.len();

        let sentiment = aggregator::aggregate(&outcome.scored);
        self.summary.symbols_aggregated = sentiment.len();
        Ok(sentiment)
    }

    /// Symbols to price: the configured universe, or every aggregated symbol when none is set.
    pub fn price_universe(&self, sentiment: &[SymbolSentiment]) -> Vec<String> {
        if self.config.symbols.is_empty() {
            sentiment.iter().map(|s| s.symbol.clone()).collect()
        } else {
            self.config.symbols.clone()
        }
    }

    /// 与价格内连接并生成信号
    pub fn join_and_classify(
        &mut self,
        sentiment: &[SymbolSentiment],
        prices: &[PriceSnapshot],
    ) -> Vec<CombinedRecord> {
        let prices = price_map(prices);
        let joined = joiner::join(sentiment, &prices);

        let dropped = joiner::dropped_symbols(sentiment, &prices);
        if !dropped.is_empty() {
            warn!("Dropped {} symbols without a price: {}", dropped.len(), dropped.join(", "));
        }

        let records = classifier::classify_all(&joined, &self.config.thresholds);
        self.summary.symbols_joined = records.len();
        self.summary.symbols_dropped_missing_price = dropped.len();
        self.summary.buy = records.iter().filter(|r| r.decision == Decision::Buy).count();
        self.summary.sell = records.iter().filter(|r| r.decision == Decision::Sell).count();
        self.summary.hold = records.iter().filter(|r| r.decision == Decision::Hold).count();
        records
    }
}

pub struct PipelineOutput {
    pub records: Vec<CombinedRecord>,
    pub summary: RunSummary,
}

/// 舆情分析服务：加载推文、打分、聚合、获取价格、生成信号并保存
pub struct PipelineService {
    config: Config,
    scorer: Box<dyn SentimentScorer + Send + Sync>,
    provider: Arc<dyn PriceProvider + Send + Sync>,
}

impl PipelineService {
    pub fn new(
        config: Config,
        scorer: Box<dyn SentimentScorer + Send + Sync>,
        provider: Arc<dyn PriceProvider + Send + Sync>,
    ) -> Self {
        Self {
            config,
            scorer,
            provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every stage on in-memory inputs; nothing is written.
    pub fn evaluate(&self, tweets: &[TweetRecord], prices: &[PriceSnapshot]) -> Result<PipelineOutput> {
        let mut ctx = PipelineContext::new(&self.config, self.scorer.as_ref());
        let sentiment = ctx.score_and_aggregate(tweets)?;
        let records = ctx.join_and_classify(&sentiment, prices);
        Ok(PipelineOutput {
            records,
            summary: ctx.summary,
        })
    }

    /// 运行完整流程
    ///
    /// Fatal errors (missing dataset, missing columns, strict-mode row errors)
    /// return before the output file is touched.
    pub async fn run(&self) -> Result<RunSummary> {
        info!("Loading tweets from {}", self.config.tweet_file.display());
        let tweets = dataset_utils::load_tweets(&self.config.tweet_file, &self.config.columns)?;

        let mut ctx = PipelineContext::new(&self.config, self.scorer.as_ref());
        let sentiment = ctx.score_and_aggregate(&tweets)?;

        let universe = ctx.price_universe(&sentiment);
        info!("Fetching prices for {} symbols from {}", universe.len(), self.provider.name());
        let prices = fetch_snapshot(self.provider.as_ref(), &universe).await;

        let records = ctx.join_and_classify(&sentiment, &prices);
        arrow_utils::save_combined(&records, &self.config.output_file)?;

        ctx.summary.log();
        info!("Saved combined data to {}", self.config.output_file.display());
        Ok(ctx.summary)
    }
}
