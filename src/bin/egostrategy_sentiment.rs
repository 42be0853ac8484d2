use egostrategy_sentiment::analysis::{Thresholds, VaderScorer};
use egostrategy_sentiment::config::{ColumnMapping, Config, ErrorPolicy};
use egostrategy_sentiment::data_provider::RecommendationProvider;
use egostrategy_sentiment::indicators::{self, IndicatorConfig};
use egostrategy_sentiment::providers::{PriceProvider, SnapshotPriceProvider, YahooPriceProvider};
use egostrategy_sentiment::services::pipeline_service::PipelineService;
use egostrategy_sentiment::util::{arrow_utils, dataset_utils};

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = build_app().get_matches();

    if let Some(matches) = matches.subcommand_matches("run") {
        run_pipeline(matches).await?;
    } else if let Some(matches) = matches.subcommand_matches("show") {
        show_recommendations(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("indicators") {
        show_indicators(matches)?;
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

fn build_app() -> App<'static> {
    App::new("Sentiment")
        .version("1.0.0")
        .author("EgoStrategy Team")
        .about("Tweet sentiment based stock recommendations")
        .subcommand(
            SubCommand::with_name("run")
                .about("Score tweets, join with current prices and write recommendations")
                .arg(
                    Arg::with_name("tweets")
                        .short('t')
                        .long("tweets")
                        .value_name("FILE")
                        .help("Tweet dataset (.csv or .xlsx)")
                        .takes_value(true)
                        .default_value("stock_tweets.csv"),
                )
                .arg(
                    Arg::with_name("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Combined output file (.csv, or .arrow for Arrow IPC)")
                        .takes_value(true)
                        .default_value("combined_stock_data.csv"),
                )
                .arg(
                    Arg::with_name("prices")
                        .short('p')
                        .long("prices")
                        .value_name("FILE")
                        .help("Offline price snapshot CSV (symbol,price) instead of Yahoo Finance")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("symbols")
                        .short('s')
                        .long("symbols")
                        .value_name("SYMBOLS")
                        .help("Comma separated symbol universe to price")
                        .takes_value(true)
                        .conflicts_with("tweet-symbols"),
                )
                .arg(
                    Arg::with_name("tweet-symbols")
                        .long("tweet-symbols")
                        .help("Price every symbol found in the tweets")
                        .takes_value(false),
                )
                .arg(
                    Arg::with_name("text-column")
                        .long("text-column")
                        .value_name("NAME")
                        .takes_value(true)
                        .default_value("Tweet"),
                )
                .arg(
                    Arg::with_name("symbol-column")
                        .long("symbol-column")
                        .value_name("NAME")
                        .takes_value(true)
                        .default_value("Stock Symbol"),
                )
                .arg(
                    Arg::with_name("alias")
                        .long("alias")
                        .value_name("NAME")
                        .help("Accepted alternative name for the symbol column (repeatable)")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::with_name("strict")
                        .long("strict")
                        .help("Abort on the first malformed tweet instead of skipping it")
                        .takes_value(false),
                )
                .arg(
                    Arg::with_name("buy-above")
                        .long("buy-above")
                        .value_name("SCORE")
                        .help("BUY when the average compound score is strictly above this")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("0.2"),
                )
                .arg(
                    Arg::with_name("sell-below")
                        .long("sell-below")
                        .value_name("SCORE")
                        .help("SELL when the average compound score is strictly below this")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("-0.2"),
                )
                .arg(
                    Arg::with_name("timeout-secs")
                        .long("timeout-secs")
                        .value_name("SECONDS")
                        .help("Per-request timeout for the price provider")
                        .takes_value(true)
                        .default_value("30"),
                )
                .arg(
                    Arg::with_name("interval-ms")
                        .long("interval-ms")
                        .value_name("MILLIS")
                        .help("Minimum interval between price requests")
                        .takes_value(true)
                        .default_value("500"),
                ),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Show saved recommendations")
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("FILE")
                        .takes_value(true)
                        .default_value("combined_stock_data.csv"),
                )
                .arg(
                    Arg::with_name("json")
                        .long("json")
                        .help("Print rows as JSON")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("indicators")
                .about("Show MACD and 200-day moving average for a stock")
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("FILE")
                        .help("Price history CSV with Date, Symbol, Close columns")
                        .takes_value(true)
                        .default_value("stock.csv"),
                )
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Number of most recent rows to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        )
}

async fn run_pipeline(matches: &ArgMatches) -> anyhow::Result<()> {
    let interval_ms = matches
        .value_of("interval-ms")
        .unwrap_or("500")
        .parse::<u64>()
        .context("invalid --interval-ms")?;
    let timeout_secs = matches
        .value_of("timeout-secs")
        .unwrap_or("30")
        .parse::<u64>()
        .context("invalid --timeout-secs")?;
    let thresholds = Thresholds {
        buy_above: matches
            .value_of("buy-above")
            .unwrap_or("0.2")
            .parse::<f64>()
            .context("invalid --buy-above")?,
        sell_below: matches
            .value_of("sell-below")
            .unwrap_or("-0.2")
            .parse::<f64>()
            .context("invalid --sell-below")?,
    };
    if thresholds.sell_below > thresholds.buy_above {
        bail!("--sell-below must not be greater than --buy-above");
    }

    let columns = ColumnMapping {
        text: matches.value_of("text-column").unwrap_or("Tweet").to_string(),
        symbol: matches.value_of("symbol-column").unwrap_or("Stock Symbol").to_string(),
        symbol_aliases: match matches.values_of("alias") {
            Some(values) => values.map(str::to_string).collect(),
            None => ColumnMapping::default().symbol_aliases,
        },
    };

    let mut config = Config::new()
        .with_tweet_file(matches.value_of("tweets").unwrap_or("stock_tweets.csv"))
        .with_output_file(matches.value_of("output").unwrap_or("combined_stock_data.csv"))
        .with_columns(columns)
        .with_thresholds(thresholds)
        .with_request_timeout(Duration::from_secs(timeout_secs))
        .with_request_interval(Duration::from_millis(interval_ms));

    if matches.is_present("strict") {
        config = config.with_error_policy(ErrorPolicy::Abort);
    }
    if matches.is_present("tweet-symbols") {
        config = config.with_symbols(Vec::new());
    } else if let Some(symbols) = matches.value_of("symbols") {
        let symbols: Vec<String> = symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if symbols.is_empty() {
            bail!("--symbols must name at least one symbol");
        }
        config = config.with_symbols(symbols);
    }

    let provider: Arc<dyn PriceProvider + Send + Sync> = match matches.value_of("prices") {
        Some(path) => Arc::new(SnapshotPriceProvider::load_from_file(Path::new(path))?),
        None => Arc::new(YahooPriceProvider::new(config.request_timeout, config.request_interval)?),
    };

    let service = PipelineService::new(config, Box::new(VaderScorer::new()), provider);
    let summary = service.run().await?;

    info!(
        "Done: {} BUY, {} SELL, {} HOLD written to {}",
        summary.buy,
        summary.sell,
        summary.hold,
        service.config().output_file.display()
    );
    Ok(())
}

fn show_recommendations(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = Path::new(matches.value_of("file").unwrap_or("combined_stock_data.csv"));
    let provider = RecommendationProvider::load_from_file(path)?;

    if matches.is_present("json") {
        println!("{}", arrow_utils::combined_to_json(provider.get_all())?);
        return Ok(());
    }

    if provider.get_all().is_empty() {
        info!("No data available for display. Run sentiment analysis first.");
        return Ok(());
    }

    info!("{:-<60}", "");
    info!("{:<12} {:>14} {:>16} {:<10}", "Symbol", "Current Price", "Sentiment", "Decision");
    info!("{:-<60}", "");
    for record in provider.get_all() {
        info!(
            "{:<12} {:>14.2} {:>16.4} {:<10}",
            record.symbol,
            record.price,
            record.avg_compound,
            record.decision.label()
        );
    }

    let view = provider.view();
    if view.buy.is_empty() {
        info!("No stocks recommended for buying.");
    } else {
        info!("Stocks to BUY: {}", view.buy.join(", "));
    }
    if view.sell.is_empty() {
        info!("No stocks recommended for selling.");
    } else {
        info!("Stocks to SELL: {}", view.sell.join(", "));
    }
    info!("Stocks to HOLD: {}", view.hold.join(", "));

    Ok(())
}

fn show_indicators(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = Path::new(matches.value_of("file").unwrap_or("stock.csv"));
    let symbol = matches.value_of("symbol").context("--symbol is required")?;
    let limit = matches
        .value_of("limit")
        .unwrap_or("10")
        .parse::<usize>()
        .context("invalid --limit")?;

    let history = dataset_utils::load_price_history(path, symbol)?;
    if history.is_empty() {
        info!("No price history for {} in {}", symbol, path.display());
        return Ok(());
    }

    let rows = indicators::compute(&history, &IndicatorConfig::default());
    info!("{} - MACD (12, 26, 9) and 200-day moving average", symbol);
    info!("{:-<80}", "");
    info!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Date", "Close", "MA200", "MACD", "Signal", "Hist"
    );
    info!("{:-<80}", "");

    let start = rows.len().saturating_sub(limit);
    for row in &rows[start..] {
        info!(
            "{:<12} {:>10.2} {:>10.2} {:>10.4} {:>10.4} {:>10.4}",
            row.date.format("%Y-%m-%d").to_string(),
            row.close,
            row.moving_average,
            row.macd,
            row.signal,
            row.histogram
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_limit_is_an_error() {
        let matches = build_app().get_matches_from(vec![
            "egostrategy_sentiment",
            "indicators",
            "--symbol",
            "AAPL",
            "--limit",
            "ten",
        ]);
        let err = show_indicators(matches.subcommand_matches("indicators").unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid --limit"));
    }

    #[tokio::test]
    async fn unparseable_run_flags_are_errors() {
        for (flag, value, message) in [
            ("--interval-ms", "soon", "invalid --interval-ms"),
            ("--timeout-secs", "forever", "invalid --timeout-secs"),
            ("--buy-above", "high", "invalid --buy-above"),
        ] {
            let matches = build_app().get_matches_from(vec!["egostrategy_sentiment", "run", flag, value]);
            let err = run_pipeline(matches.subcommand_matches("run").unwrap()).await.unwrap_err();
            assert!(err.to_string().contains(message), "{}: {}", flag, err);
        }
    }

    #[tokio::test]
    async fn inverted_thresholds_are_rejected() {
        let matches = build_app().get_matches_from(vec![
            "egostrategy_sentiment",
            "run",
            "--buy-above",
            "-0.5",
            "--sell-below",
            "0.5",
        ]);
        let err = run_pipeline(matches.subcommand_matches("run").unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("--sell-below"));
    }
}
