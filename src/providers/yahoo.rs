use crate::errors::{Result, SentimentError};
use crate::providers::base::PriceProvider;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

/// 解析 Yahoo Finance chart 接口返回的最新收盘价
///
/// Returns the last non-null daily close, or `None` when the response carries no bars.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<Option<f64>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(SentimentError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason: format!(
                "{}: {}",
                error.code,
                error.description.unwrap_or_default()
            ),
        });
    }

    let close = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|r| r.indicators)
        .and_then(|i| i.quote.into_iter().next())
        .and_then(|q| q.close.into_iter().rev().flatten().next());

    Ok(close)
}

/// Yahoo Finance 价格源
pub struct YahooPriceProvider {
    client: Client,
    base_url: String,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl YahooPriceProvider {
    pub fn new(timeout: Duration, request_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(SentimentError::RequestError)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_interval,
            last_request: Mutex::new(None),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(instant) = *last {
            let elapsed = instant.elapsed();
            if elapsed < self.request_interval {
                let wait_time = self.request_interval - elapsed;
                debug!("Waiting {:?} to respect rate limit", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>> {
        self.wait_for_rate_limit().await;

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No chart data for {}", symbol);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SentimentError::ProviderUnavailable {
                symbol: symbol.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        let text = response.text().await?;
        parse_chart_response(symbol, &text)
    }
}
