//! MACD 与长期均线指标，供行情展示使用

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub signal_window: usize,
    pub ma_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_window: 12,
            long_window: 26,
            signal_window: 9,
            ma_window: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub moving_average: f64,
}

/// Exponential moving average seeded with the first value, alpha = 2 / (span + 1).
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            Some(p) => alpha * value + (1.0 - alpha) * p,
            None => value,
        };
        result.push(next);
        prev = Some(next);
    }

    result
}

/// 滚动均值，窗口未填满时使用已有数据
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        result.push(sum / count as f64);
    }

    result
}

/// Computes the indicator table for a date-ascending close series.
pub fn compute(history: &[(NaiveDate, f64)], config: &IndicatorConfig) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = history.iter().map(|(_, c)| *c).collect();
    let ema_short = ema_series(&closes, config.short_window);
    let ema_long = ema_series(&closes, config.long_window);
    let macd: Vec<f64> = ema_short.iter().zip(&ema_long).map(|(s, l)| s - l).collect();
    let signal = ema_series(&macd, config.signal_window);
    let moving_average = rolling_mean(&closes, config.ma_window);

    history
        .iter()
        .enumerate()
        .map(|(i, (date, close))| IndicatorRow {
            date: *date,
            close: *close,
            ema_short: ema_short[i],
            ema_long: ema_long[i],
            macd: macd[i],
            signal: signal[i],
            histogram: macd[i] - signal[i],
            moving_average: moving_average[i],
        })
        .collect()
}
