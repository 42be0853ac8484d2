use log::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SentimentError};

// 数据集文件检查
pub fn ensure_dataset_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(SentimentError::DatasetNotFound(path.display().to_string()));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// 原子写入：先写临时文件，再重命名覆盖目标文件
///
/// The target is either fully replaced or left untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path_for(path);
    let written = (|| -> Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

// 合并结果的Arrow表格转换工具
pub mod arrow_utils {
    use super::*;
    use crate::models::signal::{CombinedRecord, Decision};
    use arrow::csv::{ReaderBuilder, WriterBuilder};
    use arrow_array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray};
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_json::ArrayWriter;
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    pub const SYMBOL_COLUMN: &str = "Stock Symbol";
    pub const PRICE_COLUMN: &str = "Current Price";
    pub const SCORE_COLUMN: &str = "sentiment_score";
    pub const DECISION_COLUMN: &str = "Decision";

    /// 结果文件格式，根据扩展名选择
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ArtifactFormat {
        Csv,
        ArrowIpc,
    }

    impl ArtifactFormat {
        pub fn from_path(path: &Path) -> Self {
            match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
                Some(ext) if ext == "arrow" || ext == "ipc" => ArtifactFormat::ArrowIpc,
                _ => ArtifactFormat::Csv,
            }
        }
    }

    /// Column order is fixed: symbol, price, sentiment score, decision.
    pub fn combined_schema() -> Schema {
        Schema::new(vec![
            Field::new(SYMBOL_COLUMN, DataType::Utf8, false),
            Field::new(PRICE_COLUMN, DataType::Float64, false),
            Field::new(SCORE_COLUMN, DataType::Float64, false),
            Field::new(DECISION_COLUMN, DataType::Utf8, false),
        ])
    }

    // 将合并结果转换为Arrow记录批次
    pub fn combined_to_record_batch(records: &[CombinedRecord]) -> Result<RecordBatch> {
        let symbol_array: ArrayRef = Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.symbol.as_str()),
        ));
        let price_array: ArrayRef = Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.price),
        ));
        let score_array: ArrayRef = Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.avg_compound),
        ));
        let decision_array: ArrayRef = Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.decision.as_str()),
        ));

        RecordBatch::try_new(
            Arc::new(combined_schema()),
            vec![symbol_array, price_array, score_array, decision_array],
        )
        .map_err(|e| SentimentError::ArrowError(e.to_string()))
    }

    // 从Arrow记录批次还原合并结果
    pub fn record_batch_to_combined(batch: &RecordBatch) -> Result<Vec<CombinedRecord>> {
        let string_column = |name: &str| -> Result<&StringArray> {
            batch
                .column_by_name(name)
                .and_then(|a| a.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| SentimentError::ArrowError(format!("Failed to downcast {} column", name)))
        };
        let float_column = |name: &str| -> Result<&Float64Array> {
            batch
                .column_by_name(name)
                .and_then(|a| a.as_any().downcast_ref::<Float64Array>())
                .ok_or_else(|| SentimentError::ArrowError(format!("Failed to downcast {} column", name)))
        };

        let symbols = string_column(SYMBOL_COLUMN)?;
        let prices = float_column(PRICE_COLUMN)?;
        let scores = float_column(SCORE_COLUMN)?;
        let decisions = string_column(DECISION_COLUMN)?;

        let mut result = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            if symbols.is_null(i) || prices.is_null(i) || scores.is_null(i) || decisions.is_null(i) {
                return Err(SentimentError::DataError(format!("Null value in combined row {}", i)));
            }
            result.push(CombinedRecord {
                symbol: symbols.value(i).to_string(),
                price: prices.value(i),
                avg_compound: scores.value(i),
                decision: decisions.value(i).parse::<Decision>()?,
            });
        }

        Ok(result)
    }

    pub fn encode_combined(records: &[CombinedRecord], format: ArtifactFormat) -> Result<Vec<u8>> {
        let batch = combined_to_record_batch(records)?;
        let mut buf = Vec::new();

        match format {
            ArtifactFormat::Csv => {
                let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
                writer.write(&batch)?;
            }
            ArtifactFormat::ArrowIpc => {
                let mut writer = FileWriter::try_new(&mut buf, &batch.schema())?;
                writer.write(&batch)?;
                writer.finish()?;
            }
        }

        Ok(buf)
    }

    /// 保存合并结果，完整覆盖已有文件
    pub fn save_combined(records: &[CombinedRecord], path: &Path) -> Result<()> {
        let format = ArtifactFormat::from_path(path);
        info!("Saving {} combined rows to {} ({:?})", records.len(), path.display(), format);

        let bytes = encode_combined(records, format)?;
        write_atomically(path, &bytes)
    }

    // 读取合并结果文件
    pub fn read_combined(path: &Path) -> Result<Vec<CombinedRecord>> {
        ensure_dataset_exists(path)?;
        let file = File::open(path)?;
        let mut result = Vec::new();

        match ArtifactFormat::from_path(path) {
            ArtifactFormat::Csv => {
                let reader = ReaderBuilder::new(Arc::new(combined_schema()))
                    .with_header(true)
                    .build(file)?;
                for batch in reader {
                    result.extend(record_batch_to_combined(&batch?)?);
                }
            }
            ArtifactFormat::ArrowIpc => {
                let reader = FileReader::try_new(file, None)?;
                for batch in reader {
                    result.extend(record_batch_to_combined(&batch?)?);
                }
            }
        }

        Ok(result)
    }

    /// Renders rows as a JSON array of objects keyed by artifact column names.
    pub fn combined_to_json(records: &[CombinedRecord]) -> Result<String> {
        let batch = combined_to_record_batch(records)?;
        let mut buf = Vec::new();
        {
            let mut writer = ArrayWriter::new(&mut buf);
            writer.write(&batch)?;
            writer.finish()?;
        }
        String::from_utf8(buf).map_err(|e| SentimentError::DataError(e.to_string()))
    }
}

// 输入数据集读取工具（推文、价格快照、历史行情）
pub mod dataset_utils {
    use super::*;
    use crate::config::ColumnMapping;
    use crate::models::signal::PriceSnapshot;
    use crate::models::tweet::TweetRecord;
    use calamine::{open_workbook_auto, DataType, Reader};
    use chrono::NaiveDate;
    use log::debug;

    fn is_excel(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
            Some("xlsx" | "xls" | "xlsm" | "xlsb" | "ods")
        )
    }

    fn clean_header(raw: &str) -> String {
        raw.trim_start_matches('\u{feff}').trim().to_string()
    }

    /// 根据列名映射定位文本列与代码列
    pub fn resolve_columns(headers: &[String], mapping: &ColumnMapping) -> Result<(usize, usize)> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let text_idx = find(mapping.text.as_str());
        let symbol_idx = find(mapping.symbol.as_str()).or_else(|| {
            mapping
                .symbol_aliases
                .iter()
                .find_map(|alias| find(alias.as_str()))
        });

        match (text_idx, symbol_idx) {
            (Some(t), Some(s)) => Ok((t, s)),
            (t, s) => {
                let mut missing = Vec::new();
                if t.is_none() {
                    missing.push(mapping.text.clone());
                }
                if s.is_none() {
                    missing.push(mapping.symbol.clone());
                }
                Err(SentimentError::MissingColumns(missing))
            }
        }
    }

    /// 加载推文数据集（CSV 或 Excel）
    ///
    /// Empty or non-UTF-8 text cells (and non-string Excel cells) are loaded
    /// with `text: None` so that scoring can skip them row by row.
    pub fn load_tweets(path: &Path, mapping: &ColumnMapping) -> Result<Vec<TweetRecord>> {
        ensure_dataset_exists(path)?;

        let records = if is_excel(path) {
            load_tweets_from_excel(path, mapping)?
        } else {
            load_tweets_from_csv(path, mapping)?
        };

        info!("Loaded {} tweets from {}", records.len(), path.display());
        Ok(records)
    }

    fn load_tweets_from_csv(path: &Path, mapping: &ColumnMapping) -> Result<Vec<TweetRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| clean_header(&String::from_utf8_lossy(h)))
            .collect();
        let (text_idx, symbol_idx) = resolve_columns(&headers, mapping)?;

        let mut records = Vec::new();
        for result in reader.byte_records() {
            let record = result?;
            let text = record
                .get(text_idx)
                .filter(|field| !field.is_empty())
                .and_then(|field| std::str::from_utf8(field).ok())
                .map(str::to_string);
            let symbol = record
                .get(symbol_idx)
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .unwrap_or_default();
            records.push(TweetRecord { text, symbol });
        }

        Ok(records)
    }

    fn load_tweets_from_excel(path: &Path, mapping: &ColumnMapping) -> Result<Vec<TweetRecord>> {
        // 使用 calamine 打开工作簿
        let mut workbook = open_workbook_auto(path).map_err(SentimentError::ExcelError)?;

        // 获取第一个工作表
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SentimentError::DataError(format!("No worksheet in {}", path.display())))?
            .map_err(SentimentError::ExcelError)?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|cell| clean_header(&cell.to_string())).collect(),
            None => Vec::new(),
        };
        let (text_idx, symbol_idx) = resolve_columns(&headers, mapping)?;

        let mut records = Vec::new();
        for row in rows {
            let text = match row.get(text_idx) {
                Some(DataType::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            };
            let symbol = row.get(symbol_idx).map(|cell| cell.to_string()).unwrap_or_default();
            records.push(TweetRecord { text, symbol });
        }

        Ok(records)
    }

    /// 加载离线价格快照：第一列为股票代码，第二列为价格
    ///
    /// A blank or unparseable price is recorded as absent.
    pub fn load_price_snapshot(path: &Path) -> Result<Vec<PriceSnapshot>> {
        ensure_dataset_exists(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut snapshots = Vec::new();
        for result in reader.records() {
            let record = result?;
            let symbol = match record.get(0).map(str::trim) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => continue,
            };
            let price = record
                .get(1)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| p.is_finite());
            if price.is_none() {
                debug!("No usable price for {} in {}", symbol, path.display());
            }
            snapshots.push(PriceSnapshot { symbol, price });
        }

        Ok(snapshots)
    }

    /// 加载单只股票的历史收盘价（`Date`, `Symbol`, `Close` 列），按日期升序
    pub fn load_price_history(path: &Path, symbol: &str) -> Result<Vec<(NaiveDate, f64)>> {
        ensure_dataset_exists(path)?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let (date_idx, symbol_idx, close_idx) =
            match (position("Date"), position("Symbol"), position("Close")) {
                (Some(d), Some(s), Some(c)) => (d, s, c),
                (d, s, c) => {
                    let missing = [("Date", d), ("Symbol", s), ("Close", c)]
                        .iter()
                        .filter(|(_, idx)| idx.is_none())
                        .map(|(name, _)| name.to_string())
                        .collect();
                    return Err(SentimentError::MissingColumns(missing));
                }
            };

        let mut history = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.get(symbol_idx) != Some(symbol) {
                continue;
            }
            let raw_date = record.get(date_idx).unwrap_or_default().trim();
            // 兼容带时间的日期字符串
            let date = NaiveDate::parse_from_str(raw_date.get(0..10).unwrap_or(raw_date), "%Y-%m-%d")?;
            let close = record
                .get(close_idx)
                .unwrap_or_default()
                .trim()
                .parse::<f64>()
                .map_err(|e| SentimentError::DataError(format!("Invalid close on {}: {}", raw_date, e)))?;
            history.push((date, close));
        }

        history.sort_by_key(|(date, _)| *date);
        Ok(history)
    }
}
