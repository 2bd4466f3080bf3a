// src/output/mod.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs, fs::File, path::Path, sync::Arc};

use crate::validate::ResultRecord;

fn results_schema() -> Schema {
    Schema::new(vec![
        Field::new("result", DataType::Utf8, false),
        Field::new("data", DataType::Utf8, false),
        Field::new("error", DataType::Utf8, false),
        Field::new("time", DataType::Float64, false),
    ])
}

/// One column per field, rows in the order the records were collected.
pub fn to_record_batch(records: &[ResultRecord]) -> Result<RecordBatch> {
    let result: Vec<&str> = records.iter().map(|r| r.validation.status.as_str()).collect();
    let data: Vec<String> = records.iter().map(|r| r.validation.data.render()).collect();
    let error: Vec<String> = records.iter().map(|r| r.validation.render_errors()).collect();
    let time: Vec<f64> = records.iter().map(|r| r.time).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(result)),
        Arc::new(StringArray::from(data)),
        Arc::new(StringArray::from(error)),
        Arc::new(Float64Array::from(time)),
    ];
    RecordBatch::try_new(Arc::new(results_schema()), columns).context("building results batch")
}

/// Persist `records` to `path`: Parquet for a `.parquet` extension, CSV
/// with a header otherwise. Parent directories are created as needed.
pub fn write_records(records: &[ResultRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let batch = to_record_batch(records)?;
    let file =
        File::create(path).with_context(|| format!("creating output file {}", path.display()))?;

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Parquet writer")?;
        writer.write(&batch).context("writing results batch")?;
        writer.close().context("closing Parquet writer")?;
    } else {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer
            .write(&batch)
            .with_context(|| format!("writing CSV {}", path.display()))?;
    }
    Ok(())
}

/// Aggregate view of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub ng: usize,
    pub mean_time: f64,
    pub min_time: f64,
    pub max_time: f64,
}

impl Summary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let total = records.len();
        let ok = records.iter().filter(|r| r.is_ok()).count();
        let times = records.iter().map(|r| r.time);

        let (min_time, max_time) = if total == 0 {
            (0.0, 0.0)
        } else {
            times.clone().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            })
        };
        let mean_time = if total == 0 {
            0.0
        } else {
            times.sum::<f64>() / total as f64
        };

        Self {
            total,
            ok,
            ng: total - ok,
            mean_time,
            min_time,
            max_time,
        }
    }

    /// Share of OK responses, 0.0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.ok as f64 / self.total as f64
        }
    }
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Print every record and the summary to stdout.
pub fn print_table(records: &[ResultRecord]) {
    println!(
        "\n{:>5} {:<6} {:>9}  {:<48} {}",
        "#", "result", "time", "data", "error"
    );
    println!("{:-<100}", "");
    for (i, r) in records.iter().enumerate() {
        println!(
            "{:>5} {:<6} {:>9.3}  {:<48} {}",
            i,
            r.validation.status.as_str(),
            r.time,
            clip(&r.validation.data.render().replace('\n', " "), 48),
            r.validation.render_errors()
        );
    }

    let s = Summary::from_records(records);
    println!("{:-<100}", "");
    println!(
        "{} calls: {} OK, {} NG ({:.1}%)  time mean {:.3}s  min {:.3}s  max {:.3}s",
        s.total,
        s.ok,
        s.ng,
        s.success_rate() * 100.0,
        s.mean_time,
        s.min_time,
        s.max_time
    );
}

// ----- Tests -----
#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ResponseValidator;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn sample() -> Vec<ResultRecord> {
        let v = ResponseValidator::default();
        vec![
            ResultRecord::new(v.validate(r#"{"keywords": "音声認識"}"#), 0.5),
            ResultRecord::new(v.validate("not json"), 1.5),
            ResultRecord::new(v.validate(r#"{"other": 1}"#), 1.0),
        ]
    }

    #[test]
    fn test_batch_columns() {
        let batch = to_record_batch(&sample()).unwrap();
        assert_eq!(batch.num_rows(), 3);
        let names: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["result", "data", "error", "time"]);

        let result = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(result.value(0), "OK");
        assert_eq!(result.value(1), "NG");

        let data = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(data.value(1), "not json");

        let error = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(error.value(0), "");
        assert_eq!(error.value(2), r#"["Key 'keywords' is missing."]"#);
    }

    #[test]
    fn test_write_csv_creates_dirs() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("data").join("synonym").join("gpt.csv");
        write_records(&sample(), &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "result,data,error,time");
        assert!(lines[1].starts_with("OK,"));
        assert!(lines[2].starts_with("NG,not json,"));
        assert!(lines[2].ends_with(",1.5"));
    }

    #[test]
    fn test_write_parquet() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("run.parquet");
        write_records(&sample(), &out).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&out).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_write_empty_run() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("empty.csv");
        write_records(&[], &out).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn test_summary() {
        let s = Summary::from_records(&sample());
        assert_eq!(s.total, 3);
        assert_eq!(s.ok, 1);
        assert_eq!(s.ng, 2);
        assert_eq!(s.min_time, 0.5);
        assert_eq!(s.max_time, 1.5);
        assert!((s.mean_time - 1.0).abs() < 1e-9);
        assert!((s.success_rate() - 1.0 / 3.0).abs() < 1e-9);

        let empty = Summary::from_records(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.success_rate(), 0.0);
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("音声認識", 10), "音声認識");
        assert_eq!(clip("音声認識技術", 4), "音声認…");
    }
}
