use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::DataError;
use super::model::{CurveSet, DoseCurve, NpsTable};
use super::paths::PathScheme;
use crate::selection::{DoseTier, FilterKernel, Reconstruction};

// ---------------------------------------------------------------------------
// Column configuration
// ---------------------------------------------------------------------------

/// Names of the two required table columns. The defaults match the legacy
/// spreadsheet exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableColumns {
    pub frequency: String,
    pub values: String,
}

impl Default for TableColumns {
    fn default() -> Self {
        TableColumns {
            frequency: "F".to_string(),
            values: "NPSTOT".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one NPS table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – scalar float columns named after `columns`
/// * `.json`    – `[{ "F": 0.05, "NPSTOT": 12.1 }, ...]`
/// * `.csv`     – header row with the two configured column names
pub fn load_table(path: &Path, columns: &TableColumns) -> Result<NpsTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, columns)?,
        "json" => load_json(path, columns)?,
        "csv" => load_csv(path, columns)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    if table.is_empty() {
        bail!("table has no rows");
    }
    Ok(table)
}

/// Load the three dose curves of one (scanner, reconstruction, filter)
/// triple, one table per tier in ascending dose order. Exactly three reads,
/// straight from disk. Differing frequency axes between tiers are kept as
/// they are and flagged with a warning.
pub fn load_curve_set(
    scheme: &PathScheme,
    columns: &TableColumns,
    scanner: &str,
    reconstruction: Reconstruction,
    filter: &FilterKernel,
) -> Result<CurveSet, DataError> {
    let mut curves = Vec::with_capacity(DoseTier::ALL.len());

    for tier in DoseTier::ALL {
        let path = scheme.table_path(scanner, tier, reconstruction, filter);
        let table = load_table(&path, columns).map_err(|source| DataError::TableRead {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded {} NPS rows from {}", table.len(), path.display());
        curves.push(DoseCurve { tier, table });
    }

    let set = CurveSet {
        scanner: scanner.to_string(),
        reconstruction,
        filter: filter.clone(),
        curves,
    };
    if !set.axes_match() {
        log::warn!(
            "frequency axes differ between dose tiers of {}; each curve is drawn on its own axis",
            set.title()
        );
    }
    Ok(set)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the columns, one float per cell. Columns
/// other than the two configured ones are ignored.
fn load_csv(path: &Path, columns: &TableColumns) -> Result<NpsTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let f_idx = headers
        .iter()
        .position(|h| *h == columns.frequency)
        .with_context(|| format!("CSV missing '{}' column", columns.frequency))?;
    let v_idx = headers
        .iter()
        .position(|h| *h == columns.values)
        .with_context(|| format!("CSV missing '{}' column", columns.values))?;

    let mut frequency = Vec::new();
    let mut values = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        frequency.push(parse_float(
            record.get(f_idx).unwrap_or(""),
            row_no,
            &columns.frequency,
        )?);
        values.push(parse_float(
            record.get(v_idx).unwrap_or(""),
            row_no,
            &columns.values,
        )?);
    }

    Ok(NpsTable { frequency, values })
}

fn parse_float(s: &str, row: usize, col: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "F": 0.00, "NPSTOT": 10.5 },
///   { "F": 0.05, "NPSTOT": 12.1 }
/// ]
/// ```
fn load_json(path: &Path, columns: &TableColumns) -> Result<NpsTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut frequency = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        frequency.push(json_number(obj.get(columns.frequency.as_str()), i, &columns.frequency)?);
        values.push(json_number(obj.get(columns.values.as_str()), i, &columns.values)?);
    }

    Ok(NpsTable { frequency, values })
}

fn json_number(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    val.and_then(|v| v.as_f64())
        .with_context(|| format!("Row {row}: missing or non-numeric '{col}'"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table with scalar numeric columns named after `columns`.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, columns: &TableColumns) -> Result<NpsTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut frequency = Vec::new();
    let mut values = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let f_idx = schema
            .index_of(&columns.frequency)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.frequency))?;
        let v_idx = schema
            .index_of(&columns.values)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.values))?;

        extend_f64(&mut frequency, batch.column(f_idx), &columns.frequency)?;
        extend_f64(&mut values, batch.column(v_idx), &columns.values)?;
    }

    Ok(NpsTable { frequency, values })
}

// -- Parquet / Arrow helpers --

/// Append every value of a scalar numeric column to `out`.
fn extend_f64(out: &mut Vec<f64>, col: &Arc<dyn Array>, name: &str) -> Result<()> {
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        out.extend(arr.iter().map(|v| v.map(|i| i as f64).unwrap_or(f64::NAN)));
    } else if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
    } else {
        bail!(
            "Column '{name}' has type {:?}, expected a scalar numeric column",
            col.data_type()
        );
    }
    Ok(())
}

// =============================================================================
// Unit tests
// =============================================================================
