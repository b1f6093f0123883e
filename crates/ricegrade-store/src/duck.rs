//! DuckDB document store for inspection records.

use std::path::Path;

use arrow::array::{Array, Int64Array, LargeStringArray, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use duckdb::{Connection, ToSql, params, params_from_iter};
use ricegrade_core::inspections::{TABLE, inspection_schema};
use ricegrade_core::{HistoryFilter, HistoryPage, Inspection, PAGE_SIZE};
use tracing::{debug, info};

use crate::StoreError;

/// DuckDB store holding one row per inspection.
///
/// Each row is a self-contained document: the scored criteria tree is kept
/// as JSON text exactly as it was produced at creation time, so reads never
/// rescore and later catalog changes cannot reach stored inspections.
///
/// Use [`open`](Self::open) for an in-memory database and
/// [`open_persistent`](Self::open_persistent) for a file that survives
/// process restarts. The table is created on open if missing.
pub struct InspectionStore {
    conn: Connection,
    columns: String,
}

impl InspectionStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let store = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), count = store.count()?, "opened inspection store");
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let schema = inspection_schema();
        conn.execute_batch(&create_table_sql(&schema)?)?;
        let columns = schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Self { conn, columns })
    }

    // ── Writes ──

    /// Persist a newly created inspection.
    pub fn insert(&self, inspection: &Inspection) -> Result<(), StoreError> {
        let sampling_point = serde_json::to_string(&inspection.sampling_point)?;
        let standard_data = serde_json::to_string(&inspection.standard_data)?;
        let create_us = inspection.create_date.timestamp_micros();
        let sampling_us = inspection.sampling_date.map(|d| d.timestamp_micros());

        let sql = format!(
            "INSERT INTO {TABLE} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.columns
        );
        self.conn.execute(
            &sql,
            params![
                inspection.inspection_id,
                inspection.name,
                create_us,
                sampling_us,
                sampling_point,
                inspection.price,
                inspection.note,
                inspection.image_link,
                inspection.standard_id,
                inspection.standard_name,
                standard_data
            ],
        )?;
        info!(
            inspection_id = %inspection.inspection_id,
            standard = %inspection.standard_name,
            criteria = inspection.standard_data.len(),
            "stored inspection"
        );
        Ok(())
    }

    /// Delete every inspection whose id is in `ids`. Returns the number removed.
    pub fn delete_many(&self, ids: &[String]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM {TABLE} WHERE inspection_id IN ({placeholders})");
        let deleted = self.conn.execute(&sql, params_from_iter(ids.iter()))?;
        info!(requested = ids.len(), deleted, "deleted inspections");
        Ok(deleted)
    }

    // ── Reads ──

    /// Fetch one inspection by its `inspectionID`.
    pub fn get(&self, inspection_id: &str) -> Result<Inspection, StoreError> {
        let sql = format!(
            "SELECT {} FROM {TABLE} WHERE inspection_id = ?",
            self.columns
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([inspection_id])?.collect();
        decode_batches(&batches)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(inspection_id.to_string()))
    }

    /// One page of history, newest first.
    pub fn history(&self, filter: &HistoryFilter) -> Result<HistoryPage, StoreError> {
        let range = filter
            .created
            .map(|(from, to)| (from.timestamp_micros(), to.timestamp_micros()));

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(id) = &filter.inspection_id {
            clauses.push("inspection_id = ?");
            values.push(id);
        }
        if let Some((from, to)) = &range {
            clauses.push("create_date_us BETWEEN ? AND ?");
            values.push(from);
            values.push(to);
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!("SELECT count(*)::BIGINT AS cnt FROM {TABLE}{where_sql}");
        let mut stmt = self.conn.prepare(&count_sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow(values.as_slice())?.collect();
        let total = first_i64(&batches)? as u64;

        let offset = u64::from(filter.page.saturating_sub(1)) * u64::from(PAGE_SIZE);
        let page_sql = format!(
            "SELECT {} FROM {TABLE}{where_sql} \
             ORDER BY create_date_us DESC, inspection_id \
             LIMIT {PAGE_SIZE} OFFSET {offset}",
            self.columns
        );
        let mut stmt = self.conn.prepare(&page_sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow(values.as_slice())?.collect();
        let data = decode_batches(&batches)?;
        debug!(page = filter.page, total, rows = data.len(), "history page");

        Ok(HistoryPage::new(total, filter.page, data))
    }

    // ── Counts ──

    /// Number of stored inspections.
    pub fn count(&self) -> Result<usize, StoreError> {
        let sql = format!("SELECT count(*)::BIGINT AS cnt FROM {TABLE}");
        let mut stmt = self.conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(first_i64(&batches)? as usize)
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement derived from the Arrow schema.
fn create_table_sql(schema: &Schema) -> Result<String, StoreError> {
    let columns = schema
        .fields()
        .iter()
        .map(|f| {
            let sql_type = match f.data_type() {
                DataType::Utf8 | DataType::LargeUtf8 => "VARCHAR",
                DataType::Int64 => "BIGINT",
                other => {
                    return Err(StoreError::Other(format!(
                        "unsupported column type {other:?} for {}",
                        f.name()
                    )));
                }
            };
            let null = if f.is_nullable() { "" } else { " NOT NULL" };
            Ok(format!("{} {sql_type}{null}", f.name()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} ({}, PRIMARY KEY (inspection_id))",
        columns.join(", ")
    ))
}

// ── Decoding ──

fn first_i64(batches: &[RecordBatch]) -> Result<i64, StoreError> {
    let batch = batches.first().ok_or(StoreError::NoResults)?;
    let col = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
    Ok(col.value(0))
}

fn decode_batches(batches: &[RecordBatch]) -> Result<Vec<Inspection>, StoreError> {
    let mut out = Vec::new();
    for batch in batches {
        for row in 0..batch.num_rows() {
            out.push(decode_row(batch, row)?);
        }
    }
    Ok(out)
}

fn decode_row(batch: &RecordBatch, row: usize) -> Result<Inspection, StoreError> {
    let create_us = required_i64(batch, "create_date_us", row)?;
    let sampling_date = optional_i64(batch, "sampling_date_us", row)?
        .map(micros_to_datetime)
        .transpose()?;

    Ok(Inspection {
        inspection_id: required_str(batch, "inspection_id", row)?,
        name: required_str(batch, "name", row)?,
        create_date: micros_to_datetime(create_us)?,
        sampling_date,
        sampling_point: serde_json::from_str(&required_str(batch, "sampling_point", row)?)?,
        price: required_str(batch, "price", row)?,
        note: required_str(batch, "note", row)?,
        image_link: optional_str(batch, "image_link", row)?,
        standard_id: required_i64(batch, "standard_id", row)?,
        standard_name: required_str(batch, "standard_name", row)?,
        standard_data: serde_json::from_str(&required_str(batch, "standard_data", row)?)?,
    })
}

fn micros_to_datetime(us: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(us)
        .ok_or_else(|| StoreError::Other(format!("timestamp out of range: {us}")))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a dyn Array, StoreError> {
    batch
        .column_by_name(name)
        .map(|c| c.as_ref())
        .ok_or_else(|| StoreError::Other(format!("missing column {name}")))
}

/// Get a string value from a column that might be Utf8 or LargeUtf8.
fn optional_str(batch: &RecordBatch, name: &str, row: usize) -> Result<Option<String>, StoreError> {
    let col = column(batch, name)?;
    if col.is_null(row) {
        return Ok(None);
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Ok(Some(arr.value(row).to_string()));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(Some(arr.value(row).to_string()));
    }
    Err(StoreError::Other(format!(
        "column {name} is {:?}, expected a string",
        col.data_type()
    )))
}

fn required_str(batch: &RecordBatch, name: &str, row: usize) -> Result<String, StoreError> {
    optional_str(batch, name, row)?.ok_or_else(|| StoreError::Other(format!("null {name} at row {row}")))
}

fn optional_i64(batch: &RecordBatch, name: &str, row: usize) -> Result<Option<i64>, StoreError> {
    let col = column(batch, name)?;
    if col.is_null(row) {
        return Ok(None);
    }
    col.as_any()
        .downcast_ref::<Int64Array>()
        .map(|a| Some(a.value(row)))
        .ok_or_else(|| {
            StoreError::Other(format!("column {name} is {:?}, expected i64", col.data_type()))
        })
}

fn required_i64(batch: &RecordBatch, name: &str, row: usize) -> Result<i64, StoreError> {
    optional_i64(batch, name, row)?.ok_or_else(|| StoreError::Other(format!("null {name} at row {row}")))
}
