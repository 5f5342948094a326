//! Frames: keyed, table-like datasets and derived artifacts
//!
//! A [`Frame`] wraps an Arrow [`RecordBatch`] with the key it is stored under
//! and a content checksum. Metric records remember the checksum of the frame
//! they were computed on, so a frame overwritten with different data at the
//! same key no longer matches old records.

use crate::store::ObjectKey;
use crate::Result;
use arrow::array::{
    Array, ArrayData, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray, UInt32Array, UInt64Array,
};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHasher;
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// Default number of rows exposed by an artifact preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// A keyed table.
#[derive(Debug, Clone)]
pub struct Frame {
    key: ObjectKey,
    batch: RecordBatch,
    checksum: u64,
}

impl Frame {
    /// Create a frame from an existing batch.
    #[must_use]
    pub fn new(key: impl Into<ObjectKey>, batch: RecordBatch) -> Self {
        let checksum = content_checksum(&batch);
        Self {
            key: key.into(),
            batch,
            checksum,
        }
    }

    /// Create a frame from named columns.
    ///
    /// # Errors
    ///
    /// Returns error if the columns have different lengths
    pub fn from_columns<N: AsRef<str>>(
        key: impl Into<ObjectKey>,
        columns: Vec<(N, ArrayRef)>,
    ) -> Result<Self> {
        let batch = RecordBatch::try_from_iter(columns)?;
        Ok(Self::new(key, batch))
    }

    /// The same data under a different key.
    #[must_use]
    pub fn with_key(&self, key: impl Into<ObjectKey>) -> Self {
        Self {
            key: key.into(),
            batch: self.batch.clone(),
            checksum: self.checksum,
        }
    }

    /// Key this frame is stored under.
    #[must_use]
    pub const fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Underlying Arrow batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Content checksum (independent of the key).
    #[must_use]
    pub const fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Row-bounded preview of the first `max_rows` rows.
    #[must_use]
    pub fn preview(&self, max_rows: usize) -> FramePreview {
        let shown = self.num_rows().min(max_rows);
        let head = self.batch.slice(0, shown);
        let schema = head.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(head.columns())
            .map(|(field, array)| ColumnPreview {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
                values: column_values(array),
            })
            .collect();

        FramePreview {
            frame: self.key.clone(),
            total_rows: self.num_rows(),
            row_count: shown,
            columns,
        }
    }
}

/// First rows of a frame, materialized as JSON-ready values.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePreview {
    /// Key of the previewed frame
    pub frame: ObjectKey,
    /// Rows in the full frame
    pub total_rows: usize,
    /// Rows included in this preview
    pub row_count: usize,
    /// Column data, one entry per column
    pub columns: Vec<ColumnPreview>,
}

/// One previewed column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPreview {
    /// Column label
    pub name: String,
    /// Arrow data type, as displayed by Arrow
    pub data_type: String,
    /// Cell values; nulls and unsupported types become `Value::Null`
    pub values: Vec<Value>,
}

fn column_values(array: &ArrayRef) -> Vec<Value> {
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<Float64Array>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<Float32Array>() {
        cells(a.iter().map(|v| v.map(f64::from)))
    } else if let Some(a) = any.downcast_ref::<Int64Array>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<Int32Array>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<UInt64Array>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<UInt32Array>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<BooleanArray>() {
        cells(a.iter())
    } else if let Some(a) = any.downcast_ref::<StringArray>() {
        cells(a.iter())
    } else {
        vec![Value::Null; array.len()]
    }
}

fn cells<T: Into<Value>>(values: impl Iterator<Item = Option<T>>) -> Vec<Value> {
    values.map(|v| v.map_or(Value::Null, Into::into)).collect()
}

fn content_checksum(batch: &RecordBatch) -> u64 {
    let mut hasher = FxHasher::default();
    batch.num_rows().hash(&mut hasher);
    for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
        field.name().hash(&mut hasher);
        hash_array_data(&array.to_data(), &mut hasher);
    }
    hasher.finish()
}

fn hash_array_data(data: &ArrayData, hasher: &mut FxHasher) {
    data.data_type().hash(hasher);
    data.len().hash(hasher);
    data.offset().hash(hasher);
    // Validity per slot, not just the null count
    for i in 0..data.len() {
        data.is_valid(i).hash(hasher);
    }
    for buffer in data.buffers() {
        buffer.as_slice().hash(hasher);
    }
    for child in data.child_data() {
        hash_array_data(child, hasher);
    }
}
