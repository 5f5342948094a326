//! Version 3 of the model metrics wire contract

use crate::frame::FramePreview;
use crate::metrics::{
    AutoEncoderStats, BinomialStats, ClusteringStats, MetricRecord, MetricStats, MetricsList,
    MetricsQuery, MultinomialStats, RegressionStats,
};
use crate::store::{ObjectKey, Store};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire version number.
pub const VERSION: u32 = 3;

/// Wire value meaning "no deep features layer requested".
pub const UNSET_LAYER: i32 = -1;

/// Request and response body for fetch, score and predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetricsListV3 {
    /// Key of the model of interest
    pub model: Option<String>,
    /// Key of the frame of interest
    pub frame: Option<String>,
    /// Key of the predictions frame, if predictions are requested
    pub destination_key: Option<String>,
    /// Compute autoencoder reconstruction error
    pub reconstruction_error: bool,
    /// Hidden layer (0-indexed) to extract deep features from; negative means unset
    pub deep_features_hidden_layer: i32,
    /// Output records
    pub model_metrics: Vec<ModelMetricsV3>,
}

impl Default for ModelMetricsListV3 {
    fn default() -> Self {
        Self {
            model: None,
            frame: None,
            destination_key: None,
            reconstruction_error: false,
            deep_features_hidden_layer: UNSET_LAYER,
            model_metrics: Vec::new(),
        }
    }
}

impl ModelMetricsListV3 {
    /// Build the internal query, resolving references against `store`.
    #[must_use]
    pub fn to_query(&self, store: &dyn Store) -> MetricsQuery {
        let model = self
            .model
            .as_deref()
            .map(ObjectKey::from)
            .filter(|key| store.get_model(key).is_some());
        let frame = self
            .frame
            .as_deref()
            .map(ObjectKey::from)
            .filter(|key| store.get_frame(key).is_some());

        MetricsQuery {
            model,
            frame,
            destination_key: self
                .destination_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .map(ObjectKey::from),
            reconstruction_error: self.reconstruction_error,
            deep_features_layer: usize::try_from(self.deep_features_hidden_layer).ok(),
        }
    }

    /// Build the wire form of a query echo and its records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the deep features layer does not
    /// fit the wire's `i32`
    pub fn from_list(list: &MetricsList) -> Result<Self> {
        let query = &list.query;
        let deep_features_hidden_layer = match query.deep_features_layer {
            None => UNSET_LAYER,
            Some(layer) => i32::try_from(layer).map_err(|_| {
                Error::invalid(format!("deep features layer out of range: {layer}"))
            })?,
        };
        Ok(Self {
            model: query.model.as_ref().map(ToString::to_string),
            frame: query.frame.as_ref().map(ToString::to_string),
            destination_key: query.destination_key.as_ref().map(ToString::to_string),
            reconstruction_error: query.reconstruction_error,
            deep_features_hidden_layer,
            model_metrics: list
                .records
                .iter()
                .map(|record| ModelMetricsV3::from(record.as_ref()))
                .collect(),
        })
    }
}

/// Reference to a keyed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyV3 {
    /// Key name
    pub name: String,
    /// Checksum of the object when the record was computed
    pub checksum: u64,
}

/// One metric record on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsV3 {
    /// Model the record was computed for
    pub model: KeyV3,
    /// Frame the record was computed on
    pub frame: KeyV3,
    /// Scoring time, milliseconds since the epoch
    pub scoring_time: i64,
    /// Scoring duration
    pub duration_in_ms: u64,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind-specific statistics, tagged by `model_category`
    #[serde(flatten)]
    pub stats: MetricsStatsV3,
    /// Bounded preview of the predictions frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<FrameV3>,
}

impl From<&MetricRecord> for ModelMetricsV3 {
    fn from(record: &MetricRecord) -> Self {
        Self {
            model: KeyV3 {
                name: record.model().to_string(),
                checksum: record.model_checksum(),
            },
            frame: KeyV3 {
                name: record.frame().to_string(),
                checksum: record.frame_checksum(),
            },
            scoring_time: record.scored_at().timestamp_millis(),
            duration_in_ms: record.duration_ms(),
            description: record.description().map(str::to_string),
            stats: MetricsStatsV3::from(record.stats()),
            predictions: record.predictions().map(FrameV3::from),
        }
    }
}

/// Kind-specific wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_category")]
pub enum MetricsStatsV3 {
    /// Two-class classification
    Binomial(ModelMetricsBinomialV3),
    /// Multi-class classification
    Multinomial(ModelMetricsMultinomialV3),
    /// Regression
    Regression(ModelMetricsRegressionV3),
    /// Clustering
    Clustering(ModelMetricsClusteringV3),
    /// Autoencoder
    AutoEncoder(ModelMetricsAutoEncoderV3),
}

impl From<&MetricStats> for MetricsStatsV3 {
    fn from(stats: &MetricStats) -> Self {
        match stats {
            MetricStats::Binomial(s) => Self::Binomial(s.into()),
            MetricStats::Multinomial(s) => Self::Multinomial(s.into()),
            MetricStats::Regression(s) => Self::Regression(s.into()),
            MetricStats::Clustering(s) => Self::Clustering(s.into()),
            MetricStats::AutoEncoder(s) => Self::AutoEncoder(s.into()),
        }
    }
}

/// Binomial metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsBinomialV3 {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Log loss
    pub logloss: f64,
    /// Area under the ROC curve
    #[serde(rename = "AUC")]
    pub auc: f64,
    /// Gini coefficient, `2 * AUC - 1`
    #[serde(rename = "Gini")]
    pub gini: f64,
    /// Threshold maximizing F1
    pub max_f1_threshold: f64,
}

impl From<&BinomialStats> for ModelMetricsBinomialV3 {
    fn from(s: &BinomialStats) -> Self {
        Self {
            mse: s.mse,
            rmse: s.mse.sqrt(),
            r2: s.r2,
            logloss: s.logloss,
            auc: s.auc,
            gini: 2.0f64.mul_add(s.auc, -1.0),
            max_f1_threshold: s.max_f1_threshold,
        }
    }
}

/// Multinomial metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsMultinomialV3 {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Log loss
    pub logloss: f64,
    /// Mean per-class error rate
    pub mean_per_class_error: f64,
    /// Top-k hit ratios
    pub hit_ratios: Vec<f64>,
}

impl From<&MultinomialStats> for ModelMetricsMultinomialV3 {
    fn from(s: &MultinomialStats) -> Self {
        Self {
            mse: s.mse,
            rmse: s.mse.sqrt(),
            r2: s.r2,
            logloss: s.logloss,
            mean_per_class_error: s.mean_per_class_error,
            hit_ratios: s.hit_ratios.clone(),
        }
    }
}

/// Regression metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsRegressionV3 {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean residual deviance
    pub mean_residual_deviance: f64,
    /// Mean absolute error
    pub mae: f64,
}

impl From<&RegressionStats> for ModelMetricsRegressionV3 {
    fn from(s: &RegressionStats) -> Self {
        Self {
            mse: s.mse,
            rmse: s.mse.sqrt(),
            r2: s.r2,
            mean_residual_deviance: s.mean_residual_deviance,
            mae: s.mae,
        }
    }
}

/// Clustering metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsClusteringV3 {
    /// Mean squared distance to centroid
    pub mse: f64,
    /// Total within-cluster sum of squares
    pub tot_withinss: f64,
    /// Between-cluster sum of squares
    pub betweenss: f64,
    /// Total sum of squares
    pub totss: f64,
}

impl From<&ClusteringStats> for ModelMetricsClusteringV3 {
    fn from(s: &ClusteringStats) -> Self {
        Self {
            mse: s.mse,
            tot_withinss: s.tot_withinss,
            betweenss: s.betweenss,
            totss: s.totss,
        }
    }
}

/// Autoencoder metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsAutoEncoderV3 {
    /// Mean reconstruction error
    pub mse: f64,
    /// Root mean reconstruction error
    pub rmse: f64,
}

impl From<&AutoEncoderStats> for ModelMetricsAutoEncoderV3 {
    fn from(s: &AutoEncoderStats) -> Self {
        Self {
            mse: s.mse,
            rmse: s.mse.sqrt(),
        }
    }
}

/// Row-bounded frame preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameV3 {
    /// Key of the previewed frame
    pub frame_id: String,
    /// First row shown
    pub row_offset: usize,
    /// Rows shown
    pub row_count: usize,
    /// Rows in the full frame
    pub total_rows: usize,
    /// Column data
    pub columns: Vec<ColV3>,
}

/// One previewed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColV3 {
    /// Column label
    pub label: String,
    /// Column type
    #[serde(rename = "type")]
    pub column_type: String,
    /// Cell values
    pub data: Vec<Value>,
}

impl From<&FramePreview> for FrameV3 {
    fn from(preview: &FramePreview) -> Self {
        Self {
            frame_id: preview.frame.to_string(),
            row_offset: 0,
            row_count: preview.row_count,
            total_rows: preview.total_rows,
            columns: preview
                .columns
                .iter()
                .map(|column| ColV3 {
                    label: column.name.clone(),
                    column_type: column.data_type.clone(),
                    data: column.values.clone(),
                })
                .collect(),
        }
    }
}

pub(super) fn decode(wire: &Value, store: &dyn Store) -> Result<MetricsQuery> {
    let schema = ModelMetricsListV3::deserialize(wire)?;
    Ok(schema.to_query(store))
}

pub(super) fn encode(list: &MetricsList) -> Result<Value> {
    Ok(serde_json::to_value(ModelMetricsListV3::from_list(list)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::store::{MemoryStore, StoredObject};
    use arrow::array::{ArrayRef, Float64Array};
    use serde_json::json;
    use std::sync::Arc;

    fn record(stats: MetricStats) -> MetricRecord {
        MetricRecord::builder("m1".into(), 5, "f1".into(), 9, stats)
            .duration_ms(12)
            .build()
    }

    #[test]
    fn test_request_defaults() {
        let store = MemoryStore::new();
        let query = decode(&json!({}), &store).unwrap();
        assert_eq!(query, MetricsQuery::default());
    }

    #[test]
    fn test_decode_unresolved_references_are_unset() {
        let store = MemoryStore::new();
        let query = decode(
            &json!({
                "model": "ghost",
                "frame": "ghost",
                "destination_key": "dest",
                "reconstruction_error": true,
                "deep_features_hidden_layer": 2
            }),
            &store,
        )
        .unwrap();
        assert!(query.model.is_none());
        assert!(query.frame.is_none());
        assert_eq!(query.destination_key, Some("dest".into()));
        assert!(query.reconstruction_error);
        assert_eq!(query.deep_features_layer, Some(2));
    }

    #[test]
    fn test_decode_resolves_frame_and_negative_layer_is_unset() {
        let store = MemoryStore::new();
        let column: ArrayRef = Arc::new(Float64Array::from(vec![1.0]));
        let frame = Frame::from_columns("f1", vec![("x", column)]).unwrap();
        store.put("f1".into(), StoredObject::Frame(Arc::new(frame)));

        let query = decode(
            &json!({ "frame": "f1", "deep_features_hidden_layer": -1, "destination_key": "" }),
            &store,
        )
        .unwrap();
        assert_eq!(query.frame, Some("f1".into()));
        assert!(query.deep_features_layer.is_none());
        assert!(query.destination_key.is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let store = MemoryStore::new();
        assert!(decode(&json!({ "reconstruction_error": "yes" }), &store).is_err());
    }

    #[test]
    fn test_encode_empty_list() {
        let wire = encode(&MetricsList::default()).unwrap();
        assert_eq!(wire["model_metrics"], json!([]));
        assert_eq!(wire["deep_features_hidden_layer"], json!(-1));
        assert_eq!(wire["model"], Value::Null);
    }

    #[test]
    fn test_encode_rejects_layer_beyond_wire_range() {
        let layer = usize::try_from(i32::MAX).unwrap() + 1;
        let query = MetricsQuery::for_pair("m1", "f1").deep_features(layer);
        let err = encode(&MetricsList::new(query, Vec::new())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(msg) if msg.contains("out of range")));

        let query = MetricsQuery::for_pair("m1", "f1").deep_features(7);
        let wire = encode(&MetricsList::new(query, Vec::new())).unwrap();
        assert_eq!(wire["deep_features_hidden_layer"], json!(7));
    }

    #[test]
    fn test_encode_dispatches_by_kind() {
        let binomial = record(MetricStats::Binomial(BinomialStats {
            mse: 0.25,
            r2: 0.5,
            logloss: 0.3,
            auc: 0.75,
            max_f1_threshold: 0.4,
        }));
        let clustering = record(MetricStats::Clustering(ClusteringStats {
            mse: 1.0,
            tot_withinss: 10.0,
            betweenss: 30.0,
            totss: 40.0,
        }));
        let list = MetricsList::new(
            MetricsQuery::default(),
            vec![Arc::new(binomial), Arc::new(clustering)],
        );

        let wire = encode(&list).unwrap();
        let first = &wire["model_metrics"][0];
        assert_eq!(first["model_category"], json!("Binomial"));
        assert_eq!(first["AUC"], json!(0.75));
        assert_eq!(first["Gini"], json!(0.5));
        assert_eq!(first["rmse"], json!(0.5));
        assert_eq!(first["model"]["name"], json!("m1"));
        assert_eq!(first["frame"]["checksum"], json!(9));
        assert!(first.get("predictions").is_none());

        let second = &wire["model_metrics"][1];
        assert_eq!(second["model_category"], json!("Clustering"));
        assert_eq!(second["tot_withinss"], json!(10.0));
        assert!(second.get("AUC").is_none());
    }

    #[test]
    fn test_response_parses_back() {
        let r = record(MetricStats::Regression(RegressionStats {
            mse: 4.0,
            r2: 0.9,
            mean_residual_deviance: 4.0,
            mae: 1.0,
        }));
        let wire = encode(&MetricsList::new(MetricsQuery::default(), vec![Arc::new(r)])).unwrap();
        let parsed: ModelMetricsListV3 = serde_json::from_value(wire).unwrap();
        assert_eq!(parsed.model_metrics.len(), 1);
        assert!(matches!(
            &parsed.model_metrics[0].stats,
            MetricsStatsV3::Regression(s) if (s.rmse - 2.0).abs() < f64::EPSILON
        ));
    }
}
