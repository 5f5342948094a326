//! Metric records and the queries that select them
//!
//! ## Schema Overview
//!
//! ```text
//! Model (1) ──< MetricRecord (N) >── (1) Frame
//!                    │
//!                    └── MetricStats (one concrete kind per record)
//! ```
//!
//! A record belongs to exactly one (model, frame) pair for its whole
//! lifetime. Identity is key *and* checksum, so retraining a model in place
//! orphans the old records instead of silently re-attributing them.

mod query;
mod record;

pub use query::{MetricsList, MetricsQuery};
pub use record::{MetricRecord, MetricRecordBuilder};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete kind of a metric record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricsKind {
    /// Two-class classification
    Binomial,
    /// Multi-class classification
    Multinomial,
    /// Regression
    Regression,
    /// Clustering
    Clustering,
    /// Autoencoder reconstruction
    AutoEncoder,
}

impl MetricsKind {
    /// Kind name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binomial => "Binomial",
            Self::Multinomial => "Multinomial",
            Self::Regression => "Regression",
            Self::Clustering => "Clustering",
            Self::AutoEncoder => "AutoEncoder",
        }
    }
}

impl fmt::Display for MetricsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics for two-class classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialStats {
    /// Mean squared error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Log loss
    pub logloss: f64,
    /// Area under the ROC curve
    pub auc: f64,
    /// Threshold maximizing F1
    pub max_f1_threshold: f64,
}

/// Statistics for multi-class classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialStats {
    /// Mean squared error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Log loss
    pub logloss: f64,
    /// Mean per-class error rate
    pub mean_per_class_error: f64,
    /// Top-k hit ratios, index 0 is top-1
    pub hit_ratios: Vec<f64>,
}

/// Statistics for regression models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionStats {
    /// Mean squared error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean residual deviance
    pub mean_residual_deviance: f64,
    /// Mean absolute error
    pub mae: f64,
}

/// Statistics for clustering models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringStats {
    /// Mean squared distance to assigned centroid
    pub mse: f64,
    /// Total within-cluster sum of squares
    pub tot_withinss: f64,
    /// Between-cluster sum of squares
    pub betweenss: f64,
    /// Total sum of squares
    pub totss: f64,
}

/// Statistics for autoencoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoEncoderStats {
    /// Mean reconstruction error
    pub mse: f64,
}

/// Kind-specific statistics carried by a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricStats {
    /// Two-class classification
    Binomial(BinomialStats),
    /// Multi-class classification
    Multinomial(MultinomialStats),
    /// Regression
    Regression(RegressionStats),
    /// Clustering
    Clustering(ClusteringStats),
    /// Autoencoder
    AutoEncoder(AutoEncoderStats),
}

impl MetricStats {
    /// The record kind these statistics belong to.
    #[must_use]
    pub const fn kind(&self) -> MetricsKind {
        match self {
            Self::Binomial(_) => MetricsKind::Binomial,
            Self::Multinomial(_) => MetricsKind::Multinomial,
            Self::Regression(_) => MetricsKind::Regression,
            Self::Clustering(_) => MetricsKind::Clustering,
            Self::AutoEncoder(_) => MetricsKind::AutoEncoder,
        }
    }

    /// Mean squared error, which every kind reports.
    #[must_use]
    pub const fn mse(&self) -> f64 {
        match self {
            Self::Binomial(s) => s.mse,
            Self::Multinomial(s) => s.mse,
            Self::Regression(s) => s.mse,
            Self::Clustering(s) => s.mse,
            Self::AutoEncoder(s) => s.mse,
        }
    }
}
