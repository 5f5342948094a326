//! Model collaborator traits
//!
//! Training and scoring algorithms live outside this crate. A model only has
//! to expose its identity and a scoring entry point. Models that can extract
//! intermediate representations opt into the [`DeepFeatures`] capability by
//! returning it from [`Model::deep_features`].

use crate::frame::Frame;
use crate::store::ObjectKey;
use crate::{Error, Result};
use std::fmt;

/// A trained model that can score frames.
pub trait Model: Send + Sync + fmt::Debug {
    /// Key the model is stored under.
    fn key(&self) -> &ObjectKey;

    /// Checksum identifying this exact trained model.
    fn checksum(&self) -> u64;

    /// Score `frame` and return the predictions frame.
    ///
    /// Implementations persist the predictions under `destination`, or under
    /// a key of their own choosing when it is `None`, and persist a metric
    /// record for the (model, frame) pair when they can compute one. Any
    /// coordination with concurrent writers to the model is the
    /// implementation's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Scoring`] (or any other error) if scoring fails; the
    /// error is propagated to the caller unchanged.
    fn score(&self, frame: &Frame, destination: Option<&ObjectKey>) -> Result<Frame>;

    /// The deep-features capability, if this model supports it.
    fn deep_features(&self) -> Option<&dyn DeepFeatures> {
        None
    }
}

/// Extraction of intermediate representations (autoencoder-style models).
pub trait DeepFeatures: Send + Sync {
    /// Per-row reconstruction error.
    ///
    /// # Errors
    ///
    /// Returns error if the model cannot score the frame
    fn score_reconstruction_error(&self, frame: &Frame) -> Result<Frame>;

    /// Activations of hidden layer `layer` (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns error if the layer does not exist or scoring fails
    fn score_deep_features(&self, frame: &Frame, layer: usize) -> Result<Frame>;
}

/// Name of the capability required by the non-standard predict modes.
pub const DEEP_FEATURES_CAPABILITY: &str = "DeepFeatures";

/// What `predict` computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictMode {
    /// Plain model predictions
    Standard,
    /// Autoencoder reconstruction error
    ReconstructionError,
    /// Hidden layer activations
    DeepFeatures {
        /// Hidden layer index (0-indexed)
        layer: usize,
    },
}

impl PredictMode {
    /// Pick the mode from the two request flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if both flags are set
    pub fn from_flags(
        reconstruction_error: bool,
        deep_features_layer: Option<usize>,
    ) -> Result<Self> {
        match (reconstruction_error, deep_features_layer) {
            (true, Some(_)) => Err(Error::invalid(
                "Can only compute either reconstruction error OR deep features.",
            )),
            (true, None) => Ok(Self::ReconstructionError),
            (false, Some(layer)) => Ok(Self::DeepFeatures { layer }),
            (false, None) => Ok(Self::Standard),
        }
    }

    /// Whether this is plain prediction.
    #[must_use]
    pub const fn is_standard(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Run a non-standard mode against a capable model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when called with
    /// [`PredictMode::Standard`], or whatever the capability returns
    pub fn run_capability(self, capability: &dyn DeepFeatures, frame: &Frame) -> Result<Frame> {
        match self {
            Self::ReconstructionError => capability.score_reconstruction_error(frame),
            Self::DeepFeatures { layer } => capability.score_deep_features(frame, layer),
            Self::Standard => Err(Error::invalid(
                "standard predictions do not use the deep features capability",
            )),
        }
    }
}

impl fmt::Display for PredictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::ReconstructionError => f.write_str("reconstruction_error"),
            Self::DeepFeatures { layer } => write!(f, "deep_features[{layer}]"),
        }
    }
}
