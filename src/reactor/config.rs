use rustc_hash::FxHashSet;

use crate::base::QName;

/// Default bound on augment and deviation resolution rounds.
pub const DEFAULT_MAX_INFERENCE_ROUNDS: usize = 64;

/// Reactor configuration.
#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// Run per-source phase work on the rayon pool.
    pub parallel: bool,
    /// Features kept by if-feature pruning. `None` supports every feature.
    pub supported_features: Option<FxHashSet<QName>>,
    /// Rounds allowed for augments of augmented nodes to settle.
    pub max_inference_rounds: usize,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            supported_features: None,
            max_inference_rounds: DEFAULT_MAX_INFERENCE_ROUNDS,
        }
    }
}

impl ReactorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_supported_features(mut self, features: impl IntoIterator<Item = QName>) -> Self {
        self.supported_features = Some(features.into_iter().collect());
        self
    }

    pub fn with_max_inference_rounds(mut self, rounds: usize) -> Self {
        self.max_inference_rounds = rounds;
        self
    }

    pub fn is_feature_supported(&self, feature: &QName) -> bool {
        self.supported_features
            .as_ref()
            .is_none_or(|features| features.contains(feature))
    }
}
