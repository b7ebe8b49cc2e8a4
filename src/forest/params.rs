//! Forest hyperparameters

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Every feature (regressor default)
    All,
    /// `floor(sqrt(n_features))`
    Sqrt,
    /// `floor(log2(n_features))`
    Log2,
    /// `floor(fraction * n_features)`, fraction in (0, 1]
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve to a candidate count for `n_features` columns, never below 1
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => n.sqrt().floor() as usize,
            Self::Log2 => n.log2().floor() as usize,
            Self::Fraction(f) => (f * n).floor() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "1.0"),
            Self::Sqrt => write!(f, "sqrt"),
            Self::Log2 => write!(f, "log2"),
            Self::Fraction(v) => write!(f, "{v}"),
        }
    }
}

/// Random forest hyperparameters.
///
/// Defaults follow the usual regressor defaults: 100 fully grown trees on
/// bootstrap samples, every feature considered at every split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth (`None` = grow until leaves are pure or too small)
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may be split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Fit each tree on a bootstrap sample
    pub bootstrap: bool,
    /// Seed for all randomness in `fit`
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_state: 0,
        }
    }
}

impl ForestParams {
    /// Set the number of trees
    #[must_use]
    pub const fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set the maximum depth
    #[must_use]
    pub const fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the minimum samples required to split
    #[must_use]
    pub const fn min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    /// Set the minimum samples per leaf
    #[must_use]
    pub const fn min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    /// Set the per-split feature budget
    #[must_use]
    pub const fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    #[must_use]
    pub const fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set the seed
    #[must_use]
    pub const fn random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Check parameter ranges
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` naming the first out-of-range parameter
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::InvalidInput("n_estimators must be at least 1".to_string()));
        }
        if self.max_depth == Some(0) {
            return Err(Error::InvalidInput("max_depth must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(Error::InvalidInput(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(Error::InvalidInput(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(Error::InvalidInput(format!(
                    "max_features fraction must be in (0, 1], got {f}"
                )));
            }
        }
        Ok(())
    }

    /// Every hyperparameter as `(name, value)` strings, sorted by name.
    ///
    /// `max_depth = None` renders as `None`, matching how tracking UIs show an
    /// unset depth.
    #[must_use]
    pub fn as_param_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("bootstrap", self.bootstrap.to_string()),
            (
                "max_depth",
                self.max_depth.map_or_else(|| "None".to_string(), |d| d.to_string()),
            ),
            ("max_features", self.max_features.to_string()),
            ("min_samples_leaf", self.min_samples_leaf.to_string()),
            ("min_samples_split", self.min_samples_split.to_string()),
            ("n_estimators", self.n_estimators.to_string()),
            ("random_state", self.random_state.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ForestParams::default();
        assert_eq!(p.n_estimators, 100);
        assert_eq!(p.max_depth, None);
        assert!(p.bootstrap);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::All.resolve(13), 13);
        assert_eq!(MaxFeatures::Sqrt.resolve(13), 3);
        assert_eq!(MaxFeatures::Log2.resolve(13), 3);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(13), 6);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(13), 1);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ForestParams::default().n_estimators(0).validate().is_err());
        assert!(ForestParams::default().max_depth(Some(0)).validate().is_err());
        assert!(ForestParams::default().min_samples_split(1).validate().is_err());
        assert!(ForestParams::default().min_samples_leaf(0).validate().is_err());
        assert!(ForestParams::default()
            .max_features(MaxFeatures::Fraction(1.5))
            .validate()
            .is_err());
    }

    #[test]
    fn test_param_pairs() {
        let pairs = ForestParams::default().max_depth(Some(10)).as_param_pairs();
        assert!(pairs.contains(&("max_depth", "10".to_string())));
        assert!(pairs.contains(&("random_state", "0".to_string())));
        assert!(pairs.contains(&("max_features", "1.0".to_string())));
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
