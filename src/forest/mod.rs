//! Random forest regressor
//!
//! Bagged CART regression trees. Every tree is grown on its own bootstrap
//! sample; predictions are the mean over trees.
//!
//! ## Determinism
//!
//! A master RNG seeded from `random_state` draws one seed per tree up front,
//! so the same data and parameters always yield bit-identical predictions.
//!
//! ## Usage
//!
//! ```rust
//! use forest_track::dataset::Dataset;
//! use forest_track::forest::{ForestParams, RandomForestRegressor};
//!
//! let train = Dataset::new(
//!     (0..20).map(|i| vec![f64::from(i)]).collect(),
//!     (0..20).map(|i| 2.0 * f64::from(i)).collect(),
//! )?;
//!
//! let mut rf = RandomForestRegressor::new(
//!     ForestParams::default().n_estimators(10).max_depth(Some(4)),
//! );
//! rf.fit(&train)?;
//! let y_pred = rf.predict(&[vec![3.0], vec![15.0]])?;
//! assert_eq!(y_pred.len(), 2);
//! # Ok::<(), forest_track::Error>(())
//! ```

mod params;
mod tree;

pub use params::{ForestParams, MaxFeatures};
pub use tree::{Node, RegressionTree};

use crate::dataset::Dataset;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tree::TreeSettings;

/// Random forest regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    n_features: Option<usize>,
}

impl RandomForestRegressor {
    /// Class name recorded by autolog and used as the `model` tag
    pub const NAME: &'static str = "RandomForestRegressor";

    /// Create an unfitted forest
    #[must_use]
    pub const fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: None,
        }
    }

    /// Hyperparameters
    #[must_use]
    pub const fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fitted trees (empty before `fit`)
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Feature count seen during `fit`
    #[must_use]
    pub const fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Whether `fit` has completed
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    /// Fit the forest, replacing any previous fit
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if the hyperparameters are out of range
    pub fn fit(&mut self, train: &Dataset) -> Result<()> {
        self.params.validate()?;

        let n_samples = train.n_samples();
        let settings = TreeSettings {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: self.params.max_features.resolve(train.n_features()),
        };

        let mut master = StdRng::seed_from_u64(self.params.random_state);
        let seeds: Vec<u64> = (0..self.params.n_estimators).map(|_| master.gen()).collect();

        tracing::info!(
            n_estimators = self.params.n_estimators,
            max_depth = ?self.params.max_depth,
            random_state = self.params.random_state,
            rows = n_samples,
            cols = train.n_features(),
            "fitting random forest"
        );

        self.trees = seeds
            .into_iter()
            .enumerate()
            .map(|(i, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if self.params.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let tree = RegressionTree::fit(train, samples, settings, &mut rng);
                tracing::debug!(tree = i, nodes = tree.node_count(), depth = tree.depth(), "grew tree");
                tree
            })
            .collect();
        self.n_features = Some(train.n_features());

        Ok(())
    }

    /// Predict every row
    ///
    /// # Errors
    /// Returns `Error::NotFitted` before `fit`, or `Error::DatasetShape` if a
    /// row's width differs from the training data
    #[allow(clippy::cast_precision_loss)]
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let n_features = self.n_features.ok_or(Error::NotFitted)?;

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(Error::DatasetShape(format!(
                "row {i} has {} features, model was fitted on {n_features}",
                row.len()
            )));
        }

        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }
}
