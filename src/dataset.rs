//! Dataset splits loaded from pickled `(X, y)` pairs
//!
//! The preprocessing step dumps each split as a Python pickle of a 2-tuple:
//! a list of equal-length numeric rows and a list of numeric labels
//! (`pickle.dump((X.tolist(), y.tolist()), f)`). Integer values are widened
//! to `f64` on load.

use crate::{Error, Result};
use serde_pickle::{DeOptions, SerOptions};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the training split inside the data directory
pub const TRAIN_FILE: &str = "train.pkl";

/// File name of the validation split inside the data directory
pub const VAL_FILE: &str = "val.pkl";

/// One dataset split: a dense feature matrix and its label vector.
///
/// Invariant: at least one row, every row has the same width, and there is
/// exactly one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl Dataset {
    /// Build a split, validating its shape.
    ///
    /// # Errors
    /// Returns `Error::DatasetShape` for an empty matrix, ragged rows, or a
    /// label count that differs from the row count
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::DatasetShape("feature matrix has no rows".to_string()));
        }

        let width = features[0].len();
        if width == 0 {
            return Err(Error::DatasetShape("feature matrix has no columns".to_string()));
        }
        if let Some((i, row)) = features.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::DatasetShape(format!(
                "row {i} has {} features, expected {width}",
                row.len()
            )));
        }

        if labels.len() != features.len() {
            return Err(Error::DatasetShape(format!(
                "{} labels for {} feature rows",
                labels.len(),
                features.len()
            )));
        }

        Ok(Self { features, labels })
    }

    /// Load a split from a pickled `(X, y)` tuple
    ///
    /// `X` must be a list of numeric lists and `y` a list or tuple of numbers,
    /// as written by `pickle.dump((X.tolist(), y.tolist()), f)`. Pickled numpy
    /// arrays or scipy sparse matrices reference Python classes and are not
    /// readable here; convert them with `.tolist()` (or `.toarray().tolist()`)
    /// first.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be opened, `Error::Pickle` if it
    /// is not a plain-list `(X, y)` pickle (including numpy/scipy objects),
    /// or `Error::DatasetShape` for an invalid shape
    pub fn load_pickle<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let (features, labels): (Vec<Vec<f64>>, Vec<f64>) =
            serde_pickle::from_reader(BufReader::new(file), DeOptions::new())?;

        let dataset = Self::new(features, labels)?;
        tracing::debug!(
            path = %path.display(),
            rows = dataset.n_samples(),
            cols = dataset.n_features(),
            "loaded dataset split"
        );
        Ok(dataset)
    }

    /// Write the split as a pickled `(X, y)` tuple
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written
    pub fn write_pickle<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_pickle::to_writer(&mut writer, &(&self.features, &self.labels), SerOptions::new())?;
        writer.flush()?;
        Ok(())
    }

    /// Number of rows
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features[0].len()
    }

    /// Feature matrix, row-major
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Label vector
    #[must_use]
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Single feature row
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.features[index]
    }
}

/// Locations of the two splits inside a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// `<dir>/train.pkl`
    pub train: PathBuf,
    /// `<dir>/val.pkl`
    pub val: PathBuf,
}

impl DatasetPaths {
    /// Resolve the split files inside `dir`
    #[must_use]
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            train: dir.join(TRAIN_FILE),
            val: dir.join(VAL_FILE),
        }
    }

    /// Load `(train, val)`
    ///
    /// # Errors
    /// Returns the first load error; the validation split is not read if the
    /// training split fails
    pub fn load(&self) -> Result<(Dataset, Dataset)> {
        let train = Dataset::load_pickle(&self.train)?;
        let val = Dataset::load_pickle(&self.val)?;
        Ok((train, val))
    }
}
