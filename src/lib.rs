//! # forest-track: random forest training with local experiment tracking
//!
//! Loads two pickled dataset splits, fits a seeded random forest regressor,
//! scores it on the validation split, and records the run (tags, params,
//! metrics, artifacts) in a SQLite-backed tracking store.
//!
//! ## Modules
//!
//! - [`dataset`]: pickled `(X, y)` splits
//! - [`forest`]: CART trees + bagging
//! - [`metrics`]: RMSE and friends
//! - [`experiment`]: tracking schema and the SQLite store
//! - [`tracking`]: explicit tracking context, scoped runs, autolog
//! - [`trainer`]: the end-to-end training command
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use forest_track::trainer::{run_train, TrainConfig};
//!
//! let outcome = run_train(&TrainConfig::default())?;
//! println!("{}", outcome.rmse);
//! # Ok::<(), forest_track::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod dataset;
pub mod error;
pub mod experiment;
pub mod forest;
pub mod metrics;
pub mod tracking;
pub mod trainer;

pub use error::{Error, Result};
