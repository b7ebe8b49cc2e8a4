//! CART regression tree (squared-error criterion)
//!
//! Nodes live in a flat arena; children are referenced by index. Growth uses
//! an explicit work stack so unbounded depth cannot overflow the call stack.

use crate::dataset::Dataset;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Terminal node predicting the mean label of its samples
    Leaf {
        /// Predicted value
        value: f64,
        /// Training samples that reached this node
        n_samples: usize,
    },
    /// Internal node: `x[feature] <= threshold` goes left
    Split {
        /// Feature column
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Arena index of the left child
        left: usize,
        /// Arena index of the right child
        right: usize,
        /// Training samples that reached this node
        n_samples: usize,
    },
}

/// Growth limits for one tree, already resolved against the dataset width
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeSettings {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    // sum_l²/n_l + sum_r²/n_r; maximizing it minimizes the children's SSE
    proxy: f64,
}

struct Task {
    node: usize,
    depth: usize,
    samples: Vec<usize>,
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    depth: usize,
}

impl RegressionTree {
    /// Grow a tree on `samples` (row indices into `dataset`, duplicates allowed)
    pub(crate) fn fit(
        dataset: &Dataset,
        samples: Vec<usize>,
        settings: TreeSettings,
        rng: &mut StdRng,
    ) -> Self {
        let labels = dataset.labels();
        let mut nodes = vec![Node::Leaf {
            value: 0.0,
            n_samples: 0,
        }];
        let mut depth = 0;
        let mut stack = vec![Task {
            node: 0,
            depth: 0,
            samples,
        }];

        while let Some(task) = stack.pop() {
            depth = depth.max(task.depth);
            let n = task.samples.len();
            let value = mean_label(labels, &task.samples);

            let may_split = n >= settings.min_samples_split
                && n >= 2 * settings.min_samples_leaf
                && settings.max_depth.map_or(true, |d| task.depth < d)
                && sum_squared_error(labels, &task.samples, value) > 0.0;

            let split = if may_split {
                let features = candidate_features(dataset.n_features(), settings.max_features, rng);
                best_split(dataset, &task.samples, &features, settings.min_samples_leaf)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[task.node] = Node::Leaf { value, n_samples: n };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = task
                .samples
                .into_iter()
                .partition(|&i| dataset.row(i)[split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            let placeholder = Node::Leaf {
                value: 0.0,
                n_samples: 0,
            };
            nodes.push(placeholder.clone());
            nodes.push(placeholder);
            nodes[task.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
                n_samples: n,
            };

            stack.push(Task {
                node: right,
                depth: task.depth + 1,
                samples: right_samples,
            });
            stack.push(Task {
                node: left,
                depth: task.depth + 1,
                samples: left_samples,
            });
        }

        Self { nodes, depth }
    }

    /// Predict one row
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Node arena, root first
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest node (a lone root leaf has depth 0)
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_label(labels: &[f64], samples: &[usize]) -> f64 {
    samples.iter().map(|&i| labels[i]).sum::<f64>() / samples.len() as f64
}

fn sum_squared_error(labels: &[f64], samples: &[usize], mean: f64) -> f64 {
    samples
        .iter()
        .map(|&i| (labels[i] - mean) * (labels[i] - mean))
        .sum()
}

fn candidate_features(n_features: usize, max_features: usize, rng: &mut StdRng) -> Vec<usize> {
    if max_features >= n_features {
        return (0..n_features).collect();
    }
    rand::seq::index::sample(rng, n_features, max_features).into_vec()
}

#[allow(clippy::cast_precision_loss)]
fn best_split(
    dataset: &Dataset,
    samples: &[usize],
    features: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let labels = dataset.labels();
    let n = samples.len();
    let total: f64 = samples.iter().map(|&i| labels[i]).sum();
    let mut best: Option<SplitCandidate> = None;
    let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

    for &feature in features {
        column.clear();
        column.extend(samples.iter().map(|&i| (dataset.row(i)[feature], labels[i])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        if column[n - 1].0 <= column[0].0 {
            continue;
        }

        let mut left_sum = 0.0;
        for k in 1..n {
            left_sum += column[k - 1].1;
            if k < min_samples_leaf || n - k < min_samples_leaf {
                continue;
            }
            let (lo, hi) = (column[k - 1].0, column[k].0);
            if hi <= lo {
                continue;
            }

            let right_sum = total - left_sum;
            let proxy = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
            if best.map_or(true, |b| proxy > b.proxy) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(lo, hi),
                    proxy,
                });
            }
        }
    }

    best
}

// Keeps `lo <= threshold < hi` even when the halfway point rounds up to `hi`
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid >= hi || !mid.is_finite() {
        lo
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn settings(max_depth: Option<usize>) -> TreeSettings {
        TreeSettings {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }

    fn step_dataset() -> Dataset {
        Dataset::new(
            vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]],
            vec![5.0, 5.0, 5.0, 20.0, 20.0, 20.0],
        )
        .unwrap()
    }

    fn all_rows(ds: &Dataset) -> Vec<usize> {
        (0..ds.n_samples()).collect()
    }

    #[test]
    fn test_step_function_single_split() {
        let ds = step_dataset();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&ds, all_rows(&ds), settings(None), &mut rng);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        match &tree.nodes()[0] {
            Node::Split { threshold, .. } => assert!((threshold - 6.5).abs() < 1e-12),
            Node::Leaf { .. } => panic!("root should split"),
        }
        assert!((tree.predict_row(&[0.0]) - 5.0).abs() < f64::EPSILON);
        assert!((tree.predict_row(&[6.5]) - 5.0).abs() < f64::EPSILON);
        assert!((tree.predict_row(&[100.0]) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constant_labels_make_single_leaf() {
        let ds = Dataset::new(vec![vec![1.0], vec![2.0], vec![3.0]], vec![4.0; 3]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&ds, all_rows(&ds), settings(None), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert!((tree.predict_row(&[9.0]) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let ds = Dataset::new(
            (0..32).map(|i| vec![f64::from(i)]).collect(),
            (0..32).map(|i| f64::from(i * i)).collect(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&ds, all_rows(&ds), settings(Some(3)), &mut rng);
        assert!(tree.depth() <= 3);
        assert!(tree.leaf_count() <= 8);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let ds = step_dataset();
        let mut rng = StdRng::seed_from_u64(0);
        let s = TreeSettings {
            min_samples_leaf: 3,
            ..settings(None)
        };
        let tree = RegressionTree::fit(&ds, all_rows(&ds), s, &mut rng);
        for node in tree.nodes() {
            if let Node::Leaf { n_samples, .. } = node {
                assert!(*n_samples >= 3);
            }
        }
    }

    #[test]
    fn test_identical_features_cannot_split() {
        let ds = Dataset::new(vec![vec![1.0]; 4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&ds, all_rows(&ds), settings(None), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert!((tree.predict_row(&[1.0]) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_stays_below_hi() {
        assert!((midpoint(1.0, 2.0) - 1.5).abs() < f64::EPSILON);
        let lo = 1.0_f64;
        let hi = f64::from_bits(lo.to_bits() + 1);
        assert!(midpoint(lo, hi) < hi);
    }
}
