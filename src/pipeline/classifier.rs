//! Pre-trained classifiers
//!
//! The pipeline treats the classifier as a black box behind the
//! [`Classifier`] trait. Two serialized model kinds are provided: a random
//! forest of binary decision trees in flattened array form, and a logistic
//! regression.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::features::FeatureVector;

/// Sentinel used in `children_left` / `children_right` for leaf nodes
pub const TREE_LEAF: i64 = -1;

/// Inference interface of a trained binary classifier
pub trait Classifier {
    /// Number of input features
    fn n_features(&self) -> usize;

    /// Predicted class label
    fn predict(&self, features: &FeatureVector) -> Result<i64, PipelineError>;

    /// Per-class probabilities, in class order
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, PipelineError>;

    /// Relative importance of each input feature, when the model provides it
    fn feature_importances(&self) -> Option<Vec<f64>>;
}

/// A single decision tree.
///
/// Node `i` is a leaf when `children_left[i] == TREE_LEAF`. Otherwise the
/// sample goes left when `x[feature[i]] <= threshold[i]`. `value[i]` holds
/// the class weights at node `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays differ in length".to_string());
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(format!("node {} has only a right child", node));
                }
                let row = &self.value[node];
                if row.len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        row.len(),
                        n_classes
                    ));
                }
                if row.iter().any(|v| !v.is_finite() || *v < 0.0) || row.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }

            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!(
                    "node {} splits on feature {} of {}",
                    node, feature, n_features
                ));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {} has a NaN threshold", node));
            }
        }

        Ok(())
    }

    /// Normalized class weights of the leaf reached by `x`.
    ///
    /// Every step must move to a later node, so a malformed tree fails
    /// instead of looping.
    fn leaf_proba(&self, x: &[f64]) -> Result<Vec<f64>, PipelineError> {
        let broken = |msg: String| PipelineError::InvalidArtifact(format!("decision tree: {}", msg));
        let n = self.node_count();

        let mut node = 0usize;
        loop {
            let left = *self
                .children_left
                .get(node)
                .ok_or_else(|| broken(format!("node {} does not exist", node)))?;
            if left == TREE_LEAF {
                break;
            }

            let feature = self.feature.get(node).copied().unwrap_or(-1);
            let value = usize::try_from(feature)
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(|| broken(format!("node {} splits on missing feature {}", node, feature)))?;
            let threshold = self.threshold.get(node).copied().unwrap_or(f64::NAN);
            let next = if *value <= threshold {
                left
            } else {
                self.children_right.get(node).copied().unwrap_or(TREE_LEAF)
            };

            if next <= node as i64 || next >= n as i64 {
                return Err(broken(format!("node {} has invalid child {}", node, next)));
            }
            node = next as usize;
        }

        let row = self
            .value
            .get(node)
            .ok_or_else(|| broken(format!("leaf {} has no class weights", node)))?;
        let total: f64 = row.iter().sum();
        if total.is_nan() || total <= 0.0 {
            return Err(broken(format!("leaf {} has invalid class weights", node)));
        }
        Ok(row.iter().map(|v| v / total).collect())
    }
}

/// Random forest: averaged class probabilities of its trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
    /// Impurity-based importances recorded at training time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

/// Binary logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<i64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

/// Any supported serialized model.
///
/// Deserialization validates the parameters, so a loaded `Model` is always
/// safe to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[serde(try_from = "RawModel")]
pub enum Model {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

/// On-disk shape of a model artifact, before validation
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawModel {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl TryFrom<RawModel> for Model {
    type Error = PipelineError;

    fn try_from(raw: RawModel) -> Result<Self, Self::Error> {
        let model = match raw {
            RawModel::RandomForest(rf) => Model::RandomForest(rf),
            RawModel::LogisticRegression(lr) => Model::LogisticRegression(lr),
        };
        model.validate()?;
        Ok(model)
    }
}

impl Model {
    /// Human readable model kind
    pub fn kind(&self) -> &'static str {
        match self {
            Model::RandomForest(_) => "Random Forest",
            Model::LogisticRegression(_) => "Logistic Regression",
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Model::RandomForest(rf) => &rf.classes,
            Model::LogisticRegression(lr) => &lr.classes,
        }
    }

    /// Check internal consistency of the model parameters
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: String| PipelineError::InvalidArtifact(format!("{}: {}", self.kind(), msg));

        let classes = self.classes();
        if classes.len() < 2 {
            return Err(invalid(format!("needs at least 2 classes, has {}", classes.len())));
        }

        match self {
            Model::RandomForest(rf) => {
                if rf.n_features == 0 {
                    return Err(invalid("n_features is 0".to_string()));
                }
                if rf.trees.is_empty() {
                    return Err(invalid("forest has no trees".to_string()));
                }
                for (i, tree) in rf.trees.iter().enumerate() {
                    tree.validate(rf.n_features, classes.len())
                        .map_err(|msg| invalid(format!("tree {}: {}", i, msg)))?;
                }
                if let Some(importances) = &rf.feature_importances {
                    if importances.len() != rf.n_features {
                        return Err(invalid(format!(
                            "{} feature importances for {} features",
                            importances.len(),
                            rf.n_features
                        )));
                    }
                }
            }
            Model::LogisticRegression(lr) => {
                if classes.len() != 2 {
                    return Err(invalid("logistic regression must be binary".to_string()));
                }
                if lr.coef.is_empty() {
                    return Err(invalid("no coefficients".to_string()));
                }
                if lr.coef.iter().any(|c| !c.is_finite()) || !lr.intercept.is_finite() {
                    return Err(invalid("non-finite coefficients".to_string()));
                }
            }
        }

        Ok(())
    }

    fn check_width(&self, features: &FeatureVector) -> Result<(), PipelineError> {
        if features.len() != self.n_features() {
            return Err(PipelineError::InvalidArtifact(format!(
                "{} expects {} features, got {}",
                self.kind(),
                self.n_features(),
                features.len()
            )));
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for Model {
    fn n_features(&self) -> usize {
        match self {
            Model::RandomForest(rf) => rf.n_features,
            Model::LogisticRegression(lr) => lr.coef.len(),
        }
    }

    fn predict(&self, features: &FeatureVector) -> Result<i64, PipelineError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins on ties.
        let best = proba
            .iter()
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |best, (i, &p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            })
            .0;

        self.classes().get(best).copied().ok_or_else(|| {
            PipelineError::InvalidArtifact(format!(
                "{} has no class for probability index {}",
                self.kind(),
                best
            ))
        })
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, PipelineError> {
        self.check_width(features)?;
        let x = features.values();

        match self {
            Model::RandomForest(rf) => {
                let mut sum = vec![0.0; rf.classes.len()];
                for tree in &rf.trees {
                    for (acc, p) in sum.iter_mut().zip(tree.leaf_proba(x)?) {
                        *acc += p;
                    }
                }
                let n_trees = rf.trees.len() as f64;
                Ok(sum.into_iter().map(|s| s / n_trees).collect())
            }
            Model::LogisticRegression(lr) => {
                let z: f64 = lr
                    .coef
                    .iter()
                    .zip(x)
                    .map(|(c, v)| c * v)
                    .sum::<f64>()
                    + lr.intercept;
                let p = sigmoid(z);
                Ok(vec![1.0 - p, p])
            }
        }
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            Model::RandomForest(rf) => rf.feature_importances.clone(),
            Model::LogisticRegression(lr) => {
                let total: f64 = lr.coef.iter().map(|c| c.abs()).sum();
                if total == 0.0 {
                    return None;
                }
                Some(lr.coef.iter().map(|c| c.abs() / total).collect())
            }
        }
    }
}
