use crate::error::{AdvisorError, Result};
use crate::feature_builder::FeatureVector;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMetadata {
    pub feature_column_order: Vec<String>,
    pub version: String,
}

/// A trained model scoring matchups. Opaque apart from its column contract.
pub trait ClassifierService: Send + Sync {
    /// Probability in [0, 1] that side A wins
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    fn metadata(&self) -> &ClassifierMetadata;
}

/// Fails unless `columns` is exactly the order the classifier was trained on.
/// Columns are never reordered or truncated to make them fit.
pub fn verify_contract(columns: &[String], metadata: &ClassifierMetadata) -> Result<()> {
    let expected = &metadata.feature_column_order;
    if columns.len() != expected.len() {
        return Err(AdvisorError::contract(format!(
            "classifier {} expects {} feature columns, pipeline produces {}",
            metadata.version,
            expected.len(),
            columns.len()
        )));
    }
    if let Some(idx) = columns.iter().zip(expected).position(|(a, b)| a != b) {
        return Err(AdvisorError::contract(format!(
            "classifier {} expects column {} at position {}, pipeline has {}",
            metadata.version, expected[idx], idx, columns[idx]
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticModelFile {
    #[serde(flatten)]
    metadata: ClassifierMetadata,
    weights: Vec<f64>,
    intercept: f64,
}

/// Linear model over the feature vector followed by a sigmoid
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    metadata: ClassifierMetadata,
    weights: Array1<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(metadata: ClassifierMetadata, weights: Vec<f64>, intercept: f64) -> Result<Self> {
        if weights.len() != metadata.feature_column_order.len() {
            return Err(AdvisorError::contract(format!(
                "model {} has {} weights for {} columns",
                metadata.version,
                weights.len(),
                metadata.feature_column_order.len()
            )));
        }
        Ok(LogisticClassifier {
            metadata,
            weights: Array1::from_vec(weights),
            intercept,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: LogisticModelFile = serde_json::from_str(json)?;
        Self::new(file.metadata, file.weights, file.intercept)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let classifier = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::info!(
            version = %classifier.metadata.version,
            columns = classifier.weights.len(),
            "loaded classifier from {}",
            path.display()
        );
        Ok(classifier)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = LogisticModelFile {
            metadata: self.metadata.clone(),
            weights: self.weights.to_vec(),
            intercept: self.intercept,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ClassifierService for LogisticClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        verify_contract(&features.columns, &self.metadata)?;
        Ok(sigmoid(self.weights.dot(&features.values) + self.intercept))
    }

    fn metadata(&self) -> &ClassifierMetadata {
        &self.metadata
    }
}
