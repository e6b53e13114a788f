//! Matchup -> fixed-order feature vector.
//!
//! The pipeline runs in stages over a [`RawObservation`]:
//!
//! - one-hot encoding of the categorical fields against the vocabulary seen at fit time
//! - z-scoring of the base numeric columns with the base scaler
//! - derived features computed from the raw values and z-scored by a second scaler
//! - alignment to the column schema recorded at fit time
//!
//! The schema is the contract with the downstream classifier, which reads
//! columns by position. Once fit it never changes: categories unseen at fit
//! time produce all-zero one-hot columns, never new columns.

use crate::embedding::{encode_onehot, one_hot_column_name, CategoryVocabulary};
use crate::error::{AdvisorError, Result};
use crate::observation::{CategoricalField, DerivedField, NumericField, RawObservation};
use crate::scaler::StandardScaler;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// `scaler_index` is the column in the base scaler, `None` for pass-through
    Numeric {
        field: NumericField,
        scaler_index: Option<usize>,
    },
    OneHot {
        field: CategoricalField,
        value: String,
    },
    Derived {
        field: DerivedField,
        scaler_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Everything `fit` learns. Serialized as the pipeline artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub vocabulary: CategoryVocabulary,
    pub base_scaler: StandardScaler,
    pub derived_scaler: StandardScaler,
    pub columns: Vec<FeatureColumn>,
    pub training_rows: usize,
}

impl FittedPipeline {
    fn validate(&self) -> Result<()> {
        self.base_scaler.validate()?;
        self.derived_scaler.validate()?;
        let mut names = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !names.insert(column.name.as_str()) {
                return Err(AdvisorError::validation(format!(
                    "duplicate feature column {}",
                    column.name
                )));
            }
            let in_range = match &column.kind {
                ColumnKind::Numeric {
                    scaler_index: Some(idx),
                    ..
                } => *idx < self.base_scaler.width(),
                ColumnKind::Numeric {
                    scaler_index: None, ..
                } => true,
                ColumnKind::OneHot { .. } => true,
                ColumnKind::Derived { scaler_index, .. } => {
                    *scaler_index < self.derived_scaler.width()
                }
            };
            if !in_range {
                return Err(AdvisorError::validation(format!(
                    "feature column {} points outside its scaler",
                    column.name
                )));
            }
        }
        Ok(())
    }
}

/// A transformed matchup together with the column names it was built against
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Array1<f64>,
    pub columns: Arc<Vec<String>>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    pipeline: FittedPipeline,
    names: Arc<Vec<String>>,
}

impl Fitted {
    fn new(pipeline: FittedPipeline) -> Result<Self> {
        pipeline.validate()?;
        let names = pipeline.columns.iter().map(|c| c.name.clone()).collect();
        Ok(Fitted {
            pipeline,
            names: Arc::new(names),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    fitted: Option<Fitted>,
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pipeline(pipeline: FittedPipeline) -> Result<Self> {
        Ok(FeatureVectorBuilder {
            fitted: Some(Fitted::new(pipeline)?),
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Learns vocabularies, both scalers and the column order.
    /// Refitting replaces the previous schema entirely.
    pub fn fit<'a, I>(&mut self, observations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a RawObservation>,
    {
        let observations: Vec<&RawObservation> = observations.into_iter().collect();
        if observations.is_empty() {
            return Err(AdvisorError::validation(
                "cannot fit feature builder on an empty training set",
            ));
        }

        let vocabulary = CategoryVocabulary::fit(observations.iter().copied());

        let base_rows = Array2::from_shape_fn(
            (observations.len(), NumericField::SCALED.len()),
            |(row, col)| observations[row].numeric(NumericField::SCALED[col]),
        );
        let base_scaler = StandardScaler::fit(&base_rows)?;

        let derived_rows = Array2::from_shape_fn(
            (observations.len(), DerivedField::ALL.len()),
            |(row, col)| observations[row].derived(DerivedField::ALL[col]),
        );
        let derived_scaler = StandardScaler::fit(&derived_rows)?;

        let mut columns = Vec::new();
        for (idx, field) in NumericField::SCALED.iter().enumerate() {
            columns.push(FeatureColumn {
                name: field.name().to_string(),
                kind: ColumnKind::Numeric {
                    field: *field,
                    scaler_index: Some(idx),
                },
            });
        }
        for field in NumericField::UNSCALED.iter() {
            columns.push(FeatureColumn {
                name: field.name().to_string(),
                kind: ColumnKind::Numeric {
                    field: *field,
                    scaler_index: None,
                },
            });
        }
        for vocab in vocabulary.fields() {
            for value in &vocab.values {
                columns.push(FeatureColumn {
                    name: one_hot_column_name(vocab.field, value),
                    kind: ColumnKind::OneHot {
                        field: vocab.field,
                        value: value.clone(),
                    },
                });
            }
        }
        for (idx, field) in DerivedField::ALL.iter().enumerate() {
            columns.push(FeatureColumn {
                name: field.name().to_string(),
                kind: ColumnKind::Derived {
                    field: *field,
                    scaler_index: idx,
                },
            });
        }

        let pipeline = FittedPipeline {
            vocabulary,
            base_scaler,
            derived_scaler,
            columns,
            training_rows: observations.len(),
        };
        let fitted = Fitted::new(pipeline)?;
        tracing::info!(
            rows = observations.len(),
            columns = fitted.names.len(),
            "fit feature pipeline"
        );
        self.fitted = Some(fitted);
        Ok(())
    }

    fn fitted(&self) -> Result<&Fitted> {
        self.fitted.as_ref().ok_or(AdvisorError::NotFitted)
    }

    pub fn pipeline(&self) -> Result<&FittedPipeline> {
        Ok(&self.fitted()?.pipeline)
    }

    pub fn column_order(&self) -> Result<&[String]> {
        Ok(self.fitted()?.names.as_slice())
    }

    pub fn transform(&self, observation: &RawObservation) -> Result<FeatureVector> {
        let fitted = self.fitted()?;
        Ok(FeatureVector {
            values: Array1::from_vec(encode(&fitted.pipeline, observation)),
            columns: Arc::clone(&fitted.names),
        })
    }

    /// One row per observation, columns in fit order
    pub fn transform_batch<'a, I>(&self, observations: I) -> Result<Array2<f64>>
    where
        I: IntoIterator<Item = &'a RawObservation>,
    {
        let fitted = self.fitted()?;
        let width = fitted.names.len();
        let mut flat = Vec::new();
        let mut rows = 0;
        for observation in observations {
            flat.extend(encode(&fitted.pipeline, observation));
            rows += 1;
        }
        Array2::from_shape_vec((rows, width), flat)
            .map_err(|e| AdvisorError::validation(format!("feature matrix shape: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.pipeline()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let pipeline: FittedPipeline = serde_json::from_str(json)?;
        Self::from_pipeline(pipeline)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

fn encode(pipeline: &FittedPipeline, observation: &RawObservation) -> Vec<f64> {
    pipeline
        .columns
        .iter()
        .map(|column| match &column.kind {
            ColumnKind::Numeric {
                field,
                scaler_index: Some(idx),
            } => pipeline
                .base_scaler
                .transform_value(*idx, observation.numeric(*field)),
            ColumnKind::Numeric {
                field,
                scaler_index: None,
            } => observation.numeric(*field),
            ColumnKind::OneHot { field, value } => encode_onehot(observation, *field, value),
            ColumnKind::Derived {
                field,
                scaler_index,
            } => pipeline
                .derived_scaler
                .transform_value(*scaler_index, observation.derived(*field)),
        })
        .collect()
}
