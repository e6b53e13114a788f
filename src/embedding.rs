use crate::observation::{CategoricalField, RawObservation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Values of one categorical field seen at fit time, sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVocabulary {
    pub field: CategoricalField,
    pub values: Vec<String>,
}

/// One-hot vocabularies for every categorical field, in `CategoricalField::ALL` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    fields: Vec<FieldVocabulary>,
}

impl CategoryVocabulary {
    pub fn fit<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a RawObservation>,
    {
        let mut seen: Vec<BTreeSet<String>> = vec![BTreeSet::new(); CategoricalField::ALL.len()];
        for observation in observations {
            for (idx, field) in CategoricalField::ALL.iter().enumerate() {
                // missing second types add no category
                if let Some(value) = observation.categorical(*field) {
                    seen[idx].insert(value.to_string());
                }
            }
        }

        let fields = CategoricalField::ALL
            .iter()
            .zip(seen)
            .map(|(field, values)| FieldVocabulary {
                field: *field,
                values: values.into_iter().collect(),
            })
            .collect();
        CategoryVocabulary { fields }
    }

    pub fn fields(&self) -> &[FieldVocabulary] {
        &self.fields
    }

    pub fn values(&self, field: CategoricalField) -> &[String] {
        self.fields
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.values.as_slice())
            .unwrap_or(&[])
    }

    /// Number of one-hot columns this vocabulary produces
    pub fn width(&self) -> usize {
        self.fields.iter().map(|v| v.values.len()).sum()
    }
}

pub fn one_hot_column_name(field: CategoricalField, value: &str) -> String {
    format!("{}_{}", field.name(), value)
}

/// 1.0 when the observation has `value` for `field`.
/// Values missing from the fit vocabulary never match any column.
pub fn encode_onehot(observation: &RawObservation, field: CategoricalField, value: &str) -> f64 {
    match observation.categorical(field) {
        Some(v) if v == value => 1.0,
        _ => 0.0,
    }
}
