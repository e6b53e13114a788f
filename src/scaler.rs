use crate::error::{AdvisorError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column z-score parameters, fixed once fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits on a rows x columns matrix using the population standard deviation.
    /// Constant columns get a scale of 1.0.
    pub fn fit(rows: &Array2<f64>) -> Result<Self> {
        let mean = rows
            .mean_axis(Axis(0))
            .ok_or_else(|| AdvisorError::validation("cannot fit a scaler on zero rows"))?;
        let std = rows.std_axis(Axis(0), 0.0);

        let scale = std
            .iter()
            .map(|s| if *s > f64::EPSILON { *s } else { 1.0 })
            .collect();
        Ok(StandardScaler {
            mean: mean.to_vec(),
            scale,
        })
    }

    /// Rejects parameters a fit could never produce: mismatched lengths,
    /// non-finite values or a non-positive scale.
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(AdvisorError::validation(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(AdvisorError::validation("scaler mean is not finite"));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(AdvisorError::validation(
                "scaler scale must be finite and positive",
            ));
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_value(&self, column: usize, value: f64) -> f64 {
        (value - self.mean[column]) / self.scale[column]
    }
}
