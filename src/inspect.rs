//! Human readable dumps of the fitted pipeline and of single matchups,
//! used by `battle-advisor inspect` and when debugging a ranking.

use crate::feature_builder::{ColumnKind, FeatureVector, FittedPipeline};
use crate::observation::{RawObservation, SideObservation};
use std::fmt;

pub struct PipelineReport<'a>(pub &'a FittedPipeline);

impl fmt::Display for PipelineReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pipeline = self.0;
        writeln!(f, "=== Feature Pipeline ===")?;
        writeln!(f, "Training rows: {}", pipeline.training_rows)?;
        writeln!(f, "Columns: {}", pipeline.columns.len())?;

        writeln!(f, "\n=== Vocabulary ===")?;
        for vocab in pipeline.vocabulary.fields() {
            writeln!(f, "{}: {}", vocab.field.name(), vocab.values.join(", "))?;
        }

        writeln!(f, "\n=== Columns ===")?;
        for (idx, column) in pipeline.columns.iter().enumerate() {
            match &column.kind {
                ColumnKind::Numeric {
                    scaler_index: Some(s),
                    ..
                } => writeln!(
                    f,
                    "{:>3} {:<28} numeric  mean={:.3} scale={:.3}",
                    idx, column.name, pipeline.base_scaler.mean[*s], pipeline.base_scaler.scale[*s]
                )?,
                ColumnKind::Numeric {
                    scaler_index: None, ..
                } => writeln!(f, "{:>3} {:<28} numeric  unscaled", idx, column.name)?,
                ColumnKind::OneHot { .. } => writeln!(f, "{:>3} {:<28} one-hot", idx, column.name)?,
                ColumnKind::Derived { scaler_index, .. } => writeln!(
                    f,
                    "{:>3} {:<28} derived  mean={:.3} scale={:.3}",
                    idx,
                    column.name,
                    pipeline.derived_scaler.mean[*scaler_index],
                    pipeline.derived_scaler.scale[*scaler_index]
                )?,
            }
        }
        Ok(())
    }
}

pub fn describe_pipeline(pipeline: &FittedPipeline) -> String {
    PipelineReport(pipeline).to_string()
}

fn write_side(f: &mut fmt::Formatter<'_>, label: &str, side: &SideObservation) -> fmt::Result {
    writeln!(f, "\n=== Side {} ===", label)?;
    writeln!(
        f,
        "Types: {}{}",
        side.type1,
        side.type2.as_deref().map(|t| format!("/{}", t)).unwrap_or_default()
    )?;
    writeln!(
        f,
        "Stats: hp={} atk={} def={} spa={} spd={} spe={} (total {})",
        side.hp, side.attack, side.defense, side.sp_attack, side.sp_defense, side.speed, side.total_stats
    )?;
    writeln!(
        f,
        "Move: {} power={} priority={} stab={} type_multiplier={}",
        side.move_type, side.move_power, side.move_priority, side.move_stab, side.move_type_multiplier
    )
}

pub struct ObservationReport<'a>(pub &'a RawObservation);

impl fmt::Display for ObservationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observation = self.0;
        write_side(f, "A", &observation.a)?;
        write_side(f, "B", &observation.b)?;
        writeln!(f, "\n=== Matchup ===")?;
        writeln!(f, "Speed diff: {}", observation.speed_diff)?;
        writeln!(f, "HP diff: {}", observation.hp_diff)?;
        writeln!(
            f,
            "First mover: {}",
            if observation.first_mover_flag == 1.0 { "A" } else { "B" }
        )
    }
}

pub fn describe_observation(observation: &RawObservation) -> String {
    ObservationReport(observation).to_string()
}

/// `column = value` per line, in column order
pub fn describe_vector(vector: &FeatureVector) -> String {
    vector
        .columns
        .iter()
        .zip(vector.values.iter())
        .map(|(name, value)| format!("{:<28} {:>9.4}\n", name, value))
        .collect()
}
