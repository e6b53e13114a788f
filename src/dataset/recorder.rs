use super::{GeneratedDataset, GenerationParams, GenerationReport, MatchupSample, Scenario};
use crate::error::Result;
use crate::feature_builder::FeatureVectorBuilder;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TRAIN_FILE: &str = "train.jsonl";
pub const TEST_FILE: &str = "test.jsonl";
pub const PIPELINE_FILE: &str = "pipeline.json";
pub const FEATURES_TRAIN_FILE: &str = "features_train.jsonl";
pub const FEATURES_TEST_FILE: &str = "features_test.jsonl";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Line-oriented writer; `&SharedFileWriter` can be handed to worker threads
pub struct SharedFileWriter {
    file: Mutex<BufWriter<File>>,
}

impl SharedFileWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        writeln!(file, "{}", line)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl Drop for SharedFileWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!("error flushing dataset file on drop: {}", e);
        }
    }
}

/// One transformed row as consumed by a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub features: Vec<f64>,
    pub label: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub created_at: DateTime<Utc>,
    pub scenario: Scenario,
    pub params: GenerationParams,
    pub report: GenerationReport,
    pub feature_columns: Vec<String>,
}

/// Writes a generated dataset and its fitted pipeline into one directory
pub struct DatasetRecorder {
    out_dir: PathBuf,
}

impl DatasetRecorder {
    pub fn new(out_dir: &Path) -> Result<Self> {
        fs::create_dir_all(out_dir)?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn record(
        &self,
        dataset: &GeneratedDataset,
        params: &GenerationParams,
        builder: &FeatureVectorBuilder,
    ) -> Result<Manifest> {
        let (train, test) = rayon::join(
            || self.write_split(TRAIN_FILE, FEATURES_TRAIN_FILE, &dataset.train, builder),
            || self.write_split(TEST_FILE, FEATURES_TEST_FILE, &dataset.test, builder),
        );
        train?;
        test?;

        builder.save(&self.out_dir.join(PIPELINE_FILE))?;

        let manifest = Manifest {
            created_at: Utc::now(),
            scenario: params.scenario,
            params: params.clone(),
            report: dataset.report.clone(),
            feature_columns: builder.column_order()?.to_vec(),
        };
        fs::write(
            self.out_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        tracing::info!(
            out_dir = %self.out_dir.display(),
            train = dataset.train.len(),
            test = dataset.test.len(),
            "recorded dataset"
        );
        Ok(manifest)
    }

    fn write_split(
        &self,
        samples_file: &str,
        features_file: &str,
        samples: &[MatchupSample],
        builder: &FeatureVectorBuilder,
    ) -> Result<()> {
        let sample_writer = SharedFileWriter::new(&self.out_dir.join(samples_file))?;
        let feature_writer = SharedFileWriter::new(&self.out_dir.join(features_file))?;

        for sample in samples {
            sample_writer.write_line(&serde_json::to_string(sample)?)?;

            let row = FeatureRow {
                features: builder.transform(&sample.features)?.values.to_vec(),
                label: sample.label(),
            };
            feature_writer.write_line(&serde_json::to_string(&row)?)?;
        }

        sample_writer.flush()?;
        feature_writer.flush()?;
        Ok(())
    }
}

/// Reads back a `train.jsonl` / `test.jsonl` file
pub fn read_samples(path: &Path) -> Result<Vec<MatchupSample>> {
    let content = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        samples.push(serde_json::from_str(line)?);
    }
    Ok(samples)
}
