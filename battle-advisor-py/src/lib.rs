use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::{pyfunction, pymodule, wrap_pyfunction, Bound, PyResult};
use std::path::Path;
use std::sync::Arc;

use battle_advisor::advisor::{MoveAdvisor, RankedMove};
use battle_advisor::classifier::LogisticClassifier;
use battle_advisor::config::AdvisorConfig;
use battle_advisor::dataset::{generate_dataset, label_column, GenerationParams, Roster, Scenario};
use battle_advisor::error::AdvisorError;
use battle_advisor::feature_builder::FeatureVectorBuilder;
use battle_advisor::sources::JsonDataSource;
use battle_advisor::state::ProfileId;

fn to_py_err(e: AdvisorError) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

type Matrix = Vec<Vec<f64>>;

/// Generates a dataset from the JSON files in `data_dir`, fits the feature
/// pipeline on the training split and returns
/// `(train_x, train_y, test_x, test_y, columns, pipeline_json)`.
#[pyfunction]
#[pyo3(signature = (data_dir, scenario = "best_move", seed = 42))]
fn generate_training_matrix(
    data_dir: &str,
    scenario: &str,
    seed: u64,
) -> PyResult<(Matrix, Vec<i64>, Matrix, Vec<i64>, Vec<String>, String)> {
    let scenario: Scenario = scenario.parse().map_err(to_py_err)?;
    let config = AdvisorConfig::default();
    let params = GenerationParams {
        scenario,
        seed,
        ..config.generation
    };

    let source = JsonDataSource::from_dir(Path::new(data_dir)).map_err(to_py_err)?;
    let roster = Roster::load(&source, &source, &source, &config.move_filter, config.level)
        .map_err(to_py_err)?;
    let dataset = generate_dataset(&roster, &params, None).map_err(to_py_err)?;
    let builder = dataset.fit_builder().map_err(to_py_err)?;

    let to_rows = |samples: &[battle_advisor::dataset::MatchupSample]| -> PyResult<Matrix> {
        let matrix = builder
            .transform_batch(samples.iter().map(|s| &s.features))
            .map_err(to_py_err)?;
        Ok(matrix.rows().into_iter().map(|row| row.to_vec()).collect())
    };

    Ok((
        to_rows(&dataset.train)?,
        label_column(&dataset.train),
        to_rows(&dataset.test)?,
        label_column(&dataset.test),
        builder.column_order().map_err(to_py_err)?.to_vec(),
        builder.to_json().map_err(to_py_err)?,
    ))
}

#[derive(Clone)]
#[pyclass(name = "RankedMove")]
pub struct PyRankedMove {
    #[pyo3(get)]
    pub move_name: String,
    #[pyo3(get)]
    pub effective_power: f64,
    #[pyo3(get)]
    pub type_multiplier: f64,
    #[pyo3(get)]
    pub stab: f64,
    #[pyo3(get)]
    pub priority: i8,
    #[pyo3(get)]
    pub score: f64,
    #[pyo3(get)]
    pub win_probability: f64,
    #[pyo3(get)]
    pub predicted_winner: String,
    #[pyo3(get)]
    pub opponent_move: String,
}

impl From<RankedMove> for PyRankedMove {
    fn from(ranked: RankedMove) -> Self {
        Self {
            move_name: ranked.move_name,
            effective_power: ranked.effective_power,
            type_multiplier: ranked.type_multiplier,
            stab: ranked.stab,
            priority: ranked.priority,
            score: ranked.score,
            win_probability: ranked.win_probability,
            predicted_winner: ranked.predicted_winner.to_string(),
            opponent_move: ranked.opponent_move,
        }
    }
}

/// Ranks `moves` of `attacker` against `defender`, best first
#[pyfunction]
#[pyo3(signature = (data_dir, pipeline_path, model_path, attacker, defender, moves, opponent_moves = None))]
fn rank_moves(
    data_dir: &str,
    pipeline_path: &str,
    model_path: &str,
    attacker: ProfileId,
    defender: ProfileId,
    moves: Vec<String>,
    opponent_moves: Option<Vec<String>>,
) -> PyResult<Vec<PyRankedMove>> {
    let source = Arc::new(JsonDataSource::from_dir(Path::new(data_dir)).map_err(to_py_err)?);
    let builder = FeatureVectorBuilder::load(Path::new(pipeline_path)).map_err(to_py_err)?;
    let classifier =
        Arc::new(LogisticClassifier::load(Path::new(model_path)).map_err(to_py_err)?);
    let advisor = MoveAdvisor::new(
        source.clone(),
        source.clone(),
        &*source,
        builder,
        classifier,
        &AdvisorConfig::default(),
    )
    .map_err(to_py_err)?;

    let ranking = advisor
        .rank_moves(attacker, defender, &moves, opponent_moves.as_deref())
        .map_err(to_py_err)?;
    Ok(ranking.moves.into_iter().map(PyRankedMove::from).collect())
}

#[pymodule]
#[pyo3(name = "_battle_advisor")]
fn py_battle_advisor(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(generate_training_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(rank_moves, m)?)?;
    m.add_class::<PyRankedMove>()?;
    Ok(())
}
