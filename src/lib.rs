pub mod advisor;
pub mod classifier;
pub mod config;
pub mod damage;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod feature_builder;
pub mod inspect;
pub mod matchup_calc;
pub mod move_selector;
pub mod observation;
pub mod scaler;
pub mod sources;
pub mod state;
pub mod turn_order;
pub mod type_chart;

pub use advisor::{MoveAdvisor, MoveRanking, RankedMove};
pub use classifier::{ClassifierMetadata, ClassifierService, LogisticClassifier};
pub use config::AdvisorConfig;
pub use dataset::{
    generate_dataset, CancellationToken, GeneratedDataset, GenerationParams, GenerationReport,
    MatchupSample, Roster, Scenario,
};
pub use error::{AdvisorError, Result};
pub use feature_builder::{FeatureVector, FeatureVectorBuilder};
pub use sources::JsonDataSource;
