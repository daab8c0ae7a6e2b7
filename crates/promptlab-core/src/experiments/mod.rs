//! Experiment execution and run comparison

pub mod comparison;
pub mod runner;
pub mod types;

pub use comparison::{compare_experiments, REGRESSION_THRESHOLD};
pub use runner::{ExperimentRequest, ExperimentRunner};
pub use types::{
    ExperimentComparison, ExperimentResult, ExperimentRun, ExperimentStatus, ExperimentSummary,
    MetricSet, RegressionFlags,
};
