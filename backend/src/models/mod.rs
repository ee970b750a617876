pub mod analysis;
pub mod ids;
pub mod macros;
pub mod matrix;
pub mod planet;
pub mod topic;

pub use analysis::{
    AnalysisRun, AnalysisWindow, Classification, ClassificationSummary, HourAnalysis,
    TopicAnalysis, TopicFailure, TopicFailureReason,
};
pub use ids::{hour_range, HourSlot, UserId, MAX_HOUR_COUNT};
pub use matrix::{
    DateInputs, DateRecord, HourSelection, IngestError, PlanetRow, PlanetaryMatrix, RawMatrix,
    TopicMatrix, WindowInputs,
};
pub use planet::PlanetCode;
pub use topic::{TopicError, TopicKey};
