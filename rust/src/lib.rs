pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod model;
pub mod render;
pub mod telemetry;

// Re-export main types
pub use api::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use controller::{Applied, AppController, Completion, RequestId, WorkflowState};
pub use error::{ApiError, ConfigError, Operation};
pub use forms::{IndexSubmission, QuerySubmission};
pub use model::{Chunk, HistoryEntry, IndexInfo, QueryResult, ResultHistory};
