pub mod generator;
pub mod history_store;
pub mod job_store;
pub mod llm_service;
pub mod publisher;
pub mod repo_service;
pub mod scheduler;
pub mod tracking_sheet;

pub use generator::{ProblemAuthor, ProblemGenerator};
pub use history_store::HistoryStore;
pub use job_store::JobStore;
pub use llm_service::LlmService;
pub use publisher::ProblemPublisher;
pub use repo_service::{CommittedProblem, RepoService};
pub use scheduler::Scheduler;
pub use tracking_sheet::{TrackingAction, TrackingRow, TrackingSheet};
