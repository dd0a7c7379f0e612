pub mod history;
pub mod job;
pub mod problem;
pub mod syllabus;

pub use history::{BeltHistory, GenerationHistory};
pub use job::{parse_schedule_time, ScheduledJob};
pub use problem::{CommitAction, CommitForm, DeleteForm, GenerateForm, MessageBody, ProblemDraft};
pub use syllabus::{belt_dir_name, Belt, Category, Syllabus};
