pub mod job;

pub use job::{JobRecord, JobSource, RelevantJob, SearchProfile, NOT_SPECIFIED};
