use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no task with key {0} on scheduler '{1}'")]
    UnknownTask(String, String),

    #[error("no scheduler with id {0}")]
    UnknownScheduler(u32),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
