pub mod flashcard;
pub mod study_log;
pub mod subject;

pub use flashcard::{Flashcard, Rating, ReviewSession};
pub use study_log::{LogSource, StudyLogEntry};
pub use subject::{Subject, Topic};
