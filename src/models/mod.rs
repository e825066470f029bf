pub mod event;
pub mod question;
pub mod subject;

pub use event::{EventKind, ProgressEvent};
pub use question::{
    DetailOutcome, EnrichedQuestion, ExamType, QuestionCategory, QuestionStub, StoredQuestion,
    ANSWER_SENTINEL, EXPLANATION_SENTINEL,
};
pub use subject::Subject;
