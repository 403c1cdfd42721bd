mod answer;
mod overrides;
mod question;
mod step;

pub use answer::{AnswerError, AnswerValue, Answers, FileRef};
pub use overrides::{QuestionOverride, override_for};
pub use question::{Question, QuestionKind, QuestionOption};
pub use step::Step;
