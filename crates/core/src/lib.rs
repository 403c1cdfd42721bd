#![forbid(unsafe_code)]

pub mod model;

pub use model::{
    AnswerError, AnswerValue, Answers, FileRef, Question, QuestionKind, QuestionOption,
    QuestionOverride, Step, override_for,
};
