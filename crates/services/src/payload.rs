//! Wire payload construction for step submissions.

use serde_json::{Map, Value};

use intake_core::model::{AnswerValue, Answers, FileRef, Step};

use crate::api::AnswerPayload;

/// Serializes the current step's answers for submission.
///
/// Every question of the step is consulted in order, answered or not. Date
/// answers serialize to zero-padded `YYYY-MM-DD`; file questions with no
/// stored value default to an empty list; other unanswered questions are
/// omitted entirely rather than sent as null.
#[must_use]
pub fn build_payload(step: &Step, answers: &Answers) -> AnswerPayload {
    let mut payload = Map::new();
    for question in &step.questions {
        let value = match answers.get(&question.code) {
            Some(answer) => wire_value(answer),
            None if question.kind.is_file() => Value::Array(Vec::new()),
            None => continue,
        };
        payload.insert(question.code.clone(), value);
    }
    payload
}

fn wire_value(answer: &AnswerValue) -> Value {
    match answer {
        AnswerValue::Bool(value) => Value::Bool(*value),
        AnswerValue::Text(value) => Value::String(value.clone()),
        AnswerValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        AnswerValue::Files(files) => Value::Array(files.iter().map(file_value).collect()),
    }
}

fn file_value(file: &FileRef) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), Value::String(file.name.clone()));
    object.insert("size".to_string(), Value::Number(file.size.into()));
    Value::Object(object)
}
