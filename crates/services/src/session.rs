use std::collections::HashMap;
use std::fmt;

use intake_core::model::{AnswerValue, Answers, Question, Step};

use crate::api::{FinalAnswers, ServerErrorItem, StepAdvance};

//
// ─── TRIGGER POLICY ────────────────────────────────────────────────────────────
//

/// Question codes whose answer forces an immediate synchronization instead
/// of a local cursor advance.
const SYNC_ON_CODES: &[&str] = &["q_tsr_certificate_has", "q_esign_ready"];

//
// ─── STEP SESSION ─────────────────────────────────────────────────────────────
//

/// Aggregate state for an in-progress questionnaire session.
///
/// Holds the active step, the per-step answer store and field errors, the
/// question cursor, the accumulated label map, and the terminal snapshot.
/// All mutation goes through named transitions; the answer store and field
/// errors are cleared wholesale on every step transition, while labels and
/// final answers survive it.
#[derive(Default)]
pub struct StepSession {
    step: Option<Step>,
    answers: Answers,
    final_answers: FinalAnswers,
    labels: HashMap<String, String>,
    is_loading: bool,
    error: Option<String>,
    is_finished: bool,
    q_index: usize,
    field_errors: HashMap<String, String>,
}

impl StepSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    /// The question the cursor currently points at.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.step.as_ref().and_then(|step| step.question(self.q_index))
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn final_answers(&self) -> &FinalAnswers {
        &self.final_answers
    }

    #[must_use]
    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    #[must_use]
    pub fn q_index(&self) -> usize {
        self.q_index
    }

    #[must_use]
    pub fn field_errors(&self) -> &HashMap<String, String> {
        &self.field_errors
    }

    #[must_use]
    pub fn field_error(&self, code: &str) -> Option<&str> {
        self.field_errors.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether advancing past the given answered question must contact the
    /// step service: true for trigger-set codes and for the last question of
    /// the step.
    #[must_use]
    pub fn sync_required(&self, answered_code: Option<&str>) -> bool {
        let Some(step) = &self.step else {
            return false;
        };
        let is_trigger = answered_code.is_some_and(|code| SYNC_ON_CODES.contains(&code));
        is_trigger || self.q_index >= step.last_index()
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Stores an answer for a question code, eagerly clearing any field
    /// error reported for that code.
    pub fn set_answer(&mut self, code: impl Into<String>, value: AnswerValue) {
        let code = code.into();
        self.field_errors.remove(&code);
        self.answers.insert(code, value);
    }

    /// Adopts a step injected directly (e.g. from session initialization).
    /// Labels from earlier steps are retained and extended.
    pub fn set_step(&mut self, step: Step) {
        self.adopt_step(step, false);
    }

    /// Adopts a step loaded via an explicit step fetch. The label map is
    /// rebuilt from this step alone.
    pub fn adopt_fetched_step(&mut self, step: Step) {
        self.adopt_step(step, true);
    }

    fn adopt_step(&mut self, step: Step, rebuild_labels: bool) {
        if rebuild_labels {
            self.labels.clear();
        }
        merge_labels(&mut self.labels, &step.questions);
        self.step = Some(step);
        self.answers.clear();
        self.field_errors.clear();
        self.q_index = 0;
        self.is_finished = false;
        self.is_loading = false;
        self.error = None;
    }

    /// Moves the cursor to the next question, clamped to the last valid
    /// index. Pure and local: never contacts the service, never decreases.
    pub fn advance_local(&mut self) {
        let last = self.step.as_ref().map_or(0, Step::last_index);
        self.q_index = (self.q_index + 1).min(last);
    }

    /// Marks a synchronization (or step fetch) as outstanding.
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Clears the loading flag without touching the rest of the state.
    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    /// Folds an accepted submission outcome into the session: either the
    /// next step is adopted, or the session reaches its terminal finished
    /// state with the reported answer snapshot.
    pub fn apply_advance(&mut self, advance: StepAdvance) {
        self.is_loading = false;
        match advance {
            StepAdvance::Next { step, answers } => {
                if let Some(answers) = answers {
                    self.final_answers = answers;
                }
                self.adopt_step(step, false);
            }
            StepAdvance::Complete { answers } => {
                if let Some(answers) = answers {
                    self.final_answers = answers;
                }
                self.is_finished = true;
                self.step = None;
            }
        }
    }

    /// Folds a validation rejection into the session. Items without a
    /// recognizable question code contribute nothing to the per-field map;
    /// the aggregate message reflects the HTTP status and request URL. The
    /// step, cursor, and answers stay as they were so the user can correct
    /// and resubmit.
    pub fn apply_rejection(&mut self, status: u16, url: &str, errors: &[ServerErrorItem]) {
        self.is_loading = false;
        self.error = Some(format!("HTTP {status} | {url}"));

        let mut field_errors = HashMap::new();
        for item in errors {
            if let (Some(code), Some(message)) = (item.code(), item.message()) {
                field_errors.insert(code.to_string(), message.to_string());
            }
        }
        self.field_errors = field_errors;
    }

    /// Records an aggregate failure (transport or precondition). Clears the
    /// loading flag and leaves the step and answers untouched.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    /// Restores every field to its initial empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for StepSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSession")
            .field("step", &self.step.as_ref().map(|step| &step.code))
            .field("q_index", &self.q_index)
            .field("answers_len", &self.answers.len())
            .field("field_errors_len", &self.field_errors.len())
            .field("is_loading", &self.is_loading)
            .field("is_finished", &self.is_finished)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

fn merge_labels(labels: &mut HashMap<String, String>, questions: &[Question]) {
    for question in questions {
        labels.insert(question.code.clone(), question.display_text().to_string());
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::model::QuestionKind;

    fn question(code: &str) -> Question {
        Question {
            code: code.to_string(),
            kind: QuestionKind::Text,
            label: Some(format!("Label for {code}")),
            options: Vec::new(),
        }
    }

    fn step(code: &str, question_codes: &[&str]) -> Step {
        Step {
            code: code.to_string(),
            title: "Step".to_string(),
            questions: question_codes.iter().map(|code| question(code)).collect(),
        }
    }

    fn rejection_item(code: &str, message: &str) -> ServerErrorItem {
        serde_json::from_value(serde_json::json!({
            "question": code,
            "message": message,
        }))
        .unwrap()
    }

    #[test]
    fn cursor_stays_in_bounds_after_any_number_of_advances() {
        let mut session = StepSession::new();
        session.set_step(step("s_contact", &["q_name", "q_phone", "q_email"]));

        for _ in 0..10 {
            session.advance_local();
            assert!(session.q_index() <= 2);
        }
        assert_eq!(session.q_index(), 2);
        assert_eq!(session.current_question().unwrap().code, "q_email");
    }

    #[test]
    fn sync_required_only_at_step_end_or_trigger() {
        let mut session = StepSession::new();
        session.set_step(step(
            "s_cert",
            &["q_name", "q_tsr_certificate_has", "q_comment"],
        ));

        assert!(!session.sync_required(Some("q_name")));
        assert!(session.sync_required(Some("q_tsr_certificate_has")));
        assert!(session.sync_required(Some("q_esign_ready")));

        session.advance_local();
        session.advance_local();
        assert!(session.sync_required(None));
        assert!(session.sync_required(Some("q_comment")));
    }

    #[test]
    fn sync_not_required_without_a_step() {
        let session = StepSession::new();
        assert!(!session.sync_required(Some("q_esign_ready")));
    }

    #[test]
    fn set_step_resets_per_step_state_and_merges_labels() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a"]));
        session.set_answer("q_a", "first".into());
        session.advance_local();
        session.apply_rejection(422, "http://api/steps", &[rejection_item("q_a", "bad")]);

        session.set_step(step("s_two", &["q_b"]));
        assert!(session.answers().is_empty());
        assert!(session.field_errors().is_empty());
        assert_eq!(session.q_index(), 0);
        assert!(session.error().is_none());
        assert_eq!(session.labels()["q_a"], "Label for q_a");
        assert_eq!(session.labels()["q_b"], "Label for q_b");
    }

    #[test]
    fn fetched_step_rebuilds_labels() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a"]));
        session.adopt_fetched_step(step("s_two", &["q_b"]));

        assert!(!session.labels().contains_key("q_a"));
        assert_eq!(session.labels()["q_b"], "Label for q_b");
    }

    #[test]
    fn label_falls_back_to_code_when_absent() {
        let mut session = StepSession::new();
        let mut unlabeled = step("s_one", &["q_a"]);
        unlabeled.questions[0].label = None;
        session.set_step(unlabeled);

        assert_eq!(session.labels()["q_a"], "q_a");
    }

    #[test]
    fn set_answer_clears_only_that_field_error() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a", "q_b"]));
        session.apply_rejection(
            422,
            "http://api/steps",
            &[
                rejection_item("q_a", "required"),
                rejection_item("q_b", "required"),
            ],
        );

        session.set_answer("q_a", "filled".into());
        assert!(session.field_error("q_a").is_none());
        assert_eq!(session.field_error("q_b"), Some("required"));
    }

    #[test]
    fn rejection_sets_aggregate_message_and_drops_codeless_items() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a"]));
        session.set_answer("q_a", "kept".into());
        session.begin_loading();

        let items: Vec<ServerErrorItem> = serde_json::from_value(serde_json::json!([
            {"question": "q_a", "message": "required"},
            "generic error"
        ]))
        .unwrap();
        session.apply_rejection(422, "http://api/steps/s_one", &items);

        assert!(!session.is_loading());
        assert_eq!(session.error(), Some("HTTP 422 | http://api/steps/s_one"));
        assert_eq!(session.field_errors().len(), 1);
        assert_eq!(session.field_error("q_a"), Some("required"));
        // Last consistent state is kept for correction and resubmission.
        assert_eq!(
            session.answers()["q_a"],
            AnswerValue::Text("kept".to_string())
        );
        assert_eq!(session.step().unwrap().code, "s_one");
    }

    #[test]
    fn completion_snapshot_survives_step_teardown() {
        let mut session = StepSession::new();
        session.set_step(step("s_last", &["q_a"]));
        session.begin_loading();

        session.apply_advance(StepAdvance::Complete {
            answers: Some(
                serde_json::from_value(serde_json::json!({"q_1": true, "q_2": "x"})).unwrap(),
            ),
        });

        assert!(session.is_finished());
        assert!(session.step().is_none());
        assert!(!session.is_loading());
        assert_eq!(session.final_answers()["q_1"], true);
        assert_eq!(session.final_answers()["q_2"], "x");
    }

    #[test]
    fn next_step_adoption_resets_cursor_and_stores() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a", "q_b"]));
        session.set_answer("q_a", true.into());
        session.advance_local();
        session.begin_loading();

        session.apply_advance(StepAdvance::Next {
            step: step("s_two", &["q_c"]),
            answers: None,
        });

        assert_eq!(session.step().unwrap().code, "s_two");
        assert_eq!(session.q_index(), 0);
        assert!(session.answers().is_empty());
        assert!(session.field_errors().is_empty());
        assert!(!session.is_finished());
        assert!(!session.is_loading());
        assert_eq!(session.labels()["q_a"], "Label for q_a");
        assert_eq!(session.labels()["q_c"], "Label for q_c");
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a"]));
        session.set_answer("q_a", "x".into());
        session.advance_local();
        session.begin_loading();
        session.apply_advance(StepAdvance::Complete {
            answers: Some(serde_json::from_value(serde_json::json!({"q_a": "x"})).unwrap()),
        });

        session.reset();

        assert!(session.step().is_none());
        assert!(session.answers().is_empty());
        assert!(session.final_answers().is_empty());
        assert!(session.labels().is_empty());
        assert!(session.field_errors().is_empty());
        assert!(!session.is_loading());
        assert!(!session.is_finished());
        assert!(session.error().is_none());
        assert_eq!(session.q_index(), 0);
    }

    #[test]
    fn fail_clears_loading_and_keeps_answers() {
        let mut session = StepSession::new();
        session.set_step(step("s_one", &["q_a"]));
        session.set_answer("q_a", "kept".into());
        session.begin_loading();

        session.fail("missing session identifier");

        assert!(!session.is_loading());
        assert_eq!(session.error(), Some("missing session identifier"));
        assert_eq!(session.answers().len(), 1);
    }
}
