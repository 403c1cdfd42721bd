#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod payload;
pub mod session;
pub mod summary;
pub mod workflow;

pub use error::{FlowError, StepApiError};

pub use api::{
    AnswerPayload, FinalAnswers, HttpStepApi, ServerErrorItem, SessionInit, StepAdvance, StepApi,
    StepApiConfig,
};
pub use payload::build_payload;
pub use session::StepSession;
pub use workflow::{AdvanceOutcome, StepFlowService};
