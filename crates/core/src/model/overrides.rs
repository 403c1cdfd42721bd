//! Per-code special-case behavior layered over the generic kind-driven
//! dispatch.
//!
//! A handful of question codes carry behavior the service's `type` field
//! does not express: hardcoded option sets, companion questions revealed by
//! an affirmative answer, and suppression of auto-advance. Keeping them in
//! one table keeps the dispatcher uniform.

/// Extra behavior for a specific question code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOverride {
    pub code: &'static str,
    /// Hardcoded `(value, label)` option set replacing the server's options.
    pub manual_options: &'static [(&'static str, &'static str)],
    /// Companion question codes revealed by an affirmative answer.
    pub reveals: &'static [&'static str],
    /// Suppress auto-advance after a choice; the renderer shows an explicit
    /// continue control instead.
    pub manual_confirm: bool,
}

const OVERRIDES: &[QuestionOverride] = &[
    QuestionOverride {
        code: "q_who_fills",
        manual_options: &[],
        reveals: &[],
        manual_confirm: true,
    },
    QuestionOverride {
        code: "q_tsr_certificate_has",
        manual_options: &[],
        reveals: &[
            "q_tsr_cert_number",
            "q_tsr_cert_amount",
            "q_tsr_cert_valid_until",
        ],
        manual_confirm: true,
    },
    QuestionOverride {
        code: "q_other_funds_active",
        manual_options: &[],
        reveals: &["q_other_funds_details"],
        manual_confirm: true,
    },
    QuestionOverride {
        code: "q_need_consulting",
        manual_options: &[("yes", "Yes"), ("no", "No")],
        reveals: &[],
        manual_confirm: false,
    },
];

/// Looks up the override entry for a question code, if one exists.
#[must_use]
pub fn override_for(code: &str) -> Option<&'static QuestionOverride> {
    OVERRIDES.iter().find(|ovr| ovr.code == code)
}
