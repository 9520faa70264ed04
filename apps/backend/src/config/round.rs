use std::time::Duration;

/// How long answers are accepted once a question opens.
pub const ANSWER_WINDOW: Duration = Duration::from_secs(15);
/// Pause between closing a question and revealing the result.
pub const CLOSED_DWELL: Duration = Duration::from_secs(5);
/// How long the result stays on screen before the next question.
pub const RESULT_DWELL: Duration = Duration::from_secs(5);

/// Dwell times for the self-advancing round states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimings {
    pub answer_window: Duration,
    pub closed_dwell: Duration,
    pub result_dwell: Duration,
}

impl RoundTimings {
    /// Whole seconds advertised to clients as `time_limit_sec`.
    pub fn answer_window_secs(&self) -> u32 {
        u32::try_from(self.answer_window.as_secs()).unwrap_or(u32::MAX)
    }
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            answer_window: ANSWER_WINDOW,
            closed_dwell: CLOSED_DWELL,
            result_dwell: RESULT_DWELL,
        }
    }
}
