use serde::Serialize;
use std::fmt;

use super::itinerary::Itinerary;

/// Which stage of the recovery cascade produced the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// The whole text parsed as an itinerary
    Direct,
    /// First balanced `{ ... }` block parsed
    BalancedBraces,
    /// Parsed after removing code fences and surrounding prose
    FenceStripped,
    /// Activities scraped from timed lines or keywords
    Heuristic,
    /// Canned template, nothing usable in the text
    Synthetic,
}

impl RecoveryStrategy {
    pub fn describe(&self) -> &'static str {
        match self {
            RecoveryStrategy::Direct => "direct JSON parse",
            RecoveryStrategy::BalancedBraces => "balanced-brace extraction",
            RecoveryStrategy::FenceStripped => "markdown/prose stripping",
            RecoveryStrategy::Heuristic => "heuristic text scan",
            RecoveryStrategy::Synthetic => "synthetic default itinerary",
        }
    }

    /// True when the itinerary came from the model's own JSON.
    pub fn is_parsed(&self) -> bool {
        matches!(
            self,
            RecoveryStrategy::Direct
                | RecoveryStrategy::BalancedBraces
                | RecoveryStrategy::FenceStripped
        )
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A stage that was tried and did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: RecoveryStrategy,
    pub error: String,
}

/// Diagnostics for the terminal failure state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryFailure {
    /// The unmodified model output
    pub raw: String,
    pub attempts: Vec<StrategyAttempt>,
}

impl RecoveryFailure {
    /// Error message of the first (exact) parse attempt, if any.
    pub fn parse_error(&self) -> Option<&str> {
        self.attempts.first().map(|attempt| attempt.error.as_str())
    }
}

/// Result of running the recovery cascade over raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    Recovered {
        itinerary: Itinerary,
        strategy: RecoveryStrategy,
        attempts: Vec<StrategyAttempt>,
        /// Days appended to reach the trip duration
        padded: usize,
        /// Days dropped beyond the trip duration
        truncated: usize,
    },
    Unrecoverable(RecoveryFailure),
}

impl RecoveryOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryOutcome::Recovered { .. })
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            RecoveryOutcome::Recovered { itinerary, .. } => Some(itinerary),
            RecoveryOutcome::Unrecoverable(_) => None,
        }
    }

    pub fn into_itinerary(self) -> Option<Itinerary> {
        match self {
            RecoveryOutcome::Recovered { itinerary, .. } => Some(itinerary),
            RecoveryOutcome::Unrecoverable(_) => None,
        }
    }

    pub fn strategy(&self) -> Option<RecoveryStrategy> {
        match self {
            RecoveryOutcome::Recovered { strategy, .. } => Some(*strategy),
            RecoveryOutcome::Unrecoverable(_) => None,
        }
    }

    pub fn attempts(&self) -> &[StrategyAttempt] {
        match self {
            RecoveryOutcome::Recovered { attempts, .. } => attempts,
            RecoveryOutcome::Unrecoverable(failure) => &failure.attempts,
        }
    }
}
