use crate::types::{
    itinerary::Itinerary,
    outcome::{RecoveryOutcome, RecoveryStrategy},
};
use serde::Serialize;
use std::time::Duration;

/// Everything produced by one planning run
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    /// Prompt sent to the model
    pub prompt: String,
    /// Model that answered
    pub model: String,
    /// Unmodified model output
    pub raw: String,
    /// What recovery made of `raw`
    pub outcome: RecoveryOutcome,
    /// Wall-clock time for completion plus recovery
    pub duration: Duration,
}

impl PlanResult {
    pub fn new(
        prompt: String,
        model: String,
        raw: String,
        outcome: RecoveryOutcome,
        duration: Duration,
    ) -> Self {
        Self {
            prompt,
            model,
            raw,
            outcome,
            duration,
        }
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.outcome.itinerary()
    }

    pub fn strategy(&self) -> Option<RecoveryStrategy> {
        self.outcome.strategy()
    }

    pub fn is_recovered(&self) -> bool {
        self.outcome.is_recovered()
    }

    /// Human-readable trace of the run
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Planning Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Model: {}", self.model));
        lines.push(format!("Prompt: {} chars", self.prompt.chars().count()));
        lines.push(format!("Response: {} chars", self.raw.chars().count()));

        lines.push(String::new());
        lines.push("--- Recovery ---".to_string());

        for (idx, attempt) in self.outcome.attempts().iter().enumerate() {
            lines.push(format!(
                "{}. {} failed: {}",
                idx + 1,
                attempt.strategy,
                attempt.error
            ));
        }

        match &self.outcome {
            RecoveryOutcome::Recovered {
                itinerary,
                strategy,
                padded,
                truncated,
                ..
            } => {
                lines.push(format!(
                    "{}. {} succeeded: {} days, {} activities",
                    self.outcome.attempts().len() + 1,
                    strategy,
                    itinerary.days.len(),
                    itinerary.activity_count()
                ));
                if *padded > 0 {
                    lines.push(format!("   padded {} day(s)", padded));
                }
                if *truncated > 0 {
                    lines.push(format!("   dropped {} extra day(s)", truncated));
                }
            }
            RecoveryOutcome::Unrecoverable(_) => {
                lines.push("Unrecoverable: no itinerary could be produced".to_string());
            }
        }

        lines.push(String::new());
        lines.push("--- Raw Output ---".to_string());
        lines.push(self.raw.clone());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        itinerary::Day,
        outcome::{RecoveryFailure, StrategyAttempt},
    };

    fn attempt(strategy: RecoveryStrategy) -> StrategyAttempt {
        StrategyAttempt {
            strategy,
            error: "bad".to_string(),
        }
    }

    #[test]
    fn replay_lists_failed_and_winning_stages() {
        let outcome = RecoveryOutcome::Recovered {
            itinerary: Itinerary::new("x", vec![Day::default(), Day::default()]),
            strategy: RecoveryStrategy::BalancedBraces,
            attempts: vec![attempt(RecoveryStrategy::Direct)],
            padded: 1,
            truncated: 0,
        };
        let result = PlanResult::new(
            "prompt".to_string(),
            "m".to_string(),
            "raw".to_string(),
            outcome,
            Duration::from_millis(1500),
        );

        let replay = result.replay();
        assert!(replay.contains("Duration: 1.50s"));
        assert!(replay.contains("1. direct JSON parse failed: bad"));
        assert!(replay.contains("2. balanced-brace extraction succeeded: 2 days"));
        assert!(replay.contains("padded 1 day(s)"));
        assert_eq!(result.strategy(), Some(RecoveryStrategy::BalancedBraces));
    }

    #[test]
    fn replay_reports_unrecoverable_runs() {
        let outcome = RecoveryOutcome::Unrecoverable(RecoveryFailure {
            raw: "???".to_string(),
            attempts: vec![attempt(RecoveryStrategy::Direct)],
        });
        let result = PlanResult::new(
            String::new(),
            "m".to_string(),
            "???".to_string(),
            outcome,
            Duration::ZERO,
        );

        assert!(!result.is_recovered());
        assert!(result.itinerary().is_none());
        assert!(result.replay().contains("Unrecoverable"));
    }
}
