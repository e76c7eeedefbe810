use std::{fmt, time::Instant};

use tracing::{debug, info};

use crate::{
    config::ClientConfig,
    error::Result,
    services::{
        completion::{CompletionClient, CompletionProvider},
        prompt::build_prompt,
        recovery::ItineraryRecovery,
    },
    types::{result::PlanResult, trip::TripContext},
};

/// Prompt -> completion -> recovery, for one trip at a time.
pub struct TripPlanner {
    provider: Box<dyn CompletionProvider>,
    recovery: ItineraryRecovery,
}

impl fmt::Debug for TripPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripPlanner")
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}

impl TripPlanner {
    pub fn new(provider: impl CompletionProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            recovery: ItineraryRecovery::default(),
        }
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(CompletionClient::new(config))
    }

    pub fn from_env() -> Result<Self> {
        CompletionClient::from_env().map(Self::new)
    }

    pub fn with_recovery(mut self, recovery: ItineraryRecovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn recovery(&self) -> &ItineraryRecovery {
        &self.recovery
    }

    /// Run one planning request.
    ///
    /// Only completion failures surface as errors. Whatever text comes back is
    /// always run through recovery, and with a context present recovery cannot fail.
    pub async fn plan(&self, context: &TripContext) -> Result<PlanResult> {
        let started = Instant::now();
        let prompt = build_prompt(context);

        info!(
            target: "tripwiz::planner",
            destination = context.destination_or_placeholder(),
            days = context.duration_days(),
            "requesting itinerary"
        );

        let completion = self.provider.complete(&prompt).await?;
        debug!(target: "tripwiz::planner", raw = %completion.content, "model output");
        let outcome = self.recovery.recover(&completion.content, Some(context));

        info!(
            target: "tripwiz::planner",
            model = %completion.model,
            strategy = ?outcome.strategy(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "itinerary ready"
        );

        Ok(PlanResult::new(
            prompt,
            completion.model,
            completion.content,
            outcome,
            started.elapsed(),
        ))
    }
}
