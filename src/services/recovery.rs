//! Turns unreliable model output into an [`Itinerary`].
//!
//! Stages run strictest first and the first success wins:
//!
//! 1. the whole text as JSON
//! 2. the first balanced `{ ... }` block
//! 3. the text with code fences and surrounding prose removed
//! 4. activities scraped from timed lines, or failing that from travel keywords
//! 5. a synthetic plan built from canned day templates
//!
//! Stage 5 needs a [`TripContext`]; without one the cascade can end in
//! [`RecoveryOutcome::Unrecoverable`]. Whenever a context is present the result
//! is padded or truncated to exactly the trip's day count.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    services::{
        extraction::PARSE_CHAIN,
        heuristics::{scan_keywords, scan_timed_lines, ScrapedActivity, TitleCleaner},
        templates::{
            jitter, synthetic_itinerary, template_day, ADDITIONAL_TEMPLATES, BASE_COORDINATE,
            SCRAPED_JITTER, TEMPLATE_JITTER,
        },
    },
    types::{
        itinerary::{Activity, Day, Itinerary},
        outcome::{RecoveryFailure, RecoveryOutcome, RecoveryStrategy, StrategyAttempt},
        trip::TripContext,
    },
};

/// Knobs for placeholder coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryOptions {
    pub base_coordinate: (f64, f64),
    pub scraped_jitter: f64,
    pub template_jitter: f64,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            base_coordinate: BASE_COORDINATE,
            scraped_jitter: SCRAPED_JITTER,
            template_jitter: TEMPLATE_JITTER,
        }
    }
}

/// The recovery cascade. Cheap to construct and reusable across calls.
#[derive(Debug, Clone, Default)]
pub struct ItineraryRecovery {
    options: RecoveryOptions,
    cleaner: TitleCleaner,
}

impl ItineraryRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.options.base_coordinate = (lat, lng);
        self
    }

    pub fn with_jitter(mut self, scraped: f64, template: f64) -> Self {
        self.options.scraped_jitter = scraped;
        self.options.template_jitter = template;
        self
    }

    pub fn with_cleaner(mut self, cleaner: TitleCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn options(&self) -> &RecoveryOptions {
        &self.options
    }

    /// Run the cascade with a thread-local RNG for coordinate jitter.
    pub fn recover(&self, raw: &str, context: Option<&TripContext>) -> RecoveryOutcome {
        self.recover_with_rng(raw, context, &mut rand::thread_rng())
    }

    /// Run the cascade with a caller-supplied RNG, for reproducible coordinates.
    pub fn recover_with_rng<R: Rng + ?Sized>(
        &self,
        raw: &str,
        context: Option<&TripContext>,
        rng: &mut R,
    ) -> RecoveryOutcome {
        debug!(target: "tripwiz::recovery", chars = raw.len(), "recovering itinerary");
        let mut attempts = Vec::new();

        for (strategy, parse) in PARSE_CHAIN {
            match parse(raw) {
                Ok(itinerary) => {
                    return self.finish(itinerary, strategy, attempts, context, rng);
                }
                Err(err) => {
                    debug!(
                        target: "tripwiz::recovery",
                        strategy = %strategy,
                        error = %err,
                        "stage failed"
                    );
                    attempts.push(StrategyAttempt {
                        strategy,
                        error: err.to_string(),
                    });
                }
            }
        }

        match self.heuristic_itinerary(raw, context, rng) {
            Some(itinerary) => {
                return self.finish(itinerary, RecoveryStrategy::Heuristic, attempts, context, rng);
            }
            None => attempts.push(StrategyAttempt {
                strategy: RecoveryStrategy::Heuristic,
                error: "no timed lines or travel keywords found".to_string(),
            }),
        }

        match context {
            Some(context) => {
                let itinerary = synthetic_itinerary(
                    context,
                    self.options.base_coordinate,
                    self.options.template_jitter,
                    rng,
                );
                self.finish(
                    itinerary,
                    RecoveryStrategy::Synthetic,
                    attempts,
                    Some(context),
                    rng,
                )
            }
            None => {
                warn!(
                    target: "tripwiz::recovery",
                    attempts = attempts.len(),
                    "no trip context to synthesise from; giving up"
                );
                RecoveryOutcome::Unrecoverable(RecoveryFailure {
                    raw: raw.to_string(),
                    attempts,
                })
            }
        }
    }

    fn heuristic_itinerary<R: Rng + ?Sized>(
        &self,
        raw: &str,
        context: Option<&TripContext>,
        rng: &mut R,
    ) -> Option<Itinerary> {
        let mut scraped = scan_timed_lines(raw, &self.cleaner);
        if scraped.is_empty() {
            scraped = scan_keywords(raw);
        }
        if scraped.is_empty() {
            return None;
        }

        let placeholder = TripContext::new("");
        let context = context.unwrap_or(&placeholder);
        let activity_count = scraped.len();
        let activities: Vec<Activity> = scraped
            .into_iter()
            .map(|ScrapedActivity { time, title }| {
                let (lat, lng) = jitter(
                    rng,
                    self.options.base_coordinate,
                    self.options.scraped_jitter,
                );
                Activity::new(time, title, lat, lng)
            })
            .collect();

        let days = distribute(activities, context.duration_days())
            .into_iter()
            .enumerate()
            .map(|(offset, items)| Day::new(context.dates().day_date(offset), items))
            .collect();

        Some(Itinerary::new(
            format!(
                "Trip from {} to {} with {} suggested activities.",
                context.origin_or_placeholder(),
                context.destination_or_placeholder(),
                activity_count
            ),
            days,
        ))
    }

    fn finish<R: Rng + ?Sized>(
        &self,
        mut itinerary: Itinerary,
        strategy: RecoveryStrategy,
        attempts: Vec<StrategyAttempt>,
        context: Option<&TripContext>,
        rng: &mut R,
    ) -> RecoveryOutcome {
        let (padded, truncated) = match context {
            Some(context) => self.normalize_days(&mut itinerary, context, rng),
            None => (0, 0),
        };

        info!(
            target: "tripwiz::recovery",
            strategy = %strategy,
            days = itinerary.days.len(),
            padded,
            truncated,
            "itinerary recovered"
        );

        RecoveryOutcome::Recovered {
            itinerary,
            strategy,
            attempts,
            padded,
            truncated,
        }
    }

    /// Force `itinerary` to exactly the trip's day count; returns `(padded, truncated)`.
    fn normalize_days<R: Rng + ?Sized>(
        &self,
        itinerary: &mut Itinerary,
        context: &TripContext,
        rng: &mut R,
    ) -> (usize, usize) {
        let target = context.duration_days();
        let current = itinerary.days.len();

        if current > target {
            debug!(target: "tripwiz::recovery", from = current, to = target, "dropping extra days");
            itinerary.days.truncate(target);
            return (0, current - target);
        }
        if current < target {
            debug!(target: "tripwiz::recovery", from = current, to = target, "padding missing days");
        }

        for offset in current..target {
            let template = ADDITIONAL_TEMPLATES[offset % ADDITIONAL_TEMPLATES.len()];
            itinerary.days.push(template_day(
                template,
                context.dates().day_date(offset),
                self.options.base_coordinate,
                self.options.template_jitter,
                rng,
            ));
        }
        (target - current, 0)
    }
}

/// Split `items` into `days` consecutive chunks whose sizes differ by at most one.
fn distribute<T>(items: Vec<T>, days: usize) -> Vec<Vec<T>> {
    let days = days.max(1);
    let base = items.len() / days;
    let extra = items.len() % days;
    let mut iter = items.into_iter();

    (0..days)
        .map(|day| {
            let size = base + usize::from(day < extra);
            iter.by_ref().take(size).collect()
        })
        .collect()
}

/// Recover with default options. See [`ItineraryRecovery::recover`].
pub fn recover(raw: &str, context: Option<&TripContext>) -> RecoveryOutcome {
    ItineraryRecovery::default().recover(raw, context)
}
