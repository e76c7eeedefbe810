//! tripwiz: AI-assisted day-by-day trip planning
//!
//! A [`TripContext`] is turned into a prompt, sent to a chain of hosted
//! chat-completion models until one answers, and the reply is recovered into a
//! structured [`Itinerary`] even when the model ignored the requested format.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tripwiz::{DateRange, TripContext, TripPlanner};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let planner = TripPlanner::from_env()?;
//!     let trip = TripContext::new("Da Lat")
//!         .with_origin("Ho Chi Minh City")
//!         .with_dates(DateRange::new(
//!             NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
//!             NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
//!         ));
//!
//!     let result = planner.plan(&trip).await?;
//!     if let Some(itinerary) = result.itinerary() {
//!         println!("{}", itinerary.summary);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Recovery can also be used on its own:
//!
//! ```rust
//! use tripwiz::{recover, RecoveryStrategy};
//!
//! let outcome = recover("Morning: 08:00 visit the old quarter.", None);
//! assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Heuristic));
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod types;

pub use config::ClientConfig;
pub use self::core::{Bounds, MapMarker, MapView, TripPlanner};
pub use error::{PlannerError, Result};
pub use schemas::{ResponseSchema, SchemaHandle};
pub use services::{
    build_prompt, recover, Completion, CompletionClient, CompletionProvider, ItineraryRecovery,
    RecoveryOptions,
};
pub use types::{
    Activity, BudgetTier, DateRange, Day, Itinerary, Pace, PartySize, PlanResult,
    RecoveryFailure, RecoveryOutcome, RecoveryStrategy, StrategyAttempt, TripContext,
};

#[cfg(feature = "cli")]
pub mod cli;
