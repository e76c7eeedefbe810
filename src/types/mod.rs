pub mod itinerary;
pub mod outcome;
pub mod response;
pub mod result;
pub mod trip;

pub use itinerary::{Activity, Day, Itinerary};
pub use outcome::{RecoveryFailure, RecoveryOutcome, RecoveryStrategy, StrategyAttempt};
pub use response::{deserialize_payload, parse_payload};
pub use result::PlanResult;
pub use trip::{BudgetTier, DateRange, Pace, PartySize, TripContext};
