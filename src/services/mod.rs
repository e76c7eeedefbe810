pub mod completion;
pub mod extraction;
pub mod heuristics;
pub mod prompt;
pub mod recovery;
pub mod templates;

pub use completion::{Completion, CompletionClient, CompletionProvider};
pub use prompt::build_prompt;
pub use recovery::{recover, ItineraryRecovery, RecoveryOptions};
