//! JSON extraction stages of the recovery cascade.
//!
//! Each stage is a `(text) -> Result<Itinerary>` attempt; the recovery service
//! walks them in order and keeps the first success.

use crate::{
    error::{PlannerError, Result},
    types::{itinerary::Itinerary, outcome::RecoveryStrategy, response::parse_payload},
};

pub(crate) type ParseAttempt = fn(&str) -> Result<Itinerary>;

/// Ordered JSON stages, strictest first.
pub(crate) const PARSE_CHAIN: [(RecoveryStrategy, ParseAttempt); 3] = [
    (RecoveryStrategy::Direct, parse_direct),
    (RecoveryStrategy::BalancedBraces, parse_balanced_braces),
    (RecoveryStrategy::FenceStripped, parse_fence_stripped),
];

pub(crate) fn parse_direct(text: &str) -> Result<Itinerary> {
    parse_payload(text)
}

pub(crate) fn parse_balanced_braces(text: &str) -> Result<Itinerary> {
    let candidate = first_balanced_object(text).ok_or_else(|| {
        PlannerError::Validation("no balanced `{ ... }` block found".to_string())
    })?;
    parse_payload(candidate)
}

pub(crate) fn parse_fence_stripped(text: &str) -> Result<Itinerary> {
    let candidate = strip_fences_and_prose(text).ok_or_else(|| {
        PlannerError::Validation("no `{ ... }` span left after stripping prose".to_string())
    })?;
    parse_payload(&candidate)
}

/// Slice from the first `{` to its matching `}`.
///
/// Braces inside JSON string literals do not count towards the depth.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + idx]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove code-fence markers, then everything before the first `{` and after the last `}`.
pub fn strip_fences_and_prose(text: &str) -> Option<String> {
    let unfenced = text.replace("```json", "").replace("```JSON", "").replace("```", "");
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }
    Some(unfenced[start..=end].trim().to_string())
}
