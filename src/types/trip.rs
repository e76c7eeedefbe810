use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::PlannerError;

/// Who is travelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartySize {
    #[default]
    Solo,
    Couple,
    Friends,
    Family,
}

impl PartySize {
    pub fn describe(self) -> &'static str {
        match self {
            PartySize::Solo => "solo traveler",
            PartySize::Couple => "couple",
            PartySize::Friends => "group of friends",
            PartySize::Family => "family with children",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartySize::Solo => "solo",
            PartySize::Couple => "couple",
            PartySize::Friends => "friends",
            PartySize::Family => "family",
        }
    }
}

impl FromStr for PartySize {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solo" | "1" => Ok(PartySize::Solo),
            "couple" | "2" => Ok(PartySize::Couple),
            "friends" | "group" => Ok(PartySize::Friends),
            "family" => Ok(PartySize::Family),
            other => Err(PlannerError::Config(format!("unknown party size `{other}`"))),
        }
    }
}

/// Spending level. Also accepts the `$`/`$$`/`$$$` shorthand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    #[default]
    Low,
    Mid,
    High,
}

impl BudgetTier {
    pub fn describe(self) -> &'static str {
        match self {
            BudgetTier::Low => "budget/low-cost",
            BudgetTier::Mid => "mid-range/moderate",
            BudgetTier::High => "luxury/high-end",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Mid => "mid",
            BudgetTier::High => "high",
        }
    }
}

impl FromStr for BudgetTier {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "$" | "budget" => Ok(BudgetTier::Low),
            "mid" | "$$" | "moderate" => Ok(BudgetTier::Mid),
            "high" | "$$$" | "luxury" => Ok(BudgetTier::High),
            other => Err(PlannerError::Config(format!("unknown budget tier `{other}`"))),
        }
    }
}

/// How packed each day should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    #[default]
    Relaxed,
    Normal,
    Active,
}

impl Pace {
    pub fn describe(self) -> &'static str {
        match self {
            Pace::Relaxed => "relaxed and leisurely pace",
            Pace::Normal => "moderate pace with some activities",
            Pace::Active => "active and adventurous pace",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pace::Relaxed => "relaxed",
            Pace::Normal => "normal",
            Pace::Active => "active",
        }
    }
}

impl FromStr for Pace {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relaxed" | "relax" => Ok(Pace::Relaxed),
            "normal" | "moderate" => Ok(Pace::Normal),
            "active" => Ok(Pace::Active),
            other => Err(PlannerError::Config(format!("unknown pace `{other}`"))),
        }
    }
}

/// Longest trip an itinerary is built for.
pub const MAX_TRIP_DAYS: usize = 30;

/// Optional start/end dates of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whole days between start and end, if both are known. May be negative.
    pub fn span_days(&self) -> Option<i64> {
        Some((self.end? - self.start?).num_days())
    }

    /// Trip length in days: `max(1, end - start)` when both ends are known, else 1.
    /// Never more than [`MAX_TRIP_DAYS`].
    pub fn duration_days(&self) -> usize {
        self.span_days()
            .map_or(1, |days| days.clamp(1, MAX_TRIP_DAYS as i64) as usize)
    }

    /// Reject ranges longer than [`MAX_TRIP_DAYS`].
    pub fn check_length(&self) -> Result<(), PlannerError> {
        match self.span_days() {
            Some(days) if days > MAX_TRIP_DAYS as i64 => Err(PlannerError::Config(format!(
                "trip spans {days} days; at most {MAX_TRIP_DAYS} are supported"
            ))),
            _ => Ok(()),
        }
    }

    /// Calendar date of the day at `offset`, counting from the start (or today).
    pub fn day_date(&self, offset: usize) -> NaiveDate {
        let start = self.start.unwrap_or_else(|| Utc::now().date_naive());
        start + Duration::days(offset as i64)
    }
}

/// Immutable parameters of one planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripContext {
    origin: Option<String>,
    destination: String,
    #[serde(default)]
    dates: DateRange,
    #[serde(default)]
    party: PartySize,
    #[serde(default)]
    budget: BudgetTier,
    #[serde(default)]
    pace: Pace,
}

impl TripContext {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            origin: None,
            destination: destination.into(),
            dates: DateRange::default(),
            party: PartySize::default(),
            budget: BudgetTier::default(),
            pace: Pace::default(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_party(mut self, party: PartySize) -> Self {
        self.party = party;
        self
    }

    pub fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn destination(&self) -> Option<&str> {
        Some(self.destination.trim()).filter(|value| !value.is_empty())
    }

    pub fn origin_or_placeholder(&self) -> &str {
        self.origin().unwrap_or("your departure city")
    }

    pub fn destination_or_placeholder(&self) -> &str {
        self.destination().unwrap_or("your destination")
    }

    pub fn dates(&self) -> &DateRange {
        &self.dates
    }

    pub fn party(&self) -> PartySize {
        self.party
    }

    pub fn budget(&self) -> BudgetTier {
        self.budget
    }

    pub fn pace(&self) -> Pace {
        self.pace
    }

    pub fn duration_days(&self) -> usize {
        self.dates.duration_days()
    }
}

impl fmt::Display for TripContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} day{} from {} to {}",
            self.duration_days(),
            if self.duration_days() > 1 { "s" } else { "" },
            self.origin_or_placeholder(),
            self.destination_or_placeholder()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duration_uses_whole_day_difference() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 4));
        assert_eq!(range.duration_days(), 3);
    }

    #[test]
    fn duration_is_at_least_one() {
        assert_eq!(DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).duration_days(), 1);
        assert_eq!(DateRange::new(date(2024, 1, 5), date(2024, 1, 1)).duration_days(), 1);
        assert_eq!(DateRange::default().duration_days(), 1);
    }

    #[test]
    fn duration_is_capped() {
        let range = DateRange::new(date(2024, 1, 1), date(9999, 12, 31));
        assert_eq!(range.duration_days(), MAX_TRIP_DAYS);
        assert!(matches!(range.check_length(), Err(PlannerError::Config(_))));

        let month = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(month.duration_days(), 30);
        assert!(month.check_length().is_ok());
        assert!(DateRange::default().check_length().is_ok());
    }

    #[test]
    fn day_dates_count_from_start() {
        let range = DateRange::new(date(2024, 2, 28), date(2024, 3, 2));
        assert_eq!(range.day_date(2), date(2024, 3, 1));
    }

    #[test]
    fn options_accept_ui_shorthand() {
        assert_eq!("$$".parse::<BudgetTier>().unwrap(), BudgetTier::Mid);
        assert_eq!("Relax".parse::<Pace>().unwrap(), Pace::Relaxed);
        assert_eq!("FAMILY".parse::<PartySize>().unwrap(), PartySize::Family);
        assert!("lavish".parse::<BudgetTier>().is_err());
    }

    #[test]
    fn blank_places_fall_back_to_placeholders() {
        let trip = TripContext::new("  ").with_origin("");
        assert_eq!(trip.destination_or_placeholder(), "your destination");
        assert_eq!(trip.origin_or_placeholder(), "your departure city");
    }
}
