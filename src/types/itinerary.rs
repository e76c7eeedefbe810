use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::{
    core::map::MapMarker,
    schemas::{ResponseSchema, SchemaHandle},
};

/// Structured trip plan: a short summary plus ordered days of activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Itinerary {
    /// Brief description of the trip
    #[serde(default)]
    pub summary: String,
    /// One entry per calendar day, in order
    pub days: Vec<Day>,
}

/// A single calendar day of the plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Day {
    /// Calendar date as YYYY-MM-DD
    #[serde(default)]
    pub date: String,
    /// Activities in chronological order
    #[serde(default)]
    pub items: Vec<Activity>,
}

/// One timed stop on the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Activity {
    /// Local time of day as HH:MM
    pub time: String,
    /// Short, concrete description of the stop
    pub title: String,
    /// Latitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Activity {
    pub fn new(time: impl Into<String>, title: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            time: time.into(),
            title: title.into(),
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}

impl Day {
    pub fn new(date: NaiveDate, items: Vec<Activity>) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            items,
        }
    }

    /// The day's date, when the model produced a parseable one.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

impl Itinerary {
    pub fn new(summary: impl Into<String>, days: Vec<Day>) -> Self {
        Self {
            summary: summary.into(),
            days,
        }
    }

    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|day| day.items.len()).sum()
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.days.iter().flat_map(|day| day.items.iter())
    }

    /// Map markers for every activity that carries a usable coordinate.
    pub fn markers(&self) -> Vec<MapMarker> {
        self.activities()
            .filter_map(|activity| {
                let (lat, lng) = activity.coordinate()?;
                Some(MapMarker::new(lat, lng).with_label(activity.title.clone()))
            })
            .collect()
    }
}

impl ResponseSchema for Itinerary {
    fn schema() -> &'static SchemaHandle {
        static HANDLE: OnceLock<SchemaHandle> = OnceLock::new();
        HANDLE.get_or_init(|| {
            SchemaHandle::from_root_schema("itinerary", schemars::schema_for!(Itinerary))
        })
    }
}
