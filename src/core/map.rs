//! Headless marker layer for rendering an itinerary on a map.
//!
//! A [`MapView`] is an owned resource with an explicit lifecycle:
//! `new` -> `init` -> any number of `set_markers` -> `teardown`. Calls made
//! before `init` or after `teardown` do nothing and return `false`, so a
//! completion that lands after its view was dropped is harmless.

use serde::Serialize;
use tracing::debug;

/// Initial centre used when the caller has nothing better (Da Nang).
pub const DEFAULT_CENTER: (f64, f64) = (16.0471, 108.2068);
pub const DEFAULT_ZOOM: f64 = 12.0;
/// Margin added around fitted bounds, in degrees.
pub const DEFAULT_PADDING: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl MapMarker {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn is_placeable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every marker, or `None` for an empty slice.
    pub fn around(markers: &[MapMarker]) -> Option<Self> {
        let first = markers.first()?;
        let seed = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(markers.iter().skip(1).fold(seed, |bounds, marker| Bounds {
            south: bounds.south.min(marker.lat),
            west: bounds.west.min(marker.lng),
            north: bounds.north.max(marker.lat),
            east: bounds.east.max(marker.lng),
        }))
    }

    pub fn padded(self, padding: f64) -> Self {
        Bounds {
            south: (self.south - padding).max(-90.0),
            west: (self.west - padding).max(-180.0),
            north: (self.north + padding).min(90.0),
            east: (self.east + padding).min(180.0),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MapState {
    Uninitialised,
    Ready {
        center: (f64, f64),
        markers: Vec<MapMarker>,
        bounds: Option<Bounds>,
    },
    TornDown,
}

#[derive(Debug, Clone)]
pub struct MapView {
    state: MapState,
    padding: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    pub fn new() -> Self {
        Self {
            state: MapState::Uninitialised,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Initialise once. Later calls, including after teardown, return `false`.
    pub fn init(&mut self, center: (f64, f64)) -> bool {
        if self.state != MapState::Uninitialised {
            return false;
        }
        self.state = MapState::Ready {
            center,
            markers: Vec::new(),
            bounds: None,
        };
        debug!(target: "tripwiz::map", lat = center.0, lng = center.1, "map initialised");
        true
    }

    /// Replace all markers and refit the viewport.
    ///
    /// Markers with non-finite or out-of-range coordinates are skipped. With no
    /// placeable markers the layer is cleared and the previous bounds dropped.
    pub fn set_markers(&mut self, incoming: &[MapMarker]) -> bool {
        let padding = self.padding;
        let MapState::Ready {
            markers, bounds, ..
        } = &mut self.state
        else {
            return false;
        };

        markers.clear();
        markers.extend(incoming.iter().filter(|m| m.is_placeable()).cloned());
        *bounds = Bounds::around(markers).map(|b| b.padded(padding));

        debug!(
            target: "tripwiz::map",
            placed = markers.len(),
            skipped = incoming.len() - markers.len(),
            "markers redrawn"
        );
        true
    }

    /// Release the view. Returns `false` if it was never initialised or already gone.
    pub fn teardown(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.state = MapState::TornDown;
        true
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, MapState::Ready { .. })
    }

    pub fn markers(&self) -> &[MapMarker] {
        match &self.state {
            MapState::Ready { markers, .. } => markers,
            _ => &[],
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match &self.state {
            MapState::Ready { bounds, .. } => *bounds,
            _ => None,
        }
    }

    /// Fitted centre when markers exist, otherwise the initial centre.
    pub fn center(&self) -> Option<(f64, f64)> {
        match &self.state {
            MapState::Ready { center, bounds, .. } => {
                Some(bounds.map(|b| b.center()).unwrap_or(*center))
            }
            _ => None,
        }
    }
}
