//! Canned activity templates and placeholder coordinates.

use rand::Rng;

use crate::types::{
    itinerary::{Activity, Day, Itinerary},
    trip::TripContext,
};

/// Fixed point placeholder coordinates are scattered around.
pub const BASE_COORDINATE: (f64, f64) = (10.8231, 106.6297);
/// Spread for activities scraped out of prose.
pub const SCRAPED_JITTER: f64 = 0.05;
/// Spread for template activities.
pub const TEMPLATE_JITTER: f64 = 0.005;

/// `(time, title)` pairs making up one canned day.
pub type DayTemplate = &'static [(&'static str, &'static str)];

/// Day templates for the synthetic itinerary, cycled by day index.
pub const DAY_TEMPLATES: [DayTemplate; 3] = [
    &[
        ("08:00", "Flight to the destination"),
        ("10:30", "Hotel check-in"),
        ("12:00", "Lunch at a local restaurant"),
        ("14:00", "Walk around the city center"),
        ("16:00", "Coffee and a short rest"),
        ("18:30", "Dinner and local food tasting"),
    ],
    &[
        ("07:30", "Breakfast at the hotel"),
        ("09:00", "Museum and historic sites"),
        ("11:30", "Shopping at the local market"),
        ("13:00", "Lunch with regional specialties"),
        ("15:00", "Visit a national park"),
        ("18:00", "Dinner and a cultural show"),
    ],
    &[
        ("08:00", "Waterfall excursion"),
        ("10:30", "Outdoor activities"),
        ("12:30", "Picnic by the lake"),
        ("14:30", "Traditional craft village"),
        ("17:00", "Watch the sunset"),
        ("19:00", "Outdoor BBQ dinner"),
    ],
];

/// Templates used to pad an itinerary that came back short.
pub const ADDITIONAL_TEMPLATES: [DayTemplate; 2] = [
    &[
        ("08:30", "Start of a new tour"),
        ("10:30", "Famous local landmark"),
        ("12:30", "Lunch with a view"),
        ("14:30", "Local cultural experience"),
        ("17:00", "Souvenir shopping"),
        ("19:00", "Local buffet dinner"),
    ],
    &[
        ("07:45", "Nature exploration"),
        ("09:45", "Light trekking"),
        ("12:15", "Lunch by the stream"),
        ("14:45", "Swimming and relaxing"),
        ("16:45", "Sunset photography"),
        ("18:45", "Fresh seafood dinner"),
    ],
];

/// Offset `base` by a uniform random amount in `[-spread, spread]` on each axis.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, base: (f64, f64), spread: f64) -> (f64, f64) {
    if spread <= 0.0 {
        return base;
    }
    (
        base.0 + rng.gen_range(-spread..=spread),
        base.1 + rng.gen_range(-spread..=spread),
    )
}

/// Materialise a template for `date`, giving each activity a jittered coordinate.
pub fn template_day<R: Rng + ?Sized>(
    template: DayTemplate,
    date: chrono::NaiveDate,
    base: (f64, f64),
    spread: f64,
    rng: &mut R,
) -> Day {
    let items = template
        .iter()
        .map(|(time, title)| {
            let (lat, lng) = jitter(rng, base, spread);
            Activity::new(*time, *title, lat, lng)
        })
        .collect();
    Day::new(date, items)
}

/// Generic plan covering the whole trip, used when the reply held nothing usable.
pub fn synthetic_itinerary<R: Rng + ?Sized>(
    context: &TripContext,
    base: (f64, f64),
    spread: f64,
    rng: &mut R,
) -> Itinerary {
    let days: Vec<Day> = (0..context.duration_days())
        .map(|offset| {
            let template = DAY_TEMPLATES[offset % DAY_TEMPLATES.len()];
            template_day(template, context.dates().day_date(offset), base, spread, rng)
        })
        .collect();
    let activity_count: usize = days.iter().map(|day| day.items.len()).sum();

    Itinerary::new(
        format!(
            "Trip from {} to {} with {} basic activities.",
            context.origin_or_placeholder(),
            context.destination_or_placeholder(),
            activity_count
        ),
        days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::trip::DateRange;
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn jitter_stays_within_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let (lat, lng) = jitter(&mut rng, BASE_COORDINATE, SCRAPED_JITTER);
            assert!((lat - BASE_COORDINATE.0).abs() <= SCRAPED_JITTER);
            assert!((lng - BASE_COORDINATE.1).abs() <= SCRAPED_JITTER);
        }
    }

    #[test]
    fn zero_spread_returns_base() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(jitter(&mut rng, (1.0, 2.0), 0.0), (1.0, 2.0));
    }

    #[test]
    fn synthetic_itinerary_cycles_templates_over_trip_length() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let context = TripContext::new("Da Lat")
            .with_origin("Saigon")
            .with_dates(DateRange::new(start, end));
        let mut rng = StdRng::seed_from_u64(3);

        let itinerary = synthetic_itinerary(&context, BASE_COORDINATE, TEMPLATE_JITTER, &mut rng);

        assert_eq!(itinerary.days.len(), 4);
        assert_eq!(itinerary.days[0].date, "2024-05-01");
        assert_eq!(itinerary.days[3].date, "2024-05-04");
        assert_eq!(itinerary.days[3].items[0].title, DAY_TEMPLATES[0][0].1);
        assert!(itinerary.summary.contains("Saigon"));
        assert!(itinerary.summary.contains("24 basic activities"));
        assert!(itinerary.activities().all(|a| a.coordinate().is_some()));
    }
}
