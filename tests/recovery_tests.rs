use chrono::NaiveDate;
use rand::{rngs::StdRng, SeedableRng};
use tripwiz::{
    recover,
    services::{
        heuristics::TitleCleaner,
        templates::{jitter, BASE_COORDINATE, SCRAPED_JITTER},
    },
    Activity, DateRange, Day, Itinerary,
    ItineraryRecovery, RecoveryOutcome, RecoveryStrategy, TripContext,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn trip(days: i64) -> TripContext {
    let start = date(2024, 7, 1);
    TripContext::new("Nha Trang")
        .with_origin("Hanoi")
        .with_dates(DateRange::new(start, start + chrono::Duration::days(days)))
}

#[test]
fn test_direct_parse_returns_object_unchanged() {
    let raw = r#"{"summary":"Trip","days":[{"date":"2024-01-01","items":[{"time":"08:00","title":"Visit Museum","lat":10.1,"lng":106.2}]}]}"#;

    let outcome = recover(raw, None);

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Direct));
    assert!(outcome.attempts().is_empty());
    let expected = Itinerary::new(
        "Trip",
        vec![Day {
            date: "2024-01-01".to_string(),
            items: vec![Activity::new("08:00", "Visit Museum", 10.1, 106.2)],
        }],
    );
    assert_eq!(outcome.into_itinerary(), Some(expected));
}

#[test]
fn test_serialized_itinerary_round_trips() {
    let original = Itinerary::new(
        "Three beaches",
        vec![
            Day {
                date: "2024-07-01".to_string(),
                items: vec![
                    Activity::new("07:30", "Breakfast at Lac Canh", 12.2451, 109.1943),
                    Activity::new("10:00", "Hon Chong Promontory", 12.2716, 109.2037),
                ],
            },
            Day {
                date: "2024-07-02".to_string(),
                items: vec![Activity::new("09:00", "Po Nagar Towers", 12.2655, 109.1953)],
            },
        ],
    );
    let raw = serde_json::to_string(&original).unwrap();

    let outcome = recover(&raw, Some(&trip(2)));

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Direct));
    assert_eq!(outcome.into_itinerary(), Some(original));
}

#[test]
fn test_full_precision_coordinates_round_trip() {
    let recovery = ItineraryRecovery::new();
    let context = trip(4);
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..50 {
        let synthetic = recovery
            .recover_with_rng("no plan here", Some(&context), &mut rng)
            .into_itinerary()
            .unwrap();
        let raw = serde_json::to_string(&synthetic).unwrap();

        let outcome = recover(&raw, Some(&context));

        assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Direct));
        assert_eq!(outcome.into_itinerary(), Some(synthetic));
    }

    let mut items = Vec::new();
    for _ in 0..500 {
        let (lat, lng) = jitter(&mut rng, BASE_COORDINATE, SCRAPED_JITTER);
        items.push(Activity::new("08:00", "Ben Thanh Market", lat, lng));
    }
    let scattered = Itinerary::new(
        "Markets",
        vec![Day {
            date: "2024-07-01".to_string(),
            items,
        }],
    );
    let raw = serde_json::to_string(&scattered).unwrap();

    assert_eq!(recover(&raw, None).into_itinerary(), Some(scattered));
}

#[test]
fn test_fenced_reply_is_recovered_and_padded() {
    let raw = "Sure! Here is your plan: ```json\n{\"summary\":\"x\",\"days\":[]}\n```";

    let outcome = recover(raw, Some(&trip(3)));

    let strategy = outcome.strategy().unwrap();
    assert!(strategy.is_parsed());
    assert_ne!(strategy, RecoveryStrategy::Direct);
    let itinerary = outcome.into_itinerary().unwrap();
    assert_eq!(itinerary.summary, "x");
    assert_eq!(itinerary.days.len(), 3);
}

#[test]
fn test_heuristic_line_scan_example() {
    let raw = "Morning: 08:00 visit the old quarter. Afternoon: 14:00 lunch at a cafe.";

    let outcome = recover(raw, None);

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Heuristic));
    let itinerary = outcome.into_itinerary().unwrap();
    let items: Vec<(&str, &str)> = itinerary
        .activities()
        .map(|a| (a.time.as_str(), a.title.as_str()))
        .collect();
    assert_eq!(
        items,
        vec![("08:00", "Visit the old quarter"), ("14:00", "Lunch at a cafe")]
    );
    for activity in itinerary.activities() {
        let (lat, lng) = activity.coordinate().unwrap();
        assert!((lat - 10.8231).abs() <= 0.05);
        assert!((lng - 106.6297).abs() <= 0.05);
    }
}

#[test]
fn test_truncated_json_falls_back_to_line_scan() {
    let raw = r#"{
  "summary": "Two days in Nha Trang",
  "days": [
    {
      "date": "2024-07-01",
      "items": [
        {"time": "08:00", "title": "Vinpearl cable car", "lat": 12.22, "lng": 109.21},
        {"time": "12:30", "title": "Lunch at Yen's", "lat": 12.24, "lng": 109.19},
        {"time": "15:00", "title": "Tháp Bà Ponagar", "lat"#;

    let outcome = recover(raw, Some(&trip(2)));

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Heuristic));
    let itinerary = outcome.into_itinerary().unwrap();
    let titles: Vec<&str> = itinerary.activities().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Vinpearl cable car", "Lunch at Yen's", "Tháp Bà Ponagar"]);
    assert_eq!(itinerary.days.len(), 2);
    assert_eq!(itinerary.days[0].date, "2024-07-01");
    assert_eq!(itinerary.days[1].date, "2024-07-02");
}

#[test]
fn test_keyword_scan_when_no_times() {
    let raw = "You should take a taxi from the airport to your hotel, \
               then see the night market and finish with street food.";

    let outcome = recover(raw, Some(&trip(1)));

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Heuristic));
    let itinerary = outcome.into_itinerary().unwrap();
    let times: Vec<&str> = itinerary.activities().map(|a| a.time.as_str()).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
    assert_eq!(itinerary.activity_count(), 5);
}

#[test]
fn test_synthetic_fallback_matches_trip_length() {
    let outcome = recover("I'm sorry, I can't help with that.", Some(&trip(5)));

    assert_eq!(outcome.strategy(), Some(RecoveryStrategy::Synthetic));
    assert_eq!(outcome.attempts().len(), 4);
    let itinerary = outcome.into_itinerary().unwrap();
    assert_eq!(itinerary.days.len(), 5);
    assert!(itinerary.days.iter().all(|day| !day.items.is_empty()));
    assert!(itinerary.summary.contains("Hanoi"));
}

#[test]
fn test_no_context_yields_error_state_with_raw_text() {
    let raw = "¯\\_(ツ)_/¯";

    match recover(raw, None) {
        RecoveryOutcome::Unrecoverable(failure) => {
            assert_eq!(failure.raw, raw);
            assert_eq!(
                failure.attempts.last().map(|a| a.strategy),
                Some(RecoveryStrategy::Heuristic)
            );
        }
        other => panic!("expected the error state, got {other:?}"),
    }
}

#[test]
fn test_day_count_invariant_across_inputs() {
    let day = r#"{"date":"2024-07-01","items":[{"time":"09:00","title":"Beach","lat":12.2,"lng":109.2}]}"#;
    let inputs = [
        r#"{"summary":"none","days":[]}"#.to_string(),
        format!(r#"{{"summary":"one","days":[{day}]}}"#),
        format!(r#"prefix {{"summary":"six","days":[{day},{day},{day},{day},{day},{day}]}} suffix"#),
        "08:00 Beach\n10:00 Market\n12:00 Lunch".to_string(),
        "flight and hotel".to_string(),
        String::new(),
        "}{".to_string(),
    ];

    for duration in [1, 2, 4] {
        let context = trip(duration);
        for raw in &inputs {
            let outcome = recover(raw, Some(&context));
            let itinerary = outcome
                .into_itinerary()
                .unwrap_or_else(|| panic!("no itinerary for {raw:?}"));
            assert_eq!(
                itinerary.days.len(),
                duration as usize,
                "raw: {raw:?}, duration {duration}"
            );
        }
    }
}

#[test]
fn test_recovery_never_panics_on_odd_input() {
    let odd = [
        "{",
        "}}}}",
        "{\"days\": \"not a list\"}",
        "```",
        "\"title\": \"",
        "99:99 pm 0:00 am",
        "\u{0}\u{1}\u{2}",
        "{\"days\":[{\"items\":[{\"time\":\"8\",\"title\":\"x\",\"lat\":\"north\"}]}]}",
    ];
    for raw in odd {
        let _ = recover(raw, None);
        assert!(recover(raw, Some(&trip(2))).is_recovered(), "{raw:?}");
    }
}

#[test]
fn test_seeded_rng_makes_placeholders_reproducible() {
    let recovery = ItineraryRecovery::new();
    let context = trip(3);

    let first = recovery.recover_with_rng("nothing", Some(&context), &mut StdRng::seed_from_u64(42));
    let second = recovery.recover_with_rng("nothing", Some(&context), &mut StdRng::seed_from_u64(42));

    assert_eq!(first, second);
}

#[test]
fn test_title_cleanup_is_idempotent() {
    let cleaner = TitleCleaner::default();
    let samples = [
        "* Sure, here is 09:00 breakfast...",
        "Okay! visit Marble Mountains . lat: 16.0",
        "  Evening:  night market ,, ",
        "\"title\": \"Cham Museum\"",
        "Long walk along the beach promenade past the cafes. Then dinner by the sea and drinks",
    ];
    for raw in samples {
        let once = cleaner.clean(raw);
        assert_eq!(cleaner.clean(&once), once, "{raw:?}");
    }
}
