//! Best-effort scraping of activities out of prose.
//!
//! Used only after every JSON stage has failed. Nothing here is expected to be
//! accurate; the goal is a plausible list of `(time, title)` pairs.

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_TITLE_CHARS: usize = 50;
const MIN_TITLE_CHARS: usize = 3;

/// Leading words that mark leftover model chatter or schema debris.
const STOPWORDS: [&str; 15] = [
    "analysis",
    "json",
    "object",
    "schema",
    "matching",
    "output",
    "need",
    "lat",
    "lng",
    "ing",
    "coordinates",
    "summary",
    "days",
    "items",
    "date",
];

/// One `(pattern, replacement)` step of title cleanup.
#[derive(Debug, Clone)]
pub struct CleanupRule {
    pattern: Regex,
    replacement: &'static str,
}

impl CleanupRule {
    pub fn new(pattern: Regex, replacement: &'static str) -> Self {
        Self {
            pattern,
            replacement,
        }
    }

    fn literal(pattern: &str, replacement: &'static str) -> Self {
        Self::new(
            Regex::new(pattern).expect("built-in cleanup pattern is valid"),
            replacement,
        )
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

/// Ordered table of cleanup rules applied until nothing changes.
#[derive(Debug, Clone)]
pub struct TitleCleaner {
    rules: Vec<CleanupRule>,
}

impl Default for TitleCleaner {
    fn default() -> Self {
        Self {
            rules: vec![
                // bullets and list numbering
                CleanupRule::literal(r"^\s*(?:[-*•–—>]+|\d{1,2}[.)])\s+", ""),
                // model preamble
                CleanupRule::literal(
                    r"(?i)^(?:analysis\s*)?(?:sure|okay|ok|here\s+is|here's|we'll|we\s+will|we\s+need\s+to|we|i'll|i\s+will|let's)\b[\s,!.:-]*",
                    "",
                ),
                // day-part labels in front
                CleanupRule::literal(
                    r"(?i)^(?:morning|afternoon|evening|night|noon|midday)\s*[:\-–]\s*",
                    "",
                ),
                // schema fragments such as `. lat: 10.2` or `"title": ...`
                CleanupRule::literal(
                    r#"(?i)[\s.,;]*"?\b(?:title|time|lat|lng|lon|latitude|longitude|coordinates)"?\s*[:=].*$"#,
                    "",
                ),
                CleanupRule::literal(r"(?i)[\s.,;(]*\blat\s*/\s*(?:lng|ing|lon)\b.*$", ""),
                // trailing ellipsis and whatever follows
                CleanupRule::literal(r"\s*(?:\.\s*)?(?:\.{3}|…).*$", ""),
                // a dangling label that belongs to the next time slot
                CleanupRule::literal(
                    r"(?i)[\s.,;]*\b(?:morning|afternoon|evening|night|noon|midday)\s*:\s*$",
                    "",
                ),
                CleanupRule::literal(r"^[^\p{L}]+", ""),
                CleanupRule::literal(r#"[\s.,;:!?\-–—"'{}\[\]]+$"#, ""),
                CleanupRule::literal(r"\s+", " "),
            ],
        }
    }
}

impl TitleCleaner {
    pub fn new(rules: Vec<CleanupRule>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, rule: CleanupRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[CleanupRule] {
        &self.rules
    }

    /// Apply the table to a fixpoint. `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_once(&self, text: &str) -> String {
        let mut cleaned = self
            .rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
            .trim()
            .to_string();

        if cleaned.chars().count() > MAX_TITLE_CHARS {
            if let Some(first) = cleaned
                .split(['.', '!', '?'])
                .map(str::trim)
                .find(|sentence| !sentence.is_empty())
            {
                cleaned = first.to_string();
            }
        }

        capitalize_first(&cleaned)
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a cleaned title is worth keeping.
pub fn is_acceptable_title(title: &str) -> bool {
    let length = title.chars().count();
    if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&length) {
        return false;
    }
    let first_word = title
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    !STOPWORDS.contains(&first_word.as_str())
}

/// An activity found in prose, before coordinates are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedActivity {
    pub time: String,
    pub title: String,
}

fn time_pattern() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b|\b(\d{1,2}):(\d{2})\b")
            .expect("time pattern is valid")
    })
}

fn title_field_pattern() -> &'static Regex {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    TITLE_RE.get_or_init(|| {
        Regex::new(r#"(?i)\btitle"?\s*[:=]\s*(?:"([^"\n]+)|'([^'\n]+)|([^,\n]+))"#)
            .expect("title pattern is valid")
    })
}

/// Normalise a time match to zero-padded 24h `HH:MM`, wrapping out-of-range parts.
fn normalize_time(caps: &regex::Captures<'_>) -> Option<String> {
    if let Some(hour) = caps.get(1) {
        let mut hours: u32 = hour.as_str().parse().ok()?;
        let minutes: u32 = caps
            .get(2)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);
        let meridiem = caps.get(3)?.as_str().to_ascii_lowercase();
        hours %= 12;
        if meridiem == "pm" {
            hours += 12;
        }
        return Some(format!("{:02}:{:02}", hours % 24, minutes % 60));
    }

    let hours: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(5)?.as_str().parse().ok()?;
    Some(format!("{:02}:{:02}", hours % 24, minutes % 60))
}

fn title_from(fragment: &str, cleaner: &TitleCleaner) -> Option<String> {
    let raw = title_field_pattern()
        .captures(fragment)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
        .unwrap_or(fragment);
    let title = cleaner.clean(raw);
    is_acceptable_title(&title).then_some(title)
}

/// Scan text line by line for times of day and derive a title for each.
///
/// A line may hold several times; each title runs up to the next time. When a
/// lone time has nothing usable around it, a `title` field on the following
/// line is used (pretty-printed but truncated JSON).
pub fn scan_timed_lines(text: &str, cleaner: &TitleCleaner) -> Vec<ScrapedActivity> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let mut activities = Vec::new();

    for (line_idx, line) in lines.iter().enumerate() {
        let matches: Vec<regex::Captures<'_>> = time_pattern().captures_iter(line).collect();

        for (idx, caps) in matches.iter().enumerate() {
            let Some(time) = normalize_time(caps) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let segment_end = matches
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map(|next| next.start())
                .unwrap_or(line.len());

            let mut title = title_from(&line[whole.end()..segment_end], cleaner);
            if title.is_none() && idx == 0 {
                title = title_from(&line[..whole.start()], cleaner);
            }
            if title.is_none() && matches.len() == 1 {
                title = lines
                    .get(line_idx + 1)
                    .filter(|next| !time_pattern().is_match(next))
                    .filter(|next| title_field_pattern().is_match(next))
                    .and_then(|next| title_from(next, cleaner));
            }

            if let Some(title) = title {
                activities.push(ScrapedActivity { time, title });
            }
        }
    }

    activities
}

struct KeywordRule {
    pattern: Regex,
    time: &'static str,
    title: &'static str,
}

fn keyword_rules() -> &'static [KeywordRule] {
    static RULES: OnceLock<Vec<KeywordRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)\b(?:flights?|airport|departure|arrival)\b", "07:00", "Flight and airport transfer"),
            (r"(?i)\b(?:check.?in|hotels?|accommodation|hostel)\b", "10:00", "Hotel check-in"),
            (r"(?i)\bbreakfast\b", "07:30", "Breakfast at a local cafe"),
            (r"(?i)\b(?:lunch|noon)\b", "12:00", "Lunch with local specialties"),
            (r"(?i)\bdinner\b", "18:30", "Dinner at a local restaurant"),
            (r"(?i)\b(?:temples?|pagodas?|shrines?|chùa)\b", "09:00", "Visit a temple or pagoda"),
            (r"(?i)\b(?:lakes?|waterfalls?|beach|hồ)\b", "15:00", "Waterside walk"),
            (r"(?i)\b(?:markets?|chợ)\b", "11:00", "Explore the local market"),
            (r"(?i)\b(?:museums?|bảo tàng)\b", "14:00", "Museum visit"),
            (r"(?i)\b(?:coffee|cà phê)\b", "16:00", "Coffee break"),
            (r"(?i)\bstreet food\b", "20:00", "Street food tasting"),
            (r"(?i)\b(?:taxi|shuttle|transport|transfer)\b", "08:30", "Local transfer"),
            (r"(?i)\b(?:relax|rest|spa)\b", "17:00", "Rest at the hotel"),
            (r"(?i)\b(?:sleep|overnight)\b", "21:30", "Overnight at the hotel"),
        ]
        .into_iter()
        .map(|(pattern, time, title)| KeywordRule {
            pattern: Regex::new(pattern).expect("keyword pattern is valid"),
            time,
            title,
        })
        .collect()
    })
}

/// One activity per travel keyword found anywhere in the text, ordered by time.
pub fn scan_keywords(text: &str) -> Vec<ScrapedActivity> {
    let mut activities: Vec<ScrapedActivity> = keyword_rules()
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| ScrapedActivity {
            time: rule.time.to_string(),
            title: rule.title.to_string(),
        })
        .collect();
    activities.sort_by(|a, b| a.time.cmp(&b.time));
    activities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(activities: &[ScrapedActivity]) -> Vec<&str> {
        activities.iter().map(|a| a.time.as_str()).collect()
    }

    #[test]
    fn splits_several_times_on_one_line() {
        let text = "Morning: 08:00 visit the old quarter. Afternoon: 14:00 lunch at a cafe.";
        let found = scan_timed_lines(text, &TitleCleaner::default());
        assert_eq!(times(&found), vec!["08:00", "14:00"]);
        assert_eq!(found[0].title, "Visit the old quarter");
        assert_eq!(found[1].title, "Lunch at a cafe");
    }

    #[test]
    fn converts_meridiem_times() {
        let text = "- 9am Breakfast by the river\n- 7:30 pm Night market stroll";
        let found = scan_timed_lines(text, &TitleCleaner::default());
        assert_eq!(times(&found), vec!["09:00", "19:30"]);
        assert_eq!(found[1].title, "Night market stroll");
    }

    #[test]
    fn wraps_out_of_range_times() {
        let found = scan_timed_lines("25:75 Sunrise hike", &TitleCleaner::default());
        assert_eq!(times(&found), vec!["01:15"]);
    }

    #[test]
    fn prefers_quoted_title_field() {
        let line = r#"{"time": "08:00", "title": "Visit Museum", "lat": 10.1, "lng": 106.2},"#;
        let found = scan_timed_lines(line, &TitleCleaner::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Visit Museum");
    }

    #[test]
    fn picks_title_from_following_line_in_truncated_json() {
        let text = "{\n\"days\": [{\"items\": [\n{\n\"time\": \"10:30\",\n\"title\": \"Ben Thanh Market\",\n\"lat\": 10.77";
        let found = scan_timed_lines(text, &TitleCleaner::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].time, "10:30");
        assert_eq!(found[0].title, "Ben Thanh Market");
    }

    #[test]
    fn uses_text_before_time_when_nothing_follows() {
        let found = scan_timed_lines("Check in at Rex Hotel at 15:00", &TitleCleaner::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Check in at Rex Hotel at");
    }

    #[test]
    fn drops_meta_chatter() {
        let text = "analysis We need to output a JSON object matching schema 08:00 lat: 10";
        let found = scan_timed_lines(text, &TitleCleaner::default());
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn cleanup_strips_schema_fragments() {
        let cleaner = TitleCleaner::default();
        assert_eq!(cleaner.clean("• Dinner at Hoi An. lat: 15.87, lng: 108.33"), "Dinner at Hoi An");
        assert_eq!(cleaner.clean("Cable car ride lat/lng 16.0"), "Cable car ride");
        assert_eq!(cleaner.clean("Boat trip . ... more text"), "Boat trip");
    }

    #[test]
    fn cleanup_truncates_long_text_to_first_sentence() {
        let cleaner = TitleCleaner::default();
        let title = cleaner.clean(
            "Explore the imperial citadel with a local guide. Then continue to the river for sunset views",
        );
        assert_eq!(title, "Explore the imperial citadel with a local guide");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let cleaner = TitleCleaner::default();
        for raw in [
            "- - We'll we'll visit the market...",
            "  3) Afternoon: coffee at Cong Caphe, \"lat\": 21.0",
            "Morning:   walk \t around   Hoan Kiem lake. Evening:",
            "!!! ",
            "A very long description that goes on and on without any full stop at all whatsoever",
            "",
        ] {
            let once = cleaner.clean(raw);
            assert_eq!(cleaner.clean(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn acceptance_rules() {
        assert!(is_acceptable_title("Museum visit"));
        assert!(!is_acceptable_title("ok"));
        assert!(!is_acceptable_title("Schema says items"));
        assert!(!is_acceptable_title(&"x".repeat(MAX_TITLE_CHARS + 1)));
    }

    #[test]
    fn keyword_scan_orders_by_time() {
        let found = scan_keywords("After dinner we rest; the flight lands early, then a museum.");
        assert_eq!(
            found.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(),
            vec![
                "Flight and airport transfer",
                "Museum visit",
                "Rest at the hotel",
                "Dinner at a local restaurant"
            ]
        );
    }

    #[test]
    fn keyword_scan_finds_nothing_in_refusals() {
        assert!(scan_keywords("I'm sorry, I cannot help with that request.").is_empty());
    }

    #[test]
    fn custom_rules_extend_the_table() {
        let rule = CleanupRule::new(Regex::new(r"(?i)\s*\(approx\.?\)").unwrap(), "");
        let cleaner = TitleCleaner::default().with_rule(rule);
        assert_eq!(cleaner.clean("Night bus (approx.)"), "Night bus");
    }
}
