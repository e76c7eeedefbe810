use serde_json::{json, Value};

use crate::types::trip::TripContext;

/// Shape the model is asked to produce, spelled out with sample values.
const SCHEMA_SKETCH: &str = r#"{
  "summary": "Brief description of the trip",
  "days": [
    {
      "date": "YYYY-MM-DD",
      "items": [
        {
          "time": "HH:MM",
          "title": "Activity description",
          "lat": 10.1234,
          "lng": 106.5678
        }
      ]
    }
  ]
}"#;

const TITLE_RULES: &str = "IMPORTANT FORMATTING RULES:
- Each activity title must be SHORT and CONCISE (max 40 characters)
- Use SPECIFIC location names, not generic terms
- Avoid generic terms like \"hotel\", \"restaurant\", \"museum\" - use actual names
- Each title should be a single, clear action with a specific location";

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

fn example_item(time: &str, title: String) -> Value {
    json!({"time": time, "title": title, "lat": 10.1234, "lng": 106.5678})
}

/// One-day example when the trip is a single day, otherwise a two-day example.
fn worked_example(context: &TripContext, days: usize, start: &str, end: &str) -> String {
    let summary = format!(
        "{} day trip from {} to {}",
        days,
        context.origin_or_placeholder(),
        context.destination_or_placeholder()
    );

    let items = |label: &dyn Fn(usize) -> String, count: usize| -> Vec<Value> {
        (1..=count)
            .map(|n| example_item(&format!("{:02}:00", 6 + 2 * n), label(n)))
            .collect()
    };

    let example = if days == 1 {
        let single = items(&|n| format!("Activity {n}"), 3);
        json!({"summary": summary, "days": [{"date": start, "items": single}]})
    } else {
        let first = items(&|n| format!("Day 1 Activity {n}"), 2);
        let second = items(&|n| format!("Day 2 Activity {n}"), 2);
        json!({
            "summary": summary,
            "days": [
                {"date": start, "items": first},
                {"date": end, "items": second}
            ]
        })
    };

    serde_json::to_string_pretty(&example).unwrap_or_else(|_| example.to_string())
}

/// Build the user prompt for one planning request.
///
/// Never fails: missing origin, destination and dates fall back to placeholder
/// text, and the day count is always at least one.
pub fn build_prompt(context: &TripContext) -> String {
    let days = context.duration_days();
    let dates = context.dates();
    let start = dates
        .start
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    let end = dates
        .end
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    let from = context.origin_or_placeholder();
    let to = context.destination_or_placeholder();
    let travelers = context.party().describe();
    let budget = context.budget().describe();
    let pace = context.pace().describe();
    let s = plural(days);

    format!(
        "You are a travel planner. Create a detailed itinerary in JSON format.

CRITICAL: Return ONLY one valid JSON object. No explanations, no markdown, no code fences, no additional text before or after the JSON.

Required JSON schema:
{SCHEMA_SKETCH}

Trip details:
- From: {from}
- To: {to}
- Dates: {start} to {end}
- Duration: {days} day{s}
- Travelers: {travelers}
- Budget level: {budget}
- Travel pace: {pace}

Requirements:
- Create EXACTLY {days} day{s} itinerary - NO MORE, NO LESS
- Use realistic times in HH:MM format
- Include accurate lat/lng coordinates for each location
- Make activities suitable for a {budget} budget and a {pace}
- Include transportation, accommodation, meals, and attractions
- Consider that this is for a {travelers}
- Use REAL, SPECIFIC place names in {to} (hotels, restaurants, attractions, stations)

CRITICAL: The \"days\" array must contain EXACTLY {days} object{s}. Do not create extra days.

EXAMPLE FOR {days} DAY{upper_s}:
{example}

{TITLE_RULES}

Return only the JSON object:",
        upper_s = s.to_uppercase(),
        example = worked_example(context, days, &start, &end),
    )
}
