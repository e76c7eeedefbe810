use std::{fmt::Write as _, fs, time::Duration};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};

use crate::{
    config::ClientConfig,
    core::{map::DEFAULT_CENTER, MapView, TripPlanner},
    services::{prompt::build_prompt, recovery::ItineraryRecovery},
    types::{
        itinerary::Itinerary,
        outcome::{RecoveryFailure, RecoveryOutcome},
        trip::{DateRange, TripContext},
    },
};

fn trip_args() -> Vec<Arg> {
    vec![
        Arg::new("from")
            .short('f')
            .long("from")
            .value_name("CITY")
            .help("Departure city"),
        Arg::new("start")
            .short('s')
            .long("start")
            .value_name("YYYY-MM-DD")
            .help("First day of the trip"),
        Arg::new("end")
            .short('e')
            .long("end")
            .value_name("YYYY-MM-DD")
            .help("Last day of the trip"),
        Arg::new("party")
            .short('p')
            .long("party")
            .value_name("SIZE")
            .help("solo, couple, friends or family")
            .default_value("solo"),
        Arg::new("budget")
            .short('b')
            .long("budget")
            .value_name("TIER")
            .help("low, mid or high (or $, $$, $$$)")
            .default_value("low"),
        Arg::new("pace")
            .long("pace")
            .value_name("PACE")
            .help("relaxed, normal or active")
            .default_value("relaxed"),
    ]
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print machine-readable JSON instead of text")
}

fn command() -> Command {
    Command::new("tripwiz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan a day-by-day trip itinerary with a hosted language model")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("plan")
                .about("Request an itinerary and print the recovered plan")
                .arg(
                    Arg::new("destination")
                        .help("Where the trip goes")
                        .required(true)
                        .index(1),
                )
                .args(trip_args())
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .value_name("MODEL")
                        .help("Preferred model, tried before the defaults (or set HF_MODEL)"),
                )
                .arg(
                    Arg::new("api-key")
                        .short('k')
                        .long("api-key")
                        .value_name("KEY")
                        .help("Hugging Face token (or set HF_TOKEN env var)"),
                )
                .arg(
                    Arg::new("base-url")
                        .short('u')
                        .long("base-url")
                        .value_name("URL")
                        .help("Chat-completions base URL (or set HF_BASE_URL)"),
                )
                .arg(
                    Arg::new("timeout")
                        .short('t')
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Per-model request timeout in seconds")
                        .default_value("60"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("prompt")
                .about("Print the prompt that would be sent, without calling a model")
                .arg(
                    Arg::new("destination")
                        .help("Where the trip goes")
                        .required(true)
                        .index(1),
                )
                .args(trip_args()),
        )
        .subcommand(
            Command::new("recover")
                .about("Run recovery over a saved model response")
                .arg(
                    Arg::new("file")
                        .help("File holding the raw model output")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_name("CITY")
                        .help("Destination; without it no fallback plan can be generated"),
                )
                .args(trip_args())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for placeholder coordinates"),
                )
                .arg(json_arg()),
        )
}

/// CLI entry point for the tripwiz tool
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    match command().get_matches().subcommand() {
        Some(("plan", matches)) => plan(matches).await,
        Some(("prompt", matches)) => {
            let context = trip_context(matches, matches.get_one::<String>("destination"))?;
            println!("{}", build_prompt(&context));
            Ok(())
        }
        Some(("recover", matches)) => recover(matches),
        _ => {
            command().print_help()?;
            Ok(())
        }
    }
}

async fn plan(matches: &ArgMatches) -> anyhow::Result<()> {
    let context = trip_context(matches, matches.get_one::<String>("destination"))?;
    let config = client_config(matches)?;
    info!(
        "Planning {} with {} candidate model(s) at {}",
        context,
        config.candidate_models().len(),
        config.base_url
    );

    let planner = TripPlanner::from_config(config);
    let result = match planner.plan(&context).await {
        Ok(result) => result,
        Err(err) => {
            error!("Planning failed: {}", err);
            let payload = err.to_error_payload();
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if payload["error"]["retryable"].as_bool().unwrap_or(false) {
                eprintln!("The model service may be busy; run the same command again to retry.");
            }
            return Err(err.into());
        }
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_outcome(&result.outcome, Some(&context)));
        info!("\n{}", result.replay());
    }

    if let RecoveryOutcome::Unrecoverable(_) = result.outcome {
        bail!("no itinerary could be recovered");
    }
    Ok(())
}

fn recover(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<String>("file")
        .context("a response file is required")?;
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;

    let context = match matches.get_one::<String>("to") {
        Some(destination) => Some(trip_context(matches, Some(destination))?),
        None => None,
    };

    let recovery = ItineraryRecovery::new();
    let outcome = match matches.get_one::<u64>("seed") {
        Some(seed) => {
            recovery.recover_with_rng(&raw, context.as_ref(), &mut StdRng::seed_from_u64(*seed))
        }
        None => recovery.recover(&raw, context.as_ref()),
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", render_outcome(&outcome, context.as_ref()));
    }

    if !outcome.is_recovered() {
        bail!("no itinerary could be recovered from `{path}`");
    }
    Ok(())
}

fn trip_context(matches: &ArgMatches, destination: Option<&String>) -> anyhow::Result<TripContext> {
    let dates = DateRange {
        start: parse_date(matches, "start")?,
        end: parse_date(matches, "end")?,
    };
    dates.check_length()?;

    let mut context = TripContext::new(destination.cloned().unwrap_or_default())
        .with_dates(dates)
        .with_party(arg_or_default(matches, "party")?.parse()?)
        .with_budget(arg_or_default(matches, "budget")?.parse()?)
        .with_pace(arg_or_default(matches, "pace")?.parse()?);

    if let Some(origin) = matches.get_one::<String>("from") {
        context = context.with_origin(origin.clone());
    }
    Ok(context)
}

fn arg_or_default<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{name}"))
}

fn parse_date(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<NaiveDate>> {
    matches
        .get_one::<String>(name)
        .map(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .with_context(|| format!("--{name} must be a YYYY-MM-DD date, got `{value}`"))
        })
        .transpose()
}

fn client_config(matches: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let mut config = match matches.get_one::<String>("api-key") {
        Some(key) => ClientConfig::new(key.clone()).with_env_overrides(),
        None => ClientConfig::from_env()?,
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_preferred_model(model.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    let timeout_seconds: u64 = arg_or_default(matches, "timeout")?
        .parse()
        .context("--timeout must be a whole number of seconds")?;
    Ok(config.with_timeout(Duration::from_secs(timeout_seconds)))
}

fn render_outcome(outcome: &RecoveryOutcome, context: Option<&TripContext>) -> String {
    match outcome {
        RecoveryOutcome::Recovered {
            itinerary,
            strategy,
            padded,
            truncated,
            ..
        } => {
            let mut out = render_itinerary(itinerary, context);
            let _ = write!(out, "\nRecovered via {strategy}");
            if *padded > 0 {
                let _ = write!(out, ", {padded} day(s) filled from templates");
            }
            if *truncated > 0 {
                let _ = write!(out, ", {truncated} extra day(s) dropped");
            }
            out
        }
        RecoveryOutcome::Unrecoverable(failure) => render_failure(failure),
    }
}

fn render_itinerary(itinerary: &Itinerary, context: Option<&TripContext>) -> String {
    let mut out = String::new();

    match context {
        Some(context) => {
            let _ = writeln!(out, "{context}");
            if let (Some(start), Some(end)) = (context.dates().start, context.dates().end) {
                let _ = writeln!(out, "{start} - {end}");
            }
            let _ = writeln!(
                out,
                "{}, {}, {}",
                context.party().describe(),
                context.budget().describe(),
                context.pace().describe()
            );
        }
        None => {
            let _ = writeln!(out, "{} day trip", itinerary.days.len());
        }
    }

    if !itinerary.summary.trim().is_empty() {
        let _ = writeln!(out, "\n{}", itinerary.summary.trim());
    }

    for (idx, day) in itinerary.days.iter().enumerate() {
        let _ = writeln!(out, "\nDay {} {}", idx + 1, day.date);
        if day.items.is_empty() {
            let _ = writeln!(out, "  (free day)");
        }
        for item in &day.items {
            match item.coordinate() {
                Some((lat, lng)) => {
                    let _ = writeln!(out, "  {:<5}  {}  ({lat:.4}, {lng:.4})", item.time, item.title);
                }
                None => {
                    let _ = writeln!(out, "  {:<5}  {}", item.time, item.title);
                }
            }
        }
    }

    let mut map = MapView::new();
    map.init(DEFAULT_CENTER);
    map.set_markers(&itinerary.markers());
    if let Some(bounds) = map.bounds() {
        let _ = writeln!(
            out,
            "\nMap: {} marker(s), lat {:.4}..{:.4}, lng {:.4}..{:.4}",
            map.markers().len(),
            bounds.south,
            bounds.north,
            bounds.west,
            bounds.east
        );
    }
    map.teardown();

    out
}

fn render_failure(failure: &RecoveryFailure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Could not build an itinerary from the model's reply.");
    if let Some(parse_error) = failure.parse_error() {
        let _ = writeln!(out, "Parse error: {parse_error}");
    }
    let _ = writeln!(
        out,
        "Retry: run the request again, or pass --to <destination> so a fallback plan can be generated."
    );
    let _ = writeln!(out, "\nStrategies tried:");
    for attempt in &failure.attempts {
        let _ = writeln!(out, "  - {}: {}", attempt.strategy, attempt.error);
    }
    let _ = writeln!(out, "\n--- raw output ---");
    out.push_str(&failure.raw);
    out
}
