//! Household energy simulator entry point: CLI wiring, session construction
//! and output.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use home_energy_sim::config::AppConfig;
use home_energy_sim::feed::FeedMode;
use home_energy_sim::io::export_csv;
use home_energy_sim::sim::clock::SIM_STEP_MS;
use home_energy_sim::sim::driver::run_ticks;
use home_energy_sim::sim::selftest::all_passed;
use home_energy_sim::sim::session::Session;
use home_energy_sim::telemetry::init_tracing;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    seed_override: Option<u64>,
    steps_override: Option<usize>,
    realtime: bool,
    feed_file: Option<String>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("home-energy-sim: household PV / battery / heat pump / EV energy-flow simulator");
    eprintln!();
    eprintln!("Usage: home-energy-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load session config from TOML file");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --steps <n>              Override number of ticks");
    eprintln!("  --realtime               Sleep driver.tick_interval_ms between ticks");
    eprintln!("  --feed-file <path>       Replay a JSON-lines live feed instead of simulating");
    eprintln!("  --telemetry-out <path>   Export the series to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Keep ticking and serve the REST API");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires {what} argument");
        process::exit(1);
    }
    &args[*i]
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str, kind: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {kind}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        seed_override: None,
        steps_override: None,
        realtime: false,
        feed_file: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                cli.config_path = Some(next_value(&args, &mut i, "--config", "a path").to_string());
            }
            "--seed" => {
                let v = next_value(&args, &mut i, "--seed", "a u64");
                cli.seed_override = Some(parse_number(v, "--seed", "u64"));
            }
            "--steps" => {
                let v = next_value(&args, &mut i, "--steps", "a count");
                cli.steps_override = Some(parse_number(v, "--steps", "count"));
            }
            "--realtime" => {
                cli.realtime = true;
            }
            "--feed-file" => {
                cli.feed_file = Some(next_value(&args, &mut i, "--feed-file", "a path").to_string());
            }
            "--telemetry-out" => {
                cli.telemetry_out =
                    Some(next_value(&args, &mut i, "--telemetry-out", "a path").to_string());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                let v = next_value(&args, &mut i, "--port", "a u16");
                cli.port = parse_number(v, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Replays a captured feed, one JSON payload per line.
///
/// An unreadable file is treated like a failed transport: the session falls
/// back to simulated mode.
fn replay_feed(session: &mut Session, path: &str) {
    session.set_mode(FeedMode::Live {
        endpoint: path.to_string(),
    });
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            session.on_transport_error(&format!("cannot open \"{path}\": {e}"));
            return;
        }
    };
    session.on_transport_open();

    let (mut accepted, mut dropped) = (0usize, 0usize);
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                session.on_transport_error(&format!("read failed: {e}"));
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if session.ingest_live(&line) {
            accepted += 1;
            println!("{}", session.latest().rounded());
        } else {
            dropped += 1;
        }
    }
    info!(accepted, dropped, "feed replay finished");
}

fn print_summary(session: &Session) {
    println!("\n--- Flows ---");
    for edge in session.flows() {
        println!("{edge}");
    }
    println!("\n{}", session.kpis());
    println!("\n{}", session.report());

    println!("\n--- Self-test ---");
    let results = session.self_test();
    for r in &results {
        let mark = if r.pass { "PASS" } else { "FAIL" };
        println!("[{mark}] {}: {}", r.name, r.message);
    }
    if !all_passed(&results) {
        warn!("self-test reported failures");
    }
}

fn main() {
    let cli = parse_args();
    init_tracing();

    let mut config = if let Some(ref path) = cli.config_path {
        match AppConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        AppConfig::default()
    };

    if let Some(seed) = cli.seed_override {
        config.session.seed = seed;
    }
    if let Some(steps) = cli.steps_override {
        config.driver.steps = steps;
    }
    // a replayed feed file takes the place of the configured endpoint
    if cli.feed_file.is_some() {
        config.session.use_simulated = true;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // align the seeded history to whole minutes
    let now_ms = Utc::now().timestamp_millis();
    let now_ms = now_ms - now_ms.rem_euclid(SIM_STEP_MS);
    let mut session = Session::from_config(&config.session, now_ms);

    if let Some(ref path) = cli.feed_file {
        replay_feed(&mut session, path);
    } else if !session.mode().is_simulated() {
        session.on_transport_error("no live transport available from the command line");
    }

    if session.mode().is_simulated() {
        let interval = if cli.realtime {
            Duration::from_millis(config.driver.tick_interval_ms)
        } else {
            Duration::ZERO
        };
        run_ticks(&mut session, config.driver.steps, interval, |s| {
            println!("{}", s.rounded());
        });
    }

    print_summary(&session);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&session.series().snapshot(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(%path, samples = session.series().len(), "telemetry written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;

        use home_energy_sim::api::{serve, shared};
        use home_energy_sim::sim::driver::spawn_driver;

        session.set_mode(FeedMode::Simulated);
        let state = shared(session);
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let interval = Duration::from_millis(config.driver.tick_interval_ms);
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        let result = rt.block_on(async {
            let driver = spawn_driver(state.clone(), interval);
            let result = serve(state, addr).await;
            driver.abort();
            result
        });
        if let Err(e) = result {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
