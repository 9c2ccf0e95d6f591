#[macro_use]
extern crate tracing;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::Parser;
use motoscroll::cli::{Cli, Sub};
use motoscroll::parameters::Parameters;
use motoscroll::pointing_motion::PointingMotion;
use motoscroll::replay::{self, MotionRecord};
use motoscroll::utils::{print_json_line, version};
use motoscroll_config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    if env::var_os("RUST_BACKTRACE").is_none() {
        env::set_var("RUST_BACKTRACE", "1");
    }

    // Stdout carries the JSON output.
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| "motoscroll=debug,info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    debug!("starting version {}", &version());

    let path = cli
        .config
        .or_else(|| env::var_os("MOTOSCROLL_CONFIG").map(PathBuf::from));
    let config = match Config::load_or_default(path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{:?}", err.context("error loading config"));
            process::exit(1);
        }
    };

    let parameters = Parameters::from_config(&config.motion_to_scroll)
        .context("invalid motion-to-scroll settings")?;

    match cli.subcommand {
        Sub::Validate => {
            info!("config is valid");
        }
        Sub::Replay { input, expected } => {
            let records = replay::load_records(&input)?;
            let events = replay::replay(&records, parameters)?;
            for event in &events {
                print_json_line(event)?;
            }

            if let Some(expected) = expected {
                let expected = replay::load_motions(&expected)
                    .context("error loading expected scroll events")?;
                check_events(&events, &expected)?;
                info!("output matches the {} expected scroll events", expected.len());
            }
        }
        Sub::Play { input } => {
            let records = replay::load_records(&input)?;
            replay::play(&records, parameters, |event, time| {
                if let Err(err) = print_json_line(&MotionRecord::new(time, event)) {
                    warn!("error printing scroll event: {err:?}");
                }
            })?;
        }
    }

    Ok(())
}

fn check_events(actual: &[PointingMotion], expected: &[PointingMotion]) -> anyhow::Result<()> {
    if let Some(idx) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        bail!(
            "scroll event {idx} differs: got {:?}, expected {:?}",
            actual[idx],
            expected[idx]
        );
    }

    if actual.len() != expected.len() {
        bail!(
            "got {} scroll events, expected {}",
            actual.len(),
            expected.len()
        );
    }

    Ok(())
}
