use anyhow::{bail, Result};
use japa_counter::audio::{InputDevice, SpeechActivityDetector};
use japa_counter::config::AppConfig;
use japa_counter::counter::SessionTally;
use japa_counter::telemetry;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(&config);

    if config.list_input_devices {
        return list_input_devices();
    }

    run_session(&config)
}

fn list_input_devices() -> Result<()> {
    match InputDevice::list() {
        Ok(names) if names.is_empty() => println!("no input devices detected"),
        Ok(names) => {
            println!("available input devices:");
            for name in names {
                println!("  {name}");
            }
        }
        Err(err) => println!("unable to enumerate input devices: {err:#}"),
    }
    Ok(())
}

fn run_session(config: &AppConfig) -> Result<()> {
    let tally = SessionTally::new();
    let on_started = tally.clone();
    let on_completed = tally.clone();

    let mut detector = SpeechActivityDetector::new(
        move || on_started.record_started(),
        move || {
            on_completed.record_completed();
            println!("mantra {}", on_completed.repetitions());
        },
        config.listener_config(),
    );

    if !detector.start() {
        bail!("could not start speech detection; check microphone permissions and device availability");
    }
    println!("listening (calibrating background noise)... press Ctrl-C to quit");

    let session_start = Instant::now();
    loop {
        std::thread::sleep(Duration::from_millis(200));
        if let Some(target) = config.target {
            if tally.repetitions() >= target {
                println!("target of {target} repetitions reached");
                break;
            }
        }
        if let Some(secs) = config.session_secs {
            if session_start.elapsed() >= Duration::from_secs(secs) {
                break;
            }
        }
    }

    detector.stop();
    let summary = tally.summary(session_start.elapsed());
    if config.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "session complete: {} repetitions in {:.0}s",
            summary.repetitions, summary.session_secs
        );
    }
    Ok(())
}
