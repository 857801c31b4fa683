use anyhow::{Context, Result};
use evbms_lib::simulation::{LoggingActuators, RandomPack, Scenario};
use evbms_lib::{Bms, CycleReport};
use log::{info, warn};
use serde_json::json;
use std::time::Duration;

use crate::commandline::OutputFormat;

fn emit(report: &CycleReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Console => println!("{report}"),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(report)
                .with_context(|| format!("Cannot serialize cycle {}", report.cycle))?;
            if let serde_json::Value::Object(map) = &mut value {
                map.insert(
                    "timestamp".to_string(),
                    json!(chrono::Utc::now().to_rfc3339()),
                );
            }
            println!("{value}");
        }
    }
    Ok(())
}

fn pause(interval: Duration) {
    if !interval.is_zero() {
        std::thread::sleep(interval);
    }
}

pub fn simulate(
    seed: Option<u64>,
    cycles: Option<u64>,
    initialize: bool,
    interval: Duration,
    format: OutputFormat,
) -> Result<()> {
    info!("Starting simulation: seed={seed:?}, cycles={cycles:?}, interval={interval:?}");
    let mut pack = match seed {
        Some(seed) => RandomPack::with_seed(seed),
        None => RandomPack::new(),
    };
    let mut actuators = LoggingActuators::default();
    let mut bms = Bms::default();
    if initialize {
        bms.initialize(&mut pack);
    }

    let mut remaining = cycles;
    while remaining != Some(0) {
        let report = bms.cycle(&mut pack, &mut actuators);
        emit(&report, format)?;
        remaining = remaining.map(|n| n - 1);
        pause(interval);
    }
    Ok(())
}

pub fn replay(path: &str, interval: Duration, format: OutputFormat) -> Result<()> {
    let scenario =
        Scenario::load(path).with_context(|| format!("Cannot load scenario '{path}'"))?;
    let frames = scenario
        .frames()
        .with_context(|| format!("Invalid scenario '{path}'"))?;
    let interval = scenario.interval.unwrap_or(interval);
    info!(
        "Replaying {} cycles from {path}, interval={interval:?}",
        frames.len()
    );
    if frames.is_empty() {
        warn!("Scenario '{path}' has no steps");
    }

    let mut bms = match scenario.initial_state {
        Some(raw) => Bms::restore(scenario.capacity_full, raw),
        None => Bms::new(scenario.capacity_full),
    };
    let mut actuators = LoggingActuators::default();
    if scenario.initialize {
        if let Some(first) = frames.first() {
            bms.initialize(&mut first.clone());
        }
    }

    for mut frame in frames {
        let report = bms.cycle(&mut frame, &mut actuators);
        emit(&report, format)?;
        pause(interval);
    }
    Ok(())
}
