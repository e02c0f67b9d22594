//! Fleet generator smoke binary.
//!
//! Drives `fleetgen` for a single truck, a single truck-day, or a fixed
//! 10-truck x 1-day validation checkpoint, writing JSON Lines rows and the
//! sidecar files described in `SPEC_FULL.md` §6.4. Not the production
//! columnar data writer — that, and the full fleet run, are external to
//! this crate.
//!
//! # Usage
//! ```bash
//! ./generate --trucks 10 --days 1 --seed 42 --output-dir ./output --validation-checkpoint
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleetgen::config::GeneratorConfig;
use fleetgen::error::GenError;
use fleetgen::storage::{maintenance_log, splits, thermal_store, write_frame_atomically};
use fleetgen::types::TruckRuntimeState;
use fleetgen::validate::{validate_class_distribution, ClassCounts};
use fleetgen::{fleet, orchestrator};

const EXIT_SUCCESS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_VALIDATION_FAILURE: u8 = 3;
const EXIT_OTHER_ERROR: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "fleetgen")]
#[command(about = "Deterministic predictive-maintenance fleet data generator")]
#[command(version)]
struct Args {
    /// Fleet size
    #[arg(long)]
    trucks: Option<u32>,

    /// Simulation horizon in days
    #[arg(long)]
    days: Option<u32>,

    /// Master seed
    #[arg(long, env = "FLEETGEN_SEED")]
    seed: Option<u64>,

    /// Output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Worker count (informational for this smoke binary; generation here runs single-threaded)
    #[arg(long)]
    workers: Option<usize>,

    /// Skip truck-days whose output already exists
    #[arg(long)]
    skip_existing: bool,

    /// Generate only this truck id
    #[arg(long)]
    single_truck: Option<u32>,

    /// Generate only this day index
    #[arg(long)]
    single_day: Option<u32>,

    /// Run the fixed 10-truck x 1-day validation checkpoint
    #[arg(long)]
    validation_checkpoint: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!(error = %err, "generation failed");
            ExitCode::from(EXIT_OTHER_ERROR)
        }
    }
}

fn run() -> Result<u8, GenError> {
    let args = Args::parse();

    let mut config = match GeneratorConfig::load() {
        Ok(c) => c,
        Err(err) => {
            error!(error = %err, "config error");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    if let Some(trucks) = args.trucks {
        config.trucks = trucks;
    }
    if let Some(days) = args.days {
        config.days = days;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.skip_existing = config.skip_existing || args.skip_existing;
    config.single_truck = args.single_truck.or(config.single_truck);
    config.single_day = args.single_day.or(config.single_day);
    config.validation_checkpoint = config.validation_checkpoint || args.validation_checkpoint;

    if config.validation_checkpoint {
        config.trucks = 10;
        config.days = 1;
    }

    if let Err(err) = config.validate() {
        error!(error = %err, "invalid configuration");
        return Ok(EXIT_CONFIG_ERROR);
    }

    let sim_hours = f64::from(config.days) * 24.0;
    let fleet = match fleet::build_fleet(config.seed, config.trucks, sim_hours) {
        Ok(f) => f,
        Err(err) => {
            error!(error = %err, "fleet factory failed");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let split_trucks: Vec<_> = fleet
        .iter()
        .filter(|t| match config.single_truck {
            Some(id) => id == t.truck_id,
            None => true,
        })
        .collect();
    if split_trucks.is_empty() {
        warn!(single_truck = ?config.single_truck, "no matching truck for requested single_truck");
    }

    let mut class_counts = ClassCounts::default();

    for truck in &split_trucks {
        let mut state = TruckRuntimeState::new(truck.initial_faults.clone());
        let mut log = maintenance_log::load(&config.output_dir, truck.truck_id);

        let day_range: Vec<u32> = match config.single_day {
            Some(d) => vec![d],
            None => (0..config.days).collect(),
        };

        for day_index in day_range {
            if config.skip_existing
                && fleetgen::storage::already_has_output(&config.output_dir, truck.truck_id, day_index)
            {
                info!(truck_id = truck.truck_id, day_index, "skipping existing output");
                continue;
            }

            let thermal_start = thermal_store::load_or_idle_baseline(&config.output_dir, truck, day_index);

            let output = orchestrator::run_truck_day(truck, day_index, &mut state, thermal_start, sim_hours)?;

            if !output.rows.is_empty() {
                let lines: Vec<String> = output
                    .rows
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<_, _>>()?;
                write_frame_atomically(&config.output_dir, truck.truck_id, day_index, &lines)?;

                for row in &output.rows {
                    class_counts.record(&row.labels.path_a_label);
                }
            }

            let thermal_state = fleetgen::types::ThermalState::from_array(
                truck.truck_id,
                day_index,
                (day_index as i64) * 86_400,
                output.end_of_day_thermal,
            );
            thermal_store::save(&config.output_dir, &thermal_state)?;

            log.entries.extend(output.maintenance_entries);
        }

        if config.single_day.is_none() {
            let unresolved_codes: Vec<&str> = state.active_faults.iter().map(|f| f.mode.code()).collect();
            maintenance_log::finalize_unresolved(&mut log, &unresolved_codes, config.days - 1);
        }
        maintenance_log::save(&config.output_dir, truck.truck_id, &log)?;
    }

    if config.single_truck.is_none() && config.single_day.is_none() {
        if let Ok(computed_splits) = splits::build_splits(&fleet, config.train_count, config.val_count, config.test_count) {
            splits::save(&config.output_dir, &computed_splits)?;
        }
    }

    if !config.validation_checkpoint && config.single_truck.is_none() && config.single_day.is_none() {
        if let Err(err) = validate_class_distribution(&class_counts) {
            error!(error = %err, "class distribution out of bounds");
            return Ok(EXIT_VALIDATION_FAILURE);
        }
    }

    info!(trucks = split_trucks.len(), "generation complete");
    Ok(EXIT_SUCCESS)
}
