use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use swarmdrive_shared::{RunOutcome, TrainStatus, DEFAULT_MAX_TICKS, TICK_RATE};
use swarmdrive_sim::{
    drive, train, CancelToken, Controller, FixedController, PsoConfig, Rbfn, RbfnController,
    RunConfig, RunEvent, TrainEvent,
};

mod files;

#[derive(Parser)]
#[command(name = "swarmdrive", about = "PSO-trained RBFN track driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train network parameters against a labeled dataset
    Train {
        /// Training dataset file (whitespace-separated, target angle last)
        #[arg(long)]
        data: PathBuf,

        #[arg(long, default_value_t = 300)]
        iterations: usize,

        #[arg(long, default_value_t = 100)]
        population: usize,

        #[arg(long, default_value_t = 6)]
        neurons: usize,

        /// Maximum spread drawn at initialization
        #[arg(long, default_value_t = 10.0)]
        sd_max: f64,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Evaluate fitness on a single core
        #[arg(long)]
        sequential: bool,

        /// Write the trained parameters as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Drive a map with a trained network (or a fixed wheel angle)
    Drive {
        /// Map file (comma-separated: start, goal corners, wall points)
        #[arg(long)]
        map: PathBuf,

        /// Trained parameters JSON produced by `train`
        #[arg(long)]
        network: Option<PathBuf>,

        /// Hold this wheel angle instead of using a network
        #[arg(long)]
        fixed: Option<f64>,

        /// Pace the run to the tick rate instead of running flat out
        #[arg(long)]
        realtime: bool,

        #[arg(long, default_value_t = TICK_RATE)]
        fps: u32,

        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u32,

        /// Write the trajectory record as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            iterations,
            population,
            neurons,
            sd_max,
            seed,
            sequential,
            output,
        } => cmd_train(
            &data, iterations, population, neurons, sd_max, seed, sequential, output,
        ),

        Commands::Drive {
            map,
            network,
            fixed,
            realtime,
            fps,
            max_ticks,
            output,
        } => cmd_drive(&map, network, fixed, realtime, fps, max_ticks, output),
    }
}

fn cmd_train(
    data: &Path,
    iterations: usize,
    population: usize,
    neurons: usize,
    sd_max: f64,
    seed: u64,
    sequential: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let examples = files::load_dataset(data)?;
    info!("loaded {} examples from {}", examples.len(), data.display());

    let config = PsoConfig {
        iterations,
        population,
        nneuron: neurons,
        sd_max,
        seed,
        parallel: !sequential,
        ..PsoConfig::default()
    };

    println!(
        "Training: {} examples | {} particles | {} iterations | {} neurons (seed={})",
        examples.len(),
        config.population,
        config.iterations,
        config.nneuron,
        config.seed,
    );

    let start = std::time::Instant::now();
    let report_every = (iterations / 20).max(1);
    let mut sink = |event: TrainEvent| {
        if let TrainEvent::Iteration(stats) = event {
            if (stats.iteration + 1) % report_every == 0 || stats.iteration == 0 {
                println!(
                    "  iter {:>5}  best {:.7}  avg {:.7}  min {:.7}",
                    stats.iteration + 1,
                    stats.best_fitness,
                    stats.avg_fitness,
                    stats.min_fitness,
                );
            }
        }
    };

    let outcome = train(&config, &examples, &mut sink, &CancelToken::new())?;

    println!();
    println!("=== Training Result ===");
    println!("Status:      {:?}", outcome.status);
    println!("Iterations:  {}", outcome.iterations_run);
    println!("Best MSE:    {:.7}", outcome.best_fitness);
    println!("Elapsed:     {:.1}s", start.elapsed().as_secs_f32());
    if outcome.status == TrainStatus::Stopped {
        println!("Note: training stopped before the full iteration budget.");
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&outcome.parameters)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing parameters to {}", path.display()))?;
        println!("Parameters written to {}", path.display());
    }

    Ok(())
}

fn cmd_drive(
    map_path: &Path,
    network: Option<PathBuf>,
    fixed: Option<f64>,
    realtime: bool,
    fps: u32,
    max_ticks: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let map = files::load_map(map_path)?;
    info!(
        "loaded map {} with {} walls",
        map_path.display(),
        map.walls.len()
    );

    let mut controller: Box<dyn Controller> = match (network, fixed) {
        (Some(path), None) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading parameters {}", path.display()))?;
            let params = serde_json::from_str(&json)
                .with_context(|| format!("parsing parameters {}", path.display()))?;
            let net = Rbfn::new(params)
                .with_context(|| format!("invalid parameters in {}", path.display()))?;
            Box::new(RbfnController::new(net))
        }
        (None, Some(angle)) => Box::new(FixedController::new(angle)),
        (None, None) => Box::new(FixedController::straight()),
        (Some(_), Some(_)) => anyhow::bail!("--network and --fixed are mutually exclusive"),
    };

    let config = RunConfig {
        fps,
        realtime,
        max_ticks,
    };

    println!(
        "Driving {} with the {} controller",
        map_path.display(),
        controller.name()
    );

    let mut sink = |event: RunEvent| {
        if matches!(event, RunEvent::Collided) {
            println!("  collision");
        }
    };
    let record = drive(
        &config,
        &map,
        controller.as_mut(),
        &mut sink,
        &CancelToken::new(),
    );

    println!();
    println!("=== Run Result ===");
    println!("Outcome: {:?}", record.outcome);
    println!(
        "Ticks:   {} ({:.1}s simulated)",
        record.ticks,
        record.ticks as f64 / fps.max(1) as f64
    );
    if let Some(last) = record.trajectory.last() {
        println!(
            "Final:   ({:.2}, {:.2})  wheel {:.2} deg",
            last.position.x, last.position.y, last.wheel_angle
        );
    }
    match record.outcome {
        RunOutcome::Arrived => println!("The car reached the goal area."),
        RunOutcome::Collided => println!("The car hit a wall."),
        RunOutcome::Aborted => println!("The run stopped before reaching a goal or wall."),
        RunOutcome::SensorError => println!("A radar reading was not a finite number."),
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing trajectory to {}", path.display()))?;
        println!("Trajectory written to {}", path.display());
    }

    Ok(())
}
