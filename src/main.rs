use std::{fs, ops::ControlFlow, path::PathBuf, process::ExitCode};

use clap::Parser;
use pagesim::{
    analysis::{self, Anomaly, RunSummary},
    parse_references, parse_references_lenient, ConfigError, Player, Simulation,
    SimulationConfig, StepRecord,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
mod cli;
use cli::Cli;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pagesim: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Cli) -> Result<(), CliError> {
    let config = load_config(args)?;

    if args.compare {
        let summaries = analysis::compare_algorithms(&config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            print_comparison(&summaries);
        }
        return Ok(());
    }

    if let Some(max_frames) = args.belady {
        let anomalies = analysis::belady_anomalies(&config, 1..=max_frames);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&anomalies)?);
        } else {
            print_anomalies(&config, &anomalies);
        }
        return Ok(());
    }

    let mut simulation = Simulation::new(config);
    match args.speed {
        Some(speed) => {
            Player::new(speed)?.play(&mut simulation, |sim, record| {
                if !args.json {
                    print_step(sim, record);
                }
                ControlFlow::Continue(())
            });
        }
        None => {
            while let Some(record) = simulation.advance() {
                if !args.json {
                    print_step(&simulation, &record);
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&simulation.snapshot())?);
    } else {
        print_statistics(&simulation);
    }
    Ok(())
}

fn load_config(args: &Cli) -> Result<SimulationConfig, CliError> {
    if let Some(path) = &args.config {
        let contents = read(path)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let text = match (&args.refs, &args.file) {
        (Some(refs), _) => refs.clone(),
        (None, Some(path)) => read(path)?,
        // clap requires one of refs, file or config
        (None, None) => String::new(),
    };
    let references = if args.lenient {
        parse_references_lenient(&text, args.pages)
    } else {
        parse_references(&text)?
    };

    Ok(SimulationConfig::new(args.pages, args.frames, references, args.pra)?
        .with_tlb_entries(args.tlb_entries))
}

fn read(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })
}

/* PRINTING */
fn print_step(simulation: &Simulation, record: &StepRecord) {
    let outcome = if record.is_fault() { "FAULT" } else { "HIT  " };
    let reference = simulation.config().reference_sequence()[record.step];
    let frames: Vec<String> = simulation
        .frames()
        .iter()
        .map(|frame| match frame.page_id {
            Some(page) if frame.dirty => format!("{page}*"),
            Some(page) => page.to_string(),
            None => "-".to_string(),
        })
        .collect();

    print!(
        "{:>4}  {:>4}  {}  frame {}  [{}]",
        record.step,
        reference.to_string(),
        outcome,
        record.frame,
        frames.join(" ")
    );
    if let Some(evicted) = record.evicted {
        print!("  evicted {}", evicted);
        if record.write_back {
            print!(" (written back)");
        }
    }
    println!();
}

fn print_statistics(simulation: &Simulation) {
    let steps = simulation.history().len();
    println!("Algorithm = {}", simulation.algorithm());
    println!("Number of References = {}", steps);
    println!("Page Faults = {}", simulation.page_fault_count());
    println!("Page Hits = {}", simulation.page_hit_count());
    println!("Page Fault Rate = {:.3}", simulation.fault_rate());
    println!("Write Backs = {}", simulation.write_back_count());
    if simulation.tlb().is_some() {
        println!("TLB Hits = {}", simulation.tlb_hit_count());
        println!("TLB Misses = {}", simulation.tlb_miss_count());
        if steps > 0 {
            println!(
                "TLB Hit Rate = {:.3}",
                simulation.tlb_hit_count() as f64 / steps as f64
            );
        }
    }
}

fn print_comparison(summaries: &[RunSummary]) {
    println!("{:<5} {:>7} {:>7} {:>11}", "PRA", "Faults", "Hits", "Fault Rate");
    for summary in summaries {
        println!(
            "{:<5} {:>7} {:>7} {:>11.3}",
            summary.algorithm.to_string(),
            summary.faults,
            summary.hits,
            summary.fault_rate
        );
    }
}

fn print_anomalies(config: &SimulationConfig, anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        println!("No Belady's anomaly for {}", config.algorithm());
        return;
    }
    for anomaly in anomalies {
        println!(
            "{}: {} frames -> {} faults, {} frames -> {} faults",
            config.algorithm(),
            anomaly.frames,
            anomaly.faults,
            anomaly.frames + 1,
            anomaly.faults_with_one_more
        );
    }
}
