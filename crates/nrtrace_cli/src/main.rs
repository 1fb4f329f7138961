//! NRTRACE CLI
//!
//! Forensic interpreter for nros tracer output: pick one replay engine,
//! point it at a trace file, read the report.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod samples;
mod sink;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use nrtrace_core::TaskId;
use nrtrace_log::TraceStream;
use nrtrace_replay::{
    replay, AllocReplay, MemoryReplay, MethodCoverage, ReplayEngine, ReportSink, TaskFilter,
    UnfinishedTasks,
};
use sink::ConsoleSink;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nrtrace")]
#[command(about = "Interpret execution traces emitted by the nros tracer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the shared memory budget and verify embedded totals
    TotalMem {
        /// Path to the trace file
        file: PathBuf,
    },
    /// Report tasks that never completed
    UnfinishedTasks {
        /// Path to the trace file
        file: PathBuf,
    },
    /// Count how often each traced method appears
    MethodsCoverage {
        /// Path to the trace file
        file: PathBuf,
    },
    /// Show one task's events, indented by call depth
    FilterTask {
        /// Path to the trace file
        file: PathBuf,
        /// Task id to keep
        task: u64,
    },
    /// Replay the block allocator and cross-check frees
    ReplayAlloc {
        /// Path to the trace file
        file: PathBuf,
    },
    /// Extract the active-memory series from an allocator sample dump
    PlotAlloc {
        /// Path to the sample dump
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut sink = ConsoleSink::new();

    match cli.command {
        Commands::TotalMem { file } => run_engine(&file, &mut MemoryReplay::new(), &mut sink),
        Commands::UnfinishedTasks { file } => {
            run_engine(&file, &mut UnfinishedTasks::new(), &mut sink)
        }
        Commands::MethodsCoverage { file } => {
            run_engine(&file, &mut MethodCoverage::new(), &mut sink)
        }
        Commands::FilterTask { file, task } => {
            run_engine(&file, &mut TaskFilter::new(TaskId::from_raw(task)), &mut sink)
        }
        Commands::ReplayAlloc { file } => run_engine(&file, &mut AllocReplay::new(), &mut sink),
        Commands::PlotAlloc { file } => {
            let text = fs::read_to_string(&file)?;
            samples::emit_active_series(&text, &mut sink);
            Ok(())
        }
    }
}

/// Read the whole trace, then make one pass with the chosen engine.
fn run_engine(
    file: &Path,
    engine: &mut dyn ReplayEngine,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    let text = fs::read_to_string(file)?;
    tracing::debug!(file = %file.display(), bytes = text.len(), "trace loaded");
    replay(TraceStream::new(&text), engine, sink)?;
    Ok(())
}
