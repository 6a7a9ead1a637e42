//! Tinct CLI
//!
//! - `tinct demo`: select themes through the simulated theme API and show
//!   the resulting style tokens
//! - `tinct bench`: compare store-context and CSS-token propagation latency

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tinct_bench::{
    format_time, BenchmarkHarness, BenchmarkReport, BenchmarkTracker, StatsPoller, Strategy,
};
use tinct_theme::{
    LoadOutcome, StyleDocument, Theme, ThemeLoader, ThemePreset, ThemeStore, TokenWriter,
    THEME_ATTRIBUTE, THEME_STYLE_ID,
};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use crate::config::TinctConfig;

/// Runtime theme engine demo and propagation benchmark
#[derive(Parser, Debug)]
#[command(name = "tinct")]
#[command(about = "Runtime theme engine demo and propagation benchmark")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./tinct.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and apply themes by name
    Demo {
        /// Theme to select; repeat for several. Defaults to every preset.
        #[arg(short, long = "theme")]
        themes: Vec<String>,

        /// Issue all selections at once instead of one after another
        #[arg(long)]
        concurrent: bool,

        /// Reset to the default theme at the end
        #[arg(long)]
        reset: bool,
    },

    /// Benchmark store-context against CSS-token propagation
    Bench {
        /// Rapid random changes for the configured duration
        #[arg(long)]
        stress: bool,

        /// Write a JSON report to this relative path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = TinctConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo {
            themes,
            concurrent,
            reset,
        } => run_demo(&config, themes, concurrent, reset).await,
        Commands::Bench { stress, report } => run_bench(&config, stress, report).await,
    }
}

fn mount(config: &TinctConfig) -> Result<(ThemeStore, StyleDocument)> {
    let document = StyleDocument::new();
    let store = ThemeStore::with_default(
        TokenWriter::attached(document.clone()),
        config.default_theme()?,
    );
    Ok((store, document))
}

fn describe(theme: &Theme) -> String {
    format!(
        "primary {} secondary {} background {} text {}",
        theme.primary_color, theme.secondary_color, theme.background_color, theme.text_color
    )
}

async fn run_demo(
    config: &TinctConfig,
    themes: Vec<String>,
    concurrent: bool,
    reset: bool,
) -> Result<()> {
    let (store, document) = mount(config)?;

    store.subscribe_transition(|state| {
        if state.is_loading && !state.pending_theme_name.is_empty() {
            tracing::info!("Loading {} theme...", state.pending_theme_name);
        }
    });
    store.subscribe(|theme| tracing::info!("Theme published: {}", describe(theme)));

    let names = if themes.is_empty() {
        ThemePreset::all().iter().map(|p| p.id().to_string()).collect()
    } else {
        themes
    };

    let loader = Arc::new(
        ThemeLoader::new(store.clone(), Arc::new(config.fetch.api())).with_order(config.fetch.order),
    );

    let outcomes: Vec<(String, LoadOutcome)> = if concurrent {
        let tasks: Vec<_> = names
            .into_iter()
            .map(|name| {
                let loader = loader.clone();
                tokio::spawn(async move {
                    let outcome = loader.select_theme(&name).await;
                    (name, outcome)
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            outcomes.push(task.await?);
        }
        outcomes
    } else {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let outcome = loader.select_theme(&name).await;
            outcomes.push((name, outcome));
        }
        outcomes
    };

    for (name, outcome) in &outcomes {
        match outcome {
            LoadOutcome::Applied(_) => println!("{name}: applied"),
            LoadOutcome::Superseded => println!("{name}: superseded"),
            LoadOutcome::Failed(err) => println!("{name}: failed ({err})"),
        }
    }

    if reset {
        store.remove_theme()?;
    }

    if let Some(theme) = store.theme() {
        println!("\nActive theme ({:?}): {}", store.mode(), describe(&theme));
    }
    println!(
        "{}={}",
        THEME_ATTRIBUTE,
        document.root_attribute(THEME_ATTRIBUTE).unwrap_or_default()
    );
    if let Some(node) = document.get_element_by_id(THEME_STYLE_ID) {
        println!("#{}\n{}", node.id(), node.text());
    }
    Ok(())
}

async fn run_bench(config: &TinctConfig, stress: bool, report_path: Option<PathBuf>) -> Result<()> {
    let (store, _document) = mount(config)?;
    let tracker = BenchmarkTracker::default();

    let (harness, handle) = BenchmarkHarness::new(store, tracker.clone());
    let handle = match config.bench.seed {
        Some(seed) => handle.seeded(seed),
        None => handle,
    };
    let runner = tokio::spawn(harness.run());

    let (stop_poller, poller_shutdown) = oneshot::channel();
    let poller = StatsPoller::new(tracker.clone(), config.bench.poll_interval());
    let polling = tokio::spawn(poller.run(poller_shutdown, |stats| {
        tracing::info!(
            "context {} ({} renders) | tokens {} ({} renders)",
            format_time(stats.context.avg_render_time),
            stats.context.total_renders,
            format_time(stats.tokens.avg_render_time),
            stats.tokens.total_renders
        );
    }));

    tracker.start_benchmark();
    if stress {
        let stress = config.bench.stress();
        tracing::info!(
            "Stress test: a change every {:?} for {:?}",
            stress.interval,
            stress.duration
        );
        handle.stress_test(stress).await;
    } else {
        for _ in 0..config.bench.samples {
            handle.single_test();
        }
    }
    handle.stop();
    let applied = runner.await?;
    tracker.end_benchmark();

    let _ = stop_poller.send(());
    polling.await?;

    let report = BenchmarkReport::from_tracker(&tracker, applied);
    println!(
        "{:<14} {:>10} {:>10} {:>10} {:>8}",
        "strategy", "avg", "p50", "p99", "renders"
    );
    for strategy in Strategy::ALL {
        let stats = report.stats.get(strategy);
        println!(
            "{:<14} {:>10} {:>10} {:>10} {:>8}",
            strategy.display_name(),
            format_time(stats.avg_render_time),
            format_time(stats.p50_render_time),
            format_time(stats.p99_render_time),
            stats.total_renders
        );
    }
    println!("\n{} theme changes, {}", applied, report.summary());

    if let Some(path) = report_path {
        report.write_to_path(&path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
