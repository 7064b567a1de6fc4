// camp/src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use diamond_trainer::{
    generate_synthetic_examples, load_or_fallback, print_session_summary, print_summary_table,
    fallback_examples, Session, SessionConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Training camp: fit a single neuron to a scouting report and try a challenge.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Session config (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Scouting report (JSON or CSV); overrides the config's dataset
    #[arg(short, long, value_name = "PATH")]
    data: Option<PathBuf>,
    /// Train on N synthetic examples instead of a file
    #[arg(long, value_name = "N", conflicts_with = "data")]
    synthetic: Option<usize>,
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(short, long, value_name = "RATE")]
    learning_rate: Option<f64>,
    /// identity, relu or sigmoid
    #[arg(short, long)]
    activation: Option<String>,
    /// Challenge to attempt: rookie, single-a, double-a, triple-a, major
    #[arg(long, value_name = "ID")]
    challenge: Option<String>,
    /// Print the worked solution for the challenge before training
    #[arg(long, requires = "challenge")]
    solution: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().compact().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => SessionConfig::load_from_file(path)?,
        None => SessionConfig::default(),
    };
    let mut session = Session::from_config(&config).context("applying config")?;
    if let Some(rate) = args.learning_rate {
        session.set_learning_rate(rate)?;
    }
    if let Some(name) = &args.activation {
        session.set_activation(name)?;
    }

    let dataset = match (args.synthetic, args.data.as_ref().or(config.training.dataset.as_ref())) {
        (Some(n), _) => generate_synthetic_examples(n),
        (None, Some(path)) => load_or_fallback(path),
        (None, None) => fallback_examples(),
    };
    info!(examples = dataset.len(), "dataset ready");
    session.set_dataset(dataset)?;

    if let Some(id) = &args.challenge {
        let goal = session.start_challenge(id)?;
        println!("=== {} ===\n{}\n", goal.title, goal.description);
    }
    if args.solution {
        for (i, step) in session.solution().unwrap_or_default().iter().enumerate() {
            println!("{}. {}", i + 1, step);
        }
        println!();
    }

    println!("{}", session.unit());
    let pass = session.forward();
    println!("Forward pass: z = {:.2}, ŷ = {:.2} mph", pass.z, pass.y_hat);

    let epochs = args.epochs.unwrap_or(config.training.epochs);
    let mut losses = Vec::with_capacity(epochs);
    let summary = session.train(epochs, |epoch, total, result| {
        losses.push(result.loss);
        println!(
            "Epoch {}/{}: Loss = {:.6} (b = {:.2}, w1 = {:.2}, w2 = {:.2})",
            epoch, total, result.loss, result.bias, result.w1, result.w2
        );
    })?;
    if summary.cancelled {
        println!("Training stopped after {} epochs", summary.epochs_run);
    }
    print_summary_table(&losses, "Training Loss");

    if session.challenges().active_goal().is_some() {
        if session.evaluate() {
            println!("\nHome run! Challenge completed.");
        } else {
            println!("\nFoul ball. Not quite right yet.");
            if let Some(hint) = session.next_hint() {
                println!("Hint: {}", hint);
            }
        }
    }

    println!();
    print_session_summary(&session);
    Ok(())
}
