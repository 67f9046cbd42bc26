use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use swiftcr_lib::distance::brute_force_edges;
use swiftcr_lib::edges::canonical_edge_cmp;
use swiftcr_lib::{
    DistanceModel, EngineConfig, IdentityMode, InvalidInputPolicy, LinkEngine, LinkResult,
};
use tracing::{info, warn};

mod input;
mod output;

use input::parse_sequences_file;

/// Corpus size above which `check` warns about the quadratic comparison
const CHECK_WARN_SIZE: usize = 20_000;

#[derive(Parser)]
#[command(name = "swiftcr")]
#[command(version = "0.1.0")]
#[command(about = "SwiftCR: find all sequence pairs one edit apart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args)]
struct EngineArgs {
    /// Input file (FASTA/FASTQ, TSV/CSV with --column, or one sequence per line)
    #[arg(short, long)]
    input: String,

    /// Distance model: hamming, levenshtein or damerau
    #[arg(short, long, default_value = "levenshtein")]
    model: String,

    /// Column holding the sequences in a TSV/CSV table (e.g. aaSeqCDR3)
    #[arg(short, long)]
    column: Option<String>,

    /// Treat every input line as its own node, duplicates included
    #[arg(long, default_value = "false")]
    occurrences: bool,

    /// Fail on the first invalid sequence instead of skipping it
    #[arg(long, default_value = "false")]
    strict: bool,

    /// Number of threads (0 = all available cores)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every distance-one pair as CSV
    Edges {
        #[command(flatten)]
        engine: EngineArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write the clusters of linked sequences as CSV
    Clusters {
        #[command(flatten)]
        engine: EngineArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compare the engine against exhaustive pairwise comparison
    Check {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info.
    // Logs go to stderr so CSV on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Edges { engine, output } => {
            edges_command(engine, output)?;
        }
        Commands::Clusters { engine, output } => {
            clusters_command(engine, output)?;
        }
        Commands::Check { engine } => {
            check_command(engine)?;
        }
    }

    Ok(())
}

impl EngineArgs {
    fn to_config(&self) -> anyhow::Result<EngineConfig> {
        let model: DistanceModel = self.model.parse()?;
        let mut config = EngineConfig::new(model);
        config.identity = if self.occurrences {
            IdentityMode::Occurrence
        } else {
            IdentityMode::Distinct
        };
        config.invalid_input = if self.strict {
            InvalidInputPolicy::Reject
        } else {
            InvalidInputPolicy::Skip
        };
        config.num_threads = self.threads;
        config.verbose = self.verbose;
        Ok(config)
    }

    /// Read the input and run the engine over it
    fn run(&self) -> anyhow::Result<LinkResult> {
        let config = self.to_config()?;
        info!("Linking sequences...");
        info!("  Input: {}", self.input);
        info!("  Model: {}", config.model);

        let sequences = parse_sequences_file(&self.input, self.column.as_deref())?;
        info!("  Loaded {} sequences", sequences.len());

        let engine = LinkEngine::new(config)?;
        Ok(engine.run(&sequences)?)
    }
}

/// Open `--output` or fall back to stdout
fn open_output(output: Option<&str>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

/// Find all edges and write them as CSV
fn edges_command(args: EngineArgs, output_path: Option<String>) -> anyhow::Result<()> {
    let result = args.run()?;
    let clustering = result.clusters();

    let mut out = open_output(output_path.as_deref())?;
    output::write_edges(&mut out, &result, &clustering)?;
    out.flush()?;

    info!(
        "Wrote {} edges ({} clusters)",
        result.edges().len(),
        clustering.len()
    );
    Ok(())
}

/// Find all clusters and write them as CSV
fn clusters_command(args: EngineArgs, output_path: Option<String>) -> anyhow::Result<()> {
    let result = args.run()?;
    let clustering = result.clusters();

    let mut out = open_output(output_path.as_deref())?;
    output::write_clusters(&mut out, &result, &clustering)?;
    out.flush()?;

    info!(
        "Wrote {} clusters covering {} sequences (largest {})",
        clustering.len(),
        clustering.num_clustered(),
        clustering.max_cluster_size()
    );
    Ok(())
}

/// Check engine output against brute force
fn check_command(args: EngineArgs) -> anyhow::Result<()> {
    let result = args.run()?;
    let set = result.sequences();
    if set.len() > CHECK_WARN_SIZE {
        warn!(
            "Brute-force comparison over {} sequences is quadratic and may take a while",
            set.len()
        );
    }

    info!("Running brute-force comparison...");
    let expected = brute_force_edges(set, result.model());

    let mut errors = Vec::new();
    let mut missing = 0usize;
    let mut extra = 0usize;
    let mut mismatched = 0usize;
    let (mut i, mut j) = (0, 0);
    let found = result.edges();
    while i < found.len() || j < expected.len() {
        let order = match (found.get(i), expected.get(j)) {
            (Some(f), Some(e)) => canonical_edge_cmp(set, f, e),
            (Some(_), None) => Ordering::Less,
            (None, _) => Ordering::Greater,
        };
        match order {
            Ordering::Less => {
                extra += 1;
                errors.push(format!("extra edge {:?}", found[i].view(set)));
                i += 1;
            }
            Ordering::Greater => {
                missing += 1;
                errors.push(format!("missing edge {:?}", expected[j].view(set)));
                j += 1;
            }
            Ordering::Equal => {
                if found[i] != expected[j] {
                    mismatched += 1;
                    errors.push(format!(
                        "edge {:?} should be {:?}",
                        found[i].view(set),
                        expected[j].view(set)
                    ));
                }
                i += 1;
                j += 1;
            }
        }
    }

    println!("\n=== Check Results ===");
    println!("  Model: {}", result.model());
    println!("  Sequences: {}", set.len());
    println!("  Engine edges: {}", found.len());
    println!("  Brute-force edges: {}", expected.len());
    println!("  Missing: {}", missing);
    println!("  Extra: {}", extra);
    println!("  Mismatched: {}", mismatched);

    if !errors.is_empty() {
        println!("\n✗ CORRECTNESS CHECK FAILED!");
        println!("\nFirst {} problems:", errors.len().min(10));
        for err in errors.iter().take(10) {
            println!("  {}", err);
        }
        std::process::exit(1);
    } else {
        println!("\n✓ CORRECTNESS CHECK PASSED!");
        println!("  Engine edges match exhaustive pairwise comparison");
    }

    Ok(())
}
