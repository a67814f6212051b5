use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use seqsim_search::Config;

mod commands;
mod fasta;

#[derive(Debug, Parser)]
#[command(name = "seqsim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the reference corpus (default: ~/.local/share/seqsim/corpus.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the scaler artifact (default: ~/.local/share/seqsim/scaler.json)
    #[arg(long, global = true)]
    scaler: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Find reference proteins similar to a sequence
    ///
    /// The query is reduced to 27 composition features (log length, amino
    /// acid fractions and physicochemical group fractions), standardized with
    /// the scaler artifact, and compared by Euclidean distance against the
    /// reference corpus.
    ///
    /// Non-residue symbols (whitespace, gaps, stop codons, ambiguity codes)
    /// are removed before searching. The cleaned sequence must be at least
    /// `min_sequence_length` residues long.
    ///
    /// Modes:
    /// - fast (default): only entries whose length is within 80%..120% of the
    ///   query are ranked
    /// - --exhaustive: the first `exhaustive_scan_limit` entries are ranked
    ///   regardless of length
    ///
    /// With --fasta every record is searched concurrently and reported in
    /// file order. Records that fail on their own (too short, no match) are
    /// reported and the batch continues.
    Predict {
        /// Protein sequence (one-letter codes)
        #[arg(required_unless_present = "fasta", conflicts_with = "fasta")]
        sequence: Option<String>,

        /// Read queries from a FASTA file
        #[arg(long)]
        fasta: Option<PathBuf>,

        /// Number of matches to report (default: top_n from config)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Rank candidates of any length
        #[arg(long)]
        exhaustive: bool,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the composition features of a sequence
    Features {
        /// Protein sequence (one-letter codes)
        sequence: String,

        /// Also print the standardized values
        #[arg(long)]
        scaled: bool,
    },
    /// Show corpus and scaler status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(db) = cli.db {
        config = config.with_database_path(db);
    }
    if let Some(scaler) = cli.scaler {
        config = config.with_scaler_path(scaler);
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or(&config.log_level));

    match cli.command {
        Commands::Predict {
            sequence,
            fasta,
            top_n,
            exhaustive,
            json,
        } => {
            let args = commands::PredictArgs {
                sequence,
                fasta,
                top_n,
                exhaustive,
                json,
            };
            commands::run_predict(&config, args).await?;
        }
        Commands::Features { sequence, scaled } => {
            commands::show_features(&config, &sequence, scaled)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
