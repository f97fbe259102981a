// jobsettings CLI - inspect, merge and transcode job settings documents

mod commands;
mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobsettings_config::WireVersion;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "jobsettings")]
#[command(about = "Validate, merge and transcode tri-state job settings")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a settings document, print it normalized
    #[command(after_help = "\
Examples:
  jobsettings check settings.json
  echo '{\"max_page_search_size\": 500}' | jobsettings check -
  jobsettings check stored.json --lenient --limits limits.toml")]
    Check {
        /// Settings JSON file (- for stdin)
        input: PathBuf,

        /// Ignore unknown keys instead of failing
        #[arg(long)]
        lenient: bool,

        /// Limits file (TOML); defaults to the user config directory
        #[arg(long, value_name = "PATH")]
        limits: Option<PathBuf>,
    },

    /// Apply a partial update to a base document, print the result
    #[command(after_help = "\
In the update, an absent key leaves the base value alone, null clears it,
and a value replaces it.

Examples:
  jobsettings merge current.json update.json")]
    Merge {
        /// Base settings JSON file
        base: PathBuf,

        /// Partial update JSON file (- for stdin)
        update: PathBuf,

        /// Ignore unknown keys instead of failing
        #[arg(long)]
        lenient: bool,

        /// Limits file (TOML); defaults to the user config directory
        #[arg(long, value_name = "PATH")]
        limits: Option<PathBuf>,
    },

    /// Encode a settings document to the binary wire form (base64)
    Encode {
        /// Settings JSON file (- for stdin)
        input: PathBuf,

        /// Wire version of the receiving peer (capped at this build's version)
        #[arg(long, default_value_t = WireVersion::CURRENT)]
        wire_version: WireVersion,

        /// Ignore unknown keys instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Decode a base64 wire payload and show each field's state
    Decode {
        /// Base64 payload
        payload: String,

        /// Wire version of the sending peer
        #[arg(long, default_value_t = WireVersion::CURRENT)]
        wire_version: WireVersion,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("JOBSETTINGS_COMMIT"),
        ")",
        "\ntarget:  ",
        env!("JOBSETTINGS_TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Check { input, lenient, limits } => {
            commands::check(input, *lenient, limits.as_deref())
        }
        Commands::Merge { base, update, lenient, limits } => {
            commands::merge(base, update, *lenient, limits.as_deref())
        }
        Commands::Encode { input, wire_version, lenient } => {
            commands::encode(input, *wire_version, *lenient)
        }
        Commands::Decode { payload, wire_version } => commands::decode(payload, *wire_version),
    };

    match result {
        Ok(out) => {
            if let Err(e) = writeln!(io::stdout(), "{out}") {
                eprintln!("error: {e}");
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
