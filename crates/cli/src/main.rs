// mbrand - catalog/sales reconciliation and multi-brand metrics from the shell

mod config;
mod exit_codes;
mod repair;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use multibrand_io::{ReadError, TextEncoding};
use multibrand_recon::ReconError;

use exit_codes::{read_exit_code, recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "mbrand")]
#[command(about = "Repair sales exports and compute multi-brand customer metrics")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a broken delimited export into a full-width CSV
    #[command(after_help = "\
Examples:
  mbrand repair vendas.csv -o vendas.fixed.csv
  mbrand repair vendas.csv --json > report.json
  mbrand repair vendas.csv --sep ';' --encoding windows-1252 -o fixed.csv")]
    Repair {
        /// Raw export to repair
        input: PathBuf,

        /// Field separator (detected from the header line when omitted)
        #[arg(long)]
        sep: Option<char>,

        /// Text encoding: utf-8-sig, utf-8 or windows-1252 (sniffed when omitted)
        #[arg(long)]
        encoding: Option<TextEncoding>,

        /// Write the repaired CSV here (stdout when omitted and --json is not set)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the repair report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Engine config (TOML) supplying the text-column candidates
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reconcile a sales export against the catalog and report metrics
    #[command(after_help = "\
Examples:
  mbrand run --catalog catalogo.csv --sales vendas.csv
  mbrand run --catalog catalogo.csv --sales vendas.csv --json
  mbrand run --catalog catalogo.csv --sales vendas.csv --cycle 202401 --only-multi-brand
  mbrand run --catalog catalogo.csv --sales vendas.csv --config engine.toml -o result.json")]
    Run {
        /// Catalog file (SKU, Nome, Marca)
        #[arg(long)]
        catalog: PathBuf,

        /// Sales export; repaired before loading
        #[arg(long)]
        sales: PathBuf,

        /// Engine config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sales separator (detected when omitted)
        #[arg(long)]
        sep: Option<char>,

        /// Sales text encoding (sniffed when omitted)
        #[arg(long)]
        encoding: Option<TextEncoding>,

        /// Keep only these cycles. Repeatable.
        #[arg(long, value_name = "CYCLE")]
        cycle: Vec<String>,

        /// Keep only these sectors. Repeatable.
        #[arg(long, value_name = "SECTOR")]
        sector: Vec<String>,

        /// Keep customers that bought one of these brands. Repeatable.
        #[arg(long, value_name = "BRAND")]
        brand: Vec<String>,

        /// Keep only multi-brand customers
        #[arg(long)]
        only_multi_brand: bool,

        /// Also report the detail of this customer code
        #[arg(long, value_name = "CODE")]
        customer: Option<String>,

        /// Detail of a customer without a code, by name (with --customer-sector)
        #[arg(long, value_name = "NAME", requires = "customer_sector", conflicts_with = "customer")]
        customer_name: Option<String>,

        /// Sector of the customer given by --customer-name
        #[arg(long, value_name = "SECTOR", requires = "customer_name")]
        customer_sector: Option<String>,

        /// Number of sectors in each ranking
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a config file and print the effective config
    #[command(after_help = "\
Examples:
  mbrand config
  mbrand config engine.toml")]
    Config {
        /// Config file (prints the defaults when omitted)
        file: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  multibrand-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Repair { input, sep, encoding, output, json, config } => {
            repair::cmd_repair(input, sep, encoding, output, json, config)
        }
        Commands::Run {
            catalog,
            sales,
            config,
            sep,
            encoding,
            cycle,
            sector,
            brand,
            only_multi_brand,
            customer,
            customer_name,
            customer_sector,
            top,
            json,
            output,
        } => run::cmd_run(run::RunArgs {
            catalog,
            sales,
            config,
            sep,
            encoding,
            cycles: cycle,
            sectors: sector,
            brands: brand,
            only_multi_brand,
            customer: run::customer_id(customer, customer_name, customer_sector),
            top,
            json,
            output,
        }),
        Commands::Config { file } => config::cmd_config(file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Engine error, with a hint for the common validation failures.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumns { .. } => {
                Some("check the header line and the separator (--sep)".to_string())
            }
            ReconError::ConfigParse(_) => Some("run `mbrand config` to see a valid config".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Ingestion error for `path`.
    pub fn read(path: &std::path::Path, err: ReadError) -> Self {
        let hint = match &err {
            ReadError::UnreadableText { .. } => {
                Some("omit --encoding to let the encoding be sniffed".to_string())
            }
            ReadError::InvalidSeparator(_) => Some("use a single ASCII character for --sep".to_string()),
            _ => None,
        };
        Self {
            code: read_exit_code(&err),
            message: format!("{}: {err}", path.display()),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
