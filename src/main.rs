use anyhow::Result;
use backup_filter::{runtime, Clause, MatchMode, RunConfig};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LONG_ABOUT: &str = "\
Filters a csv formatted backup of the archive database.

Apply any number of --filter clauses; use `list` to see the allowed fields
and operators.

Examples:
  --filter Samling equalTo 1
  --filter Samling contains Salling
  --filter \"Administrative data\" contains \"Bestillingsinformation:negativsamlingen 1970\"
  --filter \"Administrative data\" hasKey Bestillingsinformation
  --filter Beskrivelsesdata contains Typer:Farve
  --filter Samling equalTo null      (field is missing)
  --filter Samling notEqualTo null   (field is present)

Values are case-insensitive. Field names are case-sensitive.";

#[derive(Parser)]
#[command(name = "backup-filter")]
#[command(about = "Filter CSV backup exports of JSON documents", long_about = LONG_ABOUT)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a backup csv file
    Run(RunArgs),
    /// Validate a run configuration
    Validate {
        /// Path to run YAML file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the allowed fields and their operators
    List {
        /// Run YAML file with a custom field registry
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Path to the backup database csv file
    input: Option<PathBuf>,

    /// Directory for the result csv file(s)
    output: Option<PathBuf>,

    /// Add a filter clause
    #[arg(
        long,
        num_args = 3,
        value_names = ["FIELD", "OPERATOR", "VALUE"],
        action = ArgAction::Append
    )]
    filter: Vec<String>,

    /// Add an extra data field to the results
    #[arg(long = "field", value_name = "FIELD")]
    fields: Vec<String>,

    /// Combine the filters with OR instead of AND
    #[arg(long = "or", alias = "or_")]
    or: bool,

    /// Print the results instead of writing csv file(s)
    #[arg(long)]
    print: bool,

    /// Stem of the result file names
    #[arg(long)]
    filename: Option<String>,

    /// Maximum rows per result file
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Run YAML file; command line values take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RunArgs {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };

        if self.input.is_some() {
            config.input = self.input;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if let Some(filename) = self.filename {
            config.filename = filename;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.or {
            config.mode = MatchMode::Or;
        }
        config.print |= self.print;
        config.fields.extend(self.fields);
        config.filters.extend(
            self.filter
                .chunks(3)
                .map(|c| Clause::new(&c[0], &c[1], &c[2])),
        );

        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_fields(config: &RunConfig) -> Result<()> {
    let registry = config.field_registry()?;
    println!("Printing fields and operators...");
    for field in registry.fields() {
        let operators: Vec<_> = field.operator_names().collect();
        println!("{:<25}{}", field.label, operators.join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config()?;
            runtime::run_filter(&config)?;
        }
        Commands::Validate { config } => {
            let config = RunConfig::from_yaml_file(&config)?;
            config.validate()?;
            println!("✓ Run configuration is valid");
        }
        Commands::List { config } => {
            let config = match config {
                Some(path) => RunConfig::from_yaml_file(path)?,
                None => RunConfig::default(),
            };
            list_fields(&config)?;
        }
        Commands::Version => {
            println!("backup-filter version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
