use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use sgen_cli::document::SchemaDocument;
use sgen_core::{Config, Context, Mode, Schema, Seed, ThreadSource};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Generate positive and negative test records from a schema document
#[derive(Parser)]
#[command(name = "sgen", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write records that should pass validation
    #[command(alias = "p")]
    Positive(GenerateArgs),

    /// Write records that should fail validation, one invalid field each
    #[command(alias = "n")]
    Negative(GenerateArgs),

    /// Show how many records each pass would produce
    Count {
        /// Path to the JSON schema document
        schema: PathBuf,

        /// Seed for reproducible generation
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(Parser)]
struct GenerateArgs {
    /// Path to the JSON schema document
    schema: PathBuf,

    /// Seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many records
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write indented JSON instead of JSON lines
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Enable colors only when running in a terminal or explicitly requested
    let should_use_colors =
        atty::is(atty::Stream::Stdout) || std::env::var("FORCE_COLOR").is_ok();
    colored::control::set_override(should_use_colors);

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Positive(args) => generate(Mode::Positive, args),
        Commands::Negative(args) => generate(Mode::Negative, args),
        Commands::Count { schema, seed } => count(&schema, seed),
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn context(seed: Option<u64>) -> Context {
    match seed {
        Some(seed) => Context::new(Config::default(), Seed::from_u64(seed)),
        None => Context::new(Config::default(), ThreadSource),
    }
}

fn load(path: &Path) -> Result<Schema> {
    let schema = SchemaDocument::load(path)?.into_schema()?;
    tracing::debug!(path = %path.display(), fields = schema.len(), "loaded schema");
    Ok(schema)
}

fn generate(mode: Mode, args: GenerateArgs) -> Result<()> {
    let schema = load(&args.schema)?;
    let mut cx = context(args.seed);

    let records = match mode {
        Mode::Positive => schema.positive(&mut cx)?,
        Mode::Negative => schema.negative(&mut cx)?,
    };
    let records = records.take(args.limit.unwrap_or(usize::MAX));

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let written = sgen_cli::write_records(&mut BufWriter::new(file), records, args.pretty)?;
            eprint!(
                "{}",
                sgen_cli::format_written(written, &path.display().to_string())
            );
        }
        None => {
            let stdout = io::stdout();
            let written = sgen_cli::write_records(&mut stdout.lock(), records, args.pretty)?;
            tracing::debug!(%mode, written, "wrote records");
        }
    }

    Ok(())
}

fn count(path: &Path, seed: Option<u64>) -> Result<()> {
    let schema = load(path)?;
    let mut cx = context(seed);

    println!("{}", sgen_cli::format_header());
    print!(
        "{}",
        sgen_cli::format_counts(Mode::Positive, &schema.positive(&mut cx)?.sizes())
    );
    print!(
        "{}",
        sgen_cli::format_counts(Mode::Negative, &schema.negative(&mut cx)?.sizes())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_parsing() {
        let args = vec!["sgen", "positive", "car.json", "--seed", "42", "--limit", "10"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Positive(args) => {
                assert_eq!(args.schema, PathBuf::from("car.json"));
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.limit, Some(10));
                assert!(!args.pretty);
            }
            _ => panic!("Expected positive command"),
        }
    }

    #[test]
    fn test_negative_parsing() {
        let args = vec!["sgen", "negative", "car.json", "--output", "out.jsonl", "--pretty"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Negative(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out.jsonl")));
                assert!(args.pretty);
            }
            _ => panic!("Expected negative command"),
        }
    }

    #[test]
    fn test_count_parsing_with_global_verbose() {
        let args = vec!["sgen", "count", "car.json", "--verbose"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Count { seed: None, .. }));
    }

    #[test]
    fn test_alias_parsing() {
        let cli = Cli::try_parse_from(vec!["sgen", "n", "car.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Negative(_)));
    }

    #[test]
    fn test_schema_is_required() {
        assert!(Cli::try_parse_from(vec!["sgen", "positive"]).is_err());
    }
}
