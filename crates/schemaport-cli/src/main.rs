use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

use schemaport_core::{CanonicalSchema, Config, SftpConfig};
use schemaport_fetch::{Locator, RemoteFetcher, SftpFetcher};
use schemaport_import::{importer_for, SourceFormat};

/// Schemaport - schema import for data contracts
#[derive(Parser)]
#[command(name = "schemaport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemaport.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a schema from a local or remote source
    Import {
        /// Source format tag (see `schemaport formats`)
        #[arg(short, long)]
        format: String,

        /// Source URI: sftp://host[:port]/path or a local path
        #[arg(short, long)]
        source: String,

        /// Write the canonical schema here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Serialization of the canonical schema
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output_format: OutputFormat,
    },

    /// List supported format tags
    Formats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up DATACONTRACT_SFTP_* from a .env file when present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("schemaport.toml").exists() {
        Config::from_file(Path::new("schemaport.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    apply_env_credentials(&mut config.sftp);

    match cli.command {
        Commands::Import {
            format,
            source,
            output,
            output_format,
        } => {
            import_command(
                &config,
                &format,
                &source,
                output.as_deref(),
                output_format,
                cli.verbose,
            )
            .await
        }
        Commands::Formats => {
            formats_command();
            Ok(())
        }
    }
}

/// Merge environment credentials into the config
///
/// This is the only place the process environment is consulted; the fetch
/// layer receives credentials explicitly. Environment values win over the
/// config file.
fn apply_env_credentials(sftp: &mut SftpConfig) {
    if let Ok(username) = std::env::var("DATACONTRACT_SFTP_USER") {
        sftp.username = Some(username);
    }
    if let Ok(password) = std::env::var("DATACONTRACT_SFTP_PASSWORD") {
        sftp.password = Some(password);
    }
}

/// Import command - fetch, parse, and emit a canonical schema
async fn import_command(
    config: &Config,
    format_tag: &str,
    source: &str,
    output: Option<&Path>,
    output_format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    // Resolve the format before any I/O so a bad tag fails fast
    let format: SourceFormat = format_tag.parse()?;
    let importer = importer_for(format);

    let (bytes, origin) = if source.starts_with("sftp://") {
        let locator = Locator::parse(source)?;
        let fetcher = SftpFetcher::from_config(&config.sftp)?;

        if verbose {
            eprintln!(
                "{} {} from {}...",
                "Fetching".cyan(),
                locator.path,
                locator.address()
            );
        }

        let resource = fetcher.fetch(&locator).await?;
        (resource.bytes, resource.path)
    } else {
        if verbose {
            eprintln!("{} {}...", "Reading".cyan(), source);
        }
        let bytes = std::fs::read(source)
            .with_context(|| format!("Failed to read source file: {}", source))?;
        (bytes, source.to_string())
    };

    if verbose {
        eprintln!(
            "{} {} bytes as {}...",
            "Parsing".cyan(),
            bytes.len(),
            format
        );
    }

    let schema = importer.import(&bytes, &origin)?;

    let rendered = render_schema(&schema, output_format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            if verbose {
                eprintln!("{} {}", "Schema written to:".green(), path.display());
            }
        }
        None => println!("{}", rendered),
    }

    eprintln!(
        "{} {} field(s) imported from {}",
        "✓".green(),
        schema.fields.len(),
        origin
    );

    Ok(())
}

fn render_schema(schema: &CanonicalSchema, output_format: OutputFormat) -> Result<String> {
    match output_format {
        OutputFormat::Json => schema.to_json().context("Failed to serialize schema"),
        OutputFormat::Yaml => schema.to_yaml().context("Failed to serialize schema"),
    }
}

/// Formats command - list the supported tags
fn formats_command() {
    println!("{}", "Supported formats:".bold());
    for format in SourceFormat::all() {
        println!("  {}", format.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
