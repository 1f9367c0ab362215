use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gaffer_bridge::{ElementIterator, IteratorConfig, JsonLinesSource, User};
use tracing::info_span;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gaffer-bridge", about = "Convert raw Gaffer element records into typed elements")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert newline-delimited raw records into Gaffer JSON, one per line.
    Convert {
        /// Records file (`-` for stdin). Each line is an object or an `[object, companion]` pair.
        input: PathBuf,
        /// Log and skip records that cannot be converted instead of failing.
        #[arg(long)]
        skip_unconvertible: bool,
        /// Pretty-print each element.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the JSON projection of a user.
    User {
        /// User identifier.
        #[arg(long)]
        user_id: Option<String>,
        /// Data authorisation label (repeatable).
        #[arg(long = "data-auth")]
        data_auths: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            skip_unconvertible,
            pretty,
        } => run_convert(input, skip_unconvertible, pretty)?,
        Commands::User {
            user_id,
            data_auths,
        } => run_user(user_id, data_auths)?,
    }

    Ok(())
}

fn run_convert(input: PathBuf, skip_unconvertible: bool, pretty: bool) -> Result<()> {
    let reader: Box<dyn BufRead> = if input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&input)
            .with_context(|| format!("failed to open records file {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let config = IteratorConfig::default().with_skip_unconvertible(skip_unconvertible);
    let span = info_span!("convert", input = %input.display());
    let mut out = BufWriter::new(io::stdout().lock());

    let (written, skipped) = ElementIterator::with_config(JsonLinesSource::new(reader), config)
        .with_span(span)
        .scoped(|elements| -> Result<(usize, usize)> {
            let mut written = 0;
            while let Some(element) = elements
                .next_element()
                .with_context(|| format!("failed at record {}", elements.records_read()))?
            {
                let doc = element.to_gaffer_json();
                if pretty {
                    serde_json::to_writer_pretty(&mut out, &doc)?;
                } else {
                    serde_json::to_writer(&mut out, &doc)?;
                }
                writeln!(out)?;
                written += 1;
            }
            Ok((written, elements.records_skipped()))
        })?;
    out.flush()?;

    tracing::info!(written, skipped, "conversion finished");
    Ok(())
}

fn run_user(user_id: Option<String>, data_auths: Vec<String>) -> Result<()> {
    let data_auths = if data_auths.is_empty() {
        None
    } else {
        Some(data_auths)
    };
    let user = User::new(user_id, data_auths);
    println!("{}", serde_json::to_string(&user.to_json())?);
    Ok(())
}
