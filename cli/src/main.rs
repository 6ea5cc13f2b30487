//! ednbridge - convert between EDN literal notation and JSON
//!
//! # Commands
//!
//! - `to-json [FILE]`: read one literal form, print its host JSON; with
//!   `--all`, read every top-level form and print one JSON line per form
//! - `to-edn [FILE]`: read JSON, print the engine value in literal notation
//!
//! Input comes from stdin when FILE is omitted.
//!
//! # Logging
//!
//! `-v` enables info output, `-vv` debug. Without it `RUST_LOG` is
//! honoured, defaulting to `warn`. Logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ednbridge_core::{Converter, ConverterConfig, HostInput, HostValue};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Convert between EDN literal notation and JSON
#[derive(Parser, Debug)]
#[command(name = "ednbridge")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON converter config (max_safe_digits, unknown_sentinel, default_partition, max_depth)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read literal notation and print host JSON
    ToJson {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Print conversion diagnostics to stderr
        #[arg(long)]
        report: bool,

        /// Read every top-level form and print one JSON line per form
        #[arg(long, conflicts_with = "pretty")]
        all: bool,
    },

    /// Read JSON and print literal notation
    ToEdn {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Treat the input as a transaction payload (JSON array)
        #[arg(long)]
        payload: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let converter = load_converter(args.config.as_deref())?;
    let output = match &args.command {
        Command::ToJson {
            file,
            pretty,
            report,
            all,
        } => {
            let options = JsonOptions {
                pretty: *pretty,
                report: *report,
                all: *all,
            };
            to_json(&converter, &read_input(file.as_deref())?, options)?
        }
        Command::ToEdn { file, payload } => to_edn(&converter, &read_input(file.as_deref())?, *payload)?,
    };
    println!("{}", output);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

fn load_converter(path: Option<&Path>) -> Result<Converter> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ConverterConfig::from_json_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ConverterConfig::default(),
    };
    info!(
        max_safe_digits = config.max_safe_digits,
        max_depth = config.max_depth,
        sentinel = %config.unknown_sentinel,
        "Converter configured"
    );
    Ok(Converter::with_config(config)?)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct JsonOptions {
    pretty: bool,
    report: bool,
    all: bool,
}

fn to_json(converter: &Converter, text: &str, options: JsonOptions) -> Result<String> {
    let forms = if options.all {
        converter.read_all(text).context("Malformed literal")?
    } else {
        vec![converter.read(text).context("Malformed literal")?]
    };

    let mut lines = Vec::with_capacity(forms.len());
    for (index, value) in forms.iter().enumerate() {
        let (host, diagnostics) = converter.to_host_with_report(value);
        debug!(form = index, diagnostics = diagnostics.diagnostics().len(), "Converted to host");
        if options.report {
            for diagnostic in diagnostics.diagnostics() {
                let mut entry = serde_json::to_value(diagnostic)?;
                if let (true, Some(object)) = (options.all, entry.as_object_mut()) {
                    object.insert("form".to_string(), index.into());
                }
                eprintln!("{}", entry);
            }
        }
        lines.push(if options.pretty {
            serde_json::to_string_pretty(&host)?
        } else {
            serde_json::to_string(&host)?
        });
    }
    Ok(lines.join("\n"))
}

fn to_edn(converter: &Converter, text: &str, payload: bool) -> Result<String> {
    let json: HostValue = serde_json::from_str(text).context("Malformed JSON")?;
    let value = if payload {
        let HostValue::Array(items) = json else {
            bail!("A transaction payload must be a JSON array");
        };
        let items: Vec<HostInput> = items.into_iter().map(HostInput::from).collect();
        converter.tx_payload(&items)?
    } else {
        converter.to_foreign(&HostInput::from(json))?
    };
    Ok(value.to_edn())
}
