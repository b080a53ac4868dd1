//! lseq CLI
//!
//! Builds an arithmetic series from its arguments, optionally narrows or
//! reverses it, and prints the result. Nothing is materialized unless the
//! chosen output needs every element.

mod config;

use clap::Parser as ClapParser;
use config::{Config, OutputFormat};
use lseq_runtime::{
    Obj, ObjRef, SerializeError, TypedValue, list_index, list_length, list_range, list_reverse,
    lseq,
};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "lseq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Print arithmetic series without building them", long_about = None)]
struct Cli {
    /// Keep only elements FIRST through LAST (index expressions such as `end-2`)
    #[arg(long, num_args = 2, value_names = ["FIRST", "LAST"], allow_negative_numbers = true)]
    range: Option<Vec<String>>,

    /// Reverse the series (after --range)
    #[arg(long)]
    reverse: bool,

    /// Print only the element at IDX
    #[arg(long, value_name = "IDX", allow_negative_numbers = true)]
    index: Option<String>,

    /// Print the number of elements instead of the elements
    #[arg(long, conflicts_with = "index")]
    length: bool,

    /// Output format (overrides LSEQ_FORMAT)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Series arguments: `n`, `start end ?step?`, `start to end ?by step?`
    /// or `start count n ?by step?`
    #[arg(required = true, allow_negative_numbers = true)]
    words: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_logging(&config.log_filter);

    let format = cli.format.unwrap_or(config.format);
    match run(&cli, format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Warning: LSEQ_LOG='{}' not recognized ({}), ignoring", filter, e);
        EnvFilter::new(config::DEFAULT_LOG_FILTER)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, format: OutputFormat) -> Result<String, Box<dyn std::error::Error>> {
    let args: Vec<ObjRef> = cli
        .words
        .iter()
        .map(|word| Obj::new_string(word.as_str()))
        .collect();
    let mut value = lseq(&args)?;

    if let Some([first, last]) = cli.range.as_deref() {
        value = list_range(&value, first, last)?;
    }
    if cli.reverse {
        value = list_reverse(&value)?;
    }
    debug!(kind = value.type_name(), "pipeline built");

    if cli.length {
        return Ok(list_length(&value)?.to_string());
    }
    if let Some(index) = &cli.index {
        value = list_index(&value, index)?;
    }
    Ok(render(&value, format)?)
}

fn render(value: &Obj, format: OutputFormat) -> Result<String, SerializeError> {
    match format {
        OutputFormat::Text => Ok(value.get_string().to_string()),
        OutputFormat::Json => TypedValue::from_obj(value)?.to_json(),
        OutputFormat::Debug => Ok(TypedValue::from_obj(value)?.to_debug_string()),
    }
}
