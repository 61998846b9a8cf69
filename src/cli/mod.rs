use crate::config::Config;
use crate::size::DataSize;
use crate::units::{self, UnitFamily};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use prettytable::{format as table_format, Cell, Row, Table};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datasize")]
#[command(version, about = "Parse and format human-readable data sizes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bits per byte for bit/byte conversions
    #[arg(long, global = true)]
    pub word_length: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse size strings into byte counts
    Parse {
        /// Sizes to parse (e.g. 10.4TB, 128kb, 16GiB, 1024)
        #[arg(required = true)]
        sizes: Vec<String>,

        /// Re-render each size under this format spec
        #[arg(short, long)]
        format: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one size under a format spec
    Format {
        /// Byte count or size string
        size: String,

        /// Format spec (e.g. a, A, m, I, GiB, .2GiB, 020.4a)
        spec: Option<String>,
    },

    /// Show a size in every denomination of each unit family
    Table {
        /// Byte count or size string
        size: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate default config file
    InitConfig {
        /// Output path for config file
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = if let Some(config_path) = &self.config {
            Config::load(config_path)?
        } else {
            Config::load_or_default(Config::default_path())?
        };
        let word_length = self.word_length.unwrap_or(config.word_length);

        match self.command {
            Commands::Parse {
                sizes,
                format,
                json,
            } => run_parse(&sizes, format, json, word_length, &config),
            Commands::Format { size, spec } => run_format(&size, spec, word_length, &config),
            Commands::Table { size, json } => run_table(&size, json, word_length),
            Commands::InitConfig { path } => init_config(path),
        }
    }
}

fn parse_input(input: &str, word_length: u32) -> Result<DataSize> {
    DataSize::parse_with_word_length(input, word_length)
        .with_context(|| format!("Failed to parse size `{}`", input))
}

fn run_parse(
    sizes: &[String],
    format: Option<String>,
    json_output: bool,
    word_length: u32,
    config: &Config,
) -> Result<()> {
    let spec = format.unwrap_or_else(|| config.default_format.clone());

    if json_output {
        let mut records = Vec::new();
        for input in sizes {
            let size = parse_input(input, word_length)?;
            records.push(json!({
                "input": input,
                "bytes": bytes_json(size.get()),
                "formatted": size.format(&spec)?,
            }));
        }
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for input in sizes {
        let size = parse_input(input, word_length)?;
        println!(
            "{} {} {}",
            format!("{}:", input).bold(),
            size.get().to_string().green(),
            format!("({})", size.format(&spec)?.trim_end()).bright_black()
        );
    }

    Ok(())
}

fn run_format(size: &str, spec: Option<String>, word_length: u32, config: &Config) -> Result<()> {
    let spec = spec.unwrap_or_else(|| config.default_format.clone());
    let size = parse_input(size, word_length)?;

    println!("{}", size.format(&spec)?);
    Ok(())
}

fn run_table(size: &str, json_output: bool, word_length: u32) -> Result<()> {
    let size = parse_input(size, word_length)?;

    let families = [
        ("Metric", UnitFamily::Metric),
        ("IEC", UnitFamily::Iec),
        ("Legacy", UnitFamily::Legacy),
    ];

    if json_output {
        let mut out = serde_json::Map::new();
        out.insert(String::from("bytes"), bytes_json(size.get()));
        for (name, family) in families {
            let mut denominations = serde_json::Map::new();
            for &(multiplier, token) in units::scan_table(family).iter().rev() {
                denominations.insert(
                    unit_label(token, family),
                    json!(scaled_value(size.get(), multiplier)),
                );
            }
            out.insert(name.to_lowercase(), serde_json::Value::Object(denominations));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Bytes:".bold(), size.get().to_string().green());

    let mut table = Table::new();
    table.set_format(*table_format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Family"),
        Cell::new("Unit"),
        Cell::new("Value"),
    ]));

    for (name, family) in families {
        for &(multiplier, token) in units::scan_table(family).iter().rev() {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&unit_label(token, family)),
                Cell::new(&scaled_value(size.get(), multiplier)),
            ]));
        }
    }

    table.printstd();
    Ok(())
}

// JSON numbers cap at u64; larger byte counts fall back to a string.
fn bytes_json(bytes: u128) -> serde_json::Value {
    match u64::try_from(bytes) {
        Ok(n) => json!(n),
        Err(_) => json!(bytes.to_string()),
    }
}

// Legacy tokens collide with metric ones in format specs, so the table
// scales directly instead of going through DataSize::format.
fn scaled_value(bytes: u128, multiplier: u128) -> String {
    let value = bytes as f64 / multiplier as f64;
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn unit_label(token: &str, family: UnitFamily) -> String {
    match family {
        UnitFamily::Legacy => token.to_string(),
        _ => format!("{}B", token),
    }
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(|| {
        Config::ensure_config_dir().unwrap_or_else(|_| PathBuf::from("config.toml"))
    });

    let config = Config::default();
    config.save(&config_path)?;

    println!(
        "{} {}",
        "Config file created:".green().bold(),
        config_path.display()
    );

    Ok(())
}
