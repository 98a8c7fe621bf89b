use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::{Parser, ValueEnum};
use data_engine::{
    try_parse_date_to_sec, write_csv, Cell, ColumnMapping, DataEngine, IngestConfig, IngestError,
    RawTable, Role,
};
use serde::Serialize;
use tracing::info;

use chart_feed::ChartSession;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(version, about = "Normalize an OHLC(V) price file and compute its SMA")]
struct Cli {
    /// Price table to ingest.
    file: PathBuf,

    #[arg(long, value_enum, default_value = "csv")]
    format: InputFormat,

    /// TOML settings file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read all-digit timestamps as milliseconds.
    #[arg(long)]
    assume_millis: bool,

    /// SMA window in bars (values below 1 become 1).
    #[arg(long, allow_negative_numbers = true)]
    sma: Option<i64>,

    /// Manual column assignment, e.g. `--map close="Adj Close"`.
    #[arg(long = "map", value_name = "ROLE=COLUMN")]
    mappings: Vec<String>,

    /// Print the series and SMA as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    #[arg(long, value_name = "FILE")]
    export_csv: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    export_sma: Option<PathBuf>,

    /// Show the bar and SMA at this time (any accepted date format).
    #[arg(long, value_name = "TIME")]
    at: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    mapping: &'a ColumnMapping,
    rejected: usize,
    sma_period: usize,
    series: &'a data_engine::Series,
    sma: &'a [indicator_engine::IndicatorPoint],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IngestConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => IngestConfig::default(),
    };
    if cli.assume_millis {
        config.assume_millis = true;
    }
    if !cli.mappings.is_empty() {
        let mut mapping = config.mapping.take().unwrap_or_default();
        mapping.merge(&parse_mappings(&cli.mappings)?);
        config.mapping = Some(mapping);
    }

    let table = match cli.format {
        InputFormat::Csv => RawTable::from_csv_path(&cli.file, config.delimiter_byte()),
        InputFormat::Json => File::open(&cli.file)
            .map_err(IngestError::from)
            .and_then(RawTable::from_json_reader),
    }
    .with_context(|| format!("reading {}", cli.file.display()))?;

    let ingestion = DataEngine::new().ingest(&table, config.mapping.as_ref(), config.assume_millis)?;

    let mut session = ChartSession::new(config.sma_period);
    if let Some(period) = cli.sma {
        session.set_sma_period(period);
    }
    session.replace_series(ingestion.series.clone());

    if let Some(path) = &cli.export_csv {
        write_csv(session.series().bars(), path)?;
        info!(path = %path.display(), "wrote series");
    }
    if let Some(path) = &cli.export_sma {
        write_csv(session.sma(), path)?;
        info!(path = %path.display(), "wrote sma");
    }

    if cli.json {
        let out = JsonOutput {
            mapping: &ingestion.mapping,
            rejected: ingestion.rejected_count(),
            sma_period: session.sma_period(),
            series: session.series(),
            sma: session.sma(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_summary(&table, &ingestion, &session, config.preview_rows);
    }

    if let Some(at) = &cli.at {
        let Some(time) = try_parse_date_to_sec(&Cell::from(at.as_str()), config.assume_millis) else {
            bail!("cannot read {at:?} as a time");
        };
        match session.legend_at(time) {
            Some(legend) => println!("{}  {}", format_time(legend.time), legend),
            None => println!("{}  no bar", format_time(time)),
        }
    }

    Ok(())
}

fn parse_mappings(pairs: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::default();
    for pair in pairs {
        let Some((role, column)) = pair.split_once('=') else {
            bail!("expected ROLE=COLUMN, got {pair:?}");
        };
        let Some(role) = Role::parse(role) else {
            bail!("unknown role {role:?}");
        };
        mapping.set(role, column.trim());
    }
    Ok(mapping)
}

fn print_summary(
    table: &RawTable,
    ingestion: &data_engine::Ingestion,
    session: &ChartSession,
    preview_rows: usize,
) {
    println!("Mapping:");
    for role in Role::ALL {
        let col = ingestion.mapping.column(role).unwrap_or("-");
        println!("  {:<7} {}", role.as_str(), col);
    }

    println!("\nPreview ({} of {} rows):", preview_rows.min(table.len()), table.len());
    println!("  {}", table.headers.join(" | "));
    for row in table.preview(preview_rows) {
        let cells: Vec<String> = table
            .headers
            .iter()
            .map(|h| match row.get(h) {
                Cell::Text(s) => s.clone(),
                Cell::Number(v) => v.to_string(),
                Cell::Null => String::new(),
            })
            .collect();
        println!("  {}", cells.join(" | "));
    }

    let series = session.series();
    println!(
        "\nLoaded {} bars ({} rows rejected)",
        series.len(),
        ingestion.rejected_count()
    );
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!("  from {} to {}", format_time(first.time), format_time(last.time));
    }
    match session.sma().last() {
        Some(p) => println!(
            "SMA({}) at {}: {:.2}",
            session.sma_period(),
            format_time(p.time),
            p.value
        ),
        None => println!("SMA({}): not enough bars", session.sma_period()),
    }
}

fn format_time(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
