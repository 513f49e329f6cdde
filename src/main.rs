use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use gnss_accuracy::analysis::{AnalysisRecord, Analyzer, SourceFormat};
use gnss_accuracy::config::Config;

#[derive(Parser)]
#[command(name = "gnss-accuracy")]
#[command(about = "GNSS positioning accuracy analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a NMEA, XYZ or RINEX file
    Analyze {
        file: PathBuf,
        /// Input format (nmea, xyz, rinex); detected from the extension by default
        #[arg(long)]
        format: Option<String>,
        /// Configuration file with base stations and analysis settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Base station id to use as fixed reference
        #[arg(long, conflicts_with = "reference")]
        station: Option<String>,
        /// Fixed reference as "lat,lon,alt"
        #[arg(long)]
        reference: Option<String>,
        /// Write the JSON record here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Date for NMEA fixes, YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List active base stations
    Stations {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            format,
            config,
            station,
            reference,
            output,
            date,
        } => analyze(
            &file,
            format.as_deref(),
            config.as_deref(),
            station.as_deref(),
            reference.as_deref(),
            output.as_deref(),
            date,
        ),
        Commands::Stations { config } => stations(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::from_file(path).map_err(|e| format!("Config error: {}", e)),
        None => Ok(Config::default()),
    }
}

fn analyze(
    file: &Path,
    format: Option<&str>,
    config: Option<&Path>,
    station: Option<&str>,
    reference: Option<&str>,
    output: Option<&Path>,
    date: Option<NaiveDate>,
) -> ExitCode {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let format = match format.map(str::parse::<SourceFormat>).transpose() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut analyzer = Analyzer::new(date.unwrap_or_else(|| Utc::now().date_naive()));
    if let Some(zone) = config.analysis.utm_zone {
        analyzer = analyzer.with_zone(zone);
    }

    if let Some(id) = station {
        match config.station_position(id) {
            Ok(position) => analyzer = analyzer.with_fixed_reference(position),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    } else if let Some(triple) = reference {
        analyzer = match analyzer.with_reference_coordinates(triple) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
    }

    let record = match analyzer.record_file(file, format) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Run {} finished in {}",
        record.id,
        humantime::format_duration(record.processing_time())
    );

    write_record(&record, output)
}

fn write_record(record: &AnalysisRecord, output: Option<&Path>) -> ExitCode {
    let json = match serde_json::to_string_pretty(record) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error writing {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    ExitCode::SUCCESS
}

fn stations(path: &Path) -> ExitCode {
    let config = match load_config(Some(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for station in config.active_stations() {
        println!(
            "{}: {} ({}, {:.1} m){}",
            station.id,
            station.name,
            station.coordinates,
            station.altitude_m,
            station
                .description
                .as_deref()
                .map(|d| format!(" - {}", d))
                .unwrap_or_default()
        );
    }
    ExitCode::SUCCESS
}
