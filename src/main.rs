use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabular_etl::{
    cli::{charts_json, run_etl},
    config::{EtlConfig, resolve_domain},
    etl::{LogObserver, outcome_message},
};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Tabular ETL: ingest education and real-estate files into SQLite and chart them by role
#[derive(Parser)]
#[command(name = "tetl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Domain to process: education, real_estate, or a YAML domain file [env: ETL_DOMAIN]
    #[arg(short, long, global = true)]
    domain: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every file in the source directory, clean it, and load it
    Run {
        /// Directory of csv/xlsx/xls/json/parquet files [env: ETL_SOURCE_DIR]
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// SQLite database file [env: ETL_DATABASE]
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Print the aggregate charts a role may view, as JSON
    Charts {
        /// Role of the viewer (e.g. admin, teacher, analyst, viewer)
        #[arg(short, long)]
        role: String,

        /// SQLite database file [env: ETL_DATABASE]
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Print the active domain schema as YAML
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let mut config = EtlConfig::from_env();
    if let Some(domain) = cli.domain {
        config.domain = domain;
    }
    let schema = resolve_domain(&config.domain)?;

    match cli.command {
        Commands::Run { source, database } => {
            if let Some(source) = source {
                config.source_dir = source;
            }
            if let Some(database) = database {
                config.database = database;
            }
            log::info!(
                "Running {} ETL from {} into {}",
                schema.name.cyan(),
                config.source_dir.display().bright_black(),
                config.database.display().bright_black()
            );

            let result = run_etl(&config, schema, Arc::new(LogObserver));
            let message = outcome_message(&result);
            match result {
                Ok(_) => println!("{}", message.green()),
                Err(err) => {
                    log::debug!("{:?}", err);
                    println!("{}", message.red());
                    std::process::exit(1);
                }
            }
        }
        Commands::Charts { role, database } => {
            if let Some(database) = database {
                config.database = database;
            }
            println!("{}", charts_json(&config, &schema, &role)?);
        }
        Commands::Schema => {
            print!("{}", schema.to_yaml()?);
        }
    }

    Ok(())
}
