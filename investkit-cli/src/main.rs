//! investkit CLI: catalog listings, recent and historical prices, fund
//! overviews, and company profiles from investing.com.
//!
//! Commands:
//! - `list`: catalog rows, with a column selection, as table, json or csv
//! - `recent`: the last month of daily prices
//! - `history`: daily prices between two dates
//! - `fund-info`: overview figures of a fund
//! - `profile`: company description of an equity
//! - `refresh`: merge a fresh equity or fund listing into a catalog directory
//! - `config`: print the effective configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use investkit_core::data::{ProfileLanguage, UserAgentPool};
use investkit_core::domain::{CatalogEntry, InstrumentKind, PriceHistory, SortOrder};
use investkit_core::output::{
    catalog_to_csv, catalog_to_json, parse_columns, render_catalog_table, CatalogColumn,
};
use investkit_core::{CatalogRepository, FetchConfig, HttpPageSource, InvestingClient};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "investkit",
    about = "investkit CLI: historical prices of Spanish equities, funds and ETFs"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log requests and parsing at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// List the instruments in the catalog.
    List {
        /// equities, funds or etfs.
        kind: InstrumentKind,

        /// Only ETFs listed in this country.
        #[arg(long)]
        country: Option<String>,

        /// Comma-separated columns, e.g. name,symbol,isin. Defaults to every
        /// column of the kind's catalog file.
        #[arg(long)]
        columns: Option<String>,

        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Fetch the recent daily prices of an instrument.
    Recent {
        /// equity, fund or etf.
        kind: InstrumentKind,

        /// Instrument name as listed in the catalog.
        name: String,

        /// ascending or descending.
        #[arg(long, default_value = "ascending")]
        order: SortOrder,

        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Fetch daily prices between two dates (dd/mm/yyyy).
    History {
        /// equity, fund or etf.
        kind: InstrumentKind,

        /// Instrument name as listed in the catalog.
        name: String,

        /// Start date (dd/mm/yyyy).
        #[arg(long)]
        start: String,

        /// End date (dd/mm/yyyy).
        #[arg(long)]
        end: String,

        /// ascending or descending.
        #[arg(long, default_value = "ascending")]
        order: SortOrder,

        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Show the overview figures of a fund.
    FundInfo {
        /// Fund name as listed in the catalog.
        name: String,

        /// table or json.
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Show the company description of an equity.
    Profile {
        /// Equity name as listed in the catalog.
        name: String,

        /// english (en) or spanish (es).
        #[arg(long, default_value = "english")]
        language: ProfileLanguage,
    },
    /// Download the current equity or fund listing and merge it into the catalog CSV.
    Refresh {
        /// equities or funds.
        kind: InstrumentKind,

        /// Catalog directory. Defaults to `catalog_dir` from the config, then ./catalogs.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => FetchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FetchConfig::default(),
    };

    match cli.command {
        Commands::List {
            kind,
            country,
            columns,
            format,
        } => run_list(&config, kind, country.as_deref(), columns.as_deref(), format),
        Commands::Recent {
            kind,
            name,
            order,
            format,
        } => {
            let history = with_client(&config, |client| client.recent_data(kind, &name, order))?;
            print_history(&history, format)
        }
        Commands::History {
            kind,
            name,
            start,
            end,
            order,
            format,
        } => {
            let history = with_client(&config, |client| {
                client.historical_data(kind, &name, &start, &end, order)
            })?;
            print_history(&history, format)
        }
        Commands::FundInfo { name, format } => {
            let info = with_client(&config, |client| client.fund_information(&name))?;
            match format {
                Format::Table => print!("{}", info.render_table()),
                Format::Json => println!("{}", info.to_json()?),
                Format::Csv => bail!("fund information is available as table or json"),
            }
            Ok(())
        }
        Commands::Profile { name, language } => {
            let profile = with_client(&config, |client| client.company_profile(&name, language))?;
            println!("Source: {}", profile.url);
            println!();
            match profile.description {
                Some(text) => println!("{text}"),
                None => println!("(no description published)"),
            }
            Ok(())
        }
        Commands::Refresh { kind, dir } => run_refresh(&config, kind, dir),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "investkit=debug,investkit_core=debug"
    } else {
        "investkit=info,investkit_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(config: &FetchConfig) -> Result<CatalogRepository> {
    Ok(CatalogRepository::load(config.catalog_dir.as_deref())?)
}

/// Build the HTTP source, catalog and client, then run `f` against them.
fn with_client<T>(
    config: &FetchConfig,
    f: impl FnOnce(&InvestingClient<'_>) -> Result<T, investkit_core::DataError>,
) -> Result<T> {
    let catalog = load_catalog(config)?;
    let source = HttpPageSource::new(UserAgentPool::new(config.user_agents.clone()))?;
    let client = InvestingClient::new(&source, &catalog, config);
    Ok(f(&client)?)
}

fn print_history(history: &PriceHistory, format: Format) -> Result<()> {
    match format {
        Format::Table => print!("{}", history.render_table()),
        Format::Json => println!("{}", history.to_json()?),
        Format::Csv => print!("{}", history.to_csv()?),
    }
    Ok(())
}

fn run_list(
    config: &FetchConfig,
    kind: InstrumentKind,
    country: Option<&str>,
    columns: Option<&str>,
    format: Format,
) -> Result<()> {
    let columns = match columns {
        Some(list) => parse_columns(list)?,
        None => CatalogColumn::defaults(kind).to_vec(),
    };
    let catalog = load_catalog(config)?;

    let rows: Vec<&CatalogEntry> = match (kind, country) {
        (InstrumentKind::Etf, Some(country)) => catalog.etfs_in(country),
        (_, Some(_)) => bail!("--country only applies to etfs"),
        (_, None) => catalog.entries(kind).iter().collect(),
    };

    if rows.is_empty() {
        match country {
            Some(c) => eprintln!(
                "No ETFs listed in '{c}'. Countries: {}",
                catalog.etf_countries().join(", ")
            ),
            None => eprintln!("The {kind} catalog is empty."),
        }
        return Ok(());
    }

    match format {
        Format::Table => print!("{}", render_catalog_table(&rows, &columns)),
        Format::Json => println!("{}", catalog_to_json(&rows, &columns)?),
        Format::Csv => print!("{}", catalog_to_csv(&rows, &columns)?),
    }
    tracing::info!(%kind, count = rows.len(), "listed catalog");
    Ok(())
}

fn run_refresh(config: &FetchConfig, kind: InstrumentKind, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir
        .or_else(|| config.catalog_dir.clone())
        .unwrap_or_else(|| PathBuf::from("catalogs"));

    // Merge into what the target directory already holds, else the bundled table.
    let mut catalog = CatalogRepository::from_dir(&dir)?;
    let entries = with_client(config, |client| client.fetch_listing(kind))?;
    let summary = catalog.merge(kind, entries);
    let path = catalog.save(kind, &dir)?;

    println!(
        "Updated {} and added {} {kind} rows in {}",
        summary.updated,
        summary.added,
        path.display()
    );
    Ok(())
}
