use orders_dashboard::config::{
    resolve_data_dir, DashboardConfig, OutputFormat, RangeSelection, SourceConfig, DEFAULT_TOP_N,
};
use orders_dashboard::ingestion::{LoadCache, RawTablesSource};
use orders_dashboard::DashboardReport;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orders-dashboard")]
#[command(about = "Daily orders, category ranking, customer demographics and RFM for marketplace exports")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report from the raw orders, order items, products and customers tables
    Report {
        /// Directory holding orders.csv, order_items.csv, products.csv and customers.csv
        /// (or set DASHBOARD_DATA_DIR; default: ./data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Override the orders table path
        #[arg(long)]
        orders: Option<PathBuf>,

        /// Override the order items table path
        #[arg(long)]
        order_items: Option<PathBuf>,

        /// Override the products table path
        #[arg(long)]
        products: Option<PathBuf>,

        /// Override the customers table path
        #[arg(long)]
        customers: Option<PathBuf>,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Build the report from a single pre-merged CSV
    ReportMerged {
        /// Merged CSV file (e.g. main_data.csv)
        csv_file: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(ClapArgs)]
struct ViewArgs {
    /// First purchase date to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last purchase date to include (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Rows per ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match args.command {
        Commands::Report { data_dir, orders, order_items, products, customers, view } => {
            let defaults = RawTablesSource::from_dir(resolve_data_dir(data_dir));
            let tables = RawTablesSource {
                orders: orders.unwrap_or(defaults.orders),
                order_items: order_items.unwrap_or(defaults.order_items),
                products: products.unwrap_or(defaults.products),
                customers: customers.unwrap_or(defaults.customers),
            };
            build_config(SourceConfig::RawTables(tables), view)
        }
        Commands::ReportMerged { csv_file, view } => build_config(SourceConfig::Merged(csv_file), view),
    };

    run_report(config)
}

fn build_config(source: SourceConfig, view: ViewArgs) -> DashboardConfig {
    DashboardConfig {
        source,
        range: RangeSelection { start: view.start, end: view.end },
        top_n: view.top,
        output: if view.json { OutputFormat::Json } else { OutputFormat::Text },
    }
}

fn run_report(config: DashboardConfig) -> Result<()> {
    let source = config.source.into_source();
    let cache = LoadCache::new();
    let rows = cache
        .load(source.as_ref())
        .with_context(|| format!("Failed to load order lines ({})", source.source_type()))?;

    let range = config
        .range
        .resolve(&rows)?
        .context("No order lines loaded, nothing to report")?;
    info!("Reporting {} .. {} over {} order lines", range.start(), range.end(), rows.len());

    let report = DashboardReport::build(&rows, range, config.top_n)?;
    match config.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print!("{}", report),
    }

    Ok(())
}
