use aggregation::AggregationEngine;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::Settings;
use core_types::DateRange;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Panorama sales dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variable overrides from a .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    tracing::info!(config = %cli.config.display(), "Loaded settings.");

    match cli.command {
        Commands::Serve(args) => {
            let addr = args.addr.unwrap_or_else(|| settings.server.bind_addr());
            web_server::run_server(addr, settings).await?;
        }
        Commands::Report(args) => {
            run_report(&settings, args)?;
        }
    }

    Ok(())
}

/// Sales analytics over a pre-joined order/review/customer export: serves the
/// derived dashboard views over HTTP or prints them to the terminal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard API server.
    Serve(ServeArgs),
    /// Print every derived view for a date range as terminal tables.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind address, overriding the configured one (e.g. "0.0.0.0:3000").
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Start of the date range (format: YYYY-MM-DD). Defaults to the first
    /// day in the data.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the date range (format: YYYY-MM-DD). Defaults to the last day
    /// in the data.
    #[arg(long)]
    to: Option<NaiveDate>,
}

/// Loads the record set, filters it, and prints every derived view.
fn run_report(settings: &Settings, args: ReportArgs) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Loading sales export...");

    let record_set = dataset::load_csv(&settings.dataset.orders_path)?;
    spinner.finish_with_message(format!("Loaded {} rows.", record_set.len()));

    let requested = match (args.from, args.to, record_set.time_span()) {
        (None, None, _) => None,
        (_, _, None) => None,
        (from, to, Some(span)) => Some(DateRange::new(
            from.unwrap_or(span.start),
            to.unwrap_or(span.end),
        )),
    };
    let range = record_set.effective_range(requested);
    let rows = match range {
        Some(range) => {
            println!("Reporting on {} .. {}\n", range.start, range.end);
            record_set.slice(range)
        }
        None => {
            println!("The requested range holds no data.\n");
            &[]
        }
    };

    let engine = AggregationEngine::new();

    let summary = engine.summary(rows);
    println!("Orders:      {}", summary.order_count);
    println!("Revenue:     {}", summary.revenue);
    match summary.mean_rating {
        Some(rating) => println!("Mean rating: {}", format_rating(rating)),
        None => println!("Mean rating: n/a"),
    }

    print_table(
        "Daily orders & revenue",
        vec!["Day", "Orders", "Revenue"],
        engine
            .daily_orders(rows)
            .iter()
            .map(|d| vec![d.day.to_string(), d.order_count.to_string(), d.revenue.to_string()])
            .collect(),
    );

    let k = settings.views.rating_extremes_k;
    print_table(
        &format!("Best-rated categories (top {k})"),
        vec!["Category", "Mean rating"],
        engine
            .category_rating_extremes(rows, k, core_types::RatingDirection::Best)
            .iter()
            .map(|c| vec![c.category.clone(), format_rating(c.mean_rating)])
            .collect(),
    );
    print_table(
        &format!("Worst-rated categories (bottom {k})"),
        vec!["Category", "Mean rating"],
        engine
            .category_rating_extremes(rows, k, core_types::RatingDirection::Worst)
            .iter()
            .map(|c| vec![c.category.clone(), format_rating(c.mean_rating)])
            .collect(),
    );

    print_table(
        &format!("Categories by sales volume (top {})", settings.views.category_volume_k),
        vec!["Category", "Items sold"],
        engine
            .top_categories_by_volume(rows, settings.views.category_volume_k)
            .iter()
            .map(|c| vec![c.category.clone(), c.items_sold.to_string()])
            .collect(),
    );

    print_table(
        "Mean rating by state",
        vec!["State", "Mean rating"],
        engine
            .state_mean_rating(rows)
            .iter()
            .map(|s| vec![s.state.clone(), format_rating(s.mean_rating)])
            .collect(),
    );

    print_table(
        "Revenue by state",
        vec!["State", "Revenue"],
        engine
            .state_revenue(rows)
            .iter()
            .map(|s| vec![s.state.clone(), s.revenue.to_string()])
            .collect(),
    );

    print_table(
        "Customers by payment type",
        vec!["Payment type", "Customers"],
        engine
            .customer_payment_mix(rows)
            .iter()
            .map(|p| vec![p.payment_type.clone(), p.customers.to_string()])
            .collect(),
    );

    print_table(
        "Customers by state",
        vec!["State", "Customers"],
        engine
            .customer_state_distribution(rows)
            .iter()
            .map(|s| vec![s.state.clone(), s.customers.to_string()])
            .collect(),
    );

    print_table(
        "Choropleth totals (by region code)",
        vec!["Region", "Customers"],
        engine
            .customer_totals_by_state(rows)
            .iter()
            .map(|r| vec![r.region_code.clone(), r.customers.to_string()])
            .collect(),
    );

    Ok(())
}

fn print_table(title: &str, header: Vec<&str>, rows: Vec<Vec<String>>) {
    println!("\n{title}");
    if rows.is_empty() {
        println!("  (no data)");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn format_rating(rating: Decimal) -> String {
    rating.round_dp(2).to_string()
}
