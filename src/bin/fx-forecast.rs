//! fx-forecast CLI - fetch, train and present the USD/NGN forecast
//!
//! ## Example Usage
//!
//! ```bash
//! # Whole pipeline
//! fx-forecast run
//!
//! # Individual stages
//! fx-forecast fetch
//! fx-forecast train
//! fx-forecast present --output ./dashboard.html
//!
//! # Configuration and artifact status
//! fx-forecast info
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use fx_forecast::config::{ArtifactPaths, Config};
use fx_forecast::data::sources::YahooFinanceSource;
use fx_forecast::data::{ForecastTable, HistoricalSeries};
use fx_forecast::fetcher::RateFetcher;
use fx_forecast::forecast::{FittedAdditiveModel, FittedForecast, Forecaster, TrainingReport};
use fx_forecast::presenter::{Dashboard, Direction, Presenter, Tone};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

/// fx-forecast: USD/NGN exchange rate forecasting pipeline
#[derive(Parser)]
#[command(name = "fx-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "USD/NGN exchange rate forecasting pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the trailing 730 days of daily closes
    Fetch,

    /// Fit the model and write the 30-day forecast
    Train,

    /// Print the dashboard and write it as HTML
    Present {
        /// Output file for the HTML dashboard
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Only print to the terminal
        #[arg(long)]
        no_html: bool,
    },

    /// Run fetch, train and present in order
    Run,

    /// Show configuration and artifact status
    Info,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref());
    if let Err(e) = config.ensure_dirs() {
        eprintln!(
            "{} Failed to create directories: {}",
            "Error:".red().bold(),
            e
        );
        process::exit(1);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "fx-forecast".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Data dir: {}",
            config.data_dir.display().to_string().dimmed()
        );
    }

    let paths = config.artifact_paths();
    let result = match cli.command {
        Commands::Fetch => fetch(&config, &paths),
        Commands::Train => train(&paths),
        Commands::Present { output, no_html } => present(&paths, output, no_html),
        Commands::Run => run_pipeline(&config, &paths),
        Commands::Info => show_info(&config, &paths),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn fetch(config: &Config, paths: &ArtifactPaths) -> anyhow::Result<()> {
    let source = YahooFinanceSource::with_options(
        &config.provider_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let fetcher = RateFetcher::new(source);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let started = Instant::now();
    let pb = spinner(&format!("Fetching {} daily closes...", fetcher.pair()))?;
    let result = runtime.block_on(fetcher.fetch_and_store(&paths.historical));
    pb.finish_and_clear();
    let series = result?;

    println!("{}", "Fetch Summary".green().bold());
    println!("{}", "=============".green());
    print_series(&series);
    println!(
        "  {} {}",
        "Saved to:".bold(),
        paths.historical.display().to_string().dimmed()
    );
    println!("  {} {:.2?}", "Elapsed:".bold(), started.elapsed());
    println!();

    for (label, rows) in [("First 5 days:", series.head(5)), ("Last 5 days:", series.tail(5))] {
        println!("{}", label.bold());
        for obs in rows {
            println!("  {}  {:.4}", obs.date, obs.rate);
        }
        println!();
    }
    Ok(())
}

fn print_series(series: &HistoricalSeries) {
    println!("  {} {}", "Data points:".bold(), series.len());
    if let Some(summary) = series.summary() {
        println!(
            "  {} {} to {}",
            "Date range:".bold(),
            summary.start_date,
            summary.end_date
        );
        println!(
            "  {} {:.2} to {:.2} (mean {:.2})",
            "Rate range:".bold(),
            summary.min_rate,
            summary.max_rate,
            summary.mean_rate
        );
    }
}

fn train(paths: &ArtifactPaths) -> anyhow::Result<()> {
    let started = Instant::now();
    let pb = spinner("Training forecast model...")?;
    let result = Forecaster::new().run(paths);
    pb.finish_and_clear();
    let report = result?;

    print_training_report(&report);
    println!("  {} {:.2?}", "Elapsed:".bold(), started.elapsed());
    println!();
    Ok(())
}

fn print_training_report(report: &TrainingReport) {
    println!("{}", "Training Summary".green().bold());
    println!("{}", "================".green());
    println!("  {} {}", "Model:".bold(), report.model_name);
    println!(
        "  {} {} days ({} to {})",
        "History:".bold(),
        report.summary.count,
        report.summary.start_date,
        report.summary.end_date
    );
    println!(
        "  {} {:.2} on {}",
        "Latest rate:".bold(),
        report.latest.rate,
        report.latest.date
    );
    println!();

    println!("{}", "Next 7 days:".bold());
    for p in &report.next_days {
        println!(
            "  {}  {:.2}  [{:.2}, {:.2}]",
            p.date, p.yhat, p.yhat_lower, p.yhat_upper
        );
    }
    println!();

    println!(
        "  {} {:.2} on {} ({:+.2}, {:+.2}%)",
        "Horizon forecast:".bold(),
        report.horizon_point.yhat,
        report.horizon_point.date,
        report.change,
        report.change_pct
    );
    println!(
        "  {} {}",
        "Outlook:".bold(),
        direction_label(report.direction)
    );
}

fn direction_label(direction: Direction) -> ColoredString {
    match direction {
        Direction::Weakening => direction.label().red().bold(),
        Direction::Strengthening => direction.label().green().bold(),
    }
}

fn present(paths: &ArtifactPaths, output: Option<PathBuf>, no_html: bool) -> anyhow::Result<()> {
    let mut presenter = Presenter::new(paths.clone());
    let dashboard = match presenter.dashboard() {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("{} {}", "Error loading data:".red().bold(), e);
            process::exit(1);
        }
    };

    print_dashboard(&dashboard);

    if !no_html {
        let path = output.unwrap_or_else(|| paths.dashboard.clone());
        dashboard.save_html(&path)?;
        println!(
            "{} Dashboard written to {}",
            "✓".green().bold(),
            path.display().to_string().bright_green()
        );
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "{}",
        format!("{} Exchange Rate Predictor", dashboard.pair.quote.name())
            .cyan()
            .bold()
    );
    println!("{}", "================================".cyan());
    for card in dashboard.cards() {
        let delta = match card.tone {
            Tone::Good => card.delta.green(),
            Tone::Bad => card.delta.red(),
            Tone::Neutral => card.delta.dimmed(),
        };
        println!("  {:<16} {:>14}  {}", card.title.bold(), card.value, delta);
    }
    println!();

    let guidance = &dashboard.guidance;
    let headline = match guidance.direction {
        Direction::Weakening => guidance.headline.yellow().bold(),
        Direction::Strengthening => guidance.headline.green().bold(),
    };
    println!("{}", "What This Means For You".bold());
    println!("  {}", headline);
    println!("  {}", "For Individuals:".bold());
    for item in &guidance.individuals {
        println!("    - {}", item);
    }
    println!("  {}", "For Businesses:".bold());
    for item in &guidance.businesses {
        println!("    - {}", item);
    }
    println!();

    println!(
        "{}",
        format!("Detailed {}-Day Forecast", dashboard.future().len()).bold()
    );
    println!(
        "  {:<14} {:>16} {:>14} {:>14}",
        "Date", "Predicted Rate", "Lower Bound", "Upper Bound"
    );
    for row in dashboard.forecast_rows() {
        println!(
            "  {:<14} {:>16} {:>14} {:>14}",
            row.date, row.predicted, row.lower, row.upper
        );
    }
    println!();

    println!(
        "  {} {}",
        "Model last trained:".bold(),
        dashboard.about.trained_at.format("%b %d, %Y %H:%M UTC")
    );
    println!();
}

fn run_pipeline(config: &Config, paths: &ArtifactPaths) -> anyhow::Result<()> {
    println!("{}", "[1/3] Fetching data".cyan().bold());
    fetch(config, paths).context("Fetch stage failed")?;

    println!("{}", "[2/3] Training model".cyan().bold());
    train(paths).context("Train stage failed")?;

    println!("{}", "[3/3] Presenting forecast".cyan().bold());
    present(paths, None, false)
}

fn show_info(config: &Config, paths: &ArtifactPaths) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "fx-forecast".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Data directory:".bold(), config.data_dir.display());
    println!("  {} {}", "Provider:".bold(), config.provider_url);
    println!(
        "  {} {}s",
        "Request timeout:".bold(),
        config.request_timeout_secs
    );
    println!();

    println!("{}", "Artifacts".bold());
    println!("{}", "=========".dimmed());
    for (label, path) in [
        ("Historical:", &paths.historical),
        ("Forecast:", &paths.forecast),
        ("Model:", &paths.model),
        ("Dashboard:", &paths.dashboard),
    ] {
        let status = if path.exists() {
            "present".green()
        } else {
            "missing".yellow()
        };
        println!("  {:<12} {} ({})", label.bold(), path.display(), status);
    }
    println!();

    if paths.historical.exists() {
        let series = HistoricalSeries::read_csv(&paths.historical)?;
        println!("{}", "Historical Data".bold());
        println!("{}", "===============".dimmed());
        print_series(&series);
        println!();
    }

    if paths.model.exists() {
        let model = FittedAdditiveModel::load_json(&paths.model)?;
        println!("{}", "Model".bold());
        println!("{}", "=====".dimmed());
        println!("  {} {}", "Name:".bold(), model.name());
        println!(
            "  {} {}",
            "Trained:".bold(),
            model.fitted_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!(
            "  {} {} days ({} to {})",
            "History:".bold(),
            model.history_len,
            model.history_start,
            model.history_end
        );
        println!("  {} {}", "Changepoints:".bold(), model.changepoint_count());
        println!("  {} {:.4}", "Residual sd:".bold(), model.residual_sd());
        println!();
    }

    if paths.forecast.exists() {
        let forecast = ForecastTable::read_csv(&paths.forecast)?;
        if let Some(last) = forecast.last() {
            println!(
                "  {} {} rows through {}",
                "Forecast:".bold(),
                forecast.len(),
                last.date
            );
            println!();
        }
    }

    Ok(())
}
