//! Social Pulse - social post engagement dashboard
//!
//! Runs the desktop dashboard by default; the other subcommands compute the
//! same views headlessly.

use anyhow::Context;
use clap::{Parser, Subcommand};
use eframe::egui;
use social_pulse::charts::{StaticChartRenderer, WordCloudImage, TREND_HEIGHT, TREND_WIDTH};
use social_pulse::config::{DashboardConfig, FilterArgs};
use social_pulse::dashboard::DashboardPass;
use social_pulse::data::export::{write_export, EXPORT_FILE_NAME};
use social_pulse::data::{DataLoader, HttpCsvSource};
use social_pulse::gui::SocialPulseApp;
use social_pulse::stats::{format_count, format_rate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "social_pulse=info";

#[derive(Debug, Parser)]
#[command(name = "social-pulse")]
#[command(about = "Engagement dashboard for a CSV snapshot of social posts")]
struct Cli {
    #[command(flatten)]
    config: DashboardConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the desktop dashboard (default).
    Dashboard,
    /// Print the landing and filtered KPIs with the leaderboards.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write the filtered view as CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// Render the word cloud of the whole snapshot as PNG.
    Wordcloud {
        #[arg(long, default_value = "wordcloud.png")]
        out: PathBuf,
    },
    /// Render the daily trend of the filtered view as PNG.
    Trend {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "trend.png")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let source = Arc::new(HttpCsvSource::new(cli.config.http_timeout()).context("building HTTP client")?);

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => run_dashboard(cli.config, source),
        Commands::Summary { filters, json } => {
            let pass = headless_pass(&cli.config, source, &filters)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pass.report())?);
            } else {
                print_summary(&pass);
            }
            Ok(())
        }
        Commands::Export { filters, out } => {
            let pass = headless_pass(&cli.config, source, &filters)?;
            write_export(&pass.filtered, &out).with_context(|| format!("writing {}", out.display()))?;
            Ok(())
        }
        Commands::Wordcloud { out } => {
            let table = load_table(&cli.config, source)?;
            match StaticChartRenderer::wordcloud_for_table(&table)? {
                WordCloudImage::Png { png, words } => {
                    std::fs::write(&out, png).with_context(|| format!("writing {}", out.display()))?;
                    info!(path = %out.display(), words, "word cloud written");
                }
                other => info!(reason = other.placeholder().unwrap_or_default(), "word cloud skipped"),
            }
            Ok(())
        }
        Commands::Trend { filters, out } => {
            let pass = headless_pass(&cli.config, source, &filters)?;
            let png = StaticChartRenderer::render_trend_png(&pass.trend, TREND_WIDTH, TREND_HEIGHT)?;
            std::fs::write(&out, png).with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), days = pass.trend.len(), "trend chart written");
            Ok(())
        }
    }
}

fn run_dashboard(config: DashboardConfig, source: Arc<HttpCsvSource>) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Social Pulse"),
        ..Default::default()
    };

    eframe::run_native(
        "Social Pulse",
        options,
        Box::new(move |cc| Ok(Box::new(SocialPulseApp::new(cc, config, source)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}

fn load_table(config: &DashboardConfig, source: Arc<HttpCsvSource>) -> anyhow::Result<polars::prelude::DataFrame> {
    let mut loader = DataLoader::new(source, config.cache_ttl());
    loader
        .load(&config.csv_url, Instant::now())
        .with_context(|| format!("loading {}", config.csv_url))
}

fn headless_pass(config: &DashboardConfig, source: Arc<HttpCsvSource>, filters: &FilterArgs) -> anyhow::Result<DashboardPass> {
    let table = load_table(config, source)?;
    let request = filters.to_request(&table, config.top_tokens)?;
    Ok(DashboardPass::compute(&table, &request)?)
}

fn print_summary(pass: &DashboardPass) {
    let landing = &pass.landing;
    println!("Snapshot");
    println!("  posts     {}", format_count(landing.total_posts as i64));
    println!("  views     {}", format_count(landing.total_views));
    println!("  likes     {}", format_count(landing.total_likes));
    println!("  retweets  {}", format_count(landing.total_retweets));

    let summary = &pass.summary;
    println!("Filtered view");
    println!("  posts         {}", format_count(summary.posts as i64));
    println!("  views         {}", format_count(summary.views));
    println!("  interactions  {}", format_count(summary.interactions));
    println!("  avg ER        {}", format_rate(summary.avg_er));

    println!("Top hashtags");
    for c in &pass.hashtags {
        println!("  {:<30} {}", c.token, c.count);
    }
    println!("Top mentions");
    for c in &pass.mentions {
        println!("  {:<30} {}", c.token, c.count);
    }
    println!("Top authors by engagement");
    for s in &pass.authors {
        println!("  {:<30} {:>14} ({} posts)", s.display_name(), format_count(s.engagement), s.posts);
    }
}
