//! PhotoLog CLI
//!
//! Command-line shell over the local diary store:
//! - Browse diaries by year and month
//! - Add, edit and delete diaries
//! - Search, statistics and photo listing

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use photolog::config::generate_default_config;
use photolog::{
    photo_grid, search, BrowseService, Calendar, Config, DiaryRecord, DiaryRepository, DiaryStats,
    LoggingConfig, NewDiary, RefreshOutcome, SqliteRepository, YearMonth,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "photolog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Photo diary browser")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/photolog/config.toml or ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner whose diaries to use (overrides config)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List years and their months that have diaries
    Years,

    /// List months of a year that have diaries
    Months {
        year: i32,
    },

    /// List diaries of a month (default: latest month)
    List {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Save a new diary
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
        /// Photo reference (URL or path)
        #[arg(short, long)]
        image: Option<String>,
        /// Creation date: "now", YYYY-MM-DD or RFC 3339
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Change title and content of a diary
    Edit {
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
    },

    /// Delete a diary
    Delete {
        id: String,
    },

    /// Search titles and content
    Search {
        keyword: String,
    },

    /// Show diary statistics
    Stats,

    /// List photos, most recent first
    Photos,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(owner) = &cli.owner {
        config.diary.owner_id = owner.clone();
    }

    init_logging(&config.logging);

    let data_dir = config.storage.data_path();
    let repo = Arc::new(
        SqliteRepository::open(&data_dir)
            .with_context(|| format!("opening diary store in {}", data_dir.display()))?,
    );
    let owner = config.diary.owner_id.clone();
    let calendar = config.diary.calendar();
    let json = cli.format == "json";

    match cli.command {
        Commands::Years => {
            let service = browse(repo, &owner, calendar).await?;
            let nav = service.navigator();
            let nav = nav.read().await;
            let years: Vec<(i32, Vec<u32>)> = nav
                .years()
                .into_iter()
                .map(|year| (year, nav.months_for(year)))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&years)?);
            } else if years.is_empty() {
                println!("No diaries yet.");
            } else {
                for (year, months) in years {
                    let months: Vec<String> = months.iter().map(u32::to_string).collect();
                    println!("{}: {}", year, months.join(", "));
                }
            }
        }

        Commands::Months { year } => {
            let service = browse(repo, &owner, calendar).await?;
            let months = service.navigator().read().await.months_for(year);
            if json {
                println!("{}", serde_json::to_string(&months)?);
            } else {
                for month in months {
                    println!("{}", month);
                }
            }
        }

        Commands::List { year, month } => {
            let service = browse(repo, &owner, calendar).await?;
            match (year, month) {
                (Some(year), Some(month)) => {
                    let ym = YearMonth::new(year, month).context("month must be between 1 and 12")?;
                    service.select(ym).await;
                }
                (Some(year), None) => {
                    service.select_year(year).await;
                }
                (None, Some(month)) => {
                    service.select_month(month).await;
                }
                (None, None) => {}
            }

            let selected = service.navigator().read().await.current_selection();
            let records = service.load_selection().await?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "selection": selected,
                        "diaries": records,
                    }))?
                );
            } else {
                match selected {
                    Some(ym) => {
                        println!("{}", ym);
                        print_records(&records, calendar);
                    }
                    None => println!("No diaries yet. Write your first one!"),
                }
            }
        }

        Commands::Add {
            title,
            content,
            image,
            date,
        } => {
            let created_at = parse_date(date.as_deref(), calendar)?;
            let mut diary = NewDiary::new(title, content).created_at(created_at);
            if let Some(image) = image {
                diary = diary.image(image);
            }

            let saved = repo.insert(&owner, diary).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else {
                println!("Saved diary {}", saved.id);
            }
        }

        Commands::Edit { id, title, content } => {
            let updated = repo.update(&owner, &id, &title, &content).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                println!("Updated diary {}", updated.id);
            }
        }

        Commands::Delete { id } => {
            repo.delete(&owner, &id).await?;
            println!("Deleted diary {}", id);
        }

        Commands::Search { keyword } => {
            let records = repo.list(&owner).await?;
            let found = search(&records, &keyword);
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                println!("No diaries match \"{}\".", keyword);
            } else {
                print_records(&found, calendar);
            }
        }

        Commands::Stats => {
            let records = repo.list(&owner).await?;
            let stats = DiaryStats::compute(&records, calendar);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Diaries written: {}", stats.total);
                println!("With photo:      {}", stats.with_photo);
                if stats.undated > 0 {
                    println!("Undated:         {}", stats.undated);
                }
                if let (Some(first), Some(last)) = (stats.first, stats.last) {
                    println!(
                        "Span:            {} .. {}",
                        calendar.naive(first).format("%Y-%m-%d"),
                        calendar.naive(last).format("%Y-%m-%d")
                    );
                }
                if let Some((ym, count)) = stats.busiest_month() {
                    println!("Busiest month:   {} ({} diaries)", ym, count);
                }
                for (ym, count) in &stats.per_month {
                    println!("  {}  {}", ym, count);
                }
            }
        }

        Commands::Photos => {
            let records = repo.list(&owner).await?;
            let grid = photo_grid(&records);
            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                for item in grid {
                    println!("{}  {}", item.diary_id, item.image_ref);
                }
            }
        }

        Commands::Config { .. } => unreachable!("handled before loading config"),
    }

    Ok(())
}

/// Initialize logging to stderr; `RUST_LOG` takes precedence over the config
fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("photolog={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Build a browse service and load the index
async fn browse(
    repo: Arc<SqliteRepository>,
    owner: &str,
    calendar: Calendar,
) -> anyhow::Result<BrowseService> {
    let service = BrowseService::new(repo, owner, calendar);
    match service.refresh().await {
        RefreshOutcome::Failed(e) => Err(e).context("loading diaries"),
        _ => Ok(service),
    }
}

/// Parse a creation date: "now", YYYY-MM-DD (start of day in `calendar`) or RFC 3339
fn parse_date(input: Option<&str>, calendar: Calendar) -> anyhow::Result<DateTime<Utc>> {
    match input {
        None | Some("now") => Ok(Utc::now()),
        Some(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                Ok(dt.with_timezone(&Utc))
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(calendar.start_of_day(date))
            } else {
                bail!("Invalid date: {} (expected YYYY-MM-DD or RFC 3339)", s)
            }
        }
    }
}

fn print_records(records: &[DiaryRecord], calendar: Calendar) {
    for record in records {
        let date = record
            .created_at
            .map(|at| calendar.naive(at).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        let photo = if record.image_ref.is_some() { "📷" } else { "  " };
        println!("{}  {} {}  {}", date, photo, record.id, record.title);
    }
}
