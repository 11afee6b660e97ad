mod entries;
mod render;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use agentdesk_config::DeskConfig;
use agentdesk_cron::{CalendarController, snapshot_channel};
use agentdesk_storage::CalendarStore;
use agentdesk_types::{EntryKind, NewCalendarEntry};

#[derive(Parser)]
#[command(name = "agentdesk", about = "Agent schedule calendar")]
struct Cli {
    /// SQLite database path (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month calendar with scheduled entries
    Calendar {
        /// Year to show (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show, 1-12 (defaults to the current month)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Months to move forward (negative moves back)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// List all scheduled entries
    List,
    /// Show details for one entry
    Show {
        /// Entry ID
        id: String,
    },
    /// Enable or disable an entry
    Toggle {
        /// Entry ID
        id: String,
    },
    /// Create an entry, or update the one with the same title
    Add {
        #[arg(long)]
        title: String,

        /// Five-field cron expression (e.g. "0 9 * * 1,3,5")
        #[arg(long)]
        cron: String,

        /// Human-readable schedule
        #[arg(long, default_value = "")]
        schedule: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Entry type: cron or task
        #[arg(long = "type", default_value = "cron")]
        kind: EntryKind,

        /// Owning agent ID
        #[arg(long, default_value = "default")]
        agent: String,

        /// Create the entry disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Keep the calendar on screen, refreshing when entries change
    Watch {
        /// Seconds between reloads (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Months to move forward from the current month
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = agentdesk_config::load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {e}");
        DeskConfig::default()
    });

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli, config))
}

async fn run(cli: Cli, config: DeskConfig) -> anyhow::Result<()> {
    let store = Arc::new(open_store(cli.db, &config)?);
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Calendar {
            year,
            month,
            offset,
        } => {
            let (publisher, feed) = snapshot_channel();
            let mut ctl = CalendarController::new(feed, store.clone(), today);
            let view = ctl.view();
            ctl.set_view(
                year.unwrap_or(view.year),
                month.map(|m| m - 1).unwrap_or(view.month0),
            )?;
            ctl.shift(offset);

            publisher.publish(store.list_all().await?);
            let snapshot = ctl.snapshot();
            let grid = ctl.build(&snapshot, today)?;
            print!("{}", render::render_month(&grid));
        }
        Commands::List => {
            let entries = store.list_all().await?;
            print!("{}", render::render_list(&entries));
        }
        Commands::Show { id } => {
            entries::show(&store, &id).await?;
        }
        Commands::Toggle { id } => {
            entries::toggle(store, &id, today).await?;
        }
        Commands::Add {
            title,
            cron,
            schedule,
            description,
            kind,
            agent,
            disabled,
        } => {
            let new = NewCalendarEntry {
                title,
                description,
                schedule,
                cron_expr: cron,
                enabled: !disabled,
                kind,
                next_run_at: None,
                last_run_at: None,
                agent_id: agent,
            };
            entries::add(&store, new).await?;
        }
        Commands::Watch { interval, offset } => {
            let interval = interval
                .map(|secs| std::time::Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.feed.poll_interval());
            watch::run_watch(store, interval, offset).await?;
        }
    }

    Ok(())
}

fn open_store(db: Option<PathBuf>, config: &DeskConfig) -> anyhow::Result<CalendarStore> {
    let path = match db {
        Some(path) => path,
        None => config.storage.resolve_path()?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    CalendarStore::open(&path).with_context(|| format!("opening {}", path.display()))
}
