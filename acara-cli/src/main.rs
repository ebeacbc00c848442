mod commands;
mod render;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use acara_core::auth::AuthService;
use acara_core::cache::EventCache;
use acara_core::clock::{Clock, SystemClock};
use acara_core::config::AcaraConfig;
use acara_core::gateway::EventGateway;
use acara_core::storage::{JsonFileStorage, Storage};
use acara_core::store::SortOrder;

#[derive(Parser)]
#[command(name = "acara")]
#[command(about = "Manage events and keep them in sync with the remote webhook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortOrder::Ascending,
            SortArg::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the event collection, from cache or the webhook
    Sync {
        /// Bypass the cache validity window
        #[arg(short, long)]
        force: bool,
    },
    /// List cached events
    List {
        /// Case-insensitive match against title, location, and id
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order over event date/time
        #[arg(long, value_enum, default_value_t = SortArg::Desc)]
        sort: SortArg,

        /// Page to show (10 events per page)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one event in full
    Show {
        /// Event id
        id: String,
    },
    /// Submit a new event (requires an open session)
    Add(commands::add::AddArgs),
    /// Request an OTP and open a session
    Login {
        /// Discard any pending code and request a new one
        #[arg(long)]
        resend: bool,
    },
    /// Close the session
    Logout,
    /// Session and cache status
    Status {
        /// Keep refreshing every minute
        #[arg(short, long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = AcaraConfig::load()?;
    let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::default_location()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = EventCache::new(
        Arc::clone(&storage),
        EventGateway::new(),
        config.clone(),
        Arc::clone(&clock),
    );
    let auth = AuthService::new(
        Arc::clone(&storage),
        Arc::clone(&clock),
        config.otp_webhook_url.clone(),
        config.admin_phone.clone(),
    );

    match cli.command {
        Commands::Sync { force } => commands::sync::run(&cache, force).await,
        Commands::List { search, sort, page } => {
            commands::list::run(storage, search, sort.into(), page)
        }
        Commands::Show { id } => commands::show::run(storage, &id),
        Commands::Add(args) => commands::add::run(&cache, &auth, storage, args).await,
        Commands::Login { resend } => commands::login::run(&auth, resend).await,
        Commands::Logout => commands::logout::run(&auth),
        Commands::Status { watch } => commands::status::run(&cache, &auth, watch).await,
    }
}
