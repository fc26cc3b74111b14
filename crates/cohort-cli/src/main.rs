use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use cohort_core::CohortConfig;
use cohort_core::config::LoggingConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "cohort",
    about = "Cohortgrid — balanced enrollment groups",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to cohort.toml (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "cohort.toml")]
    config: PathBuf,
    /// Override the store path from the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonAction,
    },
    /// Enroll a user into a product
    Enroll {
        #[arg(short, long)]
        product: String,
        #[arg(short, long)]
        user: String,
    },
    /// Show the groups of a product
    Groups {
        #[arg(short, long)]
        product: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List the lessons a user can access
    Lessons {
        #[arg(short, long)]
        user: String,
        /// Restrict to one product
        #[arg(short, long)]
        product: Option<String>,
    },
    /// Per-product lesson, user and group counts
    Stats {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run the balancer over N sequential enrollments without a store.
    ///
    /// Prints the placement and the group sizes after every event.
    Simulate {
        #[arg(long)]
        min: Option<u32>,
        #[arg(long)]
        max: Option<u32>,
        #[arg(short, long, default_value = "12")]
        users: usize,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create or update a product
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Minimum group size (default from config)
        #[arg(long)]
        min: Option<u32>,
        /// Maximum group size (default from config)
        #[arg(long)]
        max: Option<u32>,
        #[arg(long, default_value = "0")]
        price_cents: u64,
        #[arg(long, default_value = "")]
        creator: String,
        /// Start time as unix seconds
        #[arg(long, default_value = "0")]
        start: u64,
    },
    /// List products
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
enum LessonAction {
    /// Add a lesson to a product
    Add {
        #[arg(long)]
        product: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        video_url: String,
    },
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.filter))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CohortConfig::load_or_default(&cli.config)?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }
    init_tracing(&config.logging)?;
    debug!(config = ?cli.config, store = ?config.store.path, "configuration loaded");

    match cli.command {
        Commands::Product { action } => match action {
            ProductAction::Add {
                id,
                name,
                min,
                max,
                price_cents,
                creator,
                start,
            } => {
                let args = commands::product::AddArgs {
                    id,
                    name,
                    min,
                    max,
                    price_cents,
                    creator,
                    start,
                };
                commands::product::add(&config, args).await
            }
            ProductAction::List { format } => commands::product::list(&config, &format),
        },
        Commands::Lesson { action } => match action {
            LessonAction::Add {
                product,
                id,
                name,
                video_url,
            } => commands::lesson::add(&config, &product, &id, &name, &video_url),
        },
        Commands::Enroll { product, user } => commands::enroll::enroll(&config, &product, &user).await,
        Commands::Groups { product, format } => commands::report::groups(&config, &product, &format),
        Commands::Lessons { user, product } => {
            commands::report::lessons(&config, &user, product.as_deref())
        }
        Commands::Stats { format } => commands::report::stats(&config, &format),
        Commands::Simulate {
            min,
            max,
            users,
            format,
        } => {
            let min = min.unwrap_or(config.defaults.min_group_capacity);
            let max = max.unwrap_or(config.defaults.max_group_capacity);
            commands::simulate::simulate(min, max, users, &format)
        }
    }
}
