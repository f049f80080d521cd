use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Parser;
use freshnyam_core::{
    expiry, Config, Item, ItemManager, LogNotifier, NewItem, SortOrder, StorageLocation, ViewMode,
};
use freshnyam_store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "freshnyam")]
#[command(version, about = "Track what's in the fridge before it goes bad", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "FRESHNYAM_CONFIG")]
    config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true, env = "FRESHNYAM_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add an item
    Add {
        name: String,
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// fridge, freezer or roomtemp
        #[arg(short, long, value_parser = parse_storage, default_value = "fridge")]
        storage: StorageLocation,
        /// YYYY-MM-DD or an RFC 3339 timestamp
        #[arg(short, long, value_parser = parse_expiry)]
        expires: DateTime<Utc>,
        #[arg(short, long, default_value = "")]
        icon: String,
    },
    /// List items
    List {
        /// name, expiry or category
        #[arg(long, value_parser = parse_sort, default_value = "expiry")]
        sort: SortOrder,
        /// Group by storage location
        #[arg(long)]
        group: bool,
    },
    /// Find items by name
    Search { query: String },
    /// Show items close to (or past) expiry
    Soon {
        /// Override the configured threshold
        #[arg(long)]
        days: Option<i64>,
    },
    /// Replace fields of an existing item
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_storage)]
        storage: Option<StorageLocation>,
        #[arg(long, value_parser = parse_expiry)]
        expires: Option<DateTime<Utc>>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete items by id
    Delete {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Show or set the view mode
    ViewMode {
        #[arg(value_parser = parse_view_mode)]
        mode: Option<ViewMode>,
    },
    /// Search the icon catalog
    Icons {
        #[arg(default_value = "")]
        query: String,
    },
    /// Export all items as JSON
    Export {
        /// File or directory; defaults to items_<timestamp>.json
        path: Option<PathBuf>,
    },
    /// Replace all items with a JSON export
    Import { path: PathBuf },
    /// Show where the config lives
    Config {
        /// Write the effective config to that file
        #[arg(long)]
        init: bool,
    },
}

#[derive(clap::Subcommand)]
enum CategoryCommand {
    List,
    Add { name: String },
    Delete { index: usize },
    Rename { old: String, new: String },
    /// Move the categories at FROM so they start at TO
    Move {
        #[arg(required = true, num_args = 1..)]
        from: Vec<usize>,
        #[arg(long)]
        to: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freshnyam=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let db_path = match cli.db {
        Some(path) => path,
        None => config.db_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {:?}", parent))?;
    }

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("opening database {:?}", db_path))?;
    let mut manager = ItemManager::new(store, Arc::new(LogNotifier), &config);
    let mut events = manager.subscribe();

    let Some(command) = cli.command else {
        println!("No command specified. Try --help");
        return Ok(());
    };

    match command {
        Commands::Add {
            name,
            category,
            storage,
            expires,
            icon,
        } => {
            warn_unknown_icon(&manager, &icon);
            let item = manager
                .add_item(NewItem::new(name, category, storage, expires).with_image(icon))
                .await;
            println!("Added {} ({})", item.name, item.id);
        }
        Commands::List { sort, group } => {
            let items = manager.sorted_items(sort);
            if group {
                for location in StorageLocation::all() {
                    let in_location: Vec<&Item> =
                        items.iter().filter(|i| i.storage == location).collect();
                    if in_location.is_empty() {
                        continue;
                    }
                    println!("== {} ({})", location, in_location.len());
                    for item in in_location {
                        print_item(item);
                    }
                }
            } else {
                items.iter().for_each(print_item);
            }
        }
        Commands::Search { query } => {
            for item in manager.search_items(&query) {
                print_item(item);
            }
        }
        Commands::Soon { days } => {
            let days = days.unwrap_or(config.expiry.soon_threshold_days);
            for item in manager.expiring_within(days, Utc::now()) {
                print_item(item);
            }
        }
        Commands::Update {
            id,
            name,
            category,
            storage,
            expires,
            icon,
        } => {
            let Some(mut item) = manager.get(id).cloned() else {
                println!("No item with id {}", id);
                return Ok(());
            };
            if let Some(name) = name {
                item.name = name;
            }
            if let Some(category) = category {
                item.category = category;
            }
            if let Some(storage) = storage {
                item.storage = storage;
            }
            if let Some(expires) = expires {
                item.expiry_date = expires;
            }
            if let Some(icon) = icon {
                warn_unknown_icon(&manager, &icon);
                item.image_name = icon;
            }
            manager.update_item(item).await;
            println!("Updated {}", id);
        }
        Commands::Delete { ids } => {
            let removed = manager.delete_items(&ids).await;
            println!("Deleted {} item(s)", removed.len());
        }
        Commands::Category(command) => run_category(&mut manager, command),
        Commands::ViewMode { mode } => {
            if let Some(mode) = mode {
                manager.set_view_mode(mode);
            }
            println!("{}", manager.view_mode());
        }
        Commands::Icons { query } => {
            for (category, icons) in manager.catalog().search(&query) {
                println!("{}: {}", category, icons.join(", "));
            }
        }
        Commands::Export { path } => {
            let target = path.or_else(|| config.export.directory.clone());
            let written = manager.export_to_file(target.as_deref())?;
            println!("Exported {} items to {}", manager.items().len(), written.display());
        }
        Commands::Import { path } => {
            let summary = manager
                .import_from_file(&path)
                .await
                .with_context(|| format!("importing {:?}", path))?;
            println!(
                "Imported {} items (replaced {})",
                summary.imported, summary.replaced
            );
        }
        Commands::Config { init } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            if init {
                config.save_to(&path)?;
                println!("Wrote {}", path.display());
            } else {
                println!("{}", path.display());
            }
        }
    }

    while let Ok(event) = events.try_recv() {
        tracing::debug!("{}", event.description());
    }

    Ok(())
}

fn run_category(manager: &mut ItemManager, command: CategoryCommand) {
    match command {
        CategoryCommand::List => {
            for (index, category) in manager.categories().iter().enumerate() {
                println!("{:>3}  {}", index, category);
            }
        }
        CategoryCommand::Add { name } => manager.add_category(name),
        CategoryCommand::Delete { index } => match manager.delete_category(index) {
            Some(removed) => println!("Deleted {}", removed),
            None => println!("No category at index {}", index),
        },
        CategoryCommand::Rename { old, new } => {
            if !manager.update_category(&old, new) {
                println!("No category named {}", old);
            }
        }
        CategoryCommand::Move { from, to } => manager.move_category(&from, to),
    }
}

fn warn_unknown_icon(manager: &ItemManager, icon: &str) {
    if !icon.is_empty() && !manager.catalog().contains_icon(icon) {
        tracing::warn!("Icon '{}' is not in the catalog", icon);
    }
}

fn print_item(item: &Item) {
    let now = Utc::now();
    println!(
        "{}  {:<6} {:<20} {:<12} {:<17} {}",
        item.id,
        expiry::expiry_label(item.expiry_date, now),
        item.name,
        item.category,
        item.storage.to_string(),
        item.expiry_date.with_timezone(&Local).format("%Y-%m-%d"),
    );
}

fn parse_storage(s: &str) -> Result<StorageLocation, String> {
    StorageLocation::from_str_opt(s)
        .ok_or_else(|| format!("unknown storage '{}', use fridge, freezer or roomtemp", s))
}

fn parse_sort(s: &str) -> Result<SortOrder, String> {
    SortOrder::from_str_opt(s).ok_or_else(|| format!("unknown sort '{}'", s))
}

fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    ViewMode::from_str_opt(s).ok_or_else(|| format!("unknown view mode '{}', use grid or list", s))
}

/// Bare dates mean local midnight
fn parse_expiry(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", s, e))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date '{}'", s))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local timezone", s))
}
