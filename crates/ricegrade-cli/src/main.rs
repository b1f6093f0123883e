mod display;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use ricegrade_core::{
    Catalog, CreateInspection, HistoryQuery, Inspection, RawBatch, composition_rows,
};
use ricegrade_server::AppState;
use ricegrade_store::InspectionStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ricegrade", version, about = "Rice grain inspection grading")]
struct Cli {
    /// Standards catalog (JSON array of standards).
    #[arg(
        long,
        env = "RICEGRADE_STANDARDS",
        default_value = "data/standards.json",
        global = true
    )]
    standards: PathBuf,

    /// DuckDB file for inspections; in-memory when omitted.
    #[arg(long, env = "RICEGRADE_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
    },
    /// List the standards catalog.
    Standards,
    /// Grade a raw upload without storing anything.
    Score {
        #[arg(long)]
        standard: String,
        /// Raw upload JSON (`{ "grains": [...], "imageURL": ... }`).
        #[arg(long)]
        raw: PathBuf,
    },
    /// Grade a raw upload and store it as a new inspection.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        standard: String,
        #[arg(long)]
        raw: PathBuf,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long = "sampling-point")]
        sampling_point: Vec<String>,
        #[arg(long)]
        sampling_date: Option<String>,
    },
    /// List stored inspections, newest first.
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one inspection.
    Show { id: String },
    /// Delete inspections by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("ricegrade v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let catalog = Catalog::load_or_empty(&cli.standards);

    match cli.command {
        Command::Serve { host, port } => {
            let store = open_store(cli.db.as_deref())?;
            let state = AppState::new(catalog, store);
            ricegrade_server::serve(SocketAddr::new(host, port), state)
                .await
                .context("running HTTP server")?;
        }
        Command::Standards => display::print_standards(&catalog),
        Command::Score { standard, raw } => {
            let batch = read_raw(&raw)?;
            let grading = catalog
                .grade(&standard, &batch.grains)
                .with_context(|| format!("grading {}", raw.display()))?;
            println!(
                "{} (id {}), {} grains",
                standard,
                grading.standard_id,
                batch.grains.len()
            );
            display::print_composition(&composition_rows(&grading.standard_data));
        }
        Command::Create {
            name,
            standard,
            raw,
            note,
            price,
            sampling_point,
            sampling_date,
        } => {
            let store = open_store(cli.db.as_deref())?;
            if cli.db.is_none() {
                tracing::warn!("no --db given, inspection will not outlive this process");
            }
            let request = CreateInspection {
                name,
                note,
                standard_name: standard,
                sampling_date,
                sampling_point,
                price,
                raw: read_raw(&raw)?,
            };
            let grading = catalog.grade(&request.standard_name, &request.raw.grains)?;
            let id = uuid::Uuid::new_v4().simple().to_string();
            let inspection = Inspection::from_request(request, grading, id, Utc::now())?;
            store.insert(&inspection)?;
            display::print_inspection_card(&inspection);
        }
        Command::History { page, id, from, to } => {
            let store = open_store(cli.db.as_deref())?;
            let query = HistoryQuery {
                page: Some(page.to_string()),
                id,
                from,
                to,
            };
            let page = store.history(&query.resolve()?)?;
            display::print_history(&page);
        }
        Command::Show { id } => {
            let store = open_store(cli.db.as_deref())?;
            let inspection = store.get(&id)?;
            display::print_inspection_card(&inspection);
        }
        Command::Delete { ids } => {
            let store = open_store(cli.db.as_deref())?;
            let deleted = store.delete_many(&ids)?;
            if deleted == 0 {
                bail!("not found inspections");
            }
            println!("deleted {deleted} inspection(s)");
        }
    }

    Ok(())
}

fn open_store(db: Option<&Path>) -> anyhow::Result<InspectionStore> {
    let store = match db {
        Some(path) => InspectionStore::open_persistent(path)
            .with_context(|| format!("opening {}", path.display()))?,
        None => InspectionStore::open()?,
    };
    Ok(store)
}

fn read_raw(path: &Path) -> anyhow::Result<RawBatch> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let batch: RawBatch =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(batch)
}
