//! Usher Rota CLI - submit volunteer batches and assign duty positions

mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use logging::LogFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use usher_rota_core::application::{AssignmentService, ProcessorConfig, SubmitRequest};
use usher_rota_core::domain::{Event, NewVolunteer, Position, SubmittingGroup};
use usher_rota_core::port::id_provider::UuidProvider;
use usher_rota_core::port::time_provider::SystemTimeProvider;
use usher_rota_core::port::{FeatureFlags, PositionRepository, VolunteerRepository};
use usher_rota_core::AppError;
use usher_rota_infra_sqlite::{
    create_pool, database_url, run_migrations, SqliteFeatureFlags, SqlitePositionRepository,
    SqliteVolunteerRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.usher-rota/rota.db";
const NO_POSITIONS_MESSAGE: &str = "this event's service has no duty positions configured yet";
const RETRY_HINT: &str = "assignment failed; the batch stays queued, run `usher-rota assign` to retry";

#[derive(Parser)]
#[command(name = "usher-rota")]
#[command(about = "Assign event ushers to duty positions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file (or a full sqlite: URL)
    #[arg(long, env = "USHER_ROTA_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Per-batch processing timeout in milliseconds
    #[arg(long, env = "USHER_ROTA_ITEM_TIMEOUT_MS")]
    item_timeout_ms: Option<u64>,

    #[arg(long, env = "USHER_ROTA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long, env = "USHER_ROTA_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

/// Church and mass whose position catalog applies
#[derive(clap::Args, Debug, Clone)]
struct MassArgs {
    #[arg(long)]
    church: String,

    #[arg(long)]
    mass: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Manage the duty positions of a mass
    Position {
        #[command(subcommand)]
        action: PositionCommand,
    },

    /// Submit a group's volunteers for an event and assign them
    Submit {
        #[command(flatten)]
        mass: MassArgs,

        #[arg(long)]
        event: String,

        #[arg(long)]
        group: String,

        /// Display name of the group
        #[arg(long)]
        group_name: Option<String>,

        /// JSON array of volunteers: [{"name": "...", "restricted_role": true}, ...]
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Re-run assignment for groups already submitted to an event
    Assign {
        #[command(flatten)]
        mass: MassArgs,

        #[arg(long)]
        event: String,

        /// Groups to process, in order
        #[arg(long = "group", required = true)]
        groups: Vec<String>,
    },

    /// Show every volunteer of an event with their position
    Roster {
        #[command(flatten)]
        mass: MassArgs,

        #[arg(long)]
        event: String,
    },

    /// Read or change feature flags
    Flag {
        #[command(subcommand)]
        flag: FlagCommand,
    },
}

#[derive(Subcommand)]
enum PositionCommand {
    /// Add a position, or update it if the id exists
    Add {
        #[command(flatten)]
        mass: MassArgs,

        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// Round-robin order within the pool
        #[arg(long)]
        sequence: i64,

        /// Reserved for restricted-role volunteers when role mode is on
        #[arg(long)]
        restricted: bool,

        #[arg(long)]
        zone: Option<String>,
    },

    /// List the active positions of a mass
    List {
        #[command(flatten)]
        mass: MassArgs,
    },

    /// Retire a position from its catalog
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum FlagCommand {
    /// Role-partitioned distribution
    RoleMode {
        #[arg(value_enum)]
        state: FlagState,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlagState {
    On,
    Off,
    Show,
}

/// Wired adapters plus the service built on them
struct App {
    positions: Arc<SqlitePositionRepository>,
    volunteers: Arc<SqliteVolunteerRepository>,
    flags: Arc<SqliteFeatureFlags>,
    service: AssignmentService,
}

impl App {
    async fn connect(db_path: &str, config: ProcessorConfig) -> Result<Self> {
        let url = resolve_database_url(db_path)?;
        info!(database_url = %url, "Opening database");

        let pool = create_pool(&url)
            .await
            .with_context(|| format!("DB pool creation failed for {url}"))?;
        run_migrations(&pool).await.context("Migration failed")?;

        let positions = Arc::new(SqlitePositionRepository::new(pool.clone()));
        let volunteers = Arc::new(SqliteVolunteerRepository::new(pool.clone()));
        let flags = Arc::new(SqliteFeatureFlags::new(pool));

        let service = AssignmentService::new(
            positions.clone(),
            volunteers.clone(),
            flags.clone(),
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
            config,
        );

        Ok(Self {
            positions,
            volunteers,
            flags,
            service,
        })
    }

    async fn process(&self) -> Result<()> {
        match self.service.process_queue().await {
            Ok(summary) => {
                output::print_summary(&summary);
                Ok(())
            }
            Err(e) => Err(failure_context(e)),
        }
    }
}

/// Expand `~` in a file path and make sure its directory exists
fn resolve_database_url(db_path: &str) -> Result<String> {
    if db_path.starts_with("sqlite:") {
        return Ok(db_path.to_string());
    }

    let expanded = shellexpand::tilde(db_path).into_owned();
    let path = Path::new(&expanded);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create database directory {}", parent.display()))?;
    }
    Ok(database_url(path))
}

/// Attach the operator-facing explanation; `main` prints the chain once
fn failure_context(err: AppError) -> anyhow::Error {
    let hint = if err.is_configuration_fatal() {
        NO_POSITIONS_MESSAGE
    } else {
        RETRY_HINT
    };
    anyhow::Error::new(err).context(hint)
}

fn read_volunteers(file: &Path) -> Result<Vec<NewVolunteer>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid volunteer list in {}", file.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_format, cli.log_dir.as_deref());

    info!("Usher Rota v{} starting...", VERSION);

    let config = ProcessorConfig {
        item_timeout: cli.item_timeout_ms.map(Duration::from_millis),
    };
    let app = App::connect(&cli.db_path, config).await?;

    match cli.command {
        Commands::Migrate => {
            println!("{}", "✓ Database schema up to date".green().bold());
        }

        Commands::Position { action } => match action {
            PositionCommand::Add {
                mass,
                id,
                name,
                sequence,
                restricted,
                zone,
            } => {
                let mut position = Position::new(id, name, sequence);
                position.restricted = restricted;
                position.zone = zone;
                app.positions
                    .upsert(&mass.church, &mass.mass, &position)
                    .await?;
                println!(
                    "{}",
                    format!("✓ Position {} saved", position.id).green().bold()
                );
            }
            PositionCommand::List { mass } => {
                let catalog = app.positions.fetch_for_mass(&mass.church, &mass.mass).await?;
                output::print_catalog(&catalog);
            }
            PositionCommand::Remove { id } => {
                if app.positions.deactivate(&id).await? {
                    println!("{}", format!("✓ Position {} retired", id).green().bold());
                } else {
                    anyhow::bail!("No position with id {}", id);
                }
            }
        },

        Commands::Submit {
            mass,
            event,
            group,
            group_name,
            file,
        } => {
            let mut submitting_group = SubmittingGroup::new(group);
            submitting_group.name = group_name;
            let req = SubmitRequest {
                event: Event::new(event, mass.church, mass.mass),
                group: submitting_group,
                volunteers: read_volunteers(&file)?,
            };

            let (ticket, created) = app.service.submit(req).await?;
            println!(
                "{}",
                format!("✓ {} volunteer(s) submitted (batch #{})", created.len(), ticket)
                    .green()
                    .bold()
            );
            app.process().await?;
        }

        Commands::Assign {
            mass,
            event,
            groups,
        } => {
            for group in groups {
                app.service.enqueue(
                    Event::new(event.clone(), mass.church.clone(), mass.mass.clone()),
                    SubmittingGroup::new(group),
                );
            }
            app.process().await?;
        }

        Commands::Roster { mass, event } => {
            let volunteers = app.volunteers.fetch_for_event(&event).await?;
            let catalog = app.positions.fetch_for_mass(&mass.church, &mass.mass).await?;
            output::print_roster(&volunteers, &catalog);
        }

        Commands::Flag {
            flag: FlagCommand::RoleMode { state },
        } => {
            match state {
                FlagState::On => app.flags.set_role_mode(true).await?,
                FlagState::Off => app.flags.set_role_mode(false).await?,
                FlagState::Show => {}
            }
            let enabled = app.flags.is_role_mode_enabled().await?;
            let label = if enabled { "on".green() } else { "off".yellow() };
            println!("  {} {}", "Role mode:".bold(), label);
        }
    }

    Ok(())
}
