use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use salesdesk::admin::{AdminState, admin_router};
use salesdesk::cache::ViewCache;
use salesdesk::config::{Settings, redact_db_url};
use salesdesk::dashboard;
use salesdesk::editor::Editor;
use salesdesk::gateway::SeaGateway;
use sea_orm::Database;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "salesdesk", about = "SalesDesk admin back office for field sales")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the admin API server (default)
    Serve,
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Manage sales targets
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// Log a dashboard snapshot
    Dashboard,
}

#[derive(Subcommand)]
enum RoleAction {
    /// Overwrite a user's role token
    Set {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// Set a team leader's monthly target
    Set {
        #[arg(long)]
        team_leader: Uuid,
        #[arg(long)]
        value: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Init structured logging (respects RUST_LOG; defaults to info)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    tracing::info!(database = %redact_db_url(&settings.database_url), "connecting to database");

    let db = Database::connect(&settings.database_url).await?;
    if settings.run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("migrations applied");
    }

    let gateway = Arc::new(SeaGateway::new(db));

    match cli.command {
        None | Some(Commands::Serve) => serve(gateway, &settings).await?,
        Some(Commands::Role { action }) => handle_role_action(&gateway, action).await?,
        Some(Commands::Target { action }) => handle_target_action(&gateway, action).await?,
        Some(Commands::Dashboard) => {
            let snap = dashboard::snapshot(gateway.as_ref()).await;
            tracing::info!(
                total_sales = snap.metrics.total_sales,
                total_revenue = snap.metrics.total_revenue,
                approved_sales = snap.metrics.approved_sales,
                pending_sales = snap.metrics.pending_sales,
                total_dsrs = snap.metrics.total_dsrs,
                stock_in_hand = snap.metrics.stock_in_hand,
                total_stock = snap.metrics.total_stock,
                "dashboard"
            );
            for point in &snap.stock_by_type {
                tracing::info!(stock_type = %point.name, count = point.value, "stock by type");
            }
            for region in &snap.sales_by_region {
                tracing::info!(region = %region.name, sales = region.sales, "sales by region");
            }
        }
    }

    Ok(())
}

async fn serve(
    gateway: Arc<SeaGateway>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AdminState::new(gateway, settings);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "Admin API online");

    axum::serve(listener, admin_router(state, settings)).await?;
    Ok(())
}

async fn handle_role_action(
    gateway: &SeaGateway,
    action: RoleAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = ViewCache::new();
    match action {
        RoleAction::Set { user, role } => {
            Editor::new(gateway, &cache).set_role(user, &role).await?;
        }
    }
    Ok(())
}

async fn handle_target_action(
    gateway: &SeaGateway,
    action: TargetAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = ViewCache::new();
    match action {
        TargetAction::Set { team_leader, value } => {
            Editor::new(gateway, &cache)
                .set_team_leader_target(team_leader, value)
                .await?;
        }
    }
    Ok(())
}
