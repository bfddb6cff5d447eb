use ministry_match::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    models::actor::Actor,
    telemetry, AppState,
};
use tracing::info;
use uuid::Uuid;

/// Applies migrations and reports the admin review backlog.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    telemetry::init(config)?;

    let pool = create_pool().await?;
    let app_state = AppState::new(pool);

    run_migrations(&app_state.pool).await?;
    info!("Database schema is up to date");

    // Read-only system identity for the startup report.
    let system = Actor::admin(Uuid::nil());
    let queue = app_state.matching.review_queue(&system).await?;
    info!(
        pending_profiles = queue.profiles.len(),
        pending_job_listings = queue.job_listings.len(),
        "Review queue loaded"
    );

    Ok(())
}
