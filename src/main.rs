use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio::{
    build_app,
    config::Settings,
    database::{self, sessions, users},
    mailer::{self, Mailer},
    utils,
};

fn seed_admin(pool: &portfolio::DbPool, settings: &Settings) -> anyhow::Result<()> {
    let (username, email, password) = match settings.admin_seed() {
        Some(seed) => seed,
        None => return Ok(()),
    };

    let mut conn = pool.get().context("DB connection")?;
    let hashed = utils::hash_password(password)?;
    if users::ensure_admin(&mut conn, username, email, hashed)
        .map_err(|err| anyhow::anyhow!("seeding admin: {}", err))?
    {
        tracing::info!(username, "created admin account");
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;

    let pool = database::create_pool(&settings.database_url, settings.db_max_connections)?;
    database::run_migrations(&pool)?;
    seed_admin(&pool, &settings)?;
    {
        let mut conn = pool.get().context("DB connection")?;
        let purged = sessions::purge_expired(&mut conn, settings.session_ttl_secs)
            .map_err(|err| anyhow::anyhow!("purging sessions: {}", err))?;
        tracing::debug!(purged, "dropped expired sessions");
    }

    let mailer: Arc<dyn Mailer> = Arc::from(
        mailer::from_settings(&settings).map_err(|err| anyhow::anyhow!("mailer: {}", err))?,
    );
    let bind = settings.bind_addr();

    let pool = web::Data::new(pool);
    let mailer = web::Data::from(mailer);
    let settings = web::Data::new(settings);

    tracing::info!(%bind, "listening");
    HttpServer::new(move || build_app(pool.clone(), mailer.clone(), settings.clone()))
        .bind(&bind)?
        .run()
        .await?;

    Ok(())
}
