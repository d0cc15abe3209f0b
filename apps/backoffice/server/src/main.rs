use anyhow::Context;
use backoffice_lib::auth::hash_password;
use backoffice_lib::db::repository::ensure_admin;
use backoffice_lib::db::Databases;
use backoffice_lib::storage::Storage;
use backoffice_lib::{build_router, error, logging, AppConfig, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::from_env().context("failed to read configuration")?;
    error::set_expose_details(config.debug);

    let dbs = Databases::open(&config).context("failed to open databases")?;
    if let Some(admin) = &config.bootstrap_admin {
        let hash = hash_password(&admin.password)?;
        let conn = dbs.main.lock()?;
        let user = ensure_admin(&conn, &admin.email, &hash)?;
        tracing::info!(user_id = user.id, email = %user.email, "bootstrap admin ready");
    }

    let storage = Storage::new(&config.storage_dir, config.app_url.clone())
        .context("failed to prepare storage directory")?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(dbs, storage, config);
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "back office listening");
    axum::serve(listener, app).await?;
    Ok(())
}
