use std::sync::Arc;

use gs_api_rest::{
    context::{ApiRestCtx, ApiRestDaoCtx},
    ApiRestServer,
};
use gs_dao::Db;
use gs_db_postgresql::db::PostgresDb;
use gs_db_sqlite::db::SqliteDb;
use tokio_util::sync::CancellationToken;

mod config_path;

#[tokio::main]
async fn main() {
    let config_path = config_path::get();
    let config = match gs_config::from_path(&config_path) {
        Ok(config) => config,
        Err(err) => gs_log::panic(None, format!("[Goodsy] Failed to load config: {err:#}")),
    };

    gs_log::init(config.log().display_level(), config.log().level_filter());

    gs_log::info(Some("🚀"), "[Goodsy] Starting");

    let db = if let Some(postgres) = config.db().postgres() {
        match PostgresDb::new(
            postgres.user(),
            postgres.password(),
            postgres.host(),
            postgres.port(),
            postgres.db_name(),
            postgres.max_connections(),
        )
        .await
        {
            Ok(db) => Arc::new(Db::PostgresqlDb(db)),
            Err(err) => gs_log::panic(None, format!("[Goodsy] Connecting to PostgreSQL failed: {err:#}")),
        }
    } else if let Some(sqlite) = config.db().sqlite() {
        match SqliteDb::new(sqlite.path(), sqlite.max_connections()).await {
            Ok(db) => Arc::new(Db::SqliteDb(db)),
            Err(err) => gs_log::panic(None, format!("[Goodsy] Opening SQLite failed: {err:#}")),
        }
    } else {
        gs_log::panic(None, "[Goodsy] No database configuration is specified");
    };

    let api_rest_server = ApiRestServer::new(
        config.api().rest().host(),
        config.api().rest().port(),
        config.api().rest().allowed_origin(),
        config.api().rest().workers(),
        config.api().rest().timeout(),
        ApiRestCtx::new(ApiRestDaoCtx::new(db)),
    );

    let cancel_token = CancellationToken::new();

    match api_rest_server.run(cancel_token.clone()).await {
        Ok(_) => gs_log::info(Some("👋"), "[Goodsy] Turned off"),
        Err(err) => {
            gs_log::warn(None, "[Goodsy] Shutting down all running components");
            cancel_token.cancel();
            gs_log::warn(Some("👋"), format!("[Goodsy] Turned off with error: {err}"));
        }
    }
}
