use actix_web::{web, App, HttpServer};
use quiz_backend::config::admin::AdminCredentials;
use quiz_backend::config::db::{has_db_config, DbKind, RuntimeEnv};
use quiz_backend::config::server::bind_addr;
use quiz_backend::infra::state::build_state;
use quiz_backend::middleware::{cors_middleware, RequestTrace, StructuredLogger, TraceSpan};
use quiz_backend::routes;
use tracing::{error, info, warn};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables come from the runtime (docker env_file, or a
    // sourced .env locally).
    let (host, port) = match bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };

    let mut builder = build_state()
        .with_env(RuntimeEnv::Prod)
        .with_admin(AdminCredentials::from_env());
    if has_db_config() {
        builder = builder.with_db(DbKind::Postgres);
    } else {
        warn!("DB_HOST/DB_USER not set; running without a database, DB-backed endpoints return 503");
    }

    // Built inside the actix system so round timers run on its runtime.
    let app_state = match builder.build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };
    info!(db = app_state.db().is_some(), "application state ready");

    let data = web::Data::new(app_state);

    info!(%host, port, "starting quiz backend");
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
