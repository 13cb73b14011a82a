use course_pipeline::app::{AppState, build_router};
use course_pipeline::config::db::MongoConfig;
use course_pipeline::config::environment::AppConfig;
use course_pipeline::infra::init_infra;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    let infra = match MongoConfig::from_app(&config) {
        Some(mongo) => match init_infra(&mongo).await {
            Ok(i) => Some(i),
            Err(e) => {
                warn!(error = %e, "infra init failed; falling back to in-memory store");
                None
            }
        },
        None => None,
    };

    let state = AppState::from_config(config, infra);
    info!(
        env = %state.config.rust_env,
        host = %state.config.api_host,
        port = state.config.api_port,
        store = state.store.backend_name(),
        remote_storage = state.blobs.remote_ready(),
        upload_root = %state.config.upload_root_dir,
        "course-pipeline started"
    );

    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
