use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estudeaqui::srs::Scheduler;
use estudeaqui::state::AppState;
use estudeaqui::{config, db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "estudeaqui=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path.to_string_lossy()).expect("Failed to initialize database");

  let scheduler = Scheduler::new(config::load_scheduler_params());
  let app = handlers::router(AppState::new(pool, scheduler));

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
