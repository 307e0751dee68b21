use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dotenv::dotenv;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{error, info};

use taka_link::api::callbacks::{self, CallbackState};
use taka_link::api::checkout::{self, CheckoutState};
use taka_link::config::AppConfig;
use taka_link::gateway::{CheckoutGateway, SimulatedBehavior, SimulatedGateway, SslcommerzGateway};
use taka_link::health::{HealthChecker, HealthState, HealthStatus};
use taka_link::logging::init_tracing;
use taka_link::middleware::logging::{request_logging_middleware, UuidRequestId};
use taka_link::services::{CallbackProcessor, OrchestratorConfig, SessionOrchestrator};
use taka_link::store::{
    init_pool_from_config, InMemoryPaymentStore, PaymentStore, PgPaymentStore,
};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        "🚀 Starting Taka Link checkout service"
    );

    // Initialize database connection pool
    let db_pool = match &config.database {
        Some(database) => {
            info!("📊 Initializing database connection pool...");
            let pool = init_pool_from_config(database).await.map_err(|e| {
                error!("Failed to initialize database pool: {}", e);
                anyhow::anyhow!(e)
            })?;
            info!(
                max_connections = database.max_connections,
                "✅ Database connection pool initialized"
            );
            Some(pool)
        }
        None => {
            info!("⏭️  Skipping database initialization (SKIP_DATABASE=true)");
            None
        }
    };

    // Select the payment store
    let store: Arc<dyn PaymentStore> = match &db_pool {
        Some(pool) => Arc::new(PgPaymentStore::new(pool.clone())),
        None => {
            info!("🗃️  Using in-memory payment store");
            Arc::new(InMemoryPaymentStore::new())
        }
    };

    // Select the checkout gateway
    let gateway_driver = std::env::var("GATEWAY_DRIVER")
        .unwrap_or_else(|_| "http".to_string())
        .to_lowercase();
    let gateway: Arc<dyn CheckoutGateway> = if gateway_driver == "simulated" {
        info!("🧪 Using simulated checkout gateway (GATEWAY_DRIVER=simulated)");
        Arc::new(SimulatedGateway::new(SimulatedBehavior::Succeed))
    } else {
        let gateway = SslcommerzGateway::from_env().map_err(|e| {
            error!("❌ Failed to initialize the checkout gateway: {}", e);
            anyhow::anyhow!(e)
        })?;
        info!(
            gateway = gateway.name(),
            sandbox = gateway.is_sandbox(),
            "✅ Checkout gateway initialized"
        );
        Arc::new(gateway)
    };

    // Wire up the services
    let orchestrator_config = OrchestratorConfig::from_env();
    info!(
        max_attempts = orchestrator_config.max_attempts,
        retry_delay_secs = orchestrator_config.retry_delay.as_secs(),
        currency = %config.checkout.currency,
        "Session retry policy loaded"
    );

    let orchestrator = Arc::new(SessionOrchestrator::new(
        gateway,
        store.clone(),
        config.checkout.clone(),
        orchestrator_config,
    ));
    let processor = Arc::new(CallbackProcessor::new(store));
    let health_checker = HealthChecker::new(db_pool.clone());

    // Create the application router with logging middleware
    info!("🛣️  Setting up application routes...");

    let checkout_routes = Router::new()
        .route("/api/checkout", post(checkout::initiate_checkout))
        .with_state(Arc::new(CheckoutState { orchestrator }));

    let callback_routes = Router::new()
        .route(
            "/api/checkout/callback/success",
            get(callbacks::success_callback).post(callbacks::success_callback),
        )
        .route(
            "/api/checkout/callback/fail",
            get(callbacks::fail_callback).post(callbacks::fail_callback),
        )
        .route(
            "/api/checkout/callback/cancel",
            get(callbacks::cancel_callback).post(callbacks::cancel_callback),
        )
        .with_state(Arc::new(CallbackState { processor }));

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(checkout_routes)
        .merge(callback_routes)
        .with_state(AppState { health_checker })
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    info!("✅ Routes configured");

    // Run the server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("❌ Failed to bind to address {}: {}", addr, e);
        e
    })?;

    println!("\n╔══════════════════════════════════════════════════════════╗");
    println!("║          🚀 TAKA LINK CHECKOUT SERVICE RUNNING           ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  POST /api/checkout                  - Create session    ║");
    println!("║  GET  /api/checkout/callback/success - Gateway callback  ║");
    println!("║  GET  /api/checkout/callback/fail    - Gateway callback  ║");
    println!("║  GET  /api/checkout/callback/cancel  - Gateway callback  ║");
    println!("║  GET  /health                        - Health check      ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    info!(address = %addr, "🚀 Server listening on http://{}", addr);
    info!("✅ Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}

// Application state for the root and health routes
#[derive(Clone)]
struct AppState {
    health_checker: HealthChecker,
}

// Handlers
async fn root() -> &'static str {
    info!("📍 Root endpoint accessed");
    "Welcome to the Taka Link Checkout API"
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, (StatusCode, String)> {
    info!("🏥 Health check requested");
    let health_status = state.health_checker.check_health().await;

    // Return 503 only when a required component is down
    if matches!(health_status.status, HealthState::Unhealthy) {
        error!("❌ Health check failed - service unhealthy");
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable".to_string(),
        ))
    } else {
        info!("✅ Health check passed");
        Ok(Json(health_status))
    }
}
