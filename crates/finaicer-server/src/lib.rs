//! FinAicer Web Server
//!
//! Axum-based REST API around the anomaly engine and budget allocator.
//!
//! The server keeps one in-memory ledger: transactions posted here are
//! evaluated against the ledger's history and active budget, and the raised
//! alerts are stored alongside them. Stateless endpoints evaluate or allocate
//! over caller-supplied data without touching the ledger.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Input validation (pagination limits, finite non-negative amounts)
//! - Sanitized error responses

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use finaicer_core::{
    AnomalyEngine, BudgetAllocator, Clock, Ledger, LedgerState, PolicyConfig, SystemClock,
};

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Detection thresholds and budget policy
    pub policy: PolicyConfig,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Ledger contents to start from
    pub initial_state: LedgerState,
}

/// Shared application state
pub struct AppState {
    /// Only ever locked inside synchronous sections of a handler
    pub ledger: Mutex<Ledger>,
    pub engine: AnomalyEngine,
    pub allocator: BudgetAllocator,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let engine = AnomalyEngine::with_policy(config.policy.anomaly).with_clock(clock.clone());
        let allocator = BudgetAllocator::with_policy(config.policy.budget);
        let ledger = Ledger::from_state(config.initial_state, engine.clone(), allocator.clone());

        Self {
            ledger: Mutex::new(ledger),
            engine,
            allocator,
            clock,
        }
    }

    pub fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, AppError> {
        self.ledger
            .lock()
            .map_err(|_| AppError::internal("Ledger is unavailable"))
    }
}

/// Create the application router
pub fn create_router(config: ServerConfig) -> Router {
    create_router_with_clock(config, Arc::new(SystemClock))
}

/// Create the application router with a specific clock (for testing)
pub fn create_router_with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Router {
    let cors = build_cors(&config.allowed_origins);
    let state = Arc::new(AppState::new(config, clock));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Ledger
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/failure",
            post(handlers::record_classification_failure),
        )
        .route("/alerts", get(handlers::list_alerts))
        // Budget
        .route(
            "/budget",
            get(handlers::get_budget).put(handlers::update_budget),
        )
        .route("/budget/generate", post(handlers::generate_budget))
        .route("/budget/progress", get(handlers::get_budget_progress))
        .route("/stats", get(handlers::get_stats))
        // Stateless
        .route("/evaluate", post(handlers::evaluate_transaction))
        .route("/budget/suggest", post(handlers::suggest_budget));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with the default policy
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    info!(
        transactions = config.initial_state.transactions.len(),
        budget_categories = config.initial_state.budgets.len(),
        "Loaded ledger"
    );

    let app = create_router(config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error: bad input is the caller's fault, I/O is ours
    pub fn from_core(err: finaicer_core::Error) -> Self {
        use finaicer_core::Error;

        match err {
            Error::NotFound(_) => Self::not_found(&err.to_string()),
            Error::Io(_) => Self::from(err),
            _ => Self::bad_request(&err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
