// Customer Hierarchy Viewer - Web Server
// Browser front end: scenario selector, pannable SVG diagram, raw JSON pane

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use customer_hierarchy::{
    normalize, render, to_svg, Category, RenderConfig, ScenarioStore, ViewTransform,
    DEFAULT_SCENARIOS_PATH,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
struct AppState {
    store: Arc<ScenarioStore>,
    config: Arc<RenderConfig>,
    loaded_at: DateTime<Utc>,
    load_error: Option<String>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    scenarios: usize,
    loaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_error: Option<String>,
}

/// Canvas size supplied by the browser
#[derive(Deserialize)]
struct CanvasQuery {
    width: Option<f64>,
    height: Option<f64>,
}

const DEFAULT_WIDTH: f64 = 1200.0;
const DEFAULT_HEIGHT: f64 = 800.0;

fn not_found(index: usize, len: usize) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::err(format!(
            "scenario index {} out of range ({} loaded)",
            index, len
        ))),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: customer_hierarchy::VERSION,
        scenarios: state.store.len(),
        loaded_at: state.loaded_at,
        load_error: state.load_error.clone(),
    }))
}

/// GET /api/scenarios - Selector options (value = index, label = name)
async fn list_scenarios(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.options()))
}

/// GET /api/scenarios/:index - Full raw record
async fn get_scenario(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    match state.store.get(index) {
        Some(scenario) => (StatusCode::OK, Json(ApiResponse::ok(scenario))).into_response(),
        None => not_found(index, state.store.len()),
    }
}

/// GET /api/scenarios/:index/tree - Normalized display tree
async fn get_tree(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    match state.store.get(index) {
        Some(scenario) => {
            let root = normalize(&scenario.customer, Category::Global);
            (StatusCode::OK, Json(ApiResponse::ok(root))).into_response()
        }
        None => not_found(index, state.store.len()),
    }
}

/// GET /api/scenarios/:index/diagram.svg - Rendered diagram at initial framing
async fn get_diagram(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(canvas): Query<CanvasQuery>,
) -> Response {
    let Some(scenario) = state.store.get(index) else {
        return not_found(index, state.store.len());
    };
    let width = canvas.width.unwrap_or(DEFAULT_WIDTH);
    let height = canvas.height.unwrap_or(DEFAULT_HEIGHT);

    let svg = render(scenario, &state.config, width)
        .and_then(|diagram| to_svg(&diagram, &diagram.initial_view, width, height, &state.config));

    match svg {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            tracing::warn!(index, error = %e, "render failed");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))).into_response()
        }
    }
}

/// GET /api/view - Initial pan/zoom framing and zoom bounds for a canvas width
async fn get_view(State(state): State<AppState>, Query(canvas): Query<CanvasQuery>) -> impl IntoResponse {
    let width = canvas.width.unwrap_or(DEFAULT_WIDTH);
    let initial = ViewTransform::initial(width, &state.config);
    Json(ApiResponse::ok(serde_json::json!({
        "initial": initial,
        "minScale": state.config.min_scale,
        "maxScale": state.config.max_scale,
        "resetDurationMs": state.config.reset_duration_ms,
    })))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🌐 Customer Hierarchy Viewer - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = std::env::var("HIERARCHY_SCENARIOS").unwrap_or_else(|_| DEFAULT_SCENARIOS_PATH.to_string());
    let path = std::path::PathBuf::from(path);

    // A failed load leaves the selector empty; the page still works
    let (store, load_error) = match ScenarioStore::load_async(&path).await {
        Ok(store) => {
            println!("✓ Loaded {} scenario(s) from {:?}", store.len(), path);
            (store, None)
        }
        Err(e) => {
            tracing::error!(error = %e, "could not load scenarios");
            (ScenarioStore::default(), Some(e.to_string()))
        }
    };

    let config = match std::env::var("HIERARCHY_CONFIG") {
        Ok(config_path) => match RenderConfig::load(std::path::Path::new(&config_path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default render config");
                RenderConfig::default()
            }
        },
        Err(_) => RenderConfig::default(),
    };

    // Create shared state
    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config),
        loaded_at: Utc::now(),
        load_error,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/scenarios", get(list_scenarios))
        .route("/scenarios/:index", get(get_scenario))
        .route("/scenarios/:index/tree", get(get_tree))
        .route("/scenarios/:index/diagram.svg", get(get_diagram))
        .route("/view", get(get_view))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr = std::env::var("HIERARCHY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/scenarios", addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
