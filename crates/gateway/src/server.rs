use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{ConnectInfo, State, WebSocketUpgrade},
        http::HeaderValue,
        response::{Html, IntoResponse, Json},
        routing::get,
    },
    tower_http::cors::{AllowOrigin, Any, CorsLayer},
    tracing::info,
};

use crate::{state::GatewayState, ws::handle_connection};

/// Development origins the browser client is served from.
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost", "http://localhost:8000"];

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the relay router (shared between production startup and tests).
pub fn build_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ALLOWED_ORIGINS.map(HeaderValue::from_static),
        ))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_upgrade_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP + WebSocket server and run until the process exits.
pub async fn start(bind: &str, port: u16, state: Arc<GatewayState>) -> anyhow::Result<()> {
    let app = build_app(Arc::clone(&state));

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        %addr,
        bot = %state.config.bot_name,
        mode = %state.config.response_mode,
        "relay listening"
    );

    // ConnectInfo gives the ws handler the client's remote address.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn home_handler() -> Html<&'static str> {
    Html(include_str!("assets/index.html"))
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "bot": state.config.bot_name,
        "mode": state.config.response_mode.to_string(),
    }))
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state, addr))
}
