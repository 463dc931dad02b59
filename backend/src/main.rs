mod client;
mod session;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use extrude_core::geometry::{BoundingBox, Point3};
use extrude_core::{EnvConfig, GeometryEngine, MemoryEngine, SearchEnvironment};
use futures::{sink::SinkExt, stream::StreamExt};
use session::{format_error, Session};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

type DynEngine = Box<dyn GeometryEngine + Send>;

/// Serve extrude search episodes to a learner over a websocket.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    listen: Option<String>,
    #[arg(long)]
    engine_url: Option<String>,
    #[arg(long)]
    max_steps: Option<u64>,
    /// Target design loaded for every new session.
    #[arg(long)]
    target: Option<PathBuf>,
    /// Use the in-memory engine instead of a remote gym server.
    #[arg(long)]
    memory: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(EnvConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => EnvConfig::from_path(path)?,
            None => EnvConfig::default(),
        };
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(url) = self.engine_url {
            config.engine_url = url;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if self.target.is_some() {
            config.target_file = self.target;
        }
        config.validate()?;
        Ok((config, self.memory))
    }
}

// Application State
struct AppState {
    config: EnvConfig,
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let (config, memory) = Args::parse().into_config()?;
    let addr: SocketAddr = config.listen_addr.parse()?;
    if memory {
        info!("Using in-memory engine");
    } else {
        info!("Using gym server at {}", config.engine_url);
    }

    let shared_state = Arc::new(AppState { config, memory });

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Extrude search environment"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Build the engine and environment for one session. Blocking: the HTTP
/// client must not be created on an async worker.
fn open_session(state: &AppState) -> anyhow::Result<Session<DynEngine>> {
    let config = &state.config;
    let engine: DynEngine = if state.memory {
        let bbox = BoundingBox::try_new(Point3::origin(), Point3::new(10.0, 10.0, 10.0))?;
        Box::new(MemoryEngine::new("memory-target", 12, bbox))
    } else {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        Box::new(client::HttpEngine::new(&config.engine_url, timeout)?)
    };

    let mut env = SearchEnvironment::from_config(engine, config);
    if let Some(target) = &config.target_file {
        if let Err(e) = env.set_target(target) {
            warn!("Could not load target {}: {}", target.display(), e);
        }
    }
    Ok(Session::new(env))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = uuid::Uuid::new_v4();
    info!("Client connected (session {})", session_id);

    let (mut sender, mut receiver) = socket.split();

    let opened = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || open_session(&state)).await
    };
    let session = match opened {
        Ok(Ok(session)) => Arc::new(Mutex::new(session)),
        Ok(Err(e)) => {
            warn!("Session {} failed to start: {}", session_id, e);
            let _ = sender.send(Message::Text(format_error("SESSION_FAILED", &e.to_string()))).await;
            return;
        }
        Err(e) => {
            warn!("Session {} setup panicked: {}", session_id, e);
            return;
        }
    };

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        info!("[{}] {}", session_id, text);

        let worker = session.clone();
        let reply = tokio::task::spawn_blocking(move || {
            let mut session = worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            session.handle(&text)
        })
        .await
        .unwrap_or_else(|e| format_error("INTERNAL", &e.to_string()));

        if sender.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }

    // The blocking client tears down its runtime on drop.
    let _ = tokio::task::spawn_blocking(move || drop(session)).await;
    info!("Client disconnected (session {})", session_id);
}
