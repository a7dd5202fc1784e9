//! zkredeem Server - proof-gated reward redemption
//!
//! One binary wiring the whole pipeline together:
//! - `POST /receive-proofs` - callback gateway for the identity-proof
//!   provider; verified claims trigger a disbursement run
//! - `GET /ws` - chat sessions; each connection drives its own agent
//!   thread and receives the live event stream
//! - `GET /` - liveness greeting
//!
//! # Quick Start
//!
//! ```bash
//! # Run without external credentials (deterministic agent, mock wallet)
//! zkredeem-server --dev
//!
//! # Production: OpenAI + wallet platform
//! OPENAI_API_KEY=sk-... CDP_API_KEY_NAME=... CDP_API_KEY_PRIVATE_KEY=... \
//!   WALLET_ID=... zkredeem-server --port 3000
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zkredeem_agent::{
    chat_tools, disbursement_tools, AgentRuntime, DisbursementOrchestrator, MockWallet,
    PlatformWalletClient, ProofRequestSettings, ThreadStore, ToolRegistry, WalletClient,
    WalletConfig, CHAT_PROMPT,
};
use zkredeem_llm::LlmRouter;
use zkredeem_proof::{decode_callback_body, AttestorVerifier, ClaimExtractor, ProofVerifier};
use zkredeem_stream::EventHub;
use zkredeem_types::{AgentEvent, RedeemError, SessionId, VerifiedClaim};

// ============================================================================
// CLI
// ============================================================================

/// zkredeem Server - redeem loyalty balances for on-chain tokens
#[derive(Parser, Debug)]
#[command(
    name = "zkredeem-server",
    about = "zkredeem - proof-gated reward disbursement server",
    version
)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "ZKREDEEM_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "ZKREDEEM_PORT")]
    port: u16,

    /// Run without external credentials (deterministic agent, mock wallet)
    #[arg(long)]
    dev: bool,
}

// ============================================================================
// Application State
// ============================================================================

struct AppState {
    /// Attestor-signature verification
    verifier: Arc<dyn ProofVerifier>,
    /// Registry-driven claim extraction
    extractor: ClaimExtractor,
    /// Fan-out to connected chat sessions
    hub: Arc<EventHub>,
    /// The agent loop shared by chat and disbursement
    runtime: Arc<AgentRuntime>,
    /// Toolset for chat runs (no transfer capability)
    chat_tools: ToolRegistry,
    /// Proof-driven disbursement pipeline
    orchestrator: DisbursementOrchestrator,
}

impl AppState {
    fn new(
        verifier: Arc<dyn ProofVerifier>,
        provider: Arc<dyn zkredeem_llm::LlmProvider>,
        wallet: Arc<dyn WalletClient>,
        settings: ProofRequestSettings,
    ) -> Arc<Self> {
        let hub = Arc::new(EventHub::new());
        let runtime = Arc::new(AgentRuntime::new(provider, Arc::new(ThreadStore::new())));
        let orchestrator = DisbursementOrchestrator::new(
            runtime.clone(),
            hub.clone(),
            disbursement_tools(&settings, wallet),
        );

        Arc::new(Self {
            verifier,
            extractor: ClaimExtractor::default(),
            hub,
            runtime,
            chat_tools: chat_tools(&settings),
            orchestrator,
        })
    }
}

// ============================================================================
// Routes
// ============================================================================

async fn greeting() -> impl IntoResponse {
    "zkredeem api is running"
}

/// Callback gateway for the identity-proof provider.
///
/// Decode, verify, and extract happen inline; the disbursement run is
/// spawned so the provider gets its `200` as soon as the run starts.
async fn receive_proofs(State(state): State<Arc<AppState>>, body: String) -> Response {
    tracing::info!(bytes = body.len(), "received proof callback");

    match process_proof(&state, &body).await {
        Ok(claim) => {
            let state = state.clone();
            tokio::spawn(async move {
                // the orchestrator already surfaced the error event
                let _ = state.orchestrator.disburse(&claim).await;
            });
            StatusCode::OK.into_response()
        }
        Err(error) if error.is_rejection() => {
            tracing::warn!(%error, "rejected proof submission");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error.to_string() })),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(%error, "proof processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

async fn process_proof(state: &AppState, body: &str) -> Result<VerifiedClaim, RedeemError> {
    let proof = decode_callback_body(body)?;
    if !state.verifier.verify(&proof).await {
        return Err(RedeemError::InvalidProof);
    }
    state.extractor.extract(&proof)
}

// ============================================================================
// Chat WebSocket
// ============================================================================

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: Arc<AppState>) {
    let session = SessionId::generate();
    let thread_id = format!("chat-{session}");
    tracing::info!(%session, "chat session connected");

    let mut events = state.hub.register(session);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Forward hub events to this client
    let forward = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // One in-flight instruction per session; extra messages are answered
    // with an error event rather than silently dropped.
    let processing = Arc::new(AtomicBool::new(false));

    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                if processing.swap(true, Ordering::SeqCst) {
                    let _ = state.hub.unicast(
                        session,
                        AgentEvent::error("An instruction is already in progress for this session"),
                    );
                    continue;
                }

                let _ = state.hub.unicast(session, AgentEvent::user(text.clone()));

                let state = state.clone();
                let processing = processing.clone();
                let thread_id = thread_id.clone();
                tokio::spawn(async move {
                    run_chat(&state, session, &thread_id, &text).await;
                    processing.store(false, Ordering::SeqCst);
                });
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    forward.abort();
    state.hub.unregister(session);
    state.runtime.threads().remove(&thread_id);
    tracing::info!(%session, "chat session disconnected");
}

/// Drive one chat instruction, unicasting every step to the session that
/// sent it. A failed run surfaces one error event; the connection stays up.
async fn run_chat(state: &AppState, session: SessionId, thread_id: &str, input: &str) {
    let (tx, mut rx) = mpsc::channel::<AgentEvent>(16);

    let hub = state.hub.clone();
    let drain = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if hub.unicast(session, event).is_err() {
                break;
            }
        }
    });

    let result = state
        .runtime
        .run(thread_id, CHAT_PROMPT, input, &state.chat_tools, &tx)
        .await;

    drop(tx);
    let _ = drain.await;

    if let Err(error) = result {
        tracing::warn!(%session, %error, "chat run failed");
        let _ = state
            .hub
            .unicast(session, AgentEvent::error(error.to_string()));
    }
}

// ============================================================================
// Router & Startup
// ============================================================================

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/receive-proofs", post(receive_proofs))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Required credentials for a non-dev run. Every missing variable is
/// reported before the process exits.
fn validate_environment() -> Result<(), Vec<&'static str>> {
    let required = ["OPENAI_API_KEY", "CDP_API_KEY_NAME", "CDP_API_KEY_PRIVATE_KEY"];
    let missing: Vec<_> = required
        .into_iter()
        .filter(|name| std::env::var(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if !args.dev {
        if let Err(missing) = validate_environment() {
            for name in &missing {
                tracing::error!("{name} is not set");
            }
            anyhow::bail!(
                "missing required environment: {} (or run with --dev)",
                missing.join(", ")
            );
        }
    }

    let wallet: Arc<dyn WalletClient> = match WalletConfig::from_env() {
        Some(config) if !args.dev => {
            tracing::info!(network = %config.network_id, "using wallet platform client");
            Arc::new(PlatformWalletClient::new(config))
        }
        _ => {
            tracing::warn!("no wallet credentials, transfers are mocked");
            Arc::new(MockWallet::new())
        }
    };

    let router = LlmRouter::from_env();
    tracing::info!(provider = %router.kind(), "LLM provider selected");

    let state = AppState::new(
        Arc::new(AttestorVerifier::new()),
        router.provider(),
        wallet,
        ProofRequestSettings::from_env(),
    );

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("listening on http://{addr}");
    tracing::info!("chat websocket on ws://{addr}/ws");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use zkredeem_llm::DeterministicProvider;
    use zkredeem_proof::{encode_callback_body, StaticVerifier};
    use zkredeem_types::{ClaimData, Proof};

    fn settings() -> ProofRequestSettings {
        ProofRequestSettings {
            app_id: "app".to_string(),
            amazon_provider_id: "a".to_string(),
            flipkart_provider_id: "f".to_string(),
            callback_url: "http://localhost:3000/receive-proofs".to_string(),
        }
    }

    fn test_state(verify: bool, wallet: Arc<MockWallet>) -> Arc<AppState> {
        AppState::new(
            Arc::new(StaticVerifier(verify)),
            Arc::new(DeterministicProvider::new()),
            wallet,
            settings(),
        )
    }

    fn amazon_proof() -> Proof {
        Proof {
            identifier: "0xabc".to_string(),
            claim_data: ClaimData {
                provider: "http".to_string(),
                parameters: r#"{"url":"https://www.amazon.in/gp/css/gc/balance"}"#.to_string(),
                context: r#"{"extractedParameters":{"balance":"&#x20b9;1500"},"contextMessage":"0xB9Cf11e1dd8547a8f03Ac922E894938F666CD935"}"#.to_string(),
                owner: "0xowner".to_string(),
                timestamp_s: 1714000000,
                epoch: 1,
                identifier: "0xabc".to_string(),
            },
            signatures: vec!["0xsig".to_string()],
            witnesses: vec![],
            epoch: 1,
        }
    }

    async fn post_proof(state: Arc<AppState>, body: String) -> (StatusCode, serde_json::Value) {
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/receive-proofs")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_greeting() {
        let state = test_state(true, Arc::new(MockWallet::new()));
        let response = app(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_rejected() {
        let state = test_state(true, Arc::new(MockWallet::new()));
        let (status, json) = post_proof(state, "%7Bnot-json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("decode"));
    }

    #[tokio::test]
    async fn test_failed_verification_is_rejected_without_disbursement() {
        let wallet = Arc::new(MockWallet::new());
        let state = test_state(false, wallet.clone());
        let body = encode_callback_body(&amazon_proof()).unwrap();

        let (status, json) = post_proof(state, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid proofs data");
        assert!(wallet.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_platform_is_rejected() {
        let state = test_state(true, Arc::new(MockWallet::new()));
        let mut proof = amazon_proof();
        proof.claim_data.parameters = r#"{"url":"https://www.ebay.com/rewards"}"#.to_string();
        let body = encode_callback_body(&proof).unwrap();

        let (status, json) = post_proof(state, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("Platform value not found"));
    }

    #[tokio::test]
    async fn test_valid_proof_is_accepted() {
        let state = test_state(true, Arc::new(MockWallet::new()));
        let body = encode_callback_body(&amazon_proof()).unwrap();

        let (status, _) = post_proof(state, body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_environment_validation_reports_every_missing_variable() {
        // none of the required variables are set in the test environment
        if std::env::var("OPENAI_API_KEY").is_err() {
            let missing = validate_environment().unwrap_err();
            assert!(missing.contains(&"OPENAI_API_KEY"));
        }
    }
}
