use crate::fetch::HttpChainFetcher;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, Ledger, LedgerError, LedgerService, RemoteChain, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub fetcher: Arc<HttpChainFetcher>,
    /// Recipient of this node's mining rewards.
    pub node_id: Arc<str>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, fetcher: Arc<HttpChainFetcher>, node_id: &str) -> Self {
        Self {
            ledger,
            fetcher,
            node_id: Arc::from(node_id),
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct TxIn {
    sender: String,
    recipient: String,
    amount: i64,
}

#[derive(Deserialize)]
struct RegisterIn {
    #[serde(default)]
    nodes: Vec<String>,
}

#[derive(Serialize)]
struct MineOut {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

#[derive(Serialize)]
struct ResolveOut {
    message: &'static str,
    chain: Vec<Block>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match err {
            LedgerError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("mining task failed: {err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/chain", get(full_chain))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .with_state(state)
}

async fn full_chain(State(state): State<AppState>) -> Json<RemoteChain> {
    Json(RemoteChain::from(state.ledger.chain()))
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineOut>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let node_id = Arc::clone(&state.node_id);
    let block = tokio::task::spawn_blocking(move || ledger.mine(&node_id)).await??;
    Ok(Json(MineOut {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<TxIn>,
) -> Result<impl IntoResponse, ApiError> {
    let index = state
        .ledger
        .new_transaction(Transaction::new(tx.sender, tx.recipient, tx.amount))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Transaction will be added to Block {index}"),
            "index": index,
        })),
    ))
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(body): Json<RegisterIn>,
) -> Result<impl IntoResponse, ApiError> {
    if body.nodes.is_empty() {
        return Err(ApiError::bad_request("Please supply a valid list of nodes"));
    }
    let rejected: Vec<&String> = body
        .nodes
        .iter()
        .filter(|address| ledger_core::parse_peer_address(address).is_err())
        .collect();
    for address in &body.nodes {
        state.ledger.register_node(address);
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "New nodes have been added",
            "total_nodes": state.ledger.peers(),
            "rejected": rejected,
        })),
    ))
}

async fn resolve(State(state): State<AppState>) -> Json<ResolveOut> {
    let replaced = state.ledger.resolve_conflicts(state.fetcher.as_ref()).await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Json(ResolveOut {
        message,
        chain: state.ledger.chain(),
    })
}
