// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! In-process stand-ins for the backend, object storage and wallet.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::graphql::client::operation_name;
use crate::wallet::{WalletError, WalletSigner};

/// A GraphQL request as seen by the stub backend.
#[derive(Debug, Clone)]
pub struct GraphQlCall {
    pub query: String,
    pub variables: Value,
    pub authorization: Option<String>,
}

impl GraphQlCall {
    pub fn operation(&self) -> &str {
        operation_name(&self.query)
    }
}

/// An object PUT to the stub storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub enum StubResponse {
    Json { status: u16, body: Value },
    Raw { status: u16, body: String },
    Delayed { delay: Duration, response: Box<StubResponse> },
}

impl StubResponse {
    pub fn data(data: Value) -> Self {
        StubResponse::Json {
            status: 200,
            body: json!({ "data": data }),
        }
    }

    pub fn errors(messages: &[&str]) -> Self {
        let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
        StubResponse::Json {
            status: 200,
            body: json!({ "data": null, "errors": errors }),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        StubResponse::Raw {
            status,
            body: body.to_string(),
        }
    }

    /// Send `self` only after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        StubResponse::Delayed {
            delay,
            response: Box::new(self),
        }
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        match self {
            StubResponse::Json { status, body } => {
                (status_code(status), Json(body)).into_response()
            }
            StubResponse::Raw { status, body } => (status_code(status), body).into_response(),
            StubResponse::Delayed { response, .. } => response.into_response(),
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

type Handler = dyn Fn(&GraphQlCall) -> StubResponse + Send + Sync;

struct Shared {
    handler: Box<Handler>,
    put_status: u16,
    graphql: Mutex<Vec<GraphQlCall>>,
    objects: Mutex<Vec<StoredObject>>,
}

/// Local HTTP server answering `POST /graphql` through a handler and
/// accepting `PUT /upload/<key>`.
pub struct StubServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&GraphQlCall) -> StubResponse + Send + Sync + 'static,
    {
        Self::start_with_put_status(handler, 200).await
    }

    pub async fn start_with_put_status<F>(handler: F, put_status: u16) -> Self
    where
        F: Fn(&GraphQlCall) -> StubResponse + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            handler: Box::new(handler),
            put_status,
            graphql: Mutex::new(Vec::new()),
            objects: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/graphql", post(graphql))
            .route("/upload/{*key}", put(storage_put))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, shared }
    }

    /// Backend whose `generateVideoUploadUrl` points back at this server's
    /// storage, which answers uploads with `put_status`.
    pub async fn start_storage(put_status: u16) -> Self {
        let base: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
        let handler_base = base.clone();
        let server = Self::start_with_put_status(
            move |call| {
                let file_name = call.variables["input"]["fileName"].as_str().unwrap_or_default();
                let key = format!("uploads/{file_name}");
                StubResponse::data(json!({
                    "generateVideoUploadUrl": {
                        "uploadUrl": format!("{}/upload/{key}", handler_base.get().unwrap()),
                        "key": key,
                        "publicUrl": format!("https://cdn.example.com/{key}"),
                    }
                }))
            },
            put_status,
        )
        .await;
        base.set(format!("http://{}", server.addr)).unwrap();
        server
    }

    pub fn graphql_url(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn graphql_requests(&self) -> Vec<GraphQlCall> {
        self.shared.graphql.lock().unwrap().clone()
    }

    pub fn stored_objects(&self) -> Vec<StoredObject> {
        self.shared.objects.lock().unwrap().clone()
    }
}

async fn graphql(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StubResponse {
    let call = GraphQlCall {
        query: body["query"].as_str().unwrap_or_default().to_string(),
        variables: body["variables"].clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let mut response = (shared.handler)(&call);
    shared.graphql.lock().unwrap().push(call);
    while let StubResponse::Delayed { delay, response: inner } = response {
        tokio::time::sleep(delay).await;
        response = *inner;
    }
    response
}

async fn storage_put(
    State(shared): State<Arc<Shared>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    shared.objects.lock().unwrap().push(StoredObject {
        key,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        bytes: body.to_vec(),
    });
    status_code(shared.put_status)
}

struct RpcShared {
    pending_polls: usize,
    mined: Option<bool>,
    receipt_polls: AtomicUsize,
}

/// Local JSON-RPC node that knows one transaction: it answers
/// `eth_getTransactionReceipt` with `null` for the first `pending_polls`
/// calls, then with a receipt whose status is `mined`. With `mined` unset the
/// transaction never lands.
pub struct StubRpc {
    addr: SocketAddr,
    shared: Arc<RpcShared>,
}

impl StubRpc {
    pub const TX_HASH: &'static str =
        "0x8f1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b1c";

    pub async fn start(pending_polls: usize, mined: Option<bool>) -> Self {
        let shared = Arc::new(RpcShared {
            pending_polls,
            mined,
            receipt_polls: AtomicUsize::new(0),
        });
        let app = Router::new()
            .route("/", post(json_rpc))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn receipt_polls(&self) -> usize {
        self.shared.receipt_polls.load(Ordering::SeqCst)
    }
}

async fn json_rpc(State(shared): State<Arc<RpcShared>>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["id"].clone();
    let result = match body["method"].as_str().unwrap_or_default() {
        "eth_getTransactionReceipt" => {
            let polls = shared.receipt_polls.fetch_add(1, Ordering::SeqCst);
            match shared.mined {
                Some(success) if polls >= shared.pending_polls => receipt_json(success),
                _ => Value::Null,
            }
        }
        "eth_chainId" => json!("0xaa36a7"),
        "eth_blockNumber" => json!("0x10"),
        _ => Value::Null,
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn receipt_json(success: bool) -> Value {
    let from = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";
    json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0xb411",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": StubRpc::TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "1".repeat(64)),
        "blockNumber": "0x10",
        "gasUsed": "0xb411",
        "effectiveGasPrice": "0x3b9aca00",
        "from": from,
        "to": "0x14d9dc7c093271e4d0d065fb7f15596fc5305942",
        "contractAddress": null
    })
}

/// Signer that counts requests and returns a fixed signature.
pub struct CountingSigner {
    address: Address,
    calls: AtomicUsize,
    delay: Option<Duration>,
    reject: bool,
}

impl CountingSigner {
    pub const SIGNATURE: &'static str = "0xfeedface";

    pub fn new(address: &str) -> Self {
        Self {
            address: address.parse().unwrap(),
            calls: AtomicUsize::new(0),
            delay: None,
            reject: false,
        }
    }

    /// Signer that refuses every request.
    pub fn rejecting(address: &str) -> Self {
        Self {
            reject: true,
            ..Self::new(address)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for CountingSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject {
            return Err(WalletError::Signing("User rejected the request".to_string()));
        }
        Ok(Self::SIGNATURE.to_string())
    }
}

/// Poll `check` until it holds, failing the test after five seconds.
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check().await {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
