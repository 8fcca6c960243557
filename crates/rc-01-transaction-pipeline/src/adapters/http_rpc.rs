//! JSON-RPC 2.0 over HTTP client for the chain node.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{Address, Bytes, Hash, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

use crate::domain::receipt::Receipt;
use crate::ports::outbound::{CallRequest, ChainRpc, RpcError};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// Connection settings for [`HttpChainClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// reqwest-backed [`ChainRpc`]. One pooled client shared by all requests.
pub struct HttpChainClient {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl HttpChainClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn request<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id(),
        };
        trace!(method, id = request.id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Transport(format!("cannot connect to {}: {}", self.url, e))
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            RpcError::InvalidResponse(format!("{} (HTTP {})", e, status.as_u16()))
        })?;

        if let Some(error) = body.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        serde_json::from_value(body.result.unwrap_or(Value::Null))
            .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

impl HttpChainClient {
    /// A quantity result that must fit in 64 bits.
    async fn request_u64(&self, method: &str, params: Value) -> Result<u64, RpcError> {
        let value: U256 = self.request(method, params).await?;
        u64::try_from(value.into_inner()).map_err(|_| {
            RpcError::InvalidResponse(format!("{}: {} exceeds 64 bits", method, value))
        })
    }
}

#[async_trait]
impl ChainRpc for HttpChainClient {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.request_u64("eth_chainId", json!([])).await
    }

    async fn is_listening(&self) -> Result<bool, RpcError> {
        self.request("net_listening", json!([])).await
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        self.request_u64("eth_blockNumber", json!([])).await
    }

    async fn pending_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        self.request_u64("eth_getTransactionCount", json!([address, "pending"]))
            .await
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        // Some permissioned nodes answer with null or "0x" on free-gas networks
        let price: Option<U256> = self.request("eth_gasPrice", json!([])).await?;
        Ok(price.unwrap_or(U256::ZERO))
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError> {
        self.request_u64("eth_estimateGas", json!([request])).await
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        self.request("eth_getBalance", json!([address, "latest"])).await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, RpcError> {
        let raw = Bytes(raw.to_vec());
        self.request("eth_sendRawTransaction", json!([raw])).await
    }

    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, RpcError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        let data: Bytes = self.request("eth_call", json!([request, "latest"])).await?;
        Ok(data.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};

    async fn fake_node(Json(request): Json<Value>) -> Json<Value> {
        let id = request["id"].clone();
        let result = match request["method"].as_str().unwrap_or_default() {
            "eth_chainId" => json!("0x539"),
            "net_listening" => json!(true),
            "eth_blockNumber" => json!("0x10"),
            "eth_getTransactionCount" => {
                assert_eq!(request["params"][1], "pending");
                json!("0x5")
            }
            "eth_gasPrice" => json!("0x"),
            "eth_estimateGas" => json!("0x10000000000000000"),
            "eth_call" => json!("0x0000000000000000000000000000000000000000000000000000000000000001"),
            "eth_getTransactionReceipt" => Value::Null,
            "eth_sendRawTransaction" => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32000, "message": "nonce too low"}
                }))
            }
            _ => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": "method not found"}
                }))
            }
        };
        Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    async fn spawn_fake_node() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/", post(fake_node)))
                .await
                .unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(url: String) -> HttpChainClient {
        HttpChainClient::new(&HttpClientConfig {
            url,
            ..HttpClientConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_quantities_are_decoded() {
        let client = client(spawn_fake_node().await);
        assert_eq!(client.chain_id().await.unwrap(), 1337);
        assert!(client.is_listening().await.unwrap());
        assert_eq!(client.block_number().await.unwrap(), 16);
        assert_eq!(
            client
                .pending_transaction_count(Address::repeat_byte(1))
                .await
                .unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_invalid_response() {
        let client = client(spawn_fake_node().await);
        let err = client
            .estimate_gas(&CallRequest::call(Address::repeat_byte(2), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(ref m) if m.contains("eth_estimateGas")));
    }

    #[tokio::test]
    async fn test_empty_gas_price_is_zero() {
        let client = client(spawn_fake_node().await);
        assert_eq!(client.gas_price().await.unwrap(), U256::ZERO);
    }

    #[tokio::test]
    async fn test_call_returns_bytes_and_null_receipt_is_none() {
        let client = client(spawn_fake_node().await);
        let data = client
            .call(&CallRequest::call(Address::repeat_byte(2), vec![0x6d, 0x4c, 0xe6, 0x3c]))
            .await
            .unwrap();
        assert_eq!(data.len(), 32);
        assert_eq!(data[31], 1);
        assert!(client
            .transaction_receipt(Hash::zero())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rpc_errors_are_surfaced() {
        let client = client(spawn_fake_node().await);
        let err = client.send_raw_transaction(&[0xf8]).await.unwrap_err();
        assert_eq!(
            err,
            RpcError::Rpc {
                code: -32000,
                message: "nonce too low".into()
            }
        );
        let err = client.balance(Address::zero()).await.unwrap_err();
        assert!(matches!(err, RpcError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        // Port 9 (discard) is closed on test hosts
        let client = client("http://127.0.0.1:9".to_string());
        let err = client.chain_id().await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
