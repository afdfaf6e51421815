//! Transport-agnostic JSON-RPC handling. Stdio and HTTP only differ in how
//! they frame the `Response` this module produces.

use std::sync::Arc;

use log::{debug, info};
use serde_json::{json, Value};

use super::protocol::{Request, Response, INTERNAL_ERROR, INVALID_REQUEST, PARSE_ERROR};
use crate::alerts::{check_price_alert, PriceQuery};
use crate::api::prices::PriceSource;
use crate::error::PriceAlertError;

pub const SERVER_NAME: &str = "crypto-price-alert";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const TOOL_NAME: &str = "check_price_alert";

pub fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Check whether a cryptocurrency has reached a target price",
        "inputSchema": {
            "type": "object",
            "properties": {
                "coin": {
                    "type": "string",
                    "description": "Coin id, e.g. bitcoin (case-insensitive)"
                },
                "target_price": {
                    "type": "number",
                    "description": "Target price to compare the current price against"
                }
            },
            "required": ["coin", "target_price"]
        }
    })
}

#[derive(Clone)]
pub struct McpHandler {
    source: Arc<PriceSource>,
}

impl McpHandler {
    pub fn new(source: Arc<PriceSource>) -> Self {
        Self { source }
    }

    /// Handles one raw message, e.g. a stdin line or an HTTP body.
    pub async fn handle_message(&self, raw: &str) -> Response {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                debug!("Unparseable JSON-RPC message: {}", e);
                Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
            }
        }
    }

    pub async fn handle_value(&self, value: Value) -> Response {
        if value.is_array() {
            return Response::error(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: batch requests are not supported",
            );
        }
        if !value.is_object() {
            return Response::error(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: expected a JSON object",
            );
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: Request = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Response::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e))
            }
        };

        if let Some(version) = request.jsonrpc.as_deref() {
            if version != "2.0" {
                return Response::error(
                    request.id,
                    INVALID_REQUEST,
                    format!("Invalid JSON-RPC version: expected 2.0, got {}", version),
                );
            }
        }

        self.dispatch(request).await
    }

    async fn dispatch(&self, req: Request) -> Response {
        info!("JSON-RPC {}", req.method);
        // Id-less messages (notifications) are answered like any request,
        // so e.g. `notifications/initialized` gets an unknown-method error.
        if req.id.is_null() {
            debug!("{} carries no id, answering with id null", req.method);
        }
        match req.method.as_str() {
            "initialize" => Response::success(
                req.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "tools/list" => Response::success(req.id, json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.handle_tool_call(req).await,
            other => Response::error(req.id, INTERNAL_ERROR, format!("Unknown method: {}", other)),
        }
    }

    async fn handle_tool_call(&self, req: Request) -> Response {
        let name = req.params.get("name").and_then(Value::as_str).unwrap_or("");
        if name != TOOL_NAME {
            return Response::error(req.id, INTERNAL_ERROR, format!("Unknown tool: {}", name));
        }

        let arguments = req.params.get("arguments").unwrap_or(&Value::Null);
        let query = match query_from_arguments(arguments) {
            Ok(q) => q,
            Err(e) => return Response::error(req.id, INTERNAL_ERROR, e.to_string()),
        };

        let result = check_price_alert(&self.source, &query).await;
        match serde_json::to_string_pretty(&result) {
            Ok(text) => Response::success(
                req.id,
                json!({
                    "content": [{ "type": "text", "text": text }]
                }),
            ),
            Err(e) => Response::error(req.id, INTERNAL_ERROR, e.to_string()),
        }
    }
}

fn query_from_arguments(arguments: &Value) -> Result<PriceQuery, PriceAlertError> {
    let coin = match arguments.get("coin") {
        None | Some(Value::Null) => return Err(missing("coin")),
        Some(v) => v.as_str().ok_or_else(|| {
            PriceAlertError::InvalidInput("coin must be a string".to_string())
        })?,
    };
    let target_price = match arguments.get("target_price") {
        None | Some(Value::Null) => return Err(missing("target_price")),
        Some(v) => v.as_f64().ok_or_else(|| {
            PriceAlertError::InvalidInput("target_price must be a number".to_string())
        })?,
    };

    PriceQuery::new(coin, target_price)
}

fn missing(field: &str) -> PriceAlertError {
    PriceAlertError::InvalidInput(format!("Missing required argument: {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> McpHandler {
        McpHandler::new(Arc::new(PriceSource::Mock))
    }

    fn call(arguments: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": TOOL_NAME, "arguments": arguments }
        })
        .to_string()
    }

    fn content_json(resp: &Response) -> Value {
        let text = resp.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn initialize_advertises_only_tools() {
        let resp = handler()
            .handle_message(r#"{"jsonrpc":"2.0","id":"init","method":"initialize","params":{}}"#)
            .await;
        assert_eq!(resp.id, json!("init"));
        let result = resp.result.unwrap();
        assert_eq!(result["capabilities"], json!({"tools": {}}));
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn tools_list_has_exactly_one_tool() {
        let resp = handler()
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], TOOL_NAME);
        assert_eq!(
            tools[0]["inputSchema"]["required"],
            json!(["coin", "target_price"])
        );
    }

    #[tokio::test]
    async fn ethereum_call_below_target() {
        let resp = handler()
            .handle_message(&call(json!({"coin": "ethereum", "target_price": 200000})))
            .await;
        assert!(resp.error.is_none());
        let content = content_json(&resp);
        assert_eq!(content["coin"], "ETHEREUM");
        assert_eq!(content["current_price"], 136000.0);
        assert_eq!(content["reached"], false);
    }

    #[tokio::test]
    async fn unknown_coin_is_still_a_success_envelope() {
        let resp = handler()
            .handle_message(&call(json!({"coin": "notacoin", "target_price": 1})))
            .await;
        assert!(resp.error.is_none());
        assert!(content_json(&resp)["error"]
            .as_str()
            .unwrap()
            .contains("notacoin"));
    }

    #[tokio::test]
    async fn missing_target_price_is_an_error_envelope() {
        let resp = handler()
            .handle_message(&call(json!({"coin": "bitcoin"})))
            .await;
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert!(err.message.contains("target_price"));
        assert_eq!(resp.id, json!(1));
    }

    #[tokio::test]
    async fn missing_coin_and_bad_types_are_errors() {
        let h = handler();
        for args in [
            json!({"target_price": 5}),
            json!({"coin": 42, "target_price": 5}),
            json!({"coin": "bitcoin", "target_price": "5"}),
            json!({"coin": "bitcoin", "target_price": -5}),
        ] {
            let resp = h.handle_message(&call(args.clone())).await;
            assert_eq!(resp.error.map(|e| e.code), Some(INTERNAL_ERROR), "{}", args);
        }
    }

    #[tokio::test]
    async fn unknown_method_and_tool_are_named() {
        let h = handler();
        let resp = h
            .handle_message(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
            .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "Unknown method: resources/list");

        let resp = h
            .handle_message(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"sell_all"}}"#,
            )
            .await;
        assert_eq!(resp.error.unwrap().message, "Unknown tool: sell_all");
        assert_eq!(resp.id, json!(4));
    }

    #[tokio::test]
    async fn notification_gets_unknown_method_with_null_id() {
        let resp = handler()
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert_eq!(resp.id, Value::Null);
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "Unknown method: notifications/initialized");
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error_with_null_id() {
        let resp = handler().handle_message("{\"jsonrpc\": \"2.0\", \"id\": 1,").await;
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn batches_are_rejected() {
        let resp = handler()
            .handle_message(r#"[{"jsonrpc":"2.0","id":1,"method":"tools/list"}]"#)
            .await;
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn wrong_version_and_missing_method_are_invalid_requests() {
        let h = handler();
        let resp = h
            .handle_message(r#"{"jsonrpc":"1.0","id":9,"method":"tools/list"}"#)
            .await;
        assert_eq!(resp.id, json!(9));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = h.handle_message(r#"{"jsonrpc":"2.0","id":10}"#).await;
        assert_eq!(resp.id, json!(10));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }
}
