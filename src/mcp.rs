use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};

use crate::config::Config;
use crate::limitless::LimitlessClient;
use crate::tools::{GetLifelogById, GetLifelogs, Tool};

const SERVER_NAME: &str = "limitless";
const INSTRUCTIONS: &str = "Limitless APIを使用してlifelogsを取得し、Markdown形式で出力します。";

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

/// MCP server exposing the lifelog tools over stdio.
pub struct McpServer {
    get_lifelogs: GetLifelogs,
    get_lifelog_by_id: GetLifelogById,
}

impl McpServer {
    pub fn new(config: &Config, client: LimitlessClient) -> Self {
        Self {
            get_lifelogs: GetLifelogs::new(client.clone(), config.query.clone()),
            get_lifelog_by_id: GetLifelogById::new(client, config.query.clone()),
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            _ => JsonRpcResponse::failure(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": INSTRUCTIONS
            }),
        )
    }

    fn handle_list_tools(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "tools": [
                    {
                        "name": self.get_lifelogs.name(),
                        "description": "Fetch lifelogs from the Limitless API for a date or time range and return them as Markdown.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "date": {
                                    "type": "string",
                                    "description": "Return entries beginning on this date (YYYY-MM-DD)."
                                },
                                "start": {
                                    "type": "string",
                                    "description": "Start of the time range, ISO-8601 (YYYY-MM-DD or YYYY-MM-DD HH:mm:SS)."
                                },
                                "end": {
                                    "type": "string",
                                    "description": "End of the time range, same format as start."
                                },
                                "cursor": {
                                    "type": "string",
                                    "description": "Pagination cursor returned by a previous call."
                                },
                                "isStarred": {
                                    "type": "boolean",
                                    "description": "Only return starred lifelogs."
                                },
                                "limit": {
                                    "type": "integer",
                                    "description": "Maximum number of lifelogs to return.",
                                    "default": 5
                                },
                                "search": {
                                    "type": "string",
                                    "description": "Search term to filter lifelogs by."
                                }
                            }
                        }
                    },
                    {
                        "name": self.get_lifelog_by_id.name(),
                        "description": "Fetch a single lifelog by its ID and return it as Markdown.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "id": {
                                    "type": "string",
                                    "description": "The ID of the lifelog to retrieve."
                                }
                            },
                            "required": ["id"]
                        }
                    }
                ]
            }),
        )
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(params) => params,
            None => return JsonRpcResponse::failure(id, -32602, "Missing params".to_string()),
        };

        let tool_name = match params.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => return JsonRpcResponse::failure(id, -32602, "Missing tool name".to_string()),
        };

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = match tool_name.as_str() {
            "get_lifelogs" => {
                let args: crate::tools::GetLifelogsArgs = match serde_json::from_value(arguments) {
                    Ok(args) => args,
                    Err(e) => {
                        return JsonRpcResponse::failure(
                            id,
                            -32602,
                            format!("Invalid arguments: {}", e),
                        )
                    }
                };
                self.get_lifelogs.run(args).await
            }
            "get_lifelog_by_id" => {
                let args: crate::tools::GetLifelogByIdArgs = match serde_json::from_value(arguments)
                {
                    Ok(args) => args,
                    Err(e) => {
                        return JsonRpcResponse::failure(
                            id,
                            -32602,
                            format!("Invalid arguments: {}", e),
                        )
                    }
                };
                self.get_lifelog_by_id.run(args).await
            }
            _ => {
                return JsonRpcResponse::failure(
                    id,
                    -32602,
                    format!("Unknown tool: {}", tool_name),
                )
            }
        };

        match result {
            Ok(markdown) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": markdown
                        }
                    ]
                }),
            ),
            Err(e) => {
                log::error!("tool {} failed: {}", tool_name, e);
                JsonRpcResponse::failure(id, -32603, e.to_string())
            }
        }
    }
}

/// Serve MCP requests line-by-line over stdio until EOF. Responses go
/// to stdout, one per line; logging stays on stderr so the JSON-RPC
/// channel is never polluted.
pub async fn run_server(config: &Config, client: LimitlessClient) -> anyhow::Result<()> {
    let server = McpServer::new(config, client);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin);

    log::info!("Limitless MCP server listening on stdio");

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::failure(Value::Null, -32700, format!("Parse error: {}", e));
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
                continue;
            }
        };

        // Requests without an id are notifications and get no response.
        if request.id.is_none() {
            log::debug!("notification {} ignored", request.method);
            continue;
        }

        let response = server.handle_request(request).await;
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }

    log::info!("stdin closed, shutting down");
    Ok(())
}
