//! MCP tool registration and dispatch.
//!
//! Three tools: `health`, `get_order`, and `get_order_line`. Domain
//! failures never surface as protocol errors; they become the
//! `{status: "error", message}` body the assistant's prompts were written
//! against, and no webhook call is made.

use chrono::Local;
use ordena_core::orders::{self, QueryPayload};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router,
    ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::webhook::WebhookClient;

/// MCP server proxying order queries to the n8n workflow.
#[derive(Clone)]
pub struct OrdenaMcpServer {
    webhook: WebhookClient,
    tool_router: ToolRouter<Self>,
}

impl OrdenaMcpServer {
    pub fn new(webhook: WebhookClient) -> Self {
        Self {
            webhook,
            tool_router: Self::tool_router(),
        }
    }

    async fn relay(
        &self,
        correlation_id: Uuid,
        payload: &QueryPayload,
    ) -> Result<CallToolResult, McpError> {
        match self.webhook.post(payload).await {
            Ok(response) => json_result(&response),
            Err(error) => {
                warn!(%correlation_id, %error, tool = payload.tool, "webhook call failed");
                Ok(error_result(&error.to_string()))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetOrderParams {
    /// Tipo de orden o modelo de Odoo equivalente (ej. "orden de compra", "purchase.order")
    pub order_type: String,
    /// Periodo de tiempo, ejemplo: hoy, ayer, esta semana, enero, 18 de agosto
    #[serde(default)]
    pub period: String,
    /// Año opcional, por defecto el año actual
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetOrderLineParams {
    /// Lista de órdenes obtenidas desde `get_order` o una lista de nombres
    pub orders: Vec<Value>,
}

#[tool_router]
impl OrdenaMcpServer {
    #[tool(description = "Verifica estado del servidor MCP")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            "MCP server OK",
        )]))
    }

    #[tool(description = "Recupera órdenes de Odoo a través de un workflow de n8n")]
    async fn get_order(
        &self,
        Parameters(params): Parameters<GetOrderParams>,
    ) -> Result<CallToolResult, McpError> {
        let correlation_id = Uuid::new_v4();
        info!(
            %correlation_id,
            order_type = %params.order_type,
            period = %params.period,
            year = ?params.year,
            "get_order called"
        );

        // The clock is read once per call; the resolver itself is pure.
        let now = Local::now().naive_local();
        let payload = match orders::order_query(&params.order_type, &params.period, params.year, now)
        {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%correlation_id, %error, "get_order rejected");
                return Ok(error_result(&error.to_string()));
            }
        };
        self.relay(correlation_id, &payload).await
    }

    #[tool(description = "Recupera las líneas de producto de una o varias órdenes de compra")]
    async fn get_order_line(
        &self,
        Parameters(params): Parameters<GetOrderLineParams>,
    ) -> Result<CallToolResult, McpError> {
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, orders = params.orders.len(), "get_order_line called");

        let payload = match orders::order_line_query(&params.orders) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%correlation_id, %error, "get_order_line rejected");
                return Ok(error_result(&error.to_string()));
            }
        };
        self.relay(correlation_id, &payload).await
    }
}

#[tool_handler]
impl ServerHandler for OrdenaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Servidor MCP de Ordena: consulta órdenes de compra, órdenes de \
                 fabricación y líneas de producto de Odoo a través de n8n."
                    .to_string(),
            ),
        }
    }
}

fn json_result(value: &Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|error| McpError::internal_error(error.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn error_result(message: &str) -> CallToolResult {
    let body = json!({ "status": "error", "message": message });
    CallToolResult::error(vec![Content::text(body.to_string())])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{GetOrderLineParams, GetOrderParams};

    #[test]
    fn get_order_params_default_period_and_year() {
        let params: GetOrderParams =
            serde_json::from_value(json!({ "order_type": "orden de compra" })).unwrap();
        assert_eq!(params.order_type, "orden de compra");
        assert_eq!(params.period, "");
        assert_eq!(params.year, None);
    }

    #[test]
    fn get_order_line_params_accept_objects_and_names() {
        let params: GetOrderLineParams = serde_json::from_value(json!({
            "orders": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();
        assert_eq!(params.orders.len(), 2);

        let params: GetOrderLineParams =
            serde_json::from_value(json!({ "orders": ["P00012"] })).unwrap();
        assert_eq!(params.orders[0], json!("P00012"));
    }
}
