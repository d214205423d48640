//! Ordena MCP (Model Context Protocol) Server
//!
//! Exposes the order query tools over MCP so AI agents can pull purchase
//! orders, manufacturing orders, and order lines from Odoo through the n8n
//! workflow webhook.
//!
//! ## Architecture
//!
//! - `OrdenaMcpServer`: tool registration and dispatch over stdio
//! - `WebhookClient`: HTTP delivery of query payloads to n8n
//!
//! All domain logic (period resolution, order-type mapping, payload
//! construction) lives in `ordena-core`; this crate is request/response
//! glue.

mod server;
mod webhook;

pub use server::{GetOrderLineParams, GetOrderParams, OrdenaMcpServer};
pub use webhook::{WebhookClient, WebhookError};
