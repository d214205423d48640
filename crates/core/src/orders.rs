//! Order query model for the n8n Odoo workflow.
//!
//! Builds the JSON payloads the webhook expects: a target resource (Odoo
//! model), an options block, and a filter list using the n8n Odoo node's
//! operator vocabulary.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::period::{self, PeriodError};

/// Backend entities the workflow can query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderResource {
    PurchaseOrder,
    ManufacturingOrder,
    PurchaseOrderLine,
}

impl OrderResource {
    /// Odoo model name as the n8n Odoo node expects it.
    pub fn model(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase.order",
            Self::ManufacturingOrder => "mrp.production",
            Self::PurchaseOrderLine => "purchase.order.line",
        }
    }

    /// Field the period filters are applied to. Purchase orders are
    /// filtered on the order date, manufacturing orders only carry a
    /// creation date.
    pub fn date_field(self) -> &'static str {
        match self {
            Self::PurchaseOrder | Self::PurchaseOrderLine => "date_order",
            Self::ManufacturingOrder => "create_date",
        }
    }
}

/// Spanish order-type names accepted by `get_order`, lower-cased.
const ORDER_TYPES: [(&str, OrderResource); 10] = [
    ("orden de compra", OrderResource::PurchaseOrder),
    ("órdenes de compra", OrderResource::PurchaseOrder),
    ("ordenes de compra", OrderResource::PurchaseOrder),
    ("compra", OrderResource::PurchaseOrder),
    ("compras", OrderResource::PurchaseOrder),
    ("orden de fabricación", OrderResource::ManufacturingOrder),
    ("órdenes de fabricación", OrderResource::ManufacturingOrder),
    ("ordenes de fabricación", OrderResource::ManufacturingOrder),
    ("fabricación", OrderResource::ManufacturingOrder),
    ("producción", OrderResource::ManufacturingOrder),
];

/// Failures while building an order query.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Tipo de orden no soportado: {0}")]
    UnsupportedOrderType(String),
    #[error("Error al extraer los IDs, la entrada no contiene clave `id`")]
    MissingOrderId,
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Map a user-supplied order type to a queryable resource. Raw Odoo model
/// names pass through untouched; anything else is matched against the
/// Spanish order-type names, case-insensitively.
pub fn resolve_order_type(input: &str) -> Result<OrderResource, OrderError> {
    let trimmed = input.trim();
    if let Some(resource) = [OrderResource::PurchaseOrder, OrderResource::ManufacturingOrder]
        .into_iter()
        .find(|resource| resource.model() == trimmed)
    {
        return Ok(resource);
    }

    let lowered = trimmed.to_lowercase();
    ORDER_TYPES
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|&(_, resource)| resource)
        .ok_or_else(|| OrderError::UnsupportedOrderType(trimmed.to_string()))
}

/// JSON body POSTed to the n8n webhook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryPayload {
    pub tool: &'static str,
    pub resource: &'static str,
    pub options: QueryOptions,
    pub filters: Vec<QueryFilter>,
}

/// Query options block. An empty field list asks the workflow for every
/// field of the resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    pub fields: Vec<String>,
}

/// One condition in the workflow's filter list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryFilter {
    pub field: &'static str,
    pub operator: FilterOperator,
    pub value: Value,
}

/// Comparison operators in the n8n Odoo node vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    GreaterOrEqual,
    LesserOrEqual,
    In,
}

/// Build the `get_order` payload: resolve the order type and the period
/// expression, then bound the query with the resulting date range.
pub fn order_query(
    order_type: &str,
    period_expr: &str,
    year: Option<i32>,
    now: NaiveDateTime,
) -> Result<QueryPayload, OrderError> {
    let resource = resolve_order_type(order_type)?;
    let range = period::resolve(period_expr, year, now)?;
    let field = resource.date_field();

    Ok(QueryPayload {
        tool: "get_order",
        resource: resource.model(),
        options: QueryOptions::default(),
        filters: vec![
            QueryFilter {
                field,
                operator: FilterOperator::GreaterOrEqual,
                value: Value::String(range.start_string()),
            },
            QueryFilter {
                field,
                operator: FilterOperator::LesserOrEqual,
                value: Value::String(range.end_string()),
            },
        ],
    })
}

/// Build the `get_order_line` payload.
///
/// A list of order objects (as returned by `get_order`) is mined for its
/// `id` values and resolved against order lines; a list of plain values is
/// treated as order display names instead.
pub fn order_line_query(orders: &[Value]) -> Result<QueryPayload, OrderError> {
    let (resource, field, values) = match orders.first() {
        Some(Value::Object(_)) => {
            let ids = orders
                .iter()
                .map(|order| order.get("id").cloned().ok_or(OrderError::MissingOrderId))
                .collect::<Result<Vec<_>, _>>()?;
            (OrderResource::PurchaseOrderLine, "order_id", ids)
        }
        _ => (
            OrderResource::PurchaseOrder,
            "display_name",
            orders.to_vec(),
        ),
    };

    Ok(QueryPayload {
        tool: "get_order_line",
        resource: resource.model(),
        options: QueryOptions::default(),
        filters: vec![QueryFilter {
            field,
            operator: FilterOperator::In,
            value: Value::Array(values),
        }],
    })
}
