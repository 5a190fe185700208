//! Orders and shipment tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mirrorcraft_core::{Money, OrderId, OrderStatus, ProductId};

/// A placed order.
///
/// Identity and status are owned by the server; the client only ever patches
/// `status` to [`OrderStatus::Cancelled`] after a confirmed cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Money,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the order can still be cancelled.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Processing)
    }
}

/// Snapshot of a purchased line at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub title: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// Shipping address captured with an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default, alias = "address", alias = "street")]
    pub line1: Option<String>,
    #[serde(default, alias = "address2")]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "pincode", alias = "zip", alias = "zipCode")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Single-line rendering, skipping blank parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            &self.full_name,
            &self.line1,
            &self.line2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Carrier status for an order, as returned by the tracking endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    #[serde(default, alias = "orderStatus")]
    pub status: OrderStatus,
    #[serde(default, alias = "courier")]
    pub carrier: Option<String>,
    #[serde(default, alias = "awb", alias = "trackingId")]
    pub tracking_number: Option<String>,
    #[serde(default, alias = "estimatedDeliveryDate", alias = "eta")]
    pub estimated_delivery: Option<String>,
    #[serde(default, alias = "history", alias = "timeline")]
    pub events: Vec<TrackingEvent>,
}

/// One checkpoint in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    #[serde(default, alias = "status")]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "date", alias = "time")]
    pub timestamp: Option<String>,
}
