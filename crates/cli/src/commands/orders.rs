//! Order commands.

use clap::Subcommand;

use mirrorcraft_core::OrderId;
use mirrorcraft_storefront::Storefront;
use mirrorcraft_storefront::state::FetchOutcome;

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// Fetch and list orders
    List {
        /// Ignore the debounce window and the hidden-history flag
        #[arg(short, long)]
        force: bool,
    },
    /// Cancel an order
    Cancel {
        /// Order ID
        id: String,
    },
    /// Show shipment tracking for an order
    Track {
        /// Order ID
        id: String,
    },
    /// Hide the order history on this device
    Clear,
}

pub async fn run(storefront: &Storefront, out: &Output, action: OrdersAction) -> Result<(), CliError> {
    let orders = storefront.orders();

    match action {
        OrdersAction::List { force } => {
            match orders.fetch_orders(force).await {
                FetchOutcome::Suppressed => {
                    out.status("Order history is hidden; use --force to show it");
                    return Ok(());
                }
                FetchOutcome::NotAuthenticated => {
                    return Err(CliError::Usage("Log in to see your orders".to_string()));
                }
                FetchOutcome::Failed => {
                    return Err(CliError::Failed("Could not load orders".to_string()));
                }
                FetchOutcome::Debounced | FetchOutcome::Fetched(_) => {}
            }

            let list = orders.orders();
            out.emit(&list, || {
                if list.is_empty() {
                    return "No orders".to_string();
                }
                list.iter()
                    .map(|o| {
                        let placed = o
                            .created_at
                            .map(|at| at.format("%Y-%m-%d").to_string())
                            .unwrap_or_default();
                        format!(
                            "{:<26} {:<12} {:>12}  {placed}",
                            o.id.as_str(),
                            o.status.as_str(),
                            o.total.to_string()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }
        OrdersAction::Cancel { id } => {
            let id = OrderId::new(id);
            if !orders.cancel_order(&id).await {
                return Err(CliError::Failed(format!("Could not cancel order {id}")));
            }
            out.status(&format!("Order {id} cancelled"));
        }
        OrdersAction::Track { id } => {
            let info = orders.track_order(&OrderId::new(id)).await?;
            out.emit(&info, || {
                let mut lines = vec![format!("Status: {}", info.status)];
                if let Some(carrier) = &info.carrier {
                    lines.push(format!("Carrier: {carrier}"));
                }
                if let Some(number) = &info.tracking_number {
                    lines.push(format!("Tracking number: {number}"));
                }
                if let Some(eta) = &info.estimated_delivery {
                    lines.push(format!("Estimated delivery: {eta}"));
                }
                for event in &info.events {
                    lines.push(format!(
                        "  {} {} {}",
                        event.timestamp.as_deref().unwrap_or("-"),
                        event.description,
                        event.location.as_deref().unwrap_or("")
                    ));
                }
                lines.join("\n")
            });
        }
        OrdersAction::Clear => {
            orders.clear_orders();
            out.status("Order history hidden");
        }
    }
    Ok(())
}
