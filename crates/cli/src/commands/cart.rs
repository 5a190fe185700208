//! Cart commands.

use std::fmt::Write;

use clap::Subcommand;

use mirrorcraft_core::{Money, ProductId};
use mirrorcraft_storefront::{Storefront, StorefrontError};
use mirrorcraft_storefront::models::CartProduct;

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product to the cart
    Add {
        /// Product ID
        id: String,

        /// Display title (looked up in the catalog when omitted)
        #[arg(short, long, requires = "price")]
        title: Option<String>,

        /// Unit price, e.g. 1499 or "₹1,499" (looked up when omitted)
        #[arg(short, long, requires = "title")]
        price: Option<String>,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Image URL
        #[arg(long)]
        img: Option<String>,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: String,
    },
    /// Set the quantity of a cart line (0 removes it)
    SetQty {
        /// Product ID
        id: String,
        /// New quantity
        quantity: u32,
    },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
    /// Send a cart line to the server (requires login)
    Mirror {
        /// Product ID
        id: String,
    },
}

pub async fn run(storefront: &Storefront, out: &Output, action: CartAction) -> Result<(), CliError> {
    let cart = storefront.cart();

    match action {
        CartAction::Add {
            id,
            title,
            price,
            quantity,
            img,
        } => {
            let id = ProductId::new(id);
            let (product, quantity) = match (title, price) {
                (Some(title), Some(price)) => (
                    CartProduct {
                        id,
                        title,
                        price: Money::parse_lenient(&price),
                        img,
                    },
                    quantity,
                ),
                _ => {
                    let product = storefront
                        .catalog()
                        .product(&id)
                        .await
                        .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;
                    let quantity = product
                        .clamp_quantity(quantity)
                        .ok_or_else(|| CliError::Usage(format!("{} is out of stock", product.title)))?;
                    let mut line = product.to_cart_product();
                    if let Some(img) = img {
                        line.img = Some(img);
                    }
                    (line, quantity)
                }
            };
            cart.add_to_cart(product, quantity);
            out.status(&format!("Cart now holds {} item(s)", cart.total_items()));
        }
        CartAction::Remove { id } => {
            if cart.remove_from_cart(&ProductId::new(id)) {
                out.status("Removed");
            } else {
                out.status("Not in cart");
            }
        }
        CartAction::SetQty { id, quantity } => {
            let id = ProductId::new(id);
            if !cart.contains(&id) {
                return Err(CliError::Usage(format!("{id} is not in the cart")));
            }
            cart.update_quantity(&id, quantity);
            out.status(&format!("{id}: {}", cart.quantity_of(&id)));
        }
        CartAction::Show => {
            let items = cart.items();
            let total = cart.total_price();
            out.emit(
                &serde_json::json!({
                    "items": items,
                    "totalItems": cart.total_items(),
                    "totalPrice": total,
                }),
                || {
                    if items.is_empty() {
                        return "Cart is empty".to_string();
                    }
                    let mut text = String::new();
                    for item in &items {
                        let _ = writeln!(
                            text,
                            "{:>4} × {:<40} {:>12}  [{}]",
                            item.quantity,
                            item.title,
                            item.line_total().to_string(),
                            item.id
                        );
                    }
                    let _ = write!(text, "Total: {total}");
                    text
                },
            );
        }
        CartAction::Clear => {
            cart.clear_cart();
            out.status("Cart cleared");
        }
        CartAction::Mirror { id } => {
            let id = ProductId::new(id);
            let quantity = cart.quantity_of(&id);
            if quantity == 0 {
                return Err(CliError::Usage(format!("{id} is not in the cart")));
            }
            if cart.mirror_to_server(&id, quantity).await {
                out.status("Mirrored to server");
            } else {
                return Err(CliError::Failed("Server did not accept the cart line".to_string()));
            }
        }
    }
    Ok(())
}
