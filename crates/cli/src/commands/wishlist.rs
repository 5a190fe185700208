//! Wishlist commands.

use clap::Subcommand;

use mirrorcraft_core::{Money, ProductId};
use mirrorcraft_storefront::Storefront;
use mirrorcraft_storefront::models::WishlistItem;
use mirrorcraft_storefront::state::AddOutcome;

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Save a product
    Add {
        /// Product ID
        id: String,

        /// Display title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Price, e.g. 899 or "₹899"
        #[arg(short, long, default_value = "0")]
        price: String,

        /// Image URL
        #[arg(long)]
        img: Option<String>,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// List saved products
    Show,
    /// Replace the local wishlist with the server's (requires login)
    Sync,
    /// Remove every saved product locally
    Clear,
}

pub async fn run(
    storefront: &Storefront,
    out: &Output,
    action: WishlistAction,
) -> Result<(), CliError> {
    let wishlist = storefront.wishlist();

    match action {
        WishlistAction::Add {
            id,
            title,
            price,
            img,
        } => {
            let mut item = WishlistItem::new(ProductId::new(id), title, Money::parse_lenient(&price));
            item.img = img;
            match wishlist.add_to_wishlist(item).await {
                AddOutcome::Added => out.status("Saved"),
                AddOutcome::AlreadyPresent => out.status("Already saved"),
            }
        }
        WishlistAction::Remove { id } => {
            if wishlist.remove_from_wishlist(&ProductId::new(id)).await {
                out.status("Removed");
            } else {
                out.status("Not saved");
            }
        }
        WishlistAction::Show => {
            let items = wishlist.items();
            out.emit(&items, || {
                if items.is_empty() {
                    return "Wishlist is empty".to_string();
                }
                items
                    .iter()
                    .map(|i| format!("{:<40} {:>12}  [{}]", i.title, i.price.to_string(), i.product_id))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }
        WishlistAction::Sync => {
            let count = wishlist.fetch_wishlist().await?;
            out.status(&format!("Wishlist synced: {count} item(s)"));
        }
        WishlistAction::Clear => {
            wishlist.clear_wishlist();
            out.status("Wishlist cleared");
        }
    }
    Ok(())
}
