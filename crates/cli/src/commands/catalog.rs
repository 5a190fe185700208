//! Catalog commands.

use clap::Subcommand;

use mirrorcraft_core::ProductId;
use mirrorcraft_storefront::{Storefront, StorefrontError};
use mirrorcraft_storefront::models::ProductQuery;

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products
    Products {
        /// Category filter
        #[arg(short, long)]
        category: Option<String>,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
}

pub async fn run(storefront: &Storefront, out: &Output, action: CatalogAction) -> Result<(), CliError> {
    let catalog = storefront.catalog();

    match action {
        CatalogAction::Products {
            category,
            search,
            page,
        } => {
            let query = ProductQuery {
                category,
                search,
                page,
            };
            let products = catalog.products(&query).await;
            out.emit(&products, || {
                if products.is_empty() {
                    return "No products".to_string();
                }
                products
                    .iter()
                    .map(|p| format!("{:<26} {:<40} {:>12}", p.id.as_str(), p.title, p.price.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }
        CatalogAction::Product { id } => {
            let id = ProductId::new(id);
            let product = catalog
                .product(&id)
                .await
                .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;
            out.emit(&product, || {
                let stock = product
                    .stock
                    .map_or_else(|| "unknown".to_string(), |n| n.to_string());
                format!(
                    "{}\n{}\nIn stock: {stock}\n{}",
                    product.title,
                    product.price,
                    product.description.as_deref().unwrap_or("")
                )
            });
        }
        CatalogAction::Categories => {
            let categories = catalog.categories().await;
            out.emit(&categories, || {
                categories
                    .iter()
                    .map(|c| format!("{:<26} {}", c.id.as_str(), c.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }
    }
    Ok(())
}
