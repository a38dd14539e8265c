//! Catalog listing.

use std::collections::HashMap;

use anyhow::{Context as _, Result};
use cart_core::{CatalogService, HttpCatalog, Product, ProductId, StockEntry};
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_price, truncate};

#[derive(Debug, Serialize, PartialEq)]
struct CatalogRow {
    id: ProductId,
    title: String,
    price: f64,
    /// Units available, `None` when the API has no stock record.
    stock: Option<i64>,
    in_cart: i64,
}

/// List products with their stock and the amount already in the cart.
pub async fn run(ctx: &Context) -> Result<()> {
    let catalog = HttpCatalog::new(ctx.fetch_client());
    let (products, stock) = tokio::try_join!(catalog.products(), catalog.stock_levels())
        .context("Failed to load catalog")?;
    ctx.output.debug(&format!(
        "{} products, {} stock entries",
        products.len(),
        stock.len()
    ));

    let in_cart = ctx.open_store()?.cart().amounts();
    let rows = build_rows(products, &stock, &in_cart);

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Catalog");
    let widths = [6, 32, 10, 6, 8];
    ctx.output
        .table_row(&["ID", "PRODUCT", "PRICE", "STOCK", "IN CART"], &widths);
    for row in &rows {
        let stock = row.stock.map_or_else(|| "-".to_string(), |n| n.to_string());
        ctx.output.table_row(
            &[
                &row.id.to_string(),
                &truncate(&row.title, 32),
                &format_price(row.price),
                &stock,
                &row.in_cart.to_string(),
            ],
            &widths,
        );
    }
    Ok(())
}

fn build_rows(
    products: Vec<Product>,
    stock: &[StockEntry],
    in_cart: &HashMap<ProductId, i64>,
) -> Vec<CatalogRow> {
    let stock: HashMap<ProductId, i64> = stock.iter().map(|s| (s.id, s.amount)).collect();
    products
        .into_iter()
        .map(|p| CatalogRow {
            id: p.id,
            stock: stock.get(&p.id).copied(),
            in_cart: in_cart.get(&p.id).copied().unwrap_or(0),
            title: p.title,
            price: p.price,
        })
        .collect()
}
