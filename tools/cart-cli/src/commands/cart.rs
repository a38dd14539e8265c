//! Cart commands.

use anyhow::Result;
use cart_core::{Cart, CartError, Notice, Operation};
use serde::Serialize;

use super::{AddArgs, RemoveArgs, Reported, UpdateArgs};
use crate::context::Context;
use crate::output::{format_price, truncate};

#[derive(Serialize)]
struct CartSummary<'a> {
    items: &'a Cart,
    products: usize,
    units: i64,
    total: f64,
}

impl<'a> CartSummary<'a> {
    fn new(cart: &'a Cart) -> Self {
        Self {
            items: cart,
            products: cart.len(),
            units: cart.item_count(),
            total: cart.iter().map(|p| p.price * p.amount as f64).sum(),
        }
    }
}

/// Show the cart contents.
pub async fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    print_cart(store.cart(), ctx);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    ctx.output.debug(&format!("Adding product {}", args.id));

    let amount = store
        .add_product(args.id)
        .await
        .map_err(|e| report(Operation::Add, e, ctx))?;

    if ctx.output.is_json() {
        ctx.output.json(&CartSummary::new(store.cart()));
    } else {
        ctx.output
            .success(&format!("Product {} in cart: {} unit(s)", args.id, amount));
    }
    Ok(())
}

/// Remove a product line.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;

    let removed = store
        .remove_product(args.id)
        .map_err(|e| report(Operation::Remove, e, ctx))?;

    if ctx.output.is_json() {
        ctx.output.json(&CartSummary::new(store.cart()));
    } else {
        ctx.output.success(&format!("Removed {}", removed.title));
    }
    Ok(())
}

/// Set the amount held of a product.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;

    let changed = store
        .update_product_amount(args.id, args.amount)
        .await
        .map_err(|e| report(Operation::UpdateAmount, e, ctx))?;

    if ctx.output.is_json() {
        ctx.output.json(&CartSummary::new(store.cart()));
    } else if changed {
        ctx.output.success(&format!(
            "Product {} in cart: {} unit(s)",
            args.id, args.amount
        ));
    } else {
        ctx.output
            .debug(&format!("Amount {} ignored, nothing changed", args.amount));
    }
    Ok(())
}

fn report(operation: Operation, error: CartError, ctx: &Context) -> anyhow::Error {
    ctx.output.notice(&Notice::for_failure(operation, &error));
    ctx.output.debug(&format!("{:#}", anyhow::Error::from(error)));
    Reported.into()
}

fn print_cart(cart: &Cart, ctx: &Context) {
    let summary = CartSummary::new(cart);
    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return;
    }

    ctx.output.header("Cart");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    let widths = [6, 32, 6, 10, 10];
    ctx.output
        .table_row(&["ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"], &widths);
    for product in cart {
        let subtotal = product.price * product.amount as f64;
        ctx.output.table_row(
            &[
                &product.id.to_string(),
                &truncate(&product.title, 32),
                &product.amount.to_string(),
                &format_price(product.price),
                &format_price(subtotal),
            ],
            &widths,
        );
    }
    ctx.output.info("");
    ctx.output.kv("products", &summary.products.to_string());
    ctx.output.kv("units", &summary.units.to_string());
    ctx.output.kv("total", &format_price(summary.total));
}
