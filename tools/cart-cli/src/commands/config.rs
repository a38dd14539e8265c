//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    if let Some(secs) = ctx.config.api.timeout_secs {
        ctx.output.kv("timeout_secs", &secs.to_string());
    }

    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.config.storage.dir);
    ctx.output.kv("key", &ctx.config.storage.key);
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join("cart.toml");
    if path.exists() && !force {
        bail!("cart.toml already exists. Use --force to overwrite.");
    }

    fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    ctx.output.success(&format!("Created {}", path.display()));
    Ok(())
}
