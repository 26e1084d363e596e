//! delete command - Remove fields or whole sections

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::ui::output;

/// Unset each key in order, stopping at the first failure.
pub fn delete(ctx: &Context, keys: &[String]) -> Result<()> {
    let mut store = ctx.open_store()?;

    for key in keys {
        store
            .unset(key)
            .with_context(|| format!("Failed to delete '{}'", key))?;
        output::success(format!("deleted '{}'", key), ctx.verbosity());
    }

    Ok(())
}
