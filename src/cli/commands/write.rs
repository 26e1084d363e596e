//! write command - Set fields from `section.field=value` arguments
//!
//! All settings go through one batch: the store's auto-write is turned off,
//! each setting is applied with `set_field`, and the document is written
//! only once every setting has been accepted. A rejected setting leaves the
//! file untouched.

use anyhow::{bail, Context as _, Result};

use crate::cli::commands::read::collect;
use crate::cli::Context;
use crate::ui::output;

/// One parsed `section.field=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub section: String,
    pub field: String,
    pub value: String,
}

/// Parse `section.field=value` arguments.
///
/// Each argument needs exactly one `=`, and its key exactly one `.`;
/// nested fields cannot be set from the command line.
pub fn parse_settings(args: &[String]) -> Result<Vec<Setting>> {
    args.iter()
        .map(|arg| {
            let parts: Vec<&str> = arg.split('=').collect();
            let [key, value] = parts.as_slice() else {
                bail!("'{}' should contain one '='", arg);
            };
            let parts: Vec<&str> = key.split('.').collect();
            let [section, field] = parts.as_slice() else {
                bail!(
                    "'{}' should contain one '.'; nested fields are not supported",
                    arg
                );
            };
            Ok(Setting {
                section: section.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Apply every setting, then write once.
pub fn write(ctx: &Context, args: &[String], force: bool) -> Result<()> {
    let settings = parse_settings(args)?;
    tracing::debug!(?settings, force, "applying settings");

    let mut store = ctx.open_store()?;
    store.set_auto_write(false);

    let mut touched: Vec<String> = Vec::new();
    for setting in &settings {
        store
            .set_field(&setting.section, &setting.field, &setting.value, force)
            .with_context(|| {
                format!(
                    "Failed to set {}.{}={}",
                    setting.section, setting.field, setting.value
                )
            })?;
        let section = setting.section.to_lowercase();
        if !touched.contains(&section) {
            touched.push(section);
        }
    }

    store.write().context("Failed to write config")?;

    if force {
        output::warn("wrote settings without schema checks", ctx.verbosity());
    }
    for (key, table) in collect(&store, &touched)? {
        output::print(output::format_section(&key, &table)?, ctx.verbosity());
    }
    Ok(())
}
