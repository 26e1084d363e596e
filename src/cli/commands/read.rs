//! read command - Print stored section values

use anyhow::{bail, Result};
use toml::Table;

use crate::cli::Context;
use crate::core::store::Store;
use crate::ui::output;

/// Print each requested section as TOML, or all of them as one JSON object.
///
/// Section data is printed even with `--quiet`.
pub fn read(ctx: &Context, sections: &[String], json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let found = collect(&store, sections)?;

    if json {
        let mut object = serde_json::Map::new();
        for (key, table) in &found {
            object.insert(key.clone(), output::table_to_json(table));
        }
        println!("{}", serde_json::to_string_pretty(&object)?);
        return Ok(());
    }

    for (key, table) in &found {
        print!("{}", output::format_section(key, table)?);
    }
    Ok(())
}

/// Stored maps of `sections`; unregistered keys are an error.
pub(crate) fn collect(store: &Store, sections: &[String]) -> Result<Vec<(String, Table)>> {
    let mut found = Vec::with_capacity(sections.len());
    for section in sections {
        let key = section.to_lowercase();
        if !store.registry().contains(&key) {
            bail!("unknown section '{}'", section);
        }
        let table = store.section(&key).cloned().unwrap_or_default();
        found.push((key, table));
    }
    Ok(found)
}
