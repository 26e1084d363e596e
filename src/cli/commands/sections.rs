//! sections command - List registered sections and their fields

use anyhow::Result;
use serde::Serialize;

use crate::cli::Context;
use crate::core::registry::Registry;
use crate::ui::output;

#[derive(Debug, Serialize)]
struct FieldInfo {
    name: &'static str,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct SectionInfo {
    section: &'static str,
    fields: Vec<FieldInfo>,
}

fn describe(registry: &Registry) -> Vec<SectionInfo> {
    registry
        .iter()
        .map(|descriptor| SectionInfo {
            section: descriptor.key(),
            fields: descriptor
                .fields()
                .iter()
                .map(|f| FieldInfo {
                    name: f.name,
                    kind: f.kind.name(),
                })
                .collect(),
        })
        .collect()
}

/// List sections. Does not touch the config file.
pub fn sections(ctx: &Context, json: bool) -> Result<()> {
    let info = describe(&Registry::builtin());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    for section in &info {
        output::print(section.section, ctx.verbosity());
        for field in &section.fields {
            output::print(format!("  {:<26} {}", field.name, field.kind), ctx.verbosity());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_every_section() {
        let registry = Registry::builtin();
        let info = describe(&registry);
        assert_eq!(info.len(), registry.len());

        let audio = info.iter().find(|s| s.section == "audio").unwrap();
        assert!(audio
            .fields
            .iter()
            .any(|f| f.name == "volume-control" && f.kind == "string"));
    }
}
