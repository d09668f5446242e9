use std::path::Path;

use anyhow::{Context, Result};

use crate::output::print_json;

/// Only the function declarations are needed, so the gateway block may be absent.
pub fn template(config_path: &Path) -> Result<()> {
    let descriptor = evgate_core::load_descriptor(config_path)
        .with_context(|| format!("Failed to load descriptor {}", config_path.display()))?;
    let fragment = evgate_core::iam::template_fragment(&descriptor.declarations());
    print_json(&fragment);
    Ok(())
}
