//! Project Configuration
//!
//! Optional JSON project file so a build does not have to spell every
//! catalog path on the command line. Command-line flags win over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Previous template catalog (`.pot`), if any.
    #[serde(default)]
    pub template: Option<String>,
    /// Locale tag to previous catalog path.
    #[serde(default)]
    pub locales: BTreeMap<String, String>,
    /// Directory the updated catalogs are written to.
    #[serde(default)]
    pub out_dir: Option<String>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("unable to read project file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid project file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_project_file() {
        let config: ProjectConfig = serde_json::from_str(
            r#"{
                "template": "messages.pot",
                "locales": {"de": "de.po", "fr": "fr.po"},
                "out_dir": "catalogs"
            }"#,
        )
        .unwrap();
        assert_eq!(config.template.as_deref(), Some("messages.pot"));
        assert_eq!(config.locales.len(), 2);
        assert_eq!(config.locales["de"], "de.po");
        assert_eq!(config.out_dir.as_deref(), Some("catalogs"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = serde_json::from_str::<ProjectConfig>(r#"{"outdir": "x"}"#);
        assert!(result.is_err());
    }
}
