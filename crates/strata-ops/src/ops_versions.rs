//! Operation: print the resolved version of every module.

use std::collections::BTreeMap;
use std::path::Path;

use strata_core::config::GlobalConfig;
use strata_core::version_provider::VersionProvider;
use strata_util::errors::StrataError;

use crate::ops_resolve::{resolve_project, ResolveOptions};

/// Options for `strata versions`.
#[derive(Debug, Clone, Default)]
pub struct VersionsOptions {
    pub resolve: ResolveOptions,
    /// Print a JSON object instead of `"group:name" = "version"` lines.
    pub json: bool,
}

pub async fn versions(project_root: &Path, config: &GlobalConfig, opts: &VersionsOptions) -> miette::Result<()> {
    let resolved = resolve_project(project_root, config, &opts.resolve).await?;
    let provider = resolved.result.resolved_version_provider();
    if opts.json {
        println!("{}", versions_json(provider)?);
    } else {
        print!("{}", versions_text(provider));
    }
    Ok(())
}

/// One `"group:name" = "version"` line per module, sorted by module.
pub fn versions_text(provider: &VersionProvider) -> String {
    provider
        .iter()
        .map(|(module, version)| format!("\"{module}\" = \"{version}\"\n"))
        .collect()
}

pub fn versions_json(provider: &VersionProvider) -> Result<String, StrataError> {
    let map: BTreeMap<String, &str> = provider
        .iter()
        .map(|(module, version)| (module.to_string(), version.as_str()))
        .collect();
    serde_json::to_string_pretty(&map).map_err(|e| StrataError::Generic {
        message: format!("cannot serialize versions: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::module_id::ModuleId;
    use strata_core::version::Version;

    fn provider() -> VersionProvider {
        VersionProvider::new()
            .and(ModuleId::new("org.b", "b"), Version::parse("2.0").unwrap())
            .and(ModuleId::new("org.a", "a"), Version::parse("1.0").unwrap())
    }

    #[test]
    fn text_is_sorted() {
        assert_eq!(
            versions_text(&provider()),
            "\"org.a:a\" = \"1.0\"\n\"org.b:b\" = \"2.0\"\n"
        );
    }

    #[test]
    fn json_object() {
        let json: serde_json::Value = serde_json::from_str(&versions_json(&provider()).unwrap()).unwrap();
        assert_eq!(json["org.b:b"], "2.0");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
