use std::fmt;

use serde::{Deserialize, Serialize};
use strata_util::errors::StrataError;

/// A `(group, name)` pair identifying a module independently of its version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub group: String,
    pub name: String,
}

impl ModuleId {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// Parse `"group:name"`. A single token is accepted as both group and name
    /// (`"commons-pool"` means `commons-pool:commons-pool`).
    pub fn parse(s: &str) -> Result<Self, StrataError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [single] if !single.is_empty() => Ok(Self::new(*single, *single)),
            [group, name] if !group.is_empty() && !name.is_empty() => {
                Ok(Self::new(*group, *name))
            }
            _ => Err(StrataError::Manifest {
                message: format!("invalid module id '{s}', expected 'group:name'"),
            }),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// Module coordinates parsed from a `"group:name[:version]"` description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCoordinate {
    pub module_id: ModuleId,
    /// The raw version expression; empty when omitted.
    pub version: String,
}

impl ModuleCoordinate {
    /// Parse `"group:name"` or `"group:name:version"`.
    pub fn parse(s: &str) -> Result<Self, StrataError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, name] if !group.is_empty() && !name.is_empty() => Ok(Self {
                module_id: ModuleId::new(*group, *name),
                version: String::new(),
            }),
            [group, name, version] if !group.is_empty() && !name.is_empty() => Ok(Self {
                module_id: ModuleId::new(*group, *name),
                version: version.to_string(),
            }),
            _ => Err(StrataError::Manifest {
                message: format!("invalid module description '{s}', expected 'group:name[:version]'"),
            }),
        }
    }
}
