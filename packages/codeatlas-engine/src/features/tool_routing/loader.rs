//! Registry configuration loading
//!
//! Resolution order: `TOOL_REGISTRY_PATH`, then `./config/tool_registry.yaml`,
//! then `./tool_registry.yaml`, falling back to the embedded default blob.
//! External files are bounded at 1 MiB, path-traversal components are
//! rejected, and the path is resolved to absolute form before stat.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::registry::{RegistryFile, ToolRegistry};
use crate::shared::models::{EngineError, Result};

/// Environment override for the registry location
pub const TOOL_REGISTRY_PATH_ENV: &str = "TOOL_REGISTRY_PATH";

/// External registry files above this size are rejected
pub const MAX_YAML_BYTES: u64 = 1024 * 1024;

/// Registry shipped inside the binary
const EMBEDDED_REGISTRY: &str = include_str!("default_registry.yaml");

/// Loader-local failure modes, surfaced to callers as `config_error`
#[derive(Debug, thiserror::Error)]
pub enum RegistryLoadError {
    #[error("cannot access registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry file {path} exceeds the {cap} byte cap")]
    Oversized { path: String, cap: u64 },

    #[error("registry path must not contain parent-directory components")]
    Traversal,

    #[error("{env} points at a missing file: {path}")]
    MissingOverride { env: &'static str, path: String },
}

impl From<RegistryLoadError> for EngineError {
    fn from(err: RegistryLoadError) -> Self {
        EngineError::config(err.to_string())
    }
}

/// Load the registry from the first resolvable source.
pub fn load() -> Result<ToolRegistry> {
    if let Some(path) = resolve_path()? {
        debug!(path = %path.display(), "loading tool registry from file");
        return load_from_path(&path);
    }
    debug!("loading embedded tool registry");
    parse(EMBEDDED_REGISTRY)
}

/// Load and validate a specific registry file.
pub fn load_from_path(path: &Path) -> Result<ToolRegistry> {
    let metadata = std::fs::metadata(path).map_err(|source| RegistryLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if metadata.len() > MAX_YAML_BYTES {
        return Err(RegistryLoadError::Oversized {
            path: path.display().to_string(),
            cap: MAX_YAML_BYTES,
        }
        .into());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| RegistryLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&raw)
}

/// Parse YAML into a capped registry.
pub fn parse(yaml: &str) -> Result<ToolRegistry> {
    if yaml.len() as u64 > MAX_YAML_BYTES {
        return Err(EngineError::config("registry document exceeds the 1 MiB cap"));
    }
    let file: RegistryFile = serde_yaml::from_str(yaml)?;
    ToolRegistry::from_entries(file.tools)
}

/// First existing candidate path, absolute, traversal-free. `None` selects
/// the embedded blob.
fn resolve_path() -> Result<Option<PathBuf>> {
    if let Ok(configured) = std::env::var(TOOL_REGISTRY_PATH_ENV) {
        let path = PathBuf::from(&configured);
        reject_traversal(&path)?;
        let absolute = absolutize(path)?;
        if absolute.is_file() {
            return Ok(Some(absolute));
        }
        // An explicit override that does not exist is a configuration
        // error, not a silent fallback.
        return Err(RegistryLoadError::MissingOverride {
            env: TOOL_REGISTRY_PATH_ENV,
            path: configured,
        }
        .into());
    }

    for candidate in ["./config/tool_registry.yaml", "./tool_registry.yaml"] {
        let absolute = absolutize(PathBuf::from(candidate))?;
        if absolute.is_file() {
            return Ok(Some(absolute));
        }
    }
    Ok(None)
}

fn reject_traversal(path: &Path) -> Result<()> {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        warn!(path = %path.display(), "rejected registry path with parent components");
        return Err(RegistryLoadError::Traversal.into());
    }
    Ok(())
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| EngineError::config(format!("cannot resolve working directory: {}", e)))?;
    Ok(cwd.join(path))
}

// ============================================================================
// Tests
// ============================================================================
