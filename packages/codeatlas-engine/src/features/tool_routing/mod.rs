//! Tool-routing registry
//!
//! YAML-configured mapping from free-text user intent to the right
//! analysis tool, with hard caps (≤200 tools, ≤50 keywords per tool,
//! ≤1 MiB of YAML) and a once-initialized process-wide instance.

pub mod loader;
pub mod registry;

pub use loader::{
    load_from_path, parse, RegistryLoadError, MAX_YAML_BYTES, TOOL_REGISTRY_PATH_ENV,
};
pub use registry::{
    global, ToolEntry, ToolMatch, ToolRegistry, MAX_KEYWORDS_PER_TOOL, MAX_TOOLS,
};
