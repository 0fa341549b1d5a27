use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration from `.umlgen.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/target/**".to_string(),
        "**/build/**".to_string(),
        "**/generated/**".to_string(),
    ]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// What to do with a type that is neither declared, listed as user-defined,
/// nor known to be foreign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Drop it like a library type.
    #[default]
    Foreign,
    /// Keep it and draw it as an external stub.
    External,
}

impl std::str::FromStr for UnknownTypePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foreign" => Ok(UnknownTypePolicy::Foreign),
            "external" => Ok(UnknownTypePolicy::External),
            _ => Err(anyhow::anyhow!("unknown type policy: {s}")),
        }
    }
}

/// Type resolution settings. The list fields extend the built-in tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Strict mode: an unclassifiable type fails the referencing entity.
    #[serde(default)]
    pub fail_on_unresolved_type: bool,
    #[serde(default)]
    pub unknown_types: UnknownTypePolicy,
    /// Names that are user-defined even though they are not declared.
    #[serde(default)]
    pub user_types: Vec<String>,
    #[serde(default)]
    pub foreign_types: Vec<String>,
    #[serde(default = "default_foreign_prefixes")]
    pub foreign_prefixes: Vec<String>,
    #[serde(default)]
    pub list_types: Vec<String>,
    #[serde(default)]
    pub set_types: Vec<String>,
    #[serde(default)]
    pub map_types: Vec<String>,
    #[serde(default)]
    pub optional_types: Vec<String>,
}

fn default_foreign_prefixes() -> Vec<String> {
    vec!["java.".to_string(), "javax.".to_string()]
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fail_on_unresolved_type: false,
            unknown_types: UnknownTypePolicy::default(),
            user_types: Vec::new(),
            foreign_types: Vec::new(),
            foreign_prefixes: default_foreign_prefixes(),
            list_types: Vec::new(),
            set_types: Vec::new(),
            map_types: Vec::new(),
            optional_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    /// Render fields and methods inside class boxes.
    #[serde(default = "default_true")]
    pub include_members: bool,
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            include_members: true,
        }
    }
}

impl Config {
    /// Load configuration from a `.umlgen.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `umlgen init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.umlgen.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(".umlgen.toml");
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            "failed to load config: {e:#}. Using defaults."
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `umlgen init`.
    pub fn default_toml() -> String {
        r#"# umlgen - Class Diagram Generation Configuration

[project]
# Glob patterns (relative to the analyzed directory) to skip
exclude_patterns = ["**/target/**", "**/build/**", "**/generated/**"]

[resolver]
# Fail the referencing class when a type cannot be classified
fail_on_unresolved_type = false
# Unknown types: "foreign" drops them, "external" draws them as stubs
unknown_types = "foreign"
# Types to treat as user-defined even when not part of the analyzed sources
user_types = []
# Extra library types and package prefixes to ignore
foreign_types = []
foreign_prefixes = ["java.", "javax."]
# Extra container types, e.g. list_types = ["ImmutableList"]
list_types = []
set_types = []
map_types = []
optional_types = []

[output]
# One of "text", "json", "glsp", "mermaid", "dot"
format = "text"
include_members = true
"#
        .to_string()
    }
}
