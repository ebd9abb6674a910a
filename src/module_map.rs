//! Module Mapper: resolve a source file path to an architecture-level
//! module label, via exact map + ordered glob patterns + default.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CallTreeError;

/// On-disk / in-memory shape of a module-mapping config (spec.md §4.1,
/// §6). The YAML loader is ambient plumbing around this schema —
/// `serde_yaml::from_str::<ModuleMapConfig>` is the whole of it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModuleMapConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub file_mappings: HashMap<String, String>,
    /// Declaration order matters for resolution; `serde_yaml` preserves
    /// map key order from the document via `indexmap`-free `Vec` here so
    /// we never depend on a HashMap's iteration order for semantics.
    #[serde(default)]
    pub pattern_mappings: Vec<(String, String)>,
    pub default_module: Option<String>,
}

const SUPPORTED_VERSION: &str = "1.0";

fn validate_label(label: &str, context: &str) -> Result<String, CallTreeError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(CallTreeError::InvalidConfig {
            message: format!("{} must not be empty or whitespace-only", context),
        });
    }
    Ok(trimmed.to_string())
}

/// Compile a shell-style glob pattern (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, CallTreeError> {
    const REGEX_META: &str = r".+()[]{}|^$\";
    let mut out = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c if REGEX_META.contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    Regex::new(&out).map_err(|e| CallTreeError::InvalidConfig {
        message: format!("invalid glob pattern '{}': {}", pattern, e),
    })
}

struct CompiledPattern {
    regex: Regex,
    label: String,
}

/// Resolves a source file path to a module label. Construction validates
/// the whole configuration up front and compiles every glob pattern once;
/// `lookup` is then a pure, side-effect-free-except-caching query.
pub struct ModuleMapper {
    file_mappings: HashMap<String, String>,
    patterns: Vec<CompiledPattern>,
    default_module: Option<String>,
    // Negative and positive results are cached by basename (spec.md §4.1).
    cache: RefCell<HashMap<String, Option<String>>>,
}

impl ModuleMapper {
    /// Validate and compile a `ModuleMapConfig` into a `ModuleMapper`.
    pub fn from_config(config: &ModuleMapConfig) -> Result<Self, CallTreeError> {
        let version = config.version.as_deref().ok_or_else(|| CallTreeError::InvalidConfig {
            message: "missing required field 'version'".to_string(),
        })?;
        if version != SUPPORTED_VERSION {
            return Err(CallTreeError::InvalidConfig {
                message: format!("unsupported version '{}' (only \"1.0\" is recognized)", version),
            });
        }

        let mut file_mappings = HashMap::with_capacity(config.file_mappings.len());
        for (basename, label) in &config.file_mappings {
            let basename = validate_label(basename, "file_mappings key")?;
            let label = validate_label(label, "file_mappings value")?;
            file_mappings.insert(basename, label);
        }

        let mut patterns = Vec::with_capacity(config.pattern_mappings.len());
        for (pattern, label) in &config.pattern_mappings {
            if pattern.is_empty() {
                return Err(CallTreeError::InvalidConfig {
                    message: "pattern_mappings contains an empty pattern".to_string(),
                });
            }
            let label = validate_label(label, "pattern_mappings value")?;
            patterns.push(CompiledPattern {
                regex: glob_to_regex(pattern)?,
                label,
            });
        }

        let default_module = match &config.default_module {
            Some(d) => Some(validate_label(d, "default_module")?),
            None => None,
        };

        Ok(Self {
            file_mappings,
            patterns,
            default_module,
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// An empty mapper: every lookup returns `None`. Used when no config
    /// file is supplied.
    pub fn empty() -> Self {
        Self {
            file_mappings: HashMap::new(),
            patterns: Vec::new(),
            default_module: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a (possibly absolute) file path to a module label.
    /// Deterministic, first-match-wins order: exact basename, then
    /// patterns in declaration order, then default, then absent.
    pub fn lookup(&self, file_path: &str) -> Option<String> {
        let basename = Path::new(file_path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(file_path)
            .to_string();

        if let Some(cached) = self.cache.borrow().get(&basename) {
            return cached.clone();
        }

        let result = self.resolve_uncached(&basename);
        self.cache.borrow_mut().insert(basename, result.clone());
        result
    }

    fn resolve_uncached(&self, basename: &str) -> Option<String> {
        if let Some(label) = self.file_mappings.get(basename) {
            return Some(label.clone());
        }
        for p in &self.patterns {
            if p.regex.is_match(basename) {
                return Some(p.label.clone());
            }
        }
        self.default_module.clone()
    }
}
