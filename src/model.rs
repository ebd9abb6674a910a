//! Immutable-after-construction data types: functions, parameters, calls,
//! tree nodes, and analysis results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ─── Function kind ───────────────────────────────────────────────────

/// Closed enumeration of the ways a function definition can present in
/// an AUTOSAR-flavored C source tree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    AutosarFunc,
    AutosarFuncP2Var,
    AutosarFuncP2Const,
    TraditionalC,
    RteCall,
    Unknown,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutosarFunc => "autosarFunc",
            Self::AutosarFuncP2Var => "autosarFuncP2Var",
            Self::AutosarFuncP2Const => "autosarFuncP2Const",
            Self::TraditionalC => "traditionalC",
            Self::RteCall => "rteCall",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_autosar(&self) -> bool {
        matches!(
            self,
            Self::AutosarFunc | Self::AutosarFuncP2Var | Self::AutosarFuncP2Const
        )
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Parameter ────────────────────────────────────────────────────────

/// One parameter of a function definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub base_type: String,
    pub is_pointer: bool,
    pub is_const: bool,
    /// Present only when the source used an AUTOSAR parameter macro
    /// (`VAR`, `P2VAR`, `P2CONST`, `CONST`); the memory-class argument.
    pub memory_class: Option<String>,
}

// ─── Function call ───────────────────────────────────────────────────

/// A call site discovered inside a function body, with the conditional
/// and loop context it was found under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub callee_name: String,
    pub is_conditional: bool,
    pub condition_text: Option<String>,
    pub is_loop: bool,
    pub loop_condition_text: Option<String>,
}

impl FunctionCall {
    pub fn new(callee_name: impl Into<String>) -> Self {
        Self {
            callee_name: callee_name.into(),
            is_conditional: false,
            condition_text: None,
            is_loop: false,
            loop_condition_text: None,
        }
    }
}

// ─── Function info ────────────────────────────────────────────────────

/// One definition site of a function.
///
/// Two `FunctionInfo` values compare equal, and hash, solely on their
/// identity triple `(name, file_path, line_number)`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub file_path: String,
    pub line_number: u32,
    pub return_type: String,
    pub is_static: bool,
    pub kind: FunctionKind,
    pub memory_class: Option<String>,
    pub macro_type: Option<String>,
    pub parameters: Vec<Parameter>,
    pub calls: Vec<FunctionCall>,
    /// Populated only by an explicit back-edge pass (spec.md §9); never
    /// required for tree construction.
    pub called_by: Vec<String>,
    pub qualified_name: Option<String>,
    pub sw_module: Option<String>,
}

impl FunctionInfo {
    /// `<file-stem>::<name>` — the unique identifier used for cycle
    /// detection and exact lookup.
    pub fn compute_qualified_name(file_path: &str, name: &str) -> String {
        let stem = std::path::Path::new(file_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_path);
        format!("{}::{}", stem, name)
    }

    pub fn is_rte(&self) -> bool {
        self.kind == FunctionKind::RteCall || self.name.starts_with("Rte_")
    }
}

impl PartialEq for FunctionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.file_path == other.file_path
            && self.line_number == other.line_number
    }
}
impl Eq for FunctionInfo {}

impl std::hash::Hash for FunctionInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.file_path.hash(state);
        self.line_number.hash(state);
    }
}

// ─── Call-tree node ───────────────────────────────────────────────────

/// A node in the call tree produced by the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub function: Arc<FunctionInfo>,
    pub depth: u32,
    pub children: Vec<CallTreeNode>,
    pub is_recursive: bool,
    pub is_truncated: bool,
    pub is_optional: bool,
    pub is_loop: bool,
    pub condition_text: Option<String>,
    pub loop_condition_text: Option<String>,
}

impl CallTreeNode {
    pub fn new_root(function: Arc<FunctionInfo>) -> Self {
        Self {
            function,
            depth: 0,
            children: Vec::new(),
            is_recursive: false,
            is_truncated: false,
            is_optional: false,
            is_loop: false,
            condition_text: None,
            loop_condition_text: None,
        }
    }

    /// Total node count of this subtree, root inclusive.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CallTreeNode::node_count).sum::<usize>()
    }

    /// Deepest depth reached in this subtree.
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(CallTreeNode::max_depth)
            .max()
            .unwrap_or(self.depth)
    }
}

// ─── Circular dependency ─────────────────────────────────────────────

/// An ordered cycle of function names; first and last names are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircularDependency {
    pub cycle: Vec<String>,
    pub depth: u32,
}

// ─── Statistics ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisStatistics {
    pub total_nodes: u32,
    pub unique_functions: u32,
    pub max_depth_reached: u32,
    pub total_calls: u32,
    pub static_functions: u32,
    pub rte_functions: u32,
    pub autosar_functions: u32,
    pub cycles_found: u32,
}

// ─── Analysis result ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub root_function_name: String,
    pub root: Option<CallTreeNode>,
    pub statistics: AnalysisStatistics,
    pub circular_dependencies: Vec<CircularDependency>,
    pub errors: Vec<String>,
    pub timestamp: String,
    pub source_directory: Option<String>,
    pub max_depth_limit: u32,
}

impl AnalysisResult {
    pub fn failed(root_function_name: impl Into<String>, error: impl Into<String>, max_depth_limit: u32, timestamp: String) -> Self {
        Self {
            root_function_name: root_function_name.into(),
            root: None,
            statistics: AnalysisStatistics::default(),
            circular_dependencies: Vec::new(),
            errors: vec![error.into()],
            timestamp,
            source_directory: None,
            max_depth_limit,
        }
    }
}
