//! CLI argument struct.

use clap::Parser;

/// Extract a bounded call tree rooted at one function from an
/// AUTOSAR-flavored embedded C source tree.
#[derive(Parser, Debug)]
#[command(name = "calltree", version, about, after_help = "\
Output is a single AnalysisResult JSON document on stdout.\n\
Example: calltree -d src/ -s Demo_Init -m 6")]
pub struct Args {
    /// Source directory to scan for *.c files
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: String,

    /// Name of the function to root the call tree at
    #[arg(short = 's', long)]
    pub start: String,

    /// Maximum call-tree depth
    #[arg(short = 'm', long, default_value = "10")]
    pub max_depth: u32,

    /// Optional YAML module-mapping configuration
    #[arg(long)]
    pub module_map: Option<String>,

    /// Include Rte_* callees in the tree (excluded by default)
    #[arg(long)]
    pub include_rte: bool,

    /// Skip the on-disk function database cache
    #[arg(long)]
    pub no_cache: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
