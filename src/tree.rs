//! Call-Tree Builder (spec.md §4.6): bounded depth-first expansion from
//! a start symbol, with qualified-name cycle detection and truncation.

use std::collections::HashSet;
use std::sync::Arc;

use crate::database::FunctionDatabase;
use crate::model::{
    AnalysisResult, AnalysisStatistics, CallTreeNode, CircularDependency, FunctionInfo,
};

pub struct CallTreeBuilder<'db> {
    db: &'db FunctionDatabase,
    max_depth: u32,
    include_rte: bool,
    verbose: bool,
    stack: Vec<String>,
    visited: HashSet<String>,
    circular_dependencies: Vec<CircularDependency>,
}

impl<'db> CallTreeBuilder<'db> {
    pub fn new(db: &'db FunctionDatabase) -> Self {
        Self {
            db,
            max_depth: 0,
            include_rte: true,
            verbose: false,
            stack: Vec::new(),
            visited: HashSet::new(),
            circular_dependencies: Vec::new(),
        }
    }

    pub fn build(
        &mut self,
        start_name: &str,
        max_depth: u32,
        include_rte: bool,
        verbose: bool,
        timestamp: String,
        source_directory: Option<String>,
    ) -> AnalysisResult {
        self.max_depth = max_depth;
        self.include_rte = include_rte;
        self.verbose = verbose;
        self.stack.clear();
        self.visited.clear();
        self.circular_dependencies.clear();

        let Some(start) = self.db.lookup(start_name, None) else {
            let mut failed = AnalysisResult::failed(
                start_name,
                format!("no definition found for start function '{}'", start_name),
                max_depth,
                timestamp,
            );
            failed.source_directory = source_directory;
            return failed;
        };

        if self.verbose {
            if let Some(candidates) = multiple_definitions(self.db, start_name) {
                tracing::warn!(name = start_name, files = ?candidates, "start function has multiple definitions");
            }
        }

        let qualified = FunctionInfo::compute_qualified_name(&start.file_path, &start.name);
        self.stack.push(qualified.clone());
        self.visited.insert(qualified);

        let mut root = CallTreeNode::new_root(Arc::clone(&start));
        self.expand(&mut root, 0);
        self.stack.pop();

        let statistics = self.compute_statistics(&root);

        AnalysisResult {
            root_function_name: start_name.to_string(),
            root: Some(root),
            statistics,
            circular_dependencies: std::mem::take(&mut self.circular_dependencies),
            errors: Vec::new(),
            timestamp,
            source_directory,
            max_depth_limit: max_depth,
        }
    }

    fn expand(&mut self, node: &mut CallTreeNode, depth: u32) {
        if depth >= self.max_depth {
            node.is_truncated = true;
            return;
        }

        for call in &node.function.calls {
            let resolved = self.db.lookup(&call.callee_name, Some(&node.function.file_path));
            let Some(callee) = resolved else {
                if self.verbose {
                    tracing::warn!(callee = call.callee_name, "call site did not resolve to any definition");
                }
                continue;
            };

            if !self.include_rte && callee.is_rte() {
                continue;
            }

            let qualified = FunctionInfo::compute_qualified_name(&callee.file_path, &callee.name);

            let mut child = CallTreeNode {
                function: Arc::clone(&callee),
                depth: depth + 1,
                children: Vec::new(),
                is_recursive: false,
                is_truncated: false,
                is_optional: call.is_conditional,
                is_loop: call.is_loop,
                condition_text: call.condition_text.clone(),
                loop_condition_text: call.loop_condition_text.clone(),
            };

            if self.stack.contains(&qualified) {
                child.is_recursive = true;
                let mut cycle = self.stack.clone();
                cycle.push(qualified.clone());
                self.circular_dependencies.push(CircularDependency {
                    cycle,
                    depth: depth + 1,
                });
            } else {
                self.stack.push(qualified.clone());
                self.expand(&mut child, depth + 1);
                self.stack.pop();
            }

            self.visited.insert(qualified);
            node.children.push(child);
        }
    }

    fn compute_statistics(&self, root: &CallTreeNode) -> AnalysisStatistics {
        let mut unique_infos: std::collections::HashMap<String, Arc<FunctionInfo>> = std::collections::HashMap::new();
        let mut total_nodes = 0u32;
        let mut max_depth_reached = 0u32;
        let mut total_calls = 0u32;

        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            total_nodes += 1;
            max_depth_reached = max_depth_reached.max(n.depth);
            total_calls += n.function.calls.len() as u32;
            let q = FunctionInfo::compute_qualified_name(&n.function.file_path, &n.function.name);
            unique_infos.entry(q).or_insert_with(|| Arc::clone(&n.function));
            for c in &n.children {
                stack.push(c);
            }
        }

        let static_functions = unique_infos.values().filter(|f| f.is_static).count() as u32;
        let rte_functions = unique_infos.values().filter(|f| f.is_rte()).count() as u32;
        let autosar_functions = unique_infos.values().filter(|f| f.kind.is_autosar()).count() as u32;

        AnalysisStatistics {
            total_nodes,
            unique_functions: unique_infos.len() as u32,
            max_depth_reached,
            total_calls,
            static_functions,
            rte_functions,
            autosar_functions,
            cycles_found: self.circular_dependencies.len() as u32,
        }
    }
}

fn multiple_definitions(db: &FunctionDatabase, name: &str) -> Option<Vec<String>> {
    let names = db.search(name);
    let exact: Vec<_> = names.iter().filter(|f| f.name == name).map(|f| f.file_path.clone()).collect();
    if exact.len() > 1 {
        Some(exact)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
