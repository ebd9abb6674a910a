//! Smart resolver (spec.md §4.4.2): the central disambiguation algorithm.
//! A pure function over a name's candidate set — no state of its own,
//! so determinism (P5) is a property of the inputs alone.

use std::path::Path;
use std::sync::Arc;

use crate::model::FunctionInfo;

/// Resolve `name` to its most likely implementation among `candidates`,
/// optionally narrowing by the file that's doing the calling.
pub fn resolve(candidates: &[Arc<FunctionInfo>], name: &str, caller_file: Option<&str>) -> Option<Arc<FunctionInfo>> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(Arc::clone(&candidates[0]));
    }

    let mut set: Vec<Arc<FunctionInfo>> = candidates.to_vec();

    // 2. Implementation preference: prefer definitions that themselves call out.
    let with_impl: Vec<_> = set.iter().filter(|c| !c.calls.is_empty()).cloned().collect();
    if !with_impl.is_empty() {
        set = with_impl;
    }
    if set.len() == 1 {
        return Some(set.remove(0));
    }

    // 3. Filename heuristic: basename starts with (or is) the name's
    // underscore-delimited module prefix.
    let prefix = name.split('_').next().unwrap_or(name).to_lowercase();
    let name_lower = name.to_lowercase();
    let matching: Vec<_> = set
        .iter()
        .filter(|c| {
            let stem = file_stem_lower(&c.file_path);
            stem.starts_with(&prefix) || stem == name_lower
        })
        .cloned()
        .collect();
    if !matching.is_empty() {
        set = matching;
    }
    if set.len() == 1 {
        return Some(set.remove(0));
    }

    // 4. Cross-module avoidance.
    if let Some(caller) = caller_file {
        let elsewhere: Vec<_> = set.iter().filter(|c| c.file_path != caller).cloned().collect();
        if !elsewhere.is_empty() {
            set = elsewhere;
        }
    }
    if set.len() == 1 {
        return Some(set.remove(0));
    }

    // 5. Module preference.
    let with_module: Vec<_> = set.iter().filter(|c| c.sw_module.is_some()).cloned().collect();
    if !with_module.is_empty() {
        set = with_module;
    }
    if set.len() == 1 {
        return Some(set.remove(0));
    }

    // 6. Deterministic tie-break: lexicographically smallest file path.
    set.into_iter().min_by(|a, b| a.file_path.cmp(&b.file_path))
}

fn file_stem_lower(file_path: &str) -> String {
    Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_path)
        .to_lowercase()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
