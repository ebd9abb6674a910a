//! Function Database (spec.md §4.4): three synchronized indexes over
//! every function definition found under a source tree, a smart
//! resolver for disambiguating calls, and a persistent cache.

pub mod cache;
mod resolver;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ignore::WalkBuilder;
use serde::Serialize;

use crate::error::CallTreeError;
use crate::model::FunctionInfo;
use crate::module_map::ModuleMapper;
use crate::parser;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DatabaseStatistics {
    pub files_scanned: u32,
    pub functions_found: u32,
    pub unique_names: u32,
    pub static_count: u32,
    pub parse_errors: u32,
    pub per_module_count: HashMap<String, u32>,
}

pub struct FunctionDatabase {
    by_name: HashMap<String, Vec<Arc<FunctionInfo>>>,
    by_qualified: HashMap<String, Arc<FunctionInfo>>,
    by_file: HashMap<String, Vec<Arc<FunctionInfo>>>,
    module_mapper: Option<ModuleMapper>,
    parse_errors: Vec<String>,
    files_scanned: u32,
    per_module_count: HashMap<String, u32>,
    source_dir: Option<std::path::PathBuf>,
    cache_path: Option<std::path::PathBuf>,
}

impl FunctionDatabase {
    pub fn new(module_mapper: Option<ModuleMapper>) -> Self {
        Self {
            by_name: HashMap::new(),
            by_qualified: HashMap::new(),
            by_file: HashMap::new(),
            module_mapper,
            parse_errors: Vec::new(),
            files_scanned: 0,
            per_module_count: HashMap::new(),
            source_dir: None,
            cache_path: None,
        }
    }

    /// Insert one definition, assigning its module label (if a mapper is
    /// attached) before it enters any index — the single private
    /// mutation point all three indexes funnel through (spec.md §4.4.1).
    fn add(&mut self, mut info: FunctionInfo) {
        if let Some(mapper) = &self.module_mapper {
            let basename = Path::new(&info.file_path)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(&info.file_path);
            if let Some(label) = mapper.lookup(basename) {
                *self.per_module_count.entry(label.clone()).or_insert(0) += 1;
                info.sw_module = Some(label);
            }
        }
        if info.qualified_name.is_none() {
            info.qualified_name = Some(FunctionInfo::compute_qualified_name(&info.file_path, &info.name));
        }

        let arc = Arc::new(info);
        self.by_name.entry(arc.name.clone()).or_default().push(Arc::clone(&arc));
        self.by_file.entry(arc.file_path.clone()).or_default().push(Arc::clone(&arc));
        if let Some(q) = &arc.qualified_name {
            self.by_qualified.insert(q.clone(), Arc::clone(&arc));
        }
    }

    /// Scan `source_dir` recursively for `*.c` files, populate the
    /// indexes, and (if `use_cache`) attempt a cache load first.
    pub fn build(&mut self, source_dir: &Path, use_cache: bool, verbose: bool) -> Result<(), CallTreeError> {
        if !source_dir.is_dir() {
            return Err(CallTreeError::DirNotFound(source_dir.display().to_string()));
        }
        self.source_dir = Some(source_dir.to_path_buf());
        let cache_path = self.cache_path.clone().unwrap_or_else(|| cache::default_cache_path(source_dir));
        self.cache_path = Some(cache_path.clone());

        let files = discover_c_files(source_dir);
        let file_contents: Vec<(String, String)> = files
            .iter()
            .filter_map(|p| {
                std::fs::read(p).ok().map(|bytes| {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    (p.to_string_lossy().into_owned(), text)
                })
            })
            .collect();

        if use_cache {
            if let cache::LoadOutcome::Hit(metadata, by_file) = cache::load(&cache_path) {
                let current = cache::compute_metadata(source_dir, &file_contents);
                if metadata == current {
                    if verbose {
                        tracing::info!(files = metadata.file_count, "cache hit, reusing parsed definitions");
                    }
                    self.load_from_by_file(by_file);
                    self.files_scanned = current.file_count as u32;
                    return Ok(());
                }
                if verbose {
                    tracing::warn!("cache metadata stale, reparsing");
                }
            }
        }

        for (path, text) in &file_contents {
            if verbose {
                tracing::info!(file = %path, "parsing");
            }
            let defs = parser::parse_source(text, path);
            self.files_scanned += 1;
            for def in defs {
                self.add(def);
            }
        }

        if use_cache {
            let metadata = cache::compute_metadata(source_dir, &file_contents);
            if let Err(e) = self.save_cache_with(&cache_path, &metadata) {
                tracing::warn!(error = %e, "failed to write cache");
            }
        }

        Ok(())
    }

    fn load_from_by_file(&mut self, by_file: HashMap<String, Vec<FunctionInfo>>) {
        self.by_name.clear();
        self.by_qualified.clear();
        self.by_file.clear();
        self.per_module_count.clear();
        for (_, defs) in by_file {
            for def in defs {
                self.add(def);
            }
        }
    }

    pub fn lookup(&self, name: &str, caller_file: Option<&str>) -> Option<Arc<FunctionInfo>> {
        let candidates = self.by_name.get(name)?;
        resolver::resolve(candidates, name, caller_file)
    }

    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<Arc<FunctionInfo>> {
        self.by_qualified.get(qualified_name).cloned()
    }

    pub fn search(&self, pattern: &str) -> Vec<Arc<FunctionInfo>> {
        let needle = pattern.to_lowercase();
        let mut results: Vec<_> = self
            .by_name
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&needle))
            .flat_map(|(_, defs)| defs.iter().cloned())
            .collect();
        results.sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.line_number.cmp(&b.line_number)));
        results
    }

    pub fn all_function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn functions_in_file(&self, path: &str) -> Vec<Arc<FunctionInfo>> {
        self.by_file.get(path).cloned().unwrap_or_default()
    }

    pub fn statistics(&self) -> DatabaseStatistics {
        let functions_found = self.by_name.values().map(|v| v.len() as u32).sum();
        let static_count = self
            .by_name
            .values()
            .flatten()
            .filter(|f| f.is_static)
            .count() as u32;
        DatabaseStatistics {
            files_scanned: self.files_scanned,
            functions_found,
            unique_names: self.by_name.len() as u32,
            static_count,
            parse_errors: self.parse_errors.len() as u32,
            per_module_count: self.per_module_count.clone(),
        }
    }

    /// The source directory passed to the most recent `build()` call, if
    /// any (spec.md §3's optional `AnalysisResult.source_directory`).
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    pub fn clear_cache(&self) -> Result<(), CallTreeError> {
        if let Some(path) = &self.cache_path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn save_cache(&self) -> Result<(), CallTreeError> {
        let Some(source_dir) = self.source_dir.clone() else {
            return Ok(());
        };
        let cache_path = self
            .cache_path
            .clone()
            .unwrap_or_else(|| cache::default_cache_path(&source_dir));
        let file_contents: Vec<(String, String)> = self
            .by_file
            .keys()
            .filter_map(|p| std::fs::read(p).ok().map(|b| (p.clone(), String::from_utf8_lossy(&b).into_owned())))
            .collect();
        let metadata = cache::compute_metadata(&source_dir, &file_contents);
        self.save_cache_with(&cache_path, &metadata)
    }

    fn save_cache_with(&self, cache_path: &Path, metadata: &cache::CacheMetadata) -> Result<(), CallTreeError> {
        let by_file_plain: HashMap<String, Vec<FunctionInfo>> = self
            .by_file
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().map(|f| (**f).clone()).collect()))
            .collect();
        cache::save(cache_path, metadata, &by_file_plain)
    }
}

fn discover_c_files(source_dir: &Path) -> Vec<std::path::PathBuf> {
    let mut builder = WalkBuilder::new(source_dir);
    builder.hidden(false).git_ignore(false).git_global(false).git_exclude(false);
    builder
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("c"))
        .collect()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
