//! Source discovery: walk a project, parse every matching file, collect the
//! normalized declarations.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::analyzer::LanguageFrontend;
use crate::ast::ClassDecl;
use crate::validate;

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(pattern = %pattern, "ignoring invalid exclude pattern: {e}"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!("failed to build exclude set: {e}");
        GlobSet::empty()
    })
}

/// Finds source files for a set of front-ends.
pub struct SourceCollector {
    exclude: GlobSet,
}

impl SourceCollector {
    pub fn new(exclude_patterns: &[String]) -> Self {
        Self {
            exclude: build_globset(exclude_patterns),
        }
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        // Patterns are relative to the analyzed directory
        let rel = path.strip_prefix(root).unwrap_or(path);
        self.exclude.is_match(rel)
    }

    /// Files under `root` with one of `extensions`, sorted by path.
    pub fn files(&self, root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| extensions.iter().any(|x| ext == *x))
            })
            .filter(|e| !self.is_excluded(root, e.path()))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// Parse every file `frontend` handles under `root`.
    ///
    /// Unreadable or unparsable files are skipped with a warning. Declarations
    /// come back in file order, then source order within a file.
    pub fn collect(&self, root: &Path, frontend: &dyn LanguageFrontend) -> Vec<ClassDecl> {
        let files = self.files(root, frontend.file_extensions());
        tracing::debug!(
            language = frontend.language(),
            files = files.len(),
            root = %root.display(),
            "collecting declarations"
        );

        let per_file: Vec<Vec<ClassDecl>> = files
            .par_iter()
            .filter_map(|path| {
                let content = match std::fs::read_to_string(path) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "failed to read: {e}");
                        return None;
                    }
                };
                let parsed = match frontend.parse_file(path, &content) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "failed to parse: {e}");
                        return None;
                    }
                };
                let decls = frontend.extract_declarations(&parsed);
                // One broken file must not fail the whole run
                if let Err(e) = validate::validate_all(&decls) {
                    tracing::warn!(path = %path.display(), "skipping file: {e}");
                    return None;
                }
                Some(decls)
            })
            .collect();

        per_file.into_iter().flatten().collect()
    }
}
