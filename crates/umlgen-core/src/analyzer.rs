use std::path::{Path, PathBuf};

use anyhow::Result;
use tree_sitter::Tree;

use crate::ast::ClassDecl;

/// A parsed source file with its tree-sitter AST and original content.
pub struct ParsedFile {
    pub path: PathBuf,
    pub tree: Tree,
    pub content: String,
}

/// A language front-end: turns source files into normalized declarations.
pub trait LanguageFrontend: Send + Sync {
    /// Language name (e.g., "java")
    fn language(&self) -> &'static str;

    /// File extensions this front-end handles (e.g., &["java"])
    fn file_extensions(&self) -> &[&str];

    /// Parse a source file into a ParsedFile.
    fn parse_file(&self, path: &Path, content: &str) -> Result<ParsedFile>;

    /// Extract every class-like declaration, nested ones included.
    fn extract_declarations(&self, parsed: &ParsedFile) -> Vec<ClassDecl>;
}
