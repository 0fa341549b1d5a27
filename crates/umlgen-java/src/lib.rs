use std::path::Path;

use anyhow::{Context, Result};
use tree_sitter::{Language, Parser, Query, QueryCursor, StreamingIterator};

use umlgen_core::analyzer::{LanguageFrontend, ParsedFile};
use umlgen_core::ast::ClassDecl;

mod extract;
mod types;

use extract::DeclExtractor;

/// Java front-end using tree-sitter.
pub struct JavaFrontend {
    language: Language,
    package_query: Query,
    import_query: Query,
}

impl JavaFrontend {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_java::LANGUAGE.into();

        let package_query = Query::new(
            &language,
            r#"
            (package_declaration
              [(scoped_identifier) (identifier)] @name)
            "#,
        )
        .context("failed to compile package query")?;

        let import_query = Query::new(
            &language,
            r#"
            (import_declaration
              [(scoped_identifier) (identifier)] @path)
            "#,
        )
        .context("failed to compile import query")?;

        Ok(Self {
            language,
            package_query,
            import_query,
        })
    }

    fn package(&self, parsed: &ParsedFile) -> Option<String> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(
            &self.package_query,
            parsed.tree.root_node(),
            parsed.content.as_bytes(),
        );
        let mut package = None;
        while let Some(m) = matches.next() {
            if let Some(capture) = m.captures.first() {
                package = Some(node_text(capture.node, &parsed.content));
            }
        }
        package
    }

    /// Single-type and on-demand imports. Static imports name members, not
    /// types, and are skipped.
    fn imports(&self, parsed: &ParsedFile) -> Vec<String> {
        let mut imports = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(
            &self.import_query,
            parsed.tree.root_node(),
            parsed.content.as_bytes(),
        );

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let Some(decl) = capture.node.parent() else {
                    continue;
                };
                let mut walker = decl.walk();
                let tokens: Vec<&str> = decl.children(&mut walker).map(|c| c.kind()).collect();
                if tokens.contains(&"static") {
                    continue;
                }
                let path = node_text(capture.node, &parsed.content);
                if tokens.contains(&"asterisk") {
                    imports.push(format!("{path}.*"));
                } else {
                    imports.push(path);
                }
            }
        }
        imports
    }
}

impl LanguageFrontend for JavaFrontend {
    fn language(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn parse_file(&self, path: &Path, content: &str) -> Result<ParsedFile> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .context("failed to set Java language")?;
        let tree = parser
            .parse(content, None)
            .context("failed to parse Java file")?;
        Ok(ParsedFile {
            path: path.to_path_buf(),
            tree,
            content: content.to_string(),
        })
    }

    fn extract_declarations(&self, parsed: &ParsedFile) -> Vec<ClassDecl> {
        let root = parsed.tree.root_node();
        if root.has_error() {
            tracing::debug!(path = %parsed.path.display(), "syntax errors; extracting what parsed");
        }
        let decls = DeclExtractor::new(
            &parsed.content,
            &parsed.path,
            self.package(parsed),
            self.imports(parsed),
        )
        .run(root);
        tracing::trace!(path = %parsed.path.display(), declarations = decls.len(), "extracted");
        decls
    }
}

/// Extract text from a tree-sitter node.
pub(crate) fn node_text(node: tree_sitter::Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}
