//! Python parsing via tree-sitter
//!
//! tree-sitter always produces a tree, inserting ERROR/MISSING nodes where
//! the source does not parse. The checker treats any such node as a per-file
//! syntax error so a broken file never silently passes.

use tree_sitter::{Parser, Tree};

use crate::error::{Result, SuperCheckError};

/// Parse a Python source buffer, failing on any syntax error
pub fn parse_python(path: &str, source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SuperCheckError::ParseFailure {
            path: path.to_string(),
            message: format!("failed to load Python grammar: {}", e),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SuperCheckError::ParseFailure {
            path: path.to_string(),
            message: "parser returned no tree".to_string(),
        })?;

    if tree.root_node().has_error() {
        let line = first_error_line(&tree).unwrap_or(1);
        return Err(SuperCheckError::ParseFailure {
            path: path.to_string(),
            message: format!("invalid syntax (line {})", line),
        });
    }

    Ok(tree)
}

/// 1-indexed line of the first ERROR or MISSING node in the tree
fn first_error_line(tree: &Tree) -> Option<usize> {
    let mut line: Option<usize> = None;
    crate::ast::visit_all(&tree.root_node(), |node| {
        if node.is_error() || node.is_missing() {
            let row = node.start_position().row + 1;
            line = Some(line.map_or(row, |l: usize| l.min(row)));
        }
    });
    line
}
