//! In-place repair of fixture-ordering violations
//!
//! The rewrite is line-based: a misplaced base-class call is removed and a
//! canonical `super().<method>()` is appended after the method's last
//! statement, so all three accepted call forms normalize to the zero-argument
//! form. Edits are applied bottom-to-top so row indices computed against the
//! original source stay valid.
//!
//! A statement is only spliced when it owns its source lines exclusively; a
//! call sharing a line with another statement, or a single-line `def` body,
//! is reported back as unfixed.

use std::fs;
use std::path::Path;

use tree_sitter::Node;

use crate::ast::named_children;
use crate::check::{scan_methods, MethodScan, PRESCREEN_TOKEN};
use crate::error::{Result, SuperCheckError};
use crate::parsing::parse_python;
use crate::schema::Violation;

/// Result of a fix pass over one file
#[derive(Debug)]
pub struct FixOutcome {
    /// Violations that could not be mechanically repaired
    pub unfixed: Vec<Violation>,
    /// True if the file content was rewritten
    pub modified: bool,
}

/// One mechanical repair: optionally delete a line range, then insert the
/// canonical call after `insert_row`. Rows are 0-indexed against the
/// original source.
struct Edit {
    method: String,
    insert_row: usize,
    indent: usize,
    remove_rows: Option<(usize, usize)>,
}

/// Fix a file on disk in place
///
/// No backup is taken; callers rely on version control for rollback.
pub fn fix_file<P: AsRef<Path>>(path: P) -> Result<FixOutcome> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SuperCheckError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let source = fs::read_to_string(path)?;

    // Fast pre-screen: no "TestCase" means nothing to fix.
    if !source.contains(PRESCREEN_TOKEN) {
        return Ok(FixOutcome {
            unfixed: Vec::new(),
            modified: false,
        });
    }

    let (rewritten, unfixed) = fix_source(&path.display().to_string(), &source)?;
    let modified = match rewritten {
        Some(new_source) => {
            fs::write(path, new_source)?;
            true
        }
        None => false,
    };
    Ok(FixOutcome { unfixed, modified })
}

/// Fix an in-memory source buffer
///
/// Returns the rewritten source (None if nothing changed) and the violations
/// that could not be repaired.
pub fn fix_source(path: &str, source: &str) -> Result<(Option<String>, Vec<Violation>)> {
    let tree = parse_python(path, source)?;
    let scans = scan_methods(&tree, source);

    let mut edits: Vec<Edit> = Vec::new();
    let mut unfixed: Vec<Violation> = Vec::new();

    for scan in &scans {
        let Some(violation) = scan.violation(path) else {
            continue;
        };
        match plan_edit(scan) {
            Some(edit) => edits.push(edit),
            None => unfixed.push(violation),
        }
    }

    if edits.is_empty() {
        return Ok((None, unfixed));
    }

    let mut lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }

    // Bottom-to-top so earlier row indices stay valid as we edit.
    edits.sort_by(|a, b| b.insert_row.cmp(&a.insert_row));

    for edit in &edits {
        let mut offset = 0;
        if let Some((start, end)) = edit.remove_rows {
            lines.drain(start..=end);
            offset = end - start + 1;
        }

        let insert_at = edit.insert_row + 1 - offset;
        // The line we append after must end with a newline (the last line of
        // the file may not).
        if !lines[insert_at - 1].ends_with('\n') {
            lines[insert_at - 1].push('\n');
        }
        lines.insert(
            insert_at,
            format!("{}super().{}()\n", " ".repeat(edit.indent), edit.method),
        );
    }

    Ok((Some(lines.concat()), unfixed))
}

/// Plan the repair for one violating method, or None if it is unfixable
fn plan_edit(scan: &MethodScan) -> Option<Edit> {
    // Single-line body (`def setUp(self): self.x = 1`): no line of its own
    // to splice.
    if scan.body.start_position().row == scan.def_node.start_position().row {
        return None;
    }

    let last = scan.stmts.last()?;
    let remove_rows = match scan.misplaced_super() {
        Some(stmt) => {
            if !owns_lines_exclusively(&stmt, &scan.body) {
                return None;
            }
            Some((stmt.start_position().row, stmt.end_position().row))
        }
        None => None,
    };

    Some(Edit {
        method: scan.method_name.clone(),
        insert_row: last.end_position().row,
        indent: last.start_position().column,
        remove_rows,
    })
}

/// True if no other statement in the body shares a source line with `stmt`
/// (e.g. `a = 1; super().setUp()` fails this)
fn owns_lines_exclusively(stmt: &Node, body: &Node) -> bool {
    let start = stmt.start_position().row;
    let end = stmt.end_position().row;
    named_children(body)
        .iter()
        .filter(|other| other.id() != stmt.id() && other.kind() != "comment")
        .all(|other| other.end_position().row < start || other.start_position().row > end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_source;

    fn fix(source: &str) -> (Option<String>, Vec<Violation>) {
        fix_source("test.py", source).unwrap()
    }

    #[test]
    fn test_moves_misplaced_super_to_end() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super().setUp()
        self.x = 1
";
        let (rewritten, unfixed) = fix(source);
        assert!(unfixed.is_empty());
        let fixed = rewritten.expect("should rewrite");
        let expected = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        self.x = 1
        super().setUp()
";
        assert_eq!(fixed, expected);
        assert!(check_source("test.py", &fixed).unwrap().is_empty());
    }

    #[test]
    fn test_appends_missing_super() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def tearDown(self):
        self.conn.close()
";
        let (rewritten, unfixed) = fix(source);
        assert!(unfixed.is_empty());
        let fixed = rewritten.unwrap();
        assert!(fixed.contains("        self.conn.close()\n        super().tearDown()\n"));
        assert!(check_source("test.py", &fixed).unwrap().is_empty());
    }

    #[test]
    fn test_normalizes_two_arg_form() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super(A, self).setUp()
        self.x = 1
";
        let (rewritten, _) = fix(source);
        let fixed = rewritten.unwrap();
        assert!(!fixed.contains("super(A, self)"));
        assert!(fixed.contains("        self.x = 1\n        super().setUp()\n"));
    }

    #[test]
    fn test_normalizes_qualified_base_form() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        unittest.TestCase.setUp(self)
        self.x = 1
";
        let (rewritten, _) = fix(source);
        let fixed = rewritten.unwrap();
        assert!(!fixed.contains("unittest.TestCase.setUp(self)"));
        assert!(fixed.ends_with("        self.x = 1\n        super().setUp()\n"));
    }

    #[test]
    fn test_clean_file_untouched() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        self.x = 1
        super().setUp()
";
        let (rewritten, unfixed) = fix(source);
        assert!(rewritten.is_none());
        assert!(unfixed.is_empty());
    }

    #[test]
    fn test_fix_is_idempotent() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super().setUp()
        self.x = 1
";
        let (first, _) = fix(source);
        let fixed = first.unwrap();
        let (second, unfixed) = fix(&fixed);
        assert!(second.is_none());
        assert!(unfixed.is_empty());
    }

    #[test]
    fn test_statement_sharing_a_line_is_unfixed() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super().setUp(); self.x = 1
        self.y = 2
";
        let (rewritten, unfixed) = fix(source);
        assert!(rewritten.is_none());
        assert_eq!(unfixed.len(), 1);
        assert_eq!(unfixed[0].method, "setUp");
    }

    #[test]
    fn test_single_line_def_body_is_unfixed() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self): self.x = 1
";
        let (rewritten, unfixed) = fix(source);
        assert!(rewritten.is_none());
        assert_eq!(unfixed.len(), 1);
    }

    #[test]
    fn test_multiple_methods_fixed_in_one_pass() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super().setUp()
        self.x = 1

    def tearDown(self):
        self.x = None

class B(unittest.TestCase):
    def setUp(self):
        self.y = 2
";
        let (rewritten, unfixed) = fix(source);
        assert!(unfixed.is_empty());
        let fixed = rewritten.unwrap();
        assert!(check_source("test.py", &fixed).unwrap().is_empty());
        assert_eq!(fixed.matches("super().setUp()").count(), 2);
        assert_eq!(fixed.matches("super().tearDown()").count(), 1);
    }

    #[test]
    fn test_multiline_misplaced_call_removed_whole() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        super(
            A, self
        ).setUp()
        self.x = 1
";
        let (rewritten, unfixed) = fix(source);
        assert!(unfixed.is_empty());
        let fixed = rewritten.unwrap();
        assert!(!fixed.contains("super(\n"));
        assert!(check_source("test.py", &fixed).unwrap().is_empty());
    }

    #[test]
    fn test_missing_newline_at_eof_handled() {
        let source = "\
import unittest

class A(unittest.TestCase):
    def setUp(self):
        self.x = 1";
        let (rewritten, unfixed) = fix(source);
        assert!(unfixed.is_empty());
        let fixed = rewritten.unwrap();
        assert!(fixed.ends_with("        self.x = 1\n        super().setUp()\n"));
    }
}
