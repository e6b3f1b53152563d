//! Fixture-ordering scan
//!
//! Finds classes that inherit from a recognized unittest fixture base,
//! inspects their lifecycle methods, and reports methods whose base-class
//! call is missing or not the final statement.
//!
//! Only top-level statements in a method body count: a `super().setUp()`
//! nested inside an `if` branch is treated as absent. Base classes are
//! matched by trailing simple name, not full type resolution, so
//! `unittest.TestCase` and a bare `TestCase` import both qualify.

use std::fs;
use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::ast::{named_children, node_text, visit_all};
use crate::error::{Result, SuperCheckError};
use crate::parsing::parse_python;
use crate::schema::{Violation, ViolationKind};

/// Lifecycle method names, in reporting priority order
pub const LIFECYCLE_METHODS: [&str; 4] = ["setUp", "tearDown", "setUpClass", "tearDownClass"];

/// Recognized fixture base-class names (matched by trailing simple name)
pub const FIXTURE_BASE_CLASSES: [&str; 2] = ["TestCase", "IsolatedAsyncioTestCase"];

/// Fast pre-screen token: every recognized base-class name contains this,
/// so files without it cannot define a fixture class and skip parsing.
pub(crate) const PRESCREEN_TOKEN: &str = "TestCase";

/// Syntactic form of an accepted base-class call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperCallForm {
    /// `super().setUp()`
    ZeroArg,
    /// `super(Cls, self).setUp()`
    ExplicitTwoArg,
    /// `BaseClass.setUp(self)` where BaseClass is a declared base
    QualifiedBase,
}

/// One lifecycle method of a fixture class, with its scan results
pub(crate) struct MethodScan<'t> {
    pub class_name: String,
    pub method_name: String,
    pub def_node: Node<'t>,
    pub body: Node<'t>,
    /// Top-level effective statements (pass and a leading docstring excluded)
    pub stmts: Vec<Node<'t>>,
    /// Indices into `stmts` of statements recognized as base-class calls
    pub super_indices: Vec<usize>,
}

impl<'t> MethodScan<'t> {
    pub fn last_is_super(&self) -> bool {
        match self.stmts.len() {
            0 => false,
            n => self.super_indices.contains(&(n - 1)),
        }
    }

    /// First base-class call when it is not in last position
    pub fn misplaced_super(&self) -> Option<Node<'t>> {
        if self.last_is_super() {
            return None;
        }
        self.super_indices.first().map(|&i| self.stmts[i])
    }

    /// The violation this method carries, if any
    pub fn violation(&self, path: &str) -> Option<Violation> {
        if self.stmts.is_empty() || self.last_is_super() {
            return None;
        }
        let (kind, line) = match self.misplaced_super() {
            Some(stmt) => (
                ViolationKind::SuperCallNotLast,
                stmt.start_position().row + 1,
            ),
            None => (
                ViolationKind::MissingSuperCall,
                self.def_node.start_position().row + 1,
            ),
        };
        Some(Violation {
            file: path.to_string(),
            line,
            class_name: self.class_name.clone(),
            method: self.method_name.clone(),
            kind,
        })
    }
}

/// Check a file on disk, returning its violations
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<Vec<Violation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SuperCheckError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let source = fs::read_to_string(path)?;

    // Fast pre-screen: no "TestCase" in the text means no fixture classes,
    // so skip parsing entirely. Most files in a repo are not test files.
    if !source.contains(PRESCREEN_TOKEN) {
        return Ok(Vec::new());
    }

    check_source(&path.display().to_string(), &source)
}

/// Check an in-memory source buffer, returning its violations
pub fn check_source(path: &str, source: &str) -> Result<Vec<Violation>> {
    let tree = parse_python(path, source)?;
    Ok(scan_methods(&tree, source)
        .iter()
        .filter_map(|m| m.violation(path))
        .collect())
}

/// Scan all fixture classes in a tree, yielding their lifecycle methods
/// in class declaration order and lifecycle priority order within a class
pub(crate) fn scan_methods<'t>(tree: &'t Tree, source: &str) -> Vec<MethodScan<'t>> {
    let mut classes: Vec<Node<'t>> = Vec::new();
    visit_all(&tree.root_node(), |node| {
        if node.kind() == "class_definition" {
            classes.push(*node);
        }
    });

    let mut scans = Vec::new();
    for class in classes {
        let bases = class_bases(&class);
        if !is_fixture_class(&bases, source) {
            continue;
        }
        let class_name = class
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
            .unwrap_or_default();
        let Some(class_body) = class.child_by_field_name("body") else {
            continue;
        };

        let methods = direct_methods(&class_body);
        for &lifecycle in LIFECYCLE_METHODS.iter() {
            for def_node in methods.iter().filter(|m| {
                m.child_by_field_name("name")
                    .map(|n| node_text(&n, source) == lifecycle)
                    .unwrap_or(false)
            }) {
                let Some(body) = def_node.child_by_field_name("body") else {
                    continue;
                };
                let stmts = effective_statements(&body);
                let super_indices = stmts
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| super_call_form(s, lifecycle, &bases, source).is_some())
                    .map(|(i, _)| i)
                    .collect();
                scans.push(MethodScan {
                    class_name: class_name.clone(),
                    method_name: lifecycle.to_string(),
                    def_node: *def_node,
                    body,
                    stmts,
                    super_indices,
                });
            }
        }
    }
    scans
}

/// Declared base classes of a class definition (keyword arguments like
/// `metaclass=...` excluded)
fn class_bases<'t>(class: &Node<'t>) -> Vec<Node<'t>> {
    let Some(superclasses) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    named_children(&superclasses)
        .into_iter()
        .filter(|n| matches!(n.kind(), "identifier" | "attribute"))
        .collect()
}

fn is_fixture_class(bases: &[Node], source: &str) -> bool {
    bases.iter().any(|base| {
        trailing_name(base, source)
            .map(|name| FIXTURE_BASE_CLASSES.contains(&name.as_str()))
            .unwrap_or(false)
    })
}

/// Simple trailing name of a base-class expression: `TestCase` for both
/// `TestCase` and `unittest.TestCase`
fn trailing_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source)),
        "attribute" => node
            .child_by_field_name("attribute")
            .map(|n| node_text(&n, source)),
        _ => None,
    }
}

/// Function definitions that are direct members of a class body, unwrapping
/// decorated definitions
fn direct_methods<'t>(class_body: &Node<'t>) -> Vec<Node<'t>> {
    named_children(class_body)
        .into_iter()
        .filter_map(|member| match member.kind() {
            "function_definition" => Some(member),
            "decorated_definition" => member
                .child_by_field_name("definition")
                .filter(|d| d.kind() == "function_definition"),
            _ => None,
        })
        .collect()
}

/// Method body statements, excluding `pass`, comments, and a leading docstring
fn effective_statements<'t>(body: &Node<'t>) -> Vec<Node<'t>> {
    let mut stmts: Vec<Node<'t>> = named_children(body)
        .into_iter()
        .filter(|s| !matches!(s.kind(), "pass_statement" | "comment"))
        .collect();
    if let Some(first) = stmts.first() {
        if is_docstring(first) {
            stmts.remove(0);
        }
    }
    stmts
}

fn is_docstring(stmt: &Node) -> bool {
    stmt.kind() == "expression_statement"
        && stmt
            .named_child(0)
            .map(|e| e.kind() == "string")
            .unwrap_or(false)
}

/// Classify a statement as one of the accepted base-class call forms for
/// `method_name`, or None if it is not one
pub(crate) fn super_call_form(
    stmt: &Node,
    method_name: &str,
    bases: &[Node],
    source: &str,
) -> Option<SuperCallForm> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let call = stmt.named_child(0).filter(|c| c.kind() == "call")?;
    let func = call
        .child_by_field_name("function")
        .filter(|f| f.kind() == "attribute")?;
    let attr = func.child_by_field_name("attribute")?;
    if node_text(&attr, source) != method_name {
        return None;
    }
    let receiver = func.child_by_field_name("object")?;

    // super() or super(ClassName, self/cls)
    if receiver.kind() == "call" {
        let is_super = receiver
            .child_by_field_name("function")
            .map(|f| f.kind() == "identifier" && node_text(&f, source) == "super")
            .unwrap_or(false);
        if is_super {
            let arg_count = receiver
                .child_by_field_name("arguments")
                .map(|a| named_children(&a).len())
                .unwrap_or(0);
            return Some(if arg_count == 0 {
                SuperCallForm::ZeroArg
            } else {
                SuperCallForm::ExplicitTwoArg
            });
        }
        return None;
    }

    // Explicit base class: BaseClass.method(self) where BaseClass is a declared base
    if bases.iter().any(|b| names_equal(&receiver, b, source)) {
        return Some(SuperCallForm::QualifiedBase);
    }
    None
}

/// True if two name/attribute nodes refer to the same dotted identifier
fn names_equal(a: &Node, b: &Node, source: &str) -> bool {
    match (a.kind(), b.kind()) {
        ("identifier", "identifier") => node_text(a, source) == node_text(b, source),
        ("attribute", "attribute") => {
            let attrs_match = match (
                a.child_by_field_name("attribute"),
                b.child_by_field_name("attribute"),
            ) {
                (Some(aa), Some(ba)) => node_text(&aa, source) == node_text(&ba, source),
                _ => false,
            };
            attrs_match
                && match (a.child_by_field_name("object"), b.child_by_field_name("object")) {
                    (Some(ao), Some(bo)) => names_equal(&ao, &bo, source),
                    _ => false,
                }
        }
        _ => false,
    }
}
