//! Finding data structures reported by the checker

use serde::Serialize;
use std::fmt;

/// Kind of defect found in a lifecycle method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// No call to the base-class implementation anywhere in the method body
    MissingSuperCall,
    /// A base-class call exists but is not the last statement
    SuperCallNotLast,
}

/// A single ordering or presence defect in a lifecycle method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path of the file the violation was found in
    pub file: String,
    /// 1-indexed source line of the offending statement (or method header)
    pub line: usize,
    /// Name of the enclosing test class
    pub class_name: String,
    /// Lifecycle method name (setUp, tearDown, setUpClass, tearDownClass)
    pub method: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::MissingSuperCall => write!(
                f,
                "{}:{}: {}.{}() is missing a call to super().{}()",
                self.file, self.line, self.class_name, self.method, self.method
            ),
            ViolationKind::SuperCallNotLast => write!(
                f,
                "{}:{}: super().{}() must be the last statement in {}.{}()",
                self.file, self.line, self.method, self.class_name, self.method
            ),
        }
    }
}
