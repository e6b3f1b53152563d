//! supercheck: pre-commit checker for unittest super() call ordering
//!
//! In classes that inherit from `unittest.TestCase` (or
//! `IsolatedAsyncioTestCase`), the lifecycle methods `setUp`, `tearDown`,
//! `setUpClass` and `tearDownClass` must end with a call to the base-class
//! implementation. This crate parses Python source with tree-sitter, reports
//! violations, and can rewrite files in place to repair them.
//!
//! # Example
//!
//! ```ignore
//! use supercheck::check_file;
//!
//! let violations = check_file("tests/test_models.py")?;
//! for v in &violations {
//!     eprintln!("{}", v);
//! }
//! ```

pub mod ast;
pub mod check;
pub mod cli;
pub mod error;
pub mod fix;
pub mod parsing;
pub mod schema;

// Re-export commonly used types
pub use check::{check_file, check_source, LIFECYCLE_METHODS};
pub use cli::{Cli, OutputFormat};
pub use error::{Result, SuperCheckError};
pub use fix::{fix_file, fix_source, FixOutcome};
pub use schema::{Violation, ViolationKind};
