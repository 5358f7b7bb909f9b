//! TextPath: a restricted, XPath-like expression language for addressing
//! elements, attributes and text in hierarchical documents.
//!
//! This crate only turns a query string into a validated AST (or a list of
//! position-tagged parse errors). It does not walk documents, interpret
//! booleans, or resolve namespace prefixes to URIs; prefixes are recorded
//! as opaque strings for a downstream evaluator.
//!
//! ```
//! use textpath::{parse, Rooted};
//!
//! let query = parse("/purchaseOrder/@orderDate").unwrap();
//! assert_eq!(query.path.rooted, Rooted::Absolute);
//! assert!(query.path.steps[1].is_attribute());
//! ```

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{
    AttributeRef, Axis, Comparison, ComparisonOp, NameTest, Operand, Path, Predicate,
    QualifiedName, Rooted, Step, StepTarget, StringLiteral, TextPath,
};
pub use error::{ParseError, TextPathError};
pub use parser::parse;
