//! Defines the Abstract Syntax Tree (AST) for TextPath queries.
//!
//! Every node borrows the query string it was parsed from, so leaf nodes
//! retain the exact input span they matched. All types are immutable once
//! constructed; the `Display` impls re-serialize a node to its canonical
//! significant text.

use std::fmt;

/// The axis of movement a step uses to reach candidate nodes from its
/// context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The context node itself. Denoted by the leading `.` of a
    /// context-relative path; never a separator between steps.
    SelfAxis,
    /// Direct children; the default axis, written `/` between steps.
    Child,
    /// The node and all of its descendants, written `//`.
    DescendantOrSelf,
}

/// How a path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rooted {
    /// Starts from the document root (leading `/` or `//`).
    Absolute,
    /// Starts from the current context node (leading `./` or `.//`).
    ContextRelative,
    /// Unanchored; no leading marker.
    Relative,
}

/// The local part of an element name test: a concrete name or `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTest<'a> {
    Name(&'a str),
    Wildcard,
}

/// A possibly prefixed element name test (e.g. `item`, `ds:Root`, `ns:*`).
///
/// The prefix is recorded as an opaque string; resolving it to a namespace
/// URI is the evaluator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub prefix: Option<&'a str>,
    pub local: NameTest<'a>,
}

/// A reference to an attribute, surface syntax `@local` or `@prefix:local`.
/// The local part is always a concrete name; `@*` is a grammar rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRef<'a> {
    pub prefix: Option<&'a str>,
    pub local: &'a str,
}

/// What a step selects on its axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepTarget<'a> {
    Element(QualifiedName<'a>),
    Attribute(AttributeRef<'a>),
}

/// One segment of a path: an axis, a target, and at most one predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    pub axis: Axis,
    pub target: StepTarget<'a>,
    pub predicate: Option<Predicate<'a>>,
}

impl Step<'_> {
    /// Checks if the step targets an attribute rather than an element.
    pub fn is_attribute(&self) -> bool {
        matches!(self.target, StepTarget::Attribute(_))
    }
}

/// A sequence of steps with an overall rootedness.
///
/// `steps` is never empty for parser-produced values: `/`, `./` and the
/// empty string are all grammar rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<'a> {
    pub rooted: Rooted,
    pub steps: Vec<Step<'a>>,
}

impl Path<'_> {
    /// Checks if the path starts from the document root.
    pub fn is_absolute(&self) -> bool {
        self.rooted == Rooted::Absolute
    }
}

/// A quoted string literal. The raw content is preserved verbatim; the
/// non-opening quote character is ordinary content, and there is no escape
/// mechanism. The opening quote style is retained for re-serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLiteral<'a> {
    pub value: &'a str,
    pub quote: char,
}

/// The only comparison operators the grammar recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
}

/// Either side of an equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand<'a> {
    Attribute(AttributeRef<'a>),
    Path(Path<'a>),
    Literal(StringLiteral<'a>),
}

/// A bracketed qualifier on a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// Numeric positional filter, e.g. `[2]`. Non-negative by construction;
    /// the index sub-grammar has no unary minus.
    Index(u64),
    /// Value comparison, either operand order, e.g. `[@partNum="872-AA"]`.
    Equality {
        left: Operand<'a>,
        op: ComparisonOp,
        right: Operand<'a>,
    },
    /// Conjunction; binds tighter than [`Predicate::Or`].
    And(Box<Predicate<'a>>, Box<Predicate<'a>>),
    /// Disjunction.
    Or(Box<Predicate<'a>>, Box<Predicate<'a>>),
    /// The single permitted function, `not(...)`.
    Not(Box<Predicate<'a>>),
    /// Presence test for a (context-)relative path, e.g. `[content/title]`.
    Existence(Path<'a>),
}

impl<'a> Predicate<'a> {
    /// Boxes both sides into a conjunction.
    pub fn and(left: Predicate<'a>, right: Predicate<'a>) -> Predicate<'a> {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Boxes both sides into a disjunction.
    pub fn or(left: Predicate<'a>, right: Predicate<'a>) -> Predicate<'a> {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Checks if the predicate is an `Equality` variant.
    pub fn is_equality(&self) -> bool {
        matches!(self, Predicate::Equality { .. })
    }
}

/// An optional trailing whole-path comparison, e.g. `="148.95"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison<'a> {
    pub op: ComparisonOp,
    pub literal: StringLiteral<'a>,
}

/// The root of a parsed query: a path, optionally compared against a
/// string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPath<'a> {
    pub path: Path<'a>,
    pub comparison: Option<Comparison<'a>>,
}

// --- Canonical serialization ---

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::SelfAxis => ".",
            Axis::Child => "/",
            Axis::DescendantOrSelf => "//",
        })
    }
}

impl fmt::Display for NameTest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameTest::Name(name) => f.write_str(name),
            NameTest::Wildcard => f.write_str("*"),
        }
    }
}

impl fmt::Display for QualifiedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix {
            write!(f, "{prefix}:")?;
        }
        write!(f, "{}", self.local)
    }
}

impl fmt::Display for AttributeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@")?;
        if let Some(prefix) = self.prefix {
            write!(f, "{prefix}:")?;
        }
        f.write_str(self.local)
    }
}

impl fmt::Display for StepTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepTarget::Element(name) => write!(f, "{name}"),
            StepTarget::Attribute(attr) => write!(f, "{attr}"),
        }
    }
}

impl fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(predicate) = &self.predicate {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted == Rooted::ContextRelative {
            f.write_str(".")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            // A relative path's first step carries no separator.
            if i > 0 || self.rooted != Rooted::Relative {
                write!(f, "{}", step.axis)?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StringLiteral<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.quote, self.value, self.quote)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::NotEq => "!=",
        })
    }
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Attribute(attr) => write!(f, "{attr}"),
            Operand::Path(path) => write!(f, "{path}"),
            Operand::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl Predicate<'_> {
    /// Writes `self`, parenthesized when re-parsing it as an operand of the
    /// enclosing boolean operator would regroup it.
    fn fmt_grouped(&self, f: &mut fmt::Formatter<'_>, needs_group: bool) -> fmt::Result {
        if needs_group {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Index(index) => write!(f, "{index}"),
            Predicate::Equality { left, op, right } => write!(f, "{left}{op}{right}"),
            Predicate::And(left, right) => {
                left.fmt_grouped(f, matches!(**left, Predicate::Or(..)))?;
                f.write_str(" and ")?;
                right.fmt_grouped(f, matches!(**right, Predicate::Or(..) | Predicate::And(..)))
            }
            Predicate::Or(left, right) => {
                write!(f, "{left} or ")?;
                right.fmt_grouped(f, matches!(**right, Predicate::Or(..)))
            }
            Predicate::Not(inner) => write!(f, "not({inner})"),
            Predicate::Existence(path) => write!(f, "{path}"),
        }
    }
}

impl fmt::Display for Comparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.literal)
    }
}

impl fmt::Display for TextPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(comparison) = &self.comparison {
            write!(f, "{comparison}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existence(name: &str) -> Predicate<'_> {
        Predicate::Existence(Path {
            rooted: Rooted::Relative,
            steps: vec![Step {
                axis: Axis::Child,
                target: StepTarget::Element(QualifiedName {
                    prefix: None,
                    local: NameTest::Name(name),
                }),
                predicate: None,
            }],
        })
    }

    #[test]
    fn test_display_axis_markers() {
        assert_eq!(Axis::SelfAxis.to_string(), ".");
        assert_eq!(Axis::Child.to_string(), "/");
        assert_eq!(Axis::DescendantOrSelf.to_string(), "//");
    }

    #[test]
    fn test_display_path() {
        let path = Path {
            rooted: Rooted::Absolute,
            steps: vec![
                Step {
                    axis: Axis::Child,
                    target: StepTarget::Element(QualifiedName {
                        prefix: Some("ds"),
                        local: NameTest::Name("Root"),
                    }),
                    predicate: None,
                },
                Step {
                    axis: Axis::DescendantOrSelf,
                    target: StepTarget::Attribute(AttributeRef {
                        prefix: None,
                        local: "id",
                    }),
                    predicate: None,
                },
            ],
        };
        assert_eq!(path.to_string(), "/ds:Root//@id");
    }

    #[test]
    fn test_display_literal_keeps_quote_style() {
        let single = StringLiteral { value: "a\"b", quote: '\'' };
        let double = StringLiteral { value: "it's", quote: '"' };
        assert_eq!(single.to_string(), "'a\"b'");
        assert_eq!(double.to_string(), "\"it's\"");
    }

    #[test]
    fn test_display_parenthesizes_or_inside_and() {
        let pred = Predicate::and(
            Predicate::or(existence("a"), existence("b")),
            existence("c"),
        );
        assert_eq!(pred.to_string(), "(a or b) and c");
    }
}
