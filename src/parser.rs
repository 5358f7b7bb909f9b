//! A `nom`-based parser for the TextPath query language.
//!
//! Each grammar rule is a composable parser consuming a prefix of the
//! remaining input, producing a typed sub-result or failing with a
//! position. Ordered choice backtracks freely; once an unambiguous token
//! has been seen (an opening `[`, an `@`, a comparison operator) the rule
//! commits via `cut` so that failures report the real offending offset
//! instead of a backtracked one.

use crate::ast::*;
use crate::error::ParseError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, u64 as nom_u64},
    combinator::{cut, map, opt, recognize, success, verify},
    error::{ContextError, ErrorKind, ParseError as NomParseError, context},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use std::cmp::Ordering;

type PResult<'a, O> = IResult<&'a str, O, FurthestError<'a>>;

// --- Main Public Parser ---

/// Parses a TextPath query into its AST.
///
/// On success the entire input has been consumed. On failure, returns a
/// non-empty list of [`ParseError`] values, all carrying the furthest byte
/// offset the grammar reached; the first entry is the most informative.
/// Never panics, whatever the input.
pub fn parse(input: &str) -> Result<TextPath<'_>, Vec<ParseError>> {
    match text_path(input) {
        Ok(("", query)) => Ok(query),
        Ok((rest, _)) => Err(vec![unconsumed_input(input, rest)]),
        Err(nom::Err::Error(failure)) | Err(nom::Err::Failure(failure)) => {
            Err(failure.into_errors(input))
        }
        Err(nom::Err::Incomplete(_)) => Err(vec![ParseError {
            position: input.len(),
            message: "incomplete input".to_string(),
        }]),
    }
}

fn unconsumed_input(input: &str, rest: &str) -> ParseError {
    let position = input.len() - rest.len();
    let message = if rest.starts_with('(') {
        "function calls are only valid inside a predicate".to_string()
    } else if rest.starts_with('[') {
        "a step may carry at most one predicate".to_string()
    } else {
        format!("unconsumed input remains: '{rest}'")
    };
    ParseError { position, message }
}

// --- Error accumulation ---

/// PEG-style "furthest failure wins" error: ordered choice keeps whichever
/// branch consumed more input, merging expectation labels on ties.
#[derive(Debug)]
struct FurthestError<'a> {
    /// Remaining input at the failure point.
    input: &'a str,
    /// Expectation labels recorded at that point.
    expected: Vec<&'static str>,
}

impl<'a> NomParseError<&'a str> for FurthestError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        FurthestError {
            input,
            expected: Vec::new(),
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // Shorter remaining input means the branch got further.
        match self.input.len().cmp(&other.input.len()) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal => {
                let mut merged = self;
                for label in other.expected {
                    if !merged.expected.contains(&label) {
                        merged.expected.push(label);
                    }
                }
                merged
            }
        }
    }
}

impl<'a> ContextError<&'a str> for FurthestError<'a> {
    fn add_context(input: &'a str, label: &'static str, mut other: Self) -> Self {
        // Label only failures at the rule's own start; a deeper failure
        // already carries a more precise expectation.
        if input.len() == other.input.len() && !other.expected.contains(&label) {
            other.expected.push(label);
        }
        other
    }
}

impl FurthestError<'_> {
    fn into_errors(self, input: &str) -> Vec<ParseError> {
        let position = input.len() - self.input.len();
        let found = match self.input.chars().next() {
            Some(c) => format!("'{c}'"),
            None => "end of input".to_string(),
        };
        if self.expected.is_empty() {
            return vec![ParseError {
                position,
                message: format!("unexpected {found}"),
            }];
        }
        self.expected
            .iter()
            .map(|expected| ParseError {
                position,
                message: format!("expected {expected}, found {found}"),
            })
            .collect()
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O>(inner: F) -> impl Parser<&'a str, Output = O, Error = FurthestError<'a>>
where
    F: Parser<&'a str, Output = O, Error = FurthestError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Matches `kw` only at a word boundary, so `ory` stays a single name.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input| verify(name, |candidate: &&str| *candidate == kw).parse(input)
}

fn build_bool_expr_parser<'a, F>(
    sub_expr_parser: F,
    op: &'static str,
    combine: fn(Predicate<'a>, Predicate<'a>) -> Predicate<'a>,
) -> impl FnMut(&'a str) -> PResult<'a, Predicate<'a>>
where
    F: Parser<&'a str, Output = Predicate<'a>, Error = FurthestError<'a>> + Clone,
{
    move |input: &'a str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(preceded(ws(keyword(op)), sub_expr_parser.clone())).parse(input)?;

        for right in remainder {
            left = combine(left, right);
        }
        Ok((input, left))
    }
}

// --- Lexical rules ---

fn name(input: &str) -> PResult<'_, &str> {
    context(
        "name",
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(is_name_char),
        )),
    )
    .parse(input)
}

fn string_literal(input: &str) -> PResult<'_, StringLiteral<'_>> {
    context(
        "string literal",
        alt((
            map(
                delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
                |value: &str| StringLiteral { value, quote: '\'' },
            ),
            map(
                delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
                |value: &str| StringLiteral { value, quote: '"' },
            ),
        )),
    )
    .parse(input)
}

// --- Name and target rules ---

fn name_test(input: &str) -> PResult<'_, NameTest<'_>> {
    alt((
        map(char('*'), |_| NameTest::Wildcard),
        map(name, NameTest::Name),
    ))
    .parse(input)
}

fn qualified_name(input: &str) -> PResult<'_, QualifiedName<'_>> {
    let (rest, first) = name_test(input)?;
    // Only a concrete name can act as a prefix; `*:x` is not a step.
    if let NameTest::Name(prefix) = first {
        if let (rest, Some(local)) = opt(preceded(char(':'), name_test)).parse(rest)? {
            return Ok((
                rest,
                QualifiedName {
                    prefix: Some(prefix),
                    local,
                },
            ));
        }
    }
    Ok((
        rest,
        QualifiedName {
            prefix: None,
            local: first,
        },
    ))
}

fn attribute_name(input: &str) -> PResult<'_, (Option<&str>, &str)> {
    let (rest, first) = name(input)?;
    match opt(preceded(char(':'), name)).parse(rest)? {
        (rest, Some(local)) => Ok((rest, (Some(first), local))),
        (rest, None) => Ok((rest, (None, first))),
    }
}

fn attribute_ref(input: &str) -> PResult<'_, AttributeRef<'_>> {
    // `@` is unambiguous, so a malformed attribute (e.g. `@*`) must fail
    // here rather than backtrack into some other rule.
    let (rest, _) = char('@').parse(input)?;
    let (rest, (prefix, local)) = cut(context("attribute name", attribute_name)).parse(rest)?;
    Ok((rest, AttributeRef { prefix, local }))
}

// --- Step/Path rules ---

fn separator(input: &str) -> PResult<'_, Axis> {
    alt((
        map(tag("//"), |_| Axis::DescendantOrSelf),
        map(char('/'), |_| Axis::Child),
    ))
    .parse(input)
}

fn path_root(input: &str) -> PResult<'_, (Rooted, Axis)> {
    alt((
        map(preceded(char('.'), separator), |axis| {
            (Rooted::ContextRelative, axis)
        }),
        map(separator, |axis| (Rooted::Absolute, axis)),
        success((Rooted::Relative, Axis::Child)),
    ))
    .parse(input)
}

fn step_target(input: &str) -> PResult<'_, StepTarget<'_>> {
    alt((
        map(attribute_ref, StepTarget::Attribute),
        map(qualified_name, StepTarget::Element),
    ))
    .parse(input)
}

fn step_body(input: &str) -> PResult<'_, (StepTarget<'_>, Option<Predicate<'_>>)> {
    let (rest, target) = step_target(input)?;
    // At most one predicate: no loop here. A second adjacent bracket is
    // left unconsumed and reported by the driver with its position.
    let (rest, predicate) = opt(preceded(multispace0, predicate)).parse(rest)?;
    Ok((rest, (target, predicate)))
}

fn path(input: &str) -> PResult<'_, Path<'_>> {
    let (rest, (rooted, first_axis)) = path_root(input)?;
    let (rest, (target, predicate)) = preceded(multispace0, step_body).parse(rest)?;
    let mut steps = vec![Step {
        axis: first_axis,
        target,
        predicate,
    }];

    let (rest, remainder) = many0(pair(ws(separator), step_body)).parse(rest)?;
    for (axis, (target, predicate)) in remainder {
        steps.push(Step {
            axis,
            target,
            predicate,
        });
    }

    Ok((rest, Path { rooted, steps }))
}

// --- Predicate rules (in order of precedence) ---

fn predicate(input: &str) -> PResult<'_, Predicate<'_>> {
    preceded(
        char('['),
        cut(terminated(
            ws(or_expr),
            context("closing ']'", char(']')),
        )),
    )
    .parse(input)
}

fn or_expr(input: &str) -> PResult<'_, Predicate<'_>> {
    build_bool_expr_parser(and_expr, "or", Predicate::or)(input)
}

fn and_expr(input: &str) -> PResult<'_, Predicate<'_>> {
    build_bool_expr_parser(primary_predicate, "and", Predicate::and)(input)
}

fn primary_predicate(input: &str) -> PResult<'_, Predicate<'_>> {
    context(
        "predicate expression",
        alt((
            paren_group,
            not_expr,
            index_predicate,
            equality_expr,
            existence_test,
        )),
    )
    .parse(input)
}

fn paren_group(input: &str) -> PResult<'_, Predicate<'_>> {
    preceded(char('('), cut(terminated(ws(or_expr), char(')')))).parse(input)
}

fn not_expr(input: &str) -> PResult<'_, Predicate<'_>> {
    let (rest, _) = keyword("not")(input)?;
    let (rest, _) = preceded(multispace0, char('(')).parse(rest)?;
    let (rest, inner) = cut(terminated(ws(or_expr), char(')'))).parse(rest)?;
    Ok((rest, Predicate::Not(Box::new(inner))))
}

fn index_predicate(input: &str) -> PResult<'_, Predicate<'_>> {
    let (rest, value) = nom_u64(input)?;
    // A digit run glued to a name character is not an index.
    if rest.starts_with(is_name_char) {
        return Err(nom::Err::Error(FurthestError::from_error_kind(
            rest,
            ErrorKind::Verify,
        )));
    }
    Ok((rest, Predicate::Index(value)))
}

fn comparison_op(input: &str) -> PResult<'_, ComparisonOp> {
    alt((
        map(tag("!="), |_| ComparisonOp::NotEq),
        map(char('='), |_| ComparisonOp::Eq),
    ))
    .parse(input)
}

fn operand(input: &str) -> PResult<'_, Operand<'_>> {
    alt((
        map(string_literal, Operand::Literal),
        map(attribute_ref, Operand::Attribute),
        map(path, Operand::Path),
    ))
    .parse(input)
}

fn equality_expr(input: &str) -> PResult<'_, Predicate<'_>> {
    let (rest, left) = operand(input)?;
    let (rest, op) = ws(comparison_op).parse(rest)?;
    let (rest, right) = cut(context("operand", operand)).parse(rest)?;
    Ok((
        rest,
        Predicate::Equality { left, op, right },
    ))
}

fn existence_test(input: &str) -> PResult<'_, Predicate<'_>> {
    map(
        verify(path, |p: &Path| p.rooted != Rooted::Absolute),
        Predicate::Existence,
    )
    .parse(input)
}

// --- Driver rule ---

fn comparison(input: &str) -> PResult<'_, Comparison<'_>> {
    let (rest, op) = ws(comparison_op).parse(input)?;
    let (rest, literal) = cut(string_literal).parse(rest)?;
    Ok((rest, Comparison { op, literal }))
}

fn text_path(input: &str) -> PResult<'_, TextPath<'_>> {
    let (rest, path) = preceded(multispace0, path).parse(input)?;
    let (rest, comparison) = opt(comparison).parse(rest)?;
    let (rest, _) = multispace0(rest)?;
    Ok((rest, TextPath { path, comparison }))
}
