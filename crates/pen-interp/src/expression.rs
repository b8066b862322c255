//! Arithmetic over numeric literals and `$variables`.
//!
//! The grammar is deliberately closed: `+ - * /`, unary minus, parentheses,
//! decimal literals, and variable references. Nothing else parses.

use std::collections::BTreeMap;

use chumsky::prelude::*;
use pen_core::{EntityKind, PenError, PenResult};

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

enum Failure {
    UndefinedVariable(String),
    DivisionByZero,
}

impl Expr {
    fn evaluate(&self, variables: &BTreeMap<String, f64>) -> Result<f64, Failure> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Variable(name) => variables
                .get(name)
                .copied()
                .ok_or_else(|| Failure::UndefinedVariable(name.clone())),
            Self::Negate(operand) => operand.evaluate(variables).map(|value| -value),
            Self::Binary(op, lhs, rhs) => {
                let lhs = lhs.evaluate(variables)?;
                let rhs = rhs.evaluate(variables)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Subtract => Ok(lhs - rhs),
                    BinaryOp::Multiply => Ok(lhs * rhs),
                    BinaryOp::Divide if rhs == 0.0 => Err(Failure::DivisionByZero),
                    BinaryOp::Divide => Ok(lhs / rhs),
                }
            }
        }
    }
}

/// Build the expression parser. Precedence: unary minus, then `* /`, then
/// `+ -`, all left-associative.
fn expression_parser<'a>() -> impl Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> {
    recursive(|expr| {
        let number = text::digits(10)
            .then(just('.').then(text::digits(10)).or_not())
            .to_slice()
            .try_map(|digits: &str, span| {
                digits
                    .parse::<f64>()
                    .map(Expr::Number)
                    .map_err(|err| Rich::custom(span, err))
            });

        let variable = just('$')
            .ignore_then(
                any()
                    .filter(|c: &char| c.is_alphanumeric() || *c == '_')
                    .repeated()
                    .at_least(1)
                    .to_slice(),
            )
            .map(|name: &str| Expr::Variable(name.to_string()));

        let atom = choice((
            number,
            variable,
            expr.delimited_by(just('('), just(')')),
        ))
        .padded();

        let unary = just('-')
            .padded()
            .repeated()
            .foldr(atom, |_minus, operand| Expr::Negate(Box::new(operand)));

        let product = unary.clone().foldl(
            choice((
                just('*').to(BinaryOp::Multiply),
                just('/').to(BinaryOp::Divide),
            ))
            .padded()
            .then(unary)
            .repeated(),
            |lhs, (op, rhs)| Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
        );

        product.clone().foldl(
            choice((
                just('+').to(BinaryOp::Add),
                just('-').to(BinaryOp::Subtract),
            ))
            .padded()
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
        )
    })
    .then_ignore(end())
}

/// Deepest parenthesis nesting accepted.
const MAX_NESTING: usize = 32;
/// Most operators accepted in one expression. Bounds the tree depth.
const MAX_OPERATORS: usize = 256;

fn check_size(source: &str) -> Result<(), &'static str> {
    let mut depth = 0_usize;
    let mut operators = 0_usize;
    for ch in source.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err("parentheses nest too deeply");
                }
            }
            ')' => depth = depth.saturating_sub(1),
            '+' | '-' | '*' | '/' => {
                operators += 1;
                if operators > MAX_OPERATORS {
                    return Err("too many operators");
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Parse and evaluate `source` against the bound variables.
///
/// An unbound `$name` is a not-found error for that variable; syntax errors,
/// oversized expressions, division by zero, and non-finite results are
/// invalid-expression errors.
pub fn evaluate(source: &str, variables: &BTreeMap<String, f64>) -> PenResult<f64> {
    let source = source.trim();
    check_size(source).map_err(|reason| PenError::invalid_expression(source, reason))?;
    let (ast, errors) = expression_parser().parse(source).into_output_errors();
    let ast = match ast {
        Some(ast) if errors.is_empty() => ast,
        _ => {
            let reason = errors
                .first()
                .map_or_else(|| "empty expression".to_string(), ToString::to_string);
            return Err(PenError::invalid_expression(source, reason));
        }
    };

    let value = ast.evaluate(variables).map_err(|failure| match failure {
        Failure::UndefinedVariable(name) => PenError::not_found(EntityKind::Variable, name),
        Failure::DivisionByZero => PenError::invalid_expression(source, "division by zero"),
    })?;
    if !value.is_finite() {
        return Err(PenError::invalid_expression(source, "result is not finite"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pen_core::{PenError, PenErrorCode};
    use proptest::prelude::*;

    use super::evaluate;

    fn vars(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), *value))
            .collect()
    }

    #[test]
    fn respects_precedence_and_parentheses() {
        let empty = BTreeMap::new();
        assert_eq!(evaluate("1 + 2 * 3", &empty), Ok(7.0));
        assert_eq!(evaluate("(1 + 2) * 3", &empty), Ok(9.0));
        assert_eq!(evaluate("10 - 4 - 3", &empty), Ok(3.0));
        assert_eq!(evaluate("8 / 2 / 2", &empty), Ok(2.0));
        assert_eq!(evaluate("-3 + 5", &empty), Ok(2.0));
        assert_eq!(evaluate("2 - -1", &empty), Ok(3.0));
        assert_eq!(evaluate(" 1.5*2 ", &empty), Ok(3.0));
    }

    #[test]
    fn substitutes_bound_variables() {
        let env = vars(&[("counter", 4.0), ("step_2", 0.5)]);
        assert_eq!(evaluate("$counter + 1", &env), Ok(5.0));
        assert_eq!(evaluate("$counter * $step_2", &env), Ok(2.0));
    }

    #[test]
    fn unbound_variable_is_not_found() {
        let err = evaluate("$missing + 1", &BTreeMap::new()).expect_err("unbound");
        assert_eq!(err.to_string(), "Variable missing not found.");
    }

    #[test]
    fn rejects_anything_outside_arithmetic() {
        let empty = BTreeMap::new();
        for source in ["", "1 +", "alert(1)", "2 ** 3", "1; 2", "(1", "x + 1", "true"] {
            let err = evaluate(source, &empty).expect_err(source);
            assert_eq!(err.code(), PenErrorCode::InvalidExpression, "{source}");
        }
    }

    #[test]
    fn division_by_zero_is_invalid() {
        let err = evaluate("1 / (2 - 2)", &BTreeMap::new()).expect_err("zero divisor");
        assert!(matches!(err, PenError::InvalidExpression { ref reason, .. } if reason == "division by zero"));
    }

    #[test]
    fn oversized_expressions_are_invalid() {
        let empty = BTreeMap::new();
        let nested = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        let err = evaluate(&nested, &empty).expect_err("too deep");
        assert!(matches!(err, PenError::InvalidExpression { ref reason, .. } if reason == "parentheses nest too deeply"));

        let negations = format!("{}1", "-".repeat(5000));
        assert_eq!(
            evaluate(&negations, &empty).map_err(|err| err.code()),
            Err(PenErrorCode::InvalidExpression)
        );

        let sum = vec!["1"; 10_000].join(" + ");
        let err = evaluate(&sum, &empty).expect_err("too long");
        assert!(matches!(err, PenError::InvalidExpression { ref reason, .. } if reason == "too many operators"));

        let fits = format!("{}1{}", "(".repeat(32), ")".repeat(32));
        assert_eq!(evaluate(&fits, &empty), Ok(1.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_integer_sums_match_native(a in -1000_i32..1000, b in -1000_i32..1000) {
            let source = format!("{a} + ({b})");
            prop_assert_eq!(evaluate(&source, &BTreeMap::new()), Ok(f64::from(a + b)));
        }

        #[test]
        fn prop_never_panics_on_arbitrary_text(source in ".{0,40}") {
            let _ = evaluate(&source, &BTreeMap::new());
        }
    }
}
