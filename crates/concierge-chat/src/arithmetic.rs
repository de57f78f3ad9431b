//! Two-operand arithmetic answered without retrieval or generation.
//!
//! Only messages that are entirely `N op M` (optionally followed by `=`) are
//! handled. This is a fixed-shape parser, never a general evaluator.

use std::sync::LazyLock;

use regex::Regex;

static ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?[0-9]+(?:\.[0-9]+)?)\s*([+\-*/xX×÷])\s*(-?[0-9]+(?:\.[0-9]+)?)\s*=?\s*$")
        .expect("Invalid arithmetic regex")
});

/// Reply used when the expression is well-formed but has no finite answer.
pub const CANNOT_COMPUTE: &str =
    "Sorry, I couldn't work that one out. Please check the numbers and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" | "x" | "X" | "×" => Some(Op::Mul),
            "/" | "÷" => Some(Op::Div),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

/// Answer a two-operand calculation, or `None` when `message` is not one.
///
/// The reply restates the expression, e.g. `"2 + 2 = 4"`. Division by zero
/// and overflow produce [`CANNOT_COMPUTE`].
pub fn evaluate(message: &str) -> Option<String> {
    let caps = ARITHMETIC.captures(message)?;
    let (lhs, rhs) = (&caps[1], &caps[3]);
    let op = Op::parse(&caps[2])?;

    let result = if is_integer(lhs) && is_integer(rhs) {
        integer_result(lhs, op, rhs)
    } else {
        float_result(lhs, op, rhs)
    };

    Some(match result {
        Some(value) => format!("{} {} {} = {}", lhs, op.symbol(), rhs, value),
        None => CANNOT_COMPUTE.to_string(),
    })
}

fn is_integer(operand: &str) -> bool {
    !operand.contains('.')
}

fn integer_result(lhs: &str, op: Op, rhs: &str) -> Option<String> {
    let (a, b) = match (lhs.parse::<i64>(), rhs.parse::<i64>()) {
        (Ok(a), Ok(b)) => (a, b),
        // Too large for i64; let floating point decide.
        _ => return float_result(lhs, op, rhs),
    };
    let value = match op {
        Op::Add => a.checked_add(b)?,
        Op::Sub => a.checked_sub(b)?,
        Op::Mul => a.checked_mul(b)?,
        Op::Div => {
            if b == 0 {
                return None;
            }
            if a.checked_rem(b)? != 0 {
                return float_result(lhs, op, rhs);
            }
            a.checked_div(b)?
        }
    };
    Some(value.to_string())
}

fn float_result(lhs: &str, op: Op, rhs: &str) -> Option<String> {
    let a: f64 = lhs.parse().ok()?;
    let b: f64 = rhs.parse().ok()?;
    let value = match op {
        Op::Add => a + b,
        Op::Sub => a - b,
        Op::Mul => a * b,
        Op::Div => {
            if b == 0.0 {
                return None;
            }
            a / b
        }
    };
    if !value.is_finite() {
        return None;
    }
    Some(format_float(value))
}

/// At most six decimal places, trailing zeros removed.
fn format_float(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition() {
        assert_eq!(evaluate("2 + 2").as_deref(), Some("2 + 2 = 4"));
    }

    #[test]
    fn test_trailing_equals_and_spacing() {
        assert_eq!(evaluate("  7*6 = ").as_deref(), Some("7 * 6 = 42"));
        assert_eq!(evaluate("10-3=").as_deref(), Some("10 - 3 = 7"));
    }

    #[test]
    fn test_alternate_operator_symbols() {
        assert_eq!(evaluate("3 x 4").as_deref(), Some("3 * 4 = 12"));
        assert_eq!(evaluate("3 × 4").as_deref(), Some("3 * 4 = 12"));
        assert_eq!(evaluate("8 ÷ 2").as_deref(), Some("8 / 2 = 4"));
    }

    #[test]
    fn test_negative_operands() {
        assert_eq!(evaluate("-5 + 3").as_deref(), Some("-5 + 3 = -2"));
        assert_eq!(evaluate("5 - -3").as_deref(), Some("5 - -3 = 8"));
    }

    #[test]
    fn test_inexact_division_uses_decimals() {
        assert_eq!(evaluate("7 / 2").as_deref(), Some("7 / 2 = 3.5"));
        assert_eq!(evaluate("1 / 3").as_deref(), Some("1 / 3 = 0.333333"));
    }

    #[test]
    fn test_decimal_operands() {
        assert_eq!(evaluate("1.5 + 2.25").as_deref(), Some("1.5 + 2.25 = 3.75"));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("5 / 0").as_deref(), Some(CANNOT_COMPUTE));
        assert_eq!(evaluate("5.0 / 0.0").as_deref(), Some(CANNOT_COMPUTE));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            evaluate("9223372036854775807 + 1").as_deref(),
            Some(CANNOT_COMPUTE)
        );
    }

    #[test]
    fn test_not_arithmetic() {
        assert!(evaluate("what is 2 + 2").is_none());
        assert!(evaluate("2 + 2 + 2").is_none());
        assert!(evaluate("hello").is_none());
        assert!(evaluate("").is_none());
        assert!(evaluate("call 555-1234 now").is_none());
    }

    #[test]
    fn test_compact_forms() {
        assert_eq!(evaluate("12/4=").as_deref(), Some("12 / 4 = 3"));
    }

    #[test]
    fn test_non_ascii_digits_left_to_retrieval() {
        assert!(evaluate("۲ + ۲").is_none());
        assert!(evaluate("٣ * 4").is_none());
    }
}
