//! The `!expr` language.
//!
//! A small C-like expression language evaluated against the parameters
//! resolved so far. String parameters are coerced to numbers or bools first,
//! so `Foo > 10` works on a value captured from a prompt.
//!
//! ```text
//! ternary   := or ('?' ternary ':' ternary)?
//! or        := and ('||' and)*
//! and       := eq ('&&' eq)*
//! eq        := match (('==' | '!=') match)*
//! match     := cmp (('=~' | '!~') cmp)*
//! cmp       := add (('<' | '<=' | '>' | '>=' | 'in') add)*
//! add       := mul (('+' | '-') mul)*
//! mul       := unary (('*' | '/' | '%') unary)*
//! unary     := ('!' | '-') unary | primary
//! primary   := number | string | true | false | ident | ident '(' args ')'
//!            | '(' ternary ')' | '(' ternary (',' ternary)+ ')'
//! ```

mod builtins;
mod lexer;
mod parser;

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    domain::{DomainError, Value},
    functions::FunctionRegistry,
};

use builtins::Scope;
use parser::{BinaryOp, Expr, UnaryOp};

/// Evaluates expressions with access to the function registry.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r FunctionRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate `expression` against `params`.
    ///
    /// `self_key`/`self_val` inject the value under validation, so a
    /// `validate` expression can refer to its own variable by name.
    pub fn evaluate(
        &self,
        expression: &str,
        params: &BTreeMap<String, Value>,
        self_key: Option<&str>,
        self_val: Option<&Value>,
    ) -> Result<Value, DomainError> {
        trace!(expression, "evaluating expression");

        let mut coerced: BTreeMap<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().coerce()))
            .collect();
        if let (Some(key), Some(val)) = (self_key, self_val) {
            coerced.insert(key.to_owned(), val.clone().coerce());
        }

        let failed = |reason: String| DomainError::Evaluation {
            expression: expression.to_owned(),
            reason,
        };

        let tokens = lexer::tokenize(expression).map_err(failed)?;
        let ast = parser::parse(tokens).map_err(failed)?;
        let scope = Scope {
            params: &coerced,
            registry: self.registry,
        };
        eval(&ast, &scope).map_err(failed)
    }

    /// Evaluate where a boolean is required.
    pub fn evaluate_bool(
        &self,
        expression: &str,
        params: &BTreeMap<String, Value>,
        self_key: Option<&str>,
        self_val: Option<&Value>,
    ) -> Result<bool, DomainError> {
        match self.evaluate(expression, params, self_key, self_val)? {
            Value::Bool(b) => Ok(b),
            other => Err(DomainError::Type {
                expression: expression.to_owned(),
                expected: "bool",
                found: other.type_name().to_owned(),
            }),
        }
    }
}

fn eval(expr: &Expr, scope: &Scope<'_>) -> Result<Value, String> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Ident(name) => scope
            .params
            .get(name)
            .cloned()
            .ok_or_else(|| format!("no parameter '{name}' found")),
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Unary(op, operand) => {
            let value = eval(operand, scope)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, other) => Err(format!("'!' expects a bool, got {}", other.type_name())),
                (UnaryOp::Neg, other) => Err(format!("'-' expects a number, got {}", other.type_name())),
            }
        }
        Expr::Ternary(cond, then, otherwise) => match eval(cond, scope)? {
            Value::Bool(true) => eval(then, scope),
            Value::Bool(false) => eval(otherwise, scope),
            other => Err(format!(
                "ternary condition must be a bool, got {}",
                other.type_name()
            )),
        },
        Expr::Binary(op @ (BinaryOp::And | BinaryOp::Or), lhs, rhs) => {
            let left = truth(*op, eval(lhs, scope)?)?;
            if left == (*op == BinaryOp::Or) {
                return Ok(Value::Bool(left));
            }
            Ok(Value::Bool(truth(*op, eval(rhs, scope)?)?))
        }
        Expr::Binary(op, lhs, rhs) => binary(*op, eval(lhs, scope)?, eval(rhs, scope)?),
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            builtins::call(name, args, scope)
        }
    }
}

fn truth(op: BinaryOp, value: Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(format!(
            "'{}' expects bool operands, got {}",
            op.symbol(),
            other.type_name()
        )),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, String> {
    use Value::{Bool, List, Number, Str};

    let mismatch = |lhs: &Value, rhs: &Value| {
        format!(
            "cannot apply '{}' to {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        )
    };

    match op {
        BinaryOp::Eq => Ok(Bool(lhs == rhs)),
        BinaryOp::NotEq => Ok(Bool(lhs != rhs)),
        BinaryOp::Match | BinaryOp::NotMatch => {
            let matched = builtins::regex_match(&rhs.to_string(), &lhs.to_string())?;
            Ok(Bool(matched == (op == BinaryOp::Match)))
        }
        BinaryOp::In => match rhs {
            List(items) => Ok(Bool(items.contains(&lhs))),
            other => Err(format!("'in' expects a list, got {}", other.type_name())),
        },
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&lhs, &rhs) {
                (Number(a), Number(b)) => a.partial_cmp(b),
                (Str(a), Str(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(&lhs, &rhs)),
            }
            .ok_or_else(|| mismatch(&lhs, &rhs))?;
            Ok(Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::Add => match (&lhs, &rhs) {
            (Number(a), Number(b)) => Ok(Number(a + b)),
            (Str(_), _) | (_, Str(_)) => Ok(Str(format!("{lhs}{rhs}"))),
            _ => Err(mismatch(&lhs, &rhs)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => match (&lhs, &rhs) {
            (Number(a), Number(b)) => Ok(Number(match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            })),
            _ => Err(mismatch(&lhs, &rhs)),
        },
        // `eval` short-circuits these before reaching here.
        BinaryOp::And => Ok(Bool(truth(op, lhs)? && truth(op, rhs)?)),
        BinaryOp::Or => Ok(Bool(truth(op, lhs)? || truth(op, rhs)?)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{application::ports::MockFunctionProvider, functions::FnResult};

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::from(*v)))
            .collect()
    }

    fn eval_with(expr: &str, pairs: &[(&str, &str)]) -> Result<Value, DomainError> {
        let registry = FunctionRegistry::new();
        Evaluator::new(&registry).evaluate(expr, &params(pairs), None, None)
    }

    // ========================================================================
    // Coercion and arithmetic
    // ========================================================================

    #[test]
    fn ternary_over_coerced_strings() {
        let v = eval_with("Foo > 10 ? Foo : Bar", &[("Foo", "5"), ("Bar", "200")]).unwrap();
        assert_eq!(v, Value::Number(200.0));
        assert_eq!(v.to_string(), "200");
    }

    #[test]
    fn strlen_counts_characters() {
        let v = eval_with("strlen(Foo)", &[("Foo", "foo0")]).unwrap();
        assert_eq!(v, Value::Number(4.0));
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval_with("1 + 2 * 3", &[]).unwrap(), Value::Number(7.0));
        assert_eq!(eval_with("(1 + 2) * 3", &[]).unwrap(), Value::Number(9.0));
        assert_eq!(eval_with("-2 + 5", &[]).unwrap(), Value::Number(3.0));
        assert_eq!(eval_with("7 % 4", &[]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn plus_concatenates_strings() {
        let v = eval_with("'app-' + Env + '-' + N", &[("Env", "dev"), ("N", "2")]).unwrap();
        assert_eq!(v, Value::from("app-dev-2"));
    }

    #[test]
    fn bool_parameters_are_coerced() {
        let v = eval_with("UseEks && !UseFargate", &[("UseEks", "true"), ("UseFargate", "false")]).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn equality_across_types_is_false() {
        assert_eq!(eval_with("A == 'x'", &[("A", "1")]).unwrap(), Value::Bool(false));
        assert_eq!(eval_with("A == 1", &[("A", "1")]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // Missing would fail if evaluated.
        assert_eq!(eval_with("false && Missing", &[]).unwrap(), Value::Bool(false));
        assert_eq!(eval_with("true || Missing", &[]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn membership_in_list() {
        let v = eval_with("Region in ('eu-west-1', 'us-east-1')", &[("Region", "eu-west-1")]).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn regex_operators() {
        assert_eq!(eval_with("Name =~ '^app'", &[("Name", "app-1")]).unwrap(), Value::Bool(true));
        assert_eq!(eval_with("Name !~ '^app'", &[("Name", "app-1")]).unwrap(), Value::Bool(false));
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn undefined_parameter_is_an_evaluation_error() {
        let err = eval_with("Missing > 1", &[]).unwrap_err();
        assert!(matches!(err, DomainError::Evaluation { .. }));
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn syntax_error_is_an_evaluation_error() {
        assert!(matches!(
            eval_with("1 +", &[]).unwrap_err(),
            DomainError::Evaluation { .. }
        ));
    }

    #[test]
    fn non_bool_where_bool_required_is_a_type_error() {
        let registry = FunctionRegistry::new();
        let err = Evaluator::new(&registry)
            .evaluate_bool("'abc'", &BTreeMap::new(), None, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Type { expected: "bool", .. }));
    }

    // ========================================================================
    // Self reference and built-ins
    // ========================================================================

    #[test]
    fn self_value_is_visible_by_name() {
        let registry = FunctionRegistry::new();
        let ok = Evaluator::new(&registry)
            .evaluate_bool(
                "regex('[a-z]+', AppName)",
                &BTreeMap::new(),
                Some("AppName"),
                Some(&Value::from("myapp")),
            )
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn self_value_overrides_earlier_answer() {
        let registry = FunctionRegistry::new();
        let v = Evaluator::new(&registry)
            .evaluate(
                "Port > 1024",
                &params(&[("Port", "80")]),
                Some("Port"),
                Some(&Value::from("8080")),
            )
            .unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn math_builtins() {
        assert_eq!(eval_with("max(A, 3)", &[("A", "7")]).unwrap(), Value::Number(7.0));
        assert_eq!(eval_with("min(A, 3)", &[("A", "7")]).unwrap(), Value::Number(3.0));
        assert_eq!(eval_with("ceil(1.2)", &[]).unwrap(), Value::Number(2.0));
        assert_eq!(eval_with("floor(1.8)", &[]).unwrap(), Value::Number(1.0));
        assert_eq!(eval_with("round(1.5)", &[]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn string_builtin_formats_numbers() {
        assert_eq!(eval_with("string(A)", &[("A", "42")]).unwrap(), Value::from("42"));
    }

    #[test]
    fn regex_requires_two_arguments() {
        let err = eval_with("regex('a')", &[]).unwrap_err();
        assert!(err.to_string().contains("expecting 2 got 1"));
    }

    #[test]
    fn unknown_function_is_an_error() {
        assert!(eval_with("nope(1)", &[]).is_err());
    }

    #[test]
    fn aws_regions_delegates_to_registry() {
        let mut aws = MockFunctionProvider::new();
        aws.expect_call()
            .returning(|_, _| Ok(FnResult::list(["eu-west-1", "us-east-1"])));
        let registry = FunctionRegistry::new().register("aws", Arc::new(aws));
        let evaluator = Evaluator::new(&registry);

        let first = evaluator
            .evaluate("awsRegions('ecs', 0)", &BTreeMap::new(), None, None)
            .unwrap();
        assert_eq!(first, Value::from("eu-west-1"));

        let all = evaluator
            .evaluate("awsRegions('ecs')", &BTreeMap::new(), None, None)
            .unwrap();
        assert_eq!(
            all,
            Value::List(vec![Value::from("eu-west-1"), Value::from("us-east-1")])
        );
    }

    #[test]
    fn aws_credentials_unavailable_without_provider() {
        let v = eval_with("awsCredentials('IsAvailable')", &[]).unwrap();
        assert_eq!(v, Value::Bool(false));
        assert!(eval_with("awsCredentials('Bogus')", &[]).is_err());
    }
}
