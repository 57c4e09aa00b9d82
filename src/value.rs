// ABOUTME: Runtime value model: coercion, arithmetic, comparison, binding, composition

use crate::ast::{Block, Parameter};
use crate::error::SemanticError;
use crate::token::Position;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub body: Rc<Block>,
    pub parameters: Vec<Parameter>,
    pub bound_arguments: Vec<Value>,
    pub composed_of: Option<Box<FunctionValue>>,
}

impl FunctionValue {
    /// Arity expected at the next call site: the declared parameter count, unless this value
    /// is the right side of a `>>` chain, in which case it's driven by what `composed_of`
    /// still needs.
    pub fn expected_arity(&self) -> usize {
        match &self.composed_of {
            Some(inner) => inner
                .parameters
                .len()
                .saturating_sub(inner.bound_arguments.len()),
            None => self.parameters.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Function(Rc<FunctionValue>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// Textual form used both for coercion (e.g. `bool + string`) and for trace printing.
    pub fn textual_form(&self) -> String {
        match self {
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:.6}", f),
            Value::Str(s) => s.clone(),
            Value::Function(_) => "Function".to_string(),
        }
    }

    /// Coercion to bool: `bool` is itself; `"true"`/`"false"` strings coerce; anything else,
    /// including int/float, is fatal.
    pub fn to_bool(&self, position: Position) -> Result<bool, SemanticError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Str(s) if s == "true" => Ok(true),
            Value::Str(s) if s == "false" => Ok(false),
            _ => Err(SemanticError::TypeNotCoercible {
                operator: "bool".to_string(),
                position,
            }),
        }
    }

    pub fn logical_not(&self, position: Position) -> Result<Value, SemanticError> {
        Ok(Value::Bool(!self.to_bool(position)?))
    }

    /// Unary minus: legal on int/float only.
    pub fn negate(&self, position: Position) -> Result<Value, SemanticError> {
        match self {
            Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(SemanticError::TypeNotCoercible {
                operator: "-".to_string(),
                position,
            }),
        }
    }

    pub fn add(&self, other: &Value, position: Position) -> Result<Value, SemanticError> {
        if let (Some(a), Some(b)) = (direct_numeric(self), direct_numeric(other)) {
            return Ok(num_to_value(numeric_fold(a, b, i64::wrapping_add, |x, y| {
                x + y
            })));
        }
        match (self, other) {
            (Value::Str(s), Value::Str(t)) => Ok(Value::Str(format!("{s}{t}"))),
            (number, Value::Str(s)) if direct_numeric(number).is_some() => {
                let a = direct_numeric(number).unwrap();
                match parse_numeric(s) {
                    Some(b) => Ok(num_to_value(numeric_fold(
                        a,
                        b,
                        i64::wrapping_add,
                        |x, y| x + y,
                    ))),
                    None => Ok(Value::Str(format!("{}{}", number.textual_form(), s))),
                }
            }
            (Value::Str(s), number) if direct_numeric(number).is_some() => {
                let b = direct_numeric(number).unwrap();
                match parse_numeric(s) {
                    Some(a) => Ok(num_to_value(numeric_fold(
                        a,
                        b,
                        i64::wrapping_add,
                        |x, y| x + y,
                    ))),
                    None => Ok(Value::Str(format!("{}{}", s, number.textual_form()))),
                }
            }
            (Value::Bool(_), Value::Str(_)) | (Value::Str(_), Value::Bool(_)) => Ok(Value::Str(
                format!("{}{}", self.textual_form(), other.textual_form()),
            )),
            _ => Err(type_not_coercible("+", position)),
        }
    }

    pub fn sub(&self, other: &Value, position: Position) -> Result<Value, SemanticError> {
        if let (Some(a), Some(b)) = (direct_numeric(self), direct_numeric(other)) {
            return Ok(num_to_value(numeric_fold(a, b, i64::wrapping_sub, |x, y| {
                x - y
            })));
        }
        match (self, other) {
            (Value::Str(s), Value::Str(t)) => match (parse_numeric(s), parse_numeric(t)) {
                (Some(a), Some(b)) => Ok(num_to_value(numeric_fold(
                    a,
                    b,
                    i64::wrapping_sub,
                    |x, y| x - y,
                ))),
                _ => Err(type_not_coercible("-", position)),
            },
            (number, Value::Str(s)) if direct_numeric(number).is_some() => {
                let a = direct_numeric(number).unwrap();
                match parse_numeric(s) {
                    Some(b) => Ok(num_to_value(numeric_fold(
                        a,
                        b,
                        i64::wrapping_sub,
                        |x, y| x - y,
                    ))),
                    None => Err(type_not_coercible("-", position)),
                }
            }
            (Value::Str(s), number) if direct_numeric(number).is_some() => {
                let b = direct_numeric(number).unwrap();
                match parse_numeric(s) {
                    Some(a) => Ok(num_to_value(numeric_fold(
                        a,
                        b,
                        i64::wrapping_sub,
                        |x, y| x - y,
                    ))),
                    None => Err(type_not_coercible("-", position)),
                }
            }
            _ => Err(type_not_coercible("-", position)),
        }
    }

    pub fn mul(&self, other: &Value, position: Position) -> Result<Value, SemanticError> {
        if let (Some(a), Some(b)) = (direct_numeric(self), direct_numeric(other)) {
            return Ok(num_to_value(numeric_fold(a, b, i64::wrapping_mul, |x, y| {
                x * y
            })));
        }
        match (self, other) {
            (Value::Str(s), Value::Str(t)) => match (parse_numeric(s), parse_numeric(t)) {
                (Some(a), Some(b)) => Ok(num_to_value(numeric_fold(
                    a,
                    b,
                    i64::wrapping_mul,
                    |x, y| x * y,
                ))),
                _ => Err(type_not_coercible("*", position)),
            },
            (Value::Int(n), Value::Str(s)) | (Value::Str(s), Value::Int(n)) => {
                match parse_numeric(s) {
                    Some(b) => Ok(num_to_value(numeric_fold(
                        Num::Int(*n),
                        b,
                        i64::wrapping_mul,
                        |x, y| x * y,
                    ))),
                    None => replicate_string(s, *n, position),
                }
            }
            (Value::Float(x), Value::Str(s)) | (Value::Str(s), Value::Float(x)) => {
                match parse_numeric(s) {
                    Some(b) => Ok(num_to_value(numeric_fold(
                        Num::Float(*x),
                        b,
                        i64::wrapping_mul,
                        |x, y| x * y,
                    ))),
                    None => Err(type_not_coercible("*", position)),
                }
            }
            _ => Err(type_not_coercible("*", position)),
        }
    }

    pub fn div(&self, other: &Value, position: Position) -> Result<Value, SemanticError> {
        let a = lenient_numeric(self).ok_or_else(|| type_not_coercible("/", position))?;
        let b = lenient_numeric(other).ok_or_else(|| type_not_coercible("/", position))?;
        if b.is_zero() {
            return Err(SemanticError::DivisionByZero { position });
        }
        Ok(num_to_value(numeric_fold(a, b, i64::wrapping_div, |x, y| {
            x / y
        })))
    }

    pub fn equals(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        // Numeric promotion only applies when at least one side is a real number; two numeric
        // strings compare by identical text, not by parsed value (e.g. "10" != "010").
        if direct_numeric(self).is_some() || direct_numeric(other).is_some() {
            if let (Some(a), Some(b)) = (lenient_numeric(self), lenient_numeric(other)) {
                return Ok(num_eq(a, b));
            }
        }
        match (self, other) {
            (Value::Bool(b), Value::Str(s)) | (Value::Str(s), Value::Bool(b)) => {
                Ok(s == if *b { "true" } else { "false" })
            }
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Str(s), Value::Str(t)) => Ok(s == t),
            _ => Err(type_not_coercible("==", position)),
        }
    }

    pub fn not_equals(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        self.equals(other, position).map(|eq| !eq)
    }

    pub fn less(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        self.relate(other, "<", position, |o| o == Ordering::Less)
    }

    pub fn less_eq(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        self.relate(other, "<=", position, |o| o != Ordering::Greater)
    }

    pub fn greater(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        self.relate(other, ">", position, |o| o == Ordering::Greater)
    }

    pub fn greater_eq(&self, other: &Value, position: Position) -> Result<bool, SemanticError> {
        self.relate(other, ">=", position, |o| o != Ordering::Less)
    }

    fn relate(
        &self,
        other: &Value,
        operator: &str,
        position: Position,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<bool, SemanticError> {
        let a = lenient_numeric(self).ok_or_else(|| type_not_coercible(operator, position))?;
        let b = lenient_numeric(other).ok_or_else(|| type_not_coercible(operator, position))?;
        Ok(accept(num_cmp(a, b)))
    }

    /// `<<`: returns a copy of `self` with `args` appended to its `bound_arguments`.
    /// Only legal on function values.
    pub fn bind(&self, args: Vec<Value>, position: Position) -> Result<Value, SemanticError> {
        match self {
            Value::Function(f) => {
                let mut bound = (**f).clone();
                bound.bound_arguments.extend(args);
                Ok(Value::Function(Rc::new(bound)))
            }
            _ => Err(SemanticError::FunctionBindOnNonFunction { position }),
        }
    }

    /// `>>`: `self` composed with `other`. `other` must have exactly one parameter; the result
    /// is a copy of `other` with `composed_of` set to `self`.
    pub fn compose(&self, other: &Value, position: Position) -> Result<Value, SemanticError> {
        let (Value::Function(lhs), Value::Function(rhs)) = (self, other) else {
            return Err(type_not_coercible(">>", position));
        };
        if rhs.parameters.len() != 1 {
            return Err(SemanticError::FunctionComposeArity { position });
        }
        let mut composed = (**rhs).clone();
        composed.composed_of = Some(Box::new((**lhs).clone()));
        Ok(Value::Function(Rc::new(composed)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.textual_form())
    }
}

fn type_not_coercible(operator: &str, position: Position) -> SemanticError {
    SemanticError::TypeNotCoercible {
        operator: operator.to_string(),
        position,
    }
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Float(f) => f == 0.0,
        }
    }
}

fn parse_numeric(s: &str) -> Option<Num> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Num::Int(i));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Some(Num::Float(f));
    }
    None
}

fn direct_numeric(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

/// Numeric value of `v` whether it's a literal number or a numeric-parseable string.
fn lenient_numeric(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Str(s) => parse_numeric(s),
        _ => None,
    }
}

fn num_to_value(n: Num) -> Value {
    match n {
        Num::Int(i) => Value::Int(i),
        Num::Float(f) => Value::Float(f),
    }
}

/// `int ⊕ int` stays int; any float operand widens both sides to float.
fn numeric_fold(
    a: Num,
    b: Num,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Num {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Num::Int(int_op(x, y)),
        _ => Num::Float(float_op(a.to_f64(), b.to_f64())),
    }
}

fn num_eq(a: Num, b: Num) -> bool {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x == y,
        _ => a.to_f64() == b.to_f64(),
    }
}

fn num_cmp(a: Num, b: Num) -> Ordering {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(&y),
        _ => a
            .to_f64()
            .partial_cmp(&b.to_f64())
            .unwrap_or(Ordering::Equal),
    }
}

fn replicate_string(s: &str, times: i64, position: Position) -> Result<Value, SemanticError> {
    if times < 0 {
        return Err(type_not_coercible("*", position));
    }
    Ok(Value::Str(s.repeat(times as usize)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::start()
    }

    #[test]
    fn int_plus_int_stays_int() {
        assert!(matches!(
            Value::Int(2).add(&Value::Int(3), pos()),
            Ok(Value::Int(5))
        ));
    }

    #[test]
    fn addition_is_commutative_on_numbers() {
        let a = Value::Int(7).add(&Value::Float(1.5), pos()).unwrap();
        let b = Value::Float(1.5).add(&Value::Int(7), pos()).unwrap();
        match (a, b) {
            (Value::Float(x), Value::Float(y)) => assert_eq!(x, y),
            _ => panic!("expected floats"),
        }
    }

    #[test]
    fn subtraction_is_not_commutative() {
        let a = Value::Int(5).sub(&Value::Int(2), pos()).unwrap();
        let b = Value::Int(2).sub(&Value::Int(5), pos()).unwrap();
        assert!(!matches!((a, b), (Value::Int(x), Value::Int(y)) if x == y));
    }

    #[test]
    fn string_plus_string_always_concatenates_textually() {
        let v = Value::Str("10".to_string())
            .add(&Value::Str("20".to_string()), pos())
            .unwrap();
        assert!(matches!(v, Value::Str(s) if s == "1020"));
    }

    #[test]
    fn string_replication_by_positive_int() {
        let v = Value::Int(3).mul(&Value::Str("ab".to_string()), pos()).unwrap();
        assert!(matches!(v, Value::Str(s) if s == "ababab"));
    }

    #[test]
    fn string_replication_by_zero_is_empty() {
        let v = Value::Int(0).mul(&Value::Str("ab".to_string()), pos()).unwrap();
        assert!(matches!(v, Value::Str(s) if s.is_empty()));
    }

    #[test]
    fn string_replication_by_negative_int_is_fatal() {
        assert!(Value::Int(-1).mul(&Value::Str("ab".to_string()), pos()).is_err());
    }

    #[test]
    fn division_by_zero_is_fatal() {
        assert!(Value::Int(4).div(&Value::Int(0), pos()).is_err());
    }

    #[test]
    fn bool_string_equality_compares_truthy_text() {
        assert!(Value::Bool(true)
            .equals(&Value::Str("true".to_string()), pos())
            .unwrap());
        assert!(!Value::Bool(true)
            .equals(&Value::Str("false".to_string()), pos())
            .unwrap());
    }

    #[test]
    fn string_equals_string_is_textual_not_numeric_promoted() {
        // Two numeric-looking strings compare by exact text, not parsed value.
        assert!(!Value::Str("10".to_string())
            .equals(&Value::Str("10.0".to_string()), pos())
            .unwrap());
        assert!(!Value::Str("10".to_string())
            .equals(&Value::Str("010".to_string()), pos())
            .unwrap());
        assert!(Value::Str("10".to_string())
            .equals(&Value::Str("10".to_string()), pos())
            .unwrap());
    }

    #[test]
    fn number_equals_numeric_string_still_promotes() {
        assert!(Value::Int(10)
            .equals(&Value::Str("10".to_string()), pos())
            .unwrap());
        assert!(Value::Int(10)
            .equals(&Value::Str("10.0".to_string()), pos())
            .unwrap());
    }

    #[test]
    fn numeric_string_relations_compare_numerically() {
        assert!(Value::Str("10".to_string())
            .greater(&Value::Str("9".to_string()), pos())
            .unwrap());
    }

    #[test]
    fn double_negation_matches_bool_coercion() {
        for v in [
            Value::Bool(true),
            Value::Bool(false),
            Value::Str("true".to_string()),
            Value::Str("false".to_string()),
        ] {
            let once = v.logical_not(pos()).unwrap();
            let twice = once.logical_not(pos()).unwrap();
            let expected = v.to_bool(pos()).unwrap();
            assert_eq!(twice.to_bool(pos()).unwrap(), expected);
        }
    }

    #[test]
    fn int_and_float_are_not_coercible_to_bool() {
        assert!(Value::Int(1).to_bool(pos()).is_err());
        assert!(Value::Float(0.0).to_bool(pos()).is_err());
    }
}
