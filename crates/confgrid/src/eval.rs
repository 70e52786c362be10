//! Interpreter for the configuration language
//!
//! Evaluates a [StatementSequence] top to bottom in its own environment and
//! returns the resulting [Bindings]. Nothing is shared between interpreters, so
//! two variants can never observe each other's variables.
use crate::parser::{self, ParseError};
use crate::statement::{
    Assignment, BinaryOp, Expr, Literal, Statement, StatementKind, StatementSequence, Target,
    UnaryOp,
};
use crate::value::Value;
use indexmap::IndexMap;

/// Variables bound by a configuration, in order of first assignment
pub type Bindings = IndexMap<String, Value>;

/// Evaluating source text failed
///
/// Carries the class of the underlying failure (`SyntaxError`, `NameError`, ...),
/// the 1-based line it happened on, what was being evaluated and the full text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, derive_new::new)]
#[error("{class} at line {line} of {description}: {detail}\n{text}")]
pub struct InterpretationError {
    pub class: String,
    pub line: usize,
    pub description: String,
    pub detail: String,
    /// The evaluated source text
    pub text: String,
}

impl InterpretationError {
    fn from_parse_error(err: ParseError, description: &str, source: &str) -> Self {
        Self::new(
            "SyntaxError".into(),
            err.line,
            description.into(),
            err.message,
            source.into(),
        )
    }
}

/// Failure while evaluating a single statement
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("name '{0}' is not defined")]
    UndefinedName(String),
    #[error("unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'")]
    UnsupportedOperands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("bad operand type for unary {op}: '{operand}'")]
    BadOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("'{0}' not supported between these operands")]
    Unordered(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("numerical result out of range")]
    Overflow,
    #[error("0.0 cannot be raised to a negative power")]
    ZeroToNegativePower,
    #[error("negative number cannot be raised to a fractional power")]
    ComplexResult,
    #[error("repeated sequence would have {0} elements")]
    TooLarge(u128),
    #[error("{0} index out of range")]
    IndexOutOfRange(&'static str),
    #[error("'{0}' object is not subscriptable")]
    NotSubscriptable(&'static str),
    #[error("{container} indices must be {expected}, not {found}")]
    InvalidIndex {
        container: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{0}")]
    MissingKey(String),
    #[error("dict keys must be str, not {0}")]
    InvalidKey(&'static str),
    #[error("cannot unpack non-sequence {0}")]
    NotUnpackable(&'static str),
    #[error("too many values to unpack (expected {expected})")]
    TooManyValues { expected: usize },
    #[error("not enough values to unpack (expected {expected}, got {found})")]
    NotEnoughValues { expected: usize, found: usize },
    #[error("statement is not supported by the configuration interpreter")]
    UnsupportedStatement,
}

impl RuntimeError {
    /// Python style error class name
    pub fn class(&self) -> &'static str {
        use RuntimeError::*;
        match self {
            UndefinedName(_) => "NameError",
            UnsupportedOperands { .. }
            | BadOperand { .. }
            | Unordered(_)
            | NotSubscriptable(_)
            | InvalidIndex { .. }
            | InvalidKey(_)
            | NotUnpackable(_) => "TypeError",
            DivisionByZero | ZeroToNegativePower => "ZeroDivisionError",
            Overflow => "OverflowError",
            ComplexResult => "ValueError",
            TooLarge(_) => "MemoryError",
            IndexOutOfRange(_) => "IndexError",
            MissingKey(_) => "KeyError",
            TooManyValues { .. } | NotEnoughValues { .. } => "ValueError",
            UnsupportedStatement => "UnsupportedStatement",
        }
    }
}

/// Evaluate `k=v` source strings into one environment
///
/// Strings are evaluated in order, each one sees the bindings of `env` and of the
/// strings before it. Used for values given on the command line.
pub fn parse_assignments<'a>(
    strings: impl IntoIterator<Item = &'a str>,
    env: Bindings,
) -> Result<Bindings, InterpretationError> {
    let mut interpreter = Interpreter::with_bindings("parsable strings", env);
    for string in strings {
        interpreter.run_source(string)?;
    }
    Ok(interpreter.into_bindings())
}

#[derive(Debug)]
pub struct Interpreter {
    description: String,
    bindings: Bindings,
}

impl Interpreter {
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_bindings(description, Bindings::default())
    }

    pub fn with_bindings(description: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            description: description.into(),
            bindings,
        }
    }

    /// Parse and evaluate `source`
    pub fn run_source(&mut self, source: &str) -> Result<(), InterpretationError> {
        let statements = parser::parse(source)
            .map_err(|err| InterpretationError::from_parse_error(err, &self.description, source))?;
        self.run(&statements, source)
    }

    /// Evaluate already parsed statements, `source` is the text they came from
    #[tracing::instrument(level = "trace", skip_all, fields(description = %self.description))]
    pub fn run(
        &mut self,
        statements: &StatementSequence,
        source: &str,
    ) -> Result<(), InterpretationError> {
        for statement in statements {
            self.statement(statement).map_err(|err| {
                InterpretationError::new(
                    err.class().into(),
                    statement.line.unwrap_or_default(),
                    self.description.clone(),
                    err.to_string(),
                    source.into(),
                )
            })?;
        }
        Ok(())
    }

    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }

    fn statement(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        match &statement.kind {
            StatementKind::Assign(Assignment { targets, value }) => {
                let value = self.expr(value)?;
                for target in targets {
                    self.bind(target, value.clone())?;
                }
            }
            StatementKind::Expression(expr) => {
                self.expr(expr)?;
            }
            StatementKind::Comment(_) | StatementKind::Blank => {}
            StatementKind::Verbatim(_) => return Err(RuntimeError::UnsupportedStatement),
        }
        Ok(())
    }

    fn bind(&mut self, target: &Target, value: Value) -> Result<(), RuntimeError> {
        match target {
            Target::Name(name) => {
                self.bindings.insert(name.clone(), value);
            }
            Target::Tuple(targets) => {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(RuntimeError::NotUnpackable(other.type_name())),
                };
                if items.len() > targets.len() {
                    return Err(RuntimeError::TooManyValues {
                        expected: targets.len(),
                    });
                }
                if items.len() < targets.len() {
                    return Err(RuntimeError::NotEnoughValues {
                        expected: targets.len(),
                        found: items.len(),
                    });
                }
                for (target, item) in targets.iter().zip(items) {
                    self.bind(target, item)?;
                }
            }
        }
        Ok(())
    }

    fn expr(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        Ok(match expr {
            Expr::Literal(literal) => match literal {
                Literal::None => Value::Null,
                Literal::Bool(b) => Value::Boolean(*b),
                Literal::Int(i) => Value::Integer(*i),
                Literal::Float(d) => Value::Decimal(*d),
                Literal::Str(s) => Value::String(s.clone()),
            },
            Expr::Name(name) => self
                .bindings
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedName(name.clone()))?,
            Expr::Tuple(items) | Expr::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.expr(item))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Dict(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match self.expr(key)? {
                        Value::String(key) => key,
                        other => return Err(RuntimeError::InvalidKey(other.type_name())),
                    };
                    map.insert(key, self.expr(value)?);
                }
                Value::Map(map)
            }
            Expr::Index { object, index } => subscript(self.expr(object)?, self.expr(index)?)?,
            Expr::Unary { op, operand } => unary(*op, self.expr(operand)?)?,
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                let lhs = self.expr(lhs)?;
                if !lhs.is_truthy() {
                    return Ok(lhs);
                }
                self.expr(rhs)?
            }
            Expr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => {
                let lhs = self.expr(lhs)?;
                if lhs.is_truthy() {
                    return Ok(lhs);
                }
                self.expr(rhs)?
            }
            Expr::Binary { op, lhs, rhs } => binary(*op, self.expr(lhs)?, self.expr(rhs)?)?,
        })
    }
}

/// Numeric view of a value, booleans count as integers
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(Number::Int(*b as i64)),
            Value::Integer(i) => Some(Number::Int(*i)),
            Value::Decimal(d) => Some(Number::Float(*d)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(d) => d,
        }
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    if op == UnaryOp::Not {
        return Ok(Value::Boolean(!operand.is_truthy()));
    }

    let bad_operand = || RuntimeError::BadOperand {
        op: op.symbol(),
        operand: operand.type_name(),
    };
    Ok(match (op, Number::of(&operand).ok_or_else(bad_operand)?) {
        (UnaryOp::Neg, Number::Int(i)) => Value::Integer(i.checked_neg().ok_or(RuntimeError::Overflow)?),
        (UnaryOp::Neg, Number::Float(d)) => Value::Decimal(-d),
        (_, Number::Int(i)) => Value::Integer(i),
        (_, Number::Float(d)) => Value::Decimal(d),
    })
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let unsupported = || RuntimeError::UnsupportedOperands {
        op: op.symbol(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    };

    match op {
        BinaryOp::Eq => return Ok(Value::Boolean(equals(&lhs, &rhs))),
        BinaryOp::NotEq => return Ok(Value::Boolean(!equals(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(&lhs, &rhs).ok_or(RuntimeError::Unordered(op.symbol()))?;
            return Ok(Value::Boolean(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }));
        }
        _ => {}
    }

    // sequence operations
    match (op, &lhs, &rhs) {
        (BinaryOp::Add, Value::String(a), Value::String(b)) => {
            return Ok(Value::String(format!("{a}{b}")))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            return Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (BinaryOp::Mul, Value::String(s), n) | (BinaryOp::Mul, n, Value::String(s)) => {
            let Some(Number::Int(count)) = Number::of(n) else {
                return Err(unsupported());
            };
            let count = repeat_count(s.len(), count)?;
            return Ok(Value::String(s.repeat(count)));
        }
        (BinaryOp::Mul, Value::List(items), n) | (BinaryOp::Mul, n, Value::List(items)) => {
            let Some(Number::Int(count)) = Number::of(n) else {
                return Err(unsupported());
            };
            let count = repeat_count(items.len(), count)?;
            let repeated = (0..count).flat_map(|_| items.iter().cloned()).collect();
            return Ok(Value::List(repeated));
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (Number::of(&lhs), Number::of(&rhs)) else {
        return Err(unsupported());
    };

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b),
        (a, b) => float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let checked = |result: Option<i64>| result.map(Value::Integer).ok_or(RuntimeError::Overflow);

    match op {
        BinaryOp::Add => checked(a.checked_add(b)),
        BinaryOp::Sub => checked(a.checked_sub(b)),
        BinaryOp::Mul => checked(a.checked_mul(b)),
        BinaryOp::Div => float_arithmetic(op, a as f64, b as f64),
        BinaryOp::FloorDiv | BinaryOp::Mod if b == 0 => Err(RuntimeError::DivisionByZero),
        BinaryOp::FloorDiv => {
            let quotient = a.checked_div(b).ok_or(RuntimeError::Overflow)?;
            // round towards negative infinity
            if a % b != 0 && (a < 0) != (b < 0) {
                checked(quotient.checked_sub(1))
            } else {
                Ok(Value::Integer(quotient))
            }
        }
        BinaryOp::Mod => {
            let remainder = a.checked_rem(b).ok_or(RuntimeError::Overflow)?;
            // result takes the sign of the divisor
            if remainder != 0 && (remainder < 0) != (b < 0) {
                Ok(Value::Integer(remainder + b))
            } else {
                Ok(Value::Integer(remainder))
            }
        }
        BinaryOp::Pow => int_power(a, b),
        _ => unreachable!("{op:?} is not arithmetic"),
    }
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    if b == 0.0 && matches!(op, BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod) {
        return Err(RuntimeError::DivisionByZero);
    }

    Ok(Value::Decimal(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => {
            let remainder = a % b;
            if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow => return float_power(a, b),
        _ => unreachable!("{op:?} is not arithmetic"),
    }))
}

fn int_power(base: i64, exponent: i64) -> Result<Value, RuntimeError> {
    if exponent < 0 {
        if base == 0 {
            return Err(RuntimeError::ZeroToNegativePower);
        }
        return float_power(base as f64, exponent as f64);
    }

    match u32::try_from(exponent) {
        Ok(exponent) => base
            .checked_pow(exponent)
            .map(Value::Integer)
            .ok_or(RuntimeError::Overflow),
        // only these bases stay in range for huge exponents
        Err(_) => match base {
            0 | 1 => Ok(Value::Integer(base)),
            -1 if exponent % 2 == 0 => Ok(Value::Integer(1)),
            -1 => Ok(Value::Integer(-1)),
            _ => Err(RuntimeError::Overflow),
        },
    }
}

fn float_power(base: f64, exponent: f64) -> Result<Value, RuntimeError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(RuntimeError::ZeroToNegativePower);
    }

    let result = base.powf(exponent);
    let finite_inputs = base.is_finite() && exponent.is_finite();
    if result.is_nan() && finite_inputs {
        return Err(RuntimeError::ComplexResult);
    }
    if result.is_infinite() && finite_inputs {
        return Err(RuntimeError::Overflow);
    }
    Ok(Value::Decimal(result))
}

/// Largest string or list a repetition may produce
const MAX_REPEAT_LEN: u128 = 1 << 28;

/// Validated repetition count for a sequence of `len` elements
fn repeat_count(len: usize, count: i64) -> Result<usize, RuntimeError> {
    let count = count.max(0);
    let total = len as u128 * count as u128;
    if total > MAX_REPEAT_LEN {
        return Err(RuntimeError::TooLarge(total));
    }
    // an empty sequence stays empty for any count
    Ok(if len == 0 { 0 } else { count as usize })
}

/// `==` semantics: numbers compare by value across int/float/bool
fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| equals(a, b))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| equals(value, other)))
        }
        _ => match (Number::of(lhs), Number::of(rhs)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
            (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
            _ => lhs == rhs,
        },
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            for (a, b) in a.iter().zip(b) {
                if !equals(a, b) {
                    return compare(a, b);
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => match (Number::of(lhs)?, Number::of(rhs)?) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        },
    }
}

fn subscript(object: Value, index: Value) -> Result<Value, RuntimeError> {
    match object {
        Value::List(items) => {
            let position = sequence_position(&index, items.len(), "list")?;
            Ok(items[position].clone())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let position = sequence_position(&index, chars.len(), "string")?;
            Ok(Value::String(chars[position].to_string()))
        }
        Value::Map(map) => {
            let Value::String(key) = &index else {
                return Err(RuntimeError::MissingKey(index.to_string()));
            };
            map.get(key)
                .cloned()
                .ok_or_else(|| RuntimeError::MissingKey(index.to_string()))
        }
        other => Err(RuntimeError::NotSubscriptable(other.type_name())),
    }
}

/// Resolve a possibly negative index into `0..len`
fn sequence_position(
    index: &Value,
    len: usize,
    container: &'static str,
) -> Result<usize, RuntimeError> {
    let Some(Number::Int(index)) = Number::of(index) else {
        return Err(RuntimeError::InvalidIndex {
            container,
            expected: "integers",
            found: index.type_name(),
        });
    };

    let position = if index < 0 {
        (len as i64).checked_add(index)
    } else {
        Some(index)
    };

    position
        .filter(|p| (0..len as i64).contains(p))
        .map(|p| p as usize)
        .ok_or(RuntimeError::IndexOutOfRange(container))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Result<Bindings, InterpretationError> {
        let mut interpreter = Interpreter::new("test source");
        interpreter.run_source(source)?;
        Ok(interpreter.into_bindings())
    }

    fn value(source: &str) -> Value {
        run(&format!("x = {source}")).unwrap()["x"].clone()
    }

    #[test]
    fn parse_strings() {
        assert_eq!(
            parse_assignments(["a=2"], Bindings::default()).unwrap(),
            Bindings::from([("a".into(), Value::Integer(2))])
        );
        assert_eq!(
            parse_assignments(["a=2\nb=5"], Bindings::default()).unwrap(),
            Bindings::from([("a".into(), Value::Integer(2)), ("b".into(), Value::Integer(5))])
        );
    }

    #[test]
    fn parse_strings_with_environment() {
        let env = Bindings::from([("c".into(), Value::Integer(3))]);
        let bindings = parse_assignments(["a=2", "b=c+a"], env).unwrap();
        assert_eq!(
            bindings,
            Bindings::from([
                ("c".into(), Value::Integer(3)),
                ("a".into(), Value::Integer(2)),
                ("b".into(), Value::Integer(5)),
            ])
        );
    }

    #[test]
    fn later_assignments_see_earlier_ones() {
        let bindings = run("base = 0.1\nlr = base * 2\nname = 'run_' + 'a'\n").unwrap();
        assert_eq!(bindings["lr"], Value::Decimal(0.2));
        assert_eq!(bindings["name"], Value::from("run_a"));
    }

    #[test]
    fn python_arithmetic() {
        assert_eq!(value("7 // 2"), Value::Integer(3));
        assert_eq!(value("-7 // 2"), Value::Integer(-4));
        assert_eq!(value("-7 % 3"), Value::Integer(2));
        assert_eq!(value("7 / 2"), Value::Decimal(3.5));
        assert_eq!(value("2 ** 10"), Value::Integer(1024));
        assert_eq!(value("2 ** -1"), Value::Decimal(0.5));
        assert_eq!(value("-2 ** 2"), Value::Integer(-4));
        assert_eq!(value("True + 1"), Value::Integer(2));
        assert_eq!(value("[0] * 3"), Value::from(vec![0i64, 0, 0]));
        assert_eq!(value("1 == 1.0"), Value::Boolean(true));
        assert_eq!(value("0 or 'fallback'"), Value::from("fallback"));
        assert_eq!(value("[1, 2][-1]"), Value::Integer(2));
        assert_eq!(value("{'a': [1, 2]}['a'][0]"), Value::Integer(1));
        assert_eq!(value("1e999 * 0").to_string(), "1e999 * 0");
    }

    #[test]
    fn power_edge_cases() {
        let class = |source: &str| run(source).unwrap_err().class;

        assert_eq!(class("a = 0 ** -1"), "ZeroDivisionError");
        assert_eq!(class("a = 0.0 ** -1"), "ZeroDivisionError");
        assert_eq!(class("a = 10.0 ** 400"), "OverflowError");
        assert_eq!(class("a = 10 ** 400"), "OverflowError");
        assert_eq!(class("a = (-8.0) ** 0.5"), "ValueError");

        assert_eq!(value("1 ** 5000000000"), Value::Integer(1));
        assert_eq!(value("(-1) ** 5000000000"), Value::Integer(1));
        assert_eq!(value("(-1) ** 5000000001"), Value::Integer(-1));
        assert_eq!(value("0 ** 5000000000"), Value::Integer(0));
        assert_eq!(value("0 ** 0"), Value::Integer(1));
        assert_eq!(value("4 ** -1"), Value::Decimal(0.25));
        assert_eq!(value("4.0 ** 0.5"), Value::Decimal(2.0));
    }

    #[test]
    fn oversized_repetition_is_an_error() {
        let err = run("a = 'ab' * 9223372036854775807").unwrap_err();
        assert_eq!(err.class, "MemoryError");
        assert_eq!(run("a = [0] * 10 ** 12").unwrap_err().class, "MemoryError");

        assert_eq!(value("'ab' * 3"), Value::from("ababab"));
        assert_eq!(value("2 * [1]"), Value::from(vec![1i64, 1]));
        assert_eq!(value("[] * 9223372036854775807"), Value::List(vec![]));
        assert_eq!(value("'x' * -2"), Value::from(""));
    }

    #[test]
    fn tuple_unpacking() {
        let bindings = run("a, (b, c) = 1, [2, 3]").unwrap();
        assert_eq!(bindings["c"], Value::Integer(3));

        let err = run("a, b = 1, 2, 3").unwrap_err();
        assert_eq!(err.class, "ValueError");
    }

    #[test]
    fn errors_carry_class_and_line() {
        let err = run("a = 1\n\nb = c\n").unwrap_err();
        assert_eq!(err.class, "NameError");
        assert_eq!(err.line, 3);
        assert_eq!(err.description, "test source");
        assert_eq!(
            err.to_string(),
            "NameError at line 3 of test source: name 'c' is not defined\na = 1\n\nb = c\n"
        );

        assert_eq!(run("a = 1 / 0").unwrap_err().class, "ZeroDivisionError");
        assert_eq!(run("a = 'x' + 1").unwrap_err().class, "TypeError");
        assert_eq!(run("a = 9223372036854775807 + 1").unwrap_err().class, "OverflowError");
        assert_eq!(run("a = [1][3]").unwrap_err().class, "IndexError");
        assert_eq!(run("a = {'k': 1}['j']").unwrap_err().class, "KeyError");
        assert_eq!(run("import os").unwrap_err().class, "UnsupportedStatement");

        let err = run("a = (1,\n").unwrap_err();
        assert_eq!(err.class, "SyntaxError");
        assert_eq!(err.line, 2);
    }
}
