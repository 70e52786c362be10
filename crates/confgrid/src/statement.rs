//! Structured representation of a configuration program
//!
//! A configuration is a [StatementSequence]: an ordered list of top-level
//! [Statement]s. Only [Assignment]s carry meaning for overriding; comments, blank
//! lines, bare expressions and verbatim statements are passed through untouched.
//!
//! The [std::fmt::Display] implementations are the renderer. Rendering is
//! deterministic and the output parses back into an equivalent sequence.
use std::fmt::{self, Display, Formatter, Write};

/// Ordered top-level statements of one configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementSequence {
    statements: Vec<Statement>,
}

impl StatementSequence {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Statement> {
        self.statements.iter_mut()
    }

    /// Render to source text, one statement per line
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl<'a> IntoIterator for &'a StatementSequence {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Statement> for StatementSequence {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Display for StatementSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    /// 1-based line in the text this statement was parsed from
    ///
    /// `None` for statements created programmatically (e.g. appended overrides).
    pub line: Option<usize>,
    /// Comment following the statement on the same line, including the `#`
    pub comment: Option<String>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            line: None,
            comment: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// A fresh `name = <value>` statement
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::new(StatementKind::Assign(Assignment::new(
            vec![Target::Name(name.into())],
            value,
        )))
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::Assign(assignment) => assignment.fmt(f)?,
            StatementKind::Expression(expr) => expr.fmt(f)?,
            StatementKind::Comment(text) | StatementKind::Verbatim(text) => f.write_str(text)?,
            StatementKind::Blank => {}
        }

        if let Some(comment) = &self.comment {
            write!(f, "  {comment}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Assign(Assignment),
    /// A bare expression, evaluated and discarded
    Expression(Expr),
    /// A comment-only line, including the `#`
    Comment(String),
    Blank,
    /// Raw source of a statement that is not modelled (imports, definitions, ...)
    Verbatim(String),
}

/// `target = [target = ...] value`
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Assignment {
    pub targets: Vec<Target>,
    pub value: Expr,
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for target in &self.targets {
            write!(f, "{target} = ")?;
        }
        self.value.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Tuple(Vec<Target>),
}

impl Target {
    /// All names bound by this target, depth first
    pub fn names(&self) -> Vec<&str> {
        match self {
            Target::Name(name) => vec![name.as_str()],
            Target::Tuple(targets) => targets.iter().flat_map(Target::names).collect(),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(name) => f.write_str(name),
            Target::Tuple(targets) => write_sequence(f, "(", targets, ")", true),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn index(object: Expr, index: Expr) -> Self {
        Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    /// Binding strength, higher binds tighter
    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { op, .. } => op.precedence(),
            Expr::Literal(Literal::Int(i)) if *i < 0 => UnaryOp::Neg.precedence(),
            Expr::Literal(Literal::Float(d)) if d.is_nan() => BinaryOp::Mul.precedence(),
            Expr::Literal(Literal::Float(d)) if d.is_sign_negative() => {
                UnaryOp::Neg.precedence()
            }
            _ => ATOM,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            self.fmt(f)
        }
    }
}

const ATOM: u8 = 9;

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => literal.fmt(f),
            Expr::Name(name) => f.write_str(name),
            Expr::Tuple(items) => write_sequence(f, "(", items, ")", true),
            Expr::List(items) => write_sequence(f, "[", items, "]", false),
            Expr::Dict(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_char('}')
            }
            Expr::Index { object, index } => {
                object.fmt_operand(f, object.precedence() < ATOM)?;
                write!(f, "[{index}]")
            }
            Expr::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                operand.fmt_operand(f, operand.precedence() < op.precedence())
            }
            Expr::Binary { op, lhs, rhs } => {
                let precedence = op.precedence();
                let (lhs_parens, rhs_parens) = match op {
                    // right associative
                    BinaryOp::Pow => (lhs.precedence() <= precedence, rhs.precedence() < precedence),
                    // not chainable
                    op if op.is_comparison() => {
                        (lhs.precedence() <= precedence, rhs.precedence() <= precedence)
                    }
                    _ => (lhs.precedence() < precedence, rhs.precedence() <= precedence),
                };
                lhs.fmt_operand(f, lhs_parens)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_operand(f, rhs_parens)
            }
        }
    }
}

fn write_sequence<T: Display>(
    f: &mut Formatter<'_>,
    open: &str,
    items: &[T],
    close: &str,
    is_tuple: bool,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt(f)?;
    }
    if is_tuple && items.len() == 1 {
        f.write_char(',')?;
    }
    f.write_str(close)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => f.write_str("None"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::Int(i) => write!(f, "{i}"),
            // there is no literal for these, 1e999 overflows to infinity
            Literal::Float(d) if d.is_nan() => f.write_str("1e999 * 0"),
            Literal::Float(d) if d.is_infinite() && *d > 0.0 => f.write_str("1e999"),
            Literal::Float(d) if d.is_infinite() => f.write_str("-1e999"),
            // Debug keeps the fractional part (`1.0`), Display would drop it
            Literal::Float(d) => write!(f, "{d:?}"),
            Literal::Str(s) => write_quoted(f, s),
        }
    }
}

/// Quote like Python's `repr`: single quotes unless the text contains only `'`
fn write_quoted(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "not ",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            UnaryOp::Not => 3,
            UnaryOp::Neg | UnaryOp::Pos => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => 6,
            BinaryOp::Pow => 8,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(i: i64) -> Expr {
        Expr::Literal(Literal::Int(i))
    }

    #[test]
    fn parenthesizes_by_precedence() {
        // (1 + 2) * 3
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, int(1), int(2)),
            int(3),
        );
        assert_eq!(expr.to_string(), "(1 + 2) * 3");

        // 1 - (2 - 3)
        let expr = Expr::binary(
            BinaryOp::Sub,
            int(1),
            Expr::binary(BinaryOp::Sub, int(2), int(3)),
        );
        assert_eq!(expr.to_string(), "1 - (2 - 3)");

        // (-2) ** 2 vs -(2 ** 2)
        let expr = Expr::binary(BinaryOp::Pow, Expr::unary(UnaryOp::Neg, int(2)), int(2));
        assert_eq!(expr.to_string(), "(-2) ** 2");
        let expr = Expr::unary(UnaryOp::Neg, Expr::binary(BinaryOp::Pow, int(2), int(2)));
        assert_eq!(expr.to_string(), "-2 ** 2");
    }

    #[test]
    fn renders_statements() {
        let sequence = StatementSequence::new(vec![
            Statement::new(StatementKind::Comment("# header".into())),
            Statement::assign("a", int(2)).with_comment(Some("# two".into())),
            Statement::new(StatementKind::Blank),
            Statement::new(StatementKind::Assign(Assignment::new(
                vec![Target::Tuple(vec![
                    Target::Name("b".into()),
                    Target::Name("c".into()),
                ])],
                Expr::Tuple(vec![int(1), Expr::Literal(Literal::Str("x".into()))]),
            ))),
        ]);

        assert_eq!(
            sequence.render(),
            "# header\na = 2  # two\n\n(b, c) = (1, 'x')\n"
        );
    }

    #[test]
    fn floats_keep_their_kind() {
        assert_eq!(Expr::Literal(Literal::Float(1.0)).to_string(), "1.0");
        assert_eq!(Expr::Literal(Literal::Float(1e-7)).to_string(), "1e-7");
        assert_eq!(
            Expr::Literal(Literal::Float(f64::INFINITY)).to_string(),
            "1e999"
        );
    }

    #[test]
    fn single_element_tuple() {
        assert_eq!(Expr::Tuple(vec![int(1)]).to_string(), "(1,)");
    }
}
