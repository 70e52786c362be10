//! Recursive descent parser for configuration text
//!
//! The grammar, loosest binding first:
//!
//! ```text
//! statement  := targets* expr_list [comment] (newline | eof)
//! targets    := expr_list "="
//! expr_list  := expr ("," expr)* [","]
//! expr       := or
//! or         := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := arith [("==" | "!=" | "<" | "<=" | ">" | ">=") arith]
//! arith      := term (("+" | "-") term)*
//! term       := factor (("*" | "/" | "//" | "%") factor)*
//! factor     := ("-" | "+") factor | power
//! power      := postfix ["**" factor]
//! postfix    := atom ("[" expr "]")*
//! atom       := literal | name | "(" [expr_list] ")" | "[" items "]" | "{" entries "}"
//! ```
//!
//! Lines starting with a Python statement keyword are kept as
//! [StatementKind::Verbatim], see [Parser::verbatim].
use crate::lexer::{tokenize, LineIndex, Span, Token};
use crate::statement::{
    Assignment, BinaryOp, Expr, Literal, Statement, StatementKind, StatementSequence, Target,
    UnaryOp,
};

/// Statement keywords whose statements are preserved as raw text
const VERBATIM_KEYWORDS: &[&str] = &[
    "import", "from", "def", "class", "if", "for", "while", "with", "try", "assert", "del",
    "global", "nonlocal", "raise", "return", "pass", "lambda", "async", "yield",
];

/// Keywords continuing a compound statement on an unindented line
const CONTINUATION_KEYWORDS: &[&str] = &["elif", "else", "except", "finally"];

/// Parse configuration text into statements
#[tracing::instrument(level = "trace", skip_all)]
pub fn parse(source: &str) -> Result<StatementSequence, ParseError> {
    Parser::new(source).statements()
}

/// Parse a single expression, e.g. a value given on the command line
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source);
    let expr = parser.expr_list()?;
    while matches!(parser.peek(), Some(Token::Newline | Token::Comment(_))) {
        parser.advance();
    }
    if let Some((token, span)) = parser.peek_spanned() {
        return Err(parser.error_at(span.start, format!("unexpected {token}")));
    }
    Ok(expr)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid syntax at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub message: String,
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Span)>,
    position: usize,
    lines: LineIndex,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            position: 0,
            lines: LineIndex::new(source),
        }
    }

    fn statements(mut self) -> Result<StatementSequence, ParseError> {
        let mut statements = StatementSequence::default();

        while let Some((token, span)) = self.peek_spanned() {
            let line = self.lines.line(span.start);
            let statement = match token {
                Token::Newline => {
                    self.advance();
                    Statement::new(StatementKind::Blank)
                }
                Token::Comment(text) => {
                    let text = text.to_string();
                    self.advance();
                    self.end_of_statement()?;
                    Statement::new(StatementKind::Comment(text))
                }
                Token::Name(name) if VERBATIM_KEYWORDS.contains(&name) => {
                    let start = span.start;
                    self.verbatim(start)?
                }
                _ => self.assignment_or_expression()?,
            };
            statements.push(statement.at_line(line));
        }

        Ok(statements)
    }

    /// `target = ... = value` or a bare expression, up to the end of the line
    fn assignment_or_expression(&mut self) -> Result<Statement, ParseError> {
        // left-hand sides with the offset they start at
        let mut targets = vec![];
        let mut start = self.offset();
        let mut value = self.expr_list()?;
        while self.eat(&Token::Assign) {
            let next_start = self.offset();
            let next = self.expr_list()?;
            targets.push((std::mem::replace(&mut value, next), start));
            start = next_start;
        }

        let comment = match self.peek() {
            Some(Token::Comment(text)) => {
                let text = text.to_string();
                self.advance();
                Some(text)
            }
            _ => None,
        };
        self.end_of_statement()?;

        let kind = if targets.is_empty() {
            StatementKind::Expression(value)
        } else {
            let targets = targets
                .into_iter()
                .map(|(expr, at)| self.target(expr, at))
                .collect::<Result<_, _>>()?;
            StatementKind::Assign(Assignment::new(targets, value))
        };

        Ok(Statement::new(kind).with_comment(comment))
    }

    fn target(&self, expr: Expr, at: usize) -> Result<Target, ParseError> {
        match expr {
            Expr::Name(name) => Ok(Target::Name(name)),
            Expr::Tuple(items) | Expr::List(items) => Ok(Target::Tuple(
                items
                    .into_iter()
                    .map(|item| self.target(item, at))
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(self.error_at(at, format!("cannot assign to expression `{other}`"))),
        }
    }

    /// Keep a statement we do not model as raw text
    ///
    /// Spans the keyword line, every following indented line and unindented
    /// `else`/`elif`/`except`/`finally` lines. Blank lines inside the block are kept
    /// if the block continues after them.
    fn verbatim(&mut self, start: usize) -> Result<Statement, ParseError> {
        let mut end = line_end(self.source, start);

        loop {
            let mut cursor = end;
            // skip blank lines
            let next = loop {
                if cursor >= self.source.len() {
                    break None;
                }
                let line_start = cursor + 1;
                let next_end = line_end(self.source, line_start);
                let line = &self.source[line_start.min(self.source.len())..next_end];
                if line.trim().is_empty() {
                    cursor = next_end;
                    continue;
                }
                break Some((line, next_end));
            };

            let Some((line, next_end)) = next else {
                break;
            };

            let is_indented = line.starts_with([' ', '\t']);
            let is_continuation = CONTINUATION_KEYWORDS
                .iter()
                .any(|keyword| starts_with_keyword(line, keyword));
            if !(is_indented || is_continuation) {
                break;
            }

            end = next_end;
        }

        let text = self.source[start..end].trim_end().to_string();
        while self
            .peek_spanned()
            .is_some_and(|(_, span)| span.end <= end)
        {
            self.advance();
        }
        self.end_of_statement()?;

        Ok(Statement::new(StatementKind::Verbatim(text)))
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_spanned() {
            None => Ok(()),
            Some((Token::Newline, _)) => {
                self.advance();
                Ok(())
            }
            Some((Token::Semicolon, _)) => {
                self.advance();
                // `a = 1;` ends the line too
                self.eat(&Token::Newline);
                Ok(())
            }
            Some((token, span)) => Err(self.error_at(
                span.start,
                format!("expected end of line, found {token}"),
            )),
        }
    }

    /// One expression, or a tuple when separated by commas
    fn expr_list(&mut self) -> Result<Expr, ParseError> {
        let first = self.expr()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.expr()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            lhs = Expr::binary(BinaryOp::Or, lhs, self.and()?);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.not()?;
        while self.eat(&Token::And) {
            lhs = Expr::binary(BinaryOp::And, lhs, self.not()?);
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::unary(UnaryOp::Not, self.not()?));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.arith()?;
        let Some(op) = self.peek().and_then(comparison_op) else {
            return Ok(lhs);
        };
        self.advance();
        let rhs = self.arith()?;

        if let Some((token, span)) = self.peek_spanned() {
            if comparison_op(&token).is_some() {
                return Err(self.error_at(
                    span.start,
                    format!("chained comparisons are not supported, found {token}"),
                ));
            }
        }

        Ok(Expr::binary(op, lhs, rhs))
    }

    fn arith(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            lhs = Expr::binary(op, lhs, self.term()?);
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            lhs = Expr::binary(op, lhs, self.factor()?);
        }
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.advance();
        Ok(Expr::unary(op, self.factor()?))
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.postfix()?;
        if self.eat(&Token::DoubleStar) {
            return Ok(Expr::binary(BinaryOp::Pow, base, self.factor()?));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.atom()?;
        while self.eat(&Token::BracketOpen) {
            let index = self.expr()?;
            self.expect(&Token::BracketClose)?;
            expr = Expr::index(expr, index);
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let Some((token, span)) = self.peek_spanned() else {
            return Err(self.error_at(self.source.len(), "unexpected end of input".into()));
        };
        let start = span.start;

        let expr = match token {
            Token::Null => Expr::Literal(Literal::None),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::Name(name) => Expr::Name(name.to_string()),
            Token::Int(text) => {
                let literal = parse_int(text)
                    .ok_or_else(|| self.error_at(start, format!("invalid integer `{text}`")))?;
                Expr::Literal(Literal::Int(literal))
            }
            Token::Float(text) => {
                let literal = text
                    .replace('_', "")
                    .parse()
                    .map_err(|_| self.error_at(start, format!("invalid number `{text}`")))?;
                Expr::Literal(Literal::Float(literal))
            }
            Token::Str(_) => return self.string(),
            Token::ParenOpen => {
                self.advance();
                if self.eat(&Token::ParenClose) {
                    return Ok(Expr::Tuple(vec![]));
                }
                let inner = self.expr_list()?;
                self.expect(&Token::ParenClose)?;
                return Ok(inner);
            }
            Token::BracketOpen => {
                self.advance();
                let items = self.items(&Token::BracketClose)?;
                return Ok(Expr::List(items));
            }
            Token::BraceOpen => {
                self.advance();
                return self.dict();
            }
            token => return Err(self.error_at(start, format!("unexpected {token}"))),
        };

        self.advance();
        Ok(expr)
    }

    /// Adjacent string literals are concatenated
    fn string(&mut self) -> Result<Expr, ParseError> {
        let mut value = String::new();
        while let Some((Token::Str(text), span)) = self.peek_spanned() {
            let start = span.start;
            let unescaped = unescape(&text[1..text.len() - 1])
                .map_err(|message| self.error_at(start, message))?;
            value.push_str(&unescaped);
            self.advance();
        }
        Ok(Expr::Literal(Literal::Str(value)))
    }

    /// Comma separated expressions up to `close`, trailing comma allowed
    fn items(&mut self, close: &Token<'_>) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![];
        while !self.eat(close) {
            items.push(self.expr()?);
            if !self.eat(&Token::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn dict(&mut self) -> Result<Expr, ParseError> {
        let mut entries = vec![];
        while !self.eat(&Token::BraceClose) {
            let key = self.expr()?;
            if !self.check(&Token::Colon) {
                return Err(self.error_at(
                    self.offset(),
                    "set literals are not supported, expected `:`".into(),
                ));
            }
            self.advance();
            let value = self.expr()?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                self.expect(&Token::BraceClose)?;
                break;
            }
        }
        Ok(Expr::Dict(entries))
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Null
                    | Token::True
                    | Token::False
                    | Token::Not
                    | Token::Name(_)
                    | Token::Int(_)
                    | Token::Float(_)
                    | Token::Str(_)
                    | Token::Minus
                    | Token::Plus
                    | Token::ParenOpen
                    | Token::BracketOpen
                    | Token::BraceOpen
            )
        )
    }

    // === token cursor ===

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn peek_spanned(&self) -> Option<(Token<'src>, Span)> {
        self.tokens.get(self.position).cloned()
    }

    /// Start of the next token, or the end of input
    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(self.source.len(), |(_, span)| span.start)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn check(&self, token: &Token<'_>) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token<'_>) -> bool {
        let found = self.check(token);
        if found {
            self.advance();
        }
        found
    }

    fn expect(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        if self.eat(token) {
            return Ok(());
        }
        match self.peek_spanned() {
            Some((found, span)) => {
                Err(self.error_at(span.start, format!("expected {token}, found {found}")))
            }
            None => Err(self.error_at(
                self.source.len(),
                format!("expected {token}, found end of input"),
            )),
        }
    }

    fn error_at(&self, offset: usize, message: String) -> ParseError {
        let (line, column) = self.lines.position(offset);
        ParseError {
            line,
            column,
            message,
        }
    }
}

fn comparison_op(token: &Token<'_>) -> Option<BinaryOp> {
    Some(match token {
        Token::Eq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::Le => BinaryOp::Le,
        Token::Gt => BinaryOp::Gt,
        Token::Ge => BinaryOp::Ge,
        _ => return None,
    })
}

/// Decimal or `0x`/`0o`/`0b` prefixed integer, `_` separators allowed
fn parse_int(text: &str) -> Option<i64> {
    let text = text.replace('_', "");
    let (radix, digits) = match text.get(..2) {
        Some("0x" | "0X") => (16, &text[2..]),
        Some("0o" | "0O") => (8, &text[2..]),
        Some("0b" | "0B") => (2, &text[2..]),
        _ => (10, text.as_str()),
    };
    i64::from_str_radix(digits, radix).ok()
}

/// Offset of the `\n` ending the line that contains `offset` (or the end of input)
fn line_end(source: &str, offset: usize) -> usize {
    if offset >= source.len() {
        return source.len();
    }
    source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i)
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Resolve backslash escapes of a string literal body
fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else {
            return Err("string ends with a backslash".into());
        };
        match escaped {
            '\\' | '\'' | '"' => out.push(escaped),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'x' | 'u' | 'U' => {
                let digits = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.by_ref().take(digits).collect();
                let c = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == digits)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid escape `\\{escaped}{hex}`"))?;
                out.push(c);
            }
            // unknown escapes are kept as written
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assignment(statement: &Statement) -> &Assignment {
        match &statement.kind {
            StatementKind::Assign(assignment) => assignment,
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn simple_assignments() {
        let statements = parse("a=2\nb = 'five'\n").unwrap();
        assert_eq!(statements.len(), 2);

        let a = assignment(statements.iter().next().unwrap());
        assert_eq!(a.targets, vec![Target::Name("a".into())]);
        assert_eq!(a.value, Expr::Literal(Literal::Int(2)));
        assert_eq!(statements.render(), "a = 2\nb = 'five'\n");
    }

    #[test]
    fn keeps_lines_comments_and_blanks() {
        let source = "# model\n\nwidth = 3  # pixels\ndepth = width * 2\n";
        let statements = parse(source).unwrap();
        let lines: Vec<_> = statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(statements.render(), source);
    }

    #[test]
    fn tuple_and_chained_targets() {
        let statements = parse("a, b = 1, 2\nc = d = [3]\n").unwrap();
        let mut iter = statements.iter();

        let tuple = assignment(iter.next().unwrap());
        assert_eq!(
            tuple.targets,
            vec![Target::Tuple(vec![
                Target::Name("a".into()),
                Target::Name("b".into())
            ])]
        );

        let chained = assignment(iter.next().unwrap());
        assert_eq!(chained.targets.len(), 2);
        assert_eq!(statements.render(), "(a, b) = (1, 2)\nc = d = [3]\n");
    }

    #[test]
    fn multi_line_literals() {
        let statements = parse("layers = [\n  64,\n  128,  # wide\n]\nopt = {'lr': 1e-3,\n 'momentum': .9}\n").unwrap();
        assert_eq!(
            statements.render(),
            "layers = [64, 128]\nopt = {'lr': 0.001, 'momentum': 0.9}\n"
        );
    }

    #[test]
    fn verbatim_blocks() {
        let source = "import math\ndef f(x):\n    return x.y\n\n    # still f\nelse_value = 1\n";
        let statements = parse(source).unwrap();
        let kinds: Vec<_> = statements.iter().map(|s| &s.kind).collect();
        assert_eq!(
            kinds[0],
            &StatementKind::Verbatim("import math".into())
        );
        assert_eq!(
            kinds[1],
            &StatementKind::Verbatim("def f(x):\n    return x.y\n\n    # still f".into())
        );
        assert!(matches!(kinds[2], StatementKind::Assign(_)));
        assert_eq!(statements.render(), source);
    }

    #[test]
    fn operator_precedence() {
        let expr = parse_expression("-2 ** 2 + 3 * (4 - 1) > 0 and not x").unwrap();
        assert_eq!(expr.to_string(), "-2 ** 2 + 3 * (4 - 1) > 0 and not x");

        let Expr::Binary { op, .. } = &expr else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::And);
    }

    #[test]
    fn string_escapes_and_concatenation() {
        let expr = parse_expression(r#"'a\'b' "\x41\n" 'c\d'"#).unwrap();
        assert_eq!(expr, Expr::Literal(Literal::Str("a'bA\nc\\d".into())));
    }

    #[test]
    fn errors_point_at_the_offending_token() {
        let err = parse("a = 1\nb = (2,\nc = 3").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse("a = 1 2").unwrap_err();
        assert_eq!((err.line, err.column), (1, 7));

        let err = parse("1 = a").unwrap_err();
        assert!(err.message.contains("cannot assign"), "{err}");

        let err = parse("a = $").unwrap_err();
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn semicolons_and_prefixed_integers() {
        let statements = parse("a = 0x1f; b = 0o17  # octal\nc = 0b101;\nd = 1_000\n").unwrap();
        let lines: Vec<_> = statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![Some(1), Some(1), Some(2), Some(3)]);
        assert_eq!(
            statements.render(),
            "a = 31\nb = 15  # octal\nc = 5\nd = 1000\n"
        );

        let err = parse("a = 0x_\n").unwrap_err();
        assert!(err.message.contains("invalid integer"), "{err}");
        assert!(parse("a = 1;;\n").is_err());
    }

    #[test]
    fn expression_with_trailing_comment() {
        assert_eq!(
            parse_expression("[1, 2]  # sizes\n").unwrap(),
            Expr::List(vec![
                Expr::Literal(Literal::Int(1)),
                Expr::Literal(Literal::Int(2))
            ])
        );
    }

    #[test]
    fn rejects_chained_comparison_and_sets() {
        assert!(parse_expression("1 < 2 < 3").is_err());
        assert!(parse_expression("{1, 2}").is_err());
    }
}
