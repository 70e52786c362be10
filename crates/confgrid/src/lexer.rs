//! Tokenizer for configuration text
//!
//! Uses Logos. Newlines are significant at the top level and dropped inside
//! brackets, see [tokenize].
use logos::Logos;
use std::ops::Range;

pub type Span = Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")]
#[logos(skip r"\\\r?\n")]
pub enum Token<'src> {
    /// Input logos could not match, reported once the parser reaches it
    Error,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*", |lex| lex.slice())]
    Comment(&'src str),

    // === Keywords ===
    #[token("None")]
    Null,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Name(&'src str),

    // === Literals ===
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| lex.slice())]
    #[regex(r"0[oO][0-7_]+", |lex| lex.slice())]
    #[regex(r"0[bB][01_]+", |lex| lex.slice())]
    Int(&'src str),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice())]
    Float(&'src str),

    /// String literal including its quotes, escapes are resolved by the parser
    #[regex(r#""([^"\\\r\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"'([^'\\\r\n]|\\.)*'"#, |lex| lex.slice())]
    Str(&'src str),

    // === Operators ===
    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Error => f.write_str("invalid character"),
            Token::Newline => f.write_str("end of line"),
            Token::Comment(_) => f.write_str("comment"),
            Token::Name(name) => write!(f, "name `{name}`"),
            Token::Int(text) | Token::Float(text) => write!(f, "number `{text}`"),
            Token::Str(text) => write!(f, "string {text}"),
            other => write!(f, "`{}`", other.symbol()),
        }
    }
}

impl Token<'_> {
    fn symbol(&self) -> &'static str {
        match self {
            Token::Null => "None",
            Token::True => "True",
            Token::False => "False",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::Assign => "=",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::DoubleStar => "**",
            Token::Slash => "/",
            Token::DoubleSlash => "//",
            Token::Percent => "%",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::BracketOpen => "[",
            Token::BracketClose => "]",
            Token::BraceOpen => "{",
            Token::BraceClose => "}",
            _ => "",
        }
    }
}

/// Tokenize `source`, dropping newlines and comments nested in brackets
///
/// Lexing errors become [Token::Error] so that text the parser never looks at
/// (verbatim statements) does not have to be valid.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Span)> {
    let mut depth = 0usize;
    let mut tokens = Vec::new();

    for (token, span) in Token::lexer(source).spanned() {
        let token = token.unwrap_or(Token::Error);
        match token {
            Token::ParenOpen | Token::BracketOpen | Token::BraceOpen => depth += 1,
            Token::ParenClose | Token::BracketClose | Token::BraceClose => {
                depth = depth.saturating_sub(1)
            }
            Token::Newline | Token::Comment(_) if depth > 0 => continue,
            _ => {}
        }
        tokens.push((token, span));
    }

    tokens
}

/// Byte offset to 1-based line/column lookup
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-based line and column of a byte offset
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let column = offset - self.line_starts[line - 1] + 1;
        (line, column)
    }

    pub fn line(&self, offset: usize) -> usize {
        self.position(offset).0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn assignment_line() {
        assert_eq!(
            kinds("lr = 1e-3  # learning rate\n"),
            vec![
                Token::Name("lr"),
                Token::Assign,
                Token::Float("1e-3"),
                Token::Comment("# learning rate"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn keywords_win_over_names() {
        assert_eq!(
            kinds("True Truth None"),
            vec![Token::True, Token::Name("Truth"), Token::Null]
        );
    }

    #[test]
    fn newlines_inside_brackets_are_dropped() {
        assert_eq!(
            kinds("a = [1,\n  2, # two\n]\n"),
            vec![
                Token::Name("a"),
                Token::Assign,
                Token::BracketOpen,
                Token::Int("1"),
                Token::Comma,
                Token::Int("2"),
                Token::Comma,
                Token::BracketClose,
                Token::Newline,
            ]
        );
    }

    #[test]
    fn prefixed_integers_and_semicolons() {
        assert_eq!(
            kinds("a = 0xFF; b = 0o1_7;c=0b10"),
            vec![
                Token::Name("a"),
                Token::Assign,
                Token::Int("0xFF"),
                Token::Semicolon,
                Token::Name("b"),
                Token::Assign,
                Token::Int("0o1_7"),
                Token::Semicolon,
                Token::Name("c"),
                Token::Assign,
                Token::Int("0b10"),
            ]
        );
    }

    #[test]
    fn invalid_input_becomes_error_token() {
        assert_eq!(
            kinds("a = $"),
            vec![Token::Name("a"), Token::Assign, Token::Error]
        );
    }

    #[test]
    fn line_index() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(3), (2, 2));
        assert_eq!(index.position(5), (3, 1));
        assert_eq!(index.position(6), (4, 1));
    }
}
