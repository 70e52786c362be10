//! A single configuration produced by rewriting
//!
//! Rendering and evaluation are computed on first use and cached. Mutating the
//! statements through [Variant::statements_mut] drops both caches.
use crate::eval::{Bindings, InterpretationError, Interpreter};
use crate::statement::StatementSequence;
use std::cell::OnceCell;

const DESCRIPTION: &str = "rendered variant";

#[derive(Debug, Clone)]
pub struct Variant {
    statements: StatementSequence,
    rendered: OnceCell<String>,
    bindings: OnceCell<Bindings>,
}

impl Variant {
    pub fn new(statements: StatementSequence) -> Self {
        Self {
            statements,
            rendered: OnceCell::new(),
            bindings: OnceCell::new(),
        }
    }

    /// Source text of this variant
    pub fn render(&self) -> &str {
        self.rendered.get_or_init(|| self.statements.render())
    }

    /// Evaluate the rendered text in a fresh environment
    ///
    /// Line numbers in errors refer to [Variant::render]. Failures are not cached,
    /// calling again re-evaluates.
    pub fn evaluate(&self) -> Result<&Bindings, InterpretationError> {
        if let Some(bindings) = self.bindings.get() {
            return Ok(bindings);
        }

        let mut interpreter = Interpreter::new(DESCRIPTION);
        interpreter.run_source(self.render())?;
        Ok(self.bindings.get_or_init(|| interpreter.into_bindings()))
    }

    /// Producer of the evaluated bindings, sharing this variant's cache
    pub fn deferred(&self) -> impl Fn() -> Result<Bindings, InterpretationError> + '_ {
        move || self.evaluate().cloned()
    }

    pub fn statements(&self) -> &StatementSequence {
        &self.statements
    }

    pub fn statements_mut(&mut self) -> &mut StatementSequence {
        self.rendered.take();
        self.bindings.take();
        &mut self.statements
    }

    pub fn into_statements(self) -> StatementSequence {
        self.statements
    }
}

impl From<StatementSequence> for Variant {
    fn from(statements: StatementSequence) -> Self {
        Self::new(statements)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use crate::statement::{Expr, Literal, Statement};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn variant(source: &str) -> Variant {
        Variant::new(parse(source).unwrap())
    }

    #[test]
    fn render_is_cached() {
        let variant = variant("a = 2\n\n# note\nb = a  # same\n");
        let first = variant.render();
        assert_eq!(first, "a = 2\n\n# note\nb = a  # same\n");
        assert!(std::ptr::eq(first, variant.render()));
    }

    #[test]
    fn evaluate_is_cached() {
        let variant = variant("a = 2\nb = 5\n");
        let first = variant.evaluate().unwrap();
        assert_eq!(
            first,
            &Bindings::from([("a".into(), Value::Integer(2)), ("b".into(), Value::Integer(5))])
        );
        assert!(std::ptr::eq(first, variant.evaluate().unwrap()));
    }

    #[test]
    fn deferred_matches_evaluate() {
        let variant = variant("a = [1, 2][-1]\n");
        let producer = variant.deferred();
        assert_eq!(producer().unwrap(), *variant.evaluate().unwrap());
        assert_eq!(producer().unwrap()["a"], Value::Integer(2));
    }

    #[test]
    fn errors_refer_to_rendered_lines() {
        let variant = variant("# header\na = 1\nb = missing\n");
        let err = variant.evaluate().unwrap_err();
        assert_eq!(err.class, "NameError");
        assert_eq!(err.line, 3);
        assert_eq!(err.description, "rendered variant");
        assert_eq!(err.text, variant.render());
    }

    #[test]
    fn verbatim_statements_fail_evaluation() {
        let err = variant("import os\na = 1\n").evaluate().unwrap_err();
        assert_eq!(err.class, "UnsupportedStatement");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn mutation_clears_caches() {
        let mut variant = variant("a = 1\n");
        assert_eq!(variant.evaluate().unwrap()["a"], Value::Integer(1));

        variant
            .statements_mut()
            .push(Statement::assign("b", Expr::Literal(Literal::Str("x".into()))));

        assert_eq!(variant.render(), "a = 1\nb = 'x'\n");
        assert_eq!(variant.evaluate().unwrap()["b"], Value::from("x"));
    }

    #[test]
    fn clones_are_independent() {
        let original = variant("a = 1\n");
        original.render();

        let mut copy = original.clone();
        copy.statements_mut()
            .push(Statement::assign("a", Expr::Literal(Literal::Int(2))));

        assert_eq!(original.render(), "a = 1\n");
        assert_eq!(copy.render(), "a = 1\na = 2\n");
        assert_eq!(original.into_statements().len(), 1);
    }
}
