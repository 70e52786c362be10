//! Override rewriting
//!
//! Substitutes caller supplied values into the assignments of a
//! [StatementSequence]. The right-hand side of a matching assignment is replaced by
//! the literal form of the override ([Value::to_expr]); everything else, including
//! comments and statements we do not understand, is left as it is. Overrides that
//! match no assignment are appended as new assignments at the end.
use crate::statement::{Statement, StatementKind, StatementSequence, Target};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};

/// Variable name to override value
pub type OverrideMapping = IndexMap<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Permit assigning the same top-level name more than once
    pub allow_double_assignment: bool,
    /// Permit tuple targets such as `a, b = 1, 2`; they are never overridden
    pub allow_tuple_assignment: bool,
}

/// Result of [rewrite]
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub statements: StatementSequence,
    /// Override keys that had no assignment and were appended, in order
    pub appended: Vec<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("tuple assignment is not allowed in config files (e.g. `a, b = 1, 2`), impossible to override {names:?} assigned by `{shape}`")]
    TupleAssignment { names: Vec<String>, shape: String },
    #[error("double assignment is not allowed in config files, '{name}' is assigned twice")]
    DuplicateAssignment { name: String },
}

/// Apply `overrides` to `statements`
///
/// Walks the statements once in order. Fails on the first tuple target (unless
/// [RewriteOptions::allow_tuple_assignment]) and on any assignment to a name that
/// was already overridden (unless [RewriteOptions::allow_double_assignment]).
/// Names that are not overridden may be reassigned freely.
#[tracing::instrument(level = "trace", skip_all, fields(overrides = overrides.len()))]
pub fn rewrite(
    mut statements: StatementSequence,
    mut overrides: OverrideMapping,
    options: RewriteOptions,
) -> Result<Rewrite, RewriteError> {
    // names whose value was replaced so far
    let mut overridden: IndexSet<String> = IndexSet::new();

    for statement in statements.iter_mut() {
        let StatementKind::Assign(assignment) = &mut statement.kind else {
            continue;
        };

        for target in &assignment.targets {
            let name = match target {
                Target::Name(name) => name,
                Target::Tuple(_) if options.allow_tuple_assignment => continue,
                Target::Tuple(_) => {
                    return Err(RewriteError::TupleAssignment {
                        names: target.names().into_iter().map(String::from).collect(),
                        shape: target.to_string(),
                    })
                }
            };

            if overridden.contains(name) && !options.allow_double_assignment {
                return Err(RewriteError::DuplicateAssignment { name: name.clone() });
            }

            if let Some(value) = overrides.shift_remove(name) {
                tracing::trace!(%name, %value, "override");
                assignment.value = value.to_expr();
                overridden.insert(name.clone());
            }
        }
    }

    let appended: Vec<String> = overrides.keys().cloned().collect();
    for (name, value) in overrides {
        statements.push(Statement::assign(name, value.to_expr()));
    }

    Ok(Rewrite {
        statements,
        appended,
    })
}
