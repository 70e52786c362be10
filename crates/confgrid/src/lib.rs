//! # confgrid - configuration grids
//!
//! Run one configuration file with different values without editing it.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `confgrid` works internally.
//!
//! ### Configuration files
//!
//! A configuration is a small Python-flavoured program made of top level assignments:
//!
//! ```python
//! # learning rate schedule
//! lr = 0.1
//! warmup = 5  # epochs
//! layers = [64, 64, 32]
//! depth = len_hint = 3
//! total = warmup * 2 + depth
//! ```
//!
//! Expressions may refer to earlier variables. Statements we do not model (`import`, `def`, `if`, ...)
//! are kept as raw text so that they survive rewriting, but a variant containing one cannot be evaluated.
//!
//! ### Parsing
//!
//! see [parser::parse]
//!
//! The text is tokenized with [logos] ([lexer]) and parsed into a [StatementSequence]. Comments, blank lines and
//! source line numbers are kept, so that rendering the sequence gives back a file a human recognizes.
//!
//! ### Overriding
//!
//! see [rewrite::rewrite]
//!
//! Given `{warmup: 10}` the right-hand side of `warmup = 5` is replaced by the literal `10`. Nothing else changes:
//! `total` is still `warmup * 2 + depth` and picks up the new value on evaluation.
//! Overrides that match no assignment are appended at the end.
//!
//! Two shapes are rejected by default because there is no single right-hand side to replace:
//! - tuple assignment `a, b = 1, 2`
//! - assigning the same name twice
//!
//! ### Grids
//!
//! see [grid::expand]
//!
//! A [GridSpec] maps variable names to lists of candidates. Its cartesian product is a list of override
//! mappings, one per combination.
//!
//! ### Variants
//!
//! A [VariantCollection] holds one rewritten [Variant] per grid combination. Fixed overrides are applied on top of
//! every combination.
//!
//! | **grid**       | **fixed**     | **variant**                         |
//! |----------------|---------------|-------------------------------------|
//! | `lr = 0.1`     | `warmup = 10` | `lr = 0.1`, `warmup = 10`, ...      |
//! | `lr = 0.01`    | `warmup = 10` | `lr = 0.01`, `warmup = 10`, ...     |
//!
//! A variant renders and evaluates lazily; both results are cached. Iterating a collection hands out copies, the
//! stored variants never change.
//!
//! ### Evaluation
//!
//! see [eval::Interpreter]
//!
//! The rendered text is parsed again and interpreted top to bottom in a fresh environment. Arithmetic follows Python
//! (floor division, integer overflow is an error instead of a bigint). Errors name the Python error class and the line
//! in the rendered text.
//!
//! ### Output
//!
//! Evaluated bindings are [value::Value]s which in turn get serialized via [serde].
//!
pub mod collection;
mod error;
pub mod eval;
pub mod grid;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod rewrite;
pub mod statement;
pub mod value;
pub mod variant;

pub use collection::{VariantCollection, VariantKey};
pub use error::Error;
pub use eval::{parse_assignments, Bindings, InterpretationError};
pub use grid::{GridSpec, GridSpecError};
pub use rewrite::{OverrideMapping, RewriteError, RewriteOptions};
pub use statement::StatementSequence;
pub use variant::Variant;
