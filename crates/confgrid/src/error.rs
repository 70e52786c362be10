use crate::grid::GridSpecError;
use crate::parser::ParseError;
use crate::rewrite::RewriteError;

/// Building a [crate::VariantCollection] failed
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unable to parse configuration")]
    Parse(#[from] ParseError),
    #[error("unable to apply overrides")]
    Rewrite(#[from] RewriteError),
    #[error("invalid grid")]
    Grid(#[from] GridSpecError),
}
