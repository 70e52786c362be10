//! Grid expansion
//!
//! Given a list of candidate values per variable:
//! - `lr = [0.1, 0.01]`
//! - `depth = [2, 4]`
//!
//! yields one override mapping per combination (cartesian product), the last
//! variable varying fastest:
//! - `{lr: 0.1, depth: 2}`
//! - `{lr: 0.1, depth: 4}`
//! - `{lr: 0.01, depth: 2}`
//! - `{lr: 0.01, depth: 4}`
use crate::rewrite::OverrideMapping;
use crate::value::Value;
use indexmap::IndexMap;

/// Variable name to candidate values, each value must be a [Value::List]
pub type GridSpec = IndexMap<String, Value>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("error parsing `{key}: {value}`, expected a list but found {}", .value.type_name())]
pub struct GridSpecError {
    pub key: String,
    pub value: Value,
}

/// Validated grid, iterate `&Grid` for its combinations
///
/// Iteration can be restarted any number of times and never modifies the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    axes: Vec<(String, Vec<Value>)>,
}

/// Validate `spec` into a [Grid]
pub fn expand(spec: &GridSpec) -> Result<Grid, GridSpecError> {
    let axes = spec
        .iter()
        .map(|(key, value)| match value {
            Value::List(candidates) => Ok((key.clone(), candidates.clone())),
            other => Err(GridSpecError {
                key: key.clone(),
                value: other.clone(),
            }),
        })
        .collect::<Result<_, _>>()?;

    Ok(Grid { axes })
}

impl Grid {
    /// Number of combinations
    ///
    /// An empty grid has exactly one (empty) combination, a grid with an empty
    /// candidate list has none.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|(_, candidates)| candidates.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            grid: self,
            indices: vec![0; self.axes.len()],
            remaining: self.len(),
        }
    }
}

impl<'g> IntoIterator for &'g Grid {
    type Item = OverrideMapping;
    type IntoIter = Combinations<'g>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over all combinations of a [Grid]
#[derive(Debug, Clone)]
pub struct Combinations<'g> {
    grid: &'g Grid,
    /// Current candidate per axis
    indices: Vec<usize>,
    remaining: usize,
}

impl Iterator for Combinations<'_> {
    type Item = OverrideMapping;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let combination = self
            .grid
            .axes
            .iter()
            .zip(&self.indices)
            .map(|((key, candidates), index)| (key.clone(), candidates[*index].clone()))
            .collect();

        // odometer step, rightmost axis first
        for (index, (_, candidates)) in self.indices.iter_mut().zip(&self.grid.axes).rev() {
            *index += 1;
            if *index < candidates.len() {
                break;
            }
            *index = 0;
        }

        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(entries: Vec<(&str, Value)>) -> GridSpec {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn ints(values: &[i64]) -> Value {
        Value::from(values.to_vec())
    }

    fn render(grid: &Grid) -> Vec<String> {
        grid.iter()
            .map(|combination| {
                combination
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }

    #[test]
    fn cartesian_product_in_order() {
        let grid = expand(&spec(vec![("a", ints(&[1, 2])), ("b", Value::from(vec!["x", "y", "z"]))]))
            .unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(
            render(&grid),
            vec![
                "a=1,b='x'", "a=1,b='y'", "a=1,b='z'", "a=2,b='x'", "a=2,b='y'", "a=2,b='z'",
            ]
        );
    }

    #[test]
    fn empty_spec_yields_one_empty_combination() {
        let grid = expand(&GridSpec::new()).unwrap();
        let combinations: Vec<_> = grid.iter().collect();
        assert_eq!(combinations, vec![OverrideMapping::new()]);
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        let grid = expand(&spec(vec![("a", ints(&[1, 2])), ("b", ints(&[]))])).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn restartable() {
        let grid = expand(&spec(vec![("a", ints(&[1, 2, 3]))])).unwrap();
        assert_eq!(render(&grid), render(&grid));
        assert_eq!(grid.iter().len(), 3);
    }

    #[test]
    fn scalar_is_rejected() {
        let err = expand(&spec(vec![("a", ints(&[1])), ("b", Value::Integer(5))])).unwrap_err();
        assert_eq!(err.key, "b");
        assert_eq!(err.value, Value::Integer(5));
        assert_eq!(
            err.to_string(),
            "error parsing `b: 5`, expected a list but found int"
        );

        // strings are not swept character by character
        let err = expand(&spec(vec![("c", Value::from("abc"))])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing `c: 'abc'`, expected a list but found str"
        );
    }
}
