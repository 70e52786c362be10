//! Variants of one configuration, one per grid combination
//!
//! For every combination of the grid:
//! 1. clone the parsed configuration
//! 2. merge the combination with the fixed overrides (fixed overrides win)
//! 3. [rewrite] the clone and store it as a [Variant] under the combination
//!
//! Iterating a collection hands out deep copies, so whatever a caller does with a
//! yielded [Variant] is never seen by the collection or by the next pass.
use crate::error::Error;
use crate::grid::{self, GridSpec};
use crate::parser;
use crate::rewrite::{rewrite, OverrideMapping, RewriteOptions};
use crate::statement::StatementSequence;
use crate::value::Value;
use crate::variant::Variant;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// Grid values of a single variant, in grid order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantKey(pub Vec<(String, Value)>);

impl VariantKey {
    pub fn to_mapping(&self) -> OverrideMapping {
        self.0.iter().cloned().collect()
    }

    fn normalized(&self) -> Vec<(String, KeyPart)> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), KeyPart::from(value)))
            .collect()
    }
}

/// Hashable form of a grid value
///
/// Values that compare equal in a configuration (`1`, `1.0`, `True`) normalize to
/// the same part, maps compare regardless of order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Int(i64),
    /// Bit pattern of a float that has no integer equivalent
    Float(u64),
    Str(String),
    List(Vec<KeyPart>),
    Map(Vec<(String, KeyPart)>),
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Boolean(b) => KeyPart::Int(*b as i64),
            Value::Integer(i) => KeyPart::Int(*i),
            Value::Decimal(d)
                if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d < i64::MAX as f64 =>
            {
                KeyPart::Int(*d as i64)
            }
            Value::Decimal(d) => KeyPart::Float(d.to_bits()),
            Value::String(s) => KeyPart::Str(s.clone()),
            Value::List(items) => KeyPart::List(items.iter().map(KeyPart::from).collect()),
            Value::Map(map) => {
                let mut entries: Vec<_> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), KeyPart::from(v)))
                    .collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                KeyPart::Map(entries)
            }
        }
    }
}

impl From<OverrideMapping> for VariantKey {
    fn from(mapping: OverrideMapping) -> Self {
        Self(mapping.into_iter().collect())
    }
}

impl Display for VariantKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariantCollection {
    variants: IndexMap<Vec<(String, KeyPart)>, (VariantKey, Variant)>,
}

/// Configures how a [VariantCollection] is built
#[derive(Debug, Clone, Default)]
pub struct Builder {
    grid: GridSpec,
    overrides: OverrideMapping,
    options: RewriteOptions,
}

impl Builder {
    pub fn grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Fixed overrides, applied to every variant
    pub fn overrides(mut self, overrides: OverrideMapping) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse `text` and build the collection
    pub fn build(self, text: &str) -> Result<VariantCollection, Error> {
        let statements = parser::parse(text)?;
        self.build_from_statements(statements)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_from_statements(
        self,
        statements: StatementSequence,
    ) -> Result<VariantCollection, Error> {
        let grid = grid::expand(&self.grid)?;
        let mut collection = VariantCollection::default();

        for combination in &grid {
            let mut overrides = combination.clone();
            overrides.extend(self.overrides.clone());

            let rewritten = rewrite(statements.clone(), overrides, self.options)?;
            let key = VariantKey::from(combination);

            for name in &rewritten.appended {
                tracing::warn!(%name, variant=%key, "variable was not in the configuration, appended it");
            }
            tracing::debug!(variant=%key, "built variant");

            collection.insert(key, Variant::new(rewritten.statements));
        }

        Ok(collection)
    }
}

impl VariantCollection {
    /// Parse `text` and build one variant per combination of `grid`
    pub fn new(text: &str, grid: &GridSpec, overrides: &OverrideMapping) -> Result<Self, Error> {
        Self::builder()
            .grid(grid.clone())
            .overrides(overrides.clone())
            .build(text)
    }

    /// Same as [VariantCollection::new] for an already parsed configuration
    pub fn from_statements(
        statements: StatementSequence,
        grid: &GridSpec,
        overrides: &OverrideMapping,
    ) -> Result<Self, Error> {
        Self::builder()
            .grid(grid.clone())
            .overrides(overrides.clone())
            .build_from_statements(statements)
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Store `variant` under `key`
    ///
    /// An equal key keeps its position and gets the new variant.
    fn insert(&mut self, key: VariantKey, variant: Variant) {
        match self.variants.entry(key.normalized()) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = variant,
            Entry::Vacant(entry) => {
                entry.insert((key, variant));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variant whose grid values compare equal to `key`
    pub fn get(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants
            .get(&key.normalized())
            .map(|(_, variant)| variant)
    }

    pub fn keys(&self) -> impl Iterator<Item = &VariantKey> {
        self.variants.values().map(|(key, _)| key)
    }

    /// Deep copy of every variant with its grid values, in build order
    pub fn iter(&self) -> IntoIter {
        self.clone().into_iter()
    }
}

impl IntoIterator for VariantCollection {
    type Item = (OverrideMapping, Variant);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.variants.into_values(),
        }
    }
}

impl IntoIterator for &VariantCollection {
    type Item = (OverrideMapping, Variant);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug)]
pub struct IntoIter {
    inner: indexmap::map::IntoValues<Vec<(String, KeyPart)>, (VariantKey, Variant)>,
}

impl Iterator for IntoIter {
    type Item = (OverrideMapping, Variant);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, variant)| (key.to_mapping(), variant))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}
