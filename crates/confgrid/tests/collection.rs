//! Public API usage: parse strings, override a file, sweep a grid

use confgrid::value::Value;
use confgrid::{
    parse_assignments, Bindings, Error, GridSpec, OverrideMapping, RewriteError, VariantCollection,
};
use pretty_assertions::assert_eq;

fn mapping<const N: usize>(entries: [(&str, Value); N]) -> OverrideMapping {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[test]
fn parse_strings() {
    assert_eq!(
        parse_assignments(["a=2"], Bindings::new()).unwrap(),
        mapping([("a", Value::Integer(2))])
    );
    assert_eq!(
        parse_assignments(["a=2", "b=4"], mapping([("c", Value::Integer(3))])).unwrap(),
        mapping([
            ("c", Value::Integer(3)),
            ("a", Value::Integer(2)),
            ("b", Value::Integer(4)),
        ])
    );
    assert_eq!(
        parse_assignments(["a=c*2"], mapping([("c", Value::Integer(3))])).unwrap()["a"],
        Value::Integer(6)
    );
}

#[test]
fn grid_from_command_line_strings() {
    let grid = parse_assignments(["lr=[0.1, 0.01]", "depth=[2, 4]"], Bindings::new()).unwrap();
    let collection = VariantCollection::new(
        "lr = 1.0\ndepth = 1\nwidth = depth * 32\n",
        &grid,
        &OverrideMapping::new(),
    )
    .unwrap();

    let widths: Vec<_> = collection
        .iter()
        .map(|(_, variant)| variant.evaluate().unwrap()["width"].clone())
        .collect();
    assert_eq!(
        widths,
        vec![
            Value::Integer(64),
            Value::Integer(128),
            Value::Integer(64),
            Value::Integer(128)
        ]
    );
}

#[test]
fn overrides_keep_the_rest_of_the_file() {
    let text = "# model\nhidden = 128  # units\nactivation = 'relu'\n";
    let collection = VariantCollection::new(
        text,
        &GridSpec::new(),
        &mapping([("hidden", Value::Integer(256))]),
    )
    .unwrap();

    let (grid, variant) = collection.iter().next().unwrap();
    assert!(grid.is_empty());
    assert_eq!(
        variant.render(),
        "# model\nhidden = 256  # units\nactivation = 'relu'\n"
    );
}

#[test]
fn evaluation_errors_name_the_line() {
    let collection = VariantCollection::new(
        "a = 1\nb = a / zero\n",
        &GridSpec::new(),
        &OverrideMapping::new(),
    )
    .unwrap();
    let (_, variant) = collection.iter().next().unwrap();

    let err = variant.evaluate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "NameError at line 2 of rendered variant: name 'zero' is not defined\na = 1\nb = a / zero\n"
    );
}

#[test]
fn tuple_assignment_is_rejected() {
    let err = VariantCollection::new("a, b = 1, 2\n", &GridSpec::new(), &OverrideMapping::new())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Rewrite(RewriteError::TupleAssignment { .. })
    ));
}
