//! Snapshot tests
//!
//! Loads each *.py file in /tests/ individually and compares the evaluated
//! bindings of every variant. A `<name>.grid.yaml` next to the file is used as
//! the grid.

use confgrid::{Bindings, GridSpec, OverrideMapping, VariantCollection};

#[derive(serde::Serialize)]
struct Evaluated {
    grid: OverrideMapping,
    config: Bindings,
}

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFGRID_LOG"))
        .with_writer(std::io::stderr)
        .init();

    insta::glob!("*.py", |path| {
        let text = std::fs::read_to_string(path).unwrap();

        let grid_path = path.with_extension("grid.yaml");
        let grid: GridSpec = if grid_path.exists() {
            serde_yaml::from_str(&std::fs::read_to_string(grid_path).unwrap()).unwrap()
        } else {
            GridSpec::new()
        };

        let collection = VariantCollection::new(&text, &grid, &OverrideMapping::new())
            .expect("must be a valid configuration");

        let evaluated: Vec<_> = collection
            .iter()
            .map(|(grid, variant)| Evaluated {
                grid,
                config: variant.evaluate().expect("valid variant").clone(),
            })
            .collect();

        insta::assert_snapshot!(serde_json::to_string_pretty(&evaluated).unwrap());
    });
}
