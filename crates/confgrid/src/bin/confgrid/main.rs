mod cli;

use confgrid::{
    Bindings, GridSpec, OverrideMapping, RewriteOptions, VariantCollection, VariantKey,
};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFGRID_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Evaluate(evaluate_cli) => evaluate(evaluate_cli),
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

/// One evaluated variant as printed by `confgrid evaluate`
#[derive(serde::Serialize, Debug)]
struct Evaluated {
    grid: OverrideMapping,
    config: Bindings,
}

pub fn evaluate(cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    let collection = build(&cli.input, &cli.grid)?;

    let evaluated = collection
        .iter()
        .map(|(grid, variant)| {
            let config = variant.evaluate()?.clone();
            Ok(Evaluated { grid, config })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    match cli.output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &evaluated)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), &evaluated)?,
    };

    Ok(())
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let collection = build(&cli.input, &cli.grid)?;

    for (i, (grid, variant)) in collection.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("# variant: {}", VariantKey::from(grid));
        print!("{}", variant.render());
    }

    Ok(())
}

fn build(input: &cli::InputArgs, grid: &cli::GridArgs) -> anyhow::Result<VariantCollection> {
    let text = load(input)?;

    let mut grid_spec = GridSpec::new();
    if let Some(path) = &grid.grid_file {
        let grid_text = confgrid::loader::load(path)?;
        let from_file: GridSpec = serde_yaml::from_str(&grid_text)?;
        grid_spec.extend(from_file);
    }
    grid_spec.extend(confgrid::parse_assignments(
        grid.grid.iter().map(String::as_str),
        Bindings::new(),
    )?);

    let overrides =
        confgrid::parse_assignments(grid.set.iter().map(String::as_str), Bindings::new())?;

    let collection = VariantCollection::builder()
        .grid(grid_spec)
        .overrides(overrides)
        .options(RewriteOptions {
            allow_double_assignment: grid.allow_double_assignment,
            allow_tuple_assignment: grid.allow_tuple_assignment,
        })
        .build(&text)?;

    tracing::info!(variants = collection.len(), "built variants");
    Ok(collection)
}

fn load(input: &cli::InputArgs) -> anyhow::Result<String> {
    match &input.file {
        Some(path) => Ok(confgrid::loader::load(path)?),
        None => Ok(std::io::read_to_string(std::io::stdin())?),
    }
}

/// (confgrid-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let text = load(&cli.input)?;
    let statements = confgrid::parser::parse(&text)?;

    match cli.command {
        Statements => println!("{statements:#?}"),
    }

    Ok(())
}
