use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tsgen_core::{codegen::write_to_disk, ir::IrSpec, parse::Document};

mod config;

use self::config::{Codegen, Command, Main};

fn main() -> Result<()> {
    let Ok(main) = Main::parse().map_err(|err| err.exit());
    init_tracing(main.verbose);

    match main.command {
        Command::Codegen(command) => codegen(command)?,
    }

    Ok(())
}

/// Logs to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn codegen(command: Codegen) -> Result<()> {
    let Codegen {
        input,
        output,
        client,
        options,
    } = command;

    tracing::debug!(input = %input.display(), client, max_depth = options.max_depth, "codegen");

    let source = std::fs::read_to_string(&input)
        .into_diagnostic()
        .with_context(|| format!("Failed to read `{}`", input.display()))?;

    let doc = parse(&input, &source).context("Failed to parse OpenAPI document")?;

    println!("OpenAPI: {} (version {})", doc.info.title, doc.info.version);

    let spec = IrSpec::from_doc_with_options(&doc, options)
        .context("Failed to resolve OpenAPI document")?;

    println!(
        "Generating {} schemas and {} operations...",
        spec.schemas.len(),
        spec.operations.len(),
    );

    // Render everything before writing anything.
    let files = tsgen_codegen_typescript::render(&spec, client)?;

    println!("Writing generated code to `{}`...", output.display());
    for file in files {
        println!("Writing `{}`...", file.0);
        write_to_disk(&output, file)?;
    }

    println!("Generation complete");

    Ok(())
}

/// Parses JSON documents by extension, and everything else as YAML.
fn parse(path: &Path, source: &str) -> Result<Document> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc = if is_json {
        Document::from_json(source)?
    } else {
        Document::from_yaml(source)?
    };
    Ok(doc)
}
