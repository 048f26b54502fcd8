use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cda2fhir_core::constants::ID_STRATEGY_ENV;
use cda2fhir_core::{id_strategy_from_env_value, CcdaTransformer, CoreConfig};
use cda2fhir_uuid::IdStrategy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Ids {
    Uuid,
    Counter,
}

impl From<Ids> for IdStrategy {
    fn from(ids: Ids) -> Self {
        match ids {
            Ids::Uuid => IdStrategy::Uuid,
            Ids::Counter => IdStrategy::Counter,
        }
    }
}

#[derive(Parser)]
#[command(name = "cda2fhir")]
#[command(about = "Convert a C-CDA document into a FHIR collection bundle")]
struct Cli {
    /// C-CDA document to convert (YAML or JSON)
    #[arg(long, short)]
    input: PathBuf,
    /// Input format (inferred from the file extension if omitted)
    #[arg(long, value_enum)]
    format: Option<InputFormat>,
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    output_format: OutputFormat,
    /// Write the bundle here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Identity strategy (overrides CDA2FHIR_ID_STRATEGY)
    #[arg(long, value_enum)]
    ids: Option<Ids>,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn input_format(path: &Path, explicit: Option<InputFormat>) -> anyhow::Result<InputFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Ok(InputFormat::Yaml),
        Some("json") => Ok(InputFormat::Json),
        _ => anyhow::bail!(
            "cannot infer the format of {}; pass --format yaml|json",
            path.display()
        ),
    }
}

/// Converts one document and writes the resulting bundle.
///
/// # Environment Variables
/// - `CDA2FHIR_ID_STRATEGY`: `uuid` (default) or `counter`; `--ids` takes precedence
/// - `RUST_LOG`: tracing filter (default: `cda2fhir=info`)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cda2fhir=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let id_strategy = match cli.ids {
        Some(ids) => ids.into(),
        None => id_strategy_from_env_value(std::env::var(ID_STRATEGY_ENV).ok())?,
    };
    let cfg = Arc::new(CoreConfig::new(id_strategy, "0")?);
    let transformer = CcdaTransformer::new(cfg);

    let format = input_format(&cli.input, cli.format)?;
    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    tracing::info!(input = %cli.input.display(), ?format, ?id_strategy, "converting");
    let bundle = match format {
        InputFormat::Yaml => transformer.convert_yaml(&text),
        InputFormat::Json => transformer.convert_json(&text),
    }
    .with_context(|| format!("converting {}", cli.input.display()))?;

    let rendered = match cli.output_format {
        OutputFormat::Json => bundle.render_json(cli.pretty)?,
        OutputFormat::Yaml => bundle.render_yaml()?,
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
