//! scholia CLI: create, fetch, delete, and search annotations against a
//! configured LDP store and search core.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use scholia::config::Config;
use scholia::graph::jsonld::ContextFlavor;
use scholia::graph::{AnnotationGraph, WireFormat};
use scholia::repo::AnnotationRepo;

#[derive(Parser)]
#[command(name = "scholia", version, about = "Open Annotation store core")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an annotation from a wire-format file.
    Create {
        /// Path to the annotation payload.
        #[arg(long)]
        file: PathBuf,

        /// Payload media type.
        #[arg(long, default_value = "text/turtle")]
        format: String,
    },

    /// Fetch an annotation by id.
    Get {
        id: String,

        /// Output media type (`application/ld+json` variants select the OA
        /// generic context; use --context to switch).
        #[arg(long, default_value = "text/turtle")]
        format: String,

        /// JSON-LD context flavor: oa-dated, oa, or iiif.
        #[arg(long, default_value = "oa")]
        context: String,
    },

    /// Delete an annotation by id.
    Delete { id: String },

    /// Search annotations with key=value parameters
    /// (targetUri, bodyUri, bodyExact, bodyKeyword, motivatedBy, anno_root).
    Search {
        /// Parameters as key=value pairs.
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };
    let repo = AnnotationRepo::new(config)?;

    match cli.command {
        Commands::Create { file, format } => {
            let format = parse_format(&format)?;
            let data = std::fs::read(&file).into_diagnostic()?;
            let anno = AnnotationGraph::from_wire(&data, format)?;
            let created = repo.create(&anno)?;
            println!("{}", created.id);
        }
        Commands::Get {
            id,
            format,
            context,
        } => {
            let anno = repo.find(&id)?;
            let output = match parse_format(&format)? {
                WireFormat::JsonLd => anno.to_jsonld(parse_context(&context)?)?,
                other => anno.to_wire(other)?,
            };
            println!("{output}");
        }
        Commands::Delete { id } => {
            repo.delete(&id)?;
            println!("deleted {id}");
        }
        Commands::Search { params } => {
            let pairs = parse_params(&params)?;
            let docs = repo.search(&pairs)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&docs).into_diagnostic()?
            );
        }
    }
    Ok(())
}

fn parse_format(media_type: &str) -> Result<WireFormat> {
    WireFormat::from_media_type(media_type)
        .ok_or_else(|| miette::miette!("unsupported format: {media_type}"))
}

fn parse_context(name: &str) -> Result<ContextFlavor> {
    match name {
        "oa-dated" => Ok(ContextFlavor::OaDated),
        "oa" => Ok(ContextFlavor::OaGeneric),
        "iiif" => Ok(ContextFlavor::Iiif),
        other => Err(miette::miette!(
            "unknown context flavor {other}; expected oa-dated, oa, or iiif"
        )),
    }
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| miette::miette!("expected key=value, got {p:?}"))
        })
        .collect()
}
