//! Generate code from a UBX message catalogue.
//!
//! Usage:
//!   ubxgen [--template rust|dump] [--lenient-masks] < messages.xml > messages.rs
//!   ubxgen --input messages.xml --output messages.rs
//!
//! Output is written only after the whole catalogue compiled and rendered; on any
//! error a single diagnostic goes to stderr and the exit status is 1.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use ubxgen::{generate, GenerateOptions, MaskPolicy, Template};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TemplateArg {
    Rust,
    Dump,
}

impl From<TemplateArg> for Template {
    fn from(t: TemplateArg) -> Self {
        match t {
            TemplateArg::Rust => Template::Rust,
            TemplateArg::Dump => Template::Dump,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ubxgen")]
#[command(about = "Compile a UBX XML message catalogue into source code")]
struct Args {
    /// Output template
    #[arg(long, short, value_enum, default_value = "rust")]
    template: TemplateArg,

    /// Read the catalogue from FILE instead of stdin
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write generated code to FILE instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Treat unparsable bit indices as zero instead of failing
    #[arg(long)]
    lenient_masks: bool,

    /// Tool name recorded in the generated-file marker
    #[arg(long, default_value = "ubxgen")]
    tool_name: String,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let xml = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s).context("reading stdin")?;
            s
        }
    };

    let opts = GenerateOptions {
        template: args.template.into(),
        mask_policy: if args.lenient_masks {
            MaskPolicy::Lenient
        } else {
            MaskPolicy::Strict
        },
        tool_name: args.tool_name,
    };
    debug!(template = opts.template.name(), "generating");

    let defs = ubxgen::compile(&xml)?;
    for ((class, id), names) in defs.duplicate_discriminators() {
        warn!("class {:#04x} id {:#04x} shared by {}", class, id, names.join(", "));
    }
    let code = generate(&defs, &opts)?;

    match &args.output {
        Some(path) => std::fs::write(path, &code)
            .with_context(|| format!("writing {}", path.display()))?,
        None => io::stdout()
            .write_all(code.as_bytes())
            .context("writing stdout")?,
    }
    info!(messages = defs.len(), bytes = code.len(), "done");
    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
