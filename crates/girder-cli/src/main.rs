//! The `girder` binary: proof scripts in, SVA properties and a prover
//! driver script out.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use girder_codegen::{flat_to_proof_structure, flat_to_sva, flat_to_tasks, EmitOptions};
use girder_dsl::ast::ProofDocument;
use girder_engine::build;

#[derive(Parser)]
#[command(name = "girder")]
#[command(about = "Compile proof scripts into SVA assume-guarantee chains")]
#[command(version)]
struct Cli {
    /// Input proof-script file (repeatable)
    #[arg(long = "path", value_name = "FILE", required = true)]
    paths: Vec<PathBuf>,

    /// Lemma at which the proof begins
    #[arg(long, value_name = "NAME")]
    root: String,

    /// Step emitted as the assertion slice; -1 emits every step as an
    /// assertion
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    slice: isize,

    /// SystemVerilog output path
    #[arg(long, default_value = "out.sv", value_name = "PATH")]
    sv_out: PathBuf,

    /// TCL output path; omit to disable TCL generation
    #[arg(long, value_name = "PATH")]
    tcl_out: Option<PathBuf>,

    /// Emit task-based TCL instead of a proof_structure chain
    #[arg(long)]
    task: bool,

    /// Prefix each property with `@(posedge clk_i) disable iff (~rst_ni)`
    #[arg(long)]
    clocking: bool,

    /// Target line width for rendered properties
    #[arg(long, default_value_t = 100)]
    width: usize,
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut document = ProofDocument::default();
    for path in &cli.paths {
        let source = fs::read_to_string(path).into_diagnostic()?;
        girder_dsl::parse_document_into(&source, &mut document)?;
    }

    let flat = build(&document, &cli.root)?;

    let opts = EmitOptions {
        slice: cli.slice,
        line_width: cli.width,
        clocking: cli.clocking,
    };

    fs::write(&cli.sv_out, flat_to_sva(&flat, &opts)).into_diagnostic()?;
    tracing::info!("wrote {}", cli.sv_out.display());

    if let Some(tcl_out) = &cli.tcl_out {
        let tcl = if cli.task {
            flat_to_tasks(&flat)
        } else {
            flat_to_proof_structure(&flat)
        };
        fs::write(tcl_out, tcl).into_diagnostic()?;
        tracing::info!("wrote {}", tcl_out.display());
    }

    Ok(())
}
