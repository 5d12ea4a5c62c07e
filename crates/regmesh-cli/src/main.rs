use anyhow::Result;
use clap::{Parser, Subcommand};

mod mesh;
mod register;

use mesh::MeshArgs;
use register::RegisterArgs;

#[derive(Parser)]
#[command(name = "regmesh")]
#[command(version, about = "Translation registration and rectilinear FEM meshing of 2D images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a moving image onto a fixed image with a translation
    Register(RegisterArgs),

    /// Build a rectilinear quadrilateral mesh over an image and check it
    Mesh(MeshArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Register(args) => register::run(args),
        Commands::Mesh(args) => mesh::run(args),
    }
}
