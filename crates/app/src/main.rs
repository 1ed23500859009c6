//! Entry point for `meshload`: loads an OBJ mesh into an interleaved
//! vertex buffer and reports what an upload sink would receive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset::{FaceMode, LoadOptions, LoadedMesh, NormalPolicy, VertexLayout};
use clap::Parser;

/// Load a Wavefront OBJ mesh into a flat, 8-float-stride vertex buffer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the .obj file to load
    mesh: PathBuf,

    /// Allow faces without normals (zero-filled) instead of failing the load
    #[arg(long)]
    optional_normals: bool,

    /// Fan-triangulate faces with more than three vertices
    #[arg(long)]
    triangulate: bool,

    /// Print every emitted vertex
    #[arg(long)]
    dump: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let normals = if self.optional_normals {
            NormalPolicy::Optional
        } else {
            NormalPolicy::Required
        };
        let faces = if self.triangulate {
            FaceMode::TriangleFan
        } else {
            FaceMode::AsAuthored
        };
        LoadOptions::default().with_normals(normals).with_faces(faces)
    }
}

fn report(mesh: &LoadedMesh, dump: bool) {
    let layout = VertexLayout::INTERLEAVED;
    println!(
        "faces={} vertices={} floats={} bytes={}",
        mesh.stats.faces,
        mesh.stats.vertices,
        mesh.buffer.as_slice().len(),
        mesh.buffer.as_bytes().len()
    );
    println!(
        "layout: stride={} ({} bytes), position@{}, texcoord@{}, normal@{}",
        layout.stride,
        layout.stride_bytes(),
        layout.position.offset,
        layout.tex_coord.offset,
        layout.normal.offset
    );

    if dump {
        for (i, v) in mesh.buffer.vertices().iter().enumerate() {
            println!(
                "{:6}: p={:?} uv={:?} n={:?}",
                i, v.position, v.tex_coord, v.normal
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.load_options();
    log::info!(
        "Loading {} (normals={:?}, faces={:?})",
        cli.mesh.display(),
        options.normals,
        options.faces
    );

    let mesh = asset::load_obj_from_path_with(&cli.mesh, &options)
        .with_context(|| format!("Failed to load mesh: {}", cli.mesh.display()))?;

    report(&mesh, cli.dump);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_load_options() {
        let cli = Cli::parse_from(["meshload", "cube.obj", "--optional-normals", "--triangulate"]);
        let options = cli.load_options();
        assert_eq!(options.normals, NormalPolicy::Optional);
        assert_eq!(options.faces, FaceMode::TriangleFan);
    }

    #[test]
    fn defaults_require_normals() {
        let cli = Cli::parse_from(["meshload", "cube.obj"]);
        assert_eq!(cli.load_options(), LoadOptions::default());
    }
}
