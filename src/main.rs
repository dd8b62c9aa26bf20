use std::{env, path::PathBuf, process};

use arf_export::{
    export::{ExportOptions, Severity, export_to_file},
    init_logging,
    settings::load_export_settings,
};

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: arf-export <scene.json> <output.zip> [settings.json]");
        process::exit(2);
    }

    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    let options = match args.get(3) {
        Some(path) => load_export_settings(&PathBuf::from(path))?,
        None => ExportOptions::default(),
    };

    let report = export_to_file(&input, &output, options)?;

    println!("Avatar: {}", report.avatar_name);
    println!(
        "Assets: {}, Meshes: {}, Skins: {}, Skeletons: {}",
        report.asset_count, report.mesh_count, report.skin_count, report.skeleton_count
    );
    println!(
        "Blendshapes: {}, Animations: {}, Textures: {}",
        report.blendshape_count, report.animation_count, report.texture_count
    );
    println!(
        "Vertices: {}, Faces: {}",
        report.total_vertices, report.total_faces
    );
    println!(
        "AnimationLinks: {} ({} unmatched)",
        report.animation_links.len(),
        report.unmatched_sources.len()
    );
    for issue in report
        .issues
        .iter()
        .filter(|issue| issue.severity != Severity::Info)
    {
        println!("{}", issue.message);
    }
    println!("Written: {}", output.display());

    Ok(())
}
