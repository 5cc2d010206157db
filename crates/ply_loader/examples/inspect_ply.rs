//! Example: Parse and inspect an ASCII PLY file.
//!
//! Run with: cargo run --example inspect_ply -- point_cloud.ply [--skip-blank-lines]

use std::env;

use anyhow::{Context, Result};
use ply_loader::{parse_header, parse_with_options, LoadOptions};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_ply <path-to-ply-file> [--skip-blank-lines]");
        return Ok(());
    }

    let path = &args[1];
    let mut options = LoadOptions::default();
    if args.iter().skip(2).any(|a| a == "--skip-blank-lines") {
        options = options.skip_blank_lines();
    }

    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path))?;

    println!("=== Header ===");
    match parse_header(&String::from_utf8_lossy(&bytes)) {
        Ok(header) => println!("{}", serde_json::to_string_pretty(&header)?),
        Err(e) => println!("  {}", e),
    }

    let geometry = parse_with_options(&bytes, &options)?;
    if geometry.is_empty() {
        println!("\nNo geometry decoded (unsupported format)");
        return Ok(());
    }

    println!("\n=== Geometry: {} vertices ===", geometry.vertex_count());
    for (name, attribute) in geometry.iter() {
        println!(
            "  {} - item size {}, {} values",
            name,
            attribute.item_size,
            attribute.data.len()
        );
    }

    if let Some(bounds) = geometry.bounds() {
        println!("\n--- Bounds ---");
        println!(
            "  Min: ({:.2}, {:.2}, {:.2})",
            bounds.min.x, bounds.min.y, bounds.min.z
        );
        println!(
            "  Max: ({:.2}, {:.2}, {:.2})",
            bounds.max.x, bounds.max.y, bounds.max.z
        );
        println!("  Size: {:.2}", bounds.size());
    }

    Ok(())
}
