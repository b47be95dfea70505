// System status display — artifact location, load state, available scorers.

use std::path::Path;

use colored::Colorize;

use crate::artifacts::loader::{CATALOG_FILE, EMBEDDINGS_FILE, POPULARITY_FILE, SIMILARITY_FILE};
use crate::engine::Recommender;

/// Display engine status to the terminal.
pub fn show(engine: &Recommender, artifact_dir: &Path) {
    println!("Artifacts: {}", artifact_dir.display());
    for file in [CATALOG_FILE, EMBEDDINGS_FILE, SIMILARITY_FILE, POPULARITY_FILE] {
        let path = artifact_dir.join(file);
        let size = std::fs::metadata(&path)
            .map(|m| format_bytes(m.len()))
            .unwrap_or_else(|_| "missing".to_string());
        println!("  {file:<22} {size}");
    }

    let status = engine.status();
    if !status.available {
        println!("Engine: {}", "unavailable".red().bold());
        if let Some(reason) = status.reason {
            println!("  Reason: {reason}");
        }
        println!("\nFix the artifacts above and restart to serve recommendations.");
        return;
    }

    println!("Engine: {}", "ready".green().bold());
    println!(
        "  Catalog: {} movies ({} distinct titles)",
        status.items, status.distinct_titles
    );
    match status.embedding_dim {
        Some(dim) => println!("  Embeddings: {dim}-dim"),
        None => println!("  Embeddings: not loaded"),
    }
    println!(
        "  Popularity: {}",
        if status.has_popularity {
            "loaded"
        } else {
            "not loaded"
        }
    );
    let scorers: Vec<&str> = status.scorers.iter().map(|s| s.as_str()).collect();
    println!("  Scorers: {}", scorers.join(", "));
    println!("  Loaded at: {}", status.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
