// Colored terminal output for recommendations and evaluation reports.
//
// main.rs delegates all display work here so the command handlers stay
// focused on orchestration.

use colored::Colorize;

use super::fit_width;
use crate::engine::RecommendedMovie;
use crate::evaluation::{EvaluationReport, Histogram};

/// Width of the histogram bar for the fullest bin.
const BAR_WIDTH: usize = 40;

/// Display a ranked recommendation list.
pub fn display_recommendations(query: &str, scorer: &str, movies: &[RecommendedMovie]) {
    println!(
        "\n{}",
        format!("=== Because you liked \"{}\" ({scorer}) ===", query.trim()).bold()
    );
    println!();

    if movies.is_empty() {
        println!("  No similar movies in the catalog.");
        return;
    }

    println!(
        "  {:>4}  {:<44} {:>8}  {:>7}",
        "Rank".dimmed(),
        "Title".dimmed(),
        "TMDB id".dimmed(),
        "Score".dimmed(),
    );
    println!("  {}", "-".repeat(68).dimmed());

    for (i, movie) in movies.iter().enumerate() {
        println!(
            "  {:>4}. {:<44} {:>8}  {}",
            i + 1,
            fit_width(&movie.title, 44),
            movie.external_id,
            colorize_score(movie.score),
        );
        if let Some(url) = &movie.poster_url {
            println!("        {}", url.dimmed());
        }
    }
    println!();
}

/// Display an evaluation summary with text histograms of precision and raw
/// similarity scores.
pub fn display_evaluation(report: &EvaluationReport, histogram: &Histogram) {
    println!(
        "\n{}",
        format!(
            "=== Genre Consistency (precision@{}, {} scorer) ===",
            report.k, report.scorer
        )
        .bold()
    );
    println!();
    println!("  Sampled items:          {}", report.sampled);
    println!("  Scored items:           {}", report.scored());
    println!(
        "  Skipped (no genres):    {}",
        if report.skipped_empty_genres > 0 {
            report.skipped_empty_genres.to_string().yellow().to_string()
        } else {
            "0".to_string()
        }
    );

    let mean_pct = format!("{:.2}%", report.mean * 100.0);
    let colored_mean = if report.mean >= 0.75 {
        mean_pct.bright_green()
    } else if report.mean >= 0.5 {
        mean_pct.bright_yellow()
    } else {
        mean_pct.bright_red()
    };
    println!("  Mean precision:         {}", colored_mean.bold());
    println!();

    print_bars("Precision distribution:", histogram);

    let similarity = &report.similarity_distribution;
    print_bars(
        &format!("Similarity scores ({} sampled):", similarity.total()),
        similarity,
    );
}

/// Text bar chart, one row per bin. Prints nothing for an empty histogram.
fn print_bars(title: &str, histogram: &Histogram) {
    if histogram.total() == 0 {
        return;
    }

    println!("  {}", title.dimmed());
    let peak = histogram.counts().iter().copied().max().unwrap_or(0).max(1);
    for (lower, upper, count) in histogram.bins() {
        let filled = (count * BAR_WIDTH).div_ceil(peak);
        println!(
            "  {:>4.1} to {:>4.1} |{:<width$}| {}",
            lower,
            upper,
            "#".repeat(filled).bright_blue(),
            count,
            width = BAR_WIDTH
        );
    }
    println!();
}

/// Display catalog titles, one per line, numbered by position.
pub fn display_titles(titles: &[(usize, &str)]) {
    if titles.is_empty() {
        println!("No matching titles.");
        return;
    }
    for (position, title) in titles {
        println!("  {:>6}  {}", position.to_string().dimmed(), title);
    }
    println!("\n  {} titles", titles.len());
}

fn colorize_score(score: f64) -> colored::ColoredString {
    let s = format!("{score:>7.4}");
    if score >= 0.75 {
        s.green()
    } else if score >= 0.4 {
        s.yellow()
    } else {
        s.normal()
    }
}
