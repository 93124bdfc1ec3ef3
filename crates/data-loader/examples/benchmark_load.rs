use anyhow::Context;
use data_loader::Dataset;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let movies = Path::new("data/movies.csv");
    let ratings = Path::new("data/ratings.csv");

    println!("Loading MovieLens dataset...\n");

    let start = Instant::now();
    let dataset = Dataset::load_from_files(movies, ratings).context("Failed to load dataset")?;
    let elapsed = start.elapsed();

    let stats = dataset.dataset_stats();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", stats.unique_users);
    println!("Movies: {}", stats.unique_movies);
    println!("Ratings: {}", stats.total_ratings);
    println!(
        "\nPerformance: {:.0} ratings/second",
        stats.total_ratings as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
