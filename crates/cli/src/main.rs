use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Dataset, DatasetStats, MovieId, UserId, UserRatingCount};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use recommender::{
    DEFAULT_PLACEHOLDER_TITLE, DuplicatePolicy, Metric, MovieRecommendation, RecommendError,
    Recommendations, Recommender, RecommenderConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// movie-recs - item-based movie recommendations from a rating matrix
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie statistics and recommendations using collaborative filtering", long_about = None)]
struct Cli {
    /// Path to movies.csv (movieId,title,genres)
    #[arg(long, default_value = "data/movies.csv", global = true)]
    movies: PathBuf,

    /// Path to ratings.csv (userId,movieId,rating,timestamp)
    #[arg(long, default_value = "data/ratings.csv", global = true)]
    ratings: PathBuf,

    /// How repeated (user, movie) ratings are combined: last-write-wins or sum
    #[arg(long, default_value = "last-write-wins", global = true)]
    duplicates: DuplicatePolicy,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset statistics
    Stats {
        /// Number of most active users to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Find movies similar to a given movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        /// Number of similar movies to return
        #[arg(short, default_value = "10")]
        k: usize,

        /// Distance metric: cosine, euclidean or manhattan
        #[arg(long, default_value = "cosine")]
        metric: Metric,
    },

    /// Get movie recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(short, default_value = "10")]
        k: usize,

        /// Distance metric: cosine, euclidean or manhattan
        #[arg(long, default_value = "cosine")]
        metric: Metric,

        /// Show the seed movie and distances
        #[arg(long)]
        explain: bool,
    },

    /// Time recommendation requests for random users
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        #[arg(short, default_value = "10")]
        k: usize,

        /// Seed for picking users
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let dataset = Arc::new(
        Dataset::load_from_files(&cli.movies, &cli.ratings)
            .context("Failed to load MovieLens dataset")?,
    );
    info!("Loaded dataset in {:?}", start.elapsed());

    let config = RecommenderConfig::default().with_duplicate_policy(cli.duplicates);

    match cli.command {
        Commands::Stats { top } => handle_stats(&dataset, top, cli.json)?,
        Commands::Similar { movie_id, k, metric } => {
            let recommender = build_recommender(dataset, config.with_metric(metric))?;
            handle_similar(&recommender, movie_id, k, cli.json)?
        }
        Commands::Recommend {
            user_id,
            k,
            metric,
            explain,
        } => {
            let recommender = build_recommender(dataset, config.with_metric(metric))?;
            handle_recommend(&recommender, user_id, k, explain, cli.json)?
        }
        Commands::Benchmark { requests, k, seed } => {
            let recommender = build_recommender(dataset, config)?;
            handle_benchmark(&recommender, requests, k, seed)?
        }
    }

    Ok(())
}

fn build_recommender(dataset: Arc<Dataset>, config: RecommenderConfig) -> Result<Recommender> {
    Recommender::with_config(dataset, config).context("Failed to build rating matrix")
}

/// Not-found outcomes are reported, not treated as failures
fn report_or_fail<T>(result: std::result::Result<T, RecommendError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => {
            println!("{} {}", "ℹ".yellow(), err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct MovieLabel {
    movie_id: MovieId,
    title: Option<String>,
    mean: f64,
    count: usize,
}

#[derive(Serialize)]
struct StatsReport {
    dataset: DatasetStats,
    lowest_rated_movie: Option<MovieLabel>,
    highest_rated_movie: Option<MovieLabel>,
    most_active_users: Vec<UserRatingCount>,
}

/// Handle the 'stats' command
fn handle_stats(dataset: &Dataset, top: usize, json: bool) -> Result<()> {
    let movie_stats = dataset.movie_rating_stats();
    let label = |movie_id: MovieId| -> Option<MovieLabel> {
        let summary = movie_stats
            .as_ref()?
            .per_movie
            .iter()
            .find(|s| s.movie_id == movie_id)?;
        Some(MovieLabel {
            movie_id,
            title: dataset.get_movie(movie_id).map(|m| m.title.clone()),
            mean: summary.mean,
            count: summary.count,
        })
    };

    let mut most_active = dataset.user_rating_distribution();
    most_active.sort_by(|a, b| b.count.cmp(&a.count).then(a.user_id.cmp(&b.user_id)));
    most_active.truncate(top);

    let report = StatsReport {
        dataset: dataset.dataset_stats(),
        lowest_rated_movie: movie_stats.as_ref().and_then(|s| label(s.lowest_rated_movie)),
        highest_rated_movie: movie_stats.as_ref().and_then(|s| label(s.highest_rated_movie)),
        most_active_users: most_active,
    };

    if json {
        return print_json(&report);
    }

    println!("{}", "Dataset Statistics:".bold().blue());
    println!("{}Total ratings: {}", "• ".green(), report.dataset.total_ratings);
    println!("{}Unique users: {}", "• ".green(), report.dataset.unique_users);
    println!("{}Unique movies: {}", "• ".green(), report.dataset.unique_movies);
    println!(
        "{}Average ratings per user: {}",
        "• ".cyan(),
        report.dataset.avg_ratings_per_user
    );
    println!(
        "{}Average ratings per movie: {}",
        "• ".cyan(),
        report.dataset.avg_ratings_per_movie
    );

    for (heading, movie) in [
        ("Lowest rated movie", &report.lowest_rated_movie),
        ("Highest rated movie", &report.highest_rated_movie),
    ] {
        if let Some(movie) = movie {
            println!(
                "{}{}: {} [{}] avg {:.2} ({} ratings)",
                "• ".cyan(),
                heading,
                movie.title.as_deref().unwrap_or(DEFAULT_PLACEHOLDER_TITLE),
                movie.movie_id,
                movie.mean,
                movie.count
            );
        }
    }

    if !report.most_active_users.is_empty() {
        println!("Most active users:");
        for user in &report.most_active_users {
            println!("  - User {}: {} ratings", user.user_id, user.count);
        }
    }
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(recommender: &Recommender, movie_id: MovieId, k: usize, json: bool) -> Result<()> {
    let metric = recommender.config().metric;
    let Some(neighbors) =
        report_or_fail(recommender.matrix().nearest_neighbors(movie_id, k, &metric))?
    else {
        return Ok(());
    };

    let similar: Vec<MovieRecommendation> = neighbors
        .into_iter()
        .map(|neighbor| MovieRecommendation {
            movie_id: neighbor.movie_id,
            title: recommender.titles().title(neighbor.movie_id).to_string(),
            distance: neighbor.distance,
        })
        .collect();

    if json {
        return print_json(&similar);
    }

    println!(
        "{}",
        format!(
            "Movies similar to {} ({} distance):",
            recommender.titles().title(movie_id),
            metric
        )
        .bold()
        .blue()
    );
    print_movies(&similar, true);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    recommender: &Recommender,
    user_id: UserId,
    k: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    let Some(recommendations) = report_or_fail(recommender.recommend_detailed(user_id, k))? else {
        return Ok(());
    };

    if json {
        return print_json(&recommendations);
    }

    print_recommendations(&recommendations, explain);
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(recommender: &Recommender, requests: usize, k: usize, seed: u64) -> Result<()> {
    let user_ids = recommender.dataset().user_ids();
    if user_ids.is_empty() || requests == 0 {
        bail!("Nothing to benchmark: need at least one rated user and one request");
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let picks: Vec<UserId> = (0..requests)
        .map(|_| user_ids[rng.random_range(0..user_ids.len())])
        .collect();

    let wall = Instant::now();
    let mut timings = picks
        .par_iter()
        .map(|&user_id| -> std::result::Result<Duration, RecommendError> {
            let start = Instant::now();
            recommender.recommend(user_id, k)?;
            Ok(start.elapsed())
        })
        .collect::<std::result::Result<Vec<Duration>, RecommendError>>()
        .context("Benchmark request failed")?;
    let wall = wall.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p).round() as usize];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} (k = {})", requests, k);
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / wall.as_secs_f64()
    );
    Ok(())
}

fn print_movies(movies: &[MovieRecommendation], show_distance: bool) {
    for (i, movie) in movies.iter().enumerate() {
        if show_distance {
            println!(
                "{}. {} [{}] - distance {:.4}",
                (i + 1).to_string().green(),
                movie.title,
                movie.movie_id,
                movie.distance
            );
        } else {
            println!("{}. {}", (i + 1).to_string().green(), movie.title);
        }
    }
}

fn print_recommendations(recommendations: &Recommendations, explain: bool) {
    println!(
        "{}",
        format!("Recommendations for User {}:", recommendations.user_id)
            .bold()
            .blue()
    );
    if explain {
        println!(
            "Because you rated {} [{}] {:.1} ({} distance):",
            recommendations.seed.title,
            recommendations.seed.movie_id,
            recommendations.seed.rating,
            recommendations.metric
        );
    }
    print_movies(&recommendations.items, explain);
}
