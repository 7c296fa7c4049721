use tracing::info;

use crate::app::{AppContext, Result};
use crate::crawler::{coerce_workers, ChromeSessions, Harvester, RunResult};

/// Harvest `posts` entries starting at `offset`, `workers` at a time.
pub async fn run_harvest(ctx: &AppContext, posts: usize, offset: usize, workers: i64) -> Result<()> {
    let workers = coerce_workers(workers);
    let sink = ctx.sink()?;
    let sessions = ChromeSessions::launch(ctx.config.crawler.clone()).await?;

    info!(
        "Harvesting {} posts from offset {} with {} workers",
        posts, offset, workers
    );

    let harvester = Harvester::new(sessions, sink);
    let result = harvester.run(posts, offset, workers).await;
    harvester.into_sessions().shutdown().await;

    print_summary(&result?);
    Ok(())
}

fn print_summary(result: &RunResult) {
    for entry in &result.entries {
        println!(
            "{}  {:>7} votes  {:<20} {}",
            &entry.id()[..8],
            entry.votes(),
            entry.category(),
            entry.url()
        );
    }
    println!(
        "\nHarvested {} entries in {:.1} seconds",
        result.entries.len(),
        result.elapsed.as_secs_f64()
    );
}

pub fn list_entries(ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let entries = store.get_all_entries()?;

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} {:>7} votes  {:<20} {}",
            entry.published_at().format("%Y-%m-%d"),
            entry.votes(),
            entry.category(),
            entry.url()
        );
    }

    Ok(())
}

pub fn show_config_path(ctx: &AppContext) {
    println!("{}", ctx.config_path.display());
}
