use std::sync::Arc;

use gambit::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    gambit::logging::init(&config.log_filter)?;

    let stats = Arc::new(MemoryStats::new());
    let server = GambitServerBuilder::new()
        .config(config)
        .stats(Arc::clone(&stats) as Arc<dyn StatsRecorder>)
        .build::<ChessRules>()
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    let snapshot = stats.snapshot();
    tracing::info!(
        games_played = snapshot.games_played,
        ongoing_games = snapshot.ongoing_games,
        pieces_captured = snapshot.pieces_captured,
        "final stats"
    );
    Ok(())
}
