use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use common::{Rosters, TeamSide};
use playback::{
    HttpSimulationClient, PlayError, PlaySession, PlaybackConfig, ScriptedSimulationClient,
    SimulationClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use terminal::SnapshotRenderer;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "courtside", about = "Play back one simulated basketball possession")]
struct Args {
    /// Name of the player starting with the ball
    #[arg(long)]
    handler: String,

    /// Team with the ball
    #[arg(long, value_enum, default_value_t = Side::Home)]
    possession: Side,

    /// Play a JSON event script instead of calling the simulation service
    #[arg(long, conflicts_with = "url")]
    script: Option<PathBuf>,

    /// Simulation service base URL (overrides COURTSIDE_SIM_URL)
    #[arg(long)]
    url: Option<Url>,

    /// Playback speed multiplier (overrides COURTSIDE_PLAYBACK_SPEED)
    #[arg(long)]
    speed: Option<f64>,

    /// Roster table as JSON; defaults to Warriors vs Rockets
    #[arg(long)]
    roster: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    Home,
    Away,
}

impl From<Side> for TeamSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Home => TeamSide::Home,
            Side::Away => TeamSide::Away,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let rosters = Arc::new(match &args.roster {
        Some(path) => Rosters::load(path)?,
        None => Rosters::warriors_rockets(),
    });
    let client: Arc<dyn SimulationClient> = match &args.script {
        Some(path) => Arc::new(ScriptedSimulationClient::from_file(path)?),
        None => {
            let client = HttpSimulationClient::new(&config)?;
            match client.health().await {
                Ok(true) => info!(url = %config.sim_url, "Simulation service is healthy"),
                Ok(false) => warn!(url = %config.sim_url, "Simulation service reports unhealthy"),
                Err(e) => warn!(url = %config.sim_url, error = %e, "Health check failed"),
            }
            Arc::new(client)
        }
    };

    let session = PlaySession::from_config(rosters.clone(), client, &config);
    let side = TeamSide::from(args.possession);
    session.set_possession(side).await?;
    let (_, handler) = rosters
        .resolve_name(&args.handler, side)
        .filter(|(found, _)| *found == side)
        .ok_or_else(|| anyhow!("{} is not in the {} lineup", args.handler, rosters.team(side).name))?;
    session.assign_ball_holder(handler.id.clone()).await?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received, stopping playback");
                cancel.cancel();
            }
        }
    });

    let mut phase = session.watch_phase();
    tokio::spawn(async move {
        while phase.changed().await.is_ok() {
            debug!(phase = %*phase.borrow_and_update(), "Playback phase");
        }
    });

    let mut snapshots = session.subscribe();
    let printer = tokio::spawn({
        let rosters = rosters.clone();
        async move {
            let renderer = SnapshotRenderer::new(&rosters);
            loop {
                match snapshots.recv().await {
                    Ok(snapshot) => {
                        println!("{}", renderer.render(&snapshot));
                        if snapshot.is_terminal() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Renderer fell behind"),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });

    let result = session.play(cancel).await;
    match result {
        Ok(_) => {
            printer.await.context("Snapshot printer panicked")?;
            Ok(())
        }
        Err(PlayError::Cancelled(_)) => {
            printer.abort();
            info!("Playback cancelled, court left as it was");
            Ok(())
        }
        Err(e) => {
            printer.abort();
            Err(e).context("Play failed")
        }
    }
}

fn load_config(args: &Args) -> Result<PlaybackConfig> {
    let mut config = PlaybackConfig::from_env()?;
    if let Some(url) = &args.url {
        config.sim_url = url.clone();
    }
    if let Some(speed) = args.speed {
        if speed <= 0.0 || !speed.is_finite() {
            bail!("--speed must be a positive number, got {}", speed);
        }
        config.playback_speed = speed;
    }
    Ok(config)
}
