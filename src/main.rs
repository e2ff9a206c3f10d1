//! SAMPLY: a stereoscopic arcade flight shooter
//!
//! Fly, shoot the drones, grab the coins. Every fifth coin bolts another
//! machine gun onto the aircraft. The playfield is drawn once per eye, side
//! by side, for a VR viewer.
//!
//! Frame: input -> `GameHost::tick` (systems, then the task scheduler) ->
//! stereo render.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod error;
mod game;
mod input;
mod runtime;

use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use game::GameHost;
use input::InputState;

/// Long frames (window drag, breakpoint) are clamped so nothing tunnels
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "samply", version, about = "Stereoscopic arcade flight shooter")]
struct Cli {
    /// Config file (RON). Defaults: assets/config.ron, then the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Single centered view instead of side-by-side stereo
    #[arg(long)]
    mono: bool,
}

/// Resolved once, before the window opens
static LAUNCH: OnceLock<GameConfig> = OnceLock::new();

fn launch_config() -> &'static GameConfig {
    LAUNCH.get_or_init(|| {
        init_tracing();
        let cli = Cli::parse();

        let mut config = GameConfig::discover(cli.config.as_deref());
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        if cli.mono {
            config.stereo.enabled = false;
        }
        config
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("samply=info"));
    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn window_conf() -> Conf {
    let window = &launch_config().window;
    Conf {
        window_title: format!("{} v{}", window.title, VERSION),
        window_width: window.width,
        window_height: window.height,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let config = launch_config().clone();
    tracing::info!(
        version = VERSION,
        stereo = config.stereo.enabled,
        seed = ?config.seed,
        "starting"
    );

    let mut input = InputState::new();
    if input.has_gamepad() {
        tracing::info!("gamepad connected");
    }
    let mut host = GameHost::new(config);

    loop {
        let frame = input.poll();
        host.tick(get_frame_time().min(MAX_FRAME_DT), &frame);
        if host.is_finished() {
            break;
        }

        game::renderer::draw_frame(&host.context());
        if host.is_halted() {
            game::renderer::draw_halted_banner();
        }
        next_frame().await;
    }

    let ctx = host.context();
    tracing::info!(
        sessions = ctx.stats.sessions,
        deaths = ctx.stats.deaths,
        damage_taken = ctx.stats.damage_taken,
        best_coins = ctx.stats.best_coins,
        enemies_killed = ctx.stats.enemies_killed,
        "bye"
    );
}
