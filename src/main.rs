use std::env;
use std::error::Error;
use std::path::PathBuf;

use drift_physics::{AxisSample, DriftConfig, DriftController, DriftWorld, Faction, SpawnPose};
use log::{info, warn};
use tokio::time::{Duration, MissedTickBehavior, interval};

const TICK_HZ: u64 = 60;
const DEFAULT_CONFIG: &str = "config/drift.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("🚀 starting drift physics demo...");

    let path = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = match DriftConfig::load_from_path(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}; using built-in tuning");
            DriftConfig::default()
        }
    };
    let tuning = config.into_tuning()?;

    let mut world = DriftWorld::new();

    // Scripted "keyboard": full throttle, weaving every two seconds, a boost
    // on the straights and one manual reset after ten seconds.
    let mut frame = 0u64;
    let player = world.spawn_vehicle(
        DriftController::builder(tuning.clone(), Faction::Player)
            .spawn(SpawnPose::new([0.0, 1.0, 0.0], 0.0))
            .keyboard(move || {
                frame += 1;
                let phase = (frame / (2 * TICK_HZ)) % 3;
                AxisSample {
                    throttle: 1.0,
                    turn: match phase {
                        0 => 0.0,
                        1 => 1.0,
                        _ => -1.0,
                    },
                    boost: phase == 0,
                    reset_pressed: frame == 10 * TICK_HZ,
                }
            }),
    )?;

    let chase = world.beacon(player).ok_or("player beacon missing")?;
    world.spawn_vehicle(
        DriftController::builder(tuning.clone(), Faction::Enemy)
            .spawn(SpawnPose::new([-20.0, 1.0, -20.0], 45.0))
            .chase_target(chase),
    )?;
    world.spawn_vehicle(
        DriftController::builder(tuning, Faction::Neutral).spawn(SpawnPose::new([10.0, 1.0, 0.0], 0.0)),
    )?;

    // Fixed timestep: 60 Hz
    let dt = 1.0 / TICK_HZ as f32;
    let mut ticker = interval(Duration::from_micros(1_000_000 / TICK_HZ));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("👋 stopping after {} ticks", world.tick());
                return Ok(());
            }
        }

        world.step(dt);

        if world.tick() % TICK_HZ == 0 {
            info!("{}", serde_json::to_string(&world.snapshot())?);
        }
    }
}
