use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::{EulerRot, Quat, Vec2, Vec3};
use pinata_core::{
    Camera, InputDevice, Outcome, PinataConfig, PlacementOutcome, PlacementResolver, Session,
    tether_points,
};
use pinata_sim::{SimWorld, load_config, load_scene, to_toml};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser)]
#[command(name = "pinata", about = "Pinata placement and strike simulator")]
struct Cli {
    /// TOML configuration file; defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config,

    /// Resolve a placement tap against a scene
    Resolve {
        /// Scene description (TOML)
        #[arg(long)]
        scene: PathBuf,

        /// Tap x in pixels; screen center when omitted
        #[arg(long)]
        x: Option<f32>,

        /// Tap y in pixels, origin at the bottom edge
        #[arg(long)]
        y: Option<f32>,

        /// Print the placement as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the tether polyline between two points
    Tether {
        /// Anchor point as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,

        /// Hook point as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        to: Vec3,

        /// Point count, endpoints included
        #[arg(long)]
        segments: Option<usize>,
    },

    /// Place the target in a scene and strike it with random gestures
    Simulate {
        /// Scene description (TOML)
        #[arg(long)]
        scene: PathBuf,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 10)]
        gestures: usize,

        /// Seconds per simulated frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame_dt: f64,
    },
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = open_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Config => cmd_config(&config),
        Commands::Resolve { scene, x, y, json } => cmd_resolve(&config, scene, *x, *y, *json),
        Commands::Tether { from, to, segments } => cmd_tether(config, *from, *to, *segments),
        Commands::Simulate {
            scene,
            seed,
            gestures,
            frame_dt,
        } => cmd_simulate(config, scene, *seed, *gestures, *frame_dt),
    }
}

fn open_config(path: Option<&Path>) -> Result<PinataConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PinataConfig::default()),
    }
}

fn open_scene(path: &Path) -> Result<SimWorld> {
    load_scene(path).with_context(|| format!("failed to load scene {}", path.display()))
}

fn euler_degrees_of(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

fn fmt_vec3(v: Vec3) -> String {
    format!("{:.3} {:.3} {:.3}", v.x, v.y, v.z)
}

fn cmd_config(config: &PinataConfig) -> Result<()> {
    let text = to_toml(config).context("failed to serialize config")?;
    print!("{text}");
    Ok(())
}

fn cmd_resolve(
    config: &PinataConfig,
    scene: &Path,
    x: Option<f32>,
    y: Option<f32>,
    json: bool,
) -> Result<()> {
    let world = open_scene(scene)?;
    let center = world.camera.screen_center();
    let tap = Vec2::new(x.unwrap_or(center.x), y.unwrap_or(center.y));

    let resolver = PlacementResolver::new(config.placement.clone());
    let placement = resolver.resolve(tap, &world.camera, &world.planes, world.scene.as_ref())?;
    let rotation = euler_degrees_of(placement.pose.rotation);

    if json {
        let value = serde_json::json!({
            "path": placement.path,
            "position": placement.pose.position,
            "rotation": rotation,
            "plane": placement.plane_id,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("path:     {}", placement.path);
        println!("position: {}", fmt_vec3(placement.pose.position));
        println!("rotation: {}", fmt_vec3(rotation));
        println!("plane:    {}", placement.plane_id);
    }
    Ok(())
}

fn cmd_tether(mut config: PinataConfig, from: Vec3, to: Vec3, segments: Option<usize>) -> Result<()> {
    if let Some(segments) = segments {
        config.tether.segments = segments;
    }
    config.validate()?;

    let mut points = Vec::new();
    tether_points(from, to, &config.tether, &mut points);
    for point in &points {
        println!("{}", fmt_vec3(*point));
    }
    Ok(())
}

/// Camera two meters in front of the target at its height.
fn facing(target: Vec3, like: &Camera) -> Camera {
    Camera::looking_at(target + Vec3::Z * 2.0, target, like.fov_y, like.viewport)
}

fn target_position(world: &SimWorld) -> Result<Vec3> {
    let body = world.body().context("no target was spawned")?;
    Ok(body.borrow().frame().position())
}

/// Advance the session and the world by whole frames covering `seconds`.
fn run_frames(
    session: &mut Session,
    world: &mut SimWorld,
    viewer: &Camera,
    seconds: f64,
    frame_dt: f64,
) -> Result<()> {
    let mut elapsed = 0.0;
    while elapsed < seconds {
        let errors = session.tick(frame_dt, viewer);
        if let Some(err) = errors.into_iter().next() {
            bail!("frame failed: {err}");
        }
        world.step(frame_dt as f32);
        elapsed += frame_dt;
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Miss => "miss".to_string(),
        Outcome::Tap(s) | Outcome::Swipe(s) => {
            let kind = if matches!(outcome, Outcome::Tap(_)) {
                "tap"
            } else {
                "swipe"
            };
            let haptic = match s.haptic {
                Some((category, true)) => format!("{category:?}"),
                Some((category, false)) => format!("{category:?} (throttled)"),
                None => "none".to_string(),
            };
            format!(
                "{kind} impulse=[{}] |{:.2}| torque=|{:.2}| haptic={haptic}",
                fmt_vec3(s.impulse),
                s.impulse.length(),
                s.torque.length(),
            )
        }
    }
}

fn cmd_simulate(
    config: PinataConfig,
    scene: &Path,
    seed: u64,
    gestures: usize,
    frame_dt: f64,
) -> Result<()> {
    if !frame_dt.is_finite() || frame_dt <= 0.0 {
        bail!("--frame-dt must be positive, got {frame_dt}");
    }
    let mut world = open_scene(scene)?;
    let mut session = Session::new(config)?;
    session.set_tactile_output(Some(Box::new(world.tactile.clone())));
    let mut rng = SmallRng::seed_from_u64(seed);

    let tap = world.camera.screen_center();
    let outcome = session.place(
        tap,
        &world.camera,
        &world.planes,
        world.scene.as_ref(),
        &mut world.spawner,
    )?;
    let PlacementOutcome::Placed {
        placement,
        correction,
    } = outcome
    else {
        bail!("placement refused");
    };
    println!(
        "placed:   {} at {}",
        placement.path,
        fmt_vec3(placement.pose.position)
    );
    if let Some(correction) = &correction {
        println!(
            "anchor:   height {:.3}{}",
            correction.anchor_height,
            if correction.was_elevated {
                " (elevated)"
            } else {
                ""
            }
        );
    }

    let object = session
        .object()
        .cloned()
        .context("placement produced no object")?;
    let mut viewer = facing(target_position(&world)?, &world.camera);
    let limit = (10.0 / frame_dt).ceil() as usize;
    let mut frames = 0;
    while !object.state().released {
        if frames >= limit {
            bail!("target never activated");
        }
        run_frames(&mut session, &mut world, &viewer, frame_dt, frame_dt)?;
        frames += 1;
    }
    println!("active:   after {:.3}s", session.now());

    let mut audio = world.audio.clone();
    for i in 1..=gestures {
        viewer = facing(target_position(&world)?, &world.camera);
        let aim = viewer.world_to_screen(target_position(&world)?).truncate();
        let roll: f32 = rng.random();
        let (start, end, hold) = if roll < 0.4 {
            let jitter = Vec2::new(rng.random_range(-8.0..8.0), rng.random_range(-8.0..8.0));
            let drift = Vec2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            (aim + jitter, aim + jitter + drift, rng.random_range(0.03..0.15))
        } else if roll < 0.8 {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let length = rng.random_range(80.0..250.0);
            (
                aim,
                aim + Vec2::from_angle(angle) * length,
                rng.random_range(0.1..0.4),
            )
        } else {
            let corner = viewer.viewport * rng.random_range(0.02f32..0.1);
            (corner, corner, rng.random_range(0.03..0.15))
        };

        session.press(InputDevice::Touch, start);
        run_frames(&mut session, &mut world, &viewer, hold, frame_dt)?;
        let outcome = session
            .release(
                InputDevice::Touch,
                end,
                &viewer,
                world.scene.as_ref(),
                Some(&mut audio),
            )
            .context("release found no target")?;
        println!("gesture {i}: {}", describe(&outcome));
        run_frames(&mut session, &mut world, &viewer, 0.5, frame_dt)?;
    }

    let stats = session.haptics().stats();
    println!(
        "haptics:  accepted={} throttled={} played={}",
        stats.accepted, stats.throttled, stats.played
    );
    println!("audio:    {} cues", world.audio.cues().len());
    session.teardown("simulate");
    world.spawner.despawn();
    Ok(())
}
