//! Ember - command-line path tracer.
//!
//! Builds one of the built-in scenes, renders it in parallel buckets and
//! writes a PPM or PNG.

mod output;
mod scenes;
mod settings;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{render_parallel, CancelToken, ParallelOptions, DEFAULT_BUCKET_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use scenes::{SceneAssets, SceneKind};
use settings::SettingsOverrides;

#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Monte Carlo path tracer")]
struct Cli {
    #[arg(long, value_enum, default_value_t = SceneKind::BouncingSpheres)]
    scene: SceneKind,

    /// JSON file overriding the scene's settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path (.ppm or .png); `-` writes PPM to stdout
    #[arg(long, short, default_value = "-")]
    output: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    samples: Option<u32>,

    #[arg(long)]
    depth: Option<u32>,

    /// Seed for scene construction and sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Abandon the render after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Image used by the textured scenes
    #[arg(long, default_value = "assets/earthmap.jpg")]
    texture: PathBuf,

    /// OBJ file used by the mesh scene
    #[arg(long, default_value = "assets/model.obj")]
    mesh: PathBuf,

    /// Print the effective settings as JSON (usable with --config) and exit
    #[arg(long)]
    print_settings: bool,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            image_width: self.width,
            samples_per_pixel: self.samples,
            max_depth: self.depth,
            ..SettingsOverrides::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let assets = SceneAssets {
        texture: cli.texture.clone(),
        mesh: cli.mesh.clone(),
    };
    let mut scene_rng = StdRng::seed_from_u64(cli.seed);
    let scene = scenes::build(cli.scene, &assets, &mut scene_rng);

    // Scene defaults, then the settings file, then command-line flags
    let mut settings = scene.settings.clone();
    if let Some(path) = &cli.config {
        settings.apply(&SettingsOverrides::load(path)?);
    }
    settings.apply(&cli.overrides());
    log::debug!("Settings: {settings:?}");

    if cli.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let cancel = CancelToken::new();
    if let Some(seconds) = cli.time_limit {
        let limit = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid time limit {seconds}"))?;
        let token = cancel.clone();
        thread::spawn(move || {
            thread::sleep(limit);
            log::warn!("Time limit of {seconds}s reached, cancelling");
            token.cancel();
        });
    }

    let options = ParallelOptions {
        threads: cli.threads,
        bucket_size: cli.bucket_size,
        seed: cli.seed,
        cancel,
    };
    let image = render_parallel(
        &settings.camera(),
        &scene.world,
        &settings.render_config(),
        &options,
    )
    .context("render failed")?;

    output::save(&cli.output, &image)?;
    if cli.output.as_os_str() != "-" {
        log::info!("Wrote {}", cli.output.display());
    }

    Ok(())
}
