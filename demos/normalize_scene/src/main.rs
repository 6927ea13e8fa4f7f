use argh::FromArgs;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use nerfgeo::lie::Pose;
use nerfgeo::scene;
use nerfgeo::scene::{RenderPath, SpiralParams};

#[derive(FromArgs)]
/// Normalize a set of camera poses and synthesize a render path around them
struct Args {
    /// path to a json file with `poses` (3x4 row-major camera-to-world) and optional `bounds` and `depths`
    #[argh(option)]
    poses_path: PathBuf,

    /// path to write the normalized poses and the render path to
    #[argh(option)]
    output_path: PathBuf,

    /// spherify inward-facing captures instead of recentering front-facing ones
    #[argh(switch)]
    spherify: bool,

    /// level the scene along the estimated up axis first
    #[argh(switch)]
    rerotate: bool,

    /// number of frames of the render path
    #[argh(option, default = "120")]
    num_frames: usize,

    /// number of revolutions of the render path
    #[argh(option, default = "2.0")]
    num_turns: f64,
}

#[derive(Deserialize)]
struct Capture {
    poses: Vec<Pose>,
    #[serde(default)]
    bounds: Vec<[f64; 2]>,
    #[serde(default)]
    depths: Vec<f64>,
}

#[derive(Serialize)]
struct Output {
    poses: Vec<Pose>,
    bounds: Vec<[f64; 2]>,
    depths: Vec<f64>,
    scale: f64,
    render_path: RenderPath,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let capture: Capture = serde_json::from_reader(std::fs::File::open(&args.poses_path)?)?;
    println!("Loaded #{} poses", capture.poses.len());

    let poses = if args.rerotate {
        scene::rerotate(&capture.poses)?
    } else {
        capture.poses
    };

    let output = if args.spherify {
        spherify_scene(&poses, &capture.bounds, &capture.depths, &args)?
    } else {
        recenter_scene(&poses, &capture.bounds, &capture.depths, &args)?
    };
    println!(
        "Normalized scene scale {:.4}, render path with #{} frames",
        output.scale,
        output.render_path.len()
    );

    serde_json::to_writer_pretty(std::fs::File::create(&args.output_path)?, &output)?;

    Ok(())
}

/// Front-facing captures: express the poses in the average frame and spiral in front of it.
fn recenter_scene(
    poses: &[Pose],
    bounds: &[[f64; 2]],
    depths: &[f64],
    args: &Args,
) -> Result<Output, Box<dyn std::error::Error>> {
    let poses = scene::recenter(poses)?;

    let up = poses
        .iter()
        .map(|p| p.up())
        .sum::<DVec3>()
        .normalize_or(DVec3::Y);

    // focus between the closest and a far depth, weighted towards the far one
    let close = bounds.iter().map(|b| b[0]).fold(f64::INFINITY, f64::min) * 0.9;
    let far = bounds.iter().map(|b| b[1]).fold(0.0, f64::max) * 5.0;
    let focal = if close.is_finite() && far > 0.0 {
        let dt = 0.75;
        1.0 / ((1.0 - dt) / close + dt / far)
    } else {
        1.0
    };

    let radii = DVec3::new(
        percentile(poses.iter().map(|p| p.translation.x.abs()).collect(), 0.9),
        percentile(poses.iter().map(|p| p.translation.y.abs()).collect(), 0.9),
        percentile(poses.iter().map(|p| p.translation.z.abs()).collect(), 0.9),
    );
    log::info!("spiral radii {radii:?}, focal {focal}");

    let params = SpiralParams {
        radii,
        focal,
        z_delta: 0.0,
        num_turns: args.num_turns,
        num_frames: args.num_frames,
        ..Default::default()
    };
    let render_path = scene::spiral_path(&Pose::IDENTITY, up, &params)?;

    Ok(Output {
        poses,
        bounds: bounds.to_vec(),
        depths: depths.to_vec(),
        scale: 1.0,
        render_path,
    })
}

/// Inward-facing captures: normalize onto the unit sphere and circle above the object.
fn spherify_scene(
    poses: &[Pose],
    bounds: &[[f64; 2]],
    depths: &[f64],
    args: &Args,
) -> Result<Output, Box<dyn std::error::Error>> {
    let normalized = scene::spherify(poses, bounds, depths)?;

    let height = normalized.poses.iter().map(|p| p.translation.z).sum::<f64>()
        / normalized.poses.len() as f64;
    let ring = (normalized.radius.powi(2) - height.powi(2)).max(0.0).sqrt();
    log::info!("orbit height {height}, ring radius {ring}");

    let params = SpiralParams {
        radii: DVec3::new(ring, ring, 1.0),
        focal: height,
        z_delta: 0.0,
        num_turns: args.num_turns,
        num_frames: args.num_frames,
        ..Default::default()
    };
    let reference = Pose::from_translation(DVec3::new(0.0, 0.0, height));
    let render_path = scene::spiral_path(&reference, DVec3::Z, &params)?;

    Ok(Output {
        poses: normalized.poses,
        bounds: normalized.bounds,
        depths: normalized.depths,
        scale: normalized.scale,
        render_path,
    })
}

fn percentile(mut values: Vec<f64>, q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let rank = q * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (rank - lo as f64)
}
