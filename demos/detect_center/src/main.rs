use argh::FromArgs;
use glam::DVec3;
use std::path::PathBuf;

use nerfgeo::scene::{
    estimate_center_radius, extract_density_grid, CenterRadiusParams, DensityOracle,
    RenderOptions,
};

#[derive(FromArgs)]
/// Locate an object in a density field and bound it
struct Args {
    /// optional json file with the estimator parameters
    #[argh(option)]
    config_path: Option<PathBuf>,

    /// lattice resolution, overrides the config
    #[argh(option)]
    resolution: Option<usize>,

    /// x coordinate of the synthetic object center
    #[argh(option, default = "0.2")]
    cx: f64,

    /// y coordinate of the synthetic object center
    #[argh(option, default = "0.0")]
    cy: f64,

    /// z coordinate of the synthetic object center
    #[argh(option, default = "0.0")]
    cz: f64,

    /// radius of the synthetic object
    #[argh(option, default = "0.3")]
    radius: f64,

    /// optional path to write the density grid around the detected object to
    #[argh(option)]
    grid_path: Option<PathBuf>,
}

/// Soft sphere standing in for a trained radiance model.
struct SoftSphere {
    center: DVec3,
    radius: f64,
    sharpness: f64,
}

impl DensityOracle for SoftSphere {
    fn sample_density(&self, points: &[DVec3], options: &RenderOptions) -> Vec<f64> {
        points
            .iter()
            .map(|p| {
                let d = p.distance(self.center) - self.radius;
                let density = 1.0 / (1.0 + (d * self.sharpness).exp());
                density.max(options.background)
            })
            .collect()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut params: CenterRadiusParams = match &args.config_path {
        Some(path) => serde_json::from_reader(std::fs::File::open(path)?)?,
        None => CenterRadiusParams::default(),
    };
    if let Some(resolution) = args.resolution {
        params.resolution = resolution;
    }
    log::info!("estimator parameters: {params:?}");

    let oracle = SoftSphere {
        center: DVec3::new(args.cx, args.cy, args.cz),
        radius: args.radius,
        sharpness: 50.0,
    };
    let options = RenderOptions::default();

    let estimate = estimate_center_radius(&oracle, &params, &options)?;
    for report in estimate.iterations.iter() {
        println!(
            "iteration {}: sampling radius {:.4}, center {:?}",
            report.iteration, report.sampling_radius, report.center
        );
    }
    println!("center: {:?}", estimate.center);
    println!("radius: {:.4}", estimate.radius);

    if let Some(path) = &args.grid_path {
        let grid = extract_density_grid(
            &oracle,
            estimate.center,
            DVec3::splat(estimate.radius),
            [params.resolution; 3],
            &options,
            params.chunk_size,
        )?;
        serde_json::to_writer(std::fs::File::create(path)?, &grid)?;
        println!(
            "density grid {:?} written to {}, iso level {:.4}",
            grid.dims,
            path.display(),
            grid.mean_density()
        );
    }

    Ok(())
}
