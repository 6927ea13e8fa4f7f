use approx::assert_relative_eq;
use glam::DVec3;
use nerfgeo_lie::{se3, Pose};
use nerfgeo_scene::{
    average_pose, normalize, spherify, spiral_path, view_matrix, SceneError, SpiralParams,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn front_facing(num_poses: usize, seed: u64) -> Result<Vec<Pose>, SceneError> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_poses)
        .map(|_| {
            let position = DVec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-0.5..0.5),
                5.0 + rng.random_range(-0.2..0.2),
            );
            let forward = DVec3::new(
                rng.random_range(-0.1..0.1),
                rng.random_range(-0.1..0.1),
                1.0,
            );
            view_matrix(forward, DVec3::Y, position)
        })
        .collect()
}

fn inward_facing(num_poses: usize, seed: u64) -> Result<Vec<Pose>, SceneError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let target = DVec3::new(0.5, -0.3, 1.0);
    (0..num_poses)
        .map(|i| {
            let t = i as f64 / num_poses as f64 * std::f64::consts::TAU;
            let position = target
                + DVec3::new(
                    3.0 * t.cos(),
                    1.2 + rng.random_range(-0.3..0.3),
                    3.0 * t.sin(),
                );
            let aim = target + DVec3::new(
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
            );
            view_matrix(position - aim, DVec3::Y, position)
        })
        .collect()
}

#[test]
fn recenter_is_idempotent() -> Result<(), SceneError> {
    let poses = front_facing(20, 7)?;
    let once = normalize::recenter(&poses)?;
    let twice = normalize::recenter(&once)?;

    assert!(average_pose(&once)?.abs_diff_eq(&Pose::IDENTITY, 1e-9));
    for (a, b) in once.iter().zip(twice.iter()) {
        assert!(a.abs_diff_eq(b, 1e-9));
    }
    Ok(())
}

#[test]
fn spherify_is_scale_invariant() -> Result<(), SceneError> {
    let poses = inward_facing(24, 11)?;
    let bounds = vec![[0.5, 6.0]; poses.len()];
    let k = 3.5;
    let scaled: Vec<Pose> = poses
        .iter()
        .map(|p| Pose::new(p.rotation, p.translation * k))
        .collect();
    let scaled_bounds: Vec<[f64; 2]> = bounds.iter().map(|[n, f]| [n * k, f * k]).collect();
    let depths = vec![1.5, 2.75, 4.0];
    let scaled_depths: Vec<f64> = depths.iter().map(|d| d * k).collect();

    let a = spherify(&poses, &bounds, &depths)?;
    let b = spherify(&scaled, &scaled_bounds, &scaled_depths)?;

    assert_relative_eq!(b.scale, a.scale / k, epsilon = 1e-12);
    assert_relative_eq!(a.radius, b.radius, epsilon = 1e-12);
    assert!(b.center.abs_diff_eq(a.center * k, 1e-9));
    for (pa, pb) in a.poses.iter().zip(b.poses.iter()) {
        assert!(pa.abs_diff_eq(pb, 1e-9));
    }
    for (ba, bb) in a.bounds.iter().zip(b.bounds.iter()) {
        assert_relative_eq!(ba[0], bb[0], epsilon = 1e-12);
        assert_relative_eq!(ba[1], bb[1], epsilon = 1e-12);
    }
    for ((da, db), d) in a.depths.iter().zip(b.depths.iter()).zip(depths.iter()) {
        assert_relative_eq!(*da, *db, epsilon = 1e-12);
        assert_relative_eq!(*da, d * a.scale, epsilon = 1e-12);
    }
    assert_eq!(b.depths.len(), depths.len());
    Ok(())
}

#[test]
fn normalized_scene_renders_spiral() -> Result<(), SceneError> {
    let poses = inward_facing(30, 3)?;
    let normalized = spherify(&poses, &[], &[])?;

    // cameras now sit around the unit sphere, above the origin along +z
    let mean_height =
        normalized.poses.iter().map(|p| p.translation.z).sum::<f64>() / normalized.poses.len() as f64;
    assert!(mean_height > 0.0);

    let reference = Pose::from_translation(DVec3::new(0.0, 0.0, mean_height));
    let params = SpiralParams {
        radii: DVec3::new(0.5, 0.5, 0.1),
        focal: mean_height,
        z_delta: 0.1,
        num_turns: 2.0,
        num_frames: 60,
        ..Default::default()
    };
    let path = spiral_path(&reference, DVec3::Y, &params)?;
    assert_eq!(path.len(), 60);
    for pose in path.poses() {
        assert!(pose.check_orthonormal(1e-9).is_ok());
        // the trajectory can be fed back through the Lie maps
        let back = Pose::exp(pose.log());
        assert!(back.abs_diff_eq(pose, 1e-6));
    }
    Ok(())
}

#[test]
fn rerotate_levels_front_facing_capture() -> Result<(), SceneError> {
    let poses = front_facing(16, 21)?;
    let tilt = Pose::from_rotation(nerfgeo_lie::so3::exp(DVec3::new(0.4, 0.0, 0.2)));
    let tilted = nerfgeo_lie::pose::transform_all(&poses, &tilt);

    let leveled = normalize::rerotate_detailed(&tilted, &normalize::RerotateParams::default())?;
    let positions: Vec<DVec3> = leveled.poses.iter().map(|p| p.position()).collect();
    let up = normalize::estimate_up_axis(&positions, &normalize::RerotateParams::default())?;
    assert!(up.abs_diff_eq(DVec3::Y, 1e-9));

    // the leveling transform is a proper rigid motion
    let xi = leveled.transform().log();
    assert!(xi.w.is_finite() && xi.u.is_finite());
    assert!(se3::exp(xi).abs_diff_eq(&leveled.transform(), 1e-6));
    Ok(())
}
