//! End-to-end sensorimotor sessions.

use std::io::Write;

use sensor_agent::{Agent, AgentConfig, AgentError, GridEnvironment, patch_bounds};
use surface_features::{DepthPatch, Location, ValueGrid};

fn bowl_world(size: usize) -> GridEnvironment {
    let c = i32::try_from(size / 2).unwrap();
    let mut depths = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (i32::try_from(x).unwrap() - c, i32::try_from(y).unwrap() - c);
            depths.push(u8::try_from(dx * dx + dy * dy).unwrap());
        }
    }
    GridEnvironment::from_grids(
        ValueGrid::filled(size, size, 3).unwrap(),
        DepthPatch::new(size, size, depths).unwrap(),
    )
    .unwrap()
}

#[test]
fn toml_config_drives_a_full_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r"
[environment]
rows = 8
cols = 8
seed = 21

[run]
num_steps = 12
start_x = 3
start_y = 3

[model]
rows = 4
cols = 4
"
    )
    .unwrap();

    let config = AgentConfig::load(file.path()).unwrap();
    let mut agent = Agent::new(config).unwrap();
    let summary = agent.run().unwrap();

    assert_eq!(summary.steps, 12);
    assert_eq!(summary.committed_model, Some(0));
    assert!(summary.last_match.is_some());

    let bounds = patch_bounds(8, 8, 3).unwrap();
    assert!(bounds.contains(summary.final_location));
}

#[test]
fn bowl_is_umbilic_everywhere() {
    let mut config = AgentConfig::default()
        .with_start(Location::new(3, 3))
        .with_num_steps(20);
    config.model.rows = 7;
    config.model.cols = 7;

    let mut agent = Agent::with_environment(config, bowl_world(7)).unwrap();
    for _ in 0..20 {
        let obs = agent.step().unwrap();
        // Isotropic paraboloid: equal curvatures, pose never fully defined
        assert_eq!(obs.features.principal_curvature_1, obs.features.principal_curvature_2);
        assert_eq!(obs.features.principal_curvature_1.integer_part(), 2);
        assert!(!obs.pose.fully_defined);
    }
    assert_eq!(agent.learning().num_buffered(), 20);
}

#[test]
fn second_session_matches_first_model() {
    let config = AgentConfig::default().with_seed(5).with_num_steps(30);
    let mut agent = Agent::new(config).unwrap();
    let first = agent.run().unwrap();
    let second = agent.run().unwrap();

    assert_eq!(first.committed_model, Some(0));
    assert_eq!(second.steps, 30);
    assert_eq!(second.committed_model, Some(1));
    assert_eq!(agent.learning().num_learnt_models(), 2);
    assert!(second.last_match.is_some());
}

#[test]
fn every_accepted_patch_size_senses() {
    for (side_len, start) in [
        (1, Location::new(5, 1)),
        (3, Location::new(5, 1)),
        (4, Location::new(5, 2)),
    ] {
        let mut config = AgentConfig::default().with_start(start).with_num_steps(6);
        config.patch.side_len = side_len;
        let summary = Agent::new(config).unwrap().run().unwrap();
        assert_eq!(summary.steps, 6, "side_len {side_len}");
    }

    let mut config = AgentConfig::default();
    config.patch.side_len = 2;
    assert!(matches!(Agent::new(config), Err(AgentError::Config(_))));
}

#[test]
fn missing_config_file_is_io_error() {
    let err = AgentConfig::load(std::path::Path::new("/nonexistent/agent.toml")).unwrap_err();
    assert!(matches!(err, AgentError::Io(_)));
}
