//! Symmetry demo.
//!
//! Builds a small two-arm rig, binds the right arm to the left one and moves
//! the left arm to show the mirrored result.
//!
//! Usage:
//!   cargo run -p symmetry_cli -- [AXIS] [--settings <FILE>]
//!
//! `AXIS` is one of X, Y or Z (default: the settings' default axis).
//! `RUST_LOG=debug` prints every graph edit.

use std::path::PathBuf;

use anyhow::Context;
use glam::DVec3;
use symmetry::scene::Scene;
use symmetry::symmetry::lifecycle;
use symmetry::{LifecycleEvent, MirrorAxis, SymmetrySettings};

struct Args {
    axis: Option<MirrorAxis>,
    settings: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        axis: None,
        settings: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => {
                let path = iter.next().context("--settings needs a file path")?;
                args.settings = Some(PathBuf::from(path));
            }
            other => args.axis = Some(other.parse()?),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SymmetrySettings::from_json(&json)?
        }
        None => SymmetrySettings::default(),
    };

    // 1. Rig: a root with a left and a right arm joint
    let mut scene = Scene::new();
    let root = scene.create_joint("root", None)?;
    let spine = scene.create_joint("spine", Some(root))?;
    let arm_l = scene.create_joint("arm_L", Some(spine))?;
    let arm_r = scene.create_joint("arm_R", Some(root))?;
    scene.set_attr(spine, "translate", DVec3::new(0.0, 10.0, 0.0))?;
    scene.set_attr(arm_l, "translate", DVec3::new(5.0, 0.0, 0.0))?;
    scene.set_attr(arm_r, "translate", DVec3::new(-5.0, 10.0, 0.0))?;

    // 2. Bind the selected pair
    scene.select(&[arm_l, arm_r]);
    let Some(binding) = symmetry::execute_with(&mut scene, args.axis, &settings) else {
        for warning in scene.take_warnings() {
            eprintln!("warning: {warning}");
        }
        std::process::exit(1);
    };
    println!("Bound 'arm_R' to 'arm_L' across {}", binding.axis);
    println!("  offsets: {:?}", binding.offsets);
    for (id, live) in lifecycle::persisted_hooks(&scene, arm_r) {
        println!("  hook {:#x} live={live}", id.to_raw());
    }

    // 3. Drive the source and read the mirrored target
    for x in [6.0, 7.5, 2.0] {
        scene.set_attr(arm_l, "translateX", x)?;
        println!(
            "arm_L world {:>6.2?}  ->  arm_R world {:>6.2?}",
            scene.world_translation(arm_l)?,
            scene.world_translation(arm_r)?
        );
    }

    // 4. Closing the scene tears the binding down
    scene.emit(LifecycleEvent::AppQuitting);
    println!("Bound after quit: {}", symmetry::is_bound(&scene, arm_r));
    Ok(())
}
