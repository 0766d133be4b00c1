mod config;
mod mob;

use {
    animate::{euler::quaternion_to_euler, GazeDriver, JointChain},
    color_eyre::Report,
    nalgebra as na,
    std::time::Instant,
    tokio::runtime::Runtime,
    tracing_subscriber::{
        layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
    },
};

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();

    let config = config::Config::load_default()?;
    tracing::info!("Config loaded: {:?}", config);
    let frame_time = config.demo.frame_time()?;

    let runtime = Runtime::new()?;

    let (names, mut transforms) = mob::joints();
    let mut driver = GazeDriver::configure(&config.gaze, &names);
    driver.begin_build(runtime.handle(), names, transforms.clone());

    let model = config.demo.model();
    let mut chain: Option<JointChain> = None;

    let report_every = config.demo.report_every.max(1);
    let start = Instant::now();

    for frame in 0..config.demo.frames {
        let time = frame as f32 / config.demo.frame_rate;
        let target = config.demo.target.position(time);

        // Joint chain becomes available with the skeleton.
        if chain.is_none() {
            chain = driver
                .skeleton()
                .map(|skeleton| JointChain::from_skeleton(skeleton, model));
        }

        let update = match &chain {
            Some(chain) => driver.frame(&target, &mut transforms, chain),
            None => driver.frame(&target, &mut transforms, &model),
        };

        if frame % report_every == 0 {
            tracing::info!(
                "Frame {} ({:?}): target {:?}, head {}, eyes {}",
                frame,
                driver.state(),
                target.coords.as_slice(),
                degrees(update.head),
                degrees(update.eyes),
            );
        }

        if config.demo.realtime {
            std::thread::sleep(frame_time);
        }
    }

    tracing::info!(
        "{} frames in {:?}",
        config.demo.frames,
        start.elapsed()
    );

    if let Some(err) = driver.build_error() {
        return Err(Report::new(err));
    }

    Ok(())
}

fn degrees(rotation: Option<na::UnitQuaternion<f32>>) -> String {
    match rotation {
        Some(rotation) => {
            let angles = quaternion_to_euler(&rotation).map(f32::to_degrees);
            format!("({:.1}, {:.1}, {:.1})", angles.x, angles.y, angles.z)
        }
        None => "held".to_owned(),
    }
}
