use {
    animate::{
        euler::quaternion_to_euler, Diagnostic, GazeConfig, GazeDriver,
        GazeState, Global3, JointChain, LocalToWorld, Transform,
    },
    approx::assert_relative_eq,
    nalgebra as na,
    std::{
        f32::consts::{FRAC_PI_4, FRAC_PI_8},
        time::{Duration, Instant},
    },
    tokio::runtime::Runtime,
};

const HEAD: &str = "root_mob/pelvis_mob/spine01_mob/neck01_mob/head01_mob";

fn mob() -> (Vec<String>, Vec<Transform>) {
    let joints = [
        ("root_mob", [0.0, 0.0, 0.0]),
        ("root_mob/pelvis_mob", [0.0, 0.0, 0.9]),
        ("root_mob/pelvis_mob/spine01_mob", [0.0, 0.0, 0.3]),
        ("root_mob/pelvis_mob/spine01_mob/neck01_mob", [0.0, 0.0, 0.3]),
        (HEAD, [0.0, 0.0, 0.1]),
        ("root_mob/pelvis_mob/spine01_mob/neck01_mob/head01_mob/FACIAL_C_FacialRoot_mob", [0.0, 0.08, 0.08]),
        ("root_mob/pelvis_mob/spine01_mob/neck01_mob/head01_mob/FACIAL_C_FacialRoot_mob/FACIAL_L_Eye_mob", [-0.03, 0.02, 0.0]),
        ("root_mob/pelvis_mob/spine01_mob/neck01_mob/head01_mob/FACIAL_C_FacialRoot_mob/FACIAL_R_Eye_mob", [0.03, 0.02, 0.0]),
        ("root_mob/pelvis_mob/tail_mob/tip_mob", [0.0, -0.1, 0.0]),
    ];

    joints
        .iter()
        .map(|&(name, t)| {
            (name.to_owned(), Transform::from_translation(t.into()))
        })
        .unzip()
}

/// Polls frames the way a render loop would.
fn run_until_ready(
    driver: &mut GazeDriver,
    transforms: &mut [Transform],
) -> GazeState {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        driver.frame(
            &na::Point3::new(0.0, 2.0, 1.5),
            transforms,
            &Global3::identity(),
        );
        if driver.state() != GazeState::BuildPending
            || Instant::now() > deadline
        {
            return driver.state();
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn head_and_eyes_track_target() {
    let runtime = Runtime::new().unwrap();
    let (names, mut transforms) = mob();

    let mut driver = GazeDriver::configure(&GazeConfig::default(), &names);
    let rig = *driver.rig().unwrap();
    assert_eq!(rig.head().joint, 4);
    assert_eq!(rig.eyes().left, 6);
    assert_eq!(rig.eyes().right, 7);

    driver.begin_build(runtime.handle(), names, transforms.clone());
    assert_eq!(run_until_ready(&mut driver, &mut transforms), GazeState::Ready);

    assert_eq!(
        driver.diagnostics(),
        &[Diagnostic::Orphan {
            index: 8,
            name: "root_mob/pelvis_mob/tail_mob/tip_mob".to_owned(),
        }]
    );

    let skeleton = driver.skeleton().unwrap();
    assert_eq!(skeleton.find(HEAD), Some(4));
    let chain = JointChain::from_skeleton(skeleton, Global3::identity());

    let head = chain.joint_position(&transforms, 4).unwrap();
    assert_relative_eq!(head.z, 1.6, epsilon = 1e-5);

    for target in &[
        na::Point3::new(0.0, 2.0, 3.6),
        na::Point3::new(-5.0, 0.5, 1.0),
        na::Point3::new(3.0, 3.0, 10.0),
        na::Point3::new(0.0, -4.0, 1.6),
    ] {
        let update = driver.frame(target, &mut transforms, &chain);

        let head = quaternion_to_euler(&update.head.unwrap());
        assert!(head.iter().all(|a| a.abs() <= FRAC_PI_4 + 1e-4));

        let eyes = update.eyes.unwrap();
        assert_eq!(transforms[6].rotation(), eyes);
        assert_eq!(transforms[7].rotation(), eyes);
        let eyes = quaternion_to_euler(&eyes);
        assert!(eyes.iter().all(|a| a.abs() <= FRAC_PI_8 + 1e-4));
    }
}

#[test]
fn looking_along_forward_keeps_identity() {
    let runtime = Runtime::new().unwrap();
    let (names, mut transforms) = mob();

    let mut driver = GazeDriver::configure(&GazeConfig::default(), &names);
    driver.begin_build(runtime.handle(), names, transforms.clone());
    assert_eq!(run_until_ready(&mut driver, &mut transforms), GazeState::Ready);

    let chain =
        JointChain::from_skeleton(driver.skeleton().unwrap(), Global3::identity());
    let head = chain.joint_position(&transforms, 4).unwrap();
    let forward = na::Vector3::new(0.0, 1.0, 1.0).normalize();

    let update = driver.frame(&(head + forward), &mut transforms, &chain);
    assert_relative_eq!(update.head.unwrap().angle(), 0.0, epsilon = 1e-3);
}

#[test]
fn cancelled_build_is_discarded() {
    let runtime = Runtime::new().unwrap();
    let (names, mut transforms) = mob();
    let before = transforms.clone();

    let mut driver = GazeDriver::configure(&GazeConfig::default(), &names);
    driver.begin_build(runtime.handle(), names.clone(), transforms.clone());
    driver.cancel();

    // Blocking task completes and finds no receiver.
    runtime.shutdown_timeout(Duration::from_secs(5));

    let update = driver.frame(
        &na::Point3::new(0.0, 2.0, 1.5),
        &mut transforms,
        &Global3::identity(),
    );
    assert_eq!(driver.state(), GazeState::Uninitialized);
    assert!(driver.skeleton().is_none());
    assert!(update.head.is_none() && update.eyes.is_none());
    assert_eq!(transforms, before);

    // Fresh build after cancel is adopted as usual.
    let runtime = Runtime::new().unwrap();
    driver.begin_build(runtime.handle(), names, transforms.clone());
    assert_eq!(run_until_ready(&mut driver, &mut transforms), GazeState::Ready);
    assert_eq!(driver.skeleton().unwrap().len(), 9);
}

#[test]
fn dropped_driver_discards_build() {
    let runtime = Runtime::new().unwrap();
    let (names, transforms) = mob();

    let mut driver = GazeDriver::configure(&GazeConfig::default(), &names);
    driver.begin_build(runtime.handle(), names, transforms);
    drop(driver);

    // Completed build finds no receiver and is dropped silently.
    runtime.shutdown_timeout(Duration::from_secs(5));
}
