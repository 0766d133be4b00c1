//! Clamped look-at rotations for the head and the eyes.
//!
//! Rotation for a joint is the shortest arc from the joint's reference
//! forward direction to the direction toward the target, limited per Euler
//! axis. Results are written into the joint's local rotation, translation
//! and scale are never touched.

use {
    crate::{
        config::GazeConfig,
        error::{GazeError, RigError},
        euler::limit_rotation,
        scene::{LocalToWorld, Transform},
        skeleton::find_suffix,
    },
    nalgebra as na,
    std::f32::consts::{FRAC_PI_4, FRAC_PI_8, PI},
};

/// Targets closer than this to a joint give no usable direction.
pub const MIN_TARGET_DISTANCE: f32 = 1.0e-6;

/// Averaged eye direction shorter than this means the eyes look apart.
/// Unit directions are averaged, so this is a fraction of unit length.
pub const MIN_AVERAGE_NORM: f32 = 1.0e-4;

/// Reference direction and rotation limit of a joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeLimits {
    pub forward: na::Unit<na::Vector3<f32>>,
    pub max_rotation: f32,
}

impl GazeLimits {
    pub fn new(forward: na::Unit<na::Vector3<f32>>, max_rotation: f32) -> Self {
        GazeLimits {
            forward,
            max_rotation,
        }
    }

    /// Defaults for the head joint.
    pub fn head() -> Self {
        GazeLimits::new(default_forward(), FRAC_PI_4)
    }

    /// Defaults for an eye joint.
    pub fn eye() -> Self {
        GazeLimits::new(default_forward(), FRAC_PI_8)
    }
}

/// Rest direction of gaze in joint space.
pub fn default_forward() -> na::Unit<na::Vector3<f32>> {
    na::Unit::new_normalize(na::Vector3::new(0.0, 1.0, 1.0))
}

/// Single joint following the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointGaze {
    pub joint: usize,
    pub limits: GazeLimits,
}

/// Two joints sharing one gaze direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyePairGaze {
    pub left: usize,
    pub right: usize,
    pub limits: GazeLimits,
}

/// Validated set of joints driven each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeRig {
    head: JointGaze,
    eyes: EyePairGaze,
}

impl GazeRig {
    /// Checks that every joint index exists among `joint_count` joints.
    pub fn new(
        head: JointGaze,
        eyes: EyePairGaze,
        joint_count: usize,
    ) -> Result<Self, RigError> {
        for &index in &[head.joint, eyes.left, eyes.right] {
            if index >= joint_count {
                return Err(RigError::IndexOutOfRange {
                    index,
                    len: joint_count,
                });
            }
        }
        Ok(GazeRig { head, eyes })
    }

    /// Selects joints by name suffix.
    /// First matching joint wins.
    pub fn resolve<S>(
        config: &GazeConfig,
        names: &[S],
    ) -> Result<Self, RigError>
    where
        S: AsRef<str>,
    {
        let find = |suffix: &str| {
            find_suffix(names.iter().map(|n| n.as_ref()), suffix).ok_or_else(
                || RigError::MissingJoint {
                    suffix: suffix.to_owned(),
                },
            )
        };

        let head = JointGaze {
            joint: find(&config.head.suffix)?,
            limits: config.head.limits()?,
        };

        // Both eyes follow the left eye's limits.
        let eyes = EyePairGaze {
            left: find(&config.left_eye.suffix)?,
            right: find(&config.right_eye.suffix)?,
            limits: config.left_eye.limits()?,
        };
        config.right_eye.limits()?;

        tracing::info!(
            "Gaze joints resolved: head #{}, eyes #{} and #{}",
            head.joint,
            eyes.left,
            eyes.right,
        );

        GazeRig::new(head, eyes, names.len())
    }

    pub fn head(&self) -> &JointGaze {
        &self.head
    }

    pub fn eyes(&self) -> &EyePairGaze {
        &self.eyes
    }
}

/// Shortest rotation from `forward` onto `direction`, limited to
/// `max_rotation` around each axis.
pub fn look_rotation(
    forward: &na::Unit<na::Vector3<f32>>,
    direction: &na::Unit<na::Vector3<f32>>,
    max_rotation: f32,
) -> na::UnitQuaternion<f32> {
    let rotation = na::UnitQuaternion::rotation_between_axis(forward, direction)
        .unwrap_or_else(|| half_turn(forward));
    limit_rotation(&rotation, max_rotation)
}

/// Any half turn maps `forward` onto its opposite.
fn half_turn(forward: &na::Unit<na::Vector3<f32>>) -> na::UnitQuaternion<f32> {
    let axis = na::Unit::try_new(forward.cross(&na::Vector3::x()), 1.0e-3)
        .unwrap_or_else(|| {
            na::Unit::new_normalize(forward.cross(&na::Vector3::y()))
        });
    na::UnitQuaternion::from_axis_angle(&axis, PI)
}

/// Turns joint toward `target`.
///
/// On error the joint keeps its current rotation.
pub fn single_joint_look_at<W>(
    gaze: &JointGaze,
    transforms: &mut [Transform],
    space: &W,
    target: &na::Point3<f32>,
) -> Result<na::UnitQuaternion<f32>, GazeError>
where
    W: LocalToWorld + ?Sized,
{
    check_target(target)?;
    check_index(transforms, gaze.joint)?;

    let direction = direction_to(space, transforms, gaze.joint, target)?;
    let rotation = look_rotation(
        &gaze.limits.forward,
        &direction,
        gaze.limits.max_rotation,
    );

    transforms[gaze.joint].iso.rotation = rotation;
    Ok(rotation)
}

/// Turns both joints toward `target` along their averaged direction.
///
/// Both joints receive the same rotation, so they always stay parallel.
/// On error neither joint is changed.
pub fn dual_joint_look_at<W>(
    pair: &EyePairGaze,
    transforms: &mut [Transform],
    space: &W,
    target: &na::Point3<f32>,
) -> Result<na::UnitQuaternion<f32>, GazeError>
where
    W: LocalToWorld + ?Sized,
{
    check_target(target)?;
    check_index(transforms, pair.left)?;
    check_index(transforms, pair.right)?;

    let left = direction_to(space, transforms, pair.left, target)?;
    let right = direction_to(space, transforms, pair.right, target)?;

    let average = (left.into_inner() + right.into_inner()) / 2.0;
    let direction = na::Unit::try_new(average, MIN_AVERAGE_NORM).ok_or(
        GazeError::DegenerateDirection { joint: pair.left },
    )?;

    let rotation = look_rotation(
        &pair.limits.forward,
        &direction,
        pair.limits.max_rotation,
    );

    transforms[pair.left].iso.rotation = rotation;
    transforms[pair.right].iso.rotation = rotation;
    Ok(rotation)
}

fn check_target(target: &na::Point3<f32>) -> Result<(), GazeError> {
    if target.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(GazeError::NonFiniteTarget)
    }
}

fn check_index(
    transforms: &[Transform],
    index: usize,
) -> Result<(), GazeError> {
    if index < transforms.len() {
        Ok(())
    } else {
        Err(GazeError::IndexOutOfRange {
            index,
            len: transforms.len(),
        })
    }
}

fn direction_to<W>(
    space: &W,
    transforms: &[Transform],
    joint: usize,
    target: &na::Point3<f32>,
) -> Result<na::Unit<na::Vector3<f32>>, GazeError>
where
    W: LocalToWorld + ?Sized,
{
    let position = space.joint_position(transforms, joint).ok_or(
        GazeError::IndexOutOfRange {
            index: joint,
            len: transforms.len(),
        },
    )?;

    na::Unit::try_new(target - position, MIN_TARGET_DISTANCE)
        .ok_or(GazeError::DegenerateDirection { joint })
}
