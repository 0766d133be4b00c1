//! Skeleton reconstruction from path-named joints
//! and clamped look-at for head and eyes.

pub mod config;
pub mod driver;
pub mod error;
pub mod euler;
pub mod gaze;
pub mod scene;
pub mod skeleton;

pub use self::{
    config::{GazeConfig, JointConfig},
    driver::{FrameUpdate, GazeDriver, GazeState},
    error::{BuildError, Diagnostic, GazeError, RigError},
    gaze::{EyePairGaze, GazeLimits, GazeRig, JointGaze},
    scene::{Global3, JointChain, LocalToWorld, Transform},
    skeleton::{build_hierarchy, Hierarchy, Joint, Skeleton},
};
