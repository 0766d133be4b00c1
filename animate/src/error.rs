use std::fmt::{self, Display, Formatter};

/// Errors that abort a hierarchy build.
/// No partial skeleton is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum BuildError {
    #[error("{names} joint names do not match {transforms} transforms")]
    LengthMismatch { names: usize, transforms: usize },

    #[error("Skeleton has no joints")]
    Empty,

    #[error("Skeleton build task stopped without a result")]
    Aborted,
}

/// Errors detected while resolving gaze configuration against a skeleton.
/// Any of them disables gaze tracking for the loaded model.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RigError {
    #[error("Joint index {index} is out of range for {len} joints")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No joint name ends with '{suffix}'")]
    MissingJoint { suffix: String },

    #[error("Forward vector of joint '{suffix}' has zero length")]
    ZeroForward { suffix: String },

    #[error("Max rotation of joint '{suffix}' is invalid: {value}")]
    InvalidMaxRotation { suffix: String, value: f32 },
}

/// Per-frame failures.
/// Affected joints keep rotation from the previous frame.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum GazeError {
    #[error("Target coincides with joint {joint}")]
    DegenerateDirection { joint: usize },

    #[error("Joint index {index} is out of range for {len} transforms")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Target position is not finite")]
    NonFiniteTarget,
}

/// Non-fatal findings of a hierarchy build.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// Implied parent of the joint was not found.
    /// The joint exists in the skeleton but is not attached.
    Orphan { index: usize, name: String },

    /// Full name repeats an earlier joint.
    /// Later joint shadows the earlier one for descendant lookups.
    DuplicateJoint {
        index: usize,
        shadowed: usize,
        name: String,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Orphan { index, name } => {
                write!(fmt, "Parent not found for joint #{} '{}'", index, name)
            }
            Diagnostic::DuplicateJoint {
                index,
                shadowed,
                name,
            } => write!(
                fmt,
                "Joint #{} '{}' repeats name of joint #{}",
                index, name, shadowed
            ),
        }
    }
}
