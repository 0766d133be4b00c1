use {
    crate::{error::RigError, gaze::GazeLimits},
    eyre::{Report, WrapErr},
    nalgebra as na,
    std::{
        f32::consts::{FRAC_PI_4, FRAC_PI_8},
        path::{Path, PathBuf},
    },
};

/// Selects a joint and limits its rotation.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct JointConfig {
    /// First joint whose full name ends with this suffix is driven.
    pub suffix: String,

    /// Direction the joint looks at when not rotated, in joint space.
    #[serde(default = "default_forward")]
    pub forward: [f32; 3],

    /// Limit for each Euler axis, in radians.
    pub max_rotation: f32,
}

impl JointConfig {
    pub fn new(suffix: impl Into<String>, max_rotation: f32) -> Self {
        JointConfig {
            suffix: suffix.into(),
            forward: default_forward(),
            max_rotation,
        }
    }

    pub fn limits(&self) -> Result<GazeLimits, RigError> {
        if !self.max_rotation.is_finite() || self.max_rotation < 0.0 {
            return Err(RigError::InvalidMaxRotation {
                suffix: self.suffix.clone(),
                value: self.max_rotation,
            });
        }

        let forward =
            na::Unit::try_new(na::Vector3::from(self.forward), f32::EPSILON)
                .ok_or_else(|| RigError::ZeroForward {
                    suffix: self.suffix.clone(),
                })?;

        Ok(GazeLimits::new(forward, self.max_rotation))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GazeConfig {
    pub head: JointConfig,
    pub left_eye: JointConfig,
    pub right_eye: JointConfig,
}

impl Default for GazeConfig {
    fn default() -> Self {
        GazeConfig {
            head: JointConfig::new("/head01_mob", FRAC_PI_4),
            left_eye: JointConfig::new("FACIAL_L_Eye_mob", FRAC_PI_8),
            right_eye: JointConfig::new("FACIAL_R_Eye_mob", FRAC_PI_8),
        }
    }
}

impl GazeConfig {
    pub fn default_path() -> PathBuf {
        std::env::var("GAZE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./gaze.ron"))
    }

    /// Loads config from [`GazeConfig::default_path`].
    /// Absent file means default config.
    pub fn load_default() -> Result<Self, Report> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::warn!(
                "Gaze config '{}' not found, using defaults",
                path.display()
            );
            return Ok(GazeConfig::default());
        }
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, Report> {
        load_ron(path)
    }

    pub fn from_ron(text: &str) -> Result<Self, Report> {
        Ok(ron::de::from_str(text)?)
    }
}

/// Reads RON config file.
#[tracing::instrument]
pub fn load_ron<T>(path: &Path) -> Result<T, Report>
where
    T: serde::de::DeserializeOwned,
{
    let file = std::fs::File::open(path).wrap_err_with(|| {
        format!("Failed to open config '{}'", path.display())
    })?;

    let config = ron::de::from_reader(file).wrap_err_with(|| {
        format!("Failed to parse config '{}'", path.display())
    })?;

    Ok(config)
}

fn default_forward() -> [f32; 3] {
    [0.0, 1.0, 1.0]
}
