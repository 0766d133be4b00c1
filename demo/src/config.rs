use {
    animate::{config::load_ron, GazeConfig, Global3},
    eyre::{Report, WrapErr},
    nalgebra as na,
    std::{path::PathBuf, time::Duration},
};

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub gaze: GazeConfig,
    pub demo: DemoConfig,
}

impl Config {
    /// Gaze config from `GAZE_CONFIG_PATH`,
    /// demo settings from `GAZE_DEMO_CONFIG_PATH`.
    pub fn load_default() -> Result<Self, Report> {
        Ok(Config {
            gaze: GazeConfig::load_default()?,
            demo: DemoConfig::load_default()?,
        })
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct DemoConfig {
    /// Number of frames to run.
    #[serde(default = "default_frames")]
    pub frames: u32,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// Sleep between frames to keep the frame rate.
    #[serde(default)]
    pub realtime: bool,

    /// Log rotations every this many frames.
    #[serde(default = "default_report_every")]
    pub report_every: u32,

    #[serde(default = "default_model_scale")]
    pub model_scale: f32,

    #[serde(default)]
    pub target: TargetConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            frames: default_frames(),
            frame_rate: default_frame_rate(),
            realtime: false,
            report_every: default_report_every(),
            model_scale: default_model_scale(),
            target: TargetConfig::default(),
        }
    }
}

/// Path the viewer moves along.
#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum TargetConfig {
    Orbit {
        center: [f32; 3],
        radius: f32,
        /// Radians per second.
        speed: f32,
    },
    Fixed {
        position: [f32; 3],
    },
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig::Orbit {
            center: [0.0, 0.0, 1.6],
            radius: 2.0,
            speed: 0.5,
        }
    }
}

impl TargetConfig {
    pub fn position(&self, time: f32) -> na::Point3<f32> {
        match *self {
            TargetConfig::Orbit {
                center,
                radius,
                speed,
            } => {
                let angle = time * speed;
                na::Point3::from(center)
                    + na::Vector3::new(
                        radius * angle.sin(),
                        radius * angle.cos(),
                        0.0,
                    )
            }
            TargetConfig::Fixed { position } => na::Point3::from(position),
        }
    }
}

impl DemoConfig {
    pub fn load_default() -> Result<Self, Report> {
        let path = std::env::var("GAZE_DEMO_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./demo.ron"));

        if !path.exists() {
            tracing::warn!(
                "Demo config '{}' not found, using defaults",
                path.display()
            );
            return Ok(DemoConfig::default());
        }

        load_ron(&path)
    }

    /// Time between frames at configured frame rate.
    pub fn frame_time(&self) -> Result<Duration, Report> {
        eyre::ensure!(
            self.frame_rate > 0.0,
            "Frame rate must be positive, got {}",
            self.frame_rate
        );
        Duration::try_from_secs_f32(1.0 / self.frame_rate).wrap_err_with(
            || format!("Frame rate {} is too low", self.frame_rate),
        )
    }

    pub fn model(&self) -> Global3 {
        Global3::from_scale(self.model_scale)
    }
}

fn default_frames() -> u32 {
    600
}

fn default_frame_rate() -> f32 {
    60.0
}

fn default_report_every() -> u32 {
    60
}

fn default_model_scale() -> f32 {
    1.0
}
