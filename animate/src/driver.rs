use {
    crate::{
        config::GazeConfig,
        error::{BuildError, Diagnostic},
        gaze::{dual_joint_look_at, single_joint_look_at, GazeRig},
        scene::{LocalToWorld, Transform},
        skeleton::{build_hierarchy, Hierarchy, Skeleton},
    },
    flume::{bounded, Receiver, TryRecvError},
    nalgebra as na,
    tokio::runtime::Handle,
};

/// Observable state of [`GazeDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GazeState {
    /// No skeleton was requested yet.
    Uninitialized,
    /// Skeleton is being built in background.
    BuildPending,
    /// Skeleton is built, frames update gaze.
    Ready,
    /// Build failed. Terminal until next [`GazeDriver::begin_build`].
    Failed,
}

enum Stage {
    Uninitialized,
    BuildPending(Receiver<Result<Hierarchy, BuildError>>),
    Ready(Hierarchy),
    Failed(BuildError),
}

/// Rotations written during a frame.
/// `None` means the joint kept its previous rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    pub head: Option<na::UnitQuaternion<f32>>,
    pub eyes: Option<na::UnitQuaternion<f32>>,
}

/// Drives head and eyes toward a target once per frame.
///
/// Frames are no-ops until the skeleton built in background is handed
/// over. Dropping the driver discards any build still in flight.
pub struct GazeDriver {
    stage: Stage,
    rig: Option<GazeRig>,
}

impl GazeDriver {
    /// Driver without rig never rotates joints.
    pub fn new(rig: Option<GazeRig>) -> Self {
        GazeDriver {
            stage: Stage::Uninitialized,
            rig,
        }
    }

    /// Resolves gaze joints among `names`.
    /// Tracking is disabled if configuration does not fit the skeleton.
    pub fn configure<S>(config: &GazeConfig, names: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let rig = match GazeRig::resolve(config, names) {
            Ok(rig) => Some(rig),
            Err(err) => {
                tracing::error!("Gaze tracking disabled: {}", err);
                None
            }
        };
        GazeDriver::new(rig)
    }

    pub fn rig(&self) -> Option<&GazeRig> {
        self.rig.as_ref()
    }

    pub fn state(&self) -> GazeState {
        match self.stage {
            Stage::Uninitialized => GazeState::Uninitialized,
            Stage::BuildPending(_) => GazeState::BuildPending,
            Stage::Ready(_) => GazeState::Ready,
            Stage::Failed(_) => GazeState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.stage, Stage::Ready(_))
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        match &self.stage {
            Stage::Ready(hierarchy) => Some(&hierarchy.skeleton),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.stage {
            Stage::Ready(hierarchy) => &hierarchy.diagnostics,
            _ => &[],
        }
    }

    pub fn build_error(&self) -> Option<BuildError> {
        match self.stage {
            Stage::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Starts building skeleton on the blocking pool of `runtime`.
    /// Previous skeleton or pending build is discarded.
    pub fn begin_build(
        &mut self,
        runtime: &Handle,
        names: Vec<String>,
        transforms: Vec<Transform>,
    ) {
        if !matches!(self.stage, Stage::Uninitialized) {
            tracing::warn!("Skeleton rebuild requested, discarding current");
        }

        let (send, recv) = bounded(1);

        runtime.spawn_blocking(move || {
            let result = build_hierarchy(&names, &transforms);
            if send.send(result).is_err() {
                tracing::debug!("Skeleton built for a dropped owner");
            }
        });

        self.stage = Stage::BuildPending(recv);
    }

    /// Forgets pending build. Its result will be discarded.
    pub fn cancel(&mut self) {
        if let Stage::BuildPending(_) = self.stage {
            tracing::debug!("Skeleton build cancelled");
            self.stage = Stage::Uninitialized;
        }
    }

    /// Waits until pending build finishes.
    pub async fn wait_built(&mut self) -> GazeState {
        if let Stage::BuildPending(recv) = &self.stage {
            let result = recv.recv_async().await.ok();
            self.finish_build(result);
        }
        self.state()
    }

    fn poll_build(&mut self) {
        let result = match &self.stage {
            Stage::BuildPending(recv) => match recv.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => None,
            },
            _ => return,
        };
        self.finish_build(result);
    }

    fn finish_build(&mut self, result: Option<Result<Hierarchy, BuildError>>) {
        self.stage = match result.unwrap_or(Err(BuildError::Aborted)) {
            Ok(hierarchy) => {
                let len = hierarchy.skeleton.len();
                tracing::info!("Skeleton ready with {} joints", len);

                if let Some(rig) = self.rig {
                    let fits = GazeRig::new(*rig.head(), *rig.eyes(), len);
                    if let Err(err) = fits {
                        tracing::error!("Gaze tracking disabled: {}", err);
                        self.rig = None;
                    }
                }
                Stage::Ready(hierarchy)
            }
            Err(err) => {
                tracing::error!("Failed to build skeleton: {}", err);
                Stage::Failed(err)
            }
        };
    }

    /// Updates head and eyes rotations in `transforms`.
    ///
    /// A finished build is adopted first. Joints whose rotation can't be
    /// computed this frame keep the previous one.
    pub fn frame<W>(
        &mut self,
        target: &na::Point3<f32>,
        transforms: &mut [Transform],
        space: &W,
    ) -> FrameUpdate
    where
        W: LocalToWorld + ?Sized,
    {
        self.poll_build();

        let rig = match (&self.stage, &self.rig) {
            (Stage::Ready(_), Some(rig)) => *rig,
            _ => return FrameUpdate::default(),
        };

        let head =
            match single_joint_look_at(rig.head(), transforms, space, target) {
                Ok(rotation) => Some(rotation),
                Err(err) => {
                    tracing::debug!("Head keeps rotation: {}", err);
                    None
                }
            };

        let eyes =
            match dual_joint_look_at(rig.eyes(), transforms, space, target) {
                Ok(rotation) => Some(rotation),
                Err(err) => {
                    tracing::debug!("Eyes keep rotation: {}", err);
                    None
                }
            };

        tracing::trace!("Gaze frame: head {:?}, eyes {:?}", head, eyes);
        FrameUpdate { head, eyes }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            gaze::{EyePairGaze, GazeLimits, JointGaze},
            scene::Global3,
        },
    };

    fn skeleton() -> (Vec<String>, Vec<Transform>) {
        let names = ["root", "root/head", "root/head/eye_l", "root/head/eye_r"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        let transforms = vec![
            Transform::identity(),
            Transform::from_translation([0.0, 0.0, 1.6].into()),
            Transform::from_translation([-0.03, 0.1, 1.7].into()),
            Transform::from_translation([0.03, 0.1, 1.7].into()),
        ];
        (names, transforms)
    }

    fn rig() -> GazeRig {
        GazeRig::new(
            JointGaze {
                joint: 1,
                limits: GazeLimits::head(),
            },
            EyePairGaze {
                left: 2,
                right: 3,
                limits: GazeLimits::eye(),
            },
            4,
        )
        .unwrap()
    }

    #[test]
    fn frames_before_build_are_noop() {
        let (_, mut transforms) = skeleton();
        let before = transforms.clone();
        let mut driver = GazeDriver::new(Some(rig()));

        let update = driver.frame(
            &na::Point3::new(1.0, 2.0, 3.0),
            &mut transforms,
            &Global3::identity(),
        );

        assert_eq!(driver.state(), GazeState::Uninitialized);
        assert_eq!(update, FrameUpdate::default());
        assert_eq!(transforms, before);
    }

    #[tokio::test]
    async fn updates_once_built() {
        let (names, mut transforms) = skeleton();
        let mut driver = GazeDriver::new(Some(rig()));

        driver.begin_build(&Handle::current(), names, transforms.clone());
        assert_eq!(driver.state(), GazeState::BuildPending);
        assert_eq!(driver.wait_built().await, GazeState::Ready);
        assert_eq!(driver.skeleton().unwrap().len(), 4);
        assert!(driver.diagnostics().is_empty());

        let update = driver.frame(
            &na::Point3::new(0.5, 3.0, 2.0),
            &mut transforms,
            &Global3::identity(),
        );

        let head = update.head.unwrap();
        let eyes = update.eyes.unwrap();
        assert_eq!(transforms[1].rotation(), head);
        assert_eq!(transforms[2].rotation(), eyes);
        assert_eq!(transforms[3].rotation(), eyes);
        assert_eq!(transforms[0].rotation(), na::UnitQuaternion::identity());
    }

    #[tokio::test]
    async fn failed_build_is_terminal() {
        let (names, mut transforms) = skeleton();
        let mut driver = GazeDriver::new(Some(rig()));

        driver.begin_build(&Handle::current(), names, transforms[..3].to_vec());
        assert_eq!(driver.wait_built().await, GazeState::Failed);
        assert_eq!(
            driver.build_error(),
            Some(BuildError::LengthMismatch {
                names: 4,
                transforms: 3
            })
        );

        let update = driver.frame(
            &na::Point3::new(0.5, 3.0, 2.0),
            &mut transforms,
            &Global3::identity(),
        );
        assert_eq!(update, FrameUpdate::default());
        assert_eq!(driver.state(), GazeState::Failed);
    }

    #[tokio::test]
    async fn missing_rig_disables_tracking() {
        let (names, mut transforms) = skeleton();
        let mut driver = GazeDriver::configure(&GazeConfig::default(), &names);
        assert!(driver.rig().is_none());

        driver.begin_build(&Handle::current(), names, transforms.clone());
        assert_eq!(driver.wait_built().await, GazeState::Ready);

        let before = transforms.clone();
        let update = driver.frame(
            &na::Point3::new(0.5, 3.0, 2.0),
            &mut transforms,
            &Global3::identity(),
        );
        assert_eq!(update, FrameUpdate::default());
        assert_eq!(transforms, before);
    }

    #[tokio::test]
    async fn degenerate_head_still_moves_eyes() {
        let (names, mut transforms) = skeleton();
        let mut driver = GazeDriver::new(Some(rig()));
        driver.begin_build(&Handle::current(), names, transforms.clone());
        driver.wait_built().await;

        let update = driver.frame(
            &na::Point3::new(0.0, 0.0, 1.6),
            &mut transforms,
            &Global3::identity(),
        );
        assert!(update.head.is_none());
        assert!(update.eyes.is_some());
        assert_eq!(transforms[1].rotation(), na::UnitQuaternion::identity());
    }

    #[tokio::test]
    async fn rig_not_fitting_built_skeleton_is_dropped() {
        let (names, mut transforms) = skeleton();
        let mut driver = GazeDriver::new(Some(rig()));

        driver.begin_build(
            &Handle::current(),
            names[..2].to_vec(),
            transforms[..2].to_vec(),
        );
        assert_eq!(driver.wait_built().await, GazeState::Ready);
        assert!(driver.rig().is_none());

        let before = transforms.clone();
        let update = driver.frame(
            &na::Point3::new(0.5, 3.0, 2.0),
            &mut transforms,
            &Global3::identity(),
        );
        assert_eq!(update, FrameUpdate::default());
        assert_eq!(transforms, before);
    }

    #[test]
    fn cancel_returns_to_uninitialized() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (names, transforms) = skeleton();
        let mut driver = GazeDriver::new(Some(rig()));

        driver.begin_build(runtime.handle(), names, transforms);
        driver.cancel();
        assert_eq!(driver.state(), GazeState::Uninitialized);
        assert!(driver.skeleton().is_none());
    }
}
