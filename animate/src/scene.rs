use {crate::skeleton::Skeleton, nalgebra as na};

/// Joint transform relative to its parent joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub iso: na::Isometry3<f32>,
    pub scale: na::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Transform {
            iso: na::Isometry3::identity(),
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_iso(iso: na::Isometry3<f32>) -> Self {
        Transform {
            iso,
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(tr: na::Translation3<f32>) -> Self {
        Transform {
            iso: na::Isometry3::from_parts(tr, na::UnitQuaternion::identity()),
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_rotation(rot: na::UnitQuaternion<f32>) -> Self {
        Transform {
            iso: na::Isometry3::from_parts(
                na::Translation3::new(0., 0., 0.),
                rot,
            ),
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn translation(&self) -> na::Point3<f32> {
        na::Point3::from(self.iso.translation.vector)
    }

    pub fn rotation(&self) -> na::UnitQuaternion<f32> {
        self.iso.rotation
    }

    /// Maps point from this joint's space into parent's space.
    pub fn transform_point(&self, point: &na::Point3<f32>) -> na::Point3<f32> {
        let scaled = na::Point3::from(point.coords.component_mul(&self.scale));
        self.iso.transform_point(&scaled)
    }

    pub fn to_homogeneous(&self) -> na::Matrix4<f32> {
        self.iso.to_homogeneous()
            * na::Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// Accumulated transform in world space.
/// Scale and shear are kept apart from the rigid part in `skew`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Global3 {
    pub iso: na::Isometry3<f32>,
    pub skew: na::Matrix3<f32>,
}

impl Default for Global3 {
    fn default() -> Self {
        Global3::identity()
    }
}

impl Global3 {
    pub fn identity() -> Self {
        Global3 {
            iso: na::Isometry3::identity(),
            skew: na::Matrix3::identity(),
        }
    }

    pub fn from_iso(iso: na::Isometry3<f32>) -> Self {
        Global3 {
            iso,
            skew: na::Matrix3::identity(),
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Global3 {
            iso: na::Isometry3::identity(),
            skew: na::Matrix3::from_diagonal(&na::Vector3::new(
                scale, scale, scale,
            )),
        }
    }

    pub fn append_transform(&self, local: &Transform) -> Self {
        let total = self.to_homogeneous() * local.to_homogeneous();
        let rotation = self.iso.rotation * local.iso.rotation;
        Self::from_total(total, rotation)
    }

    pub fn append_global(&self, global: &Global3) -> Self {
        let total = self.to_homogeneous() * global.to_homogeneous();
        let rotation = self.iso.rotation * global.iso.rotation;
        Self::from_total(total, rotation)
    }

    fn from_total(
        total: na::Matrix4<f32>,
        rotation: na::UnitQuaternion<f32>,
    ) -> Self {
        let inv_rotation = rotation.inverse().to_rotation_matrix();
        let translation = total.column(3).xyz();
        let rotskew = total.remove_column(3).remove_row(3);
        let skew = inv_rotation * rotskew;

        Global3 {
            iso: na::Isometry3 {
                translation: na::Translation3 {
                    vector: translation,
                },
                rotation,
            },
            skew,
        }
    }

    pub fn to_homogeneous(&self) -> na::Matrix4<f32> {
        self.iso.to_homogeneous() * self.skew.to_homogeneous()
    }

    pub fn transform_point(&self, point: &na::Point3<f32>) -> na::Point3<f32> {
        self.iso.transform_point(&na::Point3::from(self.skew * point.coords))
    }
}

/// Conversion of joint positions into world space.
pub trait LocalToWorld {
    /// World position of the joint at `index`,
    /// or `None` when there is no such joint.
    fn joint_position(
        &self,
        transforms: &[Transform],
        index: usize,
    ) -> Option<na::Point3<f32>>;
}

/// Treats joint translation as a point in model space.
impl LocalToWorld for Global3 {
    fn joint_position(
        &self,
        transforms: &[Transform],
        index: usize,
    ) -> Option<na::Point3<f32>> {
        let local = transforms.get(index)?;
        Some(self.transform_point(&local.translation()))
    }
}

/// Accumulates transforms along the chain of parent joints.
#[derive(Clone, Debug)]
pub struct JointChain {
    parents: Box<[Option<usize>]>,
    model: Global3,
}

impl JointChain {
    pub fn from_skeleton(skeleton: &Skeleton, model: Global3) -> Self {
        JointChain {
            parents: skeleton.joints().iter().map(|j| j.parent()).collect(),
            model,
        }
    }
}

impl LocalToWorld for JointChain {
    fn joint_position(
        &self,
        transforms: &[Transform],
        index: usize,
    ) -> Option<na::Point3<f32>> {
        let mut point = transforms.get(index)?.translation();
        let mut next = *self.parents.get(index)?;

        // Parents always precede their children, the walk terminates.
        while let Some(parent) = next {
            point = transforms.get(parent)?.transform_point(&point);
            next = *self.parents.get(parent)?;
        }

        Some(self.model.transform_point(&point))
    }
}
