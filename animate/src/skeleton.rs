use {
    crate::{
        error::{BuildError, Diagnostic},
        scene::{Global3, Transform},
    },
    ahash::AHashMap,
    smallvec::SmallVec,
};

/// Tree-like structure of joints.
///
/// Joints are stored in input order, parents are referenced by index.
/// Joint at index 0 is the root.
#[derive(Clone, Debug)]
pub struct Skeleton {
    joints: Box<[Joint]>,
}

#[derive(Clone, Debug)]
pub struct Joint {
    name: Box<str>,
    local: Transform,
    parent: Option<usize>,
    children: SmallVec<[usize; 4]>,
}

impl Joint {
    /// Full `/`-separated path of the joint.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform at the time the skeleton was built.
    pub fn local(&self) -> &Transform {
        &self.local
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Children in input order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

impl Skeleton {
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.joints.get(index)?.parent
    }

    pub fn children(&self, index: usize) -> &[usize] {
        match self.joints.get(index) {
            Some(joint) => &joint.children,
            None => &[],
        }
    }

    /// Finds joint by full name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| &*j.name == name)
    }

    /// Finds first joint whose name ends with `suffix`.
    pub fn find_suffix(&self, suffix: &str) -> Option<usize> {
        find_suffix(self.joints.iter().map(|j| j.name()), suffix)
    }

    /// Iterates over joints reachable from the root, parents first.
    /// Orphans and their descendants are not visited.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        let mut stack = SmallVec::new();
        if !self.joints.is_empty() {
            stack.push(self.root());
        }
        DepthFirst {
            skeleton: self,
            stack,
        }
    }

    /// World transform of every joint, composed from the build-time
    /// local transforms. Orphans are placed relative to `model`.
    pub fn world_transforms(&self, model: Global3) -> Vec<Global3> {
        let mut world: Vec<Global3> = Vec::with_capacity(self.joints.len());
        for joint in self.joints.iter() {
            let parent = match joint.parent {
                Some(parent) => world[parent],
                None => model,
            };
            world.push(parent.append_transform(&joint.local));
        }
        world
    }
}

pub struct DepthFirst<'a> {
    skeleton: &'a Skeleton,
    stack: SmallVec<[usize; 16]>,
}

impl Iterator for DepthFirst<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.stack.pop()?;
        let children = self.skeleton.children(index);
        self.stack.extend(children.iter().rev().copied());
        Some(index)
    }
}

/// Result of a successful build.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    pub skeleton: Skeleton,
    pub diagnostics: Vec<Diagnostic>,
}

impl Hierarchy {
    pub fn orphans(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::Orphan { index, name } => Some((*index, name.as_str())),
            _ => None,
        })
    }
}

/// Reconstructs joint tree from path-like joint names.
///
/// Parent of `a/b/c` is the joint named `a/b`.
/// Joints whose parent is not found before them are kept unattached
/// and reported as orphans.
#[tracing::instrument(skip_all, fields(joints = names.len()))]
pub fn build_hierarchy<S>(
    names: &[S],
    transforms: &[Transform],
) -> Result<Hierarchy, BuildError>
where
    S: AsRef<str>,
{
    if names.len() != transforms.len() {
        tracing::error!(
            "The number of joint names ({}) and transforms ({}) does not match",
            names.len(),
            transforms.len(),
        );
        return Err(BuildError::LengthMismatch {
            names: names.len(),
            transforms: transforms.len(),
        });
    }

    if names.is_empty() {
        return Err(BuildError::Empty);
    }

    let mut joints: Vec<Joint> = Vec::with_capacity(names.len());
    let mut lookup: AHashMap<&str, usize> =
        AHashMap::with_capacity(names.len());
    let mut diagnostics = Vec::new();

    for (index, (name, local)) in names.iter().zip(transforms).enumerate() {
        let name = name.as_ref();

        let parent = if index == 0 {
            None
        } else {
            let parent = parent_path(name)
                .and_then(|path| lookup.get(path.as_str()).copied());

            if parent.is_none() {
                tracing::warn!("Parent not found for: {}", name);
                diagnostics.push(Diagnostic::Orphan {
                    index,
                    name: name.to_owned(),
                });
            }
            parent
        };

        if let Some(shadowed) = lookup.insert(name, index) {
            tracing::warn!("Joint name '{}' is not unique", name);
            diagnostics.push(Diagnostic::DuplicateJoint {
                index,
                shadowed,
                name: name.to_owned(),
            });
        }

        if let Some(parent) = parent {
            joints[parent].children.push(index);
        }

        joints.push(Joint {
            name: name.into(),
            local: *local,
            parent,
            children: SmallVec::new(),
        });
    }

    tracing::info!(
        "Skeleton with {} joints built, {} diagnostics",
        joints.len(),
        diagnostics.len(),
    );

    Ok(Hierarchy {
        skeleton: Skeleton {
            joints: joints.into_boxed_slice(),
        },
        diagnostics,
    })
}

/// Drops the last path segment. Empty segments are skipped.
/// Returns `None` for single-segment names.
pub fn parent_path(name: &str) -> Option<String> {
    let mut segments: SmallVec<[&str; 16]> =
        name.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Index of the first name that ends with `suffix`.
pub fn find_suffix<'a>(
    names: impl IntoIterator<Item = &'a str>,
    suffix: &str,
) -> Option<usize> {
    names.into_iter().position(|name| name.ends_with(suffix))
}
