use {animate::Transform, nalgebra as na};

/// Joint paths and rest offsets of a humanoid rig, in the order an asset
/// loader would list them. Offsets are in meters, Z up, Y forward.
const JOINTS: &[(&str, [f32; 3])] = &[
    ("root_mob", [0.0, 0.0, 0.0]),
    ("root_mob/pelvis_mob", [0.0, 0.0, 0.95]),
    ("root_mob/pelvis_mob/spine01_mob", [0.0, 0.0, 0.08]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob", [0.0, 0.0, 0.08]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob", [0.0, 0.0, 0.08]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob", [0.0, 0.0, 0.08]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob", [0.0, 0.0, 0.08]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob", [0.0, 0.0, 0.1]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob/neck02_mob", [0.0, 0.0, 0.05]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob/neck02_mob/head01_mob", [0.0, 0.0, 0.05]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob/neck02_mob/head01_mob/FACIAL_C_FacialRoot_mob", [0.0, 0.08, 0.07]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob/neck02_mob/head01_mob/FACIAL_C_FacialRoot_mob/FACIAL_L_Eye_mob", [-0.032, 0.01, 0.0]),
    ("root_mob/pelvis_mob/spine01_mob/spine02_mob/spine03_mob/spine04_mob/spine05_mob/neck01_mob/neck02_mob/head01_mob/FACIAL_C_FacialRoot_mob/FACIAL_R_Eye_mob", [0.032, 0.01, 0.0]),
    ("root_mob/pelvis_mob/thigh_l_mob", [-0.1, 0.0, -0.05]),
    ("root_mob/pelvis_mob/thigh_l_mob/calf_l_mob", [0.0, 0.0, -0.45]),
    ("root_mob/pelvis_mob/thigh_r_mob", [0.1, 0.0, -0.05]),
    ("root_mob/pelvis_mob/thigh_r_mob/calf_r_mob", [0.0, 0.0, -0.45]),
];

pub fn joints() -> (Vec<String>, Vec<Transform>) {
    JOINTS
        .iter()
        .map(|&(name, [x, y, z])| {
            let tr = na::Translation3::new(x, y, z);
            (name.to_owned(), Transform::from_translation(tr))
        })
        .unzip()
}
