use serde::{Deserialize, Serialize};

use super::SourceKind;

/// Canonical tracking taxonomies a scene can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyId {
    /// `XR_FB_face_tracking2` expressions.
    OpenxrFaceFb2,
    /// ARKit face blendshapes.
    Arkit,
    /// `XR_FB_body_tracking` joints (plus the full-body leg joints).
    OpenxrBodyFb,
    /// Unity Mecanim humanoid bones.
    UnityHumanoid,
}

impl TaxonomyId {
    pub fn urn(self) -> &'static str {
        match self {
            TaxonomyId::OpenxrFaceFb2 => "urn:khronos:openxr:facial-animation:fb-tracking2",
            TaxonomyId::Arkit => "urn:apple:arkit:face-blendshapes",
            TaxonomyId::OpenxrBodyFb => "urn:khronos:openxr:body-tracking:fb-body",
            TaxonomyId::UnityHumanoid => "urn:unity:mecanim:humanoid",
        }
    }

    /// Which source names the taxonomy applies to.
    pub fn source_kind(self) -> SourceKind {
        match self {
            TaxonomyId::OpenxrFaceFb2 | TaxonomyId::Arkit => SourceKind::Blendshape,
            TaxonomyId::OpenxrBodyFb | TaxonomyId::UnityHumanoid => SourceKind::Bone,
        }
    }

    /// Short canonical entry names.
    pub fn canonical_names(self) -> &'static [&'static str] {
        match self {
            TaxonomyId::OpenxrFaceFb2 => &FB_FACE2_EXPRESSIONS,
            TaxonomyId::Arkit => &ARKIT_BLENDSHAPES,
            TaxonomyId::OpenxrBodyFb => &FB_BODY_JOINTS,
            TaxonomyId::UnityHumanoid => &UNITY_HUMANOID_BONES,
        }
    }

    /// `(alias, short canonical name)` pairs, matched after normalization.
    pub fn aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            TaxonomyId::OpenxrFaceFb2 => &FB_FACE2_ALIASES,
            TaxonomyId::Arkit => &ARKIT_ALIASES,
            TaxonomyId::OpenxrBodyFb => &FB_BODY_ALIASES,
            TaxonomyId::UnityHumanoid => &UNITY_HUMANOID_ALIASES,
        }
    }

    /// Full identifier of a canonical entry as used by the taxonomy itself.
    pub fn canonical_id(self, short: &str) -> String {
        match self {
            TaxonomyId::OpenxrFaceFb2 => format!("XR_FACE_EXPRESSION2_{}_FB", short),
            TaxonomyId::OpenxrBodyFb => format!("XR_BODY_JOINT_{}_FB", short),
            TaxonomyId::Arkit | TaxonomyId::UnityHumanoid => short.to_string(),
        }
    }

    /// URN of one canonical entry.
    pub fn target_urn(self, short: &str) -> String {
        format!("{}:{}", self.urn(), self.canonical_id(short))
    }
}

// ─── OpenXR face tracking 2 ──────────────────────────────────────────────────

pub(super) const FB_FACE2_EXPRESSIONS: [&str; 70] = [
    "BROW_LOWERER_L",
    "BROW_LOWERER_R",
    "CHEEK_PUFF_L",
    "CHEEK_PUFF_R",
    "CHEEK_RAISER_L",
    "CHEEK_RAISER_R",
    "CHEEK_SUCK_L",
    "CHEEK_SUCK_R",
    "CHIN_RAISER_B",
    "CHIN_RAISER_T",
    "DIMPLER_L",
    "DIMPLER_R",
    "EYES_CLOSED_L",
    "EYES_CLOSED_R",
    "EYES_LOOK_DOWN_L",
    "EYES_LOOK_DOWN_R",
    "EYES_LOOK_LEFT_L",
    "EYES_LOOK_LEFT_R",
    "EYES_LOOK_RIGHT_L",
    "EYES_LOOK_RIGHT_R",
    "EYES_LOOK_UP_L",
    "EYES_LOOK_UP_R",
    "INNER_BROW_RAISER_L",
    "INNER_BROW_RAISER_R",
    "JAW_DROP",
    "JAW_SIDEWAYS_LEFT",
    "JAW_SIDEWAYS_RIGHT",
    "JAW_THRUST",
    "LID_TIGHTENER_L",
    "LID_TIGHTENER_R",
    "LIP_CORNER_DEPRESSOR_L",
    "LIP_CORNER_DEPRESSOR_R",
    "LIP_CORNER_PULLER_L",
    "LIP_CORNER_PULLER_R",
    "LIP_FUNNELER_LB",
    "LIP_FUNNELER_LT",
    "LIP_FUNNELER_RB",
    "LIP_FUNNELER_RT",
    "LIP_PRESSOR_L",
    "LIP_PRESSOR_R",
    "LIP_PUCKER_L",
    "LIP_PUCKER_R",
    "LIP_STRETCHER_L",
    "LIP_STRETCHER_R",
    "LIP_SUCK_LB",
    "LIP_SUCK_LT",
    "LIP_SUCK_RB",
    "LIP_SUCK_RT",
    "LIP_TIGHTENER_L",
    "LIP_TIGHTENER_R",
    "LIPS_TOWARD",
    "LOWER_LIP_DEPRESSOR_L",
    "LOWER_LIP_DEPRESSOR_R",
    "MOUTH_LEFT",
    "MOUTH_RIGHT",
    "NOSE_WRINKLER_L",
    "NOSE_WRINKLER_R",
    "OUTER_BROW_RAISER_L",
    "OUTER_BROW_RAISER_R",
    "UPPER_LID_RAISER_L",
    "UPPER_LID_RAISER_R",
    "UPPER_LIP_RAISER_L",
    "UPPER_LIP_RAISER_R",
    "TONGUE_TIP_INTERDENTAL",
    "TONGUE_TIP_ALVEOLAR",
    "TONGUE_FRONT_DORSAL_PALATE",
    "TONGUE_MID_DORSAL_PALATE",
    "TONGUE_BACK_DORSAL_VELAR",
    "TONGUE_OUT",
    "TONGUE_RETREAT",
];

/// CC-Base shape keys and common rig shape key names.
pub(super) const FB_FACE2_ALIASES: [(&str, &str); 73] = [
    // CC-Base
    ("eye_blink_l", "EYES_CLOSED_L"),
    ("eye_blink_r", "EYES_CLOSED_R"),
    ("eye_l_look_down", "EYES_LOOK_DOWN_L"),
    ("eye_r_look_down", "EYES_LOOK_DOWN_R"),
    ("eye_l_look_l", "EYES_LOOK_LEFT_L"),
    ("eye_r_look_l", "EYES_LOOK_LEFT_R"),
    ("eye_l_look_r", "EYES_LOOK_RIGHT_L"),
    ("eye_r_look_r", "EYES_LOOK_RIGHT_R"),
    ("eye_l_look_up", "EYES_LOOK_UP_L"),
    ("eye_r_look_up", "EYES_LOOK_UP_R"),
    ("eye_squint_l", "LID_TIGHTENER_L"),
    ("eye_squint_r", "LID_TIGHTENER_R"),
    ("eye_wide_l", "UPPER_LID_RAISER_L"),
    ("eye_wide_r", "UPPER_LID_RAISER_R"),
    ("brow_raise_inner_l", "INNER_BROW_RAISER_L"),
    ("brow_raise_inner_r", "INNER_BROW_RAISER_R"),
    ("brow_raise_outer_l", "OUTER_BROW_RAISER_L"),
    ("brow_raise_outer_r", "OUTER_BROW_RAISER_R"),
    ("brow_drop_l", "BROW_LOWERER_L"),
    ("brow_drop_r", "BROW_LOWERER_R"),
    ("cheek_raise_l", "CHEEK_RAISER_L"),
    ("cheek_raise_r", "CHEEK_RAISER_R"),
    ("jaw_open", "JAW_DROP"),
    ("jaw_l", "JAW_SIDEWAYS_LEFT"),
    ("jaw_r", "JAW_SIDEWAYS_RIGHT"),
    ("jaw_forward", "JAW_THRUST"),
    ("mouth_smile_l", "LIP_CORNER_PULLER_L"),
    ("mouth_smile_r", "LIP_CORNER_PULLER_R"),
    ("mouth_frown_l", "LIP_CORNER_DEPRESSOR_L"),
    ("mouth_frown_r", "LIP_CORNER_DEPRESSOR_R"),
    ("mouth_l", "MOUTH_LEFT"),
    ("mouth_r", "MOUTH_RIGHT"),
    ("mouth_pucker_up_l", "LIP_PUCKER_L"),
    ("mouth_pucker_up_r", "LIP_PUCKER_R"),
    ("mouth_funnel_up_l", "LIP_FUNNELER_LB"),
    ("mouth_funnel_up_r", "LIP_FUNNELER_RB"),
    ("mouth_stretch_l", "LIP_STRETCHER_L"),
    ("mouth_stretch_r", "LIP_STRETCHER_R"),
    ("mouth_press_l", "LIP_PRESSOR_L"),
    ("mouth_press_r", "LIP_PRESSOR_R"),
    ("mouth_tighten_l", "LIP_TIGHTENER_L"),
    ("mouth_tighten_r", "LIP_TIGHTENER_R"),
    ("mouth_dimple_l", "DIMPLER_L"),
    ("mouth_dimple_r", "DIMPLER_R"),
    ("nose_sneer_l", "NOSE_WRINKLER_L"),
    ("nose_sneer_r", "NOSE_WRINKLER_R"),
    // Common rig shape keys
    ("brow_down_left", "BROW_LOWERER_L"),
    ("brow_down_right", "BROW_LOWERER_R"),
    ("cheek_puff_left", "CHEEK_PUFF_L"),
    ("cheek_puff_right", "CHEEK_PUFF_R"),
    ("cheek_raise_left", "CHEEK_RAISER_L"),
    ("cheek_raise_right", "CHEEK_RAISER_R"),
    ("eye_blink_left", "EYES_CLOSED_L"),
    ("eye_blink_right", "EYES_CLOSED_R"),
    ("eye_look_down_left", "EYES_LOOK_DOWN_L"),
    ("eye_look_down_right", "EYES_LOOK_DOWN_R"),
    ("eye_look_left_left", "EYES_LOOK_LEFT_L"),
    ("eye_look_left_right", "EYES_LOOK_LEFT_R"),
    ("eye_look_right_left", "EYES_LOOK_RIGHT_L"),
    ("eye_look_right_right", "EYES_LOOK_RIGHT_R"),
    ("eye_look_up_left", "EYES_LOOK_UP_L"),
    ("eye_look_up_right", "EYES_LOOK_UP_R"),
    ("jaw_left", "JAW_SIDEWAYS_LEFT"),
    ("jaw_right", "JAW_SIDEWAYS_RIGHT"),
    ("mouth_smile_left", "LIP_CORNER_PULLER_L"),
    ("mouth_smile_right", "LIP_CORNER_PULLER_R"),
    ("mouth_frown_left", "LIP_CORNER_DEPRESSOR_L"),
    ("mouth_frown_right", "LIP_CORNER_DEPRESSOR_R"),
    ("mouth_pucker", "LIP_PUCKER_L"),
    ("mouth_funnel", "LIP_FUNNELER_LB"),
    ("nose_sneer_left", "NOSE_WRINKLER_L"),
    ("nose_sneer_right", "NOSE_WRINKLER_R"),
    ("tongue_in", "TONGUE_RETREAT"),
];

// ─── ARKit ───────────────────────────────────────────────────────────────────

pub(super) const ARKIT_BLENDSHAPES: [&str; 52] = [
    "browDownLeft",
    "browDownRight",
    "browInnerUp",
    "browOuterUpLeft",
    "browOuterUpRight",
    "cheekPuff",
    "cheekSquintLeft",
    "cheekSquintRight",
    "eyeBlinkLeft",
    "eyeBlinkRight",
    "eyeLookDownLeft",
    "eyeLookDownRight",
    "eyeLookInLeft",
    "eyeLookInRight",
    "eyeLookOutLeft",
    "eyeLookOutRight",
    "eyeLookUpLeft",
    "eyeLookUpRight",
    "eyeSquintLeft",
    "eyeSquintRight",
    "eyeWideLeft",
    "eyeWideRight",
    "jawForward",
    "jawLeft",
    "jawOpen",
    "jawRight",
    "mouthClose",
    "mouthDimpleLeft",
    "mouthDimpleRight",
    "mouthFrownLeft",
    "mouthFrownRight",
    "mouthFunnel",
    "mouthLeft",
    "mouthLowerDownLeft",
    "mouthLowerDownRight",
    "mouthPressLeft",
    "mouthPressRight",
    "mouthPucker",
    "mouthRight",
    "mouthRollLower",
    "mouthRollUpper",
    "mouthShrugLower",
    "mouthShrugUpper",
    "mouthSmileLeft",
    "mouthSmileRight",
    "mouthStretchLeft",
    "mouthStretchRight",
    "mouthUpperUpLeft",
    "mouthUpperUpRight",
    "noseSneerLeft",
    "noseSneerRight",
    "tongueOut",
];

/// CC-Base shape keys.
pub(super) const ARKIT_ALIASES: [(&str, &str); 40] = [
    ("eye_blink_l", "eyeBlinkLeft"),
    ("eye_blink_r", "eyeBlinkRight"),
    ("eye_squint_l", "eyeSquintLeft"),
    ("eye_squint_r", "eyeSquintRight"),
    ("eye_wide_l", "eyeWideLeft"),
    ("eye_wide_r", "eyeWideRight"),
    ("eye_l_look_down", "eyeLookDownLeft"),
    ("eye_r_look_down", "eyeLookDownRight"),
    ("eye_l_look_up", "eyeLookUpLeft"),
    ("eye_r_look_up", "eyeLookUpRight"),
    ("eye_l_look_l", "eyeLookOutLeft"),
    ("eye_l_look_r", "eyeLookInLeft"),
    ("eye_r_look_l", "eyeLookInRight"),
    ("eye_r_look_r", "eyeLookOutRight"),
    ("brow_drop_l", "browDownLeft"),
    ("brow_drop_r", "browDownRight"),
    ("brow_raise_inner_l", "browInnerUp"),
    ("brow_raise_outer_l", "browOuterUpLeft"),
    ("brow_raise_outer_r", "browOuterUpRight"),
    ("cheek_puff_l", "cheekPuff"),
    ("cheek_raise_l", "cheekSquintLeft"),
    ("cheek_raise_r", "cheekSquintRight"),
    ("jaw_l", "jawLeft"),
    ("jaw_r", "jawRight"),
    ("mouth_smile_l", "mouthSmileLeft"),
    ("mouth_smile_r", "mouthSmileRight"),
    ("mouth_frown_l", "mouthFrownLeft"),
    ("mouth_frown_r", "mouthFrownRight"),
    ("mouth_l", "mouthLeft"),
    ("mouth_r", "mouthRight"),
    ("mouth_press_l", "mouthPressLeft"),
    ("mouth_press_r", "mouthPressRight"),
    ("mouth_stretch_l", "mouthStretchLeft"),
    ("mouth_stretch_r", "mouthStretchRight"),
    ("mouth_dimple_l", "mouthDimpleLeft"),
    ("mouth_dimple_r", "mouthDimpleRight"),
    ("mouth_pucker_up_l", "mouthPucker"),
    ("mouth_funnel_up_l", "mouthFunnel"),
    ("nose_sneer_l", "noseSneerLeft"),
    ("nose_sneer_r", "noseSneerRight"),
];

// ─── OpenXR body tracking ────────────────────────────────────────────────────

pub(super) const FB_BODY_JOINTS: [&str; 84] = [
    "ROOT",
    "HIPS",
    "SPINE_LOWER",
    "SPINE_MIDDLE",
    "SPINE_UPPER",
    "CHEST",
    "NECK",
    "HEAD",
    "LEFT_SHOULDER",
    "LEFT_SCAPULA",
    "LEFT_ARM_UPPER",
    "LEFT_ARM_LOWER",
    "LEFT_HAND_WRIST_TWIST",
    "RIGHT_SHOULDER",
    "RIGHT_SCAPULA",
    "RIGHT_ARM_UPPER",
    "RIGHT_ARM_LOWER",
    "RIGHT_HAND_WRIST_TWIST",
    "LEFT_HAND_PALM",
    "LEFT_HAND_WRIST",
    "LEFT_HAND_THUMB_METACARPAL",
    "LEFT_HAND_THUMB_PROXIMAL",
    "LEFT_HAND_THUMB_DISTAL",
    "LEFT_HAND_THUMB_TIP",
    "LEFT_HAND_INDEX_METACARPAL",
    "LEFT_HAND_INDEX_PROXIMAL",
    "LEFT_HAND_INDEX_INTERMEDIATE",
    "LEFT_HAND_INDEX_DISTAL",
    "LEFT_HAND_INDEX_TIP",
    "LEFT_HAND_MIDDLE_METACARPAL",
    "LEFT_HAND_MIDDLE_PROXIMAL",
    "LEFT_HAND_MIDDLE_INTERMEDIATE",
    "LEFT_HAND_MIDDLE_DISTAL",
    "LEFT_HAND_MIDDLE_TIP",
    "LEFT_HAND_RING_METACARPAL",
    "LEFT_HAND_RING_PROXIMAL",
    "LEFT_HAND_RING_INTERMEDIATE",
    "LEFT_HAND_RING_DISTAL",
    "LEFT_HAND_RING_TIP",
    "LEFT_HAND_LITTLE_METACARPAL",
    "LEFT_HAND_LITTLE_PROXIMAL",
    "LEFT_HAND_LITTLE_INTERMEDIATE",
    "LEFT_HAND_LITTLE_DISTAL",
    "LEFT_HAND_LITTLE_TIP",
    "RIGHT_HAND_PALM",
    "RIGHT_HAND_WRIST",
    "RIGHT_HAND_THUMB_METACARPAL",
    "RIGHT_HAND_THUMB_PROXIMAL",
    "RIGHT_HAND_THUMB_DISTAL",
    "RIGHT_HAND_THUMB_TIP",
    "RIGHT_HAND_INDEX_METACARPAL",
    "RIGHT_HAND_INDEX_PROXIMAL",
    "RIGHT_HAND_INDEX_INTERMEDIATE",
    "RIGHT_HAND_INDEX_DISTAL",
    "RIGHT_HAND_INDEX_TIP",
    "RIGHT_HAND_MIDDLE_METACARPAL",
    "RIGHT_HAND_MIDDLE_PROXIMAL",
    "RIGHT_HAND_MIDDLE_INTERMEDIATE",
    "RIGHT_HAND_MIDDLE_DISTAL",
    "RIGHT_HAND_MIDDLE_TIP",
    "RIGHT_HAND_RING_METACARPAL",
    "RIGHT_HAND_RING_PROXIMAL",
    "RIGHT_HAND_RING_INTERMEDIATE",
    "RIGHT_HAND_RING_DISTAL",
    "RIGHT_HAND_RING_TIP",
    "RIGHT_HAND_LITTLE_METACARPAL",
    "RIGHT_HAND_LITTLE_PROXIMAL",
    "RIGHT_HAND_LITTLE_INTERMEDIATE",
    "RIGHT_HAND_LITTLE_DISTAL",
    "RIGHT_HAND_LITTLE_TIP",
    // Full-body leg joints
    "LEFT_UPPER_LEG",
    "LEFT_LOWER_LEG",
    "LEFT_FOOT_ANKLE_TWIST",
    "LEFT_FOOT_ANKLE",
    "LEFT_FOOT_SUBTALAR",
    "LEFT_FOOT_TRANSVERSE",
    "LEFT_FOOT_BALL",
    "RIGHT_UPPER_LEG",
    "RIGHT_LOWER_LEG",
    "RIGHT_FOOT_ANKLE_TWIST",
    "RIGHT_FOOT_ANKLE",
    "RIGHT_FOOT_SUBTALAR",
    "RIGHT_FOOT_TRANSVERSE",
    "RIGHT_FOOT_BALL",
];

/// CC-Base (prefix stripped) and Blender rig bone names.
pub(super) const FB_BODY_ALIASES: [(&str, &str); 70] = [
    // CC-Base
    ("BoneRoot", "ROOT"),
    ("Hip", "HIPS"),
    ("Pelvis", "HIPS"),
    ("Spine01", "SPINE_LOWER"),
    ("Spine02", "SPINE_MIDDLE"),
    ("Spine03", "SPINE_UPPER"),
    ("NeckTwist01", "NECK"),
    ("L_Clavicle", "LEFT_SHOULDER"),
    ("L_Upperarm", "LEFT_ARM_UPPER"),
    ("L_Forearm", "LEFT_ARM_LOWER"),
    ("L_Hand", "LEFT_HAND_WRIST_TWIST"),
    ("R_Clavicle", "RIGHT_SHOULDER"),
    ("R_Upperarm", "RIGHT_ARM_UPPER"),
    ("R_Forearm", "RIGHT_ARM_LOWER"),
    ("R_Hand", "RIGHT_HAND_WRIST_TWIST"),
    ("L_Thigh", "LEFT_UPPER_LEG"),
    ("L_Calf", "LEFT_LOWER_LEG"),
    ("L_Foot", "LEFT_FOOT_ANKLE"),
    ("L_ToeBase", "LEFT_FOOT_BALL"),
    ("R_Thigh", "RIGHT_UPPER_LEG"),
    ("R_Calf", "RIGHT_LOWER_LEG"),
    ("R_Foot", "RIGHT_FOOT_ANKLE"),
    ("R_ToeBase", "RIGHT_FOOT_BALL"),
    ("L_Thumb1", "LEFT_HAND_THUMB_METACARPAL"),
    ("L_Thumb2", "LEFT_HAND_THUMB_PROXIMAL"),
    ("L_Thumb3", "LEFT_HAND_THUMB_DISTAL"),
    ("L_Index1", "LEFT_HAND_INDEX_PROXIMAL"),
    ("L_Index2", "LEFT_HAND_INDEX_INTERMEDIATE"),
    ("L_Index3", "LEFT_HAND_INDEX_DISTAL"),
    ("L_Mid1", "LEFT_HAND_MIDDLE_PROXIMAL"),
    ("L_Mid2", "LEFT_HAND_MIDDLE_INTERMEDIATE"),
    ("L_Mid3", "LEFT_HAND_MIDDLE_DISTAL"),
    ("L_Ring1", "LEFT_HAND_RING_PROXIMAL"),
    ("L_Ring2", "LEFT_HAND_RING_INTERMEDIATE"),
    ("L_Ring3", "LEFT_HAND_RING_DISTAL"),
    ("L_Pinky1", "LEFT_HAND_LITTLE_PROXIMAL"),
    ("L_Pinky2", "LEFT_HAND_LITTLE_INTERMEDIATE"),
    ("L_Pinky3", "LEFT_HAND_LITTLE_DISTAL"),
    ("R_Thumb1", "RIGHT_HAND_THUMB_METACARPAL"),
    ("R_Thumb2", "RIGHT_HAND_THUMB_PROXIMAL"),
    ("R_Thumb3", "RIGHT_HAND_THUMB_DISTAL"),
    ("R_Index1", "RIGHT_HAND_INDEX_PROXIMAL"),
    ("R_Index2", "RIGHT_HAND_INDEX_INTERMEDIATE"),
    ("R_Index3", "RIGHT_HAND_INDEX_DISTAL"),
    ("R_Mid1", "RIGHT_HAND_MIDDLE_PROXIMAL"),
    ("R_Mid2", "RIGHT_HAND_MIDDLE_INTERMEDIATE"),
    ("R_Mid3", "RIGHT_HAND_MIDDLE_DISTAL"),
    ("R_Ring1", "RIGHT_HAND_RING_PROXIMAL"),
    ("R_Ring2", "RIGHT_HAND_RING_INTERMEDIATE"),
    ("R_Ring3", "RIGHT_HAND_RING_DISTAL"),
    ("R_Pinky1", "RIGHT_HAND_LITTLE_PROXIMAL"),
    ("R_Pinky2", "RIGHT_HAND_LITTLE_INTERMEDIATE"),
    ("R_Pinky3", "RIGHT_HAND_LITTLE_DISTAL"),
    // Blender rig
    ("spine", "SPINE_LOWER"),
    ("spine1", "SPINE_MIDDLE"),
    ("spine2", "SPINE_UPPER"),
    ("shoulder.l", "LEFT_SHOULDER"),
    ("upper_arm.l", "LEFT_ARM_UPPER"),
    ("forearm.l", "LEFT_ARM_LOWER"),
    ("hand.l", "LEFT_HAND_WRIST_TWIST"),
    ("shoulder.r", "RIGHT_SHOULDER"),
    ("upper_arm.r", "RIGHT_ARM_UPPER"),
    ("forearm.r", "RIGHT_ARM_LOWER"),
    ("hand.r", "RIGHT_HAND_WRIST_TWIST"),
    ("thigh.l", "LEFT_UPPER_LEG"),
    ("shin.l", "LEFT_LOWER_LEG"),
    ("foot.l", "LEFT_FOOT_ANKLE_TWIST"),
    ("thigh.r", "RIGHT_UPPER_LEG"),
    ("shin.r", "RIGHT_LOWER_LEG"),
    ("foot.r", "RIGHT_FOOT_ANKLE_TWIST"),
];

// ─── Unity humanoid ──────────────────────────────────────────────────────────

pub(super) const UNITY_HUMANOID_BONES: [&str; 55] = [
    "Hips",
    "LeftUpperLeg",
    "RightUpperLeg",
    "LeftLowerLeg",
    "RightLowerLeg",
    "LeftFoot",
    "RightFoot",
    "Spine",
    "Chest",
    "UpperChest",
    "Neck",
    "Head",
    "LeftShoulder",
    "RightShoulder",
    "LeftUpperArm",
    "RightUpperArm",
    "LeftLowerArm",
    "RightLowerArm",
    "LeftHand",
    "RightHand",
    "LeftToes",
    "RightToes",
    "LeftEye",
    "RightEye",
    "Jaw",
    "LeftThumbProximal",
    "LeftThumbIntermediate",
    "LeftThumbDistal",
    "LeftIndexProximal",
    "LeftIndexIntermediate",
    "LeftIndexDistal",
    "LeftMiddleProximal",
    "LeftMiddleIntermediate",
    "LeftMiddleDistal",
    "LeftRingProximal",
    "LeftRingIntermediate",
    "LeftRingDistal",
    "LeftLittleProximal",
    "LeftLittleIntermediate",
    "LeftLittleDistal",
    "RightThumbProximal",
    "RightThumbIntermediate",
    "RightThumbDistal",
    "RightIndexProximal",
    "RightIndexIntermediate",
    "RightIndexDistal",
    "RightMiddleProximal",
    "RightMiddleIntermediate",
    "RightMiddleDistal",
    "RightRingProximal",
    "RightRingIntermediate",
    "RightRingDistal",
    "RightLittleProximal",
    "RightLittleIntermediate",
    "RightLittleDistal",
];

/// CC-Base (prefix stripped), Blender rig and Mixamo (prefix stripped) names.
pub(super) const UNITY_HUMANOID_ALIASES: [(&str, &str); 95] = [
    // CC-Base
    ("Hip", "Hips"),
    ("Pelvis", "Hips"),
    ("Waist", "Spine"),
    ("Spine01", "Chest"),
    ("Spine02", "UpperChest"),
    ("NeckTwist01", "Neck"),
    ("JawRoot", "Jaw"),
    ("L_Eye", "LeftEye"),
    ("R_Eye", "RightEye"),
    ("L_Clavicle", "LeftShoulder"),
    ("L_Upperarm", "LeftUpperArm"),
    ("L_Forearm", "LeftLowerArm"),
    ("L_Hand", "LeftHand"),
    ("R_Clavicle", "RightShoulder"),
    ("R_Upperarm", "RightUpperArm"),
    ("R_Forearm", "RightLowerArm"),
    ("R_Hand", "RightHand"),
    ("L_Thigh", "LeftUpperLeg"),
    ("L_Calf", "LeftLowerLeg"),
    ("L_Foot", "LeftFoot"),
    ("L_ToeBase", "LeftToes"),
    ("R_Thigh", "RightUpperLeg"),
    ("R_Calf", "RightLowerLeg"),
    ("R_Foot", "RightFoot"),
    ("R_ToeBase", "RightToes"),
    ("L_Thumb1", "LeftThumbProximal"),
    ("L_Thumb2", "LeftThumbIntermediate"),
    ("L_Thumb3", "LeftThumbDistal"),
    ("L_Index1", "LeftIndexProximal"),
    ("L_Index2", "LeftIndexIntermediate"),
    ("L_Index3", "LeftIndexDistal"),
    ("L_Mid1", "LeftMiddleProximal"),
    ("L_Mid2", "LeftMiddleIntermediate"),
    ("L_Mid3", "LeftMiddleDistal"),
    ("L_Ring1", "LeftRingProximal"),
    ("L_Ring2", "LeftRingIntermediate"),
    ("L_Ring3", "LeftRingDistal"),
    ("L_Pinky1", "LeftLittleProximal"),
    ("L_Pinky2", "LeftLittleIntermediate"),
    ("L_Pinky3", "LeftLittleDistal"),
    ("R_Thumb1", "RightThumbProximal"),
    ("R_Thumb2", "RightThumbIntermediate"),
    ("R_Thumb3", "RightThumbDistal"),
    ("R_Index1", "RightIndexProximal"),
    ("R_Index2", "RightIndexIntermediate"),
    ("R_Index3", "RightIndexDistal"),
    ("R_Mid1", "RightMiddleProximal"),
    ("R_Mid2", "RightMiddleIntermediate"),
    ("R_Mid3", "RightMiddleDistal"),
    ("R_Ring1", "RightRingProximal"),
    ("R_Ring2", "RightRingIntermediate"),
    ("R_Ring3", "RightRingDistal"),
    ("R_Pinky1", "RightLittleProximal"),
    ("R_Pinky2", "RightLittleIntermediate"),
    ("R_Pinky3", "RightLittleDistal"),
    // Blender rig
    ("shoulder.l", "LeftShoulder"),
    ("upper_arm.l", "LeftUpperArm"),
    ("forearm.l", "LeftLowerArm"),
    ("hand.l", "LeftHand"),
    ("shoulder.r", "RightShoulder"),
    ("upper_arm.r", "RightUpperArm"),
    ("forearm.r", "RightLowerArm"),
    ("hand.r", "RightHand"),
    ("thigh.l", "LeftUpperLeg"),
    ("shin.l", "LeftLowerLeg"),
    ("foot.l", "LeftFoot"),
    ("toe.l", "LeftToes"),
    ("thigh.r", "RightUpperLeg"),
    ("shin.r", "RightLowerLeg"),
    ("foot.r", "RightFoot"),
    ("toe.r", "RightToes"),
    // Mixamo
    ("LeftArm", "LeftUpperArm"),
    ("LeftForeArm", "LeftLowerArm"),
    ("LeftUpLeg", "LeftUpperLeg"),
    ("LeftLeg", "LeftLowerLeg"),
    ("RightArm", "RightUpperArm"),
    ("RightForeArm", "RightLowerArm"),
    ("RightUpLeg", "RightUpperLeg"),
    ("RightLeg", "RightLowerLeg"),
    ("LeftToeBase", "LeftToes"),
    ("RightToeBase", "RightToes"),
    ("Spine1", "Chest"),
    ("Spine2", "UpperChest"),
    ("LeftHandThumb1", "LeftThumbProximal"),
    ("LeftHandThumb2", "LeftThumbIntermediate"),
    ("LeftHandThumb3", "LeftThumbDistal"),
    ("LeftHandIndex1", "LeftIndexProximal"),
    ("LeftHandIndex2", "LeftIndexIntermediate"),
    ("LeftHandIndex3", "LeftIndexDistal"),
    ("RightHandThumb1", "RightThumbProximal"),
    ("RightHandThumb2", "RightThumbIntermediate"),
    ("RightHandThumb3", "RightThumbDistal"),
    ("RightHandIndex1", "RightIndexProximal"),
    ("RightHandIndex2", "RightIndexIntermediate"),
    ("RightHandIndex3", "RightIndexDistal"),
];
