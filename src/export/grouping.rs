use crate::scene::MeshNode;

/// Asset shared by every mesh classified as part of the body.
pub const BODY_ASSET: &str = "body";

/// Substrings marking a mesh as part of the avatar body.
pub(super) const BODY_PATTERNS: [&str; 29] = [
    "body", "skin", "base", "torso", "chest", "pelvis", "abdomen", "waist", "hip", "shoulder",
    "arm", "leg", "hand", "foot", "finger", "toe", "neck", "head", "face", "teeth", "tongue",
    "tear", "occlusion", "eye", "iris", "cornea", "pupil", "sclera", "brow",
];

/// Exporter-specific prefixes dropped from mesh names before classification.
pub(super) const NAME_PREFIXES: [&str; 4] = ["cc_", "std_", "default_", "base_"];

/// Meshes emitted together as one asset.
#[derive(Debug, Clone)]
pub struct AssetGroup<'a> {
    pub name: String,
    pub meshes: Vec<&'a MeshNode>,
}

/// Lowercased mesh name without one leading exporter prefix.
pub fn clean_asset_name(name: &str) -> String {
    let lower = name.to_lowercase();
    NAME_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .unwrap_or(&lower)
        .to_string()
}

pub fn is_body_part(name: &str) -> bool {
    let cleaned = clean_asset_name(name);
    BODY_PATTERNS.iter().any(|pattern| cleaned.contains(pattern))
}

/// Groups meshes into assets.
///
/// Tagged meshes join the asset named by their tag. Untagged body parts share
/// [`BODY_ASSET`]; any other untagged mesh becomes an asset of its own named
/// after its cleaned name. Assets appear in the order of their first mesh.
pub fn group_meshes(meshes: &[MeshNode]) -> Vec<AssetGroup<'_>> {
    let mut groups: Vec<AssetGroup<'_>> = Vec::new();
    for mesh in meshes {
        let name = match &mesh.asset {
            Some(tag) => tag.clone(),
            None if is_body_part(&mesh.name) => BODY_ASSET.to_string(),
            None => {
                let cleaned = clean_asset_name(&mesh.name);
                if cleaned.is_empty() {
                    "asset".to_string()
                } else {
                    cleaned
                }
            }
        };

        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.meshes.push(mesh),
            None => groups.push(AssetGroup {
                name,
                meshes: vec![mesh],
            }),
        }
    }
    groups
}
