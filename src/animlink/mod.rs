//! Maps scene blendshape and bone names onto canonical tracking taxonomies.
//!
//! Each taxonomy is compiled into an ordered rule list: exact rules built from
//! the canonical names first, then the taxonomy's alias table. The first rule
//! whose key equals the normalized source name wins. A name carrying a known
//! rig prefix (`CC_Base_`, `mixamorig:`, ...) is retried without it and can
//! only match as an alias. Names no rule accepts are left out of the table.

mod taxonomy;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

pub use taxonomy::TaxonomyId;

/// Rig prefixes dropped for the alias retry, longest first.
const SOURCE_PREFIXES: [&str; 6] = [
    "cc_base_body_",
    "cc_base_",
    "mixamorig:",
    "mixamorig_",
    "def-",
    "def_",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Blendshape,
    Bone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Alias,
}

/// One AnimationLinks row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationLinkEntry {
    pub source: String,
    pub target: String,
    pub kind: SourceKind,
    pub confidence: Confidence,
}

/// Case-folds and drops every separator.
///
/// `"L_Thigh"` and `"l-thigh"` both become `"lthigh"`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Normalized name without its rig prefix, or `None` when it has none.
///
/// `"CC_Base_L_Thigh"` becomes `"lthigh"`.
pub fn strip_rig_prefix(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    SOURCE_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .map(normalize_name)
}

// ─── Matcher ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct MatchRule {
    key: String,
    canonical: &'static str,
    confidence: Confidence,
}

/// Ordered rule list for one taxonomy.
#[derive(Debug, Clone)]
pub struct TaxonomyMatcher {
    taxonomy: TaxonomyId,
    rules: Vec<MatchRule>,
}

impl TaxonomyMatcher {
    pub fn new(taxonomy: TaxonomyId) -> Self {
        let mut rules = Vec::new();
        for &canonical in taxonomy.canonical_names() {
            for key in [
                normalize_name(canonical),
                normalize_name(&taxonomy.canonical_id(canonical)),
            ] {
                rules.push(MatchRule {
                    key,
                    canonical,
                    confidence: Confidence::Exact,
                });
            }
        }
        for &(alias, canonical) in taxonomy.aliases() {
            rules.push(MatchRule {
                key: normalize_name(alias),
                canonical,
                confidence: Confidence::Alias,
            });
        }
        Self { taxonomy, rules }
    }

    pub fn taxonomy(&self) -> TaxonomyId {
        self.taxonomy
    }

    /// Short canonical name and match confidence for a source name.
    pub fn match_name(&self, name: &str) -> Option<(&'static str, Confidence)> {
        if let Some(found) = self.find(&normalize_name(name)) {
            return Some(found);
        }
        let stripped = strip_rig_prefix(name)?;
        self.find(&stripped)
            .map(|(canonical, _)| (canonical, Confidence::Alias))
    }

    fn find(&self, key: &str) -> Option<(&'static str, Confidence)> {
        if key.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.key == key)
            .map(|rule| (rule.canonical, rule.confidence))
    }
}

// ─── Mapper ──────────────────────────────────────────────────────────────────

/// Mapping table plus the names that were left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationLinkTable {
    pub entries: Vec<AnimationLinkEntry>,
    pub unmatched: Vec<(SourceKind, String)>,
}

#[derive(Debug, Clone)]
pub struct AnimationLinkMapper {
    matchers: Vec<TaxonomyMatcher>,
}

impl AnimationLinkMapper {
    /// Builds matchers for the configured taxonomies, keeping their order and
    /// ignoring repeats.
    pub fn new(taxonomies: &[TaxonomyId]) -> Self {
        let mut seen = HashSet::new();
        let matchers = taxonomies
            .iter()
            .copied()
            .filter(|taxonomy| seen.insert(*taxonomy))
            .map(TaxonomyMatcher::new)
            .collect();
        Self { matchers }
    }

    pub fn taxonomies(&self) -> impl Iterator<Item = TaxonomyId> + '_ {
        self.matchers.iter().map(TaxonomyMatcher::taxonomy)
    }

    /// Maps detected names to every configured taxonomy of the same kind.
    ///
    /// # Arguments
    ///
    /// * `blendshapes` - Blendshape names in detection order.
    /// * `bones` - Bone names in detection order.
    ///
    /// # Returns
    ///
    /// Entries ordered by source (blendshapes, then bones, each in detection
    /// order) and, per source, by taxonomy configuration order.
    pub fn map(&self, blendshapes: &[String], bones: &[String]) -> Result<AnimationLinkTable, ExportError> {
        ensure_unique_sources(blendshapes)?;
        ensure_unique_sources(bones)?;

        let mut table = AnimationLinkTable::default();
        for (kind, names) in [(SourceKind::Blendshape, blendshapes), (SourceKind::Bone, bones)] {
            let matchers: Vec<&TaxonomyMatcher> = self
                .matchers
                .iter()
                .filter(|matcher| matcher.taxonomy().source_kind() == kind)
                .collect();
            if matchers.is_empty() {
                continue;
            }

            for name in names {
                let before = table.entries.len();
                for matcher in &matchers {
                    if let Some((canonical, confidence)) = matcher.match_name(name) {
                        table.entries.push(AnimationLinkEntry {
                            source: name.clone(),
                            target: matcher.taxonomy().target_urn(canonical),
                            kind,
                            confidence,
                        });
                    }
                }
                if table.entries.len() == before {
                    log::warn!("no canonical {:?} target for '{}'", kind, name);
                    table.unmatched.push((kind, name.clone()));
                }
            }
        }
        Ok(table)
    }
}

fn ensure_unique_sources(names: &[String]) -> Result<(), ExportError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ExportError::DuplicateAnimationSource { name: name.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn given_separators_when_normalizing_then_only_case_and_separators_change() {
        assert_eq!(normalize_name("L_Thigh"), "lthigh");
        assert_eq!(normalize_name("CC_Base_L_Thigh"), "ccbaselthigh");
        assert_eq!(normalize_name("Jaw Open"), "jawopen");
        assert_eq!(normalize_name("upper_arm.L"), "upperarml");
    }

    #[test]
    fn given_rig_prefixes_when_stripping_then_remainder_is_normalized() {
        assert_eq!(strip_rig_prefix("CC_Base_L_Thigh").as_deref(), Some("lthigh"));
        assert_eq!(strip_rig_prefix("mixamorig:LeftUpLeg").as_deref(), Some("leftupleg"));
        assert_eq!(strip_rig_prefix("Hips"), None);
    }

    #[test]
    fn given_prefixed_canonical_name_when_matching_then_confidence_is_alias() {
        let matcher = TaxonomyMatcher::new(TaxonomyId::UnityHumanoid);

        assert_eq!(matcher.match_name("Hips"), Some(("Hips", Confidence::Exact)));
        assert_eq!(matcher.match_name("mixamorig:Hips"), Some(("Hips", Confidence::Alias)));
        assert_eq!(matcher.match_name("CC_Base_Head"), Some(("Head", Confidence::Alias)));
    }

    #[test]
    fn given_canonical_name_when_matching_then_confidence_is_exact() {
        let matcher = TaxonomyMatcher::new(TaxonomyId::OpenxrFaceFb2);

        assert_eq!(matcher.match_name("jaw_drop"), Some(("JAW_DROP", Confidence::Exact)));
        assert_eq!(
            matcher.match_name("XR_FACE_EXPRESSION2_JAW_DROP_FB"),
            Some(("JAW_DROP", Confidence::Exact))
        );
    }

    #[test]
    fn given_alias_name_when_matching_then_confidence_is_alias() {
        let matcher = TaxonomyMatcher::new(TaxonomyId::OpenxrFaceFb2);

        assert_eq!(matcher.match_name("Jaw_Open"), Some(("JAW_DROP", Confidence::Alias)));
        assert_eq!(
            matcher.match_name("Mouth_Smile_L"),
            Some(("LIP_CORNER_PULLER_L", Confidence::Alias))
        );
    }

    #[test]
    fn given_unknown_name_when_mapping_then_it_is_omitted_not_defaulted() {
        let mapper = AnimationLinkMapper::new(&[TaxonomyId::OpenxrFaceFb2]);

        let table = mapper.map(&names(&["smile", "Jaw_Open"]), &[]).expect("map");

        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].source, "Jaw_Open");
        assert_eq!(
            table.entries[0].target,
            "urn:khronos:openxr:facial-animation:fb-tracking2:XR_FACE_EXPRESSION2_JAW_DROP_FB"
        );
        assert_eq!(table.unmatched, vec![(SourceKind::Blendshape, "smile".to_string())]);
    }

    #[test]
    fn given_several_taxonomies_when_mapping_then_order_follows_sources_then_config() {
        let mapper = AnimationLinkMapper::new(&[TaxonomyId::Arkit, TaxonomyId::OpenxrFaceFb2]);

        let table = mapper
            .map(&names(&["Eye_Blink_L", "jawOpen"]), &[])
            .expect("map");
        let rows: Vec<(&str, &str)> = table
            .entries
            .iter()
            .map(|entry| (entry.source.as_str(), entry.target.rsplit(':').next().unwrap_or("")))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("Eye_Blink_L", "eyeBlinkLeft"),
                ("Eye_Blink_L", "XR_FACE_EXPRESSION2_EYES_CLOSED_L_FB"),
                ("jawOpen", "jawOpen"),
                ("jawOpen", "XR_FACE_EXPRESSION2_JAW_DROP_FB"),
            ]
        );
    }

    #[test]
    fn given_bones_when_mapping_then_only_body_taxonomies_apply() {
        let mapper = AnimationLinkMapper::new(&[TaxonomyId::OpenxrFaceFb2, TaxonomyId::UnityHumanoid]);

        let table = mapper
            .map(&[], &names(&["Hips", "CC_Base_L_Thigh", "thigh.r", "mixamorig:LeftForeArm"]))
            .expect("map");
        let targets: Vec<&str> = table
            .entries
            .iter()
            .map(|entry| entry.target.rsplit(':').next().unwrap_or(""))
            .collect();

        assert_eq!(targets, vec!["Hips", "LeftUpperLeg", "RightUpperLeg", "LeftLowerArm"]);
        let confidences: Vec<Confidence> = table.entries.iter().map(|entry| entry.confidence).collect();
        assert_eq!(
            confidences,
            vec![Confidence::Exact, Confidence::Alias, Confidence::Alias, Confidence::Alias]
        );
        assert!(table.entries.iter().all(|entry| entry.kind == SourceKind::Bone));
    }

    #[test]
    fn given_duplicate_source_when_mapping_then_error_names_it() {
        let mapper = AnimationLinkMapper::new(&[TaxonomyId::OpenxrFaceFb2]);

        let result = mapper.map(&names(&["smile", "blink", "smile"]), &[]);
        assert!(matches!(
            result,
            Err(ExportError::DuplicateAnimationSource { ref name }) if name == "smile"
        ));
    }

    #[test]
    fn given_same_name_as_bone_and_blendshape_when_mapping_then_it_is_not_a_duplicate() {
        let mapper = AnimationLinkMapper::new(&[TaxonomyId::UnityHumanoid]);
        assert!(mapper.map(&names(&["Jaw"]), &names(&["Jaw"])).is_ok());
    }

    #[test]
    fn given_every_taxonomy_when_building_matchers_then_alias_targets_are_canonical() {
        for taxonomy in [
            TaxonomyId::OpenxrFaceFb2,
            TaxonomyId::Arkit,
            TaxonomyId::OpenxrBodyFb,
            TaxonomyId::UnityHumanoid,
        ] {
            let canonical = taxonomy.canonical_names();
            for (alias, target) in taxonomy.aliases() {
                assert!(canonical.contains(target), "{alias} -> {target} in {taxonomy:?}");
            }
        }
    }
}
