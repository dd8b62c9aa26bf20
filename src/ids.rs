//! Run-scoped identifier assignment and cross-reference resolution.
//!
//! One [`IdRegistry`] lives inside each export context. Counters start at 0
//! for every component kind and only move forward, so IDs are contiguous in
//! emission order.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Component types that receive their own ID sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Mesh,
    Skin,
    Skeleton,
    Blendshape,
    Animation,
    Asset,
    Texture,
    Data,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Mesh,
        ComponentKind::Skin,
        ComponentKind::Skeleton,
        ComponentKind::Blendshape,
        ComponentKind::Animation,
        ComponentKind::Asset,
        ComponentKind::Texture,
        ComponentKind::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Mesh => "mesh",
            ComponentKind::Skin => "skin",
            ComponentKind::Skeleton => "skeleton",
            ComponentKind::Blendshape => "blendshape",
            ComponentKind::Animation => "animation",
            ComponentKind::Asset => "asset",
            ComponentKind::Texture => "texture",
            ComponentKind::Data => "data",
        }
    }

    fn slot(self) -> usize {
        match self {
            ComponentKind::Mesh => 0,
            ComponentKind::Skin => 1,
            ComponentKind::Skeleton => 2,
            ComponentKind::Blendshape => 3,
            ComponentKind::Animation => 4,
            ComponentKind::Asset => 5,
            ComponentKind::Texture => 6,
            ComponentKind::Data => 7,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(type, integer)` pair identifying one emitted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId {
    pub kind: ComponentKind,
    pub index: u32,
}

/// Per-kind counters plus a name index for resolving references.
#[derive(Debug, Default)]
pub struct IdRegistry {
    counters: [u32; ComponentKind::ALL.len()],
    names: HashMap<(ComponentKind, String), u32>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next integer for `kind` and records it under `name`.
    ///
    /// Registering the same name twice for one kind is rejected: the second
    /// component would shadow the first and break reference resolution.
    pub fn assign(&mut self, kind: ComponentKind, name: &str) -> Result<ComponentId, ExportError> {
        let key = (kind, name.to_string());
        if self.names.contains_key(&key) {
            return Err(ExportError::invalid(
                name,
                format!("duplicate {} name", kind),
            ));
        }

        let slot = &mut self.counters[kind.slot()];
        let index = *slot;
        *slot += 1;
        self.names.insert(key, index);

        Ok(ComponentId { kind, index })
    }

    /// Resolves an already-assigned component by name.
    pub fn resolve(&self, kind: ComponentKind, name: &str) -> Result<u32, ExportError> {
        self.names
            .get(&(kind, name.to_string()))
            .copied()
            .ok_or_else(|| ExportError::UnresolvedReference {
                kind,
                name: name.to_string(),
            })
    }

    pub fn lookup(&self, kind: ComponentKind, name: &str) -> Option<u32> {
        self.names.get(&(kind, name.to_string())).copied()
    }

    /// Number of IDs handed out so far for `kind`.
    pub fn count(&self, kind: ComponentKind) -> u32 {
        self.counters[kind.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fresh_registry_when_assigning_then_each_kind_starts_at_zero() {
        let mut ids = IdRegistry::new();

        let mesh_a = ids.assign(ComponentKind::Mesh, "Body").expect("assign");
        let skeleton = ids.assign(ComponentKind::Skeleton, "Armature").expect("assign");
        let mesh_b = ids.assign(ComponentKind::Mesh, "Hair").expect("assign");

        assert_eq!(mesh_a.index, 0);
        assert_eq!(mesh_b.index, 1);
        assert_eq!(skeleton.index, 0);
        assert_eq!(ids.count(ComponentKind::Mesh), 2);
        assert_eq!(ids.count(ComponentKind::Animation), 0);
    }

    #[test]
    fn given_assigned_component_when_resolving_then_index_is_returned() {
        let mut ids = IdRegistry::new();
        ids.assign(ComponentKind::Skeleton, "Armature").expect("assign");

        assert_eq!(ids.resolve(ComponentKind::Skeleton, "Armature").ok(), Some(0));
        assert!(matches!(
            ids.resolve(ComponentKind::Skeleton, "Rig"),
            Err(ExportError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn given_duplicate_name_when_assigning_then_counter_does_not_advance() {
        let mut ids = IdRegistry::new();
        ids.assign(ComponentKind::Mesh, "Body").expect("assign");

        assert!(ids.assign(ComponentKind::Mesh, "Body").is_err());
        assert_eq!(ids.count(ComponentKind::Mesh), 1);
    }

    #[test]
    fn given_two_registries_when_assigning_then_counters_are_independent() {
        let mut first = IdRegistry::new();
        let mut second = IdRegistry::new();
        first.assign(ComponentKind::Mesh, "A").expect("assign");
        first.assign(ComponentKind::Mesh, "B").expect("assign");

        let id = second.assign(ComponentKind::Mesh, "A").expect("assign");
        assert_eq!(id.index, 0);
    }
}
