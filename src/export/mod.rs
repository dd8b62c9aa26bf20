mod grouping;
mod types;

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};
use jiff::Timestamp;

use crate::{
    animlink::{AnimationLinkMapper, SourceKind},
    container::{ArchiveSink, AssetSink},
    dedup::TextureStore,
    error::ExportError,
    glb::{
        EmbeddedSkin, MaterialBinding, MeshAssetOptions, build_animation_asset,
        build_blendshape_asset, build_mesh_asset, build_skeleton_asset,
    },
    ids::{ComponentKind, IdRegistry},
    lod::{LodStrategy, TriangleStrideDecimator, generate_lod, lod_level_name},
    logging::ResultExt,
    manifest::{
        AnimationComponent, AssetEntry, BlendshapeComponent, DENSE_TENSOR_TYPE, DataComponent,
        LodEntry, MANIFEST_PATH, Manifest, MeshComponent, Metadata, SkeletonComponent,
        SkeletonJoint, SkinComponent, SupportedAnimations, TextureComponent,
    },
    scene::{AnimationClip, MeshNode, SceneDescription, SkeletonNode, TextureAsset, load_scene},
    tensor::{DenseTensor, encode_skin, pad_influences},
};

pub use grouping::{AssetGroup, BODY_ASSET, clean_asset_name, group_meshes, is_body_part};
pub use types::{
    CancelToken, ComponentToggles, ExportOptions, ExportReport, Severity, ValidationIssue,
};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Runs export passes over scene descriptions.
///
/// The exporter holds configuration only. Every [`Exporter::run`] call builds
/// a fresh context, so IDs and the texture table never leak between runs.
pub struct Exporter {
    options: ExportOptions,
    lod_strategy: Box<dyn LodStrategy>,
    cancel: CancelToken,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            lod_strategy: Box::new(TriangleStrideDecimator),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_lod_strategy(mut self, strategy: Box<dyn LodStrategy>) -> Self {
        self.lod_strategy = strategy;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Emits every component of `scene` into `sink`, then the manifest.
    ///
    /// # Arguments
    ///
    /// * `scene` - Normalized scene; validated before anything is written.
    /// * `sink` - Destination for binary assets and `arf.json`.
    ///
    /// # Returns
    ///
    /// The run report. On error nothing is written for the manifest, so the
    /// sink never holds a half-built container description.
    pub fn run<S: AssetSink + ?Sized>(
        &self,
        scene: &SceneDescription,
        sink: &mut S,
    ) -> Result<ExportReport, ExportError> {
        scene.validate()?;
        let context = ExportContext::new(
            scene,
            &self.options,
            self.lod_strategy.as_ref(),
            &self.cancel,
            sink,
        );
        context.run()
    }
}

/// Exports `scene` into an in-memory ARF archive.
pub fn export_scene(
    scene: &SceneDescription,
    options: ExportOptions,
) -> Result<(Vec<u8>, ExportReport), ExportError> {
    let mut sink = ArchiveSink::new();
    let report = Exporter::new(options).run(scene, &mut sink)?;
    Ok((sink.finish()?, report))
}

/// Loads a scene file and writes the ARF archive to `output_path`.
///
/// The archive file is created only after every component and the manifest
/// were produced.
pub fn export_to_file(
    scene_path: &Path,
    output_path: &Path,
    options: ExportOptions,
) -> Result<ExportReport> {
    let scene = load_scene(scene_path)?;
    let mut sink = ArchiveSink::new();
    let report = Exporter::new(options)
        .run(&scene, &mut sink)
        .log_error(Some("export"))
        .with_context(|| format!("failed to export scene: {}", scene_path.display()))?;
    sink.persist(output_path)
        .with_context(|| format!("failed to write ARF archive: {}", output_path.display()))?;
    Ok(report)
}

// ─── Run-scoped context ───────────────────────────────────────────────────────

const MESH_DIR: &str = "meshes";
const LOD_DIR: &str = "lods";
const BLENDSHAPE_DIR: &str = "blendshapes";
const DATA_DIR: &str = "data";
const ANIMATION_DIR: &str = "animations";

/// Where a mesh asset lands and how it reaches the shared texture directory.
#[derive(Debug, Clone, Copy)]
struct MeshTarget {
    dir: &'static str,
    texture_prefix: &'static str,
}

const ORIGINAL_MESH: MeshTarget = MeshTarget {
    dir: MESH_DIR,
    texture_prefix: "textures/",
};

const LOD_MESH: MeshTarget = MeshTarget {
    dir: LOD_DIR,
    texture_prefix: "../meshes/textures/",
};

/// File stems only have to be unique within one namespace. Meshes, LOD
/// meshes, skeletons and skin tensors share one, since they share `meshes/`
/// or derive `data/` paths from the mesh stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StemSpace {
    Mesh,
    Blendshape,
    Animation,
}

/// IDs produced by emitting one mesh.
#[derive(Debug, Clone, Copy)]
struct EmittedMesh {
    mesh: u32,
    skin: Option<u32>,
    skeleton: Option<u32>,
}

struct ExportContext<'a, S: AssetSink + ?Sized> {
    scene: &'a SceneDescription,
    options: &'a ExportOptions,
    lod_strategy: &'a dyn LodStrategy,
    cancel: &'a CancelToken,
    sink: &'a mut S,
    ids: IdRegistry,
    textures: TextureStore,
    manifest: Manifest,
    report: ExportReport,
    stems: HashSet<(StemSpace, String)>,
}

impl<'a, S: AssetSink + ?Sized> ExportContext<'a, S> {
    fn new(
        scene: &'a SceneDescription,
        options: &'a ExportOptions,
        lod_strategy: &'a dyn LodStrategy,
        cancel: &'a CancelToken,
        sink: &'a mut S,
    ) -> Self {
        let textures = match options.texture_max_size {
            Some(max_size) => TextureStore::new().with_downscale(max_size, options.texture_resize_method),
            None => TextureStore::new(),
        };
        let created = options.created_at.unwrap_or_else(Timestamp::now);
        let metadata = Metadata::from_config(&options.metadata, &scene.name, created);
        let supported = SupportedAnimations {
            skeletal: options.body_taxonomies.iter().map(|t| t.urn().to_string()).collect(),
            facial: options.face_taxonomies.iter().map(|t| t.urn().to_string()).collect(),
        };

        Self {
            scene,
            options,
            lod_strategy,
            cancel,
            sink,
            ids: IdRegistry::new(),
            textures,
            manifest: Manifest::new(supported, metadata),
            report: ExportReport {
                avatar_name: scene.name.clone(),
                ..ExportReport::default()
            },
            stems: HashSet::new(),
        }
    }

    fn run(mut self) -> Result<ExportReport, ExportError> {
        let scene = self.scene;
        let toggles = self.options.components;
        // Skins and animations reference skeleton ids.
        let skins_enabled = toggles.skins && toggles.skeletons;
        let animations_enabled = toggles.animations && toggles.skeletons;

        self.map_animation_links()?;

        if toggles.skeletons {
            for skeleton in &scene.skeletons {
                self.check_cancelled()?;
                self.emit_skeleton(skeleton)?;
            }
        }

        for group in group_meshes(&scene.meshes) {
            self.check_cancelled()?;
            self.emit_asset(&group, skins_enabled)?;
        }

        if animations_enabled {
            for clip in &scene.animations {
                self.check_cancelled()?;
                self.emit_animation(clip)?;
            }
        }

        self.check_cancelled()?;
        let manifest = self.manifest.to_json_bytes()?;
        self.write(MANIFEST_PATH.to_string(), &manifest)?;

        let report = self.finish_report();
        log::info!(
            "exported '{}': {} assets, {} meshes, {} textures",
            report.avatar_name,
            report.asset_count,
            report.mesh_count,
            report.texture_count
        );
        Ok(report)
    }

    fn check_cancelled(&self) -> Result<(), ExportError> {
        if self.cancel.is_cancelled() {
            log::warn!("export of '{}' cancelled", self.scene.name);
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }

    /// Path-safe stem for `name`, suffixed `_1`, `_2`, ... when another
    /// component already took it.
    fn claim_stem(&mut self, space: StemSpace, name: &str) -> String {
        let base = file_stem(name);
        let mut stem = base.clone();
        let mut suffix = 1;
        while !self.stems.insert((space, stem.clone())) {
            stem = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if stem != base {
            log::debug!("'{}' renamed to '{}' to keep asset paths unique", name, stem);
        }
        stem
    }

    fn write(&mut self, path: String, bytes: &[u8]) -> Result<String, ExportError> {
        self.sink.write(&path, bytes)?;
        log::debug!("wrote {} ({} bytes)", path, bytes.len());
        self.report.written_paths.push(path.clone());
        Ok(path)
    }

    // ─── AnimationLinks ──────────────────────────────────────────────────────

    fn map_animation_links(&mut self) -> Result<(), ExportError> {
        let toggles = self.options.components;
        let blendshapes: Vec<String> = if toggles.blendshapes {
            self.scene
                .blendshape_sets
                .iter()
                .flat_map(|set| set.deltas.iter().map(|delta| delta.name.clone()))
                .collect()
        } else {
            Vec::new()
        };
        let bones: Vec<String> = if toggles.skeletons {
            self.scene
                .skeletons
                .iter()
                .flat_map(|skeleton| skeleton.joints.iter().map(|joint| joint.name.clone()))
                .collect()
        } else {
            Vec::new()
        };

        let mapper = AnimationLinkMapper::new(&self.options.taxonomies());
        let table = mapper.map(&blendshapes, &bones)?;
        for (kind, name) in &table.unmatched {
            let kind = match kind {
                SourceKind::Blendshape => "blendshape",
                SourceKind::Bone => "bone",
            };
            self.report.issues.push(ValidationIssue::warning(
                "ANIMATION_LINK_UNMATCHED",
                format!("[WARN] No canonical target for {} '{}'", kind, name),
            ));
        }
        self.report.unmatched_sources = table.unmatched;
        self.manifest.animation_links = table.entries;
        Ok(())
    }

    // ─── Skeletons ───────────────────────────────────────────────────────────

    fn emit_skeleton(&mut self, skeleton: &SkeletonNode) -> Result<(), ExportError> {
        let bytes = build_skeleton_asset(skeleton, self.options.scale)?;
        let stem = self.claim_stem(StemSpace::Mesh, &format!("{}_skeleton", skeleton.name));
        let uri = self.write(format!("{}/{}.glb", MESH_DIR, stem), &bytes)?;
        let id = self.ids.assign(ComponentKind::Skeleton, &skeleton.name)?;

        self.manifest.components.skeletons.push(SkeletonComponent {
            id: id.index,
            name: skeleton.name.clone(),
            uri,
            joints: skeleton
                .joints
                .iter()
                .map(|joint| SkeletonJoint {
                    name: joint.name.clone(),
                    parent: joint.parent,
                })
                .collect(),
            root: skeleton.root_index(),
        });
        log::info!("skeleton {} '{}' ({} joints)", id.index, skeleton.name, skeleton.joints.len());
        Ok(())
    }

    // ─── Assets, meshes and LODs ─────────────────────────────────────────────

    fn emit_asset(&mut self, group: &AssetGroup<'a>, skins_enabled: bool) -> Result<(), ExportError> {
        let asset = self.ids.assign(ComponentKind::Asset, &group.name)?;
        let options = self.options;
        let lod_ratios: &[f32] = if options.components.lods { &options.lod_ratios } else { &[] };

        let mut levels: Vec<LodEntry> = (0..=lod_ratios.len())
            .map(|level| LodEntry {
                name: lod_level_name(level),
                ..LodEntry::default()
            })
            .collect();

        for &mesh in &group.meshes {
            self.check_cancelled()?;
            let emitted = self.emit_mesh(mesh, ORIGINAL_MESH, skins_enabled)?;
            push_mesh(&mut levels[0], emitted);

            let blendshapes = if options.components.blendshapes {
                self.emit_blendshapes(mesh, emitted.mesh)?
            } else {
                Vec::new()
            };
            levels[0].blendshapes.extend(&blendshapes);

            for (offset, &ratio) in lod_ratios.iter().enumerate() {
                self.check_cancelled()?;
                let level = offset + 1;
                let mut result = generate_lod(self.lod_strategy, mesh, ratio)?;
                result.mesh.name = self.lod_mesh_name(&mesh.name, level);

                let emitted = self.emit_mesh(&result.mesh, LOD_MESH, skins_enabled)?;
                push_mesh(&mut levels[level], emitted);

                if blendshapes.is_empty() {
                    continue;
                }
                if result.preserves_vertices {
                    levels[level].blendshapes.extend(&blendshapes);
                } else {
                    log::warn!(
                        "{} changed the vertices of '{}'; blendshapes are left out of LOD {}",
                        self.lod_strategy.name(),
                        mesh.name,
                        level
                    );
                    self.report.issues.push(ValidationIssue::warning(
                        "LOD_BLENDSHAPES_DROPPED",
                        format!(
                            "[WARN] LOD {} of '{}' does not keep vertex order; blendshapes omitted",
                            level, mesh.name
                        ),
                    ));
                }
            }
        }

        self.manifest.structure.assets.push(AssetEntry {
            id: asset.index,
            name: group.name.clone(),
            lods: levels,
        });
        log::info!("asset {} '{}' ({} meshes)", asset.index, group.name, group.meshes.len());
        Ok(())
    }

    /// `<mesh>_LOD<n>`, suffixed when a scene mesh or an earlier LOD already
    /// uses that name.
    fn lod_mesh_name(&self, mesh: &str, level: usize) -> String {
        let base = format!("{}_LOD{}", mesh, level);
        let taken = |name: &str| {
            self.scene.mesh(name).is_some() || self.ids.lookup(ComponentKind::Mesh, name).is_some()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while taken(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        name
    }

    fn emit_mesh(
        &mut self,
        mesh: &MeshNode,
        target: MeshTarget,
        skins_enabled: bool,
    ) -> Result<EmittedMesh, ExportError> {
        if mesh.is_empty() {
            return Err(ExportError::EmptyMeshAsset {
                mesh: mesh.name.clone(),
            });
        }
        let scene = self.scene;
        let stem = self.claim_stem(StemSpace::Mesh, &mesh.name);
        let scale = self.options.scale;

        let material = match &mesh.material {
            Some(name) => scene.material(name),
            None => None,
        };
        let mut texture_ids = Vec::new();
        let mut binding = None;
        if let Some(material) = material {
            let mut textures = Vec::new();
            if self.options.components.textures {
                for texture in &material.textures {
                    let (id, file_name) = self.intern_texture(texture)?;
                    texture_ids.push(id);
                    textures.push((texture.channel, format!("{}{}", target.texture_prefix, file_name)));
                }
            }
            binding = Some(MaterialBinding { material, textures });
        }

        let skin_target = match (&mesh.skin, skins_enabled) {
            (Some(skin), true) => {
                let skeleton = scene.skeleton(&skin.skeleton).ok_or_else(|| {
                    ExportError::MalformedSkinBinding {
                        mesh: mesh.name.clone(),
                        reason: format!("unknown skeleton '{}'", skin.skeleton),
                    }
                })?;
                Some((skin, skeleton))
            }
            _ => None,
        };

        let mut tensor_ids = None;
        let mut embedded_skin = None;
        if let Some((skin, skeleton)) = skin_target {
            if self.options.use_tensor_weights {
                let encoded = encode_skin(
                    &mesh.name,
                    skin,
                    mesh.vertex_count(),
                    skeleton.joints.len(),
                    self.options.tensor_precision,
                )?;
                log::debug!(
                    "'{}' skin tensors: joints dtype {} ({} bytes), weights dtype {} ({} bytes)",
                    mesh.name,
                    encoded.joints.dtype,
                    encoded.joints.data.len(),
                    encoded.weights.dtype,
                    encoded.weights.data.len()
                );
                let joints = self.emit_tensor(format!("{}_skin_joints", stem), &encoded.joints)?;
                let weights = self.emit_tensor(format!("{}_skin_weights", stem), &encoded.weights)?;
                tensor_ids = Some((joints, weights));
            } else {
                let influences = pad_influences(&mesh.name, skin, mesh.vertex_count(), skeleton.joints.len())?;
                embedded_skin = Some(EmbeddedSkin { skeleton, influences });
            }
        }

        let options = MeshAssetOptions {
            scale,
            material: binding,
            embedded_skin,
        };
        let bytes = build_mesh_asset(mesh, &options)?;
        let uri = self.write(format!("{}/{}.glb", target.dir, stem), &bytes)?;
        let mesh_id = self.ids.assign(ComponentKind::Mesh, &mesh.name)?;

        self.manifest.components.meshes.push(MeshComponent {
            id: mesh_id.index,
            name: mesh.name.clone(),
            uri: uri.clone(),
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            material: mesh.material.clone(),
            textures: texture_ids,
        });
        log::info!(
            "mesh {} '{}' ({} vertices, {} faces)",
            mesh_id.index,
            mesh.name,
            mesh.vertex_count(),
            mesh.face_count()
        );
        if target.dir == MESH_DIR {
            self.report.total_vertices += mesh.vertex_count();
            self.report.total_faces += mesh.face_count();
        }

        let mut emitted = EmittedMesh {
            mesh: mesh_id.index,
            skin: None,
            skeleton: None,
        };
        if let Some((skin, _)) = skin_target {
            let skeleton_id = self.ids.resolve(ComponentKind::Skeleton, &skin.skeleton)?;
            let skin_name = format!("{}_skin", mesh.name);
            let skin_id = self.ids.assign(ComponentKind::Skin, &skin_name)?;
            let component = match tensor_ids {
                Some((joints, weights)) => SkinComponent {
                    id: skin_id.index,
                    name: skin_name,
                    mesh: mesh_id.index,
                    skeleton: skeleton_id,
                    uri: None,
                    joints: Some(joints),
                    weights: Some(weights),
                    precision: Some(self.options.tensor_precision),
                    embedded: false,
                },
                None => SkinComponent {
                    id: skin_id.index,
                    name: skin_name,
                    mesh: mesh_id.index,
                    skeleton: skeleton_id,
                    uri: Some(uri),
                    joints: None,
                    weights: None,
                    precision: None,
                    embedded: true,
                },
            };
            self.manifest.components.skins.push(component);
            emitted.skin = Some(skin_id.index);
        }
        if let Some(skin) = &mesh.skin {
            emitted.skeleton = self.ids.lookup(ComponentKind::Skeleton, &skin.skeleton);
        }
        Ok(emitted)
    }

    /// Writes one dense tensor to `data/<name>.bin` and lists it under
    /// `components.data`.
    fn emit_tensor(&mut self, name: String, tensor: &DenseTensor) -> Result<u32, ExportError> {
        let uri = self.write(format!("{}/{}.bin", DATA_DIR, name), &tensor.to_bytes())?;
        let id = self.ids.assign(ComponentKind::Data, &name)?;
        self.manifest.components.data.push(DataComponent {
            id: id.index,
            name,
            uri,
            media_type: DENSE_TENSOR_TYPE.to_string(),
            dtype: tensor.dtype,
            shape: tensor.shape.clone(),
        });
        Ok(id.index)
    }

    fn intern_texture(&mut self, texture: &TextureAsset) -> Result<(u32, String), ExportError> {
        if texture.data.is_empty() {
            return Err(ExportError::invalid(&texture.name, "texture has no image data"));
        }
        let interned = self
            .textures
            .intern(&texture.data, &texture.name, texture.format, texture.channel)?;

        if !interned.newly_stored {
            let id = self.ids.resolve(ComponentKind::Texture, &interned.file_name)?;
            return Ok((id, interned.file_name));
        }

        let stored = self.textures.get(interned.index).ok_or_else(|| {
            ExportError::invalid(&texture.name, "texture vanished from the store")
        })?;
        let uri = self.write(stored.container_path(), &stored.bytes)?;
        let id = self.ids.assign(ComponentKind::Texture, &interned.file_name)?;
        self.manifest.components.textures.push(TextureComponent {
            id: id.index,
            uri,
            channel: stored.channel,
            mime_type: stored.format.mime_type().to_string(),
        });
        log::info!("texture {} '{}'", id.index, interned.file_name);
        Ok((id.index, interned.file_name))
    }

    fn emit_blendshapes(&mut self, mesh: &MeshNode, mesh_id: u32) -> Result<Vec<u32>, ExportError> {
        let scene = self.scene;
        let mut ids = Vec::new();
        for set in scene.blendshapes_for(&mesh.name) {
            for delta in &set.deltas {
                self.check_cancelled()?;
                let bytes = build_blendshape_asset(&delta.name, &delta.offsets, self.options.scale)?;
                let stem = self.claim_stem(StemSpace::Blendshape, &format!("{}_{}", mesh.name, delta.name));
                let uri = self.write(format!("{}/{}.glb", BLENDSHAPE_DIR, stem), &bytes)?;
                let id = self.ids.assign(ComponentKind::Blendshape, &stem)?;

                self.manifest.components.blendshapes.push(BlendshapeComponent {
                    id: id.index,
                    name: delta.name.clone(),
                    uri,
                    mesh: mesh_id,
                    vertex_count: delta.offsets.len(),
                });
                log::info!("blendshape {} '{}' on '{}'", id.index, delta.name, mesh.name);
                ids.push(id.index);
            }
        }
        Ok(ids)
    }

    // ─── Animations ──────────────────────────────────────────────────────────

    fn emit_animation(&mut self, clip: &AnimationClip) -> Result<(), ExportError> {
        let skeleton = self
            .scene
            .skeleton(&clip.skeleton)
            .ok_or_else(|| ExportError::UnresolvedReference {
                kind: ComponentKind::Skeleton,
                name: clip.skeleton.clone(),
            })?;
        let skeleton_id = self.ids.resolve(ComponentKind::Skeleton, &clip.skeleton)?;

        let bytes = build_animation_asset(clip, skeleton, self.options.scale)?;
        let stem = self.claim_stem(StemSpace::Animation, &clip.name);
        let uri = self.write(format!("{}/{}.glb", ANIMATION_DIR, stem), &bytes)?;
        let id = self.ids.assign(ComponentKind::Animation, &clip.name)?;

        self.manifest.components.animations.push(AnimationComponent {
            id: id.index,
            name: clip.name.clone(),
            uri,
            skeleton: skeleton_id,
            duration: clip.duration(),
            channels: clip.channels.len(),
        });
        log::info!("animation {} '{}' ({:.2}s)", id.index, clip.name, clip.duration());
        Ok(())
    }

    fn finish_report(self) -> ExportReport {
        let mut report = self.report;
        report.asset_count = self.ids.count(ComponentKind::Asset) as usize;
        report.mesh_count = self.ids.count(ComponentKind::Mesh) as usize;
        report.skin_count = self.ids.count(ComponentKind::Skin) as usize;
        report.skeleton_count = self.ids.count(ComponentKind::Skeleton) as usize;
        report.blendshape_count = self.ids.count(ComponentKind::Blendshape) as usize;
        report.animation_count = self.ids.count(ComponentKind::Animation) as usize;
        report.texture_count = self.textures.len();
        report.animation_links = self.manifest.animation_links;
        report
    }
}

fn push_mesh(level: &mut LodEntry, emitted: EmittedMesh) {
    level.meshes.push(emitted.mesh);
    if let Some(skin) = emitted.skin {
        level.skins.push(skin);
    }
    if let Some(skeleton) = emitted.skeleton {
        if !level.skeletons.contains(&skeleton) {
            level.skeletons.push(skeleton);
        }
    }
}

/// File-system safe stem for a component name.
pub(crate) fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}
