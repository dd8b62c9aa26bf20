use std::io::{Cursor, Read};

use arf_export::{
    ExportError,
    container::{AssetSink, MemorySink},
    export::{CancelToken, ComponentToggles, ExportOptions, Exporter, export_scene, export_to_file},
    manifest::{DENSE_TENSOR_TYPE, MANIFEST_PATH, Manifest},
    scene::{
        AnimationChannel, AnimationClip, BlendshapeDelta, BlendshapeSet, ChannelPath, Interpolation,
        Joint, MaterialRef, MeshNode, SceneDescription, SkeletonNode, SkinBinding, TextureAsset,
        TextureChannel, TextureFormat,
    },
    tensor::{DTYPE_F16, DTYPE_U8, DenseTensor, decode_skin},
};
use gltf::Semantic;
use image::{DynamicImage, ImageFormat, RgbaImage};

// ─── Fixtures ─────────────────────────────────────────────────────────────────

const JOINT_COUNT: usize = 20;

fn png_bytes(size: u32) -> Vec<u8> {
    let mut image = RgbaImage::new(size, size);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]);
    }
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encode");
    bytes
}

/// 10×10 vertex grid in the XY plane of the source convention.
fn grid_mesh(name: &str, material: Option<&str>) -> MeshNode {
    let mut mesh = MeshNode {
        name: name.to_string(),
        material: material.map(str::to_string),
        ..MeshNode::default()
    };
    for row in 0..10u32 {
        for column in 0..10u32 {
            mesh.positions.push([column as f32 * 0.1, 0.0, row as f32 * 0.1]);
            mesh.normals.push([0.0, -1.0, 0.0]);
            mesh.uvs.push([column as f32 / 9.0, row as f32 / 9.0]);
        }
    }
    for row in 0..9u32 {
        for column in 0..9u32 {
            let base = row * 10 + column;
            mesh.indices.extend_from_slice(&[base, base + 1, base + 10]);
            mesh.indices.extend_from_slice(&[base + 1, base + 11, base + 10]);
        }
    }
    mesh
}

fn chain_skeleton() -> SkeletonNode {
    SkeletonNode {
        name: "Armature".to_string(),
        joints: (0..JOINT_COUNT)
            .map(|index| {
                let mut joint = Joint {
                    name: format!("Bone_{index:02}"),
                    parent: index as i32 - 1,
                    ..Joint::default()
                };
                if index > 0 {
                    joint.bind_transform[14] = 0.05;
                }
                joint
            })
            .collect(),
    }
}

fn chain_skin(vertex_count: usize) -> SkinBinding {
    SkinBinding {
        skeleton: "Armature".to_string(),
        joints: (0..vertex_count)
            .map(|vertex| vec![(vertex % JOINT_COUNT) as u32, ((vertex + 1) % JOINT_COUNT) as u32])
            .collect(),
        weights: vec![vec![0.75, 0.25]; vertex_count],
    }
}

fn shared_texture_material(name: &str, png: &[u8]) -> MaterialRef {
    MaterialRef {
        name: name.to_string(),
        textures: vec![TextureAsset {
            name: "Body_Diffuse".to_string(),
            format: TextureFormat::Png,
            channel: TextureChannel::BaseColor,
            data: png.to_vec(),
            path: None,
        }],
        ..MaterialRef::default()
    }
}

/// One 100-vertex skinned mesh, a 20-joint skeleton, one "smile" delta and
/// two materials sharing one 512×512 texture.
fn avatar_scene() -> SceneDescription {
    let png = png_bytes(512);
    let mut body = grid_mesh("Body", Some("Skin"));
    body.skin = Some(chain_skin(body.vertex_count()));

    SceneDescription {
        name: "Avatar".to_string(),
        meshes: vec![body],
        skeletons: vec![chain_skeleton()],
        blendshape_sets: vec![BlendshapeSet {
            name: "Body_shapes".to_string(),
            basis: "Body".to_string(),
            deltas: vec![BlendshapeDelta {
                name: "smile".to_string(),
                offsets: vec![[0.0, 0.0, 0.01]; 100],
            }],
        }],
        animations: vec![AnimationClip {
            name: "Idle".to_string(),
            skeleton: "Armature".to_string(),
            channels: vec![AnimationChannel {
                joint: "Bone_01".to_string(),
                path: ChannelPath::Rotation,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.5],
                values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.3826834, 0.9238795],
            }],
        }],
        materials: vec![
            shared_texture_material("Skin", &png),
            shared_texture_material("Skin_alt", &png),
        ],
    }
}

fn fixed_options() -> ExportOptions {
    ExportOptions {
        created_at: Some("2025-03-01T09:30:00Z".parse().expect("timestamp")),
        ..ExportOptions::default()
    }
}

fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing entry {name}"))
        .read_to_end(&mut bytes)
        .expect("read entry");
    bytes
}

fn open_archive(bytes: Vec<u8>) -> zip::ZipArchive<Cursor<Vec<u8>>> {
    zip::ZipArchive::new(Cursor::new(bytes)).expect("open archive")
}

fn archive_names(archive: &zip::ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    archive.file_names().map(str::to_string).collect()
}

// ─── Scenario ─────────────────────────────────────────────────────────────────

#[test]
fn given_reference_avatar_when_exporting_then_components_match_the_scene() {
    let (bytes, report) = export_scene(&avatar_scene(), fixed_options()).expect("export");
    let mut archive = open_archive(bytes);
    let manifest = Manifest::from_json_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("manifest");

    assert_eq!(manifest.components.meshes.len(), 1);
    assert_eq!(manifest.components.skeletons.len(), 1);
    assert_eq!(manifest.components.blendshapes.len(), 1);
    assert_eq!(manifest.components.animations.len(), 1);
    assert_eq!(report.texture_count, 1);

    let textures: Vec<String> = archive_names(&archive)
        .into_iter()
        .filter(|name| name.starts_with("meshes/textures/"))
        .collect();
    assert_eq!(textures.len(), 1);
    assert!(textures[0].starts_with("meshes/textures/Body_"));
    assert!(textures[0].ends_with(".png"));
}

#[test]
fn given_reference_avatar_when_exporting_then_joint_tensor_holds_four_slots_per_vertex() {
    let scene = avatar_scene();
    let (bytes, _) = export_scene(&scene, fixed_options()).expect("export");
    let mut archive = open_archive(bytes);

    let joints = DenseTensor::from_bytes(&read_entry(&mut archive, "data/Body_skin_joints.bin")).expect("joints");
    let weights =
        DenseTensor::from_bytes(&read_entry(&mut archive, "data/Body_skin_weights.bin")).expect("weights");

    assert_eq!(joints.shape, vec![100, 4]);
    assert_eq!(joints.dtype, DTYPE_U8);
    assert_eq!(joints.element_count(), 400);

    let decoded = decode_skin(&joints, &weights).expect("decode");
    let skin = scene.meshes[0].skin.as_ref().expect("skin");
    for (vertex, (slots, weights)) in decoded.joints.iter().zip(&decoded.weights).enumerate() {
        assert_eq!(slots[..2], skin.joints[vertex][..]);
        assert_eq!(slots[2..], [0, 0]);
        assert_eq!(*weights, [0.75, 0.25, 0.0, 0.0]);
    }
}

#[test]
fn given_smile_blendshape_when_mapping_to_face_tracking_then_no_link_is_produced() {
    let (bytes, report) = export_scene(&avatar_scene(), fixed_options()).expect("export");
    let mut archive = open_archive(bytes);
    let manifest = Manifest::from_json_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("manifest");

    assert!(manifest.animation_links.iter().all(|link| link.source != "smile"));
    assert!(
        report
            .unmatched_sources
            .iter()
            .any(|(_, name)| name == "smile")
    );
    assert!(
        report
            .issues
            .iter()
            .any(|issue| issue.code == "ANIMATION_LINK_UNMATCHED" && issue.message.contains("smile"))
    );
}

#[test]
fn given_arkit_taxonomy_when_blendshape_matches_then_link_targets_arkit_urn() {
    let mut scene = avatar_scene();
    scene.blendshape_sets[0].deltas[0].name = "mouthSmileLeft".to_string();
    let options = ExportOptions {
        face_taxonomies: vec![arf_export::animlink::TaxonomyId::Arkit],
        ..fixed_options()
    };

    let (bytes, _) = export_scene(&scene, options).expect("export");
    let mut archive = open_archive(bytes);
    let manifest = Manifest::from_json_slice(&read_entry(&mut archive, MANIFEST_PATH)).expect("manifest");
    let link = &manifest.animation_links[0];

    assert_eq!(link.source, "mouthSmileLeft");
    assert_eq!(link.target, "urn:apple:arkit:face-blendshapes:mouthSmileLeft");
}

// ─── Determinism and references ───────────────────────────────────────────────

#[test]
fn given_fixed_timestamp_when_exporting_twice_then_archives_are_byte_identical() {
    let scene = avatar_scene();

    let (first, _) = export_scene(&scene, fixed_options()).expect("first export");
    let (second, _) = export_scene(&scene, fixed_options()).expect("second export");

    assert_eq!(first, second);
}

#[test]
fn given_multi_asset_scene_when_exporting_then_ids_are_contiguous_and_references_valid() {
    let mut scene = avatar_scene();
    let mut shirt = grid_mesh("Fit_shirts", Some("Skin_alt"));
    shirt.skin = Some(chain_skin(shirt.vertex_count()));
    scene.meshes.push(shirt);
    scene.meshes.push(grid_mesh("Hat", None));
    let options = ExportOptions {
        components: ComponentToggles {
            lods: true,
            ..ComponentToggles::default()
        },
        ..fixed_options()
    };

    let mut sink = MemorySink::new();
    Exporter::new(options).run(&scene, &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");
    let components = &manifest.components;

    let ids = |values: Vec<u32>| values.into_iter().enumerate().all(|(i, id)| id as usize == i);
    assert!(ids(components.meshes.iter().map(|c| c.id).collect()));
    assert!(ids(components.skins.iter().map(|c| c.id).collect()));
    assert!(ids(components.blendshapes.iter().map(|c| c.id).collect()));
    assert!(ids(manifest.structure.assets.iter().map(|a| a.id).collect()));
    // Three meshes, two LOD levels each.
    assert_eq!(components.meshes.len(), 9);
    assert_eq!(components.skins.len(), 6);
    assert_eq!(manifest.structure.assets.len(), 3);
    manifest.validate_references().expect("references");

    // Both materials resolve to the single stored texture.
    assert_eq!(components.textures.len(), 1);
    let body = components.meshes.iter().find(|m| m.name == "Body").expect("body");
    let shirt = components.meshes.iter().find(|m| m.name == "Fit_shirts").expect("shirt");
    assert_eq!(body.textures, vec![0]);
    assert_eq!(shirt.textures, vec![0]);
}

#[test]
fn given_exported_mesh_asset_when_reading_glb_then_it_holds_only_that_mesh() {
    let mut scene = avatar_scene();
    scene.meshes.push(grid_mesh("Hat", None));
    let mut sink = MemorySink::new();
    Exporter::new(fixed_options()).run(&scene, &mut sink).expect("export");

    let gltf = gltf::Gltf::from_slice(sink.get("meshes/Body.glb").expect("body asset")).expect("glb");

    assert_eq!(gltf.meshes().count(), 1);
    assert_eq!(gltf.skins().count(), 0);
    let primitive = gltf.meshes().next().expect("mesh").primitives().next().expect("primitive");
    assert!(primitive.get(&Semantic::Positions).is_some());
    assert!(primitive.get(&Semantic::Joints(0)).is_none());
    let position = primitive.get(&Semantic::Positions).expect("positions");
    assert_eq!(position.count(), 100);

    let image = gltf.images().next().expect("image");
    match image.source() {
        gltf::image::Source::Uri { uri, .. } => assert!(uri.starts_with("textures/Body_")),
        gltf::image::Source::View { .. } => panic!("texture must be external"),
    }
}

// ─── Modes ────────────────────────────────────────────────────────────────────

#[test]
fn given_tensor_mode_disabled_when_exporting_then_weights_are_embedded_in_mesh_asset() {
    let options = ExportOptions {
        use_tensor_weights: false,
        ..fixed_options()
    };
    let mut sink = MemorySink::new();
    Exporter::new(options).run(&avatar_scene(), &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");

    assert!(!sink.paths().any(|path| path.starts_with("data/")));
    let skin = &manifest.components.skins[0];
    assert!(skin.embedded);
    assert_eq!(skin.uri.as_deref(), Some("meshes/Body.glb"));
    assert!(skin.joints.is_none());
    assert!(manifest.components.data.is_empty());

    let gltf = gltf::Gltf::from_slice(sink.get("meshes/Body.glb").expect("asset")).expect("glb");
    let primitive = gltf.meshes().next().expect("mesh").primitives().next().expect("primitive");
    assert!(primitive.get(&Semantic::Joints(0)).is_some());
    assert!(primitive.get(&Semantic::Weights(0)).is_some());
    assert_eq!(gltf.skins().next().expect("skin").joints().count(), JOINT_COUNT);
}

#[test]
fn given_half_precision_when_exporting_then_weights_decode_within_tolerance() {
    let options = ExportOptions {
        tensor_precision: arf_export::tensor::TensorPrecision::Float16,
        ..fixed_options()
    };
    let mut sink = MemorySink::new();
    Exporter::new(options).run(&avatar_scene(), &mut sink).expect("export");

    let joints = DenseTensor::from_bytes(sink.get("data/Body_skin_joints.bin").expect("joints")).expect("joints");
    let weights = DenseTensor::from_bytes(sink.get("data/Body_skin_weights.bin").expect("weights")).expect("weights");
    assert_eq!(weights.dtype, DTYPE_F16);

    let decoded = decode_skin(&joints, &weights).expect("decode");
    for slots in &decoded.weights {
        assert!((slots[0] - 0.75).abs() <= 0.75 * 2f32.powi(-10));
        assert!((slots[1] - 0.25).abs() <= 0.25 * 2f32.powi(-10));
    }
}

#[test]
fn given_disabled_blendshapes_when_exporting_then_none_are_written_or_mapped() {
    let options = ExportOptions {
        components: ComponentToggles {
            blendshapes: false,
            ..ComponentToggles::default()
        },
        ..fixed_options()
    };
    let mut sink = MemorySink::new();
    let report = Exporter::new(options).run(&avatar_scene(), &mut sink).expect("export");

    assert_eq!(report.blendshape_count, 0);
    assert!(!sink.paths().any(|path| path.starts_with("blendshapes/")));
    assert!(report.unmatched_sources.iter().all(|(_, name)| name != "smile"));
}

// ─── Failures ─────────────────────────────────────────────────────────────────

#[test]
fn given_cancelled_token_when_exporting_then_run_aborts_without_manifest() {
    let token = CancelToken::new();
    token.cancel();
    let mut sink = MemorySink::new();

    let result = Exporter::new(fixed_options())
        .with_cancel_token(token)
        .run(&avatar_scene(), &mut sink);

    assert!(matches!(result, Err(ExportError::Cancelled)));
    assert!(!sink.contains(MANIFEST_PATH));
}

#[test]
fn given_duplicate_blendshape_names_when_exporting_then_duplicate_source_is_reported() {
    let mut scene = avatar_scene();
    let delta = scene.blendshape_sets[0].deltas[0].clone();
    scene.blendshape_sets.push(BlendshapeSet {
        name: "More_shapes".to_string(),
        basis: "Body".to_string(),
        deltas: vec![delta],
    });

    let result = export_scene(&scene, fixed_options());

    assert!(matches!(
        result,
        Err(ExportError::DuplicateAnimationSource { ref name }) if name == "smile"
    ));
}

#[test]
fn given_five_influences_when_exporting_then_skin_binding_is_malformed() {
    let mut scene = avatar_scene();
    if let Some(skin) = scene.meshes[0].skin.as_mut() {
        skin.joints[3] = vec![0, 1, 2, 3, 4];
        skin.weights[3] = vec![0.2; 5];
    }

    let result = export_scene(&scene, fixed_options());

    assert!(matches!(
        result,
        Err(ExportError::MalformedSkinBinding { ref mesh, .. }) if mesh == "Body"
    ));
}

#[test]
fn given_scene_file_when_exporting_to_disk_then_archive_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("skin.png"), png_bytes(8)).expect("texture");
    let scene_json = serde_json::json!({
        "name": "Disk",
        "meshes": [{
            "name": "Body",
            "positions": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            "uvs": [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            "indices": [0, 1, 2],
            "material": "Skin"
        }],
        "materials": [{
            "name": "Skin",
            "textures": [{ "name": "Skin", "path": "skin.png" }]
        }]
    });
    let scene_path = dir.path().join("scene.json");
    std::fs::write(&scene_path, scene_json.to_string()).expect("scene");
    let output = dir.path().join("avatar.zip");

    let report = export_to_file(&scene_path, &output, fixed_options()).expect("export");

    assert_eq!(report.texture_count, 1);
    let mut archive = open_archive(std::fs::read(&output).expect("archive"));
    assert!(archive_names(&archive).iter().any(|name| name == "meshes/Body.glb"));
    let last = archive.len() - 1;
    assert_eq!(archive.by_index(last).expect("last entry").name(), MANIFEST_PATH);
    assert!(!read_entry(&mut archive, MANIFEST_PATH).is_empty());
}

#[test]
fn given_failing_scene_when_exporting_to_disk_then_no_archive_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene_path = dir.path().join("scene.json");
    std::fs::write(
        &scene_path,
        r#"{ "name": "Broken", "meshes": [{ "name": "Empty" }] }"#,
    )
    .expect("scene");
    let output = dir.path().join("avatar.zip");

    let error = export_to_file(&scene_path, &output, fixed_options()).expect_err("must fail");

    assert!(format!("{error:#}").contains("Empty"));
    assert!(!output.exists());
}

#[test]
fn given_sink_with_existing_path_when_exporting_then_duplicate_path_is_fatal() {
    let mut sink = MemorySink::new();
    sink.write("meshes/Body.glb", &[0]).expect("seed");

    let result = Exporter::new(fixed_options()).run(&avatar_scene(), &mut sink);

    assert!(matches!(result, Err(ExportError::DuplicateAssetPath { .. })));
    assert!(!sink.contains(MANIFEST_PATH));
}

// ─── Naming and texture space ─────────────────────────────────────────────────

#[test]
fn given_names_differing_only_in_symbols_when_exporting_then_paths_stay_distinct() {
    let mut scene = avatar_scene();
    scene.meshes.push(grid_mesh("Eye.L", None));
    scene.meshes.push(grid_mesh("Eye_L", None));
    scene.blendshape_sets.push(BlendshapeSet {
        name: "Eye_dot_shapes".to_string(),
        basis: "Eye.L".to_string(),
        deltas: vec![BlendshapeDelta {
            name: "Blink_L".to_string(),
            offsets: vec![[0.0, 0.0, 0.01]; 100],
        }],
    });
    scene.blendshape_sets.push(BlendshapeSet {
        name: "Eye_shapes".to_string(),
        basis: "Eye_L".to_string(),
        deltas: vec![BlendshapeDelta {
            name: "Blink.L".to_string(),
            offsets: vec![[0.0, 0.0, 0.01]; 100],
        }],
    });
    let mut sink = MemorySink::new();

    Exporter::new(fixed_options()).run(&scene, &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");

    assert!(sink.contains("meshes/Eye_L.glb"));
    assert!(sink.contains("meshes/Eye_L_1.glb"));
    assert!(sink.contains("blendshapes/Eye_L_Blink_L.glb"));
    assert!(sink.contains("blendshapes/Eye_L_Blink_L_1.glb"));
    let uris: Vec<&str> = manifest
        .components
        .meshes
        .iter()
        .filter(|mesh| mesh.name.starts_with("Eye"))
        .map(|mesh| mesh.uri.as_str())
        .collect();
    assert_eq!(uris, vec!["meshes/Eye_L.glb", "meshes/Eye_L_1.glb"]);
    manifest.validate_references().expect("references");
}

#[test]
fn given_mesh_named_like_a_lod_when_exporting_lods_then_names_and_tensors_do_not_clash() {
    let mut scene = avatar_scene();
    let mut lod_named = grid_mesh("Body_LOD1", None);
    lod_named.skin = Some(chain_skin(lod_named.vertex_count()));
    scene.meshes.push(lod_named);
    let options = ExportOptions {
        components: ComponentToggles {
            lods: true,
            ..ComponentToggles::default()
        },
        ..fixed_options()
    };
    let mut sink = MemorySink::new();

    Exporter::new(options).run(&scene, &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");

    assert_eq!(manifest.components.meshes.len(), 6);
    assert!(sink.contains("meshes/Body_LOD1.glb"));
    assert!(sink.contains("lods/Body_LOD1_1.glb"));
    assert!(sink.contains("data/Body_LOD1_skin_joints.bin"));
    assert!(sink.contains("data/Body_LOD1_1_skin_joints.bin"));
    let names: Vec<&str> = manifest.components.meshes.iter().map(|mesh| mesh.name.as_str()).collect();
    assert!(names.contains(&"Body_LOD1"));
    assert!(names.contains(&"Body_LOD1_1"));
    manifest.validate_references().expect("references");
}

#[test]
fn given_skin_tensors_when_exporting_then_data_components_describe_them() {
    let mut sink = MemorySink::new();
    Exporter::new(fixed_options()).run(&avatar_scene(), &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");

    let skin = &manifest.components.skins[0];
    let joints = &manifest.components.data[skin.joints.expect("joints") as usize];
    let weights = &manifest.components.data[skin.weights.expect("weights") as usize];

    assert_eq!(joints.uri, "data/Body_skin_joints.bin");
    assert_eq!(joints.media_type, DENSE_TENSOR_TYPE);
    assert_eq!(joints.dtype, DTYPE_U8);
    assert_eq!(joints.shape, vec![100, 4]);
    assert_eq!(weights.uri, "data/Body_skin_weights.bin");
    assert!(skin.uri.is_none());
}

#[test]
fn given_atlas_tiles_when_exporting_then_uvs_flip_inside_their_tile() {
    let mut scene = avatar_scene();
    let body = &mut scene.meshes[0];
    body.uv_tiles = Some(vec![0.0, 1.0, 2.0]);
    body.uvs[0] = [0.5, 1.25];
    body.uvs[1] = [0.5, 0.25];
    let mut sink = MemorySink::new();

    Exporter::new(fixed_options()).run(&scene, &mut sink).expect("export");
    let gltf = gltf::Gltf::from_slice(sink.get("meshes/Body.glb").expect("asset")).expect("glb");
    let primitive = gltf.meshes().next().expect("mesh").primitives().next().expect("primitive");
    let reader = primitive.reader(|_| gltf.blob.as_deref());
    let uvs: Vec<[f32; 2]> = reader.read_tex_coords(0).expect("uvs").into_f32().collect();

    assert_eq!(uvs[0], [0.5, 1.75]);
    assert_eq!(uvs[1], [0.5, 0.75]);
}

#[test]
fn given_texture_size_limit_when_exporting_then_stored_texture_is_downscaled() {
    let options = ExportOptions {
        texture_max_size: Some(128),
        ..fixed_options()
    };
    let mut sink = MemorySink::new();

    Exporter::new(options).run(&avatar_scene(), &mut sink).expect("export");
    let manifest = Manifest::from_json_slice(sink.get(MANIFEST_PATH).expect("manifest")).expect("parse");

    assert_eq!(manifest.components.textures.len(), 1);
    let stored = sink.get(&manifest.components.textures[0].uri).expect("texture");
    let image = image::load_from_memory(stored).expect("decode");
    assert_eq!((image.width(), image.height()), (128, 128));
}
