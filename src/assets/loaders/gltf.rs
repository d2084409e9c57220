use std::collections::HashSet;

use base64::Engine as _;
use futures::future::try_join_all;
use glam::{Affine3A, Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::io::{self, AssetReaderVariant};
use crate::errors::{AvatarError, Result};
use crate::scene::{MeshRef, NodeHandle, Scene, Skeleton, SkeletonKey};

/// Name of the node every instantiated model is parented under.
pub const AVATAR_ROOT_NAME: &str = "avatar_root";

/// A parsed glTF document with all of its buffers resolved.
///
/// Produced on the loader runtime and handed to the frame thread, where it
/// is either instantiated into the scene (models) or mined for clips
/// (animation files).
pub struct GltfAsset {
    /// File name the asset was fetched under.
    pub name: String,
    document: gltf::Gltf,
    buffers: Vec<Vec<u8>>,
}

impl std::fmt::Debug for GltfAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GltfAsset")
            .field("name", &self.name)
            .field("nodes", &self.document.nodes().count())
            .field("animations", &self.document.animations().count())
            .field("buffers", &self.buffers.len())
            .finish()
    }
}

impl GltfAsset {
    /// Fetches `source` (path or http(s) URL) and resolves its buffers.
    pub async fn load(source: &str) -> Result<Self> {
        let (reader, bytes) = io::fetch(source).await?;
        let name = AssetReaderVariant::source_filename(source).to_string();
        Self::from_bytes(name, &bytes, Some(&reader)).await
    }

    /// Parses `.glb` or `.gltf` bytes.
    ///
    /// Relative buffer URIs need a `reader`; embedded (`data:`) and GLB
    /// binary-chunk buffers do not.
    pub async fn from_bytes(
        name: impl Into<String>,
        bytes: &[u8],
        reader: Option<&AssetReaderVariant>,
    ) -> Result<Self> {
        let name = name.into();
        let document = gltf::Gltf::from_slice_without_validation(bytes)?;
        validate_document(&name, &document)?;
        let buffers = load_buffers(&document, reader).await?;
        log::debug!(
            "Parsed '{}': {} node(s), {} animation(s), {} buffer(s)",
            name,
            document.nodes().count(),
            document.animations().count(),
            buffers.len()
        );
        Ok(Self {
            name,
            document,
            buffers,
        })
    }

    /// The first animation of the file, renamed after the file itself.
    ///
    /// Animation files carry one clip each; the file name is what the host
    /// and the catalog refer to it by.
    pub fn first_clip(&self) -> Result<AnimationClip> {
        let Some(animation) = self.document.animations().next() else {
            return Err(AvatarError::NoAnimation(self.name.clone()));
        };
        let clip = convert_animation(&animation, &self.buffers);
        Ok(clip.with_name(self.name.clone()))
    }
}

/// Result of instantiating a model into the scene.
#[derive(Debug)]
pub struct LoadedModel {
    pub root: NodeHandle,
    /// First skin of the file, if any.
    pub skeleton: Option<SkeletonKey>,
    /// Animations embedded in the model file itself.
    pub clips: Vec<AnimationClip>,
}

/// Instantiates a [`GltfAsset`] into a [`Scene`].
pub struct GltfLoader<'a> {
    scene: &'a mut Scene,
    // glTF node index -> scene node
    node_mapping: Vec<NodeHandle>,
}

impl<'a> GltfLoader<'a> {
    /// Builds the node hierarchy, skeletons and mesh records of `asset`
    /// under a fresh [`AVATAR_ROOT_NAME`] node.
    pub fn instantiate(asset: &GltfAsset, scene: &'a mut Scene) -> Result<LoadedModel> {
        let gltf = &asset.document;
        let mut loader = Self {
            scene,
            node_mapping: Vec::with_capacity(gltf.nodes().count()),
        };

        for node in gltf.nodes() {
            let handle = loader.create_node_shallow(&node);
            loader.node_mapping.push(handle);
        }

        for node in gltf.nodes() {
            let parent = loader.node_mapping[node.index()];
            for child in node.children() {
                let child_handle = loader.node_mapping[child.index()];
                loader.scene.attach(child_handle, parent);
            }
        }

        let root = loader.scene.create_node_with_name(AVATAR_ROOT_NAME);
        if let Some(default_scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            for node in default_scene.nodes() {
                loader.scene.attach(loader.node_mapping[node.index()], root);
            }
        }
        // Nodes outside every scene still belong to the model, so that
        // removing the root removes all of them.
        for &handle in &loader.node_mapping {
            if loader.scene.get_node(handle).is_some_and(|n| n.parent().is_none()) {
                loader.scene.attach(handle, root);
            }
        }

        let skeleton_keys = match loader.load_skins(gltf, &asset.buffers) {
            Ok(keys) => keys,
            Err(err) => {
                loader.scene.remove_node(root);
                return Err(err);
            }
        };

        for node in gltf.nodes() {
            loader.bind_node_mesh_and_skin(&node, &skeleton_keys);
        }

        let clips = load_animations(gltf, &asset.buffers);

        log::info!(
            "Instantiated '{}': {} node(s), {} skeleton(s), {} embedded clip(s)",
            asset.name,
            loader.node_mapping.len(),
            skeleton_keys.len(),
            clips.len()
        );

        Ok(LoadedModel {
            root,
            skeleton: skeleton_keys.first().copied(),
            clips,
        })
    }

    fn create_node_shallow(&mut self, node: &gltf::Node) -> NodeHandle {
        let node_name = node
            .name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
        let handle = self.scene.create_node_with_name(&node_name);

        if let Some(scene_node) = self.scene.get_node_mut(handle) {
            let (t, r, s) = node.transform().decomposed();
            scene_node.transform.position = Vec3::from_array(t);
            scene_node.transform.rotation = Quat::from_array(r);
            scene_node.transform.scale = Vec3::from_array(s);
        }
        handle
    }

    fn load_skins(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<SkeletonKey>> {
        let mut skeleton_keys = Vec::new();

        for skin in gltf.skins() {
            let name = skin.name().unwrap_or("Skeleton");
            let joints: Vec<_> = skin.joints().collect();

            let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let ibms: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
                Some(iter) => iter
                    .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                    .collect(),
                None => vec![Affine3A::IDENTITY; joints.len()],
            };
            if ibms.len() != joints.len() {
                return Err(AvatarError::GltfError(format!(
                    "skin '{name}' has {} joints but {} inverse bind matrices",
                    joints.len(),
                    ibms.len()
                )));
            }

            let bones: Vec<NodeHandle> = joints.iter().map(|n| self.node_mapping[n.index()]).collect();

            let joint_indices: HashSet<usize> = joints.iter().map(gltf::Node::index).collect();
            let child_joint_indices: HashSet<usize> = joints
                .iter()
                .flat_map(gltf::Node::children)
                .map(|c| c.index())
                .filter(|i| joint_indices.contains(i))
                .collect();

            let root_bone_index = 'block: {
                // Explicit skeleton root first.
                if let Some(skeleton_root) = skin.skeleton()
                    && let Some(index) = joints.iter().position(|n| n.index() == skeleton_root.index())
                {
                    break 'block index;
                }
                // Otherwise the first joint no other joint parents.
                joints
                    .iter()
                    .position(|n| !child_joint_indices.contains(&n.index()))
                    .unwrap_or(0)
            };

            let skeleton = Skeleton::new(name, bones, ibms, root_bone_index);
            skeleton_keys.push(self.scene.add_skeleton(skeleton));
        }

        Ok(skeleton_keys)
    }

    fn bind_node_mesh_and_skin(&mut self, node: &gltf::Node, skeleton_keys: &[SkeletonKey]) {
        let handle = self.node_mapping[node.index()];
        let Some(scene_node) = self.scene.get_node_mut(handle) else {
            return;
        };

        if let Some(mesh) = node.mesh() {
            scene_node.mesh = Some(MeshRef {
                name: mesh
                    .name()
                    .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string),
                primitive_count: mesh.primitives().count(),
            });
        }

        if let Some(skin) = node.skin() {
            scene_node.skin = skeleton_keys.get(skin.index()).copied();
        }
    }
}

/// Rejects documents the `gltf` accessors would panic on: dangling indices,
/// invalid enum values and oversized offsets.
///
/// Parsing skips the crate's own validation because that refuses any file
/// listing an unsupported entry in `extensionsRequired`; such files are
/// still loaded (skeleton and animation data do not depend on them) with a
/// warning. Missing optional data such as accessor bounds is only logged.
fn validate_document(name: &str, document: &gltf::Gltf) -> Result<()> {
    use gltf::json::validation::{Error, Validate};

    let root = document.as_json();
    let mut fatal = Vec::new();
    root.validate(root, gltf::json::Path::new, &mut |path, error| {
        match error {
            Error::Unsupported => {}
            Error::Missing => log::debug!("'{name}': {} is missing", path()),
            Error::IndexOutOfBounds | Error::Invalid | Error::Oversize => {
                fatal.push(format!("{}: {error}", path()));
            }
        }
    });

    let unsupported: Vec<_> = document.extensions_required().collect();
    if !unsupported.is_empty() {
        log::warn!("'{name}' requires extensions {unsupported:?}; geometry may not display correctly");
    }

    if fatal.is_empty() {
        Ok(())
    } else {
        Err(AvatarError::GltfError(format!("invalid document: {}", fatal.join("; "))))
    }
}

async fn load_buffers(gltf: &gltf::Gltf, reader: Option<&AssetReaderVariant>) -> Result<Vec<Vec<u8>>> {
    let pending = gltf.buffers().map(|buffer| async move {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .as_deref()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| AvatarError::GltfError("missing GLB binary chunk".to_string()))?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
            gltf::buffer::Source::Uri(uri) => {
                let Some(reader) = reader else {
                    return Err(AvatarError::AssetNotFound(format!(
                        "external buffer '{uri}' (no reader to resolve it)"
                    )));
                };
                reader.read_bytes(uri).await?
            }
        };
        if data.len() < buffer.length() {
            return Err(AvatarError::GltfError(format!(
                "buffer {} is {} bytes, expected at least {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        Ok(data)
    });
    try_join_all(pending).await
}

/// Decodes a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(AvatarError::DataUriError("missing 'data:' prefix".to_string()));
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(AvatarError::DataUriError("missing ',' separator".to_string()));
    };
    if !header.ends_with(";base64") {
        return Err(AvatarError::DataUriError(format!(
            "unsupported encoding '{header}', expected base64"
        )));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    gltf.animations()
        .map(|anim| convert_animation(&anim, buffers))
        .collect()
}

/// Converts one glTF animation. Channels that cannot be read are skipped
/// with a warning rather than failing the whole clip.
fn convert_animation(anim: &gltf::Animation, buffers: &[Vec<u8>]) -> AnimationClip {
    let clip_name = anim
        .name()
        .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
    let mut tracks = Vec::new();

    for channel in anim.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let target = channel.target();
        let gltf_node = target.node();
        let node_name = gltf_node
            .name()
            .map_or_else(|| format!("Node_{}", gltf_node.index()), str::to_string);

        let Some(inputs) = reader.read_inputs() else {
            log::warn!("Clip '{clip_name}': channel on '{node_name}' has no readable inputs");
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let Some(outputs) = reader.read_outputs() else {
            log::warn!("Clip '{clip_name}': channel on '{node_name}' has no readable outputs");
            continue;
        };

        let (target_path, data) = match outputs {
            ReadOutputs::Translations(iter) => (
                TargetPath::Translation,
                TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
            ),
            ReadOutputs::Rotations(iter) => (
                TargetPath::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::Scales(iter) => (
                TargetPath::Scale,
                TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
            ),
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!("Clip '{clip_name}': skipping morph weights on '{node_name}'");
                continue;
            }
        };

        let well_formed = match &data {
            TrackData::Vector3(t) => t.is_well_formed(),
            TrackData::Quaternion(t) => t.is_well_formed(),
        };
        if !well_formed {
            log::warn!(
                "Clip '{clip_name}': dropping malformed {} track on '{node_name}'",
                target_path.property_name()
            );
            continue;
        }

        tracks.push(Track {
            meta: TrackMeta {
                node_name,
                target: target_path,
            },
            data,
        });
    }

    AnimationClip::new(clip_name, tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GltfAsset> {
        futures::executor::block_on(GltfAsset::from_bytes("test.gltf", json.as_bytes(), None))
    }

    #[test]
    fn dangling_child_index_is_rejected() {
        let result = parse(r#"{"asset":{"version":"2.0"},"nodes":[{"name":"A","children":[5]}]}"#);
        match result {
            Err(AvatarError::GltfError(msg)) => assert!(msg.contains("children"), "{msg}"),
            other => panic!("expected GltfError, got {other:?}"),
        }
    }

    #[test]
    fn dangling_skin_joint_is_rejected() {
        let result = parse(
            r#"{"asset":{"version":"2.0"},"nodes":[{"name":"Hips"}],"skins":[{"joints":[0,3]}]}"#,
        );
        assert!(matches!(result, Err(AvatarError::GltfError(_))));
    }

    #[test]
    fn unsupported_required_extension_still_loads() {
        let asset = parse(
            r#"{"asset":{"version":"2.0"},"extensionsUsed":["KHR_draco_mesh_compression"],
                "extensionsRequired":["KHR_draco_mesh_compression"],"nodes":[{"name":"Hips"}]}"#,
        )
        .unwrap();
        let mut scene = Scene::default();
        let model = GltfLoader::instantiate(&asset, &mut scene).unwrap();
        assert!(scene.find_node_by_name(model.root, "Hips").is_some());
    }

    #[test]
    fn data_uri_decoding() {
        assert_eq!(decode_data_uri("data:application/octet-stream;base64,AQID").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(AvatarError::DataUriError(_))
        ));
        assert!(matches!(decode_data_uri("data:;base64"), Err(AvatarError::DataUriError(_))));
        assert!(matches!(
            decode_data_uri("data:application/octet-stream;base64,@@@"),
            Err(AvatarError::Base64Error(_))
        ));
    }
}
