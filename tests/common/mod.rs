//! glTF fixtures generated on the fly: JSON documents with their binary
//! buffer embedded as a base64 data URI, written under a per-test temp dir.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use base64::Engine as _;
use serde_json::json;

use myth_avatar::config::StageSettings;
use myth_avatar::stage::{AnimationRole, Gender, GenderClips};

/// Rest height of the fixture's hips, in metres.
pub const HIPS_REST_Y: f32 = 1.0;

pub struct Fixture {
    pub dir: PathBuf,
}

impl Fixture {
    /// Fresh directory for one test.
    pub fn new(test_name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("myth_avatar_{test_name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    pub fn animations_dir(&self) -> PathBuf {
        self.dir.join("animations")
    }

    /// Writes the skinned fixture model and returns its path.
    pub fn write_model(&self, file: &str) -> String {
        let path = self.dir.join(file);
        std::fs::write(&path, model_gltf().to_string()).unwrap();
        path.display().to_string()
    }

    /// Writes one clip file at `{animations}/{gender}/{role}/{file}`.
    ///
    /// The hips translation is authored in centimetres: `hips_cm` at both
    /// ends of the clip.
    pub fn write_clip(&self, gender: Gender, role: AnimationRole, file: &str, duration: f32, hips_cm: [f32; 3]) {
        let dir = self.animations_dir().join(gender.as_str()).join(role.as_str());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), clip_gltf(duration, hips_cm).to_string()).unwrap();
    }

    /// Settings pointing at this fixture's animation tree, with every clip
    /// of the catalog written to disk.
    pub fn settings(&self) -> StageSettings {
        let mut settings = StageSettings::default();
        settings.animations.base_url = self.animations_dir().display().to_string();
        settings.dance_seed = Some(7);
        settings.animations.male = GenderClips {
            idle: "male_idle.gltf".to_string(),
            dances: vec!["male_dance_1.gltf".to_string(), "male_dance_2.gltf".to_string()],
        };
        settings.animations.female = GenderClips {
            idle: "female_idle.gltf".to_string(),
            dances: vec!["female_dance_1.gltf".to_string()],
        };

        self.write_clip(Gender::Male, AnimationRole::Idle, "male_idle.gltf", 2.0, [0.0, 100.0, 0.0]);
        self.write_clip(Gender::Male, AnimationRole::Dance, "male_dance_1.gltf", 0.5, [0.0, 120.0, 0.0]);
        self.write_clip(Gender::Male, AnimationRole::Dance, "male_dance_2.gltf", 0.5, [10.0, 110.0, 0.0]);
        self.write_clip(Gender::Female, AnimationRole::Idle, "female_idle.gltf", 2.0, [0.0, 90.0, 0.0]);
        self.write_clip(Gender::Female, AnimationRole::Dance, "female_dance_1.gltf", 0.5, [0.0, 95.0, 5.0]);
        settings
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Armature -> Hips -> Spine, plus a skinned body mesh.
pub fn model_gltf() -> serde_json::Value {
    let positions = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1, 3] },
            { "name": "Hips", "translation": [0.0, HIPS_REST_Y, 0.0], "children": [2] },
            { "name": "Spine", "translation": [0.0, 0.2, 0.0] },
            { "name": "Body", "mesh": 0, "skin": 0 }
        ],
        "meshes": [{ "name": "BodyMesh", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "skins": [{ "name": "AvatarSkeleton", "joints": [1, 2] }],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": positions.len() }],
        "buffers": [{ "byteLength": positions.len(), "uri": data_uri(&positions) }]
    })
}

/// Two keyframes: a constant hips translation (centimetres) and a spine turn.
pub fn clip_gltf(duration: f32, hips_cm: [f32; 3]) -> serde_json::Value {
    let times = f32_bytes(&[0.0, duration]);
    let translations = f32_bytes(&[hips_cm[0], hips_cm[1], hips_cm[2], hips_cm[0], hips_cm[1], hips_cm[2]]);
    let half_turn = std::f32::consts::FRAC_1_SQRT_2;
    let rotations = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, half_turn, 0.0, half_turn]);

    let mut buffer = Vec::new();
    buffer.extend_from_slice(&times);
    buffer.extend_from_slice(&translations);
    buffer.extend_from_slice(&rotations);

    json!({
        "asset": { "version": "2.0" },
        "nodes": [{ "name": "Hips", "children": [1] }, { "name": "Spine" }],
        "animations": [{
            "name": "mixamo.com",
            "samplers": [
                { "input": 0, "output": 1, "interpolation": "LINEAR" },
                { "input": 0, "output": 2, "interpolation": "LINEAR" }
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 0, "path": "translation" } },
                { "sampler": 1, "target": { "node": 1, "path": "rotation" } }
            ]
        }],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [duration] },
            { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC4" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": times.len() },
            { "buffer": 0, "byteOffset": times.len(), "byteLength": translations.len() },
            { "buffer": 0, "byteOffset": times.len() + translations.len(), "byteLength": rotations.len() }
        ],
        "buffers": [{ "byteLength": buffer.len(), "uri": data_uri(&buffer) }]
    })
}

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
