pub mod gltf;

pub use gltf::{decode_data_uri, GltfAsset, GltfLoader, LoadedModel, AVATAR_ROOT_NAME};
