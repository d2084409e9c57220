//! Asset Module
//!
//! Byte-level fetching ([`io`]) and glTF parsing/instantiation ([`loaders`]).
//! Everything here is async-friendly and runs on the stage's loader runtime;
//! only [`GltfLoader::instantiate`] touches the scene, on the frame thread.

pub mod io;
pub mod loaders;

pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, HttpAssetReader};
pub use loaders::{GltfAsset, GltfLoader, LoadedModel, AVATAR_ROOT_NAME};
