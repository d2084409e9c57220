//! Background asset loads.
//!
//! Fetching and parsing run on a process-wide tokio runtime. Results come
//! back to the frame thread over a flume channel, each tagged with the
//! generation of the scene and avatar it was started for, so the stage can
//! drop results that belong to a scene or avatar that has since been
//! replaced. Model loads also carry a request number: only the most recently
//! requested model is installed.

use std::sync::OnceLock;
use std::time::Duration;

use flume::{Receiver, Sender};
use tokio::runtime::Runtime;

use crate::animation::AnimationClip;
use crate::assets::GltfAsset;
use crate::errors::Result;
use crate::stage::catalog::{AnimationRole, Gender};

fn get_asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

/// What to do with a clip once it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipIntent {
    /// Bind only.
    Preload,
    /// Play it if the avatar has no current clip.
    PlayIfIdle,
    /// Play it looping.
    PlayLoop,
    /// Play it once through, then go back to idle.
    PlayTransient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    pub file: String,
    pub gender: Gender,
    pub role: AnimationRole,
    pub intent: ClipIntent,
}

#[derive(Debug)]
pub enum LoadPayload {
    Model {
        /// Request number; a later `load_model` supersedes this one.
        request: u64,
        source: String,
        result: Result<GltfAsset>,
    },
    Clip {
        request: ClipRequest,
        url: String,
        result: Result<AnimationClip>,
    },
}

#[derive(Debug)]
pub struct LoadEvent {
    pub generation: u64,
    pub payload: LoadPayload,
}

/// Spawns loads and collects their results.
pub struct AssetLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    in_flight: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx, in_flight: 0 }
    }

    /// Loads that have been spawned but not yet received.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn_model(&mut self, generation: u64, request: u64, source: String) {
        log::info!("Loading model: {source}");
        let tx = self.tx.clone();
        self.in_flight += 1;
        get_asset_runtime().spawn(async move {
            let result = GltfAsset::load(&source).await;
            let event = LoadEvent {
                generation,
                payload: LoadPayload::Model { request, source, result },
            };
            if tx.send(event).is_err() {
                log::debug!("Model load finished after the stage was dropped");
            }
        });
    }

    pub fn spawn_clip(&mut self, generation: u64, url: String, request: ClipRequest) {
        log::info!("Fetching animation: {url}");
        let tx = self.tx.clone();
        self.in_flight += 1;
        get_asset_runtime().spawn(async move {
            let result = match GltfAsset::load(&url).await {
                Ok(asset) => asset.first_clip(),
                Err(err) => Err(err),
            };
            let event = LoadEvent {
                generation,
                payload: LoadPayload::Clip { request, url, result },
            };
            if tx.send(event).is_err() {
                log::debug!("Clip load finished after the stage was dropped");
            }
        });
    }

    /// Next finished load, without blocking.
    pub fn try_recv(&mut self) -> Option<LoadEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Next finished load, waiting at most `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let event = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }
}
