//! Headless host for the avatar stage.
//!
//! Reads one JSON host command per stdin line, applies it, waits for the
//! loads it started and then runs a second of frames.
//!
//! ```text
//! myth-avatar [settings.json] < commands.jsonl
//! {"command": "load_model", "url": "models/avatar.glb"}
//! {"command": "playRandomDance"}
//! ```

use std::io::BufRead;
use std::time::Duration;

use anyhow::Context;
use myth_avatar::config::StageSettings;
use myth_avatar::stage::{handle_message, AvatarStage, StageEvent};

const FRAMES_PER_COMMAND: usize = 50;
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => StageSettings::load(&path).with_context(|| format!("Failed to load settings from {path}"))?,
        None => StageSettings::default(),
    };
    let mut stage = AvatarStage::headless(settings)?;
    log::info!("Stage ready, waiting for host commands on stdin");

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Err(err) = handle_message(&mut stage, line) {
            log::error!("Bad host message {line:?}: {err}");
            continue;
        }

        report(&stage.wait_for_loads(LOAD_TIMEOUT));
        for _ in 0..FRAMES_PER_COMMAND {
            report(&stage.frame());
        }

        let frame = stage.renderer().last_frame();
        println!(
            "generation={} clip={} heading_velocity={:.5} draws={}",
            stage.generation(),
            stage.current_clip().unwrap_or("-"),
            stage.rotation_velocity(),
            frame.map_or(0, |f| f.draws.len())
        );
    }

    Ok(())
}

fn report(events: &[StageEvent]) {
    for event in events {
        log::debug!("{event:?}");
    }
}
