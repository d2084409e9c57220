//! Unit conversion for externally-authored clips.
//!
//! Dance and idle clips come out of centimetre-based authoring tools while
//! avatars are modelled in metres. Every translation (`<node>.position`)
//! keyframe is divided by a fixed divisor before the clip is bound; rotation
//! and scale channels are unit-free and left alone.

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData};

/// Centimetres to metres.
pub const DEFAULT_TRANSLATION_DIVISOR: f32 = 100.0;

#[inline]
#[must_use]
pub fn is_translation_track(track: &Track) -> bool {
    track.meta.target == TargetPath::Translation
}

/// Divides every value of every translation track by `divisor`.
///
/// Cubic-spline tangents are scaled too, which keeps the curve shape.
/// Returns the number of tracks that were rewritten.
pub fn rescale_translations(clip: &mut AnimationClip, divisor: f32) -> usize {
    let mut rewritten = 0;
    for track in &mut clip.tracks {
        if !is_translation_track(track) {
            continue;
        }
        if let TrackData::Vector3(data) = &mut track.data {
            data.map_values(|v| v / divisor);
            rewritten += 1;
        }
    }
    log::debug!(
        "Rescaled {rewritten} translation track(s) of '{}' by 1/{divisor}",
        clip.name
    );
    rewritten
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::animation::clip::TrackMeta;
    use crate::animation::tracks::{InterpolationMode, KeyframeTrack};

    fn clip() -> AnimationClip {
        AnimationClip::new(
            "dance.glb",
            vec![
                Track {
                    meta: TrackMeta {
                        node_name: "Hips".into(),
                        target: TargetPath::Translation,
                    },
                    data: TrackData::Vector3(KeyframeTrack::new(
                        vec![0.0, 1.0],
                        vec![Vec3::new(0.0, 100.0, 0.0), Vec3::new(50.0, 98.0, -20.0)],
                        InterpolationMode::Linear,
                    )),
                },
                Track {
                    meta: TrackMeta {
                        node_name: "Hips".into(),
                        target: TargetPath::Scale,
                    },
                    data: TrackData::Vector3(KeyframeTrack::new(
                        vec![0.0],
                        vec![Vec3::splat(2.0)],
                        InterpolationMode::Step,
                    )),
                },
                Track {
                    meta: TrackMeta {
                        node_name: "Spine".into(),
                        target: TargetPath::Rotation,
                    },
                    data: TrackData::Quaternion(KeyframeTrack::new(
                        vec![0.0],
                        vec![Quat::from_rotation_x(0.3)],
                        InterpolationMode::Linear,
                    )),
                },
            ],
        )
    }

    #[test]
    fn only_translation_tracks_are_divided() {
        let mut clip = clip();
        assert_eq!(rescale_translations(&mut clip, 100.0), 1);

        let TrackData::Vector3(pos) = &clip.tracks[0].data else {
            panic!("expected vector track");
        };
        assert_eq!(pos.values[0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(pos.values[1], Vec3::new(0.5, 0.98, -0.2));

        let TrackData::Vector3(scale) = &clip.tracks[1].data else {
            panic!("expected vector track");
        };
        assert_eq!(scale.values[0], Vec3::splat(2.0));
    }

    #[test]
    fn track_names_follow_node_property_form() {
        let clip = clip();
        assert_eq!(clip.tracks[0].name(), "Hips.position");
        assert_eq!(clip.tracks[2].name(), "Spine.quaternion");
        assert!(is_translation_track(&clip.tracks[0]));
        assert!(!is_translation_track(&clip.tracks[2]));
    }
}
