use crate::config::RotationSettings;
use crate::scene::Transform;

/// Drag-to-rotate with inertia.
///
/// Horizontal pointer motion feeds an angular velocity (radians per frame);
/// each frame the velocity is added to the avatar's heading, then decays
/// exponentially. `|velocity| <= max_velocity` holds after every call.
#[derive(Debug, Clone)]
pub struct DragRotation {
    settings: RotationSettings,
    velocity: f32,
    last_x: Option<f32>,
}

impl DragRotation {
    #[must_use]
    pub fn new(settings: RotationSettings) -> Self {
        Self {
            settings,
            velocity: 0.0,
            last_x: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn pointer_down(&mut self, x: f32) {
        self.last_x = Some(x);
    }

    pub fn pointer_move(&mut self, x: f32) {
        let Some(last_x) = self.last_x else {
            return;
        };
        let delta = x - last_x;
        self.velocity = self.clamp(self.velocity + delta * self.settings.acceleration);
        self.last_x = Some(x);
    }

    pub fn pointer_up(&mut self) {
        self.last_x = None;
    }

    /// Returns this frame's heading delta and decays the velocity.
    pub fn step(&mut self) -> f32 {
        let delta = self.velocity;
        let decayed = self.clamp(self.velocity * self.settings.damping);
        self.velocity = if decayed.abs() < self.settings.min_velocity {
            0.0
        } else {
            decayed
        };
        delta
    }

    /// Steps and rotates `transform` about Y by the result.
    pub fn apply(&mut self, transform: &mut Transform) {
        let delta = self.step();
        if delta != 0.0 {
            transform.rotate_y(delta);
        }
    }

    /// Drops any motion in progress.
    pub fn reset(&mut self) {
        self.velocity = 0.0;
        self.last_x = None;
    }

    fn clamp(&self, v: f32) -> f32 {
        if v.is_finite() {
            v.clamp(-self.settings.max_velocity, self.settings.max_velocity)
        } else {
            0.0
        }
    }
}
