use rustc_hash::FxHashMap;

use crate::animation::action::AnimationAction;
use crate::scene::Scene;

/// Owns the actions bound to one avatar and drives them every frame.
///
/// Actions are registered under their clip name; registering a second action
/// with the same name replaces the first.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    by_name: FxHashMap<String, usize>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` under its clip name and returns that name.
    ///
    /// A replaced action that was running keeps running under the new binding.
    pub fn add_action(&mut self, mut action: AnimationAction) -> String {
        let name = action.name().to_string();
        if let Some(&index) = self.by_name.get(&name) {
            if self.actions[index].is_running() {
                action.play();
            }
            self.actions[index] = action;
        } else {
            self.by_name.insert(name.clone(), self.actions.len());
            self.actions.push(action);
        }
        name
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.by_name.get(name).map(|&i| &self.actions[i])
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut AnimationAction> {
        self.by_name.get(name).map(|&i| &mut self.actions[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
    }

    /// Number of actions currently contributing to the pose.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_running()).count()
    }

    /// Advances every action by `dt` and writes sampled values into `scene`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }
            action.apply(scene);
        }
    }
}
