use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::prelude::*;

/// Controller input buffer depth shared with the input-polling thread.
///
/// The per-frame update overrides the depth while directional movement is
/// active and restores the engine's own value afterwards. The input callback
/// holds a clone of this handle and reads [`Self::current`].
#[derive(Clone, Debug, Resource)]
pub struct ControllerBufferDepth(Arc<Mutex<BufferDepth>>);

#[derive(Clone, Copy, Debug, PartialEq)]
struct BufferDepth {
    current: f32,
    /// Engine value captured on the first override
    default: Option<f32>,
}

impl Default for ControllerBufferDepth {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ControllerBufferDepth {
    pub fn new(engine_value: f32) -> Self {
        Self(Arc::new(Mutex::new(BufferDepth { current: engine_value, default: None })))
    }

    fn lock(&self) -> MutexGuard<'_, BufferDepth> {
        // Plain data inside; a panicked writer cannot leave it half-updated
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> f32 {
        self.lock().current
    }

    /// Written by the host when the engine changes its own setting.
    pub fn set_current(&self, value: f32) {
        self.lock().current = value;
    }

    /// Apply `freecam_depth` while `enable` holds, otherwise restore the
    /// value captured on the first override.
    pub fn apply_override(&self, enable: bool, freecam_depth: f32) {
        let mut depth = self.lock();
        if enable {
            if depth.default.is_none() {
                depth.default = Some(depth.current);
            }
            depth.current = freecam_depth;
        } else if let Some(default) = depth.default.filter(|d| *d > 0.0) {
            depth.current = default;
        }
    }
}
