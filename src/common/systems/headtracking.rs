use bevy::prelude::*;

use crate::common::{
    host::*,
    resources::config::{Config, DialogueMode},
    state::ControllerState,
    systems::{camera::update_camera_headtracking, rotation::set_desired_angle_to_target},
};

/// Turn towards the active dialogue speaker and keep the head on them.
///
/// The head stays on the speaker for the dialogue headtracking duration after
/// the last frame the speaker was seen.
pub fn update_dialogue_facing<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if config.dialogue_mode != DialogueMode::FaceSpeaker {
        return;
    }

    let speaker = host.speaker();
    if speaker != state.dialogue_speaker {
        debug!("dialogue speaker {:?} -> {:?}", state.dialogue_speaker, speaker);
    }
    state.dialogue_speaker = speaker;

    let Some(speaker) = speaker else { return };
    if !host.actor(speaker).is_some_and(|a| a.kind == ActorKind::Character) {
        return;
    }

    set_desired_angle_to_target(state, host, config, Some(speaker));
    if config.headtracking {
        host.set_headtrack_target(HeadtrackSlot::Dialogue, Some(speaker));
        state.dialogue_headtrack_timer = config.dialogue_headtracking_duration;
    }
}

/// Head tracking for the free camera: a hard target or a recent speaker keeps
/// the head, otherwise the head follows the camera.
pub fn update_free_headtracking<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if !config.headtracking || state.lock.hard_target().is_some() {
        return;
    }
    if state.dialogue_headtrack_timer > 0.0 {
        return;
    }
    if state.dialogue_speaker.is_none() {
        host.set_headtrack_target(HeadtrackSlot::Dialogue, None);
    }
    update_camera_headtracking(host, config);
}

/// Outside a plain third-person camera the body is steered by the lock, so
/// head tracking is switched off.
pub fn disable_headtracking_outside_third_person<H: Host + ?Sized>(host: &mut H, config: &Config) {
    if !config.headtracking {
        return;
    }
    let third_person = host.mode().is_some_and(|m| m.is_third_person());
    let alternate_camera = host.alternate_first_person_active() || host.alternate_third_person_active();
    if third_person && !alternate_camera {
        return;
    }

    host.set_headtracking(false);
    if !host.behavior_patch_installed() && !host.is_character_menu_open() {
        host.set_graph_bool(graph::IS_NPC, false);
    }
}

/// Re-apply settings that take effect immediately.
pub fn on_settings_updated<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if !config.headtracking {
        info!("head tracking disabled");
        host.set_headtracking(false);
        host.set_graph_bool(graph::IS_NPC, false);
        host.set_headtrack_target(HeadtrackSlot::Dialogue, None);
        state.dialogue_headtrack_timer = 0.0;
    }
}
