// common/plugins/directional_movement.rs:
// DirectionalMovementPlugin drives the controller from a bevy App
// - adds Config, ControllerState, ControllerBufferDepth and MovementInput resources
// - remaps movement input, then runs the per-frame update, every Update
// - the host is any Resource implementing the host traits; it is inserted by the caller

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::common::{
    host::Host,
    resources::{buffer_depth::ControllerBufferDepth, config::Config, MovementInput},
    state::ControllerState,
    systems::{controller, input::process_input},
};

pub struct DirectionalMovementPlugin<H>(PhantomData<fn() -> H>);

impl<H> Default for DirectionalMovementPlugin<H> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<H: Host + Resource> Plugin for DirectionalMovementPlugin<H> {
    fn build(&self, app: &mut App) {
        app.init_resource::<Config>()
            .init_resource::<ControllerState>()
            .init_resource::<ControllerBufferDepth>()
            .init_resource::<MovementInput>()
            .add_systems(Update, (remap_input::<H>, update::<H>).chain());
    }
}

pub fn remap_input<H: Host + Resource>(
    mut state: ResMut<ControllerState>,
    mut host: ResMut<H>,
    config: Res<Config>,
    mut input: ResMut<MovementInput>,
) {
    state.reset_controls();
    process_input(&mut state, &mut *host, &config, &mut input);
}

pub fn update<H: Host + Resource>(
    mut state: ResMut<ControllerState>,
    mut host: ResMut<H>,
    config: Res<Config>,
    buffer_depth: Res<ControllerBufferDepth>,
    time: Res<Time>,
) {
    controller::update(&mut state, &mut *host, &config, &buffer_depth, time.delta_secs());
}
