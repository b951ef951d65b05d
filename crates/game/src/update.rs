//! The per-tick sequence: one fixed-order pass over the whole simulation.

use input::InputState;

use crate::config::SimConfig;
use crate::enemy;
use crate::projectile;
use crate::schedule::Deferred;
use crate::state::{GameState, SimParts};
use crate::weapons::{self, CombatCtx};

/// Advance the simulation one fixed tick.
///
/// Two independent gates (map open, game inactive) hold the simulation
/// still (rendering is the host's business and keeps going). Within a tick
/// the order is fixed: camera first so no ray resolves against a stale aim,
/// then all damage sources, then enemy movement and the breach check: a
/// kill landed this tick beats the boundary.
pub fn frame(state: &mut GameState, input: &InputState, dt: f32) {
    if input.map_toggled() {
        state.toggle_map();
    }
    if !state.active || state.map_open {
        return;
    }

    state.clock += dt;
    let clock = state.clock;
    let sway = state.tension.sway_scale();

    let SimParts {
        mut ctx,
        camera,
        tension,
        weapon,
        spawner,
        projectiles,
        drone,
        terrain,
        cfg,
    } = state.split();

    // Camera orientation chases the pointer before anything aims.
    camera.steer(input.pointer_delta(), cfg);
    camera.update_orientation(dt, clock, sway, cfg);

    // Tension eases back toward resting.
    tension.decay(dt);

    // FOV chases the scroll target.
    camera.zoom_input(input.scroll(), cfg);
    camera.update_fov(dt, cfg);

    // Held trigger: automatic fire through the cooldown gate.
    let trigger_held = input.is_primary_held() || input.primary_pressed();
    if trigger_held && weapon.trigger(clock, cfg.fire_cooldown) {
        weapons::fire_gun(&mut ctx, cfg, terrain, camera);
        camera.apply_recoil(ctx.rng, sway, cfg);
    }

    // Held secondary: cluster release on its own, slower gate.
    if input.is_secondary_held() && weapon.cluster_ready(clock, cfg.cluster_cooldown) {
        weapons::fire_cluster_bomb(&mut ctx, cfg, projectiles, camera);
        weapon.mark_cluster(clock);
    }

    // Deferred one-shots land in the combat half of the tick, so a delayed
    // blast's kill still beats the boundary check below.
    for event in ctx.scheduler.drain_due(clock) {
        dispatch(&mut ctx, cfg, event);
    }

    // Reinforcements, then the advance and the breach check.
    spawner.update(ctx.world, terrain, ctx.rng, cfg, dt);
    enemy::update_enemies(ctx.world, terrain, ctx.ui, clock, dt, cfg);

    // Ordnance and cosmetics.
    projectile::update_projectiles(&mut ctx, cfg, projectiles, dt);
    ctx.effects.update(dt);

    // Drone strike.
    drone.update(&mut ctx, cfg, dt);

    // Rendering reads the world after the tick; nothing to do here.
}

fn dispatch(ctx: &mut CombatCtx, cfg: &SimConfig, event: Deferred) {
    match event {
        Deferred::SubDetonation { position } => projectile::detonate_sub(ctx, cfg, position),
        Deferred::HitFlashRevert { entity } => {
            // The enemy may have died since the hit landed.
            if let Ok(mut e) = ctx.world.get::<&mut enemy::Enemy>(entity) {
                e.flash = false;
            }
        }
        Deferred::FlashExpire { id } => ctx.effects.expire_flash(id),
    }
}
