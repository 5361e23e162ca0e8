//! Physics profiles, ray queries, and the fixed-step integrator for loose bodies.
//!
//! # Architecture
//!
//! Collision solving belongs to the host physics engine. This module covers
//! what the stage itself needs:
//!
//! 1. Profiles: body classification and material constants ([`profile`])
//! 2. Ray-vs-primitive queries for shot resolution ([`ray`])
//! 3. A fixed timestep loop that moves fragments and debris under gravity
//!    ([`rigid_body`])

pub mod profile;
pub mod ray;
pub mod rigid_body;

use glam::Vec3;

/// Configuration for the physics step.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81, 0).
    pub gravity: Vec3,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

/// Fixed timestep driver for the stage's dynamic bodies.
#[derive(Debug)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Step the simulation forward by `delta_time` seconds.
    ///
    /// Returns the number of fixed sub-steps taken.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) -> u32 {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(world, self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            tracing::debug!(
                dropped = self.accumulator,
                "physics step fell behind, dropping accumulated time"
            );
            self.accumulator = 0.0;
        }

        substeps
    }

    fn fixed_step(&mut self, world: &mut hecs::World, dt: f32) {
        rigid_body::apply_gravity(world, self.config.gravity);
        rigid_body::integrate_velocities(world, dt);
        rigid_body::integrate_positions(world, dt);
        rigid_body::clear_forces(world);
    }
}
