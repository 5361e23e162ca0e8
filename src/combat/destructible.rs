//! Energy-driven destructible objects.
//!
//! ```text
//! Intact --hurt--> Damaged --hurt--> Destroyed
//!   \______________hurt_______________/
//! Unbreakable (never transitions)
//! ```

use rand::Rng;

use super::decal::DecalPlacer;
use super::shot::{HitPoint, ShotResolver};
use crate::config::DamageConfig;
use crate::ecs::components::surface::{CompoundChild, Surface};
use crate::error::Result;
use crate::material::MaterialLookup;
use crate::scene::{ModelId, SceneRenderer, Stage};

/// Energy budget of a destructible object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Energy {
    Finite(u32),
    /// Takes hits and decals but never breaks.
    Unbreakable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructibleState {
    Intact,
    Damaged,
    Destroyed,
    Unbreakable,
}

/// Why a `hurt` call changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Unbreakable,
    AlreadyDestroyed,
    NoDamage,
}

/// Result of one `hurt` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HurtOutcome {
    Ignored(IgnoreReason),
    Damaged {
        energy: u32,
        /// Compound member detached by this hit.
        shot_off: Option<hecs::Entity>,
    },
    Destroyed {
        shot_off: Option<hecs::Entity>,
    },
}

/// A composite model with an energy budget.
#[derive(Debug, Clone)]
pub struct DestructibleObject {
    model: ModelId,
    initial_energy: Energy,
    current_energy: u32,
    destroyed: bool,
    next_decal_index: u32,
    config: DamageConfig,
}

impl DestructibleObject {
    /// Wrap a model. A finite budget of zero is raised to one.
    pub fn new(model: ModelId, energy: Energy) -> Self {
        let initial_energy = match energy {
            Energy::Finite(0) => {
                tracing::warn!(?model, "zero energy budget raised to 1");
                Energy::Finite(1)
            }
            other => other,
        };
        let current_energy = match initial_energy {
            Energy::Finite(e) => e,
            Energy::Unbreakable => 0,
        };
        Self {
            model,
            initial_energy,
            current_energy,
            destroyed: false,
            next_decal_index: 0,
            config: DamageConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DamageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn initial_energy(&self) -> Energy {
        self.initial_energy
    }

    /// Remaining energy, `None` for unbreakable objects.
    pub fn energy(&self) -> Option<u32> {
        match self.initial_energy {
            Energy::Finite(_) => Some(self.current_energy),
            Energy::Unbreakable => None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn next_decal_index(&self) -> u32 {
        self.next_decal_index
    }

    pub fn config(&self) -> &DamageConfig {
        &self.config
    }

    pub fn state(&self) -> DestructibleState {
        match self.initial_energy {
            Energy::Unbreakable => DestructibleState::Unbreakable,
            _ if self.destroyed => DestructibleState::Destroyed,
            Energy::Finite(initial) if self.current_energy == initial => DestructibleState::Intact,
            Energy::Finite(_) => DestructibleState::Damaged,
        }
    }

    /// Current darkening: `max_darkening_ratio * (1 - energy / initial)`.
    pub fn darkening(&self) -> f32 {
        match self.initial_energy {
            Energy::Finite(initial) => {
                self.config.max_darkening_ratio
                    * (1.0 - self.current_energy as f32 / initial as f32)
            }
            Energy::Unbreakable => 0.0,
        }
    }

    /// Whether hits can shoot parts off this object's compound.
    pub fn supports_fragmentation(&self, stage: &Stage) -> bool {
        stage
            .model(self.model)
            .is_some_and(|model| model.compound_root().is_some())
    }

    /// Group the model's surfaces into a compound so parts can be shot off.
    pub fn enable_fragmentation(&self, stage: &mut Stage) -> Result<hecs::Entity> {
        stage.make_compound(self.model)
    }

    /// Apply `damage`, optionally shooting off the `striking` surface.
    pub fn hurt(&mut self, stage: &mut Stage, damage: u32, striking: Option<hecs::Entity>) -> HurtOutcome {
        if self.initial_energy == Energy::Unbreakable {
            tracing::debug!(model = ?self.model, damage, "unbreakable object ignores damage");
            return HurtOutcome::Ignored(IgnoreReason::Unbreakable);
        }
        if self.destroyed {
            tracing::debug!(model = ?self.model, damage, "object already destroyed, damage ignored");
            return HurtOutcome::Ignored(IgnoreReason::AlreadyDestroyed);
        }
        if damage == 0 {
            tracing::debug!(model = ?self.model, "zero damage ignored");
            return HurtOutcome::Ignored(IgnoreReason::NoDamage);
        }

        self.current_energy = self.current_energy.saturating_sub(damage);
        self.apply_darkening(stage);

        let shot_off = striking.and_then(|surface| self.shoot_off(stage, surface));

        if self.current_energy > 0 {
            tracing::debug!(model = ?self.model, damage, energy = self.current_energy, "object damaged");
            return HurtOutcome::Damaged {
                energy: self.current_energy,
                shot_off,
            };
        }

        self.destroy(stage);
        HurtOutcome::Destroyed { shot_off }
    }

    /// Apply `damage` from a resolved hit and kick any shot-off part along the shot.
    pub fn hurt_by(&mut self, stage: &mut Stage, damage: u32, hit: &HitPoint) -> HurtOutcome {
        let outcome = self.hurt(stage, damage, Some(hit.surface));
        if let HurtOutcome::Damaged {
            shot_off: Some(part),
            ..
        }
        | HurtOutcome::Destroyed {
            shot_off: Some(part),
        } = outcome
        {
            let kick = HitPoint {
                surface: part,
                ..*hit
            };
            ShotResolver::apply_impulse(stage, &kick, self.config.shoot_off_impulse);
        }
        outcome
    }

    /// Place a bullet hole for `hit`, ordered after every earlier decal on this object.
    pub fn place_bullet_hole<R: Rng>(
        &mut self,
        stage: &mut Stage,
        hit: &HitPoint,
        lookup: &dyn MaterialLookup,
        placer: &mut DecalPlacer<R>,
    ) -> Option<hecs::Entity> {
        if self.destroyed {
            tracing::debug!(model = ?self.model, "object destroyed, no decal");
            return None;
        }
        if hit.model != self.model {
            tracing::warn!(model = ?self.model, hit_model = ?hit.model, "hit belongs to another object, no decal");
            return None;
        }
        let decal = placer.place_bullet_hole(stage, hit, lookup, self.next_decal_index)?;
        self.next_decal_index += 1;
        Some(decal)
    }

    pub fn render(&self, stage: &mut Stage, renderer: &mut dyn SceneRenderer) -> Result<usize> {
        stage.render_model(self.model, renderer)
    }

    pub fn set_visible(&self, stage: &mut Stage, visible: bool) -> Result<()> {
        stage.set_model_visible(self.model, visible)
    }

    /// Remove the object's geometry, decals and debris from the stage.
    pub fn dispose(self, stage: &mut Stage) -> Result<usize> {
        stage.dispose_model(self.model)
    }

    fn apply_darkening(&self, stage: &mut Stage) {
        let darkening = self.darkening();
        let Some(model) = stage.model(self.model) else {
            return;
        };
        let surfaces = model.surfaces().to_vec();
        for entity in surfaces {
            if let Ok(mut surface) = stage.world().get::<&mut Surface>(entity) {
                surface.darkening = darkening;
            }
        }
    }

    fn shoot_off(&self, stage: &mut Stage, surface: hecs::Entity) -> Option<hecs::Entity> {
        if !self.supports_fragmentation(stage) {
            return None;
        }
        let belongs = stage.model(self.model).is_some_and(|m| m.contains(surface));
        if !belongs || stage.world().get::<&CompoundChild>(surface).is_err() {
            tracing::debug!(model = ?self.model, ?surface, "struck surface is not a compound member");
            return None;
        }
        stage
            .detach_from_compound(surface, &self.config.fragment_profile)
            .then_some(surface)
    }

    fn destroy(&mut self, stage: &mut Stage) {
        self.destroyed = true;
        let profile = self.config.fragment_profile;
        let detached = stage.dissolve_compound(self.model, &profile);
        let released = match stage.release_static_bodies(self.model, &profile) {
            Ok(released) => released,
            Err(err) => {
                tracing::warn!(model = ?self.model, %err, "cannot release debris");
                0
            }
        };
        tracing::info!(
            model = ?self.model,
            detached = detached.len(),
            released,
            "object destroyed"
        );
    }
}
