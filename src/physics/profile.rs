//! Declarative physics profiles and impostor parameter derivation.

/// How a surface takes part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(rename_all = "snake_case"))]
pub enum BodyClass {
    /// No collision response and no gravity. No impostor is attached.
    Inert,
    /// Collides but never moves. Mass is always zero.
    Static,
    /// Simulated body with mass derived from volume and density.
    Movable,
}

/// Concrete parameters handed to the physics engine when attaching an impostor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpostorParams {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Body classification plus material constants.
///
/// Profiles are immutable and usually taken from the named constants below.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
pub struct PhysicsProfile {
    pub body_class: BodyClass,
    /// Mass per unit volume. Only meaningful for [`BodyClass::Movable`].
    pub density: f32,
    pub friction: f32,
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
}

impl PhysicsProfile {
    pub const INERT: Self = Self::preset(BodyClass::Inert, 0.0, 0.0, 0.0);
    pub const STATIC: Self = Self::preset(BodyClass::Static, 0.0, 0.6, 0.1);
    pub const GLASS: Self = Self::preset(BodyClass::Static, 0.0, 0.1, 0.4);
    pub const LIGHT_WOOD: Self = Self::preset(BodyClass::Movable, 0.6, 0.5, 0.2);
    pub const HEAVY_WOOD: Self = Self::preset(BodyClass::Movable, 0.9, 0.6, 0.1);
    pub const METAL: Self = Self::preset(BodyClass::Movable, 7.8, 0.4, 0.05);
    pub const PLAYER: Self = Self::preset(BodyClass::Movable, 1.0, 0.0, 0.0);

    const fn preset(body_class: BodyClass, density: f32, friction: f32, restitution: f32) -> Self {
        Self {
            body_class,
            density,
            friction,
            restitution,
        }
    }

    /// Create a profile. Restitution is clamped to `[0, 1]`, density and
    /// friction to non-negative values.
    pub fn new(body_class: BodyClass, density: f32, friction: f32, restitution: f32) -> Self {
        Self {
            body_class,
            density: density.max(0.0),
            friction: friction.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Whether an impostor should be attached at all.
    pub fn is_physical(&self) -> bool {
        self.body_class != BodyClass::Inert
    }

    /// Derive impostor parameters for a primitive of the given volume.
    ///
    /// Returns `None` for [`BodyClass::Inert`]: the caller must skip physics
    /// attachment entirely. Static bodies always get zero mass; movable bodies
    /// get `volume * density`.
    pub fn derive_impostor_params(&self, volume: f32) -> Option<ImpostorParams> {
        let mass = match self.body_class {
            BodyClass::Inert => return None,
            BodyClass::Static => 0.0,
            BodyClass::Movable => volume.max(0.0) * self.density,
        };
        Some(ImpostorParams {
            mass,
            friction: self.friction,
            restitution: self.restitution,
        })
    }

    /// Same material constants, reclassified as movable.
    pub fn into_movable(self, density: f32) -> Self {
        Self::new(BodyClass::Movable, density, self.friction, self.restitution)
    }
}
