//! Composite models: ordered groups of surfaces sharing one lifetime.

/// Stage-unique model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

impl ModelId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// One logical object made of surfaces: a wall, a crate, the floor.
///
/// Decals are not listed here; they hang off their host surface in the
/// transform hierarchy and are disposed with it.
#[derive(Debug, Clone)]
pub struct CompositeModel {
    name: String,
    surfaces: Vec<hecs::Entity>,
    compound_root: Option<hecs::Entity>,
}

impl CompositeModel {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surfaces: Vec::new(),
            compound_root: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Surfaces in creation order.
    pub fn surfaces(&self) -> &[hecs::Entity] {
        &self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn contains(&self, entity: hecs::Entity) -> bool {
        self.surfaces.contains(&entity)
    }

    /// Root of the compound assembly, if the model has one.
    pub fn compound_root(&self) -> Option<hecs::Entity> {
        self.compound_root
    }

    pub(crate) fn push(&mut self, entity: hecs::Entity) {
        self.surfaces.push(entity);
    }

    pub(crate) fn set_compound_root(&mut self, root: Option<hecs::Entity>) {
        self.compound_root = root;
    }
}
