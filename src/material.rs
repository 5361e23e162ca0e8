//! Texture identities, per-texture UV tiling, and impact decal lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque texture identity. Asset paths are resolved outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(from = "String"))]
pub struct TextureId(Arc<str>);

impl TextureId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextureId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TextureId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a box texture is mapped onto its faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UvTiling {
    /// One unit-square mapping duplicated on all six faces.
    #[default]
    AllToOne,
    /// Each face repeats the texture once per world unit of its in-plane size.
    TiledBySize,
}

/// Maps a struck surface's texture to the decal texture left by an impact.
pub trait MaterialLookup {
    /// Decal texture for an impact on `texture`. Never fails: unmapped
    /// textures yield a default decal.
    fn bullet_hole_for(&self, texture: &TextureId) -> TextureId;
}

/// In-memory material table: tiling policy and impact decals per texture.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    tiling: HashMap<TextureId, UvTiling>,
    bullet_holes: HashMap<TextureId, TextureId>,
    default_bullet_hole: TextureId,
}

impl MaterialLibrary {
    /// Create an empty library with the given fallback decal.
    pub fn new(default_bullet_hole: impl Into<TextureId>) -> Self {
        Self {
            tiling: HashMap::new(),
            bullet_holes: HashMap::new(),
            default_bullet_hole: default_bullet_hole.into(),
        }
    }

    /// Select the tiling strategy for every surface using `texture`.
    pub fn with_tiling(mut self, texture: impl Into<TextureId>, tiling: UvTiling) -> Self {
        self.tiling.insert(texture.into(), tiling);
        self
    }

    /// Register the decal left by impacts on `texture`.
    pub fn with_bullet_hole(
        mut self,
        texture: impl Into<TextureId>,
        decal: impl Into<TextureId>,
    ) -> Self {
        self.bullet_holes.insert(texture.into(), decal.into());
        self
    }

    /// Tiling strategy for a texture. Unregistered textures use [`UvTiling::AllToOne`].
    pub fn tiling_for(&self, texture: &TextureId) -> UvTiling {
        self.tiling.get(texture).copied().unwrap_or_default()
    }

    pub fn default_bullet_hole(&self) -> &TextureId {
        &self.default_bullet_hole
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new("decals/bullet_hole_default")
    }
}

impl MaterialLookup for MaterialLibrary {
    fn bullet_hole_for(&self, texture: &TextureId) -> TextureId {
        match self.bullet_holes.get(texture) {
            Some(decal) => decal.clone(),
            None => {
                tracing::trace!(%texture, "no bullet hole mapped, using default");
                self.default_bullet_hole.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiling_is_per_texture() {
        let library = MaterialLibrary::default().with_tiling("walls/brick", UvTiling::TiledBySize);
        assert_eq!(
            library.tiling_for(&TextureId::new("walls/brick")),
            UvTiling::TiledBySize
        );
        assert_eq!(
            library.tiling_for(&TextureId::new("props/crate")),
            UvTiling::AllToOne
        );
    }

    #[test]
    fn test_bullet_hole_lookup_with_fallback() {
        let library = MaterialLibrary::new("decals/generic")
            .with_bullet_hole("walls/brick", "decals/brick_hole")
            .with_bullet_hole("glass", "decals/glass_crack");

        assert_eq!(
            library.bullet_hole_for(&"glass".into()),
            TextureId::new("decals/glass_crack")
        );
        assert_eq!(
            library.bullet_hole_for(&"props/unknown".into()),
            TextureId::new("decals/generic")
        );
    }

    #[test]
    fn test_texture_id_display() {
        let id = TextureId::from(String::from("floor/tiles"));
        assert_eq!(id.to_string(), "floor/tiles");
        assert_eq!(id.as_str(), "floor/tiles");
    }
}
