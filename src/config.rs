//! Tunable constants for room layout and damage feedback.

use crate::physics::profile::PhysicsProfile;

/// Dimensions used by the room layout generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(default))]
pub struct LayoutConfig {
    /// Width of a door opening along the wall run. Default: 5.0.
    pub door_width: f32,
    /// Height of the frame box above a door. Default: 3.0.
    pub door_frame_height: f32,
    /// Width of a window opening along the wall run. Default: 4.5.
    pub window_width: f32,
    /// Height of the glass pane. Default: 4.0.
    pub window_height: f32,
    /// Height of the frame above the glass. Default: 2.0.
    pub window_top_frame_height: f32,
    /// Thickness of every wall box. Default: 0.5.
    pub wall_thickness: f32,
    /// Thickness of the floor and ceiling slabs. Default: 0.5.
    pub floor_thickness: f32,
    /// Opacity of window glass. Default: 0.35.
    pub glass_opacity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            door_width: 5.0,
            door_frame_height: 3.0,
            window_width: 4.5,
            window_height: 4.0,
            window_top_frame_height: 2.0,
            wall_thickness: 0.5,
            floor_thickness: 0.5,
            glass_opacity: 0.35,
        }
    }
}

#[cfg(feature = "descriptors")]
impl LayoutConfig {
    /// Parse a layout config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Damage feedback applied by destructible objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageConfig {
    /// Darkening reached when energy hits zero. Default: 0.6.
    pub max_darkening_ratio: f32,
    /// Impulse given to a sub-surface shot off a compound. Default: 4.0.
    pub shoot_off_impulse: f32,
    /// Profile of fragments and debris once they become independent bodies.
    /// Default: [`PhysicsProfile::LIGHT_WOOD`].
    pub fragment_profile: PhysicsProfile,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            max_darkening_ratio: 0.6,
            shoot_off_impulse: 4.0,
            fragment_profile: PhysicsProfile::LIGHT_WOOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_config_default() {
        let config = LayoutConfig::default();
        assert_eq!(config.door_width, 5.0);
        assert_eq!(config.window_width, 4.5);
        assert!(config.glass_opacity > 0.0 && config.glass_opacity < 1.0);
    }

    #[cfg(feature = "descriptors")]
    #[test]
    fn test_layout_config_partial_json() {
        let config = LayoutConfig::from_json(r#"{ "door_width": 3.0 }"#).unwrap();
        assert_eq!(config.door_width, 3.0);
        assert_eq!(config.window_width, LayoutConfig::default().window_width);
    }

    #[cfg(feature = "descriptors")]
    #[test]
    fn test_layout_config_rejects_bad_json() {
        assert!(LayoutConfig::from_json("{ door_width: }").is_err());
    }
}
