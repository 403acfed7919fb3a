//! Render settings: per-scene defaults, optionally overridden from JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ember_math::Vec3;
use ember_renderer::{Camera, Color, RenderConfig};
use serde::{Deserialize, Serialize};

/// Everything needed to set up the camera and the integrator.
///
/// Serializes to the same shape [`SettingsOverrides`] reads, so a printed
/// settings file can be edited and passed back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub image_width: u32,
    /// Width over height
    pub aspect_ratio: f32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub vfov: f32,
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    pub defocus_angle: f32,
    pub focus_dist: f32,
    pub background: Color,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            vfov: 20.0,
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            background: Color::new(0.7, 0.8, 1.0),
        }
    }
}

impl Settings {
    /// Build an initialized camera.
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::new()
            .with_aspect_ratio(self.image_width, self.aspect_ratio)
            .with_position(self.look_from, self.look_at, self.vup)
            .with_lens(self.vfov, self.defocus_angle, self.focus_dist);
        camera.initialize();
        camera
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            background: self.background,
        }
    }

    /// Replace every field the overrides set.
    pub fn apply(&mut self, overrides: &SettingsOverrides) {
        let o = overrides;
        if let Some(v) = o.image_width {
            self.image_width = v;
        }
        if let Some(v) = o.aspect_ratio {
            self.aspect_ratio = v;
        }
        if let Some(v) = o.samples_per_pixel {
            self.samples_per_pixel = v;
        }
        if let Some(v) = o.max_depth {
            self.max_depth = v;
        }
        if let Some(v) = o.vfov {
            self.vfov = v;
        }
        if let Some(v) = o.look_from {
            self.look_from = v;
        }
        if let Some(v) = o.look_at {
            self.look_at = v;
        }
        if let Some(v) = o.vup {
            self.vup = v;
        }
        if let Some(v) = o.defocus_angle {
            self.defocus_angle = v;
        }
        if let Some(v) = o.focus_dist {
            self.focus_dist = v;
        }
        if let Some(v) = o.background {
            self.background = v;
        }
    }
}

/// Partial settings, as read from a JSON file or the command line.
///
/// Vectors are written as `[x, y, z]` arrays.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    pub image_width: Option<u32>,
    pub aspect_ratio: Option<f32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub vfov: Option<f32>,
    pub look_from: Option<Vec3>,
    pub look_at: Option<Vec3>,
    pub vup: Option<Vec3>,
    pub defocus_angle: Option<f32>,
    pub focus_dist: Option<f32>,
    pub background: Option<Color>,
}

impl SettingsOverrides {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_size() {
        let camera = Settings::default().camera();
        assert_eq!(camera.image_width, 400);
        assert_eq!(camera.image_height, 225);
    }

    #[test]
    fn test_height_never_zero() {
        let settings = Settings {
            image_width: 1,
            aspect_ratio: 16.0,
            ..Settings::default()
        };
        assert_eq!(settings.camera().image_height, 1);
    }

    #[test]
    fn test_render_config_fields() {
        let settings = Settings {
            samples_per_pixel: 7,
            max_depth: 3,
            background: Color::ZERO,
            ..Settings::default()
        };
        let config = settings.render_config();
        assert_eq!(config.samples_per_pixel, 7);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.background, Color::ZERO);
    }

    #[test]
    fn test_partial_overrides_keep_scene_values() {
        let mut settings = Settings {
            vfov: 40.0,
            ..Settings::default()
        };
        let overrides = SettingsOverrides::from_json(
            r#"{ "samples_per_pixel": 8, "look_from": [1.0, 2.0, 3.0] }"#,
        )
        .unwrap();
        settings.apply(&overrides);

        assert_eq!(settings.samples_per_pixel, 8);
        assert_eq!(settings.look_from, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(settings.vfov, 40.0);
        assert_eq!(settings.max_depth, 50);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SettingsOverrides::from_json(r#"{ "samples": 8 }"#).is_err());
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut settings = Settings::default();
        settings.apply(&SettingsOverrides::default());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_printed_settings_read_back() {
        let original = Settings {
            image_width: 64,
            look_at: Vec3::new(0.0, 1.0, 0.0),
            background: Color::ZERO,
            ..Settings::default()
        };
        let json = serde_json::to_string(&original).unwrap();

        let mut restored = Settings {
            vfov: 90.0,
            ..Settings::default()
        };
        restored.apply(&SettingsOverrides::from_json(&json).unwrap());
        assert_eq!(restored, original);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let path = std::env::temp_dir().join("ember_settings_does_not_exist.json");
        assert!(SettingsOverrides::load(&path).is_err());
    }
}
