// ⚙️ Render configuration - box geometry, spacing, framing and text caps
//
// Every field has a default; a JSON file only needs the keys it overrides.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    // ========================================================================
    // NODE BOX
    // ========================================================================
    pub node_width: f64,
    pub node_height: f64,
    pub header_height: f64,
    pub corner_radius: f64,

    // ========================================================================
    // SPACING BETWEEN BOXES
    // ========================================================================
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,

    // ========================================================================
    // TEXT
    // ========================================================================
    pub name_max_chars: usize,
    pub value_max_chars: usize,
    pub max_detail_lines: usize,
    pub detail_line_height: f64,
    /// Gap between the header and the first detail line
    pub detail_top_padding: f64,
    pub font_family: String,

    // ========================================================================
    // VIEW
    // ========================================================================
    pub initial_scale: f64,
    pub margin_top: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub reset_duration_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            node_width: 200.0,
            node_height: 90.0,
            header_height: 26.0,
            corner_radius: 6.0,
            horizontal_spacing: 30.0,
            vertical_spacing: 60.0,
            name_max_chars: 24,
            value_max_chars: 20,
            max_detail_lines: 3,
            detail_line_height: 16.0,
            detail_top_padding: 18.0,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            initial_scale: 0.8,
            margin_top: 40.0,
            min_scale: 0.05,
            max_scale: 3.0,
            reset_duration_ms: 750,
        }
    }
}

impl RenderConfig {
    /// Load overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render config {}", path.display()))?;
        let config: RenderConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse render config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid render config {}", path.display()))?;
        Ok(config)
    }

    /// Reject zoom bounds that cannot frame a diagram
    pub fn validate(&self) -> Result<()> {
        if !self.min_scale.is_finite() || !self.max_scale.is_finite() {
            bail!(
                "zoom bounds must be finite (minScale {}, maxScale {})",
                self.min_scale,
                self.max_scale
            );
        }
        if self.min_scale <= 0.0 {
            bail!("minScale must be positive, got {}", self.min_scale);
        }
        if self.min_scale > self.max_scale {
            bail!(
                "minScale {} is greater than maxScale {}",
                self.min_scale,
                self.max_scale
            );
        }
        if !self.initial_scale.is_finite() || self.initial_scale <= 0.0 {
            bail!("initialScale must be positive, got {}", self.initial_scale);
        }
        Ok(())
    }

    /// Distance between neighbouring node origins, as [x, y]
    pub fn node_size(&self) -> [f64; 2] {
        [
            self.node_width + self.horizontal_spacing,
            self.node_height + self.vertical_spacing,
        ]
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        // Bounds may be inverted when `validate` was skipped
        k.max(self.min_scale).min(self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_sane() {
        let config = RenderConfig::default();
        assert!(config.initial_scale < 1.0);
        assert!(config.min_scale < config.initial_scale);
        assert!(config.header_height < config.node_height);
        assert_eq!(config.node_size(), [230.0, 150.0]);
    }

    #[test]
    fn test_partial_override() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "nodeWidth": 150, "nameMaxChars": 10 }"#).unwrap();
        assert_eq!(config.node_width, 150.0);
        assert_eq!(config.name_max_chars, 10);
        assert_eq!(config.node_height, RenderConfig::default().node_height);
    }

    #[test]
    fn test_clamp_scale() {
        let config = RenderConfig::default();
        assert_eq!(config.clamp_scale(10.0), 3.0);
        assert_eq!(config.clamp_scale(0.0), 0.05);
        assert_eq!(config.clamp_scale(1.5), 1.5);
    }

    #[test]
    fn test_inverted_zoom_bounds_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "minScale": 5, "maxScale": 3 }"#).unwrap();
        let err = RenderConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("greater than maxScale"));
    }

    #[test]
    fn test_validate_bad_bounds() {
        let zero: RenderConfig = serde_json::from_str(r#"{ "minScale": 0 }"#).unwrap();
        assert!(zero.validate().is_err());
        let mut nan = RenderConfig::default();
        nan.max_scale = f64::NAN;
        assert!(nan.validate().is_err());
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_clamp_scale_with_inverted_bounds_does_not_panic() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "minScale": 5, "maxScale": 3 }"#).unwrap();
        assert_eq!(config.clamp_scale(1.0), 3.0);
        let view = crate::ViewTransform::initial(800.0, &config);
        assert!(view.k.is_finite());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "initialScale": 0.5 }"#).unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.initial_scale, 0.5);
    }
}
