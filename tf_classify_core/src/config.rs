use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Tensor names and preprocessing constants of a retrained Inception-v3 graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Node fed with the normalised image, `Mul` in retrained graphs.
    pub input_name: String,
    pub output_name: String,
    pub image_size: usize,
    pub input_mean: f32,
    pub input_std: f32,
    pub top_k: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            input_name: "Mul".to_string(),
            output_name: "final_result".to_string(),
            image_size: 299,
            input_mean: 128.0,
            input_std: 128.0,
            top_k: 5,
        }
    }
}

impl ModelConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ModelConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            bail!("image_size must be positive");
        }
        if self.input_std == 0.0 || !self.input_std.is_finite() {
            bail!("input_std must be a finite non-zero value, got {}", self.input_std);
        }
        if self.input_name.is_empty() || self.output_name.is_empty() {
            bail!("input_name and output_name must not be empty");
        }
        Ok(())
    }
}

/// `final_result:0` and `final_result` name the same tensor.
pub(crate) fn node_name(tensor_name: &str) -> &str {
    tensor_name.strip_suffix(":0").unwrap_or(tensor_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ModelConfig::from_toml("").unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_eq!(config.top_k, 5);
        assert_eq!(config.output_name, "final_result");
    }

    #[test]
    fn partial_override() {
        let config = ModelConfig::from_toml("image_size = 224\ninput_std = 255.0\n").unwrap();
        assert_eq!(config.image_size, 224);
        assert_eq!(config.input_std, 255.0);
        assert_eq!(config.input_name, "Mul");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ModelConfig::from_toml("imagesize = 10").is_err());
    }

    #[test]
    fn rejects_degenerate_values() {
        assert!(ModelConfig::from_toml("image_size = 0").is_err());
        assert!(ModelConfig::from_toml("input_std = 0.0").is_err());
        assert!(ModelConfig::from_toml("output_name = \"\"").is_err());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        std::fs::write(&path, "output_name = \"softmax:0\"\ntop_k = 3\n").unwrap();
        let config = ModelConfig::from_path(&path).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(node_name(&config.output_name), "softmax");
    }

    #[test]
    fn missing_file_names_path() {
        let err = ModelConfig::from_path("/nonexistent/model.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/model.toml"));
    }

    #[test]
    fn node_name_strips_only_first_output() {
        assert_eq!(node_name("DecodeJpeg/contents:0"), "DecodeJpeg/contents");
        assert_eq!(node_name("split:1"), "split:1");
        assert_eq!(node_name("Mul"), "Mul");
    }
}
