use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub controls: ControlsConfig,
    pub layers: LayersConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub data: PathBuf,
    pub reference_image: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("CholeraPumps_Deaths.xls"),
            reference_image: PathBuf::from("Snow-cholera-map-1.jpg"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub style: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            latitude: 51.5134,
            longitude: -0.1365,
            zoom: 15.5,
            pitch: 0.0,
            // Light basemap that needs no access token.
            style: "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ControlsConfig {
    pub min_threshold: i64,
    pub max_threshold: i64,
    pub default_threshold: i64,
    pub show_pumps: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_threshold: 0,
            max_threshold: 15,
            default_threshold: 2,
            show_pumps: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LayersConfig {
    pub death_color: [u8; 4],
    pub pump_color: [u8; 4],
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            death_color: [200, 30, 0, 160],
            pump_color: [0, 0, 255, 160],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub query_tolerance_m: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            query_tolerance_m: 25.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 4],
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            background: [242, 242, 240, 255],
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.controls;
        anyhow::ensure!(
            c.min_threshold <= c.default_threshold && c.default_threshold <= c.max_threshold,
            "default_threshold {} must lie within [{}, {}]",
            c.default_threshold,
            c.min_threshold,
            c.max_threshold
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_original_constants() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.map.latitude, 51.5134);
        assert_eq!(config.map.longitude, -0.1365);
        assert_eq!(config.map.zoom, 15.5);
        assert_eq!(config.map.pitch, 0.0);
        assert_eq!(config.controls.min_threshold, 0);
        assert_eq!(config.controls.max_threshold, 15);
        assert_eq!(config.controls.default_threshold, 2);
        assert!(config.controls.show_pumps);
        assert_eq!(config.layers.death_color, [200, 30, 0, 160]);
        assert_eq!(config.layers.pump_color, [0, 0, 255, 160]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            data = "data/deaths.csv"

            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.input.data, PathBuf::from("data/deaths.csv"));
        assert_eq!(config.input.reference_image, PathBuf::from("Snow-cholera-map-1.jpg"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn rejects_default_outside_slider_bounds() {
        let mut config = AppConfig::default();
        config.controls.default_threshold = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load_from_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
