use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A light captured from a lighting scene. Attributes are free-form, keyed by
/// the host's attribute names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    #[serde(default)]
    pub light_type: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// World transform, row-major.
    #[serde(default)]
    pub xform: Vec<f64>,
}

/// A named set of lights that can be re-applied to other scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightPreset {
    pub name: String,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl LightPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scene: None,
            episode: None,
            lights: Vec::new(),
        }
    }
}

impl std::fmt::Display for LightPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Light Preset - {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_tolerated() {
        let json = r#"{
            "name": "key_warm",
            "episode": "ep01",
            "created_by": "someone",
            "lights": [
                {"name": "KEY", "light_type": "VRayLightRectShape",
                 "attributes": {"intensity": 12.5, "color": [1.0, 0.8, 0.6]},
                 "xform": [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 5, 10, 2, 1],
                 "uuid": "abc"}
            ]
        }"#;
        let preset: LightPreset = serde_json::from_str(json).unwrap();
        assert_eq!(preset.lights.len(), 1);
        assert_eq!(preset.lights[0].attributes["intensity"], 12.5);
        assert_eq!(preset.lights[0].xform.len(), 16);
        assert_eq!(preset.to_string(), "Light Preset - key_warm");
    }
}
