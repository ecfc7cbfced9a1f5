use serde::{Deserialize, Serialize};
use simworld_input::{Key, MotionAction};
use simworld_render::WindowProps;
use std::path::{Path, PathBuf};

/// Errors from loading a sandbox config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Speed overrides for spawned actors. Unset fields keep the built-in
/// defaults (or a scenario's own choice).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub move_speed: Option<f32>,
    pub turn_speed: Option<f32>,
}

/// Rebinding of the four steering keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionKeys {
    pub forward: Option<Key>,
    pub reverse: Option<Key>,
    pub turn_left: Option<Key>,
    pub turn_right: Option<Key>,
}

impl MotionKeys {
    /// The overrides that are set, in a fixed order.
    pub fn bindings(&self) -> impl Iterator<Item = (MotionAction, Key)> {
        [
            (MotionAction::Forward, self.forward),
            (MotionAction::Reverse, self.reverse),
            (MotionAction::TurnLeft, self.turn_left),
            (MotionAction::TurnRight, self.turn_right),
        ]
        .into_iter()
        .filter_map(|(action, key)| Some((action, key?)))
    }
}

/// Everything a sandbox needs before the first frame.
///
/// ```yaml
/// window: { title: MouseWorld, width: 1680, height: 1050, fullscreen: true }
/// models_dir: assets/models
/// actor: { move_speed: 70, turn_speed: 100 }
/// notify_user: false
/// keys: { forward: w, reverse: s }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub window: WindowProps,
    /// Directory that model names are resolved against.
    pub models_dir: PathBuf,
    pub actor: ActorConfig,
    /// Show on-screen notices for light, camera, and region changes.
    pub notify_user: bool,
    pub keys: MotionKeys,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            window: WindowProps::default(),
            models_dir: PathBuf::from("models"),
            actor: ActorConfig::default(),
            notify_user: true,
            keys: MotionKeys::default(),
        }
    }
}

impl SandboxConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simworld_input::KeyCode;

    #[test]
    fn empty_document_is_default() {
        let config = SandboxConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SandboxConfig::default());
        assert!(config.notify_user);
        assert_eq!(config.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = SandboxConfig::from_yaml_str(
            "window:\n  title: MouseWorld\n  width: 1680\n  height: 1050\nactor:\n  move_speed: 70\n",
        )
        .unwrap();
        assert_eq!(config.window.title, "MouseWorld");
        assert_eq!(config.window.width, 1680);
        assert!(!config.window.fullscreen);
        assert_eq!(config.actor.move_speed, Some(70.0));
        assert_eq!(config.actor.turn_speed, None);
    }

    #[test]
    fn key_overrides_parse() {
        let config =
            SandboxConfig::from_yaml_str("keys:\n  forward: w\n  turn_left: control-a\n").unwrap();
        let bindings: Vec<_> = config.keys.bindings().collect();
        assert_eq!(
            bindings,
            vec![
                (MotionAction::Forward, Key::char('w')),
                (MotionAction::TurnLeft, Key::control(KeyCode::Char('a'))),
            ]
        );
    }

    #[test]
    fn bad_key_name_is_rejected() {
        let err = SandboxConfig::from_yaml_str("keys:\n  forward: hyperspace\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandbox.yaml");
        std::fs::write(&path, "notify_user: false\nmodels_dir: assets\n").unwrap();
        let config = SandboxConfig::load(&path).unwrap();
        assert!(!config.notify_user);
        assert_eq!(config.models_dir, PathBuf::from("assets"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SandboxConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(SandboxConfig::load_or_default(None).is_ok());
    }
}
