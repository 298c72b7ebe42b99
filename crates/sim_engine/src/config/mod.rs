//! Declarative configuration loading
//!
//! Entity configurations (configuration name → ordered prototype names) are
//! plain serde data. The core accepts them programmatically; this module
//! adds the file-format convenience layer used by tooling and sandboxes.

use std::collections::BTreeMap;

pub use serde::{Deserialize, Serialize};

use crate::ecs::entity_manager::{EntityError, EntityManager};

/// Configuration file errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Unsupported file format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// File-backed configuration data.
///
/// The format is picked by file extension: `.toml` or `.ron`.
pub trait ConfigFile: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Declarative entity configurations: name → ordered prototype names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityConfigSet {
    /// Configuration name → ordered list of prototype names
    pub configurations: BTreeMap<String, Vec<String>>,
}

impl ConfigFile for EntityConfigSet {}

impl EntityConfigSet {
    /// Register every configuration into an entity manager.
    ///
    /// Fails on the first configuration whose prototypes are not all
    /// registered; earlier entries stay registered.
    pub fn apply(&self, entities: &mut EntityManager) -> Result<(), EntityError> {
        for (name, prototypes) in &self.configurations {
            entities.register_configuration(name, prototypes.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::HealthComponent;
    use crate::ecs::ComponentHandle;

    fn sample_set() -> EntityConfigSet {
        let mut set = EntityConfigSet::default();
        set.configurations
            .insert("grunt".to_string(), vec!["grunt_health".to_string()]);
        set
    }

    #[test]
    fn ron_files_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("sim_engine_configs_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let set = sample_set();
        set.save_to_file(&path).unwrap();
        let loaded = EntityConfigSet::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.configurations, set.configurations);
    }

    #[test]
    fn toml_files_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("sim_engine_configs_{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let set = sample_set();
        set.save_to_file(&path).unwrap();
        let loaded = EntityConfigSet::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.configurations, set.configurations);
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let result = EntityConfigSet::load_from_file("entities.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn apply_registers_configurations_against_live_prototypes() {
        let mut entities = EntityManager::new();
        let components = entities.components_mut();
        components.register_factory(HealthComponent::default);
        components
            .register_prototype("grunt_health", ComponentHandle::new(HealthComponent::new(40.0)))
            .unwrap();

        sample_set().apply(&mut entities).unwrap();
        assert!(entities.has_configuration("grunt"));

        let mut bare = EntityManager::new();
        let result = sample_set().apply(&mut bare);
        assert!(result.is_err());
    }
}
