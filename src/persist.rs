//! Persistence of the selected model across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::Model;

pub const DEFAULT_CONFIG_FILE: &str = "fgasim_config.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistentConfig {
    model: u8,
}

/// Load the persisted model selection. A missing or unreadable file, or an
/// unknown model id, falls back to [`Model::Office`].
pub fn load_model(path: &Path) -> Model {
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<PersistentConfig>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed config file");
                return Model::Office;
            }
        },
        Err(err) => {
            debug!(path = %path.display(), %err, "no config file, using default model");
            return Model::Office;
        }
    };

    match Model::from_id(config.model) {
        Some(model) => model,
        None => {
            warn!(id = config.model, "unknown model id in config file, using default");
            Model::Office
        }
    }
}

/// Persist the model selection. Written to a sibling temp file first so a
/// crash mid-write cannot leave a truncated config behind.
pub fn store_model(path: &Path, model: Model) -> std::io::Result<()> {
    let config = PersistentConfig { model: model.id() };
    let contents = serde_json::to_string_pretty(&config)?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;

    debug!(path = %path.display(), %model, "persisted model selection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fgasim-test-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn store_then_load_round_trips() {
        let path = temp_path("roundtrip");

        store_model(&path, Model::Vrf).unwrap();
        assert_eq!(load_model(&path), Model::Vrf);

        store_model(&path, Model::Horizontal).unwrap();
        assert_eq!(load_model(&path), Model::Horizontal);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_falls_back_to_office() {
        assert_eq!(load_model(&temp_path("does-not-exist")), Model::Office);
    }

    #[test]
    fn malformed_file_falls_back_to_office() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_model(&path), Model::Office);

        std::fs::write(&path, r#"{"model": 9}"#).unwrap();
        assert_eq!(load_model(&path), Model::Office);

        std::fs::remove_file(&path).unwrap();
    }
}
