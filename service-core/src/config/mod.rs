use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Name of the YAML file every service keeps under its `config/` directory.
pub const BASE_CONFIG_FILE: &str = "base.yaml";

/// Resolve the `config/` directory of a workspace member.
///
/// Works both when the binary is started from the member directory and when it
/// is started from the workspace root.
pub fn configuration_directory(base_path: &Path, member: &str) -> PathBuf {
    if base_path.ends_with(member) {
        base_path.join("config")
    } else {
        base_path.join(member).join("config")
    }
}

/// Load typed settings for a workspace member.
///
/// Sources, lowest precedence first:
/// 1. `<member>/config/base.yaml`
/// 2. `APP_`-prefixed environment variables, `__` separating nested keys
///    (e.g. `APP_SERVER__PORT=9000`).
pub fn load_settings<T: DeserializeOwned>(member: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, member);

    let settings = Cfg::builder()
        .add_source(File::from(directory.join(BASE_CONFIG_FILE)).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_directory_from_member_root() {
        let dir = configuration_directory(Path::new("/srv/app/care-portal"), "care-portal");
        assert_eq!(dir, PathBuf::from("/srv/app/care-portal/config"));
    }

    #[test]
    fn resolves_directory_from_workspace_root() {
        let dir = configuration_directory(Path::new("/srv/app"), "care-portal");
        assert_eq!(dir, PathBuf::from("/srv/app/care-portal/config"));
    }
}
