//! Locating the host configuration file

use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "FRAGMENT_HOST_CONFIG";

/// Configuration file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "fragment-host.yaml";

/// Pick the configuration file to load
///
/// Order: explicit path, `FRAGMENT_HOST_CONFIG`, `./fragment-host.yaml`,
/// `<config dir>/fragment-host/host.yaml`. When nothing exists the local
/// path is returned so the caller reports it as not found.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    resolve_with(
        explicit,
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        cwd,
        dirs::config_dir(),
    )
}

fn resolve_with(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    cwd: &Path,
    config_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }

    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return local;
    }
    if let Some(user) = config_dir.map(|dir| dir.join("fragment-host").join("host.yaml")) {
        if user.is_file() {
            return user;
        }
    }
    local
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("custom.yaml");
        let resolved = resolve_with(
            Some(&explicit),
            Some(PathBuf::from("/env.yaml")),
            temp.path(),
            None,
        );
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_env_before_local() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "{}").unwrap();
        let resolved = resolve_with(None, Some(PathBuf::from("/env.yaml")), temp.path(), None);
        assert_eq!(resolved, PathBuf::from("/env.yaml"));
    }

    #[test]
    fn test_local_before_user_dir() {
        let temp = TempDir::new().unwrap();
        let user_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(user_dir.path().join("fragment-host")).unwrap();
        std::fs::write(user_dir.path().join("fragment-host/host.yaml"), "{}").unwrap();

        let resolved = resolve_with(None, None, temp.path(), Some(user_dir.path().to_path_buf()));
        assert_eq!(resolved, user_dir.path().join("fragment-host/host.yaml"));

        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "{}").unwrap();
        let resolved = resolve_with(None, None, temp.path(), Some(user_dir.path().to_path_buf()));
        assert_eq!(resolved, temp.path().join(LOCAL_CONFIG_FILE));
    }

    #[test]
    fn test_defaults_to_local_path() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_with(None, None, temp.path(), None);
        assert_eq!(resolved, temp.path().join(LOCAL_CONFIG_FILE));
    }
}
