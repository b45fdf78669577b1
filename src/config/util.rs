//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /srv/app/logs/        ← cwd
/// /srv/app/tailcast.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
pub fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("tailcast.toml"), "").unwrap();

        let found = find_config_from(&nested, Path::new("tailcast.toml")).unwrap();
        assert_eq!(found, temp.path().join("tailcast.toml"));
    }

    #[test]
    fn test_find_config_ignores_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("tailcast.toml")).unwrap();
        // A directory with the config name must not match; the walk continues
        // upward and may only hit a real file outside the temp dir.
        let found = find_config_from(temp.path(), Path::new("tailcast.toml"));
        assert_ne!(found, Some(temp.path().join("tailcast.toml")));
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/etc/tailcast");
        assert_eq!(
            resolve_relative(base, Path::new("app.log")),
            PathBuf::from("/etc/tailcast/app.log")
        );
        assert_eq!(
            resolve_relative(base, Path::new("/var/log/app.log")),
            PathBuf::from("/var/log/app.log")
        );
    }
}
