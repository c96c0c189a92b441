//! File system helpers shared by the configuration and provider layers.

use std::path::Path;

/// Check if a file exists in a directory
pub fn has_file(dir: &Path, filename: &str) -> bool {
    dir.join(filename).is_file()
}

/// Check if any file in `dir` has the given extension (without the dot).
///
/// Directory names containing glob metacharacters are escaped so only the
/// extension acts as a pattern.
pub fn has_file_with_extension(dir: &Path, extension: &str) -> bool {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/*.{}", escaped, extension);
    match glob::glob(&pattern) {
        Ok(mut paths) => paths.any(|entry| entry.map(|p| p.is_file()).unwrap_or(false)),
        Err(_) => false,
    }
}

/// Check if `path` is a regular file with at least one execute bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_has_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".autoresume"), "\n").unwrap();
        assert!(has_file(dir.path(), ".autoresume"));
        assert!(!has_file(dir.path(), "missing"));
    }

    #[test]
    fn test_has_file_with_extension() {
        let dir = TempDir::new().unwrap();
        assert!(!has_file_with_extension(dir.path(), "vmem"));
        fs::write(dir.path().join("guest-1a2b.vmem"), b"").unwrap();
        assert!(has_file_with_extension(dir.path(), "vmem"));
    }

    #[test]
    fn test_has_file_with_extension_escapes_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Ubuntu [64-bit].vmwarevm");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("Ubuntu.vmem"), b"").unwrap();
        assert!(has_file_with_extension(&dir, "vmem"));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vmrun");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        assert!(!is_executable(&path));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&path));
        assert!(!is_executable(dir.path()));
    }
}
