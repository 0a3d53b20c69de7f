use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};
use tracing::debug;

/// Filesystem access used by toggles to reach driver attribute files
pub trait AttributeStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole attribute file
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replaces the attribute contents in a single write. A missing attribute
    /// is an error, never created.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Attribute store backed by the real filesystem (sysfs on device)
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsStore;

impl AttributeStore for SysfsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let value = fs::read_to_string(path)?;
        debug!("Read {:?} from {}", value, path.display());
        Ok(value)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        debug!("Writing {:?} to {}", contents, path.display());
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(contents.as_bytes())
    }
}

/// Strips the trailing newline a driver appends to its attribute value
pub fn trim_value(raw: &str) -> &str {
    raw.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_trim_value() {
        assert_eq!(trim_value("OTG\n"), "OTG");
        assert_eq!(trim_value("OTG\r\n"), "OTG");
        assert_eq!(trim_value("OTG"), "OTG");
        assert_eq!(trim_value("\n"), "");
        // Only the line ending is stripped
        assert_eq!(trim_value(" OTG \n"), " OTG ");
    }

    #[test]
    fn test_sysfs_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mode");
        let store = SysfsStore;

        fs::write(&path, "USB\n").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), "USB\n");

        // Whole-file replacement, no leftovers from a longer previous value
        store.write(&path, "OTGX\n").unwrap();
        store.write(&path, "OTG\n").unwrap();
        assert_eq!(store.read(&path).unwrap(), "OTG\n");
    }

    #[test]
    fn test_sysfs_store_never_creates_attribute() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mode");
        let store = SysfsStore;

        assert!(!store.exists(&path));
        assert!(store.read(&path).is_err());

        let err = store.write(&path, "OTG\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!store.exists(&path));
    }

    #[test]
    fn test_sysfs_store_write_into_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("mode");
        assert!(SysfsStore.write(&path, "OTG\n").is_err());
    }
}
