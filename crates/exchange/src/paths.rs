//! Where files go. Hosts supply roots and targets; nothing here is hard-coded into the
//! export and import functions.

use log::warn;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Supplies the root directory under which a host keeps exported meshes.
pub trait PathResolver {
    fn resolve_root(&self) -> PathBuf;
}

/// Supplies the absolute path of a single file to export to or import from.
pub trait FileTarget {
    fn file_path(&self) -> PathBuf;
}

impl<F: Fn() -> PathBuf> PathResolver for F {
    fn resolve_root(&self) -> PathBuf {
        self()
    }
}

impl FileTarget for PathBuf {
    fn file_path(&self) -> PathBuf {
        self.clone()
    }
}

impl FileTarget for &Path {
    fn file_path(&self) -> PathBuf {
        self.to_path_buf()
    }
}

/// A root that never changes, such as an application's persistent data directory.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl PathResolver for FixedRoot {
    fn resolve_root(&self) -> PathBuf {
        self.0.clone()
    }
}

/// The user-visible storage root of the current platform: external storage on Android,
/// the Downloads folder of the user profile elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformRoot;

impl PathResolver for PlatformRoot {
    fn resolve_root(&self) -> PathBuf {
        platform_root(|key| std::env::var_os(key))
    }
}

#[cfg(target_os = "android")]
fn platform_root<F: Fn(&str) -> Option<OsString>>(env: F) -> PathBuf {
    env("EXTERNAL_STORAGE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/sdcard"))
}

#[cfg(not(target_os = "android"))]
fn platform_root<F: Fn(&str) -> Option<OsString>>(env: F) -> PathBuf {
    match env("HOME").or_else(|| env("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join("Downloads"),
        None => {
            warn!("no user profile directory, using ./Downloads");
            PathBuf::from("Downloads")
        }
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;

    #[test]
    fn downloads_under_home() {
        let root = platform_root(|key| match key {
            "HOME" => Some("/home/ada".into()),
            _ => None,
        });
        assert_eq!(PathBuf::from("/home/ada/Downloads"), root);
    }

    #[test]
    fn falls_back_to_user_profile() {
        let root = platform_root(|key| match key {
            "USERPROFILE" => Some("C:/Users/ada".into()),
            _ => None,
        });
        assert_eq!(PathBuf::from("C:/Users/ada").join("Downloads"), root);
    }

    #[test]
    fn relative_without_profile() {
        assert_eq!(PathBuf::from("Downloads"), platform_root(|_| None));
    }

    #[test]
    fn closures_resolve() {
        let resolver = || PathBuf::from("/data/meshes");
        assert_eq!(PathBuf::from("/data/meshes"), resolver.resolve_root());
        assert_eq!(
            PathBuf::from("/tmp"),
            FixedRoot(PathBuf::from("/tmp")).resolve_root()
        );
    }
}
