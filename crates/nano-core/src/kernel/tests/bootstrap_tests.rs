use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::kernel::bootstrap::Kernel;
use crate::kernel::error::{Error, Result};
use crate::kernel::hooks::KernelHooks;

struct FixedProjectDir(PathBuf);

impl KernelHooks for FixedProjectDir {
    fn project_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }

    fn kernel_location(&self) -> Result<PathBuf> {
        panic!("kernel location must not be consulted when the project dir is fixed");
    }
}

struct LocatedAt {
    location: PathBuf,
    marker: &'static str,
}

impl KernelHooks for LocatedAt {
    fn kernel_location(&self) -> Result<PathBuf> {
        Ok(self.location.clone())
    }

    fn project_marker(&self) -> &str {
        self.marker
    }
}

struct Unlocatable;

impl KernelHooks for Unlocatable {
    fn kernel_location(&self) -> Result<PathBuf> {
        Err(Error::ProjectDirResolution {
            path: PathBuf::from("/nowhere"),
            reason: "test".to_string(),
        })
    }
}

#[test]
fn test_construction_never_fails() {
    let cases = [("dev", true), ("prod", false), ("", false), ("weird env/..", true)];
    for (environment, debug) in cases {
        let kernel = Kernel::new(environment, debug);
        assert_eq!(kernel.environment(), environment);
        assert_eq!(kernel.is_debug(), debug);
        assert!(!kernel.is_booted());
        assert!(kernel.bundles().is_empty());
    }
}

#[test]
fn test_directories_from_overridden_project_dir() -> Result<()> {
    let project = PathBuf::from("/srv/app");
    let kernel = Kernel::with_hooks("staging", false, FixedProjectDir(project.clone()));

    assert_eq!(kernel.project_dir()?, project);
    assert_eq!(kernel.config_dir()?, project.join("config"));
    assert_eq!(kernel.cache_dir()?, project.join("var/cache/staging"));
    assert_eq!(kernel.build_dir()?, kernel.cache_dir()?);
    assert_eq!(kernel.log_dir()?, project.join("var/log"));
    assert_eq!(kernel.container_path()?, project.join("var/cache/staging/container.json"));
    Ok(())
}

#[test]
fn test_project_dir_detected_from_marker() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let location = dir.path().join("target/debug/deps");
    fs::create_dir_all(&location).expect("create kernel location");
    fs::write(dir.path().join("app.manifest"), "").expect("write marker");

    let kernel = Kernel::with_hooks(
        "dev",
        true,
        LocatedAt {
            location,
            marker: "app.manifest",
        },
    );
    assert_eq!(kernel.project_dir()?, dir.path());
    Ok(())
}

#[test]
fn test_project_dir_falls_back_to_kernel_location() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let location = dir.path().join("bin");
    fs::create_dir_all(&location).expect("create kernel location");

    let kernel = Kernel::with_hooks(
        "dev",
        true,
        LocatedAt {
            location: location.clone(),
            marker: "no-such-marker.lock",
        },
    );
    assert_eq!(kernel.project_dir()?, location);
    Ok(())
}

#[test]
fn test_unresolvable_location_fails_boot() {
    let mut kernel = Kernel::with_hooks("dev", true, Unlocatable);

    assert!(matches!(kernel.cache_dir(), Err(Error::ProjectDirResolution { .. })));
    assert!(matches!(kernel.boot(), Err(Error::ProjectDirResolution { .. })));
    assert!(!kernel.is_booted());
}

#[test]
fn test_clear_cache_without_cache_dir() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let kernel = Kernel::with_hooks("dev", true, FixedProjectDir(dir.path().to_path_buf()));
    assert!(!kernel.clear_cache()?);

    fs::create_dir_all(kernel.cache_dir()?).expect("create cache dir");
    assert!(kernel.clear_cache()?);
    assert!(!kernel.cache_dir()?.exists());
    Ok(())
}
