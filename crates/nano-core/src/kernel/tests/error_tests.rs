use std::io;
use std::path::PathBuf;

use crate::bundle_system::error::BundleSystemError;
use crate::container::error::ContainerError;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::storage::error::StorageSystemError;

#[test]
fn test_subsystem_errors_convert() {
    let err: Error = ContainerError::NotCompiled.into();
    assert!(matches!(err, Error::Container(ContainerError::NotCompiled)));

    let err: Error = BundleSystemError::DuplicateBundleName {
        name: "Framework".to_string(),
        first: "a".to_string(),
        second: "b".to_string(),
    }
    .into();
    assert!(err.to_string().contains("\"Framework\""));
}

#[test]
fn test_io_helper_keeps_path_and_operation() {
    let err = Error::io(
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        "create_dir_all",
        PathBuf::from("/srv/app/var/cache/dev"),
    );
    match err {
        Error::StorageSystem(StorageSystemError::Io { path, operation, .. }) => {
            assert_eq!(path, PathBuf::from("/srv/app/var/cache/dev"));
            assert_eq!(operation, "create_dir_all");
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_lifecycle_error_keeps_source() {
    let err = Error::lifecycle(
        KernelLifecyclePhase::Build,
        "kernel build hook failed",
        Error::from("boom"),
    );
    assert_eq!(err.to_string(), "Kernel lifecycle error during Build: kernel build hook failed");
    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("Error: boom"));
}

#[test]
fn test_hook_failure_message() {
    let err: Error =
        BundleSystemError::hook_failed("Twig", "boot", Error::from("no templates")).into();
    assert_eq!(
        err.to_string(),
        "Bundle system error: Bundle 'Twig' failed during boot: Error: no templates"
    );
}
