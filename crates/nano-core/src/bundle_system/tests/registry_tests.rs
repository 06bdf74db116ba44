use std::sync::{Arc, Mutex};

use crate::bundle_system::declaration::BundleDeclarations;
use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::registry::{BundleFactories, BundleRegistry};
use crate::bundle_system::traits::Bundle;
use crate::kernel::error::{Error, Result};

struct NamedBundle {
    name: String,
    events: Arc<Mutex<Vec<String>>>,
}

impl Bundle for NamedBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&mut self) -> Result<()> {
        self.events.lock().unwrap().push(format!("shutdown:{}", self.name));
        Ok(())
    }
}

fn factories(events: &Arc<Mutex<Vec<String>>>) -> BundleFactories {
    let mut factories = BundleFactories::new();
    let bundles = [
        ("app::FrameworkBundle", "Framework"),
        ("app::TwigBundle", "Twig"),
        ("other::FrameworkBundle", "Framework"),
    ];
    for (identifier, name) in bundles {
        let events = Arc::clone(events);
        factories.register(identifier, move || {
            Box::new(NamedBundle {
                name: name.to_string(),
                events: Arc::clone(&events),
            }) as Box<dyn Bundle>
        });
    }
    factories
}

#[test]
fn test_active_bundles_in_declaration_order() -> Result<()> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut declarations = BundleDeclarations::new();
    declarations
        .declare("app::TwigBundle", "all", true)
        .declare("app::FrameworkBundle", "all", true)
        .declare("other::FrameworkBundle", "all", false);

    let registry = BundleRegistry::from_declarations(&declarations, &factories(&events), "dev")?;

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Twig", "Framework"]);
    assert_eq!(registry.identifier_of("Framework"), Some("app::FrameworkBundle"));
    assert!(registry.get("Twig").is_some());
    Ok(())
}

#[test]
fn test_duplicate_bundle_name_fails() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut declarations = BundleDeclarations::new();
    declarations
        .declare("app::FrameworkBundle", "all", true)
        .declare("other::FrameworkBundle", "dev", true);

    let err =
        BundleRegistry::from_declarations(&declarations, &factories(&events), "dev").unwrap_err();
    match err {
        Error::BundleSystem(BundleSystemError::DuplicateBundleName { name, first, second }) => {
            assert_eq!(name, "Framework");
            assert_eq!(first, "app::FrameworkBundle");
            assert_eq!(second, "other::FrameworkBundle");
        }
        other => panic!("Expected DuplicateBundleName, got {:?}", other),
    }

    // Inactive in prod, so no conflict
    assert!(BundleRegistry::from_declarations(&declarations, &factories(&events), "prod").is_ok());
}

#[test]
fn test_unknown_identifier_fails() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut declarations = BundleDeclarations::new();
    declarations.declare("app::MissingBundle", "all", true);

    let err =
        BundleRegistry::from_declarations(&declarations, &factories(&events), "dev").unwrap_err();
    match err {
        Error::BundleSystem(BundleSystemError::UnknownBundle { identifier, known }) => {
            assert_eq!(identifier, "app::MissingBundle");
            assert_eq!(known.len(), 3);
        }
        other => panic!("Expected UnknownBundle, got {:?}", other),
    }
}

#[test]
fn test_reverse_iteration_for_shutdown() -> Result<()> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut declarations = BundleDeclarations::new();
    declarations
        .declare("app::FrameworkBundle", "all", true)
        .declare("app::TwigBundle", "all", true);

    let mut registry =
        BundleRegistry::from_declarations(&declarations, &factories(&events), "dev")?;
    for (_, bundle) in registry.iter_mut_rev() {
        bundle.shutdown()?;
    }

    assert_eq!(*events.lock().unwrap(), vec!["shutdown:Twig", "shutdown:Framework"]);
    Ok(())
}
