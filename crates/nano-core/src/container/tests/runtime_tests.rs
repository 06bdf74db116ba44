use std::sync::Arc;

use serde_json::json;

use crate::container::builder::ContainerBuilder;
use crate::container::compiled::CompiledContainer;
use crate::container::runtime::Container;
use crate::kernel::error::Result;

#[derive(Debug, PartialEq)]
struct Clock {
    offset: i64,
}

fn compiled_container() -> Result<Container> {
    let mut builder = ContainerBuilder::new();
    builder.set_parameter("app.retries", 3)?;
    builder.set_parameter("app.hosts", json!(["a", "b"]))?;
    builder.register("app::Clock", "app::Clock")?.set_public(true);
    builder.set_alias("clock", "app::Clock")?;
    builder.compile()?;
    Ok(Container::from(CompiledContainer::from_builder(&builder)?))
}

#[test]
fn test_lookup_through_aliases() -> Result<()> {
    let container = compiled_container()?;
    assert!(container.has("app::Clock"));
    assert!(container.has("clock"));
    assert!(!container.has("app::Missing"));
    assert_eq!(container.definition("clock").and_then(|d| d.class.as_deref()), Some("app::Clock"));
    assert_eq!(container.public_service_ids(), vec!["app::Clock"]);
    Ok(())
}

#[test]
fn test_typed_parameters() -> Result<()> {
    let container = compiled_container()?;
    assert_eq!(container.parameter_as::<u32>("app.retries"), Some(3));
    assert_eq!(
        container.parameter_as::<Vec<String>>("app.hosts"),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(container.parameter_as::<bool>("app.retries"), None);
    assert_eq!(container.parameter_as::<u32>("app.missing"), None);
    Ok(())
}

#[test]
fn test_runtime_instances() -> Result<()> {
    let container = compiled_container()?;
    container.set("app::Clock", Arc::new(Clock { offset: 2 }));
    container.set("runtime.only", Arc::new(String::from("live")));

    assert_eq!(container.get::<Clock>("clock").map(|c| c.offset), Some(2));
    assert!(container.get::<String>("app::Clock").is_none());
    assert!(container.has("runtime.only"));
    assert_eq!(
        container.get::<String>("runtime.only").as_deref().map(String::as_str),
        Some("live")
    );
    Ok(())
}

#[test]
fn test_snapshot_omits_instances() -> Result<()> {
    let container = compiled_container()?;
    container.set("runtime.only", Arc::new(1u8));

    let snapshot = container.to_compiled();
    assert!(!snapshot.services.contains_key("runtime.only"));
    assert_eq!(snapshot.aliases.get("clock").map(String::as_str), Some("app::Clock"));
    Ok(())
}
