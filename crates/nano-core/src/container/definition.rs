use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a service is constructed and exposed.
///
/// `class` defaults to the service id when absent. Arguments are free-form
/// values; strings beginning with `@` are references to other services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Definition {
    pub class: Option<String>,
    pub public: bool,
    pub arguments: Vec<Value>,
    pub tags: Vec<String>,
    /// Interfaces this service implements, matched by autoconfiguration rules
    pub implements: Vec<String>,
    pub autoconfigure: bool,
}

/// A service reference found in a definition's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `@id`: compilation fails if `id` is missing
    Required(String),
    /// `@?id`: resolves to nothing if `id` is missing
    Optional(String),
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Required(id) | Reference::Optional(id) => id,
        }
    }

    /// Parse a reference from an argument value. `@@` escapes a literal `@`.
    pub fn parse(value: &Value) -> Option<Reference> {
        let s = value.as_str()?;
        let rest = s.strip_prefix('@')?;
        if rest.starts_with('@') || rest.is_empty() {
            return None;
        }
        match rest.strip_prefix('?') {
            Some(id) if !id.is_empty() => Some(Reference::Optional(id.to_string())),
            Some(_) => None,
            None => Some(Reference::Required(rest.to_string())),
        }
    }
}

impl Definition {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }

    /// The class name, falling back to the service id.
    pub fn class_or<'a>(&'a self, id: &'a str) -> &'a str {
        self.class.as_deref().unwrap_or(id)
    }

    pub fn set_public(&mut self, public: bool) -> &mut Self {
        self.public = public;
        self
    }

    pub fn set_autoconfigured(&mut self, autoconfigure: bool) -> &mut Self {
        self.autoconfigure = autoconfigure;
        self
    }

    pub fn add_argument(&mut self, argument: impl Into<Value>) -> &mut Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn add_interface(&mut self, interface: impl Into<String>) -> &mut Self {
        let interface = interface.into();
        if !self.implements.contains(&interface) {
            self.implements.push(interface);
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// All service references in the arguments, nested values included.
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        for argument in &self.arguments {
            collect_references(argument, &mut refs);
        }
        refs
    }
}

fn collect_references(value: &Value, refs: &mut Vec<Reference>) {
    match value {
        Value::String(_) => {
            if let Some(reference) = Reference::parse(value) {
                refs.push(reference);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, refs)),
        Value::Object(map) => map.values().for_each(|v| collect_references(v, refs)),
        _ => {}
    }
}

/// Changes applied to autoconfigured services implementing an interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoconfigureRule {
    pub public: Option<bool>,
    pub tags: Vec<String>,
}

impl AutoconfigureRule {
    pub fn set_public(&mut self, public: bool) -> &mut Self {
        self.public = Some(public);
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    pub(crate) fn apply(&self, definition: &mut Definition) {
        if let Some(public) = self.public {
            definition.public = public;
        }
        for tag in &self.tags {
            definition.add_tag(tag.clone());
        }
    }
}
