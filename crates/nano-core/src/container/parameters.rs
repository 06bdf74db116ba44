//! `%name%` placeholder resolution for container parameters.
//!
//! A string that is exactly one placeholder takes the referenced value as-is
//! (keeping its type). Placeholders embedded in a longer string are replaced by
//! the scalar's text. `%%` is a literal percent sign.
use indexmap::IndexMap;
use serde_json::Value;

use crate::container::error::ContainerError;

pub struct ParameterResolver<'a> {
    raw: &'a IndexMap<String, Value>,
    resolved: IndexMap<String, Value>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(raw: &'a IndexMap<String, Value>) -> Self {
        Self {
            raw,
            resolved: IndexMap::new(),
        }
    }

    /// Resolver over parameters that were already resolved; their values are
    /// used verbatim and never scanned again.
    pub fn for_resolved(resolved: &'a IndexMap<String, Value>) -> Self {
        Self {
            raw: resolved,
            resolved: resolved.clone(),
        }
    }

    /// Resolve every parameter, preserving declaration order.
    pub fn resolve_all(mut self) -> Result<IndexMap<String, Value>, ContainerError> {
        let raw = self.raw;
        for name in raw.keys() {
            self.resolve_parameter(name, &mut Vec::new())?;
        }
        let mut ordered = IndexMap::with_capacity(raw.len());
        for name in raw.keys() {
            if let Some(value) = self.resolved.swap_remove(name) {
                ordered.insert(name.clone(), value);
            }
        }
        Ok(ordered)
    }

    /// Resolve placeholders inside an arbitrary value (service arguments, class names).
    pub fn resolve_value(&mut self, value: &Value, owner: &str) -> Result<Value, ContainerError> {
        self.resolve_with_stack(value, owner, &mut Vec::new())
    }

    fn resolve_parameter(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, ContainerError> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if stack.iter().any(|n| n == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ContainerError::CircularParameterReference { chain });
        }
        let raw = self
            .raw
            .get(name)
            .ok_or_else(|| ContainerError::ParameterNotFound {
                name: name.to_string(),
                referenced_by: stack.last().cloned(),
            })?
            .clone();

        stack.push(name.to_string());
        let value = self.resolve_with_stack(&raw, name, stack)?;
        stack.pop();

        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    fn resolve_with_stack(
        &mut self,
        value: &Value,
        owner: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, ContainerError> {
        match value {
            Value::String(s) => self.resolve_string(s, owner, stack),
            Value::Array(items) => items
                .iter()
                .map(|v| self.resolve_with_stack(v, owner, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.resolve_with_stack(v, owner, stack)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(
        &mut self,
        s: &str,
        owner: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, ContainerError> {
        if let Some(name) = whole_placeholder(s) {
            return self.resolve_parameter_for(name, owner, stack);
        }

        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                out.push('%');
                rest = tail;
                continue;
            }
            match after.find('%') {
                Some(end) if is_parameter_name(&after[..end]) => {
                    let name = &after[..end];
                    let value = self.resolve_parameter_for(name, owner, stack)?;
                    out.push_str(&scalar_to_string(name, &value)?);
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(Value::String(out))
    }

    fn resolve_parameter_for(
        &mut self,
        name: &str,
        owner: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, ContainerError> {
        self.resolve_parameter(name, stack).map_err(|err| match err {
            ContainerError::ParameterNotFound {
                name,
                referenced_by: None,
            } => ContainerError::ParameterNotFound {
                name,
                referenced_by: Some(owner.to_string()),
            },
            other => other,
        })
    }
}

fn is_parameter_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

fn whole_placeholder(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('%')?.strip_suffix('%')?;
    if is_parameter_name(inner) && !inner.contains('%') {
        Some(inner)
    } else {
        None
    }
}

fn scalar_to_string(name: &str, value: &Value) -> Result<String, ContainerError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(if *b { "1".to_string() } else { String::new() }),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ContainerError::NonScalarParameter {
            name: name.to_string(),
        }),
    }
}
