//! # Parameter Resolution
//!
//! Every node in a tree carries three parameter tiers:
//!
//! ```text
//!   own        : passed explicitly when the node was built
//!   inherited  : the parent's child map (its inherited + own, minus specials)
//!   defaults   : static, per node type
//! ```
//!
//! Lookup walks the tiers in that order. When the value found is a JSON
//! object, its missing keys are back-filled from the same key in the
//! remaining tiers, so a cell can set `text_padding: { left: 4 }` and still
//! get the default `top`, `bottom` and `right`.
//!
//! Each node type declares its tiers through a [`ParamSpec`]: default
//! values, required names (checked on every update) and special names
//! (never handed down to children).

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Result, TrellisError};

/// A flat parameter mapping, as passed to builders.
pub type ParamMap = Map<String, Value>;

/// Names every node type treats as special.
const BASE_SPECIAL: &[&str] = &["id", "class", "border", "borders"];

/// Static per-type parameter declarations.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Node type label, also the default CSS-like `class`.
    pub kind: &'static str,
    defaults: ParamMap,
    required: Vec<&'static str>,
    special: HashSet<&'static str>,
}

impl ParamSpec {
    /// Start a spec with the defaults shared by every node type.
    pub fn new(kind: &'static str) -> Self {
        let mut defaults = Map::new();
        defaults.insert("id".into(), Value::Null);
        defaults.insert("class".into(), Value::String(kind.to_string()));
        defaults.insert("width".into(), Value::Null);
        defaults.insert("height".into(), Value::Null);
        defaults.insert("border".into(), Value::Null);
        defaults.insert("borders".into(), Value::Null);
        defaults.insert("border_style".into(), Value::Null);

        Self {
            kind,
            defaults,
            required: Vec::new(),
            special: BASE_SPECIAL.iter().copied().collect(),
        }
    }

    /// Add (or replace) default values.
    pub fn defaults(mut self, values: Value) -> Self {
        if let Value::Object(map) = values {
            self.defaults.extend(map);
        }
        self
    }

    /// Declare parameters that must resolve to a value.
    pub fn requires(mut self, names: &[&'static str]) -> Self {
        self.required.extend_from_slice(names);
        self
    }

    /// Declare parameters that stay with this node. A special name is also
    /// made a valid lookup key (null default) unless it already has one.
    pub fn special(mut self, names: &[&'static str]) -> Self {
        for name in names {
            self.defaults.entry(*name).or_insert(Value::Null);
            self.special.insert(*name);
        }
        self
    }

    pub fn is_special(&self, name: &str) -> bool {
        self.special.contains(name)
    }

    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.defaults.get(name)
    }
}

/// Only `null` and `false` are falsy; `0` and `""` are values.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// The resolved parameter context of one node.
#[derive(Debug, Clone)]
pub struct Params {
    spec: &'static ParamSpec,
    own: ParamMap,
    inherited: ParamMap,
    child: ParamMap,
}

impl Params {
    /// Bind `own` parameters to a spec. Fails when a required name is absent.
    pub fn new(spec: &'static ParamSpec, own: ParamMap) -> Result<Self> {
        let mut params = Self {
            spec,
            own: Map::new(),
            inherited: Map::new(),
            child: Map::new(),
        };
        params.update(own)?;
        Ok(params)
    }

    /// Bind `own` parameters together with a parent's child map, checking
    /// required names against both.
    pub fn with_inherited(
        spec: &'static ParamSpec,
        own: ParamMap,
        inherited: &ParamMap,
    ) -> Result<Self> {
        let mut params = Self {
            spec,
            own,
            inherited: inherited.clone(),
            child: Map::new(),
        };
        params.rebind()?;
        Ok(params)
    }

    pub fn spec(&self) -> &'static ParamSpec {
        self.spec
    }

    pub fn kind(&self) -> &'static str {
        self.spec.kind
    }

    /// Merge new own values in and rebuild the child map.
    pub fn update(&mut self, own: ParamMap) -> Result<()> {
        self.own.extend(own);
        self.rebind()
    }

    /// Merge values received from a parent into the inherited tier.
    pub fn inherit(&mut self, inherited: &ParamMap) -> Result<()> {
        self.inherited
            .extend(inherited.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.rebind()
    }

    fn rebind(&mut self) -> Result<()> {
        // Defaults never reach the child map.
        let mut child = self.inherited.clone();
        child.extend(self.own.iter().map(|(k, v)| (k.clone(), v.clone())));
        child.retain(|name, _| !self.spec.is_special(name));
        self.child = child;

        for name in &self.spec.required {
            if !self.has_value(name) {
                return Err(TrellisError::MissingParameter {
                    element: self.spec.kind,
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The map handed to children as their inherited tier.
    pub fn child_params(&self) -> &ParamMap {
        &self.child
    }

    fn tiers(&self) -> [&ParamMap; 3] {
        [&self.own, &self.inherited, &self.spec.defaults]
    }

    /// Three-tier lookup. Object values are back-filled key by key from
    /// the lower tiers without overwriting what is already present.
    pub fn get(&self, name: &str) -> Result<Value> {
        let tiers = self.tiers();
        let found = tiers
            .iter()
            .find_map(|tier| tier.get(name))
            .ok_or_else(|| TrellisError::ParameterNotFound(name.to_string()))?;

        match found {
            Value::Object(map) => {
                let mut merged = map.clone();
                for tier in tiers.iter() {
                    if let Some(Value::Object(lower)) = tier.get(name) {
                        for (k, v) in lower {
                            merged.entry(k.clone()).or_insert_with(|| v.clone());
                        }
                    }
                }
                Ok(Value::Object(merged))
            }
            other => Ok(other.clone()),
        }
    }

    /// Lookup that never fails: a missing or falsy value yields `fallback`.
    pub fn get_or(&self, name: &str, fallback: Value) -> Value {
        match self.get(name) {
            Ok(v) if truthy(&v) => v,
            _ => fallback,
        }
    }

    /// False when the key is absent from every tier or its value is falsy.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).map(|v| truthy(&v)).unwrap_or(false)
    }

    /// A boolean flag.
    pub fn flag(&self, name: &str) -> bool {
        self.has_value(name)
    }

    /// A number that may be unset (`null`/`false` count as unset).
    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>> {
        let value = self.get(name)?;
        if !truthy(&value) {
            return Ok(None);
        }
        as_f64(name, &value).map(Some)
    }

    /// A number that must be set.
    pub fn f64(&self, name: &str) -> Result<f64> {
        self.opt_f64(name)?.ok_or_else(|| TrellisError::InvalidParameter {
            name: name.to_string(),
            expected: "a number",
            found: "nothing".to_string(),
        })
    }

    /// A number with a fallback for unset values.
    pub fn f64_or(&self, name: &str, fallback: f64) -> Result<f64> {
        Ok(self.opt_f64(name)?.unwrap_or(fallback))
    }

    /// A non-negative integer that must be set.
    pub fn usize(&self, name: &str) -> Result<usize> {
        let value = self.get(name)?;
        value
            .as_u64()
            .map(|n| n as usize)
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as usize)
            })
            .ok_or_else(|| invalid(name, "a non-negative integer", &value))
    }

    /// A string that may be unset.
    pub fn opt_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name)? {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(invalid(name, "a string", &other)),
        }
    }

    /// A string that must be set.
    pub fn str(&self, name: &str) -> Result<String> {
        self.opt_str(name)?.ok_or_else(|| TrellisError::InvalidParameter {
            name: name.to_string(),
            expected: "a string",
            found: "nothing".to_string(),
        })
    }

    /// A list of strings; a single string counts as a one-element list.
    pub fn str_list(&self, name: &str) -> Result<Vec<String>> {
        match self.get(name)? {
            Value::Null | Value::Bool(false) => Ok(Vec::new()),
            Value::String(s) => Ok(vec![s]),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(invalid(name, "a list of strings", other)),
                })
                .collect(),
            other => Err(invalid(name, "a list of strings", &other)),
        }
    }

    /// A list of numbers that may be unset.
    pub fn opt_f64_list(&self, name: &str) -> Result<Option<Vec<f64>>> {
        match self.get(name)? {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| as_f64(name, item))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            other => Err(invalid(name, "a list of numbers", &other)),
        }
    }

    /// A structured value; unset yields an empty map.
    pub fn object(&self, name: &str) -> Result<ParamMap> {
        match self.get(name)? {
            Value::Null | Value::Bool(false) => Ok(Map::new()),
            Value::Object(map) => Ok(map),
            other => Err(invalid(name, "an object", &other)),
        }
    }
}

fn as_f64(name: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| invalid(name, "a number", value))
}

fn invalid(name: &str, expected: &'static str, found: &Value) -> TrellisError {
    TrellisError::InvalidParameter {
        name: name.to_string(),
        expected,
        found: found.to_string(),
    }
}

/// Convert a `json!({...})` literal into a [`ParamMap`]. Anything that is
/// not an object yields an empty map.
pub fn param_map(value: Value) -> ParamMap {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
