//! Named parameters and sub-algorithm references handed to each algorithm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, NugenError};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
    /// String value.
    Str(String),
}

/// Parameters and sub-algorithm handles for one algorithm instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlgConfig {
    /// Named parameters.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    /// Sub-algorithms keyed by role, naming catalogue entries.
    #[serde(default)]
    pub sub_algorithms: BTreeMap<String, String>,
}

impl AlgConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style parameter setter.
    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Builder-style sub-algorithm setter.
    pub fn with_sub_algorithm(mut self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.sub_algorithms.insert(role.into(), name.into());
        self
    }

    /// Floating point parameter or `default`. Integers are widened.
    pub fn get_f64(&self, name: &str, default: f64) -> f64 {
        match self.params.get(name) {
            Some(ParamValue::Double(v)) => *v,
            Some(ParamValue::Int(v)) => *v as f64,
            _ => default,
        }
    }

    /// Integer parameter or `default`.
    pub fn get_i64(&self, name: &str, default: i64) -> i64 {
        match self.params.get(name) {
            Some(ParamValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// Boolean parameter or `default`.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.params.get(name) {
            Some(ParamValue::Bool(v)) => *v,
            _ => default,
        }
    }

    /// String parameter or `default`.
    pub fn get_str<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.params.get(name) {
            Some(ParamValue::Str(v)) => v.as_str(),
            _ => default,
        }
    }

    /// Floating point parameter that must be present.
    pub fn require_f64(&self, name: &str) -> Result<f64, NugenError> {
        match self.params.get(name) {
            Some(ParamValue::Double(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            other => Err(missing_param(name, "double", other)),
        }
    }

    /// Integer parameter that must be present.
    pub fn require_i64(&self, name: &str) -> Result<i64, NugenError> {
        match self.params.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            other => Err(missing_param(name, "int", other)),
        }
    }

    /// String parameter that must be present.
    pub fn require_str(&self, name: &str) -> Result<&str, NugenError> {
        match self.params.get(name) {
            Some(ParamValue::Str(v)) => Ok(v.as_str()),
            other => Err(missing_param(name, "string", other)),
        }
    }

    /// Catalogue name of the sub-algorithm filling `role`.
    pub fn sub_algorithm(&self, role: &str) -> Result<&str, NugenError> {
        self.sub_algorithms
            .get(role)
            .map(String::as_str)
            .ok_or_else(|| {
                NugenError::Config(
                    ErrorInfo::new("missing-sub-algorithm", "required sub-algorithm is not configured")
                        .with_context("role", role),
                )
            })
    }
}

fn missing_param(name: &str, expected: &str, found: Option<&ParamValue>) -> NugenError {
    let info = ErrorInfo::new("missing-parameter", "required parameter is missing or mistyped")
        .with_context("name", name)
        .with_context("expected", expected);
    let info = match found {
        Some(value) => info.with_context("found", format!("{value:?}")),
        None => info,
    };
    NugenError::Config(info)
}
