//! Named feature vectors

use serde::{Deserialize, Serialize};
use stylevec_core::stats::finite_or;
use stylevec_core::{Error, Result, Vector};

/// Ordered feature values with one name per value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
    names: Vec<String>,
}

impl FeatureVector {
    /// Pair values with names. Fails when the lengths differ.
    pub fn new(values: Vec<f64>, names: Vec<String>) -> Result<Self> {
        if values.len() != names.len() {
            return Err(Error::InvalidDimension {
                expected: names.len(),
                actual: values.len(),
            });
        }
        let values = values.into_iter().map(|v| finite_or(v, 0.0)).collect();
        Ok(Self { values, names })
    }

    /// Build from a fixed name table and its values
    pub fn from_named(names: &[&str], values: &[f64]) -> Result<Self> {
        Self::new(
            values.to_vec(),
            names.iter().map(|n| n.to_string()).collect(),
        )
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Append one feature; non-finite values become 0
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(finite_or(value, 0.0));
    }

    pub fn extend(&mut self, other: FeatureVector) {
        self.values.extend(other.values);
        self.names.extend(other.names);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn to_vector(&self) -> Vector {
        Vector::from_f64(&self.values)
    }
}
