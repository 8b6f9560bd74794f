//! dispatch::params
//!
//! Declared required-parameter sets.
//!
//! Every operation and every constructor declares the argument names it
//! cannot run without. Optional parameters are simply not listed.

use std::collections::BTreeSet;

/// Names an operation requires (parameters with no default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSet {
    names: &'static [&'static str],
}

impl ParameterSet {
    /// No required parameters.
    pub const EMPTY: ParameterSet = ParameterSet::new(&[]);

    /// Create a parameter set.
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// The required names, in declaration order.
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// True when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check if every required name is supplied.
    pub fn satisfied_by(&self, supplied: &BTreeSet<&str>) -> bool {
        self.names.iter().all(|name| supplied.contains(name))
    }

    /// Required names absent from `supplied`, sorted and deduplicated.
    pub fn missing(&self, supplied: &BTreeSet<&str>) -> Vec<&'static str> {
        self.names
            .iter()
            .copied()
            .filter(|name| !supplied.contains(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::EMPTY
    }
}
