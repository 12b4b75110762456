use std::fmt;
use thiserror::Error;

/// Collects failure messages so that a sequence of checks can run to the
/// end before reporting. Conformance tests use this to report every broken
/// invariant of a state at once.
#[derive(Debug, Clone, Default)]
pub struct ErrAccumulator {
    errs: Vec<String>,
}

/// All messages gathered by an [`ErrAccumulator`], in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join(";\n"))]
pub struct AccumulatedErrors(pub Vec<String>);

impl ErrAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, err: impl fmt::Display) {
        self.errs.push(err.to_string());
    }

    /// Record `msg` if `predicate` is false
    pub fn require(&mut self, predicate: bool, msg: impl fmt::Display) {
        if !predicate {
            self.add(msg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errs.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.errs
    }

    /// `Ok` when nothing was recorded
    pub fn as_result(&self) -> Result<(), AccumulatedErrors> {
        if self.errs.is_empty() {
            return Ok(());
        }
        Err(AccumulatedErrors(self.errs.clone()))
    }
}
