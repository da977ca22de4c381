//! Submit control busy state and draft validation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("please fill in the required fields: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("a submission is already in progress")]
    Busy,
    #[error("failed to save: {0}")]
    Write(#[from] SourceError),
}

/// The control that triggers a write. Clones share the same busy flag so the
/// UI side can observe it while the view task owns the write.
#[derive(Debug, Clone, Default)]
pub struct SubmitControl {
    busy: Arc<AtomicBool>,
}

impl SubmitControl {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_busy()
    }

    /// Disable the control for the lifetime of the returned guard.
    pub fn acquire(&self) -> Result<BusyGuard, SubmitError> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SubmitError::Busy)?;
        Ok(BusyGuard {
            busy: self.busy.clone(),
        })
    }
}

/// Re-enables the control when dropped, whatever the write outcome was.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Check that every required field holds non-blank text.
pub fn validate(draft: &Map<String, Value>, required: &[String]) -> Result<(), SubmitError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| match draft.get(field.as_str()) {
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Null) | None => true,
            Some(_) => false,
        })
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SubmitError::Validation(missing))
    }
}
