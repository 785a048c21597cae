//! One-time initialization of each backend

use crate::backend::Backend;
use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError, Weak};

static INITIALIZED: Mutex<Vec<Weak<dyn Backend>>> = Mutex::new(Vec::new());

fn same_backend(initialized: &Weak<dyn Backend>, backend: &Arc<dyn Backend>) -> bool {
    initialized
        .upgrade()
        .is_some_and(|known| std::ptr::addr_eq(Arc::as_ptr(&known), Arc::as_ptr(backend)))
}

/// Run `backend`'s process-wide setup unless it already succeeded.
///
/// Each live backend instance is set up once. A failed attempt is not
/// recorded, so the next model creation retries.
pub fn initialize(backend: &Arc<dyn Backend>) -> Result<()> {
    let mut initialized = INITIALIZED.lock().unwrap_or_else(PoisonError::into_inner);
    initialized.retain(|known| known.strong_count() > 0);
    if initialized.iter().any(|known| same_backend(known, backend)) {
        return Ok(());
    }

    backend.initialize()?;
    initialized.push(Arc::downgrade(backend));
    log::debug!("initialized translation backend '{}'", backend.name());
    Ok(())
}

/// Whether `backend` has completed initialization
pub fn is_initialized(backend: &Arc<dyn Backend>) -> bool {
    INITIALIZED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .any(|known| same_backend(known, backend))
}
