mod exchange;
pub use exchange::*;

use std::sync::Arc;

use crate::scheduler::Scheduler;
use crate::storage::Storage;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(storage: Storage, scheduler: Arc<Scheduler>) -> Self {
        Self { storage, scheduler }
    }
}
