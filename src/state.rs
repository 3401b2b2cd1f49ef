use crate::store::StateStore;
use crate::vote::VoteTracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub tracker: Arc<dyn VoteTracker>,
    pub admin_password: Arc<str>,
}

impl AppState {
    pub fn new(store: StateStore, tracker: Arc<dyn VoteTracker>, admin_password: &str) -> Self {
        Self {
            store: Arc::new(store),
            tracker,
            admin_password: Arc::from(admin_password),
        }
    }
}
