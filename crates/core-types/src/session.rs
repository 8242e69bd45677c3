use parking_lot::RwLock;

/// Process-wide holder for the reasoning conversation token.
///
/// At most one non-empty token is held at a time. It is only replaced after an
/// explicit [`SessionStore::clear`].
#[derive(Debug, Default)]
pub struct SessionStore {
    token: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Adopt `token` if no session is held yet. Returns whether it was adopted.
    pub fn adopt(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let mut guard = self.token.write();
        if guard.is_some() {
            return false;
        }
        *guard = Some(token.to_string());
        true
    }

    pub fn clear(&self) {
        self.token.write().take();
    }
}
