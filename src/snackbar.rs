//! Single-slot registry for the notification (snackbar) handler.
//!
//! Whichever UI component mounts the snackbar widget registers itself here;
//! everyone else calls [`SnackbarSlot::show`] without knowing who renders
//! the message. Only one handler is current at a time.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Action descriptor attached to a notification. Its shape belongs to the
/// widget, so it is carried as raw JSON.
pub type SnackbarAction = serde_json::Value;

type Handler<A> = Arc<dyn Fn(&str, &[A]) + Send + Sync>;

/// Holder for the current notification handler.
///
/// Clones share the slot. With no handler registered, notifications are
/// dropped.
pub struct SnackbarSlot<A = SnackbarAction> {
    handler: Arc<RwLock<Option<Handler<A>>>>,
}

impl<A> SnackbarSlot<A> {
    pub fn new() -> Self {
        Self {
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Install `handler`, replacing the current one. Returns `true` when a
    /// handler was replaced.
    pub fn register<F>(&self, handler: F) -> bool
    where
        F: Fn(&str, &[A]) + Send + Sync + 'static,
    {
        let previous = self
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(handler));
        debug!(replaced = previous.is_some(), "snackbar handler registered");
        previous.is_some()
    }

    /// Remove the current handler.
    pub fn unregister(&self) {
        self.handler
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_registered(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Show a plain message.
    pub fn show(&self, message: &str) -> bool {
        self.show_with_actions(message, &[])
    }

    /// Show a message with actions. Returns `false` when nobody is
    /// registered to display it.
    pub fn show_with_actions(&self, message: &str, actions: &[A]) -> bool {
        // Clone out so the handler may re-register itself
        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => {
                handler(message, actions);
                true
            }
            None => {
                debug!(message, "no snackbar handler registered; message dropped");
                false
            }
        }
    }
}

impl<A> Default for SnackbarSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for SnackbarSlot<A> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A> fmt::Debug for SnackbarSlot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnackbarSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn empty_slot_drops_messages() {
        let slot: SnackbarSlot = SnackbarSlot::new();
        assert!(!slot.is_registered());
        assert!(!slot.show("saved"));
    }

    #[test]
    fn latest_registration_wins() {
        let slot: SnackbarSlot = SnackbarSlot::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        assert!(!slot.register({
            let log = log.clone();
            move |message, _| log.lock().unwrap().push(format!("first: {message}"))
        }));
        assert!(slot.register({
            let log = log.clone();
            move |message, actions| {
                log.lock()
                    .unwrap()
                    .push(format!("second: {message} ({})", actions.len()))
            }
        }));

        let actions = [json!({"label": "Undo"})];
        assert!(slot.show_with_actions("copied", &actions));
        assert_eq!(*log.lock().unwrap(), vec!["second: copied (1)"]);
    }

    #[test]
    fn unregister_clears_slot_for_all_clones() {
        let slot: SnackbarSlot<String> = SnackbarSlot::new();
        let other = slot.clone();
        slot.register(|_, _| {});
        assert!(other.is_registered());

        other.unregister();
        assert!(!slot.show("gone"));
    }
}
