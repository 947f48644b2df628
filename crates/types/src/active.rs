//! Matching of pending wait-events against definition handlers.

use crate::definition::HandlerNode;
use crate::instance::WorkflowInstance;

/// Returns the handlers the instance is currently waiting on.
///
/// For every thread, for every pending wait-event, every handler with the same
/// name is pushed. Two threads waiting on the same event therefore yield the
/// handler twice.
pub fn active_handlers<'a>(instance: &WorkflowInstance, handlers: &[&'a HandlerNode]) -> Vec<&'a HandlerNode> {
    let mut active = Vec::new();
    for thread in instance.meta.threads() {
        for event_name in thread.waiting_on() {
            active.extend(handlers.iter().copied().filter(|handler| handler.name == event_name));
        }
    }
    active
}
