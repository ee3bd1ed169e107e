//! Records a finished plain-text exchange in the conversation store.

use tfpilot_core::message::Role;
use tfpilot_core::store::ConversationStore;
use tracing::{debug, warn};

/// Append the user turn, then the assistant turn.
///
/// Failures are logged and swallowed; a reply the user already has must not
/// turn into an error because history could not be saved.
pub async fn record_exchange(
    store: Option<&dyn ConversationStore>,
    workspace_key: &str,
    user_message: &str,
    reply: &str,
) {
    let Some(store) = store else {
        return;
    };

    for (role, content) in [(Role::User, user_message), (Role::Assistant, reply)] {
        if let Err(e) = store.append(workspace_key, role, content).await {
            warn!(store = store.name(), role = %role, error = %e, "Failed to persist conversation turn");
        }
    }
    debug!(workspace = %workspace_key, "Exchange recorded");
}
