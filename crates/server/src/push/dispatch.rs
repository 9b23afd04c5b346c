use std::sync::Arc;

use crate::models::Message;
use crate::registry::ConnectionRegistry;

use super::events::PushEvent;

/// Best-effort live delivery of a freshly persisted message to its
/// recipient. Runs off the request path; the sender's response never waits
/// on it and never learns whether it landed.
pub fn dispatch_created(registry: Arc<ConnectionRegistry>, message: Message) {
    let recipient = message.to_user.clone();
    spawn_publish(registry, recipient, PushEvent::MessageCreated { message });
}

/// Push a redacted record to the other participant so a connected client
/// can replace its copy in place.
pub fn dispatch_updated(registry: Arc<ConnectionRegistry>, message: Message) {
    let recipient = message.to_user.clone();
    spawn_publish(registry, recipient, PushEvent::MessageUpdated { message });
}

fn spawn_publish(registry: Arc<ConnectionRegistry>, recipient: String, event: PushEvent) {
    tokio::spawn(async move {
        if !registry.publish(&recipient, &event).await {
            tracing::debug!(user_id = %recipient, "no live channel, push dropped");
        }
    });
}
