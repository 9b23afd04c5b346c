use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream, StreamExt};
use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;

use crate::models::AuthUser;
use crate::registry::{ChannelId, ConnectionRegistry};
use crate::AppState;

/// GET /api/messages/stream
///
/// Long-lived SSE push channel, one per user. Registering evicts any
/// previous channel for the same user; the evicted stream ends when its
/// sender is dropped.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let channel_id = state.registry.register(&user.id, tx).await;
    tracing::info!(user_id = %user.id, channel_id, "push channel opened");

    let events = EventStream {
        rx,
        _guard: ChannelGuard {
            registry: Arc::clone(&state.registry),
            user_id: user.id,
            channel_id,
        },
    };

    // Initial comment frame lets clients confirm liveness before any event.
    let greeting = stream::once(async { Ok(Event::default().comment("connected")) });

    Sse::new(greeting.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(state.config.keepalive_secs))
            .text("keep-alive"),
    )
}

struct EventStream {
    rx: mpsc::UnboundedReceiver<String>,
    _guard: ChannelGuard,
}

impl Stream for EventStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .rx
            .poll_recv(cx)
            .map(|frame| frame.map(|payload| Ok(Event::default().data(payload))))
    }
}

/// Unregisters the channel when the stream is dropped (client disconnect,
/// transport error, or eviction by a newer registration). Guarded by the
/// channel id, so a late teardown never removes a newer channel.
struct ChannelGuard {
    registry: Arc<ConnectionRegistry>,
    user_id: String,
    channel_id: ChannelId,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        let registry = Arc::clone(&self.registry);
        let user_id = std::mem::take(&mut self.user_id);
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            if registry.unregister(&user_id, channel_id).await {
                tracing::info!(user_id = %user_id, channel_id, "push channel closed");
            }
        });
    }
}
