use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use mockchat_types::{Author, Typer};

use crate::container::TypingContainer;

/// Default period between synthetic typers.
pub const TYPING_EVERY: Duration = Duration::from_secs(8);

/// Returned by every `subscribe`/`join`; stops whatever was started.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Fans "someone is typing" events out to a single listener.
///
/// Triggers go through a one-slot queue: [`trigger_typing`] waits while the
/// slot is taken, which in practice means until a subscriber drains it. At
/// most one subscription receives events at a time; a second one waits for
/// the first to stop. A typer that sat in the queue past its display
/// lifetime is dropped instead of delivered.
///
/// [`trigger_typing`]: TypingSubscriber::trigger_typing
#[derive(Clone)]
pub struct TypingSubscriber {
    inner: Arc<TypingInner>,
}

struct TypingInner {
    channel_id: u32,
    every: Duration,
    shutdown: CancellationToken,
    incoming_tx: mpsc::Sender<Typer>,
    incoming_rx: Mutex<mpsc::Receiver<Typer>>,
}

impl TypingSubscriber {
    /// `shutdown` stops every subscription when the owning channel goes away.
    pub fn new(channel_id: u32, every: Duration, shutdown: CancellationToken) -> Self {
        let (incoming_tx, incoming_rx) = mpsc::channel(1);
        Self {
            inner: Arc::new(TypingInner {
                channel_id,
                every,
                shutdown,
                incoming_tx,
                incoming_rx: Mutex::new(incoming_rx),
            }),
        }
    }

    /// Report `author` as typing now. Waits while the queue slot is taken.
    pub async fn trigger_typing(&self, author: Author) {
        // The receiver lives as long as `inner`, so this only fails during teardown.
        let _ = self.inner.incoming_tx.send(Typer::new(author)).await;
    }

    /// Non-blocking variant used by the channel's event loop. Returns false
    /// when the event had to be dropped because nobody is draining the queue.
    pub fn try_trigger(&self, typer: Typer) -> bool {
        self.inner.incoming_tx.try_send(typer).is_ok()
    }

    /// Start delivering typers to `listener`: a random one every period plus
    /// every triggered one that is still fresh.
    pub fn subscribe(&self, listener: Arc<dyn TypingContainer>) -> StopHandle {
        let stop = self.inner.shutdown.child_token();
        let inner = self.inner.clone();
        let token = stop.clone();

        tokio::spawn(async move {
            let mut incoming = tokio::select! {
                guard = inner.incoming_rx.lock() => guard,
                _ = token.cancelled() => return,
            };

            let mut ticker = tokio::time::interval_at(Instant::now() + inner.every, inner.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(channel_id = inner.channel_id, "typing subscription started");

            loop {
                let typer = tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => random_typer(),
                    typer = incoming.recv() => match typer {
                        Some(typer) if typer.is_stale() => {
                            trace!(
                                channel_id = inner.channel_id,
                                author = typer.author.id(),
                                "stale typer dropped"
                            );
                            continue;
                        }
                        Some(typer) => typer,
                        None => break,
                    },
                };

                trace!(channel_id = inner.channel_id, author = typer.author.id(), "typer");
                listener.add_typer(typer);
            }

            debug!(channel_id = inner.channel_id, "typing subscription stopped");
        });

        StopHandle::new(stop)
    }
}

fn random_typer() -> Typer {
    Typer::random(&mut rand::rng())
}
