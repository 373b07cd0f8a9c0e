//! The per-channel message actor.
//!
//! A messenger starts inactive. The first [`Messenger::join`] simulates a
//! backlog fetch, allocates the store, fills it with a generated backlog and
//! spawns the event loop. From then on every write funnels through that one
//! loop: caller commands arrive on a queue, and timers inject synthetic
//! messages and edits. The loop applies each change to the store and tells
//! the observer before it looks at the next one, so observers see writes in
//! store order. Reads (`raw_content`, `editable`, completion) take the
//! store mutex directly so they stay synchronous for the caller.
//!
//! ```text
//!  send / edit / action ──► command queue ──┐
//!                                           ├──► event loop ──► MessagesContainer
//!  new-message / edit / delete timers ──────┘         │
//!                                                     └──► TypingSubscriber
//! ```
//!
//! Stopping the loop (through the handle `join` returns) is final.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mockchat_net::Network;
use mockchat_types::{Author, Header, Message, Typer, parse_id};

use crate::author::{AuthorStreak, SAME_AUTHOR_LIMIT};
use crate::capability::{Capabilities, Capability};
use crate::container::{MessagesContainer, TypingContainer};
use crate::error::ChannelError;
use crate::store::MessageStore;
use crate::typing::{StopHandle, TYPING_EVERY, TypingSubscriber};

/// Number of messages generated on first join.
pub const FETCH_BACKLOG: usize = 35;

#[derive(Debug, Clone)]
pub struct MessengerConfig {
    /// Backlog size B; the store keeps at most `2 * B` messages.
    pub backlog: usize,
    pub same_author_limit: u8,
    pub new_message_every: Duration,
    pub edit_message_every: Duration,
    /// Synthetic deletions; off unless set.
    pub delete_message_every: Option<Duration>,
    pub typing_every: Duration,
    /// Depth of the caller command queue.
    pub queue_depth: usize,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            backlog: FETCH_BACKLOG,
            same_author_limit: SAME_AUTHOR_LIMIT,
            new_message_every: Duration::from_secs(4),
            edit_message_every: Duration::from_secs(10),
            delete_message_every: None,
            typing_every: TYPING_EVERY,
            queue_depth: 16,
        }
    }
}

/// Commands callers push into the event loop.
#[derive(Debug)]
pub(crate) enum Command {
    Send {
        content: String,
        nonce: Option<String>,
    },
    Edit {
        id: u32,
        content: String,
        done: oneshot::Sender<Result<(), ChannelError>>,
    },
    Delete(Header),
    /// Stamped when the caller asked, not when a subscriber drains it.
    Typing(Typer),
}

#[derive(Clone)]
pub struct Messenger {
    inner: Arc<MessengerInner>,
}

struct MessengerInner {
    channel_id: u32,
    user: Author,
    network: Network,
    config: MessengerConfig,
    capabilities: Capabilities,
    next_id: AtomicU32,
    active: OnceLock<Arc<Active>>,
}

/// State that exists once the channel has been joined.
pub(crate) struct Active {
    store: Mutex<MessageStore>,
    commands: mpsc::Sender<Command>,
    typing: TypingSubscriber,
    stop: CancellationToken,
}

impl Active {
    pub(crate) fn lock_store(&self) -> MutexGuard<'_, MessageStore> {
        // Store mutations never panic halfway, so a poisoned guard is still consistent.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim a queue slot on a loop that has not been stopped.
    pub(crate) async fn reserve(&self) -> Result<mpsc::Permit<'_, Command>, ChannelError> {
        if self.stop.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        let permit = self
            .commands
            .reserve()
            .await
            .map_err(|_| ChannelError::Closed)?;
        if self.stop.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        Ok(permit)
    }

    pub(crate) async fn push(&self, cmd: Command) -> Result<(), ChannelError> {
        self.reserve().await?.send(cmd);
        Ok(())
    }
}

impl Messenger {
    pub fn new(
        channel_id: u32,
        user: Author,
        network: Network,
        config: MessengerConfig,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            inner: Arc::new(MessengerInner {
                channel_id,
                user,
                network,
                config,
                capabilities,
                next_id: AtomicU32::new(0),
                active: OnceLock::new(),
            }),
        }
    }

    pub fn channel_id(&self) -> u32 {
        self.inner.channel_id
    }

    pub fn user(&self) -> &Author {
        &self.inner.user
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    pub(crate) fn network(&self) -> &Network {
        &self.inner.network
    }

    /// True between the first successful join and the loop stopping.
    pub fn is_active(&self) -> bool {
        self.inner
            .active
            .get()
            .is_some_and(|a| !a.stop.is_cancelled())
    }

    pub fn is_stopped(&self) -> bool {
        self.inner
            .active
            .get()
            .is_some_and(|a| a.stop.is_cancelled())
    }

    /// Number of messages currently held; zero before the first join.
    pub fn len(&self) -> usize {
        self.inner
            .active
            .get()
            .map_or(0, |a| a.lock_store().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current backlog, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner
            .active
            .get()
            .map(|a| a.lock_store().snapshot())
            .unwrap_or_default()
    }

    pub(crate) fn active(&self) -> Result<&Arc<Active>, ChannelError> {
        match self.inner.active.get() {
            None => Err(ChannelError::Inactive),
            Some(a) if a.stop.is_cancelled() => Err(ChannelError::Closed),
            Some(a) => Ok(a),
        }
    }

    pub(crate) fn require(&self, cap: Capability) -> Result<(), ChannelError> {
        if self.inner.capabilities.has(cap) {
            Ok(())
        } else {
            Err(ChannelError::Unsupported(cap))
        }
    }

    fn next_id(&self) -> u32 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Join the channel.
    ///
    /// On a fresh channel this waits on the simulated network (cancellable
    /// through `cancel`), generates the backlog, reports every backlog message
    /// to `container` and starts the event loop, which then reports live
    /// traffic to the same container. `cancel` only covers that first fetch;
    /// the loop runs until the returned handle is stopped.
    ///
    /// Joining an already active channel replays the current backlog to
    /// `container` and returns a handle to the running loop.
    pub async fn join(
        &self,
        cancel: &CancellationToken,
        container: Arc<dyn MessagesContainer>,
    ) -> Result<StopHandle, ChannelError> {
        if let Some(active) = self.inner.active.get() {
            return self.replay(active, container.as_ref());
        }

        self.inner
            .network
            .simulate_with(cancel)
            .await
            .map_err(ChannelError::network("failed to fetch messages"))?;

        let mut generator = Generator::new(self.clone());
        let (commands, queue) = mpsc::channel(self.inner.config.queue_depth.max(1));
        let mut backlog = None;

        let active = self.inner.active.get_or_init(|| {
            let stop = CancellationToken::new();
            let mut store = MessageStore::new(self.inner.config.backlog);
            let mut created = Vec::with_capacity(self.inner.config.backlog);
            for _ in 0..self.inner.config.backlog {
                let msg = generator.next_message(&store);
                store.append(msg.clone());
                created.push(msg);
            }
            backlog = Some(created);

            Arc::new(Active {
                store: Mutex::new(store),
                commands,
                typing: TypingSubscriber::new(
                    self.inner.channel_id,
                    self.inner.config.typing_every,
                    stop.child_token(),
                ),
                stop,
            })
        });

        // Someone else finished activating while we waited on the network.
        let Some(backlog) = backlog else {
            return self.replay(active, container.as_ref());
        };

        for msg in backlog {
            container.create_message(msg);
        }

        info!(
            channel_id = self.inner.channel_id,
            backlog = self.inner.config.backlog,
            "channel joined"
        );

        let event_loop = EventLoop {
            generator,
            active: active.clone(),
            container,
            queue,
        };
        tokio::spawn(event_loop.run());

        Ok(StopHandle::new(active.stop.clone()))
    }

    fn replay(
        &self,
        active: &Arc<Active>,
        container: &dyn MessagesContainer,
    ) -> Result<StopHandle, ChannelError> {
        if active.stop.is_cancelled() {
            return Err(ChannelError::Closed);
        }

        let backlog = active.lock_store().snapshot();
        debug!(
            channel_id = self.inner.channel_id,
            messages = backlog.len(),
            "replaying backlog"
        );
        for msg in backlog {
            container.create_message(msg);
        }

        Ok(StopHandle::new(active.stop.clone()))
    }

    /// Send a message as the local user.
    ///
    /// Returns once the simulated call succeeded and the message is queued;
    /// it shows up in the store and at the observer shortly after.
    pub async fn send(&self, content: &str, nonce: Option<String>) -> Result<(), ChannelError> {
        self.require(Capability::Send)?;
        let active = self.active()?;

        self.inner
            .network
            .simulate()
            .await
            .map_err(ChannelError::network("failed to send message"))?;

        active
            .push(Command::Send {
                content: content.to_string(),
                nonce,
            })
            .await
    }

    /// Replace a message's content.
    ///
    /// The event loop applies the edit and notifies the observer before this
    /// returns. If the channel stops first the store is left untouched and
    /// the result is [`ChannelError::Closed`].
    pub async fn edit_message(&self, id: &str, content: &str) -> Result<(), ChannelError> {
        self.require(Capability::Edit)?;
        let id = parse_id(id).map_err(|_| ChannelError::invalid_id(id))?;
        let active = self.active()?;

        self.inner
            .network
            .simulate()
            .await
            .map_err(ChannelError::network("failed to edit message"))?;

        let (done, applied) = oneshot::channel();
        active
            .push(Command::Edit {
                id,
                content: content.to_string(),
                done,
            })
            .await?;

        // Dropped unanswered when the loop stops with the edit still queued.
        applied.await.map_err(|_| ChannelError::Closed)?
    }

    /// Whether the local user wrote this message. Malformed or unknown ids
    /// are simply not editable.
    pub fn editable(&self, id: &str) -> bool {
        if !self.inner.capabilities.has(Capability::Edit) {
            return false;
        }
        let (Ok(id), Some(active)) = (parse_id(id), self.inner.active.get()) else {
            return false;
        };

        active
            .lock_store()
            .get(id)
            .is_some_and(|m| m.author_name() == self.inner.user.id())
    }

    pub fn raw_content(&self, id: &str) -> Result<String, ChannelError> {
        let id = parse_id(id).map_err(|_| ChannelError::invalid_id(id))?;
        let active = self.inner.active.get().ok_or(ChannelError::NotFound(id))?;

        active
            .lock_store()
            .get(id)
            .map(|m| m.content.clone())
            .ok_or(ChannelError::NotFound(id))
    }

    /// Start receiving typers for this channel.
    pub fn subscribe_typing(
        &self,
        listener: Arc<dyn TypingContainer>,
    ) -> Result<StopHandle, ChannelError> {
        self.require(Capability::Typing)?;
        Ok(self.active()?.typing.subscribe(listener))
    }

    /// Tell the channel the local user is typing, after a simulated call.
    pub async fn typing(&self) -> Result<(), ChannelError> {
        self.require(Capability::Typing)?;
        let active = self.active()?;

        self.inner
            .network
            .simulate()
            .await
            .map_err(ChannelError::network("failed to send typing"))?;

        active
            .push(Command::Typing(Typer::new(self.inner.user.clone())))
            .await
    }
}

/// Produces synthetic messages with fresh ids.
struct Generator {
    messenger: Messenger,
    streak: AuthorStreak,
    rng: StdRng,
}

impl Generator {
    fn new(messenger: Messenger) -> Self {
        let streak = AuthorStreak::new(messenger.inner.config.same_author_limit);
        Self {
            messenger,
            streak,
            rng: StdRng::from_os_rng(),
        }
    }

    fn next_message(&mut self, store: &MessageStore) -> Message {
        let id = self.messenger.next_id();
        self.streak
            .message(&mut self.rng, id, store.last(), &self.messenger.inner.user)
    }
}

struct EventLoop {
    generator: Generator,
    active: Arc<Active>,
    container: Arc<dyn MessagesContainer>,
    queue: mpsc::Receiver<Command>,
}

/// First tick one full period from now, like a plain ticker.
fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn maybe_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl EventLoop {
    async fn run(mut self) {
        let config = &self.generator.messenger.inner.config;
        let channel_id = self.generator.messenger.inner.channel_id;

        let mut new_tick = ticker(config.new_message_every);
        let mut edit_tick = ticker(config.edit_message_every);
        let mut delete_tick = config.delete_message_every.map(ticker);
        let stop = self.active.stop.clone();

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                cmd = self.queue.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = new_tick.tick() => self.synthesize(),
                _ = edit_tick.tick() => self.edit_random(),
                _ = maybe_tick(&mut delete_tick) => self.delete_random(),
            }
        }

        info!(channel_id, "channel left");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Send { content, nonce } => {
                let id = self.generator.messenger.next_id();
                let user = self.generator.messenger.inner.user.clone();
                self.append(Message::echo(id, user, content, nonce));
            }
            Command::Edit { id, content, done } => {
                // The caller may have given up waiting; the edit stands either way.
                let _ = done.send(self.edit(id, &content));
            }
            Command::Delete(header) => self.delete(header),
            Command::Typing(typer) => {
                if !self.active.typing.try_trigger(typer) {
                    warn!(
                        channel_id = self.generator.messenger.inner.channel_id,
                        "typing event dropped, nobody is listening"
                    );
                }
            }
        }
    }

    fn append(&mut self, msg: Message) {
        let evicted = self.active.lock_store().append(msg.clone());
        debug!(message_id = msg.id(), evicted = evicted.len(), "message created");
        self.container.create_message(msg);
    }

    fn edit(&mut self, id: u32, content: &str) -> Result<(), ChannelError> {
        let edited = {
            let mut store = self.active.lock_store();
            let mut msg = store.get(id).cloned().ok_or(ChannelError::NotFound(id))?;
            msg.set_content(content);
            store.update(msg.clone());
            msg
        };
        debug!(message_id = id, "message edited");
        self.container.update_message(edited);
        Ok(())
    }

    fn synthesize(&mut self) {
        let msg = {
            let mut store = self.active.lock_store();
            let msg = self.generator.next_message(&store);
            store.append(msg.clone());
            msg
        };
        debug!(message_id = msg.id(), author = msg.author_name(), "synthetic message");
        self.container.create_message(msg);
    }

    fn edit_random(&mut self) {
        let edited = {
            let mut store = self.active.lock_store();
            let Some(old) = store.random_recent(&mut self.generator.rng) else {
                warn!("nothing to edit, store is empty");
                return;
            };
            let edited = old.regenerate(&mut self.generator.rng);
            store.update(edited.clone());
            edited
        };
        debug!(message_id = edited.id(), "synthetic edit");
        self.container.update_message(edited);
    }

    fn delete_random(&mut self) {
        let header = {
            let store = self.active.lock_store();
            match store.random_recent(&mut self.generator.rng) {
                Some(old) => Header::now(old.id()),
                None => return,
            }
        };
        self.delete(header);
    }

    fn delete(&mut self, header: Header) {
        let removed = self.active.lock_store().remove(header.id).is_some();
        if removed {
            debug!(message_id = header.id, "message deleted");
            self.container.delete_message(header);
        }
    }
}
