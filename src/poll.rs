//! Background feed polling.
//!
//! The [`Engine`] owns the authoritative [`AggregationState`] and is its only
//! writer.  It is a small state machine:
//!
//! * **Idle** waits until `poll_delay` has passed since the previous cycle
//!   settled, then starts a cycle.
//! * **Cycling** has one fetch per tracked source in flight.  Results are
//!   applied one at a time, in the order they settle.  When the last one has
//!   settled (successfully or not) the engine goes back to Idle.
//!
//! Fetches are futures polled by the engine task itself, so everything runs
//! on one thread and no lock is needed.  Each settled fetch is a message that
//! the engine applies to the state; nothing else touches it.
//!
//! [`addSource`](EngineHandle::add_source) requests are handled in either
//! state: the source is tracked at once and fetched outside the cycle.  Its
//! result is replied to the caller, while cycle failures are only logged.

use std::sync::Arc;
use std::thread;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::FetchError;
use crate::identity::assign_feed_id;
use crate::merge;
use crate::source::{fetch_feed, Feed, Fetch, ParsedFeed, Post, TrackedSource};
use crate::state::AggregationState;

/// What a successful initial fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub feed: Feed,
    /// Posts appended to the state by this fetch.
    pub posts: Vec<Post>,
}

/// Reply to an [`EngineHandle::add_source`] request.
pub type LoadResult = Result<Loaded, FetchError>;

/// State changes published to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SourceAdded(TrackedSource),
    FeedAdded(Feed),
    PostsAdded(Vec<Post>),
    CycleStarted { cycle: u64, sources: usize },
    CycleCompleted { cycle: u64, new_posts: usize },
}

impl EngineEvent {
    /// Replay this event onto a mirror of the engine's state.
    pub fn apply_to(self, state: &mut AggregationState) {
        match self {
            Self::SourceAdded(source) => {
                state.track(source);
            }
            Self::FeedAdded(feed) => {
                state.insert_feed(feed);
            }
            Self::PostsAdded(posts) => state.append_posts(posts),
            Self::CycleStarted { .. } | Self::CycleCompleted { .. } => {}
        }
    }
}

enum Command {
    AddSource {
        url: String,
        reply: oneshot::Sender<LoadResult>,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddSource { url, .. } => f.debug_struct("AddSource").field("url", url).finish(),
        }
    }
}

/// Sending side of the engine's command channel.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    /// Track an already validated source and fetch it once right away.
    ///
    /// The returned receiver yields the outcome of that first fetch.  If the
    /// engine has stopped, the receiver reports a closed channel.
    pub fn add_source(&self, url: impl Into<String>) -> oneshot::Receiver<LoadResult> {
        let (reply, rx) = oneshot::channel();
        // A send error drops `reply`, which closes `rx`.
        let _ = self.commands.send(Command::AddSource {
            url: url.into(),
            reply,
        });
        rx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle { wake_at: Instant },
    Cycling { pending: usize },
}

enum Origin {
    Cycle,
    Initial(oneshot::Sender<LoadResult>),
}

/// A fetch that has settled, waiting to be applied.
struct Settled {
    url: String,
    origin: Origin,
    outcome: Result<ParsedFeed, FetchError>,
}

pub struct Engine {
    fetcher: Arc<dyn Fetch>,
    config: EngineConfig,
    state: AggregationState,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<EngineEvent>,
    cycle: u64,
    cycle_new_posts: usize,
}

impl Engine {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        config: EngineConfig,
    ) -> (Self, EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();

        let engine = Self {
            fetcher,
            config,
            state: AggregationState::new(),
            commands,
            events,
            cycle: 0,
            cycle_new_posts: 0,
        };
        let handle = EngineHandle {
            commands: commands_tx,
        };
        (engine, handle, events_rx)
    }

    /// Run the polling loop.  Never returns while the process is alive.
    pub async fn run(mut self) {
        info!(
            "Engine started (poll delay: {} ms, dedup: {:?})",
            self.config.poll_delay.as_millis(),
            self.config.dedup
        );

        let mut in_flight: FuturesUnordered<BoxFuture<'static, Settled>> = FuturesUnordered::new();
        let mut phase = Phase::Idle {
            wake_at: Instant::now() + self.config.poll_delay,
        };
        let mut commands_open = true;

        loop {
            let wake_at = match phase {
                Phase::Idle { wake_at } => Some(wake_at),
                Phase::Cycling { .. } => None,
            };

            tokio::select! {
                command = self.commands.recv(), if commands_open => match command {
                    Some(Command::AddSource { url, reply }) => {
                        self.admit(&url);
                        in_flight.push(self.spawn_fetch(url, Origin::Initial(reply)));
                    }
                    // Every handle is gone; keep polling what is tracked.
                    None => commands_open = false,
                },
                Some(settled) = in_flight.next(), if !in_flight.is_empty() => {
                    phase = self.settle(settled, phase);
                }
                _ = sleep_until(wake_at.unwrap_or_else(Instant::now)), if wake_at.is_some() => {
                    phase = self.start_cycle(&mut in_flight);
                }
            }
        }
    }

    fn admit(&mut self, url: &str) {
        let source = TrackedSource {
            url: url.to_string(),
        };
        if self.state.track(source.clone()) {
            info!("Tracking {}", url);
            self.publish(EngineEvent::SourceAdded(source));
        } else {
            debug!("{} is already tracked; fetching it again", url);
        }
    }

    fn spawn_fetch(&self, url: String, origin: Origin) -> BoxFuture<'static, Settled> {
        let fetcher = Arc::clone(&self.fetcher);
        async move {
            let outcome = fetch_feed(fetcher.as_ref(), &url).await;
            Settled {
                url,
                origin,
                outcome,
            }
        }
        .boxed()
    }

    /// Idle → Cycling: issue one fetch per tracked source.
    fn start_cycle(&mut self, in_flight: &mut FuturesUnordered<BoxFuture<'static, Settled>>) -> Phase {
        self.cycle += 1;
        self.cycle_new_posts = 0;

        let urls: Vec<String> = self.state.sources().iter().map(|s| s.url.clone()).collect();
        info!("Cycle {} started ({} source(s))", self.cycle, urls.len());
        self.publish(EngineEvent::CycleStarted {
            cycle: self.cycle,
            sources: urls.len(),
        });

        let pending = urls.len();
        for url in urls {
            in_flight.push(self.spawn_fetch(url, Origin::Cycle));
        }

        if pending == 0 {
            self.finish_cycle()
        } else {
            Phase::Cycling { pending }
        }
    }

    fn finish_cycle(&mut self) -> Phase {
        info!(
            "Cycle {} completed: {} new post(s)",
            self.cycle, self.cycle_new_posts
        );
        self.publish(EngineEvent::CycleCompleted {
            cycle: self.cycle,
            new_posts: self.cycle_new_posts,
        });
        Phase::Idle {
            wake_at: Instant::now() + self.config.poll_delay,
        }
    }

    /// Apply one settled fetch and advance the state machine.
    fn settle(&mut self, settled: Settled, phase: Phase) -> Phase {
        let Settled {
            url,
            origin,
            outcome,
        } = settled;

        let applied = outcome.map(|parsed| self.apply(&url, parsed));

        match origin {
            Origin::Initial(reply) => {
                if let Err(e) = &applied {
                    debug!("Initial fetch of {} failed: {}", url, e);
                }
                // The submitter may have given up waiting.
                let _ = reply.send(applied);
                phase
            }
            Origin::Cycle => {
                match applied {
                    Ok(loaded) => {
                        debug!("{}: {} new post(s)", url, loaded.posts.len());
                        self.cycle_new_posts += loaded.posts.len();
                    }
                    Err(e) => warn!(
                        source = e.url(),
                        kind = ?e.kind(),
                        "Background fetch failed: {}",
                        e
                    ),
                }

                match phase {
                    Phase::Cycling { pending } if pending > 1 => Phase::Cycling {
                        pending: pending - 1,
                    },
                    Phase::Cycling { .. } => self.finish_cycle(),
                    idle @ Phase::Idle { .. } => idle,
                }
            }
        }
    }

    /// Create the source's feed if needed and append its unseen posts.
    fn apply(&mut self, url: &str, parsed: ParsedFeed) -> Loaded {
        let ParsedFeed { feed, posts } = parsed;

        let feed = match self.state.feed_for(url) {
            Some(existing) => existing.clone(),
            None => {
                let created = assign_feed_id(feed, url);
                info!("New feed {} ({}) for {}", created.id, created.title, url);
                self.state.insert_feed(created.clone());
                self.publish(EngineEvent::FeedAdded(created.clone()));
                created
            }
        };

        let new_posts = merge::merge(self.state.posts(), posts, feed.id, self.config.dedup);
        if !new_posts.is_empty() {
            self.state.append_posts(new_posts.iter().cloned());
            self.publish(EngineEvent::PostsAdded(new_posts.clone()));
        }

        Loaded {
            feed,
            posts: new_posts,
        }
    }

    fn publish(&self, event: EngineEvent) {
        // Nobody observing is not an error for the engine.
        let _ = self.events.send(event);
    }
}

/// Start the engine on a dedicated thread with a single-threaded runtime.
///
/// Returns the command handle and the event stream the UI should drain on
/// every tick.  The thread runs until the process exits.
pub fn spawn(
    fetcher: Arc<dyn Fetch>,
    config: EngineConfig,
) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
    let (engine, handle, events) = Engine::new(fetcher, config);

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Failed to start engine runtime: {}", e);
                return;
            }
        };
        runtime.block_on(engine.run());
    });

    (handle, events)
}
