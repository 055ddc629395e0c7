use std::collections::HashSet;

use ratatui::widgets::ListState;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::info;

use crate::error::{ErrorKind, ValidationError};
use crate::identity::PostId;
use crate::poll::{EngineEvent, LoadResult};
use crate::source::Post;
use crate::state::AggregationState;
use crate::validate::validate_source;

/// Whether key presses move the selection or edit the URL input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// A submitted source whose first fetch has not answered yet.
struct Submission {
    url: String,
    reply: oneshot::Receiver<LoadResult>,
}

pub struct App {
    /// Mirror of the engine's state, rebuilt from its events.
    pub view: AggregationState,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Feedback line shown in the status bar.
    pub status: String,
    pub mode: InputMode,
    /// URL being typed.
    pub input: String,
    /// Whether the detail panel for the selected post is open.
    pub show_detail: bool,
    /// Number and size of the most recent poll cycle.
    pub last_cycle: Option<(u64, usize)>,
    read: HashSet<PostId>,
    pending: Vec<Submission>,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: AggregationState::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            mode: InputMode::Normal,
            input: String::new(),
            show_detail: false,
            last_cycle: None,
            read: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Apply a state change published by the engine.
    pub fn apply(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::CycleStarted { cycle, sources } => {
                self.last_cycle = Some((*cycle, *sources));
            }
            EngineEvent::CycleCompleted { new_posts, .. } if *new_posts > 0 => {
                self.status = format!("{new_posts} new posts");
            }
            _ => {}
        }
        event.apply_to(&mut self.view);
    }

    pub fn posts(&self) -> &[Post] {
        self.view.posts()
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.list_state.selected().and_then(|i| self.posts().get(i))
    }

    pub fn is_read(&self, post: &Post) -> bool {
        self.read.contains(&post.id)
    }

    // -- submission ----------------------------------------------------------

    /// Validate a candidate URL against tracked and in-flight sources.
    pub fn validate(&mut self, candidate: &str) -> Option<String> {
        let tracked = self
            .view
            .sources()
            .iter()
            .map(|s| s.url.as_str())
            .chain(self.pending.iter().map(|p| p.url.as_str()));

        match validate_source(candidate, tracked) {
            Ok(url) => Some(url),
            Err(e) => {
                self.status = validation_message(&e).to_string();
                None
            }
        }
    }

    /// Take the typed URL, leave edit mode and validate it.
    pub fn submit_input(&mut self) -> Option<String> {
        let candidate = std::mem::take(&mut self.input);
        self.mode = InputMode::Normal;
        self.validate(&candidate)
    }

    /// Remember a submission so its reply is reported when it arrives.
    pub fn track_submission(&mut self, url: String, reply: oneshot::Receiver<LoadResult>) {
        self.status = format!("Loading {url}…");
        self.pending.push(Submission { url, reply });
    }

    /// Report every submission that has been answered since the last tick.
    pub fn poll_submissions(&mut self) {
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut submission in std::mem::take(&mut self.pending) {
            match submission.reply.try_recv() {
                Ok(result) => {
                    if let Ok(loaded) = &result {
                        info!(
                            "Loaded {} ({}): {} post(s)",
                            loaded.feed.title,
                            submission.url,
                            loaded.posts.len()
                        );
                    }
                    self.status = load_message(&result).to_string();
                }
                Err(TryRecvError::Empty) => waiting.push(submission),
                Err(TryRecvError::Closed) => {
                    self.status = load_message_for(ErrorKind::Unclassified).to_string()
                }
            }
        }
        self.pending = waiting;
    }

    pub fn start_editing(&mut self) {
        self.mode = InputMode::Editing;
    }

    pub fn cancel_editing(&mut self) {
        self.input.clear();
        self.mode = InputMode::Normal;
    }

    /// Open or close the detail panel; opening marks the post read.
    pub fn toggle_detail(&mut self) {
        if self.show_detail {
            self.show_detail = false;
            return;
        }
        if let Some(id) = self.selected_post().map(|p| p.id) {
            self.read.insert(id);
            self.show_detail = true;
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.posts().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.posts().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.posts().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.posts().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}

fn validation_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::Invalid(_) | ValidationError::UnsupportedScheme(_) => {
            "Link must be a valid URL"
        }
        ValidationError::Duplicate => "RSS already exists",
    }
}

fn load_message_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "Network error",
        ErrorKind::Parsing => "Resource does not contain valid RSS",
        ErrorKind::Unclassified => "Unknown error",
    }
}

fn load_message(result: &LoadResult) -> &'static str {
    match result {
        Ok(_) => "RSS loaded successfully",
        Err(e) => load_message_for(e.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::identity::{assign_feed_id, assign_post_id};
    use crate::poll::Loaded;
    use crate::source::{FeedDraft, PostDraft, TrackedSource};

    fn app_with_posts(titles: &[&str]) -> App {
        let mut app = App::new();
        let feed = assign_feed_id(
            FeedDraft {
                title: "Feed".into(),
                description: "D".into(),
                link: "https://f.example".into(),
            },
            "https://f.example/rss",
        );
        let posts = titles
            .iter()
            .map(|t| assign_post_id(PostDraft::titled(*t), feed.id))
            .collect();

        app.apply(EngineEvent::SourceAdded(TrackedSource {
            url: "https://f.example/rss".into(),
        }));
        app.apply(EngineEvent::FeedAdded(feed));
        app.apply(EngineEvent::PostsAdded(posts));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.posts().is_empty());
        assert!(!app.quit);
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.list_state.selected().is_none());
    }

    // -- events --------------------------------------------------------------

    #[test]
    fn events_build_the_mirror() {
        let app = app_with_posts(&["a", "b"]);
        assert_eq!(app.view.sources().len(), 1);
        assert_eq!(app.view.feeds().len(), 1);
        assert_eq!(app.posts().len(), 2);
    }

    #[test]
    fn started_cycle_is_remembered() {
        let mut app = App::new();
        app.apply(EngineEvent::CycleStarted { cycle: 2, sources: 5 });
        assert_eq!(app.last_cycle, Some((2, 5)));
    }

    #[test]
    fn completed_cycle_with_news_updates_status() {
        let mut app = App::new();
        app.apply(EngineEvent::CycleCompleted { cycle: 3, new_posts: 4 });
        assert_eq!(app.status, "4 new posts");

        app.status = "quiet".into();
        app.apply(EngineEvent::CycleCompleted { cycle: 4, new_posts: 0 });
        assert_eq!(app.status, "quiet");
    }

    // -- submission ----------------------------------------------------------

    #[test]
    fn invalid_input_sets_feedback() {
        let mut app = App::new();
        app.start_editing();
        app.input = "nope".into();

        assert_eq!(app.submit_input(), None);
        assert_eq!(app.status, "Link must be a valid URL");
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.input.is_empty());
    }

    #[test]
    fn tracked_source_is_a_duplicate() {
        let mut app = app_with_posts(&[]);
        assert_eq!(app.validate("https://f.example/rss"), None);
        assert_eq!(app.status, "RSS already exists");
    }

    #[test]
    fn pending_submission_is_a_duplicate() {
        let mut app = App::new();
        let (_tx, rx) = oneshot::channel();
        app.track_submission("https://p.example/rss".into(), rx);

        assert_eq!(app.validate("https://p.example/rss"), None);
        assert_eq!(app.status, "RSS already exists");
    }

    #[test]
    fn replies_are_reported_once_they_arrive() {
        let mut app = App::new();
        let (tx, rx) = oneshot::channel();
        app.track_submission("https://p.example/rss".into(), rx);

        app.poll_submissions();
        assert!(app.status.starts_with("Loading"));

        tx.send(Err(FetchError::network("https://p.example/rss", "down")))
            .unwrap();
        app.poll_submissions();
        assert_eq!(app.status, "Network error");

        // Answered submissions no longer block re-validation.
        assert!(app.validate("https://p.example/rss").is_some());
    }

    #[test]
    fn successful_reply_reports_loaded() {
        let mut app = App::new();
        let (tx, rx) = oneshot::channel();
        app.track_submission("https://p.example/rss".into(), rx);

        let feed = assign_feed_id(
            FeedDraft {
                title: "P".into(),
                description: String::new(),
                link: String::new(),
            },
            "https://p.example/rss",
        );
        tx.send(Ok(Loaded { feed, posts: vec![] })).unwrap();
        app.poll_submissions();
        assert_eq!(app.status, "RSS loaded successfully");
    }

    #[test]
    fn dropped_reply_is_unknown_error() {
        let mut app = App::new();
        let (tx, rx) = oneshot::channel::<LoadResult>();
        app.track_submission("https://p.example/rss".into(), rx);
        drop(tx);

        app.poll_submissions();
        assert_eq!(app.status, "Unknown error");
    }

    #[test]
    fn error_kinds_map_to_feedback() {
        assert_eq!(
            load_message(&Err(FetchError::parsing("u", "x"))),
            "Resource does not contain valid RSS"
        );
        assert_eq!(
            load_message(&Err(FetchError::unclassified("u", "x"))),
            "Unknown error"
        );
    }

    // -- detail --------------------------------------------------------------

    #[test]
    fn opening_detail_marks_post_read() {
        let mut app = app_with_posts(&["a", "b"]);
        app.toggle_detail();
        assert!(!app.show_detail, "nothing selected yet");

        app.select_next();
        app.toggle_detail();
        assert!(app.show_detail);
        let first = app.posts()[0].clone();
        let second = app.posts()[1].clone();
        assert!(app.is_read(&first));
        assert!(!app.is_read(&second));

        app.toggle_detail();
        assert!(!app.show_detail);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_clamps() {
        let mut app = app_with_posts(&["1", "2", "3"]);

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with_posts(&["1", "2", "3"]);
        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn selected_post_follows_selection() {
        let mut app = app_with_posts(&["1", "2"]);
        assert!(app.selected_post().is_none());
        app.select_last();
        assert_eq!(app.selected_post().map(|p| p.title.as_str()), Some("2"));
    }
}
