//! In-memory stand-ins for Plex, the language model and the sleep timer

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use curator_ollama_client::{OllamaError, OllamaResult};
use curator_plex_client::{
    Collection, LibrarySection, MediaItem, MediaType, PlexError, PlexResult, WatchEvent,
};
use curator_worker::{CompletionBackend, MediaServer, MediaServerConnector, Sleeper};

#[derive(Debug, Clone)]
pub struct FakeCollection {
    pub collection: Collection,
    pub members: Vec<MediaItem>,
}

#[derive(Debug, Default)]
struct FakeState {
    sections: Vec<LibrarySection>,
    history: HashMap<String, Vec<String>>,
    catalog: HashMap<String, MediaItem>,
    failing_searches: HashSet<String>,
    failing_history: HashSet<String>,
    collections: Vec<FakeCollection>,
    fail_collection_lookup: bool,
    fail_add_items: bool,
    calls: Vec<String>,
    next_key: u32,
}

/// Media server holding sections, history, a searchable catalog and collections
#[derive(Debug, Clone, Default)]
pub struct FakeMediaServer {
    state: Arc<Mutex<FakeState>>,
}

const WRITE_CALLS: [&str; 4] = ["remove_items", "add_items", "edit_summary", "create_collection"];

impl FakeMediaServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_section(self, key: &str, title: &str) -> Self {
        self.state().sections.push(LibrarySection {
            key: key.to_string(),
            title: title.to_string(),
            kind: MediaType::Movie,
        });
        self
    }

    pub fn with_history(self, section_key: &str, titles: &[&str]) -> Self {
        self.state().history.insert(
            section_key.to_string(),
            titles.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Make `title` findable by an exact (case-insensitive) search
    pub fn with_movie(self, rating_key: &str, title: &str) -> Self {
        self.state().catalog.insert(
            title.to_lowercase(),
            MediaItem {
                rating_key: rating_key.to_string(),
                title: title.to_string(),
                year: None,
                kind: MediaType::Movie,
            },
        );
        self
    }

    pub fn with_collection(self, section_key: &str, rating_key: &str, title: &str, members: &[&str]) -> Self {
        let members = members
            .iter()
            .map(|k| MediaItem {
                rating_key: k.to_string(),
                title: format!("Old {}", k),
                year: None,
                kind: MediaType::Movie,
            })
            .collect();
        self.state().collections.push(FakeCollection {
            collection: Collection {
                rating_key: rating_key.to_string(),
                title: title.to_string(),
                section_key: section_key.to_string(),
                summary: Some("old summary".to_string()),
                child_count: None,
            },
            members,
        });
        self
    }

    pub fn with_failing_search(self, query: &str) -> Self {
        self.state().failing_searches.insert(query.to_string());
        self
    }

    pub fn with_failing_history(self, section_key: &str) -> Self {
        self.state().failing_history.insert(section_key.to_string());
        self
    }

    pub fn with_failing_collection_lookup(self) -> Self {
        self.state().fail_collection_lookup = true;
        self
    }

    pub fn with_failing_add_items(self) -> Self {
        self.state().fail_add_items = true;
        self
    }

    /// Every call in order, formatted as `name:argument`
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Queries passed to `search`, in order
    pub fn search_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("search:").map(str::to_string))
            .collect()
    }

    /// Number of calls that modify collections
    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| WRITE_CALLS.iter().any(|w| c.starts_with(w)))
            .count()
    }

    pub fn collections_titled(&self, section_key: &str, title: &str) -> Vec<FakeCollection> {
        let wanted = title.to_lowercase();
        self.state()
            .collections
            .iter()
            .filter(|c| {
                c.collection.section_key == section_key
                    && c.collection.title.to_lowercase() == wanted
            })
            .cloned()
            .collect()
    }

    /// Rating keys of the single collection with that title
    pub fn member_keys(&self, section_key: &str, title: &str) -> Vec<String> {
        let found = self.collections_titled(section_key, title);
        assert_eq!(found.len(), 1, "expected exactly one '{}' collection", title);
        found[0].members.iter().map(|m| m.rating_key.clone()).collect()
    }

    pub fn summary(&self, section_key: &str, title: &str) -> Option<String> {
        self.collections_titled(section_key, title)
            .first()
            .and_then(|c| c.collection.summary.clone())
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }

    fn with_collection_mut<T>(
        &self,
        rating_key: &str,
        f: impl FnOnce(&mut FakeCollection) -> T,
    ) -> PlexResult<T> {
        let mut state = self.state();
        state
            .collections
            .iter_mut()
            .find(|c| c.collection.rating_key == rating_key)
            .map(f)
            .ok_or_else(|| PlexError::NotFound(format!("collection {}", rating_key)))
    }
}

#[async_trait]
impl MediaServer for FakeMediaServer {
    async fn library_section(&self, name: &str) -> PlexResult<LibrarySection> {
        self.record(format!("library_section:{}", name));
        self.state()
            .sections
            .iter()
            .find(|s| s.title == name)
            .cloned()
            .ok_or_else(|| PlexError::NotFound(format!("library section '{}'", name)))
    }

    async fn history(
        &self,
        section: &LibrarySection,
        max_results: usize,
    ) -> PlexResult<Vec<WatchEvent>> {
        self.record(format!("history:{}", section.key));
        let state = self.state();
        if state.failing_history.contains(&section.key) {
            return Err(PlexError::Api {
                status: 500,
                message: "history unavailable".to_string(),
            });
        }
        Ok(state
            .history
            .get(&section.key)
            .map(|titles| {
                titles
                    .iter()
                    .take(max_results)
                    .map(|t| WatchEvent {
                        title: t.clone(),
                        rating_key: None,
                        viewed_at: None,
                        kind: MediaType::Movie,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search(
        &self,
        query: &str,
        mediatype: MediaType,
        limit: usize,
    ) -> PlexResult<Vec<MediaItem>> {
        self.record(format!("search:{}", query));
        let state = self.state();
        if state.failing_searches.contains(query) {
            return Err(PlexError::Timeout(30));
        }
        Ok(state
            .catalog
            .get(&query.to_lowercase())
            .filter(|item| item.kind == mediatype)
            .cloned()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn collection(&self, section: &LibrarySection, title: &str) -> PlexResult<Collection> {
        self.record(format!("collection:{}", title));
        if self.state().fail_collection_lookup {
            return Err(PlexError::Api {
                status: 500,
                message: "lookup failed".to_string(),
            });
        }
        self.collections_titled(&section.key, title)
            .first()
            .map(|c| c.collection.clone())
            .ok_or_else(|| PlexError::NotFound(format!("collection '{}'", title)))
    }

    async fn collection_items(&self, collection: &Collection) -> PlexResult<Vec<MediaItem>> {
        self.record(format!("collection_items:{}", collection.rating_key));
        self.with_collection_mut(&collection.rating_key, |c| c.members.clone())
    }

    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        self.record(format!("remove_items:{}", collection.rating_key));
        self.with_collection_mut(&collection.rating_key, |c| {
            c.members
                .retain(|m| !items.iter().any(|i| i.rating_key == m.rating_key));
        })
    }

    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        self.record(format!("add_items:{}", collection.rating_key));
        if self.state().fail_add_items {
            return Err(PlexError::Api {
                status: 500,
                message: "transient".to_string(),
            });
        }
        self.with_collection_mut(&collection.rating_key, |c| {
            c.members.extend(items.iter().cloned());
        })
    }

    async fn edit_summary(&self, collection: &Collection, summary: &str) -> PlexResult<()> {
        self.record(format!("edit_summary:{}", collection.rating_key));
        self.with_collection_mut(&collection.rating_key, |c| {
            c.collection.summary = Some(summary.to_string());
        })
    }

    async fn create_collection(
        &self,
        title: &str,
        section: &LibrarySection,
        items: &[MediaItem],
    ) -> PlexResult<Collection> {
        self.record(format!("create_collection:{}", title));
        let mut state = self.state();
        state.next_key += 1;
        let collection = Collection {
            rating_key: format!("c{}", state.next_key),
            title: title.to_string(),
            section_key: section.key.clone(),
            summary: None,
            child_count: Some(items.len() as u32),
        };
        state.collections.push(FakeCollection {
            collection: collection.clone(),
            members: items.to_vec(),
        });
        Ok(collection)
    }
}

/// Hands out the same fake server on every connect, or fails authorization
#[derive(Debug, Clone)]
pub struct FakeConnector {
    server: FakeMediaServer,
    reject: bool,
    connects: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(server: FakeMediaServer) -> Self {
        Self {
            server,
            reject: false,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rejecting(server: FakeMediaServer) -> Self {
        Self {
            reject: true,
            ..Self::new(server)
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaServerConnector for FakeConnector {
    type Server = FakeMediaServer;

    async fn connect(&self) -> PlexResult<FakeMediaServer> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(PlexError::Unauthorized(401));
        }
        Ok(self.server.clone())
    }
}

#[derive(Debug, Clone)]
enum Answer {
    Text(String),
    Failure(String),
}

/// Completion backend answering from a script; the last answer repeats
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    answers: Arc<Mutex<VecDeque<Answer>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn answering(answer: &str) -> Self {
        Self::default().then(answer)
    }

    pub fn then(self, answer: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Answer::Text(answer.to_string()));
        self
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Answer::Failure(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> OllamaResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut answers = self.answers.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        match answer {
            Some(Answer::Text(text)) => Ok(text),
            Some(Answer::Failure(message)) => Err(OllamaError::ApiError(message)),
            None => Err(OllamaError::InvalidResponse("no scripted answer".to_string())),
        }
    }
}

/// Records requested sleeps instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
