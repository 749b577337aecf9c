use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

const SESSION_KEY_LEN: usize = 30;

/// Per-client state keyed by a random cookie value.
///
/// A session stays alive as long as requests keep arriving; expiry is
/// measured strictly against the last access.
pub struct Session {
    key: String,
    timeout: Duration,
    last_access: Mutex<Instant>,
    values: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl Session {
    fn new(key: String, timeout: Duration) -> Self {
        Self {
            key,
            timeout,
            last_access: Mutex::new(Instant::now()),
            values: Mutex::new(HashMap::new()),
        }
    }

    /// The cookie value identifying this session.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stores a value under `name`, replacing any previous one.
    pub fn insert<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.values
            .lock()
            .expect("session values lock poisoned")
            .insert(name.into(), Box::new(value));
    }

    /// Returns a copy of the value stored under `name`, if one exists
    /// with the requested type.
    pub fn get<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.values
            .lock()
            .expect("session values lock poisoned")
            .get(name)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    fn touch(&self) {
        *self.last_access.lock().expect("session clock lock poisoned") = Instant::now();
    }

    fn is_expired(&self) -> bool {
        self.last_access
            .lock()
            .expect("session clock lock poisoned")
            .elapsed()
            > self.timeout
    }
}

/// Shared table of live sessions plus the background sweep task that
/// evicts expired ones.
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Arc<Session>>>>,
    timeout: Duration,
    stop: Arc<Notify>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Creates the store and starts its sweep task, which wakes every
    /// `sweep_interval` to drop expired sessions.
    pub fn new(timeout: Duration, sweep_interval: Duration) -> Self {
        let sessions: Arc<Mutex<HashMap<String, Arc<Session>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let stop = Arc::new(Notify::new());

        let sweeper = {
            let sessions = Arc::clone(&sessions);
            let stop = Arc::clone(&stop);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = stop.notified() => break,
                        _ = tokio::time::sleep(sweep_interval) => sweep(&sessions),
                    }
                }
            })
        };

        Self {
            sessions,
            timeout,
            stop,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Maps a presented cookie value to its session. An unknown, absent
    /// or expired key yields a fresh session under a new key; the caller
    /// tells the two cases apart by comparing keys.
    pub fn resolve(&self, presented: Option<&str>) -> Arc<Session> {
        let mut sessions = self.sessions.lock().expect("session table lock poisoned");

        if let Some(key) = presented {
            if let Some(session) = sessions.get(key) {
                if !session.is_expired() {
                    session.touch();
                    return Arc::clone(session);
                }
            }
        }

        let mut key = generate_key();
        while sessions.contains_key(&key) {
            key = generate_key();
        }
        let session = Arc::new(Session::new(key.clone(), self.timeout));
        sessions.insert(key, Arc::clone(&session));
        session
    }

    /// Number of sessions currently held, expired ones included until
    /// the next sweep.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs one eviction pass immediately.
    pub fn sweep_now(&self) {
        sweep(&self.sessions);
    }

    /// Stops the sweep task and waits for it to finish.
    pub async fn shutdown(&self) {
        self.stop.notify_one();
        let sweeper = self
            .sweeper
            .lock()
            .expect("session sweeper lock poisoned")
            .take();
        if let Some(handle) = sweeper {
            let _ = handle.await;
        }
    }
}

fn sweep(sessions: &Mutex<HashMap<String, Arc<Session>>>) {
    let mut sessions = sessions.lock().expect("session table lock poisoned");
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired());

    let removed = before - sessions.len();
    if removed > 0 {
        debug!(removed, remaining = sessions.len(), "evicted expired sessions");
    }
}

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LEN)
        .map(char::from)
        .collect()
}
