//! Session persistence on top of the key-value store.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Cache, CacheError};

/// Key holding the id of the session active on this device.
const CURRENT_SESSION_KEY: &str = "session:current";

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session data as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// Caller-defined session payload.
    pub data: T,
    /// Write counter; new sessions start at 1.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub last_accessed: u64,
}

/// Persists session payloads of type `T` and remembers which session is
/// active on this device.
#[derive(Debug, Clone)]
pub struct SessionStore<T> {
    cache: Cache,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> SessionStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a session store over a cache.
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Store a new session and make it the current one.
    pub fn create(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let now = unix_now();
        let session_data = SessionData {
            id: id.clone(),
            data: data.clone(),
            version: 1,
            created_at: now,
            last_accessed: now,
        };
        self.cache.set(&self.session_key(id), &session_data)?;
        self.cache.set(CURRENT_SESSION_KEY, id)?;
        tracing::debug!(session_id = %id, "session created");
        Ok(())
    }

    /// Get session payload if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self
            .cache
            .get::<SessionData<T>>(&self.session_key(id))?
            .map(|s| s.data))
    }

    /// Delete a session. Clears the current-session marker if it pointed at
    /// this session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&self.session_key(id))?;
        if self.current_id()?.as_ref() == Some(id) {
            self.cache.delete(CURRENT_SESSION_KEY)?;
        }
        tracing::debug!(session_id = %id, "session deleted");
        Ok(())
    }

    /// Id of the session active on this device, if any.
    pub fn current_id(&self) -> Result<Option<SessionId>, CacheError> {
        self.cache.get(CURRENT_SESSION_KEY)
    }

    /// Payload of the session active on this device, if any.
    pub fn current(&self) -> Result<Option<(SessionId, T)>, CacheError> {
        let Some(id) = self.current_id()? else {
            return Ok(None);
        };
        Ok(self.get(&id)?.map(|data| (id, data)))
    }

    fn session_key(&self, id: &SessionId) -> String {
        crate::cache_key!("session", id)
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
