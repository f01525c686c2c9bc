//! Conversation history persistence.
//!
//! [`ConversationStore`] is the seam the engine saves and restores agent
//! histories through.  [`KvConversationStore`] adapts any
//! `Access<String, Vec<Message>>` backend; [`EncryptedConversationStore`]
//! wraps another store and seals the history with AES-256-GCM before it
//! reaches the backend.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use axle_core::{AgentId, Message};

use crate::access::Access;
use crate::crypto;
use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Persistence for an agent's message history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist the full history for an agent (upsert).
    async fn save(&self, agent_id: &AgentId, messages: &[Message]) -> StoreResult<()>;

    /// Load the history for an agent; an unknown agent yields an empty
    /// history, not an error.
    async fn load(&self, agent_id: &AgentId) -> StoreResult<Vec<Message>>;

    /// Drop the history for an agent; absence is not an error.
    async fn clear(&self, agent_id: &AgentId) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Key/value adapter
// ---------------------------------------------------------------------------

/// Conversation store over any key/value backend.
pub struct KvConversationStore<A> {
    access: A,
}

impl<A> KvConversationStore<A>
where
    A: Access<String, Vec<Message>>,
{
    /// Create a store over the given backend.
    pub fn new(access: A) -> Self {
        Self { access }
    }
}

#[async_trait]
impl<A> ConversationStore for KvConversationStore<A>
where
    A: Access<String, Vec<Message>>,
{
    async fn save(&self, agent_id: &AgentId, messages: &[Message]) -> StoreResult<()> {
        let key = agent_id.to_string();
        let value = messages.to_vec();

        // Upsert: try update first, fall back to create for a new agent.
        match self.access.update(key.clone(), value.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => self.access.create(key, value).await,
            Err(e) => Err(e),
        }
    }

    async fn load(&self, agent_id: &AgentId) -> StoreResult<Vec<Message>> {
        Ok(self
            .access
            .read(&agent_id.to_string())
            .await?
            .unwrap_or_default())
    }

    async fn clear(&self, agent_id: &AgentId) -> StoreResult<()> {
        match self.access.delete(&agent_id.to_string()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Encrypted wrapper
// ---------------------------------------------------------------------------

/// Encrypts history at rest.
///
/// On save the message list is JSON-serialized, sealed with AES-256-GCM,
/// base64-encoded, and stored as a single system-role message whose content
/// is the ciphertext.  Load reverses the pipeline.  The inner store never
/// sees plaintext.
pub struct EncryptedConversationStore<S> {
    inner: S,
    key: [u8; crypto::KEY_LEN],
}

impl<S> EncryptedConversationStore<S>
where
    S: ConversationStore,
{
    /// Wrap `inner`, sealing with the given 32-byte key.
    pub fn new(inner: S, key: [u8; crypto::KEY_LEN]) -> Self {
        Self { inner, key }
    }
}

#[async_trait]
impl<S> ConversationStore for EncryptedConversationStore<S>
where
    S: ConversationStore,
{
    async fn save(&self, agent_id: &AgentId, messages: &[Message]) -> StoreResult<()> {
        let plaintext = serde_json::to_vec(messages)?;
        let sealed = crypto::seal(&plaintext, &self.key)?;
        let envelope = Message::system(BASE64.encode(sealed));

        debug!(agent_id = %agent_id, messages = messages.len(), "history sealed");
        self.inner.save(agent_id, &[envelope]).await
    }

    async fn load(&self, agent_id: &AgentId) -> StoreResult<Vec<Message>> {
        let stored = self.inner.load(agent_id).await?;
        let Some(envelope) = stored.first() else {
            return Ok(Vec::new());
        };

        let sealed =
            BASE64
                .decode(&envelope.content)
                .map_err(|e| StoreError::DecryptionFailed {
                    reason: format!("invalid base64 envelope: {e}"),
                })?;
        let plaintext = crypto::open(&sealed, &self.key)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    async fn clear(&self, agent_id: &AgentId) -> StoreResult<()> {
        self.inner.clear(agent_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axle_core::Role;

    use crate::access::MemoryBackend;

    fn plain_store() -> KvConversationStore<MemoryBackend<String, Vec<Message>>> {
        KvConversationStore::new(MemoryBackend::new())
    }

    fn sample_history() -> Vec<Message> {
        vec![
            Message::user("What is 2+2?"),
            Message::assistant("Here is the answer"),
        ]
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let store = plain_store();
        let agent_id = AgentId::new();

        store.save(&agent_id, &sample_history()).await.unwrap();
        let loaded = store.load(&agent_id).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].content, "Here is the answer");
    }

    #[tokio::test]
    async fn save_is_upsert() {
        let store = plain_store();
        let agent_id = AgentId::new();

        store.save(&agent_id, &sample_history()).await.unwrap();
        let replacement = vec![Message::user("only this")];
        store.save(&agent_id, &replacement).await.unwrap();

        let loaded = store.load(&agent_id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "only this");
    }

    #[tokio::test]
    async fn load_unknown_agent_is_empty() {
        let store = plain_store();
        assert!(store.load(&AgentId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = plain_store();
        let agent_id = AgentId::new();

        store.clear(&agent_id).await.unwrap();
        store.save(&agent_id, &sample_history()).await.unwrap();
        store.clear(&agent_id).await.unwrap();
        store.clear(&agent_id).await.unwrap();
        assert!(store.load(&agent_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn encrypted_roundtrip_preserves_messages() {
        let store = EncryptedConversationStore::new(plain_store(), [3u8; crypto::KEY_LEN]);
        let agent_id = AgentId::new();

        store.save(&agent_id, &sample_history()).await.unwrap();
        let loaded = store.load(&agent_id).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].role, Role::User);
        assert_eq!(loaded[0].content, "What is 2+2?");
        assert_eq!(loaded[1].content, "Here is the answer");
    }

    #[tokio::test]
    async fn encrypted_store_persists_a_single_opaque_message() {
        let inner = plain_store();
        let agent_id = AgentId::new();

        let store = EncryptedConversationStore::new(inner, [3u8; crypto::KEY_LEN]);
        store.save(&agent_id, &sample_history()).await.unwrap();

        // Peek through a second handle over the same backend shape: load via
        // the wrapper works, and the sealed form is one system message.
        let sealed = store.inner.load(&agent_id).await.unwrap();
        assert_eq!(sealed.len(), 1);
        assert_eq!(sealed[0].role, Role::System);
        assert_ne!(sealed[0].content, "What is 2+2?");
        assert!(!sealed[0].content.contains("answer"));
    }

    #[tokio::test]
    async fn encrypted_load_of_empty_history_is_empty() {
        let store = EncryptedConversationStore::new(plain_store(), [3u8; crypto::KEY_LEN]);
        assert!(store.load(&AgentId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_key_fails_load() {
        let agent_id = AgentId::new();
        let backend = MemoryBackend::new();

        let writer = EncryptedConversationStore::new(
            KvConversationStore::new(backend),
            [1u8; crypto::KEY_LEN],
        );
        writer.save(&agent_id, &sample_history()).await.unwrap();

        // Re-wrap the same inner store with a different key.
        let reader = EncryptedConversationStore::new(writer.inner, [2u8; crypto::KEY_LEN]);
        assert!(reader.load(&agent_id).await.is_err());
    }
}
