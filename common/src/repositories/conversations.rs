use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Conversation;

/// Conversations are keyed by project; each project has at most one.
#[async_trait::async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_project(&self, project_id: Uuid) -> Option<Conversation>;
    async fn put(&self, conversation: Conversation);
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    inner: RwLock<HashMap<Uuid, Conversation>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_project(&self, project_id: Uuid) -> Option<Conversation> {
        self.inner.read().await.get(&project_id).cloned()
    }

    async fn put(&self, conversation: Conversation) {
        self.inner
            .write()
            .await
            .insert(conversation.project_id, conversation);
    }
}
