use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::DesignInput;

#[async_trait::async_trait]
pub trait DesignInputRepository: Send + Sync {
    async fn insert(&self, input: DesignInput);
    async fn list_by_project(&self, project_id: Uuid) -> Vec<DesignInput>;
}

#[derive(Default)]
pub struct InMemoryDesignInputRepository {
    inner: RwLock<Vec<DesignInput>>,
}

impl InMemoryDesignInputRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DesignInputRepository for InMemoryDesignInputRepository {
    async fn insert(&self, input: DesignInput) {
        self.inner.write().await.push(input);
    }

    async fn list_by_project(&self, project_id: Uuid) -> Vec<DesignInput> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|input| input.project_id == project_id)
            .cloned()
            .collect()
    }
}
