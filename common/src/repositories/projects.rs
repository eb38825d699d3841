use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Project;

/// Store boundary for projects. The process ships with the in-memory
/// implementation; a durable backend can be slotted in behind this trait
/// without touching services or handlers.
#[async_trait::async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self) -> Vec<Project>;
    async fn find(&self, id: Uuid) -> Option<Project>;
    async fn put(&self, project: Project);
}

#[derive(Default)]
pub struct InMemoryProjectRepository {
    inner: RwLock<HashMap<Uuid, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.inner.read().await.values().cloned().collect();
        // HashMap iteration order is arbitrary; keep listings stable.
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        projects
    }

    async fn find(&self, id: Uuid) -> Option<Project> {
        self.inner.read().await.get(&id).cloned()
    }

    async fn put(&self, project: Project) {
        self.inner.write().await.insert(project.id, project);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(name: &str) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            framework: "Next.js + Tailwind".to_string(),
            progress: "0".to_string(),
            codebase: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn put_then_find_round_trips() {
        let repo = InMemoryProjectRepository::new();
        let project = sample("alpha");
        let id = project.id;
        repo.put(project).await;

        let found = repo.find(id).await.unwrap();
        assert_eq!(found.name, "alpha");
        assert!(repo.find(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_entries() {
        let repo = InMemoryProjectRepository::new();
        let mut project = sample("before");
        let id = project.id;
        repo.put(project.clone()).await;

        project.name = "after".to_string();
        repo.put(project).await;

        assert_eq!(repo.find(id).await.unwrap().name, "after");
        assert_eq!(repo.list().await.len(), 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation_time() {
        let repo = InMemoryProjectRepository::new();
        let first = sample("first");
        let mut second = sample("second");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        repo.put(second.clone()).await;
        repo.put(first.clone()).await;

        let names: Vec<String> = repo.list().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
    }
}
