use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::codebase::{CodebaseService, TreeSource};
use super::ServiceError;
use crate::domain::tree::TreeNode;
use crate::models::{ChatMessage, CodebaseBlob, Conversation, DesignInput, Project};
use crate::repositories::{ConversationRepository, DesignInputRepository, ProjectRepository};
use crate::sample;

pub const DEFAULT_FRAMEWORK: &str = "Next.js + Tailwind";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    /// Raw codebase text pasted at creation time.
    #[serde(default)]
    pub codebase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub framework: Option<String>,
    pub progress: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDesignInput {
    pub project_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub figma_link: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub target_components: Vec<String>,
}

#[async_trait::async_trait]
pub trait ProjectService: Send + Sync {
    async fn list_projects(&self) -> Vec<Project>;
    async fn create_project(&self, new: NewProject) -> Result<Project, ServiceError>;
    async fn get_project(&self, id: Uuid) -> Result<Project, ServiceError>;
    async fn update_project(&self, id: Uuid, update: ProjectUpdate)
        -> Result<Project, ServiceError>;

    async fn attach_codebase(
        &self,
        id: Uuid,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Project, ServiceError>;
    async fn project_tree(&self, id: Uuid) -> Result<(Vec<TreeNode>, TreeSource), ServiceError>;
    async fn download_codebase(&self, id: Uuid) -> Result<(String, Vec<u8>), ServiceError>;

    async fn conversation_messages(&self, project_id: Uuid) -> Vec<ChatMessage>;
    async fn record_conversation(&self, project_id: Uuid, messages: Vec<ChatMessage>);

    async fn create_design_input(
        &self,
        input: NewDesignInput,
    ) -> Result<DesignInput, ServiceError>;
    async fn list_design_inputs(&self, project_id: Uuid) -> Vec<DesignInput>;
}

pub struct ProjectServiceImpl {
    projects: Arc<dyn ProjectRepository>,
    conversations: Arc<dyn ConversationRepository>,
    design_inputs: Arc<dyn DesignInputRepository>,
    codebase: CodebaseService,
}

impl ProjectServiceImpl {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        conversations: Arc<dyn ConversationRepository>,
        design_inputs: Arc<dyn DesignInputRepository>,
        codebase: CodebaseService,
    ) -> Self {
        Self {
            projects,
            conversations,
            design_inputs,
            codebase,
        }
    }

    async fn require_project(&self, id: Uuid) -> Result<Project, ServiceError> {
        self.projects
            .find(id)
            .await
            .ok_or_else(|| ServiceError::new(404, "Project not found"))
    }
}

#[async_trait::async_trait]
impl ProjectService for ProjectServiceImpl {
    async fn list_projects(&self) -> Vec<Project> {
        self.projects.list().await
    }

    async fn create_project(&self, new: NewProject) -> Result<Project, ServiceError> {
        if new.name.trim().is_empty() {
            return Err(ServiceError::new(400, "Project name is required"));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            framework: new.framework.unwrap_or_else(|| DEFAULT_FRAMEWORK.to_string()),
            progress: new.progress.unwrap_or_else(|| "0".to_string()),
            codebase: new.codebase.map(|raw| CodebaseBlob::Text { raw }),
            created_at: now,
            updated_at: now,
        };
        self.projects.put(project.clone()).await;
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, ServiceError> {
        self.require_project(id).await
    }

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Project, ServiceError> {
        let mut project = self.require_project(id).await?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = Some(description);
        }
        if let Some(framework) = update.framework {
            project.framework = framework;
        }
        if let Some(progress) = update.progress {
            project.progress = progress;
        }
        project.updated_at = Utc::now();
        self.projects.put(project.clone()).await;
        Ok(project)
    }

    async fn attach_codebase(
        &self,
        id: Uuid,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Project, ServiceError> {
        let mut project = self.require_project(id).await?;
        let blob = self.codebase.ingest(file_name, bytes).await?;
        project.codebase = Some(blob);
        project.updated_at = Utc::now();
        self.projects.put(project.clone()).await;
        Ok(project)
    }

    async fn project_tree(&self, id: Uuid) -> Result<(Vec<TreeNode>, TreeSource), ServiceError> {
        let project = self.require_project(id).await?;
        match project.codebase {
            Some(blob) => self.codebase.reconstruct_tree(&blob),
            // No upload yet is "no data", not an error.
            None => Ok((sample::sample_tree(), TreeSource::Sample)),
        }
    }

    async fn download_codebase(&self, id: Uuid) -> Result<(String, Vec<u8>), ServiceError> {
        let project = self.require_project(id).await?;
        let blob = project
            .codebase
            .ok_or_else(|| ServiceError::new(404, "Project has no codebase"))?;
        self.codebase.package_download(&blob)
    }

    async fn conversation_messages(&self, project_id: Uuid) -> Vec<ChatMessage> {
        self.conversations
            .find_by_project(project_id)
            .await
            .map(|c| c.messages)
            .unwrap_or_default()
    }

    async fn record_conversation(&self, project_id: Uuid, messages: Vec<ChatMessage>) {
        let now = Utc::now();
        let conversation = match self.conversations.find_by_project(project_id).await {
            Some(mut existing) => {
                existing.messages = messages;
                existing.updated_at = now;
                existing
            }
            None => Conversation {
                id: Uuid::new_v4(),
                project_id,
                messages,
                created_at: now,
                updated_at: now,
            },
        };
        self.conversations.put(conversation).await;
    }

    async fn create_design_input(
        &self,
        input: NewDesignInput,
    ) -> Result<DesignInput, ServiceError> {
        if input.description.trim().is_empty() {
            return Err(ServiceError::new(400, "Description is required"));
        }

        let design_input = DesignInput {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            description: input.description,
            figma_link: input.figma_link,
            screenshots: input.screenshots,
            target_components: input.target_components,
            created_at: Utc::now(),
        };
        self.design_inputs.insert(design_input.clone()).await;
        Ok(design_input)
    }

    async fn list_design_inputs(&self, project_id: Uuid) -> Vec<DesignInput> {
        self.design_inputs.list_by_project(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::repositories::{
        InMemoryConversationRepository, InMemoryDesignInputRepository, InMemoryProjectRepository,
    };
    use crate::settings::Settings;
    use std::io::Write;

    fn service() -> ProjectServiceImpl {
        ProjectServiceImpl::new(
            Arc::new(InMemoryProjectRepository::new()),
            Arc::new(InMemoryConversationRepository::new()),
            Arc::new(InMemoryDesignInputRepository::new()),
            CodebaseService::new(&Settings::default()),
        )
    }

    fn new_project(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: None,
            framework: None,
            progress: None,
            codebase: None,
        }
    }

    fn create_zip(files: Vec<(&str, &[u8])>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            let options = zip::write::FileOptions::default();
            for (path, content) in files {
                zip.start_file(path, options).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[tokio::test]
    async fn create_applies_defaults_and_get_finds_it() {
        let svc = service();
        let created = svc.create_project(new_project("demo")).await.unwrap();
        assert_eq!(created.framework, DEFAULT_FRAMEWORK);
        assert_eq!(created.progress, "0");

        let fetched = svc.get_project(created.id).await.unwrap();
        assert_eq!(fetched.name, "demo");
    }

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let svc = service();
        let err = svc.create_project(new_project("   ")).await.unwrap_err();
        assert_eq!(err.code, 400);
    }

    #[tokio::test]
    async fn update_is_partial_and_missing_projects_are_404() {
        let svc = service();
        let created = svc.create_project(new_project("before")).await.unwrap();

        let updated = svc
            .update_project(
                created.id,
                ProjectUpdate {
                    progress: Some("42".to_string()),
                    ..ProjectUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "before");
        assert_eq!(updated.progress, "42");
        assert!(updated.updated_at >= created.updated_at);

        let err = svc
            .update_project(Uuid::new_v4(), ProjectUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, 404);
    }

    #[tokio::test]
    async fn attach_codebase_then_tree_reports_archive_source() {
        let svc = service();
        let project = svc.create_project(new_project("demo")).await.unwrap();
        let zip = create_zip(vec![
            ("demo/src/App.tsx", b"app".as_slice()),
            ("demo/package.json", b"{}"),
        ]);

        let updated = svc
            .attach_codebase(project.id, "demo.zip", zip)
            .await
            .unwrap();
        assert!(matches!(
            updated.codebase,
            Some(CodebaseBlob::Archive { file_count: 2, .. })
        ));

        let (tree, source) = svc.project_tree(project.id).await.unwrap();
        assert_eq!(source, TreeSource::Archive);
        assert!(tree.iter().any(|n| n.name() == "src"));
    }

    #[tokio::test]
    async fn tree_without_codebase_is_the_labeled_sample() {
        let svc = service();
        let project = svc.create_project(new_project("empty")).await.unwrap();
        let (_, source) = svc.project_tree(project.id).await.unwrap();
        assert_eq!(source, TreeSource::Sample);
    }

    #[tokio::test]
    async fn conversations_round_trip_and_default_to_empty() {
        let svc = service();
        let project = svc.create_project(new_project("chatty")).await.unwrap();
        assert!(svc.conversation_messages(project.id).await.is_empty());

        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: "make the header darker".to_string(),
            timestamp: Utc::now(),
        }];
        svc.record_conversation(project.id, messages).await;
        assert_eq!(svc.conversation_messages(project.id).await.len(), 1);
    }

    #[tokio::test]
    async fn design_inputs_require_a_description() {
        let svc = service();
        let project = svc.create_project(new_project("designed")).await.unwrap();

        let err = svc
            .create_design_input(NewDesignInput {
                project_id: project.id,
                description: "  ".to_string(),
                figma_link: None,
                screenshots: Vec::new(),
                target_components: Vec::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, 400);

        svc.create_design_input(NewDesignInput {
            project_id: project.id,
            description: "darker header".to_string(),
            figma_link: None,
            screenshots: Vec::new(),
            target_components: vec!["Header".to_string()],
        })
        .await
        .unwrap();
        assert_eq!(svc.list_design_inputs(project.id).await.len(), 1);
    }
}
