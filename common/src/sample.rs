//! Demo content installed at startup and the placeholder tree shown when
//! nothing real could be reconstructed.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::tree::{build_tree, FileMeta, TreeNode};
use crate::models::{ChatMessage, ChatRole, Conversation, Project};
use crate::repositories::{ConversationRepository, ProjectRepository};

pub fn sample_project() -> Project {
    let now = Utc::now();
    Project {
        id: Uuid::nil(),
        name: "E-commerce App".to_string(),
        description: Some(
            "A modern e-commerce application with React and Tailwind CSS".to_string(),
        ),
        framework: "Next.js + Tailwind".to_string(),
        progress: "78".to_string(),
        codebase: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_conversation(project_id: Uuid) -> Conversation {
    let now = Utc::now();
    let messages = vec![
        ChatMessage {
            role: ChatRole::Assistant,
            content: "I've analyzed your existing codebase. I see you want to update the \
                      header navigation. I have a few questions to better understand your \
                      requirements:\n\n1. Search Functionality: Should the search include \
                      autocomplete suggestions?\n2. User Avatar: What options should appear \
                      in the dropdown menu?"
                .to_string(),
            timestamp: now - Duration::minutes(5),
        },
        ChatMessage {
            role: ChatRole::User,
            content: "Yes, include autocomplete for search. For the avatar dropdown, add \
                      Profile, Settings, and Logout options."
                .to_string(),
            timestamp: now - Duration::minutes(3),
        },
        ChatMessage {
            role: ChatRole::Assistant,
            content: "Perfect! I'll generate the updated header component with search \
                      autocomplete and user dropdown. Here's a preview of the changes I'll \
                      make to your Header.tsx component."
                .to_string(),
            timestamp: now - Duration::minutes(1),
        },
    ];
    Conversation {
        id: Uuid::new_v4(),
        project_id,
        messages,
        created_at: now,
        updated_at: now,
    }
}

/// The placeholder structure the file explorer falls back to. Callers must
/// label it as sample data; it never stands in for a failed extraction.
pub fn sample_tree() -> Vec<TreeNode> {
    let files = [
        ("src/components/Header.tsx", 2150, "2 mins ago"),
        ("src/components/Navigation.tsx", 1843, "5 mins ago"),
        ("src/components/SearchBar.tsx", 1228, "10 mins ago"),
        ("src/components/UserMenu.tsx", 922, "15 mins ago"),
        ("src/pages/index.tsx", 1536, "1 hour ago"),
        ("src/pages/dashboard.tsx", 3277, "2 hours ago"),
        ("src/pages/profile.tsx", 2867, "1 day ago"),
        ("src/styles/globals.css", 2560, "3 days ago"),
        ("src/styles/components.css", 1945, "2 days ago"),
        ("src/App.tsx", 819, "1 week ago"),
        ("src/main.tsx", 307, "1 week ago"),
        ("public/favicon.ico", 15360, "1 week ago"),
        ("public/logo.svg", 2355, "1 week ago"),
        ("package.json", 1228, "1 week ago"),
        ("tsconfig.json", 512, "1 week ago"),
        ("tailwind.config.js", 307, "1 week ago"),
    ];

    build_tree(files.iter().map(|(path, size, modified)| {
        (
            path.to_string(),
            FileMeta {
                size: Some(*size),
                modified: Some(modified.to_string()),
            },
        )
    }))
    .expect("sample tree is conflict-free")
}

pub async fn seed(
    projects: &dyn ProjectRepository,
    conversations: &dyn ConversationRepository,
) {
    let project = sample_project();
    let conversation = sample_conversation(project.id);
    projects.put(project).await;
    conversations.put(conversation).await;
}
