pub mod conversations;
pub mod design_inputs;
pub mod projects;

pub use conversations::{ConversationRepository, InMemoryConversationRepository};
pub use design_inputs::{DesignInputRepository, InMemoryDesignInputRepository};
pub use projects::{InMemoryProjectRepository, ProjectRepository};
