use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{path:?} cannot be both a file and a folder")]
pub struct ConflictError {
    pub path: String,
}

/// One entry in the reconstructed hierarchy, in the shape the client's
/// file explorer renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        name: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modified: Option<String>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } => name,
            TreeNode::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Folder { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMeta {
    pub size: Option<u64>,
    pub modified: Option<String>,
}

/// Folds a set of cleaned paths into folder/file nodes.
///
/// Paths are ordered internally before insertion, so the resulting tree is
/// identical no matter how the input iterator happens to be ordered. A name
/// that would have to be both a file and a folder fails with
/// `ConflictError` instead of overwriting either side.
pub fn build_tree<I>(files: I) -> Result<Vec<TreeNode>, ConflictError>
where
    I: IntoIterator<Item = (String, FileMeta)>,
{
    let ordered: BTreeMap<String, FileMeta> = files.into_iter().collect();

    let mut roots: Vec<TreeNode> = Vec::new();
    for (path, meta) in ordered {
        let segments: Vec<&str> = path.split('/').collect();
        let mut children = &mut roots;

        for (i, segment) in segments.iter().enumerate() {
            let conflict = || ConflictError {
                path: segments[..=i].join("/"),
            };

            if i + 1 == segments.len() {
                if children.iter().any(|n| n.name() == *segment) {
                    return Err(conflict());
                }
                children.push(TreeNode::File {
                    name: segment.to_string(),
                    size: meta.size,
                    modified: meta.modified.clone(),
                });
                break;
            }

            let idx = match children.iter().position(|n| n.name() == *segment) {
                Some(idx) if children[idx].is_folder() => idx,
                Some(_) => return Err(conflict()),
                None => {
                    children.push(TreeNode::Folder {
                        name: segment.to_string(),
                        children: Vec::new(),
                    });
                    children.len() - 1
                }
            };
            let TreeNode::Folder { children: next, .. } = &mut children[idx] else {
                return Err(conflict());
            };
            children = next;
        }
    }

    Ok(roots)
}

/// Convenience wrapper for path sets without per-file metadata.
pub fn build_tree_from_paths<I>(paths: I) -> Result<Vec<TreeNode>, ConflictError>
where
    I: IntoIterator<Item = String>,
{
    build_tree(paths.into_iter().map(|p| (p, FileMeta::default())))
}
