use serde::Serialize;

use super::ServiceError;
use crate::domain::archive;
use crate::domain::heuristic::{self, ScanOptions};
use crate::domain::tree::{build_tree, build_tree_from_paths, FileMeta, TreeNode};
use crate::models::CodebaseBlob;
use crate::sample;
use crate::settings::Settings;

/// Which pipeline produced a reconstructed tree. Consumers must be able to
/// tell real structure from heuristic guesses and from the demo
/// placeholder; only an *empty* heuristic result falls back to the sample,
/// extraction failures never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeSource {
    Archive,
    Heuristic,
    Sample,
}

#[derive(Clone)]
pub struct CodebaseService {
    max_decompressed_bytes: u64,
    scan_options: ScanOptions,
}

impl CodebaseService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            max_decompressed_bytes: settings.upload.max_decompressed_bytes,
            scan_options: ScanOptions {
                wrapper_dirs: settings.tree.wrapper_dirs.clone(),
                default_import_extension: settings.tree.default_import_extension.clone(),
            },
        }
    }

    /// Turns an upload into a codebase blob. Zip uploads are unpacked on a
    /// blocking task (extraction is CPU-bound); anything else is kept as
    /// opaque text for the heuristic scan to chew on later.
    pub async fn ingest(&self, file_name: &str, bytes: Vec<u8>) -> Result<CodebaseBlob, ServiceError> {
        if file_name.to_lowercase().ends_with(".zip") {
            let cap = self.max_decompressed_bytes;
            let files = tokio::task::spawn_blocking(move || archive::extract_file_map(&bytes, cap))
                .await
                .map_err(|e| ServiceError::new(500, format!("extraction task failed: {}", e)))??;

            tracing::debug!(file_count = files.len(), "extracted archive upload");
            Ok(CodebaseBlob::Archive {
                name: file_name.to_string(),
                file_count: files.len(),
                hash: archive::hash_file_map(&files),
                files,
            })
        } else {
            Ok(CodebaseBlob::Text {
                raw: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }

    /// Rebuilds the display tree for a stored blob, labeling which pipeline
    /// produced it.
    pub fn reconstruct_tree(
        &self,
        blob: &CodebaseBlob,
    ) -> Result<(Vec<TreeNode>, TreeSource), ServiceError> {
        match blob {
            CodebaseBlob::Archive { files, .. } => {
                let tree = build_tree(files.iter().map(|(path, content)| {
                    (
                        path.clone(),
                        FileMeta {
                            size: Some(content.len() as u64),
                            modified: None,
                        },
                    )
                }))?;
                Ok((tree, TreeSource::Archive))
            }
            CodebaseBlob::Text { raw } => {
                let candidates = heuristic::scan_for_paths(raw, &self.scan_options);
                if candidates.is_empty() {
                    return Ok((sample::sample_tree(), TreeSource::Sample));
                }
                let tree = build_tree_from_paths(candidates)?;
                Ok((tree, TreeSource::Heuristic))
            }
        }
    }

    /// Zips an archive blob back up for the client's download button.
    pub fn package_download(&self, blob: &CodebaseBlob) -> Result<(String, Vec<u8>), ServiceError> {
        match blob {
            CodebaseBlob::Archive { name, files, .. } => {
                let bytes = archive::package_zip(files)
                    .map_err(|e| ServiceError::new(500, format!("failed to package zip: {}", e)))?;
                Ok((name.clone(), bytes))
            }
            CodebaseBlob::Text { .. } => Err(ServiceError::new(
                400,
                "only archive codebases can be downloaded",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn service() -> CodebaseService {
        CodebaseService::new(&Settings::default())
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
    async fn zip_uploads_become_archive_blobs() {
        let zip = create_zip(vec![
            ("demo/src/App.tsx", b"app".as_slice()),
            ("demo/package.json", b"{}"),
        ]);
        let blob = service().ingest("demo.zip", zip).await.unwrap();
        match &blob {
            CodebaseBlob::Archive {
                files, file_count, ..
            } => {
                assert_eq!(*file_count, 2);
                assert!(files.contains_key("src/App.tsx"));
            }
            CodebaseBlob::Text { .. } => panic!("expected an archive blob"),
        }

        let (tree, source) = service().reconstruct_tree(&blob).unwrap();
        assert_eq!(source, TreeSource::Archive);
        assert!(tree.iter().any(|n| n.name() == "src"));
    }

    #[tokio::test]
    async fn corrupt_archives_error_instead_of_faking_data() {
        let err = service()
            .ingest("demo.zip", b"this is not a zip".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.code, 415);
    }

    #[tokio::test]
    async fn text_uploads_stay_opaque_and_reconstruct_heuristically() {
        let text = "import Header from \"./components/Header\"\nsrc/App.tsx\n";
        let blob = service()
            .ingest("notes.txt", text.as_bytes().to_vec())
            .await
            .unwrap();
        let (tree, source) = service().reconstruct_tree(&blob).unwrap();
        assert_eq!(source, TreeSource::Heuristic);
        assert!(tree.iter().any(|n| n.name() == "components"));
    }

    #[tokio::test]
    async fn empty_heuristic_results_fall_back_to_the_labeled_sample() {
        let blob = service()
            .ingest("notes.txt", b"nothing pathlike here".to_vec())
            .await
            .unwrap();
        let (tree, source) = service().reconstruct_tree(&blob).unwrap();
        assert_eq!(source, TreeSource::Sample);
        assert!(!tree.is_empty());
    }

    #[tokio::test]
    async fn download_round_trips_an_archive_blob() {
        let zip = create_zip(vec![("a/deep/file.txt", b"hello".as_slice()), ("b.txt", b"x")]);
        let svc = service();
        let blob = svc.ingest("proj.zip", zip).await.unwrap();
        let (name, bytes) = svc.package_download(&blob).unwrap();
        assert_eq!(name, "proj.zip");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("a/deep/file.txt").is_ok());
    }

    #[tokio::test]
    async fn text_blobs_are_not_downloadable() {
        let svc = service();
        let blob = svc.ingest("notes.txt", b"text".to_vec()).await.unwrap();
        assert_eq!(svc.package_download(&blob).unwrap_err().code, 400);
    }
}
