//! Dubbing service client: stream/audio URL layout and project metadata fetch.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};
use crate::types::project::ProjectMetadata;

/// Audio key of the original-language track.
pub const ORIGINAL_TRACK: &str = "raw";

const LOCAL_SCHEME: &str = "file://";

/// Resolves stream and audio locators for a project.
///
/// HTTP bases use `{base}/projects/{id}/stream` and
/// `{base}/projects/{id}/audio/{lang}`. A `file://` base points at a local
/// directory laid out as `{dir}/{id}/stream.mp4` and `{dir}/{id}/audio/{lang}.ogg`.
#[derive(Debug, Clone, PartialEq)]
pub struct DubbingUrls {
    base: String,
}

impl DubbingUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn local_root(&self) -> Option<PathBuf> {
        self.base.strip_prefix(LOCAL_SCHEME).map(PathBuf::from)
    }

    pub fn stream_url(&self, id: &str) -> String {
        if self.local_root().is_some() {
            format!("{}/{}/stream.mp4", self.base, id)
        } else {
            format!("{}/projects/{}/stream", self.base, id)
        }
    }

    pub fn audio_url(&self, id: &str, language: &str) -> String {
        if self.local_root().is_some() {
            format!("{}/{}/audio/{}.ogg", self.base, id, language)
        } else {
            format!("{}/projects/{}/audio/{}", self.base, id, language)
        }
    }
}

/// Fetches project metadata by id.
pub trait ProjectClient: Send {
    fn fetch_project(&self, id: &str) -> ServiceResult<ProjectMetadata>;
}

pub struct HttpProjectClient {
    base: String,
    agent: ureq::Agent,
}

impl HttpProjectClient {
    pub fn new(base: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl ProjectClient for HttpProjectClient {
    fn fetch_project(&self, id: &str) -> ServiceResult<ProjectMetadata> {
        let url = format!("{}/projects/{}", self.base, id);
        log::debug!("Fetching project metadata from {}", url);
        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Err(ServiceError::NotFound(id.to_string())),
            Err(ureq::Error::Status(code, _)) => {
                return Err(ServiceError::Http(format!("{} returned status {}", url, code)));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ServiceError::Http(transport.to_string()));
            }
        };
        let body = response.into_string()?;
        ProjectMetadata::from_json(&body)
    }
}

/// Reads `{dir}/{id}/project.json` from a local project directory.
pub struct LocalProjectClient {
    root: PathBuf,
}

impl LocalProjectClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProjectClient for LocalProjectClient {
    fn fetch_project(&self, id: &str) -> ServiceResult<ProjectMetadata> {
        let path = self.root.join(id).join("project.json");
        if !path.exists() {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        ProjectMetadata::load_from_file(&path)
    }
}

/// Pick the client matching the URL scheme of `urls`.
pub fn client_for(urls: &DubbingUrls) -> Box<dyn ProjectClient> {
    match urls.local_root() {
        Some(root) => Box::new(LocalProjectClient::new(root)),
        None => Box::new(HttpProjectClient::new(urls.base())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::project::ProjectStatus;

    #[test]
    fn test_http_layout() {
        let urls = DubbingUrls::new("https://dub.example.com/api/");
        assert_eq!(
            urls.stream_url("p1"),
            "https://dub.example.com/api/projects/p1/stream"
        );
        assert_eq!(
            urls.audio_url("p1", ORIGINAL_TRACK),
            "https://dub.example.com/api/projects/p1/audio/raw"
        );
        assert_eq!(
            urls.audio_url("p1", "fr"),
            "https://dub.example.com/api/projects/p1/audio/fr"
        );
    }

    #[test]
    fn test_local_layout() {
        let urls = DubbingUrls::new("file:///srv/dubs");
        assert_eq!(urls.stream_url("p1"), "file:///srv/dubs/p1/stream.mp4");
        assert_eq!(urls.audio_url("p1", "es"), "file:///srv/dubs/p1/audio/es.ogg");
    }

    #[test]
    fn test_local_client_reads_project_json() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("p1");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("project.json"),
            r#"{"id":"p1","status":"dubbed","target_languages":["fr"]}"#,
        )
        .unwrap();

        let client = LocalProjectClient::new(dir.path());
        let meta = client.fetch_project("p1").unwrap();
        assert_eq!(meta.status, ProjectStatus::Dubbed);

        let missing = client.fetch_project("nope").unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        assert!(!ServiceError::NotFound("p".into()).is_retryable());
        assert!(ServiceError::Http("timeout".into()).is_retryable());
    }
}
