use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ServiceResult;

/// Processing status reported by the dubbing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Dubbing,
    Dubbed,
    #[serde(other)]
    Other,
}

impl ProjectStatus {
    /// Only a finished dub can be watched.
    pub fn is_ready(&self) -> bool {
        *self == ProjectStatus::Dubbed
    }
}

/// Remote metadata for one dubbing project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub target_languages: Vec<String>,
}

impl ProjectMetadata {
    pub fn from_json(json: &str) -> ServiceResult<ProjectMetadata> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load project metadata from a JSON file at the given path.
    pub fn load_from_file(path: &Path) -> ServiceResult<ProjectMetadata> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_dubbed_project() {
        let meta = ProjectMetadata::from_json(
            r#"{"id":"p1","status":"dubbed","target_languages":["fr","es"]}"#,
        )
        .unwrap();
        assert_eq!(meta.id, "p1");
        assert!(meta.status.is_ready());
        assert_eq!(meta.target_languages, vec!["fr", "es"]);
    }

    #[test]
    fn test_unknown_status_is_not_ready() {
        let meta = ProjectMetadata::from_json(r#"{"id":"p1","status":"uploading"}"#).unwrap();
        assert_eq!(meta.status, ProjectStatus::Other);
        assert!(!meta.status.is_ready());
        assert!(meta.target_languages.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id":"p9","status":"dubbing","target_languages":["de"]}}"#).unwrap();
        let meta = ProjectMetadata::load_from_file(file.path()).unwrap();
        assert_eq!(meta.status, ProjectStatus::Dubbing);
        assert_eq!(meta.target_languages, vec!["de"]);
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = ProjectMetadata::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::ServiceError::Decode(_)));
    }
}
