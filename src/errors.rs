//! Typed error hierarchy for the taskboard.
//!
//! The classification core (`timeline`, `phase`, `attention`, `question`) is
//! total and never fails. Errors only come from the surfaces around it:
//! config, reference parsing and the GitHub collaborator.

use thiserror::Error;

/// Errors from the configuration layer and the GitHub collaborator.
#[derive(Debug, Error)]
pub enum TaskboardError {
    #[error("Invalid repository '{0}': expected owner/repo")]
    InvalidRepo(String),

    #[error("Invalid conversation reference '{0}': expected owner/repo#number")]
    InvalidConversationRef(String),

    #[error("No GitHub token configured. Set GITHUB_TOKEN or [github] token in taskboard.toml")]
    MissingToken,

    #[error("Token does not look like a GitHub token (expected a ghp_/github_pat_/gho_ prefix)")]
    InvalidToken,

    #[error("Failed to read config file at {path}: {source}")]
    ConfigReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ConfigParseFailed(#[source] toml::de::Error),

    #[error("GitHub API error ({status}) for {endpoint}")]
    GitHubStatus { status: u16, endpoint: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_repo_carries_input() {
        let err = TaskboardError::InvalidRepo("just-a-name".to_string());
        assert!(err.to_string().contains("just-a-name"));
        assert!(err.to_string().contains("owner/repo"));
    }

    #[test]
    fn config_read_failed_carries_path() {
        use std::path::PathBuf;
        let path = PathBuf::from("/project/.taskboard/taskboard.toml");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = TaskboardError::ConfigReadFailed {
            path: path.clone(),
            source: io_err,
        };
        match &err {
            TaskboardError::ConfigReadFailed { path: p, source: s } => {
                assert_eq!(p, &path);
                assert_eq!(s.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected ConfigReadFailed"),
        }
    }

    #[test]
    fn github_status_carries_status_and_endpoint() {
        let err = TaskboardError::GitHubStatus {
            status: 404,
            endpoint: "repos/acme/widgets/issues/7".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("acme/widgets"));
    }

    #[test]
    fn converts_from_anyhow() {
        let err: TaskboardError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TaskboardError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn implements_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&TaskboardError::MissingToken);
        assert_std_error(&TaskboardError::InvalidToken);
    }
}
