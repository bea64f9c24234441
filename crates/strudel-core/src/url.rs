//! Base URL resolution.
//!
//! A manifest's `_base` comes either from an explicit URL or from
//! GitHub coordinates pointing at raw.githubusercontent.com.

use crate::error::{GenerateError, Result};

/// Branch used when GitHub coordinates omit one.
pub const DEFAULT_BRANCH: &str = "main";

/// Host serving raw repository content.
pub const GITHUB_RAW_HOST: &str = "https://raw.githubusercontent.com";

/// Raw URL options as collected from the command line.
///
/// Empty strings are treated the same as missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlOptions {
    pub base_url: Option<String>,
    pub github_user: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: Option<String>,
}

/// Where the base URL comes from, once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    /// A full URL used verbatim (plus a trailing slash).
    Explicit(String),
    /// A GitHub repository served through the raw content host.
    GitHub {
        user: String,
        repo: String,
        branch: String,
    },
}

impl UrlOptions {
    /// Options with an explicit base URL.
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self {
            base_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Options pointing at a GitHub repository.
    pub fn with_github(
        user: impl Into<String>,
        repo: impl Into<String>,
        branch: Option<String>,
    ) -> Self {
        Self {
            github_user: Some(user.into()),
            github_repo: Some(repo.into()),
            github_branch: branch,
            ..Self::default()
        }
    }

    /// Picks the URL source. An explicit URL wins over GitHub coordinates.
    pub fn resolve(&self) -> Result<UrlSource> {
        if let Some(url) = non_empty(&self.base_url) {
            return Ok(UrlSource::Explicit(url.to_string()));
        }

        match (non_empty(&self.github_user), non_empty(&self.github_repo)) {
            (Some(user), Some(repo)) => Ok(UrlSource::GitHub {
                user: user.to_string(),
                repo: repo.to_string(),
                branch: non_empty(&self.github_branch)
                    .unwrap_or(DEFAULT_BRANCH)
                    .to_string(),
            }),
            _ => Err(GenerateError::MissingUrlSource),
        }
    }
}

impl UrlSource {
    /// The base URL written to `_base`, always ending in `/`.
    pub fn base_url(&self) -> String {
        match self {
            Self::Explicit(url) if url.ends_with('/') => url.clone(),
            Self::Explicit(url) => format!("{}/", url),
            Self::GitHub { user, repo, branch } => {
                format!("{}/{}/{}/{}/", GITHUB_RAW_HOST, user, repo, branch)
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
