//! # Provider Interface
//!
//! The uniform contract every provider adapter implements, plus the three
//! concrete adapters (Azure DevOps, GitHub, BitBucket Cloud). Each adapter
//! owns its own HTTP client and authentication scheme; the rest of the core
//! only ever sees [`RepositoryDescriptor`] values and [`ProviderError`].

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use url::Url;

use crate::config::{ProviderConfig, ProviderKind};
use crate::glob;
use crate::repository::RepositoryDescriptor;

const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors an adapter can surface. Mapped into [`crate::error::ErrorKind`] at
/// the resolver boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("authentication with provider '{provider}' failed: {message}")]
    Auth { provider: String, message: String },

    #[error("provider '{provider}' rate-limited the request: {message}")]
    RateLimited { provider: String, message: String },

    #[error("network error contacting provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider '{provider}' returned an unexpected response: {message}")]
    Protocol { provider: String, message: String },

    #[error("organization '{organization}' not found on provider '{provider}'")]
    NotFound {
        provider: String,
        organization: String,
    },
}

/// Three-segment query as handed to an adapter, already validated by the
/// pattern analyzer. Adapters interpret `middle` according to their own
/// hierarchy; each implements the segment mapping its provider model calls
/// for rather than sharing one interpretation.
#[derive(Debug, Clone)]
pub struct ProviderQuery<'a> {
    pub org_segment: &'a str,
    pub middle_segment: &'a str,
    pub repo_segment: &'a str,
}

/// Uniform contract each provider adapter implements.
///
/// Implementors are expected to be cheap to clone (an `Arc` around an
/// HTTP client) since the resolver fans out across an arbitrary number of
/// concurrent calls.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The configured name this adapter instance answers to.
    fn name(&self) -> &str;

    /// List organizations visible to this adapter's credentials. Optional:
    /// providers with a fixed org tied to the base URL may return just that
    /// one entry.
    async fn list_organizations(&self) -> Result<Vec<String>, ProviderError>;

    /// List the "projects" within an organization. Two-level providers
    /// (BitBucket) return the sentinel `["*"]`.
    async fn list_projects(&self, organization: &str) -> Result<Vec<String>, ProviderError>;

    /// List repositories matching `query`, pattern-aware: adapters that can
    /// filter server-side should; those that cannot must fetch broadly and
    /// post-filter with [`glob::matches`].
    async fn list_repositories(
        &self,
        query: &ProviderQuery<'_>,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError>;

    /// Rewrite a bare clone URL to embed this adapter's credentials, so the
    /// Git executor never needs to know about tokens or app passwords
    /// itself. Called once per repository as the adapter builds its
    /// `RepositoryDescriptor` list.
    fn normalize_clone_url(&self, url: &str) -> Result<String, ProviderError>;
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Embed `username`/`password` as URL userinfo so the Git executor can clone
/// over plain HTTPS without ever seeing the credential itself — the clone
/// URL handed to the Git executor already contains it.
fn embed_credentials(
    provider: &str,
    raw_url: &str,
    username: &str,
    password: Option<&str>,
) -> Result<String, ProviderError> {
    let mut parsed = Url::parse(raw_url).map_err(|err| ProviderError::Protocol {
        provider: provider.to_string(),
        message: format!("clone URL '{raw_url}' is not a valid URL: {err}"),
    })?;
    parsed
        .set_username(username)
        .map_err(|_| ProviderError::Protocol {
            provider: provider.to_string(),
            message: format!("clone URL '{raw_url}' cannot carry userinfo"),
        })?;
    if let Some(password) = password {
        parsed
            .set_password(Some(password))
            .map_err(|_| ProviderError::Protocol {
                provider: provider.to_string(),
                message: format!("clone URL '{raw_url}' cannot carry userinfo"),
            })?;
    }
    Ok(parsed.to_string())
}

/// Construct the adapter matching a provider's configured `kind`. The only
/// place a new provider variant needs to be wired in: adding a provider
/// means adding a variant here and to [`ProviderKind`].
pub fn build_adapter(config: &ProviderConfig) -> Box<dyn ProviderAdapter> {
    match config.kind {
        ProviderKind::AzureDevOps => Box::new(AzureDevOpsAdapter::new(config)),
        ProviderKind::GitHub => Box::new(GitHubAdapter::new(config)),
        ProviderKind::Bitbucket => Box::new(BitbucketAdapter::new(config)),
    }
}

// ============================================================================
// Azure DevOps
// ============================================================================

/// Azure DevOps: hierarchy is organization -> project -> repository. The
/// middle segment maps directly onto "project".
pub struct AzureDevOpsAdapter {
    name: String,
    base_url: String,
    user: Option<String>,
    token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AzureListResponse<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzureRepository {
    name: String,
    remote_url: String,
    default_branch: Option<String>,
    is_disabled: Option<bool>,
    project: AzureProjectRef,
}

#[derive(Debug, Deserialize)]
struct AzureProjectRef {
    name: String,
}

impl AzureDevOpsAdapter {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            token: config.secret.expose().to_string(),
            http: build_http_client(),
        }
    }

    fn auth_header(&self) -> String {
        // Azure DevOps PATs are passed as basic auth with an empty or
        // arbitrary username and the PAT as the password.
        let user = self.user.as_deref().unwrap_or("");
        let credentials = format!("{}:{}", user, self.token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
        )
    }

    async fn list_repos_in_project(
        &self,
        organization: &str,
        project: &str,
    ) -> Result<Vec<AzureRepository>, ProviderError> {
        let url = format!(
            "{}/{}/{}/_apis/git/repositories?api-version=7.1",
            self.base_url, organization, project
        );
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                provider: self.name.clone(),
                source,
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth {
                provider: self.name.clone(),
                message: "Azure DevOps rejected the personal access token".to_string(),
            });
        }
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: self.name.clone(),
                message: "Azure DevOps throttled the request".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ProviderError::Protocol {
                provider: self.name.clone(),
                message: format!("unexpected status {}", response.status()),
            });
        }

        let parsed: AzureListResponse<AzureRepository> =
            response.json().await.map_err(|source| ProviderError::Network {
                provider: self.name.clone(),
                source,
            })?;
        Ok(parsed.value)
    }
}

#[async_trait]
impl ProviderAdapter for AzureDevOpsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ProviderError> {
        // Azure DevOps organizations are not enumerable from a project-scoped
        // PAT; the configured organization segment of the query is used
        // directly by list_repositories instead.
        Ok(Vec::new())
    }

    async fn list_projects(&self, organization: &str) -> Result<Vec<String>, ProviderError> {
        let url = format!(
            "{}/{}/_apis/projects?api-version=7.1",
            self.base_url, organization
        );
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                provider: self.name.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(ProviderError::Protocol {
                provider: self.name.clone(),
                message: format!("unexpected status {}", response.status()),
            });
        }
        #[derive(Deserialize)]
        struct ProjectRef {
            name: String,
        }
        let parsed: AzureListResponse<ProjectRef> =
            response.json().await.map_err(|source| ProviderError::Network {
                provider: self.name.clone(),
                source,
            })?;
        Ok(parsed.value.into_iter().map(|p| p.name).collect())
    }

    async fn list_repositories(
        &self,
        query: &ProviderQuery<'_>,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let organization = query.org_segment;
        let projects = if glob::is_glob(query.middle_segment) {
            self.list_projects(organization)
                .await?
                .into_iter()
                .filter(|p| glob::matches(query.middle_segment, p))
                .collect()
        } else {
            vec![query.middle_segment.to_string()]
        };

        let mut out = Vec::new();
        for project in projects {
            let repos = self.list_repos_in_project(organization, &project).await?;
            for repo in repos {
                if repo.is_disabled.unwrap_or(false) {
                    continue;
                }
                if !glob::matches(query.repo_segment, &repo.name) {
                    continue;
                }
                let clone_url = self.normalize_clone_url(&repo.remote_url)?;
                out.push(RepositoryDescriptor {
                    organization: organization.to_string(),
                    project: Some(repo.project.name),
                    name: repo.name,
                    clone_url,
                    default_branch: repo.default_branch,
                    is_private: true,
                    description: None,
                    provider_name: self.name.clone(),
                    metadata: Default::default(),
                });
            }
        }
        Ok(out)
    }

    fn normalize_clone_url(&self, url: &str) -> Result<String, ProviderError> {
        // Azure DevOps is PAT-only; any non-empty username works, the PAT
        // itself is the password.
        embed_credentials(&self.name, url, "pat", Some(&self.token))
    }
}

// ============================================================================
// GitHub
// ============================================================================

/// GitHub: hierarchy is organization/user -> repository (no project level).
/// The middle segment has no GitHub meaning and is ignored, mirroring
/// BitBucket's two-level behavior.
pub struct GitHubAdapter {
    name: String,
    base_url: String,
    token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubRepository {
    name: String,
    clone_url: String,
    default_branch: Option<String>,
    private: bool,
    description: Option<String>,
    archived: bool,
}

impl GitHubAdapter {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: if config.base_url.is_empty() {
                "https://api.github.com".to_string()
            } else {
                config.base_url.trim_end_matches('/').to_string()
            },
            token: config.secret.expose().to_string(),
            http: build_http_client(),
        }
    }

    fn parse_link_header(header: &str) -> Option<String> {
        // GitHub paginates via RFC 5988 Link headers: entries of the form
        // `<url>; rel="next"`, comma-separated.
        header.split(',').find_map(|segment| {
            let mut parts = segment.split(';');
            let url_part = parts.next()?.trim();
            let rel_is_next = parts.any(|p| p.trim() == "rel=\"next\"");
            if !rel_is_next {
                return None;
            }
            url_part
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .map(|s| s.to_string())
        })
    }

    /// Fetches every page of repositories under one concrete listing path
    /// (`/orgs/{owner}/repos` or `/users/{owner}/repos`). A 404 on the first
    /// page is reported via `Ok(None)` rather than `NotFound` so the caller
    /// can try the other owner kind before giving up.
    async fn fetch_repos_at(&self, listing_path: &str) -> Result<Option<Vec<GitHubRepository>>, ProviderError> {
        let mut url = format!("{}{}?per_page=100", self.base_url, listing_path);
        let mut out = Vec::new();

        loop {
            let response = self
                .http
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("User-Agent", "mgit")
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(|source| ProviderError::Network {
                    provider: self.name.clone(),
                    source,
                })?;

            if response.status() == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ProviderError::Auth {
                    provider: self.name.clone(),
                    message: "GitHub rejected the access token".to_string(),
                });
            }
            if response.status() == reqwest::StatusCode::FORBIDDEN {
                return Err(ProviderError::RateLimited {
                    provider: self.name.clone(),
                    message: "GitHub rate limit exceeded".to_string(),
                });
            }
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(ProviderError::Protocol {
                    provider: self.name.clone(),
                    message: format!("unexpected status {}", response.status()),
                });
            }

            let next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(Self::parse_link_header);

            let page: Vec<GitHubRepository> =
                response.json().await.map_err(|source| ProviderError::Network {
                    provider: self.name.clone(),
                    source,
                })?;
            out.extend(page);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(Some(out))
    }

    /// An owner may be a GitHub organization or a plain user account;
    /// `/orgs/{owner}/repos` 404s for the latter, so a miss there falls back
    /// to `/users/{owner}/repos` before the owner is reported not found.
    async fn list_org_repos(&self, organization: &str) -> Result<Vec<GitHubRepository>, ProviderError> {
        if let Some(repos) = self
            .fetch_repos_at(&format!("/orgs/{organization}/repos"))
            .await?
        {
            return Ok(repos);
        }
        if let Some(repos) = self
            .fetch_repos_at(&format!("/users/{organization}/repos"))
            .await?
        {
            return Ok(repos);
        }
        Err(ProviderError::NotFound {
            provider: self.name.clone(),
            organization: organization.to_string(),
        })
    }
}

#[async_trait]
impl ProviderAdapter for GitHubAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    async fn list_projects(&self, _organization: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["*".to_string()])
    }

    async fn list_repositories(
        &self,
        query: &ProviderQuery<'_>,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let organization = query.org_segment;
        let repos = self.list_org_repos(organization).await?;

        let mut out = Vec::new();
        for repo in repos
            .into_iter()
            .filter(|r| !r.archived)
            .filter(|r| glob::matches(query.repo_segment, &r.name))
        {
            let clone_url = self.normalize_clone_url(&repo.clone_url)?;
            out.push(RepositoryDescriptor {
                organization: organization.to_string(),
                project: None,
                name: repo.name,
                clone_url,
                default_branch: repo.default_branch,
                is_private: repo.private,
                description: repo.description,
                provider_name: self.name.clone(),
                metadata: Default::default(),
            });
        }
        Ok(out)
    }

    fn normalize_clone_url(&self, url: &str) -> Result<String, ProviderError> {
        // GitHub accepts a PAT as the userinfo username with no password.
        embed_credentials(&self.name, url, &self.token, None)
    }
}

// ============================================================================
// BitBucket Cloud
// ============================================================================

/// BitBucket Cloud: hierarchy is workspace -> repository; the middle segment
/// is ignored. Teams migrating from a three-level provider may find this
/// surprising at first, since the segment is accepted but has no effect.
pub struct BitbucketAdapter {
    name: String,
    base_url: String,
    user: String,
    app_password: String,
    workspace_override: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct BitbucketPage<T> {
    values: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepository {
    name: String,
    slug: String,
    is_private: bool,
    description: Option<String>,
    mainbranch: Option<BitbucketBranchRef>,
    links: BitbucketLinks,
}

#[derive(Debug, Deserialize)]
struct BitbucketBranchRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketLinks {
    clone: Vec<BitbucketCloneLink>,
}

#[derive(Debug, Deserialize)]
struct BitbucketCloneLink {
    name: String,
    href: String,
}

impl BitbucketAdapter {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: if config.base_url.is_empty() {
                "https://api.bitbucket.org/2.0".to_string()
            } else {
                config.base_url.trim_end_matches('/').to_string()
            },
            user: config.user.clone().unwrap_or_default(),
            app_password: config.secret.expose().to_string(),
            workspace_override: config.workspace.clone(),
            http: build_http_client(),
        }
    }

    fn https_clone_url(repo: &BitbucketRepository) -> Option<String> {
        repo.links
            .clone
            .iter()
            .find(|l| l.name == "https")
            .map(|l| l.href.clone())
    }
}

#[async_trait]
impl ProviderAdapter for BitbucketAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.workspace_override.clone().into_iter().collect())
    }

    async fn list_projects(&self, _organization: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["*".to_string()])
    }

    async fn list_repositories(
        &self,
        query: &ProviderQuery<'_>,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let workspace = self
            .workspace_override
            .clone()
            .unwrap_or_else(|| query.org_segment.to_string());

        let mut url = format!("{}/repositories/{}?pagelen=100", self.base_url, workspace);
        let mut out = Vec::new();

        loop {
            let response = self
                .http
                .get(&url)
                .basic_auth(&self.user, Some(&self.app_password))
                .send()
                .await
                .map_err(|source| ProviderError::Network {
                    provider: self.name.clone(),
                    source,
                })?;

            if response.status() == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ProviderError::Auth {
                    provider: self.name.clone(),
                    message: "BitBucket rejected the app password".to_string(),
                });
            }
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound {
                    provider: self.name.clone(),
                    organization: workspace.clone(),
                });
            }
            if !response.status().is_success() {
                return Err(ProviderError::Protocol {
                    provider: self.name.clone(),
                    message: format!("unexpected status {}", response.status()),
                });
            }

            let page: BitbucketPage<BitbucketRepository> =
                response.json().await.map_err(|source| ProviderError::Network {
                    provider: self.name.clone(),
                    source,
                })?;

            for repo in page.values {
                if !glob::matches(query.repo_segment, &repo.slug)
                    && !glob::matches(query.repo_segment, &repo.name)
                {
                    continue;
                }
                let Some(raw_clone_url) = Self::https_clone_url(&repo) else {
                    continue;
                };
                let clone_url = self.normalize_clone_url(&raw_clone_url)?;
                out.push(RepositoryDescriptor {
                    organization: workspace.clone(),
                    project: None,
                    name: repo.name,
                    clone_url,
                    default_branch: repo.mainbranch.map(|b| b.name),
                    is_private: repo.is_private,
                    description: repo.description,
                    provider_name: self.name.clone(),
                    metadata: Default::default(),
                });
            }

            match page.next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(out)
    }

    fn normalize_clone_url(&self, url: &str) -> Result<String, ProviderError> {
        embed_credentials(&self.name, url, &self.user, Some(&self.app_password))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
