//! GitHub-backed item fetcher.
//!
//! Maps the repository's issues and pull requests into [`Item`] records.
//! Issues and pull requests live on separate list endpoints, so one fetched
//! page merges the corresponding page of each; `total_pages` is the larger
//! of the two collections. The REST list payloads do not carry review
//! decisions or per-review summaries, so those fields stay empty here.

use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::IssueState;
use octocrab::params;

use crate::config::Config;
use crate::error::{Result, SpyglassError};
use crate::types::{Item, ItemKind, ItemState, Milestone};

use super::error::classify_github_error;
use super::{FetchedPage, ItemFetcher, Label, RepoSession, User};

/// Fetches items from a GitHub repository.
pub struct GitHubFetcher {
    client: Octocrab,
    session: RepoSession,
}

impl GitHubFetcher {
    /// Create a fetcher from configuration and a repository session.
    pub fn from_config(config: &Config, session: RepoSession) -> Result<Self> {
        let token = config.github_token().ok_or_else(|| {
            SpyglassError::Auth(
                "GitHub token not configured. Set the GITHUB_TOKEN environment variable or add auth.github.token to the config file".to_string(),
            )
        })?;
        Self::new(&token, session)
    }

    /// Create a fetcher with an explicit token.
    pub fn new(token: &str, session: RepoSession) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| SpyglassError::Api(format!("Failed to create GitHub client: {}", e)))?;

        Ok(Self { client, session })
    }

    fn convert_issue(&self, issue: &octocrab::models::issues::Issue) -> Item {
        let state = match issue.state {
            IssueState::Open => ItemState::Open,
            IssueState::Closed => ItemState::Closed,
            _ => ItemState::Closed,
        };

        let milestone = issue
            .milestone
            .as_ref()
            .map(|m| Milestone::new(m.title.clone(), m.state.clone()))
            .unwrap_or_else(|| Milestone::sentinel_for(ItemKind::Issue).clone());

        Item {
            id: issue.number,
            global_id: issue.node_id.clone(),
            title: issue.title.clone(),
            description: Item::description_or_default(issue.body.clone()),
            state,
            state_reason: None,
            kind: ItemKind::Issue,
            created_at: issue.created_at.to_rfc3339(),
            updated_at: issue.updated_at.to_rfc3339(),
            closed_at: issue.closed_at.map(|t| t.to_rfc3339()),
            author: issue.user.login.clone(),
            assignees: issue.assignees.iter().map(|a| a.login.clone()).collect(),
            labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
            milestone,
            is_draft: false,
            review_decision: None,
            reviews: vec![],
        }
    }

    fn convert_pull(&self, pr: &octocrab::models::pulls::PullRequest) -> Item {
        // A merged pull request reports state "closed"; merged_at tells them apart.
        let state = if pr.merged_at.is_some() {
            ItemState::Merged
        } else {
            match pr.state {
                Some(IssueState::Open) => ItemState::Open,
                _ => ItemState::Closed,
            }
        };

        let milestone = pr
            .milestone
            .as_ref()
            .map(|m| Milestone::new(m.title.clone(), m.state.clone()))
            .unwrap_or_else(|| Milestone::sentinel_for(ItemKind::PullRequest).clone());

        Item {
            id: pr.number,
            global_id: pr.node_id.clone().unwrap_or_default(),
            title: pr.title.clone().unwrap_or_default(),
            description: Item::description_or_default(pr.body.clone()),
            state,
            state_reason: None,
            kind: ItemKind::PullRequest,
            created_at: pr.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            updated_at: pr.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            closed_at: pr.closed_at.map(|t| t.to_rfc3339()),
            author: pr
                .user
                .as_ref()
                .map(|u| u.login.clone())
                .unwrap_or_default(),
            assignees: pr
                .assignees
                .as_ref()
                .map(|users| users.iter().map(|u| u.login.clone()).collect())
                .unwrap_or_default(),
            labels: pr
                .labels
                .as_ref()
                .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
                .unwrap_or_default(),
            milestone,
            is_draft: pr.draft.unwrap_or(false),
            review_decision: None,
            reviews: vec![],
        }
    }
}

#[async_trait]
impl ItemFetcher for GitHubFetcher {
    async fn fetch_page(&self, page: u32) -> Result<FetchedPage> {
        let owner = &self.session.repo.owner;
        let repo = &self.session.repo.repo;

        let issues_page = self
            .client
            .issues(owner, repo)
            .list()
            .state(params::State::All)
            .per_page(self.session.page_size)
            .page(page)
            .send()
            .await
            .map_err(|e| classify_github_error(&e))?;

        let pulls_page = self
            .client
            .pulls(owner, repo)
            .list()
            .state(params::State::All)
            .per_page(self.session.page_size)
            .page(page)
            .send()
            .await
            .map_err(|e| classify_github_error(&e))?;

        let total_pages = issues_page
            .number_of_pages()
            .unwrap_or(1)
            .max(pulls_page.number_of_pages().unwrap_or(1))
            .max(1);

        // The issues endpoint also lists pull requests; keep only true issues
        // and take pull requests from the pulls endpoint, which carries the
        // draft flag and merge state.
        let mut items: Vec<Item> = issues_page
            .items
            .iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| self.convert_issue(issue))
            .collect();
        items.extend(pulls_page.items.iter().map(|pr| self.convert_pull(pr)));

        Ok(FetchedPage {
            items,
            is_cached: false,
            total_pages,
        })
    }

    async fn fetch_assignable_users(&self) -> Result<Vec<User>> {
        let route = format!(
            "/repos/{}/{}/assignees",
            self.session.repo.owner, self.session.repo.repo
        );
        let users: Vec<octocrab::models::Author> = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| classify_github_error(&e))?;

        Ok(users
            .into_iter()
            .map(|u| User {
                login: u.login,
                name: None,
            })
            .collect())
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>> {
        let labels = self
            .client
            .issues(&self.session.repo.owner, &self.session.repo.repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await
            .map_err(|e| classify_github_error(&e))?;

        Ok(labels
            .items
            .into_iter()
            .map(|l| Label {
                name: l.name,
                color: Some(l.color),
            })
            .collect())
    }
}
