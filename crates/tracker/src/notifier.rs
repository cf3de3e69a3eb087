//! Human-review notifications filed as issues.
//!
//! Submissions go through one lock and every successful one is followed by a
//! cooldown, so the tracker sees at most one new issue per cooldown however
//! many subs are in flight.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use subwatch_core::SubIdentifier;

use crate::client::{CreatedIssue, GitHubClient, NewIssue};
use crate::error::{Error, Result};

const SUBNAME_TOKEN: &str = "%subname%";
const POST_LINK_TOKEN: &str = "%post-link%";

/// Which review a sub needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A non-member sub mentions the keyword in its stickied posts.
    Addition,
    /// A member sub's stickied posts changed.
    Removal,
}

impl NotificationKind {
    /// File name of the body template.
    pub const fn template_file(self) -> &'static str {
        match self {
            Self::Addition => "potential-addition.md",
            Self::Removal => "potential-removal.md",
        }
    }

    /// Issue title for a sub.
    pub fn title(self, sub: &SubIdentifier) -> String {
        match self {
            Self::Addition => format!("🤖 possible new johnoliver sub: {sub}"),
            Self::Removal => format!("🤖 possible johnoliver sub removal: {sub}"),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addition => write!(f, "addition"),
            Self::Removal => write!(f, "removal"),
        }
    }
}

/// Where review requests go.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// File one review request. `permalink` is the site-relative link of the
    /// sub's first stickied post, if any. Returns once the request is filed.
    async fn notify(
        &self,
        kind: NotificationKind,
        sub: &SubIdentifier,
        permalink: Option<&str>,
    ) -> Result<()>;
}

/// Substitute every template token.
pub fn render_template(template: &str, sub: &SubIdentifier, post_link: &str) -> String {
    template
        .replace(SUBNAME_TOKEN, sub.as_str())
        .replace(POST_LINK_TOKEN, post_link)
}

/// [`NotificationSink`] that opens issues from Markdown templates.
#[derive(Debug)]
pub struct IssueNotifier {
    client: GitHubClient,
    submit_lock: Mutex<()>,
}

impl IssueNotifier {
    pub fn new(client: GitHubClient) -> Self {
        Self {
            client,
            submit_lock: Mutex::new(()),
        }
    }

    fn template_path(&self, kind: NotificationKind) -> PathBuf {
        self.client.config().templates_dir.join(kind.template_file())
    }

    async fn load_template(&self, kind: NotificationKind) -> Result<String> {
        let path = self.template_path(kind);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::template_unreadable(path, e))
    }

    fn post_link(&self, sub: &SubIdentifier, permalink: Option<&str>) -> String {
        let base = self.client.config().link_base.trim_end_matches('/');
        match permalink {
            Some(permalink) => format!("{base}{permalink}"),
            None => format!("{base}/{sub}"),
        }
    }

    /// Submit until the tracker accepts the issue, then hold the cooldown.
    async fn submit(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        let config = self.client.config();
        let _guard = self.submit_lock.lock().await;
        let mut attempt = 0u64;

        let created = loop {
            attempt = attempt.saturating_add(1);
            match self.client.create_issue(issue).await {
                Ok(created) => break created,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        title = %issue.title,
                        attempt,
                        delay_ms = u64::try_from(config.retry_delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Error creating issue, will retry"
                    );
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        };

        tokio::time::sleep(config.cooldown).await;
        Ok(created)
    }
}

#[async_trait]
impl NotificationSink for IssueNotifier {
    async fn notify(
        &self,
        kind: NotificationKind,
        sub: &SubIdentifier,
        permalink: Option<&str>,
    ) -> Result<()> {
        let template = self.load_template(kind).await?;
        let issue = NewIssue {
            title: kind.title(sub),
            body: render_template(&template, sub, &self.post_link(sub, permalink)),
            labels: self.client.config().labels.clone(),
        };

        let created = self.submit(&issue).await?;
        info!(
            sub = %sub,
            kind = %kind,
            issue = created.number,
            url = created.html_url.as_deref().unwrap_or_default(),
            "Created issue"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::config::TrackerConfig;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn sub(name: &str) -> SubIdentifier {
        match SubIdentifier::parse(name) {
            Ok(id) => id,
            Err(e) => panic!("identifier should parse: {e}"),
        }
    }

    fn templates() -> std::io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("potential-addition.md"),
            "Check %subname%: %post-link%",
        )?;
        std::fs::write(dir.path().join("potential-removal.md"), "Recheck %subname%")?;
        Ok(dir)
    }

    fn notifier(server: &MockServer, templates: &std::path::Path) -> Result<IssueNotifier> {
        let config = TrackerConfig::with_api_base(server.uri())
            .templates_dir(templates)
            .retry_delay(Duration::from_millis(5))
            .cooldown(Duration::ZERO);
        Ok(IssueNotifier::new(GitHubClient::with_config(config)?))
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            NotificationKind::Addition.title(&sub("r/Pics")),
            "🤖 possible new johnoliver sub: r/pics"
        );
        assert_eq!(
            NotificationKind::Removal.title(&sub("r/pics")),
            "🤖 possible johnoliver sub removal: r/pics"
        );
    }

    #[test]
    fn test_render_template_replaces_every_occurrence() {
        let body = render_template(
            "%subname% / %subname% / %post-link%",
            &sub("r/pics"),
            "https://www.reddit.com/r/pics",
        );
        assert_eq!(body, "r/pics / r/pics / https://www.reddit.com/r/pics");
    }

    #[tokio::test]
    async fn test_notify_addition_renders_permalink() -> TestResult {
        let mock_server = MockServer::start().await;
        let dir = templates()?;

        Mock::given(method("POST"))
            .and(path("/repos/username-is-required/reddark-subinfo/issues"))
            .and(body_partial_json(json!({
                "title": "🤖 possible new johnoliver sub: r/pics",
                "body": "Check r/pics: https://www.reddit.com/r/pics/comments/abc/x/"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        notifier(&mock_server, dir.path())?
            .notify(
                NotificationKind::Addition,
                &sub("r/pics"),
                Some("/r/pics/comments/abc/x/"),
            )
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_notify_retries_until_accepted() -> TestResult {
        let mock_server = MockServer::start().await;
        let dir = templates()?;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"body": "Recheck r/funny"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 2})))
            .expect(1)
            .mount(&mock_server)
            .await;

        notifier(&mock_server, dir.path())?
            .notify(NotificationKind::Removal, &sub("r/funny"), None)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal_and_sends_nothing() -> TestResult {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir()?;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 3})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = notifier(&mock_server, dir.path())?
            .notify(NotificationKind::Addition, &sub("r/pics"), None)
            .await;

        assert!(matches!(result, Err(Error::TemplateUnreadable { .. })));
        assert!(result.as_ref().is_err_and(Error::is_fatal));
        Ok(())
    }

    #[tokio::test]
    async fn test_cooldown_spaces_concurrent_submissions() -> TestResult {
        let mock_server = MockServer::start().await;
        let dir = templates()?;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 4})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = TrackerConfig::with_api_base(mock_server.uri())
            .templates_dir(dir.path())
            .cooldown(Duration::from_millis(50));
        let notifier = IssueNotifier::new(GitHubClient::with_config(config)?);
        let (a, b) = (sub("r/a"), sub("r/b"));

        let started = Instant::now();
        let (first, second) = tokio::join!(
            notifier.notify(NotificationKind::Removal, &a, None),
            notifier.notify(NotificationKind::Removal, &b, None),
        );
        first?;
        second?;

        assert!(started.elapsed() >= Duration::from_millis(100));
        Ok(())
    }
}
