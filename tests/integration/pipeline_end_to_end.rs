use std::sync::Arc;

use serde_json::{json, Value};

use github_activity_digest::github::RepoRef;
use github_activity_digest::model::{IssueBreakdown, PullRequestBreakdown};
use github_activity_digest::ActivityRequest;

use crate::common::{pipeline, FakeApi};

fn widgets_request() -> ActivityRequest {
  let mut r = ActivityRequest::for_repository(RepoRef::parse("acme/widgets").unwrap());
  r.since = Some("2024-06-01T00:00:00Z".parse().unwrap());
  r.until = Some("2024-06-30T23:59:59Z".parse().unwrap());
  r.now = Some("2024-06-15T12:00:00Z".parse().unwrap());
  r
}

fn commit_json(i: usize, message: &str) -> Value {
  json!({
    "sha": format!("{:040}", i),
    "author": { "login": "octo" },
    "commit": {
      "message": message,
      "author": { "name": "Octo Cat", "date": format!("2024-06-03T{:02}:{:02}:00Z", i / 60, i % 60) }
    }
  })
}

#[tokio::test]
async fn acme_widgets_end_to_end() {
  test_support::init_tracing();
  let api = Arc::new(FakeApi::acme_widgets());

  let report = pipeline(Arc::clone(&api)).run(&widgets_request()).await.unwrap();

  assert_eq!(report.scope, "acme/widgets");
  assert_eq!(report.commits[0].pull_request.as_ref().map(|p| p.number), Some(7));
  assert!(report.commits[0].pull_request.as_ref().unwrap().merged);
  assert!(report.commits[1].pull_request.is_none());
  assert!(report.commits[2].pull_request.is_none());

  assert_eq!(report.statistics.total_commits, 3);
  assert_eq!(report.statistics.total_prs, 2);
  assert_eq!(report.statistics.total_issues, 0);
  assert_eq!(
    report.summary.pull_requests,
    PullRequestBreakdown { total: 2, open: 1, merged: 1, closed: 0 }
  );
  assert_eq!(report.summary.issues, IssueBreakdown::default());

  // Only the associated commit carries detail; the PR #7 lookups are shared with PR enrichment.
  let detail = report.commits[0].enrichment.as_ref().unwrap();
  assert_eq!(detail.files.len(), 2);
  assert!(report.commits[1].enrichment.is_none());

  let pr7 = report.pull_requests.iter().find(|p| p.number == 7).unwrap();
  let e = pr7.enrichment.as_ref().unwrap();
  assert_eq!((e.additions, e.deletions), (42, 1));
  assert_eq!(e.metrics.approver.as_deref(), Some("ada"));
  assert_eq!(e.metrics.time_to_merge_seconds, Some(4 * 86_400 + 12 * 3_600));

  // Reviews, files, and comments for #7 and #8; the commit's #7 lookups reuse them.
  assert_eq!(api.secondary(), 6);
}

#[tokio::test]
async fn statistics_cover_commits_beyond_the_enrichment_bound() {
  let mut api = FakeApi::acme_widgets();
  api.commits = Value::Array((0..25).map(|i| commit_json(i, "widgets: follow-up for #7")).collect());
  let api = Arc::new(api);

  let report = pipeline(Arc::clone(&api)).run(&widgets_request()).await.unwrap();

  assert_eq!(report.statistics.total_commits, 25);
  assert!(report.commits.iter().all(|c| c.pull_request.as_ref().map(|p| p.number) == Some(7)));
  assert!(report.commits[..20].iter().all(|c| c.enrichment.is_some()));
  assert!(report.commits[20..].iter().all(|c| c.enrichment.is_none()));
  assert_eq!(report.statistics.top_contributors[0].count, 25);
}

#[tokio::test]
async fn failed_pull_request_enrichment_keeps_the_item() {
  let mut api = FakeApi::acme_widgets();
  api.fail_numbers = vec![7];
  let api = Arc::new(api);

  let report = pipeline(Arc::clone(&api)).run(&widgets_request()).await.unwrap();

  let numbers: Vec<u64> = report.pull_requests.iter().map(|p| p.number).collect();
  assert_eq!(numbers, vec![7, 8]);
  assert!(report.pull_requests[0].enrichment.is_none());
  assert!(report.pull_requests[1].enrichment.is_some());
  // The commit still points at #7; only its detail is missing.
  assert_eq!(report.commits[0].pull_request.as_ref().map(|p| p.number), Some(7));
  assert!(report.commits[0].enrichment.is_none());
  assert_eq!(report.summary.pull_requests.total, 2);
}

#[tokio::test]
async fn contributor_without_login_is_named_by_git_author() {
  let api = Arc::new(FakeApi::acme_widgets());
  let report = pipeline(api).run(&widgets_request()).await.unwrap();

  let names: Vec<&str> = report.statistics.top_contributors.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, vec!["octo", "Ada Lovelace"]);
  assert!(!names.contains(&"Unknown"));
}

#[tokio::test]
async fn issues_are_post_filtered_and_enriched() {
  let mut api = FakeApi::acme_widgets();
  api.issues = test_support::read_fixture_json("acme_widgets/issues.json");
  api.issue_comments = test_support::read_fixture_json("acme_widgets/issue_comments.json");
  let api = Arc::new(api);

  let report = pipeline(api).run(&widgets_request()).await.unwrap();

  // #8 is a pull request and #3 was created before the window.
  let numbers: Vec<u64> = report.issues.iter().map(|i| i.number).collect();
  assert_eq!(numbers, vec![11]);
  let e = report.issues[0].enrichment.as_ref().unwrap();
  assert_eq!(e.comments.len(), 1);
  assert_eq!(e.comment_count, 4);
  assert_eq!(report.statistics.top_labels[0].name, "feature");
}

#[tokio::test]
async fn invalid_input_fails_before_any_call() {
  let api = Arc::new(FakeApi::acme_widgets());
  let p = pipeline(Arc::clone(&api));

  let err = p.run(&ActivityRequest::for_user("")).await.unwrap_err();
  assert!(err.to_string().contains("username is required"));

  let mut r = widgets_request();
  r.limit = 0;
  assert!(p.run(&r).await.is_err());

  assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn primary_failure_is_wrapped_and_fatal() {
  let mut api = FakeApi::acme_widgets();
  api.fail_primary = true;
  let api = Arc::new(api);

  let err = pipeline(Arc::clone(&api)).run(&widgets_request()).await.unwrap_err();
  let rendered = format!("{:#}", err);
  assert!(rendered.starts_with("failed to fetch repository data: "), "{}", rendered);
  assert!(rendered.contains("503"));
  assert_eq!(api.secondary(), 0);
}

#[tokio::test]
async fn reviews_off_skips_enrichment() {
  let api = Arc::new(FakeApi::acme_widgets());
  let mut r = widgets_request();
  r.include_reviews = false;

  let report = pipeline(Arc::clone(&api)).run(&r).await.unwrap();
  assert!(report.pull_requests.iter().all(|p| p.enrichment.is_none()));
  assert!(report.commits.iter().all(|c| c.enrichment.is_none()));
  assert_eq!(report.commits[0].pull_request.as_ref().map(|p| p.number), Some(7));
  assert_eq!(api.secondary(), 0);
}

#[tokio::test]
async fn excluded_kinds_are_not_fetched() {
  let api = Arc::new(FakeApi::acme_widgets());
  let mut r = widgets_request();
  r.include_pull_requests = false;
  r.include_issues = false;

  let report = pipeline(Arc::clone(&api)).run(&r).await.unwrap();
  assert!(report.pull_requests.is_empty());
  assert!(report.commits.iter().all(|c| c.pull_request.is_none()));
  assert_eq!(api.primary_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cross_repository_mode_uses_item_repositories() {
  let mut api = FakeApi::default();
  api.search_issues = test_support::read_fixture_json("acme_widgets/search_issues.json");
  api.reviews = test_support::read_fixture_json("acme_widgets/reviews.json");
  let api = Arc::new(api);

  let mut r = ActivityRequest::for_user("octo");
  r.now = Some("2024-06-15T00:00:00Z".parse().unwrap());
  let report = pipeline(Arc::clone(&api)).run(&r).await.unwrap();

  assert_eq!(report.scope, "user:octo");
  assert_eq!(report.pull_requests.len(), 1);
  assert_eq!(report.pull_requests[0].repository.as_deref(), Some("acme/gadgets"));
  assert!(report.pull_requests[0].enrichment.is_some());
  assert_eq!(report.issues.len(), 1);
  assert_eq!(report.issues[0].number, 5);
  assert_eq!(report.summary.pull_requests.merged, 1);

  let repos: Vec<&str> = report.summary.top_repositories.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(repos, vec!["acme/gadgets", "octo/site"]);
}
