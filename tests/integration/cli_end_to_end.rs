use predicates::prelude::*;
use serde_json::Value;

const BIN: &str = "github-activity-digest";

fn widgets_cmd() -> assert_cmd::Command {
  let mut cmd = test_support::cmd_bin(BIN);
  cmd
    .env("GHA_TEST_COMMITS_JSON", test_support::read_fixture_text("acme_widgets/commits.json"))
    .env("GHA_TEST_PULLS_JSON", test_support::read_fixture_text("acme_widgets/pulls.json"))
    .env("GHA_TEST_REVIEWS_JSON", test_support::read_fixture_text("acme_widgets/reviews.json"))
    .env("GHA_TEST_FILES_JSON", test_support::read_fixture_text("acme_widgets/files.json"))
    .env("GHA_TEST_ISSUES_JSON", test_support::read_fixture_text("acme_widgets/issues.json"))
    .env("GHA_TEST_ISSUE_COMMENTS_JSON", test_support::read_fixture_text("acme_widgets/issue_comments.json"));
  cmd
}

fn run_json(cmd: &mut assert_cmd::Command) -> Value {
  let out = cmd.output().unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn repo_report_to_stdout() {
  let v = run_json(widgets_cmd().args([
    "--repo",
    "acme/widgets",
    "--since",
    "2024-06-01",
    "--until",
    "2024-06-30",
    "--delay-ms",
    "0",
    "--now-override",
    "2024-06-15T12:00:00Z",
  ]));

  assert_eq!(v["scope"], "acme/widgets");
  assert_eq!(v["generated_at"], "2024-06-15T12:00:00Z");
  assert_eq!(v["commits"][0]["pull_request"]["number"], 7);
  assert_eq!(v["statistics"]["total_commits"], 3);
  assert_eq!(v["statistics"]["total_prs"], 2);
  assert_eq!(v["statistics"]["total_issues"], 1);
  assert_eq!(v["summary"]["pull_requests"]["merged"], 1);
  assert_eq!(v["pull_requests"][0]["enrichment"]["metrics"]["approver"], "ada");
}

#[test]
fn writes_report_to_out_file() {
  let td = test_support::tempdir();
  let path = td.path().join("report.json");

  widgets_cmd()
    .args(["--repo", "acme/widgets", "--delay-ms", "0", "--out"])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let v: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(v["scope"], "acme/widgets");
}

#[test]
fn delay_can_come_from_env() {
  widgets_cmd()
    .env("GITHUB_ACTIVITY_DELAY_MS", "0")
    .args(["--repo", "acme/widgets", "--no-reviews"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"scope\": \"acme/widgets\""));
}

#[test]
fn enrichment_failure_is_not_fatal() {
  let v = run_json(
    widgets_cmd()
      .env("GHA_TEST_FAIL_PULLS", "7")
      .args(["--repo", "acme/widgets", "--delay-ms", "0"]),
  );

  let prs = v["pull_requests"].as_array().unwrap();
  assert_eq!(prs.len(), 2);
  assert!(prs[0].get("enrichment").is_none());
  assert!(prs[1].get("enrichment").is_some());
}

#[test]
fn no_prs_leaves_commits_unassociated() {
  let v = run_json(widgets_cmd().args(["--repo", "acme/widgets", "--delay-ms", "0", "--no-prs", "--no-issues"]));

  assert_eq!(v["pull_requests"], serde_json::json!([]));
  assert!(v["commits"].as_array().unwrap().iter().all(|c| c.get("pull_request").is_none()));
}

#[test]
fn user_mode_reads_search_results() {
  let v = run_json(
    test_support::cmd_bin(BIN)
      .env("GHA_TEST_SEARCH_ISSUES_JSON", test_support::read_fixture_text("acme_widgets/search_issues.json"))
      .args(["--user", "octo", "--delay-ms", "0"]),
  );

  assert_eq!(v["scope"], "user:octo");
  assert_eq!(v["pull_requests"][0]["repository"], "acme/gadgets");
  assert_eq!(v["issues"][0]["number"], 5);
}

#[test]
fn local_checkout_resolves_to_its_github_origin() {
  let checkout = test_support::checkout_with_origin("git@github.com:acme/widgets.git");

  let v = run_json(
    widgets_cmd()
      .args(["--delay-ms", "0", "--no-reviews", "--repo"])
      .arg(checkout.path()),
  );
  assert_eq!(v["scope"], "acme/widgets");
}

#[test]
fn malformed_repository_is_rejected() {
  test_support::cmd_bin(BIN)
    .args(["--repo", "not a repo"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid repository identifier"));
}

#[test]
fn scope_is_required() {
  test_support::cmd_bin(BIN)
    .args(["--since", "2024-06-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Provide one of --repo or --user"));
}

#[test]
fn inverted_window_is_rejected() {
  test_support::cmd_bin(BIN)
    .args(["--repo", "acme/widgets", "--since", "2024-07-01", "--until", "2024-06-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("is after until"));
}
