// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Attach reviews, changed files, comments, line totals, and review metrics to pull requests
// role: enrichment/pull-requests
// inputs: PullRequest (repository from the item or the run)
// outputs: PullRequest with `enrichment` set
// side_effects: Three concurrent calls (reviews, files, comments) through the shared rate limiter
// invariants:
// - Each detail list is capped independently (reviews_per_item, files_per_item, comments_per_item)
// - additions/deletions are summed over the fetched files
// - Reviewers are distinct, in first-seen order; approver is the latest APPROVED reviewer
// errors: Returned to enrich_leading, which isolates them
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};

use super::EnrichmentEngine;
use crate::model::{PullRequest, PullRequestEnrichment, Review, ReviewMetrics};
use crate::util::seconds_between;

impl<'a> EnrichmentEngine<'a> {
  pub async fn enrich_pull_request(&self, pr: PullRequest) -> Result<PullRequest> {
    let repo = self
      .repo_for(pr.repository.as_deref())
      .with_context(|| format!("no repository known for pull request #{}", pr.number))?;

    let (reviews, files, comments) = tokio::try_join!(
      self.client.pull_reviews(&repo, pr.number, self.limits.reviews_per_item),
      self.client.pull_files(&repo, pr.number, self.limits.files_per_item),
      self.client.pull_comments(&repo, pr.number, self.limits.comments_per_item),
    )?;

    let additions = files.iter().map(|f| f.additions).sum();
    let deletions = files.iter().map(|f| f.deletions).sum();
    let metrics = review_metrics(&pr, &reviews);

    Ok(PullRequest {
      enrichment: Some(PullRequestEnrichment {
        reviews,
        files,
        comments,
        additions,
        deletions,
        metrics,
      }),
      ..pr
    })
  }
}

/// Aggregate review counts, reviewers, approver, and review/merge latency.
pub fn review_metrics(pr: &PullRequest, reviews: &[Review]) -> ReviewMetrics {
  let mut approvals = 0usize;
  let mut change_requests = 0usize;
  let mut reviewers: Vec<String> = Vec::new();
  let mut first_review = None;
  let mut latest_approval = None;
  let mut approver = None;

  for r in reviews {
    if let Some(ts) = r.submitted_at {
      if first_review.map(|cur| ts < cur).unwrap_or(true) {
        first_review = Some(ts);
      }
    }

    if r.state.eq_ignore_ascii_case("APPROVED") {
      approvals += 1;
      // Undated approvals still count, but only a dated one can displace a dated one.
      let newer = match (r.submitted_at, latest_approval) {
        (Some(ts), Some(cur)) => ts >= cur,
        (Some(_), None) => true,
        (None, _) => approver.is_none(),
      };
      if newer {
        latest_approval = r.submitted_at.or(latest_approval);
        approver = r.reviewer.clone();
      }
    } else if r.state.eq_ignore_ascii_case("CHANGES_REQUESTED") {
      change_requests += 1;
    }

    if let Some(login) = &r.reviewer {
      if !reviewers.contains(login) {
        reviewers.push(login.clone());
      }
    }
  }

  ReviewMetrics {
    review_count: reviews.len(),
    approval_count: approvals,
    change_request_count: change_requests,
    reviewers,
    approver,
    time_to_first_review_seconds: first_review.map(|ts| seconds_between(pr.created_at, ts)),
    time_to_merge_seconds: pr.merged_at.map(|m| seconds_between(pr.created_at, m)),
  }
}
