// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Attach review and changed-file detail to commits that were associated with a pull request
// role: enrichment/commits
// inputs: EnrichedCommit with optional PullRequestRef
// outputs: EnrichedCommit with `enrichment` set when a PR is associated
// side_effects: Two concurrent calls (reviews, files) through the shared rate limiter
// invariants: Commits without an associated PR (or without a resolvable repository) pass through unchanged
// errors: Returned to enrich_leading, which isolates them
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::debug;

use super::EnrichmentEngine;
use crate::model::{CommitEnrichment, EnrichedCommit};

impl<'a> EnrichmentEngine<'a> {
  pub async fn enrich_commit(&self, commit: EnrichedCommit) -> Result<EnrichedCommit> {
    let Some(pr) = commit.pull_request.as_ref() else {
      return Ok(commit);
    };

    let repo_slug = pr.repository.as_deref().or(commit.commit.repository.as_deref());
    let Some(repo) = self.repo_for(repo_slug) else {
      debug!(sha = %commit.commit.short_sha(), "no repository for commit; skipping detail");
      return Ok(commit);
    };

    let (reviews, files) = tokio::try_join!(
      self.client.pull_reviews(&repo, pr.number, self.limits.reviews_per_item),
      self.client.pull_files(&repo, pr.number, self.limits.files_per_item),
    )?;

    Ok(EnrichedCommit {
      enrichment: Some(CommitEnrichment { reviews, files }),
      ..commit
    })
  }
}
