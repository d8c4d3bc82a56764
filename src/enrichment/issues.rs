// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Attach discussion comments to issues
// role: enrichment/issues
// inputs: Issue (repository from the item or the run)
// outputs: Issue with `enrichment` set
// side_effects: One comments call through the shared rate limiter
// invariants: comment_count prefers the listing's own total over the (capped) fetched length
// errors: Returned to enrich_leading, which isolates them
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};

use super::EnrichmentEngine;
use crate::model::{Issue, IssueEnrichment};

impl<'a> EnrichmentEngine<'a> {
  pub async fn enrich_issue(&self, issue: Issue) -> Result<Issue> {
    let repo = self
      .repo_for(issue.repository.as_deref())
      .with_context(|| format!("no repository known for issue #{}", issue.number))?;

    let comments = self
      .client
      .issue_comments(&repo, issue.number, self.limits.comments_per_item)
      .await?;
    let comment_count = issue.comments_total.unwrap_or(comments.len() as u64);

    Ok(Issue {
      enrichment: Some(IssueEnrichment { comments, comment_count }),
      ..issue
    })
  }
}
