// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub integration namespace: repository identity, token discovery, API seam, rate-limited client
// role: integration/namespace
// inputs: Repository identifiers (owner/name, GitHub URL, or local checkout path); env GITHUB_TOKEN / GH_TOKEN; optional `gh` CLI
// outputs: RepoRef values, optional token, submodules api/client/convert
// side_effects: Spawns `git` (origin lookup) and `gh` (token fallback) subprocesses
// invariants:
// - RepoRef::resolve validates before any network call
// - Token discovery prefers GITHUB_TOKEN, then GH_TOKEN, then `gh auth token`
// - Origin parser only recognizes GitHub remotes (https or ssh)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod client;
pub mod convert;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::util::run_git;

static RE_SLUG: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9._-]+)$").unwrap());

static RE_REMOTE: Lazy<regex::Regex> = Lazy::new(|| {
  regex::Regex::new(r"^(?:git@github\.com:|ssh://git@github\.com/|https?://github\.com/)([^/\s]+)/([^/\s]+?)(?:\.git)?/?$").unwrap()
});

static RE_LOGIN: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,38})$").unwrap());

/// A GitHub repository as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  /// Parse a strict `owner/name` slug.
  pub fn parse(slug: &str) -> Result<Self> {
    let slug = slug.trim();
    let Some(c) = RE_SLUG.captures(slug) else {
      bail!("invalid repository identifier {:?}: expected owner/name", slug);
    };
    let (owner, name) = (c[1].to_string(), c[2].to_string());

    if name == "." || name == ".." {
      bail!("invalid repository identifier {:?}: expected owner/name", slug);
    }

    Ok(Self { owner, name })
  }

  /// Parse from a GitHub remote URL (https or ssh form).
  pub fn from_remote_url(url: &str) -> Option<Self> {
    let c = RE_REMOTE.captures(url.trim())?;
    Self::parse(&format!("{}/{}", &c[1], &c[2])).ok()
  }

  /// Accepts `owner/name`, a GitHub URL, or a local checkout whose origin is on GitHub.
  pub fn resolve(input: &str) -> Result<Self> {
    if let Some(r) = Self::from_remote_url(input) {
      return Ok(r);
    }

    if let Ok(r) = Self::parse(input) {
      return Ok(r);
    }

    if std::path::Path::new(input).is_dir() {
      return match parse_origin_github(input) {
        Some(r) => Ok(r),
        None => bail!("{:?} is not a checkout with a GitHub origin remote", input),
      };
    }

    bail!("invalid repository identifier {:?}: expected owner/name, a GitHub URL, or a local checkout", input)
  }

  /// Parse the `owner/name` suffix of an API `repository_url`
  /// (e.g. `https://api.github.com/repos/acme/widgets`).
  pub fn from_api_url(url: &str) -> Option<Self> {
    let rest = url.trim_end_matches('/').split("/repos/").nth(1)?;
    Self::parse(rest).ok()
  }

  pub fn slug(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

impl std::fmt::Display for RepoRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Whether `login` is shaped like a GitHub username.
pub fn is_valid_login(login: &str) -> bool {
  RE_LOGIN.is_match(login)
}

/// Read `remote.origin.url` from a local checkout and parse it as a GitHub repository.
pub fn parse_origin_github(repo_dir: &str) -> Option<RepoRef> {
  let url = run_git(repo_dir, &["config", "--get", "remote.origin.url"]).ok()?;
  RepoRef::from_remote_url(&url)
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}
