use std::path::Path;

pub const IGNORE_FILE: &str = ".gudignore";

/// Ignore predicate loaded from `.gudignore` at the repo root.
///
/// Rules are repo-root-relative with `/` separators. A rule ending in `/`
/// ignores everything under that directory; any other rule matches one
/// path exactly.
#[derive(Debug)]
pub struct Ignore {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl Ignore {
    #[must_use]
    pub fn load(repo_root: &Path) -> Self {
        let mut exact = Vec::new();
        let mut prefixes = Vec::new();

        if let Ok(content) = std::fs::read_to_string(repo_root.join(IGNORE_FILE)) {
            for raw in content.lines() {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                let mut rule = line.replace('\\', "/");
                while rule.starts_with('/') {
                    rule.remove(0);
                }
                if rule.is_empty() {
                    continue;
                }

                if rule.ends_with('/') {
                    prefixes.push(rule);
                } else {
                    exact.push(rule);
                }
            }
        }

        exact.sort_unstable();
        exact.dedup();
        prefixes.sort_unstable();
        prefixes.dedup();

        Self { exact, prefixes }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            exact: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    /// Match a repo-relative path against the rules. A directory rule
    /// `foo/` matches `foo` itself and anything beneath it.
    #[must_use]
    pub fn is_ignored(&self, rel: &str) -> bool {
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() {
            return false;
        }

        if self.exact.binary_search_by(|e| e.as_str().cmp(rel)).is_ok() {
            return true;
        }

        self.prefixes
            .iter()
            .any(|p| rel.starts_with(p.as_str()) || p[..p.len() - 1] == *rel)
    }
}
