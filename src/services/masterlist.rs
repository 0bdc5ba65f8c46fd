//! Masterlist source migration.
//!
//! LOOT used to clone masterlists from Git repositories and stored a repository URL and
//! branch per game. Current versions download a single file, so the stored settings are
//! rewritten into one source: either the path of a masterlist in a local checkout or a
//! `raw.githubusercontent.com` URL. Sources written by newer versions only need their
//! branch bumped if they still point at an old default branch.

use camino::Utf8Path;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use thiserror::Error;

use crate::diagnostics::{DiagnosticSink, Severity};
use crate::models::{
    DEFAULT_MASTERLIST_BRANCH, GameId, MASTERLIST_FILENAME, OFFICIAL_MASTERLIST_REPOS,
    OLD_DEFAULT_BRANCHES, default_masterlist_url, facts, masterlist_url,
};

/// A stored repository URL that is neither a local checkout nor a GitHub repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Cannot migrate masterlist repository settings as the URL {url} does not point to a repository on GitHub."
)]
pub struct UnmigratableSource {
    pub url: String,
}

/// Repository URL rewrite for a game that was split into its own repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRedirect {
    pub id: GameId,
    pub from: String,
    pub to: String,
}

/// Rewrites stored masterlist settings into a canonical source.
///
/// # Fields
///
/// - `github_repo_url`: Matches `https://github.com/<owner>/<repo>` with an optional
///   `.git` suffix and trailing slash, case-insensitively. Captures owner and repo.
/// - `redirects`: VR games whose stored URL still points at the non-VR repository.
#[derive(Debug, Clone)]
pub struct MasterlistMigrator {
    github_repo_url: Regex,
    default_branch: String,
    old_default_branches: Vec<String>,
    official_repositories: Vec<String>,
    redirects: Vec<RepositoryRedirect>,
}

impl MasterlistMigrator {
    pub fn new() -> Self {
        // VR repositories were introduced in LOOT v0.17.0.
        let redirects = [(GameId::Tes5vr, GameId::Tes5se), (GameId::Fo4vr, GameId::Fo4)]
            .into_iter()
            .filter_map(|(vr, base)| {
                Some(RepositoryRedirect {
                    id: vr,
                    from: facts(base).legacy_repository_url?.to_string(),
                    to: facts(vr).legacy_repository_url?.to_string(),
                })
            })
            .collect();

        Self {
            github_repo_url: Regex::new(r"(?i)^https://github\.com/([^/]+)/([^/]+?)(?:\.git)?/?$")
                .expect("Invalid GitHub repository regex"),
            default_branch: DEFAULT_MASTERLIST_BRANCH.to_string(),
            old_default_branches: OLD_DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            official_repositories: OFFICIAL_MASTERLIST_REPOS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            redirects,
        }
    }

    /// Move `branch` to the current default if it was an old default.
    pub fn migrate_branch(&self, branch: &str, sink: &dyn DiagnosticSink) -> String {
        if self.old_default_branches.iter().any(|b| b == branch) {
            sink.emit(
                Severity::Info,
                &format!(
                    "Updating masterlist repository branch from {} to {}",
                    branch, self.default_branch
                ),
            );
            return self.default_branch.clone();
        }

        branch.to_string()
    }

    /// Apply the repository redirect for `id`, if `url` matches it.
    pub fn redirect_repository(&self, id: GameId, url: &str, sink: &dyn DiagnosticSink) -> String {
        for redirect in &self.redirects {
            if redirect.id == id && redirect.from == url {
                sink.emit(
                    Severity::Info,
                    &format!(
                        "Updating masterlist repository URL from {} to {}",
                        url, redirect.to
                    ),
                );
                return redirect.to.clone();
            }
        }

        url.to_string()
    }

    /// Convert a stored repository URL and branch into a masterlist source.
    ///
    /// `url` may be a local Git checkout, in which case the returned source is the path
    /// of the masterlist inside it. A checkout on a different branch is still accepted,
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`UnmigratableSource`] (after emitting it as a warning) if `url` is
    /// neither a local checkout nor a GitHub repository URL.
    pub fn migrate_repo_settings(
        &self,
        id: GameId,
        url: &str,
        branch: &str,
        sink: &dyn DiagnosticSink,
    ) -> Result<String, UnmigratableSource> {
        let branch = self.migrate_branch(branch, sink);
        let url = self.redirect_repository(id, url, sink);

        if is_local_repository(&url, MASTERLIST_FILENAME) {
            let repo_path = Utf8Path::new(&url);
            if !is_branch_checked_out(repo_path, &branch) {
                sink.emit(
                    Severity::Warning,
                    &format!(
                        "The URL {url} is a local Git repository path but the configured branch \
                         {branch} is not checked out. The path will be used as the masterlist \
                         source, but there may be unexpected differences in the loaded metadata \
                         if the {branch} branch is not manually checked out before the next time \
                         the masterlist is updated."
                    ),
                );
            }

            return Ok(repo_path.join(MASTERLIST_FILENAME).to_string());
        }

        let Some(captures) = self.github_repo_url.captures(&url) else {
            let error = UnmigratableSource { url };
            sink.emit(Severity::Warning, &error.to_string());
            return Err(error);
        };

        Ok(masterlist_url(&captures[1], &captures[2], &branch))
    }

    /// Bump a stored masterlist source off an old default branch.
    ///
    /// Only exact URLs of official masterlists on old default branches are rewritten;
    /// anything else is returned unchanged.
    pub fn migrate_source(&self, source: &str, sink: &dyn DiagnosticSink) -> String {
        for repository in &self.official_repositories {
            for branch in &self.old_default_branches {
                if source == masterlist_url("loot", repository, branch) {
                    let new_source = default_masterlist_url(repository);
                    sink.emit(
                        Severity::Info,
                        &format!(
                            "Migrating masterlist source from {} to {}",
                            source, new_source
                        ),
                    );
                    return new_source;
                }
            }
        }

        source.to_string()
    }
}

impl Default for MasterlistMigrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `location` is a non-bare local Git repository containing `filename` at its root.
///
/// Missing files count as "no"; nothing here returns an error.
pub fn is_local_repository(location: &str, filename: &str) -> bool {
    if location.starts_with("http://") || location.starts_with("https://") {
        return false;
    }

    let location = Utf8Path::new(location);
    if !location.join(filename).is_file() {
        return false;
    }

    location.join(".git").join("HEAD").is_file()
}

/// Whether the checkout at `repo_path` has `branch` checked out, according to `.git/HEAD`.
pub fn is_branch_checked_out(repo_path: &Utf8Path, branch: &str) -> bool {
    let head_path = repo_path.join(".git").join("HEAD");

    let Ok(file) = File::open(&head_path) else {
        return false;
    };

    let mut line = String::new();
    if BufReader::new(file).read_line(&mut line).is_err() {
        return false;
    }

    line.trim_end_matches(['\r', '\n']) == format!("ref: refs/heads/{}", branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MockDiagnosticSink, NullSink};
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    fn local_checkout(branch: &str) -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::write(path.join(MASTERLIST_FILENAME), "globals: []\n").unwrap();
        fs::create_dir(path.join(".git")).unwrap();
        fs::write(
            path.join(".git").join("HEAD"),
            format!("ref: refs/heads/{}\n", branch),
        )
        .unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_github_url_regex_shapes() {
        let migrator = MasterlistMigrator::new();

        for url in [
            "https://github.com/loot/skyrim",
            "https://github.com/loot/skyrim/",
            "https://github.com/loot/skyrim.git",
            "HTTPS://GITHUB.COM/loot/skyrim.GIT",
        ] {
            let captures = migrator.github_repo_url.captures(url).unwrap();
            assert_eq!(&captures[1], "loot");
            assert!(captures[2].eq_ignore_ascii_case("skyrim"), "{}", url);
        }

        assert!(migrator.github_repo_url.captures("https://gitlab.com/loot/skyrim").is_none());
        assert!(migrator.github_repo_url.captures("https://github.com/loot").is_none());
    }

    #[test]
    fn test_old_branch_is_updated() {
        let migrator = MasterlistMigrator::new();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_emit()
            .withf(|severity, message| {
                *severity == Severity::Info && message.contains("from v0.14 to v0.23")
            })
            .times(1)
            .return_const(());

        assert_eq!(migrator.migrate_branch("v0.14", &sink), "v0.23");
    }

    #[test]
    fn test_current_branch_is_untouched() {
        let migrator = MasterlistMigrator::new();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_emit().times(0);

        assert_eq!(migrator.migrate_branch("v0.23", &sink), "v0.23");
        assert_eq!(migrator.migrate_branch("main", &sink), "main");
    }

    #[test]
    fn test_vr_redirects() {
        let migrator = MasterlistMigrator::new();

        assert_eq!(
            migrator.redirect_repository(GameId::Tes5vr, "https://github.com/loot/skyrimse.git", &NullSink),
            "https://github.com/loot/skyrimvr.git"
        );
        assert_eq!(
            migrator.redirect_repository(GameId::Fo4vr, "https://github.com/loot/fallout4.git", &NullSink),
            "https://github.com/loot/fallout4vr.git"
        );
        // Only the VR game is redirected.
        assert_eq!(
            migrator.redirect_repository(GameId::Tes5se, "https://github.com/loot/skyrimse.git", &NullSink),
            "https://github.com/loot/skyrimse.git"
        );
    }

    #[test]
    fn test_migrate_github_repository() {
        let migrator = MasterlistMigrator::new();

        let source = migrator
            .migrate_repo_settings(GameId::Tes5, "https://github.com/loot/skyrim.git", "v0.10", &NullSink)
            .unwrap();
        assert_eq!(
            source,
            "https://raw.githubusercontent.com/loot/skyrim/v0.23/masterlist.yaml"
        );
    }

    #[test]
    fn test_migrate_vr_repository_with_old_branch() {
        let migrator = MasterlistMigrator::new();

        let source = migrator
            .migrate_repo_settings(
                GameId::Tes5vr,
                "https://github.com/loot/skyrimse.git",
                "v0.15",
                &NullSink,
            )
            .unwrap();
        assert_eq!(
            source,
            "https://raw.githubusercontent.com/loot/skyrimvr/v0.23/masterlist.yaml"
        );
    }

    #[test]
    fn test_unrecognised_url_fails_softly() {
        let migrator = MasterlistMigrator::new();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_emit()
            .withf(|severity, message| *severity == Severity::Warning && message.contains("Cannot migrate"))
            .times(1)
            .return_const(());

        let result = migrator.migrate_repo_settings(
            GameId::Fo4,
            "https://gitlab.com/someone/fallout4.git",
            "main",
            &sink,
        );
        assert_eq!(
            result,
            Err(UnmigratableSource {
                url: "https://gitlab.com/someone/fallout4.git".to_string()
            })
        );
    }

    #[test]
    fn test_local_checkout_on_configured_branch() {
        let (_temp_dir, path) = local_checkout("v0.23");
        let migrator = MasterlistMigrator::new();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_emit().times(0);

        let source = migrator
            .migrate_repo_settings(GameId::Tes4, path.as_str(), "v0.23", &sink)
            .unwrap();
        assert_eq!(source, path.join(MASTERLIST_FILENAME).to_string());
    }

    #[test]
    fn test_local_path_without_git_is_not_a_repository() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::write(path.join(MASTERLIST_FILENAME), "").unwrap();

        assert!(!is_local_repository(path.as_str(), MASTERLIST_FILENAME));
    }

    #[test]
    fn test_http_urls_are_never_local() {
        assert!(!is_local_repository("https://github.com/loot/skyrim.git", MASTERLIST_FILENAME));
        assert!(!is_local_repository("http://example.com/repo", MASTERLIST_FILENAME));
    }

    #[test]
    fn test_branch_checked_out() {
        let (_temp_dir, path) = local_checkout("feature/new-groups");

        assert!(is_branch_checked_out(&path, "feature/new-groups"));
        assert!(!is_branch_checked_out(&path, "v0.23"));
        assert!(!is_branch_checked_out(Utf8Path::new("/no/such/repo"), "v0.23"));
    }

    #[test]
    fn test_migrate_source_from_old_branch() {
        let migrator = MasterlistMigrator::new();

        assert_eq!(
            migrator.migrate_source(
                "https://raw.githubusercontent.com/loot/skyrim/v0.14/masterlist.yaml",
                &NullSink
            ),
            "https://raw.githubusercontent.com/loot/skyrim/v0.23/masterlist.yaml"
        );
        assert_eq!(
            migrator.migrate_source(
                "https://raw.githubusercontent.com/loot/enderal/master/masterlist.yaml",
                &NullSink
            ),
            "https://raw.githubusercontent.com/loot/enderal/v0.23/masterlist.yaml"
        );
    }

    #[test]
    fn test_migrate_source_leaves_others_alone() {
        let migrator = MasterlistMigrator::new();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_emit().times(0);

        for source in [
            "https://raw.githubusercontent.com/loot/skyrim/v0.23/masterlist.yaml",
            "https://raw.githubusercontent.com/someone/skyrim/v0.14/masterlist.yaml",
            "https://raw.githubusercontent.com/loot/starfield/v0.18/masterlist.yaml",
            "C:\\masterlists\\skyrim\\masterlist.yaml",
        ] {
            assert_eq!(migrator.migrate_source(source, &sink), source);
        }
    }
}
