use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ProjectError, ProjectResult};

/// What kind of project the working directory sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectKind {
    /// A standalone package.
    Package,
    /// A monorepo root (`package.json` declares workspaces).
    Monorepo,
    /// A single package inside a monorepo.
    MonorepoPackage,
}

/// Which package manager the project uses, by lockfile presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Unknown,
}

/// Resolved project layout for one gatekeep run.
#[derive(Clone, Debug)]
pub struct ProjectContext {
    pub kind: ProjectKind,
    /// The repository/monorepo root.
    pub project_root: PathBuf,
    /// The specific package being operated on; `None` at a monorepo root.
    pub package_root: Option<PathBuf>,
    /// The monorepo's packages directory, if any.
    pub packages_path: Option<PathBuf>,
    /// Cache directory for incremental tool state.
    pub cache_path: PathBuf,
}

impl ProjectContext {
    /// Resolve the context for the given working directory.
    ///
    /// The directory must contain a `package.json`. If it declares
    /// workspaces, this is a monorepo root; otherwise, if some ancestor's
    /// `package.json` declares workspaces, this is a package inside that
    /// monorepo; otherwise it is a standalone package.
    pub fn describe(cwd: &Path) -> ProjectResult<Self> {
        let manifest = cwd.join("package.json");
        if !manifest.exists() {
            return Err(ProjectError::NoPackageJson(cwd.to_path_buf()));
        }

        if has_workspaces(&manifest)? {
            debug!(root = %cwd.display(), "monorepo root");
            return Ok(Self::at(ProjectKind::Monorepo, cwd, None));
        }

        if let Some(parent_root) = find_workspace_ancestor(cwd)? {
            debug!(root = %parent_root.display(), package = %cwd.display(), "monorepo package");
            return Ok(Self::at(
                ProjectKind::MonorepoPackage,
                &parent_root,
                Some(cwd),
            ));
        }

        Ok(Self::at(ProjectKind::Package, cwd, Some(cwd)))
    }

    fn at(kind: ProjectKind, project_root: &Path, package_root: Option<&Path>) -> Self {
        let packages_path = matches!(kind, ProjectKind::Monorepo | ProjectKind::MonorepoPackage)
            .then(|| project_root.join("packages"));
        Self {
            kind,
            project_root: project_root.to_path_buf(),
            package_root: package_root.map(Path::to_path_buf),
            packages_path,
            cache_path: project_root.join("node_modules/.cache/gatekeep"),
        }
    }

    /// The directory checks should run against: the package if one is
    /// selected, the project root otherwise.
    pub fn scope_root(&self) -> &Path {
        self.package_root.as_deref().unwrap_or(&self.project_root)
    }

    /// Detect the package manager from lockfiles at the project root.
    pub fn package_manager(&self) -> PackageManager {
        if self.project_root.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else if self.project_root.join("package-lock.json").exists() {
            PackageManager::Npm
        } else {
            PackageManager::Unknown
        }
    }
}

/// Returns `true` if the manifest declares a `workspaces` field.
fn has_workspaces(manifest: &Path) -> ProjectResult<bool> {
    let raw = std::fs::read_to_string(manifest)?;
    let parsed: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ProjectError::InvalidManifest {
            path: manifest.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(parsed.get("workspaces").is_some())
}

/// Walk ancestors looking for a `package.json` with workspaces.
fn find_workspace_ancestor(cwd: &Path) -> ProjectResult<Option<PathBuf>> {
    for dir in cwd.ancestors().skip(1) {
        let manifest = dir.join("package.json");
        if manifest.exists() && has_workspaces(&manifest)? {
            return Ok(Some(dir.to_path_buf()));
        }
    }
    Ok(None)
}
