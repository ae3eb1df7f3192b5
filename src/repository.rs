use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, hex_to_hash, Hash};
use crate::ignore::Ignore;
use crate::storage::Storage;
use crate::util;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

pub const ADMIN_DIR: &str = ".gud";

/// A discovered repository: the working-tree root, the admin directory
/// under it, the object store and the ignore rules.
#[derive(Debug)]
pub struct Repository {
    pub root: PathBuf,
    pub admin: PathBuf,
    pub storage: Storage,
    pub ignore: Ignore,
}

impl Repository {
    /// Create a fresh repository at `path`. Refuses when `path` already
    /// lies inside a repository (its own or an ancestor's).
    pub fn init(path: &Path) -> Result<Self> {
        let root = path.canonicalize()?;
        if let Some(existing) = find_root(&root) {
            return Err(Error::RepoExists(existing.join(ADMIN_DIR)));
        }

        let admin = root.join(ADMIN_DIR);
        fs::create_dir_all(admin.join("objects"))?;
        fs::create_dir_all(admin.join("heads"))?;
        fs::write(admin.join("heads").join("main"), b"")?;
        fs::write(admin.join("BRANCH"), b"main\n")?;
        fs::write(admin.join("DETACHED_HEAD"), b"")?;
        fs::write(admin.join("index"), b"")?;
        fs::write(admin.join("config"), b"")?;

        debug!(root = %root.display(), "initialised repository");
        Self::open(&root)
    }

    /// Open the repository containing `path`: walk ancestors until one
    /// holds an admin directory.
    pub fn open(path: &Path) -> Result<Self> {
        let start = path.canonicalize().map_err(|_| Error::NoRepo)?;
        let root = find_root(&start).ok_or(Error::NoRepo)?;
        let admin = root.join(ADMIN_DIR);

        Ok(Self {
            ignore: Ignore::load(&root),
            storage: Storage::new(&admin),
            root,
            admin,
        })
    }

    pub fn discover() -> Result<Self> {
        Self::open(&std::env::current_dir()?)
    }

    pub fn index_path(&self) -> PathBuf {
        self.admin.join("index")
    }

    // --- Reference store: BRANCH, heads/<name>, DETACHED_HEAD ---

    pub fn current_branch(&self) -> Result<String> {
        let name = fs::read_to_string(self.admin.join("BRANCH"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Corrupt("BRANCH file is empty".to_string()));
        }
        Ok(name.to_string())
    }

    pub fn set_current_branch(&self, name: &str) -> Result<()> {
        util::write_atomic(&self.admin.join("BRANCH"), format!("{name}\n").as_bytes())
    }

    pub fn head_path(&self, name: &str) -> PathBuf {
        self.admin.join("heads").join(name)
    }

    #[must_use]
    pub fn branch_exists(&self, name: &str) -> bool {
        self.head_path(name).is_file()
    }

    /// Head commit of a branch, `None` while the branch has no commits.
    pub fn branch_head(&self, name: &str) -> Result<Option<Hash>> {
        let content = fs::read_to_string(self.head_path(name))
            .map_err(|_| Error::BranchMissing(name.to_string()))?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(hex_to_hash(content)?))
    }

    pub fn set_branch_head(&self, name: &str, hash: Option<&Hash>) -> Result<()> {
        let content = match hash {
            Some(hash) => format!("{}\n", hash_to_hex(hash)),
            None => String::new(),
        };
        util::write_atomic(&self.head_path(name), content.as_bytes())
    }

    /// All branch names, sorted.
    pub fn branches(&self) -> Result<Vec<String>> {
        let mut names = fs::read_dir(self.admin.join("heads"))?
            .filter_map(std::result::Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| !name.ends_with(".tmp"))
            .collect::<Vec<_>>();
        names.sort_unstable();
        Ok(names)
    }

    /// The detached-HEAD marker, `None` when attached to a branch.
    pub fn detached_head(&self) -> Result<Option<Hash>> {
        let content = match fs::read_to_string(self.admin.join("DETACHED_HEAD")) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(hex_to_hash(content)?))
    }

    pub fn set_detached_head(&self, hash: Option<&Hash>) -> Result<()> {
        let content = match hash {
            Some(hash) => format!("{}\n", hash_to_hex(hash)),
            None => String::new(),
        };
        util::write_atomic(&self.admin.join("DETACHED_HEAD"), content.as_bytes())
    }

    /// The effective HEAD commit: the detached hash when detached, else the
    /// current branch's head (which may not exist yet).
    pub fn current_commit(&self) -> Result<Option<Hash>> {
        if let Some(detached) = self.detached_head()? {
            return Ok(Some(detached));
        }
        self.branch_head(&self.current_branch()?)
    }
}

fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(ADMIN_DIR).is_dir())
        .map(Path::to_path_buf)
}
