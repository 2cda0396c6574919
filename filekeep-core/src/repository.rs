use crate::backend::{Backend, BackendError, GitCli};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

type BackendResult<T> = std::result::Result<T, BackendError>;

/// A repository shared between the polling loop and on-demand callers.
///
/// Any sequence that stages, checks out, resets or commits must hold the lock
/// for its whole duration.
pub type SharedRepository = Arc<Mutex<Repository>>;

/// Binding of one working directory to the backend that versions it.
#[derive(Debug)]
pub struct Repository {
    workdir: PathBuf,
    backend: Box<dyn Backend>,
}

impl Repository {
    /// Bind to `path` using the `git` executable.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::with_backend(path, GitCli::new(path))
    }

    /// Bind to `path` using the given backend.
    pub fn with_backend<P, B>(path: P, backend: B) -> Result<Self>
    where
        P: AsRef<Path>,
        B: Backend + 'static,
    {
        let path = path.as_ref();
        let workdir = path
            .canonicalize()
            .map_err(|_| Error::InvalidDirectory(path.to_path_buf()))?;
        if !workdir.is_dir() {
            return Err(Error::InvalidDirectory(workdir));
        }

        match backend.run("rev-parse", &["--is-inside-work-tree"]) {
            Ok(output) if output.trim() == "true" => {}
            _ => return Err(Error::InvalidDirectory(workdir)),
        }

        info!("Bound repository at {:?}", workdir);
        Ok(Self {
            workdir,
            backend: Box::new(backend),
        })
    }

    pub fn shared(self) -> SharedRepository {
        Arc::new(Mutex::new(self))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub(crate) fn git(&self, subcommand: &str, args: &[&str]) -> BackendResult<String> {
        self.backend.run(subcommand, args)
    }

    /// Resolve `path` to a backend pathspec relative to the working directory.
    ///
    /// Relative paths are taken from the working directory. Symlinks are
    /// followed; a path that no longer exists is resolved through its parent.
    pub(crate) fn relative_path(&self, path: &Path) -> Result<String> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        };

        let resolved = match joined.canonicalize() {
            Ok(resolved) => resolved,
            Err(_) => {
                let (parent, name) = match (joined.parent(), joined.file_name()) {
                    (Some(parent), Some(name)) => (parent, name),
                    _ => return Err(Error::version(format!("invalid path {}", path.display()))),
                };
                parent
                    .canonicalize()
                    .map_err(|_| Error::version(format!("{} does not exist", path.display())))?
                    .join(name)
            }
        };

        let relative = resolved.strip_prefix(&self.workdir).map_err(|_| {
            Error::version(format!(
                "{} is outside of {}",
                path.display(),
                self.workdir.display()
            ))
        })?;
        if relative.as_os_str().is_empty() {
            return Err(Error::version(format!(
                "{} is the repository root, not a file",
                path.display()
            )));
        }

        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"))
    }
}
