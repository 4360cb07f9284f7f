//! Persisted link state: the bridge between stateless invocations.
//!
//! Each invocation exits after one operation; "follow link 3" in the
//! next invocation only works because the previous page's link list
//! was written to disk. The file is replaced in full on every save;
//! nothing is merged.

use std::fs;
use std::path::{Path, PathBuf};

use gemnav_types::error::{GemError, Result};

/// Context prefix marking a search session rather than a page visit.
pub const SEARCH_CONTEXT_PREFIX: &str = "gem:search:";

/// The most recent page's or search's link list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkState {
    /// The visited page URL, or `gem:search:<query>` for a search.
    pub context: String,
    /// `links[i]` is reachable via display number `i + 1`.
    pub links: Vec<String>,
}

impl LinkState {
    /// Resolve a 1-based display number to its URL.
    pub fn resolve(&self, n: usize) -> Result<&str> {
        if n == 0 || n > self.links.len() {
            return Err(GemError::OutOfRange(n, self.links.len()));
        }
        Ok(&self.links[n - 1])
    }

    /// Whether this state came from a search rather than a page visit.
    pub fn is_search(&self) -> bool {
        self.context.starts_with(SEARCH_CONTEXT_PREFIX)
    }
}

/// Storage seam for [`LinkState`]. The file store is production; the
/// memory store backs tests and embedding.
pub trait LinkStore {
    /// Replace any previous state in full.
    fn save(&mut self, context: &str, links: &[String]) -> Result<()>;
    /// Load the most recently saved state.
    fn load(&self) -> Result<LinkState>;
}

/// Link state as plain text on disk: context line first, then one
/// URL per line. Single-writer usage is assumed and unguarded; two
/// shells racing on the file is an accepted limitation.
pub struct FileLinkStore {
    path: PathBuf,
}

impl FileLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LinkStore for FileLinkStore {
    fn save(&mut self, context: &str, links: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut contents = String::with_capacity(
            context.len() + 1 + links.iter().map(|l| l.len() + 1).sum::<usize>(),
        );
        contents.push_str(context);
        contents.push('\n');
        for link in links {
            contents.push_str(link);
            contents.push('\n');
        }

        fs::write(&self.path, contents)?;
        log::debug!("saved {} links for {context}", links.len());
        Ok(())
    }

    fn load(&self) -> Result<LinkState> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GemError::NoSavedState);
            },
            Err(e) => return Err(e.into()),
        };
        parse_state(&data)
    }
}

fn parse_state(data: &str) -> Result<LinkState> {
    let mut lines: Vec<&str> = data.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let Some((&context, links)) = lines.split_first() else {
        return Err(GemError::NoSavedState);
    };
    Ok(LinkState {
        context: context.to_string(),
        links: links.iter().map(|s| (*s).to_string()).collect(),
    })
}

/// In-memory [`LinkStore`].
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    state: Option<LinkState>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkStore for MemoryLinkStore {
    fn save(&mut self, context: &str, links: &[String]) -> Result<()> {
        self.state = Some(LinkState {
            context: context.to_string(),
            links: links.to_vec(),
        });
        Ok(())
    }

    fn load(&self) -> Result<LinkState> {
        self.state.clone().ok_or(GemError::NoSavedState)
    }
}
