use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

const DATA_DIR: &str = "sports_showtime";
const FLAG_FILE: &str = "has_voted";

/// Durable "already voted" marker. Presence is all that matters.
pub trait VoteFlagStore {
    fn is_set(&self) -> bool;
    fn set(&mut self) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct FlagFile {
    #[serde(rename = "hasVoted")]
    has_voted: bool,
    voted_at: String,
}

#[derive(Debug, Clone)]
pub struct FileVoteFlag {
    path: PathBuf,
}

impl FileVoteFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Option<Self> {
        default_flag_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VoteFlagStore for FileVoteFlag {
    /// An unreadable flag counts as set.
    fn is_set(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(_) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                log::warn!("cannot stat vote flag {}: {err}", self.path.display());
                true
            }
        }
    }

    fn set(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create vote flag dir {}", dir.display()))?;
        }
        let body = FlagFile {
            has_voted: true,
            voted_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string(&body).context("serialize vote flag")?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).context("write vote flag")?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err).context("swap vote flag");
        }
        Ok(())
    }
}

/// Flag kept only for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryVoteFlag {
    set: bool,
}

impl MemoryVoteFlag {
    pub fn new(set: bool) -> Self {
        Self { set }
    }
}

impl VoteFlagStore for MemoryVoteFlag {
    fn is_set(&self) -> bool {
        self.set
    }

    fn set(&mut self) -> Result<()> {
        self.set = true;
        Ok(())
    }
}

pub fn default_flag_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DATA_DIR).join(FLAG_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR)
            .join(FLAG_FILE),
    )
}
