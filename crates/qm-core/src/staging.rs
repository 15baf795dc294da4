//! Temporary files for attachments in transit to the chat.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::Result;

static STAGE_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Replace anything outside `[A-Za-z0-9._-]` so user input can never name a
/// path outside the staging directory.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.chars().all(|c| c == '.') {
        "attachment".to_string()
    } else {
        out
    }
}

pub fn uniquify_filename(name: &str, ts: u128, n: usize) -> String {
    let base = sanitize_filename(name);
    if let Some((stem, ext)) = base.rsplit_once('.') {
        if !stem.is_empty() && !ext.is_empty() {
            return format!("{stem}_{ts}_{n}.{ext}");
        }
    }
    format!("{base}_{ts}_{n}")
}

/// A file under the staging directory that is removed when dropped.
///
/// Removal happens on every exit path, including when the upload or the
/// download stream fails halfway.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Reserve a unique path for `file_name` in `dir` (created if missing).
    /// The file itself is created by the caller.
    pub async fn reserve(dir: &Path, file_name: &str) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let n = STAGE_COUNTER.fetch_add(1, Ordering::SeqCst);

        Ok(Self {
            path: dir.join(uniquify_filename(file_name, ts, n)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove staged file {}: {e}",
                self.path.display()
            ),
        }
    }
}
