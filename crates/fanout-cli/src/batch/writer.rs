use super::activity::User;
use core::time::Duration;
use fanout::JobExecutor;
use std::io;
use std::path::{Path, PathBuf};
use tokio::time::sleep;

/// Writes each user's activity record to `<dir>/uid<id>.txt`.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    dir: PathBuf,
    delay: Duration,
}

impl RecordWriter {
    /// Creates `dir` (and its parents) if missing. `delay` is slept after
    /// every write to simulate a slow sink.
    pub async fn create(dir: impl Into<PathBuf>, delay: Duration) -> io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, delay })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("uid{id}.txt"))
    }
}

impl JobExecutor<User> for RecordWriter {
    type Error = io::Error;

    async fn execute(&self, user: User) -> io::Result<()> {
        println!("WRITING FILE FOR UID {}", user.id);

        let path = self.path_for(user.id);
        tokio::fs::write(&path, user.activity_info())
            .await
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;

        tracing::debug!(uid = user.id, entries = user.logs.len(), "Wrote {}", path.display());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        Ok(())
    }
}
