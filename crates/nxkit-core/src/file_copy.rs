// ── File copy ──
//
// Pre-flight checks over NX-API (free space, MD5, existence) and the actual
// transfer over a separate SCP session. The SCP side sits behind the
// `ScpTransport` trait; its calls are blocking and run on the blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nxkit_api::Request;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::device::{Device, text_body};
use crate::error::CoreError;
use crate::table::field;

/// SSH port used for SCP unless overridden.
pub const DEFAULT_SCP_PORT: u16 = 22;

const MD5_BLOCK_SIZE: usize = 1 << 20;

/// Which way a file moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local file to the switch.
    Push,
    /// Switch file to the local path.
    Pull,
}

/// Blocking SCP session factory.
///
/// Implementations open their own connection per call; they are invoked
/// from `tokio::task::spawn_blocking`.
pub trait ScpTransport: Send + Sync {
    /// Copy `local` to `remote` on the switch.
    fn put(&self, local: &Path, remote: &str) -> io::Result<()>;
    /// Copy `remote` on the switch to `local`.
    fn get(&self, remote: &str, local: &Path) -> io::Result<()>;
}

/// One file to move between this host and a switch.
#[derive(Debug, Clone)]
pub struct FileCopy<'a> {
    device: &'a Device,
    src: PathBuf,
    dst: String,
    port: u16,
}

impl<'a> FileCopy<'a> {
    /// `dst` defaults to the file name of `src`.
    pub fn new(device: &'a Device, src: impl Into<PathBuf>, dst: Option<&str>) -> Self {
        let src = src.into();
        let dst = dst.map_or_else(
            || {
                src.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            String::from,
        );
        Self {
            device,
            src,
            dst,
            port: DEFAULT_SCP_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // ── Pre-flight ───────────────────────────────────────────────────

    /// Free bytes on the switch's default filesystem.
    pub async fn bytes_free(&self) -> Result<u64, CoreError> {
        self.device.bytes_free().await
    }

    pub async fn local_file_exists(&self) -> bool {
        tokio::fs::metadata(&self.src)
            .await
            .is_ok_and(|m| m.is_file())
    }

    /// Whether the local file fits in the switch's free space.
    pub async fn enough_space(&self) -> Result<bool, CoreError> {
        let free = self.bytes_free().await?;
        let size = tokio::fs::metadata(&self.src)
            .await
            .map_err(|e| CoreError::file_transfer(format!("Cannot read local file: {e}")))?
            .len();
        debug!(size, free, "space check");
        Ok(size <= free)
    }

    /// Hex MD5 of the local file, `None` if it does not exist.
    pub async fn local_md5(&self) -> Result<Option<String>, CoreError> {
        if !self.local_file_exists().await {
            return Ok(None);
        }
        let mut file = tokio::fs::File::open(&self.src)
            .await
            .map_err(|e| CoreError::file_transfer(format!("Cannot open local file: {e}")))?;
        let mut context = md5::Context::new();
        let mut buf = vec![0_u8; MD5_BLOCK_SIZE];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| CoreError::file_transfer(format!("Cannot read local file: {e}")))?;
            if n == 0 {
                break;
            }
            context.consume(buf.get(..n).unwrap_or_default());
        }
        Ok(Some(format!("{:x}", context.compute())))
    }

    /// MD5 the switch reports for `dst`, `None` if it has none.
    pub async fn remote_md5(&self) -> Result<Option<String>, CoreError> {
        let outcomes = self
            .device
            .probe(Request::show(format!("show file {} md5sum", self.dst)))
            .await?;
        Ok(outcomes
            .first()
            .filter(|o| o.is_ok())
            .and_then(|o| o.structured())
            .and_then(|body| field(body, "file_content_md5sum")))
    }

    /// A file with the same name and MD5 is already on the switch.
    pub async fn file_already_exists(&self) -> Result<bool, CoreError> {
        let remote = self.remote_md5().await?;
        let local = self.local_md5().await?;
        Ok(matches!((local, remote), (Some(l), Some(r)) if l == r))
    }

    /// Whether `dst` is present on the switch at all.
    pub async fn remote_file_exists(&self) -> Result<bool, CoreError> {
        let outcomes = self
            .device
            .probe(Request::show_ascii(format!("dir {}", self.dst)))
            .await?;
        let Some(outcome) = outcomes.first() else {
            return Ok(false);
        };
        let reply = match outcome.failure() {
            Some(failure) => failure.code,
            None => text_body(outcome).to_owned(),
        };
        Ok(!reply.contains("No such file"))
    }

    // ── Transfer ─────────────────────────────────────────────────────

    /// Move the file. Pushes check that the local file exists and fits
    /// before any SCP session is opened.
    pub async fn transfer(
        &self,
        scp: Arc<dyn ScpTransport>,
        direction: Direction,
    ) -> Result<(), CoreError> {
        if direction == Direction::Push {
            if !self.local_file_exists().await {
                return Err(CoreError::file_transfer("Local file doesn't exist."));
            }
            if !self.enough_space().await? {
                return Err(CoreError::file_transfer("Not enough space on device."));
            }
        }

        info!(
            host = self.device.host(),
            src = %self.src.display(),
            dst = %self.dst,
            ?direction,
            "starting SCP transfer"
        );

        let src = self.src.clone();
        let dst = self.dst.clone();
        tokio::task::spawn_blocking(move || match direction {
            Direction::Push => scp.put(&src, &dst),
            Direction::Pull => scp.get(&dst, &src),
        })
        .await
        .map_err(|e| CoreError::file_transfer(format!("Transfer task failed: {e}")))?
        .map_err(|e| {
            CoreError::file_transfer(format!("There was an error during transfer: {e}"))
        })
    }

    pub async fn push(&self, scp: Arc<dyn ScpTransport>) -> Result<(), CoreError> {
        self.transfer(scp, Direction::Push).await
    }

    pub async fn pull(&self, scp: Arc<dyn ScpTransport>) -> Result<(), CoreError> {
        self.transfer(scp, Direction::Pull).await
    }
}
