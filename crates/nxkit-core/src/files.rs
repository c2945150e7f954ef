// Bootflash filesystem helpers built on `dir`, `mkdir` and `delete`.

use std::sync::LazyLock;

use nxkit_api::Request;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::device::{Device, text_body};
use crate::error::CoreError;

/// Filesystem used when a path names none.
pub const DEFAULT_FILESYSTEM: &str = "bootflash:";

static BYTES_FREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) bytes free").expect("invalid bytes-free regex"));

/// Result of walking a directory path one component at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "missing", rename_all = "snake_case")]
pub enum DirCheck {
    Exists,
    /// First component (with trailing `/`) that is not present.
    Missing(String),
}

/// Split `fs:dir/sub/file` into `("file", "fs:dir/sub/")`.
///
/// A path without a directory part yields `("file", "fs:")`. A path with
/// no filesystem prefix lives on [`DEFAULT_FILESYSTEM`].
pub fn split_file_path(path: &str) -> (String, String) {
    let (filesystem, dirs, file) = path_parts(path);
    (file.to_owned(), format!("{filesystem}:{dirs}"))
}

/// `(filesystem, "dir/sub/", file)` without the `:` after the filesystem.
fn path_parts(path: &str) -> (&str, &str, &str) {
    let (filesystem, rest) = match (path.split_once(':'), path.rsplit_once(':')) {
        (Some((filesystem, _)), Some((_, rest))) => (filesystem, rest),
        _ => (DEFAULT_FILESYSTEM.trim_end_matches(':'), path),
    };
    match rest.rfind('/') {
        Some(idx) => (filesystem, &rest[..=idx], &rest[idx + 1..]),
        None => (filesystem, "", rest),
    }
}

/// Names listed by a `dir` text body, up to the usage summary.
pub fn parse_dir_listing(body: &str) -> Vec<String> {
    body.lines()
        .take_while(|line| !line.trim_start().starts_with("Usage for"))
        .filter_map(|line| line.split_whitespace().last())
        .map(String::from)
        .collect()
}

/// Free bytes reported by a `dir` text body.
pub fn parse_bytes_free(body: &str) -> Option<u64> {
    BYTES_FREE.captures(body)?.get(1)?.as_str().parse().ok()
}

impl Device {
    /// Files and sub-directories (trailing `/`) under `path`.
    ///
    /// An invalid path yields an empty list rather than an error.
    pub async fn list_files(&self, path: &str) -> Result<Vec<String>, CoreError> {
        match self.show_text(&format!("dir {path}")).await {
            Ok(outcome) => Ok(parse_dir_listing(text_body(&outcome))),
            Err(CoreError::Cli { code, .. }) => {
                debug!(path, %code, "dir rejected, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Check that every directory in `path` exists.
    ///
    /// The last component is taken as a file name unless `path` ends in `/`.
    pub async fn full_dir_check(&self, path: &str) -> Result<DirCheck, CoreError> {
        let (filesystem, rest, _) = path_parts(path);
        let preamble = format!("{filesystem}:");

        let mut listing = self.list_files(&preamble).await?;
        let mut walked = String::new();
        for component in rest.split('/').filter(|c| !c.is_empty()) {
            let entry = format!("{component}/");
            if !listing.contains(&entry) {
                return Ok(DirCheck::Missing(entry));
            }
            walked.push_str(&entry);
            listing = self.list_files(&format!("{preamble}{walked}")).await?;
        }
        Ok(DirCheck::Exists)
    }

    /// Create a directory. `false` when the switch answered with any
    /// `clierror`, which is how it reports an existing directory.
    pub async fn create_dir(&self, path: &str) -> Result<bool, CoreError> {
        let outcomes = self
            .probe(Request::show_ascii(format!("mkdir {path}")))
            .await?;
        Ok(outcomes.first().is_some_and(|o| o.clierror.is_none()))
    }

    /// Delete a file or directory without confirmation. `false` when the
    /// switch answered the delete with any `clierror`.
    pub async fn delete_dir(&self, path: &str) -> Result<bool, CoreError> {
        let outcomes = self
            .probe(Request::show_ascii(format!(
                "terminal dont-ask ; delete {path}"
            )))
            .await?;
        Ok(outcomes.get(1).is_some_and(|o| o.clierror.is_none()))
    }

    /// Free space on the default filesystem.
    pub async fn bytes_free(&self) -> Result<u64, CoreError> {
        let outcome = self.show_text("dir").await?;
        parse_bytes_free(text_body(&outcome)).ok_or_else(|| CoreError::Decode {
            message: "dir output has no 'bytes free' line".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DIR_OUTPUT: &str = "\
       4096    Jan 01 00:00:00 2020  scripts/
  981295104    Mar 10 14:02:11 2021  nxos.9.3.7.bin
       1024    Apr 02 09:15:00 2021  startup.cfg

Usage for bootflash://sup-local
 1496399872 bytes used
 3252154368 bytes free
 4748554240 bytes total";

    #[test]
    fn split_file_path_separates_file_and_directory() {
        assert_eq!(
            split_file_path("bootflash:dir/a.bin"),
            ("a.bin".to_owned(), "bootflash:dir/".to_owned())
        );
        assert_eq!(
            split_file_path("bootflash:a/b/c.cfg"),
            ("c.cfg".to_owned(), "bootflash:a/b/".to_owned())
        );
        assert_eq!(
            split_file_path("bootflash:nxos.bin"),
            ("nxos.bin".to_owned(), "bootflash:".to_owned())
        );
        assert_eq!(
            split_file_path("bootflash:a/b/"),
            (String::new(), "bootflash:a/b/".to_owned())
        );
    }

    #[test]
    fn split_file_path_defaults_to_bootflash() {
        assert_eq!(
            split_file_path("scripts/a.py"),
            ("a.py".to_owned(), "bootflash:scripts/".to_owned())
        );
        assert_eq!(
            split_file_path("nxos.bin"),
            ("nxos.bin".to_owned(), "bootflash:".to_owned())
        );
        assert_eq!(
            split_file_path("a/b/"),
            (String::new(), "bootflash:a/b/".to_owned())
        );
    }

    #[test]
    fn dir_listing_stops_at_usage_summary() {
        assert_eq!(
            parse_dir_listing(DIR_OUTPUT),
            vec!["scripts/", "nxos.9.3.7.bin", "startup.cfg"]
        );
        assert!(parse_dir_listing("").is_empty());
    }

    #[test]
    fn bytes_free_is_parsed_from_dir_output() {
        assert_eq!(parse_bytes_free(DIR_OUTPUT), Some(3_252_154_368));
        assert_eq!(parse_bytes_free("no summary here"), None);
    }
}
