//! In-memory header cache for the mail-directory backend
//!
//! Three co-indexed mappings, as specified: filename → metadata,
//! message-id → filename, group → ordered filename sequence (the
//! "dircache"). Refresh diffs the current `cur/` listing against the
//! previous snapshot so unchanged articles are never re-parsed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::backend::ArticleMetadata;

/// basename sort key: the leading run of digits before the first `.`,
/// with any non-digit characters filtered out first.
fn sort_key(filename: &str) -> i64 {
    let prefix = filename.split('.').next().unwrap_or("");
    let digits: String = prefix.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Deterministically synthesize a message-id for an article file whose
/// header block lacked one.
///
/// Takes the basename, extracts a host token as the third dot-delimited
/// component up to the first comma (falling back to `fallback_host`),
/// strips that host from the basename, reduces what's left to
/// alphanumeric characters, and emits `<remainder@host>`.
pub fn synthesize_message_id(basename: &str, fallback_host: &str) -> String {
    let parts: Vec<&str> = basename.split('.').collect();
    let host = parts
        .get(2)
        .map(|s| s.split(',').next().unwrap_or(s).to_string())
        .unwrap_or_else(|| fallback_host.to_string());

    let without_host = basename.replacen(&host, "", 1);
    let local: String = without_host.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("<{local}@{host}>")
}

/// Read the on-disk article at `path`, computing counts and headers.
fn read_message(path: &Path, group: &str, fallback_host: &str) -> io::Result<ArticleMetadata> {
    let raw = fs::read_to_string(path)?;
    let lines: Vec<&str> = raw.split('\n').collect();
    let line_count = lines.len() as u64;
    let byte_count = raw.len() as u64; // newlines already count as bytes within raw.len()

    let header_block_end = raw.find("\n\n").or_else(|| raw.find("\r\n\r\n")).unwrap_or(raw.len());
    let header_block = &raw[..header_block_end];

    let mut date = String::new();
    let mut from = String::new();
    let mut message_id = String::new();
    let mut subject = String::new();
    let mut references = String::new();

    for line in header_block.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().replace(['\r', '\n'], "");
        match name.trim().to_ascii_lowercase().as_str() {
            "date" => date = value,
            "from" => from = value,
            "message-id" => message_id = value.trim_matches(|c| c == '<' || c == '>' || c == ' ').to_string(),
            "subject" => subject = value,
            "references" => references = value,
            _ => {}
        }
    }

    if message_id.is_empty() {
        let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let synthesized = synthesize_message_id(basename, fallback_host);
        message_id = synthesized.trim_matches(|c| c == '<' || c == '>').to_string();
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Ok(ArticleMetadata {
        filename: path.to_string_lossy().into_owned(),
        timestamp,
        line_count,
        byte_count,
        group: group.to_string(),
        date,
        from,
        message_id: format!("<{message_id}>"),
        subject,
        references,
    })
}

/// Move everything under `<groupdir>/new` into `<groupdir>/cur`, appending
/// the `:2,` maildir flag suffix. Failed renames (file vanished between
/// listing and rename) are ignored.
pub fn promote_new_to_cur(groupdir: &Path) -> io::Result<()> {
    let new_dir = groupdir.join("new");
    let cur_dir = groupdir.join("cur");
    let entries = match fs::read_dir(&new_dir) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries.flatten() {
        let from = entry.path();
        let Some(name) = from.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let to = cur_dir.join(format!("{name}:2,"));
        let _ = fs::rename(&from, &to);
    }
    Ok(())
}

/// The co-indexed in-memory cache
#[derive(Default)]
pub struct HeaderCache {
    by_filename: HashMap<String, ArticleMetadata>,
    by_message_id: HashMap<String, String>,
    dircache: HashMap<String, Vec<String>>,
    hostname: String,
}

impl HeaderCache {
    pub fn new(hostname: String) -> Self {
        Self {
            hostname,
            ..Default::default()
        }
    }

    /// Re-enumerate `cur/` for `group`, reconciling the cache with what's
    /// currently on disk. Missing group directories yield an empty result,
    /// not an error.
    pub fn refresh_group(&mut self, root: &Path, group: &str) -> io::Result<()> {
        let groupdir = root.join(group);
        match promote_new_to_cur(&groupdir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.dircache.insert(group.to_string(), Vec::new());
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let curdir = groupdir.join("cur");
        let mut current: Vec<String> = match fs::read_dir(&curdir) {
            Ok(entries) => entries
                .flatten()
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.dircache.insert(group.to_string(), Vec::new());
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        current.sort_by_key(|name| sort_key(name));

        let previous = self.dircache.get(group).cloned().unwrap_or_default();
        let previous_set: std::collections::HashSet<&String> = previous.iter().collect();
        let current_set: std::collections::HashSet<&String> = current.iter().collect();

        for gone in previous_set.difference(&current_set) {
            let path = curdir.join(gone);
            let key = path.to_string_lossy().into_owned();
            if let Some(meta) = self.by_filename.remove(&key) {
                self.by_message_id.remove(&meta.message_id);
            }
        }

        for fresh in current_set.difference(&previous_set) {
            let path = curdir.join(fresh);
            // A corrupt header block must not crash the refresh; fall back
            // to an all-empty metadata record with correct file presence.
            let meta = read_message(&path, group, &self.hostname).unwrap_or_else(|_| ArticleMetadata {
                filename: path.to_string_lossy().into_owned(),
                group: group.to_string(),
                message_id: synthesize_message_id(fresh, &self.hostname),
                ..Default::default()
            });
            let key = path.to_string_lossy().into_owned();
            self.by_message_id.insert(meta.message_id.clone(), key.clone());
            self.by_filename.insert(key, meta);
        }

        self.dircache.insert(group.to_string(), current);
        Ok(())
    }

    pub fn count(&self, group: &str) -> u64 {
        self.dircache.get(group).map(|v| v.len() as u64).unwrap_or(0)
    }

    fn path_at(&self, root: &Path, group: &str, number: u64) -> Option<PathBuf> {
        let names = self.dircache.get(group)?;
        let idx = number.checked_sub(1)? as usize;
        names.get(idx).map(|name| root.join(group).join("cur").join(name))
    }

    pub fn metadata_by_number(&self, root: &Path, group: &str, number: u64) -> Option<&ArticleMetadata> {
        let path = self.path_at(root, group, number)?;
        self.by_filename.get(&path.to_string_lossy().into_owned())
    }

    pub fn number_for_message_id(&self, group: &str, message_id: &str) -> Option<u64> {
        let filename = self.by_message_id.get(message_id)?;
        let names = self.dircache.get(group)?;
        names.iter().position(|name| filename.ends_with(name.as_str())).map(|i| i as u64 + 1)
    }

    /// Message-ids of articles in `group` whose file mtime is >= `since`
    /// (unix seconds).
    pub fn message_ids_since(&self, group: &str, since: i64) -> Vec<String> {
        let Some(names) = self.dircache.get(group) else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| {
                let meta = self.by_filename.values().find(|m| m.group == group && m.filename.ends_with(name.as_str()))?;
                let mtime = fs::metadata(&meta.filename).and_then(|m| m.modified()).ok()?;
                let secs = mtime.duration_since(std::time::UNIX_EPOCH).ok()?.as_secs() as i64;
                (secs >= since).then(|| meta.message_id.clone())
            })
            .collect()
    }
}
