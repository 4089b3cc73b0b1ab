//! The mail-directory backend
//!
//! Each group is a directory `<root>/<group>/` with `new/`, `cur/`, `tmp/`
//! subdirectories, maildir-style. Article "numbers" are positions (1-based)
//! in the numerically-sorted `cur/` listing — they are not persisted and
//! can shift as articles are delivered or expired out-of-band.

pub mod cache;

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::{ArticleBody, ArticleLocation, Capabilities, GroupStats, Overview, Storage};
use crate::error::{NntpError, Result};

use cache::HeaderCache;

/// A mail-directory backed [`Storage`] implementation
pub struct MaildirBackend {
    root: PathBuf,
    hostname: String,
    cache: Mutex<HeaderCache>,
    post_seq: AtomicU64,
}

impl MaildirBackend {
    pub fn new(root: impl Into<PathBuf>, hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            root: root.into(),
            cache: Mutex::new(HeaderCache::new(hostname.clone())),
            hostname,
            post_seq: AtomicU64::new(0),
        }
    }

    fn groupdir(&self, group: &str) -> PathBuf {
        self.root.join(group)
    }

    /// Reconcile the header cache with what's on disk for `group`. Never
    /// fails the caller: an I/O error just leaves the prior snapshot.
    fn refresh(&self, group: &str) {
        let mut cache = self.cache.lock().expect("header cache mutex poisoned");
        let _ = cache.refresh_group(&self.root, group);
    }

    fn read_article_raw(&self, group: &str, number: u64) -> Option<String> {
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        let meta = cache.metadata_by_number(&self.root, group, number)?;
        fs::read_to_string(&meta.filename).ok()
    }
}

fn split_head_body(raw: &str) -> ArticleBody {
    let split_at = raw.find("\r\n\r\n").map(|i| i + 4).or_else(|| raw.find("\n\n").map(|i| i + 2));
    match split_at {
        Some(idx) => ArticleBody {
            head: raw[..idx].trim_end().to_string(),
            body: raw[idx..].to_string(),
        },
        None => ArticleBody {
            head: raw.to_string(),
            body: String::new(),
        },
    }
}

fn header_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let head = raw.split("\r\n\r\n").next().or_else(|| raw.split("\n\n").next())?;
    for line in head.lines() {
        if let Some((key, value)) = line.split_once(':')
            && key.trim().eq_ignore_ascii_case(name)
        {
            return Some(value.trim());
        }
    }
    None
}

impl Storage for MaildirBackend {
    fn capabilities(&self) -> Capabilities {
        // Message-ids are preserved from source (or synthesized once,
        // deterministically) and indexed directly by the header cache.
        Capabilities { message_id: true }
    }

    fn group_exists(&self, group: &str) -> bool {
        self.groupdir(group).is_dir()
    }

    fn group_names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    fn group_stats(&self, group: &str) -> Option<GroupStats> {
        if !self.group_exists(group) {
            return None;
        }
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        let count = cache.count(group);
        Some(GroupStats { count, low: 1, high: count })
    }

    fn list(&self) -> Vec<String> {
        self.group_names()
            .into_iter()
            .filter_map(|group| {
                let stats = self.group_stats(&group)?;
                Some(format!("{group} {} {} y", stats.high, stats.low))
            })
            .collect()
    }

    fn first_article(&self, group: &str) -> Option<u64> {
        let stats = self.group_stats(group)?;
        (stats.count > 0).then_some(stats.low)
    }

    fn next_article(&self, group: &str, current: u64) -> Option<u64> {
        let stats = self.group_stats(group)?;
        let next = current + 1;
        (next <= stats.high).then_some(next)
    }

    fn prev_article(&self, group: &str, current: u64) -> Option<u64> {
        let stats = self.group_stats(group)?;
        let prev = current.checked_sub(1)?;
        (prev >= stats.low).then_some(prev)
    }

    fn listgroup(&self, group: &str) -> Vec<u64> {
        match self.group_stats(group) {
            Some(stats) if stats.count > 0 => (stats.low..=stats.high).collect(),
            _ => Vec::new(),
        }
    }

    fn message_id(&self, group: &str, number: u64) -> Option<String> {
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        cache.metadata_by_number(&self.root, group, number).map(|m| m.message_id.clone())
    }

    fn article_number(&self, group: &str, message_id: &str) -> Option<ArticleLocation> {
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        cache.number_for_message_id(group, message_id).map(|number| ArticleLocation { number })
    }

    fn article(&self, group: &str, number: u64) -> Option<ArticleBody> {
        self.refresh(group);
        let raw = self.read_article_raw(group, number)?;
        Some(split_head_body(&raw))
    }

    fn xover(&self, group: &str, start: u64, end: u64) -> Vec<Overview> {
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        let Some(stats) = ({
            let count = cache.count(group);
            (count > 0).then_some(GroupStats { count, low: 1, high: count })
        }) else {
            return Vec::new();
        };
        let end = end.min(stats.high);
        if start > end {
            return Vec::new();
        }
        (start..=end)
            .filter_map(|number| {
                let meta = cache.metadata_by_number(&self.root, group, number)?;
                Some(Overview {
                    number,
                    subject: meta.subject.clone(),
                    from: meta.from.clone(),
                    date: meta.date.clone(),
                    message_id: meta.message_id.clone(),
                    references: meta.references.clone(),
                    bytes: meta.byte_count,
                    lines: meta.line_count,
                })
            })
            .collect()
    }

    fn xhdr(&self, group: &str, header: &str, start: u64, end: u64) -> Vec<(u64, String)> {
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        let count = cache.count(group);
        let end = end.min(count);
        if start > end || count == 0 {
            return Vec::new();
        }
        (start..=end)
            .filter_map(|number| {
                let meta = cache.metadata_by_number(&self.root, group, number)?;
                let value = match header {
                    "DATE" => meta.date.clone(),
                    "FROM" => meta.from.clone(),
                    "MESSAGE-ID" => meta.message_id.clone(),
                    "SUBJECT" => meta.subject.clone(),
                    "REFERENCES" => meta.references.clone(),
                    "BYTES" => meta.byte_count.to_string(),
                    "LINES" => meta.line_count.to_string(),
                    "XREF" => format!("{} {group}:{number}", self.hostname),
                    other => fs::read_to_string(&meta.filename)
                        .ok()
                        .and_then(|raw| header_value(&raw, other).map(str::to_string))
                        .unwrap_or_default(),
                };
                Some((number, value))
            })
            .collect()
    }

    fn newnews(&self, group: &str, since: i64) -> Vec<String> {
        self.refresh(group);
        let cache = self.cache.lock().expect("header cache mutex poisoned");
        cache.message_ids_since(group, since)
    }

    fn post(&self, group: &str, raw: &str, _client_ip: &str, _username: &str) -> Result<()> {
        // Group directories are created out-of-band by the operator; the
        // backend only ever writes into an existing new/cur/tmp layout.
        let groupdir = self.groupdir(group);
        if !groupdir.join("tmp").is_dir() || !groupdir.join("new").is_dir() {
            return Err(NntpError::PostingFailed(format!("group directory not set up: {group}")));
        }

        let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|e| NntpError::PostingFailed(e.to_string()))?;
        let seq = self.post_seq.fetch_add(1, Ordering::Relaxed);
        let basename = format!("{}.M{}P{}Q{}.{}", now.as_secs(), now.subsec_millis(), process::id(), seq, self.hostname);

        let tmp_path = groupdir.join("tmp").join(&basename);
        let dest_path = groupdir.join("new").join(&basename);

        let mut file = fs::File::create(&tmp_path).map_err(|e| NntpError::PostingFailed(e.to_string()))?;
        file.write_all(raw.as_bytes()).map_err(|e| NntpError::PostingFailed(e.to_string()))?;
        file.sync_all().map_err(|e| NntpError::PostingFailed(e.to_string()))?;
        drop(file);

        fs::rename(&tmp_path, &dest_path).map_err(|e| NntpError::PostingFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(root: &std::path::Path) -> MaildirBackend {
        MaildirBackend::new(root, "news.example.com")
    }

    fn deliver(root: &std::path::Path, group: &str, name: &str, content: &str) {
        let groupdir = root.join(group);
        for sub in ["new", "cur", "tmp"] {
            fs::create_dir_all(groupdir.join(sub)).unwrap();
        }
        fs::write(groupdir.join("cur").join(name), content).unwrap();
    }

    #[test]
    fn group_exists_reflects_directory_presence() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(dir.path());
        assert!(!backend.group_exists("papercut.test"));
        fs::create_dir_all(dir.path().join("papercut.test")).unwrap();
        assert!(backend.group_exists("papercut.test"));
    }

    #[test]
    fn empty_group_reports_low_one_high_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("papercut.test")).unwrap();
        let backend = backend(dir.path());
        let stats = backend.group_stats("papercut.test").unwrap();
        assert_eq!(stats, GroupStats { count: 0, low: 1, high: 0 });
    }

    #[test]
    fn populated_group_reports_stats_and_article_text() {
        let dir = tempfile::tempdir().unwrap();
        deliver(dir.path(), "papercut.test", "1000.Mfoo", "Subject: hi\r\nFrom: a@b\r\n\r\nhello\r\n");
        deliver(dir.path(), "papercut.test", "2000.Mbar", "Subject: bye\r\nFrom: c@d\r\n\r\ngoodbye\r\n");
        let backend = backend(dir.path());
        let stats = backend.group_stats("papercut.test").unwrap();
        assert_eq!(stats, GroupStats { count: 2, low: 1, high: 2 });

        let article = backend.article("papercut.test", 1).unwrap();
        assert!(article.head.contains("Subject: hi"));
        assert_eq!(article.body, "hello\r\n");
    }

    #[test]
    fn next_and_prev_article_respect_bounds() {
        let dir = tempfile::tempdir().unwrap();
        deliver(dir.path(), "papercut.test", "1000.Mfoo", "Subject: a\r\n\r\nbody\r\n");
        deliver(dir.path(), "papercut.test", "2000.Mbar", "Subject: b\r\n\r\nbody\r\n");
        let backend = backend(dir.path());
        assert_eq!(backend.next_article("papercut.test", 1), Some(2));
        assert_eq!(backend.next_article("papercut.test", 2), None);
        assert_eq!(backend.prev_article("papercut.test", 2), Some(1));
        assert_eq!(backend.prev_article("papercut.test", 1), None);
    }

    #[test]
    fn xover_truncates_end_past_group_size() {
        let dir = tempfile::tempdir().unwrap();
        deliver(dir.path(), "papercut.test", "1000.Mfoo", "Subject: a\r\nFrom: x@y\r\n\r\nbody\r\n");
        let backend = backend(dir.path());
        let rows = backend.xover("papercut.test", 1, 500);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject, "a");
    }

    #[test]
    fn xhdr_reads_known_and_arbitrary_headers() {
        let dir = tempfile::tempdir().unwrap();
        deliver(dir.path(), "papercut.test", "1000.Mfoo", "Subject: a\r\nX-Custom: zz\r\n\r\nbody\r\n");
        let backend = backend(dir.path());
        let subjects = backend.xhdr("papercut.test", "SUBJECT", 1, 1);
        assert_eq!(subjects, vec![(1, "a".to_string())]);
        let custom = backend.xhdr("papercut.test", "X-CUSTOM", 1, 1);
        assert_eq!(custom, vec![(1, "zz".to_string())]);
    }

    #[test]
    fn post_delivers_into_new_then_visible_after_refresh() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["new", "cur", "tmp"] {
            fs::create_dir_all(dir.path().join("papercut.test").join(sub)).unwrap();
        }
        let backend = backend(dir.path());
        backend.post("papercut.test", "Subject: posted\r\nFrom: me@x\r\n\r\nhi\r\n", "127.0.0.1", "alice").unwrap();
        let stats = backend.group_stats("papercut.test").unwrap();
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn article_number_resolves_via_message_id() {
        let dir = tempfile::tempdir().unwrap();
        deliver(dir.path(), "papercut.test", "1000.Mfoo", "Subject: a\r\nMessage-ID: <abc@x>\r\n\r\nbody\r\n");
        let backend = backend(dir.path());
        let loc = backend.article_number("papercut.test", "<abc@x>").unwrap();
        assert_eq!(loc.number, 1);
    }
}
