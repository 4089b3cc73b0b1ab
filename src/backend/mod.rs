//! The storage capability contract every backend implements
//!
//! A single typed trait replaces the dynamic `get_XXX` attribute lookup of
//! the original design (see the "Polymorphic backends" design note): each
//! backend variant — today only the mail-directory backend — implements
//! [`Storage`] and advertises a [`Capabilities`] record.
//!
//! Methods are synchronous: backend I/O here is filesystem-bound and fast
//! enough that a thread-pool-backed async runtime tolerates the brief
//! blocking without a dedicated `spawn_blocking` per call (see DESIGN.md).

pub mod maildir;

/// Article metadata as stored in a header cache: everything `XOVER`/`XHDR`
/// need without re-reading the file.
#[derive(Debug, Clone, Default)]
pub struct ArticleMetadata {
    /// Absolute path to the article file
    pub filename: String,
    /// Unix timestamp (seconds) when this entry was cached
    pub timestamp: i64,
    /// Line count of the article body+headers
    pub line_count: u64,
    /// Byte count, counting newlines as bytes
    pub byte_count: u64,
    /// Group this article belongs to
    pub group: String,
    /// Recognized headers: date, from, message-id, subject, references.
    /// Absent headers are the empty string; embedded newlines are stripped.
    pub date: String,
    pub from: String,
    pub message_id: String,
    pub subject: String,
    pub references: String,
}

/// `(count, low, high)` article-number statistics for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupStats {
    pub count: u64,
    pub low: u64,
    pub high: u64,
}

/// One row of `XOVER`/`OVER` output
#[derive(Debug, Clone)]
pub struct Overview {
    pub number: u64,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub message_id: String,
    pub references: String,
    pub bytes: u64,
    pub lines: u64,
}

/// Capabilities a backend advertises to the router
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Whether this backend's native identifiers are usable as NNTP
    /// message-ids directly (`true`), or must be mangled to a local part
    /// before being passed to `get_article_number`/`get_stat` (`false`).
    pub message_id: bool,
}

/// Head + body of a single article, as returned by `get_article`
#[derive(Debug, Clone)]
pub struct ArticleBody {
    pub head: String,
    pub body: String,
}

/// Outcome of resolving a message-id or article number to a concrete slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleLocation {
    pub number: u64,
}

/// Storage capability set every backend implements.
///
/// Methods that can legitimately find nothing (a missing group, an
/// out-of-range article number) return `Ok(None)`/`Ok(Vec::new())` rather
/// than an error; [`crate::error::NntpError`] is reserved for failures the
/// protocol layer must surface as a 4xx/5xx reply distinct from "not found".
pub trait Storage: Send + Sync {
    /// Capabilities this backend advertises
    fn capabilities(&self) -> Capabilities;

    /// Whether `group` exists in this backend
    fn group_exists(&self, group: &str) -> bool;

    /// All group names this backend knows about (for `LIST`/fan-out)
    fn group_names(&self) -> Vec<String>;

    /// `(count, low, high)` for a group; `None` if it doesn't exist
    fn group_stats(&self, group: &str) -> Option<GroupStats>;

    /// One `LIST` line per group: `"group high low flag"`
    fn list(&self) -> Vec<String>;

    /// Group description, if this backend tracks one
    fn group_description(&self, group: &str) -> Option<String> {
        let _ = group;
        None
    }

    /// The lowest valid article number for a freshly selected group
    fn first_article(&self, group: &str) -> Option<u64>;

    /// Article number immediately after `current` in `group`, or `None` at
    /// the last article
    fn next_article(&self, group: &str, current: u64) -> Option<u64>;

    /// Article number immediately before `current` in `group`, or `None` at
    /// the first article
    fn prev_article(&self, group: &str, current: u64) -> Option<u64>;

    /// All article numbers in a group, in order (for `LISTGROUP`)
    fn listgroup(&self, group: &str) -> Vec<u64>;

    /// Message-id for `(group, number)`, angle-bracketed
    fn message_id(&self, group: &str, number: u64) -> Option<String>;

    /// Resolve a message-id to its article number within `group`, if this
    /// backend holds that article
    fn article_number(&self, group: &str, message_id: &str) -> Option<ArticleLocation>;

    /// Head + body for `(group, number)`
    fn article(&self, group: &str, number: u64) -> Option<ArticleBody>;

    /// Just the header block for `(group, number)`
    fn head(&self, group: &str, number: u64) -> Option<String> {
        self.article(group, number).map(|a| a.head)
    }

    /// Just the body for `(group, number)`
    fn body(&self, group: &str, number: u64) -> Option<String> {
        self.article(group, number).map(|a| a.body)
    }

    /// Overview rows for the inclusive range `[start, end]`
    fn xover(&self, group: &str, start: u64, end: u64) -> Vec<Overview>;

    /// `XHDR`/`HDR` values for `header` over the inclusive range `[start, end]`.
    /// `header` is already uppercased by the caller.
    fn xhdr(&self, group: &str, header: &str, start: u64, end: u64) -> Vec<(u64, String)>;

    /// Groups created since `since` (unix seconds). `None` means this
    /// backend tracks no creation history (the mail-directory backend
    /// always returns `None`).
    fn newgroups(&self, since: i64) -> Option<Vec<String>> {
        let _ = since;
        None
    }

    /// Message-ids of articles in `group` with mtime >= `since`
    fn newnews(&self, group: &str, since: i64) -> Vec<String>;

    /// Accept a posted article. `raw` is the full article text (headers +
    /// blank line + body) exactly as received, CRLF-terminated lines.
    fn post(&self, group: &str, raw: &str, client_ip: &str, username: &str) -> crate::error::Result<()>;
}
