//! NNTP server error types

use thiserror::Error;

/// Server-side NNTP errors
///
/// Every variant maps to exactly one wire-level status line via
/// [`NntpError::reply`]; the mapping follows RFC 977/3977 conventions.
#[derive(Error, Debug)]
pub enum NntpError {
    /// IO error during network or filesystem operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Idle timeout waiting for the next command line
    #[error("connection timed out")]
    Timeout,

    /// Peer closed the connection
    #[error("connection closed")]
    ConnectionClosed,

    /// Unknown verb
    #[error("command not recognized: {0}")]
    UnknownCommand(String),

    /// Bad syntax or out-of-range tokens
    #[error("command syntax error: {0}")]
    SyntaxError(String),

    /// No backend hierarchy matches the requested group
    #[error("no such news group: {0}")]
    NoSuchGroup(String),

    /// No group has been selected on this session
    #[error("no newsgroup selected")]
    NoGroupSelected,

    /// No article has been selected on this session
    #[error("no current article selected")]
    NoArticleSelected,

    /// Article number does not exist in the selected group
    #[error("no such article number in this group")]
    NoSuchArticleNumber,

    /// No article with that message-id could be found on any backend
    #[error("no such article: {0}")]
    NoSuchArticleId(String),

    /// There is no next article in the group
    #[error("no next article in this group")]
    NoNextArticle,

    /// There is no previous article in the group
    #[error("no previous article in this group")]
    NoPreviousArticle,

    /// Posting refused because the server is read-only
    #[error("posting not allowed")]
    PostingNotPermitted,

    /// Posting failed (bad Newsgroups header, backend rejection, I/O failure)
    #[error("posting failed: {0}")]
    PostingFailed(String),

    /// Authentication is required before this command can be processed
    #[error("authentication required")]
    AuthRequired,

    /// Authentication credentials were rejected
    #[error("authentication rejected")]
    AuthRejected,

    /// No group/article descriptions are available
    #[error("groups and descriptions unavailable")]
    NoDescriptionsAvailable,

    /// Configuration failed validation at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic internal error, logged and surfaced as a protocol failure
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`NntpError`]
pub type Result<T> = std::result::Result<T, NntpError>;

impl NntpError {
    /// Render this error as the single status line the client should see.
    ///
    /// Multi-line-response errors (e.g. a failed `XOVER`) still use this for
    /// their status line; callers append the dot-terminator themselves.
    pub fn reply(&self) -> String {
        use crate::response::codes::*;
        match self {
            NntpError::UnknownCommand(_) => format!("{COMMAND_NOT_RECOGNIZED} command not recognized"),
            NntpError::SyntaxError(_) => {
                format!("{COMMAND_SYNTAX_ERROR} command syntax error (or un-implemented option)")
            }
            NntpError::NoSuchGroup(_) => format!("{NO_SUCH_GROUP} no such news group"),
            NntpError::NoGroupSelected => format!("{NO_GROUP_SELECTED} no newsgroup has been selected"),
            NntpError::NoArticleSelected => {
                format!("{NO_CURRENT_ARTICLE} no current article has been selected")
            }
            NntpError::NoSuchArticleNumber => {
                format!("{NO_SUCH_ARTICLE_NUMBER} no such article in this group")
            }
            NntpError::NoSuchArticleId(_) => format!("{NO_SUCH_ARTICLE_ID} no such article"),
            NntpError::NoNextArticle => format!("{NO_NEXT_ARTICLE} no next article in this group"),
            NntpError::NoPreviousArticle => format!("{NO_PREV_ARTICLE} no previous article in this group"),
            NntpError::PostingNotPermitted => format!("{POSTING_NOT_PERMITTED} Posting not allowed"),
            NntpError::PostingFailed(_) => format!("{POSTING_FAILED} Posting failed"),
            NntpError::AuthRequired => format!("{AUTH_REQUIRED} Authentication required"),
            NntpError::AuthRejected => format!("{ACCESS_DENIED} No permission"),
            NntpError::NoDescriptionsAvailable => {
                format!("{NO_DESCRIPTIONS_AVAILABLE} Groups and descriptions unavailable")
            }
            NntpError::Io(e) => format!("{INTERNAL_FAULT} {e}"),
            NntpError::Other(msg) => format!("{INTERNAL_FAULT} {msg}"),
            NntpError::Timeout | NntpError::ConnectionClosed | NntpError::Config(_) => {
                format!("{INTERNAL_FAULT} internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_maps_to_500() {
        assert!(NntpError::UnknownCommand("FOO".into()).reply().starts_with("500"));
    }

    #[test]
    fn no_such_group_maps_to_411() {
        assert!(NntpError::NoSuchGroup("x.y".into()).reply().starts_with("411"));
    }

    #[test]
    fn posting_not_permitted_maps_to_440() {
        assert!(NntpError::PostingNotPermitted.reply().starts_with("440"));
    }

    #[test]
    fn auth_required_maps_to_480() {
        assert!(NntpError::AuthRequired.reply().starts_with("480"));
    }

    #[test]
    fn auth_rejected_maps_to_502() {
        assert!(NntpError::AuthRejected.reply().starts_with("502"));
    }
}
