//! NNTP response codes and the multi-line response writer
//!
//! Every reply the session state machine sends goes through
//! [`ResponseWriter`], which owns dot-stuffing and CRLF termination so
//! command handlers never have to think about wire framing.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// NNTP response codes (RFC 977 / RFC 3977, with the draft extensions this
/// server implements)
#[allow(dead_code)]
pub mod codes {
    // 1xx - Informational
    /// Help text follows
    pub const HELP_TEXT_FOLLOWS: u16 = 100;
    /// Server date/time (RFC 3977 Section 7.1)
    pub const SERVER_DATE: u16 = 111;

    // 2xx - Success
    /// Server ready, posting allowed
    pub const READY_POSTING_ALLOWED: u16 = 200;
    /// Server ready, no posting
    pub const READY_NO_POSTING: u16 = 201;
    /// Slave status noted
    pub const SLAVE_STATUS_NOTED: u16 = 202;
    /// Closing connection
    pub const CLOSING_CONNECTION: u16 = 205;
    /// Group selected
    pub const GROUP_SELECTED: u16 = 211;
    /// List of newsgroups follows
    pub const LIST_INFORMATION_FOLLOWS: u16 = 215;
    /// Article follows (head and body)
    pub const ARTICLE_FOLLOWS: u16 = 220;
    /// Head follows
    pub const HEAD_FOLLOWS: u16 = 221;
    /// Body follows
    pub const BODY_FOLLOWS: u16 = 222;
    /// Article stat
    pub const ARTICLE_STAT: u16 = 223;
    /// Overview information follows
    pub const OVERVIEW_INFO_FOLLOWS: u16 = 224;
    /// List of new newsgroups follows
    pub const NEW_NEWSGROUPS_FOLLOW: u16 = 231;
    /// List of new articles follows
    pub const NEW_ARTICLE_LIST_FOLLOWS: u16 = 230;
    /// List of groups and descriptions follows (`XGTITLE`)
    pub const GROUPS_AND_DESCRIPTIONS_FOLLOW: u16 = 282;
    /// Article posted successfully
    pub const ARTICLE_POSTED: u16 = 240;
    /// Authentication accepted
    pub const AUTH_ACCEPTED: u16 = 281;

    // 3xx - Continuation
    /// Send article to be posted
    pub const SEND_ARTICLE: u16 = 340;
    /// Continue with authentication
    pub const AUTH_CONTINUE: u16 = 381;

    // 4xx - Temporary errors
    /// Internal fault or server resource problem
    pub const INTERNAL_FAULT: u16 = 403;
    /// No such newsgroup
    pub const NO_SUCH_GROUP: u16 = 411;
    /// No newsgroup selected
    pub const NO_GROUP_SELECTED: u16 = 412;
    /// No current article
    pub const NO_CURRENT_ARTICLE: u16 = 420;
    /// No next article
    pub const NO_NEXT_ARTICLE: u16 = 421;
    /// No previous article
    pub const NO_PREV_ARTICLE: u16 = 422;
    /// No article with that number
    pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
    /// No article with that message-id
    pub const NO_SUCH_ARTICLE_ID: u16 = 430;
    /// Article not wanted (IHAVE refused)
    pub const ARTICLE_NOT_WANTED: u16 = 435;
    /// Posting not permitted
    pub const POSTING_NOT_PERMITTED: u16 = 440;
    /// Posting failed
    pub const POSTING_FAILED: u16 = 441;
    /// Authentication required
    pub const AUTH_REQUIRED: u16 = 480;
    /// Groups and descriptions unavailable
    pub const NO_DESCRIPTIONS_AVAILABLE: u16 = 481;

    // 5xx - Permanent errors
    /// Command not recognized
    pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
    /// Command syntax error
    pub const COMMAND_SYNTAX_ERROR: u16 = 501;
    /// Access denied / command unavailable
    pub const ACCESS_DENIED: u16 = 502;
    /// Feature not supported
    pub const FEATURE_NOT_SUPPORTED: u16 = 503;
}

/// Double a leading `.` on a body line (RFC 977 Section 2.4.1 byte-stuffing)
fn dot_stuff(line: &str) -> String {
    if line.starts_with('.') {
        format!(".{line}")
    } else {
        line.to_string()
    }
}

/// Writes status lines and dot-terminated multi-line bodies to a client
/// connection.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    /// Wrap a writer half of a connection
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Send a single status line, terminated with CRLF
    pub async fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await
    }

    /// Send a multi-line response: a status line, each body line dot-stuffed
    /// and CRLF-terminated, then the `.` terminator line.
    pub async fn send_multiline<'a, I>(&mut self, status: &str, lines: I) -> std::io::Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.writer.write_all(status.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        for line in lines {
            self.writer.write_all(dot_stuff(line).as_bytes()).await?;
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.write_all(b".\r\n").await?;
        self.writer.flush().await
    }

    /// Access the underlying writer (used to close the connection on QUIT)
    pub fn into_inner(self) -> W {
        self.writer
    }
}
