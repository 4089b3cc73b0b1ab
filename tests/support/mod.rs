//! Shared harness for the protocol-flow integration tests: build a
//! `ProtocolContext` over a scratch maildir root and drive
//! `handle_connection` over an in-memory duplex stream.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use papercut_nntp::auth::AuthBackend;
use papercut_nntp::backend::maildir::MaildirBackend;
use papercut_nntp::backend::Storage;
use papercut_nntp::config::{ServerConfig, ServerType, GLOBAL_HIERARCHY};
use papercut_nntp::logging::EventLog;
use papercut_nntp::protocol::ProtocolContext;
use papercut_nntp::router::Router;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// An `AuthBackend` that accepts exactly one fixed username/password pair.
pub struct FixedUser {
    pub username: &'static str,
    pub password: &'static str,
}

impl AuthBackend for FixedUser {
    fn is_valid_user(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

pub struct Harness {
    pub ctx: Arc<ProtocolContext>,
    tmp: tempfile::TempDir,
}

impl Harness {
    /// A read-write, unauthenticated server rooted at a fresh temp directory.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let maildir_path = tmp.path().join("spool");
        std::fs::create_dir_all(&maildir_path).unwrap();
        let mut backends: HashMap<String, Arc<dyn Storage>> = HashMap::new();
        backends.insert(
            GLOBAL_HIERARCHY.to_string(),
            Arc::new(MaildirBackend::new(maildir_path.clone(), "news.example.com")),
        );
        Self::assemble(tmp, backends, ServerType::ReadWrite, false, Arc::new(papercut_nntp::auth::DenyAll)).await
    }

    /// A read-only server, otherwise identical to `new`.
    pub async fn read_only() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let maildir_path = tmp.path().join("spool");
        std::fs::create_dir_all(&maildir_path).unwrap();
        let mut backends: HashMap<String, Arc<dyn Storage>> = HashMap::new();
        backends.insert(
            GLOBAL_HIERARCHY.to_string(),
            Arc::new(MaildirBackend::new(maildir_path.clone(), "news.example.com")),
        );
        Self::assemble(tmp, backends, ServerType::ReadOnly, false, Arc::new(papercut_nntp::auth::DenyAll)).await
    }

    /// A read-write server with `AUTHINFO` gating enabled against `auth`.
    pub async fn with_auth(auth: Arc<dyn AuthBackend>) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let maildir_path = tmp.path().join("spool");
        std::fs::create_dir_all(&maildir_path).unwrap();
        let mut backends: HashMap<String, Arc<dyn Storage>> = HashMap::new();
        backends.insert(
            GLOBAL_HIERARCHY.to_string(),
            Arc::new(MaildirBackend::new(maildir_path.clone(), "news.example.com")),
        );
        Self::assemble(tmp, backends, ServerType::ReadWrite, true, auth).await
    }

    /// A read-write server with a second hierarchy (`prefix`) routed to its
    /// own maildir root, alongside the default `papercut` global hierarchy.
    pub async fn with_hierarchy(prefix: &str) -> Self {
        Self::with_hierarchies(&[prefix]).await
    }

    /// A read-write server with one additional maildir-backed hierarchy per
    /// entry in `prefixes`, alongside the default `papercut` global one —
    /// each routed to its own scratch root for longest-prefix routing tests.
    pub async fn with_hierarchies(prefixes: &[&str]) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let maildir_path = tmp.path().join("spool");
        std::fs::create_dir_all(&maildir_path).unwrap();

        let mut backends: HashMap<String, Arc<dyn Storage>> = HashMap::new();
        backends.insert(
            GLOBAL_HIERARCHY.to_string(),
            Arc::new(MaildirBackend::new(maildir_path.clone(), "news.example.com")),
        );
        for prefix in prefixes {
            let extra_path = tmp.path().join(prefix);
            std::fs::create_dir_all(&extra_path).unwrap();
            backends.insert((*prefix).to_string(), Arc::new(MaildirBackend::new(extra_path, "news.example.com")));
        }
        Self::assemble(tmp, backends, ServerType::ReadWrite, false, Arc::new(papercut_nntp::auth::DenyAll)).await
    }

    async fn assemble(
        tmp: tempfile::TempDir,
        backends: HashMap<String, Arc<dyn Storage>>,
        server_type: ServerType,
        nntp_auth: bool,
        auth: Arc<dyn AuthBackend>,
    ) -> Self {
        let log_path = tmp.path().join("events.log");
        let event_log = EventLog::open(&log_path).await.unwrap();

        let config = ServerConfig {
            nntp_hostname: "news.example.com".into(),
            nntp_port: 119,
            server_type,
            nntp_auth,
            auth_backend: nntp_auth.then(|| "fixed".to_string()),
            max_connections: None,
            storage_backend: "maildir".into(),
            hierarchies: HashMap::new(),
            maildir_path: tmp.path().join("spool").to_string_lossy().into_owned(),
            log_file: log_path.to_string_lossy().into_owned(),
        };

        let ctx = Arc::new(ProtocolContext {
            config: Arc::new(config),
            router: Arc::new(Router::new(backends)),
            auth,
            event_log,
        });

        Self { ctx, tmp }
    }

    /// Root directory handed to the global-hierarchy maildir backend.
    pub fn maildir_root(&self) -> PathBuf {
        self.tmp.path().join("spool")
    }

    /// Root directory handed to an additional hierarchy's maildir backend.
    pub fn hierarchy_root(&self, prefix: &str) -> PathBuf {
        self.tmp.path().join(prefix)
    }
}

/// Creates `<root>/<group>/{new,cur,tmp}` and writes one article straight
/// into `cur/` with the given basename and raw CRLF body.
pub fn deliver(root: &std::path::Path, group: &str, basename: &str, raw: &str) {
    let groupdir = root.join(group);
    for sub in ["new", "cur", "tmp"] {
        std::fs::create_dir_all(groupdir.join(sub)).unwrap();
    }
    std::fs::write(groupdir.join("cur").join(basename), raw).unwrap();
}

/// One end of an in-memory duplex connection driving `handle_connection`.
pub struct Client {
    reader: BufReader<tokio::io::DuplexStream>,
}

impl Client {
    /// Spawn `handle_connection` over a fresh duplex pair and return the
    /// client-side handle, after reading the greeting line.
    pub async fn connect(ctx: Arc<ProtocolContext>) -> (Self, String) {
        let (client, server) = tokio::io::duplex(8192);
        tokio::spawn(async move {
            papercut_nntp::protocol::handle_connection(server, "127.0.0.1".to_string(), ctx).await;
        });
        let mut client = Client {
            reader: BufReader::new(client),
        };
        let greeting = client.read_line().await;
        (client, greeting)
    }

    pub async fn send(&mut self, line: &str) {
        let framed = format!("{line}\r\n");
        self.reader.get_mut().write_all(framed.as_bytes()).await.unwrap();
    }

    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    /// Read lines until (and not including) a lone `.` terminator.
    pub async fn read_multiline_body(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            if line == "." {
                break;
            }
            lines.push(line);
        }
        lines
    }
}
