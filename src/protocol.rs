//! The per-connection protocol state machine
//!
//! Parses command lines, enforces preconditions (selected group/article,
//! auth gating), dispatches to the router/backend, and formats replies.
//! I/O framing (CRLF, dot-stuffing) is the responsibility of
//! [`crate::response::ResponseWriter`]; this module only decides *what*
//! to send.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::time::timeout;

use crate::auth::AuthBackend;
use crate::backend::ArticleLocation;
use crate::config::ServerConfig;
use crate::error::NntpError;
use crate::logging::EventLog;
use crate::parser::Command;
use crate::response::{codes, ResponseWriter};
use crate::router::Router;
use crate::session::Session;
use crate::timestamp::parse_date_time;
use crate::wildmat;

/// Idle timeout waiting for the next command line
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(180);

/// Verbs this server dispatches, for `HELP` output
const SUPPORTED_VERBS: &[&str] = &[
    "ARTICLE", "BODY", "HEAD", "STAT", "GROUP", "LIST", "POST", "HELP", "LAST", "NEWGROUPS", "NEWNEWS", "NEXT",
    "QUIT", "MODE", "XOVER", "XPAT", "LISTGROUP", "XGTITLE", "XHDR", "SLAVE", "DATE", "IHAVE", "OVER", "HDR",
    "AUTHINFO", "XROVER", "XVERSION",
];

/// Shared, read-only state every connection handler consults
pub struct ProtocolContext {
    pub config: Arc<ServerConfig>,
    pub router: Arc<Router>,
    pub auth: Arc<dyn AuthBackend>,
    pub event_log: EventLog,
}

/// What the dispatch loop should do with a processed command
enum Reply {
    Line(String),
    Multi(String, Vec<String>),
    Close(String),
}

fn line(status: u16, text: &str) -> Reply {
    Reply::Line(format!("{status} {text}"))
}

/// Drive one client connection end-to-end: greeting, command loop, and
/// posting-mode line accumulation, until `QUIT`, timeout, or the
/// broken-client blank-line sentinel.
pub async fn handle_connection<S>(stream: S, peer_addr: String, ctx: Arc<ProtocolContext>)
where
    S: tokio::io::AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half).lines();
    let mut writer = ResponseWriter::new(write_half);
    let mut session = Session::new();

    ctx.event_log.log(&format!("Connection from {peer_addr}")).await;
    let greeting_code = ctx.config.server_type.greeting_code();
    let _ = writer
        .send_line(&format!("{greeting_code} {} Papercut NNTP server ready", ctx.config.nntp_hostname))
        .await;

    loop {
        let next = timeout(IDLE_TIMEOUT, reader.next_line()).await;
        let raw = match next {
            Ok(Ok(Some(l))) => l,
            Ok(Ok(None)) => {
                session.terminated = true;
                ctx.event_log.log(&format!("Connection closed (IP Address: {peer_addr})")).await;
                break;
            }
            Ok(Err(_)) => {
                session.terminated = true;
                ctx.event_log.log(&format!("Connection closed (IP Address: {peer_addr})")).await;
                break;
            }
            Err(_) => {
                session.terminated = true;
                ctx.event_log.log(&format!("Connection timed out (IP Address: {peer_addr})")).await;
                break;
            }
        };

        if session.sending_article {
            if raw == "." {
                let reply = finish_post(&mut session, &ctx, &peer_addr).await;
                session.clear_article_buffer();
                if send(&mut writer, reply).await.is_err() {
                    session.terminated = true;
                    break;
                }
            } else {
                session.article_lines.push(raw);
            }
            continue;
        }

        ctx.event_log.log_command(&raw).await;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if session.note_blank_line() {
                session.terminated = true;
                ctx.event_log.log(&format!("Connection closed (IP Address: {peer_addr})")).await;
                break;
            }
            continue;
        }
        session.reset_blank_line_counter();

        let command = Command::parse(trimmed);
        let reply = dispatch(&mut session, &ctx, &command).await;
        let should_close = matches!(reply, Reply::Close(_));
        if should_close {
            session.terminated = true;
        }
        if send(&mut writer, reply).await.is_err() {
            session.terminated = true;
            break;
        }
        if should_close {
            break;
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut ResponseWriter<W>, reply: Reply) -> std::io::Result<()> {
    match reply {
        Reply::Line(l) => writer.send_line(&l).await,
        Reply::Multi(status, lines) => writer.send_multiline(&status, lines.iter().map(String::as_str)).await,
        Reply::Close(l) => writer.send_line(&l).await,
    }
}

/// Dispatch one parsed command to its handler, enforcing the auth gate
/// first.
async fn dispatch(session: &mut Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    if ctx.config.nntp_auth
        && !session.is_authenticated()
        && cmd.verb != "AUTHINFO"
        && cmd.verb != "MODE"
    {
        return line(codes::AUTH_REQUIRED, "Authentication required");
    }

    match cmd.verb.as_str() {
        "GROUP" => cmd_group(session, ctx, cmd),
        "ARTICLE" => cmd_article_like(session, ctx, cmd, ArticleKind::Full),
        "HEAD" => cmd_article_like(session, ctx, cmd, ArticleKind::Head),
        "BODY" => cmd_article_like(session, ctx, cmd, ArticleKind::Body),
        "STAT" => cmd_article_like(session, ctx, cmd, ArticleKind::Stat),
        "NEXT" => cmd_next_last(session, ctx, true),
        "LAST" => cmd_next_last(session, ctx, false),
        "LIST" => cmd_list(ctx, cmd),
        "LISTGROUP" => cmd_listgroup(session, ctx, cmd),
        "NEWGROUPS" => cmd_newgroups(ctx, cmd),
        "NEWNEWS" => cmd_newnews(ctx, cmd),
        "XOVER" | "OVER" => cmd_xover(session, ctx, cmd),
        "XHDR" | "HDR" => cmd_xhdr(session, ctx, cmd),
        "XROVER" => {
            let mut rewritten = cmd.clone();
            rewritten.verb = "XHDR".into();
            rewritten.args.insert(0, "REFERENCES".into());
            cmd_xhdr(session, ctx, &rewritten)
        }
        "XPAT" => cmd_xpat(session, ctx, cmd),
        "XGTITLE" => cmd_xgtitle(ctx, cmd),
        "DATE" => line(codes::SERVER_DATE, &chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()),
        "POST" => cmd_post(session, ctx),
        "AUTHINFO" => cmd_authinfo(session, ctx, cmd),
        "MODE" => cmd_mode(ctx, cmd),
        "IHAVE" => line(codes::ARTICLE_NOT_WANTED, "article not wanted"),
        "SLAVE" => line(codes::SLAVE_STATUS_NOTED, "slave status noted"),
        "HELP" => Reply::Multi(
            format!("{} help text follows", codes::HELP_TEXT_FOLLOWS),
            SUPPORTED_VERBS.iter().map(|v| v.to_string()).collect(),
        ),
        "QUIT" => Reply::Close(format!("{} closing connection - goodbye!", codes::CLOSING_CONNECTION)),
        "XVERSION" => line(codes::READY_POSTING_ALLOWED, "Papercut NNTP server"),
        _ => Reply::Line(NntpError::UnknownCommand(cmd.verb.clone()).reply()),
    }
}

fn cmd_group(session: &mut Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let Some(group) = cmd.arg(0) else {
        return Reply::Line(NntpError::SyntaxError("GROUP requires a group name".into()).reply());
    };
    let Some(backend) = ctx.router.resolve(group) else {
        return Reply::Line(NntpError::NoSuchGroup(group.to_string()).reply());
    };
    let Some(stats) = backend.group_stats(group) else {
        return Reply::Line(NntpError::NoSuchGroup(group.to_string()).reply());
    };
    session.selected_group = Some(group.to_string());
    line(codes::GROUP_SELECTED, &format!("{} {} {} {group}", stats.count, stats.low, stats.high))
}

enum ArticleKind {
    Full,
    Head,
    Body,
    Stat,
}

fn cmd_article_like(session: &mut Session, ctx: &ProtocolContext, cmd: &Command, kind: ArticleKind) -> Reply {
    let Some(group) = session.selected_group.clone() else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };

    let (target_group, number) = match cmd.arg(0) {
        None => {
            let Some(number) = session.selected_article else {
                return Reply::Line(NntpError::NoArticleSelected.reply());
            };
            (group.clone(), number)
        }
        Some(arg) if arg.starts_with('<') => match ctx.router.find_by_message_id(arg) {
            Some((found_group, number, _)) => (found_group, number),
            None => return Reply::Line(NntpError::NoSuchArticleId(arg.to_string()).reply()),
        },
        Some(arg) => {
            let Ok(number) = arg.parse::<u64>() else {
                return Reply::Line(NntpError::SyntaxError("expected an article number".into()).reply());
            };
            (group.clone(), number)
        }
    };

    let Some(backend) = ctx.router.resolve(&target_group) else {
        return Reply::Line(NntpError::NoSuchArticleNumber.reply());
    };
    let Some(msgid) = backend.message_id(&target_group, number) else {
        return Reply::Line(NntpError::NoSuchArticleNumber.reply());
    };

    if !cmd.args.is_empty() && !cmd.arg(0).unwrap().starts_with('<') {
        session.selected_article = Some(number);
        session.selected_group = Some(target_group.clone());
    }

    match kind {
        ArticleKind::Stat => line(codes::ARTICLE_STAT, &format!("{number} {msgid}")),
        ArticleKind::Head => {
            let Some(head) = backend.head(&target_group, number) else {
                return Reply::Line(NntpError::NoSuchArticleNumber.reply());
            };
            Reply::Multi(
                format!("{} {number} {msgid} article retrieved - head follows", codes::HEAD_FOLLOWS),
                head.lines().map(str::to_string).collect(),
            )
        }
        ArticleKind::Body => {
            let Some(body) = backend.body(&target_group, number) else {
                return Reply::Line(NntpError::NoSuchArticleNumber.reply());
            };
            Reply::Multi(
                format!("{} {number} {msgid} article retrieved - body follows", codes::BODY_FOLLOWS),
                body.lines().map(str::to_string).collect(),
            )
        }
        ArticleKind::Full => {
            let Some(article) = backend.article(&target_group, number) else {
                return Reply::Line(NntpError::NoSuchArticleNumber.reply());
            };
            let mut lines: Vec<String> = article.head.lines().map(str::to_string).collect();
            lines.push(String::new());
            lines.extend(article.body.lines().map(str::to_string));
            Reply::Multi(format!("{} {number} {msgid} article retrieved - head and body follow", codes::ARTICLE_FOLLOWS), lines)
        }
    }
}

fn cmd_next_last(session: &mut Session, ctx: &ProtocolContext, is_next: bool) -> Reply {
    let Some(group) = session.selected_group.clone() else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };
    let Some(backend) = ctx.router.resolve(&group) else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };

    let target = if is_next {
        match session.selected_article {
            None => backend.first_article(&group),
            Some(current) => backend.next_article(&group, current),
        }
    } else {
        let Some(current) = session.selected_article else {
            return Reply::Line(NntpError::NoArticleSelected.reply());
        };
        backend.prev_article(&group, current)
    };

    let Some(number) = target else {
        return Reply::Line(if is_next { NntpError::NoNextArticle.reply() } else { NntpError::NoPreviousArticle.reply() });
    };
    session.selected_article = Some(number);
    let msgid = backend.message_id(&group, number).unwrap_or_default();
    line(codes::ARTICLE_STAT, &format!("{number} {msgid}"))
}

fn cmd_list(ctx: &ProtocolContext, cmd: &Command) -> Reply {
    match cmd.arg(0).map(|s| s.to_ascii_uppercase()) {
        None => Reply::Multi(format!("{} list of newsgroups follows", codes::LIST_INFORMATION_FOLLOWS), ctx.router.list_all()),
        Some(sub) if sub == "OVERVIEW.FMT" => Reply::Multi(
            format!("{} information follows", codes::LIST_INFORMATION_FOLLOWS),
            ["Subject:", "From:", "Date:", "Message-ID:", "References:", "Bytes:", "Lines:", "Xref:"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        Some(sub) if sub == "EXTENSIONS" => Reply::Multi(
            format!("{} Extensions supported by server.", codes::LIST_INFORMATION_FOLLOWS),
            vec!["OVER".into(), "HDR".into(), "LISTGROUP".into(), "XPAT".into(), "XGTITLE".into()],
        ),
        Some(sub) if sub == "NEWSGROUPS" => {
            let pat = cmd.arg(1);
            let lines: Vec<String> = ctx
                .router
                .all_backends()
                .flat_map(|b| b.group_names().into_iter().map(move |g| (g, b)))
                .filter(|(g, _)| pat.map(|p| wildmat::matches_list(p, g)).unwrap_or(true))
                .map(|(g, b)| format!("{g} {}", b.group_description(&g).unwrap_or_default()))
                .collect();
            Reply::Multi(format!("{} information follows", codes::LIST_INFORMATION_FOLLOWS), lines)
        }
        Some(_) => Reply::Line(NntpError::SyntaxError("unsupported LIST variant".into()).reply()),
    }
}

fn cmd_listgroup(session: &mut Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let group = match cmd.arg(0) {
        Some(g) => g.to_string(),
        None => match session.selected_group.clone() {
            Some(g) => g,
            None => return Reply::Line(NntpError::NoGroupSelected.reply()),
        },
    };
    let Some(backend) = ctx.router.resolve(&group) else {
        return Reply::Line(NntpError::NoSuchGroup(group).reply());
    };
    let Some(stats) = backend.group_stats(&group) else {
        return Reply::Line(NntpError::NoSuchGroup(group).reply());
    };
    let numbers = backend.listgroup(&group);
    session.selected_group = Some(group.clone());
    session.selected_article = numbers.first().copied();
    Reply::Multi(
        format!("{} {} {} {} {group}", codes::GROUP_SELECTED, stats.count, stats.low, stats.high),
        numbers.iter().map(u64::to_string).collect(),
    )
}

fn cmd_newgroups(ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let (Some(date), Some(time)) = (cmd.arg(0), cmd.arg(1)) else {
        return Reply::Line(NntpError::SyntaxError("NEWGROUPS requires date and time".into()).reply());
    };
    let Some(since) = parse_date_time(date, time) else {
        return Reply::Line(NntpError::SyntaxError("malformed date/time".into()).reply());
    };
    let groups: Vec<String> = ctx.router.all_backends().filter_map(|b| b.newgroups(since)).flatten().collect();
    Reply::Multi(format!("{} list of new newsgroups follows", codes::NEW_NEWSGROUPS_FOLLOW), groups)
}

fn cmd_newnews(ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let (Some(wildmat_arg), Some(date), Some(time)) = (cmd.arg(0), cmd.arg(1), cmd.arg(2)) else {
        return Reply::Line(NntpError::SyntaxError("NEWNEWS requires wildmat, date and time".into()).reply());
    };
    let Some(since) = parse_date_time(date, time) else {
        return Reply::Line(NntpError::SyntaxError("malformed date/time".into()).reply());
    };

    if !wildmat::is_pattern(wildmat_arg) {
        let Some(backend) = ctx.router.resolve(wildmat_arg) else {
            return Reply::Line(NntpError::NoSuchGroup(wildmat_arg.to_string()).reply());
        };
        if !backend.group_exists(wildmat_arg) {
            return Reply::Line(NntpError::NoSuchGroup(wildmat_arg.to_string()).reply());
        }
        let ids = backend.newnews(wildmat_arg, since);
        return Reply::Multi(format!("{} list of new articles follows", codes::NEW_ARTICLE_LIST_FOLLOWS), ids);
    }

    let ids: Vec<String> = ctx
        .router
        .all_backends()
        .flat_map(|b| {
            b.group_names()
                .into_iter()
                .filter(|g| wildmat::matches_list(wildmat_arg, g))
                .flat_map(|g| b.newnews(&g, since))
                .collect::<Vec<_>>()
        })
        .collect();
    Reply::Multi(format!("{} list of new articles follows", codes::NEW_ARTICLE_LIST_FOLLOWS), ids)
}

/// `n`, `n-`, or `n-m`; `None` on malformed input
fn parse_range(arg: &str, high: u64) -> Option<(u64, u64)> {
    if let Some((start, end)) = arg.split_once('-') {
        let start: u64 = start.parse().ok()?;
        let end = if end.is_empty() { high } else { end.parse().ok()? };
        Some((start, end))
    } else {
        let n: u64 = arg.parse().ok()?;
        Some((n, n))
    }
}

fn cmd_xover(session: &Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let Some(group) = session.selected_group.clone() else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };
    let Some(backend) = ctx.router.resolve(&group) else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };
    let Some(stats) = backend.group_stats(&group) else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };

    let (start, end) = match cmd.arg(0) {
        None => {
            let Some(current) = session.selected_article else {
                return Reply::Line(NntpError::NoArticleSelected.reply());
            };
            (current, current)
        }
        Some(arg) => {
            let Some(range) = parse_range(arg, stats.high) else {
                return Reply::Line(NntpError::SyntaxError("malformed range".into()).reply());
            };
            range
        }
    };

    let rows = backend.xover(&group, start, end);
    let host = &ctx.config.nntp_hostname;
    let lines: Vec<String> = rows
        .into_iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\tXref: {host} {group}:{}",
                r.number, r.subject, r.from, r.date, r.message_id, r.references, r.bytes, r.lines, r.number
            )
        })
        .collect();
    Reply::Multi(format!("{} Overview information follows", codes::OVERVIEW_INFO_FOLLOWS), lines)
}

/// Headers `XHDR`/`HDR` may be queried for: the metadata fields the header
/// cache keeps (`DATE`, `FROM`, `MESSAGE-ID`, `SUBJECT`, `REFERENCES`) plus
/// the computed fields `XREF`, `BYTES`, `LINES`. Anything else is `501`.
const XHDR_HEADER_WHITELIST: &[&str] =
    &["DATE", "FROM", "MESSAGE-ID", "SUBJECT", "REFERENCES", "XREF", "BYTES", "LINES"];

fn cmd_xhdr(session: &Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let Some(header) = cmd.arg(0).map(str::to_ascii_uppercase) else {
        return Reply::Line(NntpError::SyntaxError("XHDR requires a header name".into()).reply());
    };
    if !XHDR_HEADER_WHITELIST.contains(&header.as_str()) {
        return Reply::Line(NntpError::SyntaxError(format!("unsupported header: {header}")).reply());
    }
    let Some(group) = session.selected_group.clone() else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };
    let Some(backend) = ctx.router.resolve(&group) else {
        return Reply::Line(NntpError::NoGroupSelected.reply());
    };

    let rows = match cmd.arg(1) {
        Some(arg) if arg.starts_with('<') => match backend.article_number(&group, arg) {
            Some(ArticleLocation { number }) => backend.xhdr(&group, &header, number, number),
            None => return Reply::Line(NntpError::NoSuchArticleId(arg.to_string()).reply()),
        },
        Some(arg) => {
            let Some(stats) = backend.group_stats(&group) else {
                return Reply::Line(NntpError::NoGroupSelected.reply());
            };
            let Some((start, end)) = parse_range(arg, stats.high) else {
                return Reply::Line(NntpError::SyntaxError("malformed range".into()).reply());
            };
            backend.xhdr(&group, &header, start, end)
        }
        None => {
            let Some(current) = session.selected_article else {
                return Reply::Line(NntpError::NoArticleSelected.reply());
            };
            backend.xhdr(&group, &header, current, current)
        }
    };

    Reply::Multi(
        format!("{} Header follows", codes::HEAD_FOLLOWS),
        rows.into_iter().map(|(n, v)| format!("{n} {v}")).collect(),
    )
}

fn cmd_xpat(session: &Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    if cmd.arg_count() < 3 {
        return Reply::Line(NntpError::SyntaxError("XPAT requires header, range, and a pattern".into()).reply());
    }
    let base = cmd_xhdr(session, ctx, &Command { verb: "XHDR".into(), args: cmd.args[..2].to_vec() });
    let Reply::Multi(status, rows) = base else {
        return base;
    };
    let patterns = &cmd.args[2..];
    let filtered = rows
        .into_iter()
        .filter(|row| {
            let value = row.split_once(' ').map(|(_, v)| v).unwrap_or("");
            patterns.iter().any(|p| wildmat::matches(p, value))
        })
        .collect();
    Reply::Multi(status, filtered)
}

fn cmd_xgtitle(ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let pat = cmd.arg(0);
    let lines: Vec<String> = ctx
        .router
        .all_backends()
        .flat_map(|b| b.group_names().into_iter().map(move |g| (g, b)))
        .filter(|(g, _)| pat.map(|p| wildmat::matches_list(p, g)).unwrap_or(true))
        .map(|(g, b)| format!("{g} {}", b.group_description(&g).unwrap_or_default()))
        .collect();
    Reply::Multi(format!("{} list of groups and descriptions follows", codes::GROUPS_AND_DESCRIPTIONS_FOLLOW), lines)
}

fn cmd_post(session: &mut Session, ctx: &ProtocolContext) -> Reply {
    if ctx.config.server_type == crate::config::ServerType::ReadOnly {
        return Reply::Line(NntpError::PostingNotPermitted.reply());
    }
    if ctx.config.nntp_auth && !session.is_authenticated() {
        return Reply::Line(NntpError::AuthRequired.reply());
    }
    session.sending_article = true;
    session.article_lines.clear();
    line(codes::SEND_ARTICLE, "send article to be posted. End with <CR-LF>.<CR-LF>")
}

async fn finish_post(session: &mut Session, ctx: &ProtocolContext, peer_addr: &str) -> Reply {
    let raw: String = session.article_lines.iter().map(|l| format!("{l}\r\n")).collect();
    let groups = crate::posting::target_groups(&raw);
    if groups.is_empty() {
        ctx.event_log.log(&format!("Posting failed: no Newsgroups header (from {peer_addr})")).await;
        return Reply::Line(NntpError::PostingFailed("missing Newsgroups header".into()).reply());
    }

    for group in &groups {
        let Some(backend) = ctx.router.resolve(group) else {
            ctx.event_log.log(&format!("Posting failed: no backend for {group} (from {peer_addr})")).await;
            return Reply::Line(NntpError::PostingFailed(format!("no backend for group {group}")).reply());
        };
        if let Err(e) = backend.post(group, &raw, peer_addr, &session.auth_username) {
            ctx.event_log.log(&format!("Posting failed: {e} (from {peer_addr})")).await;
            return Reply::Line(NntpError::PostingFailed(e.to_string()).reply());
        }
    }
    line(codes::ARTICLE_POSTED, "article posted ok")
}

fn cmd_authinfo(session: &mut Session, ctx: &ProtocolContext, cmd: &Command) -> Reply {
    let Some(sub) = cmd.arg(0) else {
        return Reply::Line(NntpError::SyntaxError("AUTHINFO requires USER or PASS".into()).reply());
    };
    match sub.to_ascii_uppercase().as_str() {
        "USER" => {
            let Some(username) = cmd.arg(1) else {
                return Reply::Line(NntpError::SyntaxError("AUTHINFO USER requires a username".into()).reply());
            };
            if !ctx.config.nntp_auth {
                return line(codes::AUTH_ACCEPTED, "authentication accepted");
            }
            session.pending_username = username.to_string();
            line(codes::AUTH_CONTINUE, "more authentication information required")
        }
        "PASS" => {
            let Some(password) = cmd.arg(1) else {
                return Reply::Line(NntpError::SyntaxError("AUTHINFO PASS requires a password".into()).reply());
            };
            if !ctx.config.nntp_auth {
                return line(codes::AUTH_ACCEPTED, "authentication accepted");
            }
            if ctx.auth.is_valid_user(&session.pending_username, password) {
                session.auth_username = session.pending_username.clone();
                line(codes::AUTH_ACCEPTED, "authentication accepted")
            } else {
                session.auth_username.clear();
                Reply::Line(NntpError::AuthRejected.reply())
            }
        }
        _ => Reply::Line(NntpError::SyntaxError("unknown AUTHINFO subcommand".into()).reply()),
    }
}

fn cmd_mode(ctx: &ProtocolContext, cmd: &Command) -> Reply {
    match cmd.arg(0).map(|s| s.to_ascii_uppercase()) {
        Some(sub) if sub == "READER" => {
            let code = ctx.config.server_type.greeting_code();
            line(code, "server ready")
        }
        Some(sub) if sub == "STREAM" => line(codes::COMMAND_NOT_RECOGNIZED, "Command not understood"),
        _ => Reply::Line(NntpError::SyntaxError("unknown MODE subcommand".into()).reply()),
    }
}
