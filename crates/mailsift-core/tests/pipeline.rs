//! Session, pipeline and flag tests against a scripted server.
//!
//! Every script is the complete server side of one session, and every test
//! checks the commands the client put on the wire.

#![allow(clippy::unwrap_used)]

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use mailsift_core::{
    Error, FetchOptions, FetchResult, FetchStream, Flag, MailSession, MailboxConfig,
    SearchCriteria, Uid,
};

#[derive(Debug)]
struct MockStream {
    script: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(script: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            script: Cursor::new(script.to_vec()),
            sent: Arc::clone(&sent),
        };
        (stream, sent)
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let pos = usize::try_from(self.script.position()).unwrap();
        let data = self.script.get_ref();
        let n = data.len().saturating_sub(pos).min(buf.remaining());
        buf.put_slice(&data[pos..pos + n]);
        self.script.set_position((pos + n) as u64);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn sent_text(sent: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&sent.lock().unwrap()).into_owned()
}

/// Lets the worker task run until `needle` is on the wire.
async fn wait_for(sent: &Arc<Mutex<Vec<u8>>>, needle: &str) {
    for _ in 0..200 {
        if sent_text(sent).contains(needle) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("{needle:?} never sent; wire was {:?}", sent_text(sent));
}

/// Three plain messages, UIDs 1 to 3, answered to `UID FETCH` (A0003).
fn three_messages(script: &mut Vec<u8>) {
    script.extend_from_slice(b"* SEARCH 1 2 3\r\nA0002 OK SEARCH completed\r\n");
    for uid in 1..=3 {
        script.extend(fetch_response(uid, uid, &text_message("m", "body")));
    }
    script.extend_from_slice(b"A0003 OK FETCH completed\r\n");
}

/// Greeting, LOGIN (A0000) and SELECT (A0001).
fn opened() -> Vec<u8> {
    b"* OK ready\r\nA0000 OK LOGIN completed\r\n* 3 EXISTS\r\nA0001 OK [READ-WRITE] done\r\n".to_vec()
}

/// CLOSE and LOGOUT answered with tags `close` and `close + 1`.
fn teardown(script: &mut Vec<u8>, close: u32) {
    script.extend_from_slice(format!("A{close:04} OK CLOSE completed\r\n").as_bytes());
    script.extend_from_slice(format!("* BYE bye\r\nA{:04} OK LOGOUT completed\r\n", close + 1).as_bytes());
}

fn text_message(subject: &str, body: &str) -> (Vec<u8>, Vec<u8>) {
    let header = format!("Subject: {subject}\r\nContent-Type: text/plain\r\n").into_bytes();
    let mut raw = header.clone();
    raw.extend_from_slice(b"\r\n");
    raw.extend_from_slice(body.as_bytes());
    (header, raw)
}

fn broken_message() -> (Vec<u8>, Vec<u8>) {
    let header = b"Subject: broken\r\nContent-Type: multipart/mixed\r\n".to_vec();
    let mut raw = header.clone();
    raw.extend_from_slice(b"\r\nno boundary here");
    (header, raw)
}

fn fetch_response(seq: u32, uid: u32, (header, raw): &(Vec<u8>, Vec<u8>)) -> Vec<u8> {
    let mut out = format!(
        "* {seq} FETCH (UID {uid} INTERNALDATE \"17-Jul-2023 02:44:25 -0700\" RFC822.HEADER {{{}}}\r\n",
        header.len()
    )
    .into_bytes();
    out.extend_from_slice(header);
    out.extend_from_slice(format!(" BODY[] {{{}}}\r\n", raw.len()).as_bytes());
    out.extend_from_slice(raw);
    out.extend_from_slice(b")\r\n");
    out
}

fn config() -> MailboxConfig {
    MailboxConfig::new("mock.example.com", "alice", "pw")
}

async fn session(script: &[u8], config: &MailboxConfig) -> (MailSession<MockStream>, Arc<Mutex<Vec<u8>>>) {
    let (stream, sent) = MockStream::new(script);
    let session = MailSession::from_stream(stream, config).await.unwrap();
    (session, sent)
}

#[tokio::test]
async fn test_empty_search_sends_no_fetch() {
    let mut script = opened();
    script.extend_from_slice(b"* SEARCH\r\nA0002 OK SEARCH completed\r\n");
    teardown(&mut script, 3);

    let (session, sent) = session(&script, &config()).await;
    let stream = FetchStream::spawn(session, SearchCriteria::unseen(), FetchOptions::default());
    let (emails, errors) = stream.collect().await;

    assert!(emails.is_empty());
    assert!(errors.is_empty());
    let sent = sent_text(&sent);
    assert!(!sent.contains("FETCH"));
    assert!(sent.ends_with("A0002 UID SEARCH UNSEEN\r\nA0003 CLOSE\r\nA0004 LOGOUT\r\n"));
}

#[tokio::test]
async fn test_one_bad_message_does_not_stop_the_batch() {
    let mut script = opened();
    script.extend_from_slice(b"* SEARCH 1 2 3\r\nA0002 OK SEARCH completed\r\n");
    script.extend(fetch_response(1, 1, &text_message("first", "one")));
    script.extend(fetch_response(2, 2, &broken_message()));
    script.extend_from_slice(b"* 2 FETCH (FLAGS (\\Recent))\r\n");
    script.extend(fetch_response(3, 3, &text_message("third", "three")));
    script.extend_from_slice(b"A0003 OK FETCH completed\r\n");
    script.extend_from_slice(b"A0004 OK STORE completed\r\nA0005 OK STORE completed\r\n");
    teardown(&mut script, 6);

    let (session, sent) = session(&script, &config()).await;
    let mut stream = FetchStream::spawn(session, SearchCriteria::all(), FetchOptions::default());

    let mut results = Vec::new();
    while let Some(result) = stream.next().await {
        results.push(result);
    }
    assert_eq!(results.len(), 3);
    assert!(matches!(&results[0], FetchResult::Email(e) if e.uid == 1 && e.subject == "first"));
    assert!(matches!(
        &results[1],
        FetchResult::Failed { uid: Some(2), error: Error::Decode { .. } }
    ));
    assert!(matches!(&results[2], FetchResult::Email(e) if e.uid == 3 && e.text == b"three"));

    let sent = sent_text(&sent);
    assert!(sent.contains("A0003 UID FETCH 1:3 (INTERNALDATE BODY[] UID RFC822.HEADER)\r\n"));
    assert!(sent.contains("A0004 UID STORE 1 -FLAGS (\\Seen)\r\nA0005 UID STORE 3 -FLAGS (\\Seen)\r\n"));
    assert!(!sent.contains("UID STORE 2"));
}

#[tokio::test]
async fn test_search_failure_is_single_abort() {
    let mut script = opened();
    script.extend_from_slice(b"A0002 NO [CANNOT] search not allowed\r\n");
    teardown(&mut script, 3);

    let (session, sent) = session(&script, &config()).await;
    let mut stream = FetchStream::spawn(session, SearchCriteria::all(), FetchOptions::default());

    assert!(matches!(stream.next().await, Some(FetchResult::Aborted(Error::Search(_)))));
    assert!(stream.next().await.is_none());
    assert!(sent_text(&sent).ends_with("A0003 CLOSE\r\nA0004 LOGOUT\r\n"));
}

#[tokio::test]
async fn test_fetch_failure_is_single_abort() {
    let mut script = opened();
    script.extend_from_slice(b"* SEARCH 9\r\nA0002 OK\r\nA0003 BAD fetch rejected\r\n");
    teardown(&mut script, 4);

    let (session, _) = session(&script, &config()).await;
    let stream = FetchStream::spawn(session, SearchCriteria::all(), FetchOptions::default());
    let (emails, errors) = stream.collect().await;
    assert!(emails.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::FetchCommand(_)));
    assert!(errors[0].is_fatal());
}

#[tokio::test]
async fn test_mark_read_and_delete() {
    let mut script = opened();
    script.extend_from_slice(b"* SEARCH 7\r\nA0002 OK\r\n");
    script.extend(fetch_response(1, 7, &text_message("hi", "body")));
    script.extend_from_slice(b"A0003 OK\r\nA0004 OK\r\nA0005 OK\r\n");
    teardown(&mut script, 6);

    let (session, sent) = session(&script, &config()).await;
    let options = FetchOptions::default().mark_as_read(true).delete(true);
    let (emails, errors) = FetchStream::spawn(session, SearchCriteria::all(), options)
        .collect()
        .await;

    assert_eq!(emails.len(), 1);
    assert!(errors.is_empty());
    assert!(sent_text(&sent).ends_with(
        "A0004 UID STORE 7 +FLAGS (\\Seen)\r\n\
         A0005 UID STORE 7 +FLAGS (\\Deleted)\r\n\
         A0006 CLOSE\r\n\
         A0007 LOGOUT\r\n"
    ));
}

#[tokio::test]
async fn test_failed_seen_change_skips_delete() {
    let mut script = opened();
    script.extend_from_slice(b"* SEARCH 7\r\nA0002 OK\r\n");
    script.extend(fetch_response(1, 7, &text_message("hi", "body")));
    script.extend_from_slice(b"A0003 OK\r\nA0004 NO [READ-ONLY] cannot store\r\n");
    teardown(&mut script, 5);

    let (session, sent) = session(&script, &config()).await;
    let options = FetchOptions::default().mark_as_read(true).delete(true);
    let (emails, errors) = FetchStream::spawn(session, SearchCriteria::all(), options)
        .collect()
        .await;

    assert_eq!(emails.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::FlagMutation { uid: 7, .. }));
    assert!(!sent_text(&sent).contains("\\Deleted"));
}

#[tokio::test]
async fn test_cancel_before_search_still_closes() {
    let mut script = opened();
    teardown(&mut script, 2);

    let (session, sent) = session(&script, &config()).await;
    let stream = FetchStream::spawn(session, SearchCriteria::all(), FetchOptions::default());
    stream.cancel();
    let (emails, errors) = stream.collect().await;

    assert!(emails.is_empty() && errors.is_empty());
    let sent = sent_text(&sent);
    assert!(!sent.contains("SEARCH"));
    assert!(sent.ends_with("A0002 CLOSE\r\nA0003 LOGOUT\r\n"));
}

#[tokio::test]
async fn test_abandoned_stream_releases_session_once() {
    let mut script = opened();
    three_messages(&mut script);
    script.extend_from_slice(b"A0004 OK STORE completed\r\n");
    teardown(&mut script, 5);

    let (session, sent) = session(&script, &config()).await;
    let options = FetchOptions::default().buffer_size(1);
    let mut stream = FetchStream::spawn(session, SearchCriteria::all(), options);
    assert!(matches!(stream.next().await, Some(FetchResult::Email(e)) if e.uid == 1));
    drop(stream);

    wait_for(&sent, "LOGOUT").await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let sent = sent_text(&sent);
    assert!(sent.ends_with(
        "A0004 UID STORE 1 -FLAGS (\\Seen)\r\n\
         A0005 CLOSE\r\n\
         A0006 LOGOUT\r\n"
    ));
    assert_eq!(sent.matches("CLOSE").count(), 1);
    assert_eq!(sent.matches("LOGOUT").count(), 1);
    assert!(!sent.contains("UID STORE 2"));
}

#[tokio::test]
async fn test_full_buffer_holds_the_producer() {
    let mut script = opened();
    three_messages(&mut script);
    script.extend_from_slice(b"A0004 OK\r\nA0005 OK\r\nA0006 OK\r\n");
    teardown(&mut script, 7);

    let (session, sent) = session(&script, &config()).await;
    let options = FetchOptions::default().buffer_size(1);
    let stream = FetchStream::spawn(session, SearchCriteria::all(), options);

    // Message 1 fills the buffer; message 2 waits, so its STORE is not sent.
    wait_for(&sent, "UID STORE 1 ").await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(!sent_text(&sent).contains("UID STORE 2"));

    let (emails, errors) = stream.collect().await;
    assert_eq!(emails.iter().map(|e| e.uid).collect::<Vec<_>>(), [1, 2, 3]);
    assert!(errors.is_empty());
    assert!(sent_text(&sent).ends_with(
        "A0006 UID STORE 3 -FLAGS (\\Seen)\r\nA0007 CLOSE\r\nA0008 LOGOUT\r\n"
    ));
}

#[tokio::test]
async fn test_batch_flag_change_stops_at_first_failure() {
    let mut script = opened();
    script.extend_from_slice(b"A0002 OK\r\nA0003 NO no such message\r\n");
    teardown(&mut script, 4);

    let (mut session, sent) = session(&script, &config()).await;
    let uids: Vec<Uid> = [1, 2, 3].into_iter().filter_map(Uid::new).collect();
    let err = session.apply_flag(&uids, &Flag::Seen, true).await.unwrap_err();
    assert!(matches!(err, Error::FlagMutation { uid: 2, .. }));
    assert_eq!(err.uid(), Some(2));
    session.close().await;

    let sent = sent_text(&sent);
    assert!(sent.contains("A0003 UID STORE 2 +FLAGS (\\Seen)\r\n"));
    assert!(!sent.contains("UID STORE 3"));
    assert!(sent.ends_with("A0004 CLOSE\r\nA0005 LOGOUT\r\n"));
}

#[tokio::test]
async fn test_read_only_examines_configured_folder() {
    let mut config = config();
    config.read_only = true;
    config.folder = "Archive".into();
    let mut script = b"* OK ready\r\nA0000 OK\r\nA0001 OK [READ-ONLY] done\r\n".to_vec();
    teardown(&mut script, 2);

    let (session, sent) = session(&script, &config).await;
    assert_eq!(session.folder(), "Archive");
    session.close().await;
    assert!(sent_text(&sent).contains("A0001 EXAMINE Archive\r\n"));
}

#[tokio::test]
async fn test_teardown_logs_out_even_when_close_fails() {
    let mut script = opened();
    script.extend_from_slice(b"A0002 NO close failed\r\n* BYE\r\nA0003 OK\r\n");

    let (session, sent) = session(&script, &config()).await;
    session.close().await;
    assert!(sent_text(&sent).ends_with("A0002 CLOSE\r\nA0003 LOGOUT\r\n"));
}

#[tokio::test]
async fn test_session_errors_are_classified() {
    let (stream, _) = MockStream::new(b"* BYE go away\r\n");
    let err = MailSession::from_stream(stream, &config()).await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)));

    let (stream, _) = MockStream::new(b"* OK\r\nA0000 NO [AUTHENTICATIONFAILED] nope\r\n");
    let err = MailSession::from_stream(stream, &config()).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));

    let (stream, _) = MockStream::new(b"* OK\r\nA0000 OK\r\nA0001 NO [NONEXISTENT] missing\r\n");
    let err = MailSession::from_stream(stream, &config()).await.unwrap_err();
    assert!(matches!(err, Error::Folder { ref folder, .. } if folder == "INBOX"));
    assert!(err.is_fatal());
}
