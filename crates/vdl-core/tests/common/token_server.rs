//! Minimal HTTP/1.1 server for download integration tests.
//!
//! Serves one canned response per connection and records each request head
//! so tests can assert on the exact path, query, and headers sent.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TokenServerOptions {
    /// Status line after "HTTP/1.1 ", e.g. "200 OK" or "503 Service Unavailable".
    pub status: String,
    /// Response body sent after the header block.
    pub body: Vec<u8>,
    /// Send the body in slices of this size with a pause between slices.
    /// `None` sends it in one write.
    pub dribble: Option<(usize, Duration)>,
}

impl Default for TokenServerOptions {
    fn default() -> Self {
        Self {
            status: "200 OK".to_string(),
            body: Vec::new(),
            dribble: None,
        }
    }
}

/// Request heads seen by the server, one string per request.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Starts a server in a background thread. Returns the authority
/// ("127.0.0.1:port") to point a config at, plus the request log. The server
/// runs until the process exits.
pub fn start(opts: TokenServerOptions) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = opts.clone();
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &opts, &log));
        }
    });
    (format!("127.0.0.1:{}", port), requests)
}

fn handle(mut stream: std::net::TcpStream, opts: &TokenServerOptions, log: &RequestLog) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    if let Ok(head) = std::str::from_utf8(&buf[..n]) {
        log.lock().unwrap().push(head.to_string());
    }

    let header = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        opts.body.len()
    );
    if stream.write_all(header.as_bytes()).is_err() {
        return;
    }
    match opts.dribble {
        Some((piece_len, delay)) => {
            for piece in opts.body.chunks(piece_len.max(1)) {
                if stream.write_all(piece).is_err() {
                    return;
                }
                let _ = stream.flush();
                thread::sleep(delay);
            }
        }
        None => {
            let _ = stream.write_all(&opts.body);
        }
    }
}
