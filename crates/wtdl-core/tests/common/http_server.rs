//! Minimal HTTP/1.1 server for exercising the libcurl transport.
//!
//! Fixed routes:
//! - `/file`: 200 with the configured body, `Content-Length` and `Content-Disposition`
//! - `/hop/N`: 302 to `/hop/N-1`, and `/hop/0` is 200 (a redirect chain of length N)
//! - `/loop`: 302 to itself
//! - `/stuck`: 302 without a `Location` header
//! - `/missing`: 404
//! - `/echo` (POST): 200, body echoes the request body, `X-Seen-*` echo selected headers
//! - `/slow`: waits 3 s before answering
//! - `/session`: 200 landing page with a token and two `Set-Cookie` headers

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const FILE_NAME: &str = "served file.bin";

/// Starts a server in a background thread serving `body` at `/file`. Returns
/// the base URL (e.g. "http://127.0.0.1:12345/"). Runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn handle(mut stream: TcpStream, file_body: &[u8]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    let head_only = req.method.eq_ignore_ascii_case("HEAD");

    let (status, headers, body): (&str, Vec<String>, Vec<u8>) = match req.path.as_str() {
        "/file" => (
            "200 OK",
            vec![format!(
                "Content-Disposition: attachment; filename=\"{}\"",
                FILE_NAME
            )],
            file_body.to_vec(),
        ),
        "/loop" => ("302 Found", vec!["Location: /loop".into()], Vec::new()),
        "/stuck" => ("302 Found", Vec::new(), Vec::new()),
        "/echo" if req.method == "POST" => {
            let mut echoed = Vec::new();
            for name in ["x-csrf-token", "x-requested-with", "content-type", "cookie", "user-agent"] {
                if let Some(v) = req.header(name) {
                    echoed.push(format!("X-Seen-{}: {}", name, v));
                }
            }
            ("200 OK", echoed, req.body.clone())
        }
        "/slow" => {
            thread::sleep(Duration::from_secs(3));
            ("200 OK", Vec::new(), b"late".to_vec())
        }
        "/session" => (
            "200 OK",
            vec![
                "Content-Type: text/html".into(),
                "Set-Cookie: _session=s3ss; Path=/; HttpOnly".into(),
                "Set-Cookie: locale=en; Path=/".into(),
            ],
            b"<html><head><meta name=\"csrf-token\" content=\"live-token\"></head></html>".to_vec(),
        ),
        path => match path.strip_prefix("/hop/").and_then(|n| n.parse::<u32>().ok()) {
            Some(0) => ("200 OK", Vec::new(), b"landed".to_vec()),
            Some(n) => (
                "302 Found",
                vec![format!("Location: /hop/{}", n - 1)],
                Vec::new(),
            ),
            None => ("404 Not Found", Vec::new(), b"not found".to_vec()),
        },
    };

    let mut response = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", status, body.len());
    for h in &headers {
        response.push_str(h);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    let _ = stream.write_all(response.as_bytes());
    if !head_only {
        let _ = stream.write_all(&body);
    }
}

/// Reads one request: header block plus a `Content-Length` body.
fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?;
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = data[header_end..].to_vec();

    Some(Request {
        method,
        path,
        headers,
        body,
    })
}
