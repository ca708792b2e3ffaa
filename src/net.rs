// Blocking HTTP for CDN downloads and the build notification.
// ref: reqwest::blocking — https://docs.rs/reqwest/latest/reqwest/blocking/

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;

const USER_AGENT: &str = concat!("cordova-hooks/", env!("CARGO_PKG_VERSION"));

pub struct Http {
    client: Client,
}

/// Status and a short body excerpt of a finished request.
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Http {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// GET `url`; any non-2xx status is an error.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send()
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status();
        if !status.is_success() { bail!("GET {} returned {}", url, status); }
        let bytes = resp.bytes().with_context(|| format!("reading body of {}", url))?;
        Ok(bytes.to_vec())
    }

    /// POST a JSON body, optionally with a Bearer token. Non-2xx statuses are
    /// returned, not raised, so callers can report the response body.
    pub fn post_json<T: Serialize>(&self, url: &str, body: &T, bearer: Option<&str>) -> Result<Reply> {
        let mut req = self.client.post(url).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().with_context(|| format!("POST {}", url))?;
        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        Ok(Reply { status, body: excerpt(&body, 200) })
    }
}

pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", &text[..i]),
        None => text.to_string(),
    }
}

/// Single-request HTTP server on an ephemeral port for hook tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serves one request with `status` and `body`. Returns the base URL
    /// (`http://127.0.0.1:port`) and a handle yielding the request's
    /// (head, body).
    pub fn serve_once(status: u16, body: Vec<u8>) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() { break; }
                head.push_str(&line);
            }
            let length = head.lines()
                .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();
            let reply_head = format!(
                "HTTP/1.1 {} X\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                status, body.len()
            );
            let stream = reader.get_mut();
            stream.write_all(reply_head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            (head, String::from_utf8_lossy(&request_body).into_owned())
        });
        (base, handle)
    }

    /// A URL on a port nothing listens on.
    pub fn unreachable_url(path: &str) -> String {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        format!("http://127.0.0.1:{}{}", port, path)
    }
}
