//! One-shot HTTP endpoint for tests that exercise real `reqwest` clients.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;

pub(crate) struct MockHttpServer {
    addr: SocketAddr,
    request_rx: Receiver<String>,
}

impl MockHttpServer {
    /// Accept a single connection, capture its request and answer with
    /// the given status and body.
    pub(crate) fn respond(status: u16, content_type: &str, body: &[u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, request_rx) = crossbeam_channel::bounded(1);
        let content_type = content_type.to_string();
        let body = body.to_vec();

        thread::spawn(move || {
            if let Some(Ok(mut stream)) = listener.incoming().next() {
                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let head = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    reason(status),
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self { addr, request_rx }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The raw request (head and body) received by the server.
    pub(crate) fn request(&self) -> String {
        self.request_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("mock server received no request")
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&data).into_owned(),
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = find_subsequence(&data, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// Split a captured request into its body.
pub(crate) fn request_body(request: &str) -> &str {
    request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

/// Write a 16-bit PCM WAV containing a 440 Hz tone.
pub(crate) fn write_wav(path: &std::path::Path, sample_rate: u32, channels: u16, seconds: f64) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    let frames = (seconds * sample_rate as f64) as usize;
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.3 * i16::MAX as f64) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }

    writer.finalize().unwrap();
}

/// Channel count and sample rate from a WAV file's header.
pub(crate) fn wav_format(path: &std::path::Path) -> (u16, u32) {
    let spec = hound::WavReader::open(path).unwrap().spec();
    (spec.channels, spec.sample_rate)
}
