use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::data::PresetStore;
use crate::parallel::WorkerPool;

pub mod api;
pub mod routes;

pub use api::ApiContext;

impl ApiContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            presets: PresetStore::open(&config.presets_path),
            pool: WorkerPool::with_workers(config.workers),
        }
    }
}

pub fn run_server(config: &AppConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_addr)?;
    let ctx = ApiContext::from_config(config);
    info!(
        bind = %config.bind_addr,
        presets = %ctx.presets.path().display(),
        "cdr-heatmap server listening"
    );
    println!("cdr-heatmap server listening on http://{}", config.bind_addr);

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&ctx, &mut stream) {
                    warn!(%err, "request error");
                }
            }
            Err(err) => warn!(%err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(ctx: &ApiContext, stream: &mut TcpStream) -> std::io::Result<()> {
    let raw = read_request(stream)?;
    if raw.is_empty() {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&raw);
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let body = request
        .split("\r\n\r\n")
        .nth(1)
        .or_else(|| request.split("\n\n").nth(1))
        .unwrap_or("");

    let response = routes::route_request(ctx, method, path, body);
    info!(method, path, status = response.status_code, "handled request");
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}

const MAX_REQUEST_BYTES: usize = 1 << 20;

/// Read the head, then keep reading until `Content-Length` body bytes arrive
/// or the peer closes.
fn read_request<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    let mut chunk = [0_u8; 8_192];

    let head_end = loop {
        if let Some(end) = find_head_end(&raw) {
            break end;
        }
        if raw.len() >= MAX_REQUEST_BYTES {
            return Ok(raw);
        }
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            return Ok(raw);
        }
        raw.extend_from_slice(&chunk[..n]);
    };

    let wanted = content_length(&raw[..head_end])
        .map_or(raw.len(), |len| head_end + len)
        .min(MAX_REQUEST_BYTES);
    while raw.len() < wanted {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
    }
    Ok(raw)
}

/// Offset just past the blank line ending the headers.
fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
        .or_else(|| raw.windows(2).position(|w| w == b"\n\n").map(|pos| pos + 2))
}

fn content_length(head: &[u8]) -> Option<usize> {
    String::from_utf8_lossy(head).lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}
