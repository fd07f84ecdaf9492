use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned response for one request target (path plus query).
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {status}"),
        }
    }
}

/// Serve canned HTML on a random localhost port. Returns the base URL.
///
/// Requests are matched on the full target first, then on the path alone.
/// Unknown targets get a 404.
pub async fn serve(routes: Vec<(&str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(target, route)| (target.to_string(), route))
            .collect(),
    );

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let head = read_request_head(&mut socket).await;
                let target = request_target(&head);
                let path = target.split('?').next().unwrap_or("/").to_string();
                let route = routes
                    .get(&target)
                    .or_else(|| routes.get(&path))
                    .cloned()
                    .unwrap_or_else(|| Route::status(404));
                respond(&mut socket, &route).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Answer every request with its `User-Agent` header as the body.
pub async fn serve_user_agent_echo() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let head = read_request_head(&mut socket).await;
                let agent = header(&head, "user-agent").unwrap_or_default();
                respond(&mut socket, &Route::ok(agent)).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Accept connections but never answer. Returns the base URL.
pub async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    format!("http://{addr}")
}

/// A localhost URL with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn respond(socket: &mut TcpStream, route: &Route) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        reason(route.status),
        route.body.len(),
        route.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    while read < buf.len() {
        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf[..read]).into_owned()
}

fn request_target(head: &str) -> String {
    head.split_whitespace().nth(1).unwrap_or("/").to_string()
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
