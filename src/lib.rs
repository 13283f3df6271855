pub mod application;
pub mod config;
pub mod export;
pub mod github;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod runtime;

#[cfg(test)]
pub mod test_utils {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serves canned JSON for the listed paths and drops the connection
    /// without answering for every other path. Returns the base URL.
    pub async fn dropping_server(routes: Vec<(&'static str, &'static str)>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();

                if let Some((_, body)) = routes.iter().find(|(p, _)| *p == path) {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
            }
        });

        format!("http://{}", addr)
    }
}
