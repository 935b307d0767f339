use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Generate a Content-Type header
pub fn content_type_header(value: &str) -> Option<tiny_http::Header> {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).ok()
}

/// Check if the given port is available
pub fn is_port_available(port: u16) -> bool {
    TcpListener::bind(format!("0.0.0.0:{port}")).is_ok()
}

/// Path part of a request URL, without query string or fragment
pub fn request_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Open the browser once the server accepts connections
pub fn open_browser_when_ready(port: u16) {
    thread::spawn(move || {
        let url = format!("http://localhost:{port}");
        for _ in 0..50 {
            if TcpStream::connect(("127.0.0.1", port)).is_ok() {
                if let Err(e) = webbrowser::open(&url) {
                    println!("❗ Failed to open browser automatically: {e}");
                }
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
        println!("❗ Server did not come up in time, open {url} manually");
    });
}
