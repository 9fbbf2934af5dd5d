//! Chat-completion client against a local HTTP listener.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use critica::core::{AiConfig, AiError, Completion, OpenAiClient};

fn config(base_url: String, timeout: Duration) -> AiConfig {
    AiConfig {
        api_key: "sk-local".to_string(),
        model: "test-model".to_string(),
        base_url,
        max_completion_tokens: 64,
        timeout,
    }
}

/// Read one HTTP request: headers plus a Content-Length or chunked body.
fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = text[..header_end].to_ascii_lowercase();
        let body = &text[header_end + 4..];

        let length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        let done = match length {
            Some(len) => body.len() >= len,
            None => !headers.contains("chunked") || body.ends_with("0\r\n\r\n"),
        };
        if done {
            return text;
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

/// Serve one connection with `status` and `body`; the request text is sent
/// back over the channel.
fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/v1", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        let _ = tx.send(request);
    });

    (base, rx)
}

#[test]
fn posts_chat_completion_and_reads_reply() {
    let (base, requests) = serve_once(
        "200 OK",
        r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"feat: local"}}]}"#,
    );
    let client = OpenAiClient::new(config(base, Duration::from_secs(10)));

    let reply = client.complete("describe this").unwrap();
    assert_eq!(reply, "feat: local");

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.starts_with("POST /v1/chat/completions "));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-local"));
    assert!(request.contains(r#""model":"test-model""#));
    assert!(request.contains(r#""content":"describe this""#));
    assert!(request.contains(r#""max_completion_tokens":64"#));
}

#[test]
fn error_status_is_reported() {
    let (base, _requests) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#);
    let client = OpenAiClient::new(config(base, Duration::from_secs(10)));

    match client.complete("hi") {
        Err(AiError::Status(401)) => {}
        other => panic!("expected HTTP 401, got {:?}", other),
    }
}

#[test]
fn slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/v1", listener.local_addr().unwrap());
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(5));
        drop(stream);
    });

    let timeout = Duration::from_millis(300);
    let client = OpenAiClient::new(config(base, timeout));
    match client.complete("hi") {
        Err(AiError::Timeout(t)) => assert_eq!(t, timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn unreachable_server_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);

    let client = OpenAiClient::new(config(base, Duration::from_secs(5)));
    assert!(matches!(client.complete("hi"), Err(AiError::Request(_))));
}
