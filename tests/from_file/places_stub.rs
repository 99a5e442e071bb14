//! Minimal HTTP/1.1 server answering the two place endpoints from canned JSON.

use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

pub struct PlacesStub {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
}

impl PlacesStub {
    /// Starts the stub on an ephemeral port. It serves until the test process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let counter = counter.clone();
                thread::spawn(move || serve(stream, &counter));
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn serve(stream: TcpStream, counter: &AtomicUsize) {
    let mut reader = BufReader::new(stream.try_clone().expect("failed to clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    // Skip the headers; GET requests carry no body.
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
            Err(_) => return,
        }
    }
    counter.fetch_add(1, Ordering::SeqCst);

    let target = request_line.split_whitespace().nth(1).unwrap_or_default();
    let body = respond(target);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn respond(target: &str) -> String {
    if target.starts_with("/autocomplete/json") {
        if !target.contains("key=stub-key") {
            return r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#
                .to_string();
        }
        if target.contains("input=Acme") {
            return r#"{"status":"OK","predictions":[{"place_id":"place-acme","description":"Acme Bakery"},{"place_id":"place-other"}]}"#.to_string();
        }
        return r#"{"status":"ZERO_RESULTS","predictions":[]}"#.to_string();
    }
    if target.starts_with("/details/json") && target.contains("place_id=place-acme") {
        return r#"{"status":"OK","result":{"formatted_address":"1 Main St","international_phone_number":"555-0100","website":"acme.test"}}"#.to_string();
    }
    r#"{"status":"NOT_FOUND"}"#.to_string()
}
