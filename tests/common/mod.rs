//! Shared test utilities: an in-process mock of the reports backend

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

/// Canned response for one route
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl MockResponse {
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            content_type: "text/plain",
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            content_type: "application/json",
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            body: body.to_vec(),
            content_type: "text/csv",
        }
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string
    pub url: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

type Routes = HashMap<(String, String), VecDeque<MockResponse>>;

/// Scripted routes, consumed in order; the last response for a route repeats
#[derive(Default)]
pub struct MockBackendBuilder {
    routes: Routes,
}

impl MockBackendBuilder {
    pub fn respond(mut self, method: &str, path: &str, response: MockResponse) -> Self {
        self.routes
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn start(self) -> MockBackend {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind mock backend");
        let port = server
            .server_addr()
            .to_ip()
            .expect("Mock backend has no IP address")
            .port();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let requests = requests.clone();
            let stop = stop.clone();
            let mut routes = self.routes;
            std::thread::spawn(move || serve(server, &mut routes, &requests, &stop))
        };

        MockBackend {
            url: format!("http://127.0.0.1:{port}"),
            requests,
            stop,
            handle: Some(handle),
        }
    }
}

fn serve(
    server: Server,
    routes: &mut Routes,
    requests: &Mutex<Vec<RecordedRequest>>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::SeqCst) {
        let request = match server.recv_timeout(Duration::from_millis(20)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(_) => break,
        };

        let recorded = RecordedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            authorization: request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string()),
        };

        let key = (recorded.method.clone(), recorded.path().to_string());
        let scripted = routes.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
        requests.lock().unwrap().push(recorded);

        let response = scripted.unwrap_or_else(|| MockResponse::text(404, ""));
        let header = Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes())
            .expect("Invalid content type header");
        let _ = request.respond(
            Response::from_data(response.body)
                .with_status_code(response.status)
                .with_header(header),
        );
    }
}

/// Mock reports backend on a random local port
pub struct MockBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for `method` + `path`
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// `{"jobId":..,"progress":..,"state":..,"message":..}` status body
pub fn status_json(job_id: &str, progress: u32, state: &str, message: Option<&str>) -> String {
    serde_json::json!({
        "jobId": job_id,
        "progress": progress,
        "state": state,
        "message": message,
    })
    .to_string()
}
