//! Stub backend for exercising checks end-to-end in tests.
//!
//! Serves both external surfaces (status API and record store REST) from one
//! local listener, with switchable misbehaviors per scenario.

use std::io::Read;
use std::thread;

use serde_json::{json, Value};
use tiny_http::{Header, Response, Server};

use crate::config::{
    ConnectionConfig, StaticProvider, BACKEND_URL_VAR, STORE_KEY_VAR, STORE_URL_VAR,
};

/// Behavior switches for the stub backend.
#[derive(Clone, Debug)]
pub struct StubOptions {
    pub greeting: String,
    pub deny_insert: bool,
    pub reject_insert_with: Option<u16>,
    pub schema_missing_role: bool,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            greeting: "Hello World".to_string(),
            deny_insert: false,
            reject_insert_with: None,
            schema_missing_role: false,
        }
    }
}

/// Spawn the stub backend on an ephemeral port, returning its base URL.
pub fn spawn_backend(options: StubOptions) -> String {
    let server = Server::http("127.0.0.1:0").expect("bind stub backend");
    let base = format!("http://{}", server.server_addr());

    thread::spawn(move || {
        let mut statuses: Vec<Value> = Vec::new();
        let mut next_id = 1u64;

        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);

            let method = request.method().to_string();
            let url = request.url().to_string();
            let path = url.split('?').next().unwrap_or(&url).to_string();

            let (code, payload) = route(
                &method,
                &path,
                &body,
                &options,
                &mut statuses,
                &mut next_id,
            );

            let response = Response::from_string(payload)
                .with_status_code(code)
                .with_header(json_header());
            let _ = request.respond(response);
        }
    });

    base
}

/// Connection config pointing both services at the stub.
pub fn config_for(base: &str) -> ConnectionConfig {
    let provider = StaticProvider::new()
        .with(BACKEND_URL_VAR, base)
        .with(STORE_URL_VAR, base)
        .with(STORE_KEY_VAR, "stub-anon-key-0123456789");
    ConnectionConfig::resolve(&provider).expect("stub config resolves")
}

fn route(
    method: &str,
    path: &str,
    body: &str,
    options: &StubOptions,
    statuses: &mut Vec<Value>,
    next_id: &mut u64,
) -> (u16, String) {
    match (method, path) {
        ("GET", "/api/") => (200, json!({ "message": options.greeting }).to_string()),

        ("POST", "/api/status") => {
            let submitted: Value = serde_json::from_str(body).unwrap_or_default();
            let record = json!({
                "client_name": submitted.get("client_name").cloned().unwrap_or(Value::Null),
                "id": format!("status-{next_id}"),
                "timestamp": format!("2025-06-01T00:00:{:02}Z", *next_id % 60),
            });
            *next_id += 1;
            statuses.push(record.clone());
            (200, record.to_string())
        }

        ("GET", "/api/status") => (200, Value::Array(statuses.clone()).to_string()),

        ("GET", "/rest/v1/") => (200, schema_document(options).to_string()),

        ("GET", "/rest/v1/waitlist") => (200, "[]".to_string()),

        ("POST", "/rest/v1/waitlist") => {
            if options.deny_insert {
                return (
                    403,
                    json!({
                        "code": "42501",
                        "message": "new row violates row-level security policy for table \"waitlist\"",
                    })
                    .to_string(),
                );
            }
            if let Some(code) = options.reject_insert_with {
                return (code, json!({ "message": "insert rejected" }).to_string());
            }

            let mut row: Value = serde_json::from_str(body).unwrap_or_default();
            if let Some(object) = row.as_object_mut() {
                object.insert("id".to_string(), json!(*next_id));
                object
                    .entry("created_at".to_string())
                    .or_insert(json!("2025-06-01T00:00:00.000Z"));
            }
            *next_id += 1;
            (201, Value::Array(vec![row]).to_string())
        }

        _ => (404, json!({ "message": "not found" }).to_string()),
    }
}

fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("static header")
}

fn schema_document(options: &StubOptions) -> Value {
    let mut properties = json!({
        "id": { "type": "integer" },
        "first_name": { "type": "string" },
        "last_name": { "type": "string" },
        "email": { "type": "string" },
        "institution": { "type": "string" },
        "role": { "type": "string" },
        "student_count": { "type": "string" },
        "created_at": { "type": "string", "format": "timestamp with time zone" },
    });

    if options.schema_missing_role {
        if let Some(object) = properties.as_object_mut() {
            object.remove("role");
        }
    }

    json!({
        "paths": { "/": {}, "/waitlist": {} },
        "definitions": { "waitlist": { "properties": properties } },
    })
}
