//! In-process stub of the lexicon server
//!
//! Serves the endpoints the client speaks: a scripted notification channel
//! on /websockreg, the multipart import endpoint, and the JSON admin
//! surface. Requests are recorded so tests can assert what went over the
//! wire — and that gated submissions never reached it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// What the stub pushes over an accepted notification channel.
#[derive(Clone, Default)]
pub struct ChannelScript {
    /// Text frames pushed after the registration frame arrives, in order
    pub frames: Vec<String>,
    /// Close the socket once the scripted frames are sent
    pub close_after: bool,
}

/// Scripted response for the import endpoint, keyed by lexicon name so
/// concurrent submissions get deterministic answers.
#[derive(Clone)]
pub struct ImportResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Default)]
struct StubInner {
    channel_script: Mutex<ChannelScript>,
    import_responses: Mutex<HashMap<String, ImportResponse>>,
    registrations: Mutex<Vec<String>>,
    import_forms: Mutex<Vec<HashMap<String, String>>>,
    import_hits: AtomicUsize,
}

#[derive(Clone, Default)]
struct StubState {
    inner: Arc<StubInner>,
}

/// Stub server instance bound to an ephemeral local port.
pub struct StubServer {
    addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Start a stub server on an ephemeral port.
    pub async fn start() -> StubServer {
        let state = StubState::default();
        let router = Router::new()
            .route("/websockreg", get(websockreg))
            .route("/admin/lex_do_import", post(lex_do_import))
            .route("/lexicon/list", get(lexicon_list))
            .route("/admin/insertorupdatelexicon", get(insert_or_update_lexicon))
            .route("/admin/deletelexicon", get(delete_lexicon))
            .route("/symbolset/list", get(symbol_set_list))
            .route("/admin/listsymbolset", get(list_symbol_set))
            .route("/admin/savesymbolset", post(save_symbol_set))
            .route("/ipa_table.txt", get(ipa_table))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server");
        });

        StubServer {
            addr,
            state,
            handle,
        }
    }

    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/websockreg", self.addr)
    }

    /// Script the frames pushed to the next accepted channel.
    pub async fn script_channel(&self, frames: &[&str], close_after: bool) {
        let mut script = self.state.inner.channel_script.lock().await;
        script.frames = frames.iter().map(|f| f.to_string()).collect();
        script.close_after = close_after;
    }

    /// Script the import response for submissions naming `lexicon_name`.
    pub async fn script_import_response(&self, lexicon_name: &str, status: u16, body: &str) {
        self.state.inner.import_responses.lock().await.insert(
            lexicon_name.to_string(),
            ImportResponse {
                status: StatusCode::from_u16(status).expect("valid status"),
                body: body.to_string(),
            },
        );
    }

    /// How many import submissions reached the server.
    pub fn import_hits(&self) -> usize {
        self.state.inner.import_hits.load(Ordering::SeqCst)
    }

    /// Raw first frames received on accepted channels, in arrival order.
    pub async fn registrations(&self) -> Vec<String> {
        self.state.inner.registrations.lock().await.clone()
    }

    /// Poll until a registration frame has arrived.
    pub async fn wait_for_registration(&self) -> String {
        for _ in 0..200 {
            if let Some(first) = self.state.inner.registrations.lock().await.first() {
                return first.clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no registration frame arrived");
    }

    /// Recorded import form fields (text fields plus `upload_file.name`
    /// and `upload_file.len`), in arrival order.
    pub async fn import_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.inner.import_forms.lock().await.clone()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

async fn websockreg(State(state): State<StubState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_channel(state, socket))
}

async fn handle_channel(state: StubState, mut socket: WebSocket) {
    // The first frame must be the registration announcement.
    let first = match socket.recv().await {
        Some(Ok(Message::Text(text))) => text,
        _ => return,
    };
    state.inner.registrations.lock().await.push(first);

    let script = state.inner.channel_script.lock().await.clone();
    for frame in script.frames {
        if socket.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }
    if script.close_after {
        let _ = socket.send(Message::Close(None)).await;
    } else {
        // Hold the socket open until the client goes away.
        while socket.recv().await.is_some() {}
    }
}

async fn lex_do_import(State(state): State<StubState>, mut multipart: Multipart) -> Response {
    state.inner.import_hits.fetch_add(1, Ordering::SeqCst);

    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "upload_file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            fields.insert("upload_file.name".to_string(), file_name);
            fields.insert("upload_file.len".to_string(), bytes.len().to_string());
        } else {
            let value = field.text().await.unwrap_or_default();
            fields.insert(name, value);
        }
    }

    let lexicon_name = fields.get("lexicon_name").cloned().unwrap_or_default();
    state.inner.import_forms.lock().await.push(fields);

    let scripted = state
        .inner
        .import_responses
        .lock()
        .await
        .get(&lexicon_name)
        .cloned();
    match scripted {
        Some(response) => (response.status, response.body).into_response(),
        None => (
            StatusCode::OK,
            format!("imported 0 entries into lexicon '{}'", lexicon_name),
        )
            .into_response(),
    }
}

async fn lexicon_list() -> Response {
    Json(json!([
        {"id": 1, "name": "sv-se.nst", "symbolSetName": "sv-se_ws-sampa"},
        {"id": 2, "name": "en-us.cmu", "symbolSetName": "en-us_sampa"},
    ]))
    .into_response()
}

async fn insert_or_update_lexicon(Query(params): Query<HashMap<String, String>>) -> Response {
    let id: i64 = params
        .get("id")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let stored_id = if id == 0 { 42 } else { id };
    Json(json!({
        "id": stored_id,
        "name": params.get("name").cloned().unwrap_or_default(),
        "symbolSetName": params.get("symbolsetname").cloned().unwrap_or_default(),
    }))
    .into_response()
}

async fn delete_lexicon(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("id") {
        Some(id) => (StatusCode::OK, format!("deleted lexicon {}", id)).into_response(),
        None => (StatusCode::BAD_REQUEST, "missing id".to_string()).into_response(),
    }
}

async fn symbol_set_list() -> Response {
    Json(json!({"SymbolSetNames": ["sv-se_ws-sampa", "en-us_sampa"]})).into_response()
}

async fn list_symbol_set(Query(params): Query<HashMap<String, String>>) -> Response {
    let lexicon_id: i64 = params
        .get("lexiconId")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    Json(json!([
        {"lexiconId": lexicon_id, "symbol": "p", "category": "Phoneme",
         "description": "voiceless bilabial plosive", "ipa": "p"},
        {"lexiconId": lexicon_id, "symbol": ".", "category": "Delimiter",
         "description": "syllable boundary", "ipa": "."},
    ]))
    .into_response()
}

async fn save_symbol_set(body: Json<serde_json::Value>) -> Response {
    match body.0.as_array() {
        Some(symbols) => (StatusCode::OK, format!("saved {} symbols", symbols.len())).into_response(),
        None => (StatusCode::BAD_REQUEST, "expected a JSON array".to_string()).into_response(),
    }
}

async fn ipa_table() -> Response {
    let table = "1\tp\tplosive\tpulmonic\tvoiceless bilabial plosive\n\
2\tb\tplosive\tpulmonic\tvoiced bilabial plosive\n\
3\tm\tnasal\tpulmonic\tvoiced bilabial nasal\n";
    (StatusCode::OK, table.to_string()).into_response()
}
