//! Servidor web Axum com WebSocket para o pipeline de entidades nomeadas
//!
//! Faz o papel do "driver" externo: recebe textos, entrega ao pipeline como
//! fluxos de caracteres e devolve a árvore de documentos (JSON + XML).

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ner_core::{
    corpus::{demo_dictionary, demo_texts},
    BatchReport, Document, EntityDictionary, NerPipeline, PipelineEvent,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Configuração lida do ambiente.
#[derive(Debug, Clone)]
struct ServerConfig {
    /// Arquivo de entidades (`NER_DICTIONARY`, padrão `NER.txt`)
    dictionary: PathBuf,
    /// Endereço de escuta (`NER_BIND`, padrão `0.0.0.0:3000`)
    bind: SocketAddr,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let dictionary = std::env::var("NER_DICTIONARY").unwrap_or_else(|_| "NER.txt".into());
        let bind = std::env::var("NER_BIND").unwrap_or_else(|_| "0.0.0.0:3000".into());
        Ok(Self {
            dictionary: PathBuf::from(dictionary),
            bind: bind
                .parse()
                .with_context(|| format!("NER_BIND inválido: {bind}"))?,
        })
    }

    /// Carrega o dicionário do arquivo; se ele não existir, usa o de demonstração.
    fn load_dictionary(&self) -> anyhow::Result<EntityDictionary> {
        if !self.dictionary.exists() {
            warn!(
                path = %self.dictionary.display(),
                "dicionário não encontrado, usando entidades de demonstração"
            );
            return Ok(demo_dictionary());
        }
        Ok(EntityDictionary::from_path(&self.dictionary)?)
    }
}

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: NerPipeline,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    name: Option<String>,
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    document: Document,
    entities: Vec<String>,
    xml: String,
    total_tokens: usize,
    processing_ms: u64,
}

#[derive(Deserialize)]
struct BatchDocument {
    name: String,
    text: String,
}

/// Lote de documentos (também é o formato das mensagens WebSocket)
#[derive(Deserialize)]
struct BatchRequest {
    documents: Vec<BatchDocument>,
}

#[derive(Serialize)]
struct BatchResponse {
    #[serde(flatten)]
    report: BatchReport,
    xml: String,
}

impl BatchRequest {
    fn into_sources(self) -> Vec<(String, Cursor<Vec<u8>>)> {
        self.documents
            .into_iter()
            .map(|d| (d.name, Cursor::new(d.text.into_bytes())))
            .collect()
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let dictionary = config.load_dictionary()?;
    info!(entities = dictionary.len(), "dicionário carregado");

    let state = Arc::new(AppState {
        pipeline: NerPipeline::new(Arc::new(dictionary)),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("não foi possível escutar em {}", config.bind))?;
    info!("🚀 Servidor NER iniciado em http://{}", config.bind);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/batch", post(batch_handler))
        .route("/entities", get(entities_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Análise de um único documento via HTTP POST
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio");
    }

    let start = Instant::now();
    let name = req.name.unwrap_or_else(|| "input.txt".to_string());
    let document = match state.pipeline.process_str(&name, &req.text) {
        Ok(document) => document,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };
    let xml = match document.to_xml() {
        Ok(xml) => xml,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    Json(AnalyzeResponse {
        entities: document
            .named_entities()
            .iter()
            .map(|e| e.to_string())
            .collect(),
        total_tokens: document.token_count(),
        processing_ms: start.elapsed().as_millis() as u64,
        document,
        xml,
    })
    .into_response()
}

/// Lote de documentos processado em paralelo
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Response {
    let pipeline = state.pipeline.clone();
    let sources = req.into_sources();
    let report = match tokio::task::spawn_blocking(move || pipeline.process_batch(sources)).await {
        Ok(report) => report,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let xml = match report.documents.to_xml() {
        Ok(xml) => xml,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    Json(BatchResponse { report, xml }).into_response()
}

/// Entidades carregadas no dicionário (inclusive as sombreadas)
async fn entities_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entities: Vec<String> = state
        .pipeline
        .dictionary()
        .entities()
        .iter()
        .map(|e| e.to_string())
        .collect();
    Json(entities)
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(name, text)| {
            serde_json::json!({
                "name": name,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe um lote (ou texto puro), executa o pipeline e
/// envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Tenta parsear como JSON {documents: [...]}; senão usa como texto puro
                let request = serde_json::from_str::<BatchRequest>(&text).unwrap_or_else(|_| {
                    BatchRequest {
                        documents: vec![BatchDocument {
                            name: "ws.txt".to_string(),
                            text: text.clone(),
                        }],
                    }
                });

                if request.documents.is_empty() {
                    continue;
                }
                info!("Analisando lote via WebSocket: {} documentos", request.documents.len());

                // O pipeline é síncrono (Rayon): roda fora do runtime
                let (tx, rx) = mpsc::channel::<PipelineEvent>();
                let pipeline = state.pipeline.clone();
                let sources = request.into_sources();
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.process_batch_streaming(sources, tx);
                });
                handle.await.ok();

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
