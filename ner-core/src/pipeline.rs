//! # Pipeline — Orquestrador com Eventos Observáveis
//!
//! Conecta lexer → montador de sentenças → marcador de entidades para cada
//! documento, e processa lotes de documentos em paralelo (via Rayon).
//!
//! ## Concorrência
//!
//! Cada documento tem seu próprio pipeline (lexer + parser + árvore de tokens);
//! a única coisa compartilhada é o [`EntityDictionary`], imutável e atrás de
//! um `Arc`. Por isso não há locks. Uma falha em um documento não afeta os
//! demais: ele é omitido do resultado e aparece como [`DocumentFailure`].
//!
//! ## Eventos
//!
//! Assim como na análise de texto único, o processamento em lote pode emitir
//! [`PipelineEvent`]s por um canal `mpsc`, para que o servidor WebSocket
//! transmita o progresso ao cliente.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dictionary::EntityDictionary;
use crate::document::{Document, Documents};
use crate::error::{NerError, Result};
use crate::parser::Parser;
use crate::tagger::NamedEntitiesTagger;

/// Documento que não pôde ser processado: omitido do resultado, com diagnóstico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub name: String,
    pub message: String,
}

/// Resultado de um lote: documentos processados (na ordem de entrada) e falhas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Documents,
    pub failures: Vec<DocumentFailure>,
    pub processing_ms: u64,
}

/// Eventos emitidos durante o processamento de um lote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Documento lido e dividido em sentenças.
    DocumentParsed {
        name: String,
        sentences: usize,
        tokens: usize,
    },
    /// Entidades marcadas no documento (distintas, na ordem em que aparecem).
    DocumentTagged { name: String, entities: Vec<String> },
    /// O documento falhou e será omitido.
    DocumentFailed { name: String, message: String },
    /// Lote concluído.
    Done {
        documents: usize,
        failures: usize,
        processing_ms: u64,
    },
}

/// O pipeline principal. Barato de clonar e seguro para compartilhar entre threads.
#[derive(Debug, Clone)]
pub struct NerPipeline {
    tagger: NamedEntitiesTagger,
}

impl NerPipeline {
    pub fn new(dictionary: Arc<EntityDictionary>) -> Self {
        Self {
            tagger: NamedEntitiesTagger::new(dictionary),
        }
    }

    pub fn with_tagger(tagger: NamedEntitiesTagger) -> Self {
        Self { tagger }
    }

    pub fn tagger(&self) -> &NamedEntitiesTagger {
        &self.tagger
    }

    pub fn dictionary(&self) -> &Arc<EntityDictionary> {
        self.tagger.dictionary()
    }

    /// Processa um documento: tokeniza, monta as sentenças e marca as entidades.
    pub fn process<R: Read>(&self, name: &str, reader: R) -> Result<Document> {
        let mut document = Parser::from_reader(name, reader).parse_document()?;
        self.tagger.tag_document(&mut document);
        Ok(document)
    }

    pub fn process_str(&self, name: &str, text: &str) -> Result<Document> {
        let mut document = Parser::from_text(name, text).parse_document()?;
        self.tagger.tag_document(&mut document);
        Ok(document)
    }

    /// Processa vários documentos em paralelo e devolve o relatório final.
    pub fn process_batch<R>(&self, sources: Vec<(String, R)>) -> BatchReport
    where
        R: Read + Send,
    {
        // Ninguém escuta: os eventos são descartados no envio
        let (tx, _) = mpsc::channel();
        self.process_batch_streaming(sources, tx)
    }

    /// Como [`process_batch`](Self::process_batch), emitindo eventos pelo canal.
    ///
    /// A ordem dos eventos entre documentos diferentes depende do escalonamento;
    /// o relatório preserva a ordem de entrada.
    pub fn process_batch_streaming<R>(
        &self,
        sources: Vec<(String, R)>,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> BatchReport
    where
        R: Read + Send,
    {
        self.run_batch(sources, |reader| Ok(reader), tx)
    }

    /// Abre e processa cada arquivo; um arquivo que não abre conta como falha
    /// daquele documento ([`NerError::DocumentOpen`]).
    pub fn process_paths<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        let (tx, _) = mpsc::channel();
        self.process_paths_streaming(paths, tx)
    }

    /// Como [`process_paths`](Self::process_paths), emitindo eventos pelo canal.
    pub fn process_paths_streaming<P: AsRef<Path>>(
        &self,
        paths: &[P],
        tx: mpsc::Sender<PipelineEvent>,
    ) -> BatchReport {
        let sources: Vec<(String, PathBuf)> = paths
            .iter()
            .map(|p| {
                let path = p.as_ref();
                (path.display().to_string(), path.to_path_buf())
            })
            .collect();
        // O arquivo só é aberto dentro da thread de trabalho
        self.run_batch(sources, open_document, tx)
    }

    fn run_batch<S, R, F>(
        &self,
        sources: Vec<(String, S)>,
        open: F,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> BatchReport
    where
        S: Send,
        R: Read,
        F: Fn(S) -> Result<R> + Sync,
    {
        let start = Instant::now();
        let total = sources.len();

        let results: Vec<(String, Result<Document>)> = sources
            .into_par_iter()
            .map_with(tx.clone(), |tx, (name, source)| {
                let result = open(source).and_then(|reader| self.process_observed(&name, reader, tx));
                if let Err(e) = &result {
                    warn!(document = %name, error = %e, "documento descartado");
                    let _ = tx.send(PipelineEvent::DocumentFailed {
                        name: name.clone(),
                        message: e.to_string(),
                    });
                }
                (name, result)
            })
            .collect();

        let mut report = BatchReport::default();
        for (name, result) in results {
            match result {
                Ok(document) => report.documents.add_document(document),
                Err(e) => report.failures.push(DocumentFailure {
                    name,
                    message: e.to_string(),
                }),
            }
        }
        report.processing_ms = start.elapsed().as_millis() as u64;

        info!(
            total,
            documents = report.documents.len(),
            failures = report.failures.len(),
            processing_ms = report.processing_ms,
            "lote processado"
        );
        let _ = tx.send(PipelineEvent::Done {
            documents: report.documents.len(),
            failures: report.failures.len(),
            processing_ms: report.processing_ms,
        });
        report
    }

    fn process_observed<R: Read>(
        &self,
        name: &str,
        reader: R,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Result<Document> {
        let mut document = Parser::from_reader(name, reader).parse_document()?;
        let _ = tx.send(PipelineEvent::DocumentParsed {
            name: name.to_string(),
            sentences: document.sentences().len(),
            tokens: document.token_count(),
        });

        self.tagger.tag_document(&mut document);
        let entities: Vec<String> = document
            .named_entities()
            .iter()
            .map(|e| e.to_string())
            .collect();
        debug!(document = name, entities = entities.len(), "entidades marcadas");
        let _ = tx.send(PipelineEvent::DocumentTagged {
            name: name.to_string(),
            entities,
        });
        Ok(document)
    }
}

fn open_document(path: PathBuf) -> Result<File> {
    File::open(&path).map_err(|e| NerError::document_open(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn pipeline() -> NerPipeline {
        NerPipeline::new(Arc::new(EntityDictionary::from_lines([
            "Bob",
            "Newton Raphson",
            "Europe",
        ])))
    }

    /// Leitor que falha depois de entregar alguns bytes.
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.sent {
                self.sent = true;
                let data = b"Partial text ";
                buf[..data.len()].copy_from_slice(data);
                return Ok(data.len());
            }
            Err(io::Error::new(io::ErrorKind::Other, "conexão perdida"))
        }
    }

    #[test]
    fn test_process_str_tags_entities() {
        let doc = pipeline()
            .process_str("a.txt", "Bob's favourite method is Newton Raphson. Raphson rocks")
            .unwrap();
        let names: Vec<String> = doc.named_entities().iter().map(|e| e.to_string()).collect();
        assert_eq!(names, vec!["Bob", "Newton Raphson"]);
        assert_eq!(doc.sentences().len(), 2);
    }

    #[test]
    fn test_process_empty() {
        let doc = pipeline().process_str("empty.txt", "").unwrap();
        assert!(doc.sentences().is_empty());
    }

    #[test]
    fn test_process_reader_failure_is_error() {
        let result = pipeline().process("broken.txt", FailingReader { sent: false });
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let sources: Vec<(String, Box<dyn Read + Send>)> = vec![
            ("one.txt".into(), Box::new("Bob went to Europe.".as_bytes())),
            ("broken.txt".into(), Box::new(FailingReader { sent: false })),
            ("three.txt".into(), Box::new("".as_bytes())),
            ("four.txt".into(), Box::new("Newton Raphson".as_bytes())),
        ];
        let report = pipeline().process_batch(sources);

        let names: Vec<&str> = report.documents.iter().map(Document::name).collect();
        assert_eq!(names, vec!["one.txt", "three.txt", "four.txt"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "broken.txt");
        assert!(report.failures[0].message.contains("conexão perdida"));

        // Documento vazio continua presente, distinto de uma falha
        assert!(report.documents.documents()[1].sentences().is_empty());
    }

    #[test]
    fn test_batch_streaming_events() {
        let sources = vec![
            ("a.txt".to_string(), "Bob and Alice".as_bytes()),
            ("b.txt".to_string(), "Europe. Newton Raphson".as_bytes()),
        ];
        let (tx, rx) = mpsc::channel();
        let report = pipeline().process_batch_streaming(sources, tx);
        assert_eq!(report.documents.len(), 2);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        let parsed = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::DocumentParsed { .. }))
            .count();
        let tagged = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::DocumentTagged { .. }))
            .count();
        assert_eq!(parsed, 2);
        assert_eq!(tagged, 2);
        assert!(
            matches!(events.last(), Some(PipelineEvent::Done { documents: 2, failures: 0, .. })),
            "Último evento deve ser Done"
        );
    }

    #[test]
    fn test_event_serialization_shape() {
        let json = serde_json::to_value(PipelineEvent::DocumentFailed {
            name: "x".into(),
            message: "y".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "DocumentFailed");
        assert_eq!(json["data"]["name"], "x");
    }

    #[test]
    fn test_process_paths_missing_file_is_open_failure() {
        let report = pipeline().process_paths(&["/nao/existe/doc.txt"]);
        assert!(report.documents.is_empty());
        assert_eq!(report.failures.len(), 1);
        let message = &report.failures[0].message;
        assert!(message.starts_with("falha ao abrir o documento '/nao/existe/doc.txt'"));
        assert!(!message.contains("fonte de caracteres"));
    }

    #[test]
    fn test_open_document_error_variant() {
        let err = open_document(PathBuf::from("/nao/existe/doc.txt")).unwrap_err();
        assert!(matches!(err, NerError::DocumentOpen { ref path, .. } if path == Path::new("/nao/existe/doc.txt")));
    }

    #[test]
    fn test_paths_streaming_reports_open_failure() {
        let (tx, rx) = mpsc::channel();
        let report = pipeline().process_paths_streaming(&["/nao/existe/doc.txt"], tx);
        assert_eq!(report.failures.len(), 1);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(
            events.first(),
            Some(PipelineEvent::DocumentFailed { message, .. }) if message.starts_with("falha ao abrir")
        ));
        assert!(matches!(events.last(), Some(PipelineEvent::Done { documents: 0, failures: 1, .. })));
    }
}
