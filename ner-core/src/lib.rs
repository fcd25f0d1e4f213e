//! # ner-core — Pipeline de Entidades Nomeadas por Dicionário
//!
//! Este crate transforma texto bruto em um documento estruturado (sentenças e
//! tokens) e marca os tokens que pertencem a entidades nomeadas conhecidas.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em linha reta, documento por documento:
//!
//! 1.  **Entrada**: fluxo de caracteres (`&str` ou qualquer `Read` UTF-8).
//! 2.  **Análise léxica** ([`tokenizer`]): máquina de estados que produz tokens
//!     sob demanda, com número de sentença e símbolos ao redor.
//! 3.  **Montagem de sentenças** ([`parser`]): agrupa tokens em [`Sentence`]s e
//!     produz um [`Document`].
//! 4.  **Marcação** ([`tagger`]): passadas exata e inexata contra o
//!     [`EntityDictionary`] ([`dictionary`]).
//! 5.  **Saída**: a árvore [`Document`] → [`Sentence`] → [`Token`] → [`NamedEntity`],
//!     que pode ser renderizada em XML ([`xml`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use ner_core::{EntityDictionary, NerPipeline};
//!
//! // 1. Carrega o dicionário (uma entidade por linha)
//! let dictionary = Arc::new(EntityDictionary::from_lines(["Bob", "Newton Raphson"]));
//!
//! // 2. Instancia o pipeline (o dicionário é compartilhado, nunca copiado)
//! let pipeline = NerPipeline::new(dictionary);
//!
//! // 3. Processa um documento
//! let document = pipeline
//!     .process_str("notes.txt", "Bob's favourite method is Newton Raphson.")
//!     .unwrap();
//!
//! // 4. Exibe as entidades encontradas
//! for entity in document.named_entities() {
//!     println!("Entidade: {}", entity);
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestra um documento ou um lote em paralelo.
//! - [`tokenizer`]: lexer e [`Token`].
//! - [`source`]: decodificação UTF-8 incremental e leitura antecipada.
//! - [`corpus`]: textos e entidades de demonstração.

pub mod corpus;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod tagger;
pub mod tokenizer;
pub mod xml;

pub use dictionary::{EntityDictionary, NamedEntity};
pub use document::{Document, Documents, Sentence};
pub use error::{NerError, Result};
pub use parser::Parser;
pub use pipeline::{BatchReport, DocumentFailure, NerPipeline, PipelineEvent};
pub use tagger::NamedEntitiesTagger;
pub use tokenizer::{Lexer, Token};
