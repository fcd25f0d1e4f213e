//! # Dicionário de Entidades Nomeadas (Gazetteer)
//!
//! Índice em memória das entidades conhecidas, construído uma única vez a partir
//! de uma lista de definições (uma entidade por linha, palavras separadas por
//! espaço):
//!
//! ```text
//! Carl Sagan
//! Newton Raphson
//! Europe
//! ```
//!
//! ## Mapas de busca
//!
//! | Mapa            | Chave                          | Usado por            |
//! |-----------------|--------------------------------|----------------------|
//! | `by_first_word` | primeira palavra (maiúsculas)  | marcação exata       |
//! | `by_any_word`   | qualquer palavra (maiúsculas)  | marcação inexata     |
//!
//! Definições carregadas depois **sombreiam** as anteriores que compartilham a
//! mesma chave: com `Carl Sagan` seguido de `Carl Friedrich Gauss`, a busca
//! exata por "Carl" só encontra Gauss.
//!
//! Depois de construído o dicionário é imutável; é compartilhado via `Arc`
//! entre pipelines que rodam em paralelo, sem locks.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};

/// Uma entidade nomeada: sequência ordenada de uma ou mais palavras
/// (ex: `["Newton", "Raphson"]`).
///
/// A identidade é pelo valor das partes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedEntity {
    parts: Vec<String>,
}

impl NamedEntity {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn part(&self, i: usize) -> Option<&str> {
        self.parts.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for NamedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

/// Chave de busca: as consultas ignoram maiúsculas/minúsculas.
pub(crate) fn lookup_key(word: &str) -> String {
    word.to_uppercase()
}

/// Índice imutável de entidades conhecidas.
#[derive(Debug, Default)]
pub struct EntityDictionary {
    /// Todas as definições na ordem de carga (inclusive as sombreadas)
    entities: Vec<Arc<NamedEntity>>,
    /// Primeira palavra → índice em `entities`
    by_first_word: HashMap<String, usize>,
    /// Qualquer palavra → índice em `entities`
    by_any_word: HashMap<String, usize>,
}

impl EntityDictionary {
    /// Constrói o dicionário a partir de linhas de definição.
    ///
    /// Linhas em branco são ignoradas. As partes mantêm a grafia original.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::default();
        for line in lines {
            dict.add_line(line.as_ref());
        }
        debug!(
            entities = dict.entities.len(),
            first_words = dict.by_first_word.len(),
            words = dict.by_any_word.len(),
            "dicionário de entidades carregado"
        );
        dict
    }

    /// Lê as definições de um leitor (uma por linha).
    ///
    /// Qualquer falha de leitura aborta a construção.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::read_lines(reader, "<reader>")
    }

    /// Lê as definições de um arquivo UTF-8.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| NerError::dictionary_load(path, e))?;
        Self::read_lines(BufReader::new(file), path)
    }

    fn read_lines<R: BufRead>(reader: R, origin: impl AsRef<Path>) -> Result<Self> {
        let lines = reader
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
            .map_err(|e| NerError::dictionary_load(origin.as_ref(), e))?;
        Ok(Self::from_lines(lines))
    }

    fn add_line(&mut self, line: &str) {
        let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        // Linhas não vazias sempre têm ao menos uma palavra
        let Some(first) = parts.first() else {
            return;
        };

        let idx = self.entities.len();
        self.by_first_word.insert(lookup_key(first), idx);
        for part in &parts {
            self.by_any_word.insert(lookup_key(part), idx);
        }
        self.entities.push(Arc::new(NamedEntity::new(parts)));
    }

    /// Candidato para casamento exato começando em `word`.
    pub fn by_first_word(&self, word: &str) -> Option<&Arc<NamedEntity>> {
        self.by_first_word
            .get(&lookup_key(word))
            .map(|&idx| &self.entities[idx])
    }

    /// Entidade que contém `word` em qualquer posição.
    pub fn by_any_word(&self, word: &str) -> Option<&Arc<NamedEntity>> {
        self.by_any_word
            .get(&lookup_key(word))
            .map(|&idx| &self.entities[idx])
    }

    /// Todas as definições carregadas, na ordem do arquivo.
    pub fn entities(&self) -> &[Arc<NamedEntity>] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
