//! # Modelo de Documento
//!
//! Árvore produzida pelo pipeline:
//!
//! ```text
//! Documents → Document* → Sentence* → Token* (→ NamedEntity*)
//! ```
//!
//! Todas as coleções são apenas de acréscimo; cada nível é dono exclusivo do
//! nível abaixo. As entidades são referências compartilhadas ao dicionário.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dictionary::NamedEntity;
use crate::tokenizer::Token;

/// Sequência contígua de palavras com o mesmo número de sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    num: usize,
    words: Vec<Token>,
}

impl Sentence {
    pub fn new(num: usize) -> Self {
        Self {
            num,
            words: Vec::new(),
        }
    }

    pub fn add_word(&mut self, token: Token) {
        self.words.push(token);
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn words(&self) -> &[Token] {
        &self.words
    }

    /// Acesso mutável para o tagger (as palavras em si não mudam, só as marcações).
    pub fn words_mut(&mut self) -> &mut [Token] {
        &mut self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Um documento: nome (normalmente o arquivo de origem) e suas sentenças.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    name: String,
    sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sentences: Vec::new(),
        }
    }

    pub fn add_sentence(&mut self, sentence: Sentence) {
        self.sentences.push(sentence);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentences_mut(&mut self) -> &mut [Sentence] {
        &mut self.sentences
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.words().iter())
    }

    /// Entidades distintas marcadas no documento, na ordem em que aparecem.
    pub fn named_entities(&self) -> Vec<Arc<NamedEntity>> {
        let mut seen = HashSet::new();
        self.tokens()
            .flat_map(|t| t.entities().iter())
            .filter(|e| seen.insert(Arc::clone(e)))
            .cloned()
            .collect()
    }
}

/// Coleção ordenada de documentos processados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Documents {
    documents: Vec<Document>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }
}

impl FromIterator<Document> for Documents {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Documents {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(parts: &[&str]) -> Arc<NamedEntity> {
        Arc::new(NamedEntity::new(parts.iter().map(|p| p.to_string()).collect()))
    }

    #[test]
    fn test_named_entities_are_distinct_in_order() {
        let newton = entity(&["Newton", "Raphson"]);
        let bob = entity(&["Bob"]);

        let mut s0 = Sentence::new(0);
        let mut w = Token::new("Newton", 0);
        w.tag_with(Arc::clone(&newton));
        s0.add_word(w);
        let mut w = Token::new("Raphson", 0);
        w.tag_with(Arc::clone(&newton));
        s0.add_word(w);

        let mut s1 = Sentence::new(1);
        let mut w = Token::new("Bob", 1);
        w.tag_with(bob);
        s1.add_word(w);
        s1.add_word(Token::new("ran", 1));

        let mut doc = Document::new("a.txt");
        doc.add_sentence(s0);
        doc.add_sentence(s1);

        let names: Vec<String> = doc.named_entities().iter().map(|e| e.to_string()).collect();
        assert_eq!(names, vec!["Newton Raphson", "Bob"]);
        assert_eq!(doc.token_count(), 4);
    }

    #[test]
    fn test_documents_collect() {
        let docs: Documents = ["a", "b"].into_iter().map(Document::new).collect();
        assert_eq!(docs.len(), 2);
        let names: Vec<&str> = docs.iter().map(Document::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
