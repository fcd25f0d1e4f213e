//! # Marcador de Entidades Nomeadas por Dicionário
//!
//! Marca, **no próprio token**, as entidades do [`EntityDictionary`] que
//! aparecem no texto. São duas passadas:
//!
//! 1. **Exata** ([`NamedEntitiesTagger::tag_exact`]): para cada posição `i`,
//!    busca a entidade cuja primeira palavra é `tokens[i]` e confere se todas as
//!    partes casam (ignorando maiúsculas) com os tokens seguintes. Em caso de
//!    casamento, todos os tokens do trecho recebem a entidade. A varredura
//!    continua em `i + 1` mesmo depois de um casamento, então trechos
//!    sobrepostos podem ser marcados.
//! 2. **Inexata** ([`NamedEntitiesTagger::tag_inexact`]): cada token ainda sem
//!    marcação é normalizado do possessivo (`Bob` + `'` + `s` → `Bob`) e
//!    procurado no mapa de qualquer palavra. Só o próprio token é marcado.
//!
//! ## Exemplo
//!
//! ```rust
//! use std::sync::Arc;
//! use ner_core::dictionary::EntityDictionary;
//! use ner_core::tagger::NamedEntitiesTagger;
//! use ner_core::tokenizer::tokenize;
//!
//! let dict = Arc::new(EntityDictionary::from_lines(["Newton Raphson"]));
//! let tagger = NamedEntitiesTagger::new(dict);
//!
//! let mut tokens = tokenize("The Newton Raphson method");
//! tagger.tag_exact(&mut tokens);
//! assert!(tokens[1].is_tagged() && tokens[2].is_tagged());
//! ```

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::dictionary::{lookup_key, EntityDictionary, NamedEntity};
use crate::document::Document;
use crate::error::Result;
use crate::tokenizer::Token;

/// Marcador compartilhável entre threads (o dicionário fica atrás de um `Arc`).
#[derive(Debug, Clone)]
pub struct NamedEntitiesTagger {
    dictionary: Arc<EntityDictionary>,
}

impl NamedEntitiesTagger {
    pub fn new(dictionary: Arc<EntityDictionary>) -> Self {
        Self { dictionary }
    }

    /// Carrega o dicionário de um arquivo (uma entidade por linha).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(EntityDictionary::from_path(path)?)))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Ok(Self::new(Arc::new(EntityDictionary::from_reader(reader)?)))
    }

    pub fn dictionary(&self) -> &Arc<EntityDictionary> {
        &self.dictionary
    }

    /// Passada exata: marca trechos de tokens que formam uma entidade inteira.
    pub fn tag_exact(&self, tokens: &mut [Token]) {
        for i in 0..tokens.len() {
            let Some(candidate) = self.dictionary.by_first_word(tokens[i].text()) else {
                continue;
            };
            if matches_at(tokens, i, candidate) {
                for token in &mut tokens[i..i + candidate.len()] {
                    token.tag_with(Arc::clone(candidate));
                }
            }
        }
    }

    /// Passada inexata: casamento de palavra única para tokens ainda sem marcação.
    pub fn tag_inexact(&self, tokens: &mut [Token]) {
        for token in tokens.iter_mut().filter(|t| !t.is_tagged()) {
            if let Some(entity) = self.dictionary.by_any_word(from_possessive(token)) {
                token.tag_with(Arc::clone(entity));
            }
        }
    }

    /// Aplica as duas passadas em cada sentença do documento.
    pub fn tag_document(&self, document: &mut Document) {
        for sentence in document.sentences_mut() {
            let words = sentence.words_mut();
            self.tag_exact(words);
            self.tag_inexact(words);
        }
    }
}

/// Todas as partes da entidade casam com os tokens a partir de `idx`?
fn matches_at(tokens: &[Token], idx: usize, entity: &NamedEntity) -> bool {
    if idx + entity.len() > tokens.len() {
        return false;
    }
    entity
        .parts()
        .iter()
        .zip(&tokens[idx..])
        .all(|(part, token)| lookup_key(part) == lookup_key(token.text()))
}

/// Remove o `s` final de um possessivo: token `Bobs` com `'` depois → `Bob`.
fn from_possessive(token: &Token) -> &str {
    let text = token.text();
    if token.after().contains('\'') {
        if let Some(stripped) = text.strip_suffix(|c: char| c == 's' || c == 'S') {
            return stripped;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger(lines: &[&str]) -> NamedEntitiesTagger {
        NamedEntitiesTagger::new(Arc::new(EntityDictionary::from_lines(lines)))
    }

    fn default_tagger() -> NamedEntitiesTagger {
        tagger(&["John", "Bob", "Alice", "Europe", "Newton Raphson"])
    }

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(*w, 0)).collect()
    }

    fn has_entity(token: &Token, name: &str) -> bool {
        token.entities().iter().any(|e| e.to_string() == name)
    }

    fn entity_names(token: &Token) -> Vec<String> {
        token.entities().iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_inexact_uses_latest_definition_of_word() {
        let mut toks = tokens(&["Carl"]);
        tagger(&["Carl Sagan", "Carl Friedrich Gauss"]).tag_inexact(&mut toks);
        assert_eq!(entity_names(&toks[0]), vec!["Carl Friedrich Gauss"]);
    }

    #[test]
    fn test_single_word_entity() {
        let mut toks = tokens(&["Test", "Bob", "Alice", "hyphenated-word"]);
        default_tagger().tag_exact(&mut toks);

        assert!(!toks[0].is_tagged());
        assert!(has_entity(&toks[1], "Bob"));
        assert!(has_entity(&toks[2], "Alice"));
        assert!(!toks[3].is_tagged());
    }

    #[test]
    fn test_multi_word_entity() {
        let mut toks = tokens(&["Test", "Newton", "Raphson", "Word"]);
        default_tagger().tag_exact(&mut toks);

        assert!(!toks[0].is_tagged());
        assert!(has_entity(&toks[1], "Newton Raphson"));
        assert!(has_entity(&toks[2], "Newton Raphson"));
        assert!(!toks[3].is_tagged());
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let mut toks = tokens(&["NEWTON", "raphson"]);
        default_tagger().tag_exact(&mut toks);
        assert!(has_entity(&toks[0], "Newton Raphson"));
        assert!(has_entity(&toks[1], "Newton Raphson"));
    }

    #[test]
    fn test_exact_needs_all_parts() {
        let mut toks = tokens(&["Test", "Newton"]);
        default_tagger().tag_exact(&mut toks);
        assert!(toks.iter().all(|t| !t.is_tagged()));

        let mut toks = tokens(&["Newton", "Leibniz", "Raphson"]);
        default_tagger().tag_exact(&mut toks);
        assert!(toks.iter().all(|t| !t.is_tagged()));
    }

    #[test]
    fn test_exact_shadowed_first_word() {
        let t = tagger(&["Carl Sagan", "Carl Friedrich Gauss"]);

        let mut toks = tokens(&["Carl", "Sagan"]);
        t.tag_exact(&mut toks);
        assert!(toks.iter().all(|t| !t.is_tagged()));

        let mut toks = tokens(&["Carl", "Friedrich", "Gauss"]);
        t.tag_exact(&mut toks);
        assert!(toks.iter().all(|t| has_entity(t, "Carl Friedrich Gauss")));
    }

    #[test]
    fn test_exact_rescans_inside_matched_span() {
        // "Raphson" é a primeira palavra de outra entidade: os trechos se sobrepõem
        let t = tagger(&["Newton Raphson", "Raphson Method"]);
        let mut toks = tokens(&["Newton", "Raphson", "Method"]);
        t.tag_exact(&mut toks);

        assert_eq!(entity_names(&toks[0]), vec!["Newton Raphson"]);
        assert_eq!(entity_names(&toks[1]), vec!["Newton Raphson", "Raphson Method"]);
        assert_eq!(entity_names(&toks[2]), vec!["Raphson Method"]);
    }

    #[test]
    fn test_repeated_exact_pass_double_tags() {
        let t = default_tagger();
        let mut toks = tokens(&["Bob"]);
        t.tag_exact(&mut toks);
        t.tag_exact(&mut toks);
        assert_eq!(toks[0].entities().len(), 2);
    }

    #[test]
    fn test_inexact_possessive() {
        let mut toks = vec![Token::with_symbols("Bob", "", "'", 0)];
        default_tagger().tag_inexact(&mut toks);
        assert!(has_entity(&toks[0], "Bob"));
    }

    #[test]
    fn test_inexact_possessive_from_lexer() {
        // O lexer produz "Bobs" com "'" depois
        let mut toks = crate::tokenizer::tokenize("Bob's car");
        default_tagger().tag_inexact(&mut toks);
        assert!(has_entity(&toks[0], "Bob"));
        assert!(!toks[1].is_tagged());
    }

    #[test]
    fn test_possessive_requires_apostrophe() {
        let mut toks = tokens(&["Bobs"]);
        default_tagger().tag_inexact(&mut toks);
        assert!(!toks[0].is_tagged());
    }

    #[test]
    fn test_inexact_any_word() {
        let mut toks = tokens(&["Raphson"]);
        default_tagger().tag_inexact(&mut toks);
        assert!(has_entity(&toks[0], "Newton Raphson"));
    }

    #[test]
    fn test_inexact_skips_tagged_and_is_idempotent() {
        let t = default_tagger();
        let mut toks = tokens(&["Newton", "Raphson", "met", "Europe"]);
        t.tag_exact(&mut toks);
        t.tag_inexact(&mut toks);
        let before: Vec<usize> = toks.iter().map(|t| t.entities().len()).collect();
        assert_eq!(before, vec![1, 1, 0, 1]);

        t.tag_inexact(&mut toks);
        let after: Vec<usize> = toks.iter().map(|t| t.entities().len()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_entities_are_shared_not_copied() {
        let t = default_tagger();
        let mut toks = tokens(&["Newton", "Raphson"]);
        t.tag_exact(&mut toks);
        assert!(Arc::ptr_eq(&toks[0].entities()[0], &toks[1].entities()[0]));
    }

    #[test]
    fn test_tag_document_per_sentence() {
        let mut doc = crate::parser::Parser::from_text("d", "Newton. Raphson works")
            .parse_document()
            .unwrap();
        default_tagger().tag_document(&mut doc);

        // As sentenças são marcadas separadamente: não há casamento exato
        // atravessando a fronteira, só os inexatos
        let s0 = &doc.sentences()[0].words()[0];
        let s1 = &doc.sentences()[1].words()[0];
        assert_eq!(entity_names(s0), vec!["Newton Raphson"]);
        assert_eq!(entity_names(s1), vec!["Newton Raphson"]);
        assert!(!doc.sentences()[1].words()[1].is_tagged());
    }
}
