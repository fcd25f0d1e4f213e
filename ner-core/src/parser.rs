//! # Montador de Sentenças
//!
//! Consome a sequência de tokens do [`Lexer`] e agrupa tokens consecutivos com
//! o mesmo número de sentença em uma [`Sentence`]. Como os números de sentença
//! nunca diminuem, basta detectar a mudança de número; não há ordenação nem
//! buffer de tokens fora de ordem.

use std::io::Read;

use tracing::debug;

use crate::document::{Document, Sentence};
use crate::error::Result;
use crate::source::Utf8Chars;
use crate::tokenizer::{Lexer, TextChars, Token};

/// Transforma um fluxo de tokens em um [`Document`].
pub struct Parser<I> {
    name: String,
    tokens: I,
}

impl<'a> Parser<Lexer<TextChars<'a>>> {
    pub fn from_text(name: impl Into<String>, text: &'a str) -> Self {
        Parser::new(name, Lexer::from_text(text))
    }
}

impl<R: Read> Parser<Lexer<Utf8Chars<R>>> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        Parser::new(name, Lexer::from_reader(reader))
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token>>,
{
    pub fn new(name: impl Into<String>, tokens: I) -> Self {
        Self {
            name: name.into(),
            tokens,
        }
    }

    /// Consome toda a entrada. Um erro de leitura aborta o documento inteiro.
    pub fn parse_document(self) -> Result<Document> {
        let mut doc = Document::new(self.name);
        let mut current: Option<Sentence> = None;

        for token in self.tokens {
            let token = token?;
            let num = token.sentence();

            let starts_new = current.as_ref().map_or(true, |s| s.num() != num);
            if starts_new {
                if let Some(finished) = current.replace(Sentence::new(num)) {
                    doc.add_sentence(finished);
                }
            }
            if let Some(sentence) = current.as_mut() {
                sentence.add_word(token);
            }
        }

        if let Some(finished) = current {
            doc.add_sentence(finished);
        }

        debug!(
            document = doc.name(),
            sentences = doc.sentences().len(),
            tokens = doc.token_count(),
            "documento montado"
        );
        Ok(doc)
    }
}
