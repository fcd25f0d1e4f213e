//! # Lexer — Máquina de Estados de Tokenização
//!
//! Converte um fluxo de caracteres em uma sequência **preguiçosa** de [`Token`]s,
//! atribuindo a cada token o número da sentença em que aparece e os símbolos que
//! o cercam (aspas, parênteses, apóstrofos...).
//!
//! ## Estados
//!
//! | Estado                | Significado                                        |
//! |-----------------------|----------------------------------------------------|
//! | `BeforeWord`          | Entre palavras (estado inicial)                    |
//! | `InWord`              | Acumulando uma palavra                             |
//! | `InDigit`             | Acumulando um número (aceita um ponto decimal)     |
//! | `DotSequence`         | Sequência de pontos entre palavras                 |
//! | `TrailingPunctuation` | Sub-estado de `InWord`: consome `. ! ?` finais      |
//!
//! ## Fronteiras de sentença
//!
//! - `"One. Two"`: ponto colado na palavra encerra a sentença.
//! - `"One ... Two"`: reticências soltas **não** encerram a sentença.
//! - `"One . Two"`: um único ponto solto encerra a sentença.
//! - `"One... Two"`: pontuação colada sempre encerra, qualquer que seja a quantidade.
//!
//! ## Exemplo
//!
//! ```rust
//! use ner_core::tokenizer::Lexer;
//!
//! let tokens: Vec<_> = Lexer::from_text("(Joe's) pi is 3.14. Next")
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! // Joes [(,')] · pi · is · 3.14 (sentença 0) · Next (sentença 1)
//! assert_eq!(tokens.len(), 5);
//! ```
//!
//! A entrada é lida sob demanda, com apenas um caractere de antecipação; o
//! texto inteiro nunca precisa estar na memória.

use std::fmt;
use std::io::{self, Read};
use std::iter::FusedIterator;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use crate::dictionary::NamedEntity;
use crate::error::{NerError, Result};
use crate::source::{Lookahead, Utf8Chars};

/// Uma palavra (ou número) do texto.
///
/// Para a entrada `"(Joe's)"`, o token tem conteúdo `Joes`, símbolo anterior `(`
/// e símbolos posteriores `')`: fica registrado que a palavra estava entre
/// parênteses e tinha um apóstrofo.
///
/// A igualdade considera texto, sentença e símbolos; as entidades marcadas
/// não participam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    before: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    after: String,
    sentence: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entities: Vec<Arc<NamedEntity>>,
}

impl Token {
    pub fn new(text: impl Into<String>, sentence: usize) -> Self {
        Self::with_symbols(text, "", "", sentence)
    }

    pub fn with_symbols(
        text: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
        sentence: usize,
    ) -> Self {
        Self {
            text: text.into(),
            before: before.into(),
            after: after.into(),
            sentence,
            entities: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Símbolos que precedem a palavra, na ordem em que apareceram.
    pub fn before(&self) -> &str {
        &self.before
    }

    /// Símbolos que seguem a palavra.
    pub fn after(&self) -> &str {
        &self.after
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn entities(&self) -> &[Arc<NamedEntity>] {
        &self.entities
    }

    pub fn is_tagged(&self) -> bool {
        !self.entities.is_empty()
    }

    /// Acrescenta uma referência (compartilhada) à entidade.
    pub fn tag_with(&mut self, entity: Arc<NamedEntity>) {
        self.entities.push(entity);
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.sentence == other.sentence
            && self.before == other.before
            && self.after == other.after
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.text, self.sentence)?;
        if !self.before.is_empty() || !self.after.is_empty() {
            write!(f, " [{},{}]", self.before, self.after)?;
        }
        Ok(())
    }
}

/// Estados da máquina de tokenização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    BeforeWord,
    InWord,
    InDigit,
    /// Pontos consecutivos entre palavras; `dots` conta quantos.
    DotSequence { dots: usize },
    /// Pontuação final de uma palavra já emitida.
    TrailingPunctuation,
}

/// Buffers mutáveis da máquina: palavra corrente, símbolos pendentes e o
/// contador de sentenças.
#[derive(Debug, Default)]
pub struct Accumulator {
    word: String,
    before: String,
    after: String,
    sentence: usize,
}

impl Accumulator {
    /// Fecha a palavra corrente em um token e limpa os buffers de símbolos.
    fn emit(&mut self) -> Token {
        Token::with_symbols(
            std::mem::take(&mut self.word),
            std::mem::take(&mut self.before),
            std::mem::take(&mut self.after),
            self.sentence,
        )
    }

    fn has_partial(&self) -> bool {
        !self.word.is_empty()
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }
}

/// Resultado de um passo da máquina.
#[derive(Debug)]
pub struct Transition {
    pub state: State,
    /// `false` quando o caractere deve ser reprocessado no novo estado.
    pub consumed: bool,
    pub token: Option<Token>,
}

impl Transition {
    fn consume(state: State) -> Self {
        Self { state, consumed: true, token: None }
    }

    fn reprocess(state: State) -> Self {
        Self { state, consumed: false, token: None }
    }

    fn emit(state: State, token: Token) -> Self {
        Self { state, consumed: true, token: Some(token) }
    }
}

fn is_blank(c: char) -> bool {
    c.is_whitespace()
}

/// Dígito decimal (categoria Nd). Frações e sobrescritos não contam.
fn is_digit(c: char) -> bool {
    c.general_category() == GeneralCategory::DecimalNumber
}

fn is_surrounding_symbol(c: char) -> bool {
    matches!(c, '(' | ')' | ';' | ':' | '\'' | '"' | ',')
}

fn is_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Função de transição: `(estado, caractere, próximo caractere, buffers)` →
/// `(novo estado, token emitido?, consumiu?)`.
pub fn transition(state: State, c: char, lookahead: Option<char>, acc: &mut Accumulator) -> Transition {
    match state {
        State::BeforeWord => {
            if is_blank(c) {
                Transition::consume(State::BeforeWord)
            } else if is_surrounding_symbol(c) {
                acc.before.push(c);
                Transition::consume(State::BeforeWord)
            } else if c.is_alphabetic() {
                acc.word.push(c);
                Transition::consume(State::InWord)
            } else if is_digit(c) {
                acc.word.push(c);
                Transition::consume(State::InDigit)
            } else if c == '.' {
                Transition::consume(State::DotSequence { dots: 1 })
            } else {
                Transition::consume(State::BeforeWord)
            }
        }

        State::DotSequence { dots } => {
            if c == '.' {
                return Transition::consume(State::DotSequence { dots: dots + 1 });
            }
            // Um ponto isolado encerra a sentença; mais de um é reticência
            if dots == 1 {
                acc.sentence += 1;
            }
            Transition::reprocess(State::BeforeWord)
        }

        State::InWord => {
            if is_punctuation(c) {
                let token = acc.emit();
                acc.sentence += 1;
                Transition::emit(State::TrailingPunctuation, token)
            } else if is_blank(c) {
                Transition::emit(State::BeforeWord, acc.emit())
            } else if is_surrounding_symbol(c) {
                acc.after.push(c);
                Transition::consume(State::InWord)
            } else {
                acc.word.push(c);
                Transition::consume(State::InWord)
            }
        }

        State::TrailingPunctuation => {
            if is_punctuation(c) {
                Transition::consume(State::TrailingPunctuation)
            } else {
                Transition::reprocess(State::BeforeWord)
            }
        }

        State::InDigit => {
            if is_digit(c) {
                acc.word.push(c);
                Transition::consume(State::InDigit)
            } else if c == '.' {
                let is_decimal_point =
                    !acc.word.contains('.') && lookahead.is_some_and(is_digit);
                if is_decimal_point {
                    acc.word.push(c);
                    Transition::consume(State::InDigit)
                } else {
                    // "3." no fim da frase: o ponto é pontuação da palavra
                    Transition::reprocess(State::InWord)
                }
            } else {
                Transition::emit(State::BeforeWord, acc.emit())
            }
        }
    }
}

/// Iterador de tokens sobre uma fonte de caracteres.
///
/// Consumível uma única vez, do início ao fim. Uma falha de leitura é
/// devolvida como `Some(Err(..))` e encerra a sequência.
pub struct Lexer<I> {
    chars: Lookahead<I>,
    state: State,
    acc: Accumulator,
    finished: bool,
}

/// Fonte de caracteres de um `&str`.
pub type TextChars<'a> = std::iter::Map<std::str::Chars<'a>, fn(char) -> io::Result<char>>;

impl<'a> Lexer<TextChars<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Lexer::new(text.chars().map(Ok as fn(char) -> io::Result<char>))
    }
}

impl<R: Read> Lexer<Utf8Chars<R>> {
    /// Tokeniza bytes UTF-8 lidos sob demanda.
    pub fn from_reader(reader: R) -> Self {
        Lexer::new(Utf8Chars::new(reader))
    }
}

impl<I> Lexer<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    pub fn new(chars: I) -> Self {
        Self {
            chars: Lookahead::new(chars),
            state: State::BeforeWord,
            acc: Accumulator::default(),
            finished: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            let Some(c) = self.chars.peek().map_err(NerError::SourceRead)? else {
                // Fim da fonte: descarrega a palavra pendente, se houver
                self.finished = true;
                return Ok(self.acc.has_partial().then(|| self.acc.emit()));
            };
            let lookahead = self.chars.peek_next().map_err(NerError::SourceRead)?;

            let step = transition(self.state, c, lookahead, &mut self.acc);
            self.state = step.state;
            if step.consumed {
                self.chars.advance();
            }
            if let Some(token) = step.token {
                return Ok(Some(token));
            }
        }
    }
}

impl<I> Iterator for Lexer<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<I> FusedIterator for Lexer<I> where I: Iterator<Item = io::Result<char>> {}

/// Tokeniza um texto inteiro de uma vez (atalho para testes e textos curtos).
pub fn tokenize(text: &str) -> Vec<Token> {
    // Fontes em memória não falham
    Lexer::from_text(text).filter_map(Result::ok).collect()
}
