//! # Fontes de Caracteres
//!
//! O lexer consome qualquer `Iterator<Item = io::Result<char>>`. Este módulo
//! fornece:
//!
//! - [`Utf8Chars`]: decodificador UTF-8 incremental sobre um `Read`, sem
//!   carregar a entrada inteira na memória.
//! - [`Lookahead`]: janela de dois caracteres (atual + próximo) usada pela
//!   máquina de estados para olhar um caractere à frente.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};

/// Decodifica caracteres UTF-8 de um leitor de bytes, um por vez.
///
/// Bytes inválidos produzem um erro `InvalidData`; depois de um erro (ou do fim
/// da entrada) o iterador não produz mais nada.
pub struct Utf8Chars<R> {
    reader: BufReader<R>,
    done: bool,
}

impl<R: Read> Utf8Chars<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            done: false,
        }
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut buf = [0u8; 4];
        if !self.read_byte(&mut buf[0])? {
            return Ok(None);
        }

        let width = utf8_width(buf[0]).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("byte inicial UTF-8 inválido: 0x{:02x}", buf[0]),
            )
        })?;

        for slot in buf.iter_mut().take(width).skip(1) {
            if !self.read_byte(slot)? {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "sequência UTF-8 truncada no fim da entrada",
                ));
            }
        }

        let decoded = std::str::from_utf8(&buf[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(decoded.chars().next())
    }

    fn read_byte(&mut self, out: &mut u8) -> io::Result<bool> {
        loop {
            let available = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(false);
            }
            *out = available[0];
            self.reader.consume(1);
            return Ok(true);
        }
    }
}

impl<R: Read> Iterator for Utf8Chars<R> {
    type Item = io::Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_char() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Número de bytes de uma sequência UTF-8 a partir do byte inicial.
fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Buffer de leitura antecipada com no máximo dois caracteres.
///
/// `peek` devolve o caractere atual e `peek_next` o seguinte; `None` marca o
/// fim da fonte (o "caractere sentinela").
pub struct Lookahead<I> {
    chars: I,
    window: VecDeque<char>,
    exhausted: bool,
}

impl<I> Lookahead<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    pub fn new(chars: I) -> Self {
        Self {
            chars,
            window: VecDeque::with_capacity(2),
            exhausted: false,
        }
    }

    fn fill(&mut self, n: usize) -> io::Result<()> {
        while self.window.len() < n && !self.exhausted {
            match self.chars.next() {
                Some(c) => self.window.push_back(c?),
                None => self.exhausted = true,
            }
        }
        Ok(())
    }

    pub fn peek(&mut self) -> io::Result<Option<char>> {
        self.fill(1)?;
        Ok(self.window.front().copied())
    }

    pub fn peek_next(&mut self) -> io::Result<Option<char>> {
        self.fill(2)?;
        Ok(self.window.get(1).copied())
    }

    /// Descarta o caractere atual.
    pub fn advance(&mut self) {
        self.window.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_chars_decodes_multibyte() {
        let text = "São Paulo — Ωmega 🦀";
        let decoded: String = Utf8Chars::new(text.as_bytes())
            .collect::<io::Result<String>>()
            .unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_utf8_chars_rejects_invalid_bytes() {
        let bytes: &[u8] = &[b'a', 0xFF, b'b'];
        let mut chars = Utf8Chars::new(bytes);
        assert_eq!(chars.next().unwrap().unwrap(), 'a');
        let err = chars.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(chars.next().is_none());
    }

    #[test]
    fn test_utf8_chars_rejects_truncated_sequence() {
        let bytes: &[u8] = &[0xC3];
        let err = Utf8Chars::new(bytes).next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_lookahead_peeks_two_chars() {
        let mut la = Lookahead::new("ab".chars().map(Ok));
        assert_eq!(la.peek().unwrap(), Some('a'));
        assert_eq!(la.peek_next().unwrap(), Some('b'));
        la.advance();
        assert_eq!(la.peek().unwrap(), Some('b'));
        assert_eq!(la.peek_next().unwrap(), None);
        la.advance();
        assert_eq!(la.peek().unwrap(), None);
    }
}
