//! # Representação XML
//!
//! Formato compatível com os consumidores existentes:
//!
//! ```text
//! <documents>
//!     <document name="a.txt">
//!         <sentence num="0">
//!             <word bef="(" aft=")" entities="Newton Raphson">Newton</word>
//!         </sentence>
//!     </document>
//! </documents>
//! ```
//!
//! Os atributos `bef`, `aft` e `entities` são omitidos quando vazios.
//! Entidades múltiplas são separadas por vírgula.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::document::{Document, Documents, Sentence};
use crate::error::Result;
use crate::tokenizer::Token;

const INDENT: &str = "    ";

fn pad(out: &mut impl Write, depth: usize) -> std::fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

pub fn write_token(out: &mut impl Write, token: &Token, depth: usize) -> std::fmt::Result {
    pad(out, depth)?;
    out.write_str("<word")?;
    if !token.before().is_empty() {
        write!(out, " bef=\"{}\"", escape(token.before()))?;
    }
    if !token.after().is_empty() {
        write!(out, " aft=\"{}\"", escape(token.after()))?;
    }
    if token.is_tagged() {
        let names: Vec<String> = token.entities().iter().map(|e| e.to_string()).collect();
        write!(out, " entities=\"{}\"", escape(names.join(",").as_str()))?;
    }
    writeln!(out, ">{}</word>", escape(token.text()))
}

pub fn write_sentence(out: &mut impl Write, sentence: &Sentence, depth: usize) -> std::fmt::Result {
    pad(out, depth)?;
    writeln!(out, "<sentence num=\"{}\">", sentence.num())?;
    for word in sentence.words() {
        write_token(out, word, depth + 1)?;
    }
    pad(out, depth)?;
    writeln!(out, "</sentence>")
}

pub fn write_document(out: &mut impl Write, document: &Document, depth: usize) -> std::fmt::Result {
    pad(out, depth)?;
    writeln!(out, "<document name=\"{}\">", escape(document.name()))?;
    for sentence in document.sentences() {
        write_sentence(out, sentence, depth + 1)?;
    }
    pad(out, depth)?;
    writeln!(out, "</document>")
}

pub fn write_documents(out: &mut impl Write, documents: &Documents) -> std::fmt::Result {
    writeln!(out, "<documents>")?;
    for document in documents {
        write_document(out, document, 1)?;
    }
    writeln!(out, "</documents>")
}

impl Document {
    pub fn to_xml(&self) -> Result<String> {
        let mut out = String::new();
        write_document(&mut out, self, 0)?;
        Ok(out)
    }
}

impl Documents {
    pub fn to_xml(&self) -> Result<String> {
        let mut out = String::new();
        write_documents(&mut out, self)?;
        Ok(out)
    }
}
