//! # Corpus de Demonstração
//!
//! Textos curtos (em inglês, como os documentos de origem) e uma lista de
//! entidades usada quando nenhum arquivo de dicionário é fornecido.

use crate::dictionary::EntityDictionary;

/// Lista de entidades de demonstração, no mesmo formato do arquivo `NER.txt`.
pub const DEMO_ENTITIES: &str = "\
Isaac Newton
Newton Raphson
Joseph Raphson
James Clerk Maxwell
Carl Friedrich Gauss
Carl Sagan
Albert Einstein
Marie Curie
Ada Lovelace
Charles Babbage
Alan Turing
Kurt Gödel
Royal Society
Cambridge
Princeton
Europe
";

/// Dicionário construído a partir de [`DEMO_ENTITIES`].
pub fn demo_dictionary() -> EntityDictionary {
    EntityDictionary::from_lines(DEMO_ENTITIES.lines())
}

/// Pares (nome do documento, texto).
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "physics.txt",
            "Isaac Newton presented his Principia to the Royal Society in 1687. \
             Almost two centuries later, James Clerk Maxwell unified electricity and \
             magnetism; Maxwell's equations (published in 1865) predicted light as an \
             electromagnetic wave... Einstein later wrote that the special theory of \
             relativity owed its origins to Maxwell.",
        ),
        (
            "mathematics.txt",
            "The Newton Raphson method finds roots of real-valued functions. \
             Joseph Raphson published it in 1690. Gauss, the \"prince of mathematicians\", \
             computed the orbit of Ceres with an error below 0.5 degrees! Carl Sagan \
             admired him... as did many others.",
        ),
        (
            "computing.txt",
            "Ada Lovelace wrote the first published algorithm for Charles Babbage's \
             Analytical Engine. A century later, Alan Turing (at Cambridge and then \
             Princeton) formalised computation. Did Gödel's incompleteness theorems \
             influence him? Yes. Turing's paper appeared in 1936.",
        ),
    ]
}
