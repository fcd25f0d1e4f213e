//! # Tipos de Erro
//!
//! Todos os erros do pipeline são representados por [`NerError`]. Falhas são
//! sempre fatais para o documento (ou dicionário) em questão: nada é
//! re-tentado nem engolido dentro do núcleo.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Erro principal do `ner-core`.
#[derive(Error, Debug)]
pub enum NerError {
    /// A fonte de caracteres falhou no meio da leitura.
    /// O documento correspondente é descartado por inteiro.
    #[error("falha ao ler a fonte de caracteres: {0}")]
    SourceRead(#[source] io::Error),

    /// O arquivo de entidades não pôde ser aberto ou lido.
    #[error("falha ao carregar o dicionário de entidades '{}': {}", path.display(), source)]
    DictionaryLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// O arquivo do documento não pôde ser aberto. Nenhum caractere foi lido.
    #[error("falha ao abrir o documento '{}': {}", path.display(), source)]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Falha ao escrever a representação XML.
    #[error("falha ao renderizar XML: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Alias de `Result` para operações que podem falhar com [`NerError`].
pub type Result<T> = std::result::Result<T, NerError>;

impl NerError {
    /// Cria um erro de carga de dicionário para o caminho informado.
    pub fn dictionary_load(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NerError::DictionaryLoad {
            path: path.into(),
            source,
        }
    }

    /// Cria um erro de abertura de documento para o caminho informado.
    pub fn document_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NerError::DocumentOpen {
            path: path.into(),
            source,
        }
    }
}
