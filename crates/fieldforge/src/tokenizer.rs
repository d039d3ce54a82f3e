//! The external tokenization contract (spec §1, §3): "a library that
//! yields words with bounding boxes". The core pipeline only ever depends
//! on the [`PdfTokenizer`] trait; [`PdfiumTokenizer`] is one concrete,
//! feature-gated implementation so the crate is runnable without every
//! caller supplying its own.

use crate::types::Word;
use crate::Result;

pub trait PdfTokenizer: Send + Sync {
    /// Tokenizes every page of `pdf_bytes` into words with page-relative
    /// bounding boxes. Must return `Err` on a bad PDF or a document with no
    /// text layer (spec §7's "tokenization failure" — no partial results).
    fn tokenize(&self, pdf_bytes: &[u8]) -> Result<Vec<Word>>;
}

#[cfg(feature = "pdf")]
pub use pdfium::PdfiumTokenizer;

#[cfg(feature = "pdf")]
mod pdfium {
    use super::*;
    use crate::types::BoundingBox;
    use crate::FieldforgeError;
    use pdfium_render::prelude::*;

    /// Word + bounding-box extraction backed by `pdfium-render`. Kept
    /// deliberately thin: word-and-bbox only, no layout reconstruction or
    /// table detection (those are out of scope per spec §1).
    pub struct PdfiumTokenizer {
        pdfium: Pdfium,
    }

    impl PdfiumTokenizer {
        pub fn new() -> Result<Self> {
            let bindings = Pdfium::bind_to_system_library()
                .map_err(|e| FieldforgeError::input(format!("failed to bind pdfium: {e}")))?;
            Ok(Self { pdfium: Pdfium::new(bindings) })
        }
    }

    impl PdfTokenizer for PdfiumTokenizer {
        fn tokenize(&self, pdf_bytes: &[u8]) -> Result<Vec<Word>> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(pdf_bytes, None)
                .map_err(|e| FieldforgeError::input(format!("failed to load pdf: {e}")))?;

            let mut words = Vec::new();
            for (page_index, page) in document.pages().iter().enumerate() {
                let text_page = page
                    .text()
                    .map_err(|e| FieldforgeError::input(format!("page {page_index} has no text layer: {e}")))?;

                for segment in text_page.segments().iter() {
                    let text = segment.text();
                    for token in text.split_whitespace() {
                        let bounds = segment.bounds();
                        words.push(Word::new(
                            token.to_string(),
                            page_index,
                            BoundingBox::new(
                                bounds.left().value,
                                bounds.top().value,
                                bounds.right().value,
                                bounds.bottom().value,
                            ),
                        ));
                    }
                }
            }

            if words.is_empty() {
                return Err(FieldforgeError::input("document has no extractable text"));
            }

            Ok(words)
        }
    }
}

/// An in-memory tokenizer backed by pre-tokenized words, for tests and for
/// callers who already run their own tokenization front-end.
#[derive(Debug, Clone, Default)]
pub struct FixedTokenizer {
    pub words: Vec<Word>,
}

impl FixedTokenizer {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }
}

impl PdfTokenizer for FixedTokenizer {
    fn tokenize(&self, _pdf_bytes: &[u8]) -> Result<Vec<Word>> {
        Ok(self.words.clone())
    }
}
