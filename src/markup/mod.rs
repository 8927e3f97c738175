//! Markup handling for cooked post HTML: tokenizing, plain-text extraction
//! and excerpt highlighting.

pub mod highlight;
pub mod text;
pub mod tokenizer;

pub use highlight::{Highlighted, highlight_first};
pub use text::{DecodedText, plain_text};
pub use tokenizer::{Attribute, Token, TokenKind, matching_end, tokenize};
