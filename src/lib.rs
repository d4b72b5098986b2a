//! # nkf-bridge - buffer-in, buffer-out adapter for kanji filter engines
//!
//! Streaming kanji code converters in the nkf tradition pull input one
//! byte at a time and push output one byte at a time. This crate adapts
//! that interface to callers that hold a complete byte buffer and want a
//! complete converted buffer back, the way the classic scripting-language
//! bindings did:
//!
//! - a [`sink::OutputSink`] substitutes for the byte-stream sink, growing
//!   by an ever-doubling increment,
//! - an [`cursor::InputCursor`] substitutes for the byte-stream source,
//!   with single-slot pushback for the engine's lookahead,
//! - [`options::split_options`] turns one shell-style option string into
//!   the discrete tokens the engine's option parser expects,
//! - BOM-bearing output selections are canonicalized away so this entry
//!   point never emits a byte-order mark,
//! - the detection entry point collapses the engine's codec name onto the
//!   coarse numeric [`GuessCode`] enumeration.
//!
//! The conversion engine itself is a collaborator behind the [`Engine`]
//! trait; the bundled [`UnicodeEngine`] covers the Unicode family.
//!
//! ## Quick start
//!
//! ```rust
//! use nkf_bridge::Converter;
//!
//! let mut converter = Converter::default();
//!
//! // Same option-string surface as the command line, quoting included.
//! let utf16 = converter.convert("--oc=UTF-16BE", "Hi".as_bytes()).unwrap();
//! assert_eq!(utf16, [0x00, 0x48, 0x00, 0x69]);
//!
//! let guessed = converter.guess(b"plain ascii").unwrap();
//! assert_eq!(guessed, nkf_bridge::GuessCode::Ascii);
//! ```

#![deny(missing_docs)]

use std::fmt;

pub mod cursor;
pub mod encoding;
pub mod engine;
pub mod guess;
pub mod options;
pub mod sink;

pub use cursor::InputCursor;
pub use encoding::EncodingSelector;
pub use engine::{Engine, UnicodeEngine};
pub use guess::GuessCode;
pub use sink::OutputSink;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Option parsing completed without ever selecting an output encoding
    NoOutputEncoding,
    /// A single option token exceeded the maximum length
    OptionTooLong,
    /// The engine cannot convert between the resolved encodings
    UnsupportedConversion {
        /// Source encoding name (or how it would have been determined)
        from: &'static str,
        /// Target encoding name
        to: &'static str,
    },
    /// Input bytes are malformed under the resolved input encoding
    InvalidInput(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoOutputEncoding => write!(f, "no output encoding given"),
            Error::OptionTooLong => {
                write!(f, "option token exceeds {} bytes", options::MAX_TOKEN_LEN)
            }
            Error::UnsupportedConversion { from, to } => {
                write!(f, "unsupported conversion from {} to {}", from, to)
            }
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Buffer-in, buffer-out front end over one conversion engine.
///
/// All conversion state lives in the owned engine and is reset at the
/// start of every call, so no call can observe another's options, input
/// position, or output buffer. The converter itself is single-threaded;
/// calls run to completion before returning.
pub struct Converter<E> {
    engine: E,
}

impl<E: Engine> Converter<E> {
    /// Wrap an engine instance.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Convert `input` according to a shell-style option string.
    ///
    /// Tokens split out of `options` are applied to the engine in order,
    /// so later options override earlier ones. Fails with
    /// [`Error::NoOutputEncoding`] if no token selected an output
    /// encoding. A BOM-bearing output selection is rewritten to its plain
    /// form and BOM emission is forced off: this entry point never
    /// prepends a byte-order mark, even when the option string asks for
    /// one.
    pub fn convert(&mut self, options: &str, input: &[u8]) -> Result<Vec<u8>> {
        self.engine.reset();
        let engine = &mut self.engine;
        options::split_options(options, |token| engine.apply_option(token))?;

        let output_encoding = self
            .engine
            .output_encoding()
            .ok_or(Error::NoOutputEncoding)?;
        self.engine
            .set_output_encoding(output_encoding.without_bom());
        self.engine.set_emit_bom(false);

        let mut source = InputCursor::new(input);
        // Worst observed expansion for the supported codecs, so short
        // conversions usually finish without a growth event.
        let mut sink = OutputSink::with_capacity(input.len() * 3 + 10);
        self.engine.run(&mut source, &mut sink)?;
        Ok(sink.into_bytes())
    }

    /// Detect the input's codec and collapse it to a [`GuessCode`].
    ///
    /// Runs the engine in detection mode over a throwaway sink and maps
    /// the reported codec name; an unrecognized name yields
    /// [`GuessCode::Unknown`] rather than an error.
    pub fn guess(&mut self, input: &[u8]) -> Result<GuessCode> {
        self.engine.reset();
        self.engine.set_detect_only(true);
        let mut source = InputCursor::new(input);
        let mut sink = OutputSink::new();
        self.engine.run(&mut source, &mut sink)?;
        Ok(GuessCode::from_codec_name(self.engine.detected_name()))
    }

    /// Borrow the wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl Default for Converter<UnicodeEngine> {
    fn default() -> Self {
        Self::new(UnicodeEngine::new())
    }
}
