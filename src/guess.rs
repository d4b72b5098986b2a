//! Coarse detection codes exposed to callers of the guess operation
//!
//! The engine identifies input codecs by name, with more variants than
//! most callers care to distinguish. This module collapses that name onto
//! a small fixed integer enumeration whose values match the constants the
//! original host module exported.

use serde::Serialize;

/// Coarse classification of a detected input codec.
///
/// The numeric values are part of the public contract: 0b011x is reserved
/// for the UTF-8 family, 0b10xx for UTF-16, 0b11xx for UTF-32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum GuessCode {
    /// Detection could not classify the input (also the automatic default).
    Unknown = 0,
    /// ISO-2022-JP
    Jis = 1,
    /// EUC-JP
    Euc = 2,
    /// Shift_JIS
    Sjis = 3,
    /// Non-text input left unconverted.
    Binary = 4,
    /// Pure 7-bit ASCII
    Ascii = 5,
    /// UTF-8 family
    Utf8 = 6,
    /// UTF-16 family
    Utf16 = 8,
    /// UTF-32 family
    Utf32 = 12,
    /// A codec outside every family above.
    Other = 16,
}

impl GuessCode {
    /// Automatic detection pseudo-code; numerically identical to
    /// [`GuessCode::Unknown`].
    pub const AUTO: GuessCode = GuessCode::Unknown;

    /// No-conversion pseudo-code; numerically identical to
    /// [`GuessCode::Binary`].
    pub const NOCONV: GuessCode = GuessCode::Binary;

    /// Collapse an engine-reported codec name onto a coarse code.
    ///
    /// The match is exact and case-sensitive against the engine's
    /// canonical names; every EUC/Shift_JIS sub-variant the engine may
    /// report folds into one code each, and any other non-empty name maps
    /// to [`GuessCode::Unknown`]. The empty name means the input never
    /// left 7-bit ASCII.
    pub fn from_codec_name(name: &str) -> Self {
        match name {
            "" => GuessCode::Ascii,
            "ISO-2022-JP" => GuessCode::Jis,
            "EUC-JP" => GuessCode::Euc,
            "Shift_JIS" => GuessCode::Sjis,
            "UTF-8" => GuessCode::Utf8,
            "UTF-16" => GuessCode::Utf16,
            _ => GuessCode::Unknown,
        }
    }

    /// The stable integer value of this code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Constant-style name, as the original host module spelled it.
    pub fn name(self) -> &'static str {
        match self {
            GuessCode::Unknown => "UNKNOWN",
            GuessCode::Jis => "JIS",
            GuessCode::Euc => "EUC",
            GuessCode::Sjis => "SJIS",
            GuessCode::Binary => "BINARY",
            GuessCode::Ascii => "ASCII",
            GuessCode::Utf8 => "UTF8",
            GuessCode::Utf16 => "UTF16",
            GuessCode::Utf32 => "UTF32",
            GuessCode::Other => "OTHER",
        }
    }
}
