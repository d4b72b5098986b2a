//! Target/source encoding selectors and byte-order-mark handling
//!
//! The selector vocabulary mirrors the engine's codeset names, including
//! the BOM-bearing Unicode variants that the convert entry point
//! canonicalizes away before running a conversion.

/// One engine codeset, as resolvable from an option token.
///
/// Selectors are set by the engine's option parser, normalized once before
/// conversion, and never persist across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingSelector {
    /// ISO-2022-JP (7-bit JIS)
    Iso2022Jp,
    /// EUC-JP
    EucJp,
    /// Shift_JIS
    ShiftJis,
    /// UTF-8 without BOM
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 big endian without BOM
    Utf16Be,
    /// UTF-16 big endian with BOM
    Utf16BeBom,
    /// UTF-16 little endian without BOM
    Utf16Le,
    /// UTF-16 little endian with BOM
    Utf16LeBom,
    /// UTF-32 big endian without BOM
    Utf32Be,
    /// UTF-32 big endian with BOM
    Utf32BeBom,
    /// UTF-32 little endian without BOM
    Utf32Le,
    /// UTF-32 little endian with BOM
    Utf32LeBom,
}

impl EncodingSelector {
    /// Canonical codeset name.
    pub fn name(self) -> &'static str {
        match self {
            EncodingSelector::Iso2022Jp => "ISO-2022-JP",
            EncodingSelector::EucJp => "EUC-JP",
            EncodingSelector::ShiftJis => "Shift_JIS",
            EncodingSelector::Utf8 => "UTF-8",
            EncodingSelector::Utf8Bom => "UTF-8-BOM",
            EncodingSelector::Utf16Be => "UTF-16BE",
            EncodingSelector::Utf16BeBom => "UTF-16BE-BOM",
            EncodingSelector::Utf16Le => "UTF-16LE",
            EncodingSelector::Utf16LeBom => "UTF-16LE-BOM",
            EncodingSelector::Utf32Be => "UTF-32BE",
            EncodingSelector::Utf32BeBom => "UTF-32BE-BOM",
            EncodingSelector::Utf32Le => "UTF-32LE",
            EncodingSelector::Utf32LeBom => "UTF-32LE-BOM",
        }
    }

    /// Resolve a codeset name, case-insensitively, honoring the engine's
    /// aliases (`UTF-8` = `UTF-8N`, `UTF-16` = `UTF-16BE`, `UTF-32` =
    /// `UTF-32BE`, `SJIS`/`MS-Kanji` = `Shift_JIS`).
    pub fn from_name(name: &str) -> Option<Self> {
        let selector = match name.to_ascii_uppercase().as_str() {
            "ISO-2022-JP" => EncodingSelector::Iso2022Jp,
            "EUC-JP" | "EUCJP" => EncodingSelector::EucJp,
            "SHIFT_JIS" | "SHIFT-JIS" | "SJIS" | "MS-KANJI" => EncodingSelector::ShiftJis,
            "UTF-8" | "UTF-8N" | "UTF8" => EncodingSelector::Utf8,
            "UTF-8-BOM" => EncodingSelector::Utf8Bom,
            "UTF-16" | "UTF-16BE" => EncodingSelector::Utf16Be,
            "UTF-16BE-BOM" => EncodingSelector::Utf16BeBom,
            "UTF-16LE" => EncodingSelector::Utf16Le,
            "UTF-16LE-BOM" => EncodingSelector::Utf16LeBom,
            "UTF-32" | "UTF-32BE" => EncodingSelector::Utf32Be,
            "UTF-32BE-BOM" => EncodingSelector::Utf32BeBom,
            "UTF-32LE" => EncodingSelector::Utf32Le,
            "UTF-32LE-BOM" => EncodingSelector::Utf32LeBom,
            _ => return None,
        };
        Some(selector)
    }

    /// Rewrite a BOM-bearing variant to its plain form; identity otherwise.
    pub fn without_bom(self) -> Self {
        match self {
            EncodingSelector::Utf8Bom => EncodingSelector::Utf8,
            EncodingSelector::Utf16BeBom => EncodingSelector::Utf16Be,
            EncodingSelector::Utf16LeBom => EncodingSelector::Utf16Le,
            EncodingSelector::Utf32BeBom => EncodingSelector::Utf32Be,
            EncodingSelector::Utf32LeBom => EncodingSelector::Utf32Le,
            other => other,
        }
    }

    /// True for the five BOM-bearing variants.
    pub fn emits_bom(self) -> bool {
        self != self.without_bom()
    }

    /// True for the Unicode family (with or without BOM).
    pub fn is_unicode(self) -> bool {
        !matches!(
            self,
            EncodingSelector::Iso2022Jp | EncodingSelector::EucJp | EncodingSelector::ShiftJis
        )
    }

    /// The byte-order mark this encoding would carry, if any.
    pub fn bom(self) -> Option<&'static [u8]> {
        match self.without_bom() {
            EncodingSelector::Utf8 => Some(&[0xEF, 0xBB, 0xBF]),
            EncodingSelector::Utf16Be => Some(&[0xFE, 0xFF]),
            EncodingSelector::Utf16Le => Some(&[0xFF, 0xFE]),
            EncodingSelector::Utf32Be => Some(&[0x00, 0x00, 0xFE, 0xFF]),
            EncodingSelector::Utf32Le => Some(&[0xFF, 0xFE, 0x00, 0x00]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(
            EncodingSelector::from_name("utf-8"),
            Some(EncodingSelector::Utf8)
        );
        assert_eq!(
            EncodingSelector::from_name("Shift_JIS"),
            Some(EncodingSelector::ShiftJis)
        );
        assert_eq!(
            EncodingSelector::from_name("sjis"),
            Some(EncodingSelector::ShiftJis)
        );
        assert_eq!(EncodingSelector::from_name("KOI8-R"), None);
    }

    #[test]
    fn utf16_and_utf32_default_to_big_endian() {
        assert_eq!(
            EncodingSelector::from_name("UTF-16"),
            Some(EncodingSelector::Utf16Be)
        );
        assert_eq!(
            EncodingSelector::from_name("UTF-32"),
            Some(EncodingSelector::Utf32Be)
        );
    }

    #[test]
    fn strips_every_bom_variant() {
        let pairs = [
            (EncodingSelector::Utf8Bom, EncodingSelector::Utf8),
            (EncodingSelector::Utf16BeBom, EncodingSelector::Utf16Be),
            (EncodingSelector::Utf16LeBom, EncodingSelector::Utf16Le),
            (EncodingSelector::Utf32BeBom, EncodingSelector::Utf32Be),
            (EncodingSelector::Utf32LeBom, EncodingSelector::Utf32Le),
        ];
        for (with_bom, plain) in pairs {
            assert!(with_bom.emits_bom());
            assert_eq!(with_bom.without_bom(), plain);
            assert!(!plain.emits_bom());
            assert_eq!(plain.without_bom(), plain);
        }
    }

    #[test]
    fn jis_family_is_not_unicode() {
        assert!(!EncodingSelector::ShiftJis.is_unicode());
        assert!(!EncodingSelector::EucJp.is_unicode());
        assert!(EncodingSelector::Utf16LeBom.is_unicode());
        assert_eq!(EncodingSelector::ShiftJis.bom(), None);
    }
}
