//! Conversion engine contract and the built-in Unicode-family engine
//!
//! The converter is generic over any [`Engine`]: an option parser plus a
//! blocking byte-at-a-time conversion loop wired to an [`InputCursor`] and
//! an [`OutputSink`]. The bundled [`UnicodeEngine`] covers conversions the
//! standard library can express (UTF-8, UTF-16 and UTF-32 in both byte
//! orders) and a coarse detection mode. JIS-family targets parse into
//! selectors for option compatibility but are rejected at run time.

use crate::cursor::InputCursor;
use crate::encoding::EncodingSelector;
use crate::sink::OutputSink;
use crate::{Error, Result};

/// Call contract between the converter and a conversion engine.
///
/// Engines hold process-wide conversion state in the original design; here
/// every public entry point calls [`Engine::reset`] first so state never
/// leaks between calls. During [`Engine::run`] an engine may push back at
/// most one byte between reads of the cursor.
pub trait Engine {
    /// Restore every conversion setting to its default.
    fn reset(&mut self);

    /// Consume one option token, in application order. Side effect only;
    /// unrecognized tokens are ignored.
    fn apply_option(&mut self, token: &str);

    /// The output encoding resolved by option parsing, if any.
    fn output_encoding(&self) -> Option<EncodingSelector>;

    /// Override the resolved output encoding.
    fn set_output_encoding(&mut self, encoding: EncodingSelector);

    /// Turn emission of a leading byte-order mark on or off.
    fn set_emit_bom(&mut self, emit: bool);

    /// Switch detection mode: when on, [`Engine::run`] suppresses output
    /// and records a codec name instead.
    fn set_detect_only(&mut self, detect: bool);

    /// Scan the entire input, writing converted bytes through the sink.
    /// Blocking and non-yielding; returns once the cursor is exhausted.
    fn run(&mut self, source: &mut InputCursor<'_>, sink: &mut OutputSink) -> Result<()>;

    /// Codec name recorded by the last detection run. Empty means the
    /// input never left 7-bit ASCII.
    fn detected_name(&self) -> &str;
}

/// Engine for conversions within the Unicode family.
///
/// Understands the classic option vocabulary (`-j -s -e -w -w8 -w16 -w32`,
/// their uppercase input-side counterparts, `--jis`/`--euc`/`--sjis`, and
/// `--ic=`/`--oc=` with codeset names). Input decoding is strict; the
/// input encoding is sniffed from a leading BOM when no option names one.
#[derive(Debug, Default)]
pub struct UnicodeEngine {
    input_encoding: Option<EncodingSelector>,
    output_encoding: Option<EncodingSelector>,
    emit_bom: bool,
    detect_only: bool,
    detected: &'static str,
}

impl UnicodeEngine {
    /// Engine with all settings at their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The input encoding resolved by option parsing, if any.
    pub fn input_encoding(&self) -> Option<EncodingSelector> {
        self.input_encoding
    }

    fn set_output(&mut self, encoding: EncodingSelector) {
        self.output_encoding = Some(encoding);
        self.emit_bom = encoding.emits_bom();
    }
}

impl Engine for UnicodeEngine {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn apply_option(&mut self, token: &str) {
        if let Some(name) = token.strip_prefix("--ic=") {
            if let Some(encoding) = EncodingSelector::from_name(name) {
                self.input_encoding = Some(encoding);
            }
            return;
        }
        if let Some(name) = token.strip_prefix("--oc=") {
            if let Some(encoding) = EncodingSelector::from_name(name) {
                self.set_output(encoding);
            }
            return;
        }
        match token {
            // Output side
            "-j" | "--jis" => self.set_output(EncodingSelector::Iso2022Jp),
            "-s" | "--sjis" => self.set_output(EncodingSelector::ShiftJis),
            "-e" | "--euc" => self.set_output(EncodingSelector::EucJp),
            "-w" | "-w80" => self.set_output(EncodingSelector::Utf8),
            "-w8" => self.set_output(EncodingSelector::Utf8Bom),
            "-w16" | "-w16B" => self.set_output(EncodingSelector::Utf16BeBom),
            "-w16B0" => self.set_output(EncodingSelector::Utf16Be),
            "-w16L" => self.set_output(EncodingSelector::Utf16LeBom),
            "-w16L0" => self.set_output(EncodingSelector::Utf16Le),
            "-w32" | "-w32B" => self.set_output(EncodingSelector::Utf32BeBom),
            "-w32B0" => self.set_output(EncodingSelector::Utf32Be),
            "-w32L" => self.set_output(EncodingSelector::Utf32LeBom),
            "-w32L0" => self.set_output(EncodingSelector::Utf32Le),
            // Input side
            "-J" | "--jis-input" => self.input_encoding = Some(EncodingSelector::Iso2022Jp),
            "-S" | "--sjis-input" => self.input_encoding = Some(EncodingSelector::ShiftJis),
            "-E" | "--euc-input" => self.input_encoding = Some(EncodingSelector::EucJp),
            "-W" | "-W8" => self.input_encoding = Some(EncodingSelector::Utf8),
            "-W16" | "-W16B" => self.input_encoding = Some(EncodingSelector::Utf16Be),
            "-W16L" => self.input_encoding = Some(EncodingSelector::Utf16Le),
            "-W32" | "-W32B" => self.input_encoding = Some(EncodingSelector::Utf32Be),
            "-W32L" => self.input_encoding = Some(EncodingSelector::Utf32Le),
            _ => {}
        }
    }

    fn output_encoding(&self) -> Option<EncodingSelector> {
        self.output_encoding
    }

    fn set_output_encoding(&mut self, encoding: EncodingSelector) {
        self.output_encoding = Some(encoding);
    }

    fn set_emit_bom(&mut self, emit: bool) {
        self.emit_bom = emit;
    }

    fn set_detect_only(&mut self, detect: bool) {
        self.detect_only = detect;
    }

    fn run(&mut self, source: &mut InputCursor<'_>, sink: &mut OutputSink) -> Result<()> {
        if self.detect_only {
            self.detected = classify(source);
            return Ok(());
        }

        let to = match self.output_encoding {
            Some(encoding) => encoding,
            None => return Err(Error::NoOutputEncoding),
        };
        let declared = self.input_encoding.map(EncodingSelector::without_bom);
        if let Some(from) = declared {
            if !from.is_unicode() {
                return Err(Error::UnsupportedConversion {
                    from: from.name(),
                    to: to.name(),
                });
            }
        }
        if !to.is_unicode() {
            return Err(Error::UnsupportedConversion {
                from: declared.map_or("automatic detection", EncodingSelector::name),
                to: to.name(),
            });
        }

        let (from, mut feed, bom_consumed) = match declared {
            Some(encoding) => (encoding, Feed::new(source), false),
            None => {
                let (encoding, feed) = sniff(source);
                (encoding, feed, true)
            }
        };

        let to = to.without_bom();
        if self.emit_bom {
            if let Some(bom) = to.bom() {
                for &byte in bom {
                    sink.put(byte);
                }
            }
        }
        // With an explicit input encoding the BOM, if present, arrives as
        // an ordinary leading U+FEFF scalar and is dropped here.
        let mut at_start = !bom_consumed;
        while let Some(scalar) = next_scalar(&mut feed, from)? {
            if at_start {
                at_start = false;
                if scalar == '\u{FEFF}' {
                    continue;
                }
            }
            put_scalar(scalar, to, sink);
        }
        Ok(())
    }

    fn detected_name(&self) -> &str {
        self.detected
    }
}

/// Byte source that replays a sniffed prefix before draining the cursor.
///
/// Mirrors the cursor's single-slot pushback: `give_back` may only follow
/// a successful `next`.
struct Feed<'c, 'a> {
    pending: [u8; 4],
    head: usize,
    len: usize,
    last_from_pending: bool,
    source: &'c mut InputCursor<'a>,
}

impl<'c, 'a> Feed<'c, 'a> {
    fn new(source: &'c mut InputCursor<'a>) -> Self {
        Self::with_pending(source, [0; 4], 0, 0)
    }

    fn with_pending(source: &'c mut InputCursor<'a>, pending: [u8; 4], head: usize, len: usize) -> Self {
        Self {
            pending,
            head,
            len,
            last_from_pending: false,
            source,
        }
    }

    fn next(&mut self) -> Option<u8> {
        if self.head < self.len {
            let byte = self.pending[self.head];
            self.head += 1;
            self.last_from_pending = true;
            Some(byte)
        } else {
            self.last_from_pending = false;
            self.source.next_byte()
        }
    }

    fn give_back(&mut self) {
        if self.last_from_pending {
            self.head -= 1;
        } else {
            self.source.push_back();
        }
    }
}

/// Decide the input encoding from a leading byte-order mark, defaulting to
/// UTF-8. Reads at most four bytes; whatever is not BOM is replayed.
fn sniff<'c, 'a>(source: &'c mut InputCursor<'a>) -> (EncodingSelector, Feed<'c, 'a>) {
    let mut prefix = [0u8; 4];
    let mut len = 0;
    while len < 4 {
        match source.next_byte() {
            Some(byte) => {
                prefix[len] = byte;
                len += 1;
            }
            None => break,
        }
    }
    // UTF-32 before UTF-16: FF FE 00 00 would otherwise read as UTF-16LE.
    let (encoding, bom_len) = match &prefix[..len] {
        [0x00, 0x00, 0xFE, 0xFF] => (EncodingSelector::Utf32Be, 4),
        [0xFF, 0xFE, 0x00, 0x00] => (EncodingSelector::Utf32Le, 4),
        p if p.starts_with(&[0xEF, 0xBB, 0xBF]) => (EncodingSelector::Utf8, 3),
        p if p.starts_with(&[0xFE, 0xFF]) => (EncodingSelector::Utf16Be, 2),
        p if p.starts_with(&[0xFF, 0xFE]) => (EncodingSelector::Utf16Le, 2),
        _ => (EncodingSelector::Utf8, 0),
    };
    (encoding, Feed::with_pending(source, prefix, bom_len, len))
}

fn next_scalar(feed: &mut Feed<'_, '_>, from: EncodingSelector) -> Result<Option<char>> {
    match from {
        EncodingSelector::Utf8 => next_utf8(feed),
        EncodingSelector::Utf16Be => next_utf16(feed, true),
        EncodingSelector::Utf16Le => next_utf16(feed, false),
        EncodingSelector::Utf32Be => next_utf32(feed, true),
        EncodingSelector::Utf32Le => next_utf32(feed, false),
        _ => unreachable!(),
    }
}

fn next_utf8(feed: &mut Feed<'_, '_>) -> Result<Option<char>> {
    let lead = match feed.next() {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let len = match lead {
        0x00..=0x7F => return Ok(Some(lead as char)),
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => {
            return Err(Error::InvalidInput(format!(
                "invalid UTF-8 lead byte 0x{lead:02X}"
            )));
        }
    };
    let mut buf = [lead, 0, 0, 0];
    for slot in buf.iter_mut().take(len).skip(1) {
        match feed.next() {
            Some(byte) if byte & 0xC0 == 0x80 => *slot = byte,
            Some(_) => {
                // Leave the offending byte unconsumed; it is not part of
                // this sequence.
                feed.give_back();
                return Err(Error::InvalidInput("truncated UTF-8 sequence".to_string()));
            }
            None => return Err(Error::InvalidInput("truncated UTF-8 sequence".to_string())),
        }
    }
    let decoded = std::str::from_utf8(&buf[..len])
        .map_err(|_| Error::InvalidInput("invalid UTF-8 sequence".to_string()))?;
    Ok(decoded.chars().next())
}

fn next_utf16(feed: &mut Feed<'_, '_>, big_endian: bool) -> Result<Option<char>> {
    let unit = match next_u16(feed, big_endian)? {
        Some(unit) => unit,
        None => return Ok(None),
    };
    match unit {
        0xD800..=0xDBFF => {
            let low = next_u16(feed, big_endian)?.ok_or_else(|| {
                Error::InvalidInput("UTF-16 high surrogate at end of input".to_string())
            })?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(Error::InvalidInput(format!(
                    "unpaired UTF-16 surrogate 0x{unit:04X}"
                )));
            }
            let scalar =
                0x10000 + (((unit - 0xD800) as u32) << 10) + (low - 0xDC00) as u32;
            char::from_u32(scalar)
                .map(Some)
                .ok_or_else(|| Error::InvalidInput("invalid UTF-16 sequence".to_string()))
        }
        0xDC00..=0xDFFF => Err(Error::InvalidInput(format!(
            "unpaired UTF-16 surrogate 0x{unit:04X}"
        ))),
        _ => char::from_u32(unit as u32)
            .map(Some)
            .ok_or_else(|| Error::InvalidInput("invalid UTF-16 sequence".to_string())),
    }
}

fn next_u16(feed: &mut Feed<'_, '_>, big_endian: bool) -> Result<Option<u16>> {
    let first = match feed.next() {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let second = feed
        .next()
        .ok_or_else(|| Error::InvalidInput("truncated UTF-16 code unit".to_string()))?;
    let unit = if big_endian {
        u16::from_be_bytes([first, second])
    } else {
        u16::from_le_bytes([first, second])
    };
    Ok(Some(unit))
}

fn next_utf32(feed: &mut Feed<'_, '_>, big_endian: bool) -> Result<Option<char>> {
    let first = match feed.next() {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let mut bytes = [first, 0, 0, 0];
    for slot in bytes.iter_mut().skip(1) {
        *slot = feed
            .next()
            .ok_or_else(|| Error::InvalidInput("truncated UTF-32 code unit".to_string()))?;
    }
    let scalar = if big_endian {
        u32::from_be_bytes(bytes)
    } else {
        u32::from_le_bytes(bytes)
    };
    char::from_u32(scalar).map(Some).ok_or_else(|| {
        Error::InvalidInput(format!("invalid UTF-32 code point 0x{scalar:08X}"))
    })
}

fn put_scalar(scalar: char, to: EncodingSelector, sink: &mut OutputSink) {
    match to {
        EncodingSelector::Utf8 => {
            let mut buf = [0u8; 4];
            for &byte in scalar.encode_utf8(&mut buf).as_bytes() {
                sink.put(byte);
            }
        }
        EncodingSelector::Utf16Be | EncodingSelector::Utf16Le => {
            let mut units = [0u16; 2];
            for &unit in scalar.encode_utf16(&mut units).iter() {
                let bytes = if to == EncodingSelector::Utf16Be {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                };
                for byte in bytes {
                    sink.put(byte);
                }
            }
        }
        EncodingSelector::Utf32Be | EncodingSelector::Utf32Le => {
            let bytes = if to == EncodingSelector::Utf32Be {
                (scalar as u32).to_be_bytes()
            } else {
                (scalar as u32).to_le_bytes()
            };
            for byte in bytes {
                sink.put(byte);
            }
        }
        _ => unreachable!(),
    }
}

/// One streaming pass over the input, labeling it with a codec name.
///
/// The vocabulary is deliberately coarse: BOM-marked UTF-16/32, strictly
/// valid UTF-8, pure 7-bit ASCII (empty name), 7-bit input carrying ESC
/// (the ISO-2022-JP designator lead-in), and BINARY for everything else.
fn classify(source: &mut InputCursor<'_>) -> &'static str {
    let mut first4 = [0u8; 4];
    let mut count = 0usize;
    let mut all_ascii = true;
    let mut has_esc = false;
    let mut utf8_ok = true;
    // Incremental UTF-8 validation state: bytes still expected in the
    // current sequence, and the sequence collected so far.
    let mut expected = 0usize;
    let mut seq = [0u8; 4];
    let mut seq_len = 0usize;

    while let Some(byte) = source.next_byte() {
        if count < 4 {
            first4[count] = byte;
        }
        count += 1;
        if byte >= 0x80 {
            all_ascii = false;
        } else if byte == 0x1B {
            has_esc = true;
        }
        if !utf8_ok {
            continue;
        }
        if expected > 0 {
            if byte & 0xC0 == 0x80 {
                seq[seq_len] = byte;
                seq_len += 1;
                expected -= 1;
                if expected == 0 && std::str::from_utf8(&seq[..seq_len]).is_err() {
                    utf8_ok = false;
                }
            } else {
                utf8_ok = false;
            }
        } else {
            match byte {
                0x00..=0x7F => {}
                0xC2..=0xDF => {
                    seq = [byte, 0, 0, 0];
                    seq_len = 1;
                    expected = 1;
                }
                0xE0..=0xEF => {
                    seq = [byte, 0, 0, 0];
                    seq_len = 1;
                    expected = 2;
                }
                0xF0..=0xF4 => {
                    seq = [byte, 0, 0, 0];
                    seq_len = 1;
                    expected = 3;
                }
                _ => utf8_ok = false,
            }
        }
    }
    if expected > 0 {
        utf8_ok = false;
    }

    if count == 0 {
        return "";
    }
    if count >= 4 && (first4 == [0x00, 0x00, 0xFE, 0xFF] || first4 == [0xFF, 0xFE, 0x00, 0x00]) {
        return "UTF-32";
    }
    if count >= 2 && (first4[..2] == [0xFE, 0xFF] || first4[..2] == [0xFF, 0xFE]) {
        return "UTF-16";
    }
    if all_ascii {
        return if has_esc { "ISO-2022-JP" } else { "" };
    }
    if utf8_ok {
        return "UTF-8";
    }
    "BINARY"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_with(tokens: &[&str], input: &[u8]) -> Result<Vec<u8>> {
        let mut engine = UnicodeEngine::new();
        for token in tokens {
            engine.apply_option(token);
        }
        let mut cursor = InputCursor::new(input);
        let mut sink = OutputSink::new();
        engine.run(&mut cursor, &mut sink)?;
        Ok(sink.into_bytes())
    }

    fn detect(input: &[u8]) -> String {
        let mut engine = UnicodeEngine::new();
        engine.set_detect_only(true);
        let mut cursor = InputCursor::new(input);
        let mut sink = OutputSink::new();
        engine.run(&mut cursor, &mut sink).unwrap();
        engine.detected_name().to_string()
    }

    #[test]
    fn later_options_override_earlier_ones() {
        let mut engine = UnicodeEngine::new();
        engine.apply_option("-w");
        engine.apply_option("-s");
        assert_eq!(engine.output_encoding(), Some(EncodingSelector::ShiftJis));
        engine.apply_option("--oc=UTF-16LE");
        assert_eq!(engine.output_encoding(), Some(EncodingSelector::Utf16Le));
    }

    #[test]
    fn unknown_options_are_ignored() {
        let mut engine = UnicodeEngine::new();
        engine.apply_option("-Z3");
        engine.apply_option("--no-best-fit-chars");
        assert_eq!(engine.output_encoding(), None);
    }

    #[test]
    fn utf8_to_utf16be() {
        let output = convert_with(&["-w16B0"], b"Hi").unwrap();
        assert_eq!(output, [0x00, 0x48, 0x00, 0x69]);
    }

    #[test]
    fn utf16le_to_utf8_via_bom_sniff() {
        let output = convert_with(&["-w"], &[0xFF, 0xFE, 0x48, 0x00, 0x69, 0x00]).unwrap();
        assert_eq!(output, b"Hi");
    }

    #[test]
    fn utf32be_to_utf8_via_bom_sniff() {
        let input = [0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, 0x41];
        assert_eq!(convert_with(&["-w"], &input).unwrap(), b"A");
    }

    #[test]
    fn explicit_input_encoding_drops_leading_bom_scalar() {
        let input = [0xFE, 0xFF, 0x00, 0x41];
        assert_eq!(convert_with(&["-W16", "-w"], &input).unwrap(), b"A");
    }

    #[test]
    fn surrogate_pairs_round_through_utf16() {
        let clef = "\u{1D11E}";
        let utf16: Vec<u8> = convert_with(&["-w16B0"], clef.as_bytes()).unwrap();
        assert_eq!(utf16, [0xD8, 0x34, 0xDD, 0x1E]);
        let back = convert_with(&["-W16", "-w"], &utf16).unwrap();
        assert_eq!(back, clef.as_bytes());
    }

    #[test]
    fn bom_request_is_honored_on_the_engine_surface() {
        let output = convert_with(&["-w8"], b"abc").unwrap();
        assert_eq!(output, [0xEF, 0xBB, 0xBF, b'a', b'b', b'c']);
    }

    #[test]
    fn jis_targets_are_rejected() {
        let err = convert_with(&["-s"], b"abc").unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedConversion {
                from: "automatic detection",
                to: "Shift_JIS",
            }
        );
    }

    #[test]
    fn missing_output_encoding_is_an_error() {
        assert_eq!(
            convert_with(&[], b"abc").unwrap_err(),
            Error::NoOutputEncoding
        );
    }

    #[test]
    fn malformed_utf8_input_is_rejected() {
        let err = convert_with(&["-w"], &[0x41, 0xC3]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = convert_with(&["-w"], &[0xC3, 0x41]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        // Broken sequence past the sniffed prefix, so the bad byte is
        // handed back to the cursor itself.
        let err = convert_with(&["-w"], b"abcd\xC3A").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn odd_length_utf16_input_is_rejected() {
        let err = convert_with(&["-W16", "-w"], &[0x00, 0x41, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn classifies_ascii_as_empty_name() {
        assert_eq!(detect(b""), "");
        assert_eq!(detect(b"plain text\n"), "");
    }

    #[test]
    fn classifies_escape_sequences_as_jis() {
        assert_eq!(detect(b"\x1b$B!!\x1b(B"), "ISO-2022-JP");
    }

    #[test]
    fn classifies_multibyte_utf8() {
        assert_eq!(detect("こんにちは".as_bytes()), "UTF-8");
    }

    #[test]
    fn classifies_bom_marked_families() {
        assert_eq!(detect(&[0xFE, 0xFF, 0x00, 0x41]), "UTF-16");
        assert_eq!(detect(&[0xFF, 0xFE, 0x41, 0x00]), "UTF-16");
        assert_eq!(detect(&[0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, 0x41]), "UTF-32");
        assert_eq!(detect(&[0xFF, 0xFE, 0x00, 0x00, 0x41, 0x00, 0x00, 0x00]), "UTF-32");
    }

    #[test]
    fn classifies_undecodable_input_as_binary() {
        assert_eq!(detect(&[0x80, 0x80, 0x80]), "BINARY");
        assert_eq!(detect(&[0xFC, 0x01]), "BINARY");
    }

    #[test]
    fn reset_clears_every_setting() {
        let mut engine = UnicodeEngine::new();
        engine.apply_option("-w8");
        engine.apply_option("--ic=UTF-16LE");
        engine.set_detect_only(true);
        engine.reset();
        assert_eq!(engine.output_encoding(), None);
        assert_eq!(engine.input_encoding(), None);
        let mut cursor = InputCursor::new(b"abc");
        let mut sink = OutputSink::new();
        // Detection mode did not survive the reset.
        assert_eq!(
            engine.run(&mut cursor, &mut sink).unwrap_err(),
            Error::NoOutputEncoding
        );
    }
}
