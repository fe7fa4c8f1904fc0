//! Routing of classified buffers to their decoders.

use super::config::ExtractOptions;
use super::decoder::{DecodeContext, Decoder};
use crate::common::detection::{FormatTag, probe, sniff};
use crate::common::{Error, Result};
use crate::text::{PlainTextDecoder, decode_text};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, warn};

/// Sniffs buffers and hands them to the decoder registered for their format.
///
/// An `Extractor` holds only configuration and an immutable decoder table,
/// so one instance can serve any number of threads. Every call allocates its
/// own scratch state.
///
/// # Examples
///
/// ```rust
/// use textractor::{Error, ExtractOptions, Extractor, FormatTag};
///
/// let extractor = Extractor::new(ExtractOptions::default());
/// assert_eq!(extractor.extract(b"Hello, World!").unwrap(), "Hello, World!");
/// assert_eq!(extractor.extract(b"").unwrap(), "");
///
/// let err = extractor.extract(b"%PDF-1.7\n1 0 obj").unwrap_err();
/// assert!(matches!(err, Error::MalformedDocument { format: FormatTag::Pdf, .. }));
/// ```
#[derive(Clone)]
pub struct Extractor {
    options: ExtractOptions,
    decoders: HashMap<FormatTag, Arc<dyn Decoder>>,
}

impl Extractor {
    /// Create an extractor with every decoder enabled at compile time.
    pub fn new(options: ExtractOptions) -> Self {
        let mut extractor = Self::empty(options);
        extractor.register(FormatTag::PlainText, Arc::new(PlainTextDecoder));

        #[cfg(feature = "pdf")]
        extractor.register(FormatTag::Pdf, Arc::new(crate::pdf::PdfDecoder));
        #[cfg(feature = "rtf")]
        extractor.register(FormatTag::Rtf, Arc::new(crate::rtf::RtfDecoder));
        #[cfg(feature = "ooxml")]
        {
            extractor.register(FormatTag::Docx, Arc::new(crate::ooxml::DocxDecoder));
            extractor.register(FormatTag::Xlsx, Arc::new(crate::ooxml::XlsxDecoder));
            extractor.register(FormatTag::Pptx, Arc::new(crate::ooxml::PptxDecoder));
        }
        #[cfg(feature = "odf")]
        {
            let decoder = Arc::new(crate::odf::OdfDecoder);
            extractor.register(FormatTag::Odt, decoder.clone());
            extractor.register(FormatTag::Ods, decoder.clone());
            extractor.register(FormatTag::Odp, decoder);
        }
        #[cfg(feature = "epub")]
        extractor.register(FormatTag::Epub, Arc::new(crate::epub::EpubDecoder));
        #[cfg(feature = "ole")]
        extractor.register(FormatTag::Doc, Arc::new(crate::ole::doc::DocDecoder));

        extractor
    }

    /// Create an extractor with no decoders registered.
    ///
    /// Only the best-effort path for unrecognized buffers is available until
    /// decoders are added with [`register`](Self::register).
    pub fn empty(options: ExtractOptions) -> Self {
        Self {
            options,
            decoders: HashMap::new(),
        }
    }

    /// Register `decoder` for `format`, replacing any previous one.
    pub fn register(&mut self, format: FormatTag, decoder: Arc<dyn Decoder>) -> &mut Self {
        self.decoders.insert(format, decoder);
        self
    }

    /// Whether a decoder is registered for `format`.
    #[inline]
    pub fn supports(&self, format: FormatTag) -> bool {
        self.decoders.contains_key(&format)
    }

    /// The options this extractor applies.
    #[inline]
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Classify `input`, looking inside ZIP and OLE2 containers.
    pub fn detect(&self, input: &[u8]) -> Result<FormatTag> {
        let tag = sniff(input);
        probe(input, tag, &self.options)
    }

    /// Extract the text of one buffer.
    ///
    /// Empty input yields an empty string. Input the sniffer cannot classify
    /// is decoded as text on a best-effort basis, following the
    /// [`TextFallback`](super::TextFallback) policy.
    pub fn extract(&self, input: &[u8]) -> Result<String> {
        let limit = self.options.max_input_size;
        if input.len() > limit {
            return Err(Error::limit("input size", limit));
        }

        let sniffed = sniff(input);
        let span = debug_span!("extract", len = input.len(), sniffed = %sniffed);
        let _enter = span.enter();

        if sniffed == FormatTag::Unknown {
            debug!("no signature recognized, decoding as text");
            return decode_text(input, self.options.text_fallback);
        }

        let format = probe(input, sniffed, &self.options)?;
        let decoder = self.decoders.get(&format).ok_or_else(|| {
            debug!(%format, "no decoder registered");
            Error::UnsupportedFormat(format)
        })?;

        let started = Instant::now();
        let ctx = DecodeContext::new(&self.options, format);
        let result = decoder.decode(input, &ctx);

        match &result {
            Ok(text) => debug!(
                %format,
                chars = text.len(),
                inflated = ctx.inflated(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "extraction finished"
            ),
            Err(e) => warn!(%format, error = %e, "extraction failed"),
        }

        result
    }

    /// Extract many buffers in parallel.
    ///
    /// Results are returned in input order; one failing buffer does not
    /// affect the others.
    pub fn extract_batch<T>(&self, inputs: &[T]) -> Vec<Result<String>>
    where
        T: AsRef<[u8]> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.extract(input.as_ref()))
            .collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.decoders.keys().map(FormatTag::name).collect();
        formats.sort_unstable();
        f.debug_struct("Extractor")
            .field("options", &self.options)
            .field("formats", &formats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TextFallback;

    struct Fixed(&'static str);

    impl Decoder for Fixed {
        fn decode(&self, _input: &[u8], _ctx: &DecodeContext<'_>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_plain_text_and_empty() {
        let extractor = Extractor::default();
        assert_eq!(extractor.extract(b"Hello, World!").unwrap(), "Hello, World!");
        assert_eq!(extractor.extract(b"").unwrap(), "");
        assert_eq!(extractor.extract(b"ab").unwrap(), "ab");
    }

    #[test]
    fn test_unknown_is_best_effort_text() {
        let extractor = Extractor::default();
        assert_eq!(
            extractor.extract(b"\x00\x01abc\xFF").unwrap(),
            "\u{0}\u{1}abc\u{FFFD}"
        );

        let strict = Extractor::new(ExtractOptions::new().with_text_fallback(TextFallback::Reject));
        assert!(matches!(
            strict.extract(b"\x00\x01abc\xFF"),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn test_unsupported_format() {
        let extractor = Extractor::empty(ExtractOptions::default());
        assert!(matches!(
            extractor.extract(b"{\\rtf1 hello}"),
            Err(Error::UnsupportedFormat(FormatTag::Rtf))
        ));
    }

    #[test]
    fn test_register_replaces_decoder() {
        let mut extractor = Extractor::default();
        extractor.register(FormatTag::PlainText, Arc::new(Fixed("replaced")));
        assert!(extractor.supports(FormatTag::PlainText));
        assert_eq!(extractor.extract(b"anything").unwrap(), "replaced");
    }

    #[test]
    fn test_input_size_limit() {
        let extractor = Extractor::new(ExtractOptions::new().with_max_input_size(4));
        assert!(matches!(
            extractor.extract(b"too long"),
            Err(Error::LimitExceeded { limit: 4, .. })
        ));
    }

    #[test]
    fn test_batch_keeps_order() {
        let extractor = Extractor::default();
        let inputs: [&[u8]; 4] = [b"first", b"", b"{\\rtf1 broken", b"fourth"];
        let results = extractor.extract_batch(&inputs);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap(), "first");
        assert_eq!(results[1].as_ref().unwrap(), "");
        assert_eq!(results[3].as_ref().unwrap(), "fourth");
        #[cfg(feature = "rtf")]
        assert!(results[2].as_ref().unwrap_err().is_malformed());
    }

    #[cfg(feature = "ole")]
    #[test]
    fn test_ole_container_is_probed() {
        let data = crate::ole::doc::tests::build_doc("Legacy text\r");
        let extractor = Extractor::default();
        assert_eq!(extractor.detect(&data).unwrap(), FormatTag::Doc);
        assert_eq!(extractor.extract(&data).unwrap(), "Legacy text");
    }

    #[cfg(feature = "ooxml")]
    #[test]
    fn test_zip_container_is_probed() {
        let data = crate::ooxml::build_docx("<w:p><w:r><w:t>Packaged</w:t></w:r></w:p>");
        let extractor = Extractor::default();
        assert_eq!(extractor.detect(&data).unwrap(), FormatTag::Docx);
        assert_eq!(extractor.extract(&data).unwrap(), "Packaged");
    }

    #[cfg(feature = "epub")]
    #[test]
    fn test_disabled_decoder_is_unsupported() {
        let data = crate::epub::tests::build_epub("<p>a</p>", "<p>b</p>");
        let mut extractor = Extractor::empty(ExtractOptions::default());
        assert!(matches!(
            extractor.extract(&data),
            Err(Error::UnsupportedFormat(FormatTag::Epub))
        ));

        extractor.register(FormatTag::Epub, Arc::new(crate::epub::EpubDecoder));
        assert_eq!(extractor.extract(&data).unwrap(), "a\n\nb");
    }

    #[test]
    fn test_unsupported_ole_application() {
        let data = crate::ole::test_support::build_compound_file(&[("Workbook", b"xls".as_slice())]);
        let extractor = Extractor::default();
        assert!(matches!(
            extractor.extract(&data),
            Err(Error::UnsupportedFormat(FormatTag::Xls))
        ));
    }
}
