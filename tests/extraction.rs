//! End-to-end extraction through the public API.

mod common;

use proptest::prelude::*;
use std::io::Write;
use textractor::{
    Error, ExtractOptions, Extractor, FormatTag, TextFallback, detect_format, extract_file,
    extract_text, extract_text_lossy, extract_text_with,
};

const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[test]
fn hello_world_is_returned_unchanged() {
    assert_eq!(extract_text(b"Hello, World!").unwrap(), "Hello, World!");
}

#[test]
fn empty_input_yields_empty_text() {
    assert_eq!(extract_text(b"").unwrap(), "");
}

#[test]
fn plain_text_keeps_every_byte() {
    let text = "  leading spaces\r\n\ttabs\u{a0}and non-ASCII: żółw 🐢\n\n";
    assert_eq!(extract_text(text.as_bytes()).unwrap(), text);
}

#[test]
fn utf16_text_with_bom() {
    let mut data = vec![0xFF, 0xFE];
    data.extend("héllo".encode_utf16().flat_map(u16::to_le_bytes));
    assert_eq!(extract_text(&data).unwrap(), "héllo");
}

#[test]
fn every_container_is_detected_from_content() {
    assert_eq!(detect_format(&common::docx(&["x"])), FormatTag::Docx);
    assert_eq!(detect_format(&common::xlsx(&[&["x"]])), FormatTag::Xlsx);
    assert_eq!(detect_format(&common::pptx(&["x"])), FormatTag::Pptx);
    assert_eq!(detect_format(&common::odt(&["x"])), FormatTag::Odt);
    assert_eq!(detect_format(&common::epub(&["x"])), FormatTag::Epub);
}

#[test]
fn docx_paragraphs() {
    let data = common::docx(&["Hello", "World &amp; friends"]);
    assert_eq!(extract_text(&data).unwrap(), "Hello\nWorld & friends");
}

#[test]
fn xlsx_rows_and_cells() {
    let data = common::xlsx(&[&["Name", "Qty"], &["apples", "3"]]);
    assert_eq!(extract_text(&data).unwrap(), "Name\tQty\napples\t3");
}

#[test]
fn pptx_slides_in_order() {
    let data = common::pptx(&["Intro", "Details"]);
    assert_eq!(extract_text(&data).unwrap(), "Intro\n\nDetails");
}

#[test]
fn odt_paragraphs() {
    let data = common::odt(&["First", "Second"]);
    assert_eq!(extract_text(&data).unwrap(), "First\nSecond");
}

#[test]
fn epub_chapters() {
    let data = common::epub(&["Chapter one.", "Chapter two."]);
    assert_eq!(extract_text(&data).unwrap(), "Chapter one.\n\nChapter two.");
}

#[test]
fn epub_html_entities() {
    let data = common::epub(&["caf&eacute; na&iuml;ve &mdash; &unknown;"]);
    assert_eq!(extract_text(&data).unwrap(), "caf\u{e9} na\u{ef}ve \u{2014} &unknown;");
}

#[test]
fn pdf_text() {
    let data = common::pdf("Hello PDF");
    assert_eq!(detect_format(&data), FormatTag::Pdf);
    assert_eq!(extract_text(&data).unwrap(), "Hello PDF");
}

#[test]
fn rtf_document() {
    let data = br"{\rtf1\ansi\ansicpg1252{\fonttbl{\f0 Arial;}}\f0 Caf\'e9 {\b bold}\par Next line\par}";
    assert_eq!(extract_text(data).unwrap(), "Caf\u{e9} bold\nNext line");
}

#[test]
fn truncated_documents_are_malformed() {
    let docx = common::docx(&["a long enough paragraph to be cut in half"]);
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("pdf", b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog".to_vec()),
        ("rtf", br"{\rtf1\ansi Hello {\b world".to_vec()),
        ("zip", docx[..docx.len() / 2].to_vec()),
        ("ole2", [OLE2_MAGIC, &[0u8; 24]].concat()),
    ];

    for (name, data) in cases {
        let err = extract_text(&data).unwrap_err();
        assert!(err.is_malformed(), "{}: unexpected error {:?}", name, err);
    }
}

#[test]
fn generic_archive_is_unsupported() {
    let data = common::zip(&[("notes.txt", b"not an office document")]);
    assert!(matches!(
        extract_text(&data),
        Err(Error::UnsupportedFormat(FormatTag::ZipContainer))
    ));
}

#[test]
fn limits_are_enforced() {
    let options = ExtractOptions::new().with_max_input_size(4);
    assert!(matches!(
        extract_text_with(b"Hello, World!", &options),
        Err(Error::LimitExceeded { limit: 4, .. })
    ));

    let nested = format!(r"{{\rtf1 {}x{}}}", "{".repeat(20), "}".repeat(20));
    let options = ExtractOptions::new().with_max_nesting_depth(8);
    assert!(matches!(
        extract_text_with(nested.as_bytes(), &options),
        Err(Error::LimitExceeded { .. })
    ));
}

#[test]
fn strict_text_rejects_invalid_utf8() {
    let data = b"caf\xE9 au lait";
    assert_eq!(extract_text(data).unwrap(), "caf\u{fffd} au lait");

    let strict = Extractor::new(ExtractOptions::new().with_text_fallback(TextFallback::Reject));
    assert!(matches!(strict.extract(data), Err(Error::Encoding(_))));
}

#[test]
fn lossy_extraction_hides_errors() {
    assert_eq!(extract_text_lossy(br"{\rtf1 never closed"), "");
    assert_eq!(extract_text_lossy(b"Hello, World!"), "Hello, World!");
}

#[test]
fn file_extension_is_ignored() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(&common::docx(&["From a file"])).unwrap();
    file.flush().unwrap();

    assert_eq!(extract_file(file.path()).unwrap(), "From a file");

    let missing = file.path().with_extension("missing");
    assert!(matches!(extract_file(missing), Err(Error::Io(_))));
}

#[test]
fn parallel_batch_matches_sequential_calls() {
    let inputs: Vec<Vec<u8>> = vec![
        b"plain".to_vec(),
        common::docx(&["docx"]),
        common::odt(&["odt"]),
        br"{\rtf1 broken".to_vec(),
        common::epub(&["epub"]),
    ];
    let extractor = Extractor::default();
    let batch = extractor.extract_batch(&inputs);

    assert_eq!(batch.len(), inputs.len());
    for (input, result) in inputs.iter().zip(&batch) {
        assert_eq!(format!("{:?}", result), format!("{:?}", extractor.extract(input)));
    }
    assert!(batch[3].as_ref().unwrap_err().is_malformed());
}

fn starts_with_signature(text: &str) -> bool {
    ["%PDF-", "{\\rtf", "\u{feff}"]
        .iter()
        .any(|sig| text.starts_with(sig))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_plain_text_round_trips(text in any::<String>()) {
        prop_assume!(!starts_with_signature(&text));
        prop_assert_eq!(extract_text(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn prop_extraction_is_idempotent(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let first = format!("{:?}", extract_text(&data));
        let second = format!("{:?}", extract_text(&data));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_truncated_rtf_never_panics(cut in 0usize..64) {
        let data = br"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\f0 Hello \'e9 world\par}";
        let cut = cut.min(data.len());
        let _ = extract_text(&data[..cut]);
    }
}
