//! Fuzzing harness for the php.ini text codec
//!
//! Any UTF-8 input must parse, print back byte for byte, and load into a
//! model without panicking.
//! Run with: cargo fuzz run document_roundtrip

#![no_main]
use libfuzzer_sys::fuzz_target;
use phpmanager_core::{IniDocument, IniFile};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let document = IniDocument::parse(s);
        assert_eq!(document.to_string(), s);
        let _ = IniFile::from_raw(document.to_raw_settings());
    }
});
