//! `PlantUML` server request URLs.
//!
//! The server expects the diagram source in the path, compressed with raw
//! DEFLATE and encoded with `PlantUML`'s own 64-character alphabet:
//!
//! ```text
//! {server}/{format}/{deflate + base64(0-9A-Za-z-_)}
//! ```

use std::io::Write;

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{GeneralPurpose, general_purpose};
use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::config::OutputFormat;

/// `PlantUML` text encoding alphabet (differs from both standard and URL-safe base64).
const PLANTUML_ALPHABET: Alphabet =
    match Alphabet::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("invalid PlantUML alphabet"),
    };

const PLANTUML_ENGINE: GeneralPurpose =
    GeneralPurpose::new(&PLANTUML_ALPHABET, general_purpose::NO_PAD);

/// Encode diagram source the way the `PlantUML` server decodes it.
#[must_use]
pub(crate) fn encode_source(source: &str) -> String {
    PLANTUML_ENGINE.encode(deflate(source.as_bytes()))
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len()), Compression::best());
    // Compressing into memory cannot fail
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// Build the server URL that renders `source` in `format`.
///
/// Trailing slashes on `server_url` are ignored.
#[must_use]
pub fn request_url(server_url: &str, source: &str, format: OutputFormat) -> String {
    let server_url = server_url.trim_end_matches('/');
    format!(
        "{server_url}/{}/{}",
        format.as_str(),
        encode_source(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    fn decode_source(encoded: &str) -> String {
        let compressed = PLANTUML_ENGINE.decode(encoded).unwrap();
        let mut source = String::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_string(&mut source)
            .unwrap();
        source
    }

    #[test]
    fn test_request_url_shape() {
        let url = request_url(
            "http://example.com/plantuml",
            "@startuml\nA->B\n@enduml",
            OutputFormat::Svg,
        );
        assert!(url.starts_with("http://example.com/plantuml/svg/"));

        let encoded = url.rsplit('/').next().unwrap();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_request_url_trailing_slash() {
        let a = request_url("http://example.com/plantuml/", "A->B", OutputFormat::Png);
        let b = request_url("http://example.com/plantuml", "A->B", OutputFormat::Png);
        assert_eq!(a, b);
        assert!(a.starts_with("http://example.com/plantuml/png/"));
    }

    #[test]
    fn test_encoded_source_decodes_back() {
        let source = "@startuml\nAlice -> Bob: Привет\n@enduml";
        assert_eq!(decode_source(&encode_source(source)), source);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode_source("A -> B"), encode_source("A -> B"));
        assert_ne!(encode_source("A -> B"), encode_source("B -> A"));
    }
}
