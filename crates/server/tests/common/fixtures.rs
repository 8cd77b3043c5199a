//! Test fixtures: request bodies and deterministic data.

use bytes::Bytes;

/// Boundary used by every generated multipart body.
pub const BOUNDARY: &str = "hoist-test-boundary-7d1f";

/// Deterministic pseudo-random test data; the same seed yields the same bytes.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }

    Bytes::from(data)
}

/// One part of a multipart form.
#[allow(dead_code)]
pub enum Part<'a> {
    /// A file part: field name, filename, contents.
    File(&'a str, &'a str, &'a [u8]),
    /// A plain form value: field name, value.
    Text(&'a str, &'a str),
}

/// Encode parts as a `multipart/form-data` body.
#[allow(dead_code)]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File(field, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text(field, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Multipart body with one `files` part per `(path, contents)` pair.
#[allow(dead_code)]
pub fn files_body(files: &[(&str, &[u8])]) -> Vec<u8> {
    let parts: Vec<Part<'_>> = files
        .iter()
        .map(|(name, data)| Part::File("files", name, data))
        .collect();
    multipart_body(&parts)
}

/// `Content-Type` header value matching [`multipart_body`].
#[allow(dead_code)]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Whether `slug` has the `<letters>-<letters>-<hex>` deployment shape.
#[allow(dead_code)]
pub fn is_generated_slug(slug: &str) -> bool {
    let parts: Vec<&str> = slug.split('-').collect();
    parts.len() == 3
        && !parts[0].is_empty()
        && parts[0].bytes().all(|b| b.is_ascii_lowercase())
        && !parts[1].is_empty()
        && parts[1].bytes().all(|b| b.is_ascii_lowercase())
        && !parts[2].is_empty()
        && parts[2]
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
