// Firmware version extraction.
//
// A valid Blinky firmware image embeds an ASCII marker of the form
// `__Bl!nky__ <token> ___` where the token contains no underscore. The
// full marker (delimiters included) is the version identifier recorded in
// the firmware store. Binaries without the marker are rejected before any
// persistence happens.

const MAGIC_PREFIX: &[u8] = b"__Bl!nky__ ";
const MAGIC_SUFFIX: &[u8] = b" ___";

/// Scan a firmware image for the magic version marker.
///
/// Returns the full matched marker (e.g. `"__Bl!nky__ 1.2.3 ___"`), or
/// `None` if the image carries no marker.
pub fn extract_version(data: &[u8]) -> Option<String> {
    let mut search_from = 0;

    while let Some(offset) = find(&data[search_from..], MAGIC_PREFIX) {
        let start = search_from + offset;
        let token_start = start + MAGIC_PREFIX.len();

        if let Some(token_end) = match_token(&data[token_start..]) {
            let token = &data[token_start..token_start + token_end];
            // The marker is ASCII by contract; skip any binary false positive.
            if let Ok(token) = std::str::from_utf8(token) {
                return Some(format!("__Bl!nky__ {token} ___"));
            }
        }

        search_from = token_start;
    }

    None
}

/// Match `<token> ___` at the start of `data`, where the token is a
/// non-empty run of non-underscore bytes. Returns the token length.
fn match_token(data: &[u8]) -> Option<usize> {
    // The token run ends at the first underscore.
    let run_len = data.iter().position(|&b| b == b'_')?;

    // The run must be `<token><space>` followed by at least `___`.
    if run_len < 2 || data[run_len - 1] != b' ' {
        return None;
    }
    if data.len() < run_len + 3 || &data[run_len..run_len + 3] != b"___" {
        return None;
    }

    Some(run_len - 1)
}

/// First occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
