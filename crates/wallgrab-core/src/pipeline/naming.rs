//! Deterministic, content-addressed filenames.
//!
//! A filename is `<slug>_<hash>.<ext>`: a readable slug from the hint title or
//! URL, the first [`HASH_LEN`] hex characters of the payload's BLAKE3 digest,
//! and the validated format's canonical extension.

use crate::types::ImageFormat;

/// Hex characters of the content hash kept in filenames (64 bits).
pub const HASH_LEN: usize = 16;

/// Longest slug kept before the hash suffix.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when neither the title nor the URL yields one.
const FALLBACK_SLUG: &str = "wallpaper";

/// Generate a BLAKE3 hash from an in-memory byte buffer.
pub fn content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// The [`HASH_LEN`]-character hash embedded in filenames.
pub fn short_hash(data: &[u8]) -> String {
    let mut hash = content_hash(data);
    hash.truncate(HASH_LEN);
    hash
}

/// Build the final filename for a payload.
pub fn resolve_filename(
    url: &str,
    hint_title: Option<&str>,
    content: &[u8],
    format: ImageFormat,
) -> String {
    filename_with_hash(url, hint_title, &short_hash(content), format)
}

/// Build the filename from an already computed [`short_hash`].
pub fn filename_with_hash(
    url: &str,
    hint_title: Option<&str>,
    hash: &str,
    format: ImageFormat,
) -> String {
    let slug = hint_title
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| url_stem(url).map(|stem| slugify(&stem)))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());

    format!("{slug}_{hash}.{}", format.extension())
}

/// Lower-case, collapse every run of non-alphanumerics into one `_`, trim,
/// and cap at [`MAX_SLUG_LEN`] characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch);
        } else {
            pending_sep = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        slug = slug.chars().take(MAX_SLUG_LEN).collect();
        while slug.ends_with('_') {
            slug.pop();
        }
    }
    slug
}

/// Last non-empty path segment without its extension, percent-decoded.
fn url_stem(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?
        .to_string();
    let decoded = percent_decode(&segment);
    let stem = match decoded.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => decoded,
    };
    Some(stem)
}

fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
