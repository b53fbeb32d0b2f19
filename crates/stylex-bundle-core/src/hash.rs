use once_cell::sync::Lazy;
use regex::Regex;

/// Number of hex digits kept from a content digest in file names
pub const CONTENT_HASH_LEN: usize = 8;

/// Short content hash used in emitted file names.
pub fn content_hash(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    hash.to_hex()[..CONTENT_HASH_LEN].to_string()
}

/// `<stem><sep><8-char hash>.<ext>` as produced by the host's asset naming.
static HASHED_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<stem>.+?)(?P<sep>[-.])(?P<hash>[A-Za-z0-9_-]{8})(?P<ext>\.[A-Za-z0-9]+)$")
        .expect("hashed file name pattern is valid")
});

/// Rename `file_name` so it embeds `hash`.
///
/// An existing hash segment is replaced in place; a name without one gets
/// `-<hash>` inserted before its extension. Directory components are kept.
pub fn rehash_file_name(file_name: &str, hash: &str) -> String {
    let (dir, base) = match file_name.rsplit_once('/') {
        Some((dir, base)) => (Some(dir), base),
        None => (None, file_name),
    };

    let renamed = match HASHED_FILE_NAME.captures(base) {
        Some(caps) => format!("{}{}{}{}", &caps["stem"], &caps["sep"], hash, &caps["ext"]),
        None => match base.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{hash}.{ext}"),
            _ => format!("{base}-{hash}"),
        },
    };

    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed,
    }
}

/// Last path component of an asset name.
pub fn base_name(file_name: &str) -> &str {
    file_name.rsplit_once('/').map_or(file_name, |(_, base)| base)
}
