const MAX_FILENAME_LENGTH: usize = 255;

/// Reduce a client-declared filename to a safe ASCII name.
///
/// Directory components are dropped (both `/` and `\` separators), every
/// character outside `[A-Za-z0-9._-]` becomes `_`, and runs of dots collapse to
/// one so the result can never contain `..`. Names that end up shorter than
/// three characters become `file`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
        .trim();

    let mut sanitized = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '.' && sanitized.ends_with('.') {
            continue;
        }
        sanitized.push(c);
    }

    if sanitized.len() > MAX_FILENAME_LENGTH {
        sanitized = truncate_keeping_extension(&sanitized);
    }

    if sanitized.trim_matches(|c: char| c == '.' || c == '_').is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    sanitized
}

/// Output is ASCII, so byte slicing is safe here.
fn truncate_keeping_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < 16 => {
            let keep = MAX_FILENAME_LENGTH - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => name[..MAX_FILENAME_LENGTH].to_string(),
    }
}

/// Replace the extension of an already-sanitized name.
pub(crate) fn with_extension(name: &str, extension: &str) -> String {
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    format!("{}.{}", stem, extension)
}
