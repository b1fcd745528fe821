/// Default window parameters for the ingestion chunker. Documents at or
/// below the threshold are stored whole.
pub const DEFAULT_CHUNK_SIZE: usize = 6000;
pub const DEFAULT_OVERLAP: usize = 600;
pub const DEFAULT_CHUNK_THRESHOLD: usize = 8000;

#[derive(Debug, PartialEq, Eq)]
pub enum ChunkError {
    /// The window must strictly advance each iteration.
    OverlapTooLarge { chunk_size: usize, overlap: usize },
    ZeroChunkSize,
}

impl std::fmt::Display for ChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkError::OverlapTooLarge { chunk_size, overlap } => write!(
                f,
                "Overlap {} must be smaller than chunk size {}",
                overlap, chunk_size
            ),
            ChunkError::ZeroChunkSize => write!(f, "Chunk size must be positive"),
        }
    }
}

impl std::error::Error for ChunkError {}

/// Collapses whitespace runs (including non-breaking spaces) to single
/// spaces and trims both ends. Applied before chunking and before storage.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;

    for ch in text.chars() {
        if ch.is_whitespace() || ch == '\u{00a0}' {
            in_gap = true;
            continue;
        }
        if in_gap && !out.is_empty() {
            out.push(' ');
        }
        in_gap = false;
        out.push(ch);
    }

    out
}

/// Splits `text` into overlapping windows of `chunk_size` characters where
/// each window after the first starts `overlap` characters before the
/// previous window's end. The final chunk ends exactly at the text's end.
/// Texts of at most `threshold` characters come back as a single chunk.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    threshold: usize,
) -> Result<Vec<String>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkError::OverlapTooLarge { chunk_size, overlap });
    }

    let char_count = text.chars().count();
    if char_count <= threshold {
        return Ok(vec![text.to_string()]);
    }

    // Byte offset of every char boundary, so windows are sliced in
    // char space without re-scanning.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());

        if end == char_count {
            break;
        }
        start = end - overlap;
    }

    Ok(chunks)
}
