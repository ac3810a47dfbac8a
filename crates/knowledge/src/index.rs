//! SQLite-backed persisted vector index.
//!
//! One build produces one complete database file: rows are inserted into a
//! fresh database at a temporary path and the file is renamed over the
//! final index path only when everything committed. A failed build
//! therefore never corrupts a previously valid index, and rebuilds replace
//! rather than merge.

use rusqlite::{params, Connection};
use std::path::Path;

use artex_core::{AppError, AppResult};

use crate::types::{Chunk, IndexStats};

/// Metadata recorded alongside the chunks.
///
/// The embedder name and dimension describe how the index was built so
/// `status` can report them; consistency with the query-time embedder is an
/// external obligation, not enforced here.
#[derive(Debug, Clone)]
pub struct IndexMeta {
    pub embedder: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sources_count: u32,
}

/// Build a fresh index at `index_path`, replacing any previous one.
///
/// All-or-nothing: the previous index file is untouched until the new
/// database is fully written, then atomically renamed into place.
pub fn build_index(index_path: &Path, chunks: &[Chunk], meta: &IndexMeta) -> AppResult<()> {
    if chunks.is_empty() {
        return Err(AppError::Knowledge(
            "Refusing to build an empty index".to_string(),
        ));
    }

    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let tmp_path = index_path.with_extension("sqlite.tmp");
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to clear stale temp index: {}", e)))?;
    }

    write_database(&tmp_path, chunks, meta).inspect_err(|_| {
        // Leave nothing half-written behind
        let _ = std::fs::remove_file(&tmp_path);
    })?;

    std::fs::rename(&tmp_path, index_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to move index into place: {}", e)))?;

    tracing::info!(
        "Persisted index with {} chunks at {:?}",
        chunks.len(),
        index_path
    );
    Ok(())
}

fn write_database(path: &Path, chunks: &[Chunk], meta: &IndexMeta) -> AppResult<()> {
    let mut conn = Connection::open(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to create index database: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE chunks (
            id TEXT PRIMARY KEY,
            source_url TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX idx_chunks_source ON chunks(source_url);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

    let meta_rows = [
        ("embedder", meta.embedder.clone()),
        ("dimensions", meta.dimensions.to_string()),
        ("chunk_size", meta.chunk_size.to_string()),
        ("chunk_overlap", meta.chunk_overlap.to_string()),
        ("sources_count", meta.sources_count.to_string()),
        ("built_at", chrono::Utc::now().to_rfc3339()),
    ];
    for (key, value) in &meta_rows {
        tx.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to write metadata: {}", e)))?;
    }

    for chunk in chunks {
        let embedding = chunk.embedding.as_ref().ok_or_else(|| {
            AppError::Knowledge(format!("Chunk {} is missing its embedding", chunk.id))
        })?;

        tx.execute(
            "INSERT INTO chunks (id, source_url, position, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                chunk.id,
                chunk.source_url,
                chunk.position as i64,
                chunk.text,
                embedding_to_bytes(embedding),
            ],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;
    }

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit index: {}", e)))?;

    Ok(())
}

/// Open an existing index. The caller is responsible for having checked
/// that the file exists (its existence is the availability signal).
pub fn open_index(index_path: &Path) -> AppResult<Connection> {
    Connection::open(index_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open index: {}", e)))
}

/// Query the index for the top-k most similar chunks, best first.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(Chunk, f32)>> {
    let mut stmt = conn
        .prepare("SELECT id, source_url, position, text, embedding FROM chunks")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let embedding = bytes_to_embedding(&embedding_bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

            Ok(Chunk {
                id: row.get(0)?,
                source_url: row.get(1)?,
                position: row.get::<_, i64>(2)? as u32,
                text: row.get(3)?,
                embedding: Some(embedding),
            })
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to scan chunks: {}", e)))?;

    let mut results: Vec<(Chunk, f32)> = Vec::new();
    for row in rows {
        let chunk = row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
        let score = match &chunk.embedding {
            Some(embedding) => cosine_similarity(query_embedding, embedding),
            None => 0.0,
        };
        results.push((chunk, score));
    }

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), top_k);

    Ok(results)
}

/// Read index statistics for `status`.
pub fn get_stats(conn: &Connection, index_path: &Path) -> AppResult<IndexStats> {
    let chunks_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))?;

    let embedder = read_meta(conn, "embedder")?.unwrap_or_else(|| "unknown".to_string());
    let dimensions = read_meta(conn, "dimensions")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let sources_count = read_meta(conn, "sources_count")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let built_at = read_meta(conn, "built_at")?.unwrap_or_default();

    let size_bytes = std::fs::metadata(index_path).map(|m| m.len()).unwrap_or(0);

    Ok(IndexStats {
        sources_count,
        chunks_count,
        size_bytes,
        embedder,
        dimensions,
        built_at,
    })
}

fn read_meta(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    use rusqlite::OptionalExtension;

    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| AppError::Knowledge(format!("Failed to read metadata '{}': {}", key, e)))
}

/// Convert an embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Cosine similarity between two vectors; 0.0 when shapes differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
