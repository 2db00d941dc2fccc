//! Responses computed from the request instead of read from a fixture.
use crate::config::ServerUrl;
use crate::error::{Error, Result};
use crate::log_stream::LogStream;
use crate::request::Request;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const CHUNK_SIZE: u64 = 8_388_608;
pub const CHUNKS_PER_REQUEST: u64 = 64;
pub const MAX_FILE_SIZE: u64 = 2_147_483_648;
pub const MAX_REQUEST_SIZE: u64 = 33_554_432;

const ACCEPTED_ARTIFACTS: &[&str] = &[
    "debug_files",
    "release_files",
    "pdbs",
    "sources",
    "bcsymbolmaps",
    "il2cpp",
    "portablepdbs",
];

/// Upload parameters advertised by the chunk-upload discovery endpoint.
/// Field order is the order they are serialized in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChunkUploadOptions<'a> {
    url: String,
    chunk_size: u64,
    chunks_per_request: u64,
    max_file_size: u64,
    max_request_size: u64,
    concurrency: u32,
    hash_algorithm: &'a str,
    compression: &'a [&'a str],
    accept: &'a [&'a str],
}

/// One entry of a debug-information-file assemble request.
///
/// Only `name` is required. The other fields are passed through untouched, whatever their type.
#[derive(Debug, Deserialize)]
struct DifUpload {
    name: String,
    #[serde(default)]
    debug_id: Value,
    #[serde(default)]
    chunks: Value,
}

/// Build the chunk-upload configuration. `url` points back at this server: the configured
/// base URL followed by the request path exactly as received, query string included.
pub fn chunk_upload_config(base_url: &ServerUrl, request: &Request) -> Result<String> {
    let options = ChunkUploadOptions {
        url: base_url.join_raw(&request.path),
        chunk_size: CHUNK_SIZE,
        chunks_per_request: CHUNKS_PER_REQUEST,
        max_file_size: MAX_FILE_SIZE,
        max_request_size: MAX_REQUEST_SIZE,
        concurrency: 1,
        hash_algorithm: "sha1",
        compression: &["gzip"],
        accept: ACCEPTED_ARTIFACTS,
    };
    serde_json::to_string(&options).map_err(Error::Serialize)
}

/// Answer a difs-assemble request claiming every file is already on the server.
///
/// The body maps checksums to `{name, debug_id, chunks}`. The response has the same keys in
/// the same order, each mapped to `{"state":"ok","missingChunks":[]}`, and one
/// `upload-dif: <name>` line is logged per key.
pub fn difs_assemble(request: &Request, log: &LogStream) -> Result<String> {
    let uploads: Map<String, Value> = request.body_json()?;

    // Validate everything before logging anything: a malformed entry fails the whole request.
    let mut parsed = Vec::with_capacity(uploads.len());
    for (checksum, upload) in uploads {
        let upload: DifUpload = serde_json::from_value(upload)?;
        parsed.push((checksum, upload));
    }

    let mut response = Map::with_capacity(parsed.len());
    for (checksum, upload) in parsed {
        debug!(
            "{} ({}): {} chunks under {}",
            upload.name,
            upload.debug_id,
            upload.chunks.as_array().map_or(0, Vec::len),
            checksum
        );
        log.line(format_args!("     upload-dif: {}", upload.name));
        response.insert(checksum, json!({"state": "ok", "missingChunks": []}));
    }
    serde_json::to_string(&response).map_err(Error::Serialize)
}
