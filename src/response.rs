//! Normalization of raw API responses into [`ContentResult`] values.
//!
//! The upstream API answers in three shapes: synchronous JSON with base64
//! media, raw binary bodies (3D meshes), and asynchronous job envelopes
//! where a 202 carries `{id, status: "in-progress"}` until the job reaches
//! a terminal state. This module collapses all three into the crate's
//! result types; status classification for everything else lives in
//! [`crate::error`].

use base64::Engine;
use serde_json::Value;

use crate::error::{Result, StabilityError};
use crate::image_ref::scratch_path;
use crate::types::{AsyncResult, ContentResult, ContentType, JobStatus, OutputFormat};

/// Decode a 200-class JSON body carrying base64 media.
///
/// Media is located by a fixed priority order over the field names the
/// endpoint families use: the content-kind field first (`video` for video
/// responses, `image` otherwise), then `image`, then the v1 `base64` field.
/// A response with none of them is an upstream-contract violation and fails
/// with [`StabilityError::MalformedResponse`].
pub(crate) async fn decode_content(
    body: &Value,
    output_format: OutputFormat,
    tag: &str,
) -> Result<ContentResult> {
    let encoded = find_media(body, output_format.content_type()).ok_or_else(|| {
        StabilityError::MalformedResponse(format!(
            "no media field found in response for {tag}"
        ))
    })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|error| {
            StabilityError::MalformedResponse(format!("invalid base64 media for {tag}: {error}"))
        })?;

    let (content_filtered, errored) = classify_finish_reason(body);
    let seed = body.get("seed").and_then(Value::as_u64).unwrap_or(0);

    persist(&bytes, output_format, tag, content_filtered, errored, seed).await
}

/// Persist a raw binary body (3D endpoints).
///
/// These endpoints expose no moderation state, so `content_filtered` and
/// `errored` are always false.
pub(crate) async fn decode_binary(
    bytes: &[u8],
    output_format: OutputFormat,
    tag: &str,
) -> Result<ContentResult> {
    persist(bytes, output_format, tag, false, false, 0).await
}

/// Interpret a poll response from an asynchronous result endpoint.
///
/// 200 with decodable media is terminal success; 202 with an in-progress
/// envelope means the caller should poll again; everything else classifies
/// into an error. Every poll is a fresh request against upstream, which
/// retains results for 24 hours.
pub(crate) async fn interpret_poll(
    status: u16,
    body: &Value,
    output_format: OutputFormat,
    tag: &str,
    context: &str,
) -> Result<AsyncResult> {
    if status == 200 {
        let content = decode_content(body, output_format, tag).await?;
        return Ok(AsyncResult::Content(content));
    }

    if status == 202 {
        if let Ok(job) = serde_json::from_value::<JobStatus>(body.clone()) {
            if job.status == "in-progress" {
                return Ok(AsyncResult::InProgress(job));
            }
        }
    }

    Err(StabilityError::from_status(status, context, body))
}

/// Interpret a submission acknowledgement from an asynchronous endpoint.
///
/// A 200 carrying only `{id}` acknowledges the submission; it is not a
/// terminal content response even though the status is success-class.
pub(crate) fn expect_job_id(status: u16, body: &Value, context: &str) -> Result<String> {
    if status == 200 {
        if let Some(id) = body.get("id").and_then(Value::as_str) {
            return Ok(id.to_string());
        }
    }
    Err(StabilityError::from_status(status, context, body))
}

fn find_media(body: &Value, content_type: ContentType) -> Option<&str> {
    let primary = match content_type {
        ContentType::Video => "video",
        _ => "image",
    };

    for field in [primary, "image", "base64"] {
        if let Some(media) = body.get(field).and_then(Value::as_str) {
            if !media.is_empty() {
                return Some(media);
            }
        }
    }
    None
}

/// Map the upstream `finish_reason` enumerant (v1 spells it `finishReason`)
/// to the `(content_filtered, errored)` pair. Absence means plain success.
fn classify_finish_reason(body: &Value) -> (bool, bool) {
    let reason = body
        .get("finish_reason")
        .or_else(|| body.get("finishReason"))
        .and_then(Value::as_str);

    match reason {
        None | Some("SUCCESS") => (false, false),
        Some("CONTENT_FILTERED") => (true, false),
        Some(_) => (false, true),
    }
}

async fn persist(
    bytes: &[u8],
    output_format: OutputFormat,
    tag: &str,
    content_filtered: bool,
    errored: bool,
    seed: u64,
) -> Result<ContentResult> {
    let filepath = scratch_path(tag, output_format.extension());
    tokio::fs::write(&filepath, bytes).await?;

    let filename = filepath
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(path = %filepath.display(), "persisted generated media");

    Ok(ContentResult {
        filepath,
        filename,
        content_type: output_format.content_type(),
        output_format,
        content_filtered,
        errored,
        seed,
    })
}
