//! Send bulk command
//!
//! Accepts a gzip-compressed `{ "emails": [...] }` body, dispatches every
//! item through the bulk pipeline and records a completion notification.

use std::fmt::Display;

use bytes::Bytes;
use futures::Stream;
use portal_common::types::SendBulkResponse;

use crate::dispatch::{BulkDispatchService, DispatchError};

pub const SENT_MESSAGE: &str = "Notifications sent successfully";

/// Run the bulk pipeline over a request body stream.
///
/// A persistence failure after dispatch is not an error here: it comes back
/// as `result.success == false`.
pub async fn handle<S, E>(
    service: &BulkDispatchService,
    body: S,
) -> Result<SendBulkResponse, DispatchError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let result = service.run_stream(body).await?;

    Ok(SendBulkResponse {
        message: SENT_MESSAGE.to_string(),
        result,
    })
}
