//! Async adapter from a raw [`ByteStream`] to a stream of [`ChunkEvent`]s.

use futures::{Stream, StreamExt};
use lightspeed_types::{ApiError, ByteStream};

use crate::chunk::{ChunkDecoder, ChunkEvent};

/// Decode a completion body into chunk events.
///
/// Events are yielded in the order their bytes were read. A transport error
/// from the body is yielded once as `Err` and ends the stream; malformed
/// fragments are yielded as [`ChunkEvent::Malformed`] and decoding continues.
/// Dropping the returned stream drops the body and releases the connection.
pub fn decode_stream(
    body: ByteStream,
) -> impl Stream<Item = Result<ChunkEvent, ApiError>> + Send + 'static {
    async_stream::stream! {
        let mut decoder = ChunkDecoder::new();
        let mut body = body;

        while let Some(read) = body.next().await {
            let bytes = match read {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(error = %e, "lightspeed.stream.read_error");
                    yield Err(e);
                    return;
                }
            };

            for event in decoder.feed(&bytes) {
                yield Ok(event);
            }
        }

        for event in decoder.finish() {
            yield Ok(event);
        }
    }
}
