//! The text-generation seam.
//!
//! Agents and sessions talk to a [`TextProvider`]; the HTTP adapters in
//! [`crate::llm`] and the scripted double in [`crate::mock`] implement it.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::ChatResult;
use crate::types::CompletionRequest;

/// Ordered, finite stream of text fragments. An `Err` item ends the stream.
pub type TextStream = Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>>;

/// A backend that answers a request with a stream of text fragments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Start generating. Errors returned here happen before any fragment.
    async fn stream(&self, request: CompletionRequest) -> ChatResult<TextStream>;
}

/// Drain a stream into a single string, stopping at the first error.
pub async fn collect_text(mut stream: TextStream) -> ChatResult<String> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}

/// Stream that yields `fragments` in order.
pub fn fragments_stream<I>(fragments: I) -> TextStream
where
    I: IntoIterator<Item = ChatResult<String>>,
    I::IntoIter: Send + 'static,
{
    Box::pin(futures::stream::iter(fragments))
}
