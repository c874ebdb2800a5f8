//! Typed cursors
//!
//! A `DocumentCursor` wraps the driver's raw cursor and decodes each batch
//! document into the document type on the way out. Like the underlying
//! cursor it is single-pass: once exhausted it stays exhausted, and a fresh
//! query is needed to iterate again.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, TryStreamExt};

use monogram_common::{MonogramError, Result};

use crate::document::Document;

/// Single-pass typed cursor over query results
pub struct DocumentCursor<T: Document> {
    inner: mongodb::Cursor<bson::Document>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> DocumentCursor<T> {
    pub(crate) fn new(inner: mongodb::Cursor<bson::Document>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Fetch and decode the next document, `None` when exhausted
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        match TryStreamExt::try_next(&mut self.inner).await? {
            Some(doc) => Ok(Some(T::from_wire(doc)?)),
            None => Ok(None),
        }
    }

    /// Drain the cursor into a vector
    pub async fn to_vec(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }
}

impl<T: Document> Stream for DocumentCursor<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // mongodb::Cursor is Unpin, so projecting through Pin::new is fine.
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(doc))) => Poll::Ready(Some(T::from_wire(doc))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(MonogramError::from(err)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
