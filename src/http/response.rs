//! Response handling and transformation.
//!
//! # Responsibilities
//! - Stream backend response bodies to the client frame by frame
//! - Enforce the upstream deadline while the body is still streaming
//! - Log body copy failures with request context
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers are stripped before the body is attached
//! - A failure mid-body cannot become an error response (the status line is
//!   already committed); it is logged and the connection is aborted

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::Method;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use tokio::time::{Instant, Sleep};

use crate::error::GatewayError;

/// Request details attached to a streaming body for diagnostics.
#[derive(Debug, Clone)]
pub struct StreamContext {
    pub method: Method,
    pub path: String,
    pub pattern: String,
}

/// Wraps a backend body, failing it once `deadline` passes.
pub struct DeadlineBody<B> {
    inner: B,
    deadline: Pin<Box<Sleep>>,
    context: StreamContext,
    failed: bool,
}

impl<B> DeadlineBody<B> {
    pub fn new(inner: B, deadline: Instant, context: StreamContext) -> Self {
        Self {
            inner,
            deadline: Box::pin(tokio::time::sleep_until(deadline)),
            context,
            failed: false,
        }
    }

    fn fail(&mut self, reason: String) -> GatewayError {
        self.failed = true;
        let err = GatewayError::BodyCopyFailure { reason };
        tracing::error!(
            method = %self.context.method,
            path = %self.context.path,
            pattern = %self.context.pattern,
            error = %err,
            "Response body copy failed"
        );
        err
    }
}

impl<B> Body for DeadlineBody<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Display,
{
    type Data = Bytes;
    type Error = GatewayError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.failed {
            return Poll::Ready(None);
        }

        // Deadline first: a body that is always ready is still cut off.
        if this.deadline.as_mut().poll(cx).is_ready() {
            let err = this.fail("upstream deadline passed while streaming".to_string());
            return Poll::Ready(Some(Err(err)));
        }

        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match polled {
            Poll::Ready(Some(Ok(frame))) => Poll::Ready(Some(Ok(frame))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(this.fail(e.to_string())))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.failed || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
