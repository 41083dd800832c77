use std::pin::Pin;
use std::sync::Arc;

use jdbias_service::{
    AnalysisReply, AnalysisRequest, AnalysisService, AnalysisServiceError,
};
use tracing::Instrument;

pub(crate) type SendResult =
    Result<AnalysisReply, Box<dyn AnalysisServiceError>>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;
type HandlerFn = Arc<dyn Fn(AnalysisRequest) -> BoxedSendFuture + Send + Sync>;

/// A type-erased wrapper around an analysis service.
#[derive(Clone)]
pub(crate) struct ServiceClient {
    handler_fn: HandlerFn,
}

impl ServiceClient {
    #[inline]
    pub fn new<S: AnalysisService + 'static>(service: S) -> Self {
        // Erase `S` so the controller state doesn't need a generic
        // parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            // The request leaves here, synchronously with the call.
            let fut = service.send_analysis(&req);
            let fut: BoxedSendFuture = Box::pin(
                async move {
                    trace!("sent a request: {req:?}");
                    match fut.await {
                        Ok(reply) => {
                            trace!("got a reply: {reply:?}");
                            Ok(reply)
                        }
                        Err(err) => {
                            debug!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn AnalysisServiceError>)
                        }
                    }
                }
                .instrument(trace_span!("analysis request")),
            );
            fut
        });
        Self { handler_fn }
    }

    /// Dispatches a request and returns a future for its result.
    #[inline]
    pub fn send(&self, req: AnalysisRequest) -> BoxedSendFuture {
        (self.handler_fn)(req)
    }
}
