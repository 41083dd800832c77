use std::error::Error;

use crate::error::ErrorKind;
use crate::reply::AnalysisReply;
use crate::request::AnalysisRequest;

/// The error type for an analysis service.
pub trait AnalysisServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A remote service that analyzes submitted text.
///
/// Once the service is created, it should behave like a stateless object.
/// All conversation state lives on the other side of the wire and is
/// addressed by the `conversation_id` of each request.
pub trait AnalysisService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: AnalysisServiceError;

    /// Sends one analysis request.
    ///
    /// The returned future must not borrow `self`, and it must eventually
    /// resolve: implementations are responsible for their own timeout
    /// policy.
    fn send_analysis(
        &self,
        req: &AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisReply, Self::Error>> + Send + 'static;
}
