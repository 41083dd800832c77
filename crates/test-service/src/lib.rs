//! A local scripted analysis service for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use jdbias_service::{
    AnalysisReply, AnalysisRequest, AnalysisService, AnalysisServiceError,
    ErrorKind,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl AnalysisServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    presets: VecDeque<PresetReply>,
    dispatched: Vec<AnalysisRequest>,
    delay: Option<Duration>,
}

/// A local fake analysis service for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// service should respond to each request, in dispatch order. If there are
/// no presets left, the request fails with [`ErrorKind::Other`].
///
/// Clones share the same script, so a test can hand one clone to the code
/// under test and inspect the dispatched requests through another.
#[derive(Clone, Default)]
pub struct TestAnalysisService {
    script: Arc<Mutex<Script>>,
}

impl TestAnalysisService {
    #[inline]
    pub fn add_preset(&self, preset: PresetReply) {
        self.lock().presets.push_back(preset);
    }

    #[inline]
    pub fn add_reply<I: Into<String>, S: Into<String>>(
        &self,
        conversation_id: I,
        response: S,
    ) {
        self.add_preset(PresetReply::reply(conversation_id, response));
    }

    #[inline]
    pub fn add_failure(&self, failure: PresetFailure) {
        self.add_preset(PresetReply::failure(failure));
    }

    /// Delays every reply by `duration`, so tests can observe the
    /// in-flight state.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.lock().delay = Some(duration);
    }

    /// Returns every request received so far, in dispatch order.
    pub fn dispatched(&self) -> Vec<AnalysisRequest> {
        self.lock().dispatched.clone()
    }

    /// Returns the number of presets not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lock().presets.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("script lock is poisoned")
    }
}

impl Debug for TestAnalysisService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let script = self.lock();
        f.debug_struct("TestAnalysisService")
            .field("remaining", &script.presets.len())
            .field("dispatched", &script.dispatched.len())
            .finish()
    }
}

impl AnalysisService for TestAnalysisService {
    type Error = crate::Error;

    fn send_analysis(
        &self,
        req: &AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisReply, Self::Error>> + Send + 'static
    {
        let (result, delay) = {
            let mut script = self.lock();
            script.dispatched.push(req.clone());
            let result = match script.presets.pop_front() {
                Some(PresetReply::Reply(reply)) => Ok(reply),
                Some(PresetReply::Failure(failure)) => Err(Error {
                    message: "preset failure",
                    kind: failure.kind(),
                }),
                None => Err(Error {
                    message: "no enough presets",
                    kind: ErrorKind::Other,
                }),
            };
            (result, script.delay.unwrap_or(Duration::from_millis(1)))
        };

        async move {
            sleep(delay).await;
            result
        }
    }
}
