use async_trait::async_trait;
pub use loci_common::error::BackendError;
use loci_common::protocol::{
    CaptureRequest, CountRequest, ScannerAction, ScannerData, ScannerProtocolResponse,
};
use loci_common::snapshot::ElementSnapshot;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16,
}

/// The interface every page-hosting backend implements.
///
/// `execute_scanner` is the only primitive a backend must provide for
/// resolution; capture and selector counting are built on top of it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    async fn is_ready(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Execute a raw scanner command in the page.
    async fn execute_scanner(
        &mut self,
        command: ScannerAction,
    ) -> Result<ScannerProtocolResponse, BackendError>;

    /// Snapshot every interactive element, in document order.
    async fn capture_elements(&mut self) -> Result<Vec<ElementSnapshot>, BackendError> {
        let resp = self
            .execute_scanner(ScannerAction::Capture(CaptureRequest::default()))
            .await?;
        match resp {
            ScannerProtocolResponse::Ok { data, .. } => match *data {
                ScannerData::Capture(result) => Ok(result.elements),
                other => Err(BackendError::Scanner(format!(
                    "Unexpected capture response: {:?}",
                    other
                ))),
            },
            ScannerProtocolResponse::Error { code, message, .. } => {
                Err(BackendError::from_scanner(&code, &message))
            }
        }
    }

    /// Count live matches for a selector expression.
    async fn query_count(&mut self, selector: &str) -> Result<usize, BackendError> {
        let resp = self
            .execute_scanner(ScannerAction::Count(CountRequest {
                selector: selector.to_string(),
            }))
            .await?;
        match resp {
            ScannerProtocolResponse::Ok { data, .. } => match *data {
                ScannerData::Count(result) => Ok(result.count),
                other => Err(BackendError::Scanner(format!(
                    "Unexpected count response: {:?}",
                    other
                ))),
            },
            ScannerProtocolResponse::Error { code, message, .. } => {
                Err(BackendError::from_scanner(&code, &message))
            }
        }
    }
}
