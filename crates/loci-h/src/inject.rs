use chromiumoxide::Page;
use loci_engine::backend::BackendError;
use loci_scanner::SCANNER_JS;
use std::time::Duration;

/// Per-evaluation timeout; a blocking dialog would otherwise hang the call.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Whether an evaluation error means the page context went away mid-navigation.
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(remote_object)) => remote_object
            .into_value::<serde_json::Value>()
            .map_err(|e| EvalError::Other(format!("Failed to read result: {}", e))),
    }
}

/// Install the scanner unless the page already has it.
async fn ensure_scanner(page: &Page) -> Result<(), EvalError> {
    let loaded = evaluate_with_timeout(page, "typeof window.Loci !== 'undefined'").await?;
    if loaded.as_bool() != Some(true) {
        tracing::debug!("Injecting scanner");
        evaluate_with_timeout(page, SCANNER_JS).await?;
    }
    Ok(())
}

/// Run one scanner request in the page and return its raw JSON response.
///
/// Injection and evaluation are retried while the execution context is being
/// replaced by a navigation.
pub async fn execute_request(
    page: &Page,
    request: &serde_json::Value,
) -> Result<serde_json::Value, BackendError> {
    let expression = format!("window.Loci.process({})", serde_json::to_string(request)?);
    tracing::trace!("Evaluating script: {}", expression);

    let mut last_error = None;
    for attempt in 0..MAX_CONTEXT_RETRIES {
        let outcome = match ensure_scanner(page).await {
            Ok(()) => evaluate_with_timeout(page, &expression).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(EvalError::Timeout) => {
                return Err(BackendError::TimeoutWithContext {
                    operation: "scanner evaluation (possibly blocked by a dialog)".into(),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => {
                return Err(BackendError::ScriptError(err_str));
            }
        }
    }

    Err(BackendError::Scanner(last_error.unwrap_or_else(|| {
        "Scanner request failed after retries".to_string()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_errors_are_recognised() {
        assert!(is_context_error("Execution context was destroyed, most likely because of a navigation"));
        assert!(is_context_error("Cannot find context with specified id"));
        assert!(!is_context_error("ReferenceError: foo is not defined"));
    }
}
