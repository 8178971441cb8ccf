use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use loci_engine::backend::BackendError;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// Environment variable naming a persistent profile directory.
pub const USER_DATA_DIR_ENV: &str = "LOCI_USER_DATA_DIR";

/// Environment variable naming a custom Chrome/Chromium executable.
pub const CHROME_BIN_ENV: &str = "CHROME_BIN";

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    user_data_dir: PathBuf,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(visible: bool) -> Result<Self, BackendError> {
        let mut config_builder = BrowserConfig::builder().no_sandbox();
        let (user_data_dir, cleanup_user_data_dir) = resolve_user_data_dir()?;
        config_builder = config_builder.user_data_dir(&user_data_dir);

        if visible {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        } else {
            tracing::info!("Launching browser in headless mode");
        }

        if let Ok(chrome_bin) = std::env::var(CHROME_BIN_ENV) {
            tracing::info!("Using custom Chrome binary: {}", chrome_bin);
            config_builder = config_builder.chrome_executable(chrome_bin);
        }

        let config = config_builder
            .build()
            .map_err(|e| BackendError::Other(format!("Failed to build browser config: {}", e)))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BackendError::Other(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error (ignoring): {}", e);
                }
            }
            tracing::debug!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BackendError::Other(format!("Failed to create page: {}", e)))?;

        forward_console(&page).await?;
        auto_accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            handler_task,
            page,
            user_data_dir,
            cleanup_user_data_dir,
        })
    }

    pub async fn close(mut self) -> Result<(), BackendError> {
        self.browser
            .close()
            .await
            .map_err(|e| BackendError::Other(format!("Error closing browser: {}", e)))?;
        self.handler_task
            .await
            .map_err(|e| BackendError::Other(format!("Error awaiting handler: {}", e)))?;

        if self.cleanup_user_data_dir {
            if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
                tracing::debug!(
                    "Failed to clean up user-data-dir {}: {}",
                    self.user_data_dir.display(),
                    e
                );
            }
        }
        Ok(())
    }
}

async fn forward_console(page: &Page) -> Result<(), BackendError> {
    let mut console_events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|e| BackendError::Other(format!("Failed to subscribe to console events: {}", e)))?;

    tokio::spawn(async move {
        while let Some(event) = console_events.next().await {
            let args: Vec<String> = event
                .args
                .iter()
                .map(|arg| arg.description.clone().unwrap_or_else(|| "unknown".to_string()))
                .collect();
            tracing::debug!("Browser console [{:?}]: {}", event.r#type, args.join(" "));
        }
    });
    Ok(())
}

async fn auto_accept_dialogs(page: &Page) -> Result<(), BackendError> {
    let mut dialog_events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| BackendError::Other(format!("Failed to subscribe to dialog events: {}", e)))?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = dialog_events.next().await {
            tracing::info!("Accepting JavaScript dialog: {} ({:?})", event.message, event.r#type);
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                tracing::warn!("Failed to accept dialog: {}", e);
            }
        }
    });
    Ok(())
}

/// Profile directory for this launch and whether to delete it on close.
fn resolve_user_data_dir() -> Result<(PathBuf, bool), BackendError> {
    if let Ok(dir) = std::env::var(USER_DATA_DIR_ENV) {
        let path = PathBuf::from(dir);
        std::fs::create_dir_all(&path)?;
        tracing::info!("Using user data dir from {}: {}", USER_DATA_DIR_ENV, path.display());
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BackendError::Other(format!("System clock error: {}", e)))?
        .as_nanos();
    let unique = format!("loci-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path)?;
    tracing::debug!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}
