use crate::domain_port::Navigator;
use std::sync::Mutex;

/// Navigator for headless use: the redirect is reported through the log.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self, login_url: &str) {
        tracing::warn!(%login_url, "session expired, sign in again");
    }
}

/// Keeps every redirect it was asked for.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        match self.redirects.lock() {
            Ok(redirects) => redirects.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, login_url: &str) {
        tracing::info!(%login_url, "redirect to login");
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(login_url.to_owned());
        }
    }
}
