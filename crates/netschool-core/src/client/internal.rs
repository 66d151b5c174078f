use std::{
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use super::{keepalive::KeepAlive, LoginMethod, Session};
use crate::{http::HttpSession, ClientSettings, NotAuthenticatedError};

#[derive(Debug)]
pub struct InternalClient {
    pub(crate) settings: ClientSettings,
    pub(crate) http: HttpSession,
    pub(crate) session: RwLock<Session>,
    pub(crate) login_method: RwLock<Option<Arc<LoginMethod>>>,
    pub(crate) keepalive: Mutex<KeepAlive>,
}

impl InternalClient {
    pub(crate) fn new(settings: ClientSettings, http: HttpSession) -> Self {
        let keepalive = KeepAlive::new(Duration::from_secs(settings.keepalive_interval));
        Self {
            settings,
            http,
            session: RwLock::new(Session::default()),
            login_method: RwLock::new(None),
            keepalive: Mutex::new(keepalive),
        }
    }

    /// The portal HTTP identity.
    pub fn http(&self) -> &HttpSession {
        &self.http
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// A copy of the current session.
    pub fn session(&self) -> Session {
        self.session.read().expect("RwLock is not poisoned").clone()
    }

    /// The current session, or an error if no login completed yet.
    pub fn authenticated_session(&self) -> Result<Session, NotAuthenticatedError> {
        let session = self.session();
        if session.is_authenticated() {
            Ok(session)
        } else {
            Err(NotAuthenticatedError)
        }
    }

    pub fn get_login_method(&self) -> Option<Arc<LoginMethod>> {
        self.login_method
            .read()
            .expect("RwLock is not poisoned")
            .clone()
    }

    /// Installs a fully initialized session and restarts the keep-alive.
    pub(crate) fn commit_session(&self, session: Session, login_method: LoginMethod) {
        self.stop_keepalive();
        {
            let mut current = self.session.write().expect("RwLock is not poisoned");
            self.http.set_access_token(session.access_token.clone());
            *current = session;
        }
        *self.login_method.write().expect("RwLock is not poisoned") = Some(Arc::new(login_method));

        self.keepalive
            .lock()
            .expect("Mutex is not poisoned")
            .start(self.http.clone());
        tracing::info!("Portal session established");
    }

    /// Drops the access token and stops the keep-alive. Cookies are left to the caller.
    pub(crate) fn clear_session(&self) {
        self.stop_keepalive();
        let mut current = self.session.write().expect("RwLock is not poisoned");
        self.http.set_access_token(None);
        *current = Session::default();
        *self.login_method.write().expect("RwLock is not poisoned") = None;
    }

    pub fn stop_keepalive(&self) {
        self.keepalive.lock().expect("Mutex is not poisoned").stop();
    }

    /// Changes the keep-alive interval in seconds. Zero stops it; otherwise it is restarted when a
    /// session exists.
    pub fn set_keepalive_interval(&self, seconds: u64) {
        let mut keepalive = self.keepalive.lock().expect("Mutex is not poisoned");
        keepalive.set_interval(Duration::from_secs(seconds));
        if seconds == 0 {
            keepalive.stop();
        } else if self.http.access_token().is_some() || self.session().is_authenticated() {
            keepalive.start(self.http.clone());
        }
    }

    pub fn is_keepalive_running(&self) -> bool {
        self.keepalive
            .lock()
            .expect("Mutex is not poisoned")
            .is_running()
    }
}
