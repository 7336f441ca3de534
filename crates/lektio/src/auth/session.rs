//! The authenticated session: token lifecycle, refresh coalescing, and
//! bearer injection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    COURSE_DETAIL, COURSE_LIST, Course, EnrolledCourse, LOGIN, LoginRequest, PROFILE, Profile,
    REGISTER, RegisterRequest, RegisterResponse, RefreshRequest, STUDENT_COURSE_LIST,
    TOKEN_REFRESH, TokenPairResponse,
};
use crate::config::Config;
use crate::error::{AuthError, Error};
use crate::http::ApiClient;

use super::claims::{Claims, is_expired};
use super::state::{Identity, SessionSnapshot, SessionState};
use super::store::TokenStore;
use super::tokens::{AccessToken, RefreshToken, TokenPair};

/// A session against the marketplace API.
///
/// Owns the token lifecycle end to end: login/registration/logout flows,
/// the durable [`TokenStore`], the observable [`SessionState`], and the
/// request interceptor that attaches `Authorization: Bearer` headers and
/// refreshes expired access tokens with at most one exchange in flight.
///
/// Sessions are cheap to clone (they use an internal `Arc`) and safe to
/// share across tasks; every clone shares the same store, state, and
/// refresh coalescing.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use lektio::{ApiUrl, Config, MemoryTokenStore, Session};
///
/// # async fn example() -> Result<(), lektio::Error> {
/// let config = Config::new(ApiUrl::new("https://api.lektio.app")?);
/// let session = Session::new(config, Arc::new(MemoryTokenStore::new()));
///
/// session.bootstrap().await;
/// let identity = session.login("alice@example.com", "password").await?;
/// println!("logged in as user {}", identity.user_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: ApiClient,
    store: Arc<dyn TokenStore>,
    state: SessionState,
    /// Serializes refresh exchanges; callers re-check freshness after
    /// acquiring, so concurrent expired requests coalesce into one call.
    refresh_lock: Mutex<()>,
    /// Bumped on logout. A login that completes under a stale epoch
    /// discards its result instead of resurrecting the session.
    auth_epoch: AtomicU64,
    payment_client_id: Option<String>,
}

impl Session {
    /// Create a session with the given configuration and token store.
    ///
    /// The session starts in the bootstrap phase (`loading=true`); call
    /// [`bootstrap`](Self::bootstrap) to resolve the stored identity.
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                http: ApiClient::new(config.api_base),
                store,
                state: SessionState::new(),
                refresh_lock: Mutex::new(()),
                auth_epoch: AtomicU64::new(0),
                payment_client_id: config.payment_client_id,
            }),
        }
    }

    /// Returns a handle to the observable session state.
    pub fn state(&self) -> SessionState {
        self.inner.state.clone()
    }

    /// Subscribe to session snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// The opaque payment-provider client identifier, if configured.
    pub fn payment_client_id(&self) -> Option<&str> {
        self.inner.payment_client_id.as_deref()
    }

    /// Resolve the stored identity at process start.
    ///
    /// Reads the token store: a valid access token sets the identity
    /// directly; an expired one with a live refresh token goes through the
    /// refresh exchange; anything else ends anonymous. Always ends with
    /// `loading=false`. Bootstrap failures are not surfaced as errors —
    /// observers just see an anonymous session.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) {
        debug!("bootstrapping session from token store");

        match self.fresh_access_token().await {
            Ok(access) => match Claims::decode(&access) {
                Ok(claims) => self.inner.state.set_identity(Identity::from(&claims)),
                Err(_) => self.inner.state.clear(),
            },
            Err(_) => self.inner.state.clear(),
        }
    }

    /// Authenticate with the marketplace and establish a session.
    ///
    /// On success the token pair is persisted and the session identity is
    /// set from the new access token's claims. On rejection the session is
    /// left untouched and [`AuthError::InvalidCredentials`] carries the
    /// server's `detail` message.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, Error> {
        info!("logging in");

        let epoch = self.inner.auth_epoch.load(Ordering::SeqCst);

        let request = LoginRequest { email, password };
        let response: TokenPairResponse = match self.inner.http.post(LOGIN, &request).await {
            Ok(response) => response,
            Err(Error::Api(e)) if e.status == 400 || e.status == 401 => {
                return Err(AuthError::InvalidCredentials {
                    detail: e
                        .detail
                        .unwrap_or_else(|| "invalid credentials".to_string()),
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        // A logout while this login was in flight wins; do not resurrect
        if self.inner.auth_epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding login result, logout occurred while in flight");
            return Err(AuthError::Superseded.into());
        }

        let pair = TokenPair::new(response.access, response.refresh);
        let claims = Claims::decode(&pair.access).map_err(AuthError::from)?;

        self.inner.store.persist(&pair)?;
        let identity = Identity::from(&claims);
        self.inner.state.set_identity(identity.clone());

        debug!(user_id = identity.user_id, "login succeeded");
        Ok(identity)
    }

    /// Register a new account, then log in with the same credentials.
    #[instrument(skip(self, password, password2))]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        password2: &str,
    ) -> Result<Identity, Error> {
        info!("registering new account");

        let request = RegisterRequest {
            full_name,
            email,
            password,
            password2,
        };
        let _created: RegisterResponse = self.inner.http.post(REGISTER, &request).await?;

        self.login(email, password).await
    }

    /// End the session: clear the token store and the observable state.
    ///
    /// Idempotent and infallible; a storage hiccup is logged, not
    /// surfaced.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.inner.auth_epoch.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to clear token store during logout");
        }
        self.inner.state.clear();

        info!("logged out");
    }

    /// Returns the claims of the currently stored access token.
    ///
    /// Local decode only; the token may still be rejected by the server.
    pub fn current_claims(&self) -> Result<Claims, Error> {
        let pair = self
            .inner
            .store
            .read()
            .ok_or(AuthError::NotAuthenticated)?;
        Claims::decode(&pair.access)
            .map_err(AuthError::from)
            .map_err(Error::from)
    }

    // ========================================================================
    // Request Interceptor
    // ========================================================================

    /// Make an authenticated GET request through the interceptor.
    pub async fn get_authed<R>(&self, path: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let token = self.fresh_access_token().await?;
        self.inner.http.get_authed(path, token.as_str()).await
    }

    /// Make an authenticated POST request through the interceptor.
    pub async fn post_authed<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let token = self.fresh_access_token().await?;
        self.inner
            .http
            .post_authed(path, body, token.as_str())
            .await
    }

    /// Make an authenticated DELETE request through the interceptor.
    pub async fn delete_authed(&self, path: &str) -> Result<(), Error> {
        let token = self.fresh_access_token().await?;
        self.inner.http.delete_authed(path, token.as_str()).await
    }

    /// Obtain an access token that is not expired, refreshing if needed.
    ///
    /// The expiry check is local (decoded claims against the current
    /// clock); only an actual refresh costs a round trip. Concurrent
    /// callers coalesce on the refresh lock: whoever acquires it first
    /// performs the single exchange, everyone else re-checks the store
    /// after the lock and finds a fresh token.
    async fn fresh_access_token(&self) -> Result<AccessToken, Error> {
        if let Some(pair) = self.inner.store.read() {
            if !is_expired(&pair.access, Utc::now()) {
                return Ok(pair.access);
            }
        } else {
            return Err(AuthError::NotAuthenticated.into());
        }

        let _guard = self.inner.refresh_lock.lock().await;

        // Re-check under the lock: a concurrent caller may have already
        // refreshed, or a failed refresh may have cleared the store.
        match self.inner.store.read() {
            Some(pair) if !is_expired(&pair.access, Utc::now()) => Ok(pair.access),
            Some(pair) => self.exchange_refresh(&pair.refresh).await,
            // A pair existed before the lock; its disappearance means the
            // in-flight refresh failed and ended the session. The whole
            // batch fails the same way.
            None => Err(AuthError::RefreshFailed {
                detail: "refresh failed in a concurrent request".to_string(),
            }
            .into()),
        }
    }

    /// Perform the refresh exchange. Called only with the refresh lock
    /// held.
    ///
    /// This call deliberately bypasses the interceptor: it is a plain POST
    /// carrying the refresh token in the body, exempt from the expiry
    /// check that triggered it.
    #[instrument(skip(self, refresh))]
    async fn exchange_refresh(&self, refresh: &RefreshToken) -> Result<AccessToken, Error> {
        info!("access token expired, exchanging refresh token");

        let request = RefreshRequest {
            refresh: refresh.as_str(),
        };

        let failure = match self
            .inner
            .http
            .post::<_, TokenPairResponse>(TOKEN_REFRESH, &request)
            .await
        {
            Ok(response) => {
                let pair = TokenPair::new(response.access, response.refresh);
                match Claims::decode(&pair.access) {
                    Ok(claims) => {
                        self.inner.store.persist(&pair)?;
                        self.inner.state.set_identity(Identity::from(&claims));
                        debug!("refresh exchange succeeded");
                        return Ok(pair.access);
                    }
                    Err(e) => format!("undecodable access token in refresh response: {e}"),
                }
            }
            Err(e) => e.to_string(),
        };

        // Terminal for the request chain: end the session so the caller
        // lands in an unauthenticated flow instead of silently retrying.
        warn!(detail = %failure, "refresh exchange failed, clearing session");
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to clear token store after refresh failure");
        }
        self.inner.state.clear();

        Err(AuthError::RefreshFailed { detail: failure }.into())
    }

    // ========================================================================
    // Marketplace Operations
    // ========================================================================

    /// Fetch the current user's profile.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, Error> {
        let user_id = self.current_claims()?.user_id;
        self.get_authed(&format!("{}{}/", PROFILE, user_id)).await
    }

    /// List the courses the current user is enrolled in.
    #[instrument(skip(self))]
    pub async fn enrolled_courses(&self) -> Result<Vec<EnrolledCourse>, Error> {
        let user_id = self.current_claims()?.user_id;
        self.get_authed(&format!("{}{}/", STUDENT_COURSE_LIST, user_id))
            .await
    }

    /// List the public course catalog. No authentication required.
    #[instrument(skip(self))]
    pub async fn course_catalog(&self) -> Result<Vec<Course>, Error> {
        self.inner.http.get(COURSE_LIST).await
    }

    /// Fetch a single course from the public catalog.
    #[instrument(skip(self))]
    pub async fn course(&self, course_id: u64) -> Result<Course, Error> {
        self.inner
            .http
            .get(&format!("{}{}/", COURSE_DETAIL, course_id))
            .await
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base", self.inner.http.base())
            .field("state", &self.inner.state.snapshot())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
