//! OAuth 2.0 management for YouTube API authentication.
//!
//! This module encapsulates all OAuth-related operations: the interactive
//! installed-app authorization flow (browser + localhost redirect), token
//! refresh, and loading the client-secret pair from the Google-format
//! `client_secret.json` file.

use eyre::Context;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, CsrfToken, PkceCodeChallenge, RedirectUrl, Scope,
    TokenUrl,
};
use oauth2::{ClientSecret, RevocationUrl, TokenResponse, reqwest};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;

/// Google OAuth2 token endpoint URL used for both initial authentication and token refresh
const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";

/// The one scope this tool needs; `videos.update` requires force-ssl.
const SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Page shown in the user's browser once the authorization redirect has been
/// captured.
const OAUTH_DONE: &str = include_str!("../oauth_success.html");

/// Shape of Google's downloadable client-secret file for installed
/// applications.
///
/// For an installed desktop application using PKCE the "secret" is embedded
/// in the file Google hands out and is not actually considered confidential,
/// per <https://developers.google.com/identity/protocols/oauth2#installed>.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: InstalledApp,
}

#[derive(Debug, Deserialize)]
struct InstalledApp {
    client_id: String,
    client_secret: String,
}

/// Manages OAuth 2.0 authentication flows for YouTube API access.
///
/// Provides the two operations the rest of the tool needs: a full
/// interactive authorization for first runs, and a refresh-token exchange
/// for every run after that.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    client_id: String,
    client_secret: String,
}

impl OAuthManager {
    /// Loads the client-secret pair from a Google installed-app
    /// `client_secret.json` file.
    pub async fn from_client_secret_file(path: &Path) -> eyre::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read OAuth client secret file {}", path.display()))?;
        let parsed: ClientSecretFile =
            serde_json::from_str(&raw).context("parse OAuth client secret file")?;

        Ok(Self {
            client_id: parsed.installed.client_id,
            client_secret: parsed.installed.client_secret,
        })
    }

    /// Performs a complete OAuth 2.0 authorization flow to obtain a new
    /// access token.
    ///
    /// Opens the user's browser for consent, runs a one-shot local HTTP
    /// server to receive the authorization callback, and exchanges the
    /// authorization code for an access token.
    ///
    /// # Panics
    ///
    /// Panics if hardcoded OAuth endpoint URLs are malformed (this should never happen
    /// in practice as the URLs are static and validated).
    pub async fn authenticate(&self) -> eyre::Result<BasicTokenResponse> {
        let csrf = CsrfToken::new_random();
        let (redirect_url, eventually_authorization_code) = self
            .setup_redirect(csrf.clone())
            .await
            .context("set up redirect endpoint")?;

        let auth_url = AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())
            .expect("Invalid authorization endpoint URL");
        let token_url = TokenUrl::new(TOKEN_URL.to_string()).expect("Invalid token endpoint URL");
        let revocation_url = RevocationUrl::new("https://oauth2.googleapis.com/revoke".to_string())
            .expect("Invalid revocation endpoint URL");
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url)
            .set_revocation_url(revocation_url);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, _csrf_token) = client
            // We never re-use the CSRF since we only go through the flow exactly once.
            .authorize_url(move || csrf.clone())
            .add_scope(Scope::new(SCOPE.to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::info!(url = %auth_url, "asking user to follow OAuth flow");
        webbrowser::open(auth_url.as_ref()).context("open user's browser")?;
        let authorization_code = eventually_authorization_code
            .await
            .context("await user authorization code")?;

        let http_client = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("building reqwest client should not fail");
        let token_result = client
            .exchange_code(authorization_code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("exchange authorization code with access token")?;

        Ok(token_result)
    }

    /// Attempts to refresh an existing OAuth token using its refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(new_token))` - Refresh succeeded, new token is available
    /// * `Ok(None)` - Refresh failed or no refresh token available
    /// * `Err(_)` - Network or other error occurred during refresh attempt
    ///
    /// When refresh fails, the token should be considered invalid and the
    /// user should be sent through [`Self::authenticate`] again.
    ///
    /// # Panics
    ///
    /// Panics if hardcoded OAuth endpoint URLs are malformed or if the HTTP client
    /// cannot be built with the specified configuration (both should never happen
    /// in practice).
    pub async fn refresh_token(
        &self,
        token: BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        let Some(refresh_token) = token.refresh_token() else {
            tracing::warn!("no refresh token available, cannot refresh");
            return Ok(None);
        };

        tracing::debug!("attempting to refresh OAuth token");

        // Token refresh needs no redirect URL
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(TOKEN_URL.to_string()).expect("Invalid token endpoint URL"),
            );

        let http_client = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("building reqwest client should not fail");

        match client
            .exchange_refresh_token(refresh_token)
            .request_async(&http_client)
            .await
        {
            Ok(new_token) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(new_token))
            }
            Err(ref e @ oauth2::RequestTokenError::ServerResponse(ref sr))
                if matches!(
                    sr.error(),
                    oauth2::basic::BasicErrorResponseType::InvalidGrant
                ) =>
            {
                tracing::warn!("OAuth refresh token considered invalid grant: {}", e);
                Ok(None)
            }
            Err(e) => Err(e).context("exchange refresh token"),
        }
    }

    /// Sets up a local HTTP server to receive the OAuth authorization
    /// callback.
    ///
    /// Binds a random local port, validates the CSRF state on the callback,
    /// and hands back the authorization code through the returned future.
    async fn setup_redirect(
        &self,
        csrf: CsrfToken,
    ) -> eyre::Result<(
        RedirectUrl,
        impl Future<Output = eyre::Result<AuthorizationCode>>,
    )> {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind to localhost")?;
        let addr = socket.local_addr().context("get local address")?;
        let url = RedirectUrl::new(format!("http://{}:{}", addr.ip(), addr.port()))
            .context("construct redirect url")?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let r = async move {
                let (conn, _) = socket.accept().await.context("accept")?;
                let conn = hyper_util::rt::TokioIo::new(conn);
                let (got, mut gotten) = tokio::sync::mpsc::channel(1);
                let service = service_fn(move |req: Request<body::Incoming>| {
                    let csrf = csrf.clone();
                    let got = got.clone();
                    async move {
                        let mut presented_state = None;
                        let mut presented_code = None;
                        // space-separated
                        let mut presented_scope = None;
                        for (k, v) in
                            form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
                        {
                            match &*k {
                                "state" => presented_state = Some(v),
                                "code" => presented_code = Some(v),
                                "scope" => presented_scope = Some(v),
                                _ => {}
                            }
                        }
                        // TODO: check that the user granted the scope(s) we requested
                        let _ = presented_scope;
                        if presented_state.as_deref() != Some(csrf.secret().as_str()) {
                            return Err("invalid csrf token");
                        }
                        let Some(code) = presented_code else {
                            return Err("no authorization code found");
                        };
                        let code = AuthorizationCode::new(code.into_owned());
                        got.send(code)
                            .await
                            .expect("channel won't be closed until server exit");
                        Ok(Response::new(Full::<Bytes>::from(OAUTH_DONE)))
                    }
                });
                let mut serve = std::pin::pin!(
                    hyper::server::conn::http1::Builder::new().serve_connection(conn, service)
                );

                tokio::select! {
                    exit = &mut serve => {
                        if let Err(e) = exit {
                            Err(e).context("redirect server got bad request")
                        } else {
                            eyre::bail!("redirect server exit prematurely");
                        }
                    }
                    code = gotten.recv() => {
                        serve
                            .graceful_shutdown();
                        let code = code.expect("channel won't be closed until service_fn is dropped");
                        Ok(code)
                    }
                }
            };
            let _ = tx.send(r.await);
        });
        Ok((url, async move {
            rx.await.context("redirect future dropped prematurely")?
        }))
    }
}
