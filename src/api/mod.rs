use anyhow::Context;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::{AuthConfig, Config};

mod error;

pub use error::ApiError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Password grant payload
#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Refresh grant payload
#[derive(Debug, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct RemoveObjects<'a> {
    prefixes: &'a [String],
}

/// Identity of the signed-in trainer
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by the auth service
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// Result of creating an account
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The backend confirmed the account immediately and issued a session
    SignedIn(AuthUser),
    /// The account must be activated through the emailed link first
    ConfirmationRequired(AuthUser),
}

/// Client for the hosted backend (tables, blob storage and auth).
///
/// One instance is built at startup from [`Config`] and shared by every
/// gateway. The session lives behind a lock so sign-in/out and token
/// refresh are visible to all of them.
pub struct ApiClient {
    client: Client,
    base_url: String,
    anon_key: String,
    config: RwLock<Config>,
}

impl ApiClient {
    /// Create a new API client. Fails when the backend address is not configured.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.backend.validate()?;

        let base_url = config.backend.url.trim_end_matches('/').to_string();
        let anon_key = config.backend.anon_key.clone();

        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            anon_key,
            config: RwLock::new(config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Copy of the current configuration, including the live session
    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Whether a session is stored (it may still turn out to be expired)
    pub async fn has_session(&self) -> bool {
        self.config.read().await.is_authenticated()
    }

    /// Change the shared configuration and write it back to its file
    pub async fn update_config<T>(&self, change: impl FnOnce(&mut Config) -> T) -> T {
        let mut config = self.config.write().await;
        let result = change(&mut config);
        Self::persist(&config);
        result
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        self.url(&format!("/rest/v1/{}", table))
    }

    /// Attach the API key and the session token (or the public key when signed out)
    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = {
            let config = self.config.read().await;
            if config.is_authenticated() {
                config.auth.access_token.clone()
            } else {
                self.anon_key.clone()
            }
        };

        builder.header("apikey", &self.anon_key).bearer_auth(token)
    }

    async fn send(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, body))
        }
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Sign in with email and password, storing the issued session
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthUser> {
        tracing::debug!("Signing in as {}", email);

        let request = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password });

        let tokens: TokenResponse = Self::send(request).await?.json().await?;
        self.store_session(&tokens).await;

        tracing::info!("Signed in as {}", email);
        Ok(tokens.user)
    }

    /// Create a trainer account
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> ApiResult<SignUpOutcome> {
        tracing::debug!("Creating account for {}", email);

        let request = self
            .client
            .post(self.url("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: SignUpMetadata { name },
            });

        match Self::send(request).await?.json::<SignUpResponse>().await? {
            SignUpResponse::Session(tokens) => {
                self.store_session(&tokens).await;
                Ok(SignUpOutcome::SignedIn(tokens.user))
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired(user)),
        }
    }

    /// End the session locally; the server-side revocation is best effort
    pub async fn sign_out(&self) -> ApiResult<()> {
        let token = {
            let config = self.config.read().await;
            if !config.is_authenticated() {
                return Ok(());
            }
            config.auth.access_token.clone()
        };

        let request = self
            .client
            .post(self.url("/auth/v1/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token);

        if let Err(e) = Self::send(request).await {
            tracing::warn!("Server-side sign out failed: {}", e);
        }

        self.forget_session().await;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Resolve the signed-in trainer. Every write that attributes a row to
    /// its owner goes through here first.
    pub async fn current_user(&self) -> ApiResult<AuthUser> {
        let token = {
            let config = self.config.read().await;
            if !config.is_authenticated() {
                return Err(ApiError::Unauthenticated);
            }
            config.auth.access_token.clone()
        };

        match self.fetch_user(&token).await {
            Err(ApiError::Unauthenticated) => {
                tracing::debug!("Access token rejected, exchanging refresh token");
                let token = self.refresh_session().await?;
                self.fetch_user(&token).await
            }
            other => other,
        }
    }

    async fn fetch_user(&self, token: &str) -> ApiResult<AuthUser> {
        let request = self
            .client
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token);

        Ok(Self::send(request).await?.json().await?)
    }

    /// Exchange the refresh token for a new session, returning the new access token
    async fn refresh_session(&self) -> ApiResult<String> {
        let refresh_token = {
            let config = self.config.read().await;
            config.auth.refresh_token.clone()
        };

        if refresh_token.is_empty() {
            self.forget_session().await;
            return Err(ApiError::Unauthenticated);
        }

        let request = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&RefreshGrant {
                refresh_token: &refresh_token,
            });

        match Self::send(request).await {
            Ok(response) => {
                let tokens: TokenResponse = response.json().await?;
                self.store_session(&tokens).await;
                tracing::info!("Refreshed session");
                Ok(tokens.access_token)
            }
            Err(e @ (ApiError::Network(_) | ApiError::ServerError(_))) => Err(e),
            Err(e) => {
                tracing::warn!("Session refresh rejected: {}", e);
                self.forget_session().await;
                Err(ApiError::Unauthenticated)
            }
        }
    }

    async fn store_session(&self, tokens: &TokenResponse) {
        let mut config = self.config.write().await;
        config.set_session(AuthConfig {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            user_id: tokens.user.id.clone(),
            email: tokens.user.email.clone().unwrap_or_default(),
        });
        Self::persist(&config);
    }

    async fn forget_session(&self) {
        let mut config = self.config.write().await;
        config.clear_session();
        Self::persist(&config);
    }

    /// Write the session back to the config file it came from. In-memory
    /// configurations are left alone.
    fn persist(config: &Config) {
        if config.source().is_none() {
            return;
        }
        if let Err(e) = config.save() {
            tracing::warn!("Failed to persist session: {:#}", e);
        }
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    /// Read rows; `query` carries `select`, `order` and `column=eq.value` filters
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        tracing::debug!("GET {} {:?}", table, query);

        let request = self
            .authorized(self.client.get(self.rest_url(table)))
            .await
            .query(query);

        Ok(Self::send(request).await?.json().await?)
    }

    /// Read at most one row
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Option<T>> {
        let rows: Vec<T> = self.select(table, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored
    pub async fn insert<B, T>(&self, table: &str, row: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.insert_rows(table, row).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::Decode(format!("insert into {} returned no rows", table)))
    }

    /// Insert a row or an array of rows and return them as stored
    pub async fn insert_rows<B, T>(&self, table: &str, rows: &B) -> ApiResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", table);

        let request = self
            .authorized(self.client.post(self.rest_url(table)))
            .await
            .header("Prefer", "return=representation")
            .json(rows);

        Ok(Self::send(request).await?.json().await?)
    }

    /// Patch the row with `id`. An id no longer present server-side is `NotFound`.
    pub async fn update<B, T>(&self, table: &str, id: &str, patch: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("PATCH {} {}", table, id);

        let request = self
            .authorized(self.client.patch(self.rest_url(table)))
            .await
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch);

        let rows: Vec<T> = Self::send(request).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", table, id)))
    }

    /// Delete the row with `id`. An id no longer present server-side is `NotFound`.
    pub async fn delete(&self, table: &str, id: &str) -> ApiResult<()> {
        tracing::debug!("DELETE {} {}", table, id);

        let request = self
            .authorized(self.client.delete(self.rest_url(table)))
            .await
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");

        let rows: Vec<serde_json::Value> = Self::send(request).await?.json().await?;
        if rows.is_empty() {
            return Err(ApiError::NotFound(format!("{} {}", table, id)));
        }
        Ok(())
    }

    /// Delete every row where `column` equals `value`
    pub async fn delete_where(&self, table: &str, column: &str, value: &str) -> ApiResult<()> {
        tracing::debug!("DELETE {} where {} = {}", table, column, value);

        let request = self
            .authorized(self.client.delete(self.rest_url(table)))
            .await
            .query(&[(column, format!("eq.{}", value))]);

        Self::send(request).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Blob storage
    // ------------------------------------------------------------------

    /// Store a binary object under `path` in `bucket`
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> ApiResult<()> {
        tracing::debug!("Uploading {} bytes to {}/{}", body.len(), bucket, path);

        let url = self.url(&format!("/storage/v1/object/{}/{}", bucket, encode_path(path)));
        let request = self
            .authorized(self.client.post(url))
            .await
            .header(CONTENT_TYPE, content_type)
            .body(body);

        Self::send(request).await?;
        Ok(())
    }

    /// Public URL for an object; no request is made
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.url(&format!(
            "/storage/v1/object/public/{}/{}",
            bucket,
            encode_path(path)
        ))
    }

    /// Remove objects from `bucket`
    pub async fn remove(&self, bucket: &str, paths: &[String]) -> ApiResult<()> {
        tracing::debug!("Removing {:?} from {}", paths, bucket);

        let request = self
            .authorized(self.client.delete(self.url(&format!("/storage/v1/object/{}", bucket))))
            .await
            .json(&RemoveObjects { prefixes: paths });

        Self::send(request).await?;
        Ok(())
    }
}

/// Percent-encode each segment of an object path, keeping the separators
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
