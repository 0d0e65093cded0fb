//! Client for the Trakt.tv list service: one session per instance, one
//! HTTP request per operation, with a transparent login when an
//! authenticated call finds no token in hand.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Result, TraktError};
use crate::models::{ApiResult, ListItem, ListItems, ListPrivacy, ListSummary, Movie};

pub const API_HOST: &str = "api.trakt.tv";
const AGENT: &str = "XBMC Add-on Trakt.tv List Manager";
const API_VERSION: &str = "2";

/// The list/watchlist operations the menu layer consumes. Implemented by
/// [`TraktListApi`] and by fakes in tests.
#[async_trait]
pub trait TraktApi: Send {
    async fn connect(
        &mut self,
        username: &str,
        password: &str,
        api_key: &str,
        use_https: bool,
    ) -> Result<bool>;
    async fn login(&mut self) -> Result<bool>;
    async fn get_lists(&mut self) -> Result<Vec<ListSummary>>;
    async fn get_list(&mut self, list_slug: &str) -> Result<ListItems>;
    async fn get_watchlist(&mut self) -> Result<Vec<ListItem>>;
    async fn add_list(
        &mut self,
        name: &str,
        privacy: Option<ListPrivacy>,
        description: Option<&str>,
    ) -> Result<ApiResult>;
    async fn del_list(&mut self, list_slug: &str) -> Result<ApiResult>;
    async fn add_movie_to_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult>;
    async fn del_movie_from_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult>;
    async fn add_movie_to_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult>;
    async fn del_movie_from_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult>;
    async fn search_movie(&mut self, query: &str) -> Result<Vec<Movie>>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

/// One authenticated session against the list service. Not safe for
/// concurrent mutation; the `&mut self` receivers make callers either hold
/// independent instances or serialize access to one.
#[derive(Debug)]
pub struct TraktListApi {
    client: Client,
    host: String,
    use_https: bool,
    username: Option<String>,
    password: Option<String>,
    api_key: Option<String>,
    token: Option<String>,
    connected: bool,
}

impl Default for TraktListApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TraktListApi {
    pub fn new() -> Self {
        Self::with_host(API_HOST)
    }

    /// Point the client at a different host. Production use keeps the fixed
    /// service host; tests point this at a local synthetic transport.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host: host.into(),
            use_https: true,
            username: None,
            password: None,
            api_key: None,
            token: None,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Drop the session back to its unauthenticated default state.
    pub fn reset(&mut self) {
        self.connected = false;
        self.username = None;
        self.password = None;
        self.api_key = None;
        self.token = None;
        self.use_https = true;
    }

    /// Store credentials and attempt a login. An ordinary bad-credential
    /// response and an outright authorization rejection both reset the
    /// session and yield `Ok(false)`; transport failures reset the session
    /// and propagate.
    pub async fn connect(
        &mut self,
        username: &str,
        password: &str,
        api_key: &str,
        use_https: bool,
    ) -> Result<bool> {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self.api_key = Some(api_key.to_string());
        self.use_https = use_https;
        self.connected = match self.login().await {
            Ok(logged_in) => logged_in,
            Err(TraktError::Authentication) => false,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };
        if !self.connected {
            self.reset();
        }
        Ok(self.connected)
    }

    /// Exchange the stored credentials for a token. One request per call;
    /// safe to call repeatedly.
    pub async fn login(&mut self) -> Result<bool> {
        let post = json!({
            "login": self.username,
            "password": self.password,
        });
        let data: LoginResponse = self.request("/auth/login", Some(post), false).await?;
        match data.token {
            Some(token) => {
                self.token = Some(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn get_lists(&mut self) -> Result<Vec<ListSummary>> {
        self.api_call("/users/me/lists", None, true).await
    }

    pub async fn get_list(&mut self, list_slug: &str) -> Result<ListItems> {
        let path = format!("/users/me/lists/{list_slug}/items?extended=full,images");
        self.api_call(&path, None, true).await
    }

    pub async fn get_watchlist(&mut self) -> Result<Vec<ListItem>> {
        self.api_call("/users/me/watchlist/movies?extended=full,images", None, true)
            .await
    }

    pub async fn add_list(
        &mut self,
        name: &str,
        privacy: Option<ListPrivacy>,
        description: Option<&str>,
    ) -> Result<ApiResult> {
        let post = json!({
            "name": name,
            "description": description.unwrap_or(""),
            "privacy": privacy.unwrap_or_default(),
        });
        let path = format!("/lists/add/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    pub async fn del_list(&mut self, list_slug: &str) -> Result<ApiResult> {
        let post = json!({ "slug": list_slug });
        let path = format!("/lists/delete/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    pub async fn add_movie_to_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        let item = movie_item(imdb_id, tmdb_id)?;
        let post = json!({ "slug": list_slug, "items": [item] });
        let path = format!("/lists/items/add/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    pub async fn del_movie_from_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        let item = movie_item(imdb_id, tmdb_id)?;
        let post = json!({ "slug": list_slug, "items": [item] });
        let path = format!("/lists/items/delete/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    pub async fn add_movie_to_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        let item = movie_item(imdb_id, tmdb_id)?;
        let post = json!({ "movies": [item] });
        let path = format!("/movie/watchlist/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    pub async fn del_movie_from_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        let item = movie_item(imdb_id, tmdb_id)?;
        let post = json!({ "movies": [item] });
        let path = format!("/movie/unwatchlist/{}", self.key_path());
        self.api_call(&path, Some(post), true).await
    }

    /// Free-text movie search. Needs no session; the API key rides in the
    /// path and the query goes URL-escaped into the query string.
    pub async fn search_movie(&mut self, query: &str) -> Result<Vec<Movie>> {
        let path = format!(
            "/search/movies.json/{}/?query={}",
            self.key_path(),
            urlencoding::encode(query)
        );
        self.api_call(&path, None, false).await
    }

    fn key_path(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    fn api_url(&self, path: &str) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}{path}", self.host)
    }

    /// Run one operation, logging in first when no token is held. An
    /// authorization failure drops the session back to its unauthenticated
    /// default; transport failures leave it untouched.
    async fn api_call<T: DeserializeOwned>(
        &mut self,
        path: &str,
        post: Option<Value>,
        auth: bool,
    ) -> Result<T> {
        if auth && self.token.is_none() {
            match self.login().await {
                Ok(_) => {}
                Err(TraktError::Authentication) => {
                    self.reset();
                    return Err(TraktError::Authentication);
                }
                Err(err) => return Err(err),
            }
            if self.token.is_none() {
                self.reset();
                return Err(TraktError::Authentication);
            }
        }
        match self.request(path, post, auth).await {
            Err(TraktError::Authentication) => {
                self.reset();
                Err(TraktError::Authentication)
            }
            other => other,
        }
    }

    /// The single choke point: every request is built, sent, and classified
    /// here. GET without a payload, POST with a JSON body otherwise.
    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        post: Option<Value>,
        auth: bool,
    ) -> Result<T> {
        let url = self.api_url(path);
        debug!(%url, auth, "api call");
        let mut request = match &post {
            Some(body) => self.client.post(&url).json(body),
            None => self.client.get(&url),
        };
        request = request
            .header(USER_AGENT, AGENT)
            .header(CONTENT_TYPE, "application/json")
            .header("trakt-api-key", self.key_path())
            .header("trakt-api-version", API_VERSION);
        if auth {
            request = request
                .header("trakt-user-login", self.username.as_deref().unwrap_or_default())
                .header("trakt-user-token", self.token.as_deref().unwrap_or_default());
        }

        let response = request.send().await.map_err(TraktError::Connection)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%url, "authorization rejected");
            return Err(TraktError::Authentication);
        }
        if !status.is_success() {
            warn!(%url, %status, "unexpected response status");
            return Err(TraktError::Http { status });
        }
        let bytes = response.bytes().await.map_err(TraktError::Connection)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Build the wire item for a movie mutation. Empty identifiers count as
/// absent; at least one of the two must remain.
fn movie_item(imdb_id: Option<&str>, tmdb_id: Option<&str>) -> Result<Value> {
    let imdb_id = imdb_id.filter(|id| !id.is_empty());
    let tmdb_id = tmdb_id.filter(|id| !id.is_empty());
    if imdb_id.is_none() && tmdb_id.is_none() {
        return Err(TraktError::InvalidArgument);
    }
    let mut item = serde_json::Map::new();
    item.insert("type".to_string(), "movie".into());
    if let Some(id) = tmdb_id {
        item.insert("tmdb_id".to_string(), id.into());
    }
    if let Some(id) = imdb_id {
        item.insert("imdb_id".to_string(), id.into());
    }
    Ok(Value::Object(item))
}

#[async_trait]
impl TraktApi for TraktListApi {
    async fn connect(
        &mut self,
        username: &str,
        password: &str,
        api_key: &str,
        use_https: bool,
    ) -> Result<bool> {
        TraktListApi::connect(self, username, password, api_key, use_https).await
    }

    async fn login(&mut self) -> Result<bool> {
        TraktListApi::login(self).await
    }

    async fn get_lists(&mut self) -> Result<Vec<ListSummary>> {
        TraktListApi::get_lists(self).await
    }

    async fn get_list(&mut self, list_slug: &str) -> Result<ListItems> {
        TraktListApi::get_list(self, list_slug).await
    }

    async fn get_watchlist(&mut self) -> Result<Vec<ListItem>> {
        TraktListApi::get_watchlist(self).await
    }

    async fn add_list(
        &mut self,
        name: &str,
        privacy: Option<ListPrivacy>,
        description: Option<&str>,
    ) -> Result<ApiResult> {
        TraktListApi::add_list(self, name, privacy, description).await
    }

    async fn del_list(&mut self, list_slug: &str) -> Result<ApiResult> {
        TraktListApi::del_list(self, list_slug).await
    }

    async fn add_movie_to_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        TraktListApi::add_movie_to_list(self, list_slug, imdb_id, tmdb_id).await
    }

    async fn del_movie_from_list(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        TraktListApi::del_movie_from_list(self, list_slug, imdb_id, tmdb_id).await
    }

    async fn add_movie_to_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        TraktListApi::add_movie_to_watchlist(self, imdb_id, tmdb_id).await
    }

    async fn del_movie_from_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
    ) -> Result<ApiResult> {
        TraktListApi::del_movie_from_watchlist(self, imdb_id, tmdb_id).await
    }

    async fn search_movie(&mut self, query: &str) -> Result<Vec<Movie>> {
        TraktListApi::search_movie(self, query).await
    }
}
