// File: src/client/core.rs
use crate::cache::Cache;
use crate::client::TaskService;
use crate::client::middleware::{ApiHeaders, ApiHeadersLayer, default_user_agent};
use crate::client::wire::{
    Command, FULL_SYNC_TOKEN, RESOURCE_TYPES, ReadRequest, ReadResponse, WriteRequest,
    WriteResponse,
};
use crate::context::SharedContext;
use crate::engine::LabelUpdate;
use crate::model::Snapshot;

use anyhow::{Context, Result, anyhow, bail};
use http::header::CONTENT_TYPE;
use http::{Method, Request, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;
use tower_layer::Layer;

type HttpsClient =
    ApiHeaders<AddAuthorization<Client<hyper_rustls::HttpsConnector<HttpConnector>, String>>>;

/// Sync API client holding the last known remote state.
///
/// Reads are incremental: the sync token from the previous response is sent back
/// and the delta is merged into `state`. Unless caching is disabled, state and
/// token survive restarts through [`Cache`].
#[derive(Clone, Debug)]
pub struct TodoistClient {
    http: HttpsClient,
    sync_uri: Uri,
    ctx: Option<SharedContext>,
    state: Snapshot,
    sync_token: Option<String>,
}

impl TodoistClient {
    /// `ctx` is where the sync cache lives; `None` disables caching.
    pub fn new(api_url: &str, token: &str, ctx: Option<SharedContext>) -> Result<Self> {
        let sync_uri: Uri = format!("{}/sync", api_url.trim_end_matches('/'))
            .parse()
            .with_context(|| format!("Invalid API url '{}'", api_url))?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() && sync_uri.scheme_str() == Some("https") {
            bail!("No valid system certificates found.");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let http = ApiHeadersLayer::new(&default_user_agent())
            .layer(AddAuthorization::bearer(http_client, token));

        let (state, sync_token) = match &ctx {
            Some(ctx) => Cache::load(ctx.as_ref()).unwrap_or_else(|e| {
                log::warn!("Could not read sync cache: {}", e);
                (Snapshot::default(), None)
            }),
            None => (Snapshot::default(), None),
        };

        Ok(Self {
            http,
            sync_uri,
            ctx,
            state,
            sync_token,
        })
    }

    pub fn sync_token(&self) -> Option<&str> {
        self.sync_token.as_deref()
    }

    async fn post(&self, body: String) -> Result<String> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.sync_uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)?;

        let resp = self
            .http
            .clone()
            .oneshot(req)
            .await
            .with_context(|| format!("Request to {} failed", self.sync_uri))?;
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .context("Failed to read response body")?
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            return Err(anyhow!("Sync API returned {}: {}", status, text.trim()));
        }
        Ok(text)
    }
}

impl TaskService for TodoistClient {
    async fn fetch(&mut self) -> Result<Snapshot> {
        let token = self.sync_token.as_deref().unwrap_or(FULL_SYNC_TOKEN);
        let body = serde_json::to_string(&ReadRequest {
            sync_token: token,
            resource_types: RESOURCE_TYPES,
        })?;
        let text = self.post(body).await?;
        let resp: ReadResponse =
            serde_json::from_str(&text).context("Malformed sync response")?;

        log::debug!(
            "Sync returned {} projects, {} items, {} labels (full sync: {})",
            resp.projects.len(),
            resp.items.len(),
            resp.labels.len(),
            resp.full_sync
        );
        let next_token = resp.apply_to(&mut self.state);
        self.sync_token = Some(next_token);

        if let Some(ctx) = &self.ctx
            && let Err(e) = Cache::save(ctx.as_ref(), &self.state, self.sync_token.as_deref())
        {
            log::warn!("Could not write sync cache: {}", e);
        }
        Ok(self.state.clone())
    }

    async fn commit(&mut self, updates: Vec<LabelUpdate>) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let commands: Vec<Command> = updates.into_iter().map(Command::item_update).collect();
        let sent: Vec<String> = commands.iter().map(|c| c.uuid.clone()).collect();
        let body = serde_json::to_string(&WriteRequest { commands })?;

        let text = self.post(body).await?;
        let resp: WriteResponse =
            serde_json::from_str(&text).context("Malformed commit response")?;
        resp.check(&sent)
    }
}
