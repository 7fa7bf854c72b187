//! HTTP client for the CMS REST API.
//!
//! One [`CmsClient`] is built per execution context. The bearer token for
//! that context is installed as a default header, so individual calls only
//! build the path and query string.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use campus_core::{
    AssetPolicy, ContentId, ContentItem, ContentKind, FormKind, LeadSubmission, ListQuery,
    NormalizeContext, Page, build_list_query, build_slug_query, normalize_page, normalize_single,
};

use crate::config::{ClientConfig, ExecutionContext};
use crate::error::{CmsError, CmsResult};
use crate::repository::ContentSource;

/// Acknowledgement returned by the CMS for a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReceipt {
    pub form: FormKind,
    /// Id of the stored submission, when the CMS returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContentId>,
}

/// Write payloads travel as `{ "data": { ... } }`.
#[derive(Serialize)]
struct DataEnvelope<'a, T> {
    data: &'a T,
}

/// Client for one CMS endpoint.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    base_url: Url,
    assets: AssetPolicy,
    context: ExecutionContext,
}

impl CmsClient {
    /// Build a client for the given execution context.
    pub fn new(config: &ClientConfig, context: ExecutionContext) -> CmsResult<Self> {
        let endpoint = config.endpoint(context);

        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(token) = &endpoint.token {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| CmsError::config(format!("invalid token value: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let http = builder
            .build()
            .map_err(|e| CmsError::config(format!("could not build HTTP client: {}", e)))?;

        let mut base_url = endpoint.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            assets: config.asset_policy(context),
            context,
        })
    }

    /// Execution context this client was built for.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_context(&self, kind: ContentKind) -> NormalizeContext {
        NormalizeContext::new(kind).with_assets(self.assets.clone())
    }

    fn api_url(&self, path: &str, query: Option<&str>) -> CmsResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("api/{}", path))
            .map_err(|e| CmsError::config(format!("invalid CMS path {}: {}", path, e)))?;
        url.set_query(query);
        Ok(url)
    }

    /// Send a request and return its JSON body.
    ///
    /// Every failure comes back as a [`CmsError`]; an empty success body is
    /// returned as `null`.
    async fn send(&self, request: reqwest::RequestBuilder) -> CmsResult<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "CMS request failed");
            CmsError::from(e)
        })?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = CmsError::from_response(status.as_u16(), &body);
            tracing::warn!(status = err.status, message = %err.message, "CMS returned an error");
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch one listing page.
    pub async fn list(&self, kind: ContentKind, query: &ListQuery) -> CmsResult<Page<ContentItem>> {
        let qs = build_list_query(kind, query);
        let url = self.api_url(kind.collection(), Some(&qs))?;
        tracing::debug!(%kind, page = query.page, "fetching listing");

        let body = self.send(self.http.get(url)).await?;
        Ok(normalize_page(body, &self.normalize_context(kind))?)
    }

    /// Look up one item by slug; `Ok(None)` when nothing matches.
    pub async fn find_by_slug(&self, kind: ContentKind, slug: &str) -> CmsResult<Option<ContentItem>> {
        let qs = build_slug_query(slug);
        let url = self.api_url(kind.collection(), Some(&qs))?;
        tracing::debug!(%kind, slug, "fetching detail");

        let body = self.send(self.http.get(url)).await?;
        Ok(normalize_single(body, &self.normalize_context(kind))?)
    }

    /// Ask the CMS to bump the view counter of one item.
    pub async fn increment_view_count(&self, kind: ContentKind, id: ContentId) -> CmsResult<()> {
        let url = self.api_url(&format!("{}/{}/views", kind.collection(), id), None)?;
        self.send(self.http.put(url)).await?;
        Ok(())
    }

    /// Store a form submission, wrapped in the CMS's `data` envelope.
    ///
    /// Callers are expected to have run [`LeadSubmission::validate`].
    pub async fn submit_form(&self, form: FormKind, lead: &LeadSubmission) -> CmsResult<FormReceipt> {
        let url = self.api_url(form.endpoint(), None)?;
        let body = self
            .send(self.http.post(url).json(&DataEnvelope { data: lead }))
            .await?;

        let id = body
            .get("data")
            .and_then(|data| data.get("id"))
            .and_then(Value::as_u64)
            .map(ContentId);
        tracing::info!(form = form.endpoint(), ?id, "form submission stored");

        Ok(FormReceipt { form, id })
    }
}

impl ContentSource for CmsClient {
    async fn fetch_page(&self, kind: ContentKind, query: &ListQuery) -> CmsResult<Page<ContentItem>> {
        self.list(kind, query).await
    }

    async fn fetch_by_slug(&self, kind: ContentKind, slug: &str) -> CmsResult<Option<ContentItem>> {
        self.find_by_slug(kind, slug).await
    }

    async fn increment_views(&self, kind: ContentKind, id: ContentId) -> CmsResult<()> {
        self.increment_view_count(kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> CmsClient {
        let config = ClientConfig::new(Url::parse(base).unwrap(), Some("secret".into()));
        CmsClient::new(&config, ExecutionContext::Server).unwrap()
    }

    #[test]
    fn api_urls_keep_base_path() {
        let c = client("https://example.edu/cms");
        let url = c.api_url("blogs", Some("a=1")).unwrap();
        assert_eq!(url.as_str(), "https://example.edu/cms/api/blogs?a=1");

        let c = client("https://cms.example.edu");
        let url = c.api_url("events/4/views", None).unwrap();
        assert_eq!(url.as_str(), "https://cms.example.edu/api/events/4/views");
    }

    #[test]
    fn invalid_token_is_a_config_error() {
        let config = ClientConfig::new(
            Url::parse("https://cms.example.edu").unwrap(),
            Some("line\nbreak".into()),
        );
        let err = CmsClient::new(&config, ExecutionContext::Server).unwrap_err();
        assert_eq!(err.kind, crate::error::CmsErrorKind::Config);
    }

    #[test]
    fn remembers_context() {
        let config = ClientConfig::new(Url::parse("https://cms.example.edu").unwrap(), None);
        let c = CmsClient::new(&config, ExecutionContext::Browser).unwrap();
        assert_eq!(c.context(), ExecutionContext::Browser);
    }
}
