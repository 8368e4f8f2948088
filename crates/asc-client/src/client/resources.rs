//! Resource fetching for the API client.

use std::time::Duration;

use asc_core::{BuildRunStatus, RequestContext};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpBackend;
use crate::models::{CiBuildRunAttributes, Document, ListDocument, Resource};
use crate::pagination::{PaginationOptions, aggregate};
use crate::poll::{WaitError, wait_for_completion};
use crate::retry::{RetryPolicy, execute};
use crate::url::{build_resource_url, build_run_url, resolve_next_link, with_limit};

use super::ApiClient;

impl<B: HttpBackend> ApiClient<B> {
    /// Fetch any JSON document at a resource path, once.
    pub async fn get_document<T>(&self, ctx: &RequestContext, path: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let url = build_resource_url(&self.base_url, path)?;
        self.backend.get_json(ctx, &url).await
    }

    /// Fetch the first page of a collection, once.
    pub async fn list_page<T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        limit: Option<u32>,
    ) -> ClientResult<ListDocument<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.collection_url(path, limit)?;
        self.backend.get_json(ctx, &url).await
    }

    /// Fetch the page a `links.next` value points at, once.
    pub async fn fetch_page<T>(&self, ctx: &RequestContext, link: &str) -> ClientResult<ListDocument<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = resolve_next_link(&self.base_url, link)?;
        self.backend.get_json(ctx, &url).await
    }

    /// Fetch every page of a collection into one page with no next link.
    ///
    /// Each page fetch, the first included, goes through the retry executor.
    pub async fn list_all<T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        limit: Option<u32>,
        policy: &RetryPolicy,
        options: &PaginationOptions,
    ) -> ClientResult<ListDocument<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.collection_url(path, limit)?;
        let first = self.get_with_retry(ctx, policy, &url).await?;

        let all = aggregate(first, options, move |link: String| async move {
            self.fetch_page_with_retry(ctx, policy, &link).await
        })
        .await?;

        debug!(path, items = all.data.len(), "Fetched all pages");
        Ok(all)
    }

    /// Fetch a build run's current status, once.
    pub async fn get_build_run(&self, ctx: &RequestContext, id: &str) -> ClientResult<BuildRunStatus> {
        let url = build_run_url(&self.base_url, id)?;
        let doc: Document<Resource<CiBuildRunAttributes>> = self.backend.get_json(ctx, &url).await?;
        Ok(doc.data.into())
    }

    /// Poll a build run every `interval` until it is complete.
    ///
    /// Each status fetch is retried per `policy`; the wait as a whole is
    /// bounded by `ctx`. A completed run is returned whatever its outcome.
    pub async fn wait_for_build_run(
        &self,
        ctx: &RequestContext,
        id: &str,
        interval: Duration,
        policy: &RetryPolicy,
    ) -> Result<BuildRunStatus, WaitError<BuildRunStatus, ClientError>> {
        info!(build_run = id, interval_secs = interval.as_secs(), "Waiting for build run");

        wait_for_completion(
            ctx,
            interval,
            move || async move {
                execute(ctx, policy, move || async move {
                    self.get_build_run(ctx, id).await.map_err(ClientError::into_retry)
                })
                .await
            },
            BuildRunStatus::is_complete,
        )
        .await
    }

    fn collection_url(&self, path: &str, limit: Option<u32>) -> ClientResult<Url> {
        let url = build_resource_url(&self.base_url, path)?;
        Ok(match limit {
            Some(limit) => with_limit(&url, limit),
            None => url,
        })
    }

    async fn fetch_page_with_retry<T>(
        &self,
        ctx: &RequestContext,
        policy: &RetryPolicy,
        link: &str,
    ) -> ClientResult<ListDocument<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = resolve_next_link(&self.base_url, link)?;
        self.get_with_retry(ctx, policy, &url).await
    }

    async fn get_with_retry<T>(&self, ctx: &RequestContext, policy: &RetryPolicy, url: &Url) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        execute(ctx, policy, move || async move {
            self.backend.get_json(ctx, url).await.map_err(ClientError::into_retry)
        })
        .await
    }
}
