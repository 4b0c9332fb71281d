use std::time::Duration;

use log::{info, warn};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{
    error::FetchError,
    mock_data::MockProvider,
    models::{
        teacher_model::{TeacherDetails, TeacherDetailsPatch, TeacherSnapshot},
        Config,
    },
};

/// Simulated latency of offline calls, so loading states stay visible.
pub const FETCH_ALL_DELAY: Duration = Duration::from_millis(1000);
pub const FETCH_DETAILS_DELAY: Duration = Duration::from_millis(500);
pub const UPDATE_DETAILS_DELAY: Duration = Duration::from_millis(800);

/// A trait, necessary for every entity that will be used for getting teacher data.
///
/// Implementations never fail because of the network: they fall back to mock data
/// (or echo the submitted patch) instead. The only error that comes out is
/// [`FetchError::Fallback`], when the fallback data itself is unavailable.
#[allow(async_fn_in_trait)]
pub trait TeacherFetcher {
    async fn fetch_all(&self, teacher_id: &str) -> Result<TeacherSnapshot, FetchError>;
    async fn fetch_details(&self, teacher_id: &str) -> Result<TeacherDetails, FetchError>;
    async fn update_details(
        &self,
        patch: TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError>;
}

/// Talks to the teacher API over HTTP.
pub struct RemoteFetcher {
    http_client: Client,
    base_url: String,
    timeout: Duration,
    fallback: MockProvider,
}

impl RemoteFetcher {
    pub fn new(base_url: &str, timeout: Duration, fallback: MockProvider) -> Self {
        Self::with_client(Client::new(), base_url, timeout, fallback)
    }

    pub fn with_client(
        http_client: Client,
        base_url: &str,
        timeout: Duration,
        fallback: MockProvider,
    ) -> Self {
        RemoteFetcher {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
            fallback,
        }
    }

    async fn send_for_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchError> {
        let response = request.send().await.map_err(FetchError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status));
        }
        let body = response.text().await.map_err(FetchError::Network)?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn try_fetch_all(&self, teacher_id: &str) -> Result<TeacherSnapshot, FetchError> {
        let request_url = format!("{}/{}", self.base_url, teacher_id);
        let request = self
            .http_client
            .get(request_url)
            .header(CONTENT_TYPE, "application/json");
        tokio::time::timeout(self.timeout, Self::send_for_json(request))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn try_fetch_details(&self, teacher_id: &str) -> Result<TeacherDetails, FetchError> {
        let request_url = format!("{}/{}/details", self.base_url, teacher_id);
        Self::send_for_json(self.http_client.get(request_url)).await
    }

    async fn try_update_details(
        &self,
        teacher_id: &str,
        patch: &TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError> {
        let request_url = format!("{}/{}", self.base_url, teacher_id);
        Self::send_for_json(self.http_client.put(request_url).json(patch)).await
    }
}

/// Allows RemoteFetcher to get teacher data from the API, falling back to mock data.
impl TeacherFetcher for RemoteFetcher {
    async fn fetch_all(&self, teacher_id: &str) -> Result<TeacherSnapshot, FetchError> {
        info!("Getting teacher data for {}", teacher_id);
        match self.try_fetch_all(teacher_id).await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                warn!("API fetch failed, using mock data: {}", err);
                self.fallback.snapshot()
            }
        }
    }

    async fn fetch_details(&self, teacher_id: &str) -> Result<TeacherDetails, FetchError> {
        info!("Getting teacher details for {}", teacher_id);
        match self.try_fetch_details(teacher_id).await {
            Ok(details) => Ok(details),
            Err(err) => {
                warn!("API fetch failed, using mock data: {}", err);
                self.fallback.details()
            }
        }
    }

    async fn update_details(
        &self,
        patch: TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError> {
        let Some(teacher_id) = patch.id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("Details update has no teacher id, updating local store only");
            return Ok(patch);
        };
        info!("Updating teacher details for {}", teacher_id);
        match self.try_update_details(teacher_id, &patch).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                warn!("API update failed, updating local store only: {}", err);
                Ok(patch)
            }
        }
    }
}

/// Serves mock data without touching the network.
pub struct OfflineFetcher {
    fallback: MockProvider,
    simulate_latency: bool,
}

impl OfflineFetcher {
    pub fn new(fallback: MockProvider, simulate_latency: bool) -> Self {
        OfflineFetcher {
            fallback,
            simulate_latency,
        }
    }

    async fn pause(&self, delay: Duration) {
        if self.simulate_latency {
            tokio::time::sleep(delay).await;
        }
    }
}

impl TeacherFetcher for OfflineFetcher {
    async fn fetch_all(&self, teacher_id: &str) -> Result<TeacherSnapshot, FetchError> {
        info!("No API URL provided, using mock data for {}", teacher_id);
        self.pause(FETCH_ALL_DELAY).await;
        self.fallback.snapshot()
    }

    async fn fetch_details(&self, teacher_id: &str) -> Result<TeacherDetails, FetchError> {
        info!("No API URL provided, using mock details for {}", teacher_id);
        self.pause(FETCH_DETAILS_DELAY).await;
        self.fallback.details()
    }

    async fn update_details(
        &self,
        patch: TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError> {
        info!("No API URL provided, updating local store only");
        self.pause(UPDATE_DETAILS_DELAY).await;
        Ok(patch)
    }
}

/// The fetcher picked by [`Config`]: remote when an endpoint is set, offline otherwise.
pub enum ProfileFetcher {
    Remote(RemoteFetcher),
    Offline(OfflineFetcher),
}

impl ProfileFetcher {
    pub fn from_config(config: &Config) -> Self {
        let fallback = match &config.fixture_path {
            Some(path) => MockProvider::from_fixture(path.clone()),
            None => MockProvider::builtin(),
        };
        match config.endpoint() {
            Some(base_url) => {
                info!("Using teacher API at {}", base_url);
                ProfileFetcher::Remote(RemoteFetcher::new(
                    base_url,
                    config.request_timeout(),
                    fallback,
                ))
            }
            None => {
                info!("No teacher API configured, working offline");
                ProfileFetcher::Offline(OfflineFetcher::new(fallback, config.simulate_latency))
            }
        }
    }
}

impl TeacherFetcher for ProfileFetcher {
    async fn fetch_all(&self, teacher_id: &str) -> Result<TeacherSnapshot, FetchError> {
        match self {
            ProfileFetcher::Remote(fetcher) => fetcher.fetch_all(teacher_id).await,
            ProfileFetcher::Offline(fetcher) => fetcher.fetch_all(teacher_id).await,
        }
    }

    async fn fetch_details(&self, teacher_id: &str) -> Result<TeacherDetails, FetchError> {
        match self {
            ProfileFetcher::Remote(fetcher) => fetcher.fetch_details(teacher_id).await,
            ProfileFetcher::Offline(fetcher) => fetcher.fetch_details(teacher_id).await,
        }
    }

    async fn update_details(
        &self,
        patch: TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError> {
        match self {
            ProfileFetcher::Remote(fetcher) => fetcher.update_details(patch).await,
            ProfileFetcher::Offline(fetcher) => fetcher.update_details(patch).await,
        }
    }
}
