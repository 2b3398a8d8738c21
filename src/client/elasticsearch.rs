//! Elasticsearch REST client
//!
//! HTTP client for the cluster statistics endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{ClientError, StatsSource};

/// Store, docs, segment and heap cache metrics per index
const INDEX_STATS_METRICS: &str = "store,docs,segments,fielddata,query_cache,request_cache";

const SETTINGS_FILTER: &str = "**.settings.index.number_of_shards,\
**.settings.index.number_of_replicas,\
**.settings.index.auto_expand_replicas";

const NODES_FILTER: &str = "nodes.*.roles,\
nodes.*.jvm.mem.heap_max_in_bytes,\
nodes.*.fs.total.total_in_bytes";

/// Connection settings for a cluster
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    pub host: String,
    pub port: u16,
    /// Use HTTPS
    pub ssl: bool,
    /// Skip TLS certificate verification
    pub insecure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            ssl: false,
            insecure: false,
            user: None,
            password: None,
            request_timeout_secs: 30,
        }
    }
}

impl ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Elasticsearch REST API client
pub struct ElasticsearchClient {
    client: Client,
    config: ElasticsearchConfig,
}

impl ElasticsearchClient {
    /// Create a new client with the given configuration
    pub fn new(config: ElasticsearchConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.ssl && config.insecure)
            .user_agent(concat!("es-impact/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// GET a JSON document
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.config.base_url(), path);

        let mut request = self.client.get(&url).query(query);
        if let Some(user) = &self.config.user {
            request = request.basic_auth(user, self.config.password.as_deref());
        }

        tracing::debug!(url = %url, "Fetching cluster document");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else if e.is_connect() {
                ClientError::Unavailable(self.config.base_url())
            } else {
                ClientError::Request(e)
            }
        })?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl StatsSource for ElasticsearchClient {
    fn describe(&self) -> String {
        self.config.base_url()
    }

    async fn index_stats(&self) -> Result<Value, ClientError> {
        self.get_json(
            "/_stats",
            &[("metric", INDEX_STATS_METRICS), ("level", "indices")],
        )
        .await
    }

    async fn index_settings(&self) -> Result<Value, ClientError> {
        self.get_json("/_settings", &[("filter_path", SETTINGS_FILTER)])
            .await
    }

    async fn node_stats(&self) -> Result<Value, ClientError> {
        self.get_json("/_nodes/stats/jvm,fs", &[("filter_path", NODES_FILTER)])
            .await
    }
}
