//! Open Tree of Life v3 API client.

use crate::open_tree::{
    domain::{LineageRow, NameMatch, OttId},
    ports::{NameResolution, TaxonomyService, TaxonomyServiceError, TaxonomyServiceResult},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

/// Public Open Tree of Life API root.
pub const DEFAULT_BASE_URL: &str = "https://api.opentreeoflife.org/v3";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Taxonomy service backed by the Open Tree of Life HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTaxonomyService {
    client: reqwest::Client,
    base_url: String,
    approximate_matching: bool,
}

impl HttpTaxonomyService {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyServiceError::Transport`] when the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        approximate_matching: bool,
        timeout: Duration,
    ) -> TaxonomyServiceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| TaxonomyServiceError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            approximate_matching,
        })
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> TaxonomyServiceResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, "querying Open Tree of Life");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| TaxonomyServiceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaxonomyServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|err| TaxonomyServiceError::Decode(err.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct MatchNamesRequest<'a> {
    names: &'a [String],
    do_approximate_matching: bool,
}

#[derive(Debug, Deserialize)]
struct MatchNamesResponse {
    results: Vec<MatchResult>,
    taxonomy: TaxonomyDescriptor,
}

#[derive(Debug, Deserialize)]
struct TaxonomyDescriptor {
    version: String,
}

#[derive(Debug, Deserialize)]
struct MatchResult {
    matches: Vec<MatchRecord>,
}

#[derive(Debug, Deserialize)]
struct MatchRecord {
    search_string: String,
    matched_name: String,
    score: f64,
    is_synonym: bool,
    is_approximate_match: bool,
    taxon: TaxonRecord,
}

#[derive(Debug, Deserialize)]
struct TaxonRecord {
    ott_id: u64,
    name: String,
    #[serde(default)]
    rank: String,
}

#[derive(Debug, Serialize)]
struct TaxonInfoRequest {
    ott_id: u64,
    include_lineage: bool,
}

#[derive(Debug, Deserialize)]
struct TaxonInfoResponse {
    #[serde(flatten)]
    taxon: TaxonRecord,
    #[serde(default)]
    lineage: Vec<TaxonRecord>,
}

fn resolution_from_response(response: MatchNamesResponse) -> NameResolution {
    let matches = response
        .results
        .into_iter()
        .flat_map(|result| result.matches)
        .map(|record| NameMatch {
            search_string: record.search_string,
            matched_name: record.matched_name,
            ott_id: OttId::new(record.taxon.ott_id),
            score: record.score,
            is_synonym: record.is_synonym,
            is_approximate_match: record.is_approximate_match,
        })
        .collect();
    NameResolution {
        taxonomy_version: response.taxonomy.version,
        matches,
    }
}

fn lineage_from_response(query: OttId, response: TaxonInfoResponse) -> Vec<LineageRow> {
    std::iter::once(response.taxon)
        .chain(response.lineage)
        .map(|record| LineageRow {
            query,
            rank: record.rank,
            name: record.name,
        })
        .collect()
}

#[async_trait]
impl TaxonomyService for HttpTaxonomyService {
    async fn match_names(&self, names: &[String]) -> TaxonomyServiceResult<NameResolution> {
        let request = MatchNamesRequest {
            names,
            do_approximate_matching: self.approximate_matching,
        };
        let response: MatchNamesResponse = self.post("tnrs/match_names", &request).await?;
        Ok(resolution_from_response(response))
    }

    async fn lineage(&self, ott_id: OttId) -> TaxonomyServiceResult<Vec<LineageRow>> {
        let request = TaxonInfoRequest {
            ott_id: ott_id.value(),
            include_lineage: true,
        };
        let response: TaxonInfoResponse = self.post("taxonomy/taxon_info", &request).await?;
        Ok(lineage_from_response(ott_id, response))
    }
}
