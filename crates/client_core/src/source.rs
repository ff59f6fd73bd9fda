use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::DistrictId,
    error::ApiErrorBody,
    protocol::{
        boundaries_route, districts_route, hotels_route, parse_boundary, parse_districts,
        parse_hotels, parse_population_points, population_data_route, Boundary, District,
        Endpoint, Hotel, PopulationPoint, PopulationQuery,
    },
};
use tracing::debug;
use url::{ParseError, Url};

use crate::error::FetchError;

/// Read-only access to the map backend.
#[async_trait]
pub trait MapDataSource: Send + Sync {
    async fn districts(&self) -> Result<Vec<District>, FetchError>;
    async fn population(
        &self,
        year: u16,
        district: Option<&DistrictId>,
    ) -> Result<Vec<PopulationPoint>, FetchError>;
    /// `Ok(None)` when the backend has no outline for `district`.
    async fn boundary(&self, district: &DistrictId) -> Result<Option<Boundary>, FetchError>;
    async fn hotels(&self) -> Result<Vec<Hotel>, FetchError>;
}

pub struct HttpDataSource {
    http: Client,
    server_url: Url,
}

impl HttpDataSource {
    pub fn new(server_url: &str) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, FetchError> {
        let invalid = |source| FetchError::InvalidServerUrl {
            url: server_url.to_string(),
            source,
        };
        let parsed = Url::parse(server_url).map_err(invalid)?;
        // "localhost:5000" parses as scheme "localhost"; no route can be joined onto it
        if parsed.cannot_be_a_base() {
            return Err(invalid(ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            http,
            server_url: parsed,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn url(&self, route: &str) -> Result<Url, FetchError> {
        self.server_url
            .join(route)
            .map_err(|source| FetchError::InvalidServerUrl {
                url: format!("{}{route}", self.server_url),
                source,
            })
    }

    fn boundary_url(&self, district: &DistrictId) -> Result<Url, FetchError> {
        let mut url = self.url(boundaries_route())?;
        // pushed as a single segment so '/', '?' and '#' in an id stay inside it
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.push(district.as_str());
            }
            Err(()) => {
                return Err(FetchError::InvalidServerUrl {
                    url: self.server_url.to_string(),
                    source: ParseError::RelativeUrlWithCannotBeABaseBase,
                })
            }
        }
        Ok(url)
    }

    async fn get(
        &self,
        endpoint: Endpoint,
        url: Url,
        query: Option<&PopulationQuery>,
    ) -> Result<Response, FetchError> {
        debug!(%endpoint, %url, "map backend: GET");
        let mut request = self.http.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        request
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })
    }

    async fn body(endpoint: Endpoint, response: Response) -> Result<Vec<u8>, FetchError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;
        if !status.is_success() {
            return Err(status_error(endpoint, status, &bytes));
        }
        Ok(bytes.to_vec())
    }
}

fn status_error(endpoint: Endpoint, status: StatusCode, body: &[u8]) -> FetchError {
    let detail = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .map(|body| body.error);
    FetchError::Status {
        endpoint,
        status,
        detail,
    }
}

#[async_trait]
impl MapDataSource for HttpDataSource {
    async fn districts(&self) -> Result<Vec<District>, FetchError> {
        let endpoint = Endpoint::Districts;
        let response = self.get(endpoint, self.url(districts_route())?, None).await?;
        let body = Self::body(endpoint, response).await?;
        Ok(parse_districts(&body)?)
    }

    async fn population(
        &self,
        year: u16,
        district: Option<&DistrictId>,
    ) -> Result<Vec<PopulationPoint>, FetchError> {
        let endpoint = Endpoint::PopulationData;
        let query = PopulationQuery {
            year,
            district: district.cloned(),
        };
        let response = self
            .get(endpoint, self.url(population_data_route())?, Some(&query))
            .await?;
        let body = Self::body(endpoint, response).await?;
        Ok(parse_population_points(&body)?)
    }

    async fn boundary(&self, district: &DistrictId) -> Result<Option<Boundary>, FetchError> {
        let endpoint = Endpoint::Boundaries;
        let response = self
            .get(endpoint, self.boundary_url(district)?, None)
            .await?;
        // any non-2xx here means "no outline for this district"
        if !response.status().is_success() {
            debug!(%district, status = %response.status(), "map backend: no boundary");
            return Ok(None);
        }
        let body = Self::body(endpoint, response).await?;
        Ok(Some(parse_boundary(&body)?))
    }

    async fn hotels(&self) -> Result<Vec<Hotel>, FetchError> {
        let endpoint = Endpoint::Hotels;
        let response = self.get(endpoint, self.url(hotels_route())?, None).await?;
        let body = Self::body(endpoint, response).await?;
        Ok(parse_hotels(&body)?)
    }
}
