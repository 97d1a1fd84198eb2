// Identity mapping endpoints
//
// Create a user -> source IP binding, delete one by id, or delete every
// binding an agent reported. Each call is a single request through the
// token-bearing session client.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace};

use crate::client::IdentityClient;
use crate::error::Error;
use crate::models::{IdentityMapping, MappingRecord};

// Relative to the base URL so a path prefix on it survives the join.
pub const USER_IDENTITY_PATH: &str = "api/identity/v1/identity/useridentity";
pub const DELETE_BY_AGENT_PATH: &str = "api/identity/v1/identity/useridentity/deleteby";

impl IdentityClient {
    /// Create an identity mapping.
    ///
    /// Success is exactly HTTP 201; the response body is returned as-is.
    pub async fn add_identity_mapping(
        &self,
        mapping: &IdentityMapping,
    ) -> Result<MappingRecord, Error> {
        let http = self.session_http()?;
        let url = self.url(USER_IDENTITY_PATH)?;
        debug!(user = %mapping.user, src_ip = %mapping.src_ip_address, "POST {url}");
        trace!(?mapping, "identity mapping body");

        let resp = http
            .post(url)
            .json(mapping)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.expect_json(resp, StatusCode::CREATED)
            .await
            .map(MappingRecord)
    }

    /// Delete one mapping by its id. Success is exactly HTTP 200.
    pub async fn delete_identity_mapping_by_id(&self, mapping_id: &str) -> Result<Value, Error> {
        let http = self.session_http()?;
        let mut url = self.url(USER_IDENTITY_PATH)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(mapping_id);
        debug!("DELETE {url}");

        let resp = http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.expect_json(resp, StatusCode::OK).await
    }

    /// Delete every mapping reported by `agent_id`. Success is exactly HTTP 200.
    pub async fn delete_all_identity_mappings_by_agent_id(
        &self,
        agent_id: &str,
    ) -> Result<Value, Error> {
        let http = self.session_http()?;
        let url = self.url(DELETE_BY_AGENT_PATH)?;
        debug!("DELETE {url} agent_id={agent_id}");

        let resp = http
            .delete(url)
            .query(&[("agent_id", agent_id)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.expect_json(resp, StatusCode::OK).await
    }
}
