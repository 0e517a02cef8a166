//! Pet API endpoints

use crate::client::PetstoreClient;
use crate::error::ApiResult;
use crate::exchange::ApiResponse;
use crate::models::{Pet, PetStatus};
use tracing::info;

const PET_ENDPOINT: &str = "/pet";
const PET_BY_ID: &str = "/pet/{petId}";
const FIND_BY_STATUS: &str = "/pet/findByStatus";

/// Pet API interface
#[derive(Clone, Debug)]
pub struct PetApi {
    client: PetstoreClient,
}

impl PetApi {
    /// Create a new pet API interface
    pub(crate) fn new(client: PetstoreClient) -> Self {
        Self { client }
    }

    /// Create a new pet
    ///
    /// POST /pet
    pub async fn create(&self, pet: &Pet) -> ApiResult<ApiResponse> {
        info!(name = %pet.name, "Creating pet");
        self.client.spec().json(pet).post(PET_ENDPOINT).await
    }

    /// Update an existing pet
    ///
    /// PUT /pet
    pub async fn update(&self, pet: &Pet) -> ApiResult<ApiResponse> {
        info!(pet_id = ?pet.id, "Updating pet");
        self.client.spec().json(pet).put(PET_ENDPOINT).await
    }

    /// Get a pet by ID
    ///
    /// GET /pet/{petId}
    pub async fn get_by_id(&self, pet_id: i64) -> ApiResult<ApiResponse> {
        info!(pet_id, "Getting pet");
        self.client
            .spec()
            .path_param("petId", pet_id)
            .get(PET_BY_ID)
            .await
    }

    /// Delete a pet
    ///
    /// DELETE /pet/{petId}
    pub async fn delete(&self, pet_id: i64) -> ApiResult<ApiResponse> {
        info!(pet_id, "Deleting pet");
        self.client
            .spec()
            .path_param("petId", pet_id)
            .delete(PET_BY_ID)
            .await
    }

    /// Find pets by status
    ///
    /// GET /pet/findByStatus?status=<status>
    pub async fn find_by_status(&self, status: PetStatus) -> ApiResult<ApiResponse> {
        info!(%status, "Finding pets by status");
        self.client
            .spec()
            .query_param("status", status)
            .get(FIND_BY_STATUS)
            .await
    }
}
