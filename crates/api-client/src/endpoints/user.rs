//! User API endpoints

use crate::client::PetstoreClient;
use crate::error::ApiResult;
use crate::exchange::ApiResponse;
use crate::models::User;
use tracing::info;

const USER_ENDPOINT: &str = "/user";
const USER_BY_NAME: &str = "/user/{username}";
const LOGIN_ENDPOINT: &str = "/user/login";
const LOGOUT_ENDPOINT: &str = "/user/logout";

/// User API interface
#[derive(Clone, Debug)]
pub struct UserApi {
    client: PetstoreClient,
}

impl UserApi {
    /// Create a new user API interface
    pub(crate) fn new(client: PetstoreClient) -> Self {
        Self { client }
    }

    /// Create a user
    ///
    /// POST /user
    pub async fn create(&self, user: &User) -> ApiResult<ApiResponse> {
        info!(username = %user.username, "Creating user");
        self.client.spec().json(user).post(USER_ENDPOINT).await
    }

    /// Get a user by username
    ///
    /// GET /user/{username}
    pub async fn get(&self, username: &str) -> ApiResult<ApiResponse> {
        info!(username, "Getting user");
        self.client
            .spec()
            .path_param("username", username)
            .get(USER_BY_NAME)
            .await
    }

    /// Replace a user
    ///
    /// PUT /user/{username}
    pub async fn update(&self, username: &str, user: &User) -> ApiResult<ApiResponse> {
        info!(username, "Updating user");
        self.client
            .spec()
            .path_param("username", username)
            .json(user)
            .put(USER_BY_NAME)
            .await
    }

    /// Delete a user
    ///
    /// DELETE /user/{username}
    pub async fn delete(&self, username: &str) -> ApiResult<ApiResponse> {
        info!(username, "Deleting user");
        self.client
            .spec()
            .path_param("username", username)
            .delete(USER_BY_NAME)
            .await
    }

    /// Log a user in
    ///
    /// GET /user/login?username=<username>&password=<password>
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<ApiResponse> {
        info!(username, "User login attempt");
        self.client
            .spec()
            .query_param("username", username)
            .query_param("password", password)
            .get(LOGIN_ENDPOINT)
            .await
    }

    /// Log the current session out
    ///
    /// GET /user/logout
    pub async fn logout(&self) -> ApiResult<ApiResponse> {
        info!("User logout");
        self.client.spec().get(LOGOUT_ENDPOINT).await
    }
}
