//! Store API endpoints

use crate::client::PetstoreClient;
use crate::error::ApiResult;
use crate::exchange::ApiResponse;
use crate::models::Order;
use tracing::info;

const ORDER_ENDPOINT: &str = "/store/order";
const ORDER_BY_ID: &str = "/store/order/{orderId}";
const INVENTORY_ENDPOINT: &str = "/store/inventory";

/// Store API interface
#[derive(Clone, Debug)]
pub struct StoreApi {
    client: PetstoreClient,
}

impl StoreApi {
    /// Create a new store API interface
    pub(crate) fn new(client: PetstoreClient) -> Self {
        Self { client }
    }

    /// Place a new order
    ///
    /// POST /store/order
    pub async fn place_order(&self, order: &Order) -> ApiResult<ApiResponse> {
        info!(order_id = ?order.id, pet_id = ?order.pet_id, "Placing order");
        self.client.spec().json(order).post(ORDER_ENDPOINT).await
    }

    /// Get an order by ID
    ///
    /// GET /store/order/{orderId}
    pub async fn get_order(&self, order_id: i64) -> ApiResult<ApiResponse> {
        info!(order_id, "Getting order");
        self.client
            .spec()
            .path_param("orderId", order_id)
            .get(ORDER_BY_ID)
            .await
    }

    /// Delete an order
    ///
    /// DELETE /store/order/{orderId}
    pub async fn delete_order(&self, order_id: i64) -> ApiResult<ApiResponse> {
        info!(order_id, "Deleting order");
        self.client
            .spec()
            .path_param("orderId", order_id)
            .delete(ORDER_BY_ID)
            .await
    }

    /// Pet counts keyed by status
    ///
    /// GET /store/inventory
    pub async fn inventory(&self) -> ApiResult<ApiResponse> {
        info!("Getting store inventory");
        self.client.spec().get(INVENTORY_ENDPOINT).await
    }
}
