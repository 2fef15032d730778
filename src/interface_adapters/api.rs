use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::{
    Bean, Cafe, CoffeeGroundBatch, GeneratedRecommendations, Pickup, PickupStatus,
};
use crate::domain::errors::ApiError;
use crate::domain::ports::{ApiRequest, Method, RecommendationSource};
use crate::interface_adapters::protocol::{
    BeanRequest, CafeRequest, GenerateRequest, GenerateResponse, NewGroundsRequest,
    NewPickupRequest, PickupStatusRequest,
};
use crate::use_cases::client::ApiClient;

pub const GENERATE_PATH: &str = "/api/solutions/generate";

// Typed wrappers over the marketplace REST endpoints.
#[derive(Clone)]
pub struct MarketplaceApi {
    client: Arc<ApiClient>,
}

impl MarketplaceApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    // Cafes

    pub async fn list_cafes(&self) -> Result<Vec<Cafe>, ApiError> {
        self.client.data(ApiRequest::get("/api/cafes")).await
    }

    pub async fn get_cafe(&self, id: &str) -> Result<Cafe, ApiError> {
        self.client.data(ApiRequest::get(format!("/api/cafes/{id}"))).await
    }

    pub async fn my_cafe(&self) -> Result<Cafe, ApiError> {
        self.client.data(ApiRequest::get("/api/cafes/me")).await
    }

    pub async fn create_cafe(&self, cafe: &CafeRequest<'_>) -> Result<Cafe, ApiError> {
        self.client
            .data(ApiRequest::post("/api/cafes", json!(cafe)))
            .await
    }

    pub async fn update_my_cafe(&self, cafe: &CafeRequest<'_>) -> Result<Cafe, ApiError> {
        let request = ApiRequest::new(Method::Put, "/api/cafes/me").with_body(json!(cafe));
        self.client.data(request).await
    }

    pub async fn delete_cafe(&self, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/api/cafes/{id}"));
        self.client.execute(request).await
    }

    // Coffee grounds

    pub async fn list_grounds(&self) -> Result<Vec<CoffeeGroundBatch>, ApiError> {
        self.client.data(ApiRequest::get("/api/coffee_grounds")).await
    }

    pub async fn get_grounds(&self, id: &str) -> Result<CoffeeGroundBatch, ApiError> {
        self.client
            .data(ApiRequest::get(format!("/api/coffee_grounds/{id}")))
            .await
    }

    pub async fn my_grounds(&self) -> Result<Vec<CoffeeGroundBatch>, ApiError> {
        self.client
            .data(ApiRequest::get("/api/cafe/coffee_grounds"))
            .await
    }

    pub async fn register_grounds(
        &self,
        batch: &NewGroundsRequest<'_>,
    ) -> Result<CoffeeGroundBatch, ApiError> {
        self.client
            .data(ApiRequest::post("/api/cafe/coffee_grounds", json!(batch)))
            .await
    }

    pub async fn update_grounds(
        &self,
        id: &str,
        batch: &NewGroundsRequest<'_>,
    ) -> Result<CoffeeGroundBatch, ApiError> {
        let request = ApiRequest::new(Method::Put, format!("/api/cafe/coffee_grounds/{id}"))
            .with_body(json!(batch));
        self.client.data(request).await
    }

    pub async fn delete_grounds(&self, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/api/cafe/coffee_grounds/{id}"));
        self.client.execute(request).await
    }

    // Beans

    pub async fn list_beans(&self) -> Result<Vec<Bean>, ApiError> {
        self.client.data(ApiRequest::get("/api/beans")).await
    }

    pub async fn get_bean(&self, id: &str) -> Result<Bean, ApiError> {
        self.client.data(ApiRequest::get(format!("/api/beans/{id}"))).await
    }

    pub async fn create_bean(&self, bean: &BeanRequest<'_>) -> Result<Bean, ApiError> {
        self.client
            .data(ApiRequest::post("/api/beans", json!(bean)))
            .await
    }

    pub async fn delete_bean(&self, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/api/beans/{id}"));
        self.client.execute(request).await
    }

    // Pickups

    pub async fn cafe_pickups(&self) -> Result<Vec<Pickup>, ApiError> {
        self.client.data(ApiRequest::get("/api/cafe/pickups")).await
    }

    pub async fn my_pickups(&self) -> Result<Vec<Pickup>, ApiError> {
        self.client.data(ApiRequest::get("/api/pickups/my")).await
    }

    pub async fn request_pickup(&self, pickup: &NewPickupRequest<'_>) -> Result<Pickup, ApiError> {
        self.client
            .data(ApiRequest::post("/api/pickups", json!(pickup)))
            .await
    }

    pub async fn update_pickup_status(&self, id: &str, status: PickupStatus) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Patch, format!("/api/pickups/{id}/status"))
            .with_body(json!(PickupStatusRequest {
                status: status.as_str(),
            }));
        self.client.execute(request).await
    }
}

#[async_trait]
impl RecommendationSource for MarketplaceApi {
    #[tracing::instrument(name = "generate_recommendation", skip(self))]
    async fn generate(
        &self,
        purpose: &str,
        material: &str,
    ) -> Result<GeneratedRecommendations, ApiError> {
        let request = ApiRequest::post(
            GENERATE_PATH,
            json!(GenerateRequest {
                purpose,
                material_type: material,
            }),
        );
        let reply: GenerateResponse = self.client.data(request).await?;
        Ok(reply.into_recommendations())
    }
}
