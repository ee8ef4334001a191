use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GiftItemDoc {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub link: String,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GiftListDoc {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub birthday: String,
    pub items: Vec<GiftItemDoc>,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

#[derive(Serialize, ToSchema)]
pub struct NewListRequest {
    pub name: String,
    pub creator: String,
    /// YYYY-MM-DD
    pub birthday: String,
}

#[derive(Serialize, ToSchema)]
pub struct ListPatchDoc {
    pub name: Option<String>,
    pub creator: Option<String>,
    /// YYYY-MM-DD
    pub birthday: Option<String>,
    pub items: Option<Vec<GiftItemDoc>>,
    /// Apply only if the stored list still has this version.
    pub version: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct NewItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub link: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub claimed_by: Option<String>,
    pub anonymous: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::lists::create_list,
        crate::routes::lists::get_list,
        crate::routes::lists::update_list,
        crate::routes::lists::add_item,
        crate::routes::lists::remove_item,
        crate::routes::lists::claim_item,
        crate::routes::lists::unclaim_item,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            GiftItemDoc,
            GiftListDoc,
            NewListRequest,
            ListPatchDoc,
            NewItemRequest,
            ClaimRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "lists"),
        (name = "items")
    )
)]
pub struct ApiDoc;
