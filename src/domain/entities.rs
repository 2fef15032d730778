use serde::{Deserialize, Serialize};

// A registered cafe; coordinates drive the collection-point map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cafe {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// Waste coffee grounds a cafe has put up for collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeGroundBatch {
    pub id: String,
    pub cafe_id: String,
    pub amount_kg: f64,
    #[serde(default)]
    pub bean_origin: Option<String>,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// Bean catalogue entry used for marketplace listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bean {
    pub id: String,
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub roast_level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl PickupStatus {
    // pending -> accepted | rejected, accepted -> completed.
    pub fn can_transition_to(self, next: PickupStatus) -> bool {
        matches!(
            (self, next),
            (PickupStatus::Pending, PickupStatus::Accepted)
                | (PickupStatus::Pending, PickupStatus::Rejected)
                | (PickupStatus::Accepted, PickupStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Accepted => "accepted",
            PickupStatus::Rejected => "rejected",
            PickupStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(PickupStatus::Pending),
            "accepted" => Some(PickupStatus::Accepted),
            "rejected" => Some(PickupStatus::Rejected),
            "completed" => Some(PickupStatus::Completed),
            _ => None,
        }
    }
}

// A consumer's request to collect grounds from a cafe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub id: String,
    pub cafe_id: String,
    #[serde(default)]
    pub cafe_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub amount_kg: Option<f64>,
    pub scheduled_at: String,
    pub status: PickupStatus,
    #[serde(default)]
    pub note: Option<String>,
}

// Backend-generated reuse suggestion. Displayed as-is, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Recommendation {
    // Locally synthesized result shown when the backend returns nothing usable.
    pub fn fallback(purpose: &str, material: &str) -> Self {
        Self {
            id: "fallback".to_string(),
            title: format!("{material} 커피박으로 만드는 {purpose}"),
            description: format!(
                "{material} 원두에서 나온 커피박을 활용해 {purpose}을(를) 만드는 기본 방법입니다."
            ),
            tags: vec![purpose.to_string(), material.to_string(), "커피박".to_string()],
            difficulty: "쉬움".to_string(),
            duration: "30분".to_string(),
            materials: vec![
                "건조한 커피박 200g".to_string(),
                "통기성 있는 용기".to_string(),
            ],
            steps: vec![
                "커피박을 햇볕이나 오븐에서 완전히 건조합니다.".to_string(),
                "건조한 커피박을 용기에 담습니다.".to_string(),
                format!("{purpose} 용도에 맞는 위치에 두고 2주마다 교체합니다."),
            ],
        }
    }

    // Results with no title carry nothing to display.
    pub fn is_displayable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

// Generator output; `primary` is None when the reply carried nothing usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRecommendations {
    pub primary: Option<Recommendation>,
    pub alternates: Vec<Recommendation>,
}
