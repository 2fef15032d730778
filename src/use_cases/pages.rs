use crate::domain::entities::{Bean, Cafe, CoffeeGroundBatch, Pickup, PickupStatus};
use crate::domain::errors::{ApiError, ValidationErrors};
use crate::domain::ports::{Notification, Notifier};
use crate::domain::text::Text;
use crate::interface_adapters::api::MarketplaceApi;
use crate::interface_adapters::protocol::{CafeRequest, NewGroundsRequest, NewPickupRequest};

// Pages degrade to empty lists on failure; this turns an error into a toast.
fn or_notify<T: Default>(
    result: Result<T, ApiError>,
    notifier: &dyn Notifier,
    key: &'static str,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, key, "page data failed to load");
            notifier.notify(failure(key, &err));
            T::default()
        }
    }
}

fn failure(key: &'static str, err: &ApiError) -> Notification {
    Notification::error(Text::key(key).with_arg("error", err.to_string()))
}

// Collection point rendered on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub cafe_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

// Cafes without coordinates cannot be placed and are skipped.
pub async fn load_map_markers(api: &MarketplaceApi, notifier: &dyn Notifier) -> Vec<MapMarker> {
    let cafes = or_notify(api.list_cafes().await, notifier, "notify.load_failed.cafes");
    cafes
        .into_iter()
        .filter_map(|cafe| {
            Some(MapMarker {
                latitude: cafe.latitude?,
                longitude: cafe.longitude?,
                cafe_id: cafe.id,
                name: cafe.name,
                address: cafe.address,
            })
        })
        .collect()
}

// Pickup list with optimistic status changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickupBoard {
    pub pickups: Vec<Pickup>,
}

impl PickupBoard {
    pub fn new(pickups: Vec<Pickup>) -> Self {
        Self { pickups }
    }

    pub fn get(&self, id: &str) -> Option<&Pickup> {
        self.pickups.iter().find(|p| p.id == id)
    }

    // The new status is shown immediately and kept even if the server call fails.
    pub async fn update_status(
        &mut self,
        api: &MarketplaceApi,
        notifier: &dyn Notifier,
        id: &str,
        status: PickupStatus,
    ) -> Result<(), ApiError> {
        let Some(pickup) = self.pickups.iter_mut().find(|p| p.id == id) else {
            notifier.notify(Notification::error(
                Text::key("notify.pickup_not_found").with_arg("id", id),
            ));
            let mut errors = ValidationErrors::new();
            errors.add("id", "해당 수거 요청을 찾을 수 없습니다.");
            return Err(ApiError::Validation(errors));
        };
        if !pickup.status.can_transition_to(status) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "status",
                format!("{} 상태에서 {}(으)로 변경할 수 없습니다.", pickup.status.as_str(), status.as_str()),
            );
            notifier.notify(Notification::error(
                Text::key("notify.pickup_transition_invalid")
                    .with_arg("from", pickup.status.as_str())
                    .with_arg("to", status.as_str()),
            ));
            return Err(ApiError::Validation(errors));
        }

        let previous = pickup.status;
        pickup.status = status;
        tracing::info!(pickup_id = id, from = previous.as_str(), to = status.as_str(), "pickup status applied");

        match api.update_pickup_status(id, status).await {
            Ok(()) => {
                notifier.notify(Notification::success(Text::key("notify.pickup_status_updated")));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(pickup_id = id, error = %err, "pickup status update failed; keeping local status");
                notifier.notify(failure("notify.pickup_status_failed", &err));
                Err(err)
            }
        }
    }
}

// Cafe owner's dashboard: profile, registered grounds and incoming pickups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CafeDashboard {
    pub cafe: Option<Cafe>,
    pub grounds: Vec<CoffeeGroundBatch>,
    pub pickups: PickupBoard,
}

impl CafeDashboard {
    pub async fn load(api: &MarketplaceApi, notifier: &dyn Notifier) -> Self {
        let cafe = match api.my_cafe().await {
            Ok(cafe) => Some(cafe),
            // A fresh cafe account has no profile yet.
            Err(ApiError::EmptyResponse) | Err(ApiError::Upstream { status: 404, .. }) => None,
            Err(err) => {
                notifier.notify(failure("notify.load_failed.cafe", &err));
                None
            }
        };
        let grounds = or_notify(api.my_grounds().await, notifier, "notify.load_failed.grounds");
        let pickups = or_notify(api.cafe_pickups().await, notifier, "notify.load_failed.pickups");

        Self {
            cafe,
            grounds,
            pickups: PickupBoard::new(pickups),
        }
    }

    // Create the cafe profile on first save, update it afterwards.
    pub async fn save_profile(
        &mut self,
        api: &MarketplaceApi,
        notifier: &dyn Notifier,
        form: &CafeForm,
    ) -> Result<(), ApiError> {
        let (latitude, longitude) = form.validate()?;
        let request = CafeRequest {
            name: form.name.trim(),
            address: form.address.trim(),
            latitude,
            longitude,
            phone: non_blank(&form.phone),
            opening_hours: non_blank(&form.opening_hours),
            description: non_blank(&form.description),
        };

        let saved = match self.cafe {
            Some(_) => api.update_my_cafe(&request).await,
            None => api.create_cafe(&request).await,
        };
        match saved {
            Ok(cafe) => {
                self.cafe = Some(cafe);
                notifier.notify(Notification::success(Text::key("notify.cafe_saved")));
                Ok(())
            }
            Err(err) => {
                notifier.notify(failure("notify.cafe_save_failed", &err));
                Err(err)
            }
        }
    }

    pub async fn register_grounds(
        &mut self,
        api: &MarketplaceApi,
        notifier: &dyn Notifier,
        form: &GroundsForm,
    ) -> Result<CoffeeGroundBatch, ApiError> {
        let amount_kg = form.validate()?;
        let request = NewGroundsRequest {
            amount_kg,
            bean_origin: non_blank(&form.bean_origin),
            available_from: non_blank(&form.available_from),
            note: non_blank(&form.note),
        };

        let created = match api.register_grounds(&request).await {
            Ok(created) => created,
            Err(err) => {
                notifier.notify(failure("notify.grounds_register_failed", &err));
                return Err(err);
            }
        };
        notifier.notify(Notification::success(Text::key("notify.grounds_registered")));
        self.refresh_grounds(api, notifier).await;
        Ok(created)
    }

    pub async fn delete_grounds(
        &mut self,
        api: &MarketplaceApi,
        notifier: &dyn Notifier,
        id: &str,
    ) -> Result<(), ApiError> {
        if let Err(err) = api.delete_grounds(id).await {
            notifier.notify(failure("notify.grounds_delete_failed", &err));
            return Err(err);
        }
        self.refresh_grounds(api, notifier).await;
        Ok(())
    }

    // Reflect server state after a mutation; a failed refetch keeps the old list.
    async fn refresh_grounds(&mut self, api: &MarketplaceApi, notifier: &dyn Notifier) {
        match api.my_grounds().await {
            Ok(grounds) => self.grounds = grounds,
            Err(err) => {
                notifier.notify(failure("notify.grounds_refresh_failed", &err));
            }
        }
    }
}

// Consumer's dashboard: their own pickup requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDashboard {
    pub pickups: PickupBoard,
}

impl UserDashboard {
    pub async fn load(api: &MarketplaceApi, notifier: &dyn Notifier) -> Self {
        let pickups = or_notify(api.my_pickups().await, notifier, "notify.load_failed.pickups");
        Self {
            pickups: PickupBoard::new(pickups),
        }
    }

    pub async fn schedule_pickup(
        &mut self,
        api: &MarketplaceApi,
        notifier: &dyn Notifier,
        form: &PickupForm,
    ) -> Result<Pickup, ApiError> {
        let amount_kg = form.validate()?;
        let request = NewPickupRequest {
            cafe_id: form.cafe_id.trim(),
            batch_id: non_blank(&form.batch_id),
            scheduled_at: form.scheduled_at.trim(),
            amount_kg,
            note: non_blank(&form.note),
        };

        match api.request_pickup(&request).await {
            Ok(pickup) => {
                notifier.notify(Notification::success(Text::key("notify.pickup_requested")));
                match api.my_pickups().await {
                    Ok(pickups) => self.pickups = PickupBoard::new(pickups),
                    Err(_) => self.pickups.pickups.push(pickup.clone()),
                }
                Ok(pickup)
            }
            Err(err) => {
                notifier.notify(failure("notify.pickup_request_failed", &err));
                Err(err)
            }
        }
    }
}

// Marketplace listings: available grounds and the bean catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketplacePage {
    pub grounds: Vec<CoffeeGroundBatch>,
    pub beans: Vec<Bean>,
}

impl MarketplacePage {
    pub async fn load(api: &MarketplaceApi, notifier: &dyn Notifier) -> Self {
        let grounds = or_notify(api.list_grounds().await, notifier, "notify.load_failed.grounds");
        let beans = or_notify(api.list_beans().await, notifier, "notify.load_failed.beans");
        Self { grounds, beans }
    }
}

// Detail page for one cafe and the grounds it currently offers.
#[derive(Debug, Clone, PartialEq)]
pub struct CafeDetail {
    pub cafe: Cafe,
    pub grounds: Vec<CoffeeGroundBatch>,
}

impl CafeDetail {
    pub async fn load(api: &MarketplaceApi, notifier: &dyn Notifier, id: &str) -> Option<Self> {
        let cafe = match api.get_cafe(id).await {
            Ok(cafe) => cafe,
            Err(err) => {
                notifier.notify(failure("notify.load_failed.cafe", &err));
                return None;
            }
        };
        let grounds = or_notify(api.list_grounds().await, notifier, "notify.load_failed.grounds")
            .into_iter()
            .filter(|batch| batch.cafe_id == cafe.id)
            .collect();
        Some(Self { cafe, grounds })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CafeForm {
    pub name: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    pub phone: String,
    pub opening_hours: String,
    pub description: String,
}

impl CafeForm {
    // Coordinates are optional but must come as a valid pair.
    pub fn validate(&self) -> Result<(Option<f64>, Option<f64>), ApiError> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "카페 이름을 입력하세요.");
        }
        if self.address.trim().is_empty() {
            errors.add("address", "주소를 입력하세요.");
        }

        let latitude = parse_coordinate(&self.latitude, -90.0..=90.0);
        let longitude = parse_coordinate(&self.longitude, -180.0..=180.0);
        let coords = match (latitude, longitude) {
            (Ok(None), Ok(None)) => (None, None),
            (Ok(Some(lat)), Ok(Some(lng))) => (Some(lat), Some(lng)),
            (lat, lng) => {
                if !matches!(lat, Ok(Some(_))) {
                    errors.add("latitude", "위도를 올바르게 입력하세요.");
                }
                if !matches!(lng, Ok(Some(_))) {
                    errors.add("longitude", "경도를 올바르게 입력하세요.");
                }
                (None, None)
            }
        };

        errors.into_result().map(|()| coords)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroundsForm {
    pub amount_kg: String,
    pub bean_origin: String,
    pub available_from: String,
    pub note: String,
}

impl GroundsForm {
    pub fn validate(&self) -> Result<f64, ApiError> {
        match parse_positive(&self.amount_kg) {
            Some(amount) => Ok(amount),
            None => {
                let mut errors = ValidationErrors::new();
                errors.add("amountKg", "수량(kg)은 0보다 커야 합니다.");
                Err(ApiError::Validation(errors))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PickupForm {
    pub cafe_id: String,
    pub batch_id: String,
    pub scheduled_at: String,
    pub amount_kg: String,
    pub note: String,
}

impl PickupForm {
    // Returns the optional amount; an entered amount must be positive.
    pub fn validate(&self) -> Result<Option<f64>, ApiError> {
        let mut errors = ValidationErrors::new();
        if self.cafe_id.trim().is_empty() {
            errors.add("cafeId", "카페를 선택하세요.");
        }
        if self.scheduled_at.trim().is_empty() {
            errors.add("scheduledAt", "수거 일시를 선택하세요.");
        }
        let amount = if self.amount_kg.trim().is_empty() {
            None
        } else {
            let parsed = parse_positive(&self.amount_kg);
            if parsed.is_none() {
                errors.add("amountKg", "수량(kg)은 0보다 커야 합니다.");
            }
            parsed
        };
        errors.into_result().map(|()| amount)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_positive(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_coordinate(value: &str, range: std::ops::RangeInclusive<f64>) -> Result<Option<f64>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if range.contains(&v) => Ok(Some(v)),
        _ => Err(()),
    }
}
