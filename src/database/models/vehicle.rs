use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::media::MediaItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub engine_size: i32,
    pub color: String,
    pub registered: String,
    pub tax_date: String,
    pub mot_date: String,
    pub insurance_date: String,
    pub service_date: String,
    pub description: String,
    pub mileage: i64,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// Payload for adding a vehicle to the caller's garage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewVehicle {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub engine_size: i32,
    pub color: String,
    pub registered: String,
    pub tax_date: String,
    pub mot_date: String,
    pub insurance_date: String,
    pub service_date: String,
    pub description: String,
    pub mileage: i64,
    pub nickname: String,
}

/// Sparse vehicle update.
///
/// A field is applied only when it is present and differs from its type's
/// unset value: empty text or zero. `normalized` folds the unset values into
/// `None` so the rest of the crate only has to look at presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehiclePatch {
    pub description: Option<String>,
    pub tax_date: Option<String>,
    pub mot_date: Option<String>,
    pub insurance_date: Option<String>,
    pub service_date: Option<String>,
    pub mileage: Option<i64>,
    pub nickname: Option<String>,
}

fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl VehiclePatch {
    pub fn normalized(self) -> Self {
        Self {
            description: present_text(self.description),
            tax_date: present_text(self.tax_date),
            mot_date: present_text(self.mot_date),
            insurance_date: present_text(self.insurance_date),
            service_date: present_text(self.service_date),
            mileage: self.mileage.filter(|m| *m != 0),
            nickname: present_text(self.nickname),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.tax_date.is_none()
            && self.mot_date.is_none()
            && self.insurance_date.is_none()
            && self.service_date.is_none()
            && self.mileage.is_none()
            && self.nickname.is_none()
    }

    /// Copy every present field onto `vehicle`.
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut vehicle.description, &self.description);
        set(&mut vehicle.tax_date, &self.tax_date);
        set(&mut vehicle.mot_date, &self.mot_date);
        set(&mut vehicle.insurance_date, &self.insurance_date);
        set(&mut vehicle.service_date, &self.service_date);
        set(&mut vehicle.mileage, &self.mileage);
        set(&mut vehicle.nickname, &self.nickname);
    }
}

/// Canonical form used for storage and lookups: no whitespace, upper case.
pub fn normalize_registration(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            registration: "AB12CDE".to_string(),
            make: "FORD".to_string(),
            model: "FIESTA".to_string(),
            year: 2012,
            engine_size: 1242,
            color: "BLUE".to_string(),
            registered: "2012-03-01".to_string(),
            tax_date: "2025-03-01".to_string(),
            mot_date: "2025-02-28".to_string(),
            insurance_date: String::new(),
            service_date: String::new(),
            description: "daily".to_string(),
            mileage: 81_000,
            nickname: "Blue".to_string(),
            created_at: Utc::now(),
            media: Vec::new(),
        }
    }

    #[test]
    fn unset_values_are_dropped() {
        let patch = VehiclePatch {
            description: Some(String::new()),
            mileage: Some(0),
            nickname: Some("X".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(patch.description, None);
        assert_eq!(patch.mileage, None);
        assert_eq!(patch.nickname.as_deref(), Some("X"));
        assert!(!patch.is_empty());
        assert!(VehiclePatch::default().normalized().is_empty());
    }

    #[test]
    fn nickname_only_patch_leaves_other_fields() {
        let before = vehicle();
        let mut after = before.clone();
        let patch: VehiclePatch = serde_json::from_str(r#"{"nickname":"X"}"#).unwrap();
        patch.normalized().apply_to(&mut after);

        assert_eq!(after.nickname, "X");
        after.nickname = before.nickname.clone();
        assert_eq!(after, before);
    }

    #[test]
    fn registration_is_normalized() {
        assert_eq!(normalize_registration(" ab12 cde "), "AB12CDE");
        assert_eq!(normalize_registration("AB12CDE"), "AB12CDE");
    }
}
