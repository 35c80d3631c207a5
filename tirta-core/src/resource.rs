use serde::{Deserialize, Serialize};

use crate::{BoxStr, CustomerId, MeterId, PaymentId, PropertyId, TariffId};

// Rows for the boilerplate CRUD screens. These stay deliberately thin:
// the client lists, shows, and edits them without interpreting much.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: Option<BoxStr>,
    pub client_id: BoxStr,
    pub customer_number: BoxStr,
    pub first_name: BoxStr,
    pub last_name: BoxStr,
    pub address: BoxStr,
    pub city: BoxStr,
    pub province: BoxStr,
    pub postal_code: BoxStr,
    pub phone: BoxStr,
    pub email: BoxStr,
    pub id_card_number: Option<BoxStr>,
    pub status: BoxStr,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub client_id: BoxStr,
    pub name: BoxStr,
    #[serde(rename = "type")]
    pub kind: BoxStr,
    pub address: BoxStr,
    pub city: BoxStr,
    pub province: BoxStr,
    pub postal_code: BoxStr,
    pub total_units: u32,
    pub status: BoxStr,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meter {
    pub id: MeterId,
    /// Business code printed on the unit, e.g. `MTR-0001`.
    pub meter_id: BoxStr,
    pub customer_id: CustomerId,
    pub property_id: PropertyId,
    pub installation_date: Option<jiff::Timestamp>,
    pub meter_type: BoxStr,
    pub meter_model: BoxStr,
    pub meter_serial: BoxStr,
    pub firmware_version: BoxStr,
    pub hardware_version: BoxStr,
    pub location_description: Option<BoxStr>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: BoxStr,
    pub last_reading: Option<f64>,
    pub last_reading_at: Option<jiff::Timestamp>,
    /// Remaining prepaid credit.
    pub last_credit: f64,
    pub last_credit_at: Option<jiff::Timestamp>,
    /// Whether low credit may drive the attached valve automatically.
    pub auto_valve_control: bool,
    pub low_credit_threshold: f64,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub customer_id: CustomerId,
    pub amount: f64,
    pub method: BoxStr,
    pub status: BoxStr,
    pub description: Option<BoxStr>,
    pub external_id: Option<BoxStr>,
    pub snap_token: Option<BoxStr>,
    pub payment_url: Option<BoxStr>,
    pub paid_at: Option<jiff::Timestamp>,
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    pub id: TariffId,
    pub client_id: BoxStr,
    pub property_type: BoxStr,
    pub name: BoxStr,
    pub description: Option<BoxStr>,
    pub base_price: f64,
    pub is_active: bool,
    pub is_seasonal: bool,
    pub has_minimum_charge: bool,
    pub minimum_charge_amount: Option<f64>,
    pub has_bulk_discount: bool,
    pub has_dynamic_discount: bool,
    pub effective_from: Option<jiff::Timestamp>,
    pub effective_to: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}
