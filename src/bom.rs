// Business object model of an availability/pricing transaction.
// Read-only view: every link that may be missing in a live transaction is an Option.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character the room code classifier writes at a position it could not classify.
pub const UNKNOWN_ROOM_CODE_CHAR: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum TransactionType {
    Pricing,
    SingleAvail,
    MultiAvail,
    #[default]
    Unknown,
    #[serde(other)]
    Unrecognized,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Pricing => "Pricing",
            TransactionType::SingleAvail => "SingleAvail",
            TransactionType::MultiAvail => "MultiAvail",
            TransactionType::Unknown => "Unknown",
            TransactionType::Unrecognized => "",
        }
    }
}

// Where a property (or the whole reply) was sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum SourceOfReply {
    #[serde(rename = "Provider_dyn")]
    ProviderDyn,
    #[serde(rename = "Amadeus_dyn")]
    AmadeusDyn,
    #[serde(rename = "Accor_dyn")]
    AccorDyn,
    CentralSys,
    #[serde(rename = "Cache_FSA_Amounts")]
    CacheFsaAmounts,
    #[serde(rename = "Cache_FSA_Seamless")]
    CacheFsaSeamless,
    #[default]
    UnknownSource,
    #[serde(other)]
    Unrecognized,
}

impl SourceOfReply {
    pub fn label(&self) -> &'static str {
        match self {
            SourceOfReply::ProviderDyn => "Provider_dyn",
            SourceOfReply::AmadeusDyn => "Amadeus_dyn",
            SourceOfReply::AccorDyn => "Accor_dyn",
            SourceOfReply::CentralSys => "CentralSys",
            SourceOfReply::CacheFsaAmounts => "Cache_FSA_Amounts",
            SourceOfReply::CacheFsaSeamless => "Cache_FSA_Seamless",
            SourceOfReply::UnknownSource => "UnknownSource",
            SourceOfReply::Unrecognized => "",
        }
    }
}

/// Monetary value. `Display` gives the shortest decimal that round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Response side

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailPricingResponse {
    pub transaction: TransactionType,
    pub source: SourceOfReply,
    pub candidate_properties: Vec<PropertyStay>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyStay {
    pub source: SourceOfReply,
    pub property_product: Option<PropertyProduct>,
    pub room_stays: Vec<RoomStay>,
}

impl PropertyStay {
    pub fn chain_code(&self) -> Option<&str> {
        self.property_product.as_ref()?.chain_code()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyProduct {
    pub property_id: Option<String>,
    pub chain_details: Option<ChainDetails>,
}

impl PropertyProduct {
    pub fn chain_code(&self) -> Option<&str> {
        self.chain_details
            .as_ref()?
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainDetails {
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomStay {
    pub room_rates: Vec<RoomRate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomRate {
    pub booking_code: Option<String>,
    pub booking_rate: Option<BookingRate>,
    pub rate_plan: Option<RatePlan>,
    pub room_details: Option<RoomDetails>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingRate {
    pub base_amount_with_taxes: Option<MonetaryAmount>,
    pub total_amount_with_taxes: Option<MonetaryAmount>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonetaryAmount {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatePlan {
    pub rate_plan_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomDetails {
    /// Room type code as returned by the provider.
    pub room_type: Option<String>,
    /// Fixed-length classification (category, occupancy, bed type, ...).
    pub calculated_room_type: Option<String>,
}

// Request side

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailPricingRequest {
    pub location_details: Option<LocationDetails>,
    pub property_product: Option<PropertyProduct>,
    pub predefined_property_list: Option<PropertyList>,
    pub preferred_property_list: Option<PropertyList>,
    pub chain_details: Option<ChainDetails>,
    pub chain_list: Option<ChainList>,
    pub period: Option<Period>,
    pub room_details: Vec<RoomCriteria>,
    pub originator: Option<Originator>,
    pub rate_details: Option<RateDetails>,
    pub for_leisure: bool,
    pub for_mixed_providers: bool,
    pub crawling: bool,
    pub from_sampling: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationDetails {
    pub address: Option<Address>,
    pub relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub city: Option<City>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct City {
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelativeLocation {
    pub point_of_interest: Option<PointOfInterest>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointOfInterest {
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyList {
    pub property_products: Vec<PropertyProduct>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainList {
    pub chain_codes: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Period {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomCriteria {
    pub occupancy: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Originator {
    pub office_information: Option<OfficeInformation>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfficeInformation {
    pub amadeus_office_id: Option<String>,
    pub pseudo_city_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateDetails {
    pub rate_plans: Vec<RatePlan>,
}
