// Field extractors: each pulls one value out of the request/response graph.
// A missing or invalid link anywhere along the path yields EMPTY_FIELD, never an error.
use crate::bom::{
    AvailPricingRequest, AvailPricingResponse, MonetaryAmount, PropertyList, PropertyProduct, PropertyStay,
    RoomRate, SourceOfReply,
};
use crate::collaborators::{ChannelResolver, TransactionIdProvider};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub const EMPTY_FIELD: &str = "";
pub const MULTI_SINGLE: &str = "MultiSingle";

const RATE_PLAN_SEPARATOR: &str = "-";
const SAMPLING_SUFFIX: &str = "-sampling";
const CRAWLING_SUFFIX: &str = "-crawling";

fn or_empty(value: Option<impl ToString>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

// Transaction

pub fn functionality(response: Option<&AvailPricingResponse>, multi_single: bool) -> String {
    if multi_single {
        return MULTI_SINGLE.to_string();
    }
    or_empty(response.map(|rs| rs.transaction.label()))
}

/// Origin of a property: its own source when known, the response source otherwise.
pub fn origin(property: &PropertyStay, response: &AvailPricingResponse) -> String {
    let source = if property.source != SourceOfReply::UnknownSource {
        property.source
    } else {
        response.source
    };
    source.label().to_string()
}

pub fn transaction_date(time: &NaiveDateTime) -> String {
    time.format("%Y%m%d-%H%M%S").to_string()
}

const RESPONSE_TIME_DIGITS: i32 = 6;

/// Seconds with six significant digits, in the shortest of fixed or
/// exponent notation (`12.3457`, `0.000123456`, `1.2e-06`).
pub fn response_time(seconds: f64) -> String {
    if seconds == 0.0 || !seconds.is_finite() {
        return seconds.to_string();
    }

    // Rounding first gives the exponent of the printed value, not of the raw one
    let scientific = format!("{:.*e}", (RESPONSE_TIME_DIGITS - 1) as usize, seconds);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..RESPONSE_TIME_DIGITS).contains(&exponent) {
        let decimals = (RESPONSE_TIME_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, seconds)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

pub fn crawling_sampling_suffix(encode: bool, sampling: bool, crawling: bool) -> &'static str {
    match (encode, sampling, crawling) {
        (false, _, _) => EMPTY_FIELD,
        (true, true, _) => SAMPLING_SUFFIX,
        (true, false, true) => CRAWLING_SUFFIX,
        (true, false, false) => EMPTY_FIELD,
    }
}

// Request

pub fn atid(provider: &dyn TransactionIdProvider) -> String {
    or_empty(provider.transaction_id())
}

/// Amadeus office id, or the pseudo-city code when there is none.
pub fn office_id(request: Option<&AvailPricingRequest>) -> String {
    let office = request
        .and_then(|rq| rq.originator.as_ref())
        .and_then(|originator| originator.office_information.as_ref());

    or_empty(office.and_then(|office| {
        office
            .amadeus_office_id
            .as_deref()
            .or(office.pseudo_city_code.as_deref())
    }))
}

pub fn channel(resolver: &dyn ChannelResolver, request: Option<&AvailPricingRequest>) -> String {
    or_empty(request.map(|rq| resolver.resolve(rq).0))
}

pub fn sub_channel(resolver: &dyn ChannelResolver, request: Option<&AvailPricingRequest>) -> String {
    or_empty(request.map(|rq| resolver.resolve(rq).1))
}

pub fn providers(request: Option<&AvailPricingRequest>) -> String {
    let providers = request.map(|rq| {
        if rq.for_leisure {
            "leisure"
        } else if rq.for_mixed_providers {
            "mixed"
        } else {
            "distribution"
        }
    });
    or_empty(providers)
}

pub fn requested_rates(request: Option<&AvailPricingRequest>) -> String {
    let Some(rate_details) = request.and_then(|rq| rq.rate_details.as_ref()) else {
        return EMPTY_FIELD.to_string();
    };
    rate_details
        .rate_plans
        .iter()
        .filter_map(|plan| plan.rate_plan_code.as_deref())
        .collect::<Vec<_>>()
        .join(RATE_PLAN_SEPARATOR)
}

/// Nights between check-in and check-out. A stay crossing one year boundary is
/// counted as the remainder of the start year plus the elapsed days of the end year.
/// The end date is assumed not to precede the start date.
pub fn length_of_stay(request: Option<&AvailPricingRequest>) -> String {
    let period = request.and_then(|rq| rq.period.as_ref());
    let dates = period.and_then(|p| Some((p.start_date?, p.end_date?)));
    or_empty(dates.map(|(start, end)| nights(start, end)))
}

fn nights(start: NaiveDate, end: NaiveDate) -> i64 {
    let start_day = i64::from(start.ordinal());
    let end_day = i64::from(end.ordinal());
    if start.year() == end.year() {
        end_day - start_day
    } else {
        (days_in_year(start.year()) - start_day) + end_day
    }
}

fn days_in_year(year: i32) -> i64 {
    NaiveDate::from_yo_opt(year, 366).map_or(365, |_| 366)
}

pub fn check_in_date(request: Option<&AvailPricingRequest>) -> String {
    let start = request
        .and_then(|rq| rq.period.as_ref())
        .and_then(|period| period.start_date);
    or_empty(start.map(|date| date.format("%y%m%d")))
}

/// Occupancy of the first requested room.
pub fn occupancy(request: Option<&AvailPricingRequest>) -> String {
    or_empty(
        request
            .and_then(|rq| rq.room_details.first())
            .and_then(|room| room.occupancy),
    )
}

fn join_values<'a>(values: impl Iterator<Item = &'a str>, separator: &str) -> String {
    values.collect::<Vec<_>>().join(separator)
}

/// City code of the address plus the IATA code of the point of interest.
pub fn cities(request: Option<&AvailPricingRequest>, separator: &str) -> String {
    let Some(location) = request.and_then(|rq| rq.location_details.as_ref()) else {
        return EMPTY_FIELD.to_string();
    };

    let city = location
        .address
        .as_ref()
        .and_then(|address| address.city.as_ref())
        .and_then(|city| city.code.as_deref());
    let point_of_interest = location
        .relative_location
        .as_ref()
        .and_then(|relative| relative.point_of_interest.as_ref())
        .and_then(|poi| poi.iata_code.as_deref());

    join_values(city.into_iter().chain(point_of_interest), separator)
}

pub fn chains(request: Option<&AvailPricingRequest>, separator: &str) -> String {
    let Some(rq) = request else {
        return EMPTY_FIELD.to_string();
    };

    let single = rq
        .chain_details
        .as_ref()
        .and_then(|chain| chain.code.as_deref());
    let listed = rq
        .chain_list
        .iter()
        .flat_map(|list| list.chain_codes.iter())
        .filter_map(|code| code.as_deref());

    join_values(single.into_iter().chain(listed), separator)
}

/// Requested property plus the predefined and preferred property lists, in that order.
pub fn properties(request: Option<&AvailPricingRequest>, separator: &str) -> String {
    let Some(rq) = request else {
        return EMPTY_FIELD.to_string();
    };

    let single = rq
        .property_product
        .as_ref()
        .and_then(|product| product.property_id.as_deref());

    join_values(
        single
            .into_iter()
            .chain(listed_property_ids(rq.predefined_property_list.as_ref()))
            .chain(listed_property_ids(rq.preferred_property_list.as_ref())),
        separator,
    )
}

fn listed_property_ids(list: Option<&PropertyList>) -> impl Iterator<Item = &str> {
    list.into_iter()
        .flat_map(|list| list.property_products.iter())
        .filter_map(|product| product.property_id.as_deref())
}

// Property and room rate

fn product(property: &PropertyStay) -> Option<&PropertyProduct> {
    property.property_product.as_ref()
}

pub fn property_id(property: &PropertyStay) -> String {
    or_empty(product(property).and_then(|p| p.property_id.as_deref()))
}

pub fn chain_code(property: &PropertyStay) -> String {
    or_empty(property.chain_code())
}

pub fn booking_code(rate: &RoomRate) -> String {
    or_empty(rate.booking_code.as_deref())
}

fn base_amount_with_taxes(rate: &RoomRate) -> Option<&MonetaryAmount> {
    rate.booking_rate.as_ref()?.base_amount_with_taxes.as_ref()
}

fn total_amount_with_taxes(rate: &RoomRate) -> Option<&MonetaryAmount> {
    rate.booking_rate.as_ref()?.total_amount_with_taxes.as_ref()
}

/// Currency of the base amount.
pub fn currency(rate: &RoomRate) -> String {
    or_empty(base_amount_with_taxes(rate).and_then(|amount| amount.currency.as_deref()))
}

pub fn base_amount(rate: &RoomRate) -> String {
    or_empty(base_amount_with_taxes(rate).and_then(|amount| amount.amount))
}

pub fn total_amount(rate: &RoomRate) -> String {
    or_empty(total_amount_with_taxes(rate).and_then(|amount| amount.amount))
}

pub fn rate_code(rate: &RoomRate) -> String {
    or_empty(
        rate.rate_plan
            .as_ref()
            .and_then(|plan| plan.rate_plan_code.as_deref()),
    )
}
