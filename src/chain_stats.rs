// Room parser statistics: how well the room code classifier did, per hotel chain
use crate::bom::{AvailPricingResponse, RoomDetails, UNKNOWN_ROOM_CODE_CHAR};
use crate::error::ReportError;
use std::collections::BTreeMap;

const CATEGORY_POSITION: usize = 0;
const BED_TYPE_POSITION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainStats {
    pub total_room_codes: u32,
    pub total_room_codes_identified: u32,
    pub total_partial_room_codes_identified: u32,
    pub total_room_categories_identified: u32,
    pub total_bed_types_identified: u32,
}

impl ChainStats {
    pub fn counters(&self) -> [u32; 5] {
        [
            self.total_room_codes,
            self.total_room_codes_identified,
            self.total_partial_room_codes_identified,
            self.total_room_categories_identified,
            self.total_bed_types_identified,
        ]
    }

    fn record(&mut self, room: &RoomDetails) -> Result<(), ReportError> {
        if room.room_type.is_some() {
            self.total_room_codes += 1;
        }

        let Some(calculated) = room.calculated_room_type.as_deref() else {
            return Ok(());
        };

        let at = |position: usize| {
            calculated
                .chars()
                .nth(position)
                .ok_or_else(|| ReportError::MalformedRoomType(calculated.to_string()))
        };
        let category = at(CATEGORY_POSITION)?;
        let bed_type = at(BED_TYPE_POSITION)?;

        if category != UNKNOWN_ROOM_CODE_CHAR {
            self.total_room_categories_identified += 1;
        }
        if bed_type != UNKNOWN_ROOM_CODE_CHAR {
            self.total_bed_types_identified += 1;
        }
        if calculated.contains(UNKNOWN_ROOM_CODE_CHAR) {
            self.total_partial_room_codes_identified += 1;
        } else {
            self.total_room_codes_identified += 1;
        }
        Ok(())
    }
}

/// Walks every rate of every property carrying a chain code, keyed and sorted by chain.
///
/// A chain shows up as soon as one of its properties is seen, even when none of its
/// rates carry room details. A calculated room type too short to hold a bed type
/// aborts the whole aggregation.
pub fn aggregate(response: &AvailPricingResponse) -> Result<BTreeMap<String, ChainStats>, ReportError> {
    let mut stats: BTreeMap<String, ChainStats> = BTreeMap::new();

    for property in &response.candidate_properties {
        let Some(chain_code) = property.chain_code() else {
            continue;
        };
        let chain_stats = stats.entry(chain_code.to_string()).or_default();

        let room_details = property
            .room_stays
            .iter()
            .flat_map(|room_stay| room_stay.room_rates.iter())
            .filter_map(|rate| rate.room_details.as_ref());
        for room in room_details {
            chain_stats.record(room)?;
        }
    }

    Ok(stats)
}
