// Business transaction report ("UC log report") of an availability/pricing transaction
use crate::bom::{AvailPricingRequest, AvailPricingResponse, PropertyStay, TransactionType};
use crate::chain_stats;
use crate::collaborators::{ChannelResolver, OtfVariables, TransactionIdProvider};
use crate::config::{ReportConfig, ReportOptions};
use crate::error::{ConfigError, ReportError};
use crate::extract;
use crate::sink::{LogSink, SinkKind};
use chrono::{NaiveDateTime, Utc};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

pub const ROOM_PARSER_STATS: &str = "RoomParser";

/// Per-transaction values that do not come from the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub transaction_time: NaiveDateTime,
    pub response_time: f64,
    pub atid: String,
    pub office_id: String,
    pub channel: String,
    pub sub_channel: String,
    pub providers: String,
    pub requested_rates: String,
    pub crawling: bool,
    pub sampling: bool,
}

impl ReportContext {
    // Caller already knows the identifiers; providers stay empty and the
    // transaction is never flagged as crawling or sampling.
    pub fn new(
        started_at: Instant,
        atid: &str,
        office_id: &str,
        channel: &str,
        sub_channel: &str,
        requested_rates: &str,
    ) -> Self {
        Self {
            transaction_time: Utc::now().naive_utc(),
            response_time: started_at.elapsed().as_secs_f64(),
            atid: atid.to_string(),
            office_id: office_id.to_string(),
            channel: channel.to_string(),
            sub_channel: sub_channel.to_string(),
            providers: extract::EMPTY_FIELD.to_string(),
            requested_rates: requested_rates.to_string(),
            crawling: false,
            sampling: false,
        }
    }

    // Everything derived from the request and the transaction services
    pub fn from_request(
        request: Option<&AvailPricingRequest>,
        started_at: Instant,
        transaction_ids: &dyn TransactionIdProvider,
        channels: &dyn ChannelResolver,
    ) -> Self {
        Self {
            transaction_time: Utc::now().naive_utc(),
            response_time: started_at.elapsed().as_secs_f64(),
            atid: extract::atid(transaction_ids),
            office_id: extract::office_id(request),
            channel: extract::channel(channels, request),
            sub_channel: extract::sub_channel(channels, request),
            providers: extract::providers(request),
            requested_rates: extract::requested_rates(request),
            crawling: request.map_or(false, |rq| rq.crawling),
            sampling: request.map_or(false, |rq| rq.from_sampling),
        }
    }

    pub fn with_transaction_time(mut self, time: NaiveDateTime) -> Self {
        self.transaction_time = time;
        self
    }

    pub fn with_response_time(mut self, seconds: f64) -> Self {
        self.response_time = seconds;
        self
    }
}

/// What happened to one report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Emitted(String),
    /// Nothing to report (no response, or preconditions not met).
    Skipped,
    /// Building or delivering the line failed; the failure was swallowed.
    Suppressed,
}

impl ReportOutcome {
    pub fn line(&self) -> Option<&str> {
        match self {
            ReportOutcome::Emitted(line) => Some(line),
            _ => None,
        }
    }
}

pub struct ReportBuilder {
    config: ReportConfig,
    otf: Arc<dyn OtfVariables>,
    sink: Arc<dyn LogSink>,
}

impl ReportBuilder {
    pub fn new(
        config: ReportConfig,
        otf: Arc<dyn OtfVariables>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, otf, sink })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Emits both lines of a transaction. Never fails: a missing response or a
    /// failing build only shows up in the returned outcomes.
    pub fn report(
        &self,
        response: Option<&AvailPricingResponse>,
        request: Option<&AvailPricingRequest>,
        multi_single: bool,
        context: &ReportContext,
    ) -> (ReportOutcome, ReportOutcome) {
        let Some(response) = response else {
            tracing::info!("APD_REPORT ==> no response to report on");
            return (ReportOutcome::Skipped, ReportOutcome::Skipped);
        };

        (
            self.log_main_report(response, request, multi_single, context),
            self.log_stats_report(response, multi_single),
        )
    }

    pub fn log_main_report(
        &self,
        response: &AvailPricingResponse,
        request: Option<&AvailPricingRequest>,
        multi_single: bool,
        context: &ReportContext,
    ) -> ReportOutcome {
        tracing::debug!("APD_REPORT - main report");
        let result = self
            .build_main_report(response, request, multi_single, context)
            .and_then(|line| self.deliver(SinkKind::Report, line));
        Self::outcome(result.map(Some))
    }

    pub fn log_stats_report(&self, response: &AvailPricingResponse, multi_single: bool) -> ReportOutcome {
        let result = self.build_stats_report(response, multi_single).and_then(|line| {
            line.map(|line| self.deliver(SinkKind::StatsReport, line))
                .transpose()
        });
        Self::outcome(result)
    }

    // Once the primary sink took the line it counts as emitted; the debug copy is best effort
    fn deliver(&self, kind: SinkKind, line: String) -> Result<String, ReportError> {
        self.sink.write(kind, &line)?;
        if let Err(e) = self.sink.write(SinkKind::Debug, &line) {
            tracing::debug!("APD_REPORT - debug copy dropped: {}", e);
        }
        Ok(line)
    }

    fn outcome(result: Result<Option<String>, ReportError>) -> ReportOutcome {
        match result {
            Ok(Some(line)) => ReportOutcome::Emitted(line),
            Ok(None) => ReportOutcome::Skipped,
            Err(e) => {
                tracing::debug!("APD_REPORT - report suppressed: {}", e);
                ReportOutcome::Suppressed
            }
        }
    }

    pub fn build_main_report(
        &self,
        response: &AvailPricingResponse,
        request: Option<&AvailPricingRequest>,
        multi_single: bool,
        context: &ReportContext,
    ) -> Result<String, ReportError> {
        let options = ReportOptions::resolve(&self.config, self.otf.as_ref());
        let separators = &self.config.separators;
        let (field, section) = (separators.field.as_str(), separators.section.as_str());

        let mut header = vec![
            format!(
                "{}{}",
                extract::functionality(Some(response), multi_single),
                extract::crawling_sampling_suffix(
                    options.encode_crawling_sampling,
                    context.sampling,
                    context.crawling
                )
            ),
            extract::transaction_date(&context.transaction_time),
            extract::response_time(context.response_time),
            context.office_id.clone(),
            context.atid.clone(),
            context.channel.clone(),
            context.sub_channel.clone(),
            extract::length_of_stay(request),
            extract::check_in_date(request),
            extract::occupancy(request),
            context.providers.clone(),
            context.requested_rates.clone(),
        ];
        if options.include_request_criteria {
            header.push(extract::cities(request, &separators.value));
            header.push(extract::chains(request, &separators.value));
            header.push(extract::properties(request, &separators.value));
        }
        header.push(response.candidate_properties.len().to_string());

        let mut report = String::new();
        write!(report, "{}{}{}", self.config.log_version, section, header.join(field))?;
        for property in &response.candidate_properties {
            self.write_property(&mut report, property, response)?;
        }
        Ok(report)
    }

    fn write_property(
        &self,
        report: &mut String,
        property: &PropertyStay,
        response: &AvailPricingResponse,
    ) -> Result<(), ReportError> {
        let separators = &self.config.separators;
        let (field, section) = (separators.field.as_str(), separators.section.as_str());

        let fields = [
            extract::origin(property, response),
            extract::property_id(property),
            extract::chain_code(property),
            property.room_stays.len().to_string(),
        ];
        write!(report, "{}{}", section, fields.join(field))?;

        for room_stay in &property.room_stays {
            // only the first rate of a room stay is reported
            let fields = match room_stay.room_rates.first() {
                Some(rate) => [
                    extract::booking_code(rate),
                    extract::currency(rate),
                    extract::base_amount(rate),
                    extract::total_amount(rate),
                    extract::rate_code(rate),
                ],
                None => Default::default(),
            };
            write!(report, "{}{}", section, fields.join(field))?;
        }
        Ok(())
    }

    /// `Ok(None)` when the transaction type is not reported on or no chain was seen.
    pub fn build_stats_report(
        &self,
        response: &AvailPricingResponse,
        multi_single: bool,
    ) -> Result<Option<String>, ReportError> {
        let reported = matches!(
            response.transaction,
            TransactionType::Pricing | TransactionType::SingleAvail
        );
        if !(reported || multi_single) {
            return Ok(None);
        }
        tracing::debug!("APD_REPORT - room parser statistics");

        let stats = chain_stats::aggregate(response)?;
        if stats.is_empty() {
            return Ok(None);
        }

        let separators = &self.config.separators;
        let (field, section) = (separators.field.as_str(), separators.section.as_str());

        let mut report = String::new();
        write!(
            report,
            "{}{}{}{}{}",
            self.config.log_version,
            section,
            ROOM_PARSER_STATS,
            field,
            extract::functionality(Some(response), multi_single)
        )?;
        for (chain_code, chain_stats) in &stats {
            write!(report, "{}{}", section, chain_code)?;
            for counter in chain_stats.counters() {
                write!(report, "{}{}", field, counter)?;
            }
        }
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::*;
    use crate::collaborators::{FixedTransactionId, StaticOtfVariables};
    use crate::config::{OTF_ENCODE_CRAWLING_SAMPLING, OTF_LOG_REQUEST_CRITERIA};
    use crate::error::SinkError;
    use crate::sink::MemorySink;
    use chrono::NaiveDate;
    use test_case::test_case;

    const SAMPLE_RESPONSE: &str = include_str!("../samples/avail_pricing_response.json");
    const SAMPLE_REQUEST: &str = include_str!("../samples/avail_pricing_request.json");

    struct FailingSink;

    impl LogSink for FailingSink {
        fn write(&self, _kind: SinkKind, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Write("disk full".to_string()))
        }
    }

    // Takes report and stats lines, refuses the debug copies
    #[derive(Default)]
    struct DebugFailingSink {
        memory: MemorySink,
    }

    impl LogSink for DebugFailingSink {
        fn write(&self, kind: SinkKind, line: &str) -> Result<(), SinkError> {
            match kind {
                SinkKind::Debug => Err(SinkError::Write("debug log rotated away".to_string())),
                _ => self.memory.write(kind, line),
            }
        }
    }

    fn transaction_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap()
    }

    fn context() -> ReportContext {
        ReportContext::new(Instant::now(), "ATID01", "NCE1A0950", "1A", "WEB", "RAC")
            .with_transaction_time(transaction_time())
            .with_response_time(0.25)
    }

    fn builder_with(otf: StaticOtfVariables) -> (ReportBuilder, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let builder =
            ReportBuilder::new(ReportConfig::default(), Arc::new(otf), sink.clone()).unwrap();
        (builder, sink)
    }

    fn builder() -> (ReportBuilder, Arc<MemorySink>) {
        builder_with(StaticOtfVariables::new())
    }

    fn sample_response() -> AvailPricingResponse {
        serde_json::from_str(SAMPLE_RESPONSE).unwrap()
    }

    fn sample_request() -> AvailPricingRequest {
        serde_json::from_str(SAMPLE_REQUEST).unwrap()
    }

    fn rate(calculated: &str) -> RoomRate {
        RoomRate {
            booking_code: Some("A1KRAC".to_string()),
            room_details: Some(RoomDetails {
                room_type: Some("A1K".to_string()),
                calculated_room_type: Some(calculated.to_string()),
            }),
            ..Default::default()
        }
    }

    fn property(chain: Option<&str>, rates: Vec<RoomRate>) -> PropertyStay {
        PropertyStay {
            property_product: Some(PropertyProduct {
                property_id: Some("HINCE001".to_string()),
                chain_details: Some(ChainDetails {
                    code: chain.map(str::to_string),
                }),
            }),
            room_stays: vec![RoomStay { room_rates: rates }],
            ..Default::default()
        }
    }

    #[test]
    fn test_main_report_of_sample_transaction() {
        let (builder, _) = builder();
        let line = builder
            .build_main_report(&sample_response(), Some(&sample_request()), false, &context())
            .unwrap();

        assert_eq!(
            line,
            "1|SingleAvail;20250601-103005;0.25;NCE1A0950;ATID01;1A;WEB;3;250611;2;;RAC;2\
             |Amadeus_dyn;HINCE001;HI;2|A1KRAC;EUR;120.5;361.5;RAC|;;;;\
             |Cache_FSA_Amounts;MCNCE002;MC;1|B2TPRO;USD;99;297;PRO"
        );
    }

    #[test]
    fn test_main_report_without_properties() {
        let (builder, _) = builder();
        let response = AvailPricingResponse {
            transaction: TransactionType::MultiAvail,
            ..Default::default()
        };

        let line = builder.build_main_report(&response, None, false, &context()).unwrap();
        assert_eq!(line, "1|MultiAvail;20250601-103005;0.25;NCE1A0950;ATID01;1A;WEB;;;;;RAC;0");
    }

    #[test]
    fn test_room_stay_without_rates_emits_empty_fields() {
        let (builder, _) = builder();
        let response = AvailPricingResponse {
            transaction: TransactionType::Pricing,
            candidate_properties: vec![property(Some("HI"), vec![])],
            ..Default::default()
        };

        let line = builder.build_main_report(&response, None, false, &context()).unwrap();
        assert!(line.ends_with("|UnknownSource;HINCE001;HI;1|;;;;"), "{}", line);
    }

    #[test]
    fn test_only_first_rate_is_reported() {
        let (builder, _) = builder();
        let mut second = rate("DBK");
        second.booking_code = Some("SECOND".to_string());
        let response = AvailPricingResponse {
            candidate_properties: vec![property(Some("HI"), vec![rate("DBK"), second])],
            ..Default::default()
        };

        let line = builder.build_main_report(&response, None, false, &context()).unwrap();
        assert!(line.ends_with("|A1KRAC;;;;"), "{}", line);
        assert!(!line.contains("SECOND"));
    }

    #[test]
    fn test_multi_single_overrides_functionality() {
        let (builder, _) = builder();
        let line = builder
            .build_main_report(&sample_response(), None, true, &context())
            .unwrap();
        assert!(line.starts_with("1|MultiSingle;"), "{}", line);
    }

    #[test]
    fn test_request_criteria_switch() {
        let otf = StaticOtfVariables::new().with(OTF_LOG_REQUEST_CRITERIA, "Y");
        let (builder, _) = builder_with(otf);

        let line = builder
            .build_main_report(&sample_response(), Some(&sample_request()), false, &context())
            .unwrap();
        assert!(
            line.contains(";;RAC;NCE,CEQ;HI,MC;HINCE001,MCNCE002,RTNCE003;2|"),
            "{}",
            line
        );
    }

    #[test]
    fn test_request_criteria_fields_empty_without_request() {
        let otf = StaticOtfVariables::new().with(OTF_LOG_REQUEST_CRITERIA, "Y");
        let (builder, _) = builder_with(otf);
        let response = AvailPricingResponse::default();

        let line = builder.build_main_report(&response, None, false, &context()).unwrap();
        assert!(line.ends_with(";RAC;;;;0"), "{}", line);
    }

    #[test_case("Y", true, true, "1|SingleAvail-sampling;"; "#1 sampling wins")]
    #[test_case("Y", false, true, "1|SingleAvail-crawling;"; "#2 crawling")]
    #[test_case("N", true, true, "1|SingleAvail;"; "#3 switch off")]
    #[test_case("Y", false, false, "1|SingleAvail;"; "#4 regular traffic")]
    fn test_crawling_sampling_suffix(switch: &str, sampling: bool, crawling: bool, expected: &str) {
        let otf = StaticOtfVariables::new().with(OTF_ENCODE_CRAWLING_SAMPLING, switch);
        let (builder, _) = builder_with(otf);
        let context = ReportContext {
            sampling,
            crawling,
            ..context()
        };

        let line = builder
            .build_main_report(&sample_response(), None, false, &context)
            .unwrap();
        assert!(line.starts_with(expected), "{}", line);
    }

    #[test]
    fn test_custom_separators() {
        let config = ReportConfig::from_json(
            r##"{ "logVersion": 3, "separators": { "field": "^", "section": "#", "value": "/" } }"##,
        )
        .unwrap();
        let builder = ReportBuilder::new(
            config,
            Arc::new(StaticOtfVariables::new()),
            Arc::new(MemorySink::new()),
        )
        .unwrap();
        let response = AvailPricingResponse {
            transaction: TransactionType::Pricing,
            candidate_properties: vec![property(Some("HI"), vec![])],
            ..Default::default()
        };

        let line = builder.build_main_report(&response, None, false, &context()).unwrap();
        assert!(line.starts_with("3#Pricing^20250601-103005^"), "{}", line);
        assert!(line.ends_with("^1#UnknownSource^HINCE001^HI^1#^^^^"), "{}", line);
    }

    #[test]
    fn test_main_report_is_reproducible() {
        let (builder, _) = builder();
        let response = sample_response();
        let request = sample_request();
        let context = context();

        let first = builder.build_main_report(&response, Some(&request), false, &context).unwrap();
        for _ in 0..5 {
            let again = builder.build_main_report(&response, Some(&request), false, &context).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_stats_report_of_sample_transaction() {
        let (builder, _) = builder();
        let line = builder.build_stats_report(&sample_response(), false).unwrap();

        assert_eq!(
            line.as_deref(),
            Some("1|RoomParser;SingleAvail|HI;2;1;1;2;1|MC;1;1;0;1;1")
        );
    }

    #[test]
    fn test_stats_report_chains_are_sorted() {
        let (builder, _) = builder();
        let response = AvailPricingResponse {
            transaction: TransactionType::Pricing,
            candidate_properties: vec![
                property(Some("RT"), vec![rate("DBK")]),
                property(Some("HI"), vec![rate("XU*")]),
                property(Some("MC"), vec![rate("DBK")]),
            ],
            ..Default::default()
        };

        let line = builder.build_stats_report(&response, false).unwrap().unwrap();
        assert_eq!(
            line,
            "1|RoomParser;Pricing|HI;1;0;1;1;0|MC;1;1;0;1;1|RT;1;1;0;1;1"
        );
    }

    #[test]
    fn test_stats_report_only_for_pricing_and_single_avail() {
        let (builder, _) = builder();
        let mut response = AvailPricingResponse {
            transaction: TransactionType::MultiAvail,
            candidate_properties: vec![property(Some("HI"), vec![rate("DBK")])],
            ..Default::default()
        };

        assert_eq!(builder.build_stats_report(&response, false).unwrap(), None);
        assert_eq!(
            builder.build_stats_report(&response, true).unwrap().as_deref(),
            Some("1|RoomParser;MultiSingle|HI;1;1;0;1;1")
        );

        response.transaction = TransactionType::Unknown;
        assert_eq!(builder.build_stats_report(&response, false).unwrap(), None);
    }

    #[test]
    fn test_stats_report_without_chain_code() {
        let (builder, sink) = builder();
        let response = AvailPricingResponse {
            transaction: TransactionType::Pricing,
            candidate_properties: vec![
                property(None, vec![rate("DBK")]),
                property(Some(""), vec![rate("STK")]),
            ],
            ..Default::default()
        };

        assert_eq!(builder.build_stats_report(&response, false).unwrap(), None);
        assert_eq!(builder.log_stats_report(&response, false), ReportOutcome::Skipped);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_report_sends_lines_to_sinks() {
        let (builder, sink) = builder();
        let (main, stats) = builder.report(
            Some(&sample_response()),
            Some(&sample_request()),
            false,
            &context(),
        );

        let main = main.line().unwrap().to_string();
        let stats = stats.line().unwrap().to_string();
        assert_eq!(sink.lines(SinkKind::Report), vec![main.clone()]);
        assert_eq!(sink.lines(SinkKind::StatsReport), vec![stats.clone()]);
        assert_eq!(sink.lines(SinkKind::Debug), vec![main, stats]);
    }

    #[test]
    fn test_report_without_response() {
        let (builder, sink) = builder();
        let outcomes = builder.report(None, Some(&sample_request()), false, &context());

        assert_eq!(outcomes, (ReportOutcome::Skipped, ReportOutcome::Skipped));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_malformed_room_type_suppresses_only_stats() {
        let (builder, sink) = builder();
        let response = AvailPricingResponse {
            transaction: TransactionType::Pricing,
            candidate_properties: vec![property(Some("HI"), vec![rate("D")])],
            ..Default::default()
        };

        let (main, stats) = builder.report(Some(&response), None, false, &context());
        assert!(matches!(main, ReportOutcome::Emitted(_)));
        assert_eq!(stats, ReportOutcome::Suppressed);
        assert!(sink.lines(SinkKind::StatsReport).is_empty());
    }

    #[test]
    fn test_sink_failure_is_suppressed() {
        let builder = ReportBuilder::new(
            ReportConfig::default(),
            Arc::new(StaticOtfVariables::new()),
            Arc::new(FailingSink),
        )
        .unwrap();

        let outcomes = builder.report(Some(&sample_response()), None, false, &context());
        assert_eq!(outcomes, (ReportOutcome::Suppressed, ReportOutcome::Suppressed));
    }

    #[test]
    fn test_debug_sink_failure_keeps_line_emitted() {
        let sink = Arc::new(DebugFailingSink::default());
        let builder = ReportBuilder::new(
            ReportConfig::default(),
            Arc::new(StaticOtfVariables::new()),
            sink.clone(),
        )
        .unwrap();

        let (main, stats) = builder.report(Some(&sample_response()), None, false, &context());
        let main = main.line().unwrap().to_string();
        let stats = stats.line().unwrap().to_string();
        assert_eq!(sink.memory.lines(SinkKind::Report), vec![main]);
        assert_eq!(sink.memory.lines(SinkKind::StatsReport), vec![stats]);
    }

    #[test]
    fn test_builder_rejects_invalid_separators() {
        let mut config = ReportConfig::default();
        config.separators.value = config.separators.field.clone();
        let result = ReportBuilder::new(
            config,
            Arc::new(StaticOtfVariables::new()),
            Arc::new(MemorySink::new()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));

        let mut config = ReportConfig::default();
        config.separators.section.clear();
        let result = ReportBuilder::new(
            config,
            Arc::new(StaticOtfVariables::new()),
            Arc::new(MemorySink::new()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_context_from_request() {
        let request = sample_request();
        let resolver = |rq: &AvailPricingRequest| {
            let channel = if rq.for_leisure { "LEI" } else { "1A" };
            (channel.to_string(), "WEB".to_string())
        };
        let transaction_ids = FixedTransactionId(Some("ATID99".to_string()));

        let context = ReportContext::from_request(Some(&request), Instant::now(), &transaction_ids, &resolver);
        assert_eq!(context.atid, "ATID99");
        assert_eq!(context.office_id, "NCE1A0950");
        assert_eq!(context.channel, "1A");
        assert_eq!(context.sub_channel, "WEB");
        assert_eq!(context.providers, "mixed");
        assert_eq!(context.requested_rates, "RAC-PRO");
        assert!(context.crawling);
        assert!(!context.sampling);
        assert!(context.response_time >= 0.0);

        let context = ReportContext::from_request(None, Instant::now(), &FixedTransactionId(None), &resolver);
        assert_eq!(context.atid, "");
        assert_eq!(context.office_id, "");
        assert_eq!(context.channel, "");
        assert_eq!(context.providers, "");
        assert!(!context.crawling);
    }

    #[test]
    fn test_explicit_context() {
        let context = ReportContext::new(Instant::now(), "ATID01", "NCE1A0950", "1A", "WEB", "RAC");
        assert_eq!(context.providers, "");
        assert!(!context.crawling);
        assert!(!context.sampling);
    }
}
