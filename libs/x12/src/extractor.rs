//! Service-level extraction from 837 transactions
//!
//! Walks the segment stream with a small loop stack (interchange, functional
//! group, transaction, claim, service line) and emits one `ServiceRecord`
//! per service line, or one per claim when a claim has no service lines.
//! Claim-level context (diagnoses, dates, providers) is carried onto every
//! line of the claim.

use crate::delimiters::Delimiters;
use crate::error::{Error, Result};
use crate::segment::{Segment, SegmentScanner};
use chrono::NaiveDate;
use rafter_models::{normalize_diagnosis, ServiceRecord};
use tracing::debug;

/// Maximum number of procedure modifiers carried on a service line.
const MAX_MODIFIERS: usize = 4;

/// Transaction implementation kind, inferred from GS08/ST03.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TransactionKind {
    Professional,
    Institutional,
    #[default]
    Unknown,
}

impl TransactionKind {
    fn from_qualifier(qualifier: &str) -> Self {
        // 005010X222* is 837P, 005010X223* is 837I; the 4010 equivalents are
        // X098 and X096.
        if qualifier.contains("X222") || qualifier.contains("X098") {
            TransactionKind::Professional
        } else if qualifier.contains("X223") || qualifier.contains("X096") {
            TransactionKind::Institutional
        } else {
            TransactionKind::Unknown
        }
    }
}

/// 837 service-level extractor with its parsing policy.
#[derive(Debug, Clone)]
pub struct Extractor {
    /// When a professional line carries no diagnosis pointers, link every
    /// claim diagnosis (`true`, the default) or only the principal (`false`).
    pub link_all_when_pointers_absent: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            link_all_when_pointers_absent: true,
        }
    }
}

/// Extract service records from one or more ISA..IEA envelopes using the
/// default policy.
pub fn extract_service_records(input: &str) -> Result<Vec<ServiceRecord>> {
    Extractor::default().extract(input)
}

impl Extractor {
    pub fn extract(&self, input: &str) -> Result<Vec<ServiceRecord>> {
        let mut records = Vec::new();
        let mut remaining = input.trim_start();
        while !remaining.is_empty() {
            let delims = Delimiters::discover(remaining)?;
            let mut scanner = SegmentScanner::new(remaining, delims);
            let consumed = self.extract_interchange(&mut scanner, &mut records)?;
            remaining = remaining[consumed..].trim_start();
        }
        debug!(records = records.len(), "extracted service records");
        Ok(records)
    }

    /// Process segments up to and including the IEA; returns the number of
    /// input bytes consumed so multi-interchange inputs can resume.
    fn extract_interchange(
        &self,
        scanner: &mut SegmentScanner<'_>,
        out: &mut Vec<ServiceRecord>,
    ) -> Result<usize> {
        let delims = *scanner.delimiters();
        let mut kind = TransactionKind::Unknown;
        let mut claim: Option<ClaimScope> = None;

        while let Some(segment) = scanner.next_segment() {
            match segment.id {
                "ISA" => {}
                "GS" => {
                    kind = TransactionKind::from_qualifier(segment.element(8));
                }
                "ST" => {
                    self.flush(&mut claim, out);
                    if segment.element(1) != "837" {
                        kind = TransactionKind::Unknown;
                    } else {
                        let convention = segment.element(3);
                        if !convention.is_empty() {
                            kind = TransactionKind::from_qualifier(convention);
                        }
                    }
                }
                "SE" | "GE" | "HL" => {
                    self.flush(&mut claim, out);
                }
                "IEA" => {
                    self.flush(&mut claim, out);
                    return Ok(scanner.consumed());
                }
                "CLM" => {
                    self.flush(&mut claim, out);
                    claim = Some(ClaimScope::open(&segment, &delims, kind));
                }
                "HI" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.collect_diagnoses(&segment, &delims);
                    }
                }
                "DTP" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.collect_date(&segment);
                    }
                }
                "SV1" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.open_professional_line(&segment, &delims);
                    }
                }
                "SV2" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.open_institutional_line(&segment, &delims);
                    }
                }
                "SV3" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.open_dental_line(&segment, &delims);
                    }
                }
                "NM1" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.collect_provider(&segment);
                    }
                }
                "PRV" => {
                    if let Some(scope) = claim.as_mut() {
                        scope.collect_specialty(&segment);
                    }
                }
                _ => {}
            }
        }

        Err(Error::malformed(
            "interchange is not terminated by an IEA segment",
        ))
    }

    fn flush(&self, claim: &mut Option<ClaimScope>, out: &mut Vec<ServiceRecord>) {
        if let Some(scope) = claim.take() {
            out.extend(scope.finalize(self.link_all_when_pointers_absent));
        }
    }
}

/// Open claim (2300 loop) being collected.
#[derive(Debug, Default)]
struct ClaimScope {
    claim_type: String,
    bill_type: String,
    place_of_service: String,
    service_date: Option<NaiveDate>,
    through_date: Option<NaiveDate>,
    diagnoses: Vec<String>,
    specialty: String,
    npi: String,
    lines: Vec<LineScope>,
}

/// Open service line (2400 loop) being collected.
#[derive(Debug, Default)]
struct LineScope {
    procedure_code: Option<String>,
    modifiers: Vec<String>,
    place_of_service: String,
    pointers: Vec<usize>,
    service_date: Option<NaiveDate>,
    through_date: Option<NaiveDate>,
    specialty: String,
    npi: String,
}

impl ClaimScope {
    fn open(segment: &Segment<'_>, delims: &Delimiters, kind: TransactionKind) -> Self {
        let facility = segment.composite(5, delims);
        let facility_code = facility.first().copied().unwrap_or("");

        let mut scope = ClaimScope::default();
        match kind {
            TransactionKind::Professional => {
                scope.claim_type = "71".to_string();
                scope.place_of_service = facility_code.to_string();
            }
            TransactionKind::Institutional => {
                let prefix: String = facility_code.chars().take(2).collect();
                if prefix.len() == 2 {
                    scope.bill_type = format!("{prefix}X");
                }
                // Inpatient types of bill qualify every diagnosis; everything
                // else institutional is outpatient.
                scope.claim_type = if matches!(scope.bill_type.as_str(), "11X" | "41X") {
                    "73".to_string()
                } else {
                    "72".to_string()
                };
            }
            TransactionKind::Unknown => {}
        }
        scope
    }

    /// HI composites carry `qualifier:code`; ABK/BK mark the principal
    /// diagnosis and ABF/BF the secondaries. Other qualifiers (admitting,
    /// reason for visit, value codes) do not contribute.
    fn collect_diagnoses(&mut self, segment: &Segment<'_>, delims: &Delimiters) {
        for position in 1..=segment.elements.len() {
            let parts = segment.composite(position, delims);
            let qualifier = parts.first().copied().unwrap_or("");
            if !matches!(qualifier, "ABK" | "BK" | "ABF" | "BF") {
                continue;
            }
            let Some(raw) = parts.get(1) else { continue };
            let code = normalize_diagnosis(raw);
            if code.is_empty() || self.diagnoses.contains(&code) {
                continue;
            }
            if matches!(qualifier, "ABK" | "BK") {
                self.diagnoses.insert(0, code);
            } else {
                self.diagnoses.push(code);
            }
        }
    }

    fn collect_date(&mut self, segment: &Segment<'_>) {
        let (from, through) = parse_date_value(segment.element(2), segment.element(3));
        match segment.element(1) {
            "472" => {
                if let Some(line) = self.lines.last_mut() {
                    line.service_date = from;
                    line.through_date = through;
                } else if from.is_some() {
                    self.service_date = from;
                    self.through_date = through;
                }
            }
            "434" => {
                self.service_date = from;
                self.through_date = through;
            }
            _ => {}
        }
    }

    fn open_professional_line(&mut self, segment: &Segment<'_>, delims: &Delimiters) {
        let mut line = line_from_procedure(segment.composite(1, delims));
        line.place_of_service = segment.element(5).to_string();
        line.pointers = segment
            .composite(7, delims)
            .iter()
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .collect();
        self.lines.push(line);
    }

    fn open_institutional_line(&mut self, segment: &Segment<'_>, delims: &Delimiters) {
        // SV2-01 is the revenue code; the procedure composite is SV2-02.
        self.lines.push(line_from_procedure(segment.composite(2, delims)));
    }

    fn open_dental_line(&mut self, segment: &Segment<'_>, delims: &Delimiters) {
        self.lines.push(line_from_procedure(segment.composite(1, delims)));
    }

    /// NM1*82 is the rendering provider; its NM1-09 identifier is the NPI
    /// when NM1-08 is `XX`. Before the first service line the provider binds
    /// to the claim (2310); after it, to the line (2420).
    fn collect_provider(&mut self, segment: &Segment<'_>) {
        if segment.element(1) != "82" || segment.element(8) != "XX" {
            return;
        }
        let npi = segment.element(9).to_string();
        if npi.is_empty() {
            return;
        }
        match self.lines.last_mut() {
            Some(line) => line.npi = npi,
            None => self.npi = npi,
        }
    }

    fn collect_specialty(&mut self, segment: &Segment<'_>) {
        if segment.element(1) != "PE" {
            return;
        }
        let specialty = segment.element(3).to_string();
        if specialty.is_empty() {
            return;
        }
        match self.lines.last_mut() {
            Some(line) => line.specialty = specialty,
            None => self.specialty = specialty,
        }
    }

    fn finalize(self, link_all_when_pointers_absent: bool) -> Vec<ServiceRecord> {
        let base = ServiceRecord {
            claim_type: self.claim_type,
            bill_type: self.bill_type,
            service_date: self.service_date,
            through_date: self.through_date,
            place_of_service: self.place_of_service,
            procedure_code: None,
            procedure_modifiers: Vec::new(),
            diagnosis_codes: self.diagnoses,
            linked_diagnosis_pointers: Vec::new(),
            provider_specialty: self.specialty,
            performing_provider_npi: self.npi,
        };

        if self.lines.is_empty() {
            return vec![base];
        }

        self.lines
            .into_iter()
            .map(|line| {
                let mut record = base.clone();
                record.procedure_code = line.procedure_code;
                record.procedure_modifiers = line.modifiers;
                if line.service_date.is_some() {
                    record.service_date = line.service_date;
                    record.through_date = line.through_date;
                }
                if !line.place_of_service.is_empty() {
                    record.place_of_service = line.place_of_service;
                }
                if !line.specialty.is_empty() {
                    record.provider_specialty = line.specialty;
                }
                if !line.npi.is_empty() {
                    record.performing_provider_npi = line.npi;
                }
                let mut pointers: Vec<usize> = line
                    .pointers
                    .into_iter()
                    .filter(|&ptr| ptr >= 1 && ptr <= record.diagnosis_codes.len())
                    .collect();
                if pointers.is_empty()
                    && !link_all_when_pointers_absent
                    && !record.diagnosis_codes.is_empty()
                {
                    pointers = vec![1];
                }
                record.linked_diagnosis_pointers = pointers;
                record
            })
            .collect()
    }
}

/// Build a line from a `qualifier:code:modifier...` procedure composite.
fn line_from_procedure(parts: Vec<&str>) -> LineScope {
    let mut line = LineScope::default();
    if let Some(code) = parts.get(1).map(|c| c.trim()) {
        if !code.is_empty() {
            line.procedure_code = Some(code.to_ascii_uppercase());
        }
    }
    line.modifiers = parts
        .iter()
        .skip(2)
        .take(MAX_MODIFIERS)
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
        .collect();
    line
}

fn parse_d8(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").ok()
}

/// DTP values are `D8` single dates or `RD8` from-through ranges; malformed
/// values leave the fields unset.
fn parse_date_value(format: &str, value: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match format {
        "D8" => (parse_d8(value), None),
        "RD8" => match value.split_once('-') {
            Some((from, through)) => (parse_d8(from), parse_d8(through)),
            None => (None, None),
        },
        _ => (None, None),
    }
}
