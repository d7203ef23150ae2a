use crate::error::Result;
use crate::indicators::all_keys;
use crate::types::{AuxValue, RawRow, RiskRecord};
use crate::util::{clean_text, parse_f64_safe, parse_u64_safe};
use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub duplicate_ids: usize,
    pub missing_indicators: usize,
}

pub fn load_and_clean<P: AsRef<Path>>(path: P) -> Result<(Vec<RiskRecord>, LoadReport)> {
    let file = std::fs::File::open(path.as_ref())?;
    info!(path = %path.as_ref().display(), "loading risk index");
    load_from_reader(file)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<RiskRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let aux_columns: Vec<(&'static str, Option<usize>)> = all_keys()
        .map(|key| (key, headers.iter().position(|h| h.trim() == key)))
        .collect();

    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut records: Vec<RiskRecord> = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let line = report.total_rows + 1;
        let row: StringRecord = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        let raw: RawRow = match row.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "row does not match the expected columns");
                report.parse_errors += 1;
                continue;
            }
        };

        let region_id = clean_text(raw.id);
        if region_id.is_empty() {
            warn!(line, "row has no region id");
            report.parse_errors += 1;
            continue;
        }

        let (hazard, vulnerability, exposure, risk) = match (
            parse_f64_safe(raw.hazard.as_deref()),
            parse_f64_safe(raw.vulnerability.as_deref()),
            parse_f64_safe(raw.exposure.as_deref()),
            parse_f64_safe(raw.risk.as_deref()),
        ) {
            (Some(h), Some(v), Some(e), Some(r)) => (h, v, e, r),
            _ => {
                warn!(line, region_id = %region_id, "missing indicator value");
                report.parse_errors += 1;
                continue;
            }
        };

        let mut record = RiskRecord {
            region_id,
            region_name: clean_text(raw.name),
            parent_name: clean_text(raw.parent_name),
            hazard,
            vulnerability,
            exposure,
            risk,
            population: parse_u64_safe(raw.population.as_deref()).unwrap_or(0),
            male: parse_u64_safe(raw.male.as_deref()).unwrap_or(0),
            female: parse_u64_safe(raw.female.as_deref()).unwrap_or(0),
            households: parse_u64_safe(raw.households.as_deref()).unwrap_or(0),
            auxiliary: BTreeMap::new(),
        };
        if let Err(e) = record.validate() {
            warn!(line, region_id = %record.region_id, error = %e, "indicator value out of range");
            report.parse_errors += 1;
            continue;
        }

        if !seen.insert(record.region_id.clone()) {
            warn!(line, region_id = %record.region_id, "duplicate region id skipped");
            report.duplicate_ids += 1;
            continue;
        }

        for (key, idx) in &aux_columns {
            let value = AuxValue::from_option(parse_f64_safe(idx.and_then(|i| row.get(i))));
            if value == AuxValue::NoData {
                report.missing_indicators += 1;
            }
            record.auxiliary.insert(key.to_string(), value);
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        errors = report.parse_errors,
        "risk index loaded"
    );
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
ID_2,NAME_2,NAME_1,Hazard,Vulnerabil,Exposure,Risk,Population,Male,Female,Households,Hz1,Hz2,Vu1
1,Alpha,North,0.5,0.2,0.9,0.61,\"12,500\",6000,6500,2100,0.33,,0.10
2,Beta,North,0.1,0.1,0.1,0.1,800,400,400,150,n/a,0.2,
3,Gamma,South,1.4,0.2,0.2,0.3,10,5,5,2,,,
,Nameless,South,0.1,0.1,0.1,0.1,10,5,5,2,,,
1,Alpha again,North,0.5,0.2,0.9,0.61,1,1,0,1,,,
";

    #[test]
    fn loads_valid_rows_and_counts_the_rest() {
        let (records, report) = load_from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(report.duplicate_ids, 1);
        assert_eq!(records[0].region_id, "1");
        assert_eq!(records[0].population, 12_500);
        assert_eq!(records[0].parent_name, "North");
    }

    #[test]
    fn auxiliary_columns_become_values_or_no_data() {
        let (records, _) = load_from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(records[0].aux("Hz1"), AuxValue::Value(0.33));
        assert_eq!(records[0].aux("Hz2"), AuxValue::NoData);
        // column absent from the file entirely
        assert_eq!(records[0].aux("Ep5"), AuxValue::NoData);
        assert_eq!(records[1].aux("Hz1"), AuxValue::NoData);
        assert_eq!(records[1].aux("Hz2"), AuxValue::Value(0.2));
    }

    #[test]
    fn out_of_range_and_missing_scores_are_parse_errors() {
        let csv = "\
ID_2,NAME_2,NAME_1,Hazard,Vulnerabil,Exposure,Risk
1,Alpha,North,0.5,0.2,0.9,0.61
2,Beta,North,0.5,-0.2,0.9,0.61
3,Gamma,North,0.5,0.2,,0.61
4,Delta,North,0.5,0.2,0.9,1
";
        let (records, report) = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(report.parse_errors, 2);
        let ids: Vec<&str> = records.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_and_clean("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, crate::error::RiskError::Io(_)));
    }
}
