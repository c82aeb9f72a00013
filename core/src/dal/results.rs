//! Generic DAL result sets and row records

use crate::error::{DalError, Result};
use crate::votable::{Field, TableData, Value, VoTable};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use url::Url;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A query result set: the first table of the response plus its origin URL
#[derive(Debug, Clone)]
pub struct DalResults {
    table: TableData,
    url: Url,
    by_name: HashMap<String, usize>,
}

impl DalResults {
    /// Build a result set from a parsed VOTable.
    ///
    /// The first TABLE in document order holds the results; a response
    /// without one is a format error.
    pub fn from_votable(votable: VoTable, url: Url) -> Result<Self> {
        let table = votable
            .first_table()
            .cloned()
            .ok_or_else(|| DalError::format("response contains no result table"))?;

        let by_name = table
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.to_ascii_lowercase(), i))
            .collect();

        Ok(Self {
            table,
            url,
            by_name,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    /// Whether the result set has no rows
    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    /// The URL the results came from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Column metadata in table order
    pub fn fields(&self) -> &[Field] {
        &self.table.fields
    }

    /// Column names in table order
    pub fn fieldnames(&self) -> Vec<&str> {
        self.table.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Find a column by name, exact match first, then case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.table
            .fields
            .iter()
            .position(|f| f.name == name)
            .or_else(|| self.by_name.get(&name.to_ascii_lowercase()).copied())
    }

    /// Find a column by its UCD
    pub fn index_by_ucd(&self, ucd: &str) -> Option<usize> {
        self.table.fields.iter().position(|f| {
            f.ucd
                .as_deref()
                .is_some_and(|u| u.eq_ignore_ascii_case(ucd))
        })
    }

    /// Find a column by utype, tolerating a different namespace prefix
    pub fn index_by_utype(&self, utype: &str) -> Option<usize> {
        let target = strip_utype_prefix(utype);
        self.table.fields.iter().position(|f| {
            f.utype
                .as_deref()
                .is_some_and(|u| strip_utype_prefix(u).eq_ignore_ascii_case(target))
        })
    }

    /// Look up one cell by column name and row index
    pub fn value(&self, name: &str, row: usize) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.table.rows.get(row)?.get(col)
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        if index < self.len() {
            Some(Record {
                results: self,
                index,
            })
        } else {
            None
        }
    }

    /// Iterate over all rows
    pub fn iter(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.len()).map(move |index| Record {
            results: self,
            index,
        })
    }

    fn row(&self, index: usize) -> &[Value] {
        &self.table.rows[index]
    }
}

/// A single result row, borrowing its result set
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    results: &'a DalResults,
    index: usize,
}

impl<'a> Record<'a> {
    /// Zero-based row index
    pub fn index(&self) -> usize {
        self.index
    }

    /// The result set this row belongs to
    pub fn results(&self) -> &'a DalResults {
        self.results
    }

    /// All cells of the row in column order
    pub fn values(&self) -> &'a [Value] {
        self.results.row(self.index)
    }

    /// Cell by column name
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let col = self.results.column_index(name)?;
        self.values().get(col)
    }

    /// Cell by column UCD
    pub fn get_by_ucd(&self, ucd: &str) -> Option<&'a Value> {
        let col = self.results.index_by_ucd(ucd)?;
        self.values().get(col)
    }

    /// Cell by column utype
    pub fn get_by_utype(&self, utype: &str) -> Option<&'a Value> {
        let col = self.results.index_by_utype(utype)?;
        self.values().get(col)
    }

    /// String cell by column name
    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Float cell by column name
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Integer cell by column name
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Boolean cell by column name
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }
}

fn strip_utype_prefix(utype: &str) -> &str {
    match utype.split_once(':') {
        Some((_, rest)) => rest,
        None => utype,
    }
}

/// Convert a Modified Julian Date to a UTC timestamp.
///
/// Out-of-range values (chrono caps at year 262143) return `None`.
pub fn mjd_to_datetime(mjd: f64) -> Option<DateTime<Utc>> {
    if !mjd.is_finite() {
        return None;
    }
    let epoch = Utc.with_ymd_and_hms(1858, 11, 17, 0, 0, 0).single()?;
    let millis = (mjd * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::votable::VoTable;
    use chrono::Datelike;

    fn sample_results() -> DalResults {
        let doc = r#"<VOTABLE><RESOURCE>
            <INFO name="QUERY_STATUS" value="OK"/>
            <TABLE>
              <FIELD name="Title" datatype="char" arraysize="*" utype="ssa:DataID.Title"/>
              <FIELD name="RA" datatype="double" ucd="POS_EQ_RA_MAIN"/>
              <FIELD name="Dec" datatype="double" ucd="POS_EQ_DEC_MAIN"/>
              <DATA><TABLEDATA>
                <TR><TD>first</TD><TD>188.7</TD><TD>12.3</TD></TR>
                <TR><TD>second</TD><TD>188.9</TD><TD>12.4</TD></TR>
              </TABLEDATA></DATA>
            </TABLE>
        </RESOURCE></VOTABLE>"#;
        let votable = VoTable::parse_str(doc).unwrap();
        let url = Url::parse("http://example.org/scs?RA=188.7").unwrap();
        DalResults::from_votable(votable, url).unwrap()
    }

    #[test]
    fn test_basic_accessors() {
        let results = sample_results();
        assert_eq!(results.len(), 2);
        assert!(!results.is_empty());
        assert_eq!(results.fieldnames(), vec!["Title", "RA", "Dec"]);
        assert_eq!(results.url().as_str(), "http://example.org/scs?RA=188.7");
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let results = sample_results();
        assert_eq!(results.column_index("Title"), Some(0));
        assert_eq!(results.column_index("title"), Some(0));
        assert_eq!(results.column_index("RA"), Some(1));
        assert_eq!(results.column_index("nope"), None);
    }

    #[test]
    fn test_lookup_by_ucd_and_utype() {
        let results = sample_results();
        assert_eq!(results.index_by_ucd("POS_EQ_RA_MAIN"), Some(1));
        assert_eq!(results.index_by_ucd("pos_eq_ra_main"), Some(1));
        assert_eq!(results.index_by_utype("ssa:DataID.Title"), Some(0));
        // different namespace prefix still resolves
        assert_eq!(results.index_by_utype("foo:DataID.Title"), Some(0));
    }

    #[test]
    fn test_record_getters() {
        let results = sample_results();
        let rec = results.record(1).unwrap();
        assert_eq!(rec.get_str("Title"), Some("second"));
        assert_eq!(rec.get_f64("RA"), Some(188.9));
        assert_eq!(rec.get_by_ucd("POS_EQ_DEC_MAIN").and_then(Value::as_f64), Some(12.4));
        assert!(results.record(2).is_none());
    }

    #[test]
    fn test_iteration_order() {
        let results = sample_results();
        let titles: Vec<_> = results
            .iter()
            .filter_map(|rec| rec.get_str("Title").map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[test]
    fn test_no_table_is_format_error() {
        let doc = r#"<VOTABLE><RESOURCE><INFO name="QUERY_STATUS" value="OK"/></RESOURCE></VOTABLE>"#;
        let votable = VoTable::parse_str(doc).unwrap();
        let url = Url::parse("http://example.org/q").unwrap();
        assert!(DalResults::from_votable(votable, url).is_err());
    }

    #[test]
    fn test_mjd_conversion() {
        // MJD 0 is the epoch itself
        let epoch = mjd_to_datetime(0.0).unwrap();
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1858, 11, 17));

        // MJD 51544.0 is 2000-01-01T00:00:00Z
        let y2k = mjd_to_datetime(51544.0).unwrap();
        assert_eq!((y2k.year(), y2k.month(), y2k.day()), (2000, 1, 1));

        assert!(mjd_to_datetime(f64::NAN).is_none());
    }
}
