//! City name to provider location id lookup.

use std::{fs::File, io::Read, path::Path};

use thiserror::Error;

use crate::model::{CityId, CityRecord};

/// Columns every city list must carry.
pub const REQUIRED_COLUMNS: [&str; 7] =
    ["序号", "城市ID", "行政归属", "城市简称", "拼音", "lat", "lon"];

const BUNDLED_CITIES: &str = include_str!("../data/cities.csv");

/// Administrative suffixes ("city", "district") ignored when matching.
const IGNORED_SUFFIXES: [char; 2] = ['市', '区'];

#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to open city list {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("city list is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("city list has no readable header: {0}")]
    Header(#[source] csv::Error),

    #[error("malformed city list row at line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Read-only table of cities, kept in file order.
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    records: Vec<CityRecord>,
}

impl CityTable {
    /// Parse a CSV city list with a header row.
    pub fn load<R: Read>(source: R) -> Result<Self, GazetteerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(source);

        let headers = reader.headers().map_err(GazetteerError::Header)?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GazetteerError::MissingColumns(missing));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<CityRecord>() {
            let record = row.map_err(|source| GazetteerError::Row {
                line: source.position().map(|p| p.line()).unwrap_or_default(),
                source,
            })?;
            records.push(record);
        }

        tracing::debug!(cities = records.len(), "city list loaded");
        Ok(Self { records })
    }

    pub fn from_path(path: &Path) -> Result<Self, GazetteerError> {
        let file = File::open(path).map_err(|source| GazetteerError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(file)
    }

    /// The small city list compiled into the library.
    pub fn bundled() -> Result<Self, GazetteerError> {
        Self::load(BUNDLED_CITIES.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    /// Find the location id for a user query such as `北京市` or `北京/朝阳区`.
    ///
    /// Every `市`/`区` is dropped from the query, then the first row whose
    /// short name ends with what remains wins. Duplicate short names are not
    /// ranked: file order decides.
    pub fn resolve(&self, query: &str) -> Option<&CityId> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return None;
        }

        self.records
            .iter()
            .find(|record| record.short_name.trim().ends_with(normalized.as_str()))
            .map(|record| &record.id)
    }
}

fn normalize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| !IGNORED_SUFFIXES.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
序号,城市ID,行政归属,城市简称,拼音,lat,lon
1,WX4FBXXFKE4W,中国/北京,北京,beijing,39.90403,116.407526
2,WX4FTESTCHAO,中国/北京/北京,北京/朝阳,chaoyang,39.92147,116.44311
3,WXSAMPLEHD01,中国/北京/北京,北京/海淀,haidian,39.95933,116.29845
4,WXDUPCHAOYAN,中国/辽宁,朝阳,chaoyang,41.57348,120.45080
";

    fn table() -> CityTable {
        CityTable::load(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn loads_rows_in_file_order() {
        let table = table();
        assert_eq!(table.len(), 4);
        assert_eq!(table.records()[0].short_name, "北京");
        assert_eq!(table.records()[1].id.as_str(), "WX4FTESTCHAO");
        assert!((table.records()[0].lat - 39.90403).abs() < 1e-9);
    }

    #[test]
    fn resolves_exact_and_suffixed_names() {
        let table = table();
        assert_eq!(table.resolve("北京").unwrap().as_str(), "WX4FBXXFKE4W");
        assert_eq!(table.resolve("北京市").unwrap().as_str(), "WX4FBXXFKE4W");
        assert_eq!(table.resolve("  北京市 ").unwrap().as_str(), "WX4FBXXFKE4W");
    }

    #[test]
    fn resolves_district_form() {
        let table = table();
        assert_eq!(table.resolve("北京/海淀区").unwrap().as_str(), "WXSAMPLEHD01");
        assert_eq!(table.resolve("北京/朝阳").unwrap().as_str(), "WX4FTESTCHAO");
    }

    #[test]
    fn bare_district_name_takes_first_suffix_match() {
        // "朝阳" is a suffix of both "北京/朝阳" and "朝阳"; the earlier row wins.
        let table = table();
        assert_eq!(table.resolve("朝阳").unwrap().as_str(), "WX4FTESTCHAO");
    }

    #[test]
    fn unknown_or_empty_query_resolves_to_none() {
        let table = table();
        assert!(table.resolve("火星").is_none());
        assert!(table.resolve("").is_none());
        assert!(table.resolve("市区").is_none());
    }

    #[test]
    fn missing_columns_are_reported() {
        let csv = "序号,城市ID,城市简称,lat,lon\n1,X,北京,1.0,2.0\n";
        let err = CityTable::load(csv.as_bytes()).unwrap_err();

        match err {
            GazetteerError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["行政归属".to_string(), "拼音".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_coordinates_fail_the_load() {
        let csv = "\
序号,城市ID,行政归属,城市简称,拼音,lat,lon
1,X,中国,北京,beijing,north,116.4
";
        let err = CityTable::load(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, GazetteerError::Row { .. }));
    }

    #[test]
    fn bundled_list_contains_beijing() {
        let table = CityTable::bundled().unwrap();
        assert_eq!(table.resolve("北京").unwrap().as_str(), "WX4FBXXFKE4W");
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = CityTable::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, GazetteerError::Open { .. }));
    }
}
