//! Report definitions, download and CSV normalization.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::AdsError;
use crate::selector::{Predicate, Selector};

const REPORT_NAME: &str = "EasyAdWords Report";

/// Kind of report to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportType {
    AccountPerformance,
    AdPerformance,
    CampaignPerformance,
    FinalUrl,
    KeywordsPerformance,
    SearchQueryPerformance,
    /// Any report type not listed above, by its wire name.
    Custom(String),
}

impl ReportType {
    pub fn as_str(&self) -> &str {
        match self {
            ReportType::AccountPerformance => "ACCOUNT_PERFORMANCE_REPORT",
            ReportType::AdPerformance => "AD_PERFORMANCE_REPORT",
            ReportType::CampaignPerformance => "CAMPAIGN_PERFORMANCE_REPORT",
            ReportType::FinalUrl => "FINAL_URL_REPORT",
            ReportType::KeywordsPerformance => "KEYWORDS_PERFORMANCE_REPORT",
            ReportType::SearchQueryPerformance => "SEARCH_QUERY_PERFORMANCE_REPORT",
            ReportType::Custom(name) => name,
        }
    }
}

impl Serialize for ReportType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRangeType {
    CustomDate,
    AllTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadFormat {
    Csv,
}

/// Which columns, rows and dates a report covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub fields: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportConfig {
    pub fn new<I, S>(fields: I) -> Result<Self, AdsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = Self {
            fields: fields.into_iter().map(Into::into).collect(),
            predicates: Vec::new(),
            start_date: None,
            end_date: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Result<Self, AdsError> {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.validate()?;
        Ok(self)
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn validate(&self) -> Result<(), AdsError> {
        if self.fields.is_empty() {
            return Err(AdsError::Configuration(
                "Fields must be set for getting a report".to_string(),
            ));
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AdsError::Configuration(format!(
                "Report start date {} is after end date {}",
                start, end
            ))),
            (Some(_), None) | (None, Some(_)) => Err(AdsError::Configuration(
                "Report start and end dates must be given together".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Builds the definition sent to the report download endpoint.
    pub fn definition(&self, report_type: ReportType) -> Result<ReportDefinition, AdsError> {
        self.validate()?;

        let mut builder = Selector::builder()
            .fields(self.fields.iter().cloned())
            .predicates(self.predicates.iter().cloned());
        let date_range_type = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                builder = builder.date_range(start, end);
                DateRangeType::CustomDate
            }
            _ => DateRangeType::AllTime,
        };

        Ok(ReportDefinition {
            selector: builder.build()?,
            report_name: REPORT_NAME.to_string(),
            date_range_type,
            report_type,
            download_format: DownloadFormat::Csv,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    pub selector: Selector,
    pub report_name: String,
    pub date_range_type: DateRangeType,
    pub report_type: ReportType,
    pub download_format: DownloadFormat,
}

/// Remote report download capability. Returns the raw CSV body.
#[async_trait]
pub trait ReportDownloader: Send + Sync {
    async fn download(&self, definition: &ReportDefinition) -> Result<String, AdsError>;
}

pub struct Report;

impl Report {
    /// Downloads one report as raw CSV.
    pub async fn download<D>(
        downloader: &D,
        config: &ReportConfig,
        report_type: ReportType,
    ) -> Result<RawReport, AdsError>
    where
        D: ReportDownloader + ?Sized,
    {
        let definition = config.definition(report_type)?;
        tracing::info!(
            "Downloading {} with {} fields",
            definition.report_type.as_str(),
            definition.selector.fields().len()
        );
        let body = downloader.download(&definition).await?;
        Ok(RawReport {
            report_type: definition.report_type,
            body,
        })
    }
}

/// Report body exactly as downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReport {
    pub report_type: ReportType,
    pub body: String,
}

impl RawReport {
    /// Splits the CSV body into a header row and data rows, dropping blank lines.
    pub fn format(&self) -> FormattedReport {
        let mut records = parse_csv(&self.body).into_iter();
        let headers = records.next().unwrap_or_default();
        FormattedReport {
            headers,
            rows: records.collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FormattedReport {
    /// Rows as objects keyed by header. Extra cells without a header are dropped;
    /// missing trailing cells are omitted.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let object: Map<String, Value> = self
                        .headers
                        .iter()
                        .zip(row.iter())
                        .map(|(header, cell)| (header.clone(), Value::String(cell.clone())))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        )
    }

    /// Column values for `header`, one per row.
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == header)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Parses comma-separated records with double-quote quoting.
///
/// Quoted fields may contain commas, newlines and doubled quotes. `\r\n` and `\n`
/// both end a record. Records consisting of a single empty, unquoted cell
/// (blank lines) are skipped.
pub fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_record = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quoted_record = true;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record), quoted_record);
                quoted_record = false;
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() || quoted_record {
        record.push(field);
        push_record(&mut records, record, quoted_record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>, quoted: bool) {
    let blank = !quoted && record.len() == 1 && record[0].is_empty();
    if !blank {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_rows_and_blank_lines() {
        let rows = parse_csv("Campaign,Clicks\nBrand,10\n\nGeneric,3\n");
        assert_eq!(
            rows,
            vec![
                vec!["Campaign", "Clicks"],
                vec!["Brand", "10"],
                vec!["Generic", "3"],
            ]
        );
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse_csv("Name,Note\r\n\"Shoes, Boots\",\"He said \"\"hi\"\"\"\r\n\"multi\nline\",x");
        assert_eq!(rows[1], vec!["Shoes, Boots", "He said \"hi\""]);
        assert_eq!(rows[2], vec!["multi\nline", "x"]);
    }

    #[test]
    fn test_parse_keeps_empty_cells() {
        let rows = parse_csv("a,,c\n,\n\"\"\n");
        assert_eq!(rows[0], vec!["a", "", "c"]);
        assert_eq!(rows[1], vec!["", ""]);
        assert_eq!(rows[2], vec![""]);
    }

    #[test]
    fn test_format_and_json() {
        let raw = RawReport {
            report_type: ReportType::CampaignPerformance,
            body: "CampaignId,Clicks\n1,10\n2,0\n".to_string(),
        };

        let report = raw.format();

        assert_eq!(report.headers, vec!["CampaignId", "Clicks"]);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.column("Clicks"), Some(vec!["10", "0"]));
        assert_eq!(
            report.to_json(),
            json!([
                {"CampaignId": "1", "Clicks": "10"},
                {"CampaignId": "2", "Clicks": "0"}
            ])
        );
    }

    #[test]
    fn test_empty_body_formats_to_empty_report() {
        let raw = RawReport {
            report_type: ReportType::Custom("LABEL_REPORT".to_string()),
            body: String::new(),
        };
        assert_eq!(raw.format(), FormattedReport::default());
    }

    #[test]
    fn test_config_requires_fields() {
        let err = ReportConfig::new(Vec::<String>::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_config_date_rules() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let config = ReportConfig::new(["Clicks"]).unwrap();
        assert!(config.clone().with_dates(feb, jan).is_err());

        let mut half = config.clone();
        half.start_date = Some(jan);
        assert!(half.validate().is_err());

        assert!(config.with_dates(jan, feb).is_ok());
    }

    #[test]
    fn test_definition_wire_shape() {
        let config = ReportConfig::new(["CampaignId", "Clicks"])
            .unwrap()
            .with_dates(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            )
            .unwrap();

        let definition = config.definition(ReportType::CampaignPerformance).unwrap();

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "selector": {
                    "fields": ["CampaignId", "Clicks"],
                    "dateRange": {"min": "20240301", "max": "20240331"}
                },
                "reportName": "EasyAdWords Report",
                "dateRangeType": "CUSTOM_DATE",
                "reportType": "CAMPAIGN_PERFORMANCE_REPORT",
                "downloadFormat": "CSV"
            })
        );
    }

    #[test]
    fn test_definition_without_dates_is_all_time() {
        let definition = ReportConfig::new(["Clicks"])
            .unwrap()
            .definition(ReportType::Custom("LABEL_REPORT".to_string()))
            .unwrap();
        assert_eq!(definition.date_range_type, DateRangeType::AllTime);
        assert!(definition.selector.date_range().is_none());
    }
}
