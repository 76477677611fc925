//! Weather service: loads the historical weather dataset once at startup
//!
//! The dataset is an Open-Meteo hourly CSV export. A short location
//! preamble precedes the column header; column names carry their unit in
//! parentheses (`temperature_2m (°C)`).

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use shared::{WeatherReading, WeatherTable, KMH_TO_MPS};

/// Header names (unit suffix stripped) of the columns the table uses
const TIME_COLUMN: &str = "time";
const TEMPERATURE_COLUMN: &str = "temperature_2m";
const ET0_COLUMN: &str = "et0_fao_evapotranspiration";
const WIND_COLUMN: &str = "wind_speed_10m";
const SOIL_MOISTURE_COLUMN: &str = "soil_moisture_0_to_1cm";
const PRECIPITATION_COLUMN: &str = "precipitation";

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Summary of a dataset load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub dropped_rows: usize,
    pub missing_columns: Vec<&'static str>,
}

/// Holds the read-only weather table, if one could be loaded
#[derive(Debug, Default)]
pub struct WeatherService {
    table: Option<WeatherTable>,
}

impl WeatherService {
    pub fn new(table: Option<WeatherTable>) -> Self {
        Self { table }
    }

    /// Service with no data; every lookup falls back to climate defaults
    pub fn unavailable() -> Self {
        Self { table: None }
    }

    /// Load the dataset, degrading to an unavailable table on failure
    pub fn load(path: impl AsRef<Path>, header_rows: usize) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::File::open(path)
            .map_err(anyhow::Error::from)
            .and_then(|file| read_weather_csv(file, header_rows));

        match loaded {
            Ok((table, report)) => {
                for column in &report.missing_columns {
                    tracing::warn!("Weather column '{}' not found, its default will be used", column);
                }
                if report.dropped_rows > 0 {
                    tracing::warn!(
                        "Dropped {} weather rows with unparseable timestamps",
                        report.dropped_rows
                    );
                }
                match table.coverage() {
                    Some(coverage) => tracing::info!(
                        "Weather data loaded from {}: {} rows, {} days, dates from {}",
                        path.display(),
                        report.rows,
                        table.day_count(),
                        coverage
                    ),
                    None => tracing::warn!("Weather data at {} contains no usable rows", path.display()),
                }
                Self::new(Some(table))
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load weather data from {}: {}. Default climate values will be used",
                    path.display(),
                    e
                );
                Self::unavailable()
            }
        }
    }

    pub fn table(&self) -> Option<&WeatherTable> {
        self.table.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }
}

fn column_key(header: &str) -> &str {
    header.split(" (").next().unwrap_or(header).trim()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an Open-Meteo CSV export into a weather table
pub fn read_weather_csv(
    mut reader: impl Read,
    header_rows: usize,
) -> anyhow::Result<(WeatherTable, LoadReport)> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let body: Vec<&str> = content
        .lines()
        .skip(header_rows)
        .skip_while(|line| line.trim().is_empty())
        .collect();
    let body = body.join("\n");

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| column_key(h) == name);

    let time_idx = position(TIME_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("weather data has no '{}' column", TIME_COLUMN))?;

    let mut report = LoadReport::default();
    let mut locate = |name: &'static str| {
        let idx = position(name);
        if idx.is_none() {
            report.missing_columns.push(name);
        }
        idx
    };
    let temperature_idx = locate(TEMPERATURE_COLUMN);
    let et0_idx = locate(ET0_COLUMN);
    let wind_idx = locate(WIND_COLUMN);
    let soil_idx = locate(SOIL_MOISTURE_COLUMN);
    let precip_idx = locate(PRECIPITATION_COLUMN);

    let mut readings = Vec::new();
    for record in csv_reader.records() {
        let Ok(record) = record else {
            report.dropped_rows += 1;
            continue;
        };
        let Some(timestamp) = record.get(time_idx).and_then(parse_timestamp) else {
            report.dropped_rows += 1;
            continue;
        };
        let cell = |idx: Option<usize>| parse_number(idx.and_then(|i| record.get(i)));

        readings.push(WeatherReading {
            timestamp,
            temperature_c: cell(temperature_idx),
            et0_mm: cell(et0_idx),
            wind_speed_mps: cell(wind_idx).map(|kmh| kmh * KMH_TO_MPS),
            soil_moisture: cell(soil_idx),
            precipitation_mm: cell(precip_idx),
        });
    }

    report.rows = readings.len();
    Ok((WeatherTable::from_readings(readings), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "latitude,longitude,elevation,utc_offset_seconds,timezone,timezone_abbreviation
42.9,71.37,620.0,21600,Asia/Almaty,GMT+6

time,temperature_2m (°C),et0_fao_evapotranspiration (mm),wind_speed_10m (km/h),soil_moisture_0_to_1cm (m³/m³),precipitation (mm)
2025-06-01T00:00,16.0,0.05,7.2,0.30,0.0
2025-06-01T01:00,18.0,0.15,14.4,0.28,1.2
not-a-time,99.0,9.9,99.0,0.99,99.0
2025-06-02T00:00,,0.10,n/a,0.25,0.3
";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_reads_open_meteo_export() {
        let (table, report) = read_weather_csv(EXPORT.as_bytes(), 2).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.dropped_rows, 1);
        assert!(report.missing_columns.is_empty());
        assert_eq!(table.day_count(), 2);

        let day = table.daily(date("2025-06-01")).unwrap();
        assert_eq!(day.avg_temperature_c, Some(17.0));
        assert!((day.et0_mm.unwrap() - 0.1).abs() < 1e-12);
        // (7.2 + 14.4) / 2 km/h = 10.8 km/h = 3 m/s
        assert!((day.wind_speed_mps.unwrap() - 3.0).abs() < 1e-9);
        assert!((day.precipitation_mm - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_unparseable_cells_are_null() {
        let (table, _) = read_weather_csv(EXPORT.as_bytes(), 2).unwrap();
        let day = table.daily(date("2025-06-02")).unwrap();
        assert_eq!(day.avg_temperature_c, None);
        assert_eq!(day.wind_speed_mps, None);
        assert_eq!(day.soil_moisture, Some(0.25));
    }

    #[test]
    fn test_missing_optional_column_is_reported() {
        let csv = "time,temperature_2m (°C),precipitation (mm)\n2025-06-01,20.0,1.0\n";
        let (table, report) = read_weather_csv(csv.as_bytes(), 0).unwrap();
        assert_eq!(
            report.missing_columns,
            vec![ET0_COLUMN, WIND_COLUMN, SOIL_MOISTURE_COLUMN]
        );
        let day = table.daily(date("2025-06-01")).unwrap();
        assert_eq!(day.avg_temperature_c, Some(20.0));
        assert_eq!(day.et0_mm, None);
    }

    #[test]
    fn test_missing_time_column_fails() {
        let csv = "temperature_2m (°C)\n20.0\n";
        assert!(read_weather_csv(csv.as_bytes(), 0).is_err());
    }

    #[test]
    fn test_missing_file_degrades() {
        let service = WeatherService::load("/nonexistent/open-meteo.csv", 2);
        assert!(!service.is_ready());
        assert!(service.table().is_none());
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2025-06-01T13:00").is_some());
        assert!(parse_timestamp("2025-06-01 13:00:00").is_some());
        assert_eq!(
            parse_timestamp("2025-06-01").map(|t| t.date()),
            Some(date("2025-06-01"))
        );
        assert!(parse_timestamp("01/06/2025").is_none());
    }
}
