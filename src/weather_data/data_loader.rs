use crate::types::frequency::Frequency;
use crate::weather_data::error::WeatherDataError;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::sync::{Mutex, OnceCell};
use tokio::{fs, task};
use tokio_util::io::StreamReader;

const BULK_URL: &str = "https://bulk.meteostat.net/v2";

type FrameKey = (String, Frequency);

/// Downloads Meteostat bulk CSV files and keeps them as parquet on disk.
///
/// Each (station, frequency) is loaded at most once per loader: concurrent
/// requests for the same data set wait on the first one instead of
/// downloading and writing the same parquet file side by side. A failed load
/// is not remembered, so the next request tries again.
pub struct WeatherDataLoader {
    cache_dir: PathBuf,
    bulk_url: String,
    download_client: Client,
    frames: Mutex<HashMap<FrameKey, Arc<OnceCell<LazyFrame>>>>,
}

impl WeatherDataLoader {
    pub fn new(cache_dir: &Path) -> WeatherDataLoader {
        Self::with_bulk_url(cache_dir, BULK_URL)
    }

    pub(crate) fn with_bulk_url(cache_dir: &Path, bulk_url: &str) -> WeatherDataLoader {
        WeatherDataLoader {
            cache_dir: cache_dir.to_path_buf(),
            bulk_url: bulk_url.trim_end_matches('/').to_string(),
            download_client: Client::new(),
            frames: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn cache_path(&self, frequency: Frequency, station: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}.parquet", frequency.cache_file_prefix(), station))
    }

    /// Returns a lazy scan over the cached parquet file for `station`,
    /// downloading and converting the bulk CSV first when it is not cached.
    ///
    /// Columns are named after [`Frequency`]'s schema (`tmin`, `prcp`, ...).
    pub async fn get_frame(
        &self,
        frequency: Frequency,
        station: &str,
    ) -> Result<LazyFrame, WeatherDataError> {
        let cell = {
            let mut frames = self.frames.lock().await;
            frames
                .entry((station.to_string(), frequency))
                .or_default()
                .clone()
        };
        cell.get_or_try_init(|| self.load_frame(frequency, station))
            .await
            .cloned()
    }

    async fn load_frame(
        &self,
        frequency: Frequency,
        station: &str,
    ) -> Result<LazyFrame, WeatherDataError> {
        let parquet_path = self.cache_path(frequency, station);

        if fs::try_exists(&parquet_path).await.unwrap_or(false) {
            info!(
                "Cache hit for {} data for station {} at {:?}",
                frequency, station, parquet_path
            );
        } else {
            warn!(
                "Cache miss for {} data for station {}, downloading",
                frequency, station
            );
            let raw_bytes = self.download(frequency, station).await?;
            let df = Self::csv_to_dataframe(raw_bytes, station, frequency).await?;

            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(|e| WeatherDataError::CacheDirCreation(self.cache_dir.clone(), e))?;
            Self::cache_dataframe(df, &parquet_path).await?;
            info!(
                "Cached {} data for station {} to {:?}",
                frequency, station, parquet_path
            );
        }

        LazyFrame::scan_parquet(&parquet_path, Default::default())
            .map_err(|e| WeatherDataError::ParquetScan(parquet_path.clone(), e))
    }

    async fn download(
        &self,
        frequency: Frequency,
        station: &str,
    ) -> Result<Vec<u8>, WeatherDataError> {
        let url = format!(
            "{}/{}/{}.csv.gz",
            self.bulk_url,
            frequency.path_segment(),
            station
        );
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherDataError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(status) => WeatherDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => WeatherDataError::NetworkRequest(url, e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut decoder = GzipDecoder::new(StreamReader::new(stream));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).await?;
        info!(
            "Downloaded and decompressed {} bytes for station {}",
            decompressed.len(),
            station
        );
        Ok(decompressed)
    }

    /// Parses headerless bulk CSV bytes and names the columns after the
    /// frequency's schema.
    pub(crate) async fn csv_to_dataframe(
        bytes: Vec<u8>,
        station: &str,
        frequency: Frequency,
    ) -> Result<DataFrame, WeatherDataError> {
        let station = station.to_string();
        let schema_names = frequency.schema_column_names();

        task::spawn_blocking(move || {
            let csv_io = |source: std::io::Error| WeatherDataError::CsvReadIo {
                station: station.clone(),
                source,
            };
            let mut temp_file = NamedTempFile::new().map_err(csv_io)?;
            temp_file.write_all(&bytes).map_err(csv_io)?;
            temp_file.flush().map_err(csv_io)?;

            let csv_polars = |source: PolarsError| WeatherDataError::CsvReadPolars {
                station: station.clone(),
                source,
            };
            let mut df = CsvReadOptions::default()
                .with_has_header(false)
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(csv_polars)?
                .finish()
                .map_err(csv_polars)?;

            if df.width() != schema_names.len() {
                warn!(
                    "CSV column count ({}) does not match schema length ({}) for station {} and type {}",
                    df.width(),
                    schema_names.len(),
                    station,
                    frequency
                );
                return Err(WeatherDataError::SchemaMismatch {
                    station,
                    frequency,
                    expected: schema_names.len(),
                    found: df.width(),
                });
            }

            df.set_column_names(schema_names.iter().copied())
                .map_err(|source| WeatherDataError::ColumnRename { station, source })?;
            Ok(df)
        })
        .await?
    }

    pub(crate) async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), WeatherDataError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| WeatherDataError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| WeatherDataError::ParquetWritePolars(path_buf, e))?;
            Ok::<(), WeatherDataError>(())
        })
        .await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMALS_CSV: &str = "1991,2020,1,-2.1,3.4,42.0,14.2,1018.4,60\n\
                               1991,2020,2,-1.6,4.9,33.5,13.9,1017.1,90\n";

    #[tokio::test]
    async fn csv_gets_schema_column_names() -> Result<(), WeatherDataError> {
        let df = WeatherDataLoader::csv_to_dataframe(
            NORMALS_CSV.as_bytes().to_vec(),
            "10382",
            Frequency::Normals,
        )
        .await?;
        assert_eq!(df.shape(), (2, 9));
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, Frequency::Normals.schema_column_names());
        Ok(())
    }

    #[tokio::test]
    async fn csv_with_wrong_width_is_rejected() {
        let result = WeatherDataLoader::csv_to_dataframe(
            NORMALS_CSV.as_bytes().to_vec(),
            "10382",
            Frequency::Hourly,
        )
        .await;
        assert!(matches!(
            result,
            Err(WeatherDataError::SchemaMismatch {
                expected: 13,
                found: 9,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn cached_parquet_is_served_without_download() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let loader = WeatherDataLoader::new(dir.path());
        let df = WeatherDataLoader::csv_to_dataframe(
            NORMALS_CSV.as_bytes().to_vec(),
            "99999",
            Frequency::Normals,
        )
        .await?;
        WeatherDataLoader::cache_dataframe(df, &loader.cache_path(Frequency::Normals, "99999"))
            .await?;

        let frame = loader.get_frame(Frequency::Normals, "99999").await?;
        assert_eq!(frame.collect()?.height(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn frames_are_loaded_once_per_station() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // Nothing listens here, so any download attempt fails.
        let loader = WeatherDataLoader::with_bulk_url(dir.path(), "http://127.0.0.1:9");
        let path = loader.cache_path(Frequency::Normals, "99999");

        let missing = loader.get_frame(Frequency::Normals, "99999").await;
        assert!(matches!(missing, Err(WeatherDataError::NetworkRequest(..))));

        let df = WeatherDataLoader::csv_to_dataframe(
            NORMALS_CSV.as_bytes().to_vec(),
            "99999",
            Frequency::Normals,
        )
        .await?;
        WeatherDataLoader::cache_dataframe(df, &path).await?;

        let (first, second) = tokio::join!(
            loader.get_frame(Frequency::Normals, "99999"),
            loader.get_frame(Frequency::Normals, "99999"),
        );
        assert_eq!(first?.collect()?.height(), 2);
        assert_eq!(second?.collect()?.height(), 2);

        // With the parquet file gone a fresh load would have to download.
        std::fs::remove_file(&path)?;
        assert!(loader.get_frame(Frequency::Normals, "99999").await.is_ok());
        assert_eq!(loader.frames.lock().await.len(), 1);
        Ok(())
    }
}
