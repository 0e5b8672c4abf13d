use crate::koppen::LatLon;
use crate::stations::error::LocateStationError;
use crate::types::frequency::{Frequency, RequiredData};
use crate::types::station::Station;
use async_compression::tokio::bufread::GzipDecoder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use futures_util::TryStreamExt;
use haversine::{distance, Location as HaversineLocation, Units};
use log::{info, warn};
use ordered_float::OrderedFloat;
use reqwest::Client;
use rstar::{RTree, AABB};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::path::Path;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

const DATA_URL: &str = "https://bulk.meteostat.net/v2/stations/lite.json.gz";
const BINCODE_CACHE_FILE_NAME: &str = "stations_lite.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Spatial index over all Meteostat stations.
#[derive(Debug, Clone)]
pub struct StationLocator {
    rtree: RTree<Station>,
}

// Heap entry ordered by distance only.
struct StationCandidate<'a> {
    distance_km: OrderedFloat<f64>,
    station: &'a Station,
}

impl PartialEq for StationCandidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance_km == other.distance_km
    }
}
impl Eq for StationCandidate<'_> {}
impl PartialOrd for StationCandidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for StationCandidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km.cmp(&other.distance_km)
    }
}

impl StationLocator {
    /// Loads the station list from `cache_dir`, downloading it on first use.
    pub async fn new(cache_dir: &Path) -> Result<Self, LocateStationError> {
        let cache_file = cache_dir.join(BINCODE_CACHE_FILE_NAME);

        let stations = if tokio::fs::try_exists(&cache_file).await.unwrap_or(false) {
            let path = cache_file.clone();
            let stations =
                tokio::task::spawn_blocking(move || Self::read_cache(&path)).await??;
            info!(
                "Loaded {} stations from cache {}",
                stations.len(),
                cache_file.display()
            );
            stations
        } else {
            warn!("Station cache not found, downloading {}", DATA_URL);
            let stations = Self::download_stations().await?;
            Self::write_cache(stations.clone(), &cache_file).await?;
            stations
        };

        Ok(Self::from_stations(stations))
    }

    /// Builds a locator from station metadata that is already in memory.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        StationLocator {
            rtree: RTree::bulk_load(stations),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    fn read_cache(cache_path: &Path) -> Result<Vec<Station>, LocateStationError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| LocateStationError::CacheRead(cache_path.to_path_buf(), e))?;
        let (stations, _) =
            bincode::serde::decode_from_slice::<Vec<Station>, _>(&bytes, BINCODE_CONFIG).map_err(
                |e| LocateStationError::CacheDecode(cache_path.to_path_buf(), Box::new(e)),
            )?;
        Ok(stations)
    }

    async fn download_stations() -> Result<Vec<Station>, LocateStationError> {
        let client = Client::new();
        let response = client
            .get(DATA_URL)
            .send()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(DATA_URL.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", DATA_URL, e);
                return Err(match e.status() {
                    Some(status) => LocateStationError::HttpStatus {
                        url: DATA_URL.to_string(),
                        status,
                        source: e,
                    },
                    None => LocateStationError::NetworkRequest(DATA_URL.to_string(), e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(io::Error::other);
        let gzip_decoder = GzipDecoder::new(BufReader::new(StreamReader::new(stream)));
        let mut decoder_reader = BufReader::new(gzip_decoder);
        let mut json = Vec::with_capacity(20_000_000);
        decoder_reader.read_to_end(&mut json).await?;

        let stations = tokio::task::spawn_blocking(move || {
            serde_json::from_slice::<Vec<Station>>(&json).map_err(LocateStationError::from)
        })
        .await??;
        info!("Parsed {} stations from {}", stations.len(), DATA_URL);
        Ok(stations)
    }

    pub(crate) async fn write_cache(
        stations: Vec<Station>,
        cache_path: &Path,
    ) -> Result<(), LocateStationError> {
        let bytes = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(stations, BINCODE_CONFIG)
                .map_err(|e| LocateStationError::CacheEncode(Box::new(e)))
        })
        .await??;
        tokio::fs::write(cache_path, &bytes)
            .await
            .map_err(|e| LocateStationError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Wrote station cache ({} bytes) to {}",
            bytes.len(),
            cache_path.display()
        );
        Ok(())
    }

    /// Up to `n_results` stations within `max_distance_km`, closest first,
    /// paired with their haversine distance in km.
    ///
    /// When `frequency` is given, only stations whose inventory reports that
    /// data set (and satisfies `required_data`, default [`RequiredData::Any`])
    /// are returned.
    pub fn query(
        &self,
        latitude: f64,
        longitude: f64,
        n_results: usize,
        max_distance_km: f64,
        frequency: Option<Frequency>,
        required_data: Option<RequiredData>,
    ) -> Vec<(Station, f64)> {
        if n_results == 0 {
            return vec![];
        }
        match frequency {
            None => self.proximity_query(latitude, longitude, n_results, max_distance_km),
            Some(frequency) => self.inventory_query(
                latitude,
                longitude,
                n_results,
                max_distance_km,
                frequency,
                required_data.unwrap_or(RequiredData::Any),
            ),
        }
    }

    fn proximity_query(
        &self,
        latitude: f64,
        longitude: f64,
        n_results: usize,
        max_distance_km: f64,
    ) -> Vec<(Station, f64)> {
        // R-tree order is planar, so look a little past n before re-sorting by haversine.
        let candidate_limit = (n_results * 2).max(20);

        let mut stations: Vec<(Station, f64)> = self
            .rtree
            .nearest_neighbor_iter(&[latitude, longitude])
            .take(candidate_limit)
            .filter_map(|station| {
                let dist_km = haversine_km(latitude, longitude, station);
                (dist_km <= max_distance_km).then(|| (station.clone(), dist_km))
            })
            .collect();

        stations.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        stations.truncate(n_results);
        stations
    }

    fn inventory_query(
        &self,
        latitude: f64,
        longitude: f64,
        n_results: usize,
        max_distance_km: f64,
        frequency: Frequency,
        required_data: RequiredData,
    ) -> Vec<(Station, f64)> {
        let mut heap: BinaryHeap<StationCandidate<'_>> = BinaryHeap::with_capacity(n_results);
        let iteration_limit = n_results + 1;
        let mut items_checked = 0;

        for station in self.rtree.nearest_neighbor_iter(&[latitude, longitude]) {
            items_checked += 1;

            if !station.has_inventory(frequency, &required_data) {
                continue;
            }

            let dist_km = haversine_km(latitude, longitude, station);
            // Planar and great-circle order diverge a little; twice the radius is out for good.
            if dist_km > max_distance_km * 2.0 {
                break;
            }
            if dist_km > max_distance_km {
                continue;
            }

            let candidate = StationCandidate {
                distance_km: OrderedFloat(dist_km),
                station,
            };
            if heap.len() < n_results {
                heap.push(candidate);
            } else if heap
                .peek()
                .is_some_and(|worst| candidate.distance_km < worst.distance_km)
            {
                heap.pop();
                heap.push(candidate);
            }

            if items_checked >= iteration_limit && heap.len() == n_results {
                break;
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.station.clone(), c.distance_km.into_inner()))
            .collect()
    }

    /// Stations inside the box spanned by `south_west` and `north_east`.
    ///
    /// Stations are returned in index order; `limit == 0` returns all of them.
    /// A box whose east edge is west of its west edge wraps the antimeridian.
    pub fn within_bounds(
        &self,
        south_west: LatLon,
        north_east: LatLon,
        limit: usize,
    ) -> Vec<Station> {
        let limit = if limit == 0 { usize::MAX } else { limit };
        let boxes = if south_west.1 <= north_east.1 {
            vec![(south_west.1, north_east.1)]
        } else {
            vec![(south_west.1, 180.0), (-180.0, north_east.1)]
        };

        boxes
            .into_iter()
            .flat_map(|(west, east)| {
                let envelope = AABB::from_corners([south_west.0, west], [north_east.0, east]);
                self.rtree
                    .locate_in_envelope(&envelope)
                    .collect::<Vec<_>>()
            })
            .take(limit)
            .cloned()
            .collect()
    }
}

fn haversine_km(latitude: f64, longitude: f64, station: &Station) -> f64 {
    distance(
        HaversineLocation {
            latitude,
            longitude,
        },
        HaversineLocation {
            latitude: station.location.latitude,
            longitude: station.location.longitude,
        },
        Units::Kilometers,
    )
}
