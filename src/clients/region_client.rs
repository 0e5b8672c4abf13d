//! Classifies every station with normals inside a lat/lon box.

use crate::classifier::classify;
use crate::classifier::result::ClassificationResult;
use crate::classifier::rules::DEFAULT_ISOTHERM;
use crate::error::KoppenError;
use crate::koppen::{month_range, Koppen, LatLon};
use crate::types::frequency::{Frequency, RequiredData};
use crate::types::period::Month;
use crate::types::station::Station;
use crate::weather_data::normals::NormalsPeriod;
use bon::bon;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;

const DEFAULT_REGION_LIMIT: usize = 50;
const DEFAULT_CONCURRENCY: usize = 8;

/// A station's normals and, when they are complete, its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationClimate {
    pub station: Station,
    /// Latest published normals, or monthly data averaged over the requested
    /// month range.
    pub period: NormalsPeriod,
    pub classification: Option<ClassificationResult>,
}

#[bon]
impl Koppen {
    /// Classifies the stations inside the box spanned by `south_west` and
    /// `north_east`.
    ///
    /// Only stations whose inventory lists normals (or monthly data, with a
    /// month range) are considered. Stations that turn out to have no data,
    /// or whose download fails, are left out; stations with incomplete
    /// normals are kept with `classification: None`. Results come back in
    /// completion order.
    ///
    /// * `.limit(usize)`: stations to consider, defaults to `50`; `0` means all.
    ///   When the box holds more candidates, they are sampled evenly by
    ///   latitude then longitude, so the sample covers the whole box.
    /// * `.isotherm(f64)`: defaults to [`DEFAULT_ISOTHERM`].
    /// * `.concurrency(usize)`: stations fetched at once, defaults to `8`.
    /// * `.start(Month)` / `.end(Month)`: classify monthly data averaged over
    ///   this range instead of the latest normals. Both or neither.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use koppen::{Koppen, KoppenError, LatLon};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KoppenError> {
    /// let client = Koppen::new().await?;
    /// let benelux = client
    ///     .classify_region()
    ///     .south_west(LatLon(49.4, 2.5))
    ///     .north_east(LatLon(53.6, 7.2))
    ///     .limit(20)
    ///     .call()
    ///     .await?;
    /// for climate in benelux.iter().filter(|c| c.classification.is_some()) {
    ///     println!("{}: {:?}", climate.station.display_name(), climate.classification);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn classify_region(
        &self,
        south_west: LatLon,
        north_east: LatLon,
        limit: Option<usize>,
        isotherm: Option<f64>,
        concurrency: Option<usize>,
        start: Option<Month>,
        end: Option<Month>,
    ) -> Result<Vec<StationClimate>, KoppenError> {
        let months = month_range(start, end)?;
        let frequency = match months {
            Some(_) => Frequency::Monthly,
            None => Frequency::Normals,
        };
        let limit = match limit.unwrap_or(DEFAULT_REGION_LIMIT) {
            0 => usize::MAX,
            n => n,
        };
        let isotherm = isotherm.unwrap_or(DEFAULT_ISOTHERM);
        let concurrency = concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);

        let candidates: Vec<Station> = self
            .stations_within(south_west, north_east, 0)
            .into_iter()
            .filter(|s| s.has_inventory(frequency, &RequiredData::Any))
            .collect();
        let stations = spread_sample(candidates, limit);
        info!(
            "Classifying {} stations between {:?} and {:?}",
            stations.len(),
            south_west,
            north_east
        );

        let climates: Vec<Option<StationClimate>> = stream::iter(stations)
            .map(|station| self.station_climate(station, isotherm, months))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        Ok(climates.into_iter().flatten().collect())
    }

    async fn station_climate(
        &self,
        station: Station,
        isotherm: f64,
        months: Option<(Month, Month)>,
    ) -> Option<StationClimate> {
        let period = match months {
            None => self.normals().station(&station.id).call().await,
            Some((start, end)) => self
                .monthly_normals()
                .station(&station.id)
                .start(start)
                .end(end)
                .call()
                .await
                .map(|normals| NormalsPeriod::from_months(start, end, normals)),
        };
        let period = match period {
            Ok(period) => period,
            Err(e @ (KoppenError::NoNormals { .. } | KoppenError::NoMonthlyData { .. })) => {
                debug!("Skipping station {}: {}", station.id, e);
                return None;
            }
            Err(e) => {
                warn!("Skipping station {}: {}", station.id, e);
                return None;
            }
        };

        let classification = match classify(&period.normals, isotherm) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("Station {} not classified: {}", station.id, e);
                None
            }
        };

        Some(StationClimate {
            station,
            period,
            classification,
        })
    }
}

/// Picks `limit` stations spread evenly over `stations` ordered by latitude
/// then longitude, one from the middle of each equal-sized stratum.
fn spread_sample(mut stations: Vec<Station>, limit: usize) -> Vec<Station> {
    if stations.len() <= limit {
        return stations;
    }
    stations.sort_by(|a, b| {
        a.location
            .latitude
            .total_cmp(&b.location.latitude)
            .then(a.location.longitude.total_cmp(&b.location.longitude))
    });
    let len = stations.len();
    let picks: Vec<usize> = (0..limit).map(|i| (2 * i + 1) * len / (2 * limit)).collect();
    stations
        .into_iter()
        .enumerate()
        .filter(|(i, _)| picks.binary_search(i).is_ok())
        .map(|(_, station)| station)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::rules::CANONICAL_ISOTHERM;
    use crate::koppen::test_support::*;
    use crate::types::station::tests::station;
    use crate::types::station::Inventory;
    use polars::prelude::*;

    async fn region_client(dir: &std::path::Path) -> PolarsResult<Koppen> {
        let mut no_inventory = station("no-inventory", 51.0, 5.0);
        no_inventory.inventory = Inventory::default();

        let incomplete = normals_df(1991, 2020, CONTINENTAL_TEMPS, 50.0)?
            .lazy()
            .filter(col("month").neq(lit(2i64)))
            .collect()?;

        Ok(seeded_client(
            dir,
            vec![
                station("complete", 52.0, 5.0),
                station("incomplete", 51.5, 4.5),
                station("empty", 50.5, 6.0),
                station("outside", 45.0, 5.0),
                no_inventory,
            ],
            vec![
                (
                    Frequency::Normals,
                    "complete",
                    normals_df(1991, 2020, CONTINENTAL_TEMPS, 50.0)?,
                ),
                (Frequency::Normals, "incomplete", incomplete),
                (Frequency::Normals, "empty", empty_normals_df()?),
            ],
        )
        .await)
    }

    #[tokio::test]
    async fn classifies_stations_in_box() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = region_client(dir.path()).await?;

        let mut climates = client
            .classify_region()
            .south_west(LatLon(50.0, 4.0))
            .north_east(LatLon(53.0, 7.0))
            .isotherm(CANONICAL_ISOTHERM)
            .concurrency(2)
            .call()
            .await?;
        climates.sort_by(|a, b| a.station.id.cmp(&b.station.id));

        let ids: Vec<&str> = climates.iter().map(|c| c.station.id.as_str()).collect();
        assert_eq!(ids, ["complete", "incomplete"]);
        assert_eq!(
            climates[0]
                .classification
                .as_ref()
                .map(|c| c.koppen_code.as_str()),
            Some("Cfb")
        );
        assert_eq!(climates[1].classification, None);
        assert_eq!(climates[1].period.normals.len(), 11);
        Ok(())
    }

    #[tokio::test]
    async fn limit_caps_considered_stations() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = region_client(dir.path()).await?;

        let climates = client
            .classify_region()
            .south_west(LatLon(51.8, 4.0))
            .north_east(LatLon(53.0, 7.0))
            .limit(1)
            .call()
            .await?;
        assert_eq!(climates.len(), 1);
        assert_eq!(
            climates[0]
                .classification
                .as_ref()
                .map(|c| c.koppen_code.as_str()),
            Some("Dfb")
        );
        Ok(())
    }

    #[test]
    fn sample_spreads_over_the_box() {
        // Handed over corner first, as a tree walk might.
        let stations: Vec<Station> = [
            ("north", 52.9, 4.2),
            ("south-east", 50.0, 6.5),
            ("centre", 51.0, 5.0),
            ("south-west", 50.0, 4.0),
            ("upper", 52.0, 6.0),
            ("lower", 50.5, 4.0),
        ]
        .iter()
        .map(|&(id, lat, lon)| station(id, lat, lon))
        .collect();

        let ids = |picked: Vec<Station>| picked.into_iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids(spread_sample(stations.clone(), 2)), ["south-east", "upper"]);
        assert_eq!(
            ids(spread_sample(stations.clone(), 3)),
            ["south-east", "centre", "north"]
        );
        assert_eq!(spread_sample(stations.clone(), 6).len(), 6);
        assert_eq!(spread_sample(stations, 10).len(), 6);
    }

    #[tokio::test]
    async fn month_range_classifies_monthly_data() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(
            dir.path(),
            vec![
                station("monthly", 52.0, 5.0),
                station("short", 51.0, 5.0),
            ],
            vec![
                (
                    Frequency::Monthly,
                    "monthly",
                    monthly_df(2001..=2010, CONTINENTAL_TEMPS, 50.0)?,
                ),
                (
                    Frequency::Monthly,
                    "short",
                    monthly_df(1990..=1995, CONTINENTAL_TEMPS, 50.0)?,
                ),
            ],
        )
        .await;

        let climates = client
            .classify_region()
            .south_west(LatLon(50.0, 4.0))
            .north_east(LatLon(53.0, 7.0))
            .start(Month::new(1, 2001))
            .end(Month::new(12, 2005))
            .call()
            .await?;

        assert_eq!(climates.len(), 1);
        let climate = &climates[0];
        assert_eq!(climate.station.id, "monthly");
        assert_eq!((climate.period.start_year, climate.period.end_year), (2001, 2005));
        assert_eq!(
            climate.classification.as_ref().map(|c| c.koppen_code.as_str()),
            Some("Dfb")
        );

        let reversed = client
            .classify_region()
            .south_west(LatLon(50.0, 4.0))
            .north_east(LatLon(53.0, 7.0))
            .start(Month::new(1, 2005))
            .end(Month::new(12, 2001))
            .call()
            .await;
        assert!(matches!(reversed, Err(KoppenError::ReversedMonthRange { .. })));
        Ok(())
    }
}
