use koppen::{Koppen, KoppenError, LatLon};

#[tokio::main]
async fn main() -> Result<(), KoppenError> {
    let client = Koppen::new().await?;

    let utrecht = client
        .classify()
        .location(LatLon(52.0907, 5.1214))
        .name("Utrecht")
        .call()
        .await?;

    println!(
        "{} is {} ({}), based on {} [{}] {:.1} km away, normals {}-{}",
        utrecht.target_name.as_deref().unwrap_or("Location"),
        utrecht.result.koppen_code,
        utrecht.result.climate_group,
        utrecht.station_name(),
        utrecht.station_id(),
        utrecht.distance_km,
        utrecht.period.start_year,
        utrecht.period.end_year,
    );
    println!(
        "Coldest month {:.1} °C, warmest {:.1} °C, {:.0} mm per year (dry threshold {:.0} mm)",
        utrecht.result.min_monthly_temp,
        utrecht.result.max_monthly_temp,
        utrecht.result.yearly_precipitation,
        utrecht.result.precipitation_threshold,
    );

    for normal in &utrecht.period.normals {
        println!(
            "{:>2}: {:>5.1} °C {:>6.1} mm",
            normal.month,
            normal.avg_temp.unwrap_or(f64::NAN),
            normal.precipitation.unwrap_or(f64::NAN)
        );
    }

    Ok(())
}
