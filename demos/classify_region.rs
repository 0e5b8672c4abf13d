use koppen::{Koppen, KoppenError, LatLon};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() -> Result<(), KoppenError> {
    let client = Koppen::new().await?;

    // Alpine region, where climates change quickly with altitude.
    let climates = client
        .classify_region()
        .south_west(LatLon(45.8, 5.9))
        .north_east(LatLon(47.8, 10.5))
        .limit(40)
        .call()
        .await?;

    let mut by_code: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut unclassified = 0;
    for climate in &climates {
        match &climate.classification {
            Some(result) => by_code
                .entry(result.koppen_code.clone())
                .or_default()
                .push(climate.station.display_name().to_string()),
            None => unclassified += 1,
        }
    }

    for (code, stations) in &by_code {
        println!("{code}: {}", stations.join(", "));
    }
    println!(
        "{} stations with normals, {} with incomplete data",
        climates.len(),
        unclassified
    );

    Ok(())
}
