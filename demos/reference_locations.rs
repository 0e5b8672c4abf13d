//! Classifies well-known example locations of each Köppen type and shows
//! which ones the nearest Meteostat station agrees with.

use koppen::{Koppen, KoppenError, LatLon, CANONICAL_ISOTHERM};

const REFERENCE_LOCATIONS: [(&str, &str, LatLon); 26] = [
    ("Iquitos", "Af", LatLon(-3.74419, -73.25171)),
    ("Mangalore", "Am", LatLon(12.91340, 74.85452)),
    ("Calcutta", "Aw", LatLon(22.56834, 88.36002)),
    ("Monterrey", "BSh", LatLon(36.59820, -121.88960)),
    ("Williston", "BSk", LatLon(48.14751, -103.61654)),
    ("Alice Springs", "BWh", LatLon(-23.69862, 133.88076)),
    ("Lovelock", "BWk", LatLon(40.17931, -118.47378)),
    ("Buenos Aires", "Cfa", LatLon(-34.60649, -58.39394)),
    ("Canberra", "Cfb", LatLon(-35.29526, 149.11793)),
    ("Reykjavik", "Cfc", LatLon(64.14566, -21.95202)),
    ("Rome", "Csa", LatLon(41.88779, 12.57002)),
    ("Olympia", "Csb", LatLon(47.03914, -122.89815)),
    ("Kathmandu", "Cwa", LatLon(27.71628, 85.32249)),
    ("Johannesburg", "Cwb", LatLon(-26.20608, 28.03717)),
    ("Almaty", "Dfa", LatLon(43.23858, 76.88926)),
    ("Oslo", "Dfb", LatLon(59.91334, 10.74959)),
    ("Dawson Creek", "Dfc", LatLon(55.75849, -120.23886)),
    ("Jakutsk", "Dfd", LatLon(62.03688, 129.74441)),
    ("Hakkari", "Dsa", LatLon(37.577, 43.739)),
    ("Chakhcharan", "Dsb", LatLon(34.5225, 65.251667)),
    ("Anchorage", "Dsc", LatLon(61.216667, -149.893611)),
    ("Seoul", "Dwa", LatLon(37.566667, 126.983333)),
    ("Khutag", "Dwb", LatLon(49.3925, 102.7025)),
    ("Irkutsk", "Dwc", LatLon(52.289167, 104.28)),
    ("Nuuk", "ET", LatLon(64.176667, -51.736111)),
    ("Byrd", "EF", LatLon(-80.0147, -119.5656)),
];

#[tokio::main]
async fn main() -> Result<(), KoppenError> {
    let client = Koppen::new().await?;
    let mut matches = 0;

    for (name, expected, location) in REFERENCE_LOCATIONS {
        let classification = client
            .classify()
            .location(location)
            .name(name)
            .isotherm(CANONICAL_ISOTHERM)
            .max_distance_km(250.0)
            .call()
            .await;

        match classification {
            Ok(c) => {
                let verdict = if c.result.koppen_code == expected {
                    matches += 1;
                    "ok"
                } else {
                    "differs"
                };
                println!(
                    "{:<14} expected {:<3} got {:<3} {:<7} via {} ({:.0} km)",
                    name,
                    expected,
                    c.result.koppen_code,
                    verdict,
                    c.station_name(),
                    c.distance_km
                );
            }
            Err(e) => println!("{:<14} expected {:<3} failed: {}", name, expected, e),
        }
    }

    println!("{}/{} locations match", matches, REFERENCE_LOCATIONS.len());
    Ok(())
}
