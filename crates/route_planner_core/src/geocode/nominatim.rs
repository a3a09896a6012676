use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{GeocodeOutcome, GeocodedAddress, Geocoder};
use crate::{Error, Result, options::PlannerOptions, point::GeoPoint};

const SEARCH_PATH: &str = "search";
const MATCH_LIMIT: &str = "1";

const ERR_NO_MATCH: &str = "could not geocode: no match found";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Geocoder backed by a Nominatim `/search` endpoint.
#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: &Url) -> Result<Self> {
        let search_url = base_url
            .join(SEARCH_PATH)
            .map_err(|e| Error::invalid_input(format!("invalid geocoder url {base_url}: {e}")))?;
        Ok(Self { client, search_url })
    }

    pub fn from_options(options: &PlannerOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.request_timeout())
            .build()
            .map_err(|e| Error::other(format!("failed to build geocoder http client: {e}")))?;
        Self::new(client, &options.geocoder_base()?)
    }

    async fn search(&self, address: &str) -> std::result::Result<Vec<NominatimPlace>, String> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("format", "json"), ("q", address), ("limit", MATCH_LIMIT)])
            .send()
            .await
            .map_err(|e| format!("could not geocode: request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("could not geocode: service returned {status}"));
        }

        response
            .json::<Vec<NominatimPlace>>()
            .await
            .map_err(|e| format!("could not geocode: invalid response: {e}"))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode_one(&self, address: &str) -> GeocodeOutcome {
        let places = match self.search(address).await {
            Ok(places) => places,
            Err(reason) => {
                log::warn!("geocode.nominatim: failed address={address:?} reason={reason}");
                return GeocodeOutcome::failure(reason);
            }
        };

        let Some(best) = places.into_iter().next() else {
            log::debug!("geocode.nominatim: no match address={address:?}");
            return GeocodeOutcome::failure(ERR_NO_MATCH);
        };

        match to_geocoded(best, address) {
            Ok(geocoded) => {
                log::debug!(
                    "geocode.nominatim: ok address={address:?} point={}",
                    GeoPoint::new(geocoded.lat, geocoded.lon)
                );
                GeocodeOutcome::Success(geocoded)
            }
            Err(reason) => {
                log::warn!("geocode.nominatim: failed address={address:?} reason={reason}");
                GeocodeOutcome::failure(reason)
            }
        }
    }
}

fn to_geocoded(
    place: NominatimPlace,
    address: &str,
) -> std::result::Result<GeocodedAddress, String> {
    let lat: f64 = place
        .lat
        .trim()
        .parse()
        .map_err(|_| format!("could not geocode: invalid latitude {:?}", place.lat))?;
    let lon: f64 = place
        .lon
        .trim()
        .parse()
        .map_err(|_| format!("could not geocode: invalid longitude {:?}", place.lon))?;

    if !GeoPoint::new(lat, lon).is_valid() {
        return Err(format!("could not geocode: coordinates out of range {lat},{lon}"));
    }

    Ok(GeocodedAddress {
        lat,
        lon,
        display_name: place.display_name,
        original_address: address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{NominatimPlace, to_geocoded};

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.to_string(),
            lon: lon.to_string(),
            display_name: "Somewhere, Earth".to_string(),
        }
    }

    #[test]
    fn string_coordinates_are_parsed() {
        let geocoded = to_geocoded(place("52.5170365", "13.3888599"), "Berlin").unwrap();
        assert!((geocoded.lat - 52.5170365).abs() < 1e-12);
        assert!((geocoded.lon - 13.3888599).abs() < 1e-12);
        assert_eq!(geocoded.original_address, "Berlin");
        assert_eq!(geocoded.display_name, "Somewhere, Earth");
    }

    #[test]
    fn unparsable_or_out_of_range_coordinates_fail() {
        assert!(to_geocoded(place("north", "13.0"), "x").is_err());
        assert!(to_geocoded(place("95.0", "13.0"), "x").is_err());
    }
}
