use std::time::Duration;

use super::{GeocodeOutcome, Geocoder};

/// Geocodes `addresses` strictly one at a time, sleeping `delay` between
/// requests. A failed address does not stop the batch; outcomes come back in
/// input order.
pub async fn geocode_many<G, S>(
    geocoder: &G,
    addresses: &[S],
    delay: Duration,
) -> Vec<GeocodeOutcome>
where
    G: Geocoder + ?Sized,
    S: AsRef<str>,
{
    let n = addresses.len();
    log::debug!("geocode.batch: start n={n} delay_ms={}", delay.as_millis());

    let mut outcomes = Vec::with_capacity(n);
    let mut failures = 0usize;
    for (idx, address) in addresses.iter().enumerate() {
        let outcome = geocoder.geocode_one(address.as_ref()).await;
        if let Some(reason) = outcome.failure_reason() {
            failures += 1;
            log::warn!(
                "geocode.batch: failed idx={idx} address={:?} reason={reason}",
                address.as_ref()
            );
        }
        outcomes.push(outcome);

        if idx + 1 < n && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    log::info!("geocode.batch: done n={n} failures={failures}");
    outcomes
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::geocode_many;
    use crate::geocode::{GeocodeOutcome, GeocodedAddress, Geocoder};

    /// Fails every address containing "nowhere"; records call instants.
    #[derive(Default)]
    struct ScriptedGeocoder {
        calls: Mutex<Vec<(String, Instant)>>,
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn geocode_one(&self, address: &str) -> GeocodeOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((address.to_string(), Instant::now()));
            if address.contains("nowhere") {
                return GeocodeOutcome::failure("no match");
            }
            GeocodeOutcome::Success(GeocodedAddress {
                lat: 1.0,
                lon: 2.0,
                display_name: address.to_uppercase(),
                original_address: address.to_string(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_with_delay_between_requests_only() {
        let geocoder = ScriptedGeocoder::default();
        let start = Instant::now();

        let outcomes = geocode_many(
            &geocoder,
            &["a street", "b street", "c street"],
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcomes.len(), 3);
        let calls = geocoder.calls.lock().unwrap();
        let offsets: Vec<u64> = calls
            .iter()
            .map(|(_, at)| at.duration_since(start).as_secs())
            .collect();
        assert_eq!(offsets, vec![0, 1, 2]);
        // No trailing sleep after the last request.
        assert_eq!(start.elapsed().as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_abort_the_batch() {
        let geocoder = ScriptedGeocoder::default();

        let outcomes = geocode_many(
            &geocoder,
            &["a street", "nowhere", "c street"],
            Duration::from_millis(10),
        )
        .await;

        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].failure_reason(), Some("no match"));
        assert_eq!(
            outcomes[2].success().map(|a| a.original_address.as_str()),
            Some("c street")
        );
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let geocoder = ScriptedGeocoder::default();
        let outcomes = geocode_many(&geocoder, &[] as &[&str], Duration::from_secs(1)).await;
        assert!(outcomes.is_empty());
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }
}
