//! ForeFlight simulator broadcast parsing.
//!
//! X-Plane (and several other simulators) can broadcast the ForeFlight text
//! datagrams on UDP:
//!
//! - `XGPS<sim>,lon,lat,alt_m,track,gs_m/s` (also `XGPS2`)
//! - `XATT<sim>,heading,pitch,roll` (also `XATT2`)
//!
//! Position and attitude arrive in separate datagrams and are merged by
//! [`SampleAccumulator`].

use crate::aircraft::AircraftSample;

/// Meters per second to knots.
const MS_TO_KNOTS: f64 = 1.943_84;

/// Meters to feet.
const METERS_TO_FEET: f64 = 3.280_84;

/// One decoded datagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datagram {
    Position {
        latitude: f64,
        longitude: f64,
        /// Feet MSL.
        altitude: f64,
        track: f64,
        /// Knots.
        ground_speed: f64,
    },
    Attitude {
        heading: f64,
        pitch: f64,
        bank: f64,
    },
}

/// Decode a datagram, `None` for anything we do not understand.
pub fn parse_datagram(data: &[u8]) -> Option<Datagram> {
    let text = std::str::from_utf8(data).ok()?.trim_end();
    // The tag runs into the simulator name (`XGPS2MSFS,...`); the name is skipped anyway.
    if let Some(body) = text.strip_prefix("XGPS") {
        return parse_position(body);
    }
    text.strip_prefix("XATT").and_then(parse_attitude)
}

fn fields(body: &str, count: usize) -> Option<Vec<f64>> {
    // First field is the simulator name.
    let values: Vec<f64> = body
        .split(',')
        .skip(1)
        .take(count)
        .map(|v| v.trim().parse().ok())
        .collect::<Option<_>>()?;
    (values.len() == count).then_some(values)
}

fn parse_position(body: &str) -> Option<Datagram> {
    let v = fields(body, 5)?;
    Some(Datagram::Position {
        longitude: v[0],
        latitude: v[1],
        altitude: v[2] * METERS_TO_FEET,
        track: normalize_heading(v[3]),
        ground_speed: v[4] * MS_TO_KNOTS,
    })
}

fn parse_attitude(body: &str) -> Option<Datagram> {
    let v = fields(body, 3)?;
    Some(Datagram::Attitude {
        heading: normalize_heading(v[0]),
        pitch: v[1],
        bank: v[2],
    })
}

/// Normalize a heading to [0, 360) degrees.
fn normalize_heading(heading: f64) -> f64 {
    heading.rem_euclid(360.0)
}

/// Merges position and attitude datagrams into samples.
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    sample: Option<AircraftSample>,
    attitude: Option<(f64, f64, f64)>,
}

impl SampleAccumulator {
    /// Apply a datagram. Returns a fresh sample whenever a position arrived.
    pub fn apply(&mut self, datagram: Datagram) -> Option<AircraftSample> {
        match datagram {
            Datagram::Attitude {
                heading,
                pitch,
                bank,
            } => {
                self.attitude = Some((heading, pitch, bank));
                None
            }
            Datagram::Position {
                latitude,
                longitude,
                altitude,
                track,
                ground_speed,
            } => {
                let mut sample = AircraftSample {
                    latitude,
                    longitude,
                    altitude_msl: altitude,
                    track,
                    ground_speed,
                    ..Default::default()
                };
                if let Some((heading, pitch, bank)) = self.attitude {
                    sample.heading = Some(heading);
                    sample.pitch = Some(pitch);
                    sample.bank = Some(bank);
                }
                self.sample = Some(sample);
                Some(sample)
            }
        }
    }

    /// Most recent complete sample.
    pub fn latest(&self) -> Option<AircraftSample> {
        self.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xgps() {
        let datagram = parse_datagram(b"XGPSX-Plane,-122.5,45.5,3048.0,270.5,154.3").unwrap();
        let Datagram::Position {
            latitude,
            longitude,
            altitude,
            track,
            ground_speed,
        } = datagram
        else {
            panic!("expected position, got {datagram:?}");
        };
        assert!((latitude - 45.5).abs() < 0.001);
        assert!((longitude + 122.5).abs() < 0.001);
        assert!((altitude - 10_000.0).abs() < 10.0); // 3048 m
        assert!((track - 270.5).abs() < 0.01);
        assert!((ground_speed - 300.0).abs() < 1.0); // 154.3 m/s
    }

    #[test]
    fn test_parse_xgps2_and_xatt2() {
        assert!(matches!(
            parse_datagram(b"XGPS2MSFS,8.57,50.03,110.0,70.0,0.0"),
            Some(Datagram::Position { .. })
        ));
        assert_eq!(
            parse_datagram(b"XATT2MSFS,-90.0,2.5,-10.0\n"),
            Some(Datagram::Attitude {
                heading: 270.0,
                pitch: 2.5,
                bank: -10.0
            })
        );
    }

    #[test]
    fn test_rejects_short_or_garbled() {
        assert!(parse_datagram(b"XGPSX-Plane,-122.5,45.5,3048.0,270.5").is_none());
        assert!(parse_datagram(b"XATTX-Plane,45.5,abc,1.0").is_none());
        assert!(parse_datagram(b"DATA\0").is_none());
        assert!(parse_datagram(&[0xff, 0xfe]).is_none());
    }

    #[test]
    fn test_accumulator_merges_attitude() {
        let mut acc = SampleAccumulator::default();
        assert!(acc
            .apply(Datagram::Attitude {
                heading: 92.0,
                pitch: 3.0,
                bank: -1.5
            })
            .is_none());

        let sample = acc
            .apply(Datagram::Position {
                latitude: 50.0,
                longitude: 8.5,
                altitude: 364.0,
                track: 90.0,
                ground_speed: 12.0,
            })
            .unwrap();
        assert_eq!(sample.heading, Some(92.0));
        assert_eq!(sample.bank, Some(-1.5));
        assert_eq!(sample.track, 90.0);
        assert_eq!(acc.latest(), Some(sample));
    }

    #[test]
    fn test_normalize_heading() {
        assert!((normalize_heading(-90.0) - 270.0).abs() < 0.001);
        assert!(normalize_heading(360.0).abs() < 0.001);
        assert!((normalize_heading(450.0) - 90.0).abs() < 0.001);
    }
}
