//! Buffer occupancy to bitrate mapping.

/// Buffer fraction at or below which the lowest bitrate is chosen.
pub const RESERVOIR: f64 = 0.1;
/// Buffer fraction at or above which the highest bitrate is chosen.
pub const UPPER_RESERVOIR: f64 = 0.9;

/// Buffer-occupancy fraction to target-bitrate table built from a bitrate ladder.
///
/// The lowest bitrate sits at [`RESERVOIR`], the highest at [`UPPER_RESERVOIR`] and the
/// intermediate bitrates are spaced evenly between them. Lookups are a step function over
/// those anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct RateMap {
    /// The ascending ladder the map was built from.
    ladder: Vec<u64>,
    /// `(fraction, bitrate)`, ascending in fraction.
    anchors: Vec<(f64, u64)>,
}

impl RateMap {
    /// Builds the map from an ascending, non-empty ladder. Returns `None` for an empty ladder.
    pub fn new(ladder: &[u64]) -> Option<Self> {
        let (&lowest, rest) = ladder.split_first()?;
        let mut anchors = vec![(RESERVOIR, lowest)];

        if let Some((&highest, intermediate)) = rest.split_last() {
            let marker_length = (UPPER_RESERVOIR - RESERVOIR) / (intermediate.len() + 1) as f64;
            anchors.extend(
                intermediate
                    .iter()
                    .enumerate()
                    .map(|(i, bitrate)| (RESERVOIR + marker_length * (i + 1) as f64, *bitrate)),
            );
            anchors.push((UPPER_RESERVOIR, highest));
        } else {
            anchors.push((UPPER_RESERVOIR, lowest));
        }

        Some(Self {
            ladder: ladder.to_vec(),
            anchors,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(ladder: Vec<u64>, anchors: Vec<(f64, u64)>) -> Self {
        Self { ladder, anchors }
    }

    /// Whether this map was built from `ladder`.
    pub fn is_built_from(&self, ladder: &[u64]) -> bool {
        self.ladder == ladder
    }

    pub fn anchors(&self) -> &[(f64, u64)] {
        &self.anchors
    }

    /// Target bitrate for a buffer occupancy fraction.
    pub fn bitrate_for(&self, buffer_fraction: f64) -> u64 {
        let lowest = self.anchors[0].1;
        let highest = self.anchors[self.anchors.len() - 1].1;

        if buffer_fraction.is_nan() || buffer_fraction <= RESERVOIR {
            return lowest;
        }
        if buffer_fraction >= UPPER_RESERVOIR {
            return highest;
        }
        self.anchors
            .iter()
            .rev()
            .find(|(marker, _)| *marker <= buffer_fraction)
            .map_or(lowest, |(_, bitrate)| *bitrate)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const LADDER: [u64; 7] = [
        391_570, 641_379, 988_603, 1_489_543, 2_284_798, 3_487_003, 5_253_818,
    ];

    #[test]
    fn anchors_span_reservoir_to_cushion() {
        let map = RateMap::new(&LADDER).unwrap();
        let anchors = map.anchors();
        assert_eq!(anchors.len(), LADDER.len());
        assert_eq!(anchors[0], (RESERVOIR, 391_570));
        assert_eq!(anchors[6], (UPPER_RESERVOIR, 5_253_818));
        let step = (UPPER_RESERVOIR - RESERVOIR) / 6.0;
        for (i, (marker, bitrate)) in anchors.iter().enumerate() {
            assert!((marker - (RESERVOIR + step * i as f64)).abs() < 1e-9);
            assert_eq!(*bitrate, LADDER[i]);
        }
    }

    #[test]
    fn empty_ladder_has_no_map() {
        assert!(RateMap::new(&[]).is_none());
    }

    #[test]
    fn single_rung_ladder_always_yields_it() {
        let map = RateMap::new(&[800_000]).unwrap();
        for fraction in [0.0, 0.05, 0.5, 0.95, 1.0] {
            assert_eq!(map.bitrate_for(fraction), 800_000);
        }
    }

    #[rstest]
    #[case::empty(0.0, 391_570)]
    #[case::at_reservoir(0.1, 391_570)]
    #[case::just_above_reservoir(0.11, 391_570)]
    #[case::second_step(0.24, 641_379)]
    #[case::third_step(0.45, 988_603)]
    #[case::fifth_step(0.7, 2_284_798)]
    #[case::below_cushion(0.89, 3_487_003)]
    #[case::at_cushion(0.9, 5_253_818)]
    #[case::overfull(1.2, 5_253_818)]
    #[case::not_a_number(f64::NAN, 391_570)]
    #[case::negative(-0.5, 391_570)]
    fn lookup_is_a_step_function(#[case] fraction: f64, #[case] expected: u64) {
        let map = RateMap::new(&LADDER).unwrap();
        assert_eq!(map.bitrate_for(fraction), expected);
    }

    #[test]
    fn lookup_never_decreases_with_occupancy() {
        let map = RateMap::new(&LADDER).unwrap();
        let mut previous = 0;
        for step in 0..=100 {
            let bitrate = map.bitrate_for(step as f64 / 100.0);
            assert!(bitrate >= previous);
            previous = bitrate;
        }
    }

    #[test]
    fn remembers_its_ladder() {
        let map = RateMap::new(&LADDER).unwrap();
        assert!(map.is_built_from(&LADDER));
        assert!(!map.is_built_from(&LADDER[1..]));
    }
}
