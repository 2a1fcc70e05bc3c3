//! Battery voltage to gauge percentage

/// ADC and divider constants for the battery sense input
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryCalibration {
    pub vref: f32,
    pub adc_max: f32,
    /// Ratio of the resistor divider in front of the ADC pin
    pub divider: f32,
    pub empty_volts: f32,
    pub full_volts: f32,
}

impl Default for BatteryCalibration {
    fn default() -> Self {
        BatteryCalibration {
            vref: 3.3,
            adc_max: 4095.0,
            divider: 2.0,
            empty_volts: 3.20,
            full_volts: 4.15,
        }
    }
}

impl BatteryCalibration {
    /// Cell voltage for an averaged raw ADC reading
    pub fn volts(&self, avg_raw: f32) -> f32 {
        avg_raw / self.adc_max * self.vref * self.divider
    }

    /// Linear charge estimate between empty and full, 0..=100
    pub fn percent(&self, avg_raw: f32) -> u8 {
        let span = self.full_volts - self.empty_volts;
        if span <= 0.0 || avg_raw.is_nan() {
            return 0;
        }
        let fraction = (self.volts(avg_raw) - self.empty_volts) / span;
        (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Average of a batch of raw samples, `None` when the batch is empty
pub fn average(samples: &[u16]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let sum: u32 = samples.iter().map(|s| u32::from(*s)).sum();
    Some(sum as f32 / samples.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raw reading that corresponds to a cell voltage with default calibration
    fn raw_for(volts: f32) -> f32 {
        volts / 2.0 / 3.3 * 4095.0
    }

    #[test]
    fn empty_and_full_are_the_ends_of_the_scale() {
        let cal = BatteryCalibration::default();
        assert_eq!(cal.percent(raw_for(3.20)), 0);
        assert_eq!(cal.percent(raw_for(4.15)), 100);
    }

    #[test]
    fn midpoint_is_fifty_percent() {
        let cal = BatteryCalibration::default();
        assert_eq!(cal.percent(raw_for(3.675)), 50);
    }

    #[test]
    fn readings_outside_the_range_are_clamped() {
        let cal = BatteryCalibration::default();
        assert_eq!(cal.percent(0.0), 0);
        assert_eq!(cal.percent(4095.0), 100);
        assert_eq!(cal.percent(f32::NAN), 0);
    }

    #[test]
    fn average_of_samples() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[2000, 2002, 2004]), Some(2002.0));
    }
}
