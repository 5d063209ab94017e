//! Signal shaping for analog values
//!
//! Stick components live in [-1.0, 1.0], triggers in [0.0, 1.0]. NaN from a
//! misbehaving backend is treated as the neutral value rather than passed on.

/// Default stick deadzone
pub const DEFAULT_DEADZONE: f32 = 0.15;

pub fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

pub fn clamp_trigger(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Per-axis deadzone without rescaling
///
/// Values inside the deadzone snap to zero, everything else passes through
/// unchanged.
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        value
    }
}

/// Maps a full-range axis reading onto the trigger range: -1.0 → 0.0, 1.0 → 1.0
pub fn rescale_trigger(value: f32) -> f32 {
    clamp_trigger((clamp_axis(value) + 1.0) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(from: f32, to: f32, steps: usize) -> impl Iterator<Item = f32> {
        (0..=steps).map(move |i| from + (to - from) * i as f32 / steps as f32)
    }

    #[test]
    fn clamp_axis_stays_in_range_and_is_idempotent() {
        for v in sweep(-2.0, 2.0, 400) {
            let once = clamp_axis(v);
            assert!((-1.0..=1.0).contains(&once), "{} -> {}", v, once);
            assert_eq!(clamp_axis(once), once);
        }
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp_axis(f32::NAN), 0.0);
        assert_eq!(clamp_trigger(f32::NAN), 0.0);
        assert_eq!(clamp_axis(f32::INFINITY), 1.0);
        assert_eq!(clamp_trigger(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn deadzone_zeroes_small_values_only() {
        for v in sweep(-1.0, 1.0, 200) {
            let filtered = apply_deadzone(v, DEFAULT_DEADZONE);
            if v.abs() < DEFAULT_DEADZONE {
                assert_eq!(filtered, 0.0, "{}", v);
            } else {
                assert_eq!(filtered, v, "{}", v);
            }
        }
    }

    #[test]
    fn deadzone_boundary_passes_through() {
        assert_eq!(apply_deadzone(0.15, 0.15), 0.15);
        assert_eq!(apply_deadzone(-0.15, 0.15), -0.15);
        assert_eq!(apply_deadzone(0.149, 0.15), 0.0);
    }

    #[test]
    fn trigger_rescale_endpoints() {
        assert_eq!(rescale_trigger(-1.0), 0.0);
        assert_eq!(rescale_trigger(0.0), 0.5);
        assert_eq!(rescale_trigger(1.0), 1.0);
    }

    #[test]
    fn trigger_rescale_is_monotonic() {
        let mut last = -1.0;
        for v in sweep(-1.0, 1.0, 200) {
            let r = rescale_trigger(v);
            assert!((0.0..=1.0).contains(&r));
            assert!(r > last);
            last = r;
        }
    }
}
