//! Stereo pan laws.

use std::f32::consts::FRAC_PI_4;

use crate::config::PanLaw;

/// Left/right gains for a pan position in `[-1, 1]` (full left to full
/// right). Out-of-range positions are clamped.
pub fn pan_gains(position: f32, law: PanLaw) -> (f32, f32) {
    let pan = if position.is_finite() {
        position.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    match law {
        PanLaw::Linear => {
            let left = if pan > 0.0 { 1.0 - pan } else { 1.0 };
            let right = if pan < 0.0 { 1.0 + pan } else { 1.0 };
            (left, right)
        }
        PanLaw::ConstantPower => {
            let theta = (pan + 1.0) * FRAC_PI_4;
            (theta.cos(), theta.sin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_center_is_unity() {
        assert_eq!(pan_gains(0.0, PanLaw::Linear), (1.0, 1.0));
    }

    #[test]
    fn linear_attenuates_far_side() {
        let (left, right) = pan_gains(0.5, PanLaw::Linear);
        assert!((left - 0.5).abs() < 1e-6);
        assert_eq!(right, 1.0);
        assert_eq!(pan_gains(-1.0, PanLaw::Linear), (1.0, 0.0));
    }

    #[test]
    fn constant_power_keeps_energy() {
        for pan in [-1.0_f32, -0.3, 0.0, 0.6, 1.0] {
            let (left, right) = pan_gains(pan, PanLaw::ConstantPower);
            assert!((left * left + right * right - 1.0).abs() < 1e-5);
        }
        let (left, right) = pan_gains(0.0, PanLaw::ConstantPower);
        assert!((left - right).abs() < 1e-6);
    }

    #[test]
    fn laws_are_symmetric() {
        for law in [PanLaw::Linear, PanLaw::ConstantPower] {
            let (l, r) = pan_gains(0.4, law);
            let (ml, mr) = pan_gains(-0.4, law);
            assert!((l - mr).abs() < 1e-6 && (r - ml).abs() < 1e-6);
        }
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(pan_gains(3.0, PanLaw::Linear), pan_gains(1.0, PanLaw::Linear));
        assert_eq!(pan_gains(f32::NAN, PanLaw::Linear), (1.0, 1.0));
    }
}
