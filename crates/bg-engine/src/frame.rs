//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Convert unit-range samples to 16-bit, clamping to [-1, 1].
    pub fn from_unit(left: f64, right: f64) -> Self {
        Self {
            left: unit_to_i16(left),
            right: unit_to_i16(right),
        }
    }
}

fn unit_to_i16(value: f64) -> i16 {
    (value.clamp(-1.0, 1.0) * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion_clamps() {
        assert_eq!(Frame::from_unit(0.0, 0.0), Frame::silence());
        assert_eq!(Frame::from_unit(1.0, -1.0), Frame { left: 32767, right: -32767 });
        assert_eq!(Frame::from_unit(4.0, -4.0), Frame { left: 32767, right: -32767 });
        assert_eq!(Frame::from_unit(0.5, 0.5), Frame::mono(16383));
    }
}
