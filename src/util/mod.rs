/// Fixed point with 12 fractional bits, as used by compact vertex positions.
pub fn int12_to_float(value: i16) -> f32 {
    value as f32 / 4096.0
}

/// Fixed point with 15 fractional bits, as used by vertex normals.
pub fn int15_to_float(value: i16) -> f32 {
    value as f32 / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_scales() {
        assert_eq!(int12_to_float(4096), 1.0);
        assert_eq!(int12_to_float(-2048), -0.5);
        assert_eq!(int12_to_float(1), 1.0 / 4096.0);
        assert_eq!(int15_to_float(16384), 0.5);
        assert_eq!(int15_to_float(i16::MIN), -1.0);
    }
}
