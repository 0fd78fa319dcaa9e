pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Restrict a ratio to the closed unit interval.
pub(crate) fn clamp_to_unit_interval(value: f64) -> f64 {
    max_of_2(0., min_of_2(value, 1.))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0.3, 1.0, 0.3)]
    #[case(1.2, 1.0, 1.0)]
    #[case(1.0, 1.0, 1.0)]
    fn should_take_min_of_ratio_and_limit(
        #[case] ratio: f64,
        #[case] limit: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(min_of_2(ratio, limit), expected);
    }

    #[rstest]
    #[case(1e-6, 0.0012, 0.0012)]
    #[case(1e-6, -0.0004, 1e-6)]
    fn should_take_max_of_floor_and_value(
        #[case] floor: f64,
        #[case] value: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(max_of_2(floor, value), expected);
    }

    #[rstest]
    #[case(-0.2, 0.)]
    #[case(0.45, 0.45)]
    #[case(1.7, 1.)]
    fn should_clamp_to_unit_interval(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(clamp_to_unit_interval(value), expected);
    }
}
