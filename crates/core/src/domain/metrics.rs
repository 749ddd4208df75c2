pub const DEFAULT_COURSE_CAPACITY: u32 = 30;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean rounded to two decimals; 0 for an empty set.
pub fn mean_grade<I>(grades: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = grades
        .into_iter()
        .fold((0.0, 0u32), |(sum, count), g| (sum + g, count + 1));

    if count == 0 {
        return 0.0;
    }

    round_to(sum / f64::from(count), 2)
}

/// Share of total seats in use, rounded to one decimal; 0 without courses.
pub fn occupancy_percentage(enrolled: u64, courses: u64, capacity: u32) -> f64 {
    let seats = courses.saturating_mul(u64::from(capacity));
    if seats == 0 {
        return 0.0;
    }

    round_to(enrolled as f64 / seats as f64 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::{mean_grade, occupancy_percentage};

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean_grade(Vec::new()), 0.0);
    }

    #[test]
    fn mean_is_rounded_to_two_places() {
        assert_eq!(mean_grade([3.0, 3.5, 3.25]), 3.25);
        assert_eq!(mean_grade([2.5, 2.6, 2.6]), 2.57);
    }

    #[test]
    fn occupancy_uses_capacity_per_course() {
        assert_eq!(occupancy_percentage(15, 2, 30), 25.0);
        assert_eq!(occupancy_percentage(1, 3, 30), 1.1);
        assert_eq!(occupancy_percentage(10, 0, 30), 0.0);
    }
}
