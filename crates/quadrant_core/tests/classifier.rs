use quadrant_core::{classify, Category, RatingBand, MAX_RATING, MIN_RATING};

#[test]
fn classify_is_total_over_rating_grid() {
    for time in MIN_RATING..=MAX_RATING {
        for value in MIN_RATING..=MAX_RATING {
            let category = classify(time, value);
            assert!(Category::ALL.contains(&category));
            assert_eq!(classify(time, value), category, "must be deterministic");
        }
    }
}

#[test]
fn classify_threshold_is_inclusive_at_eight() {
    assert_eq!(classify(8, 8), Category::A);
    assert_eq!(classify(7, 8), Category::B);
    assert_eq!(classify(8, 7), Category::C);
    assert_eq!(classify(7, 7), Category::D);
    assert_eq!(classify(1, 1), Category::D);
    assert_eq!(classify(10, 10), Category::A);
    assert_eq!(classify(1, 10), Category::B);
    assert_eq!(classify(10, 1), Category::C);
}

#[test]
fn quick_high_value_band_covers_three_of_ten_values() {
    let grid: Vec<_> = (MIN_RATING..=MAX_RATING)
        .flat_map(|time| (MIN_RATING..=MAX_RATING).map(move |value| classify(time, value)))
        .collect();
    let count = |category| grid.iter().filter(|c| **c == category).count();

    assert_eq!(count(Category::A), 9);
    assert_eq!(count(Category::B), 21);
    assert_eq!(count(Category::C), 21);
    assert_eq!(count(Category::D), 49);
}

#[test]
fn category_labels_roundtrip_and_follow_index_order() {
    for category in Category::ALL {
        assert_eq!(Category::parse(category.as_str()), Some(category));
        assert_eq!(category.to_string(), category.as_str());
    }
    assert_eq!(Category::parse("a"), None);

    let indexes: Vec<_> = Category::ALL.iter().map(|c| c.index()).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);
}

#[test]
fn rating_bands_split_at_three_and_eight() {
    assert_eq!(RatingBand::of(1), RatingBand::Low);
    assert_eq!(RatingBand::of(3), RatingBand::Low);
    assert_eq!(RatingBand::of(4), RatingBand::Medium);
    assert_eq!(RatingBand::of(7), RatingBand::Medium);
    assert_eq!(RatingBand::of(8), RatingBand::High);
    assert_eq!(RatingBand::of(10), RatingBand::High);

    assert_eq!(RatingBand::High.time_label(), "quick");
    assert_eq!(RatingBand::Low.time_label(), "time-consuming");
    assert_eq!(RatingBand::Medium.value_label(), "medium value");
}
