//! Unit tests for the combination enumeration

use movecast::aggregator::CombinationSpace;
use movecast::models::Combination;

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn enumerates_full_product_including_invalid_days() {
    let space = CombinationSpace::new(&names(&["Dallas", "Austin"]), &names(&["Local"]));
    assert_eq!(space.len(), 2 * 12 * 31);
    assert_eq!(space.iter().count(), space.len());
    assert!(space.iter().any(|c| c == Combination::new("Austin", "Local", 2, 31)));
}

#[test]
fn order_is_branch_category_month_day_ascending() {
    let space = CombinationSpace::new(&names(&["b", "a"]), &names(&["y", "x"]));
    let all: Vec<Combination> = space.iter().collect();

    assert_eq!(all[0], Combination::new("a", "x", 1, 1));
    assert_eq!(all[1], Combination::new("a", "x", 1, 2));
    assert_eq!(all[31], Combination::new("a", "x", 2, 1));
    assert_eq!(all.last(), Some(&Combination::new("b", "y", 12, 31)));
    assert!(all.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn duplicate_names_are_collapsed() {
    let space = CombinationSpace::new(&names(&["a", "a"]), &names(&["x", "x", "x"]));
    assert_eq!(space.len(), 12 * 31);
}

#[test]
fn empty_when_no_categories() {
    let space = CombinationSpace::new(&names(&["a"]), &[]);
    assert!(space.is_empty());
    assert_eq!(space.iter().count(), 0);
}
