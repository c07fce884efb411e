use pricewatch_core::{ExtractedItem, FilterCriteria};

/// Keeps the items that satisfy every supplied predicate, in their original
/// order. Empty criteria return the input unchanged.
#[must_use]
pub fn apply_filters(items: Vec<ExtractedItem>, criteria: &FilterCriteria) -> Vec<ExtractedItem> {
    if !criteria.is_active() {
        return items;
    }

    let name_needle = criteria.name_filter.as_deref().map(str::to_lowercase);
    let reference_needle = criteria.reference_filter.as_deref().map(str::to_lowercase);

    items
        .into_iter()
        .filter(|item| {
            criteria.min_price.is_none_or(|min| item.price_amount >= min)
                && criteria.max_price.is_none_or(|max| item.price_amount <= max)
                && name_needle
                    .as_deref()
                    .is_none_or(|needle| contains_ci(item.name.as_deref(), needle))
                && reference_needle.as_deref().is_none_or(|needle| {
                    contains_ci(item.reference.as_deref(), needle)
                        || contains_ci(item.name.as_deref(), needle)
                })
        })
        .collect()
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(name: &str, reference: Option<&str>, amount: i64) -> ExtractedItem {
        ExtractedItem {
            name: Some(name.to_owned()),
            price: Some(format!("{amount},000 DT")),
            price_amount: Decimal::from(amount),
            reference: reference.map(str::to_owned),
            url: Some(format!("https://www.tunisianet.com.tn/{amount}.html")),
            ..ExtractedItem::default()
        }
    }

    fn catalogue() -> Vec<ExtractedItem> {
        vec![
            item("Asus Vivobook 15", Some("X1504ZA"), 1149),
            item("HP 15s", Some("FQ5034NK"), 1299),
            item("Lenovo IdeaPad 3", None, 1099),
            item("HP Victus", Some("FB0020NK"), 1190),
            item("Dell Vostro", Some("V3520"), 1100),
            item("MSI Modern", Some("MS-15H"), 1200),
        ]
    }

    fn names(items: &[ExtractedItem]) -> Vec<&str> {
        items.iter().filter_map(|i| i.name.as_deref()).collect()
    }

    #[test]
    fn empty_criteria_is_identity() {
        assert_eq!(apply_filters(catalogue(), &FilterCriteria::default()), catalogue());
    }

    #[test]
    fn price_range_is_inclusive_and_order_preserving() {
        let criteria = FilterCriteria {
            min_price: Some(Decimal::from(1100)),
            max_price: Some(Decimal::from(1200)),
            ..FilterCriteria::default()
        };
        let kept = apply_filters(catalogue(), &criteria);
        assert_eq!(
            names(&kept),
            vec!["Asus Vivobook 15", "HP Victus", "Dell Vostro", "MSI Modern"]
        );
        let band = Decimal::from(1100)..=Decimal::from(1200);
        assert!(kept.iter().all(|i| band.contains(&i.price_amount)));
    }

    #[test]
    fn filtering_is_idempotent() {
        let criteria = FilterCriteria {
            min_price: Some(Decimal::from(1100)),
            name_filter: Some("hp".to_owned()),
            ..FilterCriteria::default()
        };
        let once = apply_filters(catalogue(), &criteria);
        let twice = apply_filters(once.clone(), &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let criteria = FilterCriteria {
            name_filter: Some("IDEAPAD".to_owned()),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply_filters(catalogue(), &criteria)), vec!["Lenovo IdeaPad 3"]);
    }

    #[test]
    fn reference_filter_also_matches_name() {
        let criteria = FilterCriteria {
            reference_filter: Some("fq5034".to_owned()),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply_filters(catalogue(), &criteria)), vec!["HP 15s"]);

        let by_name = FilterCriteria {
            reference_filter: Some("lenovo".to_owned()),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply_filters(catalogue(), &by_name)), vec!["Lenovo IdeaPad 3"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let criteria = FilterCriteria {
            max_price: Some(Decimal::from(1150)),
            name_filter: Some("hp".to_owned()),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(catalogue(), &criteria).is_empty());
    }

    #[test]
    fn item_without_name_fails_name_filter() {
        let nameless = ExtractedItem {
            price_amount: Decimal::from(5),
            ..ExtractedItem::default()
        };
        let criteria = FilterCriteria {
            name_filter: Some("a".to_owned()),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(vec![nameless], &criteria).is_empty());
    }
}
