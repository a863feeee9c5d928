use wardrobe::catalog::{
    paginate, recompute, total_pages, CatalogView, FilterCriteria, StatusFilter,
};
use wardrobe::error::CatalogError;
use wardrobe::models::Outfit;

const CATEGORIES: [&str; 3] = ["Casual", "Formal", "Sport"];
const SECTIONS: [&str; 2] = ["Men", "Women"];

fn catalog(n: usize) -> Vec<Outfit> {
    (0..n)
        .map(|i| {
            let mut o = Outfit::new(
                format!("o{i}"),
                CATEGORIES[i % CATEGORIES.len()],
                SECTIONS[(i / 3) % SECTIONS.len()],
            );
            o.active = i % 4 != 0;
            o.description = Some(format!("look number {i}"));
            o
        })
        .collect()
}

fn criteria_grid() -> Vec<FilterCriteria> {
    let mut grid = vec![FilterCriteria::default()];
    for search in ["", "number 1", "SPORT"] {
        for category in [None, Some("Casual"), Some("Formal")] {
            for status in [None, Some(StatusFilter::Active), Some(StatusFilter::Inactive)] {
                grid.push(FilterCriteria {
                    search: search.to_string(),
                    category: category.map(str::to_string),
                    section: None,
                    status,
                });
            }
        }
    }
    grid
}

#[test]
fn recompute_is_an_order_preserving_subset() {
    let all = catalog(40);
    for criteria in criteria_grid() {
        let filtered = recompute(&all, &criteria);
        let positions: Vec<usize> = filtered
            .iter()
            .map(|o| all.iter().position(|a| a.id == o.id).unwrap())
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "order broken for {criteria:?}"
        );
    }
}

#[test]
fn pages_cover_the_filtered_list_exactly() {
    let all = catalog(37);
    for criteria in criteria_grid() {
        let filtered = recompute(&all, &criteria);
        for page_size in [1, 3, 10, 50] {
            let total = total_pages(filtered.len(), page_size).unwrap();
            assert_eq!(total, filtered.len().div_ceil(page_size).max(1));

            let mut seen = 0;
            for n in 1..=total {
                let page = paginate(&filtered, page_size, n).unwrap();
                assert_eq!(page.first_index, seen);
                seen += page.items.len();
                assert_eq!(page.last_index, seen);
            }
            assert_eq!(seen, filtered.len());
            assert!(matches!(
                paginate(&filtered, page_size, total + 1),
                Err(CatalogError::PageOutOfRange { .. })
            ));
        }
    }
}

#[test]
fn category_scenario_keeps_only_matching_outfit() {
    let mut formal = Outfit::new("b", "Formal", "Women");
    formal.active = false;
    let all = vec![Outfit::new("a", "Casual", "Men"), formal];

    let criteria = FilterCriteria {
        category: Some("Casual".into()),
        ..FilterCriteria::default()
    };
    let filtered = recompute(&all, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id.as_str(), "a");
}

#[test]
fn twenty_three_rows_make_three_pages() {
    let all = catalog(23);
    let filtered = recompute(&all, &FilterCriteria::default());
    assert_eq!(total_pages(filtered.len(), 10).unwrap(), 3);

    let first = paginate(&filtered, 10, 1).unwrap();
    assert_eq!((first.first_index, first.last_index), (0, 10));
    let last = paginate(&filtered, 10, 3).unwrap();
    assert_eq!((last.first_index, last.last_index), (20, 23));
}

#[test]
fn every_filter_change_resets_to_page_one() {
    let all = catalog(60);
    let changes: Vec<(&str, Box<dyn Fn(&mut CatalogView)>)> = vec![
        ("search", Box::new(|v: &mut CatalogView| v.set_search("look"))),
        (
            "category",
            Box::new(|v: &mut CatalogView| v.set_category(Some("Sport".into()))),
        ),
        (
            "section",
            Box::new(|v: &mut CatalogView| v.set_section(Some("Women".into()))),
        ),
        (
            "status",
            Box::new(|v: &mut CatalogView| v.set_status(Some(StatusFilter::Active))),
        ),
    ];

    for (name, change) in changes {
        let mut view = CatalogView::new(5).unwrap();
        view.go_to_page(&all, 4).unwrap();
        change(&mut view);
        assert_eq!(view.page_number(), 1, "{name} did not reset the page");
        assert!(view.snapshot(&all).is_ok());
    }
}
