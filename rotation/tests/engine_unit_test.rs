use rotation::{Catalog, CatalogItem, ItemId, RotationScheduler, SelectionReason};

fn item(id: ItemId) -> CatalogItem {
    CatalogItem {
        item_id: id,
        item_name: format!("item-{id}"),
        unit_price: 2.0,
        base_price: None,
        max_quantity: Some(10),
    }
}

fn catalog(groups: &[(&str, &[ItemId])]) -> Catalog {
    let mut c = Catalog::default();
    for (name, ids) in groups {
        c.insert_group(*name, ids.iter().copied().map(item).collect());
    }
    c
}

fn ids(c: &Catalog) -> Vec<ItemId> {
    c.flatten().iter().map(|i| i.item_id).collect()
}

#[test]
fn beverages_and_snacks_rotation_wraps_after_last_item() {
    let c = catalog(&[("Beverages", &[2, 5]), ("Snacks", &[1])]);
    assert_eq!(ids(&c), vec![2, 5, 1]);

    let mut sched = RotationScheduler::new();
    let first = sched.tick(&c).unwrap();
    assert_eq!(first.item.item_id, 2);
    assert_eq!(first.reason, SelectionReason::Initial);

    assert_eq!(sched.tick(&c).unwrap().item.item_id, 5);

    // After id 5 the rotation moves on to id 1, then wraps back to the start.
    let after_five = sched.tick(&c).unwrap();
    assert_eq!(after_five.item.item_id, 1);
    assert_eq!(after_five.reason, SelectionReason::Advanced);
    assert_eq!(sched.tick(&c).unwrap().item.item_id, 2);
}

#[test]
fn flattening_ignores_insertion_order() {
    let a = catalog(&[("Snacks", &[3, 1]), ("Beverages", &[5, 2])]);
    let b = catalog(&[("Beverages", &[2, 5]), ("Snacks", &[1, 3])]);

    assert_eq!(ids(&a), ids(&b));
    assert_eq!(ids(&a), vec![2, 5, 1, 3]);
}

#[test]
fn empty_catalog_selects_nothing() {
    let mut sched = RotationScheduler::new();

    assert!(sched.tick(&Catalog::default()).is_none());
    assert!(sched.tick(&catalog(&[("Snacks", &[])])).is_none());
    assert!(sched.active().is_none());
    assert_eq!(sched.state().generation, 0);
}

#[test]
fn initial_selection_uses_cursor_modulo_length() {
    let c = catalog(&[("Beverages", &[2, 5]), ("Snacks", &[1])]);
    let mut sched = RotationScheduler::with_cursor(4);

    let sel = sched.tick(&c).unwrap();
    assert_eq!(sel.index, 1);
    assert_eq!(sel.item.item_id, 5);
}

#[test]
fn vanished_item_falls_back_to_cursor_modulo_new_length() {
    let before = catalog(&[("Beverages", &[2, 5, 7]), ("Snacks", &[1])]);
    let mut sched = RotationScheduler::new();

    sched.tick(&before).unwrap(); // 2 @ 0
    sched.tick(&before).unwrap(); // 5 @ 1
    sched.tick(&before).unwrap(); // 7 @ 2
    assert_eq!(sched.state().cursor_index, 2);

    // 7 disappears; cursor 2 % 2 = 0.
    let after = catalog(&[("Beverages", &[2]), ("Snacks", &[1])]);
    let sel = sched.tick(&after).unwrap();

    assert_eq!(sel.reason, SelectionReason::Fallback);
    assert_eq!(sel.index, 0);
    assert_eq!(sel.item.item_id, 2);
    assert_eq!(sched.state().ordered_catalog, vec![2, 1]);
}

#[test]
fn every_selection_gets_a_fresh_generation() {
    let c = catalog(&[("Snacks", &[1])]);
    let mut sched = RotationScheduler::new();

    let a = sched.tick(&c).unwrap().ticket;
    let b = sched.tick(&c).unwrap().ticket;

    assert_eq!(a.item_id, b.item_id);
    assert!(b.generation > a.generation);
}

#[test]
fn responses_for_rotated_away_items_are_rejected() {
    let c = catalog(&[("Beverages", &[2, 5])]);
    let mut sched = RotationScheduler::new();

    let ticket_a = sched.tick(&c).unwrap().ticket; // item 2
    let ticket_b = sched.tick(&c).unwrap().ticket; // item 5

    // Slow response for item 2 arrives after rotating to item 5.
    assert!(!sched.accept(&ticket_a));
    assert!(sched.accept(&ticket_b));

    // Duplicate delivery is not applied twice.
    assert!(!sched.accept(&ticket_b));
}

#[test]
fn older_response_for_same_item_is_applied_only_if_newer_than_last_applied() {
    let c = catalog(&[("Snacks", &[1])]);
    let mut sched = RotationScheduler::new();

    let g1 = sched.tick(&c).unwrap().ticket;
    let g2 = sched.tick(&c).unwrap().ticket;

    // g1 resolves first while item 1 is still active: accepted.
    assert!(sched.accept(&g1));
    // g2 resolves later: newer, accepted.
    assert!(sched.accept(&g2));

    let g3 = sched.tick(&c).unwrap().ticket;
    let g4 = sched.tick(&c).unwrap().ticket;

    // Out of order: g4 lands first, g3 must not overwrite it.
    assert!(sched.accept(&g4));
    assert!(!sched.accept(&g3));
}
