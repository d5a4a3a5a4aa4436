// Label propagation scenarios over whole snapshots.
use chrono::{DateTime, Duration, TimeZone, Utc};
use nextaction::engine::{Engine, EngineSettings};
use nextaction::model::{Classifier, Id, Item, Label, Project, Sequencing, Snapshot, Suffixes};

fn engine(hide_future_days: u32) -> Engine {
    Engine::new(EngineSettings {
        marker: Id::from("na"),
        skip: Id::from("sd"),
        classifier: Classifier::new(Suffixes::default(), Sequencing::Untyped),
        hide_future_days,
    })
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn snapshot(projects: Vec<Project>, items: Vec<Item>) -> Snapshot {
    Snapshot {
        projects,
        items,
        labels: vec![Label::new("na", "next_action"), Label::new("sd", "Someday")],
    }
}

/// Items as (id, content, depth); order follows the vector position.
fn items(project: &str, rows: &[(&str, &str, u32)]) -> Vec<Item> {
    rows.iter()
        .enumerate()
        .map(|(n, (id, content, depth))| Item::new(id, project, content, n as i64 + 1, *depth))
        .collect()
}

fn marked(snap: &Snapshot) -> Vec<&str> {
    let marker = Id::from("na");
    let mut ids: Vec<&Item> = snap
        .items
        .iter()
        .filter(|i| i.is_visible() && i.has_label(&marker))
        .collect();
    ids.sort_by_key(|i| i.order);
    ids.into_iter().map(|i| i.id.as_str()).collect()
}

fn label(snap: &mut Snapshot, id: &str, label: &str) {
    let item = snap.items.iter_mut().find(|i| i.id.as_str() == id).unwrap();
    item.labels.push(Id::from(label));
}

#[test]
fn parallel_project_marks_every_root() {
    let mut snap = snapshot(
        vec![Project::new("p", "Groceries.")],
        items("p", &[("milk", "Milk", 1), ("eggs", "Eggs", 1), ("bread", "Bread", 1)]),
    );
    let queue = engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["milk", "eggs", "bread"]);
    assert_eq!(queue.into_updates().len(), 3);
}

#[test]
fn serial_project_marks_first_root_then_moves_on() {
    let mut snap = snapshot(
        vec![Project::new("p", "Taxes_")],
        items("p", &[("a", "Collect receipts", 1), ("b", "Fill form", 1), ("c", "Submit", 1)]),
    );
    let e = engine(7);
    e.run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["a"]);

    // Converged: nothing more to do.
    assert!(e.run_cycle(&mut snap, now()).is_empty());

    snap.items.iter_mut().find(|i| i.id.as_str() == "a").unwrap().checked = true;
    e.run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["b"]);
}

#[test]
fn serial_project_strips_stale_markers_from_later_roots() {
    let mut snap = snapshot(
        vec![Project::new("p", "Taxes_")],
        items("p", &[("a", "A", 1), ("b", "B", 1), ("c", "C", 1)]),
    );
    label(&mut snap, "c", "na");
    let queue = engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["a"]);
    assert_eq!(queue.added(), &[Id::from("a")]);
    assert_eq!(queue.removed(), &[Id::from("c")]);
}

#[test]
fn parallel_item_in_serial_project_hands_marker_to_children() {
    let mut snap = snapshot(
        vec![Project::new("p", "Chores_")],
        items(
            "p",
            &[
                ("errands", "Errands.", 1),
                ("post", "Post office", 2),
                ("bank", "Bank", 2),
                ("later", "Tidy garage", 1),
            ],
        ),
    );
    label(&mut snap, "errands", "na");
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["post", "bank"]);
}

#[test]
fn serial_item_marks_only_first_child() {
    let mut snap = snapshot(
        vec![Project::new("p", "Holiday.")],
        items(
            "p",
            &[
                ("trip", "Plan trip_", 1),
                ("flights", "Book flights", 2),
                ("hotel", "Book hotel", 2),
                ("car", "Rent car", 2),
            ],
        ),
    );
    label(&mut snap, "hotel", "na");
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["flights"]);
}

#[test]
fn serial_branch_under_parallel_parent_runs_its_own_chain() {
    let mut snap = snapshot(
        vec![Project::new("p", "Someday plans")],
        items(
            "p",
            &[
                ("trip", "Trip.", 1),
                ("packing", "Packing_", 2),
                ("socks", "Socks", 3),
                ("shoes", "Shoes", 3),
                ("tickets", "Tickets", 2),
            ],
        ),
    );
    let e = engine(7);
    let queue = e.run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["socks", "tickets"]);
    assert!(!queue.is_net_zero());

    // Packing_ is added by its parallel parent and removed again as a branch
    // head on every pass; the second pass cancels out to no writes.
    let before = snap.clone();
    let again = e.run_cycle(&mut snap, now());
    assert!(!again.is_empty());
    assert!(again.into_updates().is_empty());
    assert_eq!(marked(&snap), marked(&before));
}

#[test]
fn serial_scope_with_next_action_blocks_later_chains() {
    let mut snap = snapshot(
        vec![Project::new("p", "Move_")],
        items(
            "p",
            &[
                ("pack", "Pack_", 1),
                ("books", "Box books", 2),
                ("dishes", "Box dishes", 2),
                ("clean", "Clean_", 1),
                ("vacuum", "Vacuum", 2),
            ],
        ),
    );
    label(&mut snap, "vacuum", "na");
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["books"]);
}

#[test]
fn serial_parent_blocks_later_chains_in_untyped_project() {
    let mut snap = snapshot(
        vec![Project::new("p", "Misc")],
        items(
            "p",
            &[
                ("plan", "Plan_", 1),
                ("book", "Book", 2),
                ("x", "Pick dates", 3),
                ("pack", "Pack", 2),
                ("y", "Find bag", 3),
            ],
        ),
    );
    label(&mut snap, "x", "na");
    label(&mut snap, "y", "na");
    let e = engine(7);
    e.run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["book"]);

    let again = e.run_cycle(&mut snap, now());
    assert!(again.into_updates().is_empty());
    assert_eq!(marked(&snap), vec!["book"]);
}

#[test]
fn hidden_future_item_still_types_its_descendants() {
    let mut snap = snapshot(
        vec![Project::new("p", "Misc")],
        items("p", &[("trip", "Trip.", 1), ("pack", "Pack", 2), ("socks", "Socks", 3)]),
    );
    snap.items[0].due = Some((now() + Duration::days(30)).to_rfc3339());
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["socks"]);
}

#[test]
fn untyped_project_only_follows_typed_items() {
    let mut snap = snapshot(
        vec![Project::new("p", "Misc")],
        items(
            "p",
            &[
                ("loose", "Loose task", 1),
                ("shop", "Shop.", 1),
                ("soap", "Soap", 2),
                ("tape", "Tape", 2),
            ],
        ),
    );
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["soap", "tape"]);
}

#[test]
fn parallel_type_cascades_below_four_levels() {
    let mut snap = snapshot(
        vec![Project::new("p", "Work")],
        items(
            "p",
            &[
                ("big", "Big.", 1),
                ("phase", "Phase", 2),
                ("step", "Step", 3),
                ("sub", "Sub", 4),
                ("la", "Leaf a", 5),
                ("lb", "Leaf b", 5),
            ],
        ),
    );
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["la", "lb"]);
}

#[test]
fn far_future_items_never_carry_marker() {
    let mut snap = snapshot(
        vec![Project::new("p", "Groceries.")],
        items("p", &[("soon", "Milk", 1), ("later", "Turkey", 1)]),
    );
    for item in &mut snap.items {
        item.labels.push(Id::from("na"));
    }
    snap.items[0].due = Some((now() + Duration::days(2)).to_rfc3339());
    snap.items[1].due = Some((now() + Duration::days(30)).to_rfc3339());
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["soon"]);
}

#[test]
fn hidden_future_root_counts_as_first_serial_root() {
    let mut snap = snapshot(
        vec![Project::new("p", "Taxes_")],
        items("p", &[("a", "A", 1), ("b", "B", 1)]),
    );
    snap.items[0].due = Some((now() + Duration::days(30)).to_rfc3339());
    engine(7).run_cycle(&mut snap, now());
    assert!(marked(&snap).is_empty());

    // With hiding disabled the same root is eligible again.
    engine(0).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["a"]);
}

#[test]
fn malformed_due_date_does_not_hide_item() {
    let mut snap = snapshot(
        vec![Project::new("p", "Groceries.")],
        items("p", &[("a", "A", 1)]),
    );
    snap.items[0].due = Some("someday maybe".to_string());
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["a"]);
}

#[test]
fn skip_label_always_wins() {
    let mut snap = snapshot(
        vec![Project::new("p", "Groceries.")],
        items("p", &[("a", "A", 1), ("b", "B", 1)]),
    );
    label(&mut snap, "a", "sd");
    label(&mut snap, "b", "sd");
    label(&mut snap, "b", "na");
    engine(7).run_cycle(&mut snap, now());
    assert!(marked(&snap).is_empty());
    let marker = Id::from("na");
    let skip = Id::from("sd");
    assert!(
        snap.items
            .iter()
            .all(|i| !(i.has_label(&marker) && i.has_label(&skip)))
    );
}

#[test]
fn future_child_of_parallel_item_cancels_out() {
    let mut snap = snapshot(
        vec![Project::new("p", "Misc")],
        items("p", &[("errands", "Errands.", 1), ("passport", "Renew passport", 2)]),
    );
    snap.items[1].due = Some((now() + Duration::days(30)).to_rfc3339());
    let queue = engine(7).run_cycle(&mut snap, now());
    assert_eq!(queue.added(), &[Id::from("passport")]);
    assert_eq!(queue.removed(), &[Id::from("passport")]);
    assert!(queue.into_updates().is_empty());
    assert!(marked(&snap).is_empty());
}

#[test]
fn invisible_items_are_ignored() {
    let mut snap = snapshot(
        vec![Project::new("p", "Groceries.")],
        items("p", &[("a", "A", 1), ("b", "B", 1), ("c", "C", 1)]),
    );
    snap.items[1].deleted = true;
    snap.items[2].in_history = true;
    let queue = engine(7).run_cycle(&mut snap, now());
    assert_eq!(queue.added(), &[Id::from("a")]);
}

#[test]
fn inbox_follows_configured_mode() {
    let mut snap = snapshot(
        vec![Project::new("inbox", "Inbox")],
        items("inbox", &[("a", "A", 1), ("b", "B", 1)]),
    );
    engine(7).run_cycle(&mut snap, now());
    assert!(marked(&snap).is_empty());

    let serial_inbox = Engine::new(EngineSettings {
        marker: Id::from("na"),
        skip: Id::from("sd"),
        classifier: Classifier::new(Suffixes::default(), Sequencing::Serial),
        hide_future_days: 7,
    });
    serial_inbox.run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["a"]);
}

#[test]
fn projects_are_evaluated_independently() {
    let mut all = items("p1", &[("a1", "A1", 1), ("a2", "A2", 1)]);
    // Interleave orders so sorting has to group by project.
    let mut second = items("p2", &[("b1", "B1", 1), ("b2", "B2", 1)]);
    second[0].order = 0;
    all.append(&mut second);
    all.reverse();
    let mut snap = snapshot(
        vec![Project::new("p1", "One_"), Project::new("p2", "Two_")],
        all,
    );
    engine(7).run_cycle(&mut snap, now());
    assert_eq!(marked(&snap), vec!["b1", "a1"]);
}
