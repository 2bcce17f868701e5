//! End-to-end deletion scenarios over the in-memory backend.

mod common;

use common::{attr_default, column, drop_set, function, init_tracing, relation, type_object};
use pgdepend::{
    CatalogReader, DependError, DependencyEngine, DependencyKind, DropBehavior, MemoryCatalog,
    ObjectAddress,
};
use rstest::rstest;
use std::collections::HashSet;

#[test]
fn restrict_refuses_when_a_view_depends_on_the_table() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_view(200, "active_users");
    catalog.add_edge(relation(200), relation(100), DependencyKind::Normal);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Restrict)
        .unwrap_err();

    match &err {
        DependError::DependentObjectsExist { message, .. } => {
            assert_eq!(
                message,
                "cannot drop table users because other objects depend on it"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.hint(),
        Some("Use DROP ... CASCADE to drop the dependent objects too.")
    );
}

#[test]
fn restrict_traversal_still_reaches_every_violation() {
    init_tracing();
    // A chain of views: the violation is surfaced once at the top even
    // though the traversal walked (and provisionally destroyed) the whole
    // chain; undoing that is the surrounding transaction's job.
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_view(200, "v_users");
    catalog.add_view(300, "v_v_users");
    catalog.add_edge(relation(200), relation(100), DependencyKind::Normal);
    catalog.add_edge(relation(300), relation(200), DependencyKind::Normal);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Restrict)
        .unwrap_err();
    assert!(matches!(err, DependError::DependentObjectsExist { .. }));
    assert_eq!(
        drop_set(&catalog),
        HashSet::from([relation(100), relation(200), relation(300)])
    );
}

#[test]
fn cascade_drops_the_view_before_the_table() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_view(200, "active_users");
    catalog.add_edge(relation(200), relation(100), DependencyKind::Normal);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap();

    assert_eq!(catalog.drop_log, vec![relation(200), relation(100)]);
    assert!(catalog.edges().is_empty());
}

#[test]
fn cascade_cleans_comments_and_shared_dependency_records() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.set_comment(relation(100), "user accounts");
    catalog.add_shared_dependency(relation(100).class_id, 100);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap();

    assert!(!catalog.has_comment(&relation(100)));
    assert!(!catalog.has_shared_dependency(relation(100).class_id, 100));
}

#[test]
fn column_default_cascades_silently_even_under_restrict() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog
        .add_table(100, "orders")
        .add_column(100, 2, "price");
    catalog.add_attr_default(300, 100, 2);
    // The default hangs off the column, not the whole table.
    catalog.add_edge(attr_default(300), column(100, 2), DependencyKind::Auto);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Restrict)
        .unwrap();

    assert_eq!(catalog.drop_log, vec![attr_default(300), relation(100)]);
    assert!(catalog.edges().is_empty());
}

#[test]
fn internal_dependent_cannot_be_dropped_directly() {
    init_tracing();
    // The backing relation of a composite type is an implementation
    // detail: dropping it directly is redirected to the type.
    let mut catalog = MemoryCatalog::new();
    catalog.add_composite_relation(500, "inventory_item");
    catalog.add_type(600, "inventory_item");
    catalog.add_edge(relation(500), type_object(600), DependencyKind::Internal);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(500), DropBehavior::Cascade)
        .unwrap_err();

    match &err {
        DependError::DependentObjectsExist { message, .. } => {
            assert_eq!(
                message,
                "cannot drop composite type inventory_item because type inventory_item requires it"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.hint(), Some("You may drop type inventory_item instead."));
    // Nothing was destroyed.
    assert!(catalog.drop_log.is_empty());
}

#[test]
fn dropping_the_owner_reaches_the_internal_dependent() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_composite_relation(500, "inventory_item");
    catalog.add_type(600, "inventory_item");
    catalog.add_edge(relation(500), type_object(600), DependencyKind::Internal);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&type_object(600), DropBehavior::Cascade)
        .unwrap();

    assert_eq!(catalog.drop_log, vec![relation(500), type_object(600)]);
    assert!(catalog.edges().is_empty());
}

#[test]
fn ownership_redirection_from_a_sibling_cascade() {
    init_tracing();
    // A foreign-key trigger is INTERNAL to its constraint and AUTO on the
    // table. Dropping the table reaches the trigger first through the AUTO
    // edge; the drop must be redirected through the constraint and still
    // take everything down exactly once.
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "orders");
    catalog.add_constraint(700, "orders_fk", Some(100));
    catalog.add_trigger(800, "orders_fk_trigger", 100);
    catalog.add_edge(
        ObjectAddress::whole(pgdepend::constants::TRIGGER_CLASS_ID, 800),
        relation(100),
        DependencyKind::Auto,
    );
    catalog.add_edge(
        ObjectAddress::whole(pgdepend::constants::TRIGGER_CLASS_ID, 800),
        ObjectAddress::whole(pgdepend::constants::CONSTRAINT_CLASS_ID, 700),
        DependencyKind::Internal,
    );
    catalog.add_edge(
        ObjectAddress::whole(pgdepend::constants::CONSTRAINT_CLASS_ID, 700),
        relation(100),
        DependencyKind::Auto,
    );

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Restrict)
        .unwrap();

    let trigger = ObjectAddress::whole(pgdepend::constants::TRIGGER_CLASS_ID, 800);
    let constraint = ObjectAddress::whole(pgdepend::constants::CONSTRAINT_CLASS_ID, 700);
    assert_eq!(
        drop_set(&catalog),
        HashSet::from([trigger, constraint, relation(100)])
    );
    // Exactly one destructor call each.
    assert_eq!(catalog.drop_log.len(), 3);
    assert!(catalog.edges().is_empty());
}

#[test]
fn cyclic_normal_pair_terminates_under_single_deletion() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_function(900, "f1()");
    catalog.add_function(901, "f2()");
    catalog.add_edge(function(900), function(901), DependencyKind::Normal);
    catalog.add_edge(function(901), function(900), DependencyKind::Normal);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&function(900), DropBehavior::Cascade)
        .unwrap();

    assert_eq!(catalog.drop_log, vec![function(901), function(900)]);
}

#[test]
fn cyclic_normal_pair_terminates_under_multiple_deletions() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_function(900, "f1()");
    catalog.add_function(901, "f2()");
    catalog.add_edge(function(900), function(901), DependencyKind::Normal);
    catalog.add_edge(function(901), function(900), DependencyKind::Normal);

    DependencyEngine::new(&mut catalog)
        .perform_multiple_deletions(&[function(900), function(901)], DropBehavior::Cascade)
        .unwrap();

    // Both dropped, neither twice.
    assert_eq!(
        drop_set(&catalog),
        HashSet::from([function(900), function(901)])
    );
    assert_eq!(catalog.drop_log.len(), 2);
    assert!(catalog.edges().is_empty());
}

#[test]
fn pinned_objects_cannot_be_dropped() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_type(23, "integer");
    catalog.pin(type_object(23));

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&type_object(23), DropBehavior::Cascade)
        .unwrap_err();

    match err {
        DependError::DependentObjectsExist { message, hint } => {
            assert_eq!(
                message,
                "cannot drop type integer because it is required by the database system"
            );
            assert!(hint.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(catalog.drop_log.is_empty());
}

#[test]
fn pin_edge_on_the_outgoing_side_is_corruption() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_type(23, "integer");
    catalog.add_edge(relation(100), type_object(23), DependencyKind::Pin);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap_err();
    assert!(matches!(err, DependError::IncorrectPinUse { .. }));
}

#[test]
fn a_second_internal_owner_is_corruption() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_trigger(800, "t", 100);
    catalog.add_constraint(700, "c1", Some(100));
    catalog.add_constraint(701, "c2", Some(100));
    let trigger = ObjectAddress::whole(pgdepend::constants::TRIGGER_CLASS_ID, 800);
    let c1 = ObjectAddress::whole(pgdepend::constants::CONSTRAINT_CLASS_ID, 700);
    let c2 = ObjectAddress::whole(pgdepend::constants::CONSTRAINT_CLASS_ID, 701);
    catalog.add_edge(trigger, relation(100), DependencyKind::Normal);
    catalog.add_edge(trigger, c1, DependencyKind::Internal);
    catalog.add_edge(trigger, c2, DependencyKind::Internal);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap_err();
    assert!(matches!(
        err,
        DependError::MultipleInternalDependencies { .. }
    ));
}

#[rstest]
#[case([0, 1, 2])]
#[case([0, 2, 1])]
#[case([1, 0, 2])]
#[case([1, 2, 0])]
#[case([2, 0, 1])]
#[case([2, 1, 0])]
fn outcome_is_independent_of_edge_visit_order(#[case] order: [usize; 3]) {
    init_tracing();
    // A sequence reaches the table through both an AUTO edge and a NORMAL
    // edge; a view only through NORMAL. Whatever order the incoming scan
    // yields, RESTRICT must blame only the view and the drop set must not
    // change.
    let edges = [
        (relation(200), DependencyKind::Normal), // view
        (relation(400), DependencyKind::Auto),   // sequence, owned
        (relation(400), DependencyKind::Normal), // sequence, also a reader
    ];

    let build = |order: &[usize; 3]| {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table(100, "users");
        catalog.add_view(200, "active_users");
        catalog.add_sequence(400, "users_id_seq");
        for &index in order {
            let (dependent, kind) = edges[index];
            catalog.add_edge(dependent, relation(100), kind);
        }
        catalog
    };

    let mut catalog = build(&order);
    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Restrict)
        .unwrap_err();
    assert!(matches!(err, DependError::DependentObjectsExist { .. }));

    let mut catalog = build(&order);
    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap();
    assert_eq!(
        drop_set(&catalog),
        HashSet::from([relation(100), relation(200), relation(400)])
    );
    assert!(catalog.edges().is_empty());
}

#[test]
fn multiple_deletions_never_drop_a_target_twice() {
    init_tracing();
    // The default is both a direct target and an AUTO dependent of the
    // other target; the shared implicit closure makes it cascade exactly
    // once, in either target order.
    for targets in [
        [attr_default(300), relation(100)],
        [relation(100), attr_default(300)],
    ] {
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_table(100, "orders")
            .add_column(100, 2, "price");
        catalog.add_attr_default(300, 100, 2);
        catalog.add_edge(attr_default(300), column(100, 2), DependencyKind::Auto);

        DependencyEngine::new(&mut catalog)
            .perform_multiple_deletions(&targets, DropBehavior::Restrict)
            .unwrap();

        assert_eq!(catalog.drop_log, vec![attr_default(300), relation(100)]);
    }
}

#[test]
fn multiple_deletions_match_sequential_drops_when_disconnected() {
    init_tracing();
    let build = || {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table(100, "users");
        catalog.add_view(200, "v_users");
        catalog.add_edge(relation(200), relation(100), DependencyKind::Normal);
        catalog.add_table(101, "orders");
        catalog.add_view(201, "v_orders");
        catalog.add_edge(relation(201), relation(101), DependencyKind::Normal);
        catalog
    };

    let mut batched = build();
    DependencyEngine::new(&mut batched)
        .perform_multiple_deletions(&[relation(100), relation(101)], DropBehavior::Cascade)
        .unwrap();

    let mut sequential = build();
    let mut engine = DependencyEngine::new(&mut sequential);
    engine
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap();
    engine
        .perform_deletion(&relation(101), DropBehavior::Cascade)
        .unwrap();

    assert_eq!(drop_set(&batched), drop_set(&sequential));
    assert!(batched.edges().is_empty());
    assert!(sequential.edges().is_empty());
}

#[test]
fn delete_what_depends_on_spares_the_target() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_language(13, "plpgsql");
    catalog.add_function(900, "audit()");
    catalog.add_function(901, "refresh()");
    let language = ObjectAddress::whole(pgdepend::constants::LANGUAGE_CLASS_ID, 13);
    catalog.add_edge(function(900), language, DependencyKind::Normal);
    catalog.add_edge(function(901), language, DependencyKind::Normal);

    DependencyEngine::new(&mut catalog)
        .delete_what_depends_on(&language, false)
        .unwrap();

    assert_eq!(
        drop_set(&catalog),
        HashSet::from([function(900), function(901)])
    );
    // The language itself survives, with no edges left touching it.
    assert!(catalog.language_name(13).is_some());
    assert!(catalog.edges_touching(&language).is_empty());
}

#[test]
fn dropping_a_compression_configuration_is_refused() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_compression(950, "quicklz");
    let compression =
        ObjectAddress::whole(pgdepend::constants::COMPRESSION_CLASS_ID, 950);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&compression, DropBehavior::Cascade)
        .unwrap_err();
    assert!(matches!(err, DependError::Unsupported(_)));
}

#[test]
fn global_objects_are_not_droppable_here() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_role(10, "admin");
    let role = ObjectAddress::whole(pgdepend::constants::AUTHID_CLASS_ID, 10);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&role, DropBehavior::Cascade)
        .unwrap_err();
    assert!(matches!(
        err,
        DependError::UnhandledObjectClass(pgdepend::ObjectClass::Role)
    ));
}

#[test]
fn unknown_class_oid_is_rejected_at_entry() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    let bogus = ObjectAddress::whole(424_242, 1);

    let err = DependencyEngine::new(&mut catalog)
        .perform_deletion(&bogus, DropBehavior::Cascade)
        .unwrap_err();
    assert!(matches!(err, DependError::UnrecognizedObjectClass(424_242)));
}

#[test]
fn deletion_scans_take_row_locks() {
    init_tracing();
    let mut catalog = MemoryCatalog::new();
    catalog.add_table(100, "users");
    catalog.add_view(200, "v_users");
    catalog.add_edge(relation(200), relation(100), DependencyKind::Normal);

    DependencyEngine::new(&mut catalog)
        .perform_deletion(&relation(100), DropBehavior::Cascade)
        .unwrap();
    assert!(catalog.rows_locked() > 0);
}
