use dp_core::{DeleteStatus, EntityId, Layer, LineageError, Mutation, Plane};
use dp_modeler::backend::{ParamValue, SelectionSlot, SelectionTarget};
use dp_modeler::{
    BackendError, FeatureKind, Modeler, ModelerError, ModelerOptions, NullBackend,
    OperationKind, RecordingBackend,
};

fn id(name: &str) -> EntityId {
    EntityId::new(name).expect("valid entity name")
}

fn recording() -> Modeler<RecordingBackend> {
    Modeler::with_options(RecordingBackend::new(), ModelerOptions::inline())
}

fn unit_rect(modeler: &mut Modeler<RecordingBackend>, name: &str, layer: Layer) {
    modeler
        .rect(name, layer, ["0", "0"], ["1", "1"])
        .expect("rectangle should be accepted");
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_box_translate_rotate_unite_scenario() {
    let mut modeler = recording();
    let box1 = id("box1");
    let box2 = id("box2");

    modeler
        .block("box1", Layer::DEFAULT, ["0", "0", "0"], ["1", "1", "1"])
        .unwrap();
    assert_eq!(modeler.plane_of(&box1).unwrap(), Plane::Primary);

    let moved = modeler.translate(&[box1.clone()], ["1", "0", "0"]).unwrap();
    assert_eq!(moved[0].1.name().unwrap().to_string(), "t1_box1");

    let rotated = modeler.rotate(&[box1.clone()], "45[deg]", None).unwrap();
    assert_eq!(rotated[0].1.name().unwrap().to_string(), "t2_box1");
    assert_eq!(
        modeler.lineages().previous_name(&box1).unwrap().to_string(),
        "t1_box1"
    );

    modeler
        .block("box2", Layer::DEFAULT, ["2", "0", "0"], ["1", "1", "1"])
        .unwrap();
    let outcome = modeler.unite(&[box1.clone(), box2.clone()], false).unwrap();
    assert_eq!(outcome.survivor, box1);
    assert_eq!(outcome.result.name().unwrap().to_string(), "t3_box1");
    assert_eq!(outcome.absorbed, vec![box2.clone()]);
    assert!(!modeler.is_deleted(&box1));
    assert!(modeler.is_deleted(&box2));
    assert_eq!(
        modeler.registry().record(&box2).unwrap().absorbed_by,
        Some(box1.clone())
    );

    let union = modeler
        .backend()
        .feature(Plane::Primary, "t3_box1")
        .expect("union feature");
    assert_eq!(union.kind, FeatureKind::Union);
    assert_eq!(union.property("intbnd"), Some(&ParamValue::Switch(false)));
    assert_eq!(union.property("keep"), None);
    assert_eq!(
        union.selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["t2_box1", "box2"])))
    );

    // The absorbed box is never transformed again
    let again = modeler.translate(&[box2.clone()], ["1", "0", "0"]).unwrap();
    assert_eq!(again[0].1, Mutation::SkippedDeleted);
    assert_eq!(modeler.current_name(&box2).unwrap().to_string(), "box2");

    let ops: Vec<_> = modeler.history().entries().iter().map(|e| e.operation).collect();
    assert_eq!(
        ops,
        vec![
            OperationKind::Create(FeatureKind::Block),
            OperationKind::Translate,
            OperationKind::Rotate,
            OperationKind::Create(FeatureKind::Block),
            OperationKind::Unite,
        ]
    );
}

#[test]
fn test_null_backend_leaves_bookkeeping_untouched() {
    let mut modeler = Modeler::new(NullBackend);

    let err = modeler
        .rect("a", Layer::DEFAULT, ["0", "0"], ["1", "1"])
        .unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Backend(BackendError::Unavailable(_))
    ));
    assert!(modeler.lineages().is_empty());
    assert!(modeler.history().is_empty());
    assert!(modeler.router().plane_of(&id("a")).is_err());
}

#[test]
fn test_rejected_transform_keeps_generation() {
    let backend = RecordingBackend::new().rejecting(FeatureKind::Move);
    let mut modeler = Modeler::with_options(backend, ModelerOptions::inline());
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    let err = modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Backend(BackendError::FeatureRejected { .. })
    ));
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "a");
    assert_eq!(modeler.history().len(), 1);

    modeler.backend_mut().accept_all();
    let moved = modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap();
    assert_eq!(moved[0].1.name().unwrap().to_string(), "t1_a");
}

#[test]
fn test_out_of_plane_translation_rejected() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    let err = modeler.translate(&[id("a")], ["0", "0", "1[um]"]).unwrap_err();
    assert!(matches!(err, ModelerError::InvalidOperation(_)));
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "a");
}

#[test]
fn test_intermediate_parameters() {
    let mut modeler = Modeler::new(RecordingBackend::new());
    modeler
        .rect("pad", Layer::TRACK, ["1um", "0"], ["10um", "5um"])
        .unwrap();
    modeler.translate(&[id("pad")], ["2um", "3um", "0"]).unwrap();

    let backend = modeler.backend();
    assert_eq!(backend.parameter("pad_width"), Some("10[um]"));
    assert_eq!(backend.parameter("pad_height"), Some("5[um]"));
    assert_eq!(backend.parameter("pad_pos_x"), Some("1[um]"));
    assert_eq!(backend.parameter("t1_pad_x"), Some("2[um]"));
    assert_eq!(backend.parameter("t1_pad_y"), Some("3[um]"));

    let pad = backend.feature(Plane::Primary, "pad").unwrap();
    assert_eq!(
        pad.property("size"),
        Some(&ParamValue::Vector(strings(&["pad_width", "pad_height"])))
    );
    let moved = backend.feature(Plane::Primary, "t1_pad").unwrap();
    assert_eq!(
        moved.property("displ"),
        Some(&ParamValue::Vector(strings(&["t1_pad_x", "t1_pad_y"])))
    );
}

#[test]
fn test_negative_size_is_flipped() {
    let mut modeler = recording();
    modeler
        .rect("neg", Layer::DEFAULT, ["1", "0"], ["-2", "1"])
        .unwrap();

    let rect = modeler.backend().feature(Plane::Primary, "neg").unwrap();
    assert_eq!(
        rect.property("size"),
        Some(&ParamValue::Vector(strings(&["-(-2)", "1"])))
    );
    assert_eq!(
        rect.property("pos"),
        Some(&ParamValue::Vector(strings(&["1+-2", "0"])))
    );
}

#[test]
fn test_centered_rectangle_corner() {
    let mut modeler = recording();
    modeler
        .rect_center("c", Layer::DEFAULT, ["0", "1"], ["4", "2"])
        .unwrap();

    let rect = modeler.backend().feature(Plane::Primary, "c").unwrap();
    assert_eq!(
        rect.property("pos"),
        Some(&ParamValue::Vector(strings(&["(0)-(4)/2", "(1)-(2)/2"])))
    );
}

#[test]
fn test_polygon_needs_enough_points() {
    let mut modeler = recording();
    let err = modeler
        .polygon("p", Layer::DEFAULT, &[["0", "0"], ["1", "0"]], true)
        .unwrap_err();
    assert!(matches!(err, ModelerError::InvalidOperation(_)));

    modeler
        .polygon("line", Layer::DEFAULT, &[["0", "0"], ["1", "0"]], false)
        .unwrap();
    let line = modeler.backend().feature(Plane::Primary, "line").unwrap();
    assert_eq!(line.property("type"), Some(&ParamValue::Text("open".into())));
}

#[test]
fn test_fillet_all_vertices() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap();

    let result = modeler.fillet(&id("a"), "0.1", None).unwrap();
    assert_eq!(result.name().unwrap().to_string(), "t2_a");

    let fillet = modeler.backend().feature(Plane::Primary, "t2_a").unwrap();
    assert_eq!(
        fillet.selection(SelectionSlot::Point),
        Some(&SelectionTarget::Points {
            object: "t1_a".into(),
            indices: vec![1, 2, 3, 4],
        })
    );
}

#[test]
fn test_fillet_rejects_zero_index() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    let err = modeler.fillet(&id("a"), "0.1", Some(&[0, 1])).unwrap_err();
    assert!(matches!(err, ModelerError::InvalidOperation(_)));
    assert!(modeler.fillet(&id("a"), "0.1", Some(&[2])).is_ok());
}

#[test]
fn test_fillet_of_union_needs_explicit_vertices() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    unit_rect(&mut modeler, "b", Layer::DEFAULT);
    modeler.unite(&[id("a"), id("b")], false).unwrap();

    let err = modeler.fillet(&id("a"), "0.1", None).unwrap_err();
    assert!(matches!(err, ModelerError::Backend(BackendError::Query(_))));
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "t1_a");
}

#[test]
fn test_unite_across_planes_rejected() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    unit_rect(&mut modeler, "m", Layer::MESH);

    let err = modeler.unite(&[id("a"), id("m")], false).unwrap_err();
    assert!(matches!(
        err,
        ModelerError::PlaneMismatch {
            found: Plane::Auxiliary,
            ..
        }
    ));
    assert!(!modeler.is_deleted(&id("m")));
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "a");
}

#[test]
fn test_unite_skips_deleted_operands() {
    let mut modeler = recording();
    for name in ["a", "b", "c"] {
        unit_rect(&mut modeler, name, Layer::DEFAULT);
    }
    modeler.delete(&id("a")).unwrap();

    let outcome = modeler
        .unite(&[id("a"), id("b"), id("c")], true)
        .unwrap();
    assert_eq!(outcome.survivor, id("b"));
    assert_eq!(outcome.skipped, vec![id("a")]);
    assert!(outcome.absorbed.is_empty());
    assert!(!modeler.is_deleted(&id("c")));

    let union = modeler.backend().feature(Plane::Primary, "t1_b").unwrap();
    assert_eq!(union.property("keep"), Some(&ParamValue::Switch(true)));
}

#[test]
fn test_unite_of_deleted_operands_is_skipped() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    modeler.delete(&id("a")).unwrap();
    let features = modeler.backend().features().len();

    let outcome = modeler.unite(&[id("a")], false).unwrap();
    assert!(outcome.result.is_skipped());
    assert_eq!(modeler.backend().features().len(), features);

    let err = modeler.unite(&[], false).unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Lineage(LineageError::EmptyOperandList)
    ));
}

#[test]
fn test_subtract_tools_from_blanks() {
    let mut modeler = recording();
    for name in ["a", "b", "hole"] {
        unit_rect(&mut modeler, name, Layer::DEFAULT);
    }

    let outcome = modeler
        .subtract(&[id("a"), id("b")], &[id("hole")], false)
        .unwrap();
    let names: Vec<String> = outcome
        .results
        .iter()
        .map(|(_, m)| m.name().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["t1_a", "t1_b"]);
    assert_eq!(outcome.absorbed, vec![id("hole")]);
    assert_eq!(
        modeler.registry().absorbed_into(&id("a")).collect::<Vec<_>>(),
        vec![&id("hole")]
    );

    let diff = modeler.backend().feature(Plane::Primary, "t1_b").unwrap();
    assert_eq!(diff.kind, FeatureKind::Difference);
    assert_eq!(
        diff.selection(SelectionSlot::Input2),
        Some(&SelectionTarget::Objects(strings(&["hole"])))
    );
    assert_eq!(modeler.history().deletion_of(&id("hole")).unwrap().feature, "t1_a");
}

#[test]
fn test_delete_twice() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap();

    assert_eq!(modeler.delete(&id("a")).unwrap(), DeleteStatus::Deleted);
    assert_eq!(modeler.delete(&id("a")).unwrap(), DeleteStatus::AlreadyDeleted);
    assert_eq!(modeler.registry().records().len(), 1);

    let delete = modeler.backend().feature(Plane::Primary, "del_a").unwrap();
    assert_eq!(
        delete.selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["t1_a"])))
    );
    assert_eq!(
        modeler
            .backend()
            .features()
            .iter()
            .filter(|f| f.kind == FeatureKind::Delete)
            .count(),
        1
    );
}

#[test]
fn test_assign_perfect_e() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    unit_rect(&mut modeler, "port", Layer::PORT);

    let assigned = modeler.assign_perfect_e(&[id("a")]).unwrap();
    assert_eq!(assigned, vec![id("a")]);
    let rect = modeler.backend().feature(Plane::Primary, "a").unwrap();
    assert_eq!(
        rect.property("contributeto"),
        Some(&ParamValue::Text("pec_sel".into()))
    );

    let err = modeler.assign_perfect_e(&[id("port")]).unwrap_err();
    assert!(matches!(err, ModelerError::InvalidOperation(_)));
}

#[test]
fn test_entity_names_validated() {
    let mut modeler = recording();
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    let err = modeler
        .rect("a", Layer::GAP, ["0", "0"], ["1", "1"])
        .unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Lineage(LineageError::DuplicateEntity(_))
    ));

    let err = modeler
        .rect("t1_a", Layer::DEFAULT, ["0", "0"], ["1", "1"])
        .unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Lineage(LineageError::MalformedName { .. })
    ));

    let err = modeler.translate(&[id("ghost")], ["1", "0", "0"]).unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Lineage(LineageError::UnknownEntity(_))
    ));
}

#[test]
fn test_run_after_each_operation() {
    let options = ModelerOptions {
        run_after_each_op: true,
        ..ModelerOptions::inline()
    };
    let mut modeler = Modeler::with_options(RecordingBackend::new(), options);
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    unit_rect(&mut modeler, "b", Layer::DEFAULT);
    modeler.unite(&[id("a"), id("b")], false).unwrap();

    assert_eq!(modeler.backend().runs(), 3);
}

#[test]
fn test_custom_auxiliary_layers() {
    let options = ModelerOptions {
        auxiliary_layers: vec![Layer::BACKSIDE],
        ..ModelerOptions::inline()
    };
    let mut modeler = Modeler::with_options(RecordingBackend::new(), options);
    unit_rect(&mut modeler, "back", Layer::BACKSIDE);
    unit_rect(&mut modeler, "mesh", Layer::MESH);

    assert_eq!(modeler.plane_of(&id("back")).unwrap(), Plane::Auxiliary);
    assert_eq!(modeler.plane_of(&id("mesh")).unwrap(), Plane::Primary);
}

#[test]
fn test_arithmetic_sizes_are_evaluated() {
    let mut modeler = recording();
    modeler.set_variable("pad_w", "250um").unwrap();
    modeler.set_variable("gap", "20um").unwrap();

    modeler
        .rect("pad", Layer::DEFAULT, ["0", "0"], ["pad_w+gap", "2*gap"])
        .unwrap();
    let pad = modeler.backend().feature(Plane::Primary, "pad").unwrap();
    assert_eq!(
        pad.property("size"),
        Some(&ParamValue::Vector(strings(&["pad_w+gap", "2*gap"])))
    );

    // A size that only turns out negative after evaluation is still flipped
    modeler
        .rect("notch", Layer::DEFAULT, ["0", "0"], ["gap-pad_w", "gap"])
        .unwrap();
    let notch = modeler.backend().feature(Plane::Primary, "notch").unwrap();
    assert_eq!(
        notch.property("size"),
        Some(&ParamValue::Vector(strings(&["-(gap-pad_w)", "gap"])))
    );
    assert_eq!(
        notch.property("pos"),
        Some(&ParamValue::Vector(strings(&["0+gap-pad_w", "0"])))
    );
}

#[test]
fn test_failed_selection_keeps_name_used() {
    let backend = RecordingBackend::new().failing_selects(1);
    let mut modeler = Modeler::with_options(backend, ModelerOptions::inline());
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    let err = modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Backend(BackendError::Connection(_))
    ));
    // The backend holds t1_a, so the entity is already on that generation
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "t1_a");
    assert_eq!(modeler.history().last().unwrap().feature, "t1_a");

    let moved = modeler.translate(&[id("a")], ["1", "0", "0"]).unwrap();
    assert_eq!(moved[0].1.name().unwrap().to_string(), "t2_a");
    let moved = modeler.backend().feature(Plane::Primary, "t2_a").unwrap();
    assert_eq!(
        moved.selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["t1_a"])))
    );
    assert_eq!(modeler.history().entries_for(&id("a")).count(), 3);
}

#[test]
fn test_delete_retried_after_failed_selection() {
    let backend = RecordingBackend::new().failing_selects(1);
    let mut modeler = Modeler::with_options(backend, ModelerOptions::inline());
    unit_rect(&mut modeler, "a", Layer::DEFAULT);

    assert!(modeler.delete(&id("a")).is_err());
    assert!(!modeler.is_deleted(&id("a")));
    assert_eq!(modeler.history().len(), 1);

    assert_eq!(modeler.delete(&id("a")).unwrap(), DeleteStatus::Deleted);
    assert!(modeler.is_deleted(&id("a")));
    let deletes: Vec<_> = modeler
        .backend()
        .features()
        .iter()
        .filter(|f| f.kind == FeatureKind::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(
        deletes[0].selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["a"])))
    );
    assert_eq!(modeler.history().deletion_of(&id("a")).unwrap().feature, "del_a");
}

#[test]
fn test_partial_translate_keeps_history() {
    let backend = RecordingBackend::new().rejecting_name("t1_b");
    let mut modeler = Modeler::with_options(backend, ModelerOptions::inline());
    unit_rect(&mut modeler, "a", Layer::DEFAULT);
    unit_rect(&mut modeler, "b", Layer::DEFAULT);

    let err = modeler
        .translate(&[id("a"), id("b")], ["1", "0", "0"])
        .unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Backend(BackendError::FeatureRejected { .. })
    ));
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "t1_a");
    assert_eq!(modeler.current_name(&id("b")).unwrap().to_string(), "b");

    let ops: Vec<_> = modeler
        .history()
        .entries_for(&id("a"))
        .map(|e| e.operation)
        .collect();
    assert_eq!(
        ops,
        vec![
            OperationKind::Create(FeatureKind::Rectangle),
            OperationKind::Translate,
        ]
    );
    assert_eq!(modeler.history().entries_for(&id("b")).count(), 1);
}

#[test]
fn test_partial_subtract_absorbs_tools() {
    let backend = RecordingBackend::new().rejecting_name("t1_b");
    let mut modeler = Modeler::with_options(backend, ModelerOptions::inline());
    for name in ["a", "b", "hole"] {
        unit_rect(&mut modeler, name, Layer::DEFAULT);
    }

    assert!(
        modeler
            .subtract(&[id("a"), id("b")], &[id("hole")], false)
            .is_err()
    );
    assert_eq!(modeler.current_name(&id("a")).unwrap().to_string(), "t1_a");
    assert!(modeler.is_deleted(&id("hole")));
    assert_eq!(
        modeler.registry().absorbed_into(&id("a")).collect::<Vec<_>>(),
        vec![&id("hole")]
    );
    assert_eq!(modeler.history().deletion_of(&id("hole")).unwrap().feature, "t1_a");
}

#[test]
fn test_sweep_along_path() {
    let mut modeler = Modeler::new(RecordingBackend::new());
    let trace = modeler
        .sweep_along_path(
            "trace",
            Layer::TRACK,
            &[["0", "0"], ["0", "300um"], ["200um", "300um"]],
            ["0", "1"],
            ["0", "0"],
            "10um",
            "50um",
        )
        .unwrap();
    assert_eq!(trace.to_string(), "trace");
    assert_eq!(modeler.plane_of(&id("trace")).unwrap(), Plane::Primary);
    assert!(!modeler.is_deleted(&id("trace")));
    for helper in ["trace_line", "trace_profile", "trace_sweep"] {
        assert!(modeler.is_deleted(&id(helper)), "{} should be gone", helper);
    }
    assert_eq!(
        modeler.registry().record(&id("trace_line")).unwrap().absorbed_by,
        Some(id("trace_sweep"))
    );

    let backend = modeler.backend();
    assert_eq!(backend.parameter("trace_line_point_1_y"), Some("300[um]"));
    assert_eq!(backend.parameter("trace_profile_port_ori_y"), Some("1"));

    let fillet = backend.feature(Plane::Primary, "t1_trace_line").unwrap();
    assert_eq!(
        fillet.selection(SelectionSlot::Point),
        Some(&SelectionTarget::Points {
            object: "trace_line".into(),
            indices: vec![2],
        })
    );
    let profile = backend.feature(Plane::Primary, "trace_profile").unwrap();
    assert_eq!(profile.kind, FeatureKind::Profile);
    assert_eq!(
        profile.property("normalvector"),
        Some(&ParamValue::Vector(strings(&[
            "trace_profile_port_ori_x",
            "trace_profile_port_ori_y",
            "0"
        ])))
    );

    let sweep = backend.feature(Plane::Primary, "trace_sweep").unwrap();
    assert_eq!(sweep.kind, FeatureKind::Sweep);
    assert_eq!(
        sweep.selection(SelectionSlot::Edge),
        Some(&SelectionTarget::Points {
            object: "t1_trace_line".into(),
            indices: vec![1, 2, 3],
        })
    );
    assert_eq!(
        sweep.selection(SelectionSlot::Face),
        Some(&SelectionTarget::Points {
            object: "trace_profile".into(),
            indices: vec![1],
        })
    );

    let section = backend.feature(Plane::Primary, "trace").unwrap();
    assert_eq!(section.kind, FeatureKind::CrossSection);
    assert_eq!(
        section.selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["trace_sweep"])))
    );
    let delete = backend.feature(Plane::Primary, "del_trace_sweep").unwrap();
    assert_eq!(
        delete.selection(SelectionSlot::Input),
        Some(&SelectionTarget::Objects(strings(&["trace_sweep"])))
    );

    let ops: Vec<_> = modeler.history().entries().iter().map(|e| e.operation).collect();
    assert_eq!(
        ops,
        vec![
            OperationKind::Create(FeatureKind::Polygon),
            OperationKind::Fillet,
            OperationKind::Create(FeatureKind::Profile),
            OperationKind::Create(FeatureKind::Sweep),
            OperationKind::Create(FeatureKind::CrossSection),
            OperationKind::Delete,
        ]
    );
}

#[test]
fn test_sweep_follows_layer_plane() {
    let mut modeler = recording();
    modeler
        .sweep_along_path(
            "feed",
            Layer::PORT,
            &[["0", "0"], ["1", "0"]],
            ["1", "0"],
            ["0", "0"],
            "0.1",
            "0.2",
        )
        .unwrap();
    assert_eq!(modeler.plane_of(&id("feed")).unwrap(), Plane::Auxiliary);

    // A straight path has no corner to fillet
    let backend = modeler.backend();
    assert!(backend.feature(Plane::Auxiliary, "t1_feed_line").is_none());
    let sweep = backend.feature(Plane::Auxiliary, "feed_sweep").unwrap();
    assert_eq!(
        sweep.selection(SelectionSlot::Edge),
        Some(&SelectionTarget::Points {
            object: "feed_line".into(),
            indices: vec![1],
        })
    );

    let straight = [["0", "0"], ["1", "0"]];
    let err = modeler
        .sweep_along_path("feed", Layer::PORT, &straight, ["1", "0"], ["0", "0"], "1", "1")
        .unwrap_err();
    assert!(matches!(
        err,
        ModelerError::Lineage(LineageError::DuplicateEntity(_))
    ));
    let err = modeler
        .sweep_along_path("short", Layer::TRACK, &[["0", "0"]], ["1", "0"], ["0", "0"], "1", "1")
        .unwrap_err();
    assert!(matches!(err, ModelerError::InvalidOperation(_)));
}
