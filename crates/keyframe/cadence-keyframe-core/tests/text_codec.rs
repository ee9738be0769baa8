use approx::assert_relative_eq;
use cadence_keyframe_core::{
    copy_or_default, from_json_str, to_json_string, Animatable, ChannelKind, CustomObject,
    EasingKind, Entity, ModelRegistry, PlayerModel, PlayerPart, RandomMode, TreeCodec,
    Visibility,
};
use cadence_test_fixtures::models;
use serde_json::{json, Value as JsonValue};

fn load_model(name: &str) -> PlayerModel {
    let text = models::json(name).expect("load model fixture");
    from_json_str(&text).expect("parse model fixture")
}

#[test]
fn default_instances_write_only_identity() {
    let model = PlayerModel::default();
    let tree = model.to_tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree["id"], JsonValue::String(model.id.clone()));

    let obj = CustomObject::default();
    assert_eq!(obj.to_tree().len(), 1);

    assert!(PlayerPart::default().to_tree().is_empty());
}

#[test]
fn custom_hex_is_gated_by_colour_index() {
    let mut model = PlayerModel::default();
    model.head.color = 24;
    model.head.hex = "FF00FF".into();
    let tree = model.to_tree();
    assert_eq!(tree["head"]["col"], json!({ "x": "24", "hex": "FF00FF" }));

    model.head.color = 23;
    let tree = model.to_tree();
    assert!(tree.get("head").is_none());
}

#[test]
fn animated_fixture_round_trips() {
    let model = load_model("animated");
    assert_eq!(model.id, "4815162342000001");
    assert_eq!(model.name, "Comet");
    assert_eq!(model.control.base_speed, 30.0);
    assert_eq!(model.control.health, 5);
    assert_eq!(model.head.hex, "FF00FF");
    assert!(model.head.trail.emitting);
    assert_eq!(model.boost.opacity, 0.75);
    assert_eq!(model.objects.len(), 2);

    let text = to_json_string(&model).expect("serialize");
    let back: PlayerModel = from_json_str(&text).expect("reparse");
    assert_eq!(back.id, model.id);
    assert_eq!(back.control, model.control);
    assert_eq!(back.head, model.head);
    assert_eq!(back.boost, model.boost);
    assert_eq!(back.tail, model.tail);

    let ring = back.object("4815162342000010").expect("ring");
    let original = model.object("4815162342000010").expect("ring");
    for channel in [ChannelKind::Position, ChannelKind::Rotation] {
        assert_eq!(ring.sequence(channel), original.sequence(channel));
    }
    assert_eq!(ring.anim_length(), 3.0);

    // Re-serializing the reparsed document is stable.
    assert_eq!(to_json_string(&back).expect("serialize again"), text);
}

#[test]
fn animated_fixture_evaluates() {
    let model = load_model("animated");
    let ring = model.object("4815162342000010").expect("ring");

    let pos = ring.sequence(ChannelKind::Position).expect("position");
    assert_eq!(pos.evaluate(1.0), vec![2.0, 0.0]);
    assert_eq!(pos.evaluate(2.0), vec![3.0, 0.5]);
    assert_eq!(pos.evaluate(3.0), vec![4.0, 1.0]);
    assert_eq!(pos.evaluate(10.0), vec![4.0, 1.0]);

    let rot = ring.sequence(ChannelKind::Rotation).expect("rotation");
    assert_eq!(rot.keyframes()[1].curve, EasingKind::InSine);
    let expected = 90.0 * (1.0 - (std::f32::consts::FRAC_PI_4).cos());
    assert_relative_eq!(rot.evaluate(1.0)[0], expected, epsilon = 1e-4);
    assert_eq!(rot.evaluate(2.0), vec![90.0]);

    assert_relative_eq!(model.anim_length(), 3.0);
}

#[test]
fn legacy_keys_are_accepted() {
    let model = load_model("legacy-keys");
    assert_eq!(model.name, "Old Timer");
    assert_eq!(model.version, "0");
    assert_eq!(model.control.base_speed, 25.0);
    assert_eq!(model.control.health, 5);
    assert!(model.control.accurate_collision);
    assert_eq!(model.head.position, [1.0, 2.0]);
    assert_eq!(model.head.color, 5);
    assert!(!model.head.active);
    assert_eq!(model.tail.len(), 2);
    assert_eq!(model.tail[0].scale, [0.5, 0.5]);
    assert_eq!(model.tail[1], PlayerPart::default());

    let obj = &model.objects[0];
    assert_eq!(obj.name, "Legacy");
    let rot = obj.sequence(ChannelKind::Rotation).expect("rotation");
    let kf = &rot.keyframes()[1];
    assert_eq!(kf.time, 1.0);
    assert_eq!(kf.values, vec![45.0]);
    assert_eq!(kf.curve, EasingKind::OutSine);
    assert_eq!(kf.random_mode, RandomMode::Paired);
    assert_eq!(kf.random_values, [10.0, 20.0, 0.0, 0.0]);

    let sca = obj.sequence(ChannelKind::Scale).expect("scale");
    assert_eq!(sca.keyframes()[1].values, vec![2.0, 3.0]);

    // Legacy keys are never written back.
    let tree = model.to_tree();
    assert!(tree.contains_key("ctrl"));
    assert!(!tree.contains_key("control"));
    assert!(tree.contains_key("objects"));
    let written = &tree["objects"][0]["events"]["rot"][1];
    assert_eq!(written["r"], JsonValue::String("2".into()));
    assert_eq!(written["ct"], JsonValue::String("OutSine".into()));
}

#[test]
fn corrupt_fields_fall_back_without_losing_the_document() {
    let model = load_model("partially-corrupt");
    assert_eq!(model.name, "Broken");
    assert_eq!(model.control.base_speed, 20.0);
    assert_eq!(model.control.health, 4);
    assert_eq!(model.head.rotation, 0.0);
    assert_eq!(model.head.opacity, 0.5);
    assert_eq!(model.head.position, [0.0, 0.0]);
    assert_eq!(model.tail.len(), 2);
    assert_eq!(model.tail[0], PlayerPart::default());
    assert_eq!(model.tail[1].shape.shape, 2);

    assert_eq!(model.objects.len(), 1);
    let obj = &model.objects[0];
    assert_eq!(obj.depth, 0);
    let rot = obj.sequence(ChannelKind::Rotation).expect("rotation");
    let times: Vec<f32> = rot.keyframes().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 0.0, 2.0]);
    assert_eq!(rot.keyframes()[1].values, vec![0.0]);
    assert_eq!(rot.keyframes()[2].random_mode, RandomMode::None);
    assert_eq!(obj.anim_length(), 2.0);
}

#[test]
fn malformed_documents_are_errors() {
    assert!(from_json_str::<PlayerModel>("{ not json").is_err());
    let err = from_json_str::<PlayerModel>("[1, 2]").unwrap_err();
    assert_eq!(err.category(), "text");
}

#[test]
fn base_model_fills_absent_fields() {
    let registry = ModelRegistry::with_builtin();
    let text = models::json("circle-derived").expect("load fixture");
    let base_id = models::base("circle-derived")
        .expect("manifest entry")
        .expect("base declared");
    let tree = match serde_json::from_str::<JsonValue>(&text).expect("parse") {
        JsonValue::Object(tree) => tree,
        other => panic!("unexpected root {other}"),
    };

    let model = PlayerModel::from_tree_with(&tree, &registry);
    let base = registry.get(&base_id).expect("base registered");
    assert_eq!(model.id, "3141592653000001");
    assert_eq!(model.name, "Circle Variant");
    assert_eq!(model.creator, base.creator);
    assert_eq!(model.head.shape, base.head.shape);
    assert_eq!(model.head.color, 24);
    assert_eq!(model.head.hex, "00FFAA");
    assert_eq!(model.tail, base.tail);

    // Without the registry the same document falls back to plain defaults.
    let plain = PlayerModel::from_tree(&tree);
    assert_eq!(plain.tail, PlayerModel::default().tail);
    assert_eq!(plain.head.shape.shape, 0);
}

#[test]
fn copy_identity_law() {
    let model = load_model("animated");

    let kept = model.copy(true);
    assert_eq!(kept, model);

    let mut fresh = model.copy(false);
    assert_ne!(fresh.id, model.id);
    assert_eq!(fresh.name, model.name);
    assert_eq!(fresh.head, model.head);
    for (a, b) in model.objects.iter().zip(&fresh.objects) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }
    assert_eq!(fresh.objects[1].parent, fresh.objects[0].id);

    fresh.head.rotation = 45.0;
    fresh.objects[0]
        .sequence_mut(ChannelKind::Rotation)
        .expect("rotation")
        .set_value(1, 0, -1.0);
    assert_eq!(model.head.rotation, 0.0);
    assert_eq!(
        model.objects[0]
            .sequence(ChannelKind::Rotation)
            .expect("rotation")
            .keyframes()[1]
            .values,
        vec![90.0]
    );
}

#[test]
fn copying_nothing_yields_a_default_instance() {
    let copy = copy_or_default::<CustomObject>(None, false);
    assert!(!copy.id.is_empty());
    assert_eq!(copy.to_tree().len(), 1);

    let reference = CustomObject::default();
    assert_eq!(copy.name, reference.name);
    assert_eq!(copy.parent, reference.parent);
    assert_eq!(copy.shape, reference.shape);
    assert_eq!(copy.depth, reference.depth);
    assert_eq!(copy.visibility, Visibility::Always);
    for channel in ChannelKind::ALL {
        let seq = copy.sequence(channel).expect("channel");
        assert!(seq.is_default(), "{channel}");
        assert!(!seq.baseline().id.is_empty());
    }
    assert_eq!(copy.anim_length(), 0.0);

    let source = CustomObject::new("lamp");
    let kept = copy_or_default(Some(&source), true);
    assert_eq!(kept, source);
}
