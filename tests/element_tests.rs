mod common;

use milsymbol_schema::ast::{Align, BBox, ColorToken, Element, Style, TextType, Vec2};
use milsymbol_schema::{ErrorType, SchemaError};
use serde_json::json;

use common::{compile, full_frame_body};

fn single(item: serde_json::Value) -> Element {
    let mut elements = compile(item, json!({})).unwrap();
    assert_eq!(elements.len(), 1);
    elements.remove(0)
}

// =============================
// Leaves
// =============================

#[test]
fn path_defaults() {
    let element = single(json!({"d": "M 0,0 L 10,10"}));
    assert_eq!(
        element,
        Element::Path {
            d: "M 0,0 L 10,10".to_string(),
            bbox: BBox::new(100.0, 100.0, 100.0, 100.0),
            style: Style {
                fill: None,
                stroke: Some(ColorToken::Icon),
                stroke_width: 4.0,
            },
        }
    );
}

#[test]
fn path_with_bbox_and_style() {
    let element = single(json!({
        "d": "M 0,0",
        "bbox": [1, 2, 3, 4],
        "fill": "WHITE",
        "stroke": false,
        "strokewidth": 2
    }));
    let Element::Path { bbox, style, .. } = element else {
        panic!("expected a path");
    };
    assert_eq!(bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(style.fill, Some(ColorToken::White));
    assert_eq!(style.stroke, None);
    assert_eq!(style.stroke_width, 2.0);
}

#[test]
fn circle_requires_pos() {
    let element = single(json!({"r": 5, "pos": [100, 90], "fill": true}));
    assert_eq!(
        element,
        Element::Circle {
            pos: Vec2::new(100.0, 90.0),
            radius: 5.0,
            style: Style {
                fill: Some(ColorToken::Icon),
                ..Style::outline()
            },
        }
    );

    let err = compile(json!({"r": 5}), json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { .. }));
}

#[test]
fn text_kinds() {
    let Element::Text {
        text_type, style, pos, ..
    } = single(json!({"text": "HQ"}))
    else {
        panic!("expected text");
    };
    assert_eq!(text_type, TextType::Auto);
    assert_eq!(pos, Vec2::new(100.0, 100.0));
    assert_eq!(style, Style::glyph());

    let Element::Text {
        text_type,
        pos,
        font_size,
        align,
        ..
    } = single(json!({"text": "x", "pos": [40, 60], "fontsize": 20, "align": "left"}))
    else {
        panic!("expected text");
    };
    assert_eq!(text_type, TextType::Manual);
    assert_eq!(pos, Vec2::new(40.0, 60.0));
    assert_eq!(font_size, 20.0);
    assert_eq!(align, Align::Left);

    let Element::Text { text_type, .. } = single(json!({"text": "x", "fontsize": 20})) else {
        panic!("expected text");
    };
    assert_eq!(text_type, TextType::Manual);

    let Element::Text { text_type, .. } = single(json!({"textm1": "A"})) else {
        panic!("expected text");
    };
    assert_eq!(text_type, TextType::Modifier1);

    let Element::Text { text_type, .. } = single(json!({"textm2": "B"})) else {
        panic!("expected text");
    };
    assert_eq!(text_type, TextType::Modifier2);
}

#[test]
fn text_takes_precedence_over_other_keys() {
    let element = single(json!({"d": "M 0,0", "r": 3, "text": "T"}));
    assert!(matches!(element, Element::Text { .. }));
    let element = single(json!({"d": "M 0,0", "r": 3, "pos": [1, 1]}));
    assert!(matches!(element, Element::Path { .. }));
}

// =============================
// Transforms
// =============================

#[test]
fn nested_transforms_keep_order() {
    let element = single(json!({
        "translate": [10, -5],
        "items": [
            {"d": "M 1,1"},
            {"scale": 0.5, "items": [{"d": "M 2,2"}, {"d": "M 3,3"}]}
        ]
    }));
    let Element::Translate { delta, items, .. } = element else {
        panic!("expected a translate");
    };
    assert_eq!(delta, Vec2::new(10.0, -5.0));
    assert_eq!(items.len(), 2);
    let Element::Scale { factor, items, .. } = &items[1] else {
        panic!("expected a scale");
    };
    assert_eq!(*factor, 0.5);
    let ds: Vec<&str> = items
        .iter()
        .map(|e| match e {
            Element::Path { d, .. } => d.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(ds, vec!["M 2,2", "M 3,3"]);
}

#[test]
fn transform_child_failure_aborts_everything() {
    let err = compile(
        json!({"scale": 2, "items": [{"d": "M 0,0"}, {"d": "M 1,1", "fill": "purple"}]}),
        json!({}),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::BadColor { .. }));
}

#[test]
fn transform_without_items_is_rejected() {
    let err = compile(json!({"translate": [1, 1]}), json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { .. }));
    let err = compile(json!({"scale": 1, "items": {"d": "M"}}), json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { .. }));
}

// =============================
// Aliases
// =============================

#[test]
fn alias_splices_sibling_elements() {
    let siblings = json!({
        "01": {"names": ["base"], "icon": [{"d": "M 0,0"}, {"r": 4, "pos": [1, 1]}]}
    });
    let elements = compile(json!({"icon": "01"}), siblings).unwrap();
    assert_eq!(elements.len(), 2);
    assert!(matches!(elements[0], Element::Path { .. }));
    assert!(matches!(elements[1], Element::Circle { .. }));
}

#[test]
fn alias_copies_are_independent() {
    let siblings = json!({
        "01": {"names": ["base"], "icon": [{"d": "M 0,0"}]}
    });
    let mut first = compile(json!({"icon": "01"}), siblings.clone()).unwrap();
    let second = compile(json!({"icon": "01"}), siblings).unwrap();

    first[0].style_mut().fill = Some(ColorToken::Yellow);
    if let Element::Path { d, .. } = &mut first[0] {
        d.push_str(" Z");
    }

    let Element::Path { d, style, .. } = &second[0] else {
        panic!("expected a path");
    };
    assert_eq!(d, "M 0,0");
    assert_eq!(style.fill, None);
}

#[test]
fn alias_style_overrides_apply_to_that_site_only() {
    let siblings = json!({
        "01": {"names": ["base"], "icon": [{"d": "M 0,0"}, {"d": "M 1,1", "stroke": "white"}]},
        "02": {"names": ["user"], "icon": [
            {"icon": "01", "fill": "yellow"},
            {"icon": "01"}
        ]}
    });
    let elements = compile(json!({"icon": "02"}), siblings).unwrap();
    assert_eq!(elements.len(), 4);
    let fills: Vec<Option<ColorToken>> = elements.iter().map(|e| e.style().fill).collect();
    assert_eq!(
        fills,
        vec![Some(ColorToken::Yellow), Some(ColorToken::Yellow), None, None]
    );
    assert_eq!(elements[1].style().stroke, Some(ColorToken::White));
}

#[test]
fn unknown_alias_is_rejected() {
    let err = compile(json!({"icon": "99"}), json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownAlias { ref name } if name == "99"));
    assert_eq!(err.error_type(), ErrorType::Element);
}

#[test]
fn alias_to_empty_icon_is_rejected() {
    let siblings = json!({"01": {"names": ["empty"], "icon": []}});
    let err = compile(json!({"icon": "01"}), siblings).unwrap_err();
    assert!(matches!(err, SchemaError::EmptyAlias { .. }));
}

#[test]
fn alias_cycle_is_rejected() {
    let siblings = json!({
        "01": {"names": ["a"], "icon": [{"icon": "02"}]},
        "02": {"names": ["b"], "icon": [{"icon": "01"}]}
    });
    let err = compile(json!({"icon": "01"}), siblings).unwrap_err();
    match err {
        SchemaError::AliasCycle { chain } => assert_eq!(chain, vec!["01", "02", "01"]),
        other => panic!("unexpected error {other:?}"),
    }
}

// =============================
// Full frames
// =============================

#[test]
fn full_frame_buckets_by_affiliation_id() {
    let element = single(full_frame_body());
    let Element::FullFrame { elements, .. } = element else {
        panic!("expected a full frame");
    };
    assert_eq!(
        elements.keys().collect::<Vec<_>>(),
        vec!["3", "6", "4", "1"]
    );
    assert!(elements.values().all(|bucket| bucket.len() == 1));
}

#[test]
fn full_frame_aliases_collapse_into_one_bucket() {
    let mut body = full_frame_body();
    body["Friendly"] = json!([{"d": "M 9,9"}]);
    let Element::FullFrame { elements, .. } = single(body) else {
        panic!("expected a full frame");
    };
    let friend = &elements["3"];
    assert_eq!(friend.len(), 2);
    assert!(matches!(&friend[1], Element::Path { d, .. } if d == "M 9,9"));
}

#[test]
fn full_frame_missing_affiliation_is_rejected() {
    let mut body = full_frame_body();
    body.as_object_mut().unwrap().remove("Neutral");
    let err = compile(body, json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { ref reason } if reason.contains("Neutral")));
}

#[test]
fn full_frame_renamed_key_is_rejected() {
    let mut body = full_frame_body();
    let object = body.as_object_mut().unwrap();
    let hostile = object.remove("Hostile").unwrap();
    object.insert("Hostiles".to_string(), hostile);
    let err = compile(body, json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { ref reason } if reason.contains("Hostiles")));
}

#[test]
fn full_frame_derived_affiliation_is_not_a_key() {
    let mut body = full_frame_body();
    body["Suspect"] = json!([]);
    let err = compile(body, json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { .. }));
}

#[test]
fn full_frame_value_must_be_a_list() {
    let mut body = full_frame_body();
    body["Unknown"] = json!({"d": "M 0,0"});
    let err = compile(body, json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidElementShape { .. }));
}

// =============================
// Shapes and colors
// =============================

#[test]
fn non_objects_and_empty_objects_are_rejected() {
    for item in [json!("M 0,0"), json!([1, 2]), json!(3), json!({})] {
        let err = compile(item.clone(), json!({})).unwrap_err();
        assert!(
            matches!(err, SchemaError::InvalidElementShape { .. }),
            "{item}: {err:?}"
        );
    }
}

#[test]
fn bad_colors_are_rejected() {
    for color in [json!("purple"), json!(1), json!(null), json!(["icon"])] {
        let err = compile(json!({"d": "M 0,0", "stroke": color}), json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::BadColor { .. }), "{err:?}");
    }
}

#[test]
fn none_string_clears_color() {
    let element = single(json!({"d": "M 0,0", "stroke": "none"}));
    assert_eq!(element.style().stroke, None);
}
