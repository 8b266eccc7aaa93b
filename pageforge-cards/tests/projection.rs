//! Full collection passes: projection, visibility, and style propagation
//! working together the way one editor state change drives them.

use indexmap::IndexMap;
use pageforge_cards::{
    CardId, CardTemplate, CardsWrapper, CollectionSession, Projector, ResolveMode,
};
use pageforge_fields::DocumentContext;
use pageforge_layout::{ComponentDef, ComponentRegistry};
use serde_json::{json, Map, Value};

fn registry() -> ComponentRegistry {
    let mut title_defaults = Map::new();
    title_defaults.insert(
        "data".into(),
        json!({ "field": "", "constantValue": "", "constantValueEnabled": true }),
    );
    title_defaults.insert("itemPath".into(), json!("title"));
    title_defaults.insert("styles".into(), json!({}));

    let mut image_defaults = Map::new();
    image_defaults.insert(
        "data".into(),
        json!({ "field": "", "constantValue": { "url": "" }, "constantValueEnabled": true }),
    );
    image_defaults.insert("itemPath".into(), json!("image"));
    image_defaults.insert("styles".into(), json!({}));

    ComponentRegistry::new()
        .with(ComponentDef::new("TitleSlot").with_version(1).with_defaults(title_defaults))
        .with(ComponentDef::new("ImageSlot").with_version(1).with_defaults(image_defaults))
}

fn template() -> CardTemplate {
    CardTemplate::new("EventCard")
        .with_slot("title", "TitleSlot")
        .with_slot("image", "ImageSlot")
}

fn document() -> Value {
    json!({
        "events": [
            { "title": "Grand opening", "image": { "url": "https://img.test/open.jpg" } },
            { "title": "Clearance", "image": { "url": "" } }
        ]
    })
}

#[test]
fn refresh_projects_and_stamps_visibility() {
    let doc = document();
    let ctx = DocumentContext::new(&doc, "en");
    let registry = registry();
    let template = template();
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };

    let wrapper = CardsWrapper::entity_sourced("events");
    let next = projector.refresh(&wrapper, &Map::new(), ResolveMode::Live);

    assert_eq!(next.cards.len(), 2);
    // First event has both title and image content.
    assert_eq!(next.cards[0].conditional_render["title"], true);
    assert_eq!(next.cards[0].conditional_render["image"], true);
    // Second event's image url is empty.
    assert_eq!(next.cards[1].conditional_render["title"], true);
    assert_eq!(next.cards[1].conditional_render["image"], false);

    // Purity: the input wrapper is untouched.
    assert!(wrapper.cards.is_empty());
}

#[test]
fn wrapper_toggle_hides_a_slot_across_all_cards() {
    let doc = document();
    let ctx = DocumentContext::new(&doc, "en");
    let registry = registry();
    let template = template();
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };

    let mut parent_styles = Map::new();
    parent_styles.insert("showImage".into(), json!(false));

    let wrapper = CardsWrapper::entity_sourced("events");
    let next = projector.refresh(&wrapper, &parent_styles, ResolveMode::Editing);
    for card in &next.cards {
        assert_eq!(card.conditional_render["image"], false);
        assert_eq!(card.conditional_render["title"], true);
    }
}

#[test]
fn live_list_shrink_then_grow() {
    let registry = registry();
    let template = template();

    let grown = json!({ "events": [
        { "title": "A" }, { "title": "B" }, { "title": "C" }, { "title": "D" }, { "title": "E" }
    ]});
    let ctx = DocumentContext::new(&grown, "en");
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };
    let wrapper = projector.project(&CardsWrapper::entity_sourced("events"));
    assert_eq!(wrapper.cards.len(), 5);
    let ids: Vec<CardId> = wrapper.cards.iter().map(|c| c.id.clone()).collect();

    let shrunk = json!({ "events": [ { "title": "A" }, { "title": "B" }, { "title": "C" } ]});
    let ctx = DocumentContext::new(&shrunk, "en");
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };
    let wrapper = projector.project(&wrapper);
    assert_eq!(wrapper.cards.len(), 3);
    assert_eq!(
        wrapper.cards.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
        ids[..3]
    );

    let ctx = DocumentContext::new(&grown, "en");
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };
    let wrapper = projector.project(&wrapper);
    assert_eq!(wrapper.cards.len(), 5);
    assert_eq!(
        wrapper.cards[..3].iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
        ids[..3]
    );
    // Regrown positions are new cards, not the dropped ones.
    assert_ne!(wrapper.cards[3].id, ids[3]);
    assert_ne!(wrapper.cards[4].id, ids[4]);
}

#[test]
fn constant_wrapper_round_trips_through_serialization() {
    let doc = document();
    let ctx = DocumentContext::new(&doc, "en");
    let registry = registry();
    let template = template();
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };

    let wrapper = projector.project(&CardsWrapper::constant_sourced(vec![None, None]));
    let wire = serde_json::to_value(&wrapper).unwrap();
    let parsed: CardsWrapper = serde_json::from_value(wire).unwrap();
    assert_eq!(parsed, wrapper);

    // Projecting the deserialized wrapper is still a fixed point.
    assert_eq!(projector.project(&parsed), wrapper);
}

#[test]
fn style_edit_propagates_through_session() {
    let doc = document();
    let ctx = DocumentContext::new(&doc, "en");
    let registry = registry();
    let template = template();
    let projector = Projector { ctx: &ctx, registry: &registry, template: &template };

    let wrapper = projector.project(&CardsWrapper::constant_sourced(vec![None, None, None]));
    let ids: Vec<CardId> = wrapper.cards.iter().map(|c| c.id.clone()).collect();
    let mut session = CollectionSession::new(wrapper);

    let mut styles = Map::new();
    styles.insert("background".into(), json!("dark"));
    let mut slot_styles = IndexMap::new();
    let mut image_styles = Map::new();
    image_styles.insert("aspect".into(), json!("16:9"));
    slot_styles.insert("image".to_string(), image_styles);

    let changed = session.edit_card_styles(&ids[1], styles, slot_styles).unwrap();
    assert_eq!(changed, 2, "both siblings converge in one pass");

    for card in &session.wrapper().cards {
        assert_eq!(card.styles["background"], json!("dark"));
        assert_eq!(
            card.slots["image"][0].props["styles"]["aspect"],
            json!("16:9")
        );
        // Structural binding stayed per-card.
        assert_eq!(card.slots["image"][0].props["itemPath"], json!("image"));
    }

    // The ephemeral channel dies with the session; styles persist on cards.
    let wrapper = session.into_wrapper();
    assert_eq!(wrapper.cards[0].styles["background"], json!("dark"));
}
