//! Tests for scene block extraction

use super::*;
use crate::types::{CharacterAction, Position};

#[test]
fn response_without_block_is_plain_narrative() {
    let response = "  Luna looks out the window.\n\n";
    let extraction = extract(response);

    assert_eq!(extraction.narrative, response.trim());
    assert_eq!(extraction.directive, None);
    assert_eq!(extraction.delimiter, None);
    assert!(extraction.raw_payload.is_empty());
    assert!(!contains_directive(response));
}

#[test]
fn scene_fence_is_removed_from_narrative() {
    let response = "Luna waves.\n```scene\n{\"scene\": {\"background\": \"park\"}}\n```\nShe smiles.";
    let extraction = extract(response);

    assert_eq!(extraction.narrative, "Luna waves.\n\nShe smiles.");
    assert_eq!(extraction.delimiter, Some(Delimiter::SceneFence));
    assert_eq!(extraction.raw_payload, r#"{"scene": {"background": "park"}}"#);
    let directive = extraction.directive.unwrap();
    assert_eq!(directive.scene.background.as_deref(), Some("park"));
}

#[test]
fn malformed_payload_is_repaired() {
    let response = "```scene\n{background: \"park\", characters: [{name: \"Luna\", expression: joy,}]}\n```";
    let extraction = extract(response);

    let directive = extraction.directive.unwrap();
    assert_eq!(directive.scene.background.as_deref(), Some("park"));
    assert_eq!(directive.characters[0].name, "Luna");
    assert_eq!(directive.characters[0].expression.as_deref(), Some("joy"));
    assert!(!extraction.repair.unwrap().fixes.is_empty());
    assert_eq!(extraction.narrative, "");
}

#[test]
fn scene_fence_takes_priority_over_tags() {
    let response = "<scene>{\"background\": \"cafe\"}</scene>\nText\n```scene\n{\"background\": \"park\"}\n```";
    let extraction = extract(response);

    assert_eq!(extraction.delimiter, Some(Delimiter::SceneFence));
    assert_eq!(
        extraction.directive.unwrap().scene.background.as_deref(),
        Some("park")
    );
    assert!(extraction.narrative.contains("<scene>"));
}

#[test]
fn commented_json_fence() {
    let response = "Hello.\n```json\n// scene\n{\"background\": \"cafe\"}\n```";
    let extraction = extract(response);

    assert_eq!(extraction.delimiter, Some(Delimiter::CommentedJsonFence));
    assert_eq!(extraction.narrative, "Hello.");
    assert_eq!(
        extraction.directive.unwrap().scene.background.as_deref(),
        Some("cafe")
    );
}

#[test]
fn plain_json_fence_is_not_a_scene_block() {
    let response = "Here is data:\n```json\n{\"background\": \"cafe\"}\n```";
    assert!(!contains_directive(response));
    assert_eq!(extract(response).directive, None);
}

#[test]
fn bracket_tags_are_case_insensitive() {
    let response = "Intro [SCENE]{\"characters\": [{\"name\": \"Luna\", \"action\": \"exits\"}]}[/Scene] outro";
    let extraction = extract(response);

    assert_eq!(extraction.delimiter, Some(Delimiter::BracketTag));
    assert_eq!(extraction.narrative, "Intro  outro");
    let directive = extraction.directive.unwrap();
    assert_eq!(directive.characters[0].action, Some(CharacterAction::Exits));
}

#[test]
fn xml_tags() {
    let response = "Night falls.\n<scene>\n{\"characters\": [{\"name\": \"Sol\", \"position\": \"right\"}]}\n</scene>";
    let extraction = extract(response);

    assert_eq!(extraction.delimiter, Some(Delimiter::XmlTag));
    assert_eq!(extraction.narrative, "Night falls.");
    assert_eq!(
        extraction.directive.unwrap().characters[0].position,
        Some(Position::Right)
    );
}

#[test]
fn unterminated_fence_is_recovered() {
    let response = "Luna gasps.\n```scene\n{\"scene\": {\"background\": \"park\"";
    let extraction = extract(response);

    assert_eq!(extraction.delimiter, Some(Delimiter::UnterminatedFence));
    assert_eq!(extraction.narrative, "Luna gasps.");
    assert_eq!(
        extraction.directive.unwrap().scene.background.as_deref(),
        Some("park")
    );
}

#[test]
fn unrepairable_payload_keeps_whole_response() {
    let response = "Text before.\n```scene\nnot json at all\n```\n";
    let extraction = extract(response);

    assert_eq!(extraction.directive, None);
    assert_eq!(extraction.narrative, response.trim());
    assert_eq!(extraction.raw_payload, "not json at all");
    assert!(!extraction.repair.unwrap().is_ok());
}

#[test]
fn blank_line_runs_are_collapsed() {
    let response = "First.\n\n```scene\n{}\n```\n\n\nSecond.";
    assert_eq!(extract(response).narrative, "First.\n\nSecond.");
}

#[test]
fn strip_removes_all_blocks() {
    let response = "A\n```scene\n{}\n```\nB [scene]garbage[/scene] C\n<scene>x</scene>";
    assert!(contains_directive(response));
    assert_eq!(strip_directive(response), "A\n\nB  C");
}
