//! Built-in macro resolvers

use super::{MacroContext, MacroKey, MacroResolver};
use crate::collaborators::list_or_empty;
use crate::types::SceneState;
use async_trait::async_trait;
use serde_json::json;

/// Resolver for one of the built-in [`MacroKey`]s
#[derive(Debug, Clone, Copy)]
pub struct BuiltinResolver {
    key: MacroKey,
}

impl BuiltinResolver {
    pub fn new(key: MacroKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl MacroResolver for BuiltinResolver {
    async fn resolve(&self, ctx: &MacroContext<'_>) -> anyhow::Result<String> {
        let scene = ctx.scene;
        let value = match self.key {
            MacroKey::Backgrounds => {
                let timeout = ctx.config.asset_timeout();
                list_or_empty("backgrounds", timeout, ctx.assets.list_backgrounds())
                    .await
                    .join(", ")
            }
            MacroKey::CurrentBackground => or_placeholder(scene.background.as_deref(), "none"),
            MacroKey::CurrentMusic => or_placeholder(scene.music.as_deref(), "none"),
            MacroKey::Location => or_placeholder(scene.location.as_deref(), "unknown"),
            MacroKey::Expressions => roster_assets(ctx, AssetKind::Expressions).await,
            MacroKey::Outfits => roster_assets(ctx, AssetKind::Outfits).await,
            MacroKey::Npcs => ctx
                .config
                .npcs
                .iter()
                .map(|npc| format!("- {}: {}", npc.name, npc.description))
                .collect::<Vec<_>>()
                .join("\n"),
            MacroKey::SceneCharacters => scene_characters(scene),
            MacroKey::Schema => schema(ctx.config.choice_count)?,
            MacroKey::ChoiceCount => ctx.config.choice_count.to_string(),
        };
        Ok(value)
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

#[derive(Clone, Copy)]
enum AssetKind {
    Expressions,
    Outfits,
}

/// Everyone on stage, then configured NPCs who are not
fn roster(ctx: &MacroContext<'_>) -> Vec<String> {
    let mut names: Vec<String> = ctx.scene.characters.iter().map(|c| c.name.clone()).collect();
    for npc in &ctx.config.npcs {
        if !names.contains(&npc.name) {
            names.push(npc.name.clone());
        }
    }
    names
}

/// One `Name: a, b` line per roster character with at least one asset
async fn roster_assets(ctx: &MacroContext<'_>, kind: AssetKind) -> String {
    let timeout = ctx.config.asset_timeout();
    let names = roster(ctx);
    let listings = futures_util::future::join_all(names.iter().map(|name| async move {
        match kind {
            AssetKind::Expressions => {
                list_or_empty("expressions", timeout, ctx.assets.list_expressions(name)).await
            }
            AssetKind::Outfits => {
                list_or_empty("outfits", timeout, ctx.assets.list_outfits(name)).await
            }
        }
    }))
    .await;

    names
        .iter()
        .zip(listings)
        .filter(|(_, items)| !items.is_empty())
        .map(|(name, items)| format!("{name}: {}", items.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn scene_characters(scene: &SceneState) -> String {
    if scene.characters.is_empty() {
        return "nobody".to_string();
    }
    scene
        .characters
        .iter()
        .map(|c| format!("{} ({}, {}, {})", c.name, c.expression, c.outfit, c.position))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wire format the model is asked to embed, with the configured choice count
fn schema(choice_count: usize) -> anyhow::Result<String> {
    let choices: Vec<_> = (1..=choice_count)
        .map(|n| json!({"label": format!("short label {n}"), "prompt": format!("what the user says or does {n}")}))
        .collect();
    let example = json!({
        "scene": {
            "background": "background name or null",
            "music": "music track or null",
            "sfx": "one-shot sound effect or null",
            "location": "location label or null"
        },
        "characters": [{
            "name": "character name",
            "expression": "expression name",
            "outfit": "outfit name",
            "position": "left | center | right",
            "action": "enters | exits | speaks"
        }],
        "choices": choices
    });
    let body = serde_json::to_string_pretty(&example)?;
    Ok(format!("```scene\n{body}\n```"))
}
