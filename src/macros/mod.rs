//! Prompt template macros
//!
//! Placeholders of the form `{{ct_<name>}}` are resolved against the current
//! scene, configuration and asset lookup just before a prompt is sent. All
//! distinct placeholders of a template are resolved concurrently. An unknown
//! name or a failing resolver becomes the empty string and a warning.

use crate::collaborators::AssetLookup;
use crate::config::DirectorConfig;
use crate::types::SceneState;
use async_trait::async_trait;
use futures_util::future::join_all;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

mod builtin;


pub use builtin::BuiltinResolver;

/// Prefix shared by every macro name
pub const MACRO_PREFIX: &str = "ct";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\{{\{{{MACRO_PREFIX}_([A-Za-z0-9_]+)\}}\}}")).expect("valid placeholder pattern")
});

/// Registered macro names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKey {
    Backgrounds,
    CurrentBackground,
    CurrentMusic,
    Expressions,
    Outfits,
    Npcs,
    SceneCharacters,
    Location,
    Schema,
    ChoiceCount,
}

impl MacroKey {
    pub const ALL: [MacroKey; 10] = [
        MacroKey::Backgrounds,
        MacroKey::CurrentBackground,
        MacroKey::CurrentMusic,
        MacroKey::Expressions,
        MacroKey::Outfits,
        MacroKey::Npcs,
        MacroKey::SceneCharacters,
        MacroKey::Location,
        MacroKey::Schema,
        MacroKey::ChoiceCount,
    ];

    /// Name without the prefix, as written after `ct_`
    pub fn name(self) -> &'static str {
        match self {
            MacroKey::Backgrounds => "backgrounds",
            MacroKey::CurrentBackground => "current_background",
            MacroKey::CurrentMusic => "current_music",
            MacroKey::Expressions => "expressions",
            MacroKey::Outfits => "outfits",
            MacroKey::Npcs => "npcs",
            MacroKey::SceneCharacters => "scene_characters",
            MacroKey::Location => "location",
            MacroKey::Schema => "schema",
            MacroKey::ChoiceCount => "choice_count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Full placeholder text, e.g. `{{ct_backgrounds}}`
    pub fn placeholder(self) -> String {
        format!("{{{{{MACRO_PREFIX}_{}}}}}", self.name())
    }
}

/// Everything a resolver may read
#[derive(Clone, Copy)]
pub struct MacroContext<'a> {
    pub config: &'a DirectorConfig,
    pub scene: &'a SceneState,
    pub assets: &'a dyn AssetLookup,
}

/// Produces the replacement text of one macro
#[async_trait]
pub trait MacroResolver: Send + Sync {
    async fn resolve(&self, ctx: &MacroContext<'_>) -> anyhow::Result<String>;
}

/// Adapter for synchronous closures
pub struct FnResolver<F>(pub F);

impl<F> FnResolver<F>
where
    F: Fn(&MacroContext<'_>) -> anyhow::Result<String> + Send + Sync,
{
    pub fn new(resolve: F) -> Self {
        Self(resolve)
    }
}

#[async_trait]
impl<F> MacroResolver for FnResolver<F>
where
    F: Fn(&MacroContext<'_>) -> anyhow::Result<String> + Send + Sync,
{
    async fn resolve(&self, ctx: &MacroContext<'_>) -> anyhow::Result<String> {
        (self.0)(ctx)
    }
}

/// Check whether a template contains any placeholder
pub fn has_macros(template: &str) -> bool {
    PLACEHOLDER.is_match(template)
}

/// Resolved template plus the placeholders that came back empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroResolution {
    pub text: String,
    /// Full names (`ct_...`) of unknown or failing macros, in first-seen order
    pub unresolved: Vec<String>,
}

/// Registry of macro resolvers keyed by [`MacroKey`]
pub struct MacroEngine {
    resolvers: HashMap<MacroKey, Box<dyn MacroResolver>>,
}

impl MacroEngine {
    /// Engine with every built-in macro registered
    pub fn new() -> Self {
        let mut engine = Self::empty();
        for key in MacroKey::ALL {
            engine.register(key, BuiltinResolver::new(key));
        }
        engine
    }

    /// Engine with no resolvers at all
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register or replace the resolver of a key
    pub fn register(&mut self, key: MacroKey, resolver: impl MacroResolver + 'static) {
        self.resolvers.insert(key, Box::new(resolver));
    }

    pub fn has_macros(&self, template: &str) -> bool {
        has_macros(template)
    }

    /// Full placeholder names of the registered macros, in declaration order
    pub fn list_macro_names(&self) -> Vec<String> {
        MacroKey::ALL
            .into_iter()
            .filter(|key| self.resolvers.contains_key(key))
            .map(|key| format!("{MACRO_PREFIX}_{}", key.name()))
            .collect()
    }

    /// Replace every placeholder in the template
    ///
    /// Each distinct placeholder is resolved once; the resolved text is not
    /// scanned again.
    pub async fn resolve(&self, template: &str, ctx: &MacroContext<'_>) -> String {
        self.resolve_report(template, ctx).await.text
    }

    /// Like [`MacroEngine::resolve`], also reporting which placeholders were
    /// replaced with nothing. Each of them has been logged as a warning.
    pub async fn resolve_report(&self, template: &str, ctx: &MacroContext<'_>) -> MacroResolution {
        let mut names: Vec<&str> = Vec::new();
        for captures in PLACEHOLDER.captures_iter(template) {
            if let Some(name) = captures.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        if names.is_empty() {
            return MacroResolution {
                text: template.to_string(),
                unresolved: Vec::new(),
            };
        }

        let values = join_all(names.iter().map(|name| self.resolve_one(name, ctx))).await;
        let mut unresolved = Vec::new();
        let mut resolved: HashMap<&str, String> = HashMap::with_capacity(names.len());
        for (name, value) in names.into_iter().zip(values) {
            match value {
                Some(value) => {
                    resolved.insert(name, value);
                }
                None => unresolved.push(format!("{MACRO_PREFIX}_{name}")),
            }
        }

        let text = PLACEHOLDER
            .replace_all(template, |captures: &Captures| {
                captures
                    .get(1)
                    .and_then(|name| resolved.get(name.as_str()))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned();
        MacroResolution { text, unresolved }
    }

    /// `None` when the macro is unknown or its resolver failed
    async fn resolve_one(&self, name: &str, ctx: &MacroContext<'_>) -> Option<String> {
        let Some(resolver) = MacroKey::from_name(name).and_then(|key| self.resolvers.get(&key)) else {
            log::warn!("unknown macro {{{{{MACRO_PREFIX}_{name}}}}}, replacing it with nothing");
            return None;
        };

        match resolver.resolve(ctx).await {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("macro {{{{{MACRO_PREFIX}_{name}}}}} failed: {err:#}");
                None
            }
        }
    }
}

impl Default for MacroEngine {
    fn default() -> Self {
        Self::new()
    }
}
