//! The demo command set registered by the shell.

use std::sync::Arc;

use sommand_core::argument::{self, ArgEnum, EntityResolver};
use sommand_core::{CommandNode, CommandRegistry};
use sommand_types::{EntityConfig, Identity, Result, Suggestion};

const ITEMS: &[&str] = &["apple", "bread", "diamond", "iron_ingot", "torch"];
const FEATURES: &[&str] = &["daylight", "pvp", "weather"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl ArgEnum for GameMode {
    fn variants() -> &'static [Self] {
        &[
            Self::Survival,
            Self::Creative,
            Self::Adventure,
            Self::Spectator,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Survival => "survival",
            Self::Creative => "creative",
            Self::Adventure => "adventure",
            Self::Spectator => "spectator",
        }
    }
}

/// Entities declared in the `[[entity]]` tables of the config.
#[derive(Debug, Clone, Default)]
pub struct ConfigEntities {
    entities: Vec<EntityConfig>,
}

impl ConfigEntities {
    pub fn new(entities: Vec<EntityConfig>) -> Self {
        Self { entities }
    }
}

impl EntityResolver<EntityConfig> for ConfigEntities {
    fn kind(&self) -> &str {
        "player"
    }

    fn resolve(&self, token: &str) -> Option<EntityConfig> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(token))
            .cloned()
    }

    fn candidates(&self, _identity: &dyn Identity) -> Vec<Suggestion> {
        self.entities
            .iter()
            .map(|e| {
                let suggestion = Suggestion::new(e.name.clone());
                match &e.permission {
                    Some(permission) => suggestion.with_permission(permission.clone()),
                    None => suggestion,
                }
            })
            .collect()
    }
}

/// Register every demo command into `registry`. `help` goes last so it
/// sees the others.
pub fn register_commands(registry: &CommandRegistry, entities: ConfigEntities) -> Result<()> {
    registry.add(give()?)?;
    registry.add(say()?)?;
    registry.add(gamemode()?)?;
    registry.add(toggle()?)?;
    registry.add(tp()?)?;
    registry.add(whois(entities)?)?;
    registry.add(help(registry)?)?;
    Ok(())
}

fn give() -> Result<CommandNode> {
    let item = argument::choice("item", ITEMS)?;
    let amount = argument::integer("amount", Some(1), Some(64))?;
    CommandNode::root(["give", "g"])?
        .with_description("Give yourself an item")
        .then(
            CommandNode::argument(item)
                .executes(|ctx| {
                    let item: String = ctx.get("item")?;
                    ctx.reply(&format!("Gave 1 x {item} to {}", ctx.identity().name()));
                    Ok(())
                })
                .then(CommandNode::argument(amount).executes(|ctx| {
                    let item: String = ctx.get("item")?;
                    let amount: i64 = ctx.get("amount")?;
                    ctx.reply(&format!(
                        "Gave {amount} x {item} to {}",
                        ctx.identity().name()
                    ));
                    Ok(())
                }))?,
        )
}

fn say() -> Result<CommandNode> {
    CommandNode::root(["say"])?
        .with_description("Broadcast a message")
        .then(
            CommandNode::greedy_argument(argument::greedy_string("message")?).executes(|ctx| {
                let message: String = ctx.get("message")?;
                ctx.reply(&format!("[{}] {message}", ctx.identity().name()));
                Ok(())
            }),
        )
}

fn gamemode() -> Result<CommandNode> {
    CommandNode::root(["gamemode", "gm"])?
        .with_description("Change your game mode")
        .with_permission("sommand.gamemode")
        .then(
            CommandNode::argument(argument::enumeration::<GameMode>("mode")?).executes(|ctx| {
                let mode: GameMode = ctx.get("mode")?;
                ctx.reply(&format!("Game mode set to {}", mode.name()));
                Ok(())
            }),
        )
}

fn toggle() -> Result<CommandNode> {
    CommandNode::root(["toggle"])?
        .with_description("Switch a world feature on or off")
        .then(
            CommandNode::argument(argument::choice("feature", FEATURES)?)
                .then(
                    CommandNode::argument(argument::boolean("enabled")?).executes(|ctx| {
                        let feature: String = ctx.get("feature")?;
                        let enabled: bool = ctx.get("enabled")?;
                        let state = if enabled { "on" } else { "off" };
                        ctx.reply(&format!("{feature} is now {state}"));
                        Ok(())
                    }),
                )?,
        )
}

fn tp() -> Result<CommandNode> {
    let coordinate = |name: &str| argument::float(name, Some(-30_000_000.0), Some(30_000_000.0));
    CommandNode::root(["tp", "teleport"])?
        .with_description("Teleport to coordinates")
        .with_permission("sommand.tp")
        .then(
            CommandNode::argument(coordinate("x")?).then(
                CommandNode::argument(coordinate("y")?).then(
                    CommandNode::argument(coordinate("z")?).executes(|ctx| {
                        let x: f64 = ctx.get("x")?;
                        let y: f64 = ctx.get("y")?;
                        let z: f64 = ctx.get("z")?;
                        ctx.reply(&format!("Teleported to {x:.1}, {y:.1}, {z:.1}"));
                        Ok(())
                    }),
                )?,
            )?,
        )
}

fn whois(entities: ConfigEntities) -> Result<CommandNode> {
    CommandNode::root(["whois"])?
        .with_description("Look up a known player")
        .then(
            CommandNode::argument(argument::entity("target", entities)?).executes(|ctx| {
                let target: EntityConfig = ctx.get("target")?;
                let guard = target.permission.as_deref().unwrap_or("none");
                ctx.reply(&format!("{} (visibility: {guard})", target.name));
                Ok(())
            }),
        )
}

fn help(registry: &CommandRegistry) -> Result<CommandNode> {
    let roots: Vec<Arc<CommandNode>> = registry.all_distinct();
    Ok(CommandNode::root(["help", "?"])?
        .with_description("List the commands you can run")
        .executes(move |ctx| {
            let identity = ctx.identity();
            for root in roots.iter().filter(|r| r.permits(identity)) {
                for usage in root.usage_lines() {
                    ctx.reply(&format!("/{usage}"));
                }
            }
            ctx.reply("/help");
            Ok(())
        }))
}
