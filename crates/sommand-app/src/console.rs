//! The interactive console: identity and read-eval loop.

use std::io::{BufRead, Write};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use sommand_core::CommandService;
use sommand_core::mirror::NodeInfo;
use sommand_types::{Identity, IdentityConfig, PermissionSet};

/// The console user. Messages are queued and flushed to the output after
/// each line.
#[derive(Debug)]
pub struct ConsoleIdentity {
    permissions: PermissionSet,
    outbox: Mutex<Vec<String>>,
}

impl ConsoleIdentity {
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            permissions: PermissionSet::from_config(config),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Take every queued message.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Identity for ConsoleIdentity {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has_permission(permission)
    }

    fn name(&self) -> &str {
        self.permissions.name()
    }

    fn send_message(&self, message: &str) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

/// Read lines from `input` until EOF or `:quit`, writing replies to `out`.
pub fn run(
    service: &CommandService<'_>,
    identity: &ConsoleIdentity,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let step = handle_line(service, identity, line.trim(), out)?;
        for message in identity.drain() {
            writeln!(out, "{message}")?;
        }
        if step == Step::Quit {
            break;
        }
    }
    out.flush()?;
    Ok(())
}

fn handle_line(
    service: &CommandService<'_>,
    identity: &ConsoleIdentity,
    line: &str,
    out: &mut impl Write,
) -> Result<Step> {
    match line.split_once(' ').unwrap_or((line, "")) {
        (":quit", _) => return Ok(Step::Quit),
        (":tree", _) => {
            let tree: Vec<NodeInfo> = service
                .registry()
                .all_distinct()
                .iter()
                .map(|root| NodeInfo::describe(root))
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&tree)?)?;
        },
        (":complete", partial) => {
            let candidates = service.complete(identity, partial.trim_start());
            if candidates.is_empty() {
                writeln!(out, "(no completions)")?;
            } else {
                writeln!(out, "{}", candidates.join("  "))?;
            }
        },
        (command, _) if command.starts_with(':') => {
            writeln!(out, "unknown console command '{command}' (try :complete, :tree, :quit)")?;
        },
        _ => {
            if let Some(outcome) = service.execute(identity, line) {
                log::debug!("'{line}' -> {outcome:?}");
            }
        },
    }
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ConfigEntities, register_commands};
    use sommand_core::CommandRegistry;

    fn shell(input: &str, identity: IdentityConfig) -> String {
        let registry = CommandRegistry::new();
        register_commands(&registry, ConfigEntities::default()).unwrap();
        let service = CommandService::new(&registry);
        let console = ConsoleIdentity::from_config(&identity);
        let mut out = Vec::new();
        run(&service, &console, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn executes_lines_and_prints_replies() {
        let out = shell("/say hi\n\n/nope\n", IdentityConfig::default());
        assert_eq!(out, "[console] hi\nUnknown command: nope\n");
    }

    #[test]
    fn quit_stops_reading() {
        let out = shell("/say one\n:quit\n/say two\n", IdentityConfig::default());
        assert_eq!(out, "[console] one\n");
    }

    #[test]
    fn complete_prints_candidates() {
        let out = shell(":complete /give d\n:complete /zzz\n", IdentityConfig::default());
        assert_eq!(out, "diamond\n(no completions)\n");
    }

    #[test]
    fn tree_prints_json_array() {
        let out = shell(":tree\n", IdentityConfig::default());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["gamemode", "give", "help", "say", "toggle", "tp", "whois"]
        );
    }

    #[test]
    fn operator_config_unlocks_guarded_commands() {
        let op = IdentityConfig {
            name: "admin".into(),
            permissions: Vec::new(),
            operator: true,
        };
        let out = shell("/gm creative\n", op);
        assert_eq!(out, "Game mode set to creative\n");
        let out = shell("/gm creative\n", IdentityConfig::default());
        assert_eq!(out, "You do not have permission.\n");
    }

    #[test]
    fn unknown_console_command() {
        let out = shell(":bogus\n", IdentityConfig::default());
        assert!(out.starts_with("unknown console command ':bogus'"));
    }
}
