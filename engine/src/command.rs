// ═══════════════════════════════════════════════════════════════════════
// Command grammar — text commands for map editing, game setup and orders.
//
// Startup:    editcontinent -add <name> <bonus> | -remove <name>
//             editcountry   -add <name> <continent> | -remove <name>
//             editneighbor  -add <a> <b> | -remove <a> <b>
//             validatemap
//             gameplayer    -add <name> | -remove <name>
//             assigncountries
// IssueOrder: deploy <country> <n>
//             advance <source> <target> <n>
//             bomb <target> | blockade <target>
//             airlift <source> <target> <n>
//             negotiate <player>
//             commit
//
// Edit commands accept several option groups in one line, e.g.
// `editcontinent -add North 3 -add South 2 -remove Void`.
// Parsing only checks shape; names are resolved against the map later.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::EngineError;
use crate::map::MapGraph;
use crate::orders::Order;
use crate::types::Phase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Add(T),
    Remove(T),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    EditContinent(Vec<Edit<(String, u32)>>),
    /// Add carries `(country, continent)`; remove leaves the continent empty.
    EditCountry(Vec<Edit<(String, String)>>),
    EditNeighbor(Vec<Edit<(String, String)>>),
    ValidateMap,
    GamePlayer(Vec<Edit<String>>),
    AssignCountries,
    Order(OrderCommand),
    Commit,
}

/// An order as typed, with names not yet resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    Deploy { country: String, armies: u32 },
    Advance { source: String, target: String, armies: u32 },
    Bomb { target: String },
    Blockade { target: String },
    Airlift { source: String, target: String, armies: u32 },
    Negotiate { player: String },
}

impl Command {
    pub fn parse(text: &str) -> Result<Command, EngineError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((&keyword, args)) = tokens.split_first() else {
            return Err(EngineError::IllegalArgument("empty command".into()));
        };

        match keyword.to_ascii_lowercase().as_str() {
            "editcontinent" => {
                let groups = option_groups(keyword, args, 2, 1)?;
                groups
                    .into_iter()
                    .map(|edit| match edit {
                        Edit::Add(v) => Ok(Edit::Add((v[0].clone(), number(&v[1])?))),
                        Edit::Remove(v) => Ok(Edit::Remove((v[0].clone(), 0))),
                    })
                    .collect::<Result<_, _>>()
                    .map(Command::EditContinent)
            }
            "editcountry" => {
                let groups = option_groups(keyword, args, 2, 1)?;
                Ok(Command::EditCountry(
                    groups
                        .into_iter()
                        .map(|edit| match edit {
                            Edit::Add(v) => Edit::Add((v[0].clone(), v[1].clone())),
                            Edit::Remove(v) => Edit::Remove((v[0].clone(), String::new())),
                        })
                        .collect(),
                ))
            }
            "editneighbor" => {
                let groups = option_groups(keyword, args, 2, 2)?;
                Ok(Command::EditNeighbor(
                    groups
                        .into_iter()
                        .map(|edit| match edit {
                            Edit::Add(v) => Edit::Add((v[0].clone(), v[1].clone())),
                            Edit::Remove(v) => Edit::Remove((v[0].clone(), v[1].clone())),
                        })
                        .collect(),
                ))
            }
            "gameplayer" => {
                let groups = option_groups(keyword, args, 1, 1)?;
                Ok(Command::GamePlayer(
                    groups
                        .into_iter()
                        .map(|edit| match edit {
                            Edit::Add(mut v) => Edit::Add(v.remove(0)),
                            Edit::Remove(mut v) => Edit::Remove(v.remove(0)),
                        })
                        .collect(),
                ))
            }
            "validatemap" => arity(keyword, args, 0).map(|_| Command::ValidateMap),
            "assigncountries" => arity(keyword, args, 0).map(|_| Command::AssignCountries),
            "commit" => arity(keyword, args, 0).map(|_| Command::Commit),

            "deploy" => {
                arity(keyword, args, 2)?;
                Ok(Command::Order(OrderCommand::Deploy {
                    country: args[0].to_string(),
                    armies: number(args[1])?,
                }))
            }
            "advance" | "airlift" => {
                arity(keyword, args, 3)?;
                let (source, target, armies) = (args[0].to_string(), args[1].to_string(), number(args[2])?);
                Ok(Command::Order(if keyword.eq_ignore_ascii_case("advance") {
                    OrderCommand::Advance { source, target, armies }
                } else {
                    OrderCommand::Airlift { source, target, armies }
                }))
            }
            "bomb" => {
                arity(keyword, args, 1)?;
                Ok(Command::Order(OrderCommand::Bomb { target: args[0].to_string() }))
            }
            "blockade" => {
                arity(keyword, args, 1)?;
                Ok(Command::Order(OrderCommand::Blockade { target: args[0].to_string() }))
            }
            "negotiate" => {
                arity(keyword, args, 1)?;
                Ok(Command::Order(OrderCommand::Negotiate { player: args[0].to_string() }))
            }

            _ => Err(EngineError::IllegalArgument(format!("unknown command '{}'", keyword))),
        }
    }

    /// Keyword this command was parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            Command::EditContinent(_) => "editcontinent",
            Command::EditCountry(_) => "editcountry",
            Command::EditNeighbor(_) => "editneighbor",
            Command::ValidateMap => "validatemap",
            Command::GamePlayer(_) => "gameplayer",
            Command::AssignCountries => "assigncountries",
            Command::Commit => "commit",
            Command::Order(o) => match o {
                OrderCommand::Deploy { .. } => "deploy",
                OrderCommand::Advance { .. } => "advance",
                OrderCommand::Bomb { .. } => "bomb",
                OrderCommand::Blockade { .. } => "blockade",
                OrderCommand::Airlift { .. } => "airlift",
                OrderCommand::Negotiate { .. } => "negotiate",
            },
        }
    }

    pub fn allowed_in(&self, phase: Phase) -> bool {
        match self {
            Command::Order(_) | Command::Commit => phase == Phase::IssueOrder,
            _ => phase == Phase::Startup,
        }
    }
}

impl OrderCommand {
    /// Resolve country names against `map`. Player names are checked when
    /// the order is issued.
    pub fn resolve(&self, map: &MapGraph) -> Result<Order, EngineError> {
        let id = |name: &str| {
            map.country_by_name(name)
                .map(|c| c.id)
                .ok_or_else(|| EngineError::UnknownCountry(name.to_string()))
        };
        Ok(match self {
            OrderCommand::Deploy { country, armies } => Order::Deploy { target: id(country)?, armies: *armies },
            OrderCommand::Advance { source, target, armies } => Order::Advance {
                source: id(source)?,
                target: id(target)?,
                armies: *armies,
            },
            OrderCommand::Bomb { target } => Order::Bomb { target: id(target)? },
            OrderCommand::Blockade { target } => Order::Blockade { target: id(target)? },
            OrderCommand::Airlift { source, target, armies } => Order::Airlift {
                source: id(source)?,
                target: id(target)?,
                armies: *armies,
            },
            OrderCommand::Negotiate { player } => Order::Negotiate { player: player.clone() },
        })
    }
}

// ── Token helpers ──────────────────────────────────────────────────────

fn arity(keyword: &str, args: &[&str], expected: usize) -> Result<(), EngineError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EngineError::IllegalArgument(format!(
            "'{}' takes {} argument(s), got {}",
            keyword,
            expected,
            args.len()
        )))
    }
}

fn number(token: &str) -> Result<u32, EngineError> {
    token
        .parse::<u32>()
        .map_err(|_| EngineError::IllegalArgument(format!("'{}' is not a non-negative number", token)))
}

/// Split `-add x y -remove z ...` into groups with fixed arities.
fn option_groups(
    keyword: &str,
    args: &[&str],
    add_arity: usize,
    remove_arity: usize,
) -> Result<Vec<Edit<Vec<String>>>, EngineError> {
    if args.is_empty() {
        return Err(EngineError::IllegalArgument(format!("'{}' needs -add or -remove", keyword)));
    }

    let mut groups = Vec::new();
    let mut rest = args;
    while let Some((&flag, tail)) = rest.split_first() {
        let (n, add) = match flag.to_ascii_lowercase().as_str() {
            "-add" => (add_arity, true),
            "-remove" => (remove_arity, false),
            other => {
                return Err(EngineError::IllegalArgument(format!("'{}': unknown option '{}'", keyword, other)))
            }
        };
        if tail.len() < n || tail[..n].iter().any(|t| t.starts_with('-')) {
            return Err(EngineError::IllegalArgument(format!(
                "'{} {}' takes {} argument(s)",
                keyword, flag, n
            )));
        }
        let values = tail[..n].iter().map(|s| s.to_string()).collect();
        groups.push(if add { Edit::Add(values) } else { Edit::Remove(values) });
        rest = &tail[n..];
    }
    Ok(groups)
}
