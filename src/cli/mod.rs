//! Command-line front end.
//!
//! Parses the `riskscope` arguments into a [`Command`] and executes it
//! against the services, producing a JSON value for stdout. Charts and
//! interactive widgets are left to whatever consumes that JSON.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};

use crate::application::{ProfileService, RiskService, ScenarioSource};
use crate::domain::{scoring, FeatureVector, ModelDefinition, Preset};
use crate::ports::ProfileStore;

pub const USAGE: &str = "\
Usage: riskscope <command> [args]

Commands:
  diseases                              List disease models and their weights
  presets                               List preset scenarios
  score <disease> [SCENARIO] [field=value ...]
  explain <disease> [SCENARIO] [--ranked] [field=value ...]
  compare <disease> [--from SRC] [--to SRC] [--steps N] [from.field=value ...] [to.field=value ...]
  save <name> [SCENARIO] [field=value ...]
  load <name>
  profiles                              List saved profiles
  delete <name>

SCENARIO is --preset NAME or --profile NAME (default vector otherwise).
SRC is default, preset:NAME or profile:NAME.
";

/// A scenario reference plus field overrides applied on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioArgs {
    pub source: ScenarioSource,
    pub overrides: Vec<(String, String)>,
}

impl Default for ScenarioArgs {
    fn default() -> Self {
        Self {
            source: ScenarioSource::Default,
            overrides: Vec::new(),
        }
    }
}

impl ScenarioArgs {
    fn push_override(&mut self, assignment: &str) -> Result<()> {
        let (field, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected field=value, got {assignment:?}"))?;
        self.overrides.push((field.trim().to_string(), value.to_string()));
        Ok(())
    }

    /// Resolve the source and apply the overrides in order.
    fn build<S>(&self, profiles: &ProfileService<S>) -> Result<FeatureVector>
    where
        S: ProfileStore,
        S::Error: Into<crate::adapters::StorageError>,
    {
        let mut features = profiles.resolve(&self.source)?;
        for (field, value) in &self.overrides {
            features
                .set_field(field, value)
                .with_context(|| format!("cannot set {field}"))?;
        }
        Ok(features)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Diseases,
    Presets,
    Score {
        disease: String,
        scenario: ScenarioArgs,
    },
    Explain {
        disease: String,
        scenario: ScenarioArgs,
        ranked: bool,
    },
    Compare {
        disease: String,
        from: ScenarioArgs,
        to: ScenarioArgs,
        steps: Option<usize>,
    },
    Save {
        name: String,
        scenario: ScenarioArgs,
    },
    Load {
        name: String,
    },
    Profiles,
    Delete {
        name: String,
    },
}

fn required(args: &mut impl Iterator<Item = String>, what: &str) -> Result<String> {
    args.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| anyhow!("missing {what}\n\n{USAGE}"))
}

/// Parse `--preset NAME`, `--profile NAME`, `--ranked` and `field=value`.
fn parse_scenario(
    args: &mut impl Iterator<Item = String>,
    allow_ranked: bool,
) -> Result<(ScenarioArgs, bool)> {
    let mut scenario = ScenarioArgs::default();
    let mut ranked = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preset" => {
                let name = required(args, "preset name")?;
                scenario.source = ScenarioSource::Preset(name.parse()?);
            }
            "--profile" => {
                scenario.source = ScenarioSource::Profile(required(args, "profile name")?);
            }
            "--ranked" if allow_ranked => ranked = true,
            other if other.contains('=') && !other.starts_with("--") => {
                scenario.push_override(other)?;
            }
            other => bail!("unexpected argument {other:?}\n\n{USAGE}"),
        }
    }

    Ok((scenario, ranked))
}

fn parse_compare(disease: String, args: &mut impl Iterator<Item = String>) -> Result<Command> {
    let mut from = ScenarioArgs::default();
    let mut to = ScenarioArgs::default();
    let mut steps = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--from" => from.source = required(args, "--from scenario")?.parse()?,
            "--to" => to.source = required(args, "--to scenario")?.parse()?,
            "--steps" => {
                let raw = required(args, "--steps value")?;
                steps = Some(
                    raw.parse::<usize>()
                        .map_err(|_| anyhow!("--steps must be an integer, got {raw:?}"))?,
                );
            }
            other => {
                if let Some(assignment) = other.strip_prefix("from.") {
                    from.push_override(assignment)?;
                } else if let Some(assignment) = other.strip_prefix("to.") {
                    to.push_override(assignment)?;
                } else {
                    bail!("unexpected argument {other:?}\n\n{USAGE}");
                }
            }
        }
    }

    Ok(Command::Compare {
        disease,
        from,
        to,
        steps,
    })
}

impl Command {
    /// Parse the arguments that follow the program name.
    ///
    /// # Errors
    /// Returns an error describing the first malformed argument.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            return Ok(Self::Help);
        };

        let parsed = match command.as_str() {
            "help" | "--help" | "-h" => Self::Help,
            "diseases" => Self::Diseases,
            "presets" => Self::Presets,
            "profiles" => Self::Profiles,
            "score" => {
                let disease = required(&mut args, "disease")?;
                let (scenario, _) = parse_scenario(&mut args, false)?;
                Self::Score { disease, scenario }
            }
            "explain" => {
                let disease = required(&mut args, "disease")?;
                let (scenario, ranked) = parse_scenario(&mut args, true)?;
                Self::Explain {
                    disease,
                    scenario,
                    ranked,
                }
            }
            "compare" => {
                let disease = required(&mut args, "disease")?;
                parse_compare(disease, &mut args)?
            }
            "save" => {
                let name = required(&mut args, "profile name")?;
                let (scenario, _) = parse_scenario(&mut args, false)?;
                Self::Save { name, scenario }
            }
            "load" => Self::Load {
                name: required(&mut args, "profile name")?,
            },
            "delete" => Self::Delete {
                name: required(&mut args, "profile name")?,
            },
            other => bail!("unknown command {other:?}\n\n{USAGE}"),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument {extra:?}\n\n{USAGE}");
        }
        Ok(parsed)
    }
}

/// Services a command runs against.
pub struct Cli<S>
where
    S: ProfileStore,
{
    risk: RiskService,
    profiles: ProfileService<S>,
    default_steps: usize,
}

impl<S> Cli<S>
where
    S: ProfileStore,
    S::Error: Into<crate::adapters::StorageError>,
{
    pub fn new(risk: RiskService, profiles: ProfileService<S>, default_steps: usize) -> Self {
        Self {
            risk,
            profiles,
            default_steps,
        }
    }

    /// Run a command and return its JSON output.
    ///
    /// # Errors
    /// Returns domain, storage or lookup errors from the services.
    pub fn execute(&self, command: &Command) -> Result<Value> {
        let output = match command {
            Command::Help => Value::String(USAGE.to_string()),
            Command::Diseases => {
                let models: Vec<ModelDefinition> = self
                    .risk
                    .registry()
                    .models()
                    .map(ModelDefinition::from)
                    .collect();
                serde_json::to_value(models)?
            }
            Command::Presets => {
                let presets: BTreeMap<&str, FeatureVector> = Preset::ALL
                    .iter()
                    .map(|p| (p.name(), p.features()))
                    .collect();
                serde_json::to_value(presets)?
            }
            Command::Score { disease, scenario } => {
                let features = scenario.build(&self.profiles)?;
                let result = self.risk.evaluate(&features, disease)?;
                json!({
                    "disease": disease,
                    "probability": result.probability,
                    "raw_score": result.raw_score,
                    "level": result.risk_level(),
                    "features": features,
                })
            }
            Command::Explain {
                disease,
                scenario,
                ranked,
            } => {
                let features = scenario.build(&self.profiles)?;
                let entries = self.risk.importance(&features, disease)?;
                let entries = if *ranked {
                    scoring::ranked(&entries)
                } else {
                    entries
                };
                json!({
                    "disease": disease,
                    "importance": entries,
                })
            }
            Command::Compare {
                disease,
                from,
                to,
                steps,
            } => {
                let a = from.build(&self.profiles)?;
                let b = to.build(&self.profiles)?;
                let steps = steps.unwrap_or(self.default_steps);
                serde_json::to_value(self.risk.compare(&a, &b, disease, steps)?)?
            }
            Command::Save { name, scenario } => {
                let features = scenario.build(&self.profiles)?;
                self.profiles.save(name, &features)?;
                json!({ "saved": name.trim(), "features": features })
            }
            Command::Load { name } => serde_json::to_value(self.profiles.load(name)?)?,
            Command::Profiles => serde_json::to_value(self.profiles.list()?)?,
            Command::Delete { name } => {
                self.profiles.delete(name)?;
                json!({ "deleted": name.trim() })
            }
        };
        Ok(output)
    }
}
