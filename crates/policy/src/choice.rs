//! Tool-choice modes and enforcement.

use crate::{Error, Result, Violation};
use serde::{Deserialize, Serialize};

/// How the model may select tools in a turn.
///
/// Immutable per request. Consulted twice: before the model call to produce
/// the [`Directive`] sent with the manifest, and after the response to
/// check that the model honored the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model may call zero or more tools.
    #[default]
    Auto,
    /// Model must not call any tool.
    None,
    /// Model must call at least one tool.
    Required,
    /// Model must call exactly the named tool, once.
    Forced { name: String },
}

/// The wire directive sent alongside the tool manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Auto,
    None,
    Required,
    Tool { name: String },
}

impl ToolChoice {
    /// Force a specific tool.
    pub fn forced(name: impl Into<String>) -> Self {
        Self::Forced { name: name.into() }
    }

    /// Produce the preflight directive for a registry exposing `available`.
    ///
    /// Fails with [`Error::UnknownTool`] if a forced tool is not among the
    /// available names, so a misconfigured turn is caught before the model
    /// is ever called.
    pub fn directive(&self, available: &[&str]) -> Result<Directive> {
        match self {
            Self::Auto => Ok(Directive::Auto),
            Self::None => Ok(Directive::None),
            Self::Required => Ok(Directive::Required),
            Self::Forced { name } => {
                if available.contains(&name.as_str()) {
                    Ok(Directive::Tool { name: name.clone() })
                } else {
                    Err(Error::UnknownTool(name.clone()))
                }
            }
        }
    }

    /// Check the parsed call names against this choice.
    ///
    /// `called` is the tool name of each call request, in emission order.
    pub fn check_compliance(&self, called: &[&str]) -> std::result::Result<(), Violation> {
        match self {
            Self::Auto => Ok(()),
            Self::None => {
                if called.is_empty() {
                    Ok(())
                } else {
                    Err(Violation::CallsNotAllowed {
                        count: called.len(),
                    })
                }
            }
            Self::Required => {
                if called.is_empty() {
                    Err(Violation::NoCalls)
                } else {
                    Ok(())
                }
            }
            Self::Forced { name } => match called {
                [] => Err(Violation::NoCalls),
                [single] if *single == name => Ok(()),
                [other] => Err(Violation::WrongTool {
                    expected: name.clone(),
                    actual: (*other).to_string(),
                }),
                many => Err(Violation::ExtraCalls {
                    expected: name.clone(),
                    count: many.len(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_never_violated() {
        let choice = ToolChoice::Auto;
        assert!(choice.check_compliance(&[]).is_ok());
        assert!(choice.check_compliance(&["a", "b", "a"]).is_ok());
    }

    #[test]
    fn none_violated_by_any_call() {
        let choice = ToolChoice::None;
        assert!(choice.check_compliance(&[]).is_ok());
        assert_eq!(
            choice.check_compliance(&["weather"]),
            Err(Violation::CallsNotAllowed { count: 1 })
        );
    }

    #[test]
    fn required_violated_by_zero_calls() {
        let choice = ToolChoice::Required;
        assert_eq!(choice.check_compliance(&[]), Err(Violation::NoCalls));
        assert!(choice.check_compliance(&["weather"]).is_ok());
    }

    #[test]
    fn forced_requires_exactly_the_named_tool() {
        let choice = ToolChoice::forced("a");
        assert!(choice.check_compliance(&["a"]).is_ok());
        assert_eq!(choice.check_compliance(&[]), Err(Violation::NoCalls));
        assert_eq!(
            choice.check_compliance(&["b"]),
            Err(Violation::WrongTool {
                expected: "a".into(),
                actual: "b".into(),
            })
        );
        assert_eq!(
            choice.check_compliance(&["a", "a"]),
            Err(Violation::ExtraCalls {
                expected: "a".into(),
                count: 2,
            })
        );
    }

    #[test]
    fn directive_mapping() {
        let available = ["weather", "search"];
        assert_eq!(
            ToolChoice::Auto.directive(&available).unwrap(),
            Directive::Auto
        );
        assert_eq!(
            ToolChoice::None.directive(&available).unwrap(),
            Directive::None
        );
        assert_eq!(
            ToolChoice::Required.directive(&available).unwrap(),
            Directive::Required
        );
        assert_eq!(
            ToolChoice::forced("weather").directive(&available).unwrap(),
            Directive::Tool {
                name: "weather".into()
            }
        );
    }

    #[test]
    fn forced_unknown_tool_fails_preflight() {
        let err = ToolChoice::forced("forecast")
            .directive(&["weather"])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "forecast"));
    }

    #[test]
    fn directive_wire_format() {
        let directive = ToolChoice::forced("weather").directive(&["weather"]).unwrap();
        let wire = serde_json::to_value(&directive).unwrap();
        assert_eq!(wire, serde_json::json!({"type": "tool", "name": "weather"}));

        let auto = serde_json::to_value(Directive::Auto).unwrap();
        assert_eq!(auto, serde_json::json!({"type": "auto"}));
    }

    #[test]
    fn parse_choice_from_toml() {
        #[derive(Debug, serde::Deserialize)]
        struct Config {
            choice: ToolChoice,
        }

        let config: Config = toml::from_str(r#"choice = "required""#).unwrap();
        assert_eq!(config.choice, ToolChoice::Required);

        let config: Config = toml::from_str(
            r#"
choice = { forced = { name = "weather" } }
"#,
        )
        .unwrap();
        assert_eq!(config.choice, ToolChoice::forced("weather"));
    }
}
