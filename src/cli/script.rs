use shakmaty::{Role, Square};
use thiserror::Error;

use crate::game_logic::{FixedPromotion, GameEngine, MoveError, MoveRecord};
use crate::superpowers::PowerError;

/// Error when parsing a game script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid script step: '{0}'")]
pub struct ParseError(String);

/// Why a script stopped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("step {step}: {source}")]
    Move { step: usize, source: MoveError },
    #[error("step {step}: {source}")]
    Power { step: usize, source: PowerError },
}

/// One half-move of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    /// `e2e4`, or `e7e8n` to pick the promotion piece.
    Move {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    /// `d1*c3`: preview the ability of the piece on `d1` and commit it on `c3`.
    Power { from: Square, target: Square },
}

/// Parse a game script into its steps.
///
/// Format:
/// - Whitespace or periods separate steps
/// - A move is two squares, optionally followed by a promotion letter (`q`, `r`, `b`, `n`)
/// - A superpower is two squares joined by `*`
///
/// Examples:
/// - `"e2e4. e7e5."` - two ordinary moves
/// - `"b7b8n"` - promote to a knight
/// - `"a1*a1"` - use the ability of the piece on a1, aimed at a1
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, ParseError> {
    let mut steps = Vec::new();
    let mut current_token = String::new();

    for ch in script.chars() {
        if ch == '.' || ch.is_whitespace() {
            flush_token(&mut current_token, &mut steps)?;
        } else {
            current_token.push(ch);
        }
    }

    // Flush any remaining token
    flush_token(&mut current_token, &mut steps)?;
    Ok(steps)
}

/// Parse the current token into a step and clear it.
fn flush_token(token: &mut String, steps: &mut Vec<ScriptStep>) -> Result<(), ParseError> {
    if !token.is_empty() {
        let step = parse_step(token).ok_or_else(|| ParseError(token.clone()))?;
        steps.push(step);
        token.clear();
    }
    Ok(())
}

fn parse_step(token: &str) -> Option<ScriptStep> {
    if let Some((from, target)) = token.split_once('*') {
        return Some(ScriptStep::Power {
            from: from.parse().ok()?,
            target: target.parse().ok()?,
        });
    }
    let from = token.get(0..2)?.parse().ok()?;
    let to = token.get(2..4)?.parse().ok()?;
    let promotion = match token.get(4..)? {
        "" => None,
        "q" | "Q" => Some(Role::Queen),
        "r" | "R" => Some(Role::Rook),
        "b" | "B" => Some(Role::Bishop),
        "n" | "N" => Some(Role::Knight),
        _ => return None,
    };
    Some(ScriptStep::Move {
        from,
        to,
        promotion,
    })
}

/// Play a script against `engine`, stopping at the first refused step.
///
/// The whole script is parsed before anything is played, so a malformed script
/// leaves the engine untouched.
pub fn run_script(engine: &mut GameEngine, script: &str) -> Result<Vec<MoveRecord>, ScriptError> {
    let steps = parse_script(script)?;
    let mut records = Vec::with_capacity(steps.len());
    for (step, parsed) in steps.into_iter().enumerate() {
        let record = match parsed {
            ScriptStep::Move {
                from,
                to,
                promotion: Some(role),
            } => engine
                .attempt_move_with(from, to, &mut FixedPromotion(role))
                .map_err(|source| ScriptError::Move { step, source })?,
            ScriptStep::Move { from, to, .. } => engine
                .attempt_move(from, to)
                .map_err(|source| ScriptError::Move { step, source })?,
            ScriptStep::Power { from, target } => engine
                .begin_superpower_preview(from)
                .and_then(|_| engine.commit_superpower_preview(target))
                .map_err(|source| ScriptError::Power { step, source })?,
        };
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color;

    #[test]
    fn test_parse_moves_and_powers() {
        let steps = parse_script("e2e4. e7e8n  d1*c3").expect("valid script");
        assert_eq!(
            steps,
            vec![
                ScriptStep::Move {
                    from: Square::E2,
                    to: Square::E4,
                    promotion: None
                },
                ScriptStep::Move {
                    from: Square::E7,
                    to: Square::E8,
                    promotion: Some(Role::Knight)
                },
                ScriptStep::Power {
                    from: Square::D1,
                    target: Square::C3
                },
            ]
        );
    }

    #[test]
    fn test_parse_error_invalid_square() {
        assert_eq!(parse_script("e2e4.  zz."), Err(ParseError("zz".to_string())));
        assert_eq!(parse_script("e2e4k"), Err(ParseError("e2e4k".to_string())));
        assert_eq!(parse_script("d1*"), Err(ParseError("d1*".to_string())));
    }

    #[test]
    fn test_parse_error_does_not_modify_state() {
        let mut engine = GameEngine::classic();
        let key = engine.position().key();

        let result = run_script(&mut engine, "e2e4. xx.");

        assert!(matches!(result, Err(ScriptError::Parse(_))));
        assert_eq!(engine.position().key(), key);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_stops_at_refused_step() {
        let mut engine = GameEngine::classic();

        let result = run_script(&mut engine, "e2e4 e7e5 e4e5 g1f3");

        assert_eq!(
            result,
            Err(ScriptError::Move {
                step: 2,
                source: MoveError::Illegal {
                    from: Square::E4,
                    to: Square::E5
                }
            })
        );
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.turn(), Color::White);
    }

    #[test]
    fn test_power_step() {
        let mut engine = GameEngine::superchess();
        engine.set_charges(Color::White, 1);

        let records = run_script(&mut engine, "d1*c3").expect("valid activation");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to, Some(Square::C3));
        assert_eq!(engine.charges(Color::White), 0);
        assert_eq!(engine.turn(), Color::Black);
    }

    #[test]
    fn test_power_step_without_charges() {
        let mut engine = GameEngine::superchess();
        assert_eq!(
            run_script(&mut engine, "d1*c3"),
            Err(ScriptError::Power {
                step: 0,
                source: PowerError::NoCharges
            })
        );
    }
}
