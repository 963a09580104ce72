//! Command-line arguments and the line commands typed during a session.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::core::GameSnapshot;
use crate::engine::{EngineCommand, EngineConfig};
use crate::types::{Difficulty, PuzzleAction, SelectionMode};

pub const USAGE: &str = "\
usage: phrase-master [--difficulty easy|medium|hard] [--concept TEXT] [--history PATH] [--seed N] [FILE]

commands:
  upload FILE        read a document and start a puzzle
  take N             move pool segment N to the end of your answer
  back N             return answer segment N to the pool
  hint               fix the first wrong position
  check              submit your answer
  next               new puzzle from the same document
  reset              abandon the session
  difficulty D       easy | medium | hard (only before a puzzle starts)
  mode auto|manual   let the model pick the concept, or use yours
  concept TEXT       concept to look for in manual mode
  stats              show your progress
  show               redraw the board
  quit";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub difficulty: Option<Difficulty>,
    pub concept: Option<String>,
    pub history: Option<PathBuf>,
    pub seed: Option<u32>,
    pub document: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Command-line values win over the environment.
    pub fn apply_to(&self, config: &mut EngineConfig) {
        if let Some(path) = &self.history {
            config.history_path = Some(path.clone());
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }

    /// Commands that put the session into the requested starting shape.
    pub fn startup_commands(&self) -> Vec<EngineCommand> {
        let mut out = Vec::new();
        if let Some(d) = self.difficulty {
            out.push(EngineCommand::SetDifficulty(d));
        }
        if let Some(concept) = &self.concept {
            out.push(EngineCommand::SetSelectionMode(SelectionMode::Manual));
            out.push(EngineCommand::SetTargetConcept(concept.clone()));
        }
        if let Some(path) = &self.document {
            out.push(EngineCommand::Upload { path: path.clone() });
        }
        out
    }
}

pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("missing value for {flag}"))
        };
        match flag {
            "--difficulty" | "-d" => {
                let v = value()?;
                out.difficulty = Some(
                    Difficulty::from_str(&v).ok_or_else(|| anyhow!("invalid difficulty: {v}"))?,
                );
            }
            "--concept" | "-c" => out.concept = Some(value()?),
            "--history" => out.history = Some(PathBuf::from(value()?)),
            "--seed" => {
                let v = value()?;
                out.seed = Some(v.parse().map_err(|_| anyhow!("invalid --seed value: {v}"))?);
            }
            "--help" | "-h" => out.help = true,
            other if other.starts_with('-') => return Err(anyhow!("unknown argument: {other}")),
            other => {
                if out.document.is_some() {
                    return Err(anyhow!("only one document can be given"));
                }
                out.document = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }
    Ok(out)
}

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Engine(EngineCommand),
    Stats,
    Show,
    Help,
    Quit,
}

/// 1-based position as shown on screen -> segment value and index.
fn pick(list: &[String], arg: &str, what: &str) -> Result<(String, usize)> {
    let n: usize = arg
        .parse()
        .map_err(|_| anyhow!("expected a segment number, got {arg:?}"))?;
    n.checked_sub(1)
        .and_then(|index| list.get(index).map(|s| (s.clone(), index)))
        .ok_or_else(|| anyhow!("no segment {n} in the {what}"))
}

/// Parse one input line against the snapshot the player is looking at.
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, snapshot: &GameSnapshot) -> Result<Option<LineCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let engine = |cmd| Ok(Some(LineCommand::Engine(cmd)));
    match word.to_ascii_lowercase().as_str() {
        "upload" | "u" => {
            if rest.is_empty() {
                return Err(anyhow!("upload needs a file path"));
            }
            engine(EngineCommand::Upload {
                path: PathBuf::from(rest),
            })
        }
        "take" | "t" => {
            let (segment, index) = pick(&snapshot.pool, rest, "pool")?;
            engine(EngineCommand::Action(PuzzleAction::MoveToResponse {
                segment,
                index,
            }))
        }
        "back" | "b" => {
            let (segment, index) = pick(&snapshot.response, rest, "answer")?;
            engine(EngineCommand::Action(PuzzleAction::MoveToPool {
                segment,
                index,
            }))
        }
        "hint" => engine(EngineCommand::Action(PuzzleAction::Hint)),
        "check" | "c" => engine(EngineCommand::Action(PuzzleAction::Check)),
        "next" | "n" => engine(EngineCommand::NextPuzzle),
        "reset" => engine(EngineCommand::Reset),
        "difficulty" => {
            let d = Difficulty::from_str(rest).ok_or_else(|| anyhow!("invalid difficulty: {rest:?}"))?;
            engine(EngineCommand::SetDifficulty(d))
        }
        "mode" => {
            let m = SelectionMode::from_str(rest).ok_or_else(|| anyhow!("mode is auto or manual"))?;
            engine(EngineCommand::SetSelectionMode(m))
        }
        "concept" => engine(EngineCommand::SetTargetConcept(rest.to_string())),
        "stats" => Ok(Some(LineCommand::Stats)),
        "show" | "s" => Ok(Some(LineCommand::Show)),
        "help" | "?" => Ok(Some(LineCommand::Help)),
        "quit" | "exit" | "q" => Ok(Some(LineCommand::Quit)),
        other => Err(anyhow!("unknown command: {other} (type help)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            pool: args(&["est ", "La mitose "]),
            response: args(&["une division."]),
            ..GameSnapshot::default()
        }
    }

    #[test]
    fn parse_args_reads_flags_and_document() {
        let cli = parse_args(&args(&[
            "--difficulty",
            "difficile",
            "--concept",
            "mitose",
            "--seed",
            "9",
            "cours.txt",
        ]))
        .unwrap();
        assert_eq!(cli.difficulty, Some(Difficulty::Hard));
        assert_eq!(cli.concept.as_deref(), Some("mitose"));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.document, Some(PathBuf::from("cours.txt")));

        let cmds = cli.startup_commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[1], EngineCommand::SetSelectionMode(SelectionMode::Manual));
        assert!(matches!(cmds[3], EngineCommand::Upload { .. }));
    }

    #[test]
    fn parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&["--seed"])).is_err());
        assert!(parse_args(&args(&["--seed", "x"])).is_err());
        assert!(parse_args(&args(&["--difficulty", "insane"])).is_err());
        assert!(parse_args(&args(&["--what"])).is_err());
        assert!(parse_args(&args(&["a.txt", "b.txt"])).is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = parse_args(&args(&["--history", "/tmp/x.json", "--seed", "3"])).unwrap();
        let mut config = EngineConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.history_path, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn parse_line_take_uses_one_based_positions() {
        let cmd = parse_line("take 2", &snapshot()).unwrap().unwrap();
        assert_eq!(
            cmd,
            LineCommand::Engine(EngineCommand::Action(PuzzleAction::MoveToResponse {
                segment: "La mitose ".to_string(),
                index: 1,
            }))
        );
        assert!(parse_line("take 0", &snapshot()).is_err());
        assert!(parse_line("take 3", &snapshot()).is_err());
        assert!(parse_line("take x", &snapshot()).is_err());
    }

    #[test]
    fn parse_line_back_and_misc() {
        let snap = snapshot();
        assert_eq!(
            parse_line("back 1", &snap).unwrap(),
            Some(LineCommand::Engine(EngineCommand::Action(
                PuzzleAction::MoveToPool {
                    segment: "une division.".to_string(),
                    index: 0,
                }
            )))
        );
        assert_eq!(parse_line("   ", &snap).unwrap(), None);
        assert_eq!(
            parse_line("concept  la cellule ", &snap).unwrap(),
            Some(LineCommand::Engine(EngineCommand::SetTargetConcept(
                "la cellule".to_string()
            )))
        );
        assert_eq!(
            parse_line("upload notes/cours 1.md", &snap).unwrap(),
            Some(LineCommand::Engine(EngineCommand::Upload {
                path: PathBuf::from("notes/cours 1.md")
            }))
        );
        assert_eq!(parse_line("QUIT", &snap).unwrap(), Some(LineCommand::Quit));
        assert!(parse_line("upload", &snap).is_err());
        assert!(parse_line("mode sometimes", &snap).is_err());
        assert!(parse_line("dance", &snap).is_err());
    }
}
