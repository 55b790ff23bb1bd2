//! Abstract input command stream. The window backend translates its key
//! events into these; the frame loop folds them into the current intent.

use crate::camera::{Intent, MoveIntent, TurnIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveForward,
    MoveBackward,
    StopMoving,
    TurnLeft,
    TurnRight,
    StopTurning,
    Quit,
}

/// Folds one command into the intent. Stop commands clear only their own
/// half; the other intent keeps running. Returns true for `Quit`.
pub fn apply(intent: &mut Intent, command: Command) -> bool {
    match command {
        Command::MoveForward => intent.movement = MoveIntent::Forward,
        Command::MoveBackward => intent.movement = MoveIntent::Backward,
        Command::StopMoving => intent.movement = MoveIntent::Idle,
        Command::TurnLeft => intent.turn = TurnIntent::Left,
        Command::TurnRight => intent.turn = TurnIntent::Right,
        Command::StopTurning => intent.turn = TurnIntent::Idle,
        Command::Quit => return true,
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_cycle() {
        let mut intent = Intent::default();
        assert!(!apply(&mut intent, Command::MoveForward));
        assert_eq!(intent.movement, MoveIntent::Forward);
        assert!(!apply(&mut intent, Command::StopMoving));
        assert_eq!(intent.movement, MoveIntent::Idle);
    }

    #[test]
    fn movement_and_turning_are_independent() {
        let mut intent = Intent::default();
        apply(&mut intent, Command::MoveForward);
        apply(&mut intent, Command::TurnLeft);
        assert_eq!(intent.movement, MoveIntent::Forward);
        assert_eq!(intent.turn, TurnIntent::Left);

        // stopping the turn leaves movement running
        apply(&mut intent, Command::StopTurning);
        assert_eq!(intent.movement, MoveIntent::Forward);
        assert_eq!(intent.turn, TurnIntent::Idle);
    }

    #[test]
    fn quit_reports_without_touching_intent() {
        let mut intent = Intent::default();
        apply(&mut intent, Command::MoveBackward);
        assert!(apply(&mut intent, Command::Quit));
        assert_eq!(intent.movement, MoveIntent::Backward);
    }
}
