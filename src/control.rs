use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use model::field::Side;
use model::game::Game;
use rand::Rng;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Swipe(Side),
    Reset,
    KeepPlaying,
    Redraw,
    Quit,
}

impl Command {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => Some(Command::Quit),
                _ => None,
            };
        }
        let command = match key.code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Command::Swipe(Side::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Command::Swipe(Side::Right),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Command::Swipe(Side::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Command::Swipe(Side::Down),
            KeyCode::Char('r') => Command::Reset,
            KeyCode::Char('c') => Command::KeepPlaying,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            _ => return None,
        };
        Some(command)
    }

    /// Next session after this command, or `None` when the player quits.
    pub fn apply<R: Rng + ?Sized>(self, game: &Game, rng: &mut R) -> Option<Game> {
        match self {
            Command::Swipe(side) => Some(game.apply_move(side, rng)),
            Command::Reset => Some(game.reset(rng)),
            Command::KeepPlaying if game.is_won() => Some(game.keep_playing()),
            Command::KeepPlaying | Command::Redraw => Some(game.clone()),
            Command::Quit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Command;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use model::field::{Field, Side};
    use model::game::{Game, Status};
    use model::rules::Rules;
    use ndarray::arr2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn key_mapping() {
        assert_eq!(Command::from_key(key(KeyCode::Left)), Some(Command::Swipe(Side::Left)));
        assert_eq!(Command::from_key(key(KeyCode::Char('d'))), Some(Command::Swipe(Side::Right)));
        assert_eq!(Command::from_key(key(KeyCode::Char('k'))), Some(Command::Swipe(Side::Up)));
        assert_eq!(Command::from_key(key(KeyCode::Down)), Some(Command::Swipe(Side::Down)));
        assert_eq!(Command::from_key(key(KeyCode::Char('r'))), Some(Command::Reset));
        assert_eq!(Command::from_key(key(KeyCode::Char('c'))), Some(Command::KeepPlaying));
        assert_eq!(Command::from_key(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(Command::from_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            Command::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        let mut release = key(KeyCode::Left);
        release.kind = KeyEventKind::Release;
        assert_eq!(Command::from_key(release), None);
    }

    #[test]
    fn apply_commands() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = Field::from_array(arr2(&[
            [1024, 1024, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]))
        .unwrap();
        let game = Game::from_field(Rules::default(), field);

        // continuing only matters once the game is won
        assert_eq!(Command::KeepPlaying.apply(&game, &mut rng), Some(game.clone()));

        let won = Command::Swipe(Side::Left).apply(&game, &mut rng).unwrap();
        assert_eq!(won.status(), Status::Won);
        let continued = Command::KeepPlaying.apply(&won, &mut rng).unwrap();
        assert_eq!(continued.status(), Status::Playing);

        let fresh = Command::Reset.apply(&continued, &mut rng).unwrap();
        assert_eq!(fresh.score(), 0);
        assert_eq!(fresh.best_score(), 2048);

        assert_eq!(Command::Quit.apply(&fresh, &mut rng), None);
    }
}
