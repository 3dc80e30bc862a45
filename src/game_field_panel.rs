use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{Clear, ClearType},
};
use model::game::{Game, Status};

const TILE_WIDTH: u16 = 8;
const TILE_HEIGHT: u16 = 3;
const MARGIN: u16 = 2;
const TITLE_COLOR: Color = Color::Rgb {
    r: 0xb4,
    g: 0x53,
    b: 0x09,
};

/// Draws the whole game screen: title, score boxes, board and status banner.
pub struct GameFieldPanel {
    left: u16,
    top: u16,
}

impl Default for GameFieldPanel {
    fn default() -> Self {
        Self {
            left: MARGIN,
            top: 1,
        }
    }
}

impl GameFieldPanel {
    pub fn draw<W: Write>(&self, out: &mut W, game: &Game) -> io::Result<()> {
        queue!(out, ResetColor, Clear(ClearType::All))?;
        self.draw_header(out, game)?;
        let board_top = self.top + 3;
        self.draw_board(out, game, board_top)?;
        let size = game.field().size() as u16;
        let banner_top = board_top + size * TILE_HEIGHT + 1;
        self.draw_banner(out, game, banner_top)?;
        queue!(out, ResetColor)?;
        out.flush()
    }

    fn draw_header<W: Write>(&self, out: &mut W, game: &Game) -> io::Result<()> {
        queue!(
            out,
            MoveTo(self.left, self.top),
            SetForegroundColor(TITLE_COLOR),
            SetAttribute(Attribute::Bold),
            Print("2048"),
            SetAttribute(Attribute::Reset),
            MoveTo(self.left, self.top + 1),
            SetForegroundColor(TITLE_COLOR),
            Print(format!(
                "SCORE {:<8} BEST {:<8}",
                game.score(),
                game.best_score()
            )),
            ResetColor
        )
    }

    fn draw_board<W: Write>(&self, out: &mut W, game: &Game, top: u16) -> io::Result<()> {
        for (y, row) in game.field().rows().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                let left = self.left + x as u16 * TILE_WIDTH;
                let tile_top = top + y as u16 * TILE_HEIGHT;
                let label = if value > 0 {
                    value.to_string()
                } else {
                    String::new()
                };
                for line in 0..TILE_HEIGHT {
                    let text = if line == TILE_HEIGHT / 2 {
                        format!(" {:^width$} ", label, width = TILE_WIDTH as usize - 2)
                    } else {
                        " ".repeat(TILE_WIDTH as usize)
                    };
                    queue!(
                        out,
                        MoveTo(left, tile_top + line),
                        SetBackgroundColor(tile_color(value)),
                        SetForegroundColor(Color::White),
                        SetAttribute(Attribute::Bold),
                        Print(text),
                        SetAttribute(Attribute::Reset),
                        ResetColor
                    )?;
                }
            }
        }
        Ok(())
    }

    fn draw_banner<W: Write>(&self, out: &mut W, game: &Game, top: u16) -> io::Result<()> {
        let (message, color, hint) = match game.status() {
            Status::Won => (
                "You win!",
                Color::Green,
                "r: restart   c: continue   q: quit",
            ),
            Status::GameOver => ("Game over!", Color::Red, "r: try again   q: quit"),
            Status::Playing => ("", Color::Reset, "arrows/wasd: move   r: restart   q: quit"),
        };
        queue!(
            out,
            MoveTo(self.left, top),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(message),
            SetAttribute(Attribute::Reset),
            ResetColor,
            MoveTo(self.left, top + 1),
            Print(hint)
        )
    }
}

fn tile_color(n: u32) -> Color {
    let (r, g, b) = match n {
        2 => (0x93, 0x6a, 0x0b),
        4 => (0x70, 0x63, 0x39),
        8 => (0x5a, 0x6e, 0x4c),
        16 => (0xbc, 0x94, 0x76),
        32 => (0x83, 0x4c, 0x3d),
        64 => (0xf1, 0x93, 0x40),
        128 => (0xd8, 0x91, 0x52),
        256 => (0xe0, 0xb2, 0x66),
        512 => (0xdc, 0xb8, 0x5c),
        1024 => (0xd9, 0xae, 0x4f),
        2048 => (0xd6, 0xa9, 0x44),
        4096 | 8192 => (0xa4, 0x9c, 0x85),
        _ => (0xfc, 0xcd, 0x80),
    };
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::{tile_color, GameFieldPanel};
    use crossterm::style::Color;
    use model::field::Field;
    use model::game::Game;
    use model::rules::Rules;
    use ndarray::arr2;

    fn render(game: &Game) -> String {
        let mut buffer = Vec::new();
        GameFieldPanel::default().draw(&mut buffer, game).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn palette() {
        assert_eq!(
            tile_color(2),
            Color::Rgb {
                r: 0x93,
                g: 0x6a,
                b: 0x0b
            }
        );
        assert_eq!(tile_color(4096), tile_color(8192));
        assert_eq!(tile_color(0), tile_color(16384));
        assert_ne!(tile_color(2048), tile_color(1024));
    }

    #[test]
    fn draws_tiles_and_scores() {
        let field = Field::from_array(arr2(&[[2, 0], [0, 128]])).unwrap();
        let game = Game::from_field(Rules::default(), field);
        let screen = render(&game);
        assert!(screen.contains("SCORE 0"));
        assert!(screen.contains("BEST 0"));
        assert!(screen.contains("   2   "));
        assert!(screen.contains("  128   "));
        assert!(!screen.contains("Game over!"));
        assert!(!screen.contains("You win!"));
    }

    #[test]
    fn draws_banners() {
        let stuck = Field::from_array(arr2(&[[2, 4], [4, 2]])).unwrap();
        let screen = render(&Game::from_field(Rules::default(), stuck));
        assert!(screen.contains("Game over!"));
        assert!(screen.contains("try again"));

        let won = Field::from_array(arr2(&[[2048, 0], [0, 0]])).unwrap();
        let screen = render(&Game::from_field(Rules::default(), won));
        assert!(screen.contains("You win!"));
        assert!(screen.contains("c: continue"));
    }
}
