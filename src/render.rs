//! Boundary to drawing code.
//!
//! Nothing here draws. A renderer receives a finished [`Grid`] as plain
//! data: values, sorted axis labels and the channel name for the title.
//! Missing cells arrive as [`Grid::MISSING`] and it is up to the renderer
//! to paint them as background.

use crate::error::Result;
use crate::processing::Grid;

pub trait Renderer {
    type Output;

    fn render(&mut self, grid: &Grid) -> Result<Self::Output>;
}

/// Render every grid in turn, stopping at the first failure.
pub fn render_all<'a, R, I>(renderer: &mut R, grids: I) -> Result<Vec<R::Output>>
where
    R: Renderer,
    I: IntoIterator<Item = &'a Grid>,
{
    grids.into_iter().map(|g| renderer.render(g)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::model::{Coord, PixelTable};
    use crate::processing::to_grid;

    /// Text renderer: one line per row, `.` for missing cells.
    struct Ascii;

    impl Renderer for Ascii {
        type Output = String;

        fn render(&mut self, grid: &Grid) -> Result<String> {
            let mut out = format!("# {}\n", grid.channel());
            for row in grid.rows() {
                let line: Vec<String> = row
                    .iter()
                    .map(|c| match c {
                        Some(v) => format!("{v:.1}"),
                        None => ".".to_string(),
                    })
                    .collect();
                out.push_str(&line.join(" "));
                out.push('\n');
            }
            Ok(out)
        }
    }

    #[test]
    fn test_renderer_receives_grid() {
        let mut t = PixelTable::new(vec!["m".into()]);
        t.insert(Coord::new(0, 0), vec![1.0]).unwrap();
        t.insert(Coord::new(1, 1), vec![2.0]).unwrap();
        let grid = to_grid(&t, "m").unwrap();

        let mut ascii = Ascii;
        let out = render_all(&mut ascii, [&grid, &grid.flipped_y()]).unwrap();
        assert_eq!(out[0], "# m\n1.0 .\n. 2.0\n");
        assert_eq!(out[1], "# m\n. 2.0\n1.0 .\n");
    }
}
