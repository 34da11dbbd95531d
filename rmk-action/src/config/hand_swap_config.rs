use crate::event::{KeyPos, KeyboardEventPos};

/// Mirror positions used when hands are swapped.
///
/// `matrix[row][col]` is the position a key at `(row, col)` is read as, and
/// `encoders[id]` is the encoder an encoder `id` is read as.
#[derive(Clone, Copy, Debug)]
pub struct HandSwapConfig<const ROW: usize, const COL: usize, const NUM_ENCODER: usize = 0> {
    pub matrix: [[KeyPos; COL]; ROW],
    pub encoders: [u8; NUM_ENCODER],
}

impl<const ROW: usize, const COL: usize, const NUM_ENCODER: usize> HandSwapConfig<ROW, COL, NUM_ENCODER> {
    pub const fn new(matrix: [[KeyPos; COL]; ROW], encoders: [u8; NUM_ENCODER]) -> Self {
        Self { matrix, encoders }
    }

    /// Mirror the matrix left to right, which fits most column-staggered split layouts
    pub fn mirror_columns() -> Self {
        let mut matrix = [[KeyPos { row: 0, col: 0 }; COL]; ROW];
        for (row, keys) in matrix.iter_mut().enumerate() {
            for (col, pos) in keys.iter_mut().enumerate() {
                *pos = KeyPos {
                    row: row as u8,
                    col: (COL - 1 - col) as u8,
                };
            }
        }
        let mut encoders = [0; NUM_ENCODER];
        for (id, e) in encoders.iter_mut().enumerate() {
            *e = id as u8;
        }
        Self { matrix, encoders }
    }

    /// The swapped position, `None` if the position is outside the matrix and encoders
    pub(crate) fn swapped(&self, pos: KeyboardEventPos) -> Option<KeyboardEventPos> {
        match pos {
            KeyboardEventPos::Key(KeyPos { row, col }) => self
                .matrix
                .get(row as usize)
                .and_then(|r| r.get(col as usize))
                .map(|p| KeyboardEventPos::Key(*p)),
            KeyboardEventPos::RotaryEncoder(mut e) => self.encoders.get(e.id as usize).map(|id| {
                e.id = *id;
                KeyboardEventPos::RotaryEncoder(e)
            }),
            KeyboardEventPos::Tick => None,
        }
    }
}
