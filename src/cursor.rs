//! Component J: a bidirectional positionable iterator over an ordered
//! sequence, with explicit before-first/after-last states (spec §4.J).

use crate::error::{Error, Result};

/// Where a [`Cursor`] currently sits relative to its backing sequence.
///
/// Exactly one of before-first, on an index, or after-last holds at
/// any time — this is the invariant every method below preserves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// A bidirectional cursor over a `Vec<T>`, positioned either
/// before-first, on an element, or after-last.
///
/// `before`/`after` require `T: Ord` to locate an element by value;
/// the rest of the API only needs positional movement. Once
/// [`close`](Cursor::close) is called, every operation other than
/// `close` itself and `is_closed` fails with `InvalidCursorPosition`.
pub struct Cursor<T> {
    items: Vec<T>,
    position: Position,
    closed: bool,
    close_cause: Option<String>,
}

impl<T> Cursor<T> {
    /// A new cursor, positioned before-first.
    pub fn new(items: Vec<T>) -> Self {
        Cursor {
            items,
            position: Position::BeforeFirst,
            closed: false,
            close_cause: None,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::InvalidCursorPosition)
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Idempotent: closing an already-closed cursor is a no-op.
    pub fn close(&mut self) {
        self.close_with_cause(None::<String>)
    }

    pub fn close_with_cause(&mut self, cause: Option<impl Into<String>>) {
        if !self.closed {
            self.closed = true;
            self.close_cause = cause.map(Into::into);
        }
    }

    pub fn close_cause(&self) -> Option<&str> {
        self.close_cause.as_deref()
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.check_open()?;
        self.position = Position::BeforeFirst;
        Ok(())
    }

    pub fn after_last(&mut self) -> Result<()> {
        self.check_open()?;
        self.position = Position::AfterLast;
        Ok(())
    }

    pub fn first(&mut self) -> Result<bool> {
        self.check_open()?;
        if self.items.is_empty() {
            self.position = Position::AfterLast;
            Ok(false)
        } else {
            self.position = Position::At(0);
            Ok(true)
        }
    }

    pub fn last(&mut self) -> Result<bool> {
        self.check_open()?;
        if self.items.is_empty() {
            self.position = Position::BeforeFirst;
            Ok(false)
        } else {
            self.position = Position::At(self.items.len() - 1);
            Ok(true)
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        self.check_open()?;
        let candidate = match self.position {
            Position::BeforeFirst => 0,
            Position::At(i) => i + 1,
            Position::AfterLast => return Ok(false),
        };
        if candidate >= self.items.len() {
            self.position = Position::AfterLast;
            Ok(false)
        } else {
            self.position = Position::At(candidate);
            Ok(true)
        }
    }

    pub fn previous(&mut self) -> Result<bool> {
        self.check_open()?;
        match self.position {
            Position::BeforeFirst => Ok(false),
            Position::At(0) => {
                self.position = Position::BeforeFirst;
                Ok(false)
            }
            Position::At(i) => {
                self.position = Position::At(i - 1);
                Ok(true)
            }
            Position::AfterLast => {
                if self.items.is_empty() {
                    Ok(false)
                } else {
                    self.position = Position::At(self.items.len() - 1);
                    Ok(true)
                }
            }
        }
    }

    /// The element at the current position. Fails with
    /// `InvalidCursorPosition` when before-first or after-last.
    pub fn get(&self) -> Result<&T> {
        self.check_open()?;
        match self.position {
            Position::At(i) => Ok(&self.items[i]),
            _ => Err(Error::InvalidCursorPosition),
        }
    }

    pub fn available(&self) -> Result<usize> {
        self.check_open()?;
        Ok(match self.position {
            Position::BeforeFirst => self.items.len(),
            Position::At(i) => self.items.len() - i - 1,
            Position::AfterLast => 0,
        })
    }

    pub fn is_before_first(&self) -> bool {
        matches!(self.position, Position::BeforeFirst)
    }

    pub fn is_after_last(&self) -> bool {
        matches!(self.position, Position::AfterLast)
    }

    pub fn is_first(&self) -> bool {
        matches!(self.position, Position::At(0))
    }

    pub fn is_last(&self) -> bool {
        matches!(self.position, Position::At(i) if i == self.items.len().saturating_sub(1))
    }
}

impl<T: Ord> Cursor<T> {
    /// Positions the cursor immediately before the first element
    /// greater than or equal to `element`, matching the "skip ahead"
    /// semantics a range scan needs. If every element is less than
    /// `element`, positions after-last.
    pub fn before(&mut self, element: &T) -> Result<()> {
        self.check_open()?;
        match self.items.binary_search(element) {
            Ok(i) | Err(i) => {
                if i == 0 {
                    self.position = Position::BeforeFirst;
                } else if i >= self.items.len() {
                    self.position = Position::AfterLast;
                } else {
                    self.position = Position::At(i.saturating_sub(1));
                }
            }
        }
        Ok(())
    }

    /// Positions the cursor immediately after the last element less
    /// than or equal to `element`.
    pub fn after(&mut self, element: &T) -> Result<()> {
        self.check_open()?;
        let i = match self.items.binary_search(element) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        if self.items.is_empty() {
            self.position = Position::BeforeFirst;
        } else if i < self.items.len() && &self.items[i] <= element {
            self.position = Position::At(i);
        } else {
            self.position = Position::BeforeFirst;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_before_first() {
        let cursor: Cursor<i32> = Cursor::new(vec![1, 2, 3]);
        assert!(cursor.is_before_first());
    }

    #[test]
    fn next_walks_forward_then_after_last() {
        let mut cursor = Cursor::new(vec![1, 2]);
        assert!(cursor.next().unwrap());
        assert_eq!(*cursor.get().unwrap(), 1);
        assert!(cursor.next().unwrap());
        assert_eq!(*cursor.get().unwrap(), 2);
        assert!(!cursor.next().unwrap());
        assert!(cursor.is_after_last());
    }

    #[test]
    fn get_off_element_fails() {
        let cursor = Cursor::new(vec![1, 2]);
        assert!(matches!(cursor.get(), Err(Error::InvalidCursorPosition)));
    }

    #[test]
    fn previous_from_after_last_reaches_last_element() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        cursor.after_last().unwrap();
        assert!(cursor.previous().unwrap());
        assert_eq!(*cursor.get().unwrap(), 3);
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let mut cursor = Cursor::new(vec![1]);
        cursor.close();
        cursor.close();
        assert!(cursor.is_closed());
        assert!(matches!(cursor.next(), Err(Error::InvalidCursorPosition)));
    }

    #[test]
    fn available_counts_remaining_elements() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        assert_eq!(cursor.available().unwrap(), 3);
        cursor.next().unwrap();
        assert_eq!(cursor.available().unwrap(), 2);
    }

    #[test]
    fn before_positions_ahead_of_matching_element() {
        let mut cursor = Cursor::new(vec![1, 3, 5, 7]);
        cursor.before(&5).unwrap();
        assert!(cursor.next().unwrap());
        assert_eq!(*cursor.get().unwrap(), 5);
    }
}
