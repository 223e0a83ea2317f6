//! Explicit, bounded stack of lexer modes

use super::error::LexicalError;
use crate::config::compile_time::lexical::MAX_MODE_DEPTH;
use crate::grammar::Mode;

/// Stack of active modes; the top selects the rule table
///
/// Never empty: it starts as `[Default]` and a pop that would remove the
/// last entry is refused with [`LexicalError::UnbalancedMode`].
///
/// Pushes refused at the depth limit are remembered, and later pops close
/// them before touching the real stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
    modes: Vec<Mode>,
    /// Modes that did not fit, innermost last
    refused: Vec<Mode>,
    max_depth: usize,
    peak_depth: usize,
}

impl ModeStack {
    pub fn new() -> Self {
        Self::with_max_depth(MAX_MODE_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            modes: vec![Mode::Default],
            refused: Vec::new(),
            max_depth: max_depth.max(1),
            peak_depth: 1,
        }
    }

    pub fn current(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Default)
    }

    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    /// Deepest the stack has been since creation or the last reset
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Levels refused at the depth limit and not yet closed by a pop
    pub fn refused_depth(&self) -> usize {
        self.refused.len()
    }

    pub fn is_default(&self) -> bool {
        self.modes == [Mode::Default] && self.refused.is_empty()
    }

    pub fn push(&mut self, mode: Mode) -> Result<(), LexicalError> {
        self.push_all(&[mode])
    }

    /// Push every mode or none of them
    pub fn push_all(&mut self, modes: &[Mode]) -> Result<(), LexicalError> {
        let Some(&first) = modes.first() else {
            return Ok(());
        };

        if !self.refused.is_empty() || self.modes.len() + modes.len() > self.max_depth {
            self.refused.extend_from_slice(modes);
            return Err(LexicalError::ModeStackOverflow {
                depth: self.modes.len(),
                mode: first,
            });
        }

        self.modes.extend_from_slice(modes);
        self.peak_depth = self.peak_depth.max(self.modes.len());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Mode, LexicalError> {
        if let Some(mode) = self.refused.pop() {
            return Ok(mode);
        }
        if self.modes.len() <= 1 {
            return Err(LexicalError::UnbalancedMode {
                mode: self.current(),
            });
        }
        Ok(self.current_and_pop())
    }

    fn current_and_pop(&mut self) -> Mode {
        self.modes.pop().unwrap_or(Mode::Default)
    }

    /// Drop everything above the bottom entry and return what was removed, innermost first
    pub fn unwind(&mut self) -> Vec<Mode> {
        self.refused.clear();
        let mut closed = Vec::new();
        while self.modes.len() > 1 {
            closed.push(self.current_and_pop());
        }
        closed
    }

    /// Force the stack back to `[Default]`
    pub fn reset(&mut self) {
        self.refused.clear();
        self.modes.clear();
        self.modes.push(Mode::Default);
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_push_pop() {
        let mut stack = ModeStack::new();
        assert!(stack.is_default());

        stack.push(Mode::Enrich).unwrap();
        stack.push(Mode::EnrichField).unwrap();
        assert_eq!(stack.current(), Mode::EnrichField);
        assert_eq!(stack.depth(), 3);

        assert_eq!(stack.pop(), Ok(Mode::EnrichField));
        assert_eq!(stack.pop(), Ok(Mode::Enrich));
        assert!(stack.is_default());
        assert_eq!(stack.peak_depth(), 3);
    }

    #[test]
    fn test_pop_never_empties() {
        let mut stack = ModeStack::new();
        assert_matches!(
            stack.pop(),
            Err(LexicalError::UnbalancedMode { mode: Mode::Default })
        );
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_push_respects_max_depth() {
        let mut stack = ModeStack::with_max_depth(2);
        stack.push(Mode::Expression).unwrap();
        assert_matches!(
            stack.push(Mode::Expression),
            Err(LexicalError::ModeStackOverflow { depth: 2, .. })
        );
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_group_push_is_all_or_nothing() {
        let mut stack = ModeStack::with_max_depth(3);
        stack.push(Mode::Expression).unwrap();

        assert_matches!(
            stack.push_all(&[Mode::Expression, Mode::Expression]),
            Err(LexicalError::ModeStackOverflow { depth: 2, mode: Mode::Expression })
        );
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.refused_depth(), 2);

        // closing the refused group leaves the enclosing mode in place
        assert_eq!(stack.pop(), Ok(Mode::Expression));
        assert_eq!(stack.pop(), Ok(Mode::Expression));
        assert_eq!(stack.refused_depth(), 0);
        assert_eq!(stack.modes(), &[Mode::Default, Mode::Expression]);

        assert_eq!(stack.pop(), Ok(Mode::Expression));
        assert!(stack.is_default());
        assert_eq!(stack.peak_depth(), 2);
    }

    #[test]
    fn test_unwind_reports_open_modes() {
        let mut stack = ModeStack::new();
        stack.push(Mode::From).unwrap();
        stack.push(Mode::Expression).unwrap();
        assert_eq!(stack.unwind(), vec![Mode::Expression, Mode::From]);
        assert!(stack.is_default());

        stack.push(Mode::Show).unwrap();
        stack.reset();
        assert!(stack.is_default());
    }
}
