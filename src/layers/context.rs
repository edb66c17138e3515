//! Per-layer context stack.
//!
//! Values saved during `forward` are consumed in LIFO order by `backward`.
//! There is one stack per layer instance and no global tape.

use crate::error::{NnError, Result};

/// Ordered scratch storage between a layer's forward and backward passes.
#[derive(Debug, Clone)]
pub struct Context<T> {
    saved: Vec<T>,
}

impl<T> Context<T> {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }

    /// Stage a value for the next backward call.
    pub fn save_for_backward(&mut self, value: T) {
        self.saved.push(value);
    }

    /// Pop the newest staged value.
    ///
    /// # Errors
    ///
    /// [`NnError::EmptyContext`] when nothing was staged, naming `layer`.
    pub fn pop(&mut self, layer: &'static str) -> Result<T> {
        self.saved.pop().ok_or(NnError::EmptyContext { layer })
    }

    pub fn clear(&mut self) {
        self.saved.clear();
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_lifo() {
        let mut ctx = Context::new();
        ctx.save_for_backward(1);
        ctx.save_for_backward(2);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.pop("test").unwrap(), 2);
        assert_eq!(ctx.pop("test").unwrap(), 1);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_pop_empty_fails() {
        let mut ctx: Context<f32> = Context::default();
        match ctx.pop("Sigmoid") {
            Err(NnError::EmptyContext { layer }) => assert_eq!(layer, "Sigmoid"),
            other => panic!("expected EmptyContext, got {:?}", other),
        }
    }

    #[test]
    fn test_clear() {
        let mut ctx = Context::new();
        ctx.save_for_backward("a");
        ctx.save_for_backward("b");
        ctx.clear();
        assert!(ctx.is_empty());
        assert!(ctx.pop("test").is_err());
    }
}
