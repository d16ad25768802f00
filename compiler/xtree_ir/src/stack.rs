//! Stack growth for deep recursion.
//!
//! Generated trees can nest far deeper than hand-written code. Every
//! recursive traversal (visitors, rewriters, the evaluator) runs its step
//! through [`ensure_sufficient_stack`].

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red
/// zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;
    use crate::expr::{BinaryOp, Expr};
    use crate::visitor::free_parameters;

    fn nest(depth: usize) -> u64 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(nest(200_000), 200_000);
    }

    #[test]
    fn deeply_nested_tree_is_walkable() {
        let mut tree = Expr::constant(0);
        for _ in 0..2_000 {
            tree = Expr::binary(BinaryOp::Add, tree, Expr::constant(1));
        }
        assert!(free_parameters(&tree).is_empty());
    }
}
