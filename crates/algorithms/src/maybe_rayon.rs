//! Row-parallel iteration that degrades to plain iterators.
//!
//! With the `parallel` feature the kernels iterate rows through rayon. Without
//! it, `into_par_iter()` resolves to `into_iter()` so the same kernel code
//! compiles for single-threaded targets. Either way each output cell is
//! computed by the same arithmetic, so results are identical.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
