//! Row- and grid-level parallelism that degrades to plain iteration.
//!
//! With the `parallel` feature (default) this is rayon's prelude. Without it,
//! `into_par_iter()` resolves to `into_iter()` so the same call sites compile
//! to sequential loops. Either way results are collected in input order, which
//! keeps every stage deterministic.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
pub use sequential::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Stand-in for `rayon::prelude::IntoParallelIterator`
    pub trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
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
